//! Learner configuration.

/// Hyper-parameters of the RIPPER learner.
///
/// The configuration is immutable once handed to the learner; all training
/// state lives inside the training call. Defaults are the classic RIPPER
/// values.
#[derive(Clone, Debug, PartialEq)]
pub struct RipConf {
    /// Number of folds the data is split into during rule construction. One
    /// fold is held out as the pruning set.
    pub folds: usize,
    /// Minimal weight of accurately-covered instances a grown antecedent must
    /// reach to be accepted.
    pub min_no: f64,
    /// Number of optimization runs over the initial ruleset of each class.
    pub optimizations: usize,
    /// Seed of the random number generator. The same seed reproduces the same
    /// rule list bit for bit.
    pub seed: u64,
    /// Whether the stopping criteria check for rule error rates above 1/2.
    pub check_err: bool,
    /// Whether rules are pruned on held-out data. Turning this off also turns
    /// off the optimization stage.
    pub use_pruning: bool,
    /// Description-length surplus, in bits, tolerated over the best ruleset
    /// seen so far before the building stage gives up.
    pub max_dl_surplus: f64,
}

impl Default for RipConf {
    fn default() -> Self {
        RipConf {
            folds: 3,
            min_no: 2.0,
            optimizations: 2,
            seed: 1,
            check_err: true,
            use_pruning: true,
            max_dl_surplus: 64.0,
        }
    }
}

impl RipConf {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of grow/prune folds.
    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    /// Sets the minimal accurately-covered weight of a grown antecedent.
    pub fn with_min_no(mut self, min_no: f64) -> Self {
        self.min_no = min_no;
        self
    }

    /// Sets the number of optimization runs.
    pub fn with_optimizations(mut self, optimizations: usize) -> Self {
        self.optimizations = optimizations;
        self
    }

    /// Sets the randomization seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets whether stopping criteria check error rates.
    pub fn with_check_err(mut self, check_err: bool) -> Self {
        self.check_err = check_err;
        self
    }

    /// Sets whether rules are pruned at all (off for clean data).
    pub fn with_pruning(mut self, use_pruning: bool) -> Self {
        self.use_pruning = use_pruning;
        self
    }

    /// Sets the tolerated description-length surplus in bits.
    pub fn with_max_dl_surplus(mut self, max_dl_surplus: f64) -> Self {
        self.max_dl_surplus = max_dl_surplus;
        self
    }
}
