//! Rules: ordered conjunctions of antecedents predicting a class.

use crate::common::*;
use crate::data::Instances;

pub mod antecedent;

pub use self::antecedent::{AntdStats, Antecedent, ContinuousAntd, DiscreteAntd};

/// A conjunction of antecedents and the class it predicts.
///
/// Rules grow greedily, one antecedent at a time, picking the information-gain
/// maximizing test `p * (log2(p/t) - log2(P/T))` at each step; they are then
/// simplified by truncating the antecedent list at the prefix that performs
/// best on held-out data. A rule without antecedents is a default rule and
/// covers every instance.
#[derive(Clone, Debug)]
pub struct Rule {
    /// Class this rule predicts.
    consequent: ClsIdx,
    /// Conjunction, in insertion order. Pruning truncates from the tail.
    antecedents: Vec<Antecedent>,
}

impl Rule {
    /// Empty rule for a class.
    pub fn new(consequent: ClsIdx) -> Self {
        Rule {
            consequent,
            antecedents: Vec::new(),
        }
    }

    /// Rule with a fixed antecedent list, used by the parser.
    pub fn with_antecedents(consequent: ClsIdx, antecedents: Vec<Antecedent>) -> Self {
        Rule {
            consequent,
            antecedents,
        }
    }

    /// Class this rule predicts.
    pub fn consequent(&self) -> ClsIdx {
        self.consequent
    }

    /// The antecedents, in conjunction order.
    pub fn antecedents(&self) -> &[Antecedent] {
        &self.antecedents
    }

    /// Number of antecedents.
    pub fn size(&self) -> usize {
        self.antecedents.len()
    }

    /// True if the rule has at least one antecedent, i.e. is not a default
    /// rule.
    pub fn has_antds(&self) -> bool {
        !self.antecedents.is_empty()
    }

    /// True iff every antecedent covers instance `i`. An empty rule covers
    /// everything.
    pub fn covers(&self, data: &Instances, i: usize) -> bool {
        self.antecedents.iter().all(|antd| antd.covers(data, i))
    }

    /// Weighted count of the instances whose class is this rule's consequent.
    fn def_accu(&self, data: &Instances) -> f64 {
        let mut accu = 0.0;
        for i in 0..data.num_instances() {
            if data.class_of(i) == Some(self.consequent) {
                accu += data.weight(i)
            }
        }
        accu
    }

    /// Grows the rule on `grow_data`.
    ///
    /// Repeatedly builds a candidate antecedent for every attribute not used
    /// yet (continuous attributes are never marked used and may be tested at
    /// several thresholds), keeps the best one and restricts the data to the
    /// bag it selects. Stops when no candidate improves the gain, the best
    /// candidate's accurate weight is below `min_no`, the data runs out, or
    /// the rule is already perfect.
    pub fn grow(&mut self, grow_data: Instances, min_no: f64) {
        let mut data = grow_data;
        let sum_of_weights = data.sum_of_weights();
        if sum_of_weights <= 0.0 {
            return;
        }
        let def_accu = self.def_accu(&data);
        let mut def_ac_rt = (def_accu + 1.0) / (sum_of_weights + 1.0);

        let mut used = AttrMap::of_elems(false, data.num_attributes());
        let mut num_unused = data.num_attributes();

        while !data.is_empty() && num_unused > 0 && def_ac_rt < 1.0 {
            let mut max_info_gain = 0.0;
            let mut best: Option<Antecedent> = None;
            let mut best_cover: Option<Instances> = None;

            for j in 1..data.num_attributes() {
                let idx: AttrIdx = j.into();
                if used[idx] {
                    continue;
                }
                let mut antd = Antecedent::of_attr(data.attr(idx));
                if let Some(mut bags) = antd.split_data(&mut data, def_ac_rt, self.consequent)
                {
                    if antd.stats().max_info_gain > max_info_gain {
                        max_info_gain = antd.stats().max_info_gain;
                        best_cover = Some(bags.swap_remove(antd.selected()));
                        best = Some(antd)
                    }
                }
            }

            let (antd, cover) = match (best, best_cover) {
                (Some(antd), Some(cover)) => (antd, cover),
                _ => break,
            };
            if antd.stats().accu < min_no {
                break;
            }

            if antd.attr().is_discrete() {
                used[antd.attr().index()] = true;
                num_unused -= 1
            }
            def_ac_rt = antd.stats().accu_rate;
            data = cover;
            trace!("grew antecedent: {}", antd);
            self.antecedents.push(antd)
        }
    }

    /// Prunes the rule on held-out data.
    ///
    /// Walks the antecedents left to right, re-deriving at each prefix length
    /// the covered subset of the remaining pruning data and the prefix's
    /// worth: with `use_whole`, `(TP + TN) / (P + N)` over the entire pruning
    /// set, otherwise the accuracy `(p + 1) / (p + n + 2)` over the covered
    /// subset only. The list is truncated at the shortest prefix maximizing
    /// worth; truncating at length 0 turns the rule into a default rule.
    pub fn prune(&mut self, prune_data: Instances, use_whole: bool) {
        let total = prune_data.sum_of_weights();
        if total <= 0.0 {
            return;
        }
        let def_accu = self.def_accu(&prune_data);
        let size = self.antecedents.len();
        if size == 0 {
            return;
        }

        let mut worth_rt = vec![0.0; size];
        let mut coverage = vec![0.0; size];
        let mut worth_value = vec![0.0; size];
        // True negatives accumulate across prefixes under `use_whole`.
        let mut tn = 0.0;

        let mut data = prune_data;
        for x in 0..size {
            let antd = &self.antecedents[x];
            let mut covered = data.empty_like();
            for i in 0..data.num_instances() {
                let w = data.weight(i);
                if antd.covers(&data, i) {
                    coverage[x] += w;
                    covered.push_from(&data, i);
                    if data.class_of(i) == Some(self.consequent) {
                        worth_value[x] += w
                    }
                } else if use_whole && data.class_of(i) != Some(self.consequent) {
                    tn += w
                }
            }
            if use_whole {
                worth_value[x] += tn;
                worth_rt[x] = worth_value[x] / total
            } else {
                worth_rt[x] = (worth_value[x] + 1.0) / (coverage[x] + 2.0)
            }
            data = covered
        }

        // Strict improvement only: ties go to the shortest prefix.
        let mut max_value = (def_accu + 1.0) / (total + 2.0);
        let mut max_index = 0;
        for (i, &worth) in worth_rt.iter().enumerate() {
            if worth > max_value {
                max_value = worth;
                max_index = i + 1
            }
        }
        self.antecedents.truncate(max_index)
    }

    /// Removes redundant continuous tests: walking the antecedents from the
    /// tail, only the tightest bound per attribute and direction survives.
    pub fn clean_up(&mut self, data: &Instances) {
        let mut mins = AttrMap::of_elems(f64::INFINITY, data.num_attributes());
        let mut maxs = AttrMap::of_elems(f64::NEG_INFINITY, data.num_attributes());

        for i in (0..self.antecedents.len()).rev() {
            let keep = match &self.antecedents[i] {
                Antecedent::Discrete(_) => true,
                Antecedent::Continuous(antd) => {
                    let idx = antd.attr().index();
                    let split_point = antd.split_point();
                    if antd.dir() == 0 {
                        if split_point < mins[idx] {
                            mins[idx] = split_point;
                            true
                        } else {
                            false
                        }
                    } else if split_point > maxs[idx] {
                        maxs[idx] = split_point;
                        true
                    } else {
                        false
                    }
                }
            };
            if !keep {
                self.antecedents.remove(i);
            }
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for (i, antd) in self.antecedents.iter().enumerate() {
            if i > 0 {
                write!(fmt, " and ")?
            }
            write!(fmt, "({})", antd)?
        }
        if self.has_antds() {
            write!(fmt, " ")?
        }
        write!(fmt, "=> [{}]", self.consequent)
    }
}

/// An ordered rule list.
///
/// The product of training: rules are tried in order and the first one
/// covering an instance decides its class. After training the last rule is a
/// default rule, so every instance gets a prediction.
#[derive(Clone, Debug)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Rule set over a fixed list of rules.
    pub fn new(rules: Vec<Rule>) -> Self {
        RuleSet { rules }
    }

    /// The rules, in decision order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Class of the first rule covering instance `i`, if any rule does.
    pub fn classify(&self, data: &Instances, i: usize) -> Option<ClsIdx> {
        self.rules
            .iter()
            .find(|rule| rule.covers(data, i))
            .map(|rule| rule.consequent())
    }

    /// Predictions for every instance.
    ///
    /// Fails if some instance is covered by no rule, which cannot happen when
    /// the rule set ends in a default rule.
    pub fn predict(&self, data: &Instances) -> Res<Vec<ClsIdx>> {
        (0..data.num_instances())
            .map(|i| {
                self.classify(data, i).ok_or_else(|| {
                    ErrorKind::Data(format!("no rule covers instance {}", i)).into()
                })
            })
            .collect()
    }

    /// Weighted accuracy of the predictions on labeled data. Instances with a
    /// missing class are skipped.
    pub fn accuracy(&self, data: &Instances) -> Res<f64> {
        let predictions = self.predict(data)?;
        let (mut correct, mut total) = (0.0, 0.0);
        for (i, prediction) in predictions.iter().enumerate() {
            if let Some(cls) = data.class_of(i) {
                total += data.weight(i);
                if cls == *prediction {
                    correct += data.weight(i)
                }
            }
        }
        if total > 0.0 {
            Ok(correct / total)
        } else {
            Ok(0.0)
        }
    }

    /// Parses the textual format against a dataset header; see the [`parse`]
    /// module for the grammar.
    ///
    /// [`parse`]: crate::parse
    pub fn parse(src: &str, data: &Instances) -> Res<Self> {
        crate::parse::rules(src, data)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for rule in &self.rules {
            writeln!(fmt, "{}", rule)?
        }
        Ok(())
    }
}
