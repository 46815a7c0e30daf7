//! Ruleset statistics and the description-length calculus.
//!
//! The minimum-description-length formulas follow Quinlan, *MDL and
//! categorical theories (continued)*, ML95: the cost of a ruleset is the cost
//! of coding its rules (theory bits) plus the cost of coding the data's
//! deviation from it (error bits). They drive both the stopping criterion of
//! the building stage and the deletion of unworthy rules.

use crate::common::*;
use crate::data::{Attribute, Instances};
use crate::rule::Rule;

/// Redundancy factor in the theory description length.
const REDUNDANCY_FACTOR: f64 = 0.5;
/// Weight of the theory description length in the MDL computation.
const MDL_THEORY_WEIGHT: f64 = 1.0;

/// Per-rule coverage statistics:
/// `[coverage, uncoverage, true positives, true negatives, false positives,
/// false negatives]`.
pub type SimpleStats = [f64; 6];

/// Coverage bookkeeping and MDL formulas for a ruleset over a dataset.
///
/// `filtered[i]` is the (covered, uncovered) split of rule `i`, computed on
/// the uncovered side of rule `i - 1`: a linear chain rooted at the full
/// data. The statistics vectors are kept in lock-step with the ruleset,
/// rules and their statistics are pushed and popped together.
pub struct RuleStats {
    /// The data the statistics are based on.
    data: Instances,
    /// The ruleset.
    ruleset: Vec<Rule>,
    /// Covered/uncovered chain, one entry per rule.
    filtered: Vec<(Instances, Instances)>,
    /// Simple statistics, one entry per rule.
    simple_stats: Vec<SimpleStats>,
    /// Per-class covered weight, one entry per rule.
    distributions: Vec<ClsMap<f64>>,
    /// Total number of possible conditions that could appear in a rule.
    num_all_conds: f64,
}

impl RuleStats {
    /// Statistics over some data with an empty ruleset.
    pub fn new(data: Instances, num_all_conds: f64) -> Self {
        RuleStats {
            data,
            ruleset: Vec::new(),
            filtered: Vec::new(),
            simple_stats: Vec::new(),
            distributions: Vec::new(),
            num_all_conds,
        }
    }

    /// Statistics over some data with a fixed ruleset; counting is deferred
    /// to [`count_data`][Self::count_data] or
    /// [`count_data_from`][Self::count_data_from].
    pub fn with_ruleset(data: Instances, ruleset: Vec<Rule>, num_all_conds: f64) -> Self {
        RuleStats {
            data,
            ruleset,
            filtered: Vec::new(),
            simple_stats: Vec::new(),
            distributions: Vec::new(),
            num_all_conds,
        }
    }

    /// The data the statistics are based on.
    pub fn data(&self) -> &Instances {
        &self.data
    }

    /// The ruleset.
    pub fn ruleset(&self) -> &[Rule] {
        &self.ruleset
    }

    /// Number of rules.
    pub fn ruleset_size(&self) -> usize {
        self.ruleset.len()
    }

    /// Simple statistics of rule `index`.
    pub fn simple_stats(&self, index: usize) -> &SimpleStats {
        &self.simple_stats[index]
    }

    /// Covered/uncovered partitions of rule `index`.
    pub fn filtered(&self, index: usize) -> &(Instances, Instances) {
        &self.filtered[index]
    }

    /// Per-class covered weight of rule `index`.
    pub fn distribution(&self, index: usize) -> &ClsMap<f64> {
        &self.distributions[index]
    }

    /// Total number of possible conditions.
    pub fn num_all_conds(&self) -> f64 {
        self.num_all_conds
    }

    /// Counts the coverage split and statistics of one rule on some data.
    fn compute_simple_stats(
        &self,
        index: usize,
        insts: &Instances,
    ) -> (SimpleStats, ClsMap<f64>, (Instances, Instances)) {
        let rule = &self.ruleset[index];
        let mut stats = [0.0; 6];
        let mut dist = ClsMap::of_elems(0.0, self.data.num_classes());
        let mut covered = insts.empty_like();
        let mut uncovered = insts.empty_like();

        for i in 0..insts.num_instances() {
            let w = insts.weight(i);
            if rule.covers(insts, i) {
                covered.push_from(insts, i);
                stats[0] += w;
                if insts.class_of(i) == Some(rule.consequent()) {
                    stats[2] += w // true positive
                } else {
                    stats[4] += w // false positive
                }
                if let Some(cls) = insts.class_of(i) {
                    dist[cls] += w
                }
            } else {
                uncovered.push_from(insts, i);
                stats[1] += w;
                if insts.class_of(i) != Some(rule.consequent()) {
                    stats[3] += w // true negative
                } else {
                    stats[5] += w // false negative
                }
            }
        }
        (stats, dist, (covered, uncovered))
    }

    /// Appends a rule, extending the filtered chain and the statistics from
    /// the previous rule's uncovered partition.
    pub fn add_and_update(&mut self, rule: &Rule) {
        self.ruleset.push(rule.clone());
        let index = self.ruleset.len() - 1;
        let (stats, dist, split) = {
            let base = if index == 0 {
                &self.data
            } else {
                &self.filtered[index - 1].1
            };
            self.compute_simple_stats(index, base)
        };
        self.filtered.push(split);
        self.simple_stats.push(stats);
        self.distributions.push(dist)
    }

    /// Pops the last rule together with its statistics.
    pub fn remove_last(&mut self) {
        self.ruleset.pop();
        self.filtered.pop();
        self.simple_stats.pop();
        self.distributions.pop();
    }

    /// Recounts the whole filtered chain and statistics from scratch.
    pub fn count_data(&mut self) {
        self.filtered.clear();
        self.simple_stats.clear();
        self.distributions.clear();

        let mut data = self.data.clone();
        for index in 0..self.ruleset.len() {
            let (stats, dist, split) = self.compute_simple_stats(index, &data);
            data = split.1.clone();
            self.filtered.push(split);
            self.simple_stats.push(stats);
            self.distributions.push(dist)
        }
    }

    /// Counts the chain from `position` on, over `uncovered`, taking the
    /// statistics of the rules before `position` for granted.
    ///
    /// The filtered entries before `position` are placeholders, except the one
    /// at `position - 1` whose uncovered side is `uncovered` so that the MDL
    /// formulas can recount from there. Does nothing if the statistics were
    /// already counted.
    pub fn count_data_from(
        &mut self,
        position: usize,
        uncovered: &Instances,
        prev_stats: &[SimpleStats],
    ) {
        if !self.filtered.is_empty() {
            return;
        }
        debug_assert!(prev_stats.len() >= position);

        for index in 0..position {
            self.simple_stats.push(prev_stats[index]);
            self.distributions
                .push(ClsMap::of_elems(0.0, self.data.num_classes()));
            if index + 1 == position {
                self.filtered.push((uncovered.empty_like(), uncovered.clone()))
            } else {
                self.filtered
                    .push((uncovered.empty_like(), uncovered.empty_like()))
            }
        }

        let mut data = uncovered.clone();
        for index in position..self.ruleset.len() {
            let (stats, dist, split) = self.compute_simple_stats(index, &data);
            data = split.1.clone();
            self.filtered.push(split);
            self.simple_stats.push(stats);
            self.distributions.push(dist)
        }
    }

    /// Subset description length `S(t, k, p) = -k*log2(p) - (t-k)*log2(1-p)`:
    /// the bits needed to single out `k` elements of a `t`-element set when
    /// the recipient expects a proportion `p` of them.
    ///
    /// The `-k*log2(p)` term is defined as 0 when `p` is 0.
    pub fn subset_dl(t: f64, k: f64, p: f64) -> f64 {
        let mut rt = if p > 0.0 { -k * p.log2() } else { 0.0 };
        rt -= (t - k) * (1.0 - p).log2();
        rt
    }

    /// Description length of the data given the ruleset's aggregate coverage.
    ///
    /// Total bits to send how much data there is, plus a cover-side and an
    /// uncover-side [`subset_dl`][Self::subset_dl]. The side with more
    /// instances absorbs the expected error `exp_fp_over_err * (fp + fn)`;
    /// the other side codes its observed error rate directly.
    pub fn data_dl(
        exp_fp_over_err: f64,
        cover: f64,
        uncover: f64,
        false_pos: f64,
        false_neg: f64,
    ) -> f64 {
        let total_bits = (cover + uncover + 1.0).log2();
        let cover_bits;
        let uncover_bits;

        if cover > uncover {
            let exp_err = exp_fp_over_err * (false_pos + false_neg);
            cover_bits = Self::subset_dl(cover, false_pos, exp_err / cover);
            uncover_bits = if uncover > 0.0 {
                Self::subset_dl(uncover, false_neg, false_neg / uncover)
            } else {
                0.0
            }
        } else {
            let exp_err = (1.0 - exp_fp_over_err) * (false_pos + false_neg);
            cover_bits = if cover > 0.0 {
                Self::subset_dl(cover, false_pos, false_pos / cover)
            } else {
                0.0
            };
            uncover_bits = Self::subset_dl(uncover, false_neg, exp_err / uncover)
        }

        total_bits + cover_bits + uncover_bits
    }

    /// Description length of the theory of rule `index`: half the bits for
    /// its antecedent count (with a repeated-log term past one antecedent)
    /// plus the subset of all possible conditions the rule picks. A rule
    /// without antecedents has a free theory.
    pub fn theory_dl(&self, index: usize) -> f64 {
        let k = self.ruleset[index].size() as f64;
        if k == 0.0 {
            return 0.0;
        }
        let mut tdl = k.log2();
        if k > 1.0 {
            tdl += 2.0 * tdl.log2()
        }
        tdl += Self::subset_dl(self.num_all_conds, k, k / self.num_all_conds);
        MDL_THEORY_WEIGHT * REDUNDANCY_FACTOR * tdl
    }

    /// Tries to fold rule `index` into the hypothetically-deleted aggregate
    /// `ruleset_stat`.
    ///
    /// The rule is folded (its coverage moved to the uncovered side, the
    /// aggregate updated in place) when deleting it does not increase the
    /// description length, and, under `check_err`, only when its local error
    /// rate is below 1/2. Returns the potential gain, or NaN when the rule is
    /// kept; a NaN outcome leaves the aggregate untouched.
    fn potential(
        &self,
        index: usize,
        exp_fp_over_err: f64,
        ruleset_stat: &mut SimpleStats,
        rule_stat: &SimpleStats,
        check_err: bool,
    ) -> f64 {
        // Aggregate statistics with the rule deleted: its covered instances
        // move to the uncovered side, former true positives become false
        // negatives.
        let pcov = ruleset_stat[0] - rule_stat[0];
        let puncov = ruleset_stat[1] + rule_stat[0];
        let pfp = ruleset_stat[4] - rule_stat[4];
        let pfn = ruleset_stat[5] + rule_stat[2];

        let data_dl_with = Self::data_dl(
            exp_fp_over_err,
            ruleset_stat[0],
            ruleset_stat[1],
            ruleset_stat[4],
            ruleset_stat[5],
        );
        let theory_dl_with = self.theory_dl(index);
        let data_dl_without = Self::data_dl(exp_fp_over_err, pcov, puncov, pfp, pfn);

        let potential = data_dl_with + theory_dl_with - data_dl_without;
        let err = rule_stat[4] / rule_stat[0];
        let over_err = check_err && err >= 0.5;

        if potential >= 0.0 && !over_err {
            ruleset_stat[0] = pcov;
            ruleset_stat[1] = puncov;
            ruleset_stat[4] = pfp;
            ruleset_stat[5] = pfn;
            potential
        } else {
            f64::NAN
        }
    }

    /// Minimum data description length of the ruleset with rule `index` kept,
    /// after hypothetically propagating deletions through every later rule.
    pub fn min_data_dl_if_exists(&self, index: usize, exp_fp_over_err: f64, check_err: bool) -> f64 {
        let mut ruleset_stat = [0.0; 6];
        for (j, stats) in self.simple_stats.iter().enumerate() {
            ruleset_stat[0] += stats[0];
            ruleset_stat[2] += stats[2];
            ruleset_stat[4] += stats[4];
            if j == self.simple_stats.len() - 1 {
                // uncovered side is whatever the last rule leaves
                ruleset_stat[1] = stats[1];
                ruleset_stat[3] = stats[3];
                ruleset_stat[5] = stats[5]
            }
        }

        for k in index + 1..self.simple_stats.len() {
            let rule_stat = self.simple_stats[k];
            let _ = self.potential(k, exp_fp_over_err, &mut ruleset_stat, &rule_stat, check_err);
        }

        Self::data_dl(
            exp_fp_over_err,
            ruleset_stat[0],
            ruleset_stat[1],
            ruleset_stat[4],
            ruleset_stat[5],
        )
    }

    /// Minimum data description length of the ruleset with rule `index`
    /// deleted: the rules after it are recounted on the data the deleted rule
    /// would have seen, then hypothetical deletions are propagated through
    /// them.
    pub fn min_data_dl_if_deleted(
        &self,
        index: usize,
        exp_fp_over_err: f64,
        check_err: bool,
    ) -> f64 {
        let mut ruleset_stat = [0.0; 6];
        let more = self.ruleset.len() - 1 - index;

        // The rules before `index` keep their counted statistics.
        for stats in &self.simple_stats[..index] {
            ruleset_stat[0] += stats[0];
            ruleset_stat[2] += stats[2];
            ruleset_stat[4] += stats[4]
        }

        // Recount the rules after `index` on the deleted rule's data.
        let mut index_plus: Vec<SimpleStats> = Vec::with_capacity(more);
        let mut data = if index == 0 {
            self.data.clone()
        } else {
            self.filtered[index - 1].1.clone()
        };
        for j in index + 1..self.ruleset.len() {
            let (stats, _, split) = self.compute_simple_stats(j, &data);
            ruleset_stat[0] += stats[0];
            ruleset_stat[2] += stats[2];
            ruleset_stat[4] += stats[4];
            index_plus.push(stats);
            data = split.1
        }

        // Uncovered-side statistics.
        if let Some(last) = index_plus.last() {
            ruleset_stat[1] = last[1];
            ruleset_stat[3] = last[3];
            ruleset_stat[5] = last[5]
        } else if index > 0 {
            ruleset_stat[1] = self.simple_stats[index - 1][1];
            ruleset_stat[3] = self.simple_stats[index - 1][3];
            ruleset_stat[5] = self.simple_stats[index - 1][5]
        } else {
            // Deleting the only rule: everything is uncovered.
            ruleset_stat[1] = self.simple_stats[0][0] + self.simple_stats[0][1];
            ruleset_stat[3] = self.simple_stats[0][3] + self.simple_stats[0][4];
            ruleset_stat[5] = self.simple_stats[0][5] + self.simple_stats[0][2]
        }

        for (k, rule_stat) in index_plus.iter().enumerate() {
            let _ = self.potential(
                index + 1 + k,
                exp_fp_over_err,
                &mut ruleset_stat,
                rule_stat,
                check_err,
            );
        }

        Self::data_dl(
            exp_fp_over_err,
            ruleset_stat[0],
            ruleset_stat[1],
            ruleset_stat[4],
            ruleset_stat[5],
        )
    }

    /// Marginal description-length cost of keeping rule `index`: its theory
    /// bits plus the data bits with it, minus the data bits without it. A
    /// non-negative value means deleting the rule does not hurt.
    pub fn relative_dl(&self, index: usize, exp_fp_over_err: f64, check_err: bool) -> f64 {
        self.min_data_dl_if_exists(index, exp_fp_over_err, check_err) + self.theory_dl(index)
            - self.min_data_dl_if_deleted(index, exp_fp_over_err, check_err)
    }

    /// Total number of possible conditions over the attributes of `data`: the
    /// domain size for a discrete attribute, twice the distinct-value count
    /// for a continuous one. The class attribute is not counted.
    pub fn num_all_conditions(data: &Instances) -> f64 {
        let mut total = 0.0;
        for attr in data.attrs().iter().skip(1) {
            total += match attr {
                Attribute::Discrete { domain, .. } => domain.len() as f64,
                Attribute::Continuous { .. } => {
                    2.0 * data.num_distinct_values(attr.index()) as f64
                }
            }
        }
        total
    }

    /// Copy of `data` without the instances covered by the rules after
    /// `index`.
    pub fn rm_covered_by_successives(data: &Instances, rules: &[Rule], index: usize) -> Instances {
        let mut out = data.empty_like();
        for i in 0..data.num_instances() {
            let covered = rules[index + 1..].iter().any(|rule| rule.covers(data, i));
            if !covered {
                out.push_from(data, i)
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NumKind;
    use crate::rule::{Antecedent, DiscreteAntd};

    fn toy() -> Instances {
        let mut data = Instances::new(vec![
            Attribute::discrete("class", vec!["neg".into(), "pos".into()]),
            Attribute::discrete("flag", vec!["off".into(), "on".into()]),
            Attribute::continuous("x", NumKind::Float),
        ])
        .unwrap();
        for (cls, flag, x) in [
            (1., 1., 1.0),
            (1., 1., 2.0),
            (0., 0., 3.0),
            (0., 0., 4.0),
            (0., 1., 5.0),
        ] {
            data.push(vec![Some(cls), Some(flag), Some(x)]).unwrap()
        }
        data
    }

    fn flag_rule(data: &Instances, cls: usize) -> Rule {
        Rule::with_antecedents(
            cls.into(),
            vec![Antecedent::Discrete(DiscreteAntd::with_value(
                data.attr(1.into()).clone(),
                1,
                false,
            ))],
        )
    }

    #[test]
    fn subset_dl_boundaries() {
        let (t, p) = (17.0, 0.3);
        assert_eq!(RuleStats::subset_dl(t, 0.0, p), -t * (1.0f64 - p).log2());
        assert_eq!(RuleStats::subset_dl(t, t, p), -t * p.log2());
        // p = 0 contributes nothing on the subset side
        assert_eq!(RuleStats::subset_dl(t, 0.0, 0.0), 0.0)
    }

    #[test]
    fn data_dl_of_empty_cover_is_the_default_dl() {
        // coding 5 instances, 2 of them positive, with an empty ruleset
        let dl = RuleStats::data_dl(0.4, 0.0, 5.0, 0.0, 2.0);
        assert!(dl.is_finite());
        assert!(dl > 0.0)
    }

    #[test]
    fn simple_stats_track_the_confusion_matrix() {
        let data = toy();
        let mut stats = RuleStats::new(data.clone(), RuleStats::num_all_conditions(&data));
        stats.add_and_update(&flag_rule(&data, 1));

        let rst = stats.simple_stats(0);
        assert_eq!(rst[0], 3.0); // covers flag=on
        assert_eq!(rst[1], 2.0);
        assert_eq!(rst[2], 2.0); // both positives
        assert_eq!(rst[3], 2.0);
        assert_eq!(rst[4], 1.0); // the flag=on negative
        assert_eq!(rst[5], 0.0);
        assert_eq!(stats.distribution(0)[1.into()], 2.0);
        assert_eq!(stats.distribution(0)[0.into()], 1.0)
    }

    #[test]
    fn filtered_chain_is_derived_from_the_previous_uncovered() {
        let data = toy();
        let mut stats = RuleStats::new(data.clone(), RuleStats::num_all_conditions(&data));
        stats.add_and_update(&flag_rule(&data, 1));
        stats.add_and_update(&Rule::new(0.into()));

        let first_uncovered = &stats.filtered(0).1;
        assert_eq!(first_uncovered.num_instances(), 2);
        // the default rule covers everything the first rule left
        assert_eq!(stats.filtered(1).0, *first_uncovered);
        assert_eq!(stats.filtered(1).1.num_instances(), 0)
    }

    #[test]
    fn push_and_pop_stay_in_lock_step() {
        let data = toy();
        let mut stats = RuleStats::new(data.clone(), RuleStats::num_all_conditions(&data));
        stats.add_and_update(&flag_rule(&data, 1));
        stats.add_and_update(&Rule::new(0.into()));
        stats.remove_last();
        assert_eq!(stats.ruleset_size(), 1);
        stats.remove_last();
        assert_eq!(stats.ruleset_size(), 0)
    }

    #[test]
    fn count_data_matches_incremental_updates() {
        let data = toy();
        let conds = RuleStats::num_all_conditions(&data);
        let rule = flag_rule(&data, 1);

        let mut incremental = RuleStats::new(data.clone(), conds);
        incremental.add_and_update(&rule);

        let mut batch = RuleStats::with_ruleset(data, vec![rule], conds);
        batch.count_data();

        assert_eq!(incremental.simple_stats(0), batch.simple_stats(0))
    }

    #[test]
    fn theory_dl_of_default_rule_is_free() {
        let data = toy();
        let mut stats = RuleStats::new(data.clone(), RuleStats::num_all_conditions(&data));
        stats.add_and_update(&Rule::new(0.into()));
        assert_eq!(stats.theory_dl(0), 0.0)
    }

    #[test]
    fn num_all_conditions_counts_both_directions() {
        let data = toy();
        // flag has 2 values; x has 5 distinct values, each a <= and a >= test
        assert_eq!(RuleStats::num_all_conditions(&data), 2.0 + 2.0 * 5.0)
    }

    #[test]
    fn relative_dl_rewards_a_perfect_rule() {
        let mut data = Instances::new(vec![
            Attribute::discrete("class", vec!["neg".into(), "pos".into()]),
            Attribute::discrete("flag", vec!["off".into(), "on".into()]),
        ])
        .unwrap();
        for i in 0..10 {
            let cls = if i < 5 { 1. } else { 0. };
            data.push(vec![Some(cls), Some(cls)]).unwrap()
        }
        let mut stats = RuleStats::new(data.clone(), RuleStats::num_all_conditions(&data));
        stats.add_and_update(&flag_rule(&data, 1));
        // keeping a perfect rule must be cheaper than deleting it
        assert!(stats.relative_dl(0, 0.5, true) < 0.0)
    }

    #[test]
    fn relative_dl_punishes_a_noisy_rule() {
        let data = toy();
        let mut stats = RuleStats::new(data.clone(), RuleStats::num_all_conditions(&data));
        stats.add_and_update(&flag_rule(&data, 1));
        // one covered instance out of three is wrong: the error bits plus the
        // theory bits outweigh what the rule saves
        assert!(stats.relative_dl(0, 0.4, true) > 0.0)
    }

    #[test]
    fn rm_covered_by_successives_keeps_the_rest() {
        let data = toy();
        let rules = vec![Rule::new(1.into()), flag_rule(&data, 1)];
        let rest = RuleStats::rm_covered_by_successives(&data, &rules, 0);
        assert_eq!(rest.num_instances(), 2)
    }
}
