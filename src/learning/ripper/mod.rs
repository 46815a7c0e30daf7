//! The RIPPER rule learner.
//!
//! Repeated Incremental Pruning to Produce Error Reduction, Cohen's optimized
//! version of IREP. Classes are handled from the least prevalent to the most
//! prevalent one; the most prevalent class is never grown explicitly and
//! becomes the trailing default rule. For each class:
//!
//! 1. *Building*: rules are grown on a grow fold and pruned on a held-out
//!    fold, until the ruleset's description length drifts too far above the
//!    best one seen, no positive example is left, or the last rule is too
//!    erroneous.
//! 2. *Optimization*: for every rule, a *replacement* (regrown from scratch)
//!    and a *revision* (regrown from the rule itself) are produced from
//!    re-randomized data, and the variant with the lowest description length
//!    wins. Residual positives left uncovered afterwards go through the
//!    building stage again.
//! 3. Rules at the tail of the ruleset whose deletion does not increase the
//!    description length are dropped.
//!
//! Training consumes randomness from a single seeded generator in a fixed
//! order (one shuffle per class bag of every stratification), so a seed fully
//! determines the resulting rule list.

use crate::common::*;
use crate::data::Instances;
use crate::rule::{Rule, RuleSet};

pub mod stats;

pub use self::stats::{RuleStats, SimpleStats};

/// The RIPPER driver.
///
/// Holds nothing but the configuration; every training call is an independent,
/// deterministic computation.
pub struct Ripper {
    conf: RipConf,
}

impl Ripper {
    /// Learner with some configuration.
    pub fn new(conf: RipConf) -> Self {
        Ripper { conf }
    }

    /// The configuration.
    pub fn conf(&self) -> &RipConf {
        &self.conf
    }

    /// Learns an ordered rule list ending in a default rule.
    ///
    /// Instances with a missing class value are dropped first. Fails on an
    /// empty dataset, a degenerate configuration, or a description length
    /// degenerating to NaN/infinity.
    pub fn fit(&self, data: &Instances) -> Res<RuleSet> {
        let conf = &self.conf;
        if conf.folds < 2 && conf.use_pruning {
            bail!(ErrorKind::Data(format!(
                "pruning requires at least 2 folds, got {}",
                conf.folds
            )))
        }

        let mut data = data.clone();
        data.remove_missing_class();
        if data.is_empty() {
            bail!(ErrorKind::Data(
                "no instance with a class value to train on".into()
            ))
        }

        let mut rng = XorShiftRng::seed_from_u64(conf.seed);
        let num_all_conds = RuleStats::num_all_conditions(&data);
        debug!("number of possible conditions: {}", num_all_conds);

        // Classes sorted by descending weight, ties keeping the class order:
        // the head is the default consequent and is never grown, the tail is
        // processed back to front, least frequent class first.
        let counts = data.class_counts();
        let mut order: Vec<ClsIdx> = (0..data.num_classes()).map(Into::into).collect();
        order.sort_by(|&a, &b| {
            counts[b]
                .partial_cmp(&counts[a])
                .unwrap_or(::std::cmp::Ordering::Equal)
        });
        let default_class = match order.first() {
            Some(cls) => *cls,
            None => bail!(ErrorKind::Data("class attribute has an empty domain".into())),
        };

        let mut ruleset: Vec<Rule> = Vec::new();
        for &cla in order[1..].iter().rev() {
            let total_weight = data.sum_of_weights();
            let class_weight = data.class_counts()[cla];
            if class_weight <= 0.0 {
                debug!("class {} is subsumed by previous rules, skipping", cla);
                continue;
            }

            // Expected false-positive rate: the class's share of the data
            // still uncovered.
            let exp_fp_rate = class_weight / total_weight;
            let def_dl = RuleStats::data_dl(exp_fp_rate, 0.0, total_weight, 0.0, class_weight);
            if !def_dl.is_finite() {
                bail!(format!(
                    "default description length of class {} is not finite",
                    cla
                ))
            }
            debug!(
                "class {}: weight {}/{}, default DL {}",
                cla, class_weight, total_weight, def_dl
            );

            let (class_rules, rest) =
                self.ruleset_for_one_class(data, cla, exp_fp_rate, def_dl, num_all_conds, &mut rng)?;
            ruleset.extend(class_rules);
            data = rest
        }

        ruleset.push(Rule::new(default_class));
        for rule in &mut ruleset {
            rule.clean_up(&data)
        }
        debug!("learned {} rule(s)", ruleset.len());

        Ok(RuleSet::new(ruleset))
    }

    /// Builds and optimizes the ruleset of one class over the uncovered pool
    /// `data`; returns the class's rules and the pool they leave uncovered.
    fn ruleset_for_one_class<R: Rng>(
        &self,
        data: Instances,
        cla: ClsIdx,
        exp_fp_rate: f64,
        def_dl: f64,
        num_all_conds: f64,
        rng: &mut R,
    ) -> Res<(Vec<Rule>, Instances)> {
        let conf = &self.conf;
        let mut ruleset: Vec<Rule> = Vec::new();

        // Building stage.
        let mut new_data = data.clone();
        let mut stop = false;
        let mut has_positive = true;
        let mut dl = def_dl;
        let mut min_dl = def_dl;
        let mut rstats: Option<RuleStats> = None;

        while !stop && has_positive {
            let mut one_rule = Rule::new(cla);
            if conf.use_pruning {
                new_data = new_data.stratify(conf.folds, rng);
                let (grow_data, prune_data) = new_data.partition(conf.folds);
                one_rule.grow(grow_data, conf.min_no);
                trace!("rule before pruning: {}", one_rule);
                one_rule.prune(prune_data, false)
            } else {
                one_rule.grow(new_data.clone(), conf.min_no)
            }
            debug!("rule found: {}", one_rule);

            let rstats =
                rstats.get_or_insert_with(|| RuleStats::new(new_data.clone(), num_all_conds));
            rstats.add_and_update(&one_rule);
            let last = rstats.ruleset_size() - 1;
            dl += rstats.relative_dl(last, exp_fp_rate, conf.check_err);
            if !dl.is_finite() {
                bail!("description length in the building stage is not finite")
            }
            if dl < min_dl {
                min_dl = dl
            }
            trace!("building stage DL {} (best {})", dl, min_dl);

            let rst = *rstats.simple_stats(last);
            stop = self.check_stop(&rst, min_dl, dl);
            if !stop {
                new_data = rstats.filtered(last).1.clone();
                has_positive = rst[5] > 0.0;
                ruleset.push(one_rule)
            } else {
                rstats.remove_last()
            }
        }

        // Optimization stage.
        if conf.use_pruning {
            for run in 0..conf.optimizations {
                debug!("optimization run #{} for class {}", run, cla);
                let mut new_data = data.clone();
                let mut final_stats = RuleStats::new(data.clone(), num_all_conds);
                let mut position = 0;
                let mut stop = false;
                let mut has_positive = true;
                let mut dl = def_dl;
                let mut min_dl = def_dl;

                while !stop && has_positive {
                    let is_residual = position >= ruleset.len();
                    new_data = new_data.stratify(conf.folds, rng);
                    let (grow_data, prune_data) = new_data.partition(conf.folds);

                    let final_rule = if is_residual {
                        // Cover residual positives with a brand new rule.
                        let mut new_rule = Rule::new(cla);
                        new_rule.grow(grow_data, conf.min_no);
                        new_rule.prune(prune_data, false);
                        trace!("residual rule: {}", new_rule);
                        new_rule
                    } else {
                        let old_rule = ruleset[position].clone();
                        let covers = (0..new_data.num_instances())
                            .any(|i| old_rule.covers(&new_data, i));
                        if !covers {
                            // Null coverage, no variant can be generated.
                            final_stats.add_and_update(&old_rule);
                            position += 1;
                            continue;
                        }

                        let mut replace = Rule::new(cla);
                        replace.grow(grow_data.clone(), conf.min_no);
                        // The pruning data loses whatever later rules cover.
                        let prune_rep = RuleStats::rm_covered_by_successives(
                            &prune_data,
                            &ruleset,
                            position,
                        );
                        replace.prune(prune_rep.clone(), true);

                        let mut revision = old_rule.clone();
                        let mut rev_grow = grow_data.empty_like();
                        for i in 0..grow_data.num_instances() {
                            if revision.covers(&grow_data, i) {
                                rev_grow.push_from(&grow_data, i)
                            }
                        }
                        revision.grow(rev_grow, conf.min_no);
                        revision.prune(prune_rep, true);

                        let prev_stats: Vec<SimpleStats> = (0..position)
                            .map(|i| *final_stats.simple_stats(i))
                            .collect();
                        let rep_dl =
                            self.variant_dl(&ruleset, position, &replace, &data, &new_data,
                                            &prev_stats, exp_fp_rate, num_all_conds)?;
                        let rev_dl =
                            self.variant_dl(&ruleset, position, &revision, &data, &new_data,
                                            &prev_stats, exp_fp_rate, num_all_conds)?;
                        let old_dl =
                            self.variant_dl(&ruleset, position, &old_rule, &data, &new_data,
                                            &prev_stats, exp_fp_rate, num_all_conds)?;
                        trace!(
                            "variants of rule #{}: replacement {}, revision {}, original {}",
                            position, rep_dl, rev_dl, old_dl
                        );

                        if old_dl <= rev_dl && old_dl <= rep_dl {
                            old_rule
                        } else if rev_dl <= rep_dl {
                            revision
                        } else {
                            replace
                        }
                    };

                    final_stats.add_and_update(&final_rule);
                    let rst = *final_stats.simple_stats(final_stats.ruleset_size() - 1);

                    let mut accepted = true;
                    if is_residual {
                        dl += final_stats.relative_dl(position, exp_fp_rate, conf.check_err);
                        if !dl.is_finite() {
                            bail!("description length in the optimization stage is not finite")
                        }
                        if dl < min_dl {
                            min_dl = dl
                        }
                        stop = self.check_stop(&rst, min_dl, dl);
                        if stop {
                            final_stats.remove_last();
                            accepted = false
                        } else {
                            ruleset.push(final_rule)
                        }
                    } else {
                        ruleset[position] = final_rule
                    }

                    if accepted {
                        new_data = final_stats
                            .filtered(final_stats.ruleset_size() - 1)
                            .1
                            .clone();
                        has_positive = rst[5] > 0.0;
                        position += 1
                    }
                }

                // Rules the run never reached cover nothing by now.
                ruleset.truncate(position)
            }
        }

        // Delete the trailing rules that do not pay for themselves.
        let mut final_stats =
            RuleStats::with_ruleset(data.clone(), ruleset.clone(), num_all_conds);
        final_stats.count_data();
        while let Some(last) = final_stats.ruleset_size().checked_sub(1) {
            if final_stats.relative_dl(last, exp_fp_rate, conf.check_err) >= 0.0 {
                debug!("dropping unworthy rule: {}", ruleset[last]);
                final_stats.remove_last();
                ruleset.pop();
            } else {
                break;
            }
        }

        let rest = if ruleset.is_empty() {
            data
        } else {
            final_stats.filtered(ruleset.len() - 1).1.clone()
        };
        debug!("{} rule(s) kept for class {}", ruleset.len(), cla);
        Ok((ruleset, rest))
    }

    /// Relative description length of a rule variant put at `position` of the
    /// ruleset, counted over the re-randomized pool.
    #[allow(clippy::too_many_arguments)]
    fn variant_dl(
        &self,
        ruleset: &[Rule],
        position: usize,
        variant: &Rule,
        data: &Instances,
        new_data: &Instances,
        prev_stats: &[SimpleStats],
        exp_fp_rate: f64,
        num_all_conds: f64,
    ) -> Res<f64> {
        let mut rules = ruleset.to_vec();
        rules[position] = variant.clone();
        let mut stats = RuleStats::with_ruleset(data.clone(), rules, num_all_conds);
        stats.count_data_from(position, new_data, prev_stats);
        let dl = stats.relative_dl(position, exp_fp_rate, self.conf.check_err);
        if !dl.is_finite() {
            bail!(format!(
                "description length of a variant of rule #{} is not finite",
                position
            ))
        }
        Ok(dl)
    }

    /// Stopping test shared by the building and optimization stages.
    fn check_stop(&self, rst: &SimpleStats, min_dl: f64, dl: f64) -> bool {
        if dl > min_dl + self.conf.max_dl_surplus {
            debug!(
                "DL surplus too large ({} > {} + {}), stopping",
                dl, min_dl, self.conf.max_dl_surplus
            );
            true
        } else if rst[2] <= 0.0 {
            debug!("rule covers no positive example, stopping");
            true
        } else if self.conf.check_err && rst[4] >= rst[2] {
            debug!("rule error rate is at least 1/2, stopping");
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Attribute;

    fn boolean_data(rows: &[(f64, f64)]) -> Instances {
        let mut data = Instances::new(vec![
            Attribute::discrete("y", vec!["no".into(), "yes".into()]),
            Attribute::discrete("x", vec!["0".into(), "1".into()]),
        ])
        .unwrap();
        for &(y, x) in rows {
            data.push(vec![Some(y), Some(x)]).unwrap()
        }
        data
    }

    #[test]
    fn fit_rejects_empty_data() {
        let data = boolean_data(&[]);
        let err = Ripper::new(RipConf::default()).fit(&data).unwrap_err();
        assert!(err.is_data())
    }

    #[test]
    fn fit_rejects_degenerate_folds() {
        let data = boolean_data(&[(0., 0.), (1., 1.)]);
        let conf = RipConf::default().with_folds(1);
        assert!(Ripper::new(conf).fit(&data).unwrap_err().is_data())
    }

    #[test]
    fn zero_weight_class_is_skipped() {
        // class `yes` never occurs: training only produces the default rule
        let data = boolean_data(&[(0., 0.), (0., 1.), (0., 0.), (0., 1.)]);
        let rules = Ripper::new(RipConf::default()).fit(&data).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.rules()[0].consequent(), 0.into());
        assert!(!rules.rules()[0].has_antds())
    }

    #[test]
    fn default_consequent_is_the_most_frequent_class() {
        let data = boolean_data(&[(1., 1.), (1., 1.), (1., 0.), (0., 0.), (0., 0.)]);
        let rules = Ripper::new(RipConf::default()).fit(&data).unwrap();
        let default = rules.rules().last().unwrap();
        assert!(!default.has_antds());
        assert_eq!(default.consequent(), 1.into())
    }
}
