//! Single-attribute tests composing rules.

use crate::common::*;
use crate::data::{Attribute, Instances};

/// Statistics snapshot of an antecedent, filled by the last
/// [`split_data`][Antecedent::split_data] call on it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AntdStats {
    /// Maximum information gain achieved by this test on the growing data.
    pub max_info_gain: f64,
    /// Accuracy rate of the test on the growing data.
    pub accu_rate: f64,
    /// Weight covered by the test.
    pub cover: f64,
    /// Weight covered and accurately classified.
    pub accu: f64,
}

/// Equality test on a discrete attribute.
#[derive(Clone, Debug)]
pub struct DiscreteAntd {
    /// Attribute tested.
    attr: Attribute,
    /// Domain index the instance value must equal.
    value: usize,
    /// True for a `!=` test. Growing only ever produces `=` tests; negation
    /// comes from parsing.
    negated: bool,
    /// Last split statistics.
    stats: AntdStats,
}

impl DiscreteAntd {
    /// Fresh test on an attribute, value picked by `split_data` later.
    pub fn new(attr: Attribute) -> Self {
        DiscreteAntd {
            attr,
            value: 0,
            negated: false,
            stats: AntdStats::default(),
        }
    }

    /// Test parsed from text.
    pub fn with_value(attr: Attribute, value: usize, negated: bool) -> Self {
        DiscreteAntd {
            attr,
            value,
            negated,
            stats: AntdStats::default(),
        }
    }

    /// Domain index tested against.
    pub fn value(&self) -> usize {
        self.value
    }

    /// Statistics of the last `split_data` call.
    pub fn stats(&self) -> &AntdStats {
        &self.stats
    }

    /// True for a `!=` test.
    pub fn negated(&self) -> bool {
        self.negated
    }

    /// Splits `data` into one bag per domain value of the attribute, instances
    /// with a missing value going to no bag. Picks the bag with the highest
    /// information gain for class `cla` as this antecedent's value and records
    /// its statistics.
    pub fn split_data(
        &mut self,
        data: &Instances,
        def_ac_rt: f64,
        cla: ClsIdx,
    ) -> Option<Vec<Instances>> {
        let bag = self.attr.num_values();
        let index = self.attr.index();

        let mut split: Vec<Instances> = (0..bag).map(|_| data.empty_like()).collect();
        let mut accurate = vec![0.0; bag];
        let mut coverage = vec![0.0; bag];

        for i in 0..data.num_instances() {
            if let Some(val) = data.val(i, index) {
                let val = val as usize;
                split[val].push_from(data, i);
                let w = data.weight(i);
                coverage[val] += w;
                if data.class_of(i) == Some(cla) {
                    accurate[val] += w
                }
            }
        }

        for x in 0..bag {
            let t = coverage[x] + 1.0;
            let p = accurate[x] + 1.0;
            let info_gain = accurate[x] * ((p / t).log2() - def_ac_rt.log2());
            if info_gain > self.stats.max_info_gain {
                self.value = x;
                self.stats = AntdStats {
                    max_info_gain: info_gain,
                    accu_rate: p / t,
                    cover: coverage[x],
                    accu: accurate[x],
                }
            }
        }

        Some(split)
    }

    /// True if the value of instance `i` is present and passes the test.
    pub fn covers(&self, data: &Instances, i: usize) -> bool {
        match data.val(i, self.attr.index()) {
            None => false,
            Some(val) => ((val as usize) == self.value) != self.negated,
        }
    }
}

/// Threshold test on a continuous attribute.
#[derive(Clone, Debug)]
pub struct ContinuousAntd {
    /// Attribute tested.
    attr: Attribute,
    /// Direction: 0 covers `<= split_point`, 1 covers `>= split_point`.
    dir: usize,
    /// Threshold.
    split_point: f64,
    /// Last split statistics.
    stats: AntdStats,
}

impl ContinuousAntd {
    /// Fresh test on an attribute, threshold picked by `split_data` later.
    pub fn new(attr: Attribute) -> Self {
        ContinuousAntd {
            attr,
            dir: 0,
            split_point: f64::NAN,
            stats: AntdStats::default(),
        }
    }

    /// Test parsed from text.
    pub fn with_threshold(attr: Attribute, dir: usize, split_point: f64) -> Self {
        ContinuousAntd {
            attr,
            dir,
            split_point,
            stats: AntdStats::default(),
        }
    }

    /// Attribute tested.
    pub fn attr(&self) -> &Attribute {
        &self.attr
    }

    /// Direction of the test: 0 for `<=`, 1 for `>=`.
    pub fn dir(&self) -> usize {
        self.dir
    }

    /// Threshold of the test.
    pub fn split_point(&self) -> f64 {
        self.split_point
    }

    /// Statistics of the last `split_data` call.
    pub fn stats(&self) -> &AntdStats {
        &self.stats
    }

    /// Sorts `data` by the attribute and scans every boundary between two
    /// distinct consecutive values, keeping the side and boundary with the
    /// best information gain for class `cla`. Ties inside runs of equal
    /// values are never split. Returns the `<=` and `>` partitions of the
    /// non-missing prefix at the final split index, or `None` when the
    /// attribute is missing everywhere.
    pub fn split_data(
        &mut self,
        data: &mut Instances,
        def_ac_rt: f64,
        cla: ClsIdx,
    ) -> Option<Vec<Instances>> {
        let index = self.attr.index();

        self.stats.max_info_gain = 0.0;
        self.dir = 0;

        data.sort_by_attr(index);

        // Weighted counts of the two sides; everything starts on the second
        // (`>=`) side and migrates to the first as the boundary advances.
        let (mut fst_cover, mut fst_accu) = (0.0, 0.0);
        let (mut snd_cover, mut snd_accu) = (0.0, 0.0);

        let mut total = data.num_instances();
        for i in 0..data.num_instances() {
            if data.missing(i, index) {
                total = i;
                break;
            }
            let w = data.weight(i);
            snd_cover += w;
            if data.class_of(i) == Some(cla) {
                snd_accu += w
            }
        }
        if total == 0 {
            return None;
        }

        self.split_point = match data.val(total - 1, index) {
            Some(val) => val,
            None => return None,
        };

        let mut prev = 0;
        let mut final_split = 1;
        for split in 1..=total {
            if split < total && data.val(split, index) <= data.val(prev, index) {
                continue;
            }

            for y in prev..split {
                let w = data.weight(y);
                fst_cover += w;
                if data.class_of(y) == Some(cla) {
                    fst_accu += w
                }
            }

            let fst_accu_rate = (fst_accu + 1.0) / (fst_cover + 1.0);
            let snd_accu_rate = (snd_accu + 1.0) / (snd_cover + 1.0);
            let fst_info_gain = fst_accu * (fst_accu_rate.log2() - def_ac_rt.log2());
            let snd_info_gain = snd_accu * (snd_accu_rate.log2() - def_ac_rt.log2());

            let (is_first, info_gain, accu_rate, accu, cover) = if fst_info_gain > snd_info_gain
            {
                (true, fst_info_gain, fst_accu_rate, fst_accu, fst_cover)
            } else {
                (false, snd_info_gain, snd_accu_rate, snd_accu, snd_cover)
            };

            if info_gain > self.stats.max_info_gain {
                self.dir = if is_first { 0 } else { 1 };
                self.stats = AntdStats {
                    max_info_gain: info_gain,
                    accu_rate,
                    cover,
                    accu,
                };
                self.split_point = match data.val(prev, index) {
                    Some(val) => val,
                    None => return None,
                };
                final_split = if is_first { split } else { prev }
            }

            for y in prev..split {
                let w = data.weight(y);
                snd_cover -= w;
                if data.class_of(y) == Some(cla) {
                    snd_accu -= w
                }
            }
            prev = split
        }

        Some(vec![
            data.slice(0, final_split),
            data.slice(final_split, total - final_split),
        ])
    }

    /// True if the value of instance `i` is present and on the covered side
    /// of the threshold (non-strict).
    pub fn covers(&self, data: &Instances, i: usize) -> bool {
        match data.val(i, self.attr.index()) {
            None => false,
            Some(val) => {
                if self.dir == 0 {
                    val <= self.split_point
                } else {
                    val >= self.split_point
                }
            }
        }
    }
}

/// A single test against one attribute.
///
/// The two shapes a test can take: equality on a discrete attribute,
/// threshold on a continuous one.
#[derive(Clone, Debug)]
pub enum Antecedent {
    /// Equality test on a discrete attribute.
    Discrete(DiscreteAntd),
    /// Threshold test on a continuous attribute.
    Continuous(ContinuousAntd),
}

impl Antecedent {
    /// Fresh antecedent for an attribute, dispatching on the attribute kind.
    pub fn of_attr(attr: &Attribute) -> Self {
        if attr.is_discrete() {
            Antecedent::Discrete(DiscreteAntd::new(attr.clone()))
        } else {
            Antecedent::Continuous(ContinuousAntd::new(attr.clone()))
        }
    }

    /// Attribute tested by this antecedent.
    pub fn attr(&self) -> &Attribute {
        match self {
            Antecedent::Discrete(antd) => &antd.attr,
            Antecedent::Continuous(antd) => &antd.attr,
        }
    }

    /// Statistics of the last `split_data` call.
    pub fn stats(&self) -> &AntdStats {
        match self {
            Antecedent::Discrete(antd) => &antd.stats,
            Antecedent::Continuous(antd) => &antd.stats,
        }
    }

    /// Index of the selected bag in the last `split_data` result.
    pub fn selected(&self) -> usize {
        match self {
            Antecedent::Discrete(antd) => antd.value,
            Antecedent::Continuous(antd) => antd.dir,
        }
    }

    /// Splits `data` into bags, picking the most informative one for class
    /// `cla`; see the variants' `split_data`. `None` means the test carries
    /// no signal on this data.
    ///
    /// Continuous tests sort `data` in place before splitting.
    pub fn split_data(
        &mut self,
        data: &mut Instances,
        def_ac_rt: f64,
        cla: ClsIdx,
    ) -> Option<Vec<Instances>> {
        match self {
            Antecedent::Discrete(antd) => antd.split_data(data, def_ac_rt, cla),
            Antecedent::Continuous(antd) => antd.split_data(data, def_ac_rt, cla),
        }
    }

    /// True if instance `i` passes the test. A missing value never passes.
    pub fn covers(&self, data: &Instances, i: usize) -> bool {
        match self {
            Antecedent::Discrete(antd) => antd.covers(data, i),
            Antecedent::Continuous(antd) => antd.covers(data, i),
        }
    }
}

impl fmt::Display for Antecedent {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Antecedent::Discrete(antd) => write!(
                fmt,
                "{} {} {}",
                antd.attr.name(),
                if antd.negated { "!=" } else { "=" },
                antd.attr.repr_val(antd.value as f64)
            ),
            Antecedent::Continuous(antd) => write!(
                fmt,
                "{} {} {}",
                antd.attr.name(),
                if antd.dir == 0 { "<=" } else { ">=" },
                antd.attr.repr_val(antd.split_point)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::NumKind;

    fn weather() -> Instances {
        let mut data = Instances::new(vec![
            Attribute::discrete("play", vec!["no".into(), "yes".into()]),
            Attribute::discrete("outlook", vec!["sunny".into(), "rainy".into()]),
            Attribute::continuous("temp", NumKind::Float),
        ])
        .unwrap();
        for (play, outlook, temp) in [
            (Some(1.), Some(0.), Some(25.)),
            (Some(1.), Some(0.), Some(22.)),
            (Some(0.), Some(1.), Some(10.)),
            (Some(0.), Some(1.), Some(12.)),
            (Some(1.), None, Some(20.)),
            (Some(0.), Some(1.), None),
        ] {
            data.push(vec![play, outlook, temp]).unwrap()
        }
        data
    }

    #[test]
    fn discrete_split_excludes_missing() {
        let data = weather();
        let mut antd = DiscreteAntd::new(data.attr(1.into()).clone());
        let split = antd.split_data(&data, 0.5, 1.into()).unwrap();
        // instance 4 has a missing outlook, it lands in no bag
        let covered: usize = split.iter().map(|bag| bag.num_instances()).sum();
        assert_eq!(covered, 5);
        assert_eq!(antd.value(), 0);
        assert!(antd.stats.max_info_gain > 0.0)
    }

    #[test]
    fn discrete_covers_missing_is_false() {
        let data = weather();
        let mut antd = DiscreteAntd::new(data.attr(1.into()).clone());
        antd.split_data(&data, 0.5, 1.into());
        assert!(antd.covers(&data, 0));
        assert!(!antd.covers(&data, 2));
        assert!(!antd.covers(&data, 4))
    }

    #[test]
    fn negated_test_flips_coverage() {
        let data = weather();
        let antd = DiscreteAntd::with_value(data.attr(1.into()).clone(), 0, true);
        assert!(!antd.covers(&data, 0));
        assert!(antd.covers(&data, 2));
        // missing stays uncovered even under negation
        assert!(!antd.covers(&data, 4))
    }

    #[test]
    fn continuous_split_preserves_sorted_prefix() {
        let mut data = weather();
        let mut antd = ContinuousAntd::new(data.attr(2.into()).clone());
        let split = antd.split_data(&mut data, 0.5, 1.into()).unwrap();
        assert_eq!(split.len(), 2);
        // the two partitions are the sorted non-missing prefix, no overlap
        assert_eq!(
            split[0].num_instances() + split[1].num_instances(),
            5
        );
        let mut seen = Vec::new();
        for part in &split {
            for i in 0..part.num_instances() {
                seen.push(part.val(i, 2.into()).unwrap())
            }
        }
        let mut sorted = seen.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(seen, sorted)
    }

    #[test]
    fn continuous_all_missing_is_no_signal() {
        let mut data = Instances::new(vec![
            Attribute::discrete("class", vec!["a".into(), "b".into()]),
            Attribute::continuous("x", NumKind::Float),
        ])
        .unwrap();
        data.push(vec![Some(0.), None]).unwrap();
        data.push(vec![Some(1.), None]).unwrap();
        let mut antd = ContinuousAntd::new(data.attr(1.into()).clone());
        assert!(antd.split_data(&mut data, 0.5, 1.into()).is_none())
    }

    #[test]
    fn continuous_covers_is_non_strict() {
        let mut data = weather();
        let mut antd = ContinuousAntd::new(data.attr(2.into()).clone());
        antd.split_data(&mut data, 0.5, 0.into());
        let thr = antd.split_point();
        for i in 0..data.num_instances() {
            match data.val(i, 2.into()) {
                None => assert!(!antd.covers(&data, i)),
                Some(val) => {
                    let expected = if antd.dir() == 0 { val <= thr } else { val >= thr };
                    assert_eq!(antd.covers(&data, i), expected)
                }
            }
        }
    }
}
