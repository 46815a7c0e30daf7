//! Dataset storage: attributes, rows and weights.

use crate::common::*;

pub mod attribute;

pub use self::attribute::{Attribute, NumKind};

/// A single cell: missing, or a number. For discrete attributes the number is
/// a domain index.
pub type Val = Option<f64>;

/// A weighted, possibly-missing-valued data table.
///
/// Attribute 0 is the class attribute and must be discrete; rows store the
/// class value first. Every derivation (slicing, splitting, stratifying)
/// produces a new owned table: derived `Instances` never share mutable state
/// with their parent.
#[derive(Clone, Debug, PartialEq)]
pub struct Instances {
    /// Attributes; position 0 is the class attribute.
    attrs: Vec<Attribute>,
    /// Rows; `rows[i][j]` is the value of attribute `j` in instance `i`.
    rows: Vec<Vec<Val>>,
    /// Per-row weights, parallel to `rows`.
    weights: Vec<f64>,
}

impl Instances {
    /// Creates an empty dataset over some attributes.
    ///
    /// Attributes are re-indexed by position. Fails if the list is empty or if
    /// its first (class) attribute is not discrete.
    pub fn new(mut attrs: Vec<Attribute>) -> Res<Self> {
        if attrs.is_empty() {
            bail!(ErrorKind::Data("dataset has no attributes".into()))
        }
        if !attrs[0].is_discrete() {
            bail!(ErrorKind::Data(format!(
                "class attribute `{}` must be discrete",
                attrs[0].name()
            )))
        }
        for (idx, attr) in attrs.iter_mut().enumerate() {
            attr.set_index(idx.into())
        }
        Ok(Instances {
            attrs,
            rows: Vec::new(),
            weights: Vec::new(),
        })
    }

    /// Empty dataset over the same attributes as `self`.
    pub fn empty_like(&self) -> Self {
        Instances {
            attrs: self.attrs.clone(),
            rows: Vec::new(),
            weights: Vec::new(),
        }
    }

    /// Pushes a row with weight 1.
    pub fn push(&mut self, row: Vec<Val>) -> Res<()> {
        self.push_weighted(row, 1.0)
    }

    /// Pushes a weighted row.
    ///
    /// Fails if the row arity does not match the attribute list, or if a
    /// discrete value falls outside its attribute's domain.
    pub fn push_weighted(&mut self, row: Vec<Val>, weight: f64) -> Res<()> {
        if row.len() != self.attrs.len() {
            bail!(ErrorKind::Data(format!(
                "row has {} values, dataset has {} attributes",
                row.len(),
                self.attrs.len()
            )))
        }
        for (attr, val) in self.attrs.iter().zip(row.iter()) {
            if let (true, Some(v)) = (attr.is_discrete(), val) {
                if *v < 0.0 || (*v as usize) >= attr.num_values() {
                    bail!(ErrorKind::Data(format!(
                        "value {} outside the domain of attribute `{}`",
                        v,
                        attr.name()
                    )))
                }
            }
        }
        self.rows.push(row);
        self.weights.push(weight);
        Ok(())
    }

    /// Copies row `i` of `other` into `self`. Both datasets must be over the
    /// same attributes.
    pub(crate) fn push_from(&mut self, other: &Instances, i: usize) {
        debug_assert_eq!(self.attrs.len(), other.attrs.len());
        self.rows.push(other.rows[i].clone());
        self.weights.push(other.weights[i])
    }

    /// Number of attributes, class attribute included.
    pub fn num_attributes(&self) -> usize {
        self.attrs.len()
    }

    /// Number of instances.
    pub fn num_instances(&self) -> usize {
        self.rows.len()
    }

    /// True if the dataset has no instances.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The attributes, class attribute first.
    pub fn attrs(&self) -> &[Attribute] {
        &self.attrs
    }

    /// An attribute by index.
    pub fn attr(&self, idx: AttrIdx) -> &Attribute {
        &self.attrs[idx.get()]
    }

    /// An attribute by exact name match.
    pub fn attr_by_name(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|attr| attr.name() == name)
    }

    /// The class attribute.
    pub fn class_attr(&self) -> &Attribute {
        &self.attrs[0]
    }

    /// Number of classes.
    pub fn num_classes(&self) -> usize {
        self.class_attr().num_values()
    }

    /// Value of attribute `attr` in instance `i`.
    pub fn val(&self, i: usize, attr: AttrIdx) -> Val {
        self.rows[i][attr.get()]
    }

    /// True if attribute `attr` is missing in instance `i`.
    pub fn missing(&self, i: usize, attr: AttrIdx) -> bool {
        self.val(i, attr).is_none()
    }

    /// Class of instance `i`, if present.
    pub fn class_of(&self, i: usize) -> Option<ClsIdx> {
        self.rows[i][0].map(|v| (v as usize).into())
    }

    /// Weight of instance `i`.
    pub fn weight(&self, i: usize) -> f64 {
        self.weights[i]
    }

    /// Sum of all instance weights.
    pub fn sum_of_weights(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Per-class weight mass. Instances with a missing class count for no
    /// class.
    pub fn class_counts(&self) -> ClsMap<f64> {
        let mut counts = ClsMap::of_elems(0.0, self.num_classes());
        for i in 0..self.num_instances() {
            if let Some(cls) = self.class_of(i) {
                counts[cls] += self.weight(i)
            }
        }
        counts
    }

    /// Drops the instances whose class value is missing.
    pub fn remove_missing_class(&mut self) {
        let keep: Vec<bool> = self.rows.iter().map(|row| row[0].is_some()).collect();
        let mut row_keep = keep.iter();
        self.rows.retain(|_| *row_keep.next().unwrap_or(&false));
        let mut weight_keep = keep.iter();
        self.weights.retain(|_| *weight_keep.next().unwrap_or(&false))
    }

    /// Copy of `len` rows starting at `from`.
    pub fn slice(&self, from: usize, len: usize) -> Self {
        let mut out = self.empty_like();
        for i in from..from + len {
            out.push_from(self, i)
        }
        out
    }

    /// Stable sort of the instances by the value of an attribute, ascending,
    /// missing values last.
    pub fn sort_by_attr(&mut self, attr: AttrIdx) {
        let mut order: Vec<usize> = (0..self.rows.len()).collect();
        order.sort_by(|&a, &b| {
            match (self.rows[a][attr.get()], self.rows[b][attr.get()]) {
                (None, None) => ::std::cmp::Ordering::Equal,
                (None, Some(_)) => ::std::cmp::Ordering::Greater,
                (Some(_), None) => ::std::cmp::Ordering::Less,
                (Some(x), Some(y)) => {
                    x.partial_cmp(&y).unwrap_or(::std::cmp::Ordering::Equal)
                }
            }
        });
        let rows = order.iter().map(|&i| self.rows[i].clone()).collect();
        let weights = order.iter().map(|&i| self.weights[i]).collect();
        self.rows = rows;
        self.weights = weights
    }

    /// Fisher-Yates shuffle of the instances.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        for j in (1..self.rows.len()).rev() {
            let k = rng.gen_range(0..=j);
            self.rows.swap(j, k);
            self.weights.swap(j, k)
        }
    }

    /// Stratified copy of the dataset.
    ///
    /// Instances are bagged per class (in class order), each bag is shuffled,
    /// and the bags are reassembled round-robin over `folds` folds so that
    /// every fold-sized stride preserves the class proportions. Instances with
    /// a missing class are dropped.
    pub fn stratify<R: Rng>(&self, folds: usize, rng: &mut R) -> Self {
        let mut bags: Vec<Instances> =
            (0..self.num_classes()).map(|_| self.empty_like()).collect();
        if bags.is_empty() {
            return self.empty_like();
        }
        for i in 0..self.num_instances() {
            if let Some(cls) = self.class_of(i) {
                bags[cls.get()].push_from(self, i)
            }
        }
        for bag in &mut bags {
            bag.shuffle(rng)
        }

        let mut out = self.empty_like();
        for k in 0..folds {
            let mut offset = k;
            let mut bag = 0;
            'fold: loop {
                while offset >= bags[bag].num_instances() {
                    offset -= bags[bag].num_instances();
                    bag += 1;
                    if bag >= bags.len() {
                        break 'fold;
                    }
                }
                out.push_from(&bags[bag], offset);
                offset += folds
            }
        }
        out
    }

    /// Splits into a grow and a prune part: the first `(folds - 1) / folds` of
    /// the instances against the rest.
    pub fn partition(&self, folds: usize) -> (Self, Self) {
        let splits = self.num_instances() * (folds - 1) / folds;
        (
            self.slice(0, splits),
            self.slice(splits, self.num_instances() - splits),
        )
    }

    /// Number of distinct non-missing values of an attribute.
    pub fn num_distinct_values(&self, attr: AttrIdx) -> usize {
        let mut vals: Vec<f64> = (0..self.num_instances())
            .filter_map(|i| self.val(i, attr))
            .collect();
        vals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(::std::cmp::Ordering::Equal));
        vals.dedup();
        vals.len()
    }
}

impl fmt::Display for Instances {
    /// Renders the table, one instance per line, for debugging.
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for (i, attr) in self.attrs.iter().enumerate() {
            if i > 0 {
                write!(fmt, ", ")?
            }
            write!(fmt, "{}", attr)?
        }
        writeln!(fmt)?;
        for i in 0..self.num_instances() {
            for (j, val) in self.rows[i].iter().enumerate() {
                if j > 0 {
                    write!(fmt, ", ")?
                }
                match val {
                    None => write!(fmt, "?")?,
                    Some(v) => write!(fmt, "{}", self.attrs[j].repr_val(*v))?,
                }
            }
            writeln!(fmt, " ({})", self.weights[i])?
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Instances {
        let mut data = Instances::new(vec![
            Attribute::discrete("class", vec!["a".into(), "b".into()]),
            Attribute::continuous("x", NumKind::Float),
        ])
        .unwrap();
        for (cls, x) in [
            (Some(0.), Some(3.)),
            (Some(1.), None),
            (Some(0.), Some(1.)),
            (Some(1.), Some(2.)),
        ] {
            data.push(vec![cls, x]).unwrap()
        }
        data
    }

    #[test]
    fn class_attr_must_be_discrete() {
        let res = Instances::new(vec![Attribute::continuous("y", NumKind::Float)]);
        assert!(res.unwrap_err().is_data())
    }

    #[test]
    fn row_arity_checked() {
        let mut data = toy();
        assert!(data.push(vec![Some(0.)]).unwrap_err().is_data())
    }

    #[test]
    fn domain_checked() {
        let mut data = toy();
        assert!(data.push(vec![Some(7.), None]).unwrap_err().is_data())
    }

    #[test]
    fn sort_puts_missing_last() {
        let mut data = toy();
        data.sort_by_attr(1.into());
        assert_eq!(data.val(0, 1.into()), Some(1.));
        assert_eq!(data.val(1, 1.into()), Some(2.));
        assert_eq!(data.val(2, 1.into()), Some(3.));
        assert_eq!(data.val(3, 1.into()), None)
    }

    #[test]
    fn counts_and_weights() {
        let data = toy();
        assert_eq!(data.sum_of_weights(), 4.0);
        let counts = data.class_counts();
        assert_eq!(counts[0.into()], 2.0);
        assert_eq!(counts[1.into()], 2.0)
    }

    #[test]
    fn missing_class_rows_dropped() {
        let mut data = toy();
        data.push(vec![None, Some(0.)]).unwrap();
        data.remove_missing_class();
        assert_eq!(data.num_instances(), 4)
    }

    #[test]
    fn partition_is_a_split() {
        let data = toy();
        let (grow, prune) = data.partition(4);
        assert_eq!(grow.num_instances(), 3);
        assert_eq!(prune.num_instances(), 1)
    }

    #[test]
    fn distinct_values_skip_missing() {
        let data = toy();
        assert_eq!(data.num_distinct_values(1.into()), 3)
    }
}
