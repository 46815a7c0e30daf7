//! [Ripr][ripr] is a propositional rule learner implementing [RIPPER][ripper]
//! (Repeated Incremental Pruning to Produce Error Reduction).
//!
//! The learner consumes a weighted, possibly-missing-valued [`Instances`]
//! table whose first attribute is the (discrete) class attribute, and produces
//! an ordered [`RuleSet`] ending in a default rule. Rules are grown greedily
//! by information gain, pruned on held-out data, and the number of rules is
//! governed by a two-part (theory + data) Minimum-Description-Length calculus.
//!
//! ```
//! use ripr::common::RipConf;
//! use ripr::data::{Attribute, Instances};
//!
//! let mut data = Instances::new(vec![
//!     Attribute::discrete("play", vec!["no".into(), "yes".into()]),
//!     Attribute::discrete("windy", vec!["false".into(), "true".into()]),
//! ])
//! .unwrap();
//! for (class, windy) in [(1., 0.), (1., 0.), (1., 0.), (0., 1.), (0., 1.)] {
//!     data.push(vec![Some(class), Some(windy)]).unwrap()
//! }
//!
//! let rules = ripr::learn(&data, RipConf::default()).unwrap();
//! assert_eq!(rules.predict(&data).unwrap(), vec![1.into(), 1.into(), 1.into(), 0.into(), 0.into()])
//! ```
//!
//! [ripr]: https://github.com/ripr-rs/ripr (ripr repository on github)
//! [ripper]: https://www.sciencedirect.com/science/article/pii/B9781558603776500232
//! (Fast Effective Rule Induction, Cohen 95)

#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;

pub mod errors;
#[macro_use]
pub mod common;
pub mod data;
pub mod learning;
pub mod parse;
pub mod rule;

use crate::common::*;
use crate::data::Instances;
use crate::learning::Ripper;
use crate::rule::RuleSet;

/// Trains a rule set over some data.
///
/// Convenience entry point wrapping [`Ripper::fit`]. Training is deterministic:
/// the same configuration (including its seed) and data always produce the same
/// rule list.
pub fn learn(data: &Instances, conf: RipConf) -> Res<RuleSet> {
    Ripper::new(conf).fit(data)
}
