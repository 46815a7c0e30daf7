//! Learners producing rule sets.

pub mod ripper;

pub use self::ripper::Ripper;
