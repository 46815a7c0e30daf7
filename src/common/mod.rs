//! Base types, wrappers and configuration.
//!
//! This module is the crate's prelude: everything here is re-exported where
//! the rest of the code does `use crate::common::*`.

pub use std::fmt;

pub use rand::{Rng, SeedableRng};
pub use rand_xorshift::XorShiftRng;

pub use crate::errors::*;

#[macro_use]
pub mod macros;
pub mod config;
pub mod wrappers;

pub use self::config::RipConf;
pub use self::wrappers::*;
