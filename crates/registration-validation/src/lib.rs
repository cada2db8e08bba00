//! Registration Validation Core
//!
//! Declarative field rules expressed as ordered predicate + message pairs.
//! Rules run top to bottom and the first failing rule decides the error, so a
//! field reports exactly one message at a time in priority order.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod rule;
pub mod string;

pub use rule::{FieldRules, Rule};
pub use string::*;
