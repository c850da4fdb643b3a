//! Common types used across the Recall crates.

mod common;

pub use common::*;
