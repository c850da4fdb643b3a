//! Error types for the Recall protocol layer.

mod memory;

pub use memory::*;
