//! Shared helpers for unit tests.

mod factories;

pub use factories::*;
