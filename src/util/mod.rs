//! Utilities

pub mod random;
