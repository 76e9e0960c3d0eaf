//! Per-decay-mode efficiency curves.
//!
//! - survival functions from score histograms (`curve`)
//! - signal/background pairs per decay mode (`stats`)

pub mod curve;
pub mod stats;

pub use curve::*;
pub use stats::*;
