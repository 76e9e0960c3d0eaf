//! Input data sources other than histogram files.

pub mod sample;

pub use sample::*;
