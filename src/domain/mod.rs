//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - histogram inputs (`Binning`, `Histogram`)
//! - run normalization (`Totals`, `Prepass`)
//! - configuration structs (`ScanConfig`, `SynthConfig`, `FastPath`)
//! - the frontier file schema (`FrontierFile`, etc.)

pub mod types;

pub use types::*;
