//! `tanc-curves` library crate.
//!
//! The binary (`tanc`) is a thin wrapper around this library so that:
//!
//! - the frontier and efficiency code is testable without spawning processes
//! - the scan can be driven from other tools that already hold histograms

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod efficiency;
pub mod error;
pub mod frontier;
pub mod io;
pub mod logging;
pub mod report;
