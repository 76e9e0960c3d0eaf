//! Input/output helpers.
//!
//! - histogram CSV ingest + export (`histograms`)
//! - frontier CSV export (`export`)
//! - frontier JSON read/write (`frontier`)

pub mod export;
pub mod frontier;
pub mod histograms;

pub use export::*;
pub use frontier::*;
pub use histograms::*;
