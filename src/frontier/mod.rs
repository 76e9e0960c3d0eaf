//! Operating-point frontier construction.
//!
//! Responsibilities:
//!
//! - score cut vectors into operating points (`point`)
//! - maintain the Pareto frontier incrementally (`pareto`)
//! - enumerate cut grids, in parallel when asked (`scan`)

pub mod pareto;
pub mod point;
pub mod scan;

pub use pareto::*;
pub use point::*;
pub use scan::*;
