//! Reporting utilities: working points and formatted terminal output.

pub mod format;

pub use format::*;

use crate::error::CurveError;
use crate::frontier::{OperatingPoint, ParetoFrontier};

/// A fake-rate target resolved against the frontier.
#[derive(Debug, Clone)]
pub struct WorkingPoint {
    pub target_fake_rate: f64,
    /// Loosest frontier point inside the target, if any point is.
    pub point: Option<OperatingPoint>,
    /// Efficiency interpolated along the frontier at the target.
    pub interpolated_efficiency: f64,
}

/// Resolve each target; targets are reported in ascending order.
pub fn select_working_points(frontier: &ParetoFrontier, targets: &[f64]) -> Result<Vec<WorkingPoint>, CurveError> {
    let mut targets = targets.to_vec();
    targets.sort_by(f64::total_cmp);
    targets.dedup();

    targets
        .into_iter()
        .map(|target| {
            Ok(WorkingPoint {
                target_fake_rate: target,
                point: frontier.loosest_within(target)?.cloned(),
                interpolated_efficiency: frontier.efficiency_at(target)?,
            })
        })
        .collect()
}
