//! Export the frontier to CSV.
//!
//! One row per operating point, ascending in fake rate. Each decay mode
//! contributes three columns: the raw cut, the cut rescaled to the occupied
//! range, and the equivalent network output under the category's prior mix.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::efficiency::DecayModeStats;
use crate::error::AppError;
use crate::frontier::ParetoFrontier;

pub fn write_frontier_csv(
    path: &Path,
    frontier: &ParetoFrontier,
    stats: &[DecayModeStats],
) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(file, "{}", header(stats))
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (i, p) in frontier.points().iter().enumerate() {
        let rescaled = p.rescaled_cuts(stats)?;
        let normalized = p.normalized_outputs(stats)?;

        let mut row = format!("{i},{:.10},{:.10}", p.efficiency(), p.fake_rate());
        for v in p.cuts().iter().chain(&rescaled).chain(&normalized) {
            row.push_str(&format!(",{v:.6}"));
        }
        writeln!(file, "{row}").map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

fn header(stats: &[DecayModeStats]) -> String {
    let mut cols = vec!["index".to_string(), "efficiency".to_string(), "fake_rate".to_string()];
    for prefix in ["cut", "rescaled", "norm"] {
        cols.extend(stats.iter().map(|dm| format!("{prefix}_{}", dm.mode)));
    }
    cols.join(",")
}
