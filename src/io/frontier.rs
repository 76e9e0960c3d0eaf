//! Read/write frontier JSON files.
//!
//! Frontier JSON is the portable result of a scan:
//! - run metadata (binning, totals, fast path, candidate count)
//! - per-category diagnostics
//! - every frontier point with its cuts
//! - both projections, precomputed for quick plotting
//!
//! The schema is defined by `domain::FrontierFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{Binning, CategorySummary, CurveGrid, FastPath, FrontierFile, PointRecord, Totals};
use crate::efficiency::DecayModeStats;
use crate::error::{AppError, CurveError};
use crate::frontier::{OperatingPoint, ParetoFrontier};

/// Run metadata stored next to the points.
#[derive(Debug, Clone, Copy)]
pub struct RunMeta {
    pub binning: Binning,
    pub totals: Totals,
    pub fast_path: FastPath,
    pub candidates: u64,
}

pub fn build_frontier_file(
    frontier: &ParetoFrontier,
    stats: &[DecayModeStats],
    meta: RunMeta,
) -> Result<FrontierFile, CurveError> {
    let efficiency_curve = CurveGrid::from(frontier.efficiency_curve()?.as_slice());
    let fake_rate_curve = CurveGrid::from(frontier.fake_rate_curve()?.as_slice());

    Ok(FrontierFile {
        tool: "tanc".to_string(),
        generated: Utc::now(),
        binning: meta.binning,
        totals: meta.totals,
        fast_path: meta.fast_path,
        candidates: meta.candidates,
        categories: stats.iter().map(category_summary).collect(),
        points: frontier.points().iter().map(PointRecord::from).collect(),
        efficiency_curve,
        fake_rate_curve,
    })
}

pub fn category_summary(dm: &DecayModeStats) -> CategorySummary {
    let range = dm.occupied_range();
    CategorySummary {
        mode: dm.mode,
        label: dm.label.clone(),
        n_signal: dm.n_signal,
        n_background: dm.n_background,
        signal_fraction: dm.signal_fraction(),
        background_fraction: dm.background_fraction(),
        separation: dm.separation(),
        occupied_min: range.min,
        occupied_max: range.max,
        empty: range.empty,
    }
}

/// Rebuild a queryable frontier from saved points.
///
/// The points are re-offered, so a hand-edited file still yields a valid frontier.
pub fn frontier_from_file(file: &FrontierFile) -> Result<ParetoFrontier, CurveError> {
    let mut frontier = ParetoFrontier::new().fast_path(FastPath::Off);
    for record in &file.points {
        frontier.offer(OperatingPoint::try_from(record.clone())?)?;
    }
    Ok(frontier)
}

pub fn write_frontier_json(path: &Path, file: &FrontierFile) -> Result<(), AppError> {
    let out = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create frontier JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(2, format!("Failed to write frontier JSON: {e}")))?;
    Ok(())
}

pub fn read_frontier_json(path: &Path) -> Result<FrontierFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open frontier JSON '{}': {e}", path.display())))?;
    let frontier: FrontierFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid frontier JSON: {e}")))?;
    Ok(frontier)
}
