//! Shared scan pipeline.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! histograms (CSV or synthetic) -> totals -> per-mode stats -> cut scan -> working points
//!
//! The CLI handlers then only deal with presentation and exports.

use tracing::{debug, info, warn};

use crate::data::{ModeSample, generate_sample};
use crate::domain::{ScanConfig, Totals};
use crate::efficiency::DecayModeStats;
use crate::error::AppError;
use crate::frontier::{ScanOptions, ScanOutput, scan};
use crate::io::{RowError, load_histograms};
use crate::report::{WorkingPoint, select_working_points};

/// All computed outputs of a single `tanc scan` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Where the histograms came from, for the report header.
    pub source: String,
    pub totals: Totals,
    pub stats: Vec<DecayModeStats>,
    pub scan: ScanOutput,
    pub working_points: Vec<WorkingPoint>,
    pub row_errors: Vec<RowError>,
}

/// Execute the full scan pipeline and return the computed outputs.
pub fn run_scan(config: &ScanConfig) -> Result<RunOutput, AppError> {
    // 1) Histograms.
    let (source, samples, row_errors) = match &config.histograms {
        Some(path) => {
            let loaded = load_histograms(path, config.binning)?;
            info!(path = %path.display(), rows = loaded.rows_read, modes = loaded.modes.len(), "loaded histograms");
            if !loaded.row_errors.is_empty() {
                warn!(skipped = loaded.row_errors.len(), "skipped invalid histogram rows");
            }
            (path.display().to_string(), loaded.modes, loaded.row_errors)
        }
        None => {
            let samples = generate_sample(&config.synth, config.binning)?;
            info!(modes = samples.len(), seed = config.synth.seed, "generated synthetic histograms");
            (format!("synthetic (seed {})", config.synth.seed), samples, Vec::new())
        }
    };

    run_scan_with_samples(config, source, samples, row_errors)
}

/// Execute the pipeline on histograms that are already in memory.
pub fn run_scan_with_samples(
    config: &ScanConfig,
    source: String,
    samples: Vec<ModeSample>,
    row_errors: Vec<RowError>,
) -> Result<RunOutput, AppError> {
    if samples.is_empty() {
        return Err(AppError::new(3, "No decay-mode categories to scan."));
    }

    // 2) Normalization: all entries plus prepass, unless overridden.
    let totals = resolve_totals(config, &samples)?;
    debug!(?totals, "resolved totals");

    // 3) Per-mode statistics.
    let mut stats = Vec::with_capacity(samples.len());
    for s in samples {
        let dm = DecayModeStats::new(s.mode, s.signal, s.background, &totals)?;
        if dm.is_zero_signal() {
            warn!(mode = dm.mode, label = %dm.label, "category has no signal entries");
        }
        debug!(
            mode = dm.mode,
            n_signal = dm.n_signal,
            n_background = dm.n_background,
            separation = dm.separation(),
            "category statistics"
        );
        stats.push(dm);
    }

    // 4) Cut scan.
    let opts = ScanOptions {
        grid_steps: config.grid_steps,
        max_candidates: config.max_candidates,
        fast_path: config.fast_path,
        parallel: config.parallel,
    };
    let scan = scan(&stats, &totals, &opts)?;
    info!(
        points = scan.frontier.len(),
        accepted = scan.frontier.counters().accepted,
        "frontier built"
    );

    // 5) Working points.
    let working_points = select_working_points(&scan.frontier, &config.working_points)?;

    Ok(RunOutput {
        source,
        totals,
        stats,
        scan,
        working_points,
        row_errors,
    })
}

fn resolve_totals(config: &ScanConfig, samples: &[ModeSample]) -> Result<Totals, AppError> {
    let accumulated = Totals::accumulate(
        samples.iter().map(|s| (&s.signal, &s.background)),
        config.prepass,
    )
    .map_err(|e| AppError::new(3, format!("Not enough entries to normalize: {e}")))?;

    if config.total_signal.is_none() && config.total_background.is_none() {
        return Ok(accumulated);
    }
    Ok(Totals::new(
        config.total_signal.unwrap_or(accumulated.signal_entries),
        config.total_background.unwrap_or(accumulated.background_entries),
        config.prepass,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Binning, FastPath, Prepass, SynthConfig};

    fn config() -> ScanConfig {
        ScanConfig {
            histograms: None,
            binning: Binning::new(60, -3.0, 3.0).unwrap(),
            prepass: Prepass::default(),
            total_signal: None,
            total_background: None,
            grid_steps: 5,
            max_candidates: 10_000,
            fast_path: FastPath::Extremes,
            parallel: true,
            working_points: vec![0.01, 0.1],
            export_csv: None,
            export_json: None,
            synth: SynthConfig {
                modes: vec![0, 1, 10],
                signal_per_mode: 500,
                background_per_mode: 2_000,
                seed: 7,
            },
        }
    }

    #[test]
    fn synthetic_run_produces_frontier_and_working_points() {
        let run = run_scan(&config()).unwrap();
        assert_eq!(run.stats.len(), 3);
        assert_eq!(run.scan.candidates, 125);
        assert!(!run.scan.frontier.is_empty());
        assert_eq!(run.working_points.len(), 2);
        assert_eq!(run.totals.signal_entries, 1_500.0);
        assert_eq!(run.totals.background_entries, 6_000.0);
        assert!(run.source.starts_with("synthetic"));
    }

    #[test]
    fn totals_can_be_overridden() {
        let mut cfg = config();
        cfg.total_signal = Some(3_000.0);
        let run = run_scan(&cfg).unwrap();
        assert_eq!(run.totals.signal_entries, 3_000.0);
        assert_eq!(run.totals.background_entries, 6_000.0);
        // Half of the signal is outside the categories.
        let top = run.scan.frontier.points().last().unwrap();
        assert!(top.efficiency() <= 0.5 + 1e-12);
    }

    #[test]
    fn no_categories_is_insufficient_data() {
        let err = run_scan_with_samples(&config(), "empty".to_string(), Vec::new(), Vec::new()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
