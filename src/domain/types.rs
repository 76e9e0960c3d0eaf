//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while scanning cut grids
//! - exported to JSON/CSV
//! - reloaded later for working-point queries

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::CurveError;

/// Decay modes the TaNC is trained on (one network per mode).
pub const DEFAULT_DECAY_MODES: [u32; 5] = [0, 1, 2, 10, 11];

/// Fake-rate targets of the standard TaNC working points.
pub const DEFAULT_WORKING_POINTS: [f64; 4] = [0.001, 0.0025, 0.005, 0.01];

/// Fixed-width binning over the classifier output.
///
/// The efficiency curves are only as precise as this binning, so the default is fine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Binning {
    pub nbins: usize,
    pub xlow: f64,
    pub xhigh: f64,
}

impl Default for Binning {
    fn default() -> Self {
        Self {
            nbins: 3000,
            xlow: -3.0,
            xhigh: 3.0,
        }
    }
}

impl Binning {
    pub fn new(nbins: usize, xlow: f64, xhigh: f64) -> Result<Self, CurveError> {
        if nbins == 0 {
            return Err(CurveError::InvalidBinning("nbins must be >= 1".to_string()));
        }
        if !(xlow.is_finite() && xhigh.is_finite() && xhigh > xlow) {
            return Err(CurveError::InvalidBinning(format!(
                "range [{xlow}, {xhigh}] must be finite with xhigh > xlow"
            )));
        }
        Ok(Self { nbins, xlow, xhigh })
    }

    pub fn width(&self) -> f64 {
        (self.xhigh - self.xlow) / self.nbins as f64
    }

    /// Low edge of regular bin `i` (0-based).
    pub fn low_edge(&self, i: usize) -> f64 {
        self.xlow + i as f64 * self.width()
    }

    /// Upper edge of regular bin `i` (0-based).
    pub fn high_edge(&self, i: usize) -> f64 {
        self.low_edge(i + 1)
    }

    /// Locate `x`: `Err(false)` for underflow, `Err(true)` for overflow.
    fn locate(&self, x: f64) -> Result<usize, bool> {
        if x.is_nan() || x < self.xlow {
            return Err(false);
        }
        if x >= self.xhigh {
            return Err(true);
        }
        let i = ((x - self.xlow) / self.width()) as usize;
        Ok(i.min(self.nbins - 1))
    }
}

/// A 1D frequency histogram with under/overflow.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub binning: Binning,
    pub counts: Vec<f64>,
    pub underflow: f64,
    pub overflow: f64,
}

impl Histogram {
    pub fn new(binning: Binning) -> Self {
        Self {
            binning,
            counts: vec![0.0; binning.nbins],
            underflow: 0.0,
            overflow: 0.0,
        }
    }

    pub fn fill(&mut self, x: f64, weight: f64) {
        match self.binning.locate(x) {
            Ok(i) => self.counts[i] += weight,
            Err(false) => self.underflow += weight,
            Err(true) => self.overflow += weight,
        }
    }

    /// Set the content of a ROOT-style bin index (0 underflow, `nbins + 1` overflow).
    pub fn set_bin(&mut self, bin: usize, content: f64) -> Result<(), CurveError> {
        let nbins = self.binning.nbins;
        match bin {
            0 => self.underflow = content,
            b if b <= nbins => self.counts[b - 1] = content,
            b if b == nbins + 1 => self.overflow = content,
            b => {
                return Err(CurveError::InvalidBinning(format!(
                    "bin index {b} outside 0..={}",
                    nbins + 1
                )));
            }
        }
        Ok(())
    }

    pub fn nbins(&self) -> usize {
        self.counts.len()
    }

    /// Total entries including under/overflow.
    pub fn entries(&self) -> f64 {
        self.underflow + self.overflow + self.counts.iter().sum::<f64>()
    }
}

/// Baseline counts that bypass per-category cutting.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Prepass {
    pub signal: f64,
    pub background: f64,
}

/// Normalization shared by every category and operating point of one tuning run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub signal_entries: f64,
    pub background_entries: f64,
    pub signal_prepass: f64,
    pub background_prepass: f64,
}

impl Totals {
    pub fn new(
        signal_entries: f64,
        background_entries: f64,
        prepass: Prepass,
    ) -> Result<Self, CurveError> {
        for (label, v) in [("signal entries", signal_entries), ("background entries", background_entries)] {
            if !(v.is_finite() && v > 0.0) {
                return Err(CurveError::InvalidTotals(format!("{label} must be > 0, got {v}")));
            }
        }
        for (label, v) in [("signal prepass", prepass.signal), ("background prepass", prepass.background)] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(CurveError::InvalidTotals(format!("{label} must be >= 0, got {v}")));
            }
        }
        Ok(Self {
            signal_entries,
            background_entries,
            signal_prepass: prepass.signal,
            background_prepass: prepass.background,
        })
    }

    /// Sum the category histograms plus the prepass counts.
    pub fn accumulate<'a>(
        pairs: impl IntoIterator<Item = (&'a Histogram, &'a Histogram)>,
        prepass: Prepass,
    ) -> Result<Self, CurveError> {
        let (signal, background) = pairs
            .into_iter()
            .fold((0.0, 0.0), |(s, b), (hs, hb)| (s + hs.entries(), b + hb.entries()));
        Self::new(signal + prepass.signal, background + prepass.background, prepass)
    }
}

/// Which O(1) rejection test runs before the exact frontier insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FastPath {
    /// Always take the exact path.
    Off,
    /// Reject candidates dominated by one of the two extreme points.
    ///
    /// Default because it never drops a non-dominated point; the chord test can.
    #[default]
    Extremes,
    /// `Extremes` plus the chord between the extremes.
    ///
    /// Only exact when the offered population traces a concave ROC; can drop
    /// staircase points otherwise.
    Chord,
}

/// A full scan configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub histograms: Option<PathBuf>,
    pub binning: Binning,
    pub prepass: Prepass,
    /// Overrides for the accumulated totals.
    pub total_signal: Option<f64>,
    pub total_background: Option<f64>,

    pub grid_steps: usize,
    pub max_candidates: u64,
    pub fast_path: FastPath,
    pub parallel: bool,

    pub working_points: Vec<f64>,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,

    /// Synthetic sample used when no histogram CSV is given.
    pub synth: SynthConfig,
}

/// Synthetic sample generation settings.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub modes: Vec<u32>,
    pub signal_per_mode: usize,
    pub background_per_mode: usize,
    pub seed: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            modes: DEFAULT_DECAY_MODES.to_vec(),
            signal_per_mode: 20_000,
            background_per_mode: 200_000,
            seed: 42,
        }
    }
}

/// A saved frontier file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontierFile {
    pub tool: String,
    pub generated: chrono::DateTime<chrono::Utc>,
    pub binning: Binning,
    pub totals: Totals,
    pub fast_path: FastPath,
    pub candidates: u64,
    pub categories: Vec<CategorySummary>,
    pub points: Vec<PointRecord>,
    pub efficiency_curve: CurveGrid,
    pub fake_rate_curve: CurveGrid,
}

/// Per-category diagnostics stored alongside the frontier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub mode: u32,
    pub label: String,
    pub n_signal: f64,
    pub n_background: f64,
    pub signal_fraction: f64,
    pub background_fraction: f64,
    pub separation: f64,
    pub occupied_min: f64,
    pub occupied_max: f64,
    pub empty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub cuts: Vec<f64>,
    pub efficiency: f64,
    pub fake_rate: f64,
}

/// One projection of the frontier, ascending in `x`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl From<&[(f64, f64)]> for CurveGrid {
    fn from(pairs: &[(f64, f64)]) -> Self {
        let (x, y) = pairs.iter().copied().unzip();
        Self { x, y }
    }
}

/// Human-readable label for a hadronic decay-mode index.
///
/// Indices encode `5 * (prongs - 1) + pi0s`.
pub fn decay_mode_label(mode: u32) -> String {
    let prongs = mode / 5 + 1;
    let pi0 = mode % 5;
    format!("{prongs}-prong + {pi0} pi0")
}
