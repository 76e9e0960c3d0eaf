//! Per-decay-mode signal/background statistics.

use crate::domain::{Histogram, Totals, decay_mode_label};
use crate::efficiency::curve::{EfficiencyCurve, OccupiedRange};
use crate::error::CurveError;

/// Signal and background score distributions for one decay mode.
#[derive(Debug, Clone)]
pub struct DecayModeStats {
    pub mode: u32,
    pub label: String,
    pub n_signal: f64,
    pub n_background: f64,
    signal: Histogram,
    background: Histogram,
    signal_curve: EfficiencyCurve,
    background_curve: EfficiencyCurve,
    range: OccupiedRange,
    totals: Totals,
}

impl DecayModeStats {
    pub fn new(
        mode: u32,
        signal: Histogram,
        background: Histogram,
        totals: &Totals,
    ) -> Result<Self, CurveError> {
        if signal.nbins() != background.nbins() {
            return Err(CurveError::DimensionMismatch {
                signal: signal.nbins(),
                background: background.nbins(),
            });
        }

        let signal_curve = EfficiencyCurve::from_histogram(&signal);
        let background_curve = EfficiencyCurve::from_histogram(&background);
        let range = signal_curve
            .occupied_range()
            .merge(background_curve.occupied_range());

        Ok(Self {
            mode,
            label: decay_mode_label(mode),
            n_signal: signal.entries(),
            n_background: background.entries(),
            signal,
            background,
            signal_curve,
            background_curve,
            range,
            totals: *totals,
        })
    }

    pub fn signal_passing(&self, cut: f64) -> f64 {
        self.n_signal * self.signal_curve.eval(cut)
    }

    pub fn background_passing(&self, cut: f64) -> f64 {
        self.n_background * self.background_curve.eval(cut)
    }

    pub fn signal_fraction(&self) -> f64 {
        self.n_signal / self.totals.signal_entries
    }

    pub fn background_fraction(&self) -> f64 {
        self.n_background / self.totals.background_entries
    }

    pub fn totals(&self) -> &Totals {
        &self.totals
    }

    pub fn occupied_range(&self) -> OccupiedRange {
        self.range
    }

    /// No signal entries: every cut on this category is irrelevant to the efficiency.
    pub fn is_zero_signal(&self) -> bool {
        self.signal_curve.is_empty()
    }

    /// Map a raw cut into `[0, 1]` over the occupied range of both samples.
    pub fn rescale(&self, cut: f64) -> Result<f64, CurveError> {
        self.range.rescale(cut)
    }

    /// Shape separation of the two distributions.
    ///
    /// 0 for identical shapes, 1 for distributions with no overlap.
    pub fn separation(&self) -> f64 {
        let (ns, nb) = (self.n_signal, self.n_background);
        if ns <= 0.0 || nb <= 0.0 {
            return 0.0;
        }
        let mut sum = 0.0;
        for (&s, &b) in self.signal.counts.iter().zip(&self.background.counts) {
            let (s, b) = (s / ns, b / nb);
            if s + b > 0.0 {
                sum += (s - b) * (s - b) / (s + b);
            }
        }
        sum / 2.0
    }

    /// `(signal passing, background passing)` fractions at every bin edge,
    /// from the loosest cut to the tightest.
    pub fn roc_curve(&self) -> Vec<(f64, f64)> {
        self.signal_curve
            .samples()
            .zip(self.background_curve.samples())
            .map(|((_, s), (_, b))| (s, b))
            .collect()
    }

    /// `steps` evenly spaced cuts across the occupied range, endpoints included.
    pub fn cut_grid(&self, steps: usize) -> Result<Vec<f64>, CurveError> {
        if steps < 2 {
            return Err(CurveError::InvalidGrid(format!(
                "mode {} needs at least 2 grid steps, got {steps}",
                self.mode
            )));
        }
        let OccupiedRange { min, max, .. } = self.range;
        let step = (max - min) / (steps as f64 - 1.0);
        Ok((0..steps).map(|i| min + step * i as f64).collect())
    }
}
