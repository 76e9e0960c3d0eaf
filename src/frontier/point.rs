//! Operating points: one cut per decay mode plus the resulting rates.

use std::cmp::Ordering;

use crate::domain::{PointRecord, Totals};
use crate::efficiency::DecayModeStats;
use crate::error::CurveError;

#[derive(Debug, Clone, PartialEq)]
pub struct OperatingPoint {
    cuts: Vec<f64>,
    efficiency: f64,
    fake_rate: f64,
}

impl OperatingPoint {
    /// Score a cut vector against the per-mode statistics (same order).
    pub fn new(cuts: Vec<f64>, stats: &[DecayModeStats], totals: &Totals) -> Result<Self, CurveError> {
        if cuts.len() != stats.len() {
            return Err(CurveError::CutCountMismatch {
                expected: stats.len(),
                got: cuts.len(),
            });
        }

        let (signal, background) = stats
            .iter()
            .zip(&cuts)
            .fold((totals.signal_prepass, totals.background_prepass), |(s, b), (dm, &cut)| {
                (s + dm.signal_passing(cut), b + dm.background_passing(cut))
            });

        Self::from_rates(
            cuts,
            signal / totals.signal_entries,
            background / totals.background_entries,
        )
    }

    /// Build a point whose rates were computed elsewhere.
    pub fn from_rates(cuts: Vec<f64>, efficiency: f64, fake_rate: f64) -> Result<Self, CurveError> {
        if !(efficiency.is_finite() && fake_rate.is_finite()) {
            return Err(CurveError::NonFiniteRate { efficiency, fake_rate });
        }
        Ok(Self {
            cuts,
            efficiency,
            fake_rate,
        })
    }

    pub fn cuts(&self) -> &[f64] {
        &self.cuts
    }

    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }

    pub fn fake_rate(&self) -> f64 {
        self.fake_rate
    }

    /// `self` is at least as good as `other` on both axes.
    pub fn dominates(&self, other: &OperatingPoint) -> bool {
        self.fake_rate <= other.fake_rate && self.efficiency >= other.efficiency
    }

    pub fn rescaled_cuts(&self, stats: &[DecayModeStats]) -> Result<Vec<f64>, CurveError> {
        self.check_len(stats)?;
        stats.iter().zip(&self.cuts).map(|(dm, &cut)| dm.rescale(cut)).collect()
    }

    /// Rescaled cuts mapped back onto the per-mode prior mix.
    ///
    /// A network trained on balanced samples outputs `r`; with signal/background
    /// fractions `sf`/`bf` the corresponding output is `sf / (sf + (1/r - 1) * bf)`.
    pub fn normalized_outputs(&self, stats: &[DecayModeStats]) -> Result<Vec<f64>, CurveError> {
        let rescaled = self.rescaled_cuts(stats)?;
        Ok(stats
            .iter()
            .zip(rescaled)
            .map(|(dm, r)| {
                if r <= 0.0 {
                    return 0.0;
                }
                let sf = dm.signal_fraction();
                let denom = sf + (1.0 / r - 1.0) * dm.background_fraction();
                if denom > 0.0 { sf / denom } else { 0.0 }
            })
            .collect())
    }

    fn check_len(&self, stats: &[DecayModeStats]) -> Result<(), CurveError> {
        if self.cuts.len() != stats.len() {
            return Err(CurveError::CutCountMismatch {
                expected: stats.len(),
                got: self.cuts.len(),
            });
        }
        Ok(())
    }
}

impl From<&OperatingPoint> for PointRecord {
    fn from(p: &OperatingPoint) -> Self {
        PointRecord {
            cuts: p.cuts.clone(),
            efficiency: p.efficiency,
            fake_rate: p.fake_rate,
        }
    }
}

impl TryFrom<PointRecord> for OperatingPoint {
    type Error = CurveError;

    fn try_from(r: PointRecord) -> Result<Self, Self::Error> {
        OperatingPoint::from_rates(r.cuts, r.efficiency, r.fake_rate)
    }
}

/// Frontier order: fake rate ascending, ties by efficiency descending.
///
/// A candidate lands after every point that is ordered at or before it, so
/// the point just before the insertion slot is the best one that could
/// dominate it.
pub fn by_fake_rate(a: &OperatingPoint, b: &OperatingPoint) -> Ordering {
    a.fake_rate
        .total_cmp(&b.fake_rate)
        .then_with(|| b.efficiency.total_cmp(&a.efficiency))
}
