//! Survival functions built from score histograms.
//!
//! `eval(x)` is the fraction of entries with a classifier output at or above
//! `x`. The curve is sampled at every bin edge and interpolated linearly in
//! between, which is what a uniform density inside each bin implies.

use crate::domain::{Binning, Histogram};
use crate::error::CurveError;

/// Span of the classifier output that actually holds entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupiedRange {
    pub min: f64,
    pub max: f64,
    /// No regular bin had content; `min`/`max` then cover the whole domain.
    pub empty: bool,
}

impl OccupiedRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max, empty: false }
    }

    fn whole_domain(binning: &Binning) -> Self {
        Self {
            min: binning.xlow,
            max: binning.xhigh,
            empty: true,
        }
    }

    /// Smallest range covering both; empty ranges do not contribute.
    pub fn merge(self, other: OccupiedRange) -> OccupiedRange {
        match (self.empty, other.empty) {
            (true, _) => other,
            (false, true) => self,
            (false, false) => OccupiedRange::new(self.min.min(other.min), self.max.max(other.max)),
        }
    }

    /// Map `cut` into `[0, 1]` across this range.
    pub fn rescale(&self, cut: f64) -> Result<f64, CurveError> {
        let span = self.max - self.min;
        if !(span.is_finite() && span > 0.0) {
            return Err(CurveError::DegenerateRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok((cut - self.min) / span)
    }
}

#[derive(Debug, Clone)]
pub struct EfficiencyCurve {
    edges: Vec<f64>,
    passing: Vec<f64>,
    occupied: OccupiedRange,
    entries: f64,
}

impl EfficiencyCurve {
    pub fn from_histogram(hist: &Histogram) -> Self {
        let binning = hist.binning;
        let entries = hist.entries();
        let n = hist.nbins();

        let mut edges = Vec::with_capacity(n + 1);
        let mut passing = Vec::with_capacity(n + 1);
        let mut below = hist.underflow;
        for k in 0..=n {
            edges.push(binning.low_edge(k));
            passing.push(survival(below, entries));
            if k < n {
                below += hist.counts[k];
            }
        }

        Self {
            edges,
            passing,
            occupied: occupied_range(hist),
            entries,
        }
    }

    /// Fraction of entries with score `>= x`.
    pub fn eval(&self, x: f64) -> f64 {
        let last = self.edges.len() - 1;
        if x.is_nan() || x <= self.edges[0] {
            return self.passing[0];
        }
        if x >= self.edges[last] {
            return self.passing[last];
        }
        // First edge strictly above x; edges[k - 1] <= x < edges[k].
        let k = self.edges.partition_point(|&e| e <= x);
        let (x0, x1) = (self.edges[k - 1], self.edges[k]);
        let (y0, y1) = (self.passing[k - 1], self.passing[k]);
        let u = (x - x0) / (x1 - x0);
        (y0 + u * (y1 - y0)).clamp(0.0, 1.0)
    }

    pub fn occupied_range(&self) -> OccupiedRange {
        self.occupied
    }

    pub fn entries(&self) -> f64 {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries <= 0.0
    }

    /// `(edge, passing fraction)` samples, ascending in edge.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.edges.iter().copied().zip(self.passing.iter().copied())
    }
}

fn survival(below: f64, entries: f64) -> f64 {
    if entries <= 0.0 {
        return 0.0;
    }
    (1.0 - below / entries).clamp(0.0, 1.0)
}

/// Low edge of the first and upper edge of the last non-empty regular bin.
pub fn occupied_range(hist: &Histogram) -> OccupiedRange {
    let first = hist.counts.iter().position(|&c| c != 0.0);
    let last = hist.counts.iter().rposition(|&c| c != 0.0);
    match (first, last) {
        (Some(lo), Some(hi)) => OccupiedRange::new(hist.binning.low_edge(lo), hist.binning.high_edge(hi)),
        _ => OccupiedRange::whole_domain(&hist.binning),
    }
}
