//! Incremental Pareto frontier of operating points.
//!
//! Points are kept sorted by fake rate; along that order the efficiency is
//! strictly increasing, otherwise a point would be dominated by its left
//! neighbour. A new candidate is placed by binary search, rejected if its
//! left neighbour is at least as efficient, and otherwise prunes the run of
//! right neighbours it dominates.
//!
//! Before that exact path a constant-time test against the two extreme
//! points rejects most of a typical cut scan (see `FastPath`).

use std::cmp::Ordering;

use crate::domain::FastPath;
use crate::error::CurveError;
use crate::frontier::point::{OperatingPoint, by_fake_rate};

/// Orders frontier points. Must sort by fake rate ascending first.
pub type PointOrder = fn(&OperatingPoint, &OperatingPoint) -> Ordering;

/// Cached end points of the frontier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremes {
    pub min_fake_rate: f64,
    pub eff_at_min_fake_rate: f64,
    pub max_fake_rate: f64,
    pub eff_at_max_fake_rate: f64,
}

impl Extremes {
    /// Fake rate on the straight line between the extremes at efficiency `eff`.
    ///
    /// `None` while both extremes share one efficiency (single point).
    pub fn approx(&self, eff: f64) -> Option<f64> {
        let d_eff = self.eff_at_max_fake_rate - self.eff_at_min_fake_rate;
        if d_eff <= 0.0 {
            return None;
        }
        let slope = (self.max_fake_rate - self.min_fake_rate) / d_eff;
        Some(self.min_fake_rate + slope * (eff - self.eff_at_min_fake_rate))
    }

    fn dominates(&self, c: &OperatingPoint) -> bool {
        (c.fake_rate() >= self.min_fake_rate && c.efficiency() <= self.eff_at_min_fake_rate)
            || (c.fake_rate() >= self.max_fake_rate && c.efficiency() <= self.eff_at_max_fake_rate)
    }

    fn above_chord(&self, c: &OperatingPoint) -> bool {
        let (eff, fr) = (c.efficiency(), c.fake_rate());
        let inside = eff > self.eff_at_min_fake_rate
            && eff < self.eff_at_max_fake_rate
            && fr > self.min_fake_rate
            && fr < self.max_fake_rate;
        inside && self.approx(eff).is_some_and(|line| fr > line)
    }
}

/// Bookkeeping of what `offer` did, for logs and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferCounters {
    pub offered: u64,
    pub fast_rejected: u64,
    pub exact_rejected: u64,
    pub accepted: u64,
    pub pruned: u64,
}

#[derive(Debug, Clone)]
pub struct ParetoFrontier {
    points: Vec<OperatingPoint>,
    order: PointOrder,
    fast_path: FastPath,
    width: Option<usize>,
    extremes: Option<Extremes>,
    counters: OfferCounters,
}

impl Default for ParetoFrontier {
    fn default() -> Self {
        Self::new()
    }
}

impl ParetoFrontier {
    pub fn new() -> Self {
        Self::with_order(by_fake_rate)
    }

    /// Use a custom comparator.
    ///
    /// It must sort by fake rate ascending; among equal fake rates the better
    /// efficiency has to come first or dominated ties slip through.
    pub fn with_order(order: PointOrder) -> Self {
        Self {
            points: Vec::new(),
            order,
            fast_path: FastPath::default(),
            width: None,
            extremes: None,
            counters: OfferCounters::default(),
        }
    }

    pub fn fast_path(mut self, fast_path: FastPath) -> Self {
        self.fast_path = fast_path;
        self
    }

    /// Offer a candidate; `Ok(true)` when it joined the frontier.
    pub fn offer(&mut self, candidate: OperatingPoint) -> Result<bool, CurveError> {
        if let Some(expected) = self.width {
            if candidate.cuts().len() != expected {
                return Err(CurveError::CutCountMismatch {
                    expected,
                    got: candidate.cuts().len(),
                });
            }
        }
        self.counters.offered += 1;

        if self.fast_reject(&candidate) {
            self.counters.fast_rejected += 1;
            return Ok(false);
        }

        let order = self.order;
        let idx = self
            .points
            .partition_point(|p| order(p, &candidate) != Ordering::Greater);

        if idx > 0 && self.points[idx - 1].efficiency() >= candidate.efficiency() {
            self.counters.exact_rejected += 1;
            return Ok(false);
        }

        let eff = candidate.efficiency();
        let end = idx
            + self.points[idx..]
                .iter()
                .take_while(|p| p.efficiency() <= eff)
                .count();

        self.width.get_or_insert(candidate.cuts().len());
        self.points.splice(idx..end, std::iter::once(candidate));
        self.counters.accepted += 1;
        self.counters.pruned += (end - idx) as u64;
        self.refresh_extremes();
        Ok(true)
    }

    /// Offer every point in turn; returns how many were accepted.
    pub fn offer_all(
        &mut self,
        candidates: impl IntoIterator<Item = OperatingPoint>,
    ) -> Result<usize, CurveError> {
        let mut accepted = 0;
        for c in candidates {
            if self.offer(c)? {
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    /// Fold another frontier into this one.
    pub fn merge(&mut self, other: ParetoFrontier) -> Result<usize, CurveError> {
        self.offer_all(other.points)
    }

    fn fast_reject(&self, c: &OperatingPoint) -> bool {
        let Some(ext) = &self.extremes else {
            return false;
        };
        match self.fast_path {
            FastPath::Off => false,
            FastPath::Extremes => ext.dominates(c),
            FastPath::Chord => ext.dominates(c) || ext.above_chord(c),
        }
    }

    fn refresh_extremes(&mut self) {
        self.extremes = match (self.points.first(), self.points.last()) {
            (Some(lo), Some(hi)) => Some(Extremes {
                min_fake_rate: lo.fake_rate(),
                eff_at_min_fake_rate: lo.efficiency(),
                max_fake_rate: hi.fake_rate(),
                eff_at_max_fake_rate: hi.efficiency(),
            }),
            _ => None,
        };
    }

    pub fn points(&self) -> &[OperatingPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<OperatingPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn extremes(&self) -> Option<Extremes> {
        self.extremes
    }

    pub fn counters(&self) -> OfferCounters {
        self.counters
    }

    /// `(efficiency, fake rate)` pairs, ascending.
    pub fn efficiency_curve(&self) -> Result<Vec<(f64, f64)>, CurveError> {
        self.non_empty()?;
        Ok(self.points.iter().map(|p| (p.efficiency(), p.fake_rate())).collect())
    }

    /// `(fake rate, efficiency)` pairs, ascending.
    pub fn fake_rate_curve(&self) -> Result<Vec<(f64, f64)>, CurveError> {
        self.non_empty()?;
        Ok(self.points.iter().map(|p| (p.fake_rate(), p.efficiency())).collect())
    }

    /// Interpolated fake rate needed to reach `efficiency`.
    pub fn fake_rate_at(&self, efficiency: f64) -> Result<f64, CurveError> {
        finite_query(efficiency)?;
        Ok(interpolate(&self.efficiency_curve()?, efficiency))
    }

    /// Interpolated efficiency reachable at `fake_rate`.
    pub fn efficiency_at(&self, fake_rate: f64) -> Result<f64, CurveError> {
        finite_query(fake_rate)?;
        Ok(interpolate(&self.fake_rate_curve()?, fake_rate))
    }

    /// Most efficient point whose fake rate does not exceed `max_fake_rate`.
    pub fn loosest_within(&self, max_fake_rate: f64) -> Result<Option<&OperatingPoint>, CurveError> {
        self.non_empty()?;
        finite_query(max_fake_rate)?;
        let idx = self.points.partition_point(|p| p.fake_rate() <= max_fake_rate);
        Ok(idx.checked_sub(1).map(|i| &self.points[i]))
    }

    fn non_empty(&self) -> Result<(), CurveError> {
        if self.points.is_empty() {
            return Err(CurveError::EmptyFrontier);
        }
        Ok(())
    }
}

fn finite_query(value: f64) -> Result<(), CurveError> {
    if !value.is_finite() {
        return Err(CurveError::NonFiniteQuery { value });
    }
    Ok(())
}

/// Piecewise-linear lookup on ascending `(x, y)` pairs, clamped at the ends.
fn interpolate(pairs: &[(f64, f64)], x: f64) -> f64 {
    let (first, last) = (pairs[0], pairs[pairs.len() - 1]);
    if x <= first.0 {
        return first.1;
    }
    if x >= last.0 {
        return last.1;
    }
    let k = pairs.partition_point(|&(px, _)| px <= x);
    let ((x0, y0), (x1, y1)) = (pairs[k - 1], pairs[k]);
    y0 + (x - x0) / (x1 - x0) * (y1 - y0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pt(eff: f64, fr: f64) -> OperatingPoint {
        OperatingPoint::from_rates(vec![eff, fr], eff, fr).unwrap()
    }

    fn rates(f: &ParetoFrontier) -> Vec<(f64, f64)> {
        f.points().iter().map(|p| (p.efficiency(), p.fake_rate())).collect()
    }

    /// Non-dominated distinct `(eff, fr)` pairs, ascending in fake rate.
    fn brute_force(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
        let mut out: Vec<(f64, f64)> = points
            .iter()
            .copied()
            .filter(|&(e, f)| {
                !points
                    .iter()
                    .any(|&(qe, qf)| (qe, qf) != (e, f) && qf <= f && qe >= e)
            })
            .collect();
        out.sort_by(|a, b| a.1.total_cmp(&b.1));
        out.dedup();
        out
    }

    fn assert_pareto(f: &ParetoFrontier) {
        for w in f.points().windows(2) {
            assert!(w[0].fake_rate() < w[1].fake_rate());
            assert!(w[0].efficiency() < w[1].efficiency());
        }
        for (i, a) in f.points().iter().enumerate() {
            for (j, b) in f.points().iter().enumerate() {
                if i != j {
                    assert!(!a.dominates(b), "{a:?} dominates {b:?}");
                }
            }
        }
    }

    #[test]
    fn keeps_mutually_non_dominated_points() {
        let mut f = ParetoFrontier::new();
        assert!(f.offer(pt(0.9, 0.1)).unwrap());
        assert!(f.offer(pt(0.5, 0.01)).unwrap());
        assert!(f.offer(pt(0.95, 0.5)).unwrap());
        assert_eq!(rates(&f), vec![(0.5, 0.01), (0.9, 0.1), (0.95, 0.5)]);
    }

    #[test]
    fn rejects_dominated_point() {
        let mut f = ParetoFrontier::new();
        assert!(f.offer(pt(0.8, 0.2)).unwrap());
        assert!(!f.offer(pt(0.7, 0.3)).unwrap());
        assert_eq!(rates(&f), vec![(0.8, 0.2)]);
    }

    #[test]
    fn new_minimum_prunes_dominated_points() {
        let mut f = ParetoFrontier::new().fast_path(FastPath::Off);
        f.offer(pt(0.6, 0.2)).unwrap();
        f.offer(pt(0.8, 0.4)).unwrap();
        assert!(f.offer(pt(0.7, 0.1)).unwrap());
        assert_eq!(rates(&f), vec![(0.7, 0.1), (0.8, 0.4)]);
        assert_eq!(f.counters().pruned, 1);
    }

    #[test]
    fn insertion_prunes_a_run_of_points() {
        let mut f = ParetoFrontier::new().fast_path(FastPath::Off);
        for (e, r) in [(0.1, 0.01), (0.3, 0.1), (0.4, 0.2), (0.5, 0.3), (0.9, 0.6)] {
            f.offer(pt(e, r)).unwrap();
        }
        assert!(f.offer(pt(0.55, 0.05)).unwrap());
        assert_eq!(rates(&f), vec![(0.1, 0.01), (0.55, 0.05), (0.9, 0.6)]);
    }

    #[test]
    fn equal_fake_rate_keeps_higher_efficiency() {
        let mut f = ParetoFrontier::new().fast_path(FastPath::Off);
        f.offer(pt(0.5, 0.1)).unwrap();
        assert!(!f.offer(pt(0.4, 0.1)).unwrap());
        assert!(f.offer(pt(0.6, 0.1)).unwrap());
        assert_eq!(rates(&f), vec![(0.6, 0.1)]);
    }

    #[test]
    fn equal_efficiency_keeps_lower_fake_rate() {
        let mut f = ParetoFrontier::new().fast_path(FastPath::Off);
        f.offer(pt(0.5, 0.3)).unwrap();
        assert!(f.offer(pt(0.5, 0.2)).unwrap());
        assert!(!f.offer(pt(0.5, 0.25)).unwrap());
        assert_eq!(rates(&f), vec![(0.5, 0.2)]);
    }

    #[test]
    fn reoffering_accepted_point_is_noop() {
        let mut f = ParetoFrontier::new();
        f.offer(pt(0.5, 0.01)).unwrap();
        f.offer(pt(0.9, 0.1)).unwrap();
        let before = rates(&f);
        assert!(!f.offer(pt(0.9, 0.1)).unwrap());
        assert!(!f.offer(pt(0.5, 0.01)).unwrap());
        assert_eq!(rates(&f), before);
    }

    #[test]
    fn cut_count_is_fixed_by_first_point() {
        let mut f = ParetoFrontier::new();
        f.offer(pt(0.5, 0.1)).unwrap();
        let odd = OperatingPoint::from_rates(vec![0.0], 0.9, 0.05).unwrap();
        let err = f.offer(odd).unwrap_err();
        assert_eq!(err, CurveError::CutCountMismatch { expected: 2, got: 1 });
        assert_eq!(f.len(), 1);
    }

    #[test]
    fn extremes_follow_pruning() {
        let mut f = ParetoFrontier::new();
        f.offer(pt(0.2, 0.1)).unwrap();
        f.offer(pt(0.6, 0.5)).unwrap();
        // Dominates the current maximum.
        f.offer(pt(0.7, 0.4)).unwrap();
        let ext = f.extremes().unwrap();
        assert_eq!((ext.max_fake_rate, ext.eff_at_max_fake_rate), (0.4, 0.7));
        assert_eq!((ext.min_fake_rate, ext.eff_at_min_fake_rate), (0.1, 0.2));
        let line = ext.approx(0.45).unwrap();
        assert!((line - 0.25).abs() < 1e-12);
    }

    #[test]
    fn chord_drops_points_above_the_line() {
        let mut chord = ParetoFrontier::new().fast_path(FastPath::Chord);
        let mut exact = ParetoFrontier::new().fast_path(FastPath::Off);
        for f in [&mut chord, &mut exact] {
            f.offer(pt(0.0, 0.0)).unwrap();
            f.offer(pt(1.0, 1.0)).unwrap();
        }
        assert!(!chord.offer(pt(0.5, 0.6)).unwrap());
        assert!(exact.offer(pt(0.5, 0.6)).unwrap());
        // Below the line both agree.
        assert!(chord.offer(pt(0.5, 0.3)).unwrap());
        assert_eq!(chord.counters().fast_rejected, 1);
    }

    #[test]
    fn projections_and_queries() {
        let f = ParetoFrontier::new();
        assert_eq!(f.efficiency_curve().unwrap_err(), CurveError::EmptyFrontier);
        assert_eq!(f.efficiency_at(0.1).unwrap_err(), CurveError::EmptyFrontier);
        assert!(f.loosest_within(0.1).is_err());

        let mut f = ParetoFrontier::new();
        f.offer_all([pt(0.9, 0.1), pt(0.5, 0.01), pt(0.95, 0.5)]).unwrap();
        assert_eq!(f.fake_rate_curve().unwrap(), vec![(0.01, 0.5), (0.1, 0.9), (0.5, 0.95)]);
        assert_eq!(f.efficiency_curve().unwrap(), vec![(0.5, 0.01), (0.9, 0.1), (0.95, 0.5)]);

        assert!((f.efficiency_at(0.055).unwrap() - 0.7).abs() < 1e-12);
        assert_eq!(f.efficiency_at(0.0).unwrap(), 0.5);
        assert_eq!(f.efficiency_at(1.0).unwrap(), 0.95);
        assert!((f.fake_rate_at(0.7).unwrap() - 0.055).abs() < 1e-12);

        assert_eq!(f.loosest_within(0.2).unwrap().map(|p| p.efficiency()), Some(0.9));
        assert_eq!(f.loosest_within(0.1).unwrap().map(|p| p.efficiency()), Some(0.9));
        assert!(f.loosest_within(0.001).unwrap().is_none());
    }

    #[test]
    fn queries_reject_non_finite_targets() {
        let mut f = ParetoFrontier::new();
        f.offer_all([pt(0.5, 0.01), pt(0.9, 0.1)]).unwrap();
        assert!(matches!(f.efficiency_at(f64::NAN), Err(CurveError::NonFiniteQuery { .. })));
        assert!(matches!(f.fake_rate_at(f64::NAN), Err(CurveError::NonFiniteQuery { .. })));
        assert!(matches!(f.loosest_within(f64::NAN), Err(CurveError::NonFiniteQuery { .. })));
        assert_eq!(
            f.efficiency_at(f64::INFINITY).unwrap_err(),
            CurveError::NonFiniteQuery { value: f64::INFINITY }
        );
    }

    #[test]
    fn scored_points_from_two_categories() {
        use crate::domain::{Binning, Histogram, Prepass, Totals};
        use crate::efficiency::DecayModeStats;

        let totals = Totals::new(100.0, 1000.0, Prepass::default()).unwrap();
        let b = Binning::new(4, 0.0, 1.0).unwrap();
        let mk = |counts: [f64; 4]| {
            let mut h = Histogram::new(b);
            h.counts.copy_from_slice(&counts);
            h
        };
        let stats = vec![
            DecayModeStats::new(0, mk([0.0, 0.0, 10.0, 50.0]), mk([400.0, 80.0, 10.0, 10.0]), &totals).unwrap(),
            DecayModeStats::new(10, mk([0.0, 5.0, 5.0, 30.0]), mk([480.0, 20.0, 0.0, 0.0]), &totals).unwrap(),
        ];
        let score = |cuts: [f64; 2]| OperatingPoint::new(cuts.to_vec(), &stats, &totals).unwrap();

        let mut f = ParetoFrontier::new();
        assert!(f.offer(score([0.25, 0.75])).unwrap());
        assert!(f.offer(score([0.75, 1.0])).unwrap());
        assert!(f.offer(score([0.0, 0.5])).unwrap());
        assert_pareto(&f);

        let expected = [(0.5, 0.01), (0.9, 0.1), (0.95, 0.5)];
        assert_eq!(f.len(), expected.len());
        for (p, (eff, fr)) in f.points().iter().zip(expected) {
            assert!((p.efficiency() - eff).abs() < 1e-9, "{p:?}");
            assert!((p.fake_rate() - fr).abs() < 1e-9, "{p:?}");
        }
        assert_eq!(f.points()[0].cuts(), &[0.75, 1.0]);

        // Same fake rate as (0.9, 0.1) with mode 10 cut away entirely.
        assert!(!f.offer(score([0.25, 1.0])).unwrap());
        assert_eq!(f.len(), 3);
    }

    #[test]
    fn merge_matches_single_frontier() {
        let all = [pt(0.2, 0.01), pt(0.4, 0.05), pt(0.3, 0.2), pt(0.8, 0.3), pt(0.7, 0.4), pt(0.9, 0.9)];
        let mut single = ParetoFrontier::new();
        single.offer_all(all.iter().cloned()).unwrap();

        let mut left = ParetoFrontier::new();
        left.offer_all(all[..3].iter().cloned()).unwrap();
        let mut right = ParetoFrontier::new();
        right.offer_all(all[3..].iter().cloned()).unwrap();
        left.merge(right).unwrap();

        assert_eq!(rates(&left), rates(&single));
    }

    fn grid_points() -> impl Strategy<Value = Vec<(f64, f64)>> {
        prop::collection::vec((0u8..20, 0u8..20), 0..60).prop_map(|v| {
            v.into_iter()
                .map(|(e, f)| (e as f64 / 20.0, f as f64 / 20.0))
                .collect()
        })
    }

    fn build(points: &[(f64, f64)], fast_path: FastPath) -> ParetoFrontier {
        let mut f = ParetoFrontier::new().fast_path(fast_path);
        for &(e, r) in points {
            f.offer(pt(e, r)).unwrap();
            assert_pareto(&f);
        }
        f
    }

    proptest! {
        #[test]
        fn prop_matches_brute_force(points in grid_points()) {
            let f = build(&points, FastPath::Extremes);
            prop_assert_eq!(rates(&f), brute_force(&points));
        }

        #[test]
        fn prop_order_independent(
            (points, shuffled) in grid_points().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
        ) {
            let a = build(&points, FastPath::Extremes);
            let b = build(&shuffled, FastPath::Extremes);
            prop_assert_eq!(rates(&a), rates(&b));
        }

        #[test]
        fn prop_fast_path_never_changes_result(
            points in prop::collection::vec((0.0f64..1.0, 0.0f64..1.0), 0..80)
        ) {
            let exact = build(&points, FastPath::Off);
            let fast = build(&points, FastPath::Extremes);
            prop_assert_eq!(rates(&exact), rates(&fast));
        }

        #[test]
        fn prop_idempotent(points in grid_points()) {
            let mut f = build(&points, FastPath::Extremes);
            let before = rates(&f);
            for p in f.points().to_vec() {
                prop_assert!(!f.offer(p).unwrap());
            }
            prop_assert_eq!(rates(&f), before);
        }

        #[test]
        fn prop_chord_exact_on_concave_population(
            ks in prop::collection::vec(1u32..200, 1..60)
        ) {
            // Every point sits on eff = sqrt(fr), so none dominates another and
            // all of them lie on the concave side of any chord.
            let points: Vec<(f64, f64)> = ks
                .iter()
                .map(|&k| {
                    let fr = k as f64 / 200.0;
                    (fr.sqrt(), fr)
                })
                .collect();
            let exact = build(&points, FastPath::Off);
            let chord = build(&points, FastPath::Chord);
            prop_assert_eq!(rates(&exact), rates(&chord));
        }
    }
}
