//! Cut-grid scan feeding the frontier.
//!
//! Each decay mode gets an evenly spaced grid over its occupied range and
//! every combination is scored. Combinations are addressed by a mixed-radix
//! index, so the candidate space can be split across rayon workers: each
//! worker folds a local frontier, and the local frontiers are merged in index
//! order. The result matches the sequential scan.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::{FastPath, Totals};
use crate::efficiency::DecayModeStats;
use crate::error::CurveError;
use crate::frontier::pareto::ParetoFrontier;
use crate::frontier::point::OperatingPoint;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub grid_steps: usize,
    pub max_candidates: u64,
    pub fast_path: FastPath,
    pub parallel: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            grid_steps: 12,
            max_candidates: 5_000_000,
            fast_path: FastPath::default(),
            parallel: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub frontier: ParetoFrontier,
    pub grids: Vec<Vec<f64>>,
    pub candidates: u64,
}

pub fn scan(stats: &[DecayModeStats], totals: &Totals, opts: &ScanOptions) -> Result<ScanOutput, CurveError> {
    if stats.is_empty() {
        return Err(CurveError::InvalidGrid("no decay modes to scan".to_string()));
    }

    let grids = stats
        .iter()
        .map(|dm| dm.cut_grid(opts.grid_steps))
        .collect::<Result<Vec<_>, _>>()?;

    let size: u128 = grids.iter().map(|g| g.len() as u128).product();
    if size > opts.max_candidates as u128 {
        return Err(CurveError::GridTooLarge {
            candidates: size,
            limit: opts.max_candidates,
        });
    }
    let candidates = size as u64;

    info!(
        modes = stats.len(),
        steps = opts.grid_steps,
        candidates,
        parallel = opts.parallel,
        "scanning cut grid"
    );

    let score = |i: u64| OperatingPoint::new(cuts_at(&grids, i), stats, totals);
    let empty = || ParetoFrontier::new().fast_path(opts.fast_path);

    let frontier = if opts.parallel {
        (0..candidates)
            .into_par_iter()
            .try_fold(empty, |mut f, i| {
                f.offer(score(i)?)?;
                Ok::<_, CurveError>(f)
            })
            .try_reduce(empty, |mut left, right| {
                left.merge(right)?;
                Ok(left)
            })?
    } else {
        let mut f = empty();
        for i in 0..candidates {
            f.offer(score(i)?)?;
        }
        f
    };

    debug!(points = frontier.len(), counters = ?frontier.counters(), "scan finished");

    Ok(ScanOutput {
        frontier,
        grids,
        candidates,
    })
}

/// Decode a mixed-radix index into one cut per grid; the first grid varies fastest.
fn cuts_at(grids: &[Vec<f64>], mut index: u64) -> Vec<f64> {
    grids
        .iter()
        .map(|g| {
            let radix = g.len() as u64;
            let digit = (index % radix) as usize;
            index /= radix;
            g[digit]
        })
        .collect()
}
