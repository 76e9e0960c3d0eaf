//! Synthetic classifier-output histograms per decay mode.
//!
//! Useful for demos and tests when no real training output is at hand: signal
//! and background scores are drawn from Gaussians whose separation depends on
//! the decay mode, then binned with the run binning.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Binning, Histogram, SynthConfig};
use crate::error::AppError;

/// Width of both score distributions.
const SCORE_SIGMA: f64 = 0.7;

/// Histograms for one decay mode.
#[derive(Debug, Clone)]
pub struct ModeSample {
    pub mode: u32,
    pub signal: Histogram,
    pub background: Histogram,
}

/// Mean network output for (signal, background) in each decay mode.
///
/// Modes with more neutral pions are harder to separate.
pub fn score_means(mode: u32) -> (f64, f64) {
    match mode {
        0 => (0.9, -0.9),
        1 => (1.1, -0.8),
        2 => (0.7, -0.6),
        10 => (1.0, -1.1),
        11 => (0.6, -0.5),
        _ => (0.8, -0.8),
    }
}

pub fn generate_sample(config: &SynthConfig, binning: Binning) -> Result<Vec<ModeSample>, AppError> {
    if config.modes.is_empty() {
        return Err(AppError::new(2, "At least one decay mode is required."));
    }
    if config.signal_per_mode == 0 || config.background_per_mode == 0 {
        return Err(AppError::new(2, "Sample counts per mode must be > 0."));
    }

    let mut out = Vec::with_capacity(config.modes.len());
    for &mode in &config.modes {
        let mut rng = StdRng::seed_from_u64(mode_seed(config.seed, mode));
        let (mu_s, mu_b) = score_means(mode);
        let signal = fill(&mut rng, binning, mu_s, config.signal_per_mode)?;
        let background = fill(&mut rng, binning, mu_b, config.background_per_mode)?;
        out.push(ModeSample {
            mode,
            signal,
            background,
        });
    }
    Ok(out)
}

fn fill(rng: &mut StdRng, binning: Binning, mean: f64, n: usize) -> Result<Histogram, AppError> {
    let normal = Normal::new(mean, SCORE_SIGMA)
        .map_err(|e| AppError::new(4, format!("Score distribution error: {e}")))?;
    let mut hist = Histogram::new(binning);
    for _ in 0..n {
        hist.fill(normal.sample(rng), 1.0);
    }
    Ok(hist)
}

/// Independent stream per mode so adding a mode leaves the others unchanged.
fn mode_seed(seed: u64, mode: u32) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    mode.hash(&mut hasher);
    hasher.finish()
}
