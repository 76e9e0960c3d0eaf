//! Command-line parsing for the TaNC operating-point tuner.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the efficiency/frontier code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_DECAY_MODES, DEFAULT_WORKING_POINTS, FastPath};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tanc", version, about = "TaNC operating-point tuning on a Pareto frontier")]
pub struct Cli {
    /// Debug logging (RUST_LOG still takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan per-mode cut grids, build the frontier, print working points and optionally export.
    Scan(ScanArgs),
    /// Write a synthetic histogram CSV (useful for demos and as a format reference).
    Synth(SynthArgs),
    /// Query a previously exported frontier JSON.
    Show(ShowArgs),
}

/// Histogram binning of the classifier output.
#[derive(Debug, Args, Clone)]
pub struct BinningArgs {
    /// Number of regular bins.
    #[arg(long, default_value_t = 3000)]
    pub nbins: usize,

    /// Lower edge of the first bin.
    #[arg(long, default_value_t = -3.0, allow_negative_numbers = true)]
    pub xlow: f64,

    /// Upper edge of the last bin.
    #[arg(long, default_value_t = 3.0, allow_negative_numbers = true)]
    pub xhigh: f64,
}

/// Synthetic sample settings.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Decay modes to generate.
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_DECAY_MODES)]
    pub modes: Vec<u32>,

    /// Signal entries per decay mode.
    #[arg(long, default_value_t = 20_000)]
    pub signal_per_mode: usize,

    /// Background entries per decay mode.
    #[arg(long, default_value_t = 200_000)]
    pub background_per_mode: usize,

    /// Random seed for sample generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Args, Clone)]
pub struct ScanArgs {
    /// Histogram CSV (`mode,kind,bin,count`); a synthetic sample is used when omitted.
    #[arg(long, value_name = "CSV")]
    pub histograms: Option<PathBuf>,

    #[command(flatten)]
    pub binning: BinningArgs,

    #[command(flatten)]
    pub sample: SampleArgs,

    /// Signal entries that pass without a category cut.
    #[arg(long, default_value_t = 0.0)]
    pub prepass_signal: f64,

    /// Background entries that pass without a category cut.
    #[arg(long, default_value_t = 0.0)]
    pub prepass_background: f64,

    /// Override the efficiency denominator (default: all histogram entries + prepass).
    #[arg(long)]
    pub total_signal: Option<f64>,

    /// Override the fake-rate denominator (default: all histogram entries + prepass).
    #[arg(long)]
    pub total_background: Option<f64>,

    /// Cut values per decay mode, spread over its occupied range.
    #[arg(long, default_value_t = 12)]
    pub grid_steps: usize,

    /// Refuse grids with more combinations than this.
    #[arg(long, default_value_t = 5_000_000)]
    pub max_candidates: u64,

    /// Rejection test run before the exact frontier insertion.
    #[arg(long, value_enum, default_value_t = FastPath::Extremes)]
    pub fast_path: FastPath,

    /// Scan on a single thread.
    #[arg(long)]
    pub sequential: bool,

    /// Fake-rate targets to report working points for.
    #[arg(long = "working-point", value_delimiter = ',', default_values_t = DEFAULT_WORKING_POINTS)]
    pub working_points: Vec<f64>,

    /// Export the frontier (cuts, rescaled cuts, normalized outputs) to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the frontier (metadata + points + projections) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Output histogram CSV.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    #[command(flatten)]
    pub binning: BinningArgs,

    #[command(flatten)]
    pub sample: SampleArgs,
}

/// Options for querying a saved frontier.
#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Frontier JSON file produced by `tanc scan --export-json`.
    #[arg(long, value_name = "JSON")]
    pub frontier: PathBuf,

    /// Fake-rate targets to report working points for.
    #[arg(long = "working-point", value_delimiter = ',', default_values_t = DEFAULT_WORKING_POINTS)]
    pub working_points: Vec<f64>,

    /// Efficiencies to look up the required fake rate for.
    #[arg(long, value_delimiter = ',')]
    pub efficiency: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_defaults() {
        let cli = Cli::parse_from(["tanc", "scan"]);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert!(!cli.verbose);
        assert_eq!(args.grid_steps, 12);
        assert_eq!(args.fast_path, FastPath::Extremes);
        assert_eq!(args.working_points, DEFAULT_WORKING_POINTS.to_vec());
        assert_eq!(args.sample.modes, DEFAULT_DECAY_MODES.to_vec());
        assert_eq!(args.binning.nbins, 3000);
        assert!(args.histograms.is_none());
    }

    #[test]
    fn scan_flags_parse() {
        let cli = Cli::parse_from([
            "tanc",
            "-v",
            "scan",
            "--histograms",
            "h.csv",
            "--xlow",
            "-1.5",
            "--fast-path",
            "chord",
            "--working-point",
            "0.01,0.02",
            "--sequential",
        ]);
        assert!(cli.verbose);
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.histograms, Some(PathBuf::from("h.csv")));
        assert_eq!(args.binning.xlow, -1.5);
        assert_eq!(args.fast_path, FastPath::Chord);
        assert_eq!(args.working_points, vec![0.01, 0.02]);
        assert!(args.sequential);
    }
}
