//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - initializes logging
//! - runs the scan pipeline or one of the helper commands
//! - prints reports
//! - writes optional exports

use clap::Parser;
use tracing::info;

use crate::cli::{BinningArgs, Command, SampleArgs, ScanArgs, ShowArgs, SynthArgs};
use crate::domain::{Binning, Prepass, ScanConfig, SynthConfig};
use crate::error::AppError;
use crate::io::RunMeta;

pub mod pipeline;

/// Entry point for the `tanc` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is fine; RUST_LOG may live there.
    dotenvy::dotenv().ok();

    let cli = crate::cli::Cli::parse();
    crate::logging::init_logging(cli.verbose);

    match cli.command {
        Command::Scan(args) => handle_scan(args),
        Command::Synth(args) => handle_synth(args),
        Command::Show(args) => handle_show(args),
    }
}

fn handle_scan(args: ScanArgs) -> Result<(), AppError> {
    let config = scan_config_from_args(&args)?;
    let run = pipeline::run_scan(&config)?;

    for e in run.row_errors.iter().take(10) {
        eprintln!("line {}: {}", e.line, e.message);
    }
    if run.row_errors.len() > 10 {
        eprintln!("... {} more invalid rows", run.row_errors.len() - 10);
    }

    let categories: Vec<_> = run.stats.iter().map(crate::io::category_summary).collect();
    let modes: Vec<u32> = run.stats.iter().map(|dm| dm.mode).collect();

    println!("{}", crate::report::format_run_summary(&run.source, &run.totals, &run.scan));
    println!("{}", crate::report::format_categories(&categories));
    println!("Working points:");
    println!("{}", crate::report::format_working_points(&run.working_points, &modes));

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::write_frontier_csv(path, &run.scan.frontier, &run.stats)?;
        info!(path = %path.display(), "wrote frontier CSV");
    }
    if let Some(path) = &config.export_json {
        let meta = RunMeta {
            binning: config.binning,
            totals: run.totals,
            fast_path: config.fast_path,
            candidates: run.scan.candidates,
        };
        let file = crate::io::build_frontier_file(&run.scan.frontier, &run.stats, meta)?;
        crate::io::write_frontier_json(path, &file)?;
        info!(path = %path.display(), "wrote frontier JSON");
    }

    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let binning = binning_from_args(&args.binning)?;
    let samples = crate::data::generate_sample(&synth_config_from_args(&args.sample), binning)?;
    crate::io::write_histograms_csv(&args.out, &samples)?;
    println!("Wrote {} decay modes to {}", samples.len(), args.out.display());
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let file = crate::io::read_frontier_json(&args.frontier)?;
    let frontier = crate::io::frontier_from_file(&file)?;
    let modes: Vec<u32> = file.categories.iter().map(|c| c.mode).collect();

    println!("{}", crate::report::format_frontier_file(&file));

    let wps = crate::report::select_working_points(&frontier, &args.working_points)?;
    println!("Working points:");
    println!("{}", crate::report::format_working_points(&wps, &modes));

    if !args.efficiency.is_empty() {
        println!("Required fake rate:");
        for &eff in &args.efficiency {
            println!("  eff={eff:.4} -> fr={:.6}", frontier.fake_rate_at(eff)?);
        }
    }
    Ok(())
}

pub fn scan_config_from_args(args: &ScanArgs) -> Result<ScanConfig, AppError> {
    Ok(ScanConfig {
        histograms: args.histograms.clone(),
        binning: binning_from_args(&args.binning)?,
        prepass: Prepass {
            signal: args.prepass_signal,
            background: args.prepass_background,
        },
        total_signal: args.total_signal,
        total_background: args.total_background,
        grid_steps: args.grid_steps,
        max_candidates: args.max_candidates,
        fast_path: args.fast_path,
        parallel: !args.sequential,
        working_points: args.working_points.clone(),
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
        synth: synth_config_from_args(&args.sample),
    })
}

fn binning_from_args(args: &BinningArgs) -> Result<Binning, AppError> {
    Ok(Binning::new(args.nbins, args.xlow, args.xhigh)?)
}

fn synth_config_from_args(args: &SampleArgs) -> SynthConfig {
    SynthConfig {
        modes: args.modes.clone(),
        signal_per_mode: args.signal_per_mode,
        background_per_mode: args.background_per_mode,
        seed: args.seed,
    }
}
