//! Formatted terminal output.
//!
//! Formatting lives here so the scan code stays free of presentation and
//! output changes are localized.

use crate::domain::{CategorySummary, FrontierFile, Totals};
use crate::frontier::{ParetoFrontier, ScanOutput};
use crate::report::WorkingPoint;

/// Run header: data source, normalization and scan diagnostics.
pub fn format_run_summary(source: &str, totals: &Totals, scan: &ScanOutput) -> String {
    let mut out = String::new();

    out.push_str("=== tanc - TaNC operating-point tuning ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "Totals: signal={:.1} (prepass {:.1}) | background={:.1} (prepass {:.1})\n",
        totals.signal_entries, totals.signal_prepass, totals.background_entries, totals.background_prepass,
    ));

    let c = scan.frontier.counters();
    out.push_str(&format!(
        "Scan: candidates={} | grid={}\n",
        scan.candidates,
        scan.grids.iter().map(|g| g.len().to_string()).collect::<Vec<_>>().join("x"),
    ));
    out.push_str(&format!(
        "Frontier: points={} | accepted={} pruned={} rejected(fast)={} rejected(exact)={}\n",
        scan.frontier.len(),
        c.accepted,
        c.pruned,
        c.fast_rejected,
        c.exact_rejected,
    ));
    out.push_str(&format_extremes(&scan.frontier));
    out.push('\n');

    out
}

fn format_extremes(frontier: &ParetoFrontier) -> String {
    match frontier.extremes() {
        Some(e) => format!(
            "Range: eff={:.4} @ fr={:.6} .. eff={:.4} @ fr={:.6}\n",
            e.eff_at_min_fake_rate, e.min_fake_rate, e.eff_at_max_fake_rate, e.max_fake_rate
        ),
        None => "Range: (empty frontier)\n".to_string(),
    }
}

/// Per-decay-mode table.
pub fn format_categories(rows: &[CategorySummary]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<5} {:<16} {:>10} {:>12} {:>8} {:>8} {:>8} {:>17}",
            "mode", "label", "signal", "background", "sig_frac", "bkg_frac", "sep", "occupied"
        ),
    );
    push_line(
        &mut out,
        format!(
            "{:-<5} {:-<16} {:-<10} {:-<12} {:-<8} {:-<8} {:-<8} {:-<17}",
            "", "", "", "", "", "", "", ""
        ),
    );

    for r in rows {
        let occupied = if r.empty {
            "(empty)".to_string()
        } else {
            format!("[{:.3}, {:.3}]", r.occupied_min, r.occupied_max)
        };
        push_line(
            &mut out,
            format!(
                "{:<5} {:<16} {:>10.1} {:>12.1} {:>8.4} {:>8.4} {:>8.4} {:>17}",
                r.mode,
                r.label,
                r.n_signal,
                r.n_background,
                r.signal_fraction,
                r.background_fraction,
                r.separation,
                occupied,
            ),
        );
    }

    out
}

/// Working-point table; `modes` labels the cut columns.
pub fn format_working_points(wps: &[WorkingPoint], modes: &[u32]) -> String {
    let mut out = String::new();

    let mut header = format!("{:>10} {:>10} {:>10} {:>10}", "target_fr", "interp_eff", "eff", "fr");
    for m in modes {
        header.push_str(&format!(" {:>9}", format!("cut_{m}")));
    }
    push_line(&mut out, header);

    for wp in wps {
        let mut line = format!("{:>10.5} {:>10.4}", wp.target_fake_rate, wp.interpolated_efficiency);
        match &wp.point {
            Some(p) => {
                line.push_str(&format!(" {:>10.4} {:>10.6}", p.efficiency(), p.fake_rate()));
                for c in p.cuts() {
                    line.push_str(&format!(" {c:>9.4}"));
                }
            }
            None => line.push_str(&format!(" {:>10} {:>10}", "-", "-")),
        }
        push_line(&mut out, line);
    }

    out
}

/// Summary of a saved frontier file.
pub fn format_frontier_file(file: &FrontierFile) -> String {
    let mut out = String::new();
    out.push_str(&format!("Frontier: {} points from {} candidates\n", file.points.len(), file.candidates));
    out.push_str(&format!("Generated: {} by {}\n", file.generated.format("%Y-%m-%d %H:%M:%S UTC"), file.tool));
    out.push_str(&format!(
        "Binning: {} bins over [{}, {}] | fast path: {:?}\n\n",
        file.binning.nbins, file.binning.xlow, file.binning.xhigh, file.fast_path
    ));
    out.push_str(&format_categories(&file.categories));
    out
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}
