//! Histogram CSV ingest and export.
//!
//! Long format, one row per non-empty bin:
//!
//! ```text
//! mode,kind,bin,count
//! 0,signal,1512,37
//! 0,background,0,4
//! ```
//!
//! `bin` uses ROOT numbering: 0 is underflow, `1..=nbins` the regular bins
//! and `nbins + 1` overflow. The binning itself is part of the run
//! configuration, not of the file.
//!
//! Bad rows are skipped and reported; the ingest only fails when nothing
//! usable remains.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::data::ModeSample;
use crate::domain::{Binning, Histogram};
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: per-mode histograms (ascending mode) + row errors.
#[derive(Debug, Clone)]
pub struct LoadedHistograms {
    pub modes: Vec<ModeSample>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Signal,
    Background,
}

pub fn load_histograms(path: &Path, binning: Binning) -> Result<LoadedHistograms, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open histogram CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = resolve_columns(&headers)?;

    let mut modes: BTreeMap<u32, ModeSample> = BTreeMap::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let parsed = parse_row(&record, &columns, binning.nbins).and_then(|(mode, kind, bin, count)| {
            let sample = modes.entry(mode).or_insert_with(|| ModeSample {
                mode,
                signal: Histogram::new(binning),
                background: Histogram::new(binning),
            });
            let hist = match kind {
                Kind::Signal => &mut sample.signal,
                Kind::Background => &mut sample.background,
            };
            hist.set_bin(bin, count).map_err(|e| e.to_string())
        });
        if let Err(message) = parsed {
            row_errors.push(RowError { line, message });
        }
    }

    if modes.is_empty() {
        return Err(AppError::new(3, "No valid histogram rows found."));
    }

    Ok(LoadedHistograms {
        modes: modes.into_values().collect(),
        row_errors,
        rows_read,
    })
}

/// Write non-empty bins of every mode.
pub fn write_histograms_csv(path: &Path, modes: &[ModeSample]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create histogram CSV '{}': {e}", path.display())))?;

    writer
        .write_record(["mode", "kind", "bin", "count"])
        .map_err(|e| AppError::new(2, format!("Failed to write histogram CSV header: {e}")))?;

    for m in modes {
        for (kind, hist) in [("signal", &m.signal), ("background", &m.background)] {
            let nbins = hist.nbins();
            let bins = std::iter::once((0, hist.underflow))
                .chain(hist.counts.iter().enumerate().map(|(i, &c)| (i + 1, c)))
                .chain(std::iter::once((nbins + 1, hist.overflow)));
            for (bin, count) in bins.filter(|&(_, c)| c != 0.0) {
                writer
                    .write_record([m.mode.to_string(), kind.to_string(), bin.to_string(), count.to_string()])
                    .map_err(|e| AppError::new(2, format!("Failed to write histogram CSV row: {e}")))?;
            }
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush histogram CSV: {e}")))?;
    Ok(())
}

struct Columns {
    mode: usize,
    kind: usize,
    bin: usize,
    count: usize,
}

fn resolve_columns(headers: &StringRecord) -> Result<Columns, AppError> {
    let map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect();
    let col = |name: &str| {
        map.get(name)
            .copied()
            .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))
    };
    Ok(Columns {
        mode: col("mode")?,
        kind: col("kind")?,
        bin: col("bin")?,
        count: col("count")?,
    })
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Parse and range-check one row; a mode is only registered once a row of it is valid.
fn parse_row(record: &StringRecord, columns: &Columns, nbins: usize) -> Result<(u32, Kind, usize, f64), String> {
    let field = |idx: usize, name: &str| {
        record
            .get(idx)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| format!("Missing value for `{name}`"))
    };

    let mode_raw = field(columns.mode, "mode")?;
    let mode = mode_raw
        .parse::<u32>()
        .map_err(|_| format!("Invalid decay mode '{mode_raw}'"))?;

    let kind = match field(columns.kind, "kind")?.to_ascii_lowercase().as_str() {
        "signal" | "sig" | "s" => Kind::Signal,
        "background" | "bkg" | "b" => Kind::Background,
        other => return Err(format!("Unknown kind '{other}' (expected signal/background)")),
    };

    let bin_raw = field(columns.bin, "bin")?;
    let bin = bin_raw
        .parse::<usize>()
        .map_err(|_| format!("Invalid bin index '{bin_raw}'"))?;
    if bin > nbins + 1 {
        return Err(format!("Bin index {bin} outside 0..={}", nbins + 1));
    }

    let count_raw = field(columns.count, "count")?;
    let count = count_raw
        .parse::<f64>()
        .ok()
        .filter(|c| c.is_finite() && *c >= 0.0)
        .ok_or_else(|| format!("Invalid count '{count_raw}'"))?;

    Ok((mode, kind, bin, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("tanc-{}-{name}", std::process::id()))
    }

    #[test]
    fn loads_long_format_and_skips_bad_rows() {
        let path = temp_path("load.csv");
        let mut f = File::create(&path).unwrap();
        writeln!(f, "\u{feff}Mode,Kind,Bin,Count").unwrap();
        writeln!(f, "10,signal,2,5").unwrap();
        writeln!(f, "10,background,0,3").unwrap();
        writeln!(f, "0,sig,5,1").unwrap();
        writeln!(f, "0,bkg,1,2.5").unwrap();
        writeln!(f, "0,noise,1,2").unwrap();
        writeln!(f, "0,signal,9,1").unwrap();
        writeln!(f, "x,signal,1,1").unwrap();
        writeln!(f, "7,signal,99,1").unwrap();
        drop(f);

        let binning = Binning::new(4, 0.0, 1.0).unwrap();
        let loaded = load_histograms(&path, binning).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.rows_read, 8);
        assert_eq!(loaded.row_errors.len(), 4);
        assert_eq!(loaded.row_errors[0].line, 6);
        assert_eq!(loaded.row_errors[3].line, 9);
        assert!(loaded.row_errors[3].message.contains("outside"));

        let modes: Vec<u32> = loaded.modes.iter().map(|m| m.mode).collect();
        assert_eq!(modes, vec![0, 10]);
        let m0 = &loaded.modes[0];
        assert_eq!(m0.signal.overflow, 1.0);
        assert_eq!(m0.background.counts, vec![2.5, 0.0, 0.0, 0.0]);
        let m10 = &loaded.modes[1];
        assert_eq!(m10.signal.counts, vec![0.0, 5.0, 0.0, 0.0]);
        assert_eq!(m10.background.underflow, 3.0);
    }

    #[test]
    fn out_of_range_rows_register_no_mode() {
        let path = temp_path("range.csv");
        std::fs::write(&path, "mode,kind,bin,count\n7,signal,99,1\n7,background,6,2\n").unwrap();
        let err = load_histograms(&path, Binning::new(4, 0.0, 1.0).unwrap()).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_column_is_an_input_error() {
        let path = temp_path("missing.csv");
        std::fs::write(&path, "mode,kind,count\n0,signal,1\n").unwrap();
        let err = load_histograms(&path, Binning::default()).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("`bin`"));
    }

    #[test]
    fn written_file_loads_back() {
        let binning = Binning::new(3, -1.0, 1.0).unwrap();
        let mut signal = Histogram::new(binning);
        signal.fill(0.9, 4.0);
        signal.fill(5.0, 1.0);
        let mut background = Histogram::new(binning);
        background.fill(-0.9, 7.0);
        background.fill(-5.0, 2.0);
        let modes = vec![ModeSample { mode: 1, signal, background }];

        let path = temp_path("roundtrip.csv");
        write_histograms_csv(&path, &modes).unwrap();
        let loaded = load_histograms(&path, binning).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(loaded.row_errors.is_empty());
        assert_eq!(loaded.modes[0].signal, modes[0].signal);
        assert_eq!(loaded.modes[0].background, modes[0].background);
    }
}
