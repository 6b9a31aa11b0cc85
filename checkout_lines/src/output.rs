//! Export of sweep results for plotting elsewhere.
//!
//! `sweep.csv` holds one row per arrival interval with both disciplines'
//! mean waits. `comparison.json` holds the config alongside both full
//! sweep results.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::{Comparison, SimError, SimulationConfig};

#[derive(Debug, Serialize)]
struct Report<'a> {
    config: &'a SimulationConfig,
    comparison: &'a Comparison,
}

pub fn write_csv<P: AsRef<Path>>(comparison: &Comparison, path: P) -> Result<(), SimError> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["arrival_interval", "single_line", "multi_line"])?;
    for (interval, single, multi) in comparison.rows() {
        wtr.write_record(&[interval.to_string(), single.to_string(), multi.to_string()])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_json<P: AsRef<Path>>(
    config: &SimulationConfig,
    comparison: &Comparison,
    path: P,
) -> Result<(), SimError> {
    let json = serde_json::to_string_pretty(&Report { config, comparison })?;
    fs::write(path, json)?;
    Ok(())
}

/// Write `sweep.csv` and `comparison.json` into `dir`, creating it if needed
pub fn write_all<P: AsRef<Path>>(
    config: &SimulationConfig,
    comparison: &Comparison,
    dir: P,
) -> Result<(), SimError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    write_csv(comparison, dir.join("sweep.csv"))?;
    write_json(config, comparison, dir.join("comparison.json"))?;

    Ok(())
}

/// Plain-text table of both sweeps
pub fn format_table(comparison: &Comparison) -> String {
    let mut table = format!(
        "{:>16} {:>12} {:>12} {:>10}\n",
        "arrival interval", "single-line", "multi-line", "penalty"
    );
    for (interval, single, multi) in comparison.rows() {
        table.push_str(&format!(
            "{:>16.3} {:>12.3} {:>12.3} {:>10.3}\n",
            interval,
            single,
            multi,
            multi - single
        ));
    }
    table
}
