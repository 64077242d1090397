//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use rcpt_core::{ExpenseRecord, RcptConfig};

/// Column headers of the expenses CSV.
pub const CSV_HEADER: [&str; 5] = ["Filename", "Date", "Cost", "Comment", "Review"];

/// `~/.config/rcpt/config.json` or the platform equivalent.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rcpt")
        .join("config.json")
}

/// Load the configuration named on the command line, else the default file
/// if it exists, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RcptConfig> {
    if let Some(path) = config_path {
        return Ok(RcptConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(RcptConfig::from_file(&default_path)?)
    } else {
        Ok(RcptConfig::default())
    }
}

/// Write records as CSV, one row per record, in the given order.
pub fn write_csv<W: Write>(writer: W, records: &[ExpenseRecord]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(CSV_HEADER)?;
    for record in records {
        wtr.write_record([
            record.filename.as_str(),
            &record.date_field(),
            &record.cost_field(),
            &record.description,
            &record.review_field(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
