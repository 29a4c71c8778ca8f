//! Shared helper functions for CLI commands.

use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

use cas_extract::export::{write_records, write_records_path};
use cas_extract::models::TableRecord;

/// Write records to a file, or to stdout when no path is given.
pub fn write_output(records: &[TableRecord], output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => write_records_path(records, path)?,
        None => write_records(records, std::io::stdout().lock())?,
    }
    Ok(())
}

/// Progress bar for per-document extraction.
pub fn document_progress(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );
    pb.set_message("Extracting");
    pb
}

/// Truncate a path for display.
pub fn truncate(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        return s.to_string();
    }
    let tail: String = s.chars().skip(count - max_len.saturating_sub(3)).collect();
    format!("...{}", tail)
}
