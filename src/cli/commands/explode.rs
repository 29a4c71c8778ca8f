//! Word explosion of an existing table.

use std::path::Path;

use anyhow::Context;

use cas_extract::export::{explode_words, read_records_path};

use crate::cli::helpers::write_output;
use crate::cli::icons::success;

/// Read a table CSV and write it back with one row per word of `Texte`.
pub async fn cmd_explode(input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let records = read_records_path(input)
        .with_context(|| format!("Failed to read table {}", input.display()))?;
    let exploded = explode_words(&records);

    write_output(&exploded, output)?;

    if let Some(path) = output {
        eprintln!(
            "{} Exploded {} rows into {} word rows ({})",
            success(),
            records.len(),
            exploded.len(),
            path.display()
        );
    }

    Ok(())
}
