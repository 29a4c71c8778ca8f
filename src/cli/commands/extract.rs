//! Single-document extraction command.

use std::path::Path;

use anyhow::Context;

use cas_extract::export::explode_words;
use cas_extract::services::extract_file;

use crate::cli::helpers::write_output;
use crate::cli::icons::{success, warn};

/// Extract one CAS JSON document and write its table.
pub async fn cmd_extract(file: &Path, output: Option<&Path>, explode: bool) -> anyhow::Result<()> {
    let path = file.to_path_buf();
    let table = match tokio::task::spawn_blocking(move || extract_file(&path)).await? {
        Ok(table) => table,
        Err(e) => {
            if e.is_structural() {
                eprintln!(
                    "{} {} is valid JSON but not a WebAnno annotation export",
                    warn(),
                    file.display()
                );
            }
            return Err(e).with_context(|| format!("Failed to extract {}", file.display()));
        }
    };

    let mut records = table.records();
    if explode {
        records = explode_words(&records);
    }

    write_output(&records, output)?;

    if let Some(path) = output {
        eprintln!(
            "{} Wrote {} rows ({} entities, {} relations) to {}",
            success(),
            records.len(),
            table.entities().count(),
            table.relations().count(),
            path.display()
        );
    }

    Ok(())
}
