//! Corpus build command.

use anyhow::Context;
use indicatif::ProgressBar;
use tokio::sync::mpsc;

use cas_extract::config::Settings;
use cas_extract::export::{explode_words, write_records_path};
use cas_extract::services::corpus::{CorpusBuilder, CorpusEvent};

use crate::cli::helpers::{document_progress, truncate};
use crate::cli::icons::{dim_arrow, info, success, warn};

fn spawn_progress_handler(mut event_rx: mpsc::Receiver<CorpusEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut pb: Option<ProgressBar> = None;
        while let Some(event) = event_rx.recv().await {
            match event {
                CorpusEvent::Started {
                    annotation_files,
                    curation_files,
                } => {
                    pb = Some(document_progress((annotation_files + curation_files) as u64));
                }
                CorpusEvent::DocumentExtracted { path, rows } => {
                    if let Some(ref progress) = pb {
                        progress.set_message(format!(
                            "{} ({} rows)",
                            truncate(&path.to_string_lossy(), 40),
                            rows
                        ));
                        progress.inc(1);
                    }
                }
                CorpusEvent::Complete { documents, rows } => {
                    if let Some(progress) = pb.take() {
                        progress.finish_and_clear();
                    }
                    eprintln!(
                        "{} Extracted {} documents into {} rows",
                        success(),
                        documents,
                        rows
                    );
                }
            }
        }
        if let Some(progress) = pb {
            progress.abandon();
        }
    })
}

/// Extract the configured corpus and write the table and its word-exploded form.
pub async fn cmd_build(settings: &Settings, check_counts: bool, dry_run: bool) -> anyhow::Result<()> {
    let builder = CorpusBuilder::new(settings.corpus_config());

    if builder.config().annotators.is_empty() {
        eprintln!(
            "{} No annotators configured, keeping every annotation file",
            warn()
        );
    }

    let files = builder.collect_files(check_counts)?;

    eprintln!(
        "{} {} annotation files from {}",
        info(),
        files.annotation.len(),
        settings.annotation_dir.display()
    );
    eprintln!(
        "{} {} curation files from {}",
        info(),
        files.curation.len(),
        settings.curation_dir.display()
    );

    if dry_run {
        for path in files.annotation.iter().chain(files.curation.iter()) {
            println!("{}", path.display());
        }
        return Ok(());
    }

    if files.is_empty() {
        eprintln!("{} No documents to extract", warn());
        return Ok(());
    }

    let (event_tx, event_rx) = mpsc::channel::<CorpusEvent>(100);
    let event_handler = spawn_progress_handler(event_rx);

    let result = builder.build(files, event_tx).await;

    if let Err(e) = event_handler.await {
        tracing::warn!("Event handler task failed: {}", e);
    }

    let table = result?;
    let records = table.records();

    write_records_path(&records, &settings.output)
        .with_context(|| format!("Failed to write {}", settings.output.display()))?;
    eprintln!(
        "{} Wrote {} rows to {}",
        success(),
        records.len(),
        settings.output.display()
    );

    let exploded = explode_words(&records);
    write_records_path(&exploded, &settings.exploded_output)
        .with_context(|| format!("Failed to write {}", settings.exploded_output.display()))?;
    eprintln!(
        "  {} {} word rows in {}",
        dim_arrow(),
        exploded.len(),
        settings.exploded_output.display()
    );

    Ok(())
}
