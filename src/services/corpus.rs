//! Corpus building service.
//!
//! Lists the annotation and curation exports, keeps the files produced by
//! the configured annotators, extracts every document on a bounded pool of
//! blocking workers and concatenates the tables in input order.
//! Separated from UI concerns - emits events for progress tracking.

use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;

use super::extract::{extract_file, ExtractError};
use crate::models::AnnotationTable;

/// Default number of extraction workers.
pub const DEFAULT_WORKERS: usize = 4;

/// Settings for one corpus build.
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    /// Root of the per-annotator exports.
    pub annotation_dir: PathBuf,
    /// Root of the curated exports.
    pub curation_dir: PathBuf,
    /// Annotation files are kept when their path mentions one of these ids.
    /// Empty keeps every file.
    pub annotators: Vec<String>,
    /// Files ending with any of these are skipped in both roots.
    pub exclude_suffixes: Vec<String>,
    pub expected_annotation_files: Option<usize>,
    pub expected_curation_files: Option<usize>,
    /// Concurrent extractions.
    pub workers: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            annotation_dir: PathBuf::from("data_json/annotation"),
            curation_dir: PathBuf::from("data_json/curation"),
            annotators: Vec::new(),
            exclude_suffixes: vec!["INITIAL_CAS.json".to_string()],
            expected_annotation_files: None,
            expected_curation_files: None,
            workers: DEFAULT_WORKERS,
        }
    }
}

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Failed to list '{}': {source}", .path.display())]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Expected {expected} {kind} files under '{}', found {found}", .dir.display())]
    UnexpectedFileCount {
        kind: &'static str,
        dir: PathBuf,
        expected: usize,
        found: usize,
    },
    #[error("Failed to extract '{}': {source}", .path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },
    #[error("Extraction worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Events emitted during a corpus build.
#[derive(Debug, Clone)]
pub enum CorpusEvent {
    /// Files selected, extraction about to start
    Started {
        annotation_files: usize,
        curation_files: usize,
    },
    /// One document extracted
    DocumentExtracted { path: PathBuf, rows: usize },
    /// Build complete
    Complete { documents: usize, rows: usize },
}

/// Files selected for a build, in extraction order within each group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusFiles {
    pub annotation: Vec<PathBuf>,
    pub curation: Vec<PathBuf>,
}

impl CorpusFiles {
    pub fn len(&self) -> usize {
        self.annotation.len() + self.curation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Annotation files first, then curation files.
    pub fn into_ordered(self) -> Vec<PathBuf> {
        let mut all = self.annotation;
        all.extend(self.curation);
        all
    }
}

/// List every regular file under `dir`, sorted by path.
///
/// Symlinked directories are not descended into; symlinks to files are
/// listed like the files themselves.
pub fn list_files_recursively(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                files.push(path);
            } else if file_type.is_symlink() {
                if path.is_file() {
                    files.push(path);
                } else {
                    tracing::debug!("Skipping symlink {}", path.display());
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

fn is_excluded(path: &Path, exclude_suffixes: &[String]) -> bool {
    let path = path.to_string_lossy();
    exclude_suffixes
        .iter()
        .any(|suffix| path.ends_with(suffix.as_str()))
}

/// Keep files whose path mentions one of the annotators.
pub fn select_annotation_files(
    files: Vec<PathBuf>,
    annotators: &[String],
    exclude_suffixes: &[String],
) -> Vec<PathBuf> {
    files
        .into_iter()
        .filter(|path| !is_excluded(path, exclude_suffixes))
        .filter(|path| {
            if annotators.is_empty() {
                return true;
            }
            let path = path.to_string_lossy();
            annotators.iter().any(|id| path.contains(id.as_str()))
        })
        .collect()
}

pub fn select_curation_files(files: Vec<PathBuf>, exclude_suffixes: &[String]) -> Vec<PathBuf> {
    files
        .into_iter()
        .filter(|path| !is_excluded(path, exclude_suffixes))
        .collect()
}

fn check_count(
    kind: &'static str,
    dir: &Path,
    expected: Option<usize>,
    found: usize,
) -> Result<(), CorpusError> {
    match expected {
        Some(expected) if expected != found => Err(CorpusError::UnexpectedFileCount {
            kind,
            dir: dir.to_path_buf(),
            expected,
            found,
        }),
        _ => Ok(()),
    }
}

/// Extract documents concurrently, returning tables in input order.
///
/// The first failing document aborts the run.
pub async fn extract_documents(
    paths: Vec<PathBuf>,
    workers: usize,
    event_tx: Option<&mpsc::Sender<CorpusEvent>>,
) -> Result<Vec<AnnotationTable>, CorpusError> {
    let mut results = stream::iter(paths)
        .map(|path| async move {
            let task_path = path.clone();
            match tokio::task::spawn_blocking(move || extract_file(&task_path)).await? {
                Ok(table) => Ok((path, table)),
                Err(source) => Err(CorpusError::Extract { path, source }),
            }
        })
        .buffered(workers.max(1));

    let mut tables = Vec::new();
    while let Some(result) = results.next().await {
        let (path, table) = result?;
        tracing::info!("Extracted {} rows from {}", table.len(), path.display());
        if let Some(tx) = event_tx {
            let _ = tx
                .send(CorpusEvent::DocumentExtracted {
                    path,
                    rows: table.len(),
                })
                .await;
        }
        tables.push(table);
    }

    Ok(tables)
}

/// Service building the full annotation table of a corpus.
pub struct CorpusBuilder {
    config: CorpusConfig,
}

impl CorpusBuilder {
    pub fn new(config: CorpusConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CorpusConfig {
        &self.config
    }

    /// Select the documents to extract and check the expected counts.
    pub fn collect_files(&self, check_counts: bool) -> Result<CorpusFiles, CorpusError> {
        let config = &self.config;

        let annotation = list_files_recursively(&config.annotation_dir).map_err(|source| {
            CorpusError::List {
                path: config.annotation_dir.clone(),
                source,
            }
        })?;
        let annotation =
            select_annotation_files(annotation, &config.annotators, &config.exclude_suffixes);

        let curation = list_files_recursively(&config.curation_dir).map_err(|source| {
            CorpusError::List {
                path: config.curation_dir.clone(),
                source,
            }
        })?;
        let curation = select_curation_files(curation, &config.exclude_suffixes);

        tracing::info!(
            "Selected {} annotation files and {} curation files",
            annotation.len(),
            curation.len()
        );

        if check_counts {
            check_count(
                "annotation",
                &config.annotation_dir,
                config.expected_annotation_files,
                annotation.len(),
            )?;
            check_count(
                "curation",
                &config.curation_dir,
                config.expected_curation_files,
                curation.len(),
            )?;
        }

        Ok(CorpusFiles {
            annotation,
            curation,
        })
    }

    /// Extract every selected document and concatenate the tables.
    pub async fn build(
        &self,
        files: CorpusFiles,
        event_tx: mpsc::Sender<CorpusEvent>,
    ) -> Result<AnnotationTable, CorpusError> {
        let _ = event_tx
            .send(CorpusEvent::Started {
                annotation_files: files.annotation.len(),
                curation_files: files.curation.len(),
            })
            .await;

        let documents = files.len();
        let tables =
            extract_documents(files.into_ordered(), self.config.workers, Some(&event_tx)).await?;
        let table = AnnotationTable::concat(tables);

        let _ = event_tx
            .send(CorpusEvent::Complete {
                documents,
                rows: table.len(),
            })
            .await;

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_document(path: &Path, title: &str, annotator: &str, text: &str) {
        let doc = json!({
            "%VIEWS": {"_InitialView": {"%SOFA": 1}},
            "%FEATURE_STRUCTURES": [
                {"%ID": 1, "%TYPE": "uima.cas.Sofa", "sofaString": text},
                {
                    "%ID": 2,
                    "%TYPE": "de.tudarmstadt.ukp.dkpro.core.api.metadata.type.DocumentMetaData",
                    "documentTitle": title,
                    "documentId": annotator
                },
                {"%ID": 3, "%TYPE": "webanno.custom.Medical", "begin": 0, "end": text.chars().count(), "CUI": "C1"}
            ]
        });
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, doc.to_string()).unwrap();
    }

    fn corpus(root: &Path) -> CorpusConfig {
        let annotation_dir = root.join("annotation");
        let curation_dir = root.join("curation");
        write_document(
            &annotation_dir.join("doc_b.txt/AV00440.json"),
            "doc_b",
            "AV00440",
            "toux",
        );
        write_document(
            &annotation_dir.join("doc_a.txt/AU90360.json"),
            "doc_a",
            "AU90360",
            "fièvre",
        );
        write_document(
            &annotation_dir.join("doc_a.txt/ZZ00000.json"),
            "doc_a",
            "ZZ00000",
            "ignored",
        );
        std::fs::write(annotation_dir.join("doc_a.txt/INITIAL_CAS.json"), "{}").unwrap();
        write_document(
            &curation_dir.join("doc_a.txt/CURATION_USER.json"),
            "doc_a",
            "CURATION_USER",
            "douleur",
        );

        CorpusConfig {
            annotation_dir,
            curation_dir,
            annotators: vec!["AV00440".to_string(), "AU90360".to_string()],
            workers: 2,
            ..Default::default()
        }
    }

    #[test]
    fn lists_files_recursively_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("b/c")).unwrap();
        std::fs::write(dir.path().join("b/c/z.json"), "").unwrap();
        std::fs::write(dir.path().join("a.json"), "").unwrap();
        std::fs::write(dir.path().join("b/y.json"), "").unwrap();

        let files = list_files_recursively(dir.path()).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("a.json"),
                PathBuf::from("b/c/z.json"),
                PathBuf::from("b/y.json"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn listing_does_not_follow_directory_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("doc")).unwrap();
        std::fs::write(dir.path().join("doc/AV00440.json"), "").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("doc/loop")).unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("doc/AV00440.json"),
            dir.path().join("linked.json"),
        )
        .unwrap();

        let files = list_files_recursively(dir.path()).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![PathBuf::from("doc/AV00440.json"), PathBuf::from("linked.json")]
        );
    }

    #[test]
    fn filters_annotation_files_by_annotator() {
        let files = vec![
            PathBuf::from("ann/doc1/AV00440.json"),
            PathBuf::from("ann/doc1/XX11111.json"),
            PathBuf::from("ann/doc1/INITIAL_CAS.json"),
            PathBuf::from("ann/doc2/AV45040.json"),
        ];
        let annotators = vec!["AV00440".to_string(), "AV45040".to_string()];
        let exclude = vec!["INITIAL_CAS.json".to_string()];

        let kept = select_annotation_files(files.clone(), &annotators, &exclude);
        assert_eq!(
            kept,
            vec![
                PathBuf::from("ann/doc1/AV00440.json"),
                PathBuf::from("ann/doc2/AV45040.json"),
            ]
        );

        let unfiltered = select_annotation_files(files, &[], &exclude);
        assert_eq!(unfiltered.len(), 3);
    }

    #[test]
    fn collect_files_checks_expected_counts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = corpus(dir.path());
        config.expected_annotation_files = Some(2);
        config.expected_curation_files = Some(1);

        let files = CorpusBuilder::new(config.clone()).collect_files(true).unwrap();
        assert_eq!(files.annotation.len(), 2);
        assert_eq!(files.curation.len(), 1);

        config.expected_annotation_files = Some(30);
        let err = CorpusBuilder::new(config.clone())
            .collect_files(true)
            .unwrap_err();
        assert!(matches!(
            err,
            CorpusError::UnexpectedFileCount {
                expected: 30,
                found: 2,
                ..
            }
        ));

        assert!(CorpusBuilder::new(config).collect_files(false).is_ok());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = CorpusConfig {
            annotation_dir: dir.path().join("nope"),
            curation_dir: dir.path().join("nope"),
            ..Default::default()
        };
        assert!(matches!(
            CorpusBuilder::new(config).collect_files(false),
            Err(CorpusError::List { .. })
        ));
    }

    #[tokio::test]
    async fn build_concatenates_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let builder = CorpusBuilder::new(corpus(dir.path()));
        let files = builder.collect_files(true).unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let table = builder.build(files, tx).await.unwrap();

        let texts: Vec<_> = table.entities().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["fièvre", "toux", "douleur"]);

        let mut extracted = 0;
        let mut completed = None;
        while let Some(event) = rx.recv().await {
            match event {
                CorpusEvent::DocumentExtracted { .. } => extracted += 1,
                CorpusEvent::Complete { documents, rows } => completed = Some((documents, rows)),
                CorpusEvent::Started { .. } => {}
            }
        }
        assert_eq!(extracted, 3);
        assert_eq!(completed, Some((3, 3)));
    }

    #[tokio::test]
    async fn failing_document_aborts_the_build() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        write_document(&good, "good", "AV00440", "toux");
        std::fs::write(&bad, r#"{"%FEATURE_STRUCTURES": []}"#).unwrap();

        let err = extract_documents(vec![good, bad.clone()], 2, None)
            .await
            .unwrap_err();
        match err {
            CorpusError::Extract { path, source } => {
                assert_eq!(path, bad);
                assert!(matches!(source, ExtractError::MissingMetadata));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
