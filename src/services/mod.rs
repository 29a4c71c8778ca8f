//! Service layer for cas-extract.
//!
//! Extraction of single documents and corpus building, separated from UI
//! concerns so they can be driven by the CLI or used as a library.

pub mod corpus;
pub mod extract;

pub use corpus::{
    extract_documents, list_files_recursively, CorpusBuilder, CorpusConfig, CorpusError,
    CorpusEvent, CorpusFiles,
};
pub use extract::{extract, extract_file, DocumentMetadata, ExtractError};
