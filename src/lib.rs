//! cas-extract - clinical annotation extraction from UIMA CAS JSON.
//!
//! Parses WebAnno/INCEpTION exports ([`models::CasDocument`]), flattens each
//! document into an [`models::AnnotationTable`] of Medical and Abbreviation
//! mentions plus the Causes and Refers_to relations between them, and builds
//! whole-corpus tables from annotation and curation export trees.

pub mod config;
pub mod export;
pub mod models;
pub mod services;

pub use models::{AnnotationTable, CasDocument, TableRecord};
pub use services::{extract, extract_file, ExtractError};
