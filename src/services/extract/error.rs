//! Extraction error types.

use thiserror::Error;

use crate::models::{CasReadError, FsId};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Read(#[from] CasReadError),
    #[error("Document has no '{0}' view")]
    MissingView(String),
    #[error("Sofa {0} referenced by the initial view not found")]
    MissingSofa(FsId),
    #[error("Sofa {0} has no sofaString")]
    MissingSofaText(FsId),
    #[error("Document has no DocumentMetaData record")]
    MissingMetadata,
}

impl ExtractError {
    /// Whether the document was readable but lacks a required record.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Read(_))
    }
}
