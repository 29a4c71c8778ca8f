//! Data models for CAS documents and extracted annotation tables.

mod cas;
mod table;

pub use cas::{
    features, scalar_text, types, CasDocument, CasReadError, FeatureStructure, FsId, View,
    INITIAL_VIEW,
};
pub use table::{AnnotationTable, EntityLayer, EntityRow, RelationKind, RelationRow, Row, TableRecord};
