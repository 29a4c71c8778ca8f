//! UIMA CAS JSON documents as exported by WebAnno / INCEpTION.
//!
//! Only the structural parts of the format are typed: the `%VIEWS` index and
//! the flat `%FEATURE_STRUCTURES` list. Every feature structure keeps the rest
//! of its fields as raw JSON, so each annotation layer reads only what it
//! declares and unknown layers pass through untouched.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Name of the view holding the primary document text.
pub const INITIAL_VIEW: &str = "_InitialView";

/// Reserved and custom type tags understood by the extractor.
pub mod types {
    pub const SOFA: &str = "uima.cas.Sofa";
    pub const STRING_ARRAY: &str = "uima.cas.StringArray";
    pub const DOCUMENT_METADATA: &str =
        "de.tudarmstadt.ukp.dkpro.core.api.metadata.type.DocumentMetaData";
    pub const MEDICAL: &str = "webanno.custom.Medical";
    pub const ABBREVIATION: &str = "webanno.custom.Abbreviation";
    pub const CAUSES: &str = "webanno.custom.Causes";
    pub const REFERS_TO: &str = "webanno.custom.Refers_to";
}

/// Feature names read from the records above.
pub mod features {
    pub const SOFA_STRING: &str = "sofaString";
    pub const DOCUMENT_TITLE: &str = "documentTitle";
    pub const DOCUMENT_ID: &str = "documentId";
    pub const ELEMENTS: &str = "%ELEMENTS";
    pub const BEGIN: &str = "begin";
    pub const END: &str = "end";
    pub const CUI: &str = "CUI";
    pub const CONFIDENCE: &str = "confidence";
    pub const MEDICAL_TYPE: &str = "@medical_type";
    pub const ABBREVIATION_TYPE: &str = "abbreviation_type";
    pub const GOVERNOR: &str = "@Governor";
    pub const DEPENDENT: &str = "@Dependent";
}

/// Identifier of a feature structure within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FsId(pub u64);

impl fmt::Display for FsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors raised while loading a document from disk.
#[derive(Debug, Error)]
pub enum CasReadError {
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid CAS JSON in '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A view entry: the sofa backing it and the records indexed in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct View {
    #[serde(rename = "%SOFA")]
    pub sofa: FsId,
    #[serde(rename = "%MEMBERS", default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<FsId>,
}

/// One typed record of the CAS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureStructure {
    #[serde(rename = "%ID")]
    pub id: FsId,
    #[serde(rename = "%TYPE")]
    pub type_name: String,
    /// Every other field of the record, including `%ELEMENTS` for arrays.
    #[serde(flatten)]
    pub features: Map<String, Value>,
}

impl FeatureStructure {
    pub fn is_type(&self, type_name: &str) -> bool {
        self.type_name == type_name
    }

    pub fn feature(&self, name: &str) -> Option<&Value> {
        self.features.get(name)
    }

    /// String-valued feature, `None` when absent or not a string.
    pub fn str_feature(&self, name: &str) -> Option<&str> {
        self.feature(name).and_then(Value::as_str)
    }

    /// Feature rendered as display text; absent or null features are empty.
    pub fn text_feature(&self, name: &str) -> String {
        self.feature(name).map(scalar_text).unwrap_or_default()
    }

    /// Character offset feature (`begin`/`end`).
    ///
    /// UIMA omits integer features holding their default value, so an absent
    /// offset reads as 0.
    pub fn offset_feature(&self, name: &str) -> usize {
        self.feature(name)
            .and_then(Value::as_u64)
            .map(|v| v as usize)
            .unwrap_or(0)
    }

    /// Reference to another feature structure (`@`-prefixed features).
    pub fn ref_feature(&self, name: &str) -> Option<FsId> {
        self.feature(name).and_then(Value::as_u64).map(FsId)
    }

    /// Elements of an array feature structure.
    pub fn elements(&self) -> Option<&[Value]> {
        self.feature(features::ELEMENTS)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }
}

/// Render a JSON scalar the way it should appear in a table cell.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// A deserialized annotation document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CasDocument {
    #[serde(rename = "%VIEWS", default)]
    pub views: HashMap<String, View>,
    #[serde(rename = "%FEATURE_STRUCTURES", default)]
    pub feature_structures: Vec<FeatureStructure>,
}

impl CasDocument {
    /// Read and deserialize a document from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, CasReadError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CasReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        contents.parse().map_err(|source| CasReadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn initial_view(&self) -> Option<&View> {
        self.views.get(INITIAL_VIEW)
    }
}

impl FromStr for CasDocument {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "%TYPES": {},
        "%FEATURE_STRUCTURES": [
            {"%ID": 1, "%TYPE": "uima.cas.Sofa", "sofaString": "Hello", "mimeType": "text"},
            {"%ID": 2, "%TYPE": "uima.cas.StringArray", "%ELEMENTS": ["Symptom", "Other"]},
            {"%ID": 3, "%TYPE": "webanno.custom.Medical", "end": 5, "CUI": "C42", "confidence": 0.75, "@medical_type": 2}
        ],
        "%VIEWS": {"_InitialView": {"%SOFA": 1, "%MEMBERS": [3]}}
    }"#;

    #[test]
    fn parses_views_and_records() {
        let doc: CasDocument = SAMPLE.parse().unwrap();
        assert_eq!(doc.initial_view().unwrap().sofa, FsId(1));
        assert_eq!(doc.feature_structures.len(), 3);
        assert!(doc.feature_structures[0].is_type(types::SOFA));
        assert_eq!(
            doc.feature_structures[0].str_feature(features::SOFA_STRING),
            Some("Hello")
        );
    }

    #[test]
    fn typed_feature_accessors() {
        let doc: CasDocument = SAMPLE.parse().unwrap();
        let medical = &doc.feature_structures[2];
        assert_eq!(medical.offset_feature(features::BEGIN), 0);
        assert_eq!(medical.offset_feature(features::END), 5);
        assert_eq!(medical.text_feature(features::CUI), "C42");
        assert_eq!(medical.text_feature(features::CONFIDENCE), "0.75");
        assert_eq!(medical.text_feature("missing"), "");
        assert_eq!(medical.ref_feature(features::MEDICAL_TYPE), Some(FsId(2)));

        let array = &doc.feature_structures[1];
        assert_eq!(array.elements().map(|e| e.len()), Some(2));
    }

    #[test]
    fn missing_top_level_keys_default_to_empty() {
        let doc: CasDocument = "{}".parse().unwrap();
        assert!(doc.views.is_empty());
        assert!(doc.feature_structures.is_empty());
        assert!(doc.initial_view().is_none());
    }

    #[test]
    fn from_path_reports_io_and_parse_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            CasDocument::from_path(&missing),
            Err(CasReadError::Io { .. })
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            CasDocument::from_path(&broken),
            Err(CasReadError::Parse { .. })
        ));
    }
}
