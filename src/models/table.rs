//! The flattened annotation table produced by extraction.
//!
//! Rows come in four shapes (two entity layers, two relation kinds) and are
//! unified into one column set when written out. `TableRecord` is that flat
//! column view and is what CSV export and import work with.

use serde::{Deserialize, Serialize};

use super::cas::types;

/// Entity annotation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityLayer {
    Medical,
    Abbreviation,
}

impl EntityLayer {
    /// CAS type tag of records in this layer.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Medical => types::MEDICAL,
            Self::Abbreviation => types::ABBREVIATION,
        }
    }

    /// Value written to the `Layer` column.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Medical => "Medical",
            Self::Abbreviation => "Abbreviation",
        }
    }
}

/// Relation annotation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    Causes,
    RefersTo,
}

impl RelationKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Causes => types::CAUSES,
            Self::RefersTo => types::REFERS_TO,
        }
    }

    /// Value written to the `Relation` column.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Causes => "Causes",
            Self::RefersTo => "Refers_to",
        }
    }

    /// Entity layer both endpoints must belong to.
    ///
    /// A relation whose governor or dependent lives in the other layer never
    /// resolves and is dropped.
    pub fn endpoint_layer(&self) -> EntityLayer {
        match self {
            Self::Causes => EntityLayer::Medical,
            Self::RefersTo => EntityLayer::Abbreviation,
        }
    }
}

/// A mention of a Medical or Abbreviation entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRow {
    pub document: String,
    pub annotator: String,
    /// Sofa text covered by `[begin, end)`.
    pub text: String,
    pub begin: usize,
    pub end: usize,
    pub layer: EntityLayer,
    /// Concept identifier; empty for abbreviations.
    pub cui: String,
    /// Resolved medical type, or the abbreviation type.
    pub type_label: String,
    /// Annotator confidence; empty for abbreviations.
    pub confidence: String,
}

/// A resolved Causes or Refers_to edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationRow {
    pub document: String,
    pub annotator: String,
    pub relation: RelationKind,
    /// Text of the governor mention.
    pub source: String,
    /// Text of the dependent mention.
    pub target: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Entity(EntityRow),
    Relation(RelationRow),
}

/// Rows extracted from one or more documents, in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationTable {
    pub rows: Vec<Row>,
}

impl AnnotationTable {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Concatenate tables, keeping their order.
    pub fn concat(tables: impl IntoIterator<Item = AnnotationTable>) -> Self {
        let rows = tables.into_iter().flat_map(|t| t.rows).collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityRow> {
        self.rows.iter().filter_map(|row| match row {
            Row::Entity(e) => Some(e),
            Row::Relation(_) => None,
        })
    }

    pub fn relations(&self) -> impl Iterator<Item = &RelationRow> {
        self.rows.iter().filter_map(|row| match row {
            Row::Relation(r) => Some(r),
            Row::Entity(_) => None,
        })
    }

    /// Flat column view of every row.
    pub fn records(&self) -> Vec<TableRecord> {
        self.rows.iter().map(TableRecord::from).collect()
    }
}

/// One table line with the full column set; unused columns stay empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    #[serde(rename = "Document", default)]
    pub document: String,
    #[serde(rename = "Annotateur", default)]
    pub annotator: String,
    #[serde(rename = "Texte")]
    pub text: Option<String>,
    #[serde(rename = "Début")]
    pub begin: Option<usize>,
    #[serde(rename = "Fin")]
    pub end: Option<usize>,
    #[serde(rename = "Layer")]
    pub layer: Option<String>,
    #[serde(rename = "CUI")]
    pub cui: Option<String>,
    #[serde(rename = "Type")]
    pub type_label: Option<String>,
    #[serde(rename = "Confiance")]
    pub confidence: Option<String>,
    #[serde(rename = "Relation")]
    pub relation: Option<String>,
    #[serde(rename = "Source")]
    pub source: Option<String>,
    #[serde(rename = "Cible")]
    pub target: Option<String>,
}

impl TableRecord {
    /// Column names in output order.
    pub const COLUMNS: [&'static str; 12] = [
        "Document",
        "Annotateur",
        "Texte",
        "Début",
        "Fin",
        "Layer",
        "CUI",
        "Type",
        "Confiance",
        "Relation",
        "Source",
        "Cible",
    ];
}

impl From<&Row> for TableRecord {
    fn from(row: &Row) -> Self {
        match row {
            Row::Entity(e) => {
                let is_medical = e.layer == EntityLayer::Medical;
                TableRecord {
                    document: e.document.clone(),
                    annotator: e.annotator.clone(),
                    text: Some(e.text.clone()),
                    begin: Some(e.begin),
                    end: Some(e.end),
                    layer: Some(e.layer.label().to_string()),
                    cui: is_medical.then(|| e.cui.clone()),
                    type_label: Some(e.type_label.clone()),
                    confidence: is_medical.then(|| e.confidence.clone()),
                    ..Default::default()
                }
            }
            Row::Relation(r) => TableRecord {
                document: r.document.clone(),
                annotator: r.annotator.clone(),
                relation: Some(r.relation.label().to_string()),
                source: Some(r.source.clone()),
                target: Some(r.target.clone()),
                ..Default::default()
            },
        }
    }
}
