//! Single-document extraction: CAS JSON to an annotation table.
//!
//! The extractor reads the document metadata and text, collects the Medical
//! and Abbreviation mentions, resolves Causes and Refers_to relations to the
//! text of their endpoints, and emits rows grouped as Medical, Abbreviation,
//! Causes, Refers_to. Within a group rows follow document order.
//!
//! Extraction is pure and synchronous; callers may run it for several
//! documents in parallel.

mod error;
mod index;
mod text;

use std::collections::HashMap;
use std::path::Path;

pub use error::ExtractError;
pub use index::FsIndex;
pub use text::SofaText;

use crate::models::{
    features, types, AnnotationTable, CasDocument, EntityLayer, EntityRow, FeatureStructure,
    FsId, RelationKind, RelationRow, Row, INITIAL_VIEW,
};

/// Title and annotator of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: String,
    pub annotator: String,
}

impl DocumentMetadata {
    /// Read the DocumentMetaData record. Absent fields are empty.
    pub fn lookup(index: &FsIndex<'_>) -> Result<Self, ExtractError> {
        let fs = index
            .first_of_type(types::DOCUMENT_METADATA)
            .ok_or(ExtractError::MissingMetadata)?;
        Ok(Self {
            title: fs.text_feature(features::DOCUMENT_TITLE),
            annotator: fs.text_feature(features::DOCUMENT_ID),
        })
    }
}

/// Layer-specific fields of an entity mention.
#[derive(Debug, Clone, PartialEq)]
enum EntityFields {
    Medical {
        cui: String,
        confidence: String,
        type_label: String,
    },
    Abbreviation {
        abbreviation_type: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Entity {
    id: FsId,
    begin: usize,
    end: usize,
    fields: EntityFields,
}

#[derive(Debug, Clone, Copy)]
struct Relation {
    governor: Option<FsId>,
    dependent: Option<FsId>,
}

/// Entities of one layer, addressable by identifier.
struct EntityPool<'e> {
    entities: &'e [Entity],
    by_id: HashMap<FsId, usize>,
}

impl<'e> EntityPool<'e> {
    fn new(entities: &'e [Entity]) -> Self {
        let mut by_id = HashMap::with_capacity(entities.len());
        for (pos, entity) in entities.iter().enumerate() {
            by_id.entry(entity.id).or_insert(pos);
        }
        Self { entities, by_id }
    }

    fn get(&self, id: Option<FsId>) -> Option<&'e Entity> {
        id.and_then(|id| self.by_id.get(&id))
            .map(|&pos| &self.entities[pos])
    }
}

/// Read a document from disk and extract it.
pub fn extract_file(path: &Path) -> Result<AnnotationTable, ExtractError> {
    let document = CasDocument::from_path(path)?;
    extract(&document)
}

/// Extract the annotation table of one document.
pub fn extract(document: &CasDocument) -> Result<AnnotationTable, ExtractError> {
    let index = FsIndex::new(&document.feature_structures);

    let metadata = DocumentMetadata::lookup(&index)?;
    let sofa_text = recover_text(document, &index)?;
    let sofa = SofaText::new(sofa_text);
    let labels = index.label_table();

    let medical = scan_entities(&index, EntityLayer::Medical, &labels);
    let abbreviations = scan_entities(&index, EntityLayer::Abbreviation, &labels);
    let causes = scan_relations(&index, RelationKind::Causes);
    let refers_to = scan_relations(&index, RelationKind::RefersTo);

    let mut rows = Vec::with_capacity(
        medical.len() + abbreviations.len() + causes.len() + refers_to.len(),
    );

    for (layer, entities) in [
        (EntityLayer::Medical, &medical),
        (EntityLayer::Abbreviation, &abbreviations),
    ] {
        for entity in entities.iter() {
            rows.push(Row::Entity(entity_row(&metadata, &sofa, layer, entity)));
        }
    }

    let mut dropped = 0;
    for (kind, relations) in [
        (RelationKind::Causes, &causes),
        (RelationKind::RefersTo, &refers_to),
    ] {
        let pool = match kind.endpoint_layer() {
            EntityLayer::Medical => EntityPool::new(&medical),
            EntityLayer::Abbreviation => EntityPool::new(&abbreviations),
        };
        for relation in relations.iter() {
            match resolve_relation(&metadata, &sofa, kind, relation, &pool) {
                Some(row) => rows.push(Row::Relation(row)),
                None => {
                    dropped += 1;
                    tracing::debug!(
                        "Dropping {} relation in '{}': governor {:?} / dependent {:?} not in the {} layer",
                        kind.label(),
                        metadata.title,
                        relation.governor,
                        relation.dependent,
                        kind.endpoint_layer().label()
                    );
                }
            }
        }
    }

    tracing::debug!(
        "Extracted '{}' ({}): {} medical, {} abbreviation, {} relations kept, {} dropped",
        metadata.title,
        metadata.annotator,
        medical.len(),
        abbreviations.len(),
        causes.len() + refers_to.len() - dropped,
        dropped
    );

    Ok(AnnotationTable::new(rows))
}

/// Text of the sofa backing the initial view.
fn recover_text<'d>(
    document: &'d CasDocument,
    index: &FsIndex<'d>,
) -> Result<&'d str, ExtractError> {
    let view = document
        .initial_view()
        .ok_or_else(|| ExtractError::MissingView(INITIAL_VIEW.to_string()))?;

    let sofa = index
        .get(view.sofa)
        .filter(|fs| fs.is_type(types::SOFA))
        .ok_or(ExtractError::MissingSofa(view.sofa))?;

    sofa.str_feature(features::SOFA_STRING)
        .ok_or(ExtractError::MissingSofaText(view.sofa))
}

fn scan_entities(
    index: &FsIndex<'_>,
    layer: EntityLayer,
    labels: &HashMap<FsId, String>,
) -> Vec<Entity> {
    index
        .of_type(layer.type_name())
        .map(|fs| Entity {
            id: fs.id,
            begin: fs.offset_feature(features::BEGIN),
            end: fs.offset_feature(features::END),
            fields: entity_fields(fs, layer, labels),
        })
        .collect()
}

fn entity_fields(
    fs: &FeatureStructure,
    layer: EntityLayer,
    labels: &HashMap<FsId, String>,
) -> EntityFields {
    match layer {
        EntityLayer::Medical => EntityFields::Medical {
            cui: fs.text_feature(features::CUI),
            confidence: fs.text_feature(features::CONFIDENCE),
            type_label: fs
                .ref_feature(features::MEDICAL_TYPE)
                .and_then(|id| labels.get(&id))
                .cloned()
                .unwrap_or_default(),
        },
        EntityLayer::Abbreviation => EntityFields::Abbreviation {
            abbreviation_type: fs.text_feature(features::ABBREVIATION_TYPE),
        },
    }
}

fn scan_relations(index: &FsIndex<'_>, kind: RelationKind) -> Vec<Relation> {
    index
        .of_type(kind.type_name())
        .map(|fs| Relation {
            governor: fs.ref_feature(features::GOVERNOR),
            dependent: fs.ref_feature(features::DEPENDENT),
        })
        .collect()
}

fn entity_text<'s>(sofa: &SofaText<'s>, entity: &Entity) -> &'s str {
    if !sofa.contains_span(entity.begin, entity.end) {
        tracing::warn!(
            "Entity {} span [{}, {}) is outside the text ({} chars)",
            entity.id,
            entity.begin,
            entity.end,
            sofa.char_len()
        );
    }
    sofa.slice(entity.begin, entity.end)
}

fn entity_row(
    metadata: &DocumentMetadata,
    sofa: &SofaText<'_>,
    layer: EntityLayer,
    entity: &Entity,
) -> EntityRow {
    let (cui, type_label, confidence) = match &entity.fields {
        EntityFields::Medical {
            cui,
            confidence,
            type_label,
        } => (cui.clone(), type_label.clone(), confidence.clone()),
        EntityFields::Abbreviation { abbreviation_type } => {
            (String::new(), abbreviation_type.clone(), String::new())
        }
    };

    EntityRow {
        document: metadata.title.clone(),
        annotator: metadata.annotator.clone(),
        text: entity_text(sofa, entity).to_string(),
        begin: entity.begin,
        end: entity.end,
        layer,
        cui,
        type_label,
        confidence,
    }
}

fn resolve_relation(
    metadata: &DocumentMetadata,
    sofa: &SofaText<'_>,
    kind: RelationKind,
    relation: &Relation,
    pool: &EntityPool<'_>,
) -> Option<RelationRow> {
    let governor = pool.get(relation.governor)?;
    let dependent = pool.get(relation.dependent)?;

    Some(RelationRow {
        document: metadata.title.clone(),
        annotator: metadata.annotator.clone(),
        relation: kind,
        source: entity_text(sofa, governor).to_string(),
        target: entity_text(sofa, dependent).to_string(),
    })
}
