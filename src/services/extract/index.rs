//! One-pass index over a document's feature structures.

use std::collections::HashMap;

use crate::models::{types, FeatureStructure, FsId};

/// Records of one document indexed by identifier and by type tag.
///
/// The records stay in the document's arena; the maps hold positions into it,
/// so per-type iteration keeps document order.
pub struct FsIndex<'a> {
    records: &'a [FeatureStructure],
    by_id: HashMap<FsId, usize>,
    by_type: HashMap<&'a str, Vec<usize>>,
}

impl<'a> FsIndex<'a> {
    pub fn new(records: &'a [FeatureStructure]) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut by_type: HashMap<&'a str, Vec<usize>> = HashMap::new();

        for (pos, fs) in records.iter().enumerate() {
            // First record wins on duplicate ids, like a front-to-back scan.
            by_id.entry(fs.id).or_insert(pos);
            by_type.entry(fs.type_name.as_str()).or_default().push(pos);
        }

        Self {
            records,
            by_id,
            by_type,
        }
    }

    pub fn get(&self, id: FsId) -> Option<&'a FeatureStructure> {
        self.by_id.get(&id).map(|&pos| &self.records[pos])
    }

    /// Records of the given type, in document order.
    pub fn of_type<'s>(
        &'s self,
        type_name: &str,
    ) -> impl Iterator<Item = &'a FeatureStructure> + 's {
        let records = self.records;
        self.by_type
            .get(type_name)
            .into_iter()
            .flatten()
            .map(move |&pos| &records[pos])
    }

    pub fn first_of_type(&self, type_name: &str) -> Option<&'a FeatureStructure> {
        self.of_type(type_name).next()
    }

    /// Map every string array to its first element.
    ///
    /// Enumerated features such as the medical type are stored as references
    /// to single-element arrays. Empty arrays are left out.
    pub fn label_table(&self) -> HashMap<FsId, String> {
        self.of_type(types::STRING_ARRAY)
            .filter_map(|fs| {
                let first = fs.elements()?.first()?;
                Some((fs.id, crate::models::scalar_text(first)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CasDocument;

    fn document() -> CasDocument {
        r#"{
            "%FEATURE_STRUCTURES": [
                {"%ID": 10, "%TYPE": "uima.cas.StringArray", "%ELEMENTS": ["Disease"]},
                {"%ID": 11, "%TYPE": "webanno.custom.Medical", "begin": 0, "end": 3},
                {"%ID": 12, "%TYPE": "uima.cas.StringArray", "%ELEMENTS": []},
                {"%ID": 13, "%TYPE": "webanno.custom.Medical", "begin": 4, "end": 8},
                {"%ID": 14, "%TYPE": "uima.cas.StringArray", "%ELEMENTS": ["Drug", "Other"]}
            ]
        }"#
        .parse()
        .unwrap()
    }

    #[test]
    fn groups_by_type_in_document_order() {
        let doc = document();
        let index = FsIndex::new(&doc.feature_structures);

        let ids: Vec<_> = index.of_type(types::MEDICAL).map(|fs| fs.id).collect();
        assert_eq!(ids, vec![FsId(11), FsId(13)]);
        assert_eq!(index.of_type(types::STRING_ARRAY).count(), 3);
        assert!(index.first_of_type(types::SOFA).is_none());
    }

    #[test]
    fn looks_up_by_id() {
        let doc = document();
        let index = FsIndex::new(&doc.feature_structures);

        assert_eq!(index.get(FsId(13)).map(|fs| fs.id), Some(FsId(13)));
        assert!(index.get(FsId(99)).is_none());
    }

    #[test]
    fn label_table_uses_first_element() {
        let doc = document();
        let index = FsIndex::new(&doc.feature_structures);
        let labels = index.label_table();

        assert_eq!(labels.len(), 2);
        assert_eq!(labels[&FsId(10)], "Disease");
        assert_eq!(labels[&FsId(14)], "Drug");
        assert!(!labels.contains_key(&FsId(12)));
    }
}
