//! Character-offset slicing over the document text.

/// Document text with a char → byte offset table.
///
/// Annotation offsets count characters, not bytes, so slicing goes through
/// the table. Out-of-range offsets are clamped to the text length and an
/// inverted span yields an empty slice.
pub struct SofaText<'a> {
    text: &'a str,
    /// Byte offset of every char boundary, including the end of the text.
    boundaries: Vec<usize>,
}

impl<'a> SofaText<'a> {
    pub fn new(text: &'a str) -> Self {
        let boundaries = text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(text.len()))
            .collect();
        Self { text, boundaries }
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Whether `[begin, end)` lies within the text.
    pub fn contains_span(&self, begin: usize, end: usize) -> bool {
        begin <= end && end <= self.char_len()
    }

    pub fn slice(&self, begin: usize, end: usize) -> &'a str {
        let len = self.char_len();
        let begin = begin.min(len);
        let end = end.min(len);
        if begin >= end {
            return "";
        }
        &self.text[self.boundaries[begin]..self.boundaries[end]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_ascii_by_offset() {
        let sofa = SofaText::new("Patient has fever.");
        assert_eq!(sofa.char_len(), 18);
        assert_eq!(sofa.slice(12, 18), "fever.");
        assert_eq!(sofa.slice(0, 7), "Patient");
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        let sofa = SofaText::new("Une fièvre élevée");
        assert_eq!(sofa.char_len(), 17);
        assert_eq!(sofa.slice(4, 10), "fièvre");
        assert_eq!(sofa.slice(11, 17), "élevée");
    }

    #[test]
    fn clamps_out_of_range_spans() {
        let sofa = SofaText::new("abc");
        assert_eq!(sofa.slice(1, 99), "bc");
        assert_eq!(sofa.slice(5, 9), "");
        assert_eq!(sofa.slice(2, 1), "");
        assert!(sofa.contains_span(0, 3));
        assert!(!sofa.contains_span(2, 4));
        assert!(!sofa.contains_span(2, 1));
    }

    #[test]
    fn empty_text() {
        let sofa = SofaText::new("");
        assert_eq!(sofa.char_len(), 0);
        assert_eq!(sofa.slice(0, 0), "");
        assert_eq!(sofa.slice(0, 3), "");
    }
}
