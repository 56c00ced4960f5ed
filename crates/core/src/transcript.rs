//! Transcript handling for recognised document text.
//!
//! An OCR collaborator turns a scanned prescription into an ordered sequence
//! of text lines. This module joins those lines back into a single blob in
//! reading order and isolates the line-item block between the literal section
//! markers. Both operations are pure text transforms: absent markers yield
//! empty results, never errors.

use crate::constants::{OBSERVATIONS_MARKER, PRODUCTS_MARKER};

/// Ordered text lines recognised from a prescription document, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    /// Wraps recognised lines, preserving their order.
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Returns the recognised lines in reading order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Joins all lines into a single newline-separated blob.
    ///
    /// No reordering or deduplication takes place; the blob is exactly the
    /// document text as the OCR collaborator emitted it.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Isolates the line-item block from a transcript blob.
///
/// The block starts at the first occurrence of the `"Productos:"` marker and
/// runs to the first `"Observaciones:"` marker that appears after it, or to
/// the end of the blob if no terminator is found. When the opening marker is
/// absent the block is empty, which downstream parsing reports as zero line
/// items.
pub fn items_block(text: &str) -> &str {
    let Some(start) = text.find(PRODUCTS_MARKER) else {
        return "";
    };
    let rest = &text[start..];
    match rest.find(OBSERVATIONS_MARKER) {
        Some(end) => &rest[..end],
        None => rest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(lines: &[&str]) -> Transcript {
        Transcript::new(lines.iter().map(|l| l.to_string()).collect())
    }

    #[test]
    fn test_text_joins_lines_in_order() {
        let t = transcript(&["first", "second", "third"]);
        assert_eq!(t.text(), "first\nsecond\nthird");
    }

    #[test]
    fn test_text_preserves_duplicates() {
        let t = transcript(&["same", "same"]);
        assert_eq!(t.text(), "same\nsame");
    }

    #[test]
    fn test_items_block_between_markers() {
        let text = "header\nProductos:\n- item line\nObservaciones:\nNinguna";
        assert_eq!(items_block(text), "Productos:\n- item line\n");
    }

    #[test]
    fn test_items_block_runs_to_end_without_terminator() {
        let text = "header\nProductos:\n- item line\n- another";
        assert_eq!(items_block(text), "Productos:\n- item line\n- another");
    }

    #[test]
    fn test_items_block_empty_when_marker_absent() {
        let text = "header\nno products here\nObservaciones:\nNinguna";
        assert_eq!(items_block(text), "");
    }

    #[test]
    fn test_items_block_ignores_terminator_before_marker() {
        let text = "Observaciones:\nearly\nProductos:\n- item";
        assert_eq!(items_block(text), "Productos:\n- item");
    }

    #[test]
    fn test_empty_transcript() {
        let t = Transcript::new(vec![]);
        assert_eq!(t.text(), "");
        assert_eq!(items_block(&t.text()), "");
    }
}
