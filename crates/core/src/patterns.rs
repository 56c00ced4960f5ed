//! The pattern matcher for labelled fields and repeating line items.
//!
//! Prescription documents carry a fixed printed layout: labelled header
//! fields (`Paciente DNI:`, `Médico CMP:`, `Fecha de emisión:`) followed by a
//! `Productos:` block of line items. This module isolates all knowledge of
//! that layout behind two abstractions: an ordered list of named
//! [`FieldPattern`]s applied against the transcript blob, and a repeating
//! line-item matcher applied within the items block. Supporting an alternate
//! document layout means touching only this module.
//!
//! Matching is literal and case-sensitive; no fuzzy matching or OCR-error
//! correction is attempted.

use std::sync::LazyLock;

use regex::Regex;

use crate::prescription::LineItem;

/// Field name for the patient national identifier.
pub const FIELD_PATIENT_ID: &str = "patient_id";
/// Field name for the prescriber registration code.
pub const FIELD_PRESCRIBER_CODE: &str = "prescriber_code";
/// Field name for the issuance date literal.
pub const FIELD_ISSUE_DATE: &str = "issue_date";
/// Field name for the line-item list.
pub const FIELD_LINE_ITEMS: &str = "line_items";

/// A named pattern for one labelled field on the document.
///
/// The regex captures the field value in group 1; [`FieldPattern::first_match`]
/// returns the first such capture in the blob, or `None` when the label or a
/// conforming value is absent.
#[derive(Debug)]
pub struct FieldPattern {
    name: &'static str,
    regex: Regex,
}

impl FieldPattern {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).expect("field pattern is a valid regex"),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// First captured value for this field in `text`, if any.
    pub fn first_match<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

static FIELD_PATTERNS: LazyLock<Vec<FieldPattern>> = LazyLock::new(|| {
    vec![
        FieldPattern::new(FIELD_PATIENT_ID, r"Paciente DNI:\s*(\d{8,12})"),
        FieldPattern::new(FIELD_PRESCRIBER_CODE, r"Médico CMP:\s*([A-Za-z0-9]+)"),
        FieldPattern::new(FIELD_ISSUE_DATE, r"Fecha de emisión:\s*([\d\-]+)"),
    ]
});

static LINE_ITEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"- Código:\s*(\d+),\s*Nombre:\s*([^,]+),\s*Cantidad:\s*(\d+)")
        .expect("line item pattern is a valid regex")
});

/// The ordered list of labelled field patterns, in extraction order.
pub fn field_patterns() -> &'static [FieldPattern] {
    &FIELD_PATTERNS
}

/// Matches every line item in the items block, non-overlapping, in document
/// order. Each match yields one [`LineItem`] with the numeric captures
/// converted and the name trimmed. Digit runs too large for `u32` are treated
/// as noise and skipped.
pub fn match_line_items(block: &str) -> Vec<LineItem> {
    LINE_ITEM_PATTERN
        .captures_iter(block)
        .filter_map(|caps| {
            let code = caps[1].parse().ok()?;
            let quantity = caps[3].parse().ok()?;
            Some(LineItem {
                code,
                name: caps[2].trim().to_string(),
                quantity,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_patterns_are_ordered() {
        let names: Vec<_> = field_patterns().iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            vec![FIELD_PATIENT_ID, FIELD_PRESCRIBER_CODE, FIELD_ISSUE_DATE]
        );
    }

    #[test]
    fn test_patient_id_pattern_bounds() {
        let pattern = &field_patterns()[0];
        assert_eq!(
            pattern.first_match("Paciente DNI: 12345678"),
            Some("12345678")
        );
        // Seven digits do not satisfy the 8-digit minimum
        assert_eq!(pattern.first_match("Paciente DNI: 1234567"), None);
    }

    #[test]
    fn test_patterns_are_label_sensitive() {
        let pattern = &field_patterns()[1];
        assert_eq!(pattern.first_match("Médico CMP: ABC123"), Some("ABC123"));
        assert_eq!(pattern.first_match("medico cmp: ABC123"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let pattern = &field_patterns()[2];
        let text = "Fecha de emisión: 2024-01-01\nFecha de emisión: 2025-12-31";
        assert_eq!(pattern.first_match(text), Some("2024-01-01"));
    }

    #[test]
    fn test_match_line_items_in_document_order() {
        let block = "Productos:\n\
                     - Código: 1, Nombre: Paracetamol, Cantidad: 2\n\
                     - Código: 7, Nombre: Ibuprofeno 400mg, Cantidad: 1\n";
        let items = match_line_items(block);
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0],
            LineItem {
                code: 1,
                name: "Paracetamol".to_string(),
                quantity: 2
            }
        );
        assert_eq!(items[1].code, 7);
        assert_eq!(items[1].name, "Ibuprofeno 400mg");
    }

    #[test]
    fn test_match_line_items_trims_names() {
        let items = match_line_items("- Código: 3, Nombre:   Amoxicilina  , Cantidad: 5");
        assert_eq!(items[0].name, "Amoxicilina");
    }

    #[test]
    fn test_match_line_items_none_in_empty_block() {
        assert!(match_line_items("").is_empty());
        assert!(match_line_items("Productos:\nnothing structured").is_empty());
    }

    #[test]
    fn test_malformed_items_are_not_matched() {
        // Missing the quantity label
        let items = match_line_items("- Código: 1, Nombre: Paracetamol, 2");
        assert!(items.is_empty());
    }

    #[test]
    fn test_zero_quantity_is_parsed_not_rejected() {
        // Structural validation, not the matcher, rejects zero quantities
        let items = match_line_items("- Código: 1, Nombre: Paracetamol, Cantidad: 0");
        assert_eq!(items[0].quantity, 0);
    }
}
