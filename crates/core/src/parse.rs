//! Field extraction from a recognised transcript.
//!
//! Applies the ordered field patterns against the transcript blob and the
//! line-item matcher against the items block, producing an
//! [`ExtractedFields`] in which every field is optional. Parsing never fails:
//! a field the document does not carry is simply absent, and the caller
//! decides whether absence is a failure condition.

use serde::{Deserialize, Serialize};

use crate::patterns::{
    field_patterns, match_line_items, FIELD_ISSUE_DATE, FIELD_LINE_ITEMS, FIELD_PATIENT_ID,
    FIELD_PRESCRIBER_CODE,
};
use crate::prescription::LineItem;
use crate::transcript::{items_block, Transcript};

/// The structured fields recovered from one transcript.
///
/// Values are exactly as matched on the document; no normalisation beyond
/// trimming line-item names is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub patient_id: Option<String>,
    pub prescriber_code: Option<String>,
    pub issue_date: Option<String>,
    pub line_items: Vec<LineItem>,
}

impl ExtractedFields {
    /// Names of the required fields that were not found.
    ///
    /// A field counts as missing when it is absent or empty; an extraction
    /// yielding zero line items counts as a missing `line_items` field, never
    /// as an empty list.
    pub fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.patient_id.as_deref().unwrap_or("").is_empty() {
            missing.push(FIELD_PATIENT_ID.to_string());
        }
        if self.prescriber_code.as_deref().unwrap_or("").is_empty() {
            missing.push(FIELD_PRESCRIBER_CODE.to_string());
        }
        if self.issue_date.as_deref().unwrap_or("").is_empty() {
            missing.push(FIELD_ISSUE_DATE.to_string());
        }
        if self.line_items.is_empty() {
            missing.push(FIELD_LINE_ITEMS.to_string());
        }
        missing
    }

    /// Whether every required field was found.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Parser applying the fixed pattern set to a transcript.
#[derive(Default, Clone)]
pub struct FieldParser;

impl FieldParser {
    pub fn new() -> Self {
        Self
    }

    /// Extracts the structured fields from a transcript.
    ///
    /// Runs each named field pattern against the full blob (first match
    /// wins), then the line-item matcher against the items block. Idempotent:
    /// the same transcript always yields the same fields.
    pub fn parse(&self, transcript: &Transcript) -> ExtractedFields {
        let text = transcript.text();

        let mut fields = ExtractedFields::default();
        for pattern in field_patterns() {
            let value = pattern.first_match(&text).map(|v| v.to_string());
            match pattern.name() {
                FIELD_PATIENT_ID => fields.patient_id = value,
                FIELD_PRESCRIBER_CODE => fields.prescriber_code = value,
                FIELD_ISSUE_DATE => fields.issue_date = value,
                other => {
                    tracing::warn!("unhandled field pattern '{}'", other);
                }
            }
        }

        fields.line_items = match_line_items(items_block(&text));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(lines: &[&str]) -> Transcript {
        Transcript::new(lines.iter().map(|l| l.to_string()).collect())
    }

    fn well_formed() -> Transcript {
        transcript(&[
            "Paciente DNI: 12345678",
            "Médico CMP: ABC123",
            "Fecha de emisión: 2024-01-01",
            "Productos:",
            "- Código: 1, Nombre: Paracetamol, Cantidad: 2",
            "Observaciones:",
            "Ninguna",
        ])
    }

    #[test]
    fn test_parse_well_formed_document() {
        let fields = FieldParser::new().parse(&well_formed());

        assert_eq!(fields.patient_id.as_deref(), Some("12345678"));
        assert_eq!(fields.prescriber_code.as_deref(), Some("ABC123"));
        assert_eq!(fields.issue_date.as_deref(), Some("2024-01-01"));
        assert_eq!(
            fields.line_items,
            vec![LineItem {
                code: 1,
                name: "Paracetamol".to_string(),
                quantity: 2
            }]
        );
        assert!(fields.is_complete());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = FieldParser::new();
        let t = well_formed();
        assert_eq!(parser.parse(&t), parser.parse(&t));
    }

    #[test]
    fn test_missing_products_marker_yields_no_items() {
        let fields = FieldParser::new().parse(&transcript(&[
            "Paciente DNI: 12345678",
            "Médico CMP: ABC123",
            "Fecha de emisión: 2024-01-01",
            "- Código: 1, Nombre: Paracetamol, Cantidad: 2",
        ]));

        assert!(fields.line_items.is_empty());
        assert_eq!(fields.missing_fields(), vec!["line_items"]);
        assert!(!fields.is_complete());
    }

    #[test]
    fn test_parse_never_fails_on_garbage() {
        let fields = FieldParser::new().parse(&transcript(&["complete nonsense", "$$$$"]));

        assert_eq!(fields, ExtractedFields::default());
        assert_eq!(
            fields.missing_fields(),
            vec!["patient_id", "prescriber_code", "issue_date", "line_items"]
        );
    }

    #[test]
    fn test_item_count_matches_pattern_occurrences() {
        let fields = FieldParser::new().parse(&transcript(&[
            "Paciente DNI: 87654321",
            "Médico CMP: Z9",
            "Fecha de emisión: 2024-02-02",
            "Productos:",
            "- Código: 1, Nombre: Uno, Cantidad: 1",
            "- Código: 2, Nombre: Dos, Cantidad: 2",
            "- Código: 3, Nombre: Tres, Cantidad: 3",
            "Observaciones:",
        ]));

        assert_eq!(fields.line_items.len(), 3);
        let codes: Vec<_> = fields.line_items.iter().map(|i| i.code).collect();
        assert_eq!(codes, vec![1, 2, 3]);
    }

    #[test]
    fn test_items_outside_block_are_ignored() {
        let fields = FieldParser::new().parse(&transcript(&[
            "- Código: 9, Nombre: Fuera, Cantidad: 9",
            "Productos:",
            "- Código: 1, Nombre: Dentro, Cantidad: 1",
            "Observaciones:",
            "- Código: 8, Nombre: Tarde, Cantidad: 8",
        ]));

        assert_eq!(fields.line_items.len(), 1);
        assert_eq!(fields.line_items[0].name, "Dentro");
    }
}
