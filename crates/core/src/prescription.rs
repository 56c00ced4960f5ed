//! The prescription record data model.

use chrono::{DateTime, Utc};
use rxgate_types::{PatientId, PrescriberCode};
use rxgate_uuid::ShardableUuid;
use serde::{Deserialize, Serialize};

use crate::ports::DocumentRef;

/// Validation lifecycle state of a prescription record.
///
/// Records are created `Pending` and move to `Validated` only through a
/// successful validation run. There is no persisted rejected state: a
/// rejection is reported to the caller and the record is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    Pending,
    Validated,
}

impl ValidationState {
    /// The wire/query string form of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationState::Pending => "pending",
            ValidationState::Validated => "validated",
        }
    }

    /// Parses a state from its wire/query string form.
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "pending" => Some(ValidationState::Pending),
            "validated" => Some(ValidationState::Validated),
            _ => None,
        }
    }
}

impl std::fmt::Display for ValidationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One prescribed product as printed on the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product code. Non-negative by construction.
    pub code: u32,
    /// Product display name, trimmed of surrounding whitespace. May be empty
    /// when the document carried only whitespace; structural validation
    /// rejects such items.
    pub name: String,
    /// Prescribed quantity. Structural validation requires at least 1.
    pub quantity: u32,
}

/// A prescriber as known to the external registry.
///
/// The core only reads this entity; the registry collaborator owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescriber {
    /// Professional registration code, matched against the code extracted
    /// from the document.
    pub registration_code: String,
    /// Whether the prescriber's professional licence is currently active.
    pub registration_valid: bool,
}

/// A structured prescription record derived from a scanned document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionRecord {
    /// Canonical record identifier.
    pub id: ShardableUuid,
    /// Patient national identifier (8-12 digits).
    pub patient_id: PatientId,
    /// Prescriber professional registration code.
    pub prescriber_code: PrescriberCode,
    /// Issue date exactly as printed on the document (digits and hyphens).
    /// Parsed into a calendar date at validation time.
    pub issue_date: String,
    /// Prescribed products in document order. Never empty for a record that
    /// completed extraction.
    pub line_items: Vec<LineItem>,
    /// Opaque reference to the stored original document.
    pub source_document: DocumentRef,
    pub validation_state: ValidationState,
    /// UTC timestamp of record creation; listings sort on this, descending.
    pub created_at: DateTime<Utc>,
}
