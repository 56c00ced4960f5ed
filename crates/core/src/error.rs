use crate::parse::ExtractedFields;
use crate::prescription::LineItem;
use chrono::NaiveDate;

/// Why the validation engine refused a prescription.
///
/// Each variant carries enough structured detail for the caller to explain the
/// rejection to an end user without re-deriving it: the missing fields, the
/// offending line item, or the computed elapsed days against the configured
/// window.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RejectionReason {
    #[error("document is missing required fields: {}", missing.join(", "))]
    IncompleteDocument {
        /// Names of the fields that were absent or unusable.
        missing: Vec<String>,
        /// Whatever the parser did manage to extract, for diagnostics.
        fields: ExtractedFields,
    },
    #[error("invalid line item (code {}, name '{}', quantity {})", item.code, item.name, item.quantity)]
    InvalidLineItem {
        /// The first line item that failed structural validation.
        item: LineItem,
    },
    #[error("prescriber code '{code}' is not registered or its registration is inactive")]
    PrescriberNotRegistered { code: String },
    #[error("issue date {issue_date} is in the future")]
    FutureDated { issue_date: NaiveDate },
    #[error("prescription expired: {elapsed_days} days since issuance exceeds the {window_days}-day validity window")]
    Expired { elapsed_days: i64, window_days: i64 },
}

/// Errors produced by the prescription pipeline and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// An OCR or document-storage collaborator failed. Never retried by the
    /// core; surfaced to the caller as-is.
    #[error("document could not be processed: {0}")]
    Unprocessable(String),
    #[error("prescription record not found: {0}")]
    RecordNotFound(String),
    /// The validation engine refused the prescription.
    #[error("prescription rejected: {0}")]
    Rejected(#[from] RejectionReason),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to delete record: {0}")]
    FileDelete(std::io::Error),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize record: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to read prescriber registry: {0}")]
    RegistryRead(std::io::Error),
    #[error("failed to parse prescriber registry: {0}")]
    RegistryParse(serde_yaml::Error),
    #[error("identifier error: {0}")]
    Uuid(#[from] rxgate_uuid::UuidError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
