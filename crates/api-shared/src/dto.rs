//! Request/response bodies for the RxGate API.
//!
//! These DTOs mirror the core domain types with plain JSON-friendly fields so
//! the OpenAPI schema stays independent of core internals. Error responses
//! carry a machine-readable `kind` plus structured `detail` so callers can
//! explain a rejection to an end user without re-deriving it.

use rxgate_core::{CoreError, PrescriptionRecord, RejectionReason};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One prescribed product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LineItemDto {
    pub code: u32,
    pub name: String,
    pub quantity: u32,
}

/// A prescription record as exposed over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PrescriptionDto {
    /// Canonical record identifier (32 lowercase hex characters).
    pub id: String,
    pub patient_id: String,
    pub prescriber_code: String,
    /// Issue date exactly as printed on the document.
    pub issue_date: String,
    pub line_items: Vec<LineItemDto>,
    /// Opaque reference to the stored original document.
    pub source_document: String,
    /// `pending` or `validated`.
    pub validation_state: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl From<&PrescriptionRecord> for PrescriptionDto {
    fn from(record: &PrescriptionRecord) -> Self {
        Self {
            id: record.id.to_string(),
            patient_id: record.patient_id.to_string(),
            prescriber_code: record.prescriber_code.to_string(),
            issue_date: record.issue_date.clone(),
            line_items: record
                .line_items
                .iter()
                .map(|item| LineItemDto {
                    code: item.code,
                    name: item.name.clone(),
                    quantity: item.quantity,
                })
                .collect(),
            source_document: record.source_document.to_string(),
            validation_state: record.validation_state.to_string(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// Response for a successful document submission.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitRes {
    pub message: String,
    pub record: PrescriptionDto,
}

/// Response for a successful validation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidateRes {
    pub message: String,
    pub record: PrescriptionDto,
}

/// Response for fetching a single record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GetRes {
    pub record: PrescriptionDto,
    /// URL for retrieving the original document, when available.
    pub download_url: Option<String>,
}

/// One page of a record listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListRes {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub items: Vec<PrescriptionDto>,
}

/// Response for a successful deletion.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteRes {
    pub message: String,
    pub id: String,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    /// Human-readable description of the failure.
    pub error: String,
    /// Machine-readable failure kind, e.g. `expired` or `record_not_found`.
    pub kind: String,
    /// Structured diagnostics: the missing fields, the offending line item,
    /// or the elapsed days against the configured window.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorRes {
    /// Maps a core error to its wire representation.
    pub fn from_core(err: &CoreError) -> Self {
        let (kind, detail) = match err {
            CoreError::Rejected(reason) => return Self::from_rejection(reason),
            CoreError::Unprocessable(_) => ("unprocessable_document", None),
            CoreError::RecordNotFound(id) => (
                "record_not_found",
                Some(serde_json::json!({ "id": id })),
            ),
            CoreError::InvalidInput(_) => ("invalid_input", None),
            _ => ("internal", None),
        };

        Self {
            error: err.to_string(),
            kind: kind.to_string(),
            detail,
        }
    }

    fn from_rejection(reason: &RejectionReason) -> Self {
        let (kind, detail) = match reason {
            RejectionReason::IncompleteDocument { missing, fields } => (
                "incomplete_document",
                serde_json::json!({ "missing": missing, "fields": fields }),
            ),
            RejectionReason::InvalidLineItem { item } => {
                ("invalid_line_item", serde_json::json!({ "item": item }))
            }
            RejectionReason::PrescriberNotRegistered { code } => (
                "prescriber_not_registered",
                serde_json::json!({ "code": code }),
            ),
            RejectionReason::FutureDated { issue_date } => (
                "future_dated",
                serde_json::json!({ "issue_date": issue_date.to_string() }),
            ),
            RejectionReason::Expired {
                elapsed_days,
                window_days,
            } => (
                "expired",
                serde_json::json!({
                    "elapsed_days": elapsed_days,
                    "window_days": window_days,
                }),
            ),
        };

        Self {
            error: reason.to_string(),
            kind: kind.to_string(),
            detail: Some(detail),
        }
    }
}
