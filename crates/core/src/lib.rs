//! # RxGate Core
//!
//! Core business logic for the RxGate prescription validation system.
//!
//! This crate contains the extraction-and-validation pipeline:
//! - Transcript handling and line-item block isolation
//! - Pattern-based field extraction from recognised document text
//! - The validation engine (completeness, line items, registry, temporal rules)
//! - The lifecycle controller that orchestrates submission and validation
//!   against injected collaborator ports
//!
//! **No API concerns**: HTTP servers and request/response types belong in
//! `api-rest` and `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod lifecycle;
pub mod ocr;
pub mod parse;
pub mod patterns;
pub mod ports;
pub mod prescription;
pub mod registry;
pub mod store;
pub mod transcript;
pub mod validate;

pub use config::{validity_window_from_env_value, CoreConfig};
pub use error::{CoreError, CoreResult, RejectionReason};
pub use lifecycle::{Clock, PrescriptionService, SystemClock};
pub use ocr::PlainTextOcr;
pub use parse::{ExtractedFields, FieldParser};
pub use ports::{
    DocumentRef, DocumentStore, OcrService, PageRequest, PrescriberRegistry, RecordFilter,
    RecordPage, RecordStore,
};
pub use prescription::{LineItem, Prescriber, PrescriptionRecord, ValidationState};
pub use registry::FileRegistry;
pub use rxgate_types::{NonEmptyText, PatientId, PrescriberCode};
pub use rxgate_uuid::ShardableUuid;
pub use store::FileRecordStore;
pub use transcript::{items_block, Transcript};
pub use validate::{ValidatedFields, ValidationEngine};
