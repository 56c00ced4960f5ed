//! RxGate Document Vault
//!
//! This crate stores the original prescription documents that records are
//! derived from, and implements the core's `DocumentStore` port over that
//! vault.
//!
//! ## Design Principles
//!
//! - Structured records and binary documents are deliberately separated
//! - Documents are immutable once stored; validation re-reads the original
//!   bytes, never a cached extraction
//! - Every stored document carries a metadata sidecar with its SHA-256
//!   digest, verified on every read
//! - References to documents are opaque outside this crate
//!
//! ## Storage Layout
//!
//! Each document lives under a sharded directory derived from its identifier:
//!
//! ```text
//! <documents_dir>/
//! └── <s1>/<s2>/<32hex-uuid>/
//!     ├── document.bin     # the original bytes, immutable
//!     └── metadata.yaml    # digest, size, media type, stored-at timestamp
//! ```
//!
//! where `s1`/`s2` are the first four hex characters of the identifier.

mod files;

pub use files::{DocumentMetadata, FilesService, DOCUMENT_FILE_NAME, METADATA_FILE_NAME};
pub use rxgate_uuid::ShardableUuid;

/// Errors that can occur during document vault operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Vault root could not be created or is not a directory
    #[error("Invalid documents directory: {0}")]
    InvalidDocumentsDirectory(String),

    /// No document stored under the given reference
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Stored bytes no longer match the recorded digest
    #[error("Document {reference} failed integrity check: expected {expected}, found {actual}")]
    IntegrityMismatch {
        reference: String,
        expected: String,
        actual: String,
    },

    /// Metadata sidecar could not be serialised or parsed
    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_yaml::Error),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Identifier error from rxgate-uuid
    #[error("Identifier error: {0}")]
    Uuid(#[from] rxgate_uuid::UuidError),
}
