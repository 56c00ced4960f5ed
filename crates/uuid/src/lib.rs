//! Identifier and sharded-path utilities.
//!
//! RxGate stores prescription records and document blobs under sharded
//! directories derived from an identifier.
//!
//! To keep path derivation deterministic and consistent across the codebase,
//! RxGate uses a *canonical* UUID representation for record identifiers:
//! **32 lowercase hexadecimal characters** (no hyphens).
//!
//! This crate provides:
//! - A wrapper type ([`ShardableUuid`]) that *guarantees* the canonical format
//!   once constructed, plus the shared sharding logic for deriving a record's
//!   directory from its identifier.
//! - [`Sha256Hash`], the validated hex digest used to content-address stored
//!   prescription documents.
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! Notes:
//! - This is the same value you would get from `Uuid::new_v4().simple().to_string()`.
//! - Canonical form is *required* for externally supplied identifiers (for
//!   example, from CLI/API inputs). Use [`ShardableUuid::parse`] to validate
//!   an input string.
//! - Non-canonical values (uppercase, hyphenated, wrong length, non-hex) are rejected.
//!
//! ## Sharded directory layout
//! For a canonical identifier `u`, data lives under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! Example:
//! `data/records/55/0e/550e8400e29b41d4a716446655440000/`
//!
//! This scheme prevents very large fan-out in a single directory.

mod service;

// Re-export public types
pub use service::{Sha256Hash, ShardableUuid, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
