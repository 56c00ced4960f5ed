//! Document vault service implementation
//!
//! This module provides the [`FilesService`] type, which manages binary
//! storage and retrieval of original prescription documents.
//!
//! # Architecture
//!
//! The storage model enforces strict separation of concerns:
//!
//! - **Semantic data** (the structured prescription record) lives in the
//!   record store
//! - **Binary data** (the scanned original) is stored here, immutable
//! - **References** between them are explicit and opaque
//!
//! This separation ensures that validation can always re-derive a record from
//! the authoritative original bytes, and that record storage stays efficient.
//!
//! # Integrity
//!
//! Every stored document is accompanied by a metadata sidecar recording its
//! SHA-256 digest. Reads recompute the digest and fail loudly when the bytes
//! on disk no longer match — a corrupted original must never flow into
//! validation silently.

use crate::FilesError;
use chrono::{DateTime, Utc};
use rxgate_core::{CoreError, CoreResult, DocumentRef, DocumentStore};
use rxgate_types::NonEmptyText;
use rxgate_uuid::{Sha256Hash, ShardableUuid};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Filename of the stored document bytes within a document directory.
pub const DOCUMENT_FILE_NAME: &str = "document.bin";

/// Filename of the metadata sidecar within a document directory.
pub const METADATA_FILE_NAME: &str = "metadata.yaml";

/// Metadata sidecar for a stored document
///
/// Serialised to YAML next to the binary file. It provides an auditable
/// record of the stored original without duplicating any clinical content.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Hashing algorithm used (always "sha256" for the current implementation)
    pub hash_algorithm: NonEmptyText,

    /// Hexadecimal digest of the document content
    pub hash: Sha256Hash,

    /// Size of the document in bytes
    pub size_bytes: u64,

    /// Detected media type (MIME type), if available
    ///
    /// Best-effort detection from the leading bytes; may be `None` when the
    /// media type cannot be determined.
    pub media_type: Option<NonEmptyText>,

    /// UTC timestamp when the document was stored
    pub stored_at: DateTime<Utc>,
}

/// Service for managing original prescription documents
///
/// The `FilesService` provides a safe, vault-scoped interface for storing,
/// reading and removing document bytes. Documents are immutable: stores
/// allocate a fresh identifier, and nothing ever rewrites stored bytes.
#[derive(Debug)]
pub struct FilesService {
    /// Root directory of the document vault
    documents_dir: PathBuf,
}

impl FilesService {
    /// Creates a `FilesService` rooted at `documents_dir`
    ///
    /// The directory is created if it does not yet exist.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidDocumentsDirectory` if the path exists but
    /// is not a directory, or cannot be created.
    pub fn new(documents_dir: &Path) -> Result<Self, FilesError> {
        if documents_dir.exists() && !documents_dir.is_dir() {
            return Err(FilesError::InvalidDocumentsDirectory(format!(
                "Path is not a directory: {}",
                documents_dir.display()
            )));
        }

        fs::create_dir_all(documents_dir).map_err(|e| {
            FilesError::InvalidDocumentsDirectory(format!(
                "Cannot create {}: {}",
                documents_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            documents_dir: documents_dir.to_path_buf(),
        })
    }

    /// Stores document bytes under a fresh identifier
    ///
    /// Writes the bytes and a metadata sidecar carrying the SHA-256 digest,
    /// size, detected media type and storage timestamp.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if directory creation, the byte write or the
    /// sidecar write fails.
    pub fn store_bytes(
        &self,
        bytes: &[u8],
    ) -> Result<(ShardableUuid, DocumentMetadata), FilesError> {
        let id = ShardableUuid::new();
        let dir = id.sharded_dir(&self.documents_dir);
        fs::create_dir_all(&dir)?;

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let hash_array: [u8; 32] = hasher.finalize().into();
        let hash = Sha256Hash::from_bytes(&hash_array);

        // Detect media type (best-effort)
        let media_type = infer::get(bytes)
            .map(|kind| NonEmptyText::new(kind.mime_type()).expect("mime type is non-empty"));

        let metadata = DocumentMetadata {
            hash_algorithm: NonEmptyText::new("sha256").expect("sha256 is non-empty"),
            hash,
            size_bytes: bytes.len() as u64,
            media_type,
            stored_at: Utc::now(),
        };

        fs::write(dir.join(DOCUMENT_FILE_NAME), bytes)?;
        let sidecar = serde_yaml::to_string(&metadata)?;
        fs::write(dir.join(METADATA_FILE_NAME), sidecar)?;

        tracing::debug!(document = %id, bytes = bytes.len(), "stored document");
        Ok((id, metadata))
    }

    /// Reads a stored document back, verifying its digest
    ///
    /// # Errors
    ///
    /// Returns `FilesError::DocumentNotFound` for unknown identifiers and
    /// `FilesError::IntegrityMismatch` when the bytes on disk no longer match
    /// the recorded digest.
    pub fn read(&self, id: &ShardableUuid) -> Result<Vec<u8>, FilesError> {
        let dir = id.sharded_dir(&self.documents_dir);
        let document_path = dir.join(DOCUMENT_FILE_NAME);
        if !document_path.is_file() {
            return Err(FilesError::DocumentNotFound(id.to_string()));
        }

        let bytes = fs::read(&document_path)?;
        let metadata = self.metadata(id)?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash_array: [u8; 32] = hasher.finalize().into();
        let actual = Sha256Hash::from_bytes(&hash_array);

        if actual != metadata.hash {
            return Err(FilesError::IntegrityMismatch {
                reference: id.to_string(),
                expected: metadata.hash.to_string(),
                actual: actual.to_string(),
            });
        }

        Ok(bytes)
    }

    /// Reads the metadata sidecar for a stored document
    pub fn metadata(&self, id: &ShardableUuid) -> Result<DocumentMetadata, FilesError> {
        let path = id.sharded_dir(&self.documents_dir).join(METADATA_FILE_NAME);
        if !path.is_file() {
            return Err(FilesError::DocumentNotFound(id.to_string()));
        }
        let raw = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Removes a stored document and its sidecar
    ///
    /// # Errors
    ///
    /// Returns `FilesError::DocumentNotFound` for unknown identifiers.
    pub fn remove(&self, id: &ShardableUuid) -> Result<(), FilesError> {
        let dir = id.sharded_dir(&self.documents_dir);
        if !dir.join(DOCUMENT_FILE_NAME).is_file() {
            return Err(FilesError::DocumentNotFound(id.to_string()));
        }
        fs::remove_dir_all(&dir)?;
        tracing::debug!(document = %id, "removed document");
        Ok(())
    }

    /// Absolute path of the stored bytes for a document
    fn document_path(&self, id: &ShardableUuid) -> PathBuf {
        id.sharded_dir(&self.documents_dir).join(DOCUMENT_FILE_NAME)
    }
}

fn parse_reference(reference: &DocumentRef) -> CoreResult<ShardableUuid> {
    ShardableUuid::parse(reference.as_str())
        .map_err(|e| CoreError::Unprocessable(format!("invalid document reference: {}", e)))
}

/// The vault as seen through the core's collaborator port.
///
/// Vault failures surface as `CoreError::Unprocessable`, the taxonomy entry
/// for storage collaborator faults.
impl DocumentStore for FilesService {
    fn store(&self, document: &[u8]) -> CoreResult<DocumentRef> {
        let (id, _metadata) = self
            .store_bytes(document)
            .map_err(|e| CoreError::Unprocessable(format!("failed to store document: {}", e)))?;
        Ok(DocumentRef::new(id.to_string()))
    }

    fn fetch(&self, reference: &DocumentRef) -> CoreResult<Vec<u8>> {
        let id = parse_reference(reference)?;
        self.read(&id)
            .map_err(|e| CoreError::Unprocessable(format!("failed to fetch document: {}", e)))
    }

    fn delete(&self, reference: &DocumentRef) -> CoreResult<()> {
        let id = parse_reference(reference)?;
        self.remove(&id)
            .map_err(|e| CoreError::Unprocessable(format!("failed to delete document: {}", e)))
    }

    fn download_url(&self, reference: &DocumentRef) -> CoreResult<Option<String>> {
        let id = parse_reference(reference)?;
        let path = self.document_path(&id);
        if path.is_file() {
            Ok(Some(format!("file://{}", path.display())))
        } else {
            Ok(None)
        }
    }
}
