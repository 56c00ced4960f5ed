//! Collaborator contracts consumed by the prescription pipeline.
//!
//! The lifecycle controller talks to four external collaborators: an OCR
//! service, a document store, a prescriber registry and a record store. Each
//! is modelled as a trait so implementations can be swapped and tests can run
//! deterministically without network or filesystem access.
//!
//! Calls into these collaborators may be slow external I/O. The core neither
//! retries nor imposes timeouts; implementations own their cancellation and
//! timeout policy.

use serde::{Deserialize, Serialize};

use crate::constants::{MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use crate::error::CoreResult;
use crate::prescription::{Prescriber, PrescriptionRecord, ValidationState};
use rxgate_uuid::ShardableUuid;

/// Opaque reference to a stored document.
///
/// Produced by a [`DocumentStore`] on store and handed back verbatim for
/// fetch/delete. The core never interprets its contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef(String);

impl DocumentRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optical character recognition of a scanned document.
///
/// Implementations return the recognised text as ordered lines, top to
/// bottom. Failures surface as [`CoreError::Unprocessable`] and are never
/// retried by the core.
///
/// [`CoreError::Unprocessable`]: crate::error::CoreError::Unprocessable
pub trait OcrService: Send + Sync {
    fn recognize(&self, document: &[u8]) -> CoreResult<Vec<String>>;
}

/// Storage for original prescription documents.
pub trait DocumentStore: Send + Sync {
    /// Stores the document bytes and returns an opaque reference to them.
    fn store(&self, document: &[u8]) -> CoreResult<DocumentRef>;

    /// Retrieves a previously stored document.
    fn fetch(&self, reference: &DocumentRef) -> CoreResult<Vec<u8>>;

    /// Removes a stored document.
    fn delete(&self, reference: &DocumentRef) -> CoreResult<()>;

    /// A URL from which the original document can be retrieved, when the
    /// store can produce one.
    fn download_url(&self, _reference: &DocumentRef) -> CoreResult<Option<String>> {
        Ok(None)
    }
}

/// Read-only lookup into the external prescriber registry.
pub trait PrescriberRegistry: Send + Sync {
    /// Looks up a prescriber by registration code. Absence is `Ok(None)`,
    /// not an error.
    fn lookup(&self, code: &str) -> CoreResult<Option<Prescriber>>;
}

/// Filter for record listings. All criteria are conjunctive; `None` matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub patient_id: Option<String>,
    pub prescriber_code: Option<String>,
    pub state: Option<ValidationState>,
}

impl RecordFilter {
    /// Whether a record satisfies every set criterion.
    pub fn matches(&self, record: &PrescriptionRecord) -> bool {
        if let Some(patient_id) = &self.patient_id {
            if record.patient_id.as_str() != patient_id {
                return false;
            }
        }
        if let Some(code) = &self.prescriber_code {
            if record.prescriber_code.as_str() != code {
                return false;
            }
        }
        if let Some(state) = self.state {
            if record.validation_state != state {
                return false;
            }
        }
        true
    }
}

/// A page request with bounds enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Clamps the request to the supported bounds: `page >= 1` and
    /// `page_size` within `[1, 100]`.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.max(1),
            page_size: self.page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE),
        }
    }
}

/// One page of a record listing, sorted by creation time descending.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPage {
    pub page: u32,
    pub page_size: u32,
    /// Total number of records matching the filter, across all pages.
    pub total: u64,
    pub items: Vec<PrescriptionRecord>,
}

/// Persistence for prescription records.
pub trait RecordStore: Send + Sync {
    /// Persists a freshly created record.
    fn create(&self, record: &PrescriptionRecord) -> CoreResult<()>;

    /// Fetches a record by identifier. Absence is `Ok(None)`.
    fn get(&self, id: &ShardableUuid) -> CoreResult<Option<PrescriptionRecord>>;

    /// Overwrites an existing record. Fails if the record does not exist.
    fn update(&self, record: &PrescriptionRecord) -> CoreResult<()>;

    /// Removes a record. Fails if the record does not exist.
    fn delete(&self, id: &ShardableUuid) -> CoreResult<()>;

    /// Lists records matching `filter`, sorted by creation time descending,
    /// with `page` bounds enforced to `[1, 100]`.
    fn list(&self, filter: &RecordFilter, page: PageRequest) -> CoreResult<RecordPage>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prescription::LineItem;
    use rxgate_types::{PatientId, PrescriberCode};

    fn record() -> PrescriptionRecord {
        PrescriptionRecord {
            id: ShardableUuid::new(),
            patient_id: PatientId::new("12345678").unwrap(),
            prescriber_code: PrescriberCode::new("ABC123").unwrap(),
            issue_date: "2024-01-01".to_string(),
            line_items: vec![LineItem {
                code: 1,
                name: "Paracetamol".to_string(),
                quantity: 2,
            }],
            source_document: DocumentRef::new("doc"),
            validation_state: ValidationState::Pending,
            created_at: "2024-01-02T00:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_page_request_clamping() {
        assert_eq!(PageRequest::new(0, 0).clamped(), PageRequest::new(1, 1));
        assert_eq!(
            PageRequest::new(1, 1000).clamped(),
            PageRequest::new(1, 100)
        );
        assert_eq!(PageRequest::new(3, 25).clamped(), PageRequest::new(3, 25));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(RecordFilter::default().matches(&record()));
    }

    #[test]
    fn test_filter_criteria_are_conjunctive() {
        let filter = RecordFilter {
            patient_id: Some("12345678".to_string()),
            prescriber_code: Some("ABC123".to_string()),
            state: Some(ValidationState::Pending),
        };
        assert!(filter.matches(&record()));

        let mismatched_state = RecordFilter {
            state: Some(ValidationState::Validated),
            ..filter.clone()
        };
        assert!(!mismatched_state.matches(&record()));

        let mismatched_patient = RecordFilter {
            patient_id: Some("99999999".to_string()),
            ..filter
        };
        assert!(!mismatched_patient.matches(&record()));
    }
}
