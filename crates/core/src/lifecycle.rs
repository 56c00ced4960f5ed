//! The prescription lifecycle controller.
//!
//! Orchestrates the extraction pipeline against the collaborator ports and
//! commits state transitions. Two entry operations drive the state machine:
//!
//! - **submit** runs extraction and the completeness rule only, creating a
//!   `Pending` record;
//! - **validate-by-id** re-derives the record from its stored document and
//!   runs the full validation engine, committing `Validated` on success.
//!
//! A failing operation never leaves a record half-updated: either the full
//! validated field set is committed or nothing is. Mutating operations on the
//! same record are serialised through an identifier-keyed lock table, so
//! concurrent validations of one record cannot race a delete or each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rxgate_uuid::ShardableUuid;

use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};
use crate::parse::{ExtractedFields, FieldParser};
use crate::ports::{
    DocumentRef, DocumentStore, OcrService, PageRequest, PrescriberRegistry, RecordFilter,
    RecordPage, RecordStore,
};
use crate::prescription::{PrescriptionRecord, ValidationState};
use crate::transcript::Transcript;
use crate::validate::ValidationEngine;

/// Source of the current time, injectable for deterministic tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Identifier-keyed lock table serialising per-record mutations.
///
/// Entries are never reclaimed; the table grows with the set of records that
/// have been mutated, each entry a single small allocation.
#[derive(Default)]
struct RecordLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl RecordLocks {
    fn for_record(&self, id: &ShardableUuid) -> Arc<Mutex<()>> {
        let mut table = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        table.entry(id.to_string()).or_default().clone()
    }
}

/// Orchestrates extraction, validation and persistence for prescriptions.
pub struct PrescriptionService {
    ocr: Arc<dyn OcrService>,
    documents: Arc<dyn DocumentStore>,
    registry: Arc<dyn PrescriberRegistry>,
    records: Arc<dyn RecordStore>,
    parser: FieldParser,
    engine: ValidationEngine,
    clock: Arc<dyn Clock>,
    locks: RecordLocks,
}

impl PrescriptionService {
    /// Wires the controller to its collaborators, using the wall clock.
    pub fn new(
        cfg: &CoreConfig,
        ocr: Arc<dyn OcrService>,
        documents: Arc<dyn DocumentStore>,
        registry: Arc<dyn PrescriberRegistry>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            ocr,
            documents,
            registry,
            records,
            parser: FieldParser::new(),
            engine: ValidationEngine::new(cfg.validity_window_days()),
            clock: Arc::new(SystemClock),
            locks: RecordLocks::default(),
        }
    }

    /// Replaces the clock, for deterministic tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn extract_fields(&self, document: &[u8]) -> CoreResult<ExtractedFields> {
        let lines = self.ocr.recognize(document)?;
        let transcript = Transcript::new(lines);
        Ok(self.parser.parse(&transcript))
    }

    /// Best-effort removal of a document stored during a failed submission.
    fn rollback_document(&self, reference: &DocumentRef) {
        if let Err(e) = self.documents.delete(reference) {
            tracing::warn!(
                document = %reference,
                error = %e,
                "failed to remove document after rejected submission"
            );
        }
    }

    /// Submits a new prescription document.
    ///
    /// Stores the document, recognises and parses it, and requires the
    /// completeness rule (only): the full validation engine does not run on
    /// this path. On success a `Pending` record is created. On any failure
    /// nothing is left behind — the stored document is removed again and the
    /// rejection carries the partially extracted fields for diagnostics.
    pub fn submit(&self, document: &[u8]) -> CoreResult<PrescriptionRecord> {
        let reference = self.documents.store(document)?;
        tracing::info!(document = %reference, bytes = document.len(), "stored submitted document");

        let fields = match self.extract_fields(document) {
            Ok(fields) => fields,
            Err(e) => {
                self.rollback_document(&reference);
                return Err(e);
            }
        };

        let validated = match ValidationEngine::check_completeness(&fields) {
            Ok(validated) => validated,
            Err(reason) => {
                tracing::warn!(document = %reference, reason = %reason, "submission rejected");
                self.rollback_document(&reference);
                return Err(CoreError::Rejected(reason));
            }
        };

        let record = PrescriptionRecord {
            id: ShardableUuid::new(),
            patient_id: validated.patient_id,
            prescriber_code: validated.prescriber_code,
            issue_date: validated.issue_date,
            line_items: validated.line_items,
            source_document: reference.clone(),
            validation_state: ValidationState::Pending,
            created_at: self.clock.now(),
        };

        if let Err(e) = self.records.create(&record) {
            self.rollback_document(&reference);
            return Err(e);
        }

        tracing::info!(record = %record.id, "created pending prescription record");
        Ok(record)
    }

    /// Validates an existing record against its stored document.
    ///
    /// The record is always re-derived from the source document: the stored
    /// document is fetched, recognised and parsed afresh, and the validation
    /// engine runs on the newly extracted fields rather than the previously
    /// persisted ones. On success every field is overwritten with the fresh
    /// values and the record transitions to `Validated`. On failure the
    /// record is left exactly as it was.
    pub fn validate_by_id(&self, id: &ShardableUuid) -> CoreResult<PrescriptionRecord> {
        let lock = self.locks.for_record(id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(mut record) = self.records.get(id)? else {
            return Err(CoreError::RecordNotFound(id.to_string()));
        };

        if record.validation_state == ValidationState::Validated {
            return Err(CoreError::InvalidInput(format!(
                "prescription {} is already validated",
                id
            )));
        }

        tracing::info!(record = %id, document = %record.source_document, "revalidating from stored document");
        let document = self.documents.fetch(&record.source_document)?;
        let fields = self.extract_fields(&document)?;

        let validated = self
            .engine
            .validate(&fields, self.registry.as_ref(), self.clock.now())
            .inspect_err(|e| {
                tracing::warn!(record = %id, error = %e, "validation failed; record unchanged");
            })?;

        record.patient_id = validated.patient_id;
        record.prescriber_code = validated.prescriber_code;
        record.issue_date = validated.issue_date;
        record.line_items = validated.line_items;
        record.validation_state = ValidationState::Validated;

        self.records.update(&record)?;
        tracing::info!(record = %id, "prescription validated");
        Ok(record)
    }

    /// Fetches a record and, when the document store can produce one, a URL
    /// for retrieving the original document.
    pub fn get(&self, id: &ShardableUuid) -> CoreResult<(PrescriptionRecord, Option<String>)> {
        let Some(record) = self.records.get(id)? else {
            return Err(CoreError::RecordNotFound(id.to_string()));
        };
        let url = self.documents.download_url(&record.source_document)?;
        Ok((record, url))
    }

    /// Deletes a record and its stored document, from either state.
    ///
    /// The document is removed first; if that fails the record is kept so the
    /// failure can be retried by the caller.
    pub fn delete(&self, id: &ShardableUuid) -> CoreResult<()> {
        let lock = self.locks.for_record(id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(record) = self.records.get(id)? else {
            return Err(CoreError::RecordNotFound(id.to_string()));
        };

        self.documents.delete(&record.source_document)?;
        self.records.delete(id)?;
        tracing::info!(record = %id, "deleted prescription record and document");
        Ok(())
    }

    /// Lists records matching `filter`, newest first, with clamped paging.
    pub fn list(&self, filter: &RecordFilter, page: PageRequest) -> CoreResult<RecordPage> {
        self.records.list(filter, page)
    }
}
