//! End-to-end pipeline tests: raw document bytes through submission,
//! validation and listing, with deterministic collaborators.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tempfile::TempDir;

use rxgate_core::{
    Clock, CoreConfig, CoreError, DocumentRef, DocumentStore, FileRecordStore, FileRegistry,
    PageRequest, PlainTextOcr, Prescriber, PrescriptionService, RecordFilter, RejectionReason,
    ValidationState,
};

#[derive(Default)]
struct MemoryDocs {
    inner: Mutex<HashMap<String, Vec<u8>>>,
    next: Mutex<u64>,
}

impl DocumentStore for MemoryDocs {
    fn store(&self, document: &[u8]) -> Result<DocumentRef, CoreError> {
        let mut next = self.next.lock().unwrap();
        *next += 1;
        let key = format!("mem-{}", *next);
        self.inner
            .lock()
            .unwrap()
            .insert(key.clone(), document.to_vec());
        Ok(DocumentRef::new(key))
    }

    fn fetch(&self, reference: &DocumentRef) -> Result<Vec<u8>, CoreError> {
        self.inner
            .lock()
            .unwrap()
            .get(reference.as_str())
            .cloned()
            .ok_or_else(|| CoreError::Unprocessable(format!("no document at {}", reference)))
    }

    fn delete(&self, reference: &DocumentRef) -> Result<(), CoreError> {
        self.inner.lock().unwrap().remove(reference.as_str());
        Ok(())
    }
}

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn document(patient: &str, issue_date: &str) -> String {
    format!(
        "Paciente DNI: {patient}\n\
         Médico CMP: ABC123\n\
         Fecha de emisión: {issue_date}\n\
         Productos:\n\
         - Código: 1, Nombre: Paracetamol, Cantidad: 2\n\
         Observaciones:\n\
         Ninguna"
    )
}

fn service(temp: &TempDir, now: &str) -> PrescriptionService {
    let cfg = CoreConfig::new(
        temp.path().to_path_buf(),
        PathBuf::from("unused.yaml"),
        30,
    )
    .unwrap();

    let registry = FileRegistry::from_prescribers(vec![Prescriber {
        registration_code: "ABC123".to_string(),
        registration_valid: true,
    }]);

    PrescriptionService::new(
        &cfg,
        Arc::new(PlainTextOcr::new()),
        Arc::new(MemoryDocs::default()),
        Arc::new(registry),
        Arc::new(FileRecordStore::new(cfg.records_dir())),
    )
    .with_clock(Arc::new(FixedClock(
        format!("{now}T00:00:00Z").parse().unwrap(),
    )))
}

#[test]
fn submit_then_validate_accepts_well_formed_document() {
    let temp = TempDir::new().unwrap();
    let svc = service(&temp, "2024-01-10");

    let record = svc
        .submit(document("12345678", "2024-01-01").as_bytes())
        .unwrap();
    assert_eq!(record.validation_state, ValidationState::Pending);

    let validated = svc.validate_by_id(&record.id).unwrap();
    assert_eq!(validated.validation_state, ValidationState::Validated);
    assert_eq!(validated.patient_id.as_str(), "12345678");
    assert_eq!(validated.line_items.len(), 1);
    assert_eq!(validated.line_items[0].name, "Paracetamol");
    assert_eq!(validated.line_items[0].quantity, 2);
}

#[test]
fn validation_expires_sixty_days_after_issuance() {
    let temp = TempDir::new().unwrap();
    let svc = service(&temp, "2024-03-01");

    let record = svc
        .submit(document("12345678", "2024-01-01").as_bytes())
        .unwrap();

    match svc.validate_by_id(&record.id) {
        Err(CoreError::Rejected(RejectionReason::Expired {
            elapsed_days,
            window_days,
        })) => {
            assert_eq!(elapsed_days, 60);
            assert_eq!(window_days, 30);
        }
        other => panic!("expected Expired, got {:?}", other),
    }

    // The record stayed pending.
    let (unchanged, _) = svc.get(&record.id).unwrap();
    assert_eq!(unchanged.validation_state, ValidationState::Pending);
}

#[test]
fn missing_products_marker_rejects_submission() {
    let temp = TempDir::new().unwrap();
    let svc = service(&temp, "2024-01-10");

    let text = "Paciente DNI: 12345678\n\
                Médico CMP: ABC123\n\
                Fecha de emisión: 2024-01-01\n\
                Observaciones:\nNinguna";
    match svc.submit(text.as_bytes()) {
        Err(CoreError::Rejected(RejectionReason::IncompleteDocument { missing, .. })) => {
            assert_eq!(missing, vec!["line_items"]);
        }
        other => panic!("expected IncompleteDocument, got {:?}", other),
    }
}

#[test]
fn unknown_prescriber_rejects_validation_only() {
    let temp = TempDir::new().unwrap();
    let cfg = CoreConfig::new(
        temp.path().to_path_buf(),
        PathBuf::from("unused.yaml"),
        30,
    )
    .unwrap();

    let svc = PrescriptionService::new(
        &cfg,
        Arc::new(PlainTextOcr::new()),
        Arc::new(MemoryDocs::default()),
        Arc::new(FileRegistry::from_prescribers(vec![])),
        Arc::new(FileRecordStore::new(cfg.records_dir())),
    )
    .with_clock(Arc::new(FixedClock("2024-01-10T00:00:00Z".parse().unwrap())));

    // Submission does not consult the registry.
    let record = svc
        .submit(document("12345678", "2024-01-01").as_bytes())
        .unwrap();

    match svc.validate_by_id(&record.id) {
        Err(CoreError::Rejected(RejectionReason::PrescriberNotRegistered { code })) => {
            assert_eq!(code, "ABC123");
        }
        other => panic!("expected PrescriberNotRegistered, got {:?}", other),
    }
}

#[test]
fn listing_sorts_filters_and_paginates() {
    let temp = TempDir::new().unwrap();
    let svc = service(&temp, "2024-01-10");

    let first = svc
        .submit(document("11111111", "2024-01-01").as_bytes())
        .unwrap();
    let second = svc
        .submit(document("22222222", "2024-01-02").as_bytes())
        .unwrap();
    svc.validate_by_id(&second.id).unwrap();

    let all = svc
        .list(&RecordFilter::default(), PageRequest::new(1, 10))
        .unwrap();
    assert_eq!(all.total, 2);

    let by_patient = svc
        .list(
            &RecordFilter {
                patient_id: Some("11111111".to_string()),
                ..Default::default()
            },
            PageRequest::new(1, 10),
        )
        .unwrap();
    assert_eq!(by_patient.total, 1);
    assert_eq!(by_patient.items[0].id, first.id);

    let validated_only = svc
        .list(
            &RecordFilter {
                state: Some(ValidationState::Validated),
                ..Default::default()
            },
            PageRequest::new(1, 10),
        )
        .unwrap();
    assert_eq!(validated_only.total, 1);
    assert_eq!(validated_only.items[0].id, second.id);

    // Oversized page sizes clamp to 100.
    let clamped = svc
        .list(&RecordFilter::default(), PageRequest::new(1, 5000))
        .unwrap();
    assert_eq!(clamped.page_size, 100);
}

#[test]
fn delete_works_from_either_state() {
    let temp = TempDir::new().unwrap();
    let svc = service(&temp, "2024-01-10");

    let pending = svc
        .submit(document("11111111", "2024-01-01").as_bytes())
        .unwrap();
    let validated = svc
        .submit(document("22222222", "2024-01-02").as_bytes())
        .unwrap();
    svc.validate_by_id(&validated.id).unwrap();

    svc.delete(&pending.id).unwrap();
    svc.delete(&validated.id).unwrap();

    let all = svc
        .list(&RecordFilter::default(), PageRequest::new(1, 10))
        .unwrap();
    assert_eq!(all.total, 0);
}
