//! Sharded JSON record persistence.
//!
//! Prescription records are stored one JSON file per record under a sharded
//! directory structure derived from the record identifier:
//!
//! ```text
//! <records_dir>/<s1>/<s2>/<32hex-uuid>/record.json
//! ```
//!
//! where `s1`/`s2` are the first four hex characters of the identifier. The
//! listing operation traverses the full structure, applies the filter, sorts
//! by creation time descending and paginates with clamped bounds. Individual
//! files that fail to parse are logged and skipped rather than failing the
//! whole listing.

use std::fs;
use std::path::{Path, PathBuf};

use rxgate_uuid::ShardableUuid;

use crate::constants::RECORD_JSON_FILENAME;
use crate::error::{CoreError, CoreResult};
use crate::ports::{PageRequest, RecordFilter, RecordPage, RecordStore};
use crate::prescription::PrescriptionRecord;

/// Filesystem-backed [`RecordStore`].
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    records_dir: PathBuf,
}

impl FileRecordStore {
    /// Creates a store rooted at `records_dir`.
    ///
    /// The directory is created on first write; a missing directory reads as
    /// an empty store.
    pub fn new(records_dir: PathBuf) -> Self {
        Self { records_dir }
    }

    fn record_path(&self, id: &ShardableUuid) -> PathBuf {
        id.sharded_dir(&self.records_dir).join(RECORD_JSON_FILENAME)
    }

    fn read_record(path: &Path) -> CoreResult<PrescriptionRecord> {
        let contents = fs::read_to_string(path).map_err(CoreError::FileRead)?;
        serde_json::from_str(&contents).map_err(CoreError::Deserialization)
    }

    fn write_record(&self, record: &PrescriptionRecord) -> CoreResult<()> {
        let dir = record.id.sharded_dir(&self.records_dir);
        fs::create_dir_all(&dir).map_err(CoreError::StorageDirCreation)?;

        let contents =
            serde_json::to_string_pretty(record).map_err(CoreError::Serialization)?;
        fs::write(dir.join(RECORD_JSON_FILENAME), contents).map_err(CoreError::FileWrite)
    }

    /// Reads every parseable record under the store root.
    fn collect_all(&self) -> Vec<PrescriptionRecord> {
        let mut records = Vec::new();

        let s1_iter = match fs::read_dir(&self.records_dir) {
            Ok(it) => it,
            Err(_) => return records,
        };
        for s1 in s1_iter.flatten() {
            let s1_path = s1.path();
            if !s1_path.is_dir() {
                continue;
            }

            let s2_iter = match fs::read_dir(&s1_path) {
                Ok(it) => it,
                Err(_) => continue,
            };
            for s2 in s2_iter.flatten() {
                let s2_path = s2.path();
                if !s2_path.is_dir() {
                    continue;
                }

                let id_iter = match fs::read_dir(&s2_path) {
                    Ok(it) => it,
                    Err(_) => continue,
                };
                for id_ent in id_iter.flatten() {
                    let record_path = id_ent.path().join(RECORD_JSON_FILENAME);
                    if !record_path.is_file() {
                        continue;
                    }

                    match Self::read_record(&record_path) {
                        Ok(record) => records.push(record),
                        Err(e) => {
                            tracing::warn!(
                                path = %record_path.display(),
                                error = %e,
                                "skipping unreadable record file"
                            );
                        }
                    }
                }
            }
        }

        records
    }
}

impl RecordStore for FileRecordStore {
    fn create(&self, record: &PrescriptionRecord) -> CoreResult<()> {
        let path = self.record_path(&record.id);
        if path.exists() {
            return Err(CoreError::InvalidInput(format!(
                "record {} already exists",
                record.id
            )));
        }
        self.write_record(record)
    }

    fn get(&self, id: &ShardableUuid) -> CoreResult<Option<PrescriptionRecord>> {
        let path = self.record_path(id);
        if !path.is_file() {
            return Ok(None);
        }
        Self::read_record(&path).map(Some)
    }

    fn update(&self, record: &PrescriptionRecord) -> CoreResult<()> {
        if !self.record_path(&record.id).is_file() {
            return Err(CoreError::RecordNotFound(record.id.to_string()));
        }
        self.write_record(record)
    }

    fn delete(&self, id: &ShardableUuid) -> CoreResult<()> {
        let dir = id.sharded_dir(&self.records_dir);
        if !dir.join(RECORD_JSON_FILENAME).is_file() {
            return Err(CoreError::RecordNotFound(id.to_string()));
        }
        fs::remove_dir_all(&dir).map_err(CoreError::FileDelete)
    }

    fn list(&self, filter: &RecordFilter, page: PageRequest) -> CoreResult<RecordPage> {
        let page = page.clamped();

        let mut matching: Vec<PrescriptionRecord> = self
            .collect_all()
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect();

        // Newest first; identifier as a tie-break keeps paging stable when
        // creation timestamps collide.
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
        });

        let total = matching.len() as u64;
        let start = (page.page as usize - 1) * page.page_size as usize;
        let items = if start >= matching.len() {
            Vec::new()
        } else {
            let end = (start + page.page_size as usize).min(matching.len());
            matching[start..end].to_vec()
        };

        Ok(RecordPage {
            page: page.page,
            page_size: page.page_size,
            total,
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::DocumentRef;
    use crate::prescription::{LineItem, ValidationState};
    use chrono::{DateTime, Utc};
    use rxgate_types::{PatientId, PrescriberCode};
    use tempfile::TempDir;

    fn record(patient: &str, created_at: &str) -> PrescriptionRecord {
        PrescriptionRecord {
            id: ShardableUuid::new(),
            patient_id: PatientId::new(patient).unwrap(),
            prescriber_code: PrescriberCode::new("ABC123").unwrap(),
            issue_date: "2024-01-01".to_string(),
            line_items: vec![LineItem {
                code: 1,
                name: "Paracetamol".to_string(),
                quantity: 2,
            }],
            source_document: DocumentRef::new("doc"),
            validation_state: ValidationState::Pending,
            created_at: created_at.parse::<DateTime<Utc>>().unwrap(),
        }
    }

    fn store() -> (TempDir, FileRecordStore) {
        let temp = TempDir::new().unwrap();
        let store = FileRecordStore::new(temp.path().join("records"));
        (temp, store)
    }

    #[test]
    fn test_create_then_get_round_trips() {
        let (_temp, store) = store();
        let rec = record("12345678", "2024-01-01T10:00:00Z");

        store.create(&rec).unwrap();
        let fetched = store.get(&rec.id).unwrap().unwrap();
        assert_eq!(fetched, rec);
    }

    #[test]
    fn test_create_twice_fails() {
        let (_temp, store) = store();
        let rec = record("12345678", "2024-01-01T10:00:00Z");

        store.create(&rec).unwrap();
        assert!(matches!(
            store.create(&rec),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_get_missing_is_none() {
        let (_temp, store) = store();
        assert!(store.get(&ShardableUuid::new()).unwrap().is_none());
    }

    #[test]
    fn test_update_overwrites() {
        let (_temp, store) = store();
        let mut rec = record("12345678", "2024-01-01T10:00:00Z");
        store.create(&rec).unwrap();

        rec.validation_state = ValidationState::Validated;
        store.update(&rec).unwrap();

        let fetched = store.get(&rec.id).unwrap().unwrap();
        assert_eq!(fetched.validation_state, ValidationState::Validated);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let (_temp, store) = store();
        let rec = record("12345678", "2024-01-01T10:00:00Z");
        assert!(matches!(
            store.update(&rec),
            Err(CoreError::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_delete_removes_record() {
        let (_temp, store) = store();
        let rec = record("12345678", "2024-01-01T10:00:00Z");
        store.create(&rec).unwrap();

        store.delete(&rec.id).unwrap();
        assert!(store.get(&rec.id).unwrap().is_none());
        assert!(matches!(
            store.delete(&rec.id),
            Err(CoreError::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_list_sorts_newest_first() {
        let (_temp, store) = store();
        let older = record("12345678", "2024-01-01T10:00:00Z");
        let newer = record("12345678", "2024-02-01T10:00:00Z");
        store.create(&older).unwrap();
        store.create(&newer).unwrap();

        let page = store
            .list(&RecordFilter::default(), PageRequest::new(1, 10))
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].id, newer.id);
        assert_eq!(page.items[1].id, older.id);
    }

    #[test]
    fn test_list_filters_by_patient_and_state() {
        let (_temp, store) = store();
        let mut validated = record("12345678", "2024-01-01T10:00:00Z");
        validated.validation_state = ValidationState::Validated;
        let pending = record("87654321", "2024-01-02T10:00:00Z");
        store.create(&validated).unwrap();
        store.create(&pending).unwrap();

        let filter = RecordFilter {
            patient_id: Some("12345678".to_string()),
            ..Default::default()
        };
        let page = store.list(&filter, PageRequest::new(1, 10)).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, validated.id);

        let filter = RecordFilter {
            state: Some(ValidationState::Pending),
            ..Default::default()
        };
        let page = store.list(&filter, PageRequest::new(1, 10)).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, pending.id);
    }

    #[test]
    fn test_list_paginates_with_clamped_bounds() {
        let (_temp, store) = store();
        for day in 1..=5 {
            store
                .create(&record("12345678", &format!("2024-01-0{day}T10:00:00Z")))
                .unwrap();
        }

        // page_size 0 clamps to 1
        let page = store
            .list(&RecordFilter::default(), PageRequest::new(0, 0))
            .unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 5);

        let second = store
            .list(&RecordFilter::default(), PageRequest::new(2, 2))
            .unwrap();
        assert_eq!(second.items.len(), 2);

        // Beyond the last page the items are empty but the total holds
        let beyond = store
            .list(&RecordFilter::default(), PageRequest::new(9, 2))
            .unwrap();
        assert!(beyond.items.is_empty());
        assert_eq!(beyond.total, 5);
    }

    #[test]
    fn test_list_on_missing_dir_is_empty() {
        let (_temp, store) = store();
        let page = store
            .list(&RecordFilter::default(), PageRequest::new(1, 10))
            .unwrap();
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_list_skips_unreadable_files() {
        let (_temp, store) = store();
        let rec = record("12345678", "2024-01-01T10:00:00Z");
        store.create(&rec).unwrap();

        // Corrupt a second record's file by hand
        let bad_id = ShardableUuid::new();
        let bad_dir = bad_id.sharded_dir(&store.records_dir);
        fs::create_dir_all(&bad_dir).unwrap();
        fs::write(bad_dir.join(RECORD_JSON_FILENAME), "not json").unwrap();

        let page = store
            .list(&RecordFilter::default(), PageRequest::new(1, 10))
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, rec.id);
    }
}
