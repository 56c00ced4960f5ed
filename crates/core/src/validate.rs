//! The validation engine.
//!
//! Decides whether a freshly extracted prescription is acceptable. Four
//! checks run in order, fail-fast, so the first failing check determines the
//! reported reason:
//!
//! 1. completeness of the extracted fields,
//! 2. structural validity of every line item,
//! 3. prescriber registry lookup,
//! 4. temporal validity of the issue date.
//!
//! The engine is pure given its inputs: the registry lookup and the
//! wall-clock `now` are both injected, so outcomes are deterministic under
//! test.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rxgate_types::{PatientId, PrescriberCode};

use crate::constants::MILLIS_PER_DAY;
use crate::error::{CoreError, CoreResult, RejectionReason};
use crate::parse::ExtractedFields;
use crate::patterns::{FIELD_ISSUE_DATE, FIELD_PATIENT_ID, FIELD_PRESCRIBER_CODE};
use crate::ports::PrescriberRegistry;
use crate::prescription::LineItem;

/// The canonical field set of a prescription that passed validation.
///
/// Identifier formats are guaranteed by the wrapped types; these are the
/// values persisted to the record, overwriting whatever was stored before.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFields {
    pub patient_id: PatientId,
    pub prescriber_code: PrescriberCode,
    /// The issue-date literal as printed on the document.
    pub issue_date: String,
    pub line_items: Vec<LineItem>,
}

/// Applies the acceptance rules to extracted prescription fields.
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    window_days: i64,
}

impl ValidationEngine {
    /// Creates an engine with the given validity window in days.
    pub fn new(window_days: i64) -> Self {
        Self { window_days }
    }

    pub fn window_days(&self) -> i64 {
        self.window_days
    }

    /// Check 1: all required fields present and usable.
    ///
    /// This is also the acceptance rule for the initial-submission path,
    /// which creates a pending record without running the remaining checks.
    /// A field that is present but violates its declared format (an
    /// out-of-shape patient identifier, for example) counts as missing; the
    /// parser's patterns already guarantee the formats for fields extracted
    /// from a document.
    pub fn check_completeness(
        fields: &ExtractedFields,
    ) -> Result<ValidatedFields, RejectionReason> {
        let mut missing = Vec::new();

        let patient_id = match fields.patient_id.as_deref().map(PatientId::new) {
            Some(Ok(id)) => Some(id),
            _ => {
                missing.push(FIELD_PATIENT_ID.to_string());
                None
            }
        };

        let prescriber_code = match fields.prescriber_code.as_deref().map(PrescriberCode::new) {
            Some(Ok(code)) => Some(code),
            _ => {
                missing.push(FIELD_PRESCRIBER_CODE.to_string());
                None
            }
        };

        let issue_date = match fields.issue_date.as_deref() {
            Some(date) if !date.is_empty() => Some(date.to_string()),
            _ => {
                missing.push(FIELD_ISSUE_DATE.to_string());
                None
            }
        };

        if fields.line_items.is_empty() {
            missing.push(crate::patterns::FIELD_LINE_ITEMS.to_string());
        }

        match (patient_id, prescriber_code, issue_date) {
            (Some(patient_id), Some(prescriber_code), Some(issue_date)) if missing.is_empty() => {
                Ok(ValidatedFields {
                    patient_id,
                    prescriber_code,
                    issue_date,
                    line_items: fields.line_items.clone(),
                })
            }
            _ => Err(RejectionReason::IncompleteDocument {
                missing,
                fields: fields.clone(),
            }),
        }
    }

    /// Check 2: every line item is structurally valid.
    ///
    /// The first violation is reported with the offending item. Product codes
    /// are non-negative by construction, so the checks left to run here are a
    /// non-empty name and a positive quantity.
    fn check_line_items(items: &[LineItem]) -> Result<(), RejectionReason> {
        for item in items {
            if item.name.trim().is_empty() || item.quantity == 0 {
                return Err(RejectionReason::InvalidLineItem { item: item.clone() });
            }
        }
        Ok(())
    }

    /// Check 3: the prescriber exists in the registry with an active
    /// registration.
    fn check_registry(
        registry: &dyn PrescriberRegistry,
        code: &PrescriberCode,
    ) -> CoreResult<()> {
        match registry.lookup(code.as_str())? {
            Some(prescriber) if prescriber.registration_valid => Ok(()),
            _ => Err(CoreError::Rejected(
                RejectionReason::PrescriberNotRegistered {
                    code: code.as_str().to_string(),
                },
            )),
        }
    }

    /// Check 4: the prescription is neither future-dated nor expired.
    ///
    /// The issue date is anchored at UTC midnight and elapsed whole days are
    /// the floor of elapsed milliseconds over one day's worth of
    /// milliseconds. This is deliberately not a calendar-day difference: a
    /// prescription issued just before midnight still counts zero elapsed
    /// days just after it. `elapsed == window` passes; `window + 1` expires.
    fn check_temporal(
        &self,
        issue_date: &str,
        fields: &ExtractedFields,
        now: DateTime<Utc>,
    ) -> Result<(), RejectionReason> {
        let Ok(issued_on) = NaiveDate::parse_from_str(issue_date, "%Y-%m-%d") else {
            // The literal matched the digits-and-hyphens pattern but is not a
            // real calendar date; the document has no usable issue date.
            return Err(RejectionReason::IncompleteDocument {
                missing: vec![FIELD_ISSUE_DATE.to_string()],
                fields: fields.clone(),
            });
        };

        let issued_at =
            DateTime::<Utc>::from_naive_utc_and_offset(issued_on.and_time(NaiveTime::MIN), Utc);

        if issued_at > now {
            return Err(RejectionReason::FutureDated {
                issue_date: issued_on,
            });
        }

        let elapsed_days = (now - issued_at).num_milliseconds() / MILLIS_PER_DAY;
        if elapsed_days > self.window_days {
            return Err(RejectionReason::Expired {
                elapsed_days,
                window_days: self.window_days,
            });
        }

        Ok(())
    }

    /// Runs all four checks against freshly extracted fields.
    ///
    /// Returns the canonical validated field set on success. A failing check
    /// is reported as [`CoreError::Rejected`] with the typed reason; registry
    /// lookup failures propagate as their own collaborator error.
    pub fn validate(
        &self,
        fields: &ExtractedFields,
        registry: &dyn PrescriberRegistry,
        now: DateTime<Utc>,
    ) -> CoreResult<ValidatedFields> {
        let validated = Self::check_completeness(fields).map_err(CoreError::Rejected)?;
        Self::check_line_items(&validated.line_items).map_err(CoreError::Rejected)?;
        Self::check_registry(registry, &validated.prescriber_code)?;
        self.check_temporal(&validated.issue_date, fields, now)
            .map_err(CoreError::Rejected)?;

        tracing::info!(
            patient_id = %validated.patient_id,
            prescriber_code = %validated.prescriber_code,
            items = validated.line_items.len(),
            "prescription passed validation"
        );
        Ok(validated)
    }
}
