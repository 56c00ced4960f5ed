//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in multi-threaded runtimes
//! and test harnesses.

use crate::constants::{
    DEFAULT_VALIDITY_WINDOW_DAYS, DOCUMENTS_DIR_NAME, RECORDS_DIR_NAME,
};
use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    registry_file: PathBuf,
    validity_window_days: i64,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        data_dir: PathBuf,
        registry_file: PathBuf,
        validity_window_days: i64,
    ) -> CoreResult<Self> {
        if validity_window_days < 0 {
            return Err(CoreError::InvalidInput(
                "validity window cannot be negative".into(),
            ));
        }

        Ok(Self {
            data_dir,
            registry_file,
            validity_window_days,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn records_dir(&self) -> PathBuf {
        self.data_dir.join(RECORDS_DIR_NAME)
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join(DOCUMENTS_DIR_NAME)
    }

    pub fn registry_file(&self) -> &Path {
        &self.registry_file
    }

    pub fn validity_window_days(&self) -> i64 {
        self.validity_window_days
    }
}

/// Parse the validity window from an optional environment value.
///
/// If `value` is `None` or empty/whitespace, returns the default of 30 days.
pub fn validity_window_from_env_value(value: Option<String>) -> CoreResult<i64> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(DEFAULT_VALIDITY_WINDOW_DAYS);
    };

    let days: i64 = value.parse().map_err(|_| {
        CoreError::InvalidInput(format!("invalid validity window '{}': expected days", value))
    })?;
    if days < 0 {
        return Err(CoreError::InvalidInput(
            "validity window cannot be negative".into(),
        ));
    }
    Ok(days)
}
