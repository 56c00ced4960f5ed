//! File-backed prescriber registry.
//!
//! The registry of licensed prescribers is owned by an external party; this
//! implementation reads a YAML snapshot of it once at startup. Lookups are
//! in-memory and infallible afterwards.
//!
//! Registry file format, a YAML list:
//!
//! ```yaml
//! - registration_code: ABC123
//!   registration_valid: true
//! - registration_code: XYZ789
//!   registration_valid: false
//! ```

use std::collections::HashMap;
use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::ports::PrescriberRegistry;
use crate::prescription::Prescriber;

/// In-memory prescriber lookup loaded from a YAML file.
#[derive(Debug, Clone, Default)]
pub struct FileRegistry {
    prescribers: HashMap<String, Prescriber>,
}

impl FileRegistry {
    /// Loads the registry snapshot from `path`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::RegistryRead` if the file cannot be read and
    /// `CoreError::RegistryParse` if it is not a valid prescriber list.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(CoreError::RegistryRead)?;
        let entries: Vec<Prescriber> =
            serde_yaml::from_str(&raw).map_err(CoreError::RegistryParse)?;

        tracing::info!(
            prescribers = entries.len(),
            path = %path.display(),
            "loaded prescriber registry"
        );
        Ok(Self::from_prescribers(entries))
    }

    /// Builds a registry from an in-memory prescriber list.
    ///
    /// Later entries win when registration codes collide.
    pub fn from_prescribers(entries: Vec<Prescriber>) -> Self {
        let prescribers = entries
            .into_iter()
            .map(|p| (p.registration_code.clone(), p))
            .collect();
        Self { prescribers }
    }

    pub fn len(&self) -> usize {
        self.prescribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prescribers.is_empty()
    }
}

impl PrescriberRegistry for FileRegistry {
    fn lookup(&self, code: &str) -> CoreResult<Option<Prescriber>> {
        Ok(self.prescribers.get(code).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_code() {
        let registry = FileRegistry::from_prescribers(vec![Prescriber {
            registration_code: "ABC123".to_string(),
            registration_valid: true,
        }]);

        let found = registry.lookup("ABC123").unwrap().unwrap();
        assert!(found.registration_valid);
    }

    #[test]
    fn test_lookup_unknown_code_is_none() {
        let registry = FileRegistry::from_prescribers(vec![]);
        assert!(registry.lookup("NOBODY").unwrap().is_none());
    }

    #[test]
    fn test_load_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prescribers.yaml");
        std::fs::write(
            &path,
            "- registration_code: ABC123\n  registration_valid: true\n\
             - registration_code: XYZ789\n  registration_valid: false\n",
        )
        .unwrap();

        let registry = FileRegistry::load(&path).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("ABC123").unwrap().unwrap().registration_valid);
        assert!(!registry.lookup("XYZ789").unwrap().unwrap().registration_valid);
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let result = FileRegistry::load(Path::new("/non-existent/prescribers.yaml"));
        assert!(matches!(result, Err(CoreError::RegistryRead(_))));
    }

    #[test]
    fn test_load_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prescribers.yaml");
        std::fs::write(&path, "registration_code: [not, a, list").unwrap();

        let result = FileRegistry::load(&path);
        assert!(matches!(result, Err(CoreError::RegistryParse(_))));
    }
}
