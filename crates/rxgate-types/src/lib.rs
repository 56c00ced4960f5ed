//! Validated domain newtypes shared across the RxGate crates.
//!
//! Each type guarantees its invariant at construction time, so code holding a
//! value can rely on the format without re-checking it.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input was not a run of 8 to 12 decimal digits
    #[error("Patient identifier must be 8-12 digits, got '{0}'")]
    InvalidPatientId(String),
    /// The input was empty or contained non-alphanumeric characters
    #[error("Prescriber registration code must be non-empty alphanumeric, got '{0}'")]
    InvalidPrescriberCode(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A patient national identifier: a run of 8 to 12 decimal digits.
///
/// This is the format recognised on scanned prescription documents; anything
/// shorter, longer, or containing non-digit characters is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatientId(String);

impl PatientId {
    /// Validates and wraps a patient identifier.
    ///
    /// The input is trimmed before validation. Returns
    /// [`TextError::InvalidPatientId`] unless the trimmed input is 8 to 12
    /// ASCII digits.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        let len = trimmed.len();
        if (8..=12).contains(&len) && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Self(trimmed.to_owned()));
        }
        Err(TextError::InvalidPatientId(trimmed.to_owned()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A prescriber's professional registration code: non-empty alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrescriberCode(String);

impl PrescriberCode {
    /// Validates and wraps a registration code.
    ///
    /// The input is trimmed before validation. Returns
    /// [`TextError::InvalidPrescriberCode`] if the trimmed input is empty or
    /// contains characters outside `[A-Za-z0-9]`.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Ok(Self(trimmed.to_owned()));
        }
        Err(TextError::InvalidPrescriberCode(trimmed.to_owned()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_string_newtype_traits {
    ($ty:ident) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $ty::new(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

impl_string_newtype_traits!(NonEmptyText);
impl_string_newtype_traits!(PatientId);
impl_string_newtype_traits!(PrescriberCode);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims() {
        let text = NonEmptyText::new("  Paracetamol  ").unwrap();
        assert_eq!(text.as_str(), "Paracetamol");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace_only() {
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
        assert!(matches!(NonEmptyText::new(""), Err(TextError::Empty)));
    }

    #[test]
    fn test_patient_id_accepts_valid_lengths() {
        assert!(PatientId::new("12345678").is_ok());
        assert!(PatientId::new("123456789012").is_ok());
    }

    #[test]
    fn test_patient_id_rejects_bad_input() {
        // Too short, too long, non-digit
        assert!(PatientId::new("1234567").is_err());
        assert!(PatientId::new("1234567890123").is_err());
        assert!(PatientId::new("1234567a").is_err());
        assert!(PatientId::new("").is_err());
    }

    #[test]
    fn test_prescriber_code_accepts_alphanumeric() {
        let code = PrescriberCode::new("ABC123").unwrap();
        assert_eq!(code.as_str(), "ABC123");
    }

    #[test]
    fn test_prescriber_code_rejects_bad_input() {
        assert!(PrescriberCode::new("").is_err());
        assert!(PrescriberCode::new("ABC-123").is_err());
        assert!(PrescriberCode::new("ABC 123").is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let id = PatientId::new("12345678").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"12345678\"");
        let back: PatientId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let result: Result<PatientId, _> = serde_json::from_str("\"abc\"");
        assert!(result.is_err());
    }
}
