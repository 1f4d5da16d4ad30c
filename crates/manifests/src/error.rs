/// Convenient result alias for manifest accessors.
pub type Result<T> = std::result::Result<T, ManifestError>;

/// Errors surfaced while reading fields out of a manifest document.
#[derive(thiserror::Error, Debug)]
pub enum ManifestError {
    /// A required key was absent (or explicitly `null`).
    #[error("missing required field `{key}`")]
    MissingRequiredField {
        /// Key that was looked up.
        key: String,
    },
    /// A key was present but held a value of the wrong JSON kind.
    #[error("field `{key}` has incorrect type (expected {expected})")]
    IncorrectFieldType {
        /// Key that was looked up.
        key: String,
        /// Human readable name of the expected JSON kind.
        expected: &'static str,
    },
    /// The document root was not a JSON object.
    #[error("manifest document must be a JSON object")]
    NotAnObject,
    /// The manifest bytes could not be decoded as JSON.
    #[error("manifest decoding failed: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ManifestError {
    pub(crate) fn missing(key: &str) -> Self {
        ManifestError::MissingRequiredField {
            key: key.to_string(),
        }
    }

    pub(crate) fn incorrect_type(key: &str, expected: &'static str) -> Self {
        ManifestError::IncorrectFieldType {
            key: key.to_string(),
            expected,
        }
    }

    /// Whether this error was caused by an absent required field.
    pub fn is_missing_field(&self) -> bool {
        matches!(self, ManifestError::MissingRequiredField { .. })
    }

    /// Whether this error was caused by a value of the wrong JSON kind.
    pub fn is_incorrect_type(&self) -> bool {
        matches!(self, ManifestError::IncorrectFieldType { .. })
    }
}
