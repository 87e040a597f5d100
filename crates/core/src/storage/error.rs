use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::record::RecordId;

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Ordered field failures reported by a collection.
///
/// The first failure is the primary one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.errors.iter().any(|e| e.path == path)
    }

    /// The first reported failure.
    pub fn primary(&self) -> Option<&FieldError> {
        self.errors.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Collapses the failures into a `{field: message}` map.
    ///
    /// When a path fails more than once, the first message wins.
    pub fn to_field_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for error in &self.errors {
            map.entry(error.path.clone())
                .or_insert_with(|| error.message.clone());
        }
        map
    }

    /// `Ok(value)` when nothing failed, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl FromIterator<FieldError> for ValidationErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.errors.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join(", "))
    }
}

/// Errors a collection reports for its primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Malformed record id: {0}")]
    MalformedId(String),
    #[error("Record not found: {0}")]
    NotFound(RecordId),
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for collection primitives.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
