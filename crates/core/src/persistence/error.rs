use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use super::http_mapping::status_for;

pub const NOT_FOUND_MESSAGE: &str = "Resource not found";
pub const INVALID_INPUT_MESSAGE: &str = "Invalid data";
pub const SERVER_ERROR_MESSAGE: &str = "Storage failure";

/// Category of a normalized failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    ServerError,
}

/// The uniform `{status, message, data}` error every adapter operation fails with.
///
/// `data` maps field names to human-readable reasons and is empty unless
/// the failure is [`ErrorKind::InvalidInput`].
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message}")]
pub struct NormalizedError {
    #[serde(skip)]
    pub kind: ErrorKind,
    pub status: u16,
    pub message: String,
    pub data: BTreeMap<String, String>,
}

impl NormalizedError {
    fn new(kind: ErrorKind, message: &str, data: BTreeMap<String, String>) -> Self {
        Self {
            kind,
            status: status_for(kind),
            message: message.to_string(),
            data,
        }
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound, NOT_FOUND_MESSAGE, BTreeMap::new())
    }

    pub fn invalid_input(data: BTreeMap<String, String>) -> Self {
        Self::new(ErrorKind::InvalidInput, INVALID_INPUT_MESSAGE, data)
    }

    pub fn server_error() -> Self {
        Self::new(ErrorKind::ServerError, SERVER_ERROR_MESSAGE, BTreeMap::new())
    }
}

/// Errors raised while assembling an adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("A collection handle is required")]
    MissingCollection,
}

/// Result type for adapter operations.
pub type Result<T> = std::result::Result<T, NormalizedError>;
