//! Pure functions for mapping adapter error kinds to HTTP status codes.

use super::ErrorKind;

/// Maps an [`ErrorKind`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `InvalidInput` -> 400 (Bad Request)
/// - `ServerError` -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use rester_core::persistence::{status_for, ErrorKind};
///
/// assert_eq!(status_for(ErrorKind::NotFound), 404);
/// ```
pub fn status_for(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::NotFound => 404,
        ErrorKind::InvalidInput => 400,
        ErrorKind::ServerError => 500,
    }
}
