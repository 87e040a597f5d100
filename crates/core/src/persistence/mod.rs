//! The persistence adapter and its error normalization.

mod adapter;
mod config;
mod error;
mod http_mapping;

pub use adapter::{AdapterBuilder, Listing, PersistenceAdapter};
pub use config::{AdapterConfig, StoreFailurePolicy};
pub use error::{
    BuildError, ErrorKind, NormalizedError, Result, INVALID_INPUT_MESSAGE, NOT_FOUND_MESSAGE,
    SERVER_ERROR_MESSAGE,
};
pub use http_mapping::status_for;
