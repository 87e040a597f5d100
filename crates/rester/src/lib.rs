//! rester - persistence adapter for document collections.
//!
//! The adapter itself lives in [`rester_core`]; this crate provides the
//! collaborators around it: collection backends, configuration, and the
//! HTTP rendering of normalized errors.

pub mod config;
pub mod error;
pub mod storage;

pub use rester_core::persistence::{
    AdapterBuilder, AdapterConfig, Listing, NormalizedError, PersistenceAdapter,
    StoreFailurePolicy,
};
pub use rester_core::record::{FieldKind, Fields, Record, RecordId, Schema};
