//! Collection backends.
//!
//! Concrete implementations of `rester_core::storage::CollectionHandle`,
//! selected via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): in-memory collection validated by a schema

#[cfg(not(feature = "inmemory"))]
compile_error!(
    "No collection backend selected. Enable the 'inmemory' feature. \
    Example: cargo build -p rester --features inmemory"
);

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryCollection;
