//! In-memory collection backend.
//!
//! Stores documents in a `HashMap` wrapped in `Arc<RwLock<_>>` and validates
//! writes against a [`Schema`](rester_core::record::Schema). Nothing is
//! persisted; data is lost when the last clone is dropped.
//!
//! # Example
//!
//! ```rust,ignore
//! use rester::storage::inmemory::InMemoryCollection;
//!
//! let collection = InMemoryCollection::new("resources", schema);
//! let adapter = PersistenceAdapter::new(Arc::new(collection));
//! ```

mod collection;


pub use collection::{InMemoryCollection, StoredDocument};
