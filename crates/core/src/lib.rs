//! Core of the rester persistence adapter.
//!
//! - [`record`]: record model and schema validation.
//! - [`storage`]: the collection trait and its error taxonomy.
//! - [`persistence`]: the adapter and error normalization.

pub mod persistence;
pub mod record;
pub mod storage;
