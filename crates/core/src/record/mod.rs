mod schema;
mod types;

pub use schema::{FieldKind, FieldSpec, Schema};
pub use types::{Fields, Record, RecordId, ID_FIELD};
