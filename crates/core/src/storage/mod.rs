mod error;
mod traits;

pub use error::{FieldError, StoreError, StoreResult, ValidationErrors};
pub use traits::{CollectionHandle, Document};
