use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Caller-supplied field data for create, update and replace.
pub type Fields = Map<String, Value>;

/// Key under which a record's identifier is serialized.
pub const ID_FIELD: &str = "id";

/// Store-assigned record identifier.
///
/// The adapter treats ids as opaque strings. Whether a given string can
/// denote a record at all is up to the collection that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Plain serializable representation of a stored document.
///
/// A record is the document's declared fields plus its identifier under
/// [`ID_FIELD`]. It is a detached snapshot: mutating it never touches the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Fields);

impl Record {
    /// Builds a record from an id and the document's fields.
    ///
    /// An `id` key already present in `fields` is overwritten.
    pub fn new(id: &RecordId, mut fields: Fields) -> Self {
        fields.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        Self(fields)
    }

    /// Returns the record's identifier, if it carries one.
    pub fn id(&self) -> Option<RecordId> {
        self.0
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .map(RecordId::new)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns true when the field is absent, `null`, `false`, `0` or `""`.
    pub fn is_falsy(&self, field: &str) -> bool {
        match self.0.get(field) {
            None | Some(Value::Null) => true,
            Some(Value::Bool(b)) => !b,
            Some(Value::Number(n)) => n.as_f64() == Some(0.0),
            Some(Value::String(s)) => s.is_empty(),
            Some(_) => false,
        }
    }

    pub fn fields(&self) -> &Fields {
        &self.0
    }

    pub fn into_fields(self) -> Fields {
        self.0
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}
