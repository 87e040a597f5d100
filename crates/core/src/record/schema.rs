//! Declarative field schema used by collections to validate writes.
//!
//! Validation is a pure function of the schema and the input: it casts
//! declared fields to their kind, drops undeclared keys, and reports every
//! failure in a [`ValidationErrors`]. Cast failures are always reported
//! before required-field failures.

use serde_json::{Number, Value};

use super::{Fields, ID_FIELD};
use crate::storage::{FieldError, ValidationErrors};

/// The kind of value a declared field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
}

impl FieldKind {
    /// Lowercase name used in cast failure messages.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
        }
    }
}

/// Declaration of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub kind: FieldKind,
    pub required: bool,
}

/// Ordered set of field declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<(String, FieldSpec)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an optional field.
    ///
    /// The name [`ID_FIELD`] is reserved for the record identifier and is
    /// never declared; the same holds for [`Schema::required`].
    pub fn field(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.declare(name, kind, false)
    }

    /// Declares a required field.
    pub fn required(self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.declare(name, kind, true)
    }

    fn declare(mut self, name: impl Into<String>, kind: FieldKind, required: bool) -> Self {
        let name = name.into();
        if name == ID_FIELD {
            tracing::warn!(field = %name, "Ignoring declaration of reserved field");
            return self;
        }
        let spec = FieldSpec { kind, required };
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = spec,
            None => self.fields.push((name, spec)),
        }
        self
    }

    pub fn spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Validates a complete document, as for insert or full replacement.
    ///
    /// Returns the cast fields. Optional fields given as `null` are omitted.
    pub fn validate_document(&self, input: &Fields) -> Result<Fields, ValidationErrors> {
        let mut output = Fields::new();
        let mut errors = ValidationErrors::new();

        for (name, spec) in &self.fields {
            match input.get(name) {
                None | Some(Value::Null) => {}
                Some(value) => match cast(spec.kind, value) {
                    Some(Value::Null) => {}
                    Some(cast_value) => {
                        output.insert(name.clone(), cast_value);
                    }
                    None => errors.push(cast_failure(name, spec.kind, value)),
                },
            }
        }

        for (name, spec) in &self.fields {
            if spec.required && !errors.contains(name) && is_blank(output.get(name)) {
                errors.push(required_failure(name));
            }
        }

        errors.into_result(output)
    }

    /// Validates a partial update.
    ///
    /// Only keys present in `input` are checked. A `null` value in the
    /// returned fields means "unset this field".
    pub fn validate_patch(&self, input: &Fields) -> Result<Fields, ValidationErrors> {
        let mut output = Fields::new();
        let mut errors = ValidationErrors::new();
        let mut blanked = Vec::new();

        for (name, spec) in &self.fields {
            let Some(value) = input.get(name) else {
                continue;
            };
            let cast_value = if value.is_null() {
                Value::Null
            } else {
                match cast(spec.kind, value) {
                    Some(v) => v,
                    None => {
                        errors.push(cast_failure(name, spec.kind, value));
                        continue;
                    }
                }
            };
            if spec.required && is_blank(Some(&cast_value)) {
                blanked.push(name.clone());
            }
            output.insert(name.clone(), cast_value);
        }

        for name in blanked {
            errors.push(required_failure(&name));
        }

        errors.into_result(output)
    }
}

/// Casts a non-null value to the given kind. `None` means the cast failed.
fn cast(kind: FieldKind, value: &Value) -> Option<Value> {
    match (kind, value) {
        (FieldKind::String, Value::String(_)) => Some(value.clone()),
        (FieldKind::String, Value::Number(n)) => Some(Value::String(n.to_string())),
        (FieldKind::String, Value::Bool(b)) => Some(Value::String(b.to_string())),

        (FieldKind::Number, Value::Number(_)) => Some(value.clone()),
        (FieldKind::Number, Value::String(s)) => parse_number(s),
        (FieldKind::Number, Value::Bool(b)) => Some(Value::from(u8::from(*b))),

        (FieldKind::Boolean, Value::Bool(_)) => Some(value.clone()),
        (FieldKind::Boolean, Value::String(s)) => match s.as_str() {
            "true" | "1" => Some(Value::Bool(true)),
            "false" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        (FieldKind::Boolean, Value::Number(n)) => match n.as_f64() {
            Some(x) if x == 1.0 => Some(Value::Bool(true)),
            Some(x) if x == 0.0 => Some(Value::Bool(false)),
            _ => None,
        },

        _ => None,
    }
}

fn parse_number(s: &str) -> Option<Value> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(Value::Null);
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Some(Value::from(i));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn cast_failure(path: &str, kind: FieldKind, value: &Value) -> FieldError {
    let shown = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    FieldError::new(
        path,
        format!(
            "Cast to {} failed for value \"{}\" at path \"{}\"",
            kind.name(),
            shown,
            path
        ),
    )
}

fn required_failure(path: &str) -> FieldError {
    FieldError::new(path, format!("Path `{path}` is required."))
}
