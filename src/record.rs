//! Read-only projections of domain records handed to the formatter.

use std::fmt;

/// Field name under which the record identifier is always emitted.
pub const ID_FIELD: &str = "ID";

/// Normalizes a fully-qualified type name into a URL-safe type label.
///
/// `App\Model\Page`, `app::model::Page`, `app/model/Page` and
/// `app.model.Page` all become dash-separated labels. Leading or trailing
/// namespace delimiters are dropped; dashes in the name itself are kept.
pub fn type_label(type_name: &str) -> String {
    type_name
        .trim_matches(|c: char| matches!(c, '\\' | '/' | '.' | ':'))
        .replace("::", "-")
        .chars()
        .map(|c| match c {
            '\\' | '/' | '.' => '-',
            c => c,
        })
        .collect()
}

/// Record identifier, numeric for most stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<i32> for RecordId {
    fn from(n: i32) -> Self {
        RecordId::Int(i64::from(n))
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(n) => RecordId::Int(n),
            Err(_) => RecordId::Str(s.to_string()),
        }
    }
}

/// Scalar value of a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null | FieldValue::Bool(false) => Ok(()),
            FieldValue::Bool(true) => f.write_str("1"),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&RecordId> for FieldValue {
    fn from(id: &RecordId) -> Self {
        match id {
            RecordId::Int(n) => FieldValue::Int(*n),
            RecordId::Str(s) => FieldValue::Text(s.clone()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Int(i64::from(n))
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// A has-one link from a record to another record.
#[derive(Debug, Clone, PartialEq)]
pub struct HasOneRelation {
    pub name: String,
    pub target_label: String,
    pub target_id: RecordId,
}

impl HasOneRelation {
    pub fn new(name: &str, target_type: &str, target_id: impl Into<RecordId>) -> Self {
        HasOneRelation {
            name: name.to_string(),
            target_label: type_label(target_type),
            target_id: target_id.into(),
        }
    }
}

/// A record as seen by the formatter: label, identifier, ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordView {
    label: String,
    id: RecordId,
    fields: Vec<(String, FieldValue)>,
    has_one: Vec<HasOneRelation>,
}

impl RecordView {
    /// Creates a view whose only field is `ID`.
    pub fn new(type_name: &str, id: impl Into<RecordId>) -> Self {
        let id = id.into();
        RecordView {
            label: type_label(type_name),
            fields: vec![(ID_FIELD.to_string(), FieldValue::from(&id))],
            id,
            has_one: Vec::new(),
        }
    }

    /// Appends a field, replacing an earlier one with the same name in place.
    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
        self
    }

    pub fn with_has_one(mut self, relation: HasOneRelation) -> Self {
        self.has_one.push(relation);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn has_one(&self) -> &[HasOneRelation] {
        &self.has_one
    }
}
