use crate::{record::SCHEMA_TAG, schema::SchemaId, value::Value};
use serde::Serialize;
use std::fmt;

///
/// ValueType
///
/// One member of a field's declared type.
/// `Null` never matches a member; nullability is a field property.
/// Floats must be finite, and `Any` only holds values whose primitive form
/// decodes back to the same value (no bytes, no records).
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum ValueType {
    Any,
    Bool,
    Bytes,
    Float,
    Int,
    List(TypeSpec),
    Map(TypeSpec),
    Number,
    Record(SchemaId),
    Text,
}

impl ValueType {
    /// Whether `value` satisfies this member, recursing into containers.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => false,
            (Self::Any, value) => plain(value),
            (Self::Float | Self::Number, Value::Float(f)) => f.is_finite(),
            (Self::Bool, Value::Bool(_))
            | (Self::Bytes, Value::Bytes(_))
            | (Self::Int | Self::Number, Value::Int(_))
            | (Self::Text, Value::Text(_)) => true,
            (Self::List(element), Value::List(items)) => {
                items.iter().all(|item| element.matches(item))
            }
            (Self::Map(element), Value::Map(entries)) => {
                !entries.contains_key(SCHEMA_TAG)
                    && entries.values().all(|item| element.matches(item))
            }
            (Self::Record(schema), Value::Record(record)) => record.model().is_a(schema),
            _ => false,
        }
    }

    /// Stable tag for the fingerprint stream.
    #[must_use]
    pub(crate) const fn tag(&self) -> u8 {
        match self {
            Self::Any => 0x40,
            Self::Bool => 0x41,
            Self::Bytes => 0x42,
            Self::Float => 0x43,
            Self::Int => 0x44,
            Self::List(_) => 0x45,
            Self::Map(_) => 0x46,
            Self::Number => 0x47,
            Self::Record(_) => 0x48,
            Self::Text => 0x49,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Bool => f.write_str("bool"),
            Self::Bytes => f.write_str("bytes"),
            Self::Float => f.write_str("float"),
            Self::Int => f.write_str("int"),
            Self::List(element) => write!(f, "list[{element}]"),
            Self::Map(element) => write!(f, "map[text, {element}]"),
            Self::Number => f.write_str("number"),
            Self::Record(schema) => write!(f, "record[{schema}]"),
            Self::Text => f.write_str("text"),
        }
    }
}

///
/// TypeSpec
///
/// Ordered, non-empty union of value types.
/// Construction always starts from one member, so an empty union cannot exist.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TypeSpec(Vec<ValueType>);

impl TypeSpec {
    #[must_use]
    pub fn new(member: ValueType) -> Self {
        Self(vec![member])
    }

    /// Extend the union with another member; duplicates are ignored.
    #[must_use]
    pub fn or(mut self, member: ValueType) -> Self {
        if !self.0.contains(&member) {
            self.0.push(member);
        }
        self
    }

    #[must_use]
    pub fn any() -> Self {
        Self::new(ValueType::Any)
    }

    #[must_use]
    pub fn bool() -> Self {
        Self::new(ValueType::Bool)
    }

    #[must_use]
    pub fn bytes() -> Self {
        Self::new(ValueType::Bytes)
    }

    #[must_use]
    pub fn float() -> Self {
        Self::new(ValueType::Float)
    }

    #[must_use]
    pub fn int() -> Self {
        Self::new(ValueType::Int)
    }

    #[must_use]
    pub fn number() -> Self {
        Self::new(ValueType::Number)
    }

    #[must_use]
    pub fn text() -> Self {
        Self::new(ValueType::Text)
    }

    #[must_use]
    pub fn list_of(element: Self) -> Self {
        Self::new(ValueType::List(element))
    }

    #[must_use]
    pub fn map_of(element: Self) -> Self {
        Self::new(ValueType::Map(element))
    }

    #[must_use]
    pub fn record(schema: impl Into<SchemaId>) -> Self {
        Self::new(ValueType::Record(schema.into()))
    }

    #[must_use]
    pub fn members(&self) -> &[ValueType] {
        &self.0
    }

    /// Whether any member accepts `value`.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        self.0.iter().any(|member| member.matches(value))
    }

    /// Every schema referenced by a `Record` member, including nested containers.
    pub(crate) fn record_refs(&self) -> Vec<&SchemaId> {
        let mut refs = Vec::new();
        for member in &self.0 {
            match member {
                ValueType::Record(schema) => refs.push(schema),
                ValueType::List(element) | ValueType::Map(element) => {
                    refs.extend(element.record_refs());
                }
                _ => {}
            }
        }

        refs
    }

    /// Whether two members could encode to the same primitive.
    ///
    /// Bytes and lists both render as JSON arrays, so a union that reaches
    /// both at the same depth cannot be decoded back reliably. `Any` counts
    /// as a list and a map of `Any`.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        let members: Vec<&ValueType> = self.0.iter().collect();

        ambiguous(&members)
    }
}

impl From<ValueType> for TypeSpec {
    fn from(member: ValueType) -> Self {
        Self::new(member)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, member) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{member}")?;
        }

        Ok(())
    }
}

// plain
// values an untyped decode restores exactly
fn plain(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::Text(_) => true,
        Value::Float(f) => f.is_finite(),
        Value::Bytes(_) | Value::Record(_) => false,
        Value::List(items) => items.iter().all(plain),
        Value::Map(entries) => !entries.contains_key(SCHEMA_TAG) && entries.values().all(plain),
    }
}

fn ambiguous(members: &[&ValueType]) -> bool {
    let any = members.iter().any(|m| matches!(m, ValueType::Any));
    let bytes = members.iter().any(|m| matches!(m, ValueType::Bytes));
    let list = members.iter().any(|m| matches!(m, ValueType::List(_)));

    if bytes && (any || list) {
        return true;
    }

    ambiguous_elements(members, any, list_element) || ambiguous_elements(members, any, map_element)
}

// element members of every container of one kind, merged into one union
fn ambiguous_elements(
    members: &[&ValueType],
    any: bool,
    element: fn(&ValueType) -> Option<&TypeSpec>,
) -> bool {
    const ANY: &ValueType = &ValueType::Any;

    let mut inner: Vec<&ValueType> = members
        .iter()
        .copied()
        .filter_map(element)
        .flat_map(TypeSpec::members)
        .collect();
    if any {
        inner.push(ANY);
    }

    // a bare `Any` holds no bytes, and expanding it again would never end
    inner.iter().any(|m| !matches!(m, ValueType::Any)) && ambiguous(&inner)
}

const fn list_element(member: &ValueType) -> Option<&TypeSpec> {
    match member {
        ValueType::List(element) => Some(element),
        _ => None,
    }
}

const fn map_element(member: &ValueType) -> Option<&TypeSpec> {
    match member {
        ValueType::Map(element) => Some(element),
        _ => None,
    }
}
