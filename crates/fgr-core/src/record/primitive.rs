//! Conversion between record values and plain JSON-shaped primitives.

use crate::{
    Error,
    error::ValidationError,
    field::FieldDescriptor,
    record::{Record, SCHEMA_TAG},
    schema::{SchemaId, SchemaRegistry},
    value::{TypeSpec, Value, ValueType},
};
use serde_json::{Number, Value as JsonValue};
use std::collections::BTreeMap;

/// Render a value as a primitive.
///
/// Bytes become an array of integers. Nested records carry their schema id
/// under [`SCHEMA_TAG`] so a descendant decodes as itself. Validation keeps
/// non-finite floats out of records; one that slips through renders as `null`.
pub(super) fn encode(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::from(*i),
        Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Bytes(bytes) => JsonValue::Array(bytes.iter().map(|&b| JsonValue::from(b)).collect()),
        Value::List(items) => JsonValue::Array(items.iter().map(encode).collect()),
        Value::Map(entries) => JsonValue::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), encode(v)))
                .collect(),
        ),
        Value::Record(record) => {
            let mut map = record.to_primitive();
            map.insert(
                SCHEMA_TAG.to_string(),
                JsonValue::String(record.schema().to_string()),
            );

            JsonValue::Object(map)
        }
    }
}

/// Decode one primitive against a field's declared type.
///
/// Members are tried in declaration order and the first that accepts the
/// primitive wins. `null` passes through so nullability is reported by the
/// field's own validation.
pub(super) fn decode(
    registry: &SchemaRegistry,
    field: &FieldDescriptor,
    raw: &JsonValue,
) -> Result<Value, Error> {
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let mut nested = None;
    if let Some(value) = decode_spec(registry, field.declared_type(), raw, &mut nested) {
        return Ok(value);
    }

    // a nested record that failed its own checks explains more than a bare
    // decode error would
    Err(nested.unwrap_or_else(|| {
        ValidationError::Decode {
            field: field.name().to_string(),
            expected: field.declared_type().clone(),
            received: raw.to_string(),
        }
        .into()
    }))
}

fn decode_spec(
    registry: &SchemaRegistry,
    spec: &TypeSpec,
    raw: &JsonValue,
    nested: &mut Option<Error>,
) -> Option<Value> {
    spec.members()
        .iter()
        .find_map(|member| decode_member(registry, member, raw, nested))
}

fn decode_member(
    registry: &SchemaRegistry,
    member: &ValueType,
    raw: &JsonValue,
    nested: &mut Option<Error>,
) -> Option<Value> {
    match (member, raw) {
        (ValueType::Any, _) => decode_any(raw),
        (ValueType::Bool, JsonValue::Bool(b)) => Some(Value::Bool(*b)),
        (ValueType::Int, JsonValue::Number(n)) => n.as_i64().map(Value::Int),
        (ValueType::Float, JsonValue::Number(n)) if n.is_f64() => n.as_f64().map(Value::Float),
        (ValueType::Number, JsonValue::Number(n)) => Some(decode_number(n)),
        (ValueType::Text, JsonValue::String(s)) => Some(Value::Text(s.clone())),
        (ValueType::Bytes, JsonValue::Array(items)) => items
            .iter()
            .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(Value::Bytes),
        (ValueType::List(element), JsonValue::Array(items)) => items
            .iter()
            .map(|item| decode_spec(registry, element, item, nested))
            .collect::<Option<Vec<_>>>()
            .map(Value::List),
        (ValueType::Map(_), JsonValue::Object(entries)) if entries.contains_key(SCHEMA_TAG) => {
            None
        }
        (ValueType::Map(element), JsonValue::Object(entries)) => entries
            .iter()
            .map(|(k, item)| {
                decode_spec(registry, element, item, nested).map(|v| (k.clone(), v))
            })
            .collect::<Option<BTreeMap<_, _>>>()
            .map(Value::Map),
        (ValueType::Record(schema), JsonValue::Object(map)) => {
            match decode_record(registry, schema, map) {
                Ok(record) => record.map(Value::from),
                Err(err) => {
                    if nested.is_none() {
                        *nested = Some(err);
                    }
                    None
                }
            }
        }
        _ => None,
    }
}

// decode_record
// an untagged object is read as the declared schema; a tagged one must name
// the declared schema or one of its descendants
fn decode_record(
    registry: &SchemaRegistry,
    declared: &SchemaId,
    map: &serde_json::Map<String, JsonValue>,
) -> Result<Option<Record>, Error> {
    let Some(tag) = map.get(SCHEMA_TAG) else {
        return Record::from_primitive(registry, declared, map).map(Some);
    };

    let Some(tag) = tag.as_str() else {
        return Ok(None);
    };
    let schema = SchemaId::new(tag);
    if !registry.model(&schema)?.is_a(declared) {
        return Ok(None);
    }

    let mut body = map.clone();
    body.remove(SCHEMA_TAG);

    Record::from_primitive(registry, &schema, &body).map(Some)
}

// decode_number
// integers stay integers; anything else is a float
fn decode_number(n: &Number) -> Value {
    n.as_i64()
        .map(Value::Int)
        .or_else(|| n.as_f64().map(Value::Float))
        .unwrap_or(Value::Null)
}

// decode_any
// structural decode with no declared type to steer it; tagged records are
// left for a `Record` member
fn decode_any(raw: &JsonValue) -> Option<Value> {
    let value = match raw {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => decode_number(n),
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(items) => {
            Value::List(items.iter().map(decode_any).collect::<Option<_>>()?)
        }
        JsonValue::Object(entries) => {
            if entries.contains_key(SCHEMA_TAG) {
                return None;
            }

            Value::Map(
                entries
                    .iter()
                    .map(|(k, v)| decode_any(v).map(|v| (k.clone(), v)))
                    .collect::<Option<_>>()?,
            )
        }
    };

    Some(value)
}
