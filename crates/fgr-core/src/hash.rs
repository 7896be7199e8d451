//! Length-prefixed, tagged SHA-256 stream helpers shared by schema and query
//! fingerprints. Every variable-length item carries a `u32` length prefix so
//! adjacent items can never alias.

use crate::{
    field::{FieldDefault, FieldDescriptor},
    record::Record,
    value::{TypeSpec, Value},
};
use sha2::{Digest, Sha256};

///
/// Encode one tag byte into the hash stream.
///

pub(crate) fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}

/// Encode a platform-sized length as u32 with deterministic saturation.
pub(crate) fn write_len_u32(hasher: &mut Sha256, len: usize) {
    let len = u32::try_from(len).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
}

///
/// Encode one string with length prefix into the hash stream.
///

pub(crate) fn write_str(hasher: &mut Sha256, value: &str) {
    write_len_u32(hasher, value.len());
    hasher.update(value.as_bytes());
}

pub(crate) fn write_bool(hasher: &mut Sha256, value: bool) {
    write_tag(hasher, u8::from(value));
}

pub(crate) fn write_value(hasher: &mut Sha256, value: &Value) {
    write_tag(hasher, value.tag());

    match value {
        Value::Null => {}
        Value::Bool(b) => write_bool(hasher, *b),
        Value::Int(i) => hasher.update(i.to_be_bytes()),
        Value::Float(f) => hasher.update(f.to_bits().to_be_bytes()),
        Value::Text(s) => write_str(hasher, s),
        Value::Bytes(b) => {
            write_len_u32(hasher, b.len());
            hasher.update(b);
        }
        Value::List(items) => {
            write_len_u32(hasher, items.len());
            for item in items {
                write_value(hasher, item);
            }
        }
        Value::Map(entries) => {
            write_len_u32(hasher, entries.len());
            for (key, item) in entries {
                write_str(hasher, key);
                write_value(hasher, item);
            }
        }
        Value::Record(record) => write_record(hasher, record),
    }
}

/// Records contribute their schema id and identity values only.
pub(crate) fn write_record(hasher: &mut Sha256, record: &Record) {
    write_str(hasher, record.schema().as_str());

    let identity = record.identity_values();
    write_len_u32(hasher, identity.len());
    for item in identity {
        write_value(hasher, item);
    }
}

pub(crate) fn write_type_spec(hasher: &mut Sha256, spec: &TypeSpec) {
    use crate::value::ValueType;

    write_len_u32(hasher, spec.members().len());
    for member in spec.members() {
        write_tag(hasher, member.tag());
        match member {
            ValueType::List(element) | ValueType::Map(element) => {
                write_type_spec(hasher, element);
            }
            ValueType::Record(schema) => write_str(hasher, schema.as_str()),
            _ => {}
        }
    }
}

pub(crate) fn write_field(hasher: &mut Sha256, field: &FieldDescriptor) {
    write_str(hasher, field.name());
    write_type_spec(hasher, field.declared_type());

    match field.default() {
        FieldDefault::Required => write_tag(hasher, 0x00),
        FieldDefault::Value(value) => {
            write_tag(hasher, 0x01);
            write_value(hasher, value);
        }
        // factories are opaque; only their presence is part of the contract
        FieldDefault::Factory(_) => write_tag(hasher, 0x02),
    }

    write_bool(hasher, field.is_nullable());
    match field.enumeration_members() {
        Some(members) => {
            write_tag(hasher, 0x01);
            write_len_u32(hasher, members.len());
            for member in members {
                write_value(hasher, member);
            }
        }
        None => write_tag(hasher, 0x00),
    }
    write_bool(hasher, field.is_immutable());
    write_bool(hasher, field.is_hashable());
    write_tag(hasher, field.naming_convention().tag());
    write_str(hasher, field.description());
}
