//! Validated record instances.

mod primitive;

#[cfg(test)]
mod tests;

use crate::{
    Error,
    error::ValidationError,
    field::FieldDescriptor,
    hash,
    naming::normalize_key,
    schema::{SchemaId, SchemaModel, SchemaRegistry},
    value::Value,
};
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::{
    collections::{BTreeMap, BTreeSet},
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Key naming the concrete schema of a record nested inside another
/// record's primitive form.
pub const SCHEMA_TAG: &str = "$schema";

///
/// Record
///
/// A validated instance of one schema. Holds one value per aggregated field,
/// in the model's positional order. Every value satisfies its descriptor at
/// all times; a rejected `construct` or `set` leaves nothing behind.
///
/// Equality and hashing use the schema id plus the identity values: the
/// hashable fields, or every field when none is marked.
///

#[derive(Clone, Debug)]
pub struct Record {
    model: Arc<SchemaModel>,
    values: Vec<Value>,
}

impl Record {
    /// Validate `values` against `model` and build a record.
    ///
    /// Omitted fields take their resolved default. Keys that name no
    /// aggregated field are rejected before any value is checked.
    pub fn construct<K, V>(
        model: &Arc<SchemaModel>,
        values: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, ValidationError>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut supplied = BTreeMap::new();

        for (key, value) in values {
            let key = key.into();
            if model.position(&key).is_none() {
                return Err(ValidationError::UnknownField {
                    schema: model.id().clone(),
                    field: key,
                });
            }
            if supplied.contains_key(&key) {
                return Err(ValidationError::DuplicateKey {
                    field: key.clone(),
                    key,
                });
            }
            supplied.insert(key, value.into());
        }

        let mut resolved = Vec::with_capacity(model.fields().len());
        for field in model.fields() {
            let value = supplied
                .remove(field.name())
                .unwrap_or_else(|| field.resolve_default());

            field.validate(&value)?;
            resolved.push(value);
        }

        Ok(Self {
            model: Arc::clone(model),
            values: resolved,
        })
    }

    /// Decode a primitive mapping into a record of schema `id`.
    ///
    /// Keys are matched by rendered name, then by field name, then after
    /// snake-case normalization; two keys that land on the same field are
    /// rejected. Values are decoded against each field's declared type
    /// before the usual construction checks run.
    pub fn from_primitive(
        registry: &SchemaRegistry,
        id: &SchemaId,
        map: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<Self, Error> {
        let model = registry.model(id)?;
        let mut values = Vec::with_capacity(map.len());
        let mut seen = BTreeSet::new();

        for (key, raw) in map {
            let field = resolve_key(&model, key).ok_or_else(|| ValidationError::UnknownField {
                schema: id.clone(),
                field: key.clone(),
            })?;
            if !seen.insert(field.name()) {
                return Err(ValidationError::DuplicateKey {
                    field: field.name().to_string(),
                    key: key.clone(),
                }
                .into());
            }
            let value = primitive::decode(registry, field, raw)?;

            values.push((field.name().to_string(), value));
        }

        Ok(Self::construct(&model, values)?)
    }

    #[must_use]
    pub fn schema(&self) -> &SchemaId {
        self.model.id()
    }

    #[must_use]
    pub const fn model(&self) -> &Arc<SchemaModel> {
        &self.model
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.model.position(name).map(|i| &self.values[i])
    }

    /// `(name, value)` pairs in aggregated field order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.model
            .fields()
            .iter()
            .map(FieldDescriptor::name)
            .zip(&self.values)
    }

    /// Reassign a mutable field; the record is unchanged on error.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ValidationError> {
        let position = self
            .model
            .position(name)
            .ok_or_else(|| ValidationError::UnknownField {
                schema: self.model.id().clone(),
                field: name.to_string(),
            })?;

        let field = &self.model.fields()[position];
        if field.is_immutable() {
            return Err(ValidationError::ImmutableField {
                field: name.to_string(),
            });
        }

        let value = value.into();
        field.validate(&value)?;
        self.values[position] = value;

        Ok(())
    }

    /// Values that define this record's identity, in positional order.
    #[must_use]
    pub fn identity_values(&self) -> Vec<&Value> {
        self.model
            .identity()
            .iter()
            .map(|&i| &self.values[i])
            .collect()
    }

    /// Plain mapping with keys rendered per field naming convention.
    #[must_use]
    pub fn to_primitive(&self) -> serde_json::Map<String, serde_json::Value> {
        self.model
            .fields()
            .iter()
            .zip(&self.values)
            .map(|(field, value)| (field.external_name(), primitive::encode(value)))
            .collect()
    }

    /// SHA-256 over the schema id and identity values.
    #[must_use]
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hash::write_record(&mut hasher, self);

        hasher.finalize().into()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema() == other.schema() && self.identity_values() == other.identity_values()
    }
}

impl Eq for Record {}

impl Hash for Record {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.schema().hash(state);
        self.identity_values().hash(state);
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_primitive().serialize(serializer)
    }
}

// resolve_key
// rendered key first, then the declared name, then a normalized comparison
fn resolve_key<'a>(model: &'a SchemaModel, key: &str) -> Option<&'a FieldDescriptor> {
    let fields = model.fields();

    fields
        .iter()
        .find(|f| f.external_name() == key)
        .or_else(|| fields.iter().find(|f| f.name() == key))
        .or_else(|| {
            let normalized = normalize_key(key);
            fields.iter().find(|f| normalize_key(f.name()) == normalized)
        })
}
