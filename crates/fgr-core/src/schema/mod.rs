//! Schema definitions, heritage-aware field aggregation, and the registry
//! that caches one aggregated model per schema.

mod aggregate;
mod registry;
mod reserved;


use crate::{
    field::FieldDescriptor,
    hash,
    naming::NamingConvention,
    query::{FieldRef, QueryError},
};
use derive_more::{Deref, Display};
use serde::Serialize;
use sha2::{Digest, Sha256};

// re-exports
pub use registry::SchemaRegistry;

///
/// SchemaId
/// Identity of a schema; the registry and its cache are keyed by it.
///

#[derive(Clone, Debug, Deref, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct SchemaId(String);

impl SchemaId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SchemaId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SchemaId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&SchemaId> for SchemaId {
    fn from(id: &SchemaId) -> Self {
        id.clone()
    }
}

///
/// SchemaDef
///
/// Author-facing declaration of one schema: its own fields plus the direct
/// parents it inherits from, in declaration order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SchemaDef {
    pub id: SchemaId,
    pub parents: Vec<SchemaId>,
    pub fields: Vec<FieldDescriptor>,
    pub description: Option<String>,
    pub naming: Option<NamingConvention>,
}

impl SchemaDef {
    #[must_use]
    pub fn new(id: impl Into<SchemaId>) -> Self {
        Self {
            id: id.into(),
            parents: Vec::new(),
            fields: Vec::new(),
            description: None,
            naming: None,
        }
    }

    /// Inherit from `parent`; later parents are less specific.
    #[must_use]
    pub fn extends(mut self, parent: impl Into<SchemaId>) -> Self {
        self.parents.push(parent.into());
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Default key style for fields declared on this schema.
    #[must_use]
    pub const fn naming(mut self, naming: NamingConvention) -> Self {
        self.naming = Some(naming);
        self
    }
}

///
/// SchemaModel
///
/// Aggregated, validated view of one schema. Built once per schema by the
/// registry and shared behind an `Arc`; never mutated afterwards.
///

#[derive(Debug)]
pub struct SchemaModel {
    id: SchemaId,
    description: Option<String>,
    heritage: Vec<SchemaId>,
    fields: Vec<FieldDescriptor>,
    hash_fields: Vec<usize>,
    identity: Vec<usize>,
}

impl SchemaModel {
    #[must_use]
    pub const fn id(&self) -> &SchemaId {
        &self.id
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Ancestors, most specific first.
    #[must_use]
    pub fn heritage(&self) -> &[SchemaId] {
        &self.heritage
    }

    /// Aggregated fields in positional order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(FieldDescriptor::name).collect()
    }

    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.position(name).map(|i| &self.fields[i])
    }

    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// Fields explicitly marked hashable, in positional order.
    pub fn hash_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.hash_fields.iter().map(|&i| &self.fields[i])
    }

    /// True when no field is hashable and records compare by every field.
    #[must_use]
    pub const fn uses_full_identity(&self) -> bool {
        self.hash_fields.is_empty()
    }

    /// Positions compared and hashed for record identity.
    pub(crate) fn identity(&self) -> &[usize] {
        &self.identity
    }

    /// Whether this schema is `schema` or inherits from it.
    #[must_use]
    pub fn is_a(&self, schema: &SchemaId) -> bool {
        &self.id == schema || self.heritage.contains(schema)
    }

    /// Class-bound reference to a declared field, used to build predicates.
    pub fn field_ref(&self, name: &str) -> Result<FieldRef, QueryError> {
        if self.position(name).is_none() {
            return Err(QueryError::UnknownField {
                schema: self.id.clone(),
                field: name.to_string(),
            });
        }

        Ok(FieldRef::new(self.id.clone(), name))
    }

    /// Deterministic digest of the aggregated field table.
    #[must_use]
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();

        hash::write_str(&mut hasher, self.id.as_str());
        hash::write_len_u32(&mut hasher, self.heritage.len());
        for ancestor in &self.heritage {
            hash::write_str(&mut hasher, ancestor.as_str());
        }

        hash::write_len_u32(&mut hasher, self.fields.len());
        for field in &self.fields {
            hash::write_field(&mut hasher, field);
        }

        hasher.finalize().into()
    }
}
