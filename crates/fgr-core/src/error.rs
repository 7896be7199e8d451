use crate::{
    query::QueryError,
    schema::SchemaId,
    value::{TypeSpec, Value, ValueList},
};
use thiserror::Error as ThisError;

///
/// ValidationError
///
/// Raised while constructing or mutating a record.
/// Always names the offending field; a failed operation applies nothing.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidationError {
    #[error("field '{field}': expected {expected}, received {received}")]
    TypeMismatch {
        field: String,
        expected: TypeSpec,
        received: Value,
    },

    #[error("field '{field}': {received} is not one of {}", ValueList(.allowed))]
    EnumerationViolation {
        field: String,
        allowed: Vec<Value>,
        received: Value,
    },

    #[error("field '{field}' is immutable")]
    ImmutableField { field: String },

    #[error("field '{field}' is not declared on schema '{schema}'")]
    UnknownField { schema: SchemaId, field: String },

    #[error("field '{field}': cannot decode {received} as {expected}")]
    Decode {
        field: String,
        expected: TypeSpec,
        received: String,
    },

    #[error("field '{field}' is supplied more than once (as '{key}')")]
    DuplicateKey { field: String, key: String },
}

impl ValidationError {
    /// Name of the field the violation was reported against.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::TypeMismatch { field, .. }
            | Self::EnumerationViolation { field, .. }
            | Self::ImmutableField { field }
            | Self::UnknownField { field, .. }
            | Self::Decode { field, .. }
            | Self::DuplicateKey { field, .. } => field,
        }
    }
}

///
/// SchemaDefinitionError
///
/// Raised when a schema definition is registered.
/// A schema that fails definition is never retained by the registry.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SchemaDefinitionError {
    #[error("schema id must be a non-empty identifier, got '{schema}'")]
    InvalidSchemaId { schema: String },

    #[error("schema '{schema}': invalid field identifier '{field}': {reason}")]
    InvalidIdent {
        schema: SchemaId,
        field: String,
        reason: String,
    },

    #[error("schema '{schema}': field name '{field}' is reserved")]
    ReservedIdent { schema: SchemaId, field: String },

    #[error("schema '{schema}': field '{field}' is declared more than once")]
    DuplicateField { schema: SchemaId, field: String },

    #[error("schema '{schema}': public field '{field}' has no description")]
    MissingDescription { schema: SchemaId, field: String },

    #[error("schema '{schema}': default for field '{field}' is invalid: {source}")]
    InvalidDefault {
        schema: SchemaId,
        field: String,
        #[source]
        source: ValidationError,
    },

    #[error("schema '{schema}': field '{field}' type {declared} mixes bytes with lists")]
    AmbiguousType {
        schema: SchemaId,
        field: String,
        declared: TypeSpec,
    },

    #[error(
        "schema '{schema}': enumeration member {member} of field '{field}' does not satisfy {expected}"
    )]
    EnumerationType {
        schema: SchemaId,
        field: String,
        member: Value,
        expected: TypeSpec,
    },

    #[error("schema '{schema}': unknown parent schema '{parent}'")]
    UnknownParent { schema: SchemaId, parent: SchemaId },

    #[error("schema '{schema}' cannot inherit from '{parent}': heritage would be cyclic")]
    CyclicHeritage { schema: SchemaId, parent: SchemaId },

    #[error("schema '{schema}': field '{field}' references unknown schema '{target}'")]
    UnknownRecordType {
        schema: SchemaId,
        field: String,
        target: SchemaId,
    },

    #[error("schema '{schema}' is already registered with a different definition")]
    DuplicateSchema { schema: SchemaId },

    #[error("schema '{schema}' is not registered")]
    UnknownSchema { schema: SchemaId },
}

///
/// Error
///
/// Union of the core errors for registry operations that can fail in more
/// than one phase, such as constructing a record by schema id.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Schema(#[from] SchemaDefinitionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
