use derive_more::Display;
use fgr_config::ConfigError;
use fgr_core::{
    error::{Error as CoreError, SchemaDefinitionError, ValidationError},
    query::QueryError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<SchemaDefinitionError> for Error {
    fn from(err: SchemaDefinitionError) -> Self {
        let kind = match err {
            SchemaDefinitionError::DuplicateSchema { .. } => SchemaErrorKind::Duplicate,
            SchemaDefinitionError::UnknownSchema { .. } => SchemaErrorKind::NotFound,
            SchemaDefinitionError::UnknownParent { .. }
            | SchemaDefinitionError::CyclicHeritage { .. } => SchemaErrorKind::Heritage,
            _ => SchemaErrorKind::InvalidDefinition,
        };

        Self::new(ErrorKind::Schema(kind), ErrorOrigin::Registry, err.to_string())
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        let kind = match err {
            ValidationError::TypeMismatch { .. } => ValidationErrorKind::TypeMismatch,
            ValidationError::EnumerationViolation { .. } => ValidationErrorKind::Enumeration,
            ValidationError::ImmutableField { .. } => ValidationErrorKind::Immutable,
            ValidationError::UnknownField { .. } => ValidationErrorKind::UnknownField,
            ValidationError::Decode { .. } => ValidationErrorKind::Decode,
            ValidationError::DuplicateKey { .. } => ValidationErrorKind::DuplicateKey,
        };

        Self::new(ErrorKind::Validation(kind), ErrorOrigin::Record, err.to_string())
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        let kind = match err {
            QueryError::InvalidOperand { .. } => QueryErrorKind::InvalidOperand,
            QueryError::InvalidLimit { .. } => QueryErrorKind::InvalidLimit,
            QueryError::UnknownField { .. } | QueryError::UnknownSchema { .. } => {
                QueryErrorKind::UnknownField
            }
        };

        Self::new(ErrorKind::Query(kind), ErrorOrigin::Query, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Query(err) => err.into(),
            CoreError::Schema(err) => err.into(),
            CoreError::Validation(err) => err.into(),
        }
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Configuration could not be read or parsed.
    Config,
    Query(QueryErrorKind),
    Schema(SchemaErrorKind),
    Validation(ValidationErrorKind),
}

///
/// SchemaErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SchemaErrorKind {
    /// A field declaration or default breaks its own contract.
    InvalidDefinition,

    /// A parent is missing or would make the heritage cyclic.
    Heritage,

    /// The id is taken by a different definition.
    Duplicate,

    NotFound,
}

///
/// ValidationErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ValidationErrorKind {
    TypeMismatch,
    Enumeration,
    Immutable,
    UnknownField,

    /// A primitive value fits no member of the declared type.
    Decode,

    /// Two input keys resolve to the same field.
    DuplicateKey,
}

///
/// QueryErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum QueryErrorKind {
    InvalidOperand,
    InvalidLimit,

    /// A field or schema named by the query is not declared.
    UnknownField,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,
    Query,
    Record,
    Registry,
}
