//! Storage-agnostic query algebra.
//!
//! This layer only builds trees. Evaluation order, negation pushdown and
//! similarity scoring belong to whichever evaluator consumes a `Query`.

mod field_ref;
mod fingerprint;
mod intent;
mod predicate;

#[cfg(test)]
mod tests;

use crate::schema::SchemaId;
use thiserror::Error as ThisError;

// re-exports
pub use field_ref::{FieldRef, SimilarOperand};
pub use intent::{Query, SortBy, SortDirection};
pub use predicate::{CompareOp, Condition, Predicate, PredicateVisitor};

///
/// QueryError
///
/// Raised at the point a query is misused while being built.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("field '{field}': invalid similarity operand {operand}: {reason}")]
    InvalidOperand {
        field: String,
        operand: String,
        reason: &'static str,
    },

    #[error("limit must be non-negative, got {limit}")]
    InvalidLimit { limit: i64 },

    #[error("field '{field}' is not declared on schema '{schema}'")]
    UnknownField { schema: SchemaId, field: String },

    #[error("schema '{schema}' is not registered")]
    UnknownSchema { schema: SchemaId },
}
