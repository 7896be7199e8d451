//! Core runtime for fgr: values, field descriptors, the schema registry,
//! validated records, and the storage-agnostic predicate algebra.
#![warn(unreachable_pub)]

pub mod error;
pub mod field;
pub mod naming;
pub mod obs;
pub mod query;
pub mod record;
pub mod schema;
pub mod value;

pub(crate) mod hash;

// re-exports
pub use error::Error;
pub use fgr_config as config;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No sinks, registries internals, or hashing helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        field::{FieldDefault, FieldDescriptor},
        naming::NamingConvention,
        query::{CompareOp, Condition, FieldRef, Predicate, Query, SortBy, SortDirection},
        record::Record,
        schema::{SchemaDef, SchemaId, SchemaModel, SchemaRegistry},
        value::{TypeSpec, Value, ValueType},
    };
}
