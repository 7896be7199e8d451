//! fgr: declarative typed schemas, validated records, and a storage-agnostic
//! predicate algebra.
//!
//! ## Crate layout
//! - `config`: TOML-backed registry and logging configuration.
//! - `core`: values, field descriptors, the schema registry, records, the
//!   query algebra, and observability sinks.
//! - `error`: the public error type with a stable kind + origin taxonomy.
//!
//! The `prelude` module re-exports the vocabulary needed to declare schemas,
//! build records, and author queries.

pub use fgr_config as config;
pub use fgr_core as core;

pub mod error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// re-exports
pub use error::{Error, ErrorKind, ErrorOrigin};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        config::FgrConfig,
        core::{
            obs::{LogSink, MemorySink, NoopSink, StderrSink},
            prelude::*,
        },
        error::{Error, ErrorKind},
    };
}
