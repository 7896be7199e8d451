//! Configuration for fgr schema registries.
//!
//! Configuration is plain TOML. Every table and key is optional; missing keys
//! fall back to the defaults documented on each field.
//!
//! ```toml
//! [schema]
//! default_naming = "camel"
//! require_descriptions = true
//! extra_reserved = ["tenant"]
//!
//! [log]
//! level = "debug"
//! ```

use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::Path};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// FgrConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FgrConfig {
    pub schema: SchemaConfig,
    pub log: LogConfig,
}

impl FgrConfig {
    /// Parse configuration from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load configuration from a TOML file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }
}

///
/// SchemaConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    /// Key style used for fields that do not declare their own.
    pub default_naming: NamingStyle,

    /// Reject public fields without a description (default `true`).
    pub require_descriptions: bool,

    /// Identifiers rejected as field names on top of the builtin list.
    pub extra_reserved: Vec<String>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            default_naming: NamingStyle::default(),
            require_descriptions: true,
            extra_reserved: Vec::new(),
        }
    }
}

///
/// NamingStyle
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum NamingStyle {
    #[default]
    Snake,
    Camel,
}

///
/// LogConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: LogLevel,
}

///
/// LogLevel
/// Ordered from most to least verbose.
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
