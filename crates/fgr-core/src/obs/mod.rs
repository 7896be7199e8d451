//! Observability: structured log events and the sink boundary.
//!
//! Core logic never writes output directly. Every diagnostic flows through a
//! `LogEvent` handed to the `LogSink` injected into the registry; choosing and
//! installing a sink is the embedding application's job.

mod sink;


use crate::{record::Record, value::Value};
use serde::Serialize;
use std::{collections::BTreeMap, sync::Arc};

// re-exports
pub use fgr_config::LogLevel;
pub use sink::{LogSink, MemorySink, NoopSink, Redactor, StderrSink};

///
/// LogEntry
/// Payload of one event: free text, a key/value mapping, or a whole record.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LogEntry {
    Text(String),
    Mapping(BTreeMap<String, Value>),
    Record(Record),
}

impl LogEntry {
    /// Build a mapping entry from key/value pairs.
    #[must_use]
    pub fn mapping<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<&str> for LogEntry {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for LogEntry {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Record> for LogEntry {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

///
/// LogEvent
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct LogEvent {
    pub level: LogLevel,
    pub target: &'static str,
    pub entry: LogEntry,
}

///
/// Logger
/// A sink plus the minimum level it should receive.
///

#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
    level: LogLevel,
}

impl Logger {
    #[must_use]
    pub fn new(sink: Arc<dyn LogSink>, level: LogLevel) -> Self {
        Self { sink, level }
    }

    /// Logger that drops everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopSink), LogLevel::Error)
    }

    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.level
    }

    pub fn log(&self, level: LogLevel, target: &'static str, entry: impl Into<LogEntry>) {
        if !self.enabled(level) {
            return;
        }

        self.sink.record(&LogEvent {
            level,
            target,
            entry: entry.into(),
        });
    }

    pub fn debug(&self, target: &'static str, entry: impl Into<LogEntry>) {
        self.log(LogLevel::Debug, target, entry);
    }

    pub fn info(&self, target: &'static str, entry: impl Into<LogEntry>) {
        self.log(LogLevel::Info, target, entry);
    }

    pub fn warn(&self, target: &'static str, entry: impl Into<LogEntry>) {
        self.log(LogLevel::Warn, target, entry);
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level)
            .finish_non_exhaustive()
    }
}
