//! Log sink boundary.
//!
//! Sinks receive fully built events and must not call back into the registry.

use crate::obs::LogEvent;
use std::{
    io::Write,
    sync::{Mutex, PoisonError},
};

///
/// LogSink
///

pub trait LogSink: Send + Sync {
    fn record(&self, event: &LogEvent);
}

///
/// Redactor
/// Scrubs rendered output before it leaves the process.
///

pub trait Redactor: Send + Sync {
    fn redact(&self, text: &str) -> String;
}

///
/// NoopSink
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn record(&self, _: &LogEvent) {}
}

///
/// MemorySink
/// Captures events in memory; used by tests and diagnostics tooling.
///

#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every event recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl LogSink for MemorySink {
    fn record(&self, event: &LogEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

///
/// StderrSink
/// Writes one JSON object per event to stderr.
///

#[derive(Default)]
pub struct StderrSink {
    redactor: Option<Box<dyn Redactor>>,
}

impl StderrSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_redactor(mut self, redactor: impl Redactor + 'static) -> Self {
        self.redactor = Some(Box::new(redactor));
        self
    }

    /// Render an event as the line this sink would write.
    #[must_use]
    pub fn render(&self, event: &LogEvent) -> String {
        let line = serde_json::to_string(event).unwrap_or_else(|err| {
            format!(
                "{{\"level\":\"{}\",\"target\":\"{}\",\"entry\":\"unserializable event: {err}\"}}",
                event.level, event.target
            )
        });

        match &self.redactor {
            Some(redactor) => redactor.redact(&line),
            None => line,
        }
    }
}

impl LogSink for StderrSink {
    fn record(&self, event: &LogEvent) {
        let line = self.render(event);

        // a closed stderr is not worth failing a schema operation over
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }
}

impl std::fmt::Debug for StderrSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StderrSink")
            .field("redacting", &self.redactor.is_some())
            .finish()
    }
}
