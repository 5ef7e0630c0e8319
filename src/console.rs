//! User-facing status console
//!
//! A bounded list of timestamped lines shown to the user, separate from the
//! `tracing` diagnostics. Every entry is mirrored to `tracing` at the matching
//! level and handed to the optional log sink.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;

/// Severity of a console line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl ConsoleLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleLevel::Info => "info",
            ConsoleLevel::Success => "success",
            ConsoleLevel::Warning => "warning",
            ConsoleLevel::Error => "error",
        }
    }
}

impl fmt::Display for ConsoleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One console line
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleEntry {
    pub timestamp: DateTime<Local>,
    pub level: ConsoleLevel,
    pub message: String,
}

impl fmt::Display for ConsoleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Callback receiving every console entry
pub type LogSink = Box<dyn Fn(&ConsoleEntry) + Send>;

/// Bounded console keeping the most recent entries
pub struct Console {
    entries: VecDeque<ConsoleEntry>,
    capacity: usize,
    sink: Option<LogSink>,
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("entries", &self.entries.len())
            .field("capacity", &self.capacity)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl Console {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            sink: None,
        }
    }

    /// Install the sink that receives every new entry
    pub fn set_sink(&mut self, sink: LogSink) {
        self.sink = Some(sink);
    }

    /// Append a line, evicting the oldest past capacity
    pub fn push(&mut self, level: ConsoleLevel, message: impl Into<String>) -> ConsoleEntry {
        let entry = ConsoleEntry {
            timestamp: Local::now(),
            level,
            message: message.into(),
        };

        match level {
            ConsoleLevel::Info | ConsoleLevel::Success => tracing::info!("{}", entry.message),
            ConsoleLevel::Warning => tracing::warn!("{}", entry.message),
            ConsoleLevel::Error => tracing::error!("{}", entry.message),
        }

        if let Some(sink) = &self.sink {
            sink(&entry);
        }

        self.entries.push_back(entry.clone());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        entry
    }

    pub fn info(&mut self, message: impl Into<String>) -> ConsoleEntry {
        self.push(ConsoleLevel::Info, message)
    }

    pub fn success(&mut self, message: impl Into<String>) -> ConsoleEntry {
        self.push(ConsoleLevel::Success, message)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> ConsoleEntry {
        self.push(ConsoleLevel::Warning, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> ConsoleEntry {
        self.push(ConsoleLevel::Error, message)
    }

    /// Drop all lines, then note that the console was cleared
    pub fn clear(&mut self) -> ConsoleEntry {
        self.entries.clear();
        self.info("Console cleared")
    }

    pub fn entries(&self) -> impl Iterator<Item = &ConsoleEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&ConsoleEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
