//! Audit log sink.
//!
//! The crawler and the audit runner report what they do as leveled lines
//! through a [`LogSink`]. [`TracingSink`] forwards them to `tracing`, the
//! binary prints them next to its progress spinner, and
//! tests capture them with [`MemorySink`].

use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only sink for leveled audit messages.
pub trait LogSink: Send + Sync {
    fn append(&self, level: LogLevel, message: &str);

    fn info(&self, message: &str) {
        self.append(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.append(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.append(LogLevel::Error, message);
    }
}

pub type SharedSink = Arc<dyn LogSink>;

/// Forwards every line to the `tracing` macro of the same level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn append(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => info!("{}", message),
            LogLevel::Warn => warn!("{}", message),
            LogLevel::Error => error!("{}", message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Keeps every line in memory, in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<LogLine>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.lines().iter().filter(|l| l.level == level).count()
    }
}

impl LogSink for MemorySink {
    fn append(&self, level: LogLevel, message: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(LogLine {
                level,
                message: message.to_string(),
            });
        }
    }
}
