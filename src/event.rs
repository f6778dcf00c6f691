use crate::api::{ApiError, ConnectivityState};
use crate::bridge::ColorScheme;
use chrono::Local;

#[derive(Debug, Clone)]
pub enum AppEvent {
    ThemeChanged(ColorScheme),
    ConnectivityProbed {
        state: ConnectivityState,
        detail: String,
    },
    SendSucceeded {
        action: String,
        reply: String,
    },
    SendFailed {
        action: String,
        error: ApiError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn append(&mut self, level: LogLevel, message: impl Into<String>) {
        self.entries.push(LogEntry {
            time: Local::now().format("%H:%M:%S").to_string(),
            level,
            message: message.into(),
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.append(LogLevel::Info, "Log cleared");
    }
}
