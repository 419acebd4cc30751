// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::request::EngineRequest;
use async_trait::async_trait;

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Probe a video file and return its technical profile
    async fn probe(&self, path: &Path) -> Result<VideoProfile, DomainError>;
}

/// Port for the external media engine
#[async_trait]
pub trait EnginePort: Send + Sync {
    /// Run one request to completion; non-zero exit is an error
    async fn run(&self, request: &EngineRequest) -> Result<(), DomainError>;
}

/// Port for file system operations
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Create an empty, persisted temporary file named `<prefix><random><suffix>`
    async fn create_temp_file(&self, prefix: &str, suffix: &str) -> Result<PathBuf, DomainError>;

    /// Write `contents` to `path`, replacing anything already there
    async fn write_file(&self, path: &Path, contents: &str) -> Result<(), DomainError>;

    /// Delete file
    async fn remove_file(&self, path: &Path) -> Result<(), DomainError>;
}

/// Port for logging and observability
pub trait LogPort: Send + Sync {
    /// Emit `message` at `level`
    fn log(&self, level: LogLevel, message: &str);

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::BadArgs(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("INFO").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::parse("warning").unwrap(), LogLevel::Warn);
        assert!(LogLevel::parse("loud").is_err());
        assert!(LogLevel::Debug < LogLevel::Error);
    }
}
