//! FFmpeg execution adapter
//!
//! Runs one `EngineRequest` as an ffmpeg child process. The engine's own
//! output goes straight to the terminal. Dropping a pending `run` kills the
//! child, so aborted split jobs stop writing.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::request::EngineRequest;
use crate::ports::*;

/// FFmpeg-based execution adapter
pub struct FFmpegAdapter {
    program: String,
    /// Passed as `-loglevel`; `None` leaves ffmpeg's default verbosity
    engine_log_level: Option<String>,
}

impl FFmpegAdapter {
    /// Create new FFmpeg adapter running `program`
    pub fn new(program: impl Into<String>, engine_log_level: Option<String>) -> Self {
        Self {
            program: program.into(),
            engine_log_level,
        }
    }

    /// Full argument list, including the banner and verbosity flags
    pub fn command_line(&self, request: &EngineRequest) -> Result<Vec<String>, DomainError> {
        let mut args = Vec::new();
        if let Some(level) = &self.engine_log_level {
            args.push("-hide_banner".to_string());
            args.push("-loglevel".to_string());
            args.push(level.clone());
        }
        args.extend(request.to_args()?);
        Ok(args)
    }
}

#[async_trait]
impl EnginePort for FFmpegAdapter {
    async fn run(&self, request: &EngineRequest) -> Result<(), DomainError> {
        let args = self.command_line(request)?;
        info!("Running command: {} {}", self.program, args.join(" "));
        debug!("Purpose: {}", request.purpose());

        let status = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| DomainError::EngineFail {
                program: self.program.clone(),
                status: format!("could not be started: {}", e),
            })?;

        if !status.success() {
            return Err(DomainError::EngineFail {
                program: self.program.clone(),
                status: status.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TimeRange;
    use std::path::Path;

    #[test]
    fn test_command_line_with_log_level() {
        let adapter = FFmpegAdapter::new("ffmpeg", Some("error".to_string()));
        let request = EngineRequest::extraction(
            Path::new("in.mp4"),
            &TimeRange::full(),
            Path::new("out.mp4"),
            false,
        );

        let args = adapter.command_line(&request).unwrap();
        assert_eq!(&args[..3], ["-hide_banner", "-loglevel", "error"]);
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn test_command_line_rejects_invalid_request() {
        let adapter = FFmpegAdapter::new("ffmpeg", None);
        let request = EngineRequest::new("empty");
        assert!(matches!(
            adapter.command_line(&request),
            Err(DomainError::InvalidRequest(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_dropped_run_kills_engine() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::Duration;

        let dir = tempfile::TempDir::new().unwrap();
        let marker = dir.path().join("finished");
        let program = dir.path().join("slow-ffmpeg");
        std::fs::write(
            &program,
            format!("#!/bin/sh\nsleep 2\ntouch '{}'\n", marker.display()),
        )
        .unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let adapter = FFmpegAdapter::new(program.display().to_string(), None);
        let request = EngineRequest::extraction(
            Path::new("in.mp4"),
            &TimeRange::full(),
            Path::new("out.mp4"),
            false,
        );
        let run = tokio::time::timeout(Duration::from_millis(500), adapter.run(&request)).await;
        assert!(run.is_err());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_missing_program_is_engine_failure() {
        let adapter = FFmpegAdapter::new("vidutils-no-such-ffmpeg", None);
        let request = EngineRequest::extraction(
            Path::new("in.mp4"),
            &TimeRange::full(),
            Path::new("out.mp4"),
            false,
        );
        assert!(matches!(
            adapter.run(&request).await,
            Err(DomainError::EngineFail { .. })
        ));
    }
}
