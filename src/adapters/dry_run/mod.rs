//! Dry-run engine adapter
//!
//! Prints each request as a JSON line instead of running it.

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::errors::*;
use crate::domain::request::EngineRequest;
use crate::ports::*;

/// One printed invocation
#[derive(Debug, Serialize)]
struct PlannedInvocation<'a> {
    purpose: &'a str,
    program: &'a str,
    args: Vec<String>,
}

/// Engine adapter that writes requests to a sink instead of executing them
pub struct DryRunAdapter {
    program: String,
    sink: Mutex<Box<dyn Write + Send>>,
}

impl DryRunAdapter {
    /// Print requests for `program` to stdout
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_sink(program, Box::new(std::io::stdout()))
    }

    pub fn with_sink(program: impl Into<String>, sink: Box<dyn Write + Send>) -> Self {
        Self {
            program: program.into(),
            sink: Mutex::new(sink),
        }
    }

    /// JSON line describing `request`
    pub fn render(&self, request: &EngineRequest) -> Result<String, DomainError> {
        let planned = PlannedInvocation {
            purpose: request.purpose(),
            program: &self.program,
            args: request.to_args()?,
        };
        serde_json::to_string(&planned)
            .map_err(|e| DomainError::BadArgs(format!("Failed to serialize request: {}", e)))
    }
}

#[async_trait]
impl EnginePort for DryRunAdapter {
    async fn run(&self, request: &EngineRequest) -> Result<(), DomainError> {
        let line = self.render(request)?;
        let mut sink = self
            .sink
            .lock()
            .map_err(|_| DomainError::FsFail("dry-run output lock poisoned".to_string()))?;
        writeln!(sink, "{}", line)
            .and_then(|_| sink.flush())
            .map_err(|e| DomainError::FsFail(format!("Failed to write dry-run output: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{TimeRange, TimeSpec};
    use std::path::Path;

    #[test]
    fn test_render_json_line() {
        let adapter = DryRunAdapter::with_sink("ffmpeg", Box::new(std::io::sink()));
        let range = TimeRange::until(TimeSpec::from_secs(30)).unwrap();
        let request =
            EngineRequest::extraction(Path::new("in.mp4"), &range, Path::new("part1.mp4"), false);

        let line = adapter.render(&request).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["program"], "ffmpeg");
        assert_eq!(value["args"][0], "-n");
        assert_eq!(
            value["args"].as_array().and_then(|a| a.last()).unwrap(),
            "part1.mp4"
        );
    }
}
