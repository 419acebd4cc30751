// Split interactor - Orchestrates splitting a file at timestamps

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::request::EngineRequest;
use crate::domain::rules::*;
use crate::ports::*;
use crate::utils::path;

/// Split request
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRequest {
    pub input: PathBuf,
    /// Split points, strictly increasing
    pub boundaries: Vec<TimeSpec>,
    /// Trim everything before this time
    pub start: Option<TimeSpec>,
    /// Trim everything after this time
    pub end: Option<TimeSpec>,
    /// Output name prefix; defaults to the input's file name plus the part suffix
    pub prefix: Option<String>,
}

/// Split behaviour taken from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSettings {
    pub part_suffix: String,
    pub jobs: usize,
    pub overwrite: bool,
}

/// Interactor for the split use case
pub struct SplitInteractor {
    engine_port: Arc<dyn EnginePort>,
    log_port: Arc<dyn LogPort>,
    settings: SplitSettings,
}

impl SplitInteractor {
    /// Create new split interactor with injected ports
    pub fn new(
        engine_port: Arc<dyn EnginePort>,
        log_port: Arc<dyn LogPort>,
        settings: SplitSettings,
    ) -> Self {
        Self {
            engine_port,
            log_port,
            settings,
        }
    }

    /// Plan every extraction without running anything
    pub fn plan(&self, request: &SplitRequest) -> Result<Vec<(EngineRequest, PathBuf)>, DomainError> {
        let ranges = SegmentPlanner::split_ranges(&request.boundaries, request.start, request.end)?;

        let prefix = request
            .prefix
            .clone()
            .unwrap_or_else(|| path::default_prefix(&request.input, &self.settings.part_suffix));
        let extension = path::extension_of(&request.input);

        let planned = ranges
            .iter()
            .enumerate()
            .map(|(i, range)| {
                let output = path::part_path(&prefix, i + 1, &extension);
                let extraction = EngineRequest::extraction(
                    &request.input,
                    range,
                    &output,
                    self.settings.overwrite,
                );
                extraction.validate().map(|_| (extraction, output))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(planned)
    }

    /// Split the input into N+1 parts, returning the part paths in order
    pub async fn execute(&self, request: SplitRequest) -> Result<Vec<PathBuf>, DomainError> {
        let planned = self.plan(&request)?;
        self.log_port.info(&format!(
            "Splitting {} into {} parts",
            request.input.display(),
            planned.len()
        ));

        let outputs: Vec<PathBuf> = planned.iter().map(|(_, output)| output.clone()).collect();
        let requests: Vec<EngineRequest> = planned.into_iter().map(|(r, _)| r).collect();

        let jobs = self.settings.jobs.max(1);
        if jobs == 1 {
            for extraction in &requests {
                self.engine_port.run(extraction).await?;
            }
        } else {
            self.run_concurrently(requests, jobs).await?;
        }

        for output in &outputs {
            self.log_port.info(&format!("Wrote {}", output.display()));
        }
        Ok(outputs)
    }

    /// Run at most `jobs` extractions at once; the first failure aborts the rest
    async fn run_concurrently(
        &self,
        requests: Vec<EngineRequest>,
        jobs: usize,
    ) -> Result<(), DomainError> {
        self.log_port
            .debug(&format!("Running up to {} extractions at once", jobs));

        let mut pending = requests.into_iter();
        let mut running = JoinSet::new();

        loop {
            while running.len() < jobs {
                let Some(extraction) = pending.next() else {
                    break;
                };
                let engine = Arc::clone(&self.engine_port);
                running.spawn(async move { engine.run(&extraction).await });
            }

            let Some(joined) = running.join_next().await else {
                return Ok(());
            };
            let outcome = joined.map_err(|e| DomainError::EngineFail {
                program: "split worker".to_string(),
                status: e.to_string(),
            });
            if let Err(e) = outcome.and_then(|result| result) {
                running.shutdown().await;
                return Err(e);
            }
        }
    }
}
