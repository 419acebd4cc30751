// Merge interactor - Orchestrates the crossfade merge use case

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::request::{concat_list, CrossfadeProfile, EngineRequest};
use crate::domain::rules::*;
use crate::ports::*;
use crate::utils::path;

/// Prefix of the synthesized crossfade clip
const FINAL_CROSSFADE_PREFIX: &str = "final-crossf-";
/// Prefix of the concat demuxer list
const LIST_PREFIX: &str = "vid-list-";

/// Merge request
#[derive(Debug, Clone, PartialEq)]
pub struct MergeRequest {
    /// Outgoing file; its tail fades out
    pub first: PathBuf,
    /// Incoming file; its head fades in
    pub second: PathBuf,
    pub output: PathBuf,
    pub crossfade: CrossfadeSpec,
}

/// Merge behaviour taken from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeSettings {
    pub overwrite: bool,
    pub keep_temp: bool,
}

/// Interactor for the crossfade merge use case
pub struct MergeInteractor {
    probe_port: Arc<dyn ProbePort>,
    engine_port: Arc<dyn EnginePort>,
    fs_port: Arc<dyn FsPort>,
    log_port: Arc<dyn LogPort>,
    settings: MergeSettings,
}

/// Intermediate files owned by one merge
#[derive(Debug, Default)]
struct TempFiles {
    paths: Vec<PathBuf>,
}

impl TempFiles {
    fn track(&mut self, path: PathBuf) -> PathBuf {
        self.paths.push(path.clone());
        path
    }
}

impl MergeInteractor {
    /// Create new merge interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        engine_port: Arc<dyn EnginePort>,
        fs_port: Arc<dyn FsPort>,
        log_port: Arc<dyn LogPort>,
        settings: MergeSettings,
    ) -> Self {
        Self {
            probe_port,
            engine_port,
            fs_port,
            log_port,
            settings,
        }
    }

    /// Merge two files with a video and audio crossfade between them
    pub async fn execute(&self, request: MergeRequest) -> Result<PathBuf, DomainError> {
        let first = self.probe_port.probe(&request.first).await?;
        let second = self.probe_port.probe(&request.second).await?;

        ProfileMatcher::ensure_compatible(&first, &second)?;
        let (outgoing, incoming) = CrossfadePlanner::plan(&first, &second, &request.crossfade)?;
        self.log_port.info(&format!(
            "Crossfading {} {} into {} {}",
            first.display_path(),
            outgoing.crossfade,
            second.display_path(),
            incoming.crossfade
        ));

        let mut temps = TempFiles::default();
        let result = self
            .assemble(&request, &first, &second, &outgoing, &incoming, &mut temps)
            .await;
        self.cleanup(temps).await;

        if result.is_ok() {
            self.log_port
                .info(&format!("Merged video written to {}", request.output.display()));
        }
        result
    }

    async fn assemble(
        &self,
        request: &MergeRequest,
        first: &VideoProfile,
        second: &VideoProfile,
        outgoing: &CrossfadeBoundaries,
        incoming: &CrossfadeBoundaries,
        temps: &mut TempFiles,
    ) -> Result<PathBuf, DomainError> {
        let first_main = temps.track(self.temp_for(&request.first, "main").await?);
        let first_fade = temps.track(self.temp_for(&request.first, "crossf").await?);
        let second_fade = temps.track(self.temp_for(&request.second, "crossf").await?);
        let second_main = temps.track(self.temp_for(&request.second, "main").await?);

        let extractions = [
            (&request.first, &outgoing.main, &first_main),
            (&request.first, &outgoing.crossfade, &first_fade),
            (&request.second, &incoming.crossfade, &second_fade),
            (&request.second, &incoming.main, &second_main),
        ];
        for (input, range, output) in extractions {
            self.engine_port
                .run(&EngineRequest::extraction(input, range, output, true))
                .await?;
        }

        let suffix = path::temp_suffix(&request.first);
        let crossfaded = temps.track(
            self.fs_port
                .create_temp_file(FINAL_CROSSFADE_PREFIX, &suffix)
                .await?,
        );
        let profile = CrossfadeProfile::from_inputs(first, second, request.crossfade.duration);
        self.engine_port
            .run(&EngineRequest::crossfade(
                &first_fade,
                &second_fade,
                &profile,
                &crossfaded,
            ))
            .await?;

        let list = temps.track(self.fs_port.create_temp_file(LIST_PREFIX, ".txt").await?);
        let listing = concat_list(&[first_main, crossfaded, second_main]);
        self.fs_port.write_file(&list, &listing).await?;

        self.engine_port
            .run(&EngineRequest::concat(
                &list,
                &request.output,
                self.settings.overwrite,
            ))
            .await?;

        Ok(request.output.clone())
    }

    async fn temp_for(&self, input: &Path, purpose: &str) -> Result<PathBuf, DomainError> {
        self.fs_port
            .create_temp_file(&path::temp_prefix(input, purpose), &path::temp_suffix(input))
            .await
    }

    /// Remove intermediate files; failures are reported, never fatal
    async fn cleanup(&self, temps: TempFiles) {
        if self.settings.keep_temp {
            for kept in &temps.paths {
                self.log_port
                    .info(&format!("Keeping temp file {}", kept.display()));
            }
            return;
        }

        for temp in &temps.paths {
            if let Err(e) = self.fs_port.remove_file(temp).await {
                self.log_port
                    .warn(&format!("Could not remove temp file {}: {}", temp.display(), e));
            }
        }
    }
}
