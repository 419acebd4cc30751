// Volume interactor - Orchestrates per-channel volume editing

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::request::{AudioEncoding, EngineRequest};
use crate::domain::rules::*;
use crate::ports::*;

/// Volume edit request
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeRequest {
    pub input: PathBuf,
    /// 1-based audio channel to edit
    pub target_channel: usize,
    pub segments: Vec<TimeRange>,
    /// One level for every segment, or one per segment
    pub levels: Vec<VolumeLevel>,
    /// Merge the edited channel with the remaining channels
    pub merge: bool,
    /// 1-based channels left out of the merge
    pub excluded: BTreeSet<usize>,
    pub output: PathBuf,
}

/// Volume behaviour taken from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSettings {
    pub overwrite: bool,
    pub audio: AudioEncoding,
}

/// Interactor for the volume editing use case
pub struct VolumeInteractor {
    probe_port: Arc<dyn ProbePort>,
    engine_port: Arc<dyn EnginePort>,
    log_port: Arc<dyn LogPort>,
    settings: VolumeSettings,
}

impl VolumeInteractor {
    /// Create new volume interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        engine_port: Arc<dyn EnginePort>,
        log_port: Arc<dyn LogPort>,
        settings: VolumeSettings,
    ) -> Self {
        Self {
            probe_port,
            engine_port,
            log_port,
            settings,
        }
    }

    /// Apply time-gated volume changes to one channel
    pub async fn execute(&self, request: VolumeRequest) -> Result<PathBuf, DomainError> {
        let edits = VolumePlanner::pair_levels(request.segments, request.levels)?;

        let profile = self.probe_port.probe(&request.input).await?;
        let selection = ChannelSelection::new(
            profile.audio_channels,
            request.target_channel,
            request.excluded,
        )?;

        if request.merge && selection.merge_sources().is_empty() {
            self.log_port.warn(&format!(
                "No other audio channels to merge with channel {}; writing it alone",
                request.target_channel
            ));
        }

        let edit = EngineRequest::volume_edit(
            &request.input,
            &selection,
            &edits,
            request.merge,
            &self.settings.audio,
            &request.output,
            self.settings.overwrite,
        );
        edit.validate()?;

        self.log_port.info(&format!(
            "Editing {} segment(s) on audio channel {} of {}",
            edits.len(),
            request.target_channel,
            profile.display_path()
        ));
        self.engine_port.run(&edit).await?;

        self.log_port
            .info(&format!("Edited video written to {}", request.output.display()));
        Ok(request.output)
    }
}
