use std::sync::Arc;

use crate::adapters::{
    DryRunAdapter, FFmpegAdapter, FFprobeAdapter, FsLocalAdapter, TracingLogAdapter,
};
use crate::app::{
    MergeInteractor, MergeSettings, SplitInteractor, SplitSettings, VolumeInteractor,
    VolumeSettings,
};
use crate::config::ToolConfig;
use crate::domain::errors::DomainError;
use crate::domain::request::AudioEncoding;
use crate::ports::{EnginePort, FsPort, LogLevel, LogPort, ProbePort};

pub trait AppContainer: Send + Sync {
    fn merge_interactor(&self) -> Arc<MergeInteractor>;
    fn split_interactor(&self) -> Arc<SplitInteractor>;
    fn volume_interactor(&self) -> Arc<VolumeInteractor>;
}

pub struct DefaultAppContainer {
    merge_interactor: Arc<MergeInteractor>,
    split_interactor: Arc<SplitInteractor>,
    volume_interactor: Arc<VolumeInteractor>,
}

impl DefaultAppContainer {
    /// Wire adapters for one invocation from the resolved configuration
    pub fn new(config: &ToolConfig) -> Result<Self, DomainError> {
        let probe_port: Arc<dyn ProbePort> =
            Arc::new(FFprobeAdapter::new(config.ffprobe.clone())?);
        let engine_port: Arc<dyn EnginePort> = if config.dry_run {
            Arc::new(DryRunAdapter::new(config.ffmpeg.clone()))
        } else {
            Arc::new(FFmpegAdapter::new(
                config.ffmpeg.clone(),
                config.engine_log_level.clone(),
            ))
        };
        let fs_port: Arc<dyn FsPort> = Arc::new(FsLocalAdapter::new(config.temp_dir.clone())?);

        // Filter directives such as "vidutils=debug" are left to the subscriber
        let level = LogLevel::parse(&config.log_level).unwrap_or(LogLevel::Trace);
        let log_for = |component: &'static str| -> Arc<dyn LogPort> {
            Arc::new(TracingLogAdapter::new(component, level))
        };

        let merge_interactor = Arc::new(MergeInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&engine_port),
            Arc::clone(&fs_port),
            log_for("merge"),
            MergeSettings {
                overwrite: config.overwrite,
                keep_temp: config.keep_temp,
            },
        ));

        let split_interactor = Arc::new(SplitInteractor::new(
            Arc::clone(&engine_port),
            log_for("split"),
            SplitSettings {
                part_suffix: config.split.part_suffix.clone(),
                jobs: config.split_jobs(),
                overwrite: config.overwrite,
            },
        ));

        let volume_interactor = Arc::new(VolumeInteractor::new(
            Arc::clone(&probe_port),
            Arc::clone(&engine_port),
            log_for("volume"),
            VolumeSettings {
                overwrite: config.overwrite,
                audio: AudioEncoding {
                    codec: config.volume.audio_codec.clone(),
                    channels: config.volume_audio_channels(),
                },
            },
        ));

        Ok(Self {
            merge_interactor,
            split_interactor,
            volume_interactor,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn merge_interactor(&self) -> Arc<MergeInteractor> {
        Arc::clone(&self.merge_interactor)
    }

    fn split_interactor(&self) -> Arc<SplitInteractor> {
        Arc::clone(&self.split_interactor)
    }

    fn volume_interactor(&self) -> Arc<VolumeInteractor> {
        Arc::clone(&self.volume_interactor)
    }
}
