//! Tool configuration
//!
//! Built once per invocation: named defaults, then an optional TOML file, then
//! environment and command-line overrides applied by the CLI layer.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::domain::errors::DomainError;
use crate::domain::model::TimeSpec;
use crate::utils::logging::LogFormat;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "vidutils.toml";

pub const DEFAULT_FFMPEG: &str = "ffmpeg";
pub const DEFAULT_FFPROBE: &str = "ffprobe";
pub const DEFAULT_OUTPUT: &str = "out.mp4";
pub const DEFAULT_CROSSFADE: TimeSpec = TimeSpec::from_secs(5);
pub const DEFAULT_PART_SUFFIX: &str = "_part";
pub const DEFAULT_VOLUME: &str = "0";
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
pub const DEFAULT_AUDIO_CHANNELS: u32 = 2;

/// Settings shared by every tool
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
    /// Directory for intermediate files
    pub temp_dir: PathBuf,
    /// Replace existing final outputs
    pub overwrite: bool,
    /// Leave intermediate files behind
    pub keep_temp: bool,
    /// Print engine requests instead of running them
    pub dry_run: bool,
    pub log_level: String,
    pub log_format: LogFormat,
    /// ffmpeg `-loglevel`; unset keeps the engine's default output
    pub engine_log_level: Option<String>,
    pub merge: MergeConfig,
    pub split: SplitConfig,
    pub volume: VolumeConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeConfig {
    pub crossfade_duration: TimeSpec,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    /// Appended to the input's file name when no prefix is given
    pub part_suffix: String,
    /// Concurrent extractions; 0 means one per CPU
    pub jobs: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VolumeConfig {
    pub output: PathBuf,
    pub volume: String,
    pub audio_codec: String,
    /// `-ac` for the edited output; 0 keeps the filter's layout
    pub audio_channels: u32,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg: DEFAULT_FFMPEG.to_string(),
            ffprobe: DEFAULT_FFPROBE.to_string(),
            temp_dir: PathBuf::from("."),
            overwrite: false,
            keep_temp: false,
            dry_run: false,
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
            engine_log_level: None,
            merge: MergeConfig::default(),
            split: SplitConfig::default(),
            volume: VolumeConfig::default(),
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            crossfade_duration: DEFAULT_CROSSFADE,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            part_suffix: DEFAULT_PART_SUFFIX.to_string(),
            jobs: 1,
        }
    }
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            volume: DEFAULT_VOLUME.to_string(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_channels: DEFAULT_AUDIO_CHANNELS,
        }
    }
}

impl ToolConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        toml::from_str(content)
            .map_err(|e| DomainError::BadArgs(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load `path`, which must exist
    pub fn from_file(path: &Path) -> Result<Self, DomainError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::FsFail(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load the explicit config file, else `vidutils.toml` if present, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self, DomainError> {
        if let Some(path) = explicit {
            debug!("Loading configuration from {}", path.display());
            return Self::from_file(path);
        }

        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            debug!("Loading configuration from {}", fallback.display());
            return Self::from_file(fallback);
        }

        Ok(Self::default())
    }

    /// Concurrent split extractions, resolving 0 to the CPU count
    pub fn split_jobs(&self) -> usize {
        match self.split.jobs {
            0 => num_cpus::get().max(1),
            n => n,
        }
    }

    /// Output channel layout for volume edits
    pub fn volume_audio_channels(&self) -> Option<u32> {
        match self.volume.audio_channels {
            0 => None,
            n => Some(n),
        }
    }
}
