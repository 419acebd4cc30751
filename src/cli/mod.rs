//! CLI module for vidutils
//!
//! Argument parsing, configuration bootstrap and command execution shared by
//! the `vid-merge`, `vid-split` and `vid-volume` binaries.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use tracing::error;

use crate::config::ToolConfig;
use crate::utils::logging::{init_logging, LogFormat};

pub mod args;
pub mod commands;

/// Flags accepted by every tool
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct GlobalArgs {
    /// TOML configuration file
    #[arg(long, env = "VIDUTILS_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Logging level or filter directive
    #[arg(long, env = "VIDUTILS_LOG_LEVEL", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// ffmpeg executable
    #[arg(long, env = "VIDUTILS_FFMPEG", value_name = "BIN")]
    pub ffmpeg: Option<String>,

    /// ffprobe executable
    #[arg(long, env = "VIDUTILS_FFPROBE", value_name = "BIN")]
    pub ffprobe: Option<String>,

    /// Directory for intermediate files
    #[arg(long, env = "VIDUTILS_TEMP_DIR", value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Replace existing output files
    #[arg(long)]
    pub overwrite: bool,

    /// Print the ffmpeg invocations as JSON lines instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Verbosity passed to ffmpeg as -loglevel
    #[arg(long, value_name = "LEVEL")]
    pub engine_log_level: Option<String>,
}

impl GlobalArgs {
    /// Apply command-line and environment overrides on top of `config`
    pub fn apply(&self, config: &mut ToolConfig) {
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Some(ffmpeg) = &self.ffmpeg {
            config.ffmpeg = ffmpeg.clone();
        }
        if let Some(ffprobe) = &self.ffprobe {
            config.ffprobe = ffprobe.clone();
        }
        if let Some(dir) = &self.temp_dir {
            config.temp_dir = dir.clone();
        }
        if let Some(level) = &self.engine_log_level {
            config.engine_log_level = Some(level.clone());
        }
        config.overwrite |= self.overwrite;
        config.dry_run |= self.dry_run;
    }

    /// Defaults, then the config file, then environment and flags
    pub fn resolve_config(&self) -> Result<ToolConfig> {
        let mut config = ToolConfig::load(self.config.as_deref())
            .context("Failed to load configuration")?;
        self.apply(&mut config);
        Ok(config)
    }
}

/// Rewrite single-dash long flags such as `-s1` to their `--s1` form
///
/// Open-begin segments such as `-00:00:10` get a leading space so clap takes
/// them as values; time parsing trims it again.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    const LONG_SHORTS: [&str; 2] = ["-s1", "-s2"];

    args.into_iter()
        .map(|arg| {
            let flag = arg.split('=').next().unwrap_or_default();
            if LONG_SHORTS.contains(&flag) {
                format!("-{}", arg)
            } else if is_open_begin_segment(&arg) {
                format!(" {}", arg)
            } else {
                arg
            }
        })
        .collect()
}

fn is_open_begin_segment(arg: &str) -> bool {
    arg.strip_prefix('-')
        .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()) && rest.contains(':'))
}

/// Resolve configuration and install logging
pub fn bootstrap(global: &GlobalArgs) -> Result<ToolConfig> {
    let config = global.resolve_config()?;
    init_logging(&config.log_level, config.log_format).context("Failed to set up logging")?;
    Ok(config)
}

/// Map a command outcome to the process exit status, logging failures
pub fn exit_status<T>(result: Result<T>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
