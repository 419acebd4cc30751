// Adapters - External system implementations

pub mod dry_run;
pub mod exec_ffmpeg;
pub mod fs_local;
pub mod probe_ffprobe;
pub mod tracing_log;

// Re-export adapters
pub use dry_run::DryRunAdapter;
pub use exec_ffmpeg::FFmpegAdapter;
pub use fs_local::FsLocalAdapter;
pub use probe_ffprobe::FFprobeAdapter;
pub use tracing_log::TracingLogAdapter;
