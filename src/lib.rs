//! vidutils
//!
//! Command-line automation over ffmpeg: split a video at timestamps, merge two
//! videos with a crossfade, and edit the volume of one audio channel over time.
//! All media work is delegated to external `ffmpeg`/`ffprobe` processes; this
//! crate computes the boundaries and filter graphs and builds the invocations.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod domain;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{TimeRange, TimeSpec, VideoProfile};
