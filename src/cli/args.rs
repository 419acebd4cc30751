//! Command-line argument definitions

use std::path::PathBuf;

use clap::Parser;

use crate::cli::GlobalArgs;
use crate::domain::model::{TimeRange, TimeSpec, VolumeLevel};

const MAX_JOBS: usize = 256;
const MAX_CHANNELS: usize = 64;

fn parse_jobs(s: &str) -> Result<usize, String> {
    clap_num::number_range(s, 0, MAX_JOBS)
}

fn parse_channel(s: &str) -> Result<usize, String> {
    clap_num::number_range(s, 1, MAX_CHANNELS)
}

/// Merge two video files with a video and audio crossfade between them
#[derive(Parser, Debug)]
#[command(name = "vid-merge", version)]
pub struct MergeArgs {
    /// First video; its end fades out
    #[arg(value_name = "FIRST")]
    pub first: PathBuf,

    /// Second video; its start fades in
    #[arg(value_name = "SECOND")]
    pub second: PathBuf,

    /// Output file [default: out.mp4]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Start of the crossfade in the first video [default: duration before its end]
    #[arg(long = "s1", value_name = "TIME")]
    pub first_start: Option<TimeSpec>,

    /// Start of the crossfade in the second video [default: its start]
    #[arg(long = "s2", value_name = "TIME")]
    pub second_start: Option<TimeSpec>,

    /// Crossfade duration as HH:MM:SS[.ss] [default: 00:00:05]
    #[arg(short, long, value_name = "TIME")]
    pub duration: Option<TimeSpec>,

    /// Keep intermediate files
    #[arg(short, long)]
    pub keep: bool,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Split a video file into multiple files at the given times
#[derive(Parser, Debug)]
#[command(name = "vid-split", version)]
pub struct SplitArgs {
    /// Video file to split
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Times at which to split, strictly increasing
    #[arg(value_name = "TIME", required = true, num_args = 1..)]
    pub times: Vec<TimeSpec>,

    /// Output filename prefix [default: input file name + "_part"]
    #[arg(short, long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Trim video before the given time
    #[arg(short, long, value_name = "TIME")]
    pub start: Option<TimeSpec>,

    /// Trim video after the given time
    #[arg(short, long, value_name = "TIME")]
    pub end: Option<TimeSpec>,

    /// Parallel extractions, 0 for one per CPU [default: 1]
    #[arg(short, long, value_name = "N", value_parser = parse_jobs)]
    pub jobs: Option<usize>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Change the volume of one audio channel over time segments
#[derive(Parser, Debug)]
#[command(name = "vid-volume", version)]
pub struct VolumeArgs {
    /// Video file to edit
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Segments as START-STOP; either side may be left empty
    #[arg(
        value_name = "START-STOP",
        required = true,
        num_args = 1..,
        value_parser = TimeRange::parse_segment
    )]
    pub segments: Vec<TimeRange>,

    /// Output file [default: out.mp4]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Merge the edited channel with the other audio channels
    #[arg(short, long)]
    pub merge: bool,

    /// Audio channel to edit, starting at 1
    #[arg(short, long, value_name = "N", default_value_t = 1, value_parser = parse_channel)]
    pub channel: usize,

    /// Channels to leave out of the merge, comma separated
    #[arg(short = 'x', long, value_name = "N,N", value_delimiter = ',', value_parser = parse_channel)]
    pub exclude: Vec<usize>,

    /// Volume per segment, or one for all (multiplier or dB, e.g. 0.5 or -6dB) [default: 0]
    #[arg(short, long, value_name = "L,L", value_delimiter = ',', allow_hyphen_values = true)]
    pub volume: Vec<VolumeLevel>,

    #[command(flatten)]
    pub global: GlobalArgs,
}
