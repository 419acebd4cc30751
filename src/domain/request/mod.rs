// Engine requests - Typed ffmpeg command lines built from the domain model

use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::errors::DomainError;
use crate::domain::filter_graph::{CrossfadeGraph, FilterGraph, VolumeGraph};
use crate::domain::model::*;
use crate::domain::rules::ChannelSelection;

/// Stream selection for `-map`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSelector {
    /// Every stream of an input
    All { input: usize },
    /// Video streams of an input
    Video { input: usize },
    /// One audio stream of an input
    Audio { input: usize, index: usize },
    /// A labeled filter graph output
    Label(String),
}

impl StreamSelector {
    fn input(&self) -> Option<usize> {
        match self {
            StreamSelector::All { input }
            | StreamSelector::Video { input }
            | StreamSelector::Audio { input, .. } => Some(*input),
            StreamSelector::Label(_) => None,
        }
    }
}

impl fmt::Display for StreamSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamSelector::All { input } => write!(f, "{}", input),
            StreamSelector::Video { input } => write!(f, "{}:v", input),
            StreamSelector::Audio { input, index } => write!(f, "{}:a:{}", input, index),
            StreamSelector::Label(label) => write!(f, "[{}]", label),
        }
    }
}

/// Which streams a codec option applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecTarget {
    All,
    Video,
    Audio,
}

impl CodecTarget {
    fn flag(&self) -> &'static str {
        match self {
            CodecTarget::All => "-c",
            CodecTarget::Video => "-c:v",
            CodecTarget::Audio => "-c:a",
        }
    }
}

/// Codec name that copies streams without re-encoding
pub const STREAM_COPY: &str = "copy";

/// One typed engine argument
#[derive(Debug, Clone, PartialEq)]
pub enum EngineArg {
    /// `-y` when true, `-n` otherwise
    Overwrite(bool),
    /// `-f <format>` for the next input
    InputFormat(String),
    /// `-safe 0` for the next concat input
    UnsafePaths,
    Input(PathBuf),
    /// `-ss`
    Seek(TimeSpec),
    /// `-to`
    Until(TimeSpec),
    Map(StreamSelector),
    Codec(CodecTarget, String),
    FilterComplex(FilterGraph),
    FrameRate(u32),
    /// `-b:v <kbps>k`
    VideoBitrate(u32),
    /// `-ac`
    AudioChannels(u32),
    Output(PathBuf),
}

impl EngineArg {
    fn render(&self) -> Vec<String> {
        match self {
            EngineArg::Overwrite(true) => vec!["-y".to_string()],
            EngineArg::Overwrite(false) => vec!["-n".to_string()],
            EngineArg::InputFormat(format) => vec!["-f".to_string(), format.clone()],
            EngineArg::UnsafePaths => vec!["-safe".to_string(), "0".to_string()],
            EngineArg::Input(path) => vec!["-i".to_string(), path.display().to_string()],
            EngineArg::Seek(t) => vec!["-ss".to_string(), t.format_hms()],
            EngineArg::Until(t) => vec!["-to".to_string(), t.format_hms()],
            EngineArg::Map(selector) => vec!["-map".to_string(), selector.to_string()],
            EngineArg::Codec(target, codec) => vec![target.flag().to_string(), codec.clone()],
            EngineArg::FilterComplex(graph) => {
                vec!["-filter_complex".to_string(), graph.to_string()]
            }
            EngineArg::FrameRate(fps) => vec!["-r".to_string(), fps.to_string()],
            EngineArg::VideoBitrate(kbps) => vec!["-b:v".to_string(), format!("{}k", kbps)],
            EngineArg::AudioChannels(n) => vec!["-ac".to_string(), n.to_string()],
            EngineArg::Output(path) => vec![path.display().to_string()],
        }
    }

    fn is_input_option(&self) -> bool {
        matches!(self, EngineArg::InputFormat(_) | EngineArg::UnsafePaths)
    }
}

/// Audio encoding applied when a graph rewrites audio streams
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioEncoding {
    pub codec: String,
    /// Output channel layout passed as `-ac`; `None` keeps the filter's layout
    pub channels: Option<u32>,
}

/// Ordered, validated argument list for one engine invocation
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRequest {
    purpose: String,
    args: Vec<EngineArg>,
}

impl EngineRequest {
    pub fn new(purpose: impl Into<String>) -> Self {
        Self {
            purpose: purpose.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: EngineArg) -> Self {
        self.args.push(arg);
        self
    }

    pub fn args(&self) -> &[EngineArg] {
        &self.args
    }

    /// Short human description, used in logs
    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn inputs(&self) -> Vec<&Path> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                EngineArg::Input(path) => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    pub fn output(&self) -> Option<&Path> {
        self.args.iter().rev().find_map(|arg| match arg {
            EngineArg::Output(path) => Some(path.as_path()),
            _ => None,
        })
    }

    pub fn filter_graph(&self) -> Option<&FilterGraph> {
        self.args.iter().find_map(|arg| match arg {
            EngineArg::FilterComplex(graph) => Some(graph),
            _ => None,
        })
    }

    pub fn maps(&self) -> Vec<&StreamSelector> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                EngineArg::Map(selector) => Some(selector),
                _ => None,
            })
            .collect()
    }

    /// Check structural invariants before the request reaches a process
    pub fn validate(&self) -> Result<(), DomainError> {
        let invalid = |msg: String| {
            Err(DomainError::InvalidRequest(format!(
                "{}: {}",
                self.purpose, msg
            )))
        };

        let input_count = self.inputs().len();
        if input_count == 0 {
            return invalid("no input".to_string());
        }

        // Arguments reach the engine as text; a lossy path would name another file
        for arg in &self.args {
            if let EngineArg::Input(path) | EngineArg::Output(path) = arg {
                if path.to_str().is_none() {
                    return Err(DomainError::BadArgs(format!(
                        "{}: path is not valid UTF-8: {}",
                        self.purpose,
                        path.display()
                    )));
                }
            }
        }

        match self.args.last() {
            Some(EngineArg::Output(_)) => {}
            _ => return invalid("output must be the last argument".to_string()),
        }
        let outputs = self
            .args
            .iter()
            .filter(|arg| matches!(arg, EngineArg::Output(_)))
            .count();
        if outputs != 1 {
            return invalid(format!("expected exactly one output, found {}", outputs));
        }

        // Input options only make sense when an input follows them
        let mut pending_input_option = false;
        for arg in &self.args {
            if arg.is_input_option() {
                pending_input_option = true;
            } else if matches!(arg, EngineArg::Input(_)) {
                pending_input_option = false;
            } else if pending_input_option {
                return invalid("input option not followed by an input".to_string());
            }
        }
        if pending_input_option {
            return invalid("input option not followed by an input".to_string());
        }

        let graphs = self
            .args
            .iter()
            .filter(|arg| matches!(arg, EngineArg::FilterComplex(_)))
            .count();
        if graphs > 1 {
            return invalid("more than one filter graph".to_string());
        }
        if self.filter_graph().is_some_and(FilterGraph::is_empty) {
            return invalid("empty filter graph".to_string());
        }

        let seek = self.args.iter().find_map(|arg| match arg {
            EngineArg::Seek(t) => Some(*t),
            _ => None,
        });
        let until = self.args.iter().find_map(|arg| match arg {
            EngineArg::Until(t) => Some(*t),
            _ => None,
        });
        if let (Some(seek), Some(until)) = (seek, until) {
            if seek >= until {
                return invalid(format!("seek {} is not before {}", seek, until));
            }
        }

        for selector in self.maps() {
            match selector {
                StreamSelector::Label(label) => {
                    let known = self
                        .filter_graph()
                        .is_some_and(|graph| graph.has_output(label));
                    if !known {
                        return invalid(format!("map references unknown label [{}]", label));
                    }
                }
                other => {
                    if other.input().is_some_and(|i| i >= input_count) {
                        return invalid(format!("map {} references a missing input", other));
                    }
                }
            }
        }

        // Graph outputs nothing else consumes would otherwise be dropped silently
        if let Some(graph) = self.filter_graph() {
            let maps = self.maps();
            for label in graph.unconsumed_outputs() {
                let mapped = maps
                    .iter()
                    .any(|selector| matches!(selector, StreamSelector::Label(l) if l == label));
                if !mapped {
                    return invalid(format!("graph output [{}] is never mapped", label));
                }
            }
        }

        Ok(())
    }

    /// Validate and render to the argument strings passed to the engine
    pub fn to_args(&self) -> Result<Vec<String>, DomainError> {
        self.validate()?;
        Ok(self.args.iter().flat_map(EngineArg::render).collect())
    }

    /// Stream-copy extraction of `range` from `input`
    pub fn extraction(input: &Path, range: &TimeRange, output: &Path, overwrite: bool) -> Self {
        let mut request = Self::new(format!("extract {} from {}", range, input.display()))
            .arg(EngineArg::Overwrite(overwrite))
            .arg(EngineArg::Input(input.to_path_buf()))
            .arg(EngineArg::Map(StreamSelector::All { input: 0 }))
            .arg(EngineArg::Codec(CodecTarget::All, STREAM_COPY.to_string()));
        if let Some(begin) = range.begin() {
            request = request.arg(EngineArg::Seek(begin));
        }
        if let Some(end) = range.end() {
            request = request.arg(EngineArg::Until(end));
        }
        request.arg(EngineArg::Output(output.to_path_buf()))
    }

    /// Crossfade synthesis of two equally long clips
    pub fn crossfade(
        outgoing: &Path,
        incoming: &Path,
        profile: &CrossfadeProfile,
        output: &Path,
    ) -> Self {
        let (graph, maps) = CrossfadeGraph::build(
            profile.resolution,
            profile.fps,
            profile.duration,
            profile.audio_channels,
        );

        let mut request = Self::new("crossfade")
            .arg(EngineArg::Overwrite(true))
            .arg(EngineArg::Input(outgoing.to_path_buf()))
            .arg(EngineArg::Input(incoming.to_path_buf()))
            .arg(EngineArg::FilterComplex(graph));
        for selector in maps {
            request = request.arg(EngineArg::Map(selector));
        }
        request
            .arg(EngineArg::FrameRate(profile.fps))
            .arg(EngineArg::VideoBitrate(profile.bitrate_kbps))
            .arg(EngineArg::Output(output.to_path_buf()))
    }

    /// Stream-copy concatenation of the files listed in `list_file`
    pub fn concat(list_file: &Path, output: &Path, overwrite: bool) -> Self {
        Self::new(format!("concatenate into {}", output.display()))
            .arg(EngineArg::Overwrite(overwrite))
            .arg(EngineArg::InputFormat("concat".to_string()))
            .arg(EngineArg::UnsafePaths)
            .arg(EngineArg::Input(list_file.to_path_buf()))
            .arg(EngineArg::Map(StreamSelector::All { input: 0 }))
            .arg(EngineArg::Codec(CodecTarget::All, STREAM_COPY.to_string()))
            .arg(EngineArg::Output(output.to_path_buf()))
    }

    /// Time-gated volume edit of one channel, video stream-copied
    pub fn volume_edit(
        input: &Path,
        selection: &ChannelSelection,
        edits: &[AudioSegmentEdit],
        merge: bool,
        audio: &AudioEncoding,
        output: &Path,
        overwrite: bool,
    ) -> Self {
        let (graph, maps) = VolumeGraph::build(selection, edits, merge);

        let mut request = Self::new(format!("edit volume of {}", input.display()))
            .arg(EngineArg::Overwrite(overwrite))
            .arg(EngineArg::Input(input.to_path_buf()))
            .arg(EngineArg::FilterComplex(graph));
        for selector in maps {
            request = request.arg(EngineArg::Map(selector));
        }
        request = request
            .arg(EngineArg::Codec(CodecTarget::Video, STREAM_COPY.to_string()))
            .arg(EngineArg::Codec(CodecTarget::Audio, audio.codec.clone()));
        if let Some(channels) = audio.channels {
            request = request.arg(EngineArg::AudioChannels(channels));
        }
        request.arg(EngineArg::Output(output.to_path_buf()))
    }
}

/// Shared parameters of the two merge inputs used by the crossfade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossfadeProfile {
    pub resolution: Resolution,
    pub fps: u32,
    /// Greater of the two inputs' bitrates
    pub bitrate_kbps: u32,
    pub audio_channels: usize,
    pub duration: TimeSpec,
}

impl CrossfadeProfile {
    /// Combine two compatible profiles
    pub fn from_inputs(first: &VideoProfile, second: &VideoProfile, duration: TimeSpec) -> Self {
        Self {
            resolution: first.resolution,
            fps: first.fps,
            bitrate_kbps: first.bitrate_kbps.max(second.bitrate_kbps),
            audio_channels: first.audio_channels,
            duration,
        }
    }
}

/// Render a concat demuxer list for `files`
pub fn concat_list(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|path| {
            let escaped = path.display().to_string().replace('\'', r"'\''");
            format!("file '{}'\n", escaped)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn secs(s: u64) -> TimeSpec {
        TimeSpec::from_secs(s)
    }

    #[test]
    fn test_extraction_with_both_bounds() {
        let range = TimeRange::between(secs(30), secs(90)).unwrap();
        let request = EngineRequest::extraction(
            Path::new("in.mp4"),
            &range,
            Path::new("in.mp4_part2.mp4"),
            false,
        );

        assert_eq!(
            request.to_args().unwrap(),
            vec![
                "-n", "-i", "in.mp4", "-map", "0", "-c", "copy", "-ss", "00:00:30.00", "-to",
                "00:01:30.00", "in.mp4_part2.mp4"
            ]
        );
    }

    #[test]
    fn test_extraction_open_range_omits_bounds() {
        let request = EngineRequest::extraction(
            Path::new("in.mp4"),
            &TimeRange::starting_at(secs(90)),
            Path::new("out.mp4"),
            true,
        );
        let args = request.to_args().unwrap();

        assert!(args.contains(&"-ss".to_string()));
        assert!(!args.contains(&"-to".to_string()));
        assert_eq!(args[0], "-y");
    }

    #[test]
    fn test_concat_request() {
        let request = EngineRequest::concat(Path::new("list.txt"), Path::new("out.mp4"), true);
        assert_eq!(
            request.to_args().unwrap(),
            vec![
                "-y", "-f", "concat", "-safe", "0", "-i", "list.txt", "-map", "0", "-c", "copy",
                "out.mp4"
            ]
        );
    }

    #[test]
    fn test_crossfade_request_maps_every_channel() {
        let profile = CrossfadeProfile {
            resolution: Resolution::new(1920, 1080).unwrap(),
            fps: 30,
            bitrate_kbps: 6000,
            audio_channels: 2,
            duration: secs(5),
        };
        let request = EngineRequest::crossfade(
            Path::new("a-crossf.mp4"),
            Path::new("b-crossf.mp4"),
            &profile,
            Path::new("final.mp4"),
        );
        let args = request.to_args().unwrap();

        let maps: Vec<String> = request.maps().iter().map(ToString::to_string).collect();
        assert_eq!(maps, vec!["[fv]", "[fa0]", "[fa1]"]);
        assert!(args.windows(2).any(|w| w[0] == "-b:v" && w[1] == "6000k"));
        assert!(args.windows(2).any(|w| w[0] == "-r" && w[1] == "30"));
        assert_eq!(request.inputs().len(), 2);
    }

    #[test]
    fn test_volume_request_copies_video_and_encodes_audio() {
        let selection = ChannelSelection::new(2, 1, BTreeSet::new()).unwrap();
        let edits = vec![AudioSegmentEdit::new(
            TimeRange::between(secs(5), secs(10)).unwrap(),
            VolumeLevel::parse("2").unwrap(),
        )];
        let audio = AudioEncoding {
            codec: "aac".to_string(),
            channels: Some(2),
        };
        let request = EngineRequest::volume_edit(
            Path::new("in.mp4"),
            &selection,
            &edits,
            false,
            &audio,
            Path::new("out.mp4"),
            false,
        );

        assert_eq!(
            request.to_args().unwrap(),
            vec![
                "-n",
                "-i",
                "in.mp4",
                "-filter_complex",
                "[0:a:0]volume=enable='between(t,5,10)':volume=2[aedit]",
                "-map",
                "0:v",
                "-map",
                "[aedit]",
                "-map",
                "0:a:1",
                "-c:v",
                "copy",
                "-c:a",
                "aac",
                "-ac",
                "2",
                "out.mp4"
            ]
        );
    }

    #[test]
    fn test_validate_rejects_unknown_label() {
        let request = EngineRequest::new("broken")
            .arg(EngineArg::Input(PathBuf::from("in.mp4")))
            .arg(EngineArg::Map(StreamSelector::Label("nowhere".to_string())))
            .arg(EngineArg::Output(PathBuf::from("out.mp4")));

        assert!(matches!(
            request.to_args(),
            Err(DomainError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unmapped_graph_output() {
        let selection = ChannelSelection::new(2, 1, BTreeSet::new()).unwrap();
        let edits = vec![AudioSegmentEdit::new(
            TimeRange::starting_at(secs(5)),
            VolumeLevel::parse("0").unwrap(),
        )];
        let (graph, _) = VolumeGraph::build(&selection, &edits, false);
        let request = EngineRequest::new("unmapped")
            .arg(EngineArg::Input(PathBuf::from("in.mp4")))
            .arg(EngineArg::FilterComplex(graph))
            .arg(EngineArg::Map(StreamSelector::Video { input: 0 }))
            .arg(EngineArg::Output(PathBuf::from("out.mp4")));

        match request.validate() {
            Err(DomainError::InvalidRequest(msg)) => assert!(msg.contains("[aedit]")),
            other => panic!("expected invalid request, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_empty_graph() {
        let request = EngineRequest::new("empty graph")
            .arg(EngineArg::Input(PathBuf::from("in.mp4")))
            .arg(EngineArg::FilterComplex(FilterGraph::new()))
            .arg(EngineArg::Output(PathBuf::from("out.mp4")));
        assert!(matches!(
            request.validate(),
            Err(DomainError::InvalidRequest(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_rejects_non_utf8_paths() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let odd = PathBuf::from(OsStr::from_bytes(b"clip\xff.mp4"));
        let request = EngineRequest::extraction(
            &odd,
            &TimeRange::starting_at(secs(5)),
            Path::new("out.mp4"),
            true,
        );
        assert!(matches!(request.to_args(), Err(DomainError::BadArgs(_))));

        let request = EngineRequest::extraction(
            Path::new("in.mp4"),
            &TimeRange::starting_at(secs(5)),
            &odd,
            true,
        );
        assert!(matches!(request.validate(), Err(DomainError::BadArgs(_))));
    }

    #[test]
    fn test_validate_rejects_missing_input_and_output() {
        let no_input = EngineRequest::new("no input").arg(EngineArg::Output(PathBuf::from("o.mp4")));
        assert!(no_input.validate().is_err());

        let no_output = EngineRequest::new("no output").arg(EngineArg::Input(PathBuf::from("i.mp4")));
        assert!(no_output.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_dangling_input_option() {
        let request = EngineRequest::new("dangling")
            .arg(EngineArg::Input(PathBuf::from("in.mp4")))
            .arg(EngineArg::InputFormat("concat".to_string()))
            .arg(EngineArg::Output(PathBuf::from("out.mp4")));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_map_to_missing_input() {
        let request = EngineRequest::new("two maps")
            .arg(EngineArg::Input(PathBuf::from("in.mp4")))
            .arg(EngineArg::Map(StreamSelector::Audio { input: 1, index: 0 }))
            .arg(EngineArg::Output(PathBuf::from("out.mp4")));
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let files = vec![
            PathBuf::from("/tmp/a-main-x.mp4"),
            PathBuf::from("/tmp/it's.mp4"),
        ];
        assert_eq!(
            concat_list(&files),
            "file '/tmp/a-main-x.mp4'\nfile '/tmp/it'\\''s.mp4'\n"
        );
    }
}
