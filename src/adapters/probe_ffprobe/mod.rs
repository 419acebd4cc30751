//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe <file>` and reads the stream summary it prints on stderr.

use std::collections::BTreeSet;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Compiled patterns for the ffprobe stream summary
pub struct ProbeOutputParser {
    duration: Regex,
    video: Regex,
    audio: Regex,
}

impl ProbeOutputParser {
    pub fn new() -> Result<Self, DomainError> {
        let compile = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| DomainError::BadArgs(format!("Invalid probe pattern: {}", e)))
        };

        Ok(Self {
            duration: compile(r"Duration: *([^,]+),")?,
            video: compile(
                r"Stream #0:\d+\S*: Video: .*?, (\d+)x(\d+)(?: \[[^\]]*\])?, (\d+) kb/s, (?:.*, )?(\d+(?:\.\d+)?) fps",
            )?,
            audio: compile(r"Stream #0:(\d+)\S*: Audio:")?,
        })
    }

    /// Build a profile from ffprobe's diagnostic text
    pub fn parse(&self, path: &Path, text: &str) -> Result<VideoProfile, DomainError> {
        let fail = |message: String| DomainError::ProbeFail {
            path: path.display().to_string(),
            message,
        };

        let raw_duration = self
            .duration
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim())
            .ok_or_else(|| fail("can't find video duration".to_string()))?;
        let duration = TimeSpec::parse(raw_duration)
            .map_err(|e| fail(format!("unreadable duration '{}': {}", raw_duration, e)))?;

        let video = text
            .lines()
            .find_map(|line| self.video.captures(line))
            .ok_or_else(|| fail("can't find video resolution, bitrate and fps".to_string()))?;

        let number = |index: usize, field: &str| -> Result<u32, DomainError> {
            video
                .get(index)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .ok_or_else(|| fail(format!("unreadable video {}", field)))
        };
        let width = number(1, "width")?;
        let height = number(2, "height")?;
        let bitrate = number(3, "bitrate")?;
        let fps = video
            .get(4)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .ok_or_else(|| fail("unreadable video fps".to_string()))?;

        let resolution = Resolution::new(width, height).map_err(|e| fail(e.to_string()))?;

        let audio_streams: BTreeSet<&str> = text
            .lines()
            .filter_map(|line| self.audio.captures(line))
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();

        VideoProfile::new(
            path,
            duration,
            resolution,
            round_bitrate(bitrate),
            fps.round() as u32,
            audio_streams.len(),
        )
        .map_err(|e| fail(e.to_string()))
    }
}

/// Round kb/s to the nearest hundred, halves up
pub fn round_bitrate(kbps: u32) -> u32 {
    kbps.saturating_add(50) / 100 * 100
}

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    program: String,
    parser: ProbeOutputParser,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter running `program`
    pub fn new(program: impl Into<String>) -> Result<Self, DomainError> {
        Ok(Self {
            program: program.into(),
            parser: ProbeOutputParser::new()?,
        })
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe(&self, path: &Path) -> Result<VideoProfile, DomainError> {
        info!("Checking video file {}", path.display());

        let output = Command::new(&self.program)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DomainError::EngineFail {
                program: self.program.clone(),
                status: format!("could not be started: {}", e),
            })?;

        let text = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            debug!("{} output:\n{}", self.program, text);
            return Err(DomainError::EngineFail {
                program: self.program.clone(),
                status: output.status.to_string(),
            });
        }

        let profile = self.parser.parse(path, &text)?;
        info!(
            "Video details: length {}, resolution {}, bitrate {} kb/s, fps {}, audio channels {}",
            profile.duration,
            profile.resolution,
            profile.bitrate_kbps,
            profile.fps,
            profile.audio_channels
        );
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'clip.mp4':
  Metadata:
    major_brand     : isom
  Duration: 00:01:00.02, start: 0.000000, bitrate: 4321 kb/s
  Stream #0:0[0x1](und): Video: h264 (High) (avc1 / 0x31637661), yuv420p(progressive), 1920x1080 [SAR 1:1 DAR 16:9], 4150 kb/s, 29.97 fps, 29.97 tbr, 30k tbn (default)
  Stream #0:1[0x2](eng): Audio: aac (LC) (mp4a / 0x6134706D), 48000 Hz, stereo, fltp, 128 kb/s (default)
  Stream #0:2[0x3](spa): Audio: aac (LC) (mp4a / 0x6134706D), 48000 Hz, stereo, fltp, 128 kb/s
";

    #[test]
    fn test_parse_full_summary() {
        let parser = ProbeOutputParser::new().unwrap();
        let profile = parser.parse(Path::new("clip.mp4"), SAMPLE).unwrap();

        assert_eq!(profile.duration, TimeSpec::from_millis(60_020));
        assert_eq!(profile.resolution, Resolution::new(1920, 1080).unwrap());
        assert_eq!(profile.bitrate_kbps, 4200);
        assert_eq!(profile.fps, 30);
        assert_eq!(profile.audio_channels, 2);
    }

    #[test]
    fn test_audio_channels_count_distinct_streams() {
        // Subtitle between the audio streams; the highest audio index would say 4
        let text = SAMPLE.replace(
            "  Stream #0:2[0x3](spa): Audio:",
            "  Stream #0:2[0x3](eng): Subtitle: mov_text (tx3g / 0x67337874), 0 kb/s\n  Stream #0:3[0x4](spa): Audio:",
        );
        let profile = ProbeOutputParser::new()
            .unwrap()
            .parse(Path::new("clip.mp4"), &text)
            .unwrap();

        assert_eq!(profile.audio_channels, 2);
    }

    #[test]
    fn test_parse_older_stream_format() {
        let text = "  Duration: 00:00:10.00, start: 0.000000, bitrate: 900 kb/s\n    Stream #0:0(und): Video: h264 (avc1 / 0x31637661), yuv420p, 640x480, 849 kb/s, 25 fps, 25 tbr\n";
        let profile = ProbeOutputParser::new()
            .unwrap()
            .parse(Path::new("old.mp4"), text)
            .unwrap();

        assert_eq!(profile.resolution.to_string(), "640x480");
        assert_eq!(profile.bitrate_kbps, 800);
        assert_eq!(profile.fps, 25);
        assert!(!profile.has_audio());
    }

    #[test]
    fn test_parse_missing_duration() {
        let parser = ProbeOutputParser::new().unwrap();
        let text = SAMPLE.replace("Duration: 00:01:00.02", "Duration: N/A");
        assert!(matches!(
            parser.parse(Path::new("clip.mp4"), &text),
            Err(DomainError::ProbeFail { .. })
        ));

        let text = SAMPLE.replace("  Duration: 00:01:00.02, start: 0.000000, bitrate: 4321 kb/s\n", "");
        assert!(parser.parse(Path::new("clip.mp4"), &text).is_err());
    }

    #[test]
    fn test_parse_missing_video_bitrate() {
        let parser = ProbeOutputParser::new().unwrap();
        let text = SAMPLE.replace(", 4150 kb/s", "");
        match parser.parse(Path::new("clip.mp4"), &text) {
            Err(DomainError::ProbeFail { path, .. }) => assert_eq!(path, "clip.mp4"),
            other => panic!("expected probe failure, got {:?}", other),
        }
    }

    #[test]
    fn test_round_bitrate() {
        assert_eq!(round_bitrate(4150), 4200);
        assert_eq!(round_bitrate(4149), 4100);
        assert_eq!(round_bitrate(4000), 4000);
        assert_eq!(round_bitrate(49), 0);
    }
}
