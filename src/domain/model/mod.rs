// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::domain::errors::DomainError;

/// Elapsed time with millisecond precision
///
/// Stored as whole milliseconds so that boundary arithmetic is exact. Values are
/// never negative; subtraction that would underflow yields `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSpec {
    millis: u64,
}

/// Largest number of hours accepted when parsing
pub const MAX_HOURS: u64 = 999_999;

impl TimeSpec {
    pub const ZERO: TimeSpec = TimeSpec { millis: 0 };

    /// Create a new TimeSpec from milliseconds
    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    /// Create a new TimeSpec from whole seconds
    pub const fn from_secs(seconds: u64) -> Self {
        Self {
            millis: seconds * 1000,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.millis == 0
    }

    pub fn checked_add(self, other: TimeSpec) -> Option<TimeSpec> {
        self.millis.checked_add(other.millis).map(Self::from_millis)
    }

    pub fn checked_sub(self, other: TimeSpec) -> Option<TimeSpec> {
        self.millis.checked_sub(other.millis).map(Self::from_millis)
    }

    /// Parse a `HH:MM:SS[.fraction]` time string
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();
        let parts: Vec<&str> = trimmed.split(':').collect();
        if parts.len() != 3 {
            return Err(DomainError::format(
                time_str,
                format!("expected 3 ':'-separated fields, found {}", parts.len()),
            ));
        }

        let hours = parse_whole(parts[0])
            .ok_or_else(|| DomainError::format(time_str, "invalid hours"))?;
        let minutes = parse_whole(parts[1])
            .ok_or_else(|| DomainError::format(time_str, "invalid minutes"))?;
        let seconds_millis = parse_seconds_millis(parts[2])
            .ok_or_else(|| DomainError::format(time_str, "invalid seconds"))?;

        if hours > MAX_HOURS {
            return Err(DomainError::format(
                time_str,
                format!("hours must be at most {}", MAX_HOURS),
            ));
        }
        if minutes >= 60 {
            return Err(DomainError::format(time_str, "minutes must be less than 60"));
        }
        if seconds_millis >= 60_000 {
            return Err(DomainError::format(time_str, "seconds must be less than 60"));
        }

        Ok(Self {
            millis: hours * 3_600_000 + minutes * 60_000 + seconds_millis,
        })
    }

    /// Format as HH:MM:SS.ss, the timestamp syntax ffmpeg expects
    pub fn format_hms(&self) -> String {
        let centis = self.millis / 10 + u64::from(self.millis % 10 >= 5);
        let hours = centis / 360_000;
        let minutes = (centis / 6_000) % 60;
        let seconds = centis % 6_000;

        format!(
            "{:02}:{:02}:{:02}.{:02}",
            hours,
            minutes,
            seconds / 100,
            seconds % 100
        )
    }

    /// Plain seconds for filter expressions: `5`, `90.5`, `0.125`
    pub fn seconds_expr(&self) -> String {
        let whole = self.millis / 1000;
        let fraction = self.millis % 1000;
        if fraction == 0 {
            whole.to_string()
        } else {
            format!("{}.{:03}", whole, fraction)
                .trim_end_matches('0')
                .to_string()
        }
    }
}

fn parse_whole(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

fn parse_seconds_millis(field: &str) -> Option<u64> {
    let (whole, fraction) = match field.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (field, ""),
    };
    if field.ends_with('.') || (!fraction.is_empty() && !fraction.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    let whole = parse_whole(whole)?;

    // Round the fraction to milliseconds
    let mut digits = fraction.bytes().map(|b| u64::from(b - b'0'));
    let mut millis = 0;
    for _ in 0..3 {
        millis = millis * 10 + digits.next().unwrap_or(0);
    }
    if digits.next().is_some_and(|d| d >= 5) {
        millis += 1;
    }

    whole.checked_mul(1000)?.checked_add(millis)
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

impl FromStr for TimeSpec {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for TimeSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        TimeSpec::parse(&text).map_err(serde::de::Error::custom)
    }
}

/// Span of a media file; an absent bound means start or end of file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    begin: Option<TimeSpec>,
    end: Option<TimeSpec>,
}

impl TimeRange {
    /// Create a new range, rejecting empty or reversed spans
    pub fn new(begin: Option<TimeSpec>, end: Option<TimeSpec>) -> Result<Self, DomainError> {
        match (begin, end) {
            (Some(b), Some(e)) if b >= e => Err(DomainError::InvalidTimeRange(format!(
                "start ({}) must be before end ({})",
                b, e
            ))),
            (None, Some(e)) if e.is_zero() => Err(DomainError::InvalidTimeRange(
                "range ending at 00:00:00.00 is empty".to_string(),
            )),
            _ => Ok(Self { begin, end }),
        }
    }

    /// The whole file
    pub fn full() -> Self {
        Self::default()
    }

    pub fn between(begin: TimeSpec, end: TimeSpec) -> Result<Self, DomainError> {
        Self::new(Some(begin), Some(end))
    }

    pub fn starting_at(begin: TimeSpec) -> Self {
        Self {
            begin: Some(begin),
            end: None,
        }
    }

    pub fn until(end: TimeSpec) -> Result<Self, DomainError> {
        Self::new(None, Some(end))
    }

    pub fn begin(&self) -> Option<TimeSpec> {
        self.begin
    }

    pub fn end(&self) -> Option<TimeSpec> {
        self.end
    }

    /// Begin with the implicit start of file made explicit
    pub fn begin_or_zero(&self) -> TimeSpec {
        self.begin.unwrap_or(TimeSpec::ZERO)
    }

    /// Length of the range when both bounds are known
    pub fn duration(&self) -> Option<TimeSpec> {
        self.end?.checked_sub(self.begin_or_zero())
    }

    /// Whether `t` lies inside the range, bounds included
    pub fn contains(&self, t: TimeSpec) -> bool {
        self.begin.map_or(true, |b| t >= b) && self.end.map_or(true, |e| t <= e)
    }

    /// Parse a `<start>-<stop>` segment; either side may be left empty
    pub fn parse_segment(text: &str) -> Result<Self, DomainError> {
        let (start, stop) = text.trim().split_once('-').ok_or_else(|| {
            DomainError::format(text, "segment must be <start>-<stop>")
        })?;
        if start.is_empty() && stop.is_empty() {
            return Err(DomainError::format(text, "segment needs a start or a stop"));
        }

        let begin = (!start.is_empty()).then(|| TimeSpec::parse(start)).transpose()?;
        let end = (!stop.is_empty()).then(|| TimeSpec::parse(stop)).transpose()?;
        Self::new(begin, end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.begin {
            Some(b) => write!(f, "[{}, ", b)?,
            None => write!(f, "[start, ")?,
        }
        match self.end {
            Some(e) => write!(f, "{}]", e),
            None => write!(f, "end]"),
        }
    }
}

/// Video frame size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Result<Self, DomainError> {
        if width == 0 || height == 0 {
            return Err(DomainError::BadArgs(
                "Video dimensions cannot be zero".to_string(),
            ));
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Technical metadata of one probed file
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProfile {
    pub path: PathBuf,
    pub duration: TimeSpec,
    pub resolution: Resolution,
    /// Video bitrate in kb/s, rounded to the nearest hundred
    pub bitrate_kbps: u32,
    pub fps: u32,
    /// Number of audio streams; 0 means no audio
    pub audio_channels: usize,
}

impl VideoProfile {
    /// Create new video profile with validation
    pub fn new(
        path: impl Into<PathBuf>,
        duration: TimeSpec,
        resolution: Resolution,
        bitrate_kbps: u32,
        fps: u32,
        audio_channels: usize,
    ) -> Result<Self, DomainError> {
        if fps == 0 {
            return Err(DomainError::BadArgs("Frame rate must be positive".to_string()));
        }

        Ok(Self {
            path: path.into(),
            duration,
            resolution,
            bitrate_kbps,
            fps,
            audio_channels,
        })
    }

    pub fn has_audio(&self) -> bool {
        self.audio_channels > 0
    }

    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

/// Crossfade parameters for a two-file merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossfadeSpec {
    pub duration: TimeSpec,
    /// Where the crossfade starts in the first file
    pub first_anchor: Option<TimeSpec>,
    /// Where the crossfade starts in the second file
    pub second_anchor: Option<TimeSpec>,
}

impl CrossfadeSpec {
    pub fn new(
        duration: TimeSpec,
        first_anchor: Option<TimeSpec>,
        second_anchor: Option<TimeSpec>,
    ) -> Result<Self, DomainError> {
        if duration.is_zero() {
            return Err(DomainError::BadArgs(
                "Crossfade duration must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            duration,
            first_anchor,
            second_anchor,
        })
    }
}

/// The kept portion and the crossfade portion of one merge input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossfadeBoundaries {
    pub main: TimeRange,
    pub crossfade: TimeRange,
}

/// Volume setting accepted by the engine's volume filter
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeLevel {
    /// Linear multiplier, e.g. `2` or `0.5`
    Multiplier(f64),
    /// Gain in decibels, e.g. `-6dB`
    Decibels(f64),
}

impl VolumeLevel {
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let trimmed = text.trim();
        let invalid = || DomainError::BadArgs(format!("Invalid volume level: '{}'", text));

        if let Some(number) = trimmed
            .strip_suffix("dB")
            .or_else(|| trimmed.strip_suffix("db"))
        {
            let db: f64 = number.trim().parse().map_err(|_| invalid())?;
            if !db.is_finite() {
                return Err(invalid());
            }
            return Ok(VolumeLevel::Decibels(db));
        }

        let multiplier: f64 = trimmed.parse().map_err(|_| invalid())?;
        if !multiplier.is_finite() || multiplier < 0.0 {
            return Err(invalid());
        }
        Ok(VolumeLevel::Multiplier(multiplier))
    }

    /// Linear gain this level applies
    pub fn multiplier(&self) -> f64 {
        match self {
            VolumeLevel::Multiplier(m) => *m,
            VolumeLevel::Decibels(db) => 10f64.powf(db / 20.0),
        }
    }
}

impl fmt::Display for VolumeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeLevel::Multiplier(m) => write!(f, "{}", m),
            VolumeLevel::Decibels(db) => write!(f, "{}dB", db),
        }
    }
}

impl FromStr for VolumeLevel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One time-gated volume change on the target channel
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegmentEdit {
    pub range: TimeRange,
    pub level: VolumeLevel,
}

impl AudioSegmentEdit {
    pub fn new(range: TimeRange, level: VolumeLevel) -> Self {
        Self { range, level }
    }

    /// Gain applied at time `t`: the level inside the range, unity outside
    pub fn gain_at(&self, t: TimeSpec) -> f64 {
        if self.range.contains(t) {
            self.level.multiplier()
        } else {
            1.0
        }
    }
}
