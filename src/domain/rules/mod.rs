// Domain rules - Boundary arithmetic and input validation

use std::collections::BTreeSet;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Business rules for splitting a file at timestamps
pub struct SegmentPlanner;

impl SegmentPlanner {
    /// Turn N split points into N+1 consecutive ranges
    ///
    /// The first range starts at `start` (or the start of file) and the last one
    /// ends at `end` (or the end of file). Split points must be strictly
    /// increasing and lie inside the optional trim.
    pub fn split_ranges(
        boundaries: &[TimeSpec],
        start: Option<TimeSpec>,
        end: Option<TimeSpec>,
    ) -> Result<Vec<TimeRange>, DomainError> {
        if boundaries.is_empty() {
            return Err(DomainError::BadArgs(
                "At least one split time is required".to_string(),
            ));
        }

        for pair in boundaries.windows(2) {
            if pair[0] >= pair[1] {
                return Err(DomainError::InvalidTimeRange(format!(
                    "split times must be strictly increasing ({} is not before {})",
                    pair[0], pair[1]
                )));
            }
        }

        let mut ranges = Vec::with_capacity(boundaries.len() + 1);
        let mut begin = start;
        for &boundary in boundaries {
            ranges.push(TimeRange::new(begin, Some(boundary))?);
            begin = Some(boundary);
        }
        ranges.push(TimeRange::new(begin, end)?);

        Ok(ranges)
    }
}

/// Business rules for crossfade boundary derivation
pub struct CrossfadePlanner;

impl CrossfadePlanner {
    /// Split one input into its kept portion and its crossfade portion
    ///
    /// With `anchored_at_end` the crossfade closes the file: the kept portion
    /// precedes it and anything after it is dropped. Otherwise the crossfade
    /// opens the file and the kept portion follows it. Without an anchor the
    /// crossfade sits flush against the end (or start) of the file.
    pub fn derive_boundaries(
        duration: TimeSpec,
        crossfade: TimeSpec,
        anchor: Option<TimeSpec>,
        anchored_at_end: bool,
    ) -> Result<CrossfadeBoundaries, DomainError> {
        if crossfade.is_zero() {
            return Err(DomainError::BadArgs(
                "Crossfade duration must be greater than zero".to_string(),
            ));
        }
        if crossfade >= duration {
            return Err(DomainError::InvalidTimeRange(format!(
                "crossfade duration ({}) must be shorter than the video ({})",
                crossfade, duration
            )));
        }

        match anchor {
            Some(anchor) => {
                let fade_end = anchor.checked_add(crossfade).ok_or_else(|| {
                    DomainError::InvalidTimeRange("crossfade end overflows".to_string())
                })?;
                if fade_end > duration {
                    return Err(DomainError::InvalidTimeRange(format!(
                        "crossfade starting at {} runs past the end of the video ({})",
                        anchor, duration
                    )));
                }
                // An opening crossfade must leave something to keep after it
                if !anchored_at_end && fade_end == duration {
                    return Err(DomainError::InvalidTimeRange(format!(
                        "crossfade starting at {} leaves nothing of the video ({}) after it",
                        anchor, duration
                    )));
                }

                let crossfade_range = TimeRange::new(Some(anchor), Some(fade_end))?;
                let main = if anchored_at_end {
                    TimeRange::until(anchor)?
                } else {
                    TimeRange::starting_at(fade_end)
                };
                Ok(CrossfadeBoundaries {
                    main,
                    crossfade: crossfade_range,
                })
            }
            None if anchored_at_end => {
                // crossfade < duration, checked above
                let fade_start = duration.checked_sub(crossfade).unwrap_or_default();
                Ok(CrossfadeBoundaries {
                    main: TimeRange::until(fade_start)?,
                    crossfade: TimeRange::starting_at(fade_start),
                })
            }
            None => Ok(CrossfadeBoundaries {
                main: TimeRange::starting_at(crossfade),
                crossfade: TimeRange::until(crossfade)?,
            }),
        }
    }

    /// Boundaries for both inputs of a merge
    pub fn plan(
        first: &VideoProfile,
        second: &VideoProfile,
        spec: &CrossfadeSpec,
    ) -> Result<(CrossfadeBoundaries, CrossfadeBoundaries), DomainError> {
        let outgoing =
            Self::derive_boundaries(first.duration, spec.duration, spec.first_anchor, true)?;
        let incoming =
            Self::derive_boundaries(second.duration, spec.duration, spec.second_anchor, false)?;
        Ok((outgoing, incoming))
    }
}

/// Business rules for comparing merge inputs
pub struct ProfileMatcher;

impl ProfileMatcher {
    /// Resolution, fps and audio channel count must agree
    pub fn ensure_compatible(first: &VideoProfile, second: &VideoProfile) -> Result<(), DomainError> {
        let mismatch = |field: &str, a: String, b: String| DomainError::ProfileMismatch {
            field: field.to_string(),
            first_path: first.display_path(),
            first: a,
            second_path: second.display_path(),
            second: b,
        };

        if first.resolution != second.resolution {
            return Err(mismatch(
                "resolution",
                first.resolution.to_string(),
                second.resolution.to_string(),
            ));
        }
        if first.fps != second.fps {
            return Err(mismatch("fps", first.fps.to_string(), second.fps.to_string()));
        }
        if first.audio_channels != second.audio_channels {
            return Err(mismatch(
                "number of audio channels",
                first.audio_channels.to_string(),
                second.audio_channels.to_string(),
            ));
        }
        Ok(())
    }
}

/// Validated target/excluded channel choice, 1-based at the boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSelection {
    channel_count: usize,
    target: usize,
    excluded: BTreeSet<usize>,
}

impl ChannelSelection {
    pub fn new(
        channel_count: usize,
        target: usize,
        excluded: BTreeSet<usize>,
    ) -> Result<Self, DomainError> {
        if target < 1 || target > channel_count {
            return Err(DomainError::InvalidChannel {
                channel: target,
                reason: format!("target must be between 1 and {}", channel_count),
            });
        }
        for &channel in &excluded {
            if channel < 1 || channel > channel_count {
                return Err(DomainError::InvalidChannel {
                    channel,
                    reason: format!("excluded channel must be between 1 and {}", channel_count),
                });
            }
            if channel == target {
                return Err(DomainError::InvalidChannel {
                    channel,
                    reason: "cannot exclude the target channel".to_string(),
                });
            }
        }

        Ok(Self {
            channel_count,
            target,
            excluded,
        })
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// Zero-based stream index of the target channel
    pub fn target_index(&self) -> usize {
        self.target - 1
    }

    /// Zero-based indices merged alongside the edited target, ascending
    pub fn merge_sources(&self) -> Vec<usize> {
        (1..=self.channel_count)
            .filter(|n| *n != self.target && !self.excluded.contains(n))
            .map(|n| n - 1)
            .collect()
    }
}

/// Business rules for pairing segments with volume levels
pub struct VolumePlanner;

impl VolumePlanner {
    /// A single level applies to every segment; otherwise counts must match
    pub fn pair_levels(
        segments: Vec<TimeRange>,
        levels: Vec<VolumeLevel>,
    ) -> Result<Vec<AudioSegmentEdit>, DomainError> {
        if segments.is_empty() {
            return Err(DomainError::BadArgs(
                "At least one audio segment is required".to_string(),
            ));
        }

        match levels.len() {
            1 => {
                let level = &levels[0];
                Ok(segments
                    .into_iter()
                    .map(|range| AudioSegmentEdit::new(range, level.clone()))
                    .collect())
            }
            n if n == segments.len() => Ok(segments
                .into_iter()
                .zip(levels)
                .map(|(range, level)| AudioSegmentEdit::new(range, level))
                .collect()),
            n => Err(DomainError::BadArgs(format!(
                "Number of volume values ({}) must match number of audio segments ({})",
                n,
                segments.len()
            ))),
        }
    }
}
