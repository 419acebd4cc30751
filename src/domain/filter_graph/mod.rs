// Filter graph construction - crossfade and volume graphs for -filter_complex

use std::fmt;

use crate::domain::model::*;
use crate::domain::rules::ChannelSelection;
use crate::domain::request::StreamSelector;

/// Output label of the composited crossfade video
pub const CROSSFADE_VIDEO_LABEL: &str = "fv";
/// Output label of the edited target channel
pub const EDITED_AUDIO_LABEL: &str = "aedit";
/// Output label of the merged audio stream
pub const MERGED_AUDIO_LABEL: &str = "aout";

/// Output label of the crossfaded audio for channel `index`
pub fn crossfade_audio_label(index: usize) -> String {
    format!("fa{}", index)
}

/// One `[in][in]filter,filter[out]` chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterChain {
    inputs: Vec<String>,
    filters: Vec<String>,
    outputs: Vec<String>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(mut self, pad: impl Into<String>) -> Self {
        self.inputs.push(pad.into());
        self
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filters.push(filter.into());
        self
    }

    pub fn output(mut self, label: impl Into<String>) -> Self {
        self.outputs.push(label.into());
        self
    }

}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pad in &self.inputs {
            write!(f, "[{}]", pad)?;
        }
        write!(f, "{}", self.filters.join(","))?;
        for label in &self.outputs {
            write!(f, "[{}]", label)?;
        }
        Ok(())
    }
}

/// A `;`-separated network of filter chains
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterGraph {
    chains: Vec<FilterChain>,
}

impl FilterGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chain: FilterChain) {
        self.chains.push(chain);
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Labels produced by the graph
    pub fn outputs(&self) -> impl Iterator<Item = &str> {
        self.chains
            .iter()
            .flat_map(|chain| chain.outputs.iter().map(String::as_str))
    }

    /// Labels produced but not consumed by a later chain; these must be mapped
    pub fn unconsumed_outputs(&self) -> Vec<&str> {
        self.outputs()
            .filter(|label| {
                !self
                    .chains
                    .iter()
                    .any(|chain| chain.inputs.iter().any(|pad| pad.as_str() == *label))
            })
            .collect()
    }

    pub fn has_output(&self, label: &str) -> bool {
        self.outputs().any(|l| l == label)
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.chains.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join(";"))
    }
}

/// Black-base video overlay fade plus per-channel acrossfade over two clips
///
/// Input 0 is the outgoing clip, input 1 the incoming one. Both are expected to
/// last `duration`.
pub struct CrossfadeGraph;

impl CrossfadeGraph {
    pub fn build(
        resolution: Resolution,
        fps: u32,
        duration: TimeSpec,
        audio_channels: usize,
    ) -> (FilterGraph, Vec<StreamSelector>) {
        let d = duration.seconds_expr();
        let mut graph = FilterGraph::new();

        graph.push(
            FilterChain::new()
                .filter(format!("color=c=black:s={}:r={}:d={}", resolution, fps, d))
                .output("base"),
        );
        graph.push(
            FilterChain::new()
                .input("0:v")
                .filter("fifo")
                .filter("setpts=PTS-STARTPTS")
                .output("v0"),
        );
        graph.push(
            FilterChain::new()
                .input("1:v")
                .filter("fifo")
                .filter("format=yuva420p")
                .filter(format!("fade=in:st=0:d={}:alpha=1", d))
                .filter("setpts=PTS-STARTPTS")
                .output("v1"),
        );
        graph.push(
            FilterChain::new()
                .input("base")
                .input("v0")
                .filter("overlay")
                .output("tmp"),
        );
        graph.push(
            FilterChain::new()
                .input("tmp")
                .input("v1")
                .filter("overlay")
                .filter("format=yuv420p")
                .output(CROSSFADE_VIDEO_LABEL),
        );

        let mut maps = vec![StreamSelector::Label(CROSSFADE_VIDEO_LABEL.to_string())];
        for i in 0..audio_channels {
            let label = crossfade_audio_label(i);
            graph.push(
                FilterChain::new()
                    .input(format!("0:a:{}", i))
                    .input(format!("1:a:{}", i))
                    .filter(format!("acrossfade=d={}", d))
                    .output(label.clone()),
            );
            maps.push(StreamSelector::Label(label));
        }

        (graph, maps)
    }
}

/// Time-gated volume chain on one channel, optionally merged with the others
pub struct VolumeGraph;

impl VolumeGraph {
    pub fn build(
        selection: &ChannelSelection,
        edits: &[AudioSegmentEdit],
        merge: bool,
    ) -> (FilterGraph, Vec<StreamSelector>) {
        let mut graph = FilterGraph::new();

        let mut chain = FilterChain::new().input(format!("0:a:{}", selection.target_index()));
        for edit in edits {
            chain = chain.filter(format!(
                "volume=enable='{}':volume={}",
                Self::gate_expr(&edit.range),
                edit.level
            ));
        }
        graph.push(chain.output(EDITED_AUDIO_LABEL));

        let mut maps = vec![StreamSelector::Video { input: 0 }];
        if merge {
            let sources = selection.merge_sources();
            if sources.is_empty() {
                maps.push(StreamSelector::Label(EDITED_AUDIO_LABEL.to_string()));
            } else {
                let mut merge_chain = FilterChain::new();
                for index in &sources {
                    merge_chain = merge_chain.input(format!("0:a:{}", index));
                }
                graph.push(
                    merge_chain
                        .input(EDITED_AUDIO_LABEL)
                        .filter(format!("amerge=inputs={}", sources.len() + 1))
                        .output(MERGED_AUDIO_LABEL),
                );
                maps.push(StreamSelector::Label(MERGED_AUDIO_LABEL.to_string()));
            }
        } else {
            for index in 0..selection.channel_count() {
                if index == selection.target_index() {
                    maps.push(StreamSelector::Label(EDITED_AUDIO_LABEL.to_string()));
                } else {
                    maps.push(StreamSelector::Audio { input: 0, index });
                }
            }
        }

        (graph, maps)
    }

    /// Enable expression that is true while `t` lies inside `range`
    pub fn gate_expr(range: &TimeRange) -> String {
        match (range.begin(), range.end()) {
            (Some(b), Some(e)) => format!("between(t,{},{})", b.seconds_expr(), e.seconds_expr()),
            (Some(b), None) => format!("gte(t,{})", b.seconds_expr()),
            (None, Some(e)) => format!("lte(t,{})", e.seconds_expr()),
            (None, None) => "1".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn secs(s: u64) -> TimeSpec {
        TimeSpec::from_secs(s)
    }

    #[test]
    fn test_chain_display() {
        let chain = FilterChain::new()
            .input("0:a:0")
            .input("1:a:0")
            .filter("acrossfade=d=5")
            .output("fa0");
        assert_eq!(chain.to_string(), "[0:a:0][1:a:0]acrossfade=d=5[fa0]");
    }

    #[test]
    fn test_crossfade_graph_two_channels() {
        let resolution = Resolution::new(1920, 1080).unwrap();
        let (graph, maps) = CrossfadeGraph::build(resolution, 30, secs(5), 2);

        assert_eq!(
            graph.to_string(),
            "color=c=black:s=1920x1080:r=30:d=5[base];\
             [0:v]fifo,setpts=PTS-STARTPTS[v0];\
             [1:v]fifo,format=yuva420p,fade=in:st=0:d=5:alpha=1,setpts=PTS-STARTPTS[v1];\
             [base][v0]overlay[tmp];\
             [tmp][v1]overlay,format=yuv420p[fv];\
             [0:a:0][1:a:0]acrossfade=d=5[fa0];\
             [0:a:1][1:a:1]acrossfade=d=5[fa1]"
        );
        let rendered: Vec<String> = maps.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["[fv]", "[fa0]", "[fa1]"]);
        assert_eq!(graph.unconsumed_outputs(), vec!["fv", "fa0", "fa1"]);
    }

    #[test]
    fn test_crossfade_graph_without_audio() {
        let resolution = Resolution::new(1280, 720).unwrap();
        let (graph, maps) = CrossfadeGraph::build(resolution, 25, TimeSpec::from_millis(2500), 0);

        assert!(graph.to_string().ends_with("[tmp][v1]overlay,format=yuv420p[fv]"));
        assert!(graph.to_string().contains("d=2.5"));
        assert_eq!(maps.len(), 1);
    }

    #[test]
    fn test_volume_graph_single_segment_no_merge() {
        let selection = ChannelSelection::new(2, 1, BTreeSet::new()).unwrap();
        let edits = vec![AudioSegmentEdit::new(
            TimeRange::between(secs(5), secs(10)).unwrap(),
            VolumeLevel::parse("2").unwrap(),
        )];

        let (graph, maps) = VolumeGraph::build(&selection, &edits, false);

        assert_eq!(
            graph.to_string(),
            "[0:a:0]volume=enable='between(t,5,10)':volume=2[aedit]"
        );
        let rendered: Vec<String> = maps.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["0:v", "[aedit]", "0:a:1"]);
    }

    #[test]
    fn test_volume_graph_chains_segments_in_order() {
        let selection = ChannelSelection::new(1, 1, BTreeSet::new()).unwrap();
        let edits = vec![
            AudioSegmentEdit::new(
                TimeRange::between(secs(5), secs(10)).unwrap(),
                VolumeLevel::parse("0").unwrap(),
            ),
            AudioSegmentEdit::new(
                TimeRange::starting_at(TimeSpec::from_millis(60_500)),
                VolumeLevel::parse("0.5").unwrap(),
            ),
        ];

        let (graph, _) = VolumeGraph::build(&selection, &edits, false);

        assert_eq!(
            graph.to_string(),
            "[0:a:0]volume=enable='between(t,5,10)':volume=0,\
             volume=enable='gte(t,60.5)':volume=0.5[aedit]"
        );
    }

    #[test]
    fn test_volume_graph_merge_skips_target_and_excluded() {
        let excluded: BTreeSet<usize> = [3].into_iter().collect();
        let selection = ChannelSelection::new(4, 2, excluded).unwrap();
        let edits = vec![AudioSegmentEdit::new(
            TimeRange::until(secs(30)).unwrap(),
            VolumeLevel::parse("-6dB").unwrap(),
        )];

        let (graph, maps) = VolumeGraph::build(&selection, &edits, true);

        assert_eq!(
            graph.to_string(),
            "[0:a:1]volume=enable='lte(t,30)':volume=-6dB[aedit];\
             [0:a:0][0:a:3][aedit]amerge=inputs=3[aout]"
        );
        let rendered: Vec<String> = maps.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["0:v", "[aout]"]);
        assert_eq!(graph.unconsumed_outputs(), vec!["aout"]);
    }

    #[test]
    fn test_volume_graph_merge_with_nothing_left_maps_edit() {
        let excluded: BTreeSet<usize> = [2].into_iter().collect();
        let selection = ChannelSelection::new(2, 1, excluded).unwrap();
        let edits = vec![AudioSegmentEdit::new(
            TimeRange::between(secs(1), secs(2)).unwrap(),
            VolumeLevel::parse("3").unwrap(),
        )];

        let (graph, maps) = VolumeGraph::build(&selection, &edits, true);

        assert!(!graph.to_string().contains("amerge"));
        let rendered: Vec<String> = maps.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["0:v", "[aedit]"]);
    }
}
