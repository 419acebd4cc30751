//! Command implementations

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::{MergeRequest, SplitRequest, VolumeRequest};
use crate::cli::args::{MergeArgs, SplitArgs, VolumeArgs};
use crate::config::ToolConfig;
use crate::domain::model::{CrossfadeSpec, VolumeLevel};

/// Execute the merge command
pub async fn merge(args: MergeArgs, mut config: ToolConfig) -> Result<PathBuf> {
    config.keep_temp |= args.keep;

    let duration = args.duration.unwrap_or(config.merge.crossfade_duration);
    let crossfade = CrossfadeSpec::new(duration, args.first_start, args.second_start)
        .context("Invalid crossfade")?;
    let request = MergeRequest {
        first: args.first,
        second: args.second,
        output: args.output.unwrap_or_else(|| config.merge.output.clone()),
        crossfade,
    };

    info!(
        "Merging {} and {} with a {} crossfade",
        request.first.display(),
        request.second.display(),
        duration
    );
    let container = DefaultAppContainer::new(&config).context("Failed to set up merge")?;
    let output = container
        .merge_interactor()
        .execute(request)
        .await
        .context("Merge failed")?;
    Ok(output)
}

/// Execute the split command
pub async fn split(args: SplitArgs, mut config: ToolConfig) -> Result<Vec<PathBuf>> {
    if let Some(jobs) = args.jobs {
        config.split.jobs = jobs;
    }

    let request = SplitRequest {
        input: args.input,
        boundaries: args.times,
        start: args.start,
        end: args.end,
        prefix: args.prefix,
    };

    info!(
        "Splitting {} at {} point(s)",
        request.input.display(),
        request.boundaries.len()
    );
    let container = DefaultAppContainer::new(&config).context("Failed to set up split")?;
    let outputs = container
        .split_interactor()
        .execute(request)
        .await
        .context("Split failed")?;
    Ok(outputs)
}

/// Execute the volume command
pub async fn volume(args: VolumeArgs, config: ToolConfig) -> Result<PathBuf> {
    let levels = if args.volume.is_empty() {
        vec![VolumeLevel::parse(&config.volume.volume).context("Invalid default volume")?]
    } else {
        args.volume
    };

    let request = VolumeRequest {
        input: args.input,
        target_channel: args.channel,
        segments: args.segments,
        levels,
        merge: args.merge,
        excluded: args.exclude.into_iter().collect::<BTreeSet<_>>(),
        output: args.output.unwrap_or_else(|| config.volume.output.clone()),
    };

    info!(
        "Editing volume of channel {} in {}",
        request.target_channel,
        request.input.display()
    );
    let container = DefaultAppContainer::new(&config).context("Failed to set up volume edit")?;
    let output = container
        .volume_interactor()
        .execute(request)
        .await
        .context("Volume edit failed")?;
    Ok(output)
}
