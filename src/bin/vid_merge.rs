//! vid-merge: join two videos with a video and audio crossfade
//!
//! ```bash
//! vid-merge intro.mp4 talk.mp4 -o joined.mp4 -d 00:00:03
//! vid-merge a.mp4 b.mp4 -s1 00:10:00 -s2 00:00:20
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use vidutils::cli::{self, args::MergeArgs, commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = MergeArgs::parse_from(cli::normalize_args(std::env::args()));
    let config = match cli::bootstrap(&args.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    cli::exit_status(
        commands::merge(args, config)
            .await
            .map(|output| info!("Done: {}", output.display())),
    )
}
