//! vid-volume: change the volume of one audio channel over time segments
//!
//! ```bash
//! vid-volume talk.mp4 00:00:05-00:00:10 -c 2 -v 0.5 -m
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use vidutils::cli::{self, args::VolumeArgs, commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = VolumeArgs::parse_from(cli::normalize_args(std::env::args()));
    let config = match cli::bootstrap(&args.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    cli::exit_status(
        commands::volume(args, config)
            .await
            .map(|output| info!("Done: {}", output.display())),
    )
}
