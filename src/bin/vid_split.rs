//! vid-split: cut a video into parts at the given times
//!
//! ```bash
//! vid-split talk.mp4 00:10:00 00:20:00 -p talk-
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing::info;

use vidutils::cli::{self, args::SplitArgs, commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = SplitArgs::parse_from(cli::normalize_args(std::env::args()));
    let config = match cli::bootstrap(&args.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    cli::exit_status(
        commands::split(args, config)
            .await
            .map(|outputs| info!("Done: {} part(s)", outputs.len())),
    )
}
