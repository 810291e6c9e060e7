//! CLI binary for taskbot.
//!
//! This binary is a thin wrapper that parses arguments and delegates to the
//! library.

use clap::Parser;
use std::process::ExitCode;
use taskbot::cli::{run, Cli};
use taskbot::config::BotConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_filter =
        BotConfig::load_or_default(cli.config.as_deref()).ok().and_then(|c| c.log_filter);
    taskbot::logging::init(log_filter.as_deref());

    let output = run(cli);
    for line in output.stdout {
        println!("{line}");
    }
    for line in output.stderr {
        eprintln!("{line}");
    }
    output.exit_code
}
