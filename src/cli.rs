// Author: Dustin Pilgrim
// License: MIT

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "stop-idle-sessions",
    version = env!("CARGO_PKG_VERSION"),
    about = "Stop idle logind sessions to prevent interactive access from \
             unattended terminals, e.g. a laptop left unlocked in a coffee \
             shop with an SSH session into an internal network resource"
)]
pub struct Args {
    /// Don't take any action, just log what would have happened
    #[arg(short = 'n', long, action)]
    pub dry_run: bool,

    /// Incorporate debug logs
    #[arg(short, long, action)]
    pub verbose: bool,

    /// Override the location of the configuration INI file
    #[arg(short, long, value_name = "FILE")]
    pub config_file: Option<PathBuf>,
}
