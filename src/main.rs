#![deny(unsafe_code)]

mod cli;

use anyhow::Result;
use sizelogd::daemon::{absolute_path, pid_file_path, Daemon};

fn main() -> Result<()> {
    let args = cli::parse_args();

    // Resolve before detaching, which changes the working directory to /
    let config_path = absolute_path(&args.config_path)?;

    Daemon::new(config_path, pid_file_path()).run()
}
