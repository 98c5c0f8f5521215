//! CLI argument parsing module
//!
//! sizelogd takes a single optional positional argument: the path of the
//! config file. Everything else is configured through that file.

use clap::{Arg, Command};
use std::path::PathBuf;

use sizelogd::constants::{APP_IDENT, DEFAULT_CONFIG_PATH};

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    /// Config file path as given (not yet made absolute)
    pub config_path: PathBuf,
}

fn command() -> Command {
    Command::new(APP_IDENT)
        .version(concat!(env!("SIZELOGD_VERSION"), " (", env!("GIT_HASH"), ")"))
        .about("Periodically log the size of a directory, then empty it")
        .long_about(
            "Runs in the background, appending the size of folder1 to folder2/size.log \
             every interval seconds and then clearing folder1. Send SIGHUP to reload the \
             config file and SIGTERM to stop.",
        )
        .arg(
            Arg::new("config")
                .value_name("CONFIG")
                .help("Config file with folder1, folder2 and interval keys")
                .default_value(DEFAULT_CONFIG_PATH),
        )
}

/// Parse command line arguments; exits with usage on error
pub fn parse_args() -> CliArgs {
    from_matches(&command().get_matches())
}

fn from_matches(matches: &clap::ArgMatches) -> CliArgs {
    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    CliArgs { config_path }
}
