//! Global constants for sizelogd
//!
//! Centralized location for application-wide constants

use std::time::Duration;

/// Identifier used for the system log and as the binary name
pub const APP_IDENT: &str = "sizelogd";

/// Config file read when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config.txt";

/// Fixed location of the PID file
pub const DEFAULT_PID_FILE: &str = "/tmp/sizelogd.pid";

/// Environment variable overriding [`DEFAULT_PID_FILE`]
pub const PID_FILE_ENV: &str = "SIZELOGD_PID_FILE";

/// Name of the append-only record file inside the destination directory
pub const SIZE_LOG_NAME: &str = "size.log";

/// Interval used until a config file provides one
pub const DEFAULT_INTERVAL_SECS: u64 = 30;

/// Time a live predecessor is given to exit after SIGTERM
pub const EVICTION_GRACE: Duration = Duration::from_secs(1);

/// Granularity at which the scheduler sleep checks the control flags
pub const SLEEP_TICK: Duration = Duration::from_secs(1);

/// Local-time layout of the record timestamp (same as C `ctime`)
pub const RECORD_TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";
