//! Daemon lifecycle
//!
//! This module sequences the pieces that make sizelogd a well-behaved daemon:
//! - Detachment from the controlling terminal
//! - Single-instance enforcement through the PID file
//! - Signal-driven reload and shutdown
//! - The periodic work loop

pub mod config;
pub mod detach;
pub mod logging;
pub mod pidfile;
pub mod scheduler;
pub mod signals;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{APP_IDENT, DEFAULT_PID_FILE, PID_FILE_ENV, SLEEP_TICK};
use crate::daemon::config::ConfigStore;
use crate::daemon::detach::ProcessDetacher;
use crate::daemon::logging::{DaemonLogger, LogLevel};
use crate::daemon::pidfile::InstanceGuard;
use crate::daemon::scheduler::Scheduler;
use crate::daemon::signals::{ControlFlags, SignalRouter};
use crate::workload::DirectoryWorkload;

/// PID file location, honouring the environment override
pub fn pid_file_path() -> PathBuf {
    std::env::var_os(PID_FILE_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PID_FILE))
}

/// Make `path` absolute relative to the current directory.
///
/// Detachment changes the working directory to `/`, so relative paths must
/// be resolved first.
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    Ok(cwd.join(path))
}

/// The daemon instance, constructed once in `main`
#[derive(Debug)]
pub struct Daemon {
    config_path: PathBuf,
    pid_file: PathBuf,
    flags: ControlFlags,
    tick: Duration,
}

impl Daemon {
    /// `config_path` should already be absolute
    pub fn new(config_path: PathBuf, pid_file: PathBuf) -> Self {
        Self {
            config_path,
            pid_file,
            flags: ControlFlags::new(),
            tick: SLEEP_TICK,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Handle to the control flags, for requesting stop or reload in-process
    pub fn flags(&self) -> ControlFlags {
        self.flags.clone()
    }

    /// Detach from the terminal, then serve until SIGTERM.
    ///
    /// Detachment errors are returned before anything else is touched.
    pub fn run(self) -> Result<()> {
        ProcessDetacher::new()
            .detach()
            .context("Failed to detach from controlling terminal")?;

        // Without a syslog socket the daemon still runs, just silently
        let logger = DaemonLogger::init_syslog(APP_IDENT, LogLevel::Info).unwrap_or_default();
        self.serve(logger)
    }

    /// Everything after detachment: claim the PID file, install signal
    /// handlers, load config and run the scheduler.
    pub fn serve(self, logger: DaemonLogger) -> Result<()> {
        logger.log_startup(&self.config_path, &self.pid_file, std::process::id());

        let guard = InstanceGuard::new(&self.pid_file);
        match guard.take_ownership() {
            Ok(takeover) => logger.log_takeover(takeover),
            Err(err) => logger.log_error(&err.to_string(), Some("pid_file")),
        }

        let router = match SignalRouter::install(&self.flags) {
            Ok(router) => router,
            Err(err) => {
                logger.log_error(&format!("Failed to install signal handlers: {}", err), None);
                release_pid_file(&guard, &logger);
                return Err(err).context("Failed to install signal handlers");
            }
        };

        let mut store = ConfigStore::new(&self.config_path);
        if let Ok(config) = store.reload() {
            logger.log_config(config);
        }

        let mut scheduler = Scheduler::new(store, DirectoryWorkload, self.flags.clone())
            .with_logger(logger.clone())
            .with_tick(self.tick);
        scheduler.run();

        router.uninstall();
        release_pid_file(&guard, &logger);
        logger.log_shutdown("Stop requested");
        Ok(())
    }
}

fn release_pid_file(guard: &InstanceGuard, logger: &DaemonLogger) {
    if let Err(err) = guard.release() {
        logger.log_error(
            &format!("Failed to remove PID file {}: {}", guard.pid_file().display(), err),
            Some("pid_file"),
        );
    }
}
