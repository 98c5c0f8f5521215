//! PID file protocol for single-instance enforcement
//!
//! A new instance reads the PID file, evicts a live predecessor with SIGTERM,
//! and then records its own PID. Stale files left behind by a crash are
//! simply overwritten.

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::constants::EVICTION_GRACE;
use crate::models::Takeover;

/// Owner-writable only, whatever the process umask
const PID_FILE_MODE: u32 = 0o644;

/// Answers whether a process identifier still refers to a running process
pub trait LivenessProbe {
    fn is_alive(&self, pid: Pid) -> bool;
}

/// Probe backed by the `/proc` process table
#[derive(Debug, Clone)]
pub struct ProcFsProbe {
    root: PathBuf,
}

impl ProcFsProbe {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Probe against an alternate process table directory
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for ProcFsProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl LivenessProbe for ProcFsProbe {
    fn is_alive(&self, pid: Pid) -> bool {
        self.root.join(pid.as_raw().to_string()).exists()
    }
}

/// Probe that sends the null signal; `EPERM` still means the process exists
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalProbe;

impl LivenessProbe for SignalProbe {
    fn is_alive(&self, pid: Pid) -> bool {
        match kill(pid, None) {
            Ok(()) => true,
            Err(nix::errno::Errno::EPERM) => true,
            Err(_) => false,
        }
    }
}

#[cfg(target_os = "linux")]
pub type PlatformProbe = ProcFsProbe;

#[cfg(not(target_os = "linux"))]
pub type PlatformProbe = SignalProbe;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Failed to write PID file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Claims and releases the PID file for the current process
#[derive(Debug)]
pub struct InstanceGuard<P: LivenessProbe = PlatformProbe> {
    pid_file: PathBuf,
    probe: P,
    grace: Duration,
}

impl InstanceGuard<PlatformProbe> {
    /// Guard using the probe selected for this platform
    pub fn new(pid_file: impl Into<PathBuf>) -> Self {
        Self::with_probe(pid_file, PlatformProbe::default())
    }
}

impl<P: LivenessProbe> InstanceGuard<P> {
    pub fn with_probe(pid_file: impl Into<PathBuf>, probe: P) -> Self {
        Self {
            pid_file: pid_file.into(),
            probe,
            grace: EVICTION_GRACE,
        }
    }

    /// Override how long an evicted predecessor is given to exit
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn pid_file(&self) -> &Path {
        &self.pid_file
    }

    /// Evict any live predecessor and record the current PID.
    ///
    /// Eviction is best effort: after SIGTERM the guard waits the grace
    /// period and then overwrites the file whether or not the predecessor
    /// has exited.
    pub fn take_ownership(&self) -> Result<Takeover, GuardError> {
        let own_pid = Pid::this();
        let takeover = match read_pid(&self.pid_file) {
            PidFileContents::Missing => Takeover::Fresh,
            PidFileContents::Invalid => {
                log::warn!(
                    "PID file {} does not contain a valid PID, overwriting",
                    self.pid_file.display()
                );
                Takeover::Unparseable
            }
            PidFileContents::Pid(pid) if pid != own_pid && self.probe.is_alive(pid) => {
                log::info!("Found existing daemon with PID {}. Sending SIGTERM.", pid);
                if let Err(err) = kill(pid, Signal::SIGTERM) {
                    log::warn!("Failed to send SIGTERM to PID {}: {}", pid, err);
                }
                std::thread::sleep(self.grace);
                Takeover::Evicted(pid.as_raw())
            }
            PidFileContents::Pid(pid) => {
                log::info!("Stale PID file found (PID {}), but process not running.", pid);
                Takeover::Stale(pid.as_raw())
            }
        };

        write_pid(&self.pid_file, own_pid).map_err(|source| GuardError::Write {
            path: self.pid_file.clone(),
            source,
        })?;

        Ok(takeover)
    }

    /// Remove the PID file if it still names the current process.
    ///
    /// A successor that already overwrote the file keeps its record.
    pub fn release(&self) -> io::Result<bool> {
        match read_pid(&self.pid_file) {
            PidFileContents::Pid(pid) if pid == Pid::this() => {
                fs::remove_file(&self.pid_file)?;
                Ok(true)
            }
            PidFileContents::Missing => Ok(false),
            _ => {
                log::info!(
                    "PID file {} now belongs to another instance, leaving it in place",
                    self.pid_file.display()
                );
                Ok(false)
            }
        }
    }
}

enum PidFileContents {
    Missing,
    Invalid,
    Pid(Pid),
}

fn read_pid(path: &Path) -> PidFileContents {
    let Ok(text) = fs::read_to_string(path) else {
        return PidFileContents::Missing;
    };

    match text.trim().parse::<i32>() {
        // 0 and negative values would address process groups in kill(2)
        Ok(raw) if raw > 0 => PidFileContents::Pid(Pid::from_raw(raw)),
        _ => PidFileContents::Invalid,
    }
}

fn write_pid(path: &Path, pid: Pid) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(PID_FILE_MODE)
        .open(path)?;

    // Detachment clears the umask, and an existing file keeps its old mode
    let mut permissions = file.metadata()?.permissions();
    if permissions.mode() & 0o777 != PID_FILE_MODE {
        permissions.set_mode(PID_FILE_MODE);
        file.set_permissions(permissions)?;
    }

    write!(file, "{}", pid.as_raw())
}
