//! Process detachment (classic double-fork daemonization)

use nix::fcntl::{open, OFlag};
use nix::sys::stat::{umask, Mode};
use nix::unistd::{chdir, close, dup2, fork, setsid, ForkResult};
use std::os::unix::io::RawFd;
use thiserror::Error;

const STDIN_FD: RawFd = 0;
const STDOUT_FD: RawFd = 1;
const STDERR_FD: RawFd = 2;

#[derive(Debug, Error)]
pub enum DetachError {
    #[error("fork failed: {0}")]
    Fork(#[source] nix::Error),

    #[error("setsid failed: {0}")]
    Session(#[source] nix::Error),

    #[error("failed to change working directory to /: {0}")]
    Chdir(#[source] nix::Error),

    #[error("failed to redirect standard streams to /dev/null: {0}")]
    Redirect(#[source] nix::Error),
}

/// Turns the calling process into a daemon.
///
/// `detach` consumes the detacher so it can only run once per process.
#[derive(Debug, Default)]
pub struct ProcessDetacher {
    _private: (),
}

impl ProcessDetacher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detach from the controlling terminal.
    ///
    /// Only the final grandchild returns from this call; the original
    /// process and the intermediate session leader exit with status 0.
    /// Must be called while the process is still single-threaded.
    pub fn detach(self) -> Result<(), DetachError> {
        fork_and_exit_parent()?;
        setsid().map_err(DetachError::Session)?;
        // The session leader could acquire a terminal again; its child cannot
        fork_and_exit_parent()?;

        umask(Mode::empty());
        chdir("/").map_err(DetachError::Chdir)?;
        redirect_standard_streams()
    }
}

#[allow(unsafe_code)]
fn fork_and_exit_parent() -> Result<(), DetachError> {
    // SAFETY: called before any thread is spawned, so the child inherits a
    // consistent single-threaded address space
    match unsafe { fork() }.map_err(DetachError::Fork)? {
        ForkResult::Parent { .. } => std::process::exit(0),
        ForkResult::Child => Ok(()),
    }
}

fn redirect_standard_streams() -> Result<(), DetachError> {
    let null = open("/dev/null", OFlag::O_RDWR, Mode::empty()).map_err(DetachError::Redirect)?;

    for fd in [STDIN_FD, STDOUT_FD, STDERR_FD] {
        dup2(null, fd).map_err(DetachError::Redirect)?;
    }

    if null > STDERR_FD {
        close(null).map_err(DetachError::Redirect)?;
    }
    Ok(())
}
