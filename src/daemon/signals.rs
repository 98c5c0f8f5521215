//! Signal-driven control flags
//!
//! SIGHUP requests a config reload and SIGTERM requests shutdown. Handlers
//! only store `true` into an atomic flag; the scheduler does the rest.

use signal_hook::consts::{SIGHUP, SIGTERM};
use signal_hook::SigId;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Intent flags shared between the signal handlers and the scheduler
#[derive(Debug, Clone, Default)]
pub struct ControlFlags {
    reload: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
}

impl ControlFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_reload(&self) {
        self.reload.store(true, Ordering::SeqCst);
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn reload_requested(&self) -> bool {
        self.reload.load(Ordering::SeqCst)
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Clear a pending reload request, returning whether one was pending
    pub fn take_reload(&self) -> bool {
        self.reload.swap(false, Ordering::SeqCst)
    }
}

/// Registered handlers for the two control signals
#[derive(Debug)]
pub struct SignalRouter {
    ids: [SigId; 2],
}

impl SignalRouter {
    /// Route SIGHUP and SIGTERM into `flags`
    pub fn install(flags: &ControlFlags) -> io::Result<Self> {
        let reload = signal_hook::flag::register(SIGHUP, Arc::clone(&flags.reload))?;
        let stop = match signal_hook::flag::register(SIGTERM, Arc::clone(&flags.stop)) {
            Ok(id) => id,
            Err(err) => {
                signal_hook::low_level::unregister(reload);
                return Err(err);
            }
        };

        Ok(Self { ids: [reload, stop] })
    }

    /// Remove the handlers again
    pub fn uninstall(self) {
        for id in self.ids {
            signal_hook::low_level::unregister(id);
        }
    }
}
