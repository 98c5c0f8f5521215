//! Periodic work loop
//!
//! Runs measure → record → purge, then sleeps for the configured interval in
//! short ticks so that stop and reload requests are noticed promptly.

use std::time::Duration;

use crate::constants::SLEEP_TICK;
use crate::daemon::config::ConfigStore;
use crate::daemon::logging::DaemonLogger;
use crate::daemon::signals::ControlFlags;
use crate::models::{LogRecord, SchedulerState};
use crate::workload::{append_record, Workload};

/// How an interval sleep ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SleepOutcome {
    Elapsed,
    StopRequested,
}

pub struct Scheduler<W: Workload> {
    store: ConfigStore,
    workload: W,
    flags: ControlFlags,
    logger: DaemonLogger,
    tick: Duration,
    state: SchedulerState,
}

impl<W: Workload> Scheduler<W> {
    /// `store` should already hold the initial configuration
    pub fn new(store: ConfigStore, workload: W, flags: ControlFlags) -> Self {
        Self {
            store,
            workload,
            flags,
            logger: DaemonLogger::default(),
            tick: SLEEP_TICK,
            state: SchedulerState::Running,
        }
    }

    pub fn with_logger(mut self, logger: DaemonLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Length of one sleep tick; an interval of N seconds sleeps N ticks
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Run cycles until a stop is requested
    pub fn run(&mut self) -> SchedulerState {
        while self.state == SchedulerState::Running {
            if self.flags.stop_requested() {
                self.state = SchedulerState::Stopping;
                break;
            }

            if self.flags.take_reload() {
                self.reload();
            }

            self.run_cycle();

            if self.sleep_interval() == SleepOutcome::StopRequested {
                self.state = SchedulerState::Stopping;
            }
        }

        self.state
    }

    /// Execute a single work cycle against the current configuration
    pub fn run_cycle(&mut self) {
        let config = self.store.current();
        if !config.has_folders() {
            log::warn!("Folders not configured correctly.");
            return;
        }
        let source = config.source_dir.clone();
        let dest = config.dest_dir.clone();

        // An unmeasurable source is recorded as 0 and still cleared
        let size = match self.workload.measure(&source) {
            Ok(size) => size,
            Err(err) => {
                self.logger.log_error(
                    &format!("Failed to measure {}: {}", source.display(), err),
                    Some("measure"),
                );
                0
            }
        };

        let record = LogRecord::now(size);
        if let Err(err) = append_record(&dest, &record) {
            self.logger.log_error(
                &format!("Failed to write to log file in {}: {}", dest.display(), err),
                Some("record"),
            );
        }

        if let Err(err) = self.workload.purge(&source) {
            self.logger.log_error(
                &format!("Failed to clear {}: {}", source.display(), err),
                Some("purge"),
            );
            return;
        }

        self.logger.log_cycle(&source, &record);
    }

    fn reload(&mut self) {
        if let Ok(config) = self.store.reload() {
            self.logger.log_config(config);
        }
    }

    /// Sleep for the configured interval, one tick at a time.
    ///
    /// A reload request re-reads the config and restarts the sleep with the
    /// new interval; a stop request ends it immediately.
    fn sleep_interval(&mut self) -> SleepOutcome {
        'interval: loop {
            for _ in 0..self.store.current().interval_seconds {
                if self.flags.stop_requested() {
                    return SleepOutcome::StopRequested;
                }
                if self.flags.take_reload() {
                    self.reload();
                    continue 'interval;
                }
                std::thread::sleep(self.tick);
            }
            return SleepOutcome::Elapsed;
        }
    }
}
