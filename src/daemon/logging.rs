//! System log integration for daemon mode
//!
//! Installs a syslog backend for the `log` facade and provides structured
//! lifecycle events on top of it

use anyhow::Result;
use log::{error, info, warn, LevelFilter};
use serde_json::json;
use std::path::Path;
use syslog::{BasicLogger, Facility, Formatter3164};

use crate::daemon::config::Config;
use crate::models::{LogRecord, Takeover};

/// Structured logger for daemon lifecycle events
#[derive(Debug, Clone)]
pub struct DaemonLogger {
    /// Current logging level
    level: LogLevel,
}

/// Log levels for daemon operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
}

impl Default for DaemonLogger {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl DaemonLogger {
    pub fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Connect the `log` facade to the local syslog daemon.
    ///
    /// Must run after detachment so the recorded PID is the daemon's own.
    pub fn init_syslog(ident: &str, level: LogLevel) -> Result<Self> {
        let formatter = Formatter3164 {
            facility: Facility::LOG_DAEMON,
            hostname: None,
            process: ident.to_string(),
            pid: std::process::id(),
        };

        let logger = syslog::unix(formatter)
            .map_err(|e| anyhow::anyhow!("Failed to connect to syslog: {}", e))?;
        log::set_boxed_logger(Box::new(BasicLogger::new(logger)))
            .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))?;
        log::set_max_level(level.filter());

        Ok(Self::new(level))
    }

    pub fn log_startup(&self, config_path: &Path, pid_file: &Path, pid: u32) {
        let message = json!({
            "event": "daemon_startup",
            "pid": pid,
            "config_path": config_path.display().to_string(),
            "pid_file": pid_file.display().to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Info, "Daemon started", &message);
    }

    pub fn log_takeover(&self, takeover: Takeover) {
        let (kind, previous_pid) = match takeover {
            Takeover::Fresh => ("fresh", None),
            Takeover::Unparseable => ("unparseable", None),
            Takeover::Stale(pid) => ("stale", Some(pid)),
            Takeover::Evicted(pid) => ("evicted", Some(pid)),
        };
        let message = json!({
            "event": "pid_file_claimed",
            "predecessor": kind,
            "previous_pid": previous_pid,
        });

        let level = if takeover == Takeover::Unparseable {
            LogLevel::Warning
        } else {
            LogLevel::Info
        };
        self.log_structured(level, "PID file claimed", &message);
    }

    pub fn log_config(&self, config: &Config) {
        // Non UTF-8 paths cannot be represented in JSON
        let interval = config.interval_seconds;
        let config = serde_json::to_value(config).unwrap_or_default();
        let message = json!({
            "event": "config_loaded",
            "config": config,
        });

        self.log_structured(
            LogLevel::Info,
            &format!("Config loaded. Interval: {}", interval),
            &message,
        );
    }

    /// Log one completed work cycle
    pub fn log_cycle(&self, source: &Path, record: &LogRecord) {
        let message = json!({
            "event": "cycle_completed",
            "source": source.display().to_string(),
            "size_bytes": record.measured_bytes,
            "timestamp": record.timestamp.to_rfc3339(),
        });

        self.log_structured(
            LogLevel::Info,
            &format!("Work done. Size {} logged, folder cleared.", record.measured_bytes),
            &message,
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        let message = json!({
            "event": "daemon_shutdown",
            "reason": reason,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });

        self.log_structured(LogLevel::Info, "Daemon stopping", &message);
        log::logger().flush();
    }

    pub fn log_error(&self, error_message: &str, context: Option<&str>) {
        let message = json!({
            "event": "error",
            "message": error_message,
            "context": context,
        });

        self.log_structured(LogLevel::Error, error_message, &message);
    }

    fn log_structured(&self, level: LogLevel, message: &str, data: &serde_json::Value) {
        if !self.should_log(level) {
            return;
        }

        let full_message = format!("{} | {}", message, data);

        match level {
            LogLevel::Error => error!("{}", full_message),
            LogLevel::Warning => warn!("{}", full_message),
            LogLevel::Info => info!("{}", full_message),
        }
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level.rank() <= self.level.rank()
    }
}

impl LogLevel {
    fn rank(self) -> u8 {
        match self {
            LogLevel::Error => 0,
            LogLevel::Warning => 1,
            LogLevel::Info => 2,
        }
    }

    fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_gating() {
        let logger = DaemonLogger::new(LogLevel::Warning);
        assert!(logger.should_log(LogLevel::Error));
        assert!(logger.should_log(LogLevel::Warning));
        assert!(!logger.should_log(LogLevel::Info));
    }

    #[test]
    fn test_info_logs_everything() {
        let logger = DaemonLogger::default();
        assert!(logger.should_log(LogLevel::Error));
        assert!(logger.should_log(LogLevel::Info));
    }
}
