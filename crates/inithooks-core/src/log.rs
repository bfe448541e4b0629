//! The init log: every hook reports what it did to syslog (via the
//! `logger(1)` utility so journald picks up the tag) and to a flat log file
//! the appliance keeps for support bundles.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::process::Command;
use std::str::FromStr;

use thiserror::Error;

/// Default log file, overridable via `INITHOOKS_LOGFILE`.
pub const DEFAULT_LOGFILE: &str = "/var/log/inithooks.log";

const LOGGER_BIN: &str = "/usr/bin/logger";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Err,
    Warn,
    Info,
    Debug,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Err => "err",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, LogError> {
        match s {
            "err" => Ok(LogLevel::Err),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(LogError::InvalidLevel(other.to_string())),
        }
    }
}

pub struct InitLog {
    inithook_name: String,
    log_file: String,
}

impl InitLog {
    /// Logger for the named hook, writing to `$INITHOOKS_LOGFILE` or the
    /// default location.
    pub fn new(inithook_name: &str) -> Self {
        let log_file = std::env::var("INITHOOKS_LOGFILE")
            .unwrap_or_else(|_| DEFAULT_LOGFILE.to_string());
        Self {
            inithook_name: inithook_name.to_string(),
            log_file,
        }
    }

    /// Write `msg` to syslog and append it to the log file.
    pub fn write(&self, msg: &str, level: LogLevel) -> Result<(), LogError> {
        let msg = format!("[{}] {}", self.inithook_name, msg);
        let msg = msg.trim_end();

        // logger failing (chroot without syslog) must not break the hook
        let status = Command::new(LOGGER_BIN)
            .args(["-t", "inithooks", "-p", &level.to_string(), msg])
            .status();
        if let Err(err) = status {
            tracing::warn!(%err, "logger invocation failed");
        }

        let mut fob = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;
        writeln!(fob, "{msg}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_round_trip() {
        for name in ["err", "warn", "info", "debug"] {
            assert_eq!(name.parse::<LogLevel>().unwrap().to_string(), name);
        }
        assert!(matches!(
            "fatal".parse::<LogLevel>(),
            Err(LogError::InvalidLevel(_))
        ));
    }
}
