//! Leveled logging gate
//!
//! Controllers and scenes carry an individual log level. Diagnostics are
//! emitted through `tracing`, but only when the instance's level admits
//! them, so a single noisy scene can be silenced without touching the
//! global subscriber.

/// Per-instance verbosity for controller and scene diagnostics.
///
/// Numeric values match the configuration surface: `0` silent, `1` errors,
/// `2` errors + warnings, `3` errors + warnings + debug.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// No output at all.
    Silent = 0,
    /// Errors only.
    Error = 1,
    /// Errors and warnings.
    Warning = 2,
    /// Errors, warnings and debug information.
    Debug = 3,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Warning
    }
}

impl LogLevel {
    /// Convert a raw level, returning `None` when out of range.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => Some(LogLevel::Silent),
            1 => Some(LogLevel::Error),
            2 => Some(LogLevel::Warning),
            3 => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// Check whether a message at `level` should be emitted.
    pub fn allows(&self, level: LogLevel) -> bool {
        *self >= level
    }
}

/// Emit an error-level diagnostic if the instance level admits it.
#[macro_export]
macro_rules! log_error {
    ($gate:expr, $($arg:tt)*) => {
        if $gate.allows($crate::LogLevel::Error) {
            $crate::tracing::error!($($arg)*);
        }
    };
}

/// Emit a warning-level diagnostic if the instance level admits it.
#[macro_export]
macro_rules! log_warn {
    ($gate:expr, $($arg:tt)*) => {
        if $gate.allows($crate::LogLevel::Warning) {
            $crate::tracing::warn!($($arg)*);
        }
    };
}

/// Emit a debug-level diagnostic if the instance level admits it.
#[macro_export]
macro_rules! log_debug {
    ($gate:expr, $($arg:tt)*) => {
        if $gate.allows($crate::LogLevel::Debug) {
            $crate::tracing::debug!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering() {
        assert!(LogLevel::Debug.allows(LogLevel::Error));
        assert!(LogLevel::Warning.allows(LogLevel::Warning));
        assert!(!LogLevel::Silent.allows(LogLevel::Error));
        assert!(!LogLevel::Error.allows(LogLevel::Warning));
    }

    #[test]
    fn from_raw_rejects_out_of_range() {
        assert_eq!(LogLevel::from_raw(2), Some(LogLevel::Warning));
        assert_eq!(LogLevel::from_raw(4), None);
        assert_eq!(LogLevel::from_raw(-1), None);
    }
}
