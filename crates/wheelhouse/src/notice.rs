use std::time::Duration;
use strum::Display;

pub const AUTO_DISMISS_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Error,
}

impl Severity {
    /// Errors stay until dismissed by hand.
    pub fn auto_dismiss(self) -> Option<Duration> {
        match self {
            Self::Success | Self::Info => Some(AUTO_DISMISS_AFTER),
            Self::Error => None,
        }
    }
}

/// A single user-facing message. Showing a new one replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn log(&self) {
        match self.severity {
            Severity::Error => log::error!("{}", self.message),
            Severity::Success | Severity::Info => log::info!("{}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_errors_need_manual_dismissal() {
        assert_eq!(Notice::success("ok").severity.auto_dismiss(), Some(AUTO_DISMISS_AFTER));
        assert_eq!(Notice::info("fyi").severity.auto_dismiss(), Some(AUTO_DISMISS_AFTER));
        assert_eq!(Notice::error("bad").severity.auto_dismiss(), None);
    }
}
