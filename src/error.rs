//! Process-level errors.
//!
//! Per-event problems never show up here; they are logged and the event is
//! dropped. A `MonitorError` ends the process with a non-zero status.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// The host API broke one of its documented guarantees.
    #[error("environment contract violated: {0}")]
    ContractViolation(String),

    #[error("output failed: {0}")]
    Io(#[from] std::io::Error),

    /// A Windows API call failed; wraps `windows::core::Error`.
    #[error("platform API call failed: {0}")]
    Platform(#[source] Box<dyn std::error::Error>),

    /// Raised by builds for platforms without raw input.
    #[error("{0}")]
    Unsupported(&'static str),
}

impl MonitorError {
    pub fn contract(message: impl Into<String>) -> Self {
        Self::ContractViolation(message.into())
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for MonitorError {
    fn from(error: windows::core::Error) -> Self {
        Self::Platform(Box::new(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violation_message() {
        let err = MonitorError::contract("more devices than room");
        assert_eq!(
            err.to_string(),
            "environment contract violated: more devices than room"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let err: MonitorError = std::io::Error::from(std::io::ErrorKind::BrokenPipe).into();
        assert!(matches!(err, MonitorError::Io(_)));
    }

    #[test]
    fn test_platform_error_keeps_source() {
        use std::error::Error as _;

        let cause = std::io::Error::new(std::io::ErrorKind::Other, "access denied");
        let err = MonitorError::Platform(Box::new(cause));
        assert_eq!(err.to_string(), "platform API call failed: access denied");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_unsupported_message_is_verbatim() {
        let err = MonitorError::Unsupported("raw input capture is only available on Windows");
        assert_eq!(
            err.to_string(),
            "raw input capture is only available on Windows"
        );
    }
}
