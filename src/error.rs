use core::fmt::{Display, Write as _};
use heapless::String;

/// Reasons the device configuration can be rejected at startup.
///
/// Every variant names the offending field so the message shown on the
/// serial console points straight at the value to fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required field `{field}`")]
    MissingRequiredField { field: &'static str },

    #[error("`{field}` is out of range, expected {expected}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
    },

    #[error("`{field}` must be one of {expected}")]
    InvalidEnum {
        field: &'static str,
        expected: &'static str,
    },

    #[error("`{field}` is not a valid {expected}")]
    Malformed {
        field: &'static str,
        expected: &'static str,
    },

    #[error("`{field}` is longer than {max} bytes")]
    TooLong { field: &'static str, max: usize },

    #[error("configuration document is not valid JSON")]
    Json,
}

impl ConfigError {
    /// Name of the field the error refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConfigError::MissingRequiredField { field }
            | ConfigError::OutOfRange { field, .. }
            | ConfigError::InvalidEnum { field, .. }
            | ConfigError::Malformed { field, .. }
            | ConfigError::TooLong { field, .. } => Some(field),
            ConfigError::Json => None,
        }
    }
}

/// Unified application error type for the firmware.
#[derive(Debug, Clone)]
pub enum AppError {
    // Startup errors
    Config(ConfigError),

    // Network errors
    RequestBuildFailed,
    WifiInit,
    NetworkTimeout,
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::Config(e)
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut msg: String<160> = String::new();
        match self {
            AppError::Config(e) => write!(msg, "invalid configuration: {e}"),
            AppError::RequestBuildFailed => write!(msg, "unable to build API request"),
            AppError::WifiInit => write!(msg, "WiFi initialization failed"),
            AppError::NetworkTimeout => write!(msg, "timed out waiting for network"),
        }?;
        write!(f, "{}", msg)
    }
}
