use std::error::Error;
use std::fmt;

use crate::error::{ErrorCode, SaveError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Parse,
    UnsupportedVersion,
    IntegrityMismatch,
    InvalidEdit,
    Encode,
    Signature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Classify a codec error; `context` prefixes the message.
    pub(crate) fn from_save(context: &str, err: &SaveError) -> Self {
        let code = match err.code() {
            ErrorCode::Truncated | ErrorCode::InvalidEncoding | ErrorCode::Implausible => {
                CoreErrorCode::Parse
            }
            ErrorCode::UnsupportedVersion => CoreErrorCode::UnsupportedVersion,
            ErrorCode::IntegrityFailed => CoreErrorCode::IntegrityMismatch,
            ErrorCode::InvariantViolation => CoreErrorCode::Encode,
            ErrorCode::SignatureFailed => CoreErrorCode::Signature,
        };
        Self::new(code, format!("{context}: {err}"))
    }
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for CoreError {}
