use crate::layout::SectionId;
use crate::save::SaveFile;

pub type Result<T, E = SaveError> = std::result::Result<T, E>;

/// A save codec error.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct SaveError(#[from] Box<SaveErrorKind>);

impl SaveError {
    pub(crate) fn new(kind: SaveErrorKind) -> SaveError {
        SaveError(Box::new(kind))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &SaveErrorKind {
        &self.0
    }

    pub fn into_kind(self) -> SaveErrorKind {
        *self.0
    }

    pub fn code(&self) -> ErrorCode {
        self.0.code()
    }

    /// Recover the decoded model from an integrity failure.
    pub fn into_save(self) -> Option<SaveFile> {
        match *self.0 {
            SaveErrorKind::IntegrityFailed { save, .. } => Some(*save),
            _ => None,
        }
    }

    pub(crate) fn truncated(offset: usize, needed: usize, remaining: usize) -> Self {
        Self::new(SaveErrorKind::Truncated {
            offset,
            needed,
            remaining,
        })
    }

    pub(crate) fn invalid(offset: usize, msg: impl Into<String>) -> Self {
        Self::new(SaveErrorKind::InvalidEncoding {
            offset,
            msg: msg.into(),
        })
    }

    pub(crate) fn invariant(field: &'static str, msg: impl Into<String>) -> Self {
        Self::new(SaveErrorKind::InvariantViolation {
            field,
            msg: msg.into(),
        })
    }

    pub(crate) fn implausible(offset: usize, count: i64, cap: usize) -> Self {
        Self::new(SaveErrorKind::Implausible { offset, count, cap })
    }

    pub(crate) fn signature(msg: impl Into<String>) -> Self {
        Self::new(SaveErrorKind::SignatureFailed { msg: msg.into() })
    }

    /// Attach the section being processed to the error message.
    pub(crate) fn in_section(self, section: SectionId) -> Self {
        match *self.0 {
            SaveErrorKind::InvalidEncoding { offset, msg } => Self::invalid(
                offset,
                format!("{}: {msg}", section.name()),
            ),
            kind => Self::new(kind),
        }
    }
}

impl From<SaveErrorKind> for SaveError {
    fn from(err: SaveErrorKind) -> Self {
        SaveError::new(err)
    }
}

/// Specific type of error
#[derive(thiserror::Error, Debug)]
pub enum SaveErrorKind {
    #[error("truncated input: needed {needed} bytes at offset {offset}, {remaining} remaining")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("invalid encoding at offset {offset}: {msg}")]
    InvalidEncoding { offset: usize, msg: String },

    #[error("unsupported game version {version}")]
    UnsupportedVersion { version: i64 },

    #[error("integrity trailer mismatch: stored {stored}, computed {computed}")]
    IntegrityFailed {
        stored: String,
        computed: String,
        save: Box<SaveFile>,
    },

    #[error("inconsistent {field}: {msg}")]
    InvariantViolation { field: &'static str, msg: String },

    #[error("implausible count {count} at offset {offset} (cap {cap})")]
    Implausible {
        offset: usize,
        count: i64,
        cap: usize,
    },

    #[error("unable to sign payload: {msg}")]
    SignatureFailed { msg: String },
}

impl SaveErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            SaveErrorKind::Truncated { .. } => ErrorCode::Truncated,
            SaveErrorKind::InvalidEncoding { .. } => ErrorCode::InvalidEncoding,
            SaveErrorKind::UnsupportedVersion { .. } => ErrorCode::UnsupportedVersion,
            SaveErrorKind::IntegrityFailed { .. } => ErrorCode::IntegrityFailed,
            SaveErrorKind::InvariantViolation { .. } => ErrorCode::InvariantViolation,
            SaveErrorKind::Implausible { .. } => ErrorCode::Implausible,
            SaveErrorKind::SignatureFailed { .. } => ErrorCode::SignatureFailed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Truncated,
    InvalidEncoding,
    UnsupportedVersion,
    IntegrityFailed,
    InvariantViolation,
    Implausible,
    SignatureFailed,
}

impl ErrorCode {
    /// Only trailer mismatches leave a usable model behind.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ErrorCode::IntegrityFailed)
    }
}

pub(crate) fn unsupported_version(version: i64) -> SaveError {
    SaveError::new(SaveErrorKind::UnsupportedVersion { version })
}
