use serde::Serialize;

use crate::stream::DEFAULT_COUNT_CAP;

/// What to do when the stored trailer does not match the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegrityPolicy {
    /// Fail with `IntegrityFailed`; the decoded model rides along in the error.
    #[default]
    Reject,
    /// Log a warning and return the model flagged as mismatched.
    Accept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    pub integrity: IntegrityPolicy,
    /// Largest element count a decoder will believe.
    pub count_cap: usize,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            integrity: IntegrityPolicy::Reject,
            count_cap: DEFAULT_COUNT_CAP,
        }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn integrity(mut self, policy: IntegrityPolicy) -> Self {
        self.integrity = policy;
        self
    }

    pub fn count_cap(mut self, cap: usize) -> Self {
        self.count_cap = cap;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IntegrityStatus {
    /// Built in memory, never read from bytes.
    Unchecked,
    Verified,
    Mismatch { stored: String, computed: String },
}

impl IntegrityStatus {
    pub fn is_mismatch(&self) -> bool {
        matches!(self, IntegrityStatus::Mismatch { .. })
    }
}
