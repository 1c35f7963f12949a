//! Integrity trailer: lowercase hex MD5 over a salt and the whole payload.

use md5::{Digest, Md5};

use crate::error::{Result, SaveError};
use crate::version::CountryCode;

pub const TRAILER_LEN: usize = 32;

const SALT_PREFIX: &[u8] = b"battlecats";

pub fn compute(country: CountryCode, payload: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(SALT_PREFIX);
    hasher.update(country.salt_suffix().as_bytes());
    hasher.update(payload);
    format!("{:x}", hasher.finalize())
}

/// Split `bytes` into payload and stored trailer text.
pub fn split(bytes: &[u8]) -> Result<(&[u8], String)> {
    if bytes.len() < TRAILER_LEN {
        return Err(SaveError::truncated(0, TRAILER_LEN, bytes.len()));
    }
    let (payload, stored) = bytes.split_at(bytes.len() - TRAILER_LEN);
    Ok((payload, String::from_utf8_lossy(stored).into_owned()))
}

/// The outcome of checking a stored trailer against the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailerCheck {
    pub stored: String,
    pub computed: String,
}

impl TrailerCheck {
    pub fn new(country: CountryCode, payload: &[u8], stored: String) -> Self {
        Self {
            stored,
            computed: compute(country, payload),
        }
    }

    pub fn matches(&self) -> bool {
        self.stored == self.computed
    }
}
