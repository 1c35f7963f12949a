use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, unsupported_version};

pub const MIN_SUPPORTED_VERSION: u32 = 1;
pub const MAX_SUPPORTED_VERSION: u32 = 999_999;

/// The `XXYYZZ` game-version stamp that selects schema branches.
///
/// Gates are written directly against literals, e.g. `version >= 110_600`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameVersion(u32);

impl GameVersion {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Validate a raw stamp read from a save.
    pub fn from_raw(raw: i32) -> Result<Self> {
        match u32::try_from(raw) {
            Ok(v) if (MIN_SUPPORTED_VERSION..=MAX_SUPPORTED_VERSION).contains(&v) => Ok(Self(v)),
            _ => Err(unsupported_version(i64::from(raw))),
        }
    }

    pub const fn get(&self) -> u32 {
        self.0
    }

    pub fn ensure_supported(&self) -> Result<()> {
        if (MIN_SUPPORTED_VERSION..=MAX_SUPPORTED_VERSION).contains(&self.0) {
            Ok(())
        } else {
            Err(unsupported_version(i64::from(self.0)))
        }
    }

    /// Human-readable `major.minor.patch` form, e.g. `11.6.0`.
    pub fn dotted(&self) -> String {
        let major = self.0 / 10_000;
        let minor = (self.0 / 100) % 100;
        let patch = self.0 % 100;
        format!("{major}.{minor}.{patch}")
    }
}

impl PartialEq<u32> for GameVersion {
    fn eq(&self, other: &u32) -> bool {
        self.0 == *other
    }
}

impl PartialOrd<u32> for GameVersion {
    fn partial_cmp(&self, other: &u32) -> Option<Ordering> {
        Some(self.0.cmp(other))
    }
}

impl From<u32> for GameVersion {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountryCode {
    En,
    Jp,
    Kr,
    Tw,
}

impl CountryCode {
    pub const ALL: [CountryCode; 4] = [
        CountryCode::En,
        CountryCode::Jp,
        CountryCode::Kr,
        CountryCode::Tw,
    ];

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "jp" | "ja" => Some(Self::Jp),
            "kr" | "ko" => Some(Self::Kr),
            "tw" => Some(Self::Tw),
            _ => None,
        }
    }

    /// Wire form stored in the preamble.
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::En => "en",
            Self::Jp => "jp",
            Self::Kr => "kr",
            Self::Tw => "tw",
        }
    }

    /// Suffix appended to the trailer salt. The Japanese build uses none.
    pub fn salt_suffix(&self) -> &'static str {
        match *self {
            Self::Jp => "",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}
