//! Reader and writer for The Battle Cats save files.
//!
//! [`SaveFile`] decodes a save into typed sections, re-encodes it
//! byte-for-byte, and keeps the managed-item log that backs monetised
//! currency changes. [`core_api`] is the narrow facade the CLI drives.

pub mod backup;
pub mod core_api;
pub mod dict;
pub mod error;
pub mod layout;
pub mod options;
pub mod save;
pub mod sections;
pub mod signature;
pub mod stream;
pub mod trailer;
pub mod version;

pub use backup::{BackupMetaData, Clock, Direction, ManagedItem, ManagedItemType, SystemClock};
pub use error::{ErrorCode, Result, SaveError, SaveErrorKind};
pub use layout::{ByteRange, FileLayout, SectionId, SectionLayout};
pub use options::{IntegrityPolicy, IntegrityStatus, OpenOptions};
pub use save::{SaveFile, SaveGame};
pub use signature::Signature;
pub use version::{CountryCode, GameVersion};
