use crate::backup::ManagedItem;
use crate::error::SaveError;
use crate::options::OpenOptions;
use crate::save::SaveFile;
use crate::version::{CountryCode, GameVersion};

use super::error::{CoreError, CoreErrorCode};
use super::types::{CounterSnapshot, Snapshot};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

#[derive(Debug)]
pub struct Session {
    file: SaveFile,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    pub fn open_bytes<B: AsRef<[u8]>>(
        &self,
        bytes: B,
        options: &OpenOptions,
    ) -> Result<Session, CoreError> {
        SaveFile::open_with(bytes.as_ref(), options)
            .map(Session::from_file)
            .map_err(|e| CoreError::from_save("failed to open save", &e))
    }

    /// A session over a default save, e.g. for fixtures.
    pub fn new_save(
        &self,
        country: CountryCode,
        version: GameVersion,
    ) -> Result<Session, CoreError> {
        SaveFile::new(country, version)
            .map(Session::from_file)
            .map_err(|e| CoreError::from_save("failed to create save", &e))
    }
}

impl Session {
    pub fn from_file(file: SaveFile) -> Self {
        Self { file }
    }

    pub fn file(&self) -> &SaveFile {
        &self.file
    }

    pub fn file_mut(&mut self) -> &mut SaveFile {
        &mut self.file
    }

    pub fn into_file(self) -> SaveFile {
        self.file
    }

    pub fn snapshot(&self) -> Snapshot {
        let file = &self.file;
        let counters = &file.save.counters;
        Snapshot {
            country: file.country(),
            game_version: file.version(),
            inquiry_code: file.inquiry_code().to_string(),
            counters: CounterSnapshot {
                catfood: counters.catfood,
                xp: counters.xp,
                normal_tickets: counters.normal_tickets,
                rare_tickets: counters.rare_tickets,
                platinum_tickets: counters.platinum_tickets,
                legend_tickets: counters.legend_tickets,
                platinum_shards: counters.platinum_shards,
                np: counters.np,
                leadership: counters.leadership,
                play_time: counters.play_time,
            },
            user_rank: file.user_rank(),
            owned_cats: file.save.cats.owned_count(),
            total_cats: file.save.cats.len(),
            managed_items: file.managed_items().to_vec(),
            integrity: file.integrity().clone(),
        }
    }

    pub fn managed_items(&self) -> &[ManagedItem] {
        self.file.managed_items()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CoreError> {
        self.file
            .serialize()
            .map_err(|e| CoreError::from_save("failed to encode save", &e))
    }

    pub fn set_catfood(&mut self, value: i32) -> Result<(), CoreError> {
        self.file
            .set_catfood(value)
            .map_err(|e| edit_error("catfood", &e))
    }

    pub fn set_rare_tickets(&mut self, value: i32) -> Result<(), CoreError> {
        self.file
            .set_rare_tickets(value)
            .map_err(|e| edit_error("rare tickets", &e))
    }

    pub fn set_platinum_tickets(&mut self, value: i32) -> Result<(), CoreError> {
        self.file
            .set_platinum_tickets(value)
            .map_err(|e| edit_error("platinum tickets", &e))
    }

    pub fn set_legend_tickets(&mut self, value: i32) -> Result<(), CoreError> {
        if self.file.version() < 80_000 {
            return Err(CoreError::new(
                CoreErrorCode::InvalidEdit,
                format!("legend tickets do not exist at {}", self.file.version()),
            ));
        }
        self.file
            .set_legend_tickets(value)
            .map_err(|e| edit_error("legend tickets", &e))
    }

    pub fn set_normal_tickets(&mut self, value: i32) {
        self.file.set_normal_tickets(value);
    }

    pub fn set_xp(&mut self, value: i32) {
        self.file.set_xp(value);
    }

    pub fn set_np(&mut self, value: i32) {
        self.file.set_np(value);
    }

    pub fn set_leadership(&mut self, value: i16) {
        self.file.set_leadership(value);
    }

    pub fn set_inquiry_code(&mut self, code: &str) -> Result<(), CoreError> {
        if code.is_empty() {
            return Err(CoreError::new(
                CoreErrorCode::InvalidEdit,
                "inquiry code must not be empty",
            ));
        }
        self.file.set_inquiry_code(code);
        Ok(())
    }

    pub fn set_game_version(&mut self, version: GameVersion) -> Result<(), CoreError> {
        self.file
            .set_game_version(version)
            .map_err(|e| CoreError::from_save("failed to set game version", &e))
    }

    pub fn backup_payload(&self, save_key: Option<&str>) -> Result<String, CoreError> {
        self.file
            .backup_payload(save_key)
            .map_err(|e| CoreError::from_save("failed to build backup payload", &e))
    }
}

fn edit_error(field: &str, err: &SaveError) -> CoreError {
    CoreError::new(
        CoreErrorCode::InvalidEdit,
        format!("failed to set {field}: {err}"),
    )
}
