//! The save file as a whole: preamble, sections, string table, tail and
//! trailer, plus the typed accessors feature code edits through.

mod game;

pub use game::SaveGame;

use rand::{CryptoRng, RngCore};
use tracing::{debug, info, warn};

use crate::backup::{BackupMetaData, Clock, ManagedItem, ManagedItemType, PayloadContext};
use crate::error::{Result, SaveError, SaveErrorKind};
use crate::layout::{FileLayout, SectionId};
use crate::options::{IntegrityPolicy, IntegrityStatus, OpenOptions};
use crate::sections::SectionContext;
use crate::sections::cats::Cat;
use crate::sections::resources::Catfruit;
use crate::stream::{ByteReader, ByteWriter, SaveString};
use crate::trailer::{self, TRAILER_LEN, TrailerCheck};
use crate::version::{CountryCode, GameVersion};

use game::{decode_section, encode_section};

/// A decoded save together with everything needed to write it back.
#[derive(Debug, Clone)]
pub struct SaveFile {
    pub save: SaveGame,
    country: CountryCode,
    version: GameVersion,
    backup: BackupMetaData,
    tail: Vec<u8>,
    layout: FileLayout,
    integrity: IntegrityStatus,
}

impl SaveFile {
    /// A default save valid at `version`.
    pub fn new(country: CountryCode, version: GameVersion) -> Result<Self> {
        version.ensure_supported()?;
        let mut ctx = SectionContext::new(version);
        let save = SaveGame::fresh(&mut ctx);
        Ok(Self {
            save,
            country,
            version,
            backup: BackupMetaData::new(),
            tail: Vec::new(),
            layout: FileLayout::default(),
            integrity: IntegrityStatus::Unchecked,
        })
    }

    pub fn open(bytes: &[u8]) -> Result<Self> {
        Self::open_with(bytes, &OpenOptions::default())
    }

    pub fn open_with(bytes: &[u8], options: &OpenOptions) -> Result<Self> {
        let (payload, stored) = trailer::split(bytes)?;
        let mut r = ByteReader::with_count_cap(payload, options.count_cap);
        let mut layout = FileLayout::default();

        let (country, version) = read_preamble(&mut r)?;
        layout.record(SectionId::Preamble, 0, r.position());
        info!(%country, %version, len = bytes.len(), "opening save");

        let mut ctx = SectionContext::new(version);
        let mut save = SaveGame::decode_body(&mut r, &mut ctx, &mut layout)?;
        save.string_table = decode_section(&mut r, &mut ctx, &mut layout)?;

        let tail_start = r.position();
        let tail = r.read_rest().to_vec();
        if !tail.is_empty() {
            debug!(bytes = tail.len(), "preserving unparsed tail");
            layout.record(SectionId::Tail, tail_start, payload.len());
        }
        layout.record(SectionId::Trailer, payload.len(), bytes.len());
        layout.file_len = bytes.len();
        layout.validate()?;

        let backup = BackupMetaData::load(&save.string_table);
        let check = TrailerCheck::new(country, payload, stored);
        let integrity = if check.matches() {
            IntegrityStatus::Verified
        } else {
            IntegrityStatus::Mismatch {
                stored: check.stored.clone(),
                computed: check.computed.clone(),
            }
        };

        let file = Self {
            save,
            country,
            version,
            backup,
            tail,
            layout,
            integrity,
        };

        if check.matches() {
            return Ok(file);
        }
        match options.integrity {
            IntegrityPolicy::Reject => Err(SaveErrorKind::IntegrityFailed {
                stored: check.stored,
                computed: check.computed,
                save: Box::new(file),
            }
            .into()),
            IntegrityPolicy::Accept => {
                warn!(
                    stored = %check.stored,
                    computed = %check.computed,
                    "integrity trailer mismatch accepted"
                );
                Ok(file)
            }
        }
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        self.encode_with_layout().map(|(bytes, _)| bytes)
    }

    /// Encode and report where each section landed.
    pub fn encode_with_layout(&self) -> Result<(Vec<u8>, FileLayout)> {
        let mut w = ByteWriter::with_capacity(self.layout.file_len);
        let mut layout = FileLayout::default();

        w.write_string(&SaveString::new(self.country.as_str()), "country")?;
        let raw_version = i32::try_from(self.version.get()).map_err(|_| {
            SaveError::invariant("game_version", format!("{} does not fit", self.version))
        })?;
        w.write_i32(raw_version);
        layout.record(SectionId::Preamble, 0, w.position());

        let mut ctx = SectionContext::new(self.version);
        self.save.encode_body(&mut w, &mut ctx, &mut layout)?;
        let table = self.backup.apply(&self.save.string_table)?;
        encode_section(table.as_ref(), &mut w, &mut ctx, &mut layout)?;

        if !self.tail.is_empty() {
            let start = w.position();
            w.write_bytes(&self.tail);
            layout.record(SectionId::Tail, start, w.position());
        }

        let payload_len = w.position();
        let digest = trailer::compute(self.country, w.as_slice());
        w.write_bytes(digest.as_bytes());
        layout.record(SectionId::Trailer, payload_len, payload_len + TRAILER_LEN);
        layout.file_len = w.position();
        layout.validate()?;

        debug!(len = layout.file_len, "encoded save");
        Ok((w.into_inner(), layout))
    }

    pub fn country(&self) -> CountryCode {
        self.country
    }

    pub fn set_country(&mut self, country: CountryCode) {
        self.country = country;
    }

    pub fn version(&self) -> GameVersion {
        self.version
    }

    /// Retarget the save. Catfruit slots are clamped to the new ceiling; other
    /// fields are left alone and the next encode fails if one of them cannot
    /// be represented at the new version.
    pub fn set_game_version(&mut self, version: GameVersion) -> Result<()> {
        version.ensure_supported()?;
        if version != self.version {
            info!(from = %self.version, to = %version, "changing game version");
            self.version = version;
            let clamped = self.save.catfruit.clamp_to(version);
            if clamped > 0 {
                debug!(slots = clamped, "clamped catfruit to the legacy ceiling");
            }
        }
        Ok(())
    }

    /// Layout recorded when the file was opened; empty for fresh saves.
    pub fn layout(&self) -> &FileLayout {
        &self.layout
    }

    pub fn integrity(&self) -> &IntegrityStatus {
        &self.integrity
    }

    /// Bytes between the string table and the trailer.
    pub fn tail(&self) -> &[u8] {
        &self.tail
    }

    pub fn backup(&self) -> &BackupMetaData {
        &self.backup
    }

    pub fn managed_items(&self) -> &[ManagedItem] {
        self.backup.items()
    }

    pub fn add_managed_item(&mut self, delta: i32, kind: ManagedItemType) {
        self.backup.record(delta, kind);
    }

    pub fn add_managed_item_with<R, C>(
        &mut self,
        delta: i32,
        kind: ManagedItemType,
        rng: &mut R,
        clock: &C,
    ) where
        R: RngCore + CryptoRng,
        C: Clock + ?Sized,
    {
        self.backup.record_with(delta, kind, rng, clock);
    }

    pub fn inquiry_code(&self) -> &str {
        self.save.counters.inquiry_code.as_str()
    }

    pub fn set_inquiry_code(&mut self, code: impl Into<String>) {
        self.save.counters.inquiry_code.set(code);
    }

    pub fn catfood(&self) -> i32 {
        self.save.counters.catfood
    }

    pub fn rare_tickets(&self) -> i32 {
        self.save.counters.rare_tickets
    }

    pub fn platinum_tickets(&self) -> i32 {
        self.save.counters.platinum_tickets
    }

    pub fn legend_tickets(&self) -> i32 {
        self.save.counters.legend_tickets
    }

    pub fn normal_tickets(&self) -> i32 {
        self.save.counters.normal_tickets
    }

    pub fn xp(&self) -> i32 {
        self.save.counters.xp
    }

    pub fn np(&self) -> i32 {
        self.save.counters.np
    }

    pub fn leadership(&self) -> i16 {
        self.save.counters.leadership
    }

    pub fn play_time(&self) -> i32 {
        self.save.counters.play_time
    }

    pub fn set_catfood(&mut self, value: i32) -> Result<()> {
        self.set_monetised(ManagedItemType::Catfood, value)
    }

    pub fn set_rare_tickets(&mut self, value: i32) -> Result<()> {
        self.set_monetised(ManagedItemType::RareTicket, value)
    }

    pub fn set_platinum_tickets(&mut self, value: i32) -> Result<()> {
        self.set_monetised(ManagedItemType::PlatinumTicket, value)
    }

    pub fn set_legend_tickets(&mut self, value: i32) -> Result<()> {
        self.set_monetised(ManagedItemType::LegendTicket, value)
    }

    pub fn set_normal_tickets(&mut self, value: i32) {
        self.save.counters.normal_tickets = value;
    }

    pub fn set_xp(&mut self, value: i32) {
        self.save.counters.xp = value;
    }

    pub fn set_np(&mut self, value: i32) {
        self.save.counters.np = value;
    }

    pub fn set_leadership(&mut self, value: i16) {
        self.save.counters.leadership = value;
    }

    /// Grow or shrink the cat list, keeping the gacha seen bitmap in step.
    pub fn set_cat_count(&mut self, count: usize) {
        self.save.cats.cats.resize(count, Cat::default());
        self.save.cats.talents.retain(|entry| {
            usize::try_from(entry.cat_id).is_ok_and(|id| id < count)
        });
        self.save.gatya.resize_seen(count);
    }

    /// Clamped to the per-slot ceiling of the current version.
    pub fn set_catfruit(&mut self, index: usize, amount: i32) -> Result<()> {
        self.save.catfruit.set(index, amount, self.version)
    }

    pub fn catfruit_max(&self) -> Option<i32> {
        Catfruit::slot_max(self.version)
    }

    fn monetised_field(&mut self, kind: ManagedItemType) -> &mut i32 {
        let counters = &mut self.save.counters;
        match kind {
            ManagedItemType::Catfood => &mut counters.catfood,
            ManagedItemType::RareTicket => &mut counters.rare_tickets,
            ManagedItemType::PlatinumTicket => &mut counters.platinum_tickets,
            ManagedItemType::LegendTicket => &mut counters.legend_tickets,
        }
    }

    fn set_monetised(&mut self, kind: ManagedItemType, value: i32) -> Result<()> {
        let current = *self.monetised_field(kind);
        let delta = value.checked_sub(current).ok_or_else(|| {
            SaveError::invariant(
                "managed_items",
                format!("{} delta from {current} to {value} overflows", kind.as_str()),
            )
        })?;
        self.backup.record(delta, kind);
        *self.monetised_field(kind) = value;
        Ok(())
    }

    /// Σ (base + 1 + plus) over owned cats and over special skills.
    pub fn user_rank(&self) -> u32 {
        let cats: i64 = self
            .save
            .cats
            .cats
            .iter()
            .filter(|cat| cat.is_owned())
            .map(|cat| i64::from(cat.base_level) + 1 + i64::from(cat.plus_level))
            .sum();
        let skills: i64 = self
            .save
            .special_skills
            .skills
            .iter()
            .map(|skill| i64::from(skill.base_level) + 1 + i64::from(skill.plus_level))
            .sum();
        u32::try_from((cats + skills).max(0)).unwrap_or(u32::MAX)
    }

    fn payload_context(&self) -> PayloadContext<'_> {
        PayloadContext {
            inquiry_code: self.inquiry_code(),
            play_time: self.play_time(),
            rank: self.user_rank(),
        }
    }

    /// Signed managed-item payload for upload.
    pub fn backup_payload(&self, save_key: Option<&str>) -> Result<String> {
        self.backup.build_payload(&self.payload_context(), save_key)
    }

    pub fn backup_payload_with_nonce(&self, save_key: Option<&str>, nonce: &str) -> Result<String> {
        self.backup
            .build_payload_with_nonce(&self.payload_context(), save_key, nonce)
    }
}

fn read_preamble(r: &mut ByteReader<'_>) -> Result<(CountryCode, GameVersion)> {
    let at = r.position();
    let code = r.read_string()?;
    let country = CountryCode::ALL
        .into_iter()
        .find(|country| country.as_str() == code.as_str())
        .ok_or_else(|| SaveError::invalid(at, format!("unknown country code {:?}", code.as_str())))?;
    let version = GameVersion::from_raw(r.read_i32()?)?;
    Ok((country, version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::sections::special_skills::SpecialSkill;

    fn fresh(version: u32) -> SaveFile {
        SaveFile::new(CountryCode::En, GameVersion::new(version)).unwrap()
    }

    #[test]
    fn fresh_save_round_trips() {
        let file = fresh(110_600);
        let (bytes, layout) = file.encode_with_layout().unwrap();
        assert_eq!(layout.file_len, bytes.len());

        let reopened = SaveFile::open(&bytes).unwrap();
        assert_eq!(reopened.integrity(), &IntegrityStatus::Verified);
        assert_eq!(reopened.version(), file.version());
        assert_eq!(reopened.save, file.save);
        assert_eq!(reopened.serialize().unwrap(), bytes);
        assert_eq!(reopened.layout().sections, layout.sections);
    }

    #[test]
    fn preamble_rejects_unknown_country() {
        let mut bytes = fresh(110_600).serialize().unwrap();
        bytes[4..6].copy_from_slice(b"xx");
        let err = SaveFile::open(&bytes).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidEncoding);
    }

    #[test]
    fn preamble_rejects_out_of_range_version() {
        let mut bytes = fresh(110_600).serialize().unwrap();
        bytes[6..10].copy_from_slice(&(-1i32).to_le_bytes());
        let err = SaveFile::open(&bytes).unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnsupportedVersion);
    }

    #[test]
    fn monetised_setters_record_deltas() {
        let mut file = fresh(110_600);
        file.set_catfood(50).unwrap();
        file.set_catfood(10).unwrap();
        file.set_catfood(10).unwrap();
        file.set_xp(1_000);

        let items = file.managed_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].amount, 50);
        assert_eq!(items[1].amount, 40);
        assert_eq!(file.backup().net_amount(ManagedItemType::Catfood), 10);
        assert_eq!(file.catfood(), 10);
        assert_eq!(file.xp(), 1_000);
    }

    #[test]
    fn user_rank_counts_owned_cats_and_skills() {
        let mut file = fresh(110_600);
        file.save.cats.cats = vec![
            Cat {
                owned: 1,
                base_level: 9,
                plus_level: 2,
                ..Cat::default()
            },
            Cat {
                owned: 0,
                base_level: 40,
                ..Cat::default()
            },
        ];
        file.save.special_skills.skills = vec![
            SpecialSkill {
                plus_level: 0,
                base_level: 4,
            };
            2
        ];
        assert_eq!(file.user_rank(), 12 + 5 + 5);
    }

    #[test]
    fn cat_count_resizes_seen_bitmap() {
        let mut file = fresh(110_600);
        file.set_cat_count(9);
        file.save.gatya.mark_seen(8);
        assert_eq!(file.save.gatya.seen, vec![0, 1]);

        let bytes = file.serialize().unwrap();
        let reopened = SaveFile::open(&bytes).unwrap();
        assert_eq!(reopened.save.cats.len(), 9);
        assert!(reopened.save.gatya.has_seen(8));
    }

    #[test]
    fn catfruit_setter_clamps_on_old_versions() {
        let mut old = fresh(110_300);
        old.set_catfruit(3, 500).unwrap();
        assert_eq!(old.save.catfruit.get(3), 128);

        let mut new = fresh(110_400);
        new.set_catfruit(3, 500).unwrap();
        assert_eq!(new.save.catfruit.get(3), 500);
        assert_eq!(new.catfruit_max(), None);
    }

    #[test]
    fn downgrade_clamps_stored_catfruit() {
        let mut file = fresh(110_400);
        file.set_catfruit(0, 500).unwrap();
        file.set_catfruit(1, 40).unwrap();

        file.set_game_version(GameVersion::new(110_300)).unwrap();
        assert_eq!(file.save.catfruit.get(0), 128);
        assert_eq!(file.save.catfruit.get(1), 40);

        let reopened = SaveFile::open(&file.serialize().unwrap()).unwrap();
        assert_eq!(reopened.save.catfruit.amounts, vec![128, 40]);
    }

    #[test]
    fn catfruit_index_past_the_bound_is_rejected() {
        let mut file = fresh(110_600);
        let err = file.set_catfruit(usize::MAX, 1).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvariantViolation);
        assert!(file.save.catfruit.amounts.is_empty());
    }

    #[test]
    fn set_game_version_rejects_unsupported() {
        let mut file = fresh(110_600);
        let err = file
            .set_game_version(GameVersion::new(1_000_000))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnsupportedVersion);
        assert_eq!(file.version(), GameVersion::new(110_600));
    }
}
