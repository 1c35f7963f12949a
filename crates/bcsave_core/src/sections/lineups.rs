use crate::error::{Result, SaveError};
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter, SaveString};

use super::{Section, SectionContext, check_len};

pub const SLOT_WIDTH: usize = 10;
pub const LEGACY_SLOT_COUNT: usize = 10;
pub const LEGACY_NAME_COUNT: usize = 15;

/// Cat id of an empty line-up position.
pub const EMPTY_SLOT: i32 = -1;

pub type Slot = [i32; SLOT_WIDTH];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipSlots {
    pub slots: Vec<Slot>,
}

impl Section for EquipSlots {
    const ID: SectionId = SectionId::EquipSlots;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self {
            slots: vec![[EMPTY_SLOT; SLOT_WIDTH]; LEGACY_SLOT_COUNT],
        }
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let count = if ctx.version < 90_700 {
            LEGACY_SLOT_COUNT
        } else {
            r.read_byte_count()?
        };
        let mut slots = Vec::with_capacity(count);
        for _ in 0..count {
            let mut slot = [0i32; SLOT_WIDTH];
            for cat in &mut slot {
                *cat = r.read_i32()?;
            }
            slots.push(slot);
        }
        Ok(Self { slots })
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        if ctx.version < 90_700 {
            check_len("equip_slots", self.slots.len(), LEGACY_SLOT_COUNT)?;
        } else {
            w.write_byte_count(self.slots.len(), "equip_slots")?;
        }
        for slot in &self.slots {
            w.write_int_list(slot);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineups {
    pub unlocked: u8,
    /// The raw flag list from an old save, written back verbatim while it
    /// still agrees with `unlocked`.
    pub legacy_flags: Option<[bool; LEGACY_SLOT_COUNT]>,
    pub selected: i32,
    pub names: Vec<SaveString>,
}

impl Lineups {
    fn legacy_flags_for_write(&self) -> Result<[bool; LEGACY_SLOT_COUNT]> {
        let count = usize::from(self.unlocked);
        if let Some(flags) = self.legacy_flags
            && flags.iter().filter(|&&set| set).count() == count
        {
            return Ok(flags);
        }
        if count > LEGACY_SLOT_COUNT {
            return Err(SaveError::invariant(
                "lineups.unlocked",
                format!("{count} unlocked slots do not fit {LEGACY_SLOT_COUNT} flags"),
            ));
        }
        let mut flags = [false; LEGACY_SLOT_COUNT];
        for flag in flags.iter_mut().take(count) {
            *flag = true;
        }
        Ok(flags)
    }
}

impl Section for Lineups {
    const ID: SectionId = SectionId::Lineups;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self {
            unlocked: 1,
            legacy_flags: None,
            selected: 0,
            names: vec![SaveString::default(); LEGACY_NAME_COUNT],
        }
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let v = ctx.version;
        let (unlocked, legacy_flags) = if v < 90_700 {
            let mut flags = [false; LEGACY_SLOT_COUNT];
            for flag in &mut flags {
                *flag = r.read_bool()?;
            }
            let count = flags.iter().filter(|&&set| set).count();
            (count as u8, Some(flags))
        } else {
            (r.read_u8()?, None)
        };
        let selected = r.read_i32()?;
        let name_count = if v < 110_600 {
            LEGACY_NAME_COUNT
        } else {
            r.read_byte_count()?
        };
        let mut names = Vec::with_capacity(name_count);
        for _ in 0..name_count {
            names.push(r.read_string()?);
        }
        Ok(Self {
            unlocked,
            legacy_flags,
            selected,
            names,
        })
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        let v = ctx.version;
        if v < 90_700 {
            w.write_bool_list(&self.legacy_flags_for_write()?);
        } else {
            w.write_u8(self.unlocked);
        }
        w.write_i32(self.selected);
        if v < 110_600 {
            check_len("lineups.names", self.names.len(), LEGACY_NAME_COUNT)?;
        } else {
            w.write_byte_count(self.names.len(), "lineups.names")?;
        }
        for name in &self.names {
            w.write_string(name, "lineups.names")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::sections::test_support::{ctx, encode, round_trip};

    fn legacy_bytes(flags: [bool; LEGACY_SLOT_COUNT]) -> Vec<u8> {
        let mut bytes: Vec<u8> = flags.iter().map(|&f| u8::from(f)).collect();
        bytes.extend_from_slice(&2i32.to_le_bytes());
        for _ in 0..LEGACY_NAME_COUNT {
            bytes.extend_from_slice(&0i32.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn unlocked_flags_collapse_to_a_count_at_90700() {
        let flags = [true, true, true, true, true, false, false, false, false, false];
        let bytes = legacy_bytes(flags);
        let lineups: Lineups = round_trip(&bytes, &ctx(90_600));
        assert_eq!(lineups.unlocked, 5);

        let widened = encode(&lineups, &ctx(90_700));
        assert_eq!(widened[0], 0x05);
        assert_eq!(widened.len(), bytes.len() - LEGACY_SLOT_COUNT + 1);
    }

    #[test]
    fn scattered_legacy_flags_survive_unchanged() {
        let flags = [true, false, true, false, false, false, false, false, false, true];
        let lineups: Lineups = round_trip(&legacy_bytes(flags), &ctx(80_000));
        assert_eq!(lineups.unlocked, 3);
    }

    #[test]
    fn changed_count_rewrites_leading_flags() {
        let flags = [true, false, true, false, false, false, false, false, false, false];
        let mut lineups: Lineups = round_trip(&legacy_bytes(flags), &ctx(80_000));
        lineups.unlocked = 4;
        let bytes = encode(&lineups, &ctx(80_000));
        assert_eq!(&bytes[..LEGACY_SLOT_COUNT], &[1, 1, 1, 1, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn names_need_a_count_from_110600() {
        let mut lineups = Lineups::fresh(&ctx(110_600));
        lineups.names.truncate(2);
        lineups.names[0].set("main");
        let decoded: Lineups = round_trip(&encode(&lineups, &ctx(110_600)), &ctx(110_600));
        assert_eq!(decoded.names[0].as_str(), "main");

        let mut w = ByteWriter::new();
        let err = lineups.encode(&mut w, &ctx(110_500)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvariantViolation);
    }

    #[test]
    fn slot_count_prefix_appears_at_90700() {
        let slots = EquipSlots::fresh(&ctx(90_600));
        assert_eq!(encode(&slots, &ctx(90_600)).len(), 400);
        assert_eq!(encode(&slots, &ctx(90_700)).len(), 401);
        let _: EquipSlots = round_trip(&encode(&slots, &ctx(90_700)), &ctx(90_700));
    }
}
