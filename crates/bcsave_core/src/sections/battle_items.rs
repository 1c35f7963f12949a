use crate::error::Result;
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};

use super::{Section, SectionContext};

pub const BATTLE_ITEM_COUNT: usize = 6;

pub const BATTLE_ITEM_NAMES: [&str; BATTLE_ITEM_COUNT] = [
    "Speed Up",
    "Treasure Radar",
    "Rich Cat",
    "Cat CPU",
    "Cat Jobs",
    "Sniper the Cat",
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BattleItems {
    pub amounts: [i32; BATTLE_ITEM_COUNT],
    /// Whether the item selection is locked between battles.
    pub locked: bool,
}

impl Section for BattleItems {
    const ID: SectionId = SectionId::BattleItems;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let mut amounts = [0i32; BATTLE_ITEM_COUNT];
        for slot in &mut amounts {
            *slot = r.read_i32()?;
        }
        let locked = if ctx.version >= 90_000 {
            r.read_bool()?
        } else {
            false
        };
        Ok(Self { amounts, locked })
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        w.write_int_list(&self.amounts);
        if ctx.version >= 90_000 {
            w.write_bool(self.locked);
        }
        Ok(())
    }
}
