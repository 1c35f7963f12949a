use crate::dict::Dict;
use crate::error::Result;
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};

use super::{Section, SectionContext};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemPacks {
    pub purchased: Dict<i32, bool>,
    pub displayed: Dict<i32, bool>,
    pub three_day_started: bool,
    pub three_day_ends_at: f64,
}

impl Section for ItemPacks {
    const ID: SectionId = SectionId::ItemPacks;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let purchased = r.read_int_bool_dict()?;
        let displayed = if ctx.version >= 60_000 {
            r.read_int_bool_dict()?
        } else {
            Dict::new()
        };
        Ok(Self {
            purchased,
            displayed,
            three_day_started: r.read_bool()?,
            three_day_ends_at: r.read_f64()?,
        })
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        w.write_int_bool_dict(&self.purchased, "item_packs.purchased")?;
        if ctx.version >= 60_000 {
            w.write_int_bool_dict(&self.displayed, "item_packs.displayed")?;
        }
        w.write_bool(self.three_day_started);
        w.write_f64(self.three_day_ends_at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::{ctx, encode, round_trip};

    #[test]
    fn three_day_block_is_always_present() {
        let packs = ItemPacks {
            three_day_started: true,
            three_day_ends_at: 12.5,
            ..ItemPacks::default()
        };
        let old = encode(&packs, &ctx(50_000));
        assert_eq!(old.len(), 4 + 1 + 8);
        let new = encode(&packs, &ctx(60_000));
        assert_eq!(new.len(), 4 + 4 + 1 + 8);
        let decoded: ItemPacks = round_trip(&new, &ctx(60_000));
        assert_eq!(decoded.three_day_ends_at, 12.5);
    }
}
