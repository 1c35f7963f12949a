use crate::dict::Dict;
use crate::error::{Result, SaveError};
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};

use super::{Section, SectionContext};

/// Gacha state: roll seeds, per-banner roll counts and the cats-seen bitmap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Gatya {
    pub rare_seed: u32,
    pub normal_seed: u32,
    pub event_seed: u32,
    pub trade_progress: i32,
    pub rolls: Dict<i32, i32>,
    pub step_up: Dict<i32, i32>,
    /// One bit per cat, least significant bit first. Its length is fixed by
    /// the cat count.
    pub seen: Vec<u8>,
    pub guaranteed: Dict<i32, bool>,
}

pub(crate) fn bitmap_len(cat_count: usize) -> usize {
    cat_count.div_ceil(8)
}

impl Gatya {
    /// Keep the bitmap in step with a changed cat count.
    pub fn resize_seen(&mut self, cat_count: usize) {
        self.seen.resize(bitmap_len(cat_count), 0);
    }

    pub fn has_seen(&self, cat_id: usize) -> bool {
        self.seen
            .get(cat_id / 8)
            .is_some_and(|byte| byte & (1 << (cat_id % 8)) != 0)
    }

    pub fn mark_seen(&mut self, cat_id: usize) {
        if let Some(byte) = self.seen.get_mut(cat_id / 8) {
            *byte |= 1 << (cat_id % 8);
        }
    }
}

impl Section for Gatya {
    const ID: SectionId = SectionId::Gatya;

    fn fresh(ctx: &SectionContext) -> Self {
        Self {
            seen: vec![0; bitmap_len(ctx.cat_count)],
            ..Self::default()
        }
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let v = ctx.version;
        let mut gatya = Gatya {
            rare_seed: r.read_u32()?,
            normal_seed: r.read_u32()?,
            ..Gatya::default()
        };
        if v >= 33 {
            gatya.event_seed = r.read_u32()?;
        }
        gatya.trade_progress = r.read_i32()?;
        gatya.rolls = r.read_int_int_dict()?;
        if v >= 90_000 {
            gatya.step_up = r.read_int_int_dict()?;
        }
        gatya.seen = r.read_bytes(bitmap_len(ctx.cat_count))?.to_vec();
        if v >= 100_000 {
            gatya.guaranteed = r.read_int_bool_dict()?;
        }
        Ok(gatya)
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        let v = ctx.version;
        w.write_u32(self.rare_seed);
        w.write_u32(self.normal_seed);
        if v >= 33 {
            w.write_u32(self.event_seed);
        }
        w.write_i32(self.trade_progress);
        w.write_int_int_dict(&self.rolls, "gatya.rolls")?;
        if v >= 90_000 {
            w.write_int_int_dict(&self.step_up, "gatya.step_up")?;
        }
        let expected = bitmap_len(ctx.cat_count);
        if self.seen.len() != expected {
            return Err(SaveError::invariant(
                "gatya.seen",
                format!(
                    "bitmap holds {} bytes, {} cats need {expected}",
                    self.seen.len(),
                    ctx.cat_count
                ),
            ));
        }
        w.write_bytes(&self.seen);
        if v >= 100_000 {
            w.write_int_bool_dict(&self.guaranteed, "gatya.guaranteed")?;
        }
        Ok(())
    }
}
