use crate::error::Result;
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};

use super::{Section, SectionContext};

pub const STAMP_SLOTS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Stamps {
    pub current: i32,
    pub collected: [i32; STAMP_SLOTS],
    pub u1: i32,
    pub daily_reward: i32,
}

impl Section for Stamps {
    const ID: SectionId = SectionId::Stamps;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let current = r.read_i32()?;
        let mut collected = [0i32; STAMP_SLOTS];
        for slot in &mut collected {
            *slot = r.read_i32()?;
        }
        let u1 = r.read_i32()?;
        let daily_reward = if ctx.version >= 60_000 {
            r.read_i32()?
        } else {
            0
        };
        Ok(Self {
            current,
            collected,
            u1,
            daily_reward,
        })
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        w.write_i32(self.current);
        w.write_int_list(&self.collected);
        w.write_i32(self.u1);
        if ctx.version >= 60_000 {
            w.write_i32(self.daily_reward);
        }
        Ok(())
    }
}
