use crate::error::{Result, SaveError};
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};
use crate::version::GameVersion;

use super::{Section, SectionContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TalentOrb {
    pub id: i16,
    pub value: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TalentOrbs {
    pub orbs: Vec<TalentOrb>,
}

impl TalentOrbs {
    pub fn get(&self, id: i16) -> Option<u16> {
        self.orbs.iter().find(|orb| orb.id == id).map(|orb| orb.value)
    }

    pub fn set(&mut self, id: i16, value: u16) {
        match self.orbs.iter_mut().find(|orb| orb.id == id) {
            Some(orb) => orb.value = value,
            None => self.orbs.push(TalentOrb { id, value }),
        }
    }
}

impl Section for TalentOrbs {
    const ID: SectionId = SectionId::TalentOrbs;

    fn is_present(version: GameVersion) -> bool {
        version >= 100_200
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let count = r.read_short_count()?;
        let wide = ctx.version >= 110_400;
        let mut orbs = Vec::with_capacity(count.min(r.remaining() / 3));
        for _ in 0..count {
            let id = r.read_i16()?;
            let value = if wide {
                r.read_u16()?
            } else {
                u16::from(r.read_u8()?)
            };
            orbs.push(TalentOrb { id, value });
        }
        Ok(Self { orbs })
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        w.write_short_count(self.orbs.len(), "talent_orbs")?;
        let wide = ctx.version >= 110_400;
        for orb in &self.orbs {
            w.write_i16(orb.id);
            if wide {
                w.write_u16(orb.value);
            } else {
                let narrow = u8::try_from(orb.value).map_err(|_| {
                    SaveError::invariant(
                        "talent_orbs",
                        format!("orb {} holds {}, above 255", orb.id, orb.value),
                    )
                })?;
                w.write_u8(narrow);
            }
        }
        Ok(())
    }
}
