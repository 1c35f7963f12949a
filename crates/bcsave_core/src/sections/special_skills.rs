use crate::error::Result;
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};

use super::{Section, SectionContext, check_len};

pub const LEGACY_SKILL_COUNT: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecialSkill {
    pub plus_level: i32,
    /// Zero-based, like cat levels.
    pub base_level: i32,
}

/// Base upgrades bought with XP (cannon power, worker cat, wallet, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialSkills {
    pub skills: Vec<SpecialSkill>,
}

impl Section for SpecialSkills {
    const ID: SectionId = SectionId::SpecialSkills;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self {
            skills: vec![SpecialSkill::default(); LEGACY_SKILL_COUNT],
        }
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let count = if ctx.version < 60_000 {
            LEGACY_SKILL_COUNT
        } else {
            r.read_count()?
        };
        let mut skills = Vec::with_capacity(count.min(r.remaining() / 8));
        for _ in 0..count {
            skills.push(SpecialSkill {
                plus_level: r.read_i32()?,
                base_level: r.read_i32()?,
            });
        }
        Ok(Self { skills })
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        if ctx.version < 60_000 {
            check_len("special_skills", self.skills.len(), LEGACY_SKILL_COUNT)?;
        } else {
            w.write_count(self.skills.len(), "special_skills")?;
        }
        for skill in &self.skills {
            w.write_i32(skill.plus_level);
            w.write_i32(skill.base_level);
        }
        Ok(())
    }
}
