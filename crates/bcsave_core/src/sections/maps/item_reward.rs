use crate::error::Result;
use crate::layout::SectionId;
use crate::sections::{Section, SectionContext};
use crate::stream::{ByteReader, ByteWriter};
use crate::version::GameVersion;

/// First-clear item rewards; each chapter has its own stage count.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemReward {
    pub chapters: Vec<Vec<bool>>,
}

impl Section for ItemReward {
    const ID: SectionId = SectionId::ItemReward;

    fn is_present(version: GameVersion) -> bool {
        version >= 20
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        let n = r.read_count()?;
        let mut chapters = Vec::with_capacity(n.min(r.remaining() / 4));
        for _ in 0..n {
            chapters.push(r.read_bool_list_prefixed()?);
        }
        Ok(Self { chapters })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        w.write_count(self.chapters.len(), "item_reward")?;
        for chapter in &self.chapters {
            w.write_bool_list_prefixed(chapter, "item_reward")?;
        }
        Ok(())
    }
}
