use crate::error::Result;
use crate::layout::SectionId;
use crate::sections::{Section, SectionContext, check_len};
use crate::stream::{ByteReader, ByteWriter};
use crate::version::GameVersion;

pub const EX_CHAPTERS: usize = 12;
pub const EX_STAGES: usize = 12;

/// Extra stages unlocked from the story, one clear count per stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExStages {
    pub chapters: Vec<Vec<i32>>,
}

impl Section for ExStages {
    const ID: SectionId = SectionId::ExStages;

    fn is_present(version: GameVersion) -> bool {
        version >= 40
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self {
            chapters: vec![vec![0; EX_STAGES]; EX_CHAPTERS],
        }
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        let mut chapters = Vec::with_capacity(EX_CHAPTERS);
        for _ in 0..EX_CHAPTERS {
            chapters.push(r.read_int_list(EX_STAGES)?);
        }
        Ok(Self { chapters })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        check_len("ex_stages", self.chapters.len(), EX_CHAPTERS)?;
        for chapter in &self.chapters {
            check_len("ex_stages", chapter.len(), EX_STAGES)?;
            w.write_int_list(chapter);
        }
        Ok(())
    }
}

/// Challenge battle high score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Challenge {
    pub score: i32,
    pub shown_popup: bool,
}

impl Section for Challenge {
    const ID: SectionId = SectionId::Challenge;

    fn is_present(version: GameVersion) -> bool {
        version >= 50_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        Ok(Self {
            score: r.read_i32()?,
            shown_popup: r.read_bool()?,
        })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        w.write_i32(self.score);
        w.write_bool(self.shown_popup);
        Ok(())
    }
}
