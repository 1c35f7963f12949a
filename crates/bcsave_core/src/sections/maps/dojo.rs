use crate::dict::Dict;
use crate::error::Result;
use crate::layout::SectionId;
use crate::sections::{Section, SectionContext};
use crate::stream::{ByteReader, ByteWriter};
use crate::version::GameVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DojoChapter {
    pub chapter_id: i32,
    pub stage_scores: Dict<i32, i32>,
}

/// Dojo scores and the current ranking season.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dojo {
    pub chapters: Vec<DojoChapter>,
    pub ranking_score: i32,
    pub submitted: bool,
    pub rewards_claimed: bool,
    pub season_start: f64,
    pub season_end: f64,
}

impl Section for Dojo {
    const ID: SectionId = SectionId::Dojo;

    fn is_present(version: GameVersion) -> bool {
        version >= 90_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let n = r.read_count()?;
        let mut chapters = Vec::with_capacity(n.min(r.remaining() / 8));
        for _ in 0..n {
            chapters.push(DojoChapter {
                chapter_id: r.read_i32()?,
                stage_scores: r.read_int_int_dict()?,
            });
        }
        let mut dojo = Dojo {
            chapters,
            ranking_score: r.read_i32()?,
            submitted: r.read_bool()?,
            rewards_claimed: r.read_bool()?,
            ..Dojo::default()
        };
        if ctx.version >= 100_000 {
            dojo.season_start = r.read_f64()?;
            dojo.season_end = r.read_f64()?;
        }
        Ok(dojo)
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        w.write_count(self.chapters.len(), "dojo")?;
        for chapter in &self.chapters {
            w.write_i32(chapter.chapter_id);
            w.write_int_int_dict(&chapter.stage_scores, "dojo.stage_scores")?;
        }
        w.write_i32(self.ranking_score);
        w.write_bool(self.submitted);
        w.write_bool(self.rewards_claimed);
        if ctx.version >= 100_000 {
            w.write_f64(self.season_start);
            w.write_f64(self.season_end);
        }
        Ok(())
    }
}
