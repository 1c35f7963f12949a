use crate::error::{Result, SaveError};
use crate::layout::SectionId;
use crate::sections::{Section, SectionContext, check_len};
use crate::stream::{ByteReader, ByteWriter};
use crate::version::GameVersion;

pub const LEGACY_SUBCHAPTERS: usize = 50;
pub const LEGACY_STAGES: usize = 12;
pub const LEGACY_STARS: usize = 3;

/// Best times for timed-score stages, subchapter-major, then stage, then star.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedScore {
    pub subchapters: usize,
    pub stages: usize,
    pub stars: usize,
    pub scores: Vec<i32>,
}

impl TimedScore {
    pub fn new(subchapters: usize, stages: usize, stars: usize) -> Self {
        Self {
            subchapters,
            stages,
            stars,
            scores: vec![0; subchapters * stages * stars],
        }
    }

    fn cells(&self) -> usize {
        self.subchapters
            .saturating_mul(self.stages)
            .saturating_mul(self.stars)
    }

    pub fn score(&self, subchapter: usize, stage: usize, star: usize) -> Option<i32> {
        if subchapter >= self.subchapters || stage >= self.stages || star >= self.stars {
            return None;
        }
        self.scores
            .get((subchapter * self.stages + stage) * self.stars + star)
            .copied()
    }

    fn require_fixed(&self, subchapters: Option<usize>) -> Result<()> {
        let subchapters_ok = subchapters.is_none_or(|fixed| fixed == self.subchapters);
        if !subchapters_ok || self.stages != LEGACY_STAGES || self.stars != LEGACY_STARS {
            return Err(SaveError::invariant(
                "timed_score",
                format!(
                    "geometry {}x{}x{} has no fixed encoding at this version",
                    self.subchapters, self.stages, self.stars
                ),
            ));
        }
        Ok(())
    }
}

impl Section for TimedScore {
    const ID: SectionId = SectionId::TimedScore;

    fn is_present(version: GameVersion) -> bool {
        version >= 20
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::new(LEGACY_SUBCHAPTERS, LEGACY_STAGES, LEGACY_STARS)
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let v = ctx.version;
        let (subchapters, stages, stars) = if v <= 33 {
            (LEGACY_SUBCHAPTERS, LEGACY_STAGES, LEGACY_STARS)
        } else if v == 34 {
            (r.read_count()?, LEGACY_STAGES, LEGACY_STARS)
        } else {
            (r.read_count()?, r.read_count()?, r.read_count()?)
        };
        let cells = subchapters.saturating_mul(stages).saturating_mul(stars);
        let at = r.position();
        if cells.saturating_mul(4) > r.remaining() {
            return Err(SaveError::truncated(at, cells.saturating_mul(4), r.remaining()));
        }
        Ok(Self {
            subchapters,
            stages,
            stars,
            scores: r.read_int_list(cells)?,
        })
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        let v = ctx.version;
        if v <= 33 {
            self.require_fixed(Some(LEGACY_SUBCHAPTERS))?;
        } else if v == 34 {
            self.require_fixed(None)?;
            w.write_count(self.subchapters, "timed_score")?;
        } else {
            w.write_count(self.subchapters, "timed_score")?;
            w.write_count(self.stages, "timed_score")?;
            w.write_count(self.stars, "timed_score")?;
        }
        check_len("timed_score", self.scores.len(), self.cells())?;
        w.write_int_list(&self.scores);
        Ok(())
    }
}
