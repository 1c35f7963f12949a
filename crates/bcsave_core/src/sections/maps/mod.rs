//! Stage maps.
//!
//! Most map kinds share a chapter × star tier × stage grid. Each kind is its
//! own section type because the geometry header and trailing fields differ
//! between them.

pub mod chapters;
pub mod dojo;
pub mod enigma;
pub mod ex_stages;
pub mod item_reward;
pub mod outbreaks;
pub mod story;
pub mod timed_score;

use std::fmt::Debug;

use crate::error::{Result, SaveError};
use crate::stream::{ByteReader, ByteWriter};

/// Width of a per-stage clear counter.
pub trait ClearWord: Copy + Default + PartialEq + Debug {
    const WIDTH: usize;

    fn read(r: &mut ByteReader<'_>) -> Result<Self>;

    fn write(self, w: &mut ByteWriter);
}

impl ClearWord for i32 {
    const WIDTH: usize = 4;

    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        r.read_i32()
    }

    fn write(self, w: &mut ByteWriter) {
        w.write_i32(self);
    }
}

impl ClearWord for i16 {
    const WIDTH: usize = 2;

    fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        r.read_i16()
    }

    fn write(self, w: &mut ByteWriter) {
        w.write_i16(self);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub chapters: usize,
    pub stars: usize,
    pub stages: usize,
}

impl Geometry {
    pub const fn new(chapters: usize, stars: usize, stages: usize) -> Self {
        Self {
            chapters,
            stars,
            stages,
        }
    }

    pub fn tiers(&self) -> usize {
        self.chapters.saturating_mul(self.stars)
    }

    pub fn cells(&self) -> usize {
        self.tiers().saturating_mul(self.stages)
    }

    /// `i32` chapters, stars, stages.
    pub(crate) fn read_ints(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self::new(r.read_count()?, r.read_count()?, r.read_count()?))
    }

    pub(crate) fn write_ints(&self, w: &mut ByteWriter, field: &'static str) -> Result<()> {
        w.write_count(self.chapters, field)?;
        w.write_count(self.stars, field)?;
        w.write_count(self.stages, field)
    }

    /// `i32` chapters, `u8` stars, `u8` stages.
    pub(crate) fn read_compact(r: &mut ByteReader<'_>) -> Result<Self> {
        Ok(Self::new(
            r.read_count()?,
            r.read_byte_count()?,
            r.read_byte_count()?,
        ))
    }

    pub(crate) fn write_compact(&self, w: &mut ByteWriter, field: &'static str) -> Result<()> {
        w.write_count(self.chapters, field)?;
        w.write_byte_count(self.stars, field)?;
        w.write_byte_count(self.stages, field)
    }
}

/// Clear state for `chapters × stars × stages`, stored flat and chapter-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterGrid<W: ClearWord = i32> {
    pub geometry: Geometry,
    /// Highest cleared stage per chapter and star tier.
    pub clear_progress: Vec<i32>,
    pub clears: Vec<W>,
    pub unlock_state: Vec<i32>,
}

impl<W: ClearWord> Default for ChapterGrid<W> {
    fn default() -> Self {
        Self::new(Geometry::default())
    }
}

impl<W: ClearWord> ChapterGrid<W> {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            clear_progress: vec![0; geometry.tiers()],
            clears: vec![W::default(); geometry.cells()],
            unlock_state: vec![0; geometry.tiers()],
        }
    }

    fn tier_index(&self, chapter: usize, star: usize) -> Option<usize> {
        (chapter < self.geometry.chapters && star < self.geometry.stars)
            .then_some(chapter * self.geometry.stars + star)
    }

    pub fn stage_clears(&self, chapter: usize, star: usize) -> Option<&[W]> {
        let tier = self.tier_index(chapter, star)?;
        let start = tier * self.geometry.stages;
        self.clears.get(start..start + self.geometry.stages)
    }

    pub fn set_stage_clear(&mut self, chapter: usize, star: usize, stage: usize, value: W) -> bool {
        let Some(tier) = self.tier_index(chapter, star) else {
            return false;
        };
        if stage >= self.geometry.stages {
            return false;
        }
        match self.clears.get_mut(tier * self.geometry.stages + stage) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Mark every stage of one star tier cleared once and advance progress.
    pub fn clear_tier(&mut self, chapter: usize, star: usize, cleared: W) -> bool {
        let Some(tier) = self.tier_index(chapter, star) else {
            return false;
        };
        let stages = self.geometry.stages;
        let start = tier * stages;
        let Some(cells) = self.clears.get_mut(start..start + stages) else {
            return false;
        };
        for cell in cells {
            if *cell == W::default() {
                *cell = cleared;
            }
        }
        if let Some(progress) = self.clear_progress.get_mut(tier) {
            *progress = i32::try_from(stages).unwrap_or(i32::MAX);
        }
        true
    }

    pub(crate) fn decode(r: &mut ByteReader<'_>, geometry: Geometry) -> Result<Self> {
        let at = r.position();
        let needed = geometry
            .tiers()
            .saturating_mul(8)
            .saturating_add(geometry.cells().saturating_mul(W::WIDTH));
        if needed > r.remaining() {
            return Err(SaveError::truncated(at, needed, r.remaining()));
        }
        let clear_progress = r.read_int_list(geometry.tiers())?;
        let mut clears = Vec::with_capacity(geometry.cells());
        for _ in 0..geometry.cells() {
            clears.push(W::read(r)?);
        }
        let unlock_state = r.read_int_list(geometry.tiers())?;
        Ok(Self {
            geometry,
            clear_progress,
            clears,
            unlock_state,
        })
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter, field: &'static str) -> Result<()> {
        self.check(field)?;
        w.write_int_list(&self.clear_progress);
        for &cell in &self.clears {
            cell.write(w);
        }
        w.write_int_list(&self.unlock_state);
        Ok(())
    }

    /// Every chapter carries exactly `stars` tiers of exactly `stages` stages.
    pub(crate) fn check(&self, field: &'static str) -> Result<()> {
        let g = self.geometry;
        if self.clear_progress.len() != g.tiers()
            || self.unlock_state.len() != g.tiers()
            || self.clears.len() != g.cells()
        {
            return Err(SaveError::invariant(
                field,
                format!(
                    "grid {}x{}x{} holds {} progress, {} clears, {} unlock entries",
                    g.chapters,
                    g.stars,
                    g.stages,
                    self.clear_progress.len(),
                    self.clears.len(),
                    self.unlock_state.len()
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn progress_precedes_stage_blocks() {
        let mut grid: ChapterGrid = ChapterGrid::new(Geometry::new(2, 2, 3));
        grid.clear_progress[3] = 9;
        assert!(grid.set_stage_clear(1, 0, 2, 5));
        assert!(!grid.set_stage_clear(2, 0, 0, 1));

        let mut w = ByteWriter::new();
        grid.encode(&mut w, "grid").unwrap();
        let bytes = w.into_inner();
        assert_eq!(bytes.len(), (4 + 12 + 4) * 4);
        assert_eq!(&bytes[12..16], &9i32.to_le_bytes());
        // progress (4 ints), then chapter 1 star 0 stage 2 is cell 8
        assert_eq!(&bytes[(4 + 8) * 4..(4 + 9) * 4], &5i32.to_le_bytes());

        let mut r = ByteReader::new(&bytes);
        let decoded: ChapterGrid = ChapterGrid::decode(&mut r, grid.geometry).unwrap();
        assert_eq!(decoded, grid);
        assert_eq!(decoded.stage_clears(1, 0), Some(&[0, 0, 5][..]));
    }

    #[test]
    fn ragged_grid_is_rejected() {
        let mut grid: ChapterGrid<i16> = ChapterGrid::new(Geometry::new(1, 3, 2));
        grid.clears.pop();
        let mut w = ByteWriter::new();
        let err = grid.encode(&mut w, "grid").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvariantViolation);
    }

    #[test]
    fn oversized_geometry_truncates_before_allocating() {
        let bytes = [0u8; 16];
        let mut r = ByteReader::new(&bytes);
        let err = ChapterGrid::<i32>::decode(&mut r, Geometry::new(1 << 20, 3, 48)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Truncated);
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn clearing_a_tier_sets_progress() {
        let mut grid: ChapterGrid = ChapterGrid::new(Geometry::new(1, 1, 4));
        grid.set_stage_clear(0, 0, 1, 7);
        assert!(grid.clear_tier(0, 0, 1));
        assert_eq!(grid.stage_clears(0, 0), Some(&[1, 7, 1, 1][..]));
        assert_eq!(grid.clear_progress[0], 4);
    }
}
