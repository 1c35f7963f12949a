use crate::error::Result;
use crate::layout::SectionId;
use crate::sections::{Section, SectionContext, check_len};
use crate::stream::{ByteReader, ByteWriter};

/// Empire of Cats, Into the Future and Cats of the Cosmos, three parts each,
/// plus the fixed filler chapter slot.
pub const STORY_CHAPTERS: usize = 10;
pub const STORY_STAGES: usize = 51;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryChapter {
    pub selected_stage: i32,
    pub progress: i32,
    pub clears: Vec<i32>,
    pub treasures: Vec<i32>,
    pub festival: i32,
}

impl Default for StoryChapter {
    fn default() -> Self {
        Self {
            selected_stage: 0,
            progress: 0,
            clears: vec![0; STORY_STAGES],
            treasures: vec![0; STORY_STAGES],
            festival: 0,
        }
    }
}

impl StoryChapter {
    pub fn clear_all(&mut self) {
        for clears in &mut self.clears {
            *clears = (*clears).max(1);
        }
        self.progress = STORY_STAGES as i32;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    pub chapters: Vec<StoryChapter>,
}

impl Section for Story {
    const ID: SectionId = SectionId::Story;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self {
            chapters: vec![StoryChapter::default(); STORY_CHAPTERS],
        }
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let mut chapters = vec![StoryChapter::default(); STORY_CHAPTERS];
        for chapter in &mut chapters {
            chapter.selected_stage = r.read_i32()?;
        }
        for chapter in &mut chapters {
            chapter.progress = r.read_i32()?;
        }
        for chapter in &mut chapters {
            chapter.clears = r.read_int_list(STORY_STAGES)?;
        }
        for chapter in &mut chapters {
            chapter.treasures = r.read_int_list(STORY_STAGES)?;
        }
        if ctx.version >= 50_000 {
            for chapter in &mut chapters {
                chapter.festival = r.read_i32()?;
            }
        }
        Ok(Self { chapters })
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        check_len("story", self.chapters.len(), STORY_CHAPTERS)?;
        for chapter in &self.chapters {
            check_len("story.clears", chapter.clears.len(), STORY_STAGES)?;
            check_len("story.treasures", chapter.treasures.len(), STORY_STAGES)?;
        }
        for chapter in &self.chapters {
            w.write_i32(chapter.selected_stage);
        }
        for chapter in &self.chapters {
            w.write_i32(chapter.progress);
        }
        for chapter in &self.chapters {
            w.write_int_list(&chapter.clears);
        }
        for chapter in &self.chapters {
            w.write_int_list(&chapter.treasures);
        }
        if ctx.version >= 50_000 {
            for chapter in &self.chapters {
                w.write_i32(chapter.festival);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::{ctx, encode, round_trip};

    #[test]
    fn fixed_geometry_with_late_festival_block() {
        let mut story = Story::fresh(&ctx(1));
        story.chapters[3].clear_all();
        story.chapters[9].treasures[50] = 3;
        let base = (10 + 10 + 510 + 510) * 4;
        assert_eq!(encode(&story, &ctx(40_000)).len(), base);
        let bytes = encode(&story, &ctx(50_000));
        assert_eq!(bytes.len(), base + 40);
        let decoded: Story = round_trip(&bytes, &ctx(50_000));
        assert_eq!(decoded.chapters[3].progress, 51);
        assert_eq!(decoded.chapters[9].treasures[50], 3);
    }
}
