use crate::dict::Dict;
use crate::error::Result;
use crate::layout::SectionId;
use crate::sections::{Section, SectionContext};
use crate::stream::{ByteReader, ByteWriter};
use crate::version::GameVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutbreakChapter {
    pub chapter: i32,
    pub stages: Dict<i32, bool>,
}

/// Zombie outbreak stages: cleared outbreaks, then the ones currently active.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outbreaks {
    pub cleared: Vec<OutbreakChapter>,
    /// Only stored up to 4.3; always zero in practice.
    pub legacy_prelude: i32,
    pub current: Vec<OutbreakChapter>,
    pub remaining: f64,
}

fn read_chapters(r: &mut ByteReader<'_>) -> Result<Vec<OutbreakChapter>> {
    let n = r.read_count()?;
    let mut chapters = Vec::with_capacity(n.min(r.remaining() / 8));
    for _ in 0..n {
        chapters.push(OutbreakChapter {
            chapter: r.read_i32()?,
            stages: r.read_int_bool_dict()?,
        });
    }
    Ok(chapters)
}

fn write_chapters(w: &mut ByteWriter, chapters: &[OutbreakChapter]) -> Result<()> {
    w.write_count(chapters.len(), "outbreaks")?;
    for chapter in chapters {
        w.write_i32(chapter.chapter);
        w.write_int_bool_dict(&chapter.stages, "outbreaks")?;
    }
    Ok(())
}

impl Section for Outbreaks {
    const ID: SectionId = SectionId::Outbreaks;

    fn is_present(version: GameVersion) -> bool {
        version >= 40
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let cleared = read_chapters(r)?;
        let legacy_prelude = if ctx.version <= 43 { r.read_i32()? } else { 0 };
        let current = read_chapters(r)?;
        let remaining = if ctx.version >= 90_000 {
            r.read_f64()?
        } else {
            0.0
        };
        Ok(Self {
            cleared,
            legacy_prelude,
            current,
            remaining,
        })
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        write_chapters(w, &self.cleared)?;
        if ctx.version <= 43 {
            w.write_i32(self.legacy_prelude);
        }
        write_chapters(w, &self.current)?;
        if ctx.version >= 90_000 {
            w.write_f64(self.remaining);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageReset {
    pub stage: i32,
    pub reset_at: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapReset {
    pub map_type: i32,
    pub stages: Vec<StageReset>,
}

/// Scheduled stage resets per map type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapResets {
    pub maps: Vec<MapReset>,
}

impl Section for MapResets {
    const ID: SectionId = SectionId::MapResets;

    fn is_present(version: GameVersion) -> bool {
        version >= 90_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        let n = r.read_count()?;
        let mut maps = Vec::with_capacity(n.min(r.remaining() / 8));
        for _ in 0..n {
            let map_type = r.read_i32()?;
            let m = r.read_count()?;
            let mut stages = Vec::with_capacity(m.min(r.remaining() / 12));
            for _ in 0..m {
                stages.push(StageReset {
                    stage: r.read_i32()?,
                    reset_at: r.read_f64()?,
                });
            }
            maps.push(MapReset { map_type, stages });
        }
        Ok(Self { maps })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        w.write_count(self.maps.len(), "map_resets")?;
        for map in &self.maps {
            w.write_i32(map.map_type);
            w.write_count(map.stages.len(), "map_resets")?;
            for stage in &map.stages {
                w.write_i32(stage.stage);
                w.write_f64(stage.reset_at);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::{ctx, encode, round_trip};

    fn sample() -> Outbreaks {
        Outbreaks {
            cleared: vec![OutbreakChapter {
                chapter: 0,
                stages: [(3, true)].into_iter().collect(),
            }],
            current: vec![OutbreakChapter {
                chapter: 1,
                stages: Dict::new(),
            }],
            ..Outbreaks::default()
        }
    }

    #[test]
    fn legacy_prelude_sits_before_current_outbreaks_up_to_43() {
        let outbreaks = sample();
        let cleared_len = 4 + 4 + 4 + 5;
        let v43 = encode(&outbreaks, &ctx(43));
        let v44 = encode(&outbreaks, &ctx(44));
        assert_eq!(v43.len(), v44.len() + 4);
        assert_eq!(&v43[cleared_len..cleared_len + 4], &0i32.to_le_bytes());
        // the current map's count follows immediately
        assert_eq!(&v43[cleared_len + 4..cleared_len + 8], &1i32.to_le_bytes());
        assert_eq!(&v44[cleared_len..cleared_len + 4], &1i32.to_le_bytes());

        let _: Outbreaks = round_trip(&v43, &ctx(43));
        let _: Outbreaks = round_trip(&v44, &ctx(44));
    }

    #[test]
    fn map_resets_nest_stage_lists() {
        let resets = MapResets {
            maps: vec![MapReset {
                map_type: 2,
                stages: vec![StageReset {
                    stage: 5,
                    reset_at: 1.5,
                }],
            }],
        };
        let bytes = encode(&resets, &ctx(90_000));
        assert_eq!(bytes.len(), 4 + 4 + 4 + 12);
        let decoded: MapResets = round_trip(&bytes, &ctx(90_000));
        assert_eq!(decoded, resets);
    }
}
