//! Grid-shaped map kinds.

use crate::dict::Dict;
use crate::error::{Result, SaveError};
use crate::layout::SectionId;
use crate::sections::{Section, SectionContext, check_len};
use crate::stream::{ByteReader, ByteWriter};
use crate::version::GameVersion;

use super::{ChapterGrid, Geometry};

/// Event stage geometry before counts were stored.
pub const LEGACY_EVENT_GEOMETRY: Geometry = Geometry::new(50, 3, 12);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventStages {
    pub grid: ChapterGrid,
    pub completion: Dict<i32, i32>,
}

impl Section for EventStages {
    const ID: SectionId = SectionId::EventStages;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self {
            grid: ChapterGrid::new(LEGACY_EVENT_GEOMETRY),
            completion: Dict::new(),
        }
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let geometry = if ctx.version < 80_000 {
            LEGACY_EVENT_GEOMETRY
        } else {
            Geometry::read_compact(r)?
        };
        let grid = ChapterGrid::decode(r, geometry)?;
        let completion = if ctx.version >= 90_000 {
            r.read_int_int_dict()?
        } else {
            Dict::new()
        };
        Ok(Self { grid, completion })
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        if ctx.version < 80_000 {
            if self.grid.geometry != LEGACY_EVENT_GEOMETRY {
                return Err(SaveError::invariant(
                    "event_stages",
                    format!(
                        "legacy event stages are 50x3x12, model is {:?}",
                        self.grid.geometry
                    ),
                ));
            }
        } else {
            self.grid.geometry.write_compact(w, "event_stages")?;
        }
        self.grid.encode(w, "event_stages")?;
        if ctx.version >= 90_000 {
            w.write_int_int_dict(&self.completion, "event_stages.completion")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AkuRealm {
    pub grid: ChapterGrid,
}

impl Section for AkuRealm {
    const ID: SectionId = SectionId::AkuRealm;

    fn is_present(version: GameVersion) -> bool {
        version >= 100_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        let geometry = Geometry::read_ints(r)?;
        Ok(Self {
            grid: ChapterGrid::decode(r, geometry)?,
        })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        self.grid.geometry.write_ints(w, "aku_realm")?;
        self.grid.encode(w, "aku_realm")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Gauntlets {
    pub grid: ChapterGrid,
    pub last_chapter: i32,
}

impl Section for Gauntlets {
    const ID: SectionId = SectionId::Gauntlets;

    fn is_present(version: GameVersion) -> bool {
        version >= 60_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        let geometry = Geometry::read_ints(r)?;
        Ok(Self {
            grid: ChapterGrid::decode(r, geometry)?,
            last_chapter: r.read_i32()?,
        })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        self.grid.geometry.write_ints(w, "gauntlets")?;
        self.grid.encode(w, "gauntlets")?;
        w.write_i32(self.last_chapter);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Towers {
    pub grid: ChapterGrid,
    /// One flag per chapter and star tier.
    pub item_obtained: Vec<bool>,
}

impl Section for Towers {
    const ID: SectionId = SectionId::Towers;

    fn is_present(version: GameVersion) -> bool {
        version >= 70_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        let geometry = Geometry::read_ints(r)?;
        let grid = ChapterGrid::decode(r, geometry)?;
        let item_obtained = r.read_bool_list(geometry.tiers())?;
        Ok(Self {
            grid,
            item_obtained,
        })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        check_len(
            "towers.item_obtained",
            self.item_obtained.len(),
            self.grid.geometry.tiers(),
        )?;
        self.grid.geometry.write_ints(w, "towers")?;
        self.grid.encode(w, "towers")?;
        w.write_bool_list(&self.item_obtained);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Uncanny {
    pub grid: ChapterGrid,
    pub unknown: i32,
}

impl Section for Uncanny {
    const ID: SectionId = SectionId::Uncanny;

    fn is_present(version: GameVersion) -> bool {
        version >= 100_300
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        let geometry = Geometry::read_ints(r)?;
        Ok(Self {
            grid: ChapterGrid::decode(r, geometry)?,
            unknown: r.read_i32()?,
        })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        self.grid.geometry.write_ints(w, "uncanny")?;
        self.grid.encode(w, "uncanny")?;
        w.write_i32(self.unknown);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ZeroLegends {
    pub grid: ChapterGrid<i16>,
    /// One byte per chapter.
    pub unknown: Vec<u8>,
}

impl Section for ZeroLegends {
    const ID: SectionId = SectionId::ZeroLegends;

    fn is_present(version: GameVersion) -> bool {
        version >= 110_500
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        let geometry = Geometry::read_compact(r)?;
        let grid = ChapterGrid::decode(r, geometry)?;
        let unknown = r.read_bytes(geometry.chapters)?.to_vec();
        Ok(Self { grid, unknown })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        check_len(
            "zero_legends.unknown",
            self.unknown.len(),
            self.grid.geometry.chapters,
        )?;
        self.grid.geometry.write_compact(w, "zero_legends")?;
        self.grid.encode(w, "zero_legends")?;
        w.write_bytes(&self.unknown);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LegendQuest {
    pub grid: ChapterGrid,
    /// Attempts per stage, same shape as the clears.
    pub tries: Vec<i32>,
    pub ids: Vec<i32>,
}

impl Section for LegendQuest {
    const ID: SectionId = SectionId::LegendQuest;

    fn is_present(version: GameVersion) -> bool {
        version >= 110_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        let geometry = Geometry::read_ints(r)?;
        let grid = ChapterGrid::decode(r, geometry)?;
        let tries = r.read_int_list(geometry.cells())?;
        let ids = r.read_int_list_prefixed()?;
        Ok(Self { grid, tries, ids })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        check_len("legend_quest.tries", self.tries.len(), self.grid.geometry.cells())?;
        self.grid.geometry.write_ints(w, "legend_quest")?;
        self.grid.encode(w, "legend_quest")?;
        w.write_int_list(&self.tries);
        w.write_int_list_prefixed(&self.ids, "legend_quest.ids")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::sections::test_support::{ctx, encode, round_trip};

    #[test]
    fn event_geometry_is_implicit_before_80000() {
        let events = EventStages::fresh(&ctx(70_000));
        let cells = 50 * 3 * 12;
        let tiers = 50 * 3;
        let legacy = encode(&events, &ctx(70_000));
        assert_eq!(legacy.len(), (tiers * 2 + cells) * 4);
        let _: EventStages = round_trip(&legacy, &ctx(70_000));

        let current = encode(&events, &ctx(90_000));
        assert_eq!(current.len(), legacy.len() + 6 + 4);
        assert_eq!(&current[..6], &[50, 0, 0, 0, 3, 12]);
        let _: EventStages = round_trip(&current, &ctx(90_000));
    }

    #[test]
    fn resized_event_grid_cannot_go_back() {
        let events = EventStages {
            grid: ChapterGrid::new(Geometry::new(60, 3, 12)),
            completion: Dict::new(),
        };
        let mut w = ByteWriter::new();
        let err = events.encode(&mut w, &ctx(70_000)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvariantViolation);
    }

    #[test]
    fn towers_carry_a_flag_per_tier() {
        let towers = Towers {
            grid: ChapterGrid::new(Geometry::new(2, 1, 3)),
            item_obtained: vec![true, false],
        };
        let bytes = encode(&towers, &ctx(70_000));
        assert_eq!(bytes.len(), 12 + (2 + 6 + 2) * 4 + 2);
        let decoded: Towers = round_trip(&bytes, &ctx(70_000));
        assert_eq!(decoded.item_obtained, vec![true, false]);
    }

    #[test]
    fn zero_legends_use_short_clears() {
        let mut zero = ZeroLegends {
            grid: ChapterGrid::new(Geometry::new(1, 4, 8)),
            unknown: vec![2],
        };
        zero.grid.set_stage_clear(0, 3, 7, 2);
        let bytes = encode(&zero, &ctx(110_500));
        assert_eq!(bytes.len(), 6 + 4 * 4 + 32 * 2 + 4 * 4 + 1);
        let decoded: ZeroLegends = round_trip(&bytes, &ctx(110_500));
        assert_eq!(decoded.grid.stage_clears(0, 3).map(|s| s[7]), Some(2));
    }

    #[test]
    fn legend_quest_tries_match_the_grid() {
        let quest = LegendQuest {
            grid: ChapterGrid::new(Geometry::new(1, 1, 2)),
            tries: vec![1],
            ids: vec![],
        };
        let mut w = ByteWriter::new();
        assert!(quest.encode(&mut w, &ctx(110_000)).is_err());
    }

    #[test]
    fn gated_grids_report_presence() {
        assert!(!AkuRealm::is_present(GameVersion::new(90_000)));
        assert!(Gauntlets::is_present(GameVersion::new(60_000)));
        assert!(!Uncanny::is_present(GameVersion::new(100_200)));
        let aku = AkuRealm {
            grid: ChapterGrid::new(Geometry::new(1, 1, 1)),
        };
        let _: AkuRealm = round_trip(&encode(&aku, &ctx(100_000)), &ctx(100_000));
    }
}
