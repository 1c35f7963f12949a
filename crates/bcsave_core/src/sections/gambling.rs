use crate::dict::Dict;
use crate::error::Result;
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter, Timestamp};
use crate::version::GameVersion;

use super::{Section, SectionContext};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GamblingEvent {
    pub event_id: i32,
    pub started_at: Timestamp,
    pub used: i32,
}

/// Lucky-ticket style gambling events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Gambling {
    pub events: Vec<GamblingEvent>,
    pub completed: Dict<i32, bool>,
}

impl Section for Gambling {
    const ID: SectionId = SectionId::Gambling;

    fn is_present(version: GameVersion) -> bool {
        version >= 50_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let float_starts = ctx.version < 90_100;
        let n = r.read_count()?;
        let mut events = Vec::with_capacity(n.min(r.remaining() / 12));
        for _ in 0..n {
            let event_id = r.read_i32()?;
            let started_at = if float_starts {
                Timestamp::Float(r.read_f64()?)
            } else {
                Timestamp::Int(i64::from(r.read_i32()?))
            };
            events.push(GamblingEvent {
                event_id,
                started_at,
                used: r.read_i32()?,
            });
        }
        Ok(Self {
            events,
            completed: r.read_int_bool_dict()?,
        })
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        let float_starts = ctx.version < 90_100;
        w.write_count(self.events.len(), "gambling")?;
        for event in &self.events {
            w.write_i32(event.event_id);
            if float_starts {
                w.write_f64(event.started_at.as_f64());
            } else {
                w.write_i32(event.started_at.as_i32());
            }
            w.write_i32(event.used);
        }
        w.write_int_bool_dict(&self.completed, "gambling.completed")
    }
}
