use crate::dict::Dict;
use crate::error::Result;
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};

use super::{Section, SectionContext};

/// Mission clear state as stored by the game.
pub mod state {
    pub const LOCKED: i32 = 0;
    pub const AVAILABLE: i32 = 1;
    pub const CLEARED: i32 = 2;
    pub const CLAIMED: i32 = 4;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Missions {
    pub clear_states: Dict<i32, i32>,
    pub requirements: Dict<i32, i32>,
    pub progress_types: Dict<i32, i32>,
    pub values: Dict<i32, i32>,
    pub gamatoto_values: Dict<i32, i32>,
    pub weekly: Dict<i32, bool>,
}

impl Missions {
    /// Mark every known mission cleared without claiming its reward.
    pub fn clear_all(&mut self) {
        let ids: Vec<i32> = self.clear_states.keys().collect();
        for id in ids {
            if let Some(current) = self.clear_states.get_mut(id)
                && *current != state::CLAIMED
            {
                *current = state::CLEARED;
            }
            if let Some(&required) = self.requirements.get(id) {
                self.values.insert(id, required);
            }
        }
    }
}

impl Section for Missions {
    const ID: SectionId = SectionId::Missions;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let mut missions = Missions {
            clear_states: r.read_int_int_dict()?,
            requirements: r.read_int_int_dict()?,
            progress_types: r.read_int_int_dict()?,
            values: r.read_int_int_dict()?,
            ..Missions::default()
        };
        if ctx.version >= 70_000 {
            missions.gamatoto_values = r.read_int_int_dict()?;
        }
        if ctx.version >= 90_300 {
            missions.weekly = r.read_int_bool_dict()?;
        }
        Ok(missions)
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        w.write_int_int_dict(&self.clear_states, "missions.clear_states")?;
        w.write_int_int_dict(&self.requirements, "missions.requirements")?;
        w.write_int_int_dict(&self.progress_types, "missions.progress_types")?;
        w.write_int_int_dict(&self.values, "missions.values")?;
        if ctx.version >= 70_000 {
            w.write_int_int_dict(&self.gamatoto_values, "missions.gamatoto_values")?;
        }
        if ctx.version >= 90_300 {
            w.write_int_bool_dict(&self.weekly, "missions.weekly")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::{ctx, encode, round_trip};

    #[test]
    fn weekly_flags_from_90300() {
        let mut missions = Missions::default();
        missions.weekly.insert(5, true);
        assert_eq!(encode(&missions, &ctx(90_200)).len(), 20);
        let bytes = encode(&missions, &ctx(90_300));
        assert_eq!(bytes.len(), 20 + 4 + 5);
        let decoded: Missions = round_trip(&bytes, &ctx(90_300));
        assert_eq!(decoded.weekly.get(5), Some(&true));
    }

    #[test]
    fn clear_all_keeps_claimed_missions() {
        let mut missions = Missions::default();
        missions.clear_states.insert(1, state::AVAILABLE);
        missions.clear_states.insert(2, state::CLAIMED);
        missions.requirements.insert(1, 30);
        missions.clear_all();
        assert_eq!(missions.clear_states.get(1), Some(&state::CLEARED));
        assert_eq!(missions.clear_states.get(2), Some(&state::CLAIMED));
        assert_eq!(missions.values.get(1), Some(&30));
    }
}
