use crate::dict::Dict;
use crate::error::{Result, SaveError};
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};

use super::{Section, SectionContext};

/// Login-stamp progress. Old saves keep per-set lists; newer ones an id map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginBonuses {
    Sets(Vec<Vec<i32>>),
    Keyed(Dict<i32, i32>),
}

impl LoginBonuses {
    pub fn is_empty(&self) -> bool {
        match self {
            LoginBonuses::Sets(sets) => sets.is_empty(),
            LoginBonuses::Keyed(map) => map.is_empty(),
        }
    }
}

impl Section for LoginBonuses {
    const ID: SectionId = SectionId::LoginBonuses;

    fn fresh(ctx: &SectionContext) -> Self {
        if ctx.version < 80_000 {
            LoginBonuses::Sets(Vec::new())
        } else {
            LoginBonuses::Keyed(Dict::new())
        }
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        if ctx.version < 80_000 {
            let n = r.read_count()?;
            let mut sets = Vec::with_capacity(n.min(r.remaining() / 4));
            for _ in 0..n {
                sets.push(r.read_int_list_prefixed()?);
            }
            Ok(LoginBonuses::Sets(sets))
        } else {
            Ok(LoginBonuses::Keyed(r.read_int_int_dict()?))
        }
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        let legacy = ctx.version < 80_000;
        match self {
            LoginBonuses::Sets(sets) if legacy => {
                w.write_count(sets.len(), "login_bonuses")?;
                for set in sets {
                    w.write_int_list_prefixed(set, "login_bonuses")?;
                }
                Ok(())
            }
            LoginBonuses::Keyed(map) if !legacy => w.write_int_int_dict(map, "login_bonuses"),
            // Empty progress converts freely between the two shapes.
            other if other.is_empty() => {
                if legacy {
                    w.write_count(0, "login_bonuses")
                } else {
                    w.write_int_int_dict(&Dict::new(), "login_bonuses")
                }
            }
            _ => Err(SaveError::invariant(
                "login_bonuses",
                "login sets and keyed bonuses cannot be converted",
            )),
        }
    }
}
