use crate::error::{Result, SaveError};
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};

use super::{Section, SectionContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cannon {
    pub id: i32,
    pub unlocked: i32,
    /// Effect, foundation and style levels once those exist; a single level
    /// in older saves.
    pub levels: Vec<i32>,
}

/// Ototo base development: engineers and the cat cannon collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ototo {
    pub engineers: i32,
    pub cannons: Vec<Cannon>,
    pub remaining: f64,
    pub returning: bool,
    pub improve_id: i32,
}

impl Ototo {
    pub fn cannon(&self, id: i32) -> Option<&Cannon> {
        self.cannons.iter().find(|cannon| cannon.id == id)
    }
}

fn legacy_level(index: usize, cannon: &Cannon) -> Result<i32> {
    let expected_id = i32::try_from(index).ok();
    match cannon.levels.as_slice() {
        [level] if expected_id == Some(cannon.id) => Ok(*level),
        _ => Err(SaveError::invariant(
            "ototo.cannons",
            format!(
                "cannon {} at index {index} with {} levels has no legacy form",
                cannon.id,
                cannon.levels.len()
            ),
        )),
    }
}

impl Section for Ototo {
    const ID: SectionId = SectionId::Ototo;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let legacy = ctx.version < 80_200;
        let engineers = r.read_i32()?;
        let n = r.read_count()?;
        let mut cannons = Vec::with_capacity(n.min(r.remaining() / 8));
        for index in 0..n {
            if legacy {
                let unlocked = r.read_i32()?;
                let level = r.read_i32()?;
                cannons.push(Cannon {
                    id: index as i32,
                    unlocked,
                    levels: vec![level],
                });
            } else {
                cannons.push(Cannon {
                    id: r.read_i32()?,
                    unlocked: r.read_i32()?,
                    levels: r.read_int_list_prefixed()?,
                });
            }
        }
        let mut ototo = Ototo {
            engineers,
            cannons,
            ..Ototo::default()
        };
        if !legacy {
            ototo.remaining = r.read_f64()?;
            ototo.returning = r.read_bool()?;
            ototo.improve_id = r.read_i32()?;
        }
        Ok(ototo)
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        let legacy = ctx.version < 80_200;
        w.write_i32(self.engineers);
        w.write_count(self.cannons.len(), "ototo.cannons")?;
        for (index, cannon) in self.cannons.iter().enumerate() {
            if legacy {
                let level = legacy_level(index, cannon)?;
                w.write_i32(cannon.unlocked);
                w.write_i32(level);
            } else {
                w.write_i32(cannon.id);
                w.write_i32(cannon.unlocked);
                w.write_int_list_prefixed(&cannon.levels, "ototo.cannons")?;
            }
        }
        if !legacy {
            w.write_f64(self.remaining);
            w.write_bool(self.returning);
            w.write_i32(self.improve_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::sections::test_support::{ctx, encode, round_trip};

    #[test]
    fn legacy_cannons_are_indexed_pairs() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&2i32.to_le_bytes());
        for (unlock, level) in [(1i32, 10i32), (0, 0)] {
            bytes.extend_from_slice(&unlock.to_le_bytes());
            bytes.extend_from_slice(&level.to_le_bytes());
        }
        let ototo: Ototo = round_trip(&bytes, &ctx(80_000));
        assert_eq!(ototo.cannon(0).unwrap().levels, vec![10]);
        assert_eq!(ototo.cannon(1).unwrap().unlocked, 0);

        let upgraded = encode(&ototo, &ctx(80_200));
        let decoded: Ototo = round_trip(&upgraded, &ctx(80_200));
        assert_eq!(decoded.cannons, ototo.cannons);
    }

    #[test]
    fn multi_level_cannons_cannot_downgrade() {
        let ototo = Ototo {
            cannons: vec![Cannon {
                id: 0,
                unlocked: 1,
                levels: vec![3, 2, 1],
            }],
            ..Ototo::default()
        };
        let mut w = ByteWriter::new();
        let err = ototo.encode(&mut w, &ctx(80_100)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvariantViolation);
    }
}
