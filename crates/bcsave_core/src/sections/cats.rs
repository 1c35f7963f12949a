use crate::error::{Result, SaveError};
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};

use super::{Section, SectionContext};

/// Per-cat state. On the wire each field is its own array over all cats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cat {
    /// Non-zero when the cat is unlocked; the raw value is preserved.
    pub owned: i32,
    pub plus_level: i16,
    /// Zero-based; the displayed level is `base_level + 1`.
    pub base_level: i16,
    pub current_form: i32,
    pub unlocked_form: i32,
    pub catseyes_used: i32,
    pub max_plus_level: i16,
    pub max_base_level: i16,
}

impl Cat {
    pub fn is_owned(&self) -> bool {
        self.owned != 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Talent {
    pub id: i32,
    pub level: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatTalents {
    pub cat_id: i32,
    pub talents: Vec<Talent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cats {
    pub cats: Vec<Cat>,
    /// Sparse: only cats with talents appear, in wire order.
    pub talents: Vec<CatTalents>,
}

impl Cats {
    pub fn len(&self) -> usize {
        self.cats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cats.is_empty()
    }

    pub fn owned_count(&self) -> usize {
        self.cats.iter().filter(|cat| cat.is_owned()).count()
    }

    pub fn talents_for(&self, cat_id: i32) -> Option<&[Talent]> {
        self.talents
            .iter()
            .find(|entry| entry.cat_id == cat_id)
            .map(|entry| entry.talents.as_slice())
    }
}

impl Section for Cats {
    const ID: SectionId = SectionId::Cats;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let v = ctx.version;
        let n = r.read_count()?;
        let mut cats: Vec<Cat> = r
            .read_int_list(n)?
            .into_iter()
            .map(|owned| Cat {
                owned,
                ..Cat::default()
            })
            .collect();
        for cat in &mut cats {
            cat.plus_level = r.read_i16()?;
            cat.base_level = r.read_i16()?;
        }
        for cat in &mut cats {
            cat.current_form = r.read_i32()?;
        }
        if v >= 60_000 {
            for cat in &mut cats {
                cat.unlocked_form = r.read_i32()?;
            }
        }
        if v >= 80_000 {
            for cat in &mut cats {
                cat.catseyes_used = r.read_i32()?;
            }
        }
        if v >= 90_000 {
            for cat in &mut cats {
                cat.max_plus_level = r.read_i16()?;
                cat.max_base_level = r.read_i16()?;
            }
        }

        let mut talents = Vec::new();
        if v >= 80_000 {
            let k = r.read_count()?;
            for _ in 0..k {
                let at = r.position();
                let cat_id = r.read_i32()?;
                if cat_id < 0 || cat_id as usize >= n {
                    return Err(SaveError::invalid(
                        at,
                        format!("talents for cat {cat_id}, only {n} cats"),
                    ));
                }
                let m = r.read_count()?;
                let mut entries = Vec::with_capacity(m.min(r.remaining() / 8));
                for _ in 0..m {
                    entries.push(Talent {
                        id: r.read_i32()?,
                        level: r.read_i32()?,
                    });
                }
                talents.push(CatTalents {
                    cat_id,
                    talents: entries,
                });
            }
        }

        Ok(Self { cats, talents })
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        let v = ctx.version;
        let n = self.cats.len();
        w.write_count(n, "cats")?;
        for cat in &self.cats {
            w.write_i32(cat.owned);
        }
        for cat in &self.cats {
            w.write_i16(cat.plus_level);
            w.write_i16(cat.base_level);
        }
        for cat in &self.cats {
            w.write_i32(cat.current_form);
        }
        if v >= 60_000 {
            for cat in &self.cats {
                w.write_i32(cat.unlocked_form);
            }
        }
        if v >= 80_000 {
            for cat in &self.cats {
                w.write_i32(cat.catseyes_used);
            }
        }
        if v >= 90_000 {
            for cat in &self.cats {
                w.write_i16(cat.max_plus_level);
                w.write_i16(cat.max_base_level);
            }
        }
        if v >= 80_000 {
            w.write_count(self.talents.len(), "talents")?;
            for entry in &self.talents {
                if entry.cat_id < 0 || entry.cat_id as usize >= n {
                    return Err(SaveError::invariant(
                        "talents",
                        format!("talents for cat {}, only {n} cats", entry.cat_id),
                    ));
                }
                w.write_i32(entry.cat_id);
                w.write_count(entry.talents.len(), "talents")?;
                for talent in &entry.talents {
                    w.write_i32(talent.id);
                    w.write_i32(talent.level);
                }
            }
        }
        Ok(())
    }

    fn update_context(&self, ctx: &mut SectionContext) {
        ctx.cat_count = self.cats.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::sections::test_support::{ctx, encode, round_trip};

    fn two_cats() -> Cats {
        Cats {
            cats: vec![
                Cat {
                    owned: 1,
                    plus_level: 5,
                    base_level: 29,
                    current_form: 2,
                    ..Cat::default()
                },
                Cat {
                    owned: 0,
                    base_level: 0,
                    ..Cat::default()
                },
            ],
            talents: vec![CatTalents {
                cat_id: 0,
                talents: vec![Talent { id: 3, level: 10 }],
            }],
        }
    }

    #[test]
    fn arrays_are_written_field_by_field() {
        let bytes = encode(&two_cats(), &ctx(50_000));
        // count, owned×2, levels×2, forms×2
        assert_eq!(bytes.len(), 4 + 8 + 8 + 8);
        assert_eq!(&bytes[4..8], &1i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &0i32.to_le_bytes());
        assert_eq!(&bytes[12..14], &5i16.to_le_bytes());
        assert_eq!(&bytes[14..16], &29i16.to_le_bytes());
    }

    #[test]
    fn talents_round_trip_at_current_versions() {
        let cats = two_cats();
        let decoded: Cats = round_trip(&encode(&cats, &ctx(110_600)), &ctx(110_600));
        assert_eq!(decoded, cats);
        assert_eq!(decoded.owned_count(), 1);
        assert_eq!(decoded.talents_for(0).unwrap()[0].level, 10);
    }

    #[test]
    fn talent_for_missing_cat_is_rejected() {
        let mut cats = two_cats();
        cats.talents[0].cat_id = 9;
        let mut w = ByteWriter::new();
        let err = cats.encode(&mut w, &ctx(110_600)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvariantViolation);
    }
}
