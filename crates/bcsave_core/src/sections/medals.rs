use crate::dict::Dict;
use crate::error::Result;
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};

use super::{Section, SectionContext};

/// Meow medals.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Medals {
    pub earned: Vec<i32>,
    pub seen: Dict<i32, bool>,
}

impl Medals {
    pub fn has(&self, id: i32) -> bool {
        self.earned.contains(&id)
    }

    pub fn earn(&mut self, id: i32) {
        if !self.has(id) {
            self.earned.push(id);
        }
    }
}

impl Section for Medals {
    const ID: SectionId = SectionId::Medals;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        Ok(Self {
            earned: r.read_int_list_prefixed()?,
            seen: r.read_int_bool_dict()?,
        })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        w.write_int_list_prefixed(&self.earned, "medals.earned")?;
        w.write_int_bool_dict(&self.seen, "medals.seen")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::{ctx, encode, round_trip};

    #[test]
    fn earning_twice_is_a_no_op() {
        let mut medals = Medals::default();
        medals.earn(4);
        medals.earn(4);
        medals.seen.insert(4, false);
        let decoded: Medals = round_trip(&encode(&medals, &ctx(1)), &ctx(1));
        assert_eq!(decoded.earned, vec![4]);
    }
}
