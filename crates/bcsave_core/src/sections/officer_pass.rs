use crate::dict::Dict;
use crate::error::Result;
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};
use crate::version::GameVersion;

use super::{Section, SectionContext};

/// Officer's club membership.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OfficerPass {
    pub officer_id: i32,
    pub renewal_times: i32,
    pub start: f64,
    pub expiry: f64,
    pub claimed: Dict<i32, i32>,
    pub cat_id: i16,
}

impl Section for OfficerPass {
    const ID: SectionId = SectionId::OfficerPass;

    fn is_present(version: GameVersion) -> bool {
        version >= 90_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let mut pass = OfficerPass {
            officer_id: r.read_i32()?,
            renewal_times: r.read_i32()?,
            start: r.read_f64()?,
            expiry: r.read_f64()?,
            claimed: r.read_int_int_dict()?,
            cat_id: 0,
        };
        if ctx.version >= 100_000 {
            pass.cat_id = r.read_i16()?;
        }
        Ok(pass)
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        w.write_i32(self.officer_id);
        w.write_i32(self.renewal_times);
        w.write_f64(self.start);
        w.write_f64(self.expiry);
        w.write_int_int_dict(&self.claimed, "officer_pass.claimed")?;
        if ctx.version >= 100_000 {
            w.write_i16(self.cat_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::{ctx, encode, round_trip};

    #[test]
    fn cat_id_from_100000() {
        let pass = OfficerPass {
            officer_id: 11,
            cat_id: 2,
            expiry: 99.0,
            ..OfficerPass::default()
        };
        assert_eq!(encode(&pass, &ctx(90_000)).len(), 28);
        let decoded: OfficerPass = round_trip(&encode(&pass, &ctx(100_000)), &ctx(100_000));
        assert_eq!(decoded, pass);
    }
}
