use crate::error::Result;
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};
use crate::version::GameVersion;

use super::{Section, SectionContext};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatShrine {
    pub unknown: bool,
    pub stamp_1: f64,
    pub stamp_2: f64,
    pub gone: bool,
    pub flags: Vec<u8>,
    pub xp_offering: i64,
    /// Stored after the main block from 10.4 on.
    pub dialogs: i32,
}

impl Section for CatShrine {
    const ID: SectionId = SectionId::CatShrine;

    fn is_present(version: GameVersion) -> bool {
        version >= 80_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let mut shrine = CatShrine {
            unknown: r.read_bool()?,
            stamp_1: r.read_f64()?,
            stamp_2: r.read_f64()?,
            gone: r.read_bool()?,
            ..CatShrine::default()
        };
        let n = r.read_byte_count()?;
        shrine.flags = r.read_bytes(n)?.to_vec();
        shrine.xp_offering = r.read_i64()?;
        if ctx.version >= 100_400 {
            shrine.dialogs = r.read_i32()?;
        }
        Ok(shrine)
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        w.write_bool(self.unknown);
        w.write_f64(self.stamp_1);
        w.write_f64(self.stamp_2);
        w.write_bool(self.gone);
        w.write_byte_count(self.flags.len(), "cat_shrine.flags")?;
        w.write_bytes(&self.flags);
        w.write_i64(self.xp_offering);
        if ctx.version >= 100_400 {
            w.write_i32(self.dialogs);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::{ctx, encode, round_trip};

    #[test]
    fn dialog_count_trails_the_main_block() {
        let shrine = CatShrine {
            flags: vec![1, 0, 1],
            xp_offering: 1 << 40,
            dialogs: 6,
            ..CatShrine::default()
        };
        let main = 1 + 8 + 8 + 1 + 1 + 3 + 8;
        assert_eq!(encode(&shrine, &ctx(100_300)).len(), main);
        let bytes = encode(&shrine, &ctx(100_400));
        assert_eq!(&bytes[main..], &6i32.to_le_bytes());
        let decoded: CatShrine = round_trip(&bytes, &ctx(100_400));
        assert_eq!(decoded, shrine);
    }
}
