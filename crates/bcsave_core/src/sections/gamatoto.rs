use crate::dict::Dict;
use crate::error::Result;
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};

use super::{Section, SectionContext};

/// Gamatoto expedition state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Gamatoto {
    /// Seconds left on the current expedition.
    pub remaining: f64,
    pub returning: bool,
    pub xp: i32,
    pub destination: i32,
    pub recon_length: i32,
    pub u1: i32,
    pub notif_value: i32,
    pub helpers: Vec<i32>,
    pub ad_present: bool,
    pub skin: i32,
    pub collab_flags: Dict<i32, bool>,
    pub collab_durations: Dict<i32, f64>,
}

impl Section for Gamatoto {
    const ID: SectionId = SectionId::Gamatoto;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let v = ctx.version;
        let mut g = Gamatoto {
            remaining: r.read_f64()?,
            returning: r.read_bool()?,
            xp: r.read_i32()?,
            destination: r.read_i32()?,
            recon_length: r.read_i32()?,
            u1: r.read_i32()?,
            notif_value: r.read_i32()?,
            ..Gamatoto::default()
        };
        if v >= 60_000 {
            g.helpers = r.read_int_list_prefixed()?;
        }
        if v >= 80_000 {
            g.ad_present = r.read_bool()?;
        }
        if v >= 90_000 {
            g.skin = r.read_i32()?;
        }
        if v >= 100_000 {
            g.collab_flags = r.read_int_bool_dict()?;
            g.collab_durations = r.read_int_double_dict()?;
        }
        Ok(g)
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        let v = ctx.version;
        w.write_f64(self.remaining);
        w.write_bool(self.returning);
        w.write_i32(self.xp);
        w.write_i32(self.destination);
        w.write_i32(self.recon_length);
        w.write_i32(self.u1);
        w.write_i32(self.notif_value);
        if v >= 60_000 {
            w.write_int_list_prefixed(&self.helpers, "gamatoto.helpers")?;
        }
        if v >= 80_000 {
            w.write_bool(self.ad_present);
        }
        if v >= 90_000 {
            w.write_i32(self.skin);
        }
        if v >= 100_000 {
            w.write_int_bool_dict(&self.collab_flags, "gamatoto.collab_flags")?;
            w.write_int_double_dict(&self.collab_durations, "gamatoto.collab_durations")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::{ctx, encode, round_trip};

    #[test]
    fn each_gate_adds_its_field() {
        let mut g = Gamatoto {
            xp: 3_000,
            helpers: vec![1, 2],
            skin: 4,
            ..Gamatoto::default()
        };
        g.collab_durations.insert(1, 3600.0);
        let base = 8 + 1 + 5 * 4;
        assert_eq!(encode(&g, &ctx(50_000)).len(), base);
        assert_eq!(encode(&g, &ctx(60_000)).len(), base + 12);
        assert_eq!(encode(&g, &ctx(80_000)).len(), base + 13);
        assert_eq!(encode(&g, &ctx(90_000)).len(), base + 17);
        let bytes = encode(&g, &ctx(100_000));
        assert_eq!(bytes.len(), base + 17 + 4 + 4 + 12);
        let decoded: Gamatoto = round_trip(&bytes, &ctx(100_000));
        assert_eq!(decoded, g);
    }
}
