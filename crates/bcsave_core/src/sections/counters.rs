use crate::error::Result;
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter, SaveString, Timestamp};

use super::{Section, SectionContext};

/// Top-level currencies, timers and account flags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Counters {
    pub mute_bgm: bool,
    pub mute_se: bool,
    pub catfood: i32,
    pub energy: i32,
    pub xp: i32,
    pub normal_tickets: i32,
    pub rare_tickets: i32,
    pub platinum_tickets: i32,
    pub legend_tickets: i32,
    pub platinum_shards: i32,
    pub np: i32,
    pub leadership: i16,
    /// Frames of play, 30 per second.
    pub play_time: i32,
    pub energy_refilled_at: Timestamp,
    pub last_login: f64,
    pub inquiry_code: SaveString,
    pub password_refresh_token: SaveString,
    pub tutorial_cleared: bool,
    pub u1: i32,
    pub u2: bool,
}

impl Section for Counters {
    const ID: SectionId = SectionId::Counters;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let v = ctx.version;
        let mut c = Counters {
            mute_bgm: r.read_bool()?,
            mute_se: r.read_bool()?,
            catfood: r.read_i32()?,
            energy: r.read_i32()?,
            xp: r.read_i32()?,
            normal_tickets: r.read_i32()?,
            rare_tickets: r.read_i32()?,
            platinum_tickets: r.read_i32()?,
            ..Counters::default()
        };
        if v >= 80_000 {
            c.legend_tickets = r.read_i32()?;
        }
        if v >= 90_500 {
            c.platinum_shards = r.read_i32()?;
        }
        c.np = r.read_i32()?;
        c.leadership = r.read_i16()?;
        c.play_time = r.read_i32()?;
        c.energy_refilled_at = if v < 80_000 {
            Timestamp::Float(r.read_f64()?)
        } else {
            Timestamp::Int(r.read_i64()?)
        };
        c.last_login = r.read_f64()?;
        c.inquiry_code = r.read_string()?;
        if v >= 60_000 {
            c.password_refresh_token = r.read_string()?;
        }
        c.tutorial_cleared = r.read_bool()?;
        c.u1 = r.read_i32()?;
        if v >= 100_000 {
            c.u2 = r.read_bool()?;
        }
        Ok(c)
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        let v = ctx.version;
        w.write_bool(self.mute_bgm);
        w.write_bool(self.mute_se);
        w.write_i32(self.catfood);
        w.write_i32(self.energy);
        w.write_i32(self.xp);
        w.write_i32(self.normal_tickets);
        w.write_i32(self.rare_tickets);
        w.write_i32(self.platinum_tickets);
        if v >= 80_000 {
            w.write_i32(self.legend_tickets);
        }
        if v >= 90_500 {
            w.write_i32(self.platinum_shards);
        }
        w.write_i32(self.np);
        w.write_i16(self.leadership);
        w.write_i32(self.play_time);
        if v < 80_000 {
            w.write_f64(self.energy_refilled_at.as_f64());
        } else {
            w.write_i64(self.energy_refilled_at.as_i64());
        }
        w.write_f64(self.last_login);
        w.write_string(&self.inquiry_code, "inquiry_code")?;
        if v >= 60_000 {
            w.write_string(&self.password_refresh_token, "password_refresh_token")?;
        }
        w.write_bool(self.tutorial_cleared);
        w.write_i32(self.u1);
        if v >= 100_000 {
            w.write_bool(self.u2);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::{ctx, encode, round_trip};

    fn sample() -> Counters {
        Counters {
            catfood: 50,
            xp: 1_000_000,
            rare_tickets: 3,
            legend_tickets: 1,
            np: 40,
            leadership: 12,
            energy_refilled_at: Timestamp::Float(1_700_000_000.25),
            inquiry_code: SaveString::new("abcdefghi"),
            ..Counters::default()
        }
    }

    #[test]
    fn legend_tickets_absent_before_80000() {
        let c = sample();
        let old = encode(&c, &ctx(70_000));
        let new = encode(&c, &ctx(80_000));
        // legend tickets (+4), energy timestamp is i64 not f64 (same width),
        // refresh token is written at both versions.
        assert_eq!(new.len(), old.len() + 4);

        let decoded: Counters = round_trip(&old, &ctx(70_000));
        assert_eq!(decoded.legend_tickets, 0);
        assert_eq!(decoded.energy_refilled_at, Timestamp::Float(1_700_000_000.25));
    }

    #[test]
    fn energy_timestamp_switches_to_integer() {
        let decoded: Counters = round_trip(&encode(&sample(), &ctx(110_600)), &ctx(110_600));
        assert_eq!(decoded.energy_refilled_at, Timestamp::Int(1_700_000_000));
        assert_eq!(decoded.inquiry_code.as_str(), "abcdefghi");
        assert_eq!(decoded.catfood, 50);
    }
}
