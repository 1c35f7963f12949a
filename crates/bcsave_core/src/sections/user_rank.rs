use crate::error::Result;
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};

use super::{Section, SectionContext, check_len};

pub const LEGACY_REWARD_COUNT: usize = 50;

/// Claimed flags for user-rank milestone rewards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRankRewards {
    pub claimed: Vec<bool>,
}

impl Section for UserRankRewards {
    const ID: SectionId = SectionId::UserRankRewards;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self {
            claimed: vec![false; LEGACY_REWARD_COUNT],
        }
    }

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self> {
        let claimed = if ctx.version < 30 {
            r.read_bool_list(LEGACY_REWARD_COUNT)?
        } else {
            r.read_bool_list_prefixed()?
        };
        Ok(Self { claimed })
    }

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()> {
        if ctx.version < 30 {
            check_len("user_rank_rewards", self.claimed.len(), LEGACY_REWARD_COUNT)?;
            w.write_bool_list(&self.claimed);
            Ok(())
        } else {
            w.write_bool_list_prefixed(&self.claimed, "user_rank_rewards")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::{ctx, encode, round_trip};

    #[test]
    fn fixed_fifty_before_30() {
        let rewards = UserRankRewards::fresh(&ctx(29));
        assert_eq!(encode(&rewards, &ctx(29)).len(), 50);
        let prefixed = encode(&rewards, &ctx(30));
        assert_eq!(prefixed.len(), 54);
        let _: UserRankRewards = round_trip(&prefixed, &ctx(30));
    }
}
