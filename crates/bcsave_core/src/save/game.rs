use tracing::{debug, trace};

use crate::error::Result;
use crate::layout::FileLayout;
use crate::sections::battle_items::BattleItems;
use crate::sections::cat_shrine::CatShrine;
use crate::sections::cats::Cats;
use crate::sections::counters::Counters;
use crate::sections::events::{BeaconEvents, MySale, UnlockPopups};
use crate::sections::gamatoto::Gamatoto;
use crate::sections::gambling::Gambling;
use crate::sections::gatya::Gatya;
use crate::sections::item_packs::ItemPacks;
use crate::sections::lineups::{EquipSlots, Lineups};
use crate::sections::login_bonuses::LoginBonuses;
use crate::sections::maps::chapters::{
    AkuRealm, EventStages, Gauntlets, LegendQuest, Towers, Uncanny, ZeroLegends,
};
use crate::sections::maps::dojo::Dojo;
use crate::sections::maps::enigma::Enigma;
use crate::sections::maps::ex_stages::{Challenge, ExStages};
use crate::sections::maps::item_reward::ItemReward;
use crate::sections::maps::outbreaks::{MapResets, Outbreaks};
use crate::sections::maps::story::Story;
use crate::sections::maps::timed_score::TimedScore;
use crate::sections::medals::Medals;
use crate::sections::missions::Missions;
use crate::sections::officer_pass::OfficerPass;
use crate::sections::ototo::Ototo;
use crate::sections::resources::{
    BaseMaterials, Catamins, Catfruit, Catseyes, EventTickets, LabyrinthMedals, TreasureChests,
};
use crate::sections::scheme_items::SchemeItems;
use crate::sections::special_skills::SpecialSkills;
use crate::sections::stamps::Stamps;
use crate::sections::string_table::StringTable;
use crate::sections::talent_orbs::TalentOrbs;
use crate::sections::user_rank::UserRankRewards;
use crate::sections::{Section, SectionContext};
use crate::stream::{ByteReader, ByteWriter};

pub(crate) fn decode_section<S: Section>(
    r: &mut ByteReader<'_>,
    ctx: &mut SectionContext,
    layout: &mut FileLayout,
) -> Result<S> {
    let section = if S::is_present(ctx.version) {
        let start = r.position();
        let section = S::decode(r, ctx).map_err(|err| err.in_section(S::ID))?;
        let end = r.position();
        layout.record(S::ID, start, end);
        debug!(section = S::ID.name(), start, end, "decoded section");
        section
    } else {
        trace!(section = S::ID.name(), version = %ctx.version, "section gated out");
        S::fresh(ctx)
    };
    section.update_context(ctx);
    Ok(section)
}

pub(crate) fn encode_section<S: Section>(
    section: &S,
    w: &mut ByteWriter,
    ctx: &mut SectionContext,
    layout: &mut FileLayout,
) -> Result<()> {
    if S::is_present(ctx.version) {
        let start = w.position();
        section.encode(w, ctx).map_err(|err| err.in_section(S::ID))?;
        let end = w.position();
        layout.record(S::ID, start, end);
        debug!(section = S::ID.name(), start, end, "encoded section");
    } else {
        trace!(section = S::ID.name(), version = %ctx.version, "section gated out");
    }
    section.update_context(ctx);
    Ok(())
}

/// Declares the save model in wire order. Decode and encode both walk this
/// list.
macro_rules! save_sections {
    ($($field:ident: $ty:ty,)+) => {
        /// The decoded save, one field per section in wire order.
        #[derive(Debug, Clone, PartialEq)]
        pub struct SaveGame {
            $(pub $field: $ty,)+
            pub string_table: StringTable,
        }

        impl SaveGame {
            pub(crate) fn fresh(ctx: &mut SectionContext) -> Self {
                $(
                    let $field = <$ty as Section>::fresh(ctx);
                    $field.update_context(ctx);
                )+
                Self {
                    $($field,)+
                    string_table: StringTable::default(),
                }
            }

            /// Every section before the string table.
            pub(crate) fn decode_body(
                r: &mut ByteReader<'_>,
                ctx: &mut SectionContext,
                layout: &mut FileLayout,
            ) -> Result<Self> {
                $(
                    let $field: $ty = decode_section(r, ctx, layout)?;
                )+
                Ok(Self {
                    $($field,)+
                    string_table: StringTable::default(),
                })
            }

            pub(crate) fn encode_body(
                &self,
                w: &mut ByteWriter,
                ctx: &mut SectionContext,
                layout: &mut FileLayout,
            ) -> Result<()> {
                $(
                    encode_section(&self.$field, w, ctx, layout)?;
                )+
                Ok(())
            }
        }
    };
}

save_sections! {
    counters: Counters,
    battle_items: BattleItems,
    cats: Cats,
    equip_slots: EquipSlots,
    lineups: Lineups,
    special_skills: SpecialSkills,
    talent_orbs: TalentOrbs,
    catfruit: Catfruit,
    catseyes: Catseyes,
    catamins: Catamins,
    base_materials: BaseMaterials,
    labyrinth_medals: LabyrinthMedals,
    treasure_chests: TreasureChests,
    event_tickets: EventTickets,
    user_rank_rewards: UserRankRewards,
    login_bonuses: LoginBonuses,
    item_packs: ItemPacks,
    missions: Missions,
    gatya: Gatya,
    medals: Medals,
    stamps: Stamps,
    officer_pass: OfficerPass,
    scheme_items: SchemeItems,
    story: Story,
    event_stages: EventStages,
    aku_realm: AkuRealm,
    gauntlets: Gauntlets,
    towers: Towers,
    uncanny: Uncanny,
    zero_legends: ZeroLegends,
    ex_stages: ExStages,
    challenge: Challenge,
    enigma: Enigma,
    legend_quest: LegendQuest,
    timed_score: TimedScore,
    item_reward: ItemReward,
    dojo: Dojo,
    outbreaks: Outbreaks,
    map_resets: MapResets,
    gamatoto: Gamatoto,
    ototo: Ototo,
    cat_shrine: CatShrine,
    beacon_events: BeaconEvents,
    my_sale: MySale,
    unlock_popups: UnlockPopups,
    gambling: Gambling,
}
