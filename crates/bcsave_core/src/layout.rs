use serde::Serialize;

use crate::error::{Result, SaveError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Stable identity of each section, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Preamble,
    Counters,
    BattleItems,
    Cats,
    EquipSlots,
    Lineups,
    SpecialSkills,
    TalentOrbs,
    Catfruit,
    Catseyes,
    Catamins,
    BaseMaterials,
    LabyrinthMedals,
    TreasureChests,
    EventTickets,
    UserRankRewards,
    LoginBonuses,
    ItemPacks,
    Missions,
    Gatya,
    Medals,
    Stamps,
    OfficerPass,
    SchemeItems,
    Story,
    EventStages,
    AkuRealm,
    Gauntlets,
    Towers,
    Uncanny,
    ZeroLegends,
    ExStages,
    Challenge,
    Enigma,
    LegendQuest,
    TimedScore,
    ItemReward,
    Dojo,
    Outbreaks,
    MapResets,
    Gamatoto,
    Ototo,
    CatShrine,
    BeaconEvents,
    MySale,
    UnlockPopups,
    Gambling,
    StringTable,
    Tail,
    Trailer,
}

impl SectionId {
    pub fn name(&self) -> &'static str {
        match self {
            SectionId::Preamble => "preamble",
            SectionId::Counters => "counters",
            SectionId::BattleItems => "battle_items",
            SectionId::Cats => "cats",
            SectionId::EquipSlots => "equip_slots",
            SectionId::Lineups => "lineups",
            SectionId::SpecialSkills => "special_skills",
            SectionId::TalentOrbs => "talent_orbs",
            SectionId::Catfruit => "catfruit",
            SectionId::Catseyes => "catseyes",
            SectionId::Catamins => "catamins",
            SectionId::BaseMaterials => "base_materials",
            SectionId::LabyrinthMedals => "labyrinth_medals",
            SectionId::TreasureChests => "treasure_chests",
            SectionId::EventTickets => "event_tickets",
            SectionId::UserRankRewards => "user_rank_rewards",
            SectionId::LoginBonuses => "login_bonuses",
            SectionId::ItemPacks => "item_packs",
            SectionId::Missions => "missions",
            SectionId::Gatya => "gatya",
            SectionId::Medals => "medals",
            SectionId::Stamps => "stamps",
            SectionId::OfficerPass => "officer_pass",
            SectionId::SchemeItems => "scheme_items",
            SectionId::Story => "story",
            SectionId::EventStages => "event_stages",
            SectionId::AkuRealm => "aku_realm",
            SectionId::Gauntlets => "gauntlets",
            SectionId::Towers => "towers",
            SectionId::Uncanny => "uncanny",
            SectionId::ZeroLegends => "zero_legends",
            SectionId::ExStages => "ex_stages",
            SectionId::Challenge => "challenge",
            SectionId::Enigma => "enigma",
            SectionId::LegendQuest => "legend_quest",
            SectionId::TimedScore => "timed_score",
            SectionId::ItemReward => "item_reward",
            SectionId::Dojo => "dojo",
            SectionId::Outbreaks => "outbreaks",
            SectionId::MapResets => "map_resets",
            SectionId::Gamatoto => "gamatoto",
            SectionId::Ototo => "ototo",
            SectionId::CatShrine => "cat_shrine",
            SectionId::BeaconEvents => "beacon_events",
            SectionId::MySale => "my_sale",
            SectionId::UnlockPopups => "unlock_popups",
            SectionId::Gambling => "gambling",
            SectionId::StringTable => "string_table",
            SectionId::Tail => "tail",
            SectionId::Trailer => "trailer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionLayout {
    pub id: SectionId,
    pub range: ByteRange,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FileLayout {
    pub file_len: usize,
    pub sections: Vec<SectionLayout>,
}

impl FileLayout {
    pub(crate) fn record(&mut self, id: SectionId, start: usize, end: usize) {
        self.sections.push(SectionLayout {
            id,
            range: ByteRange { start, end },
        });
    }

    pub fn section(&self, id: SectionId) -> Option<&SectionLayout> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn validate(&self) -> Result<()> {
        let Some(first) = self.sections.first() else {
            return Err(SaveError::invariant(
                "layout",
                "file layout must contain at least one section",
            ));
        };

        if first.range.start != 0 {
            return Err(SaveError::invariant("layout", "layout does not start at byte 0"));
        }

        let mut expected = 0usize;
        let mut previous: Option<SectionId> = None;
        for section in &self.sections {
            if section.range.start != expected {
                return Err(SaveError::invariant(
                    "layout",
                    format!(
                        "layout gap/overlap around section {:?}: expected start {}, got {}",
                        section.id, expected, section.range.start
                    ),
                ));
            }
            if section.range.end < section.range.start {
                return Err(SaveError::invariant(
                    "layout",
                    format!(
                        "invalid section range {:?}: {}..{}",
                        section.id, section.range.start, section.range.end
                    ),
                ));
            }
            if let Some(prev) = previous
                && prev >= section.id
            {
                return Err(SaveError::invariant(
                    "layout",
                    format!("section {:?} recorded after {:?}", section.id, prev),
                ));
            }
            previous = Some(section.id);
            expected = section.range.end;
        }

        if expected != self.file_len {
            return Err(SaveError::invariant(
                "layout",
                format!(
                    "layout does not cover file: ended at {}, file length {}",
                    expected, self.file_len
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(ranges: &[(SectionId, usize, usize)], file_len: usize) -> FileLayout {
        let mut layout = FileLayout {
            file_len,
            sections: Vec::new(),
        };
        for &(id, start, end) in ranges {
            layout.record(id, start, end);
        }
        layout
    }

    #[test]
    fn contiguous_layout_validates() {
        let l = layout(
            &[
                (SectionId::Preamble, 0, 10),
                (SectionId::Counters, 10, 40),
                (SectionId::Trailer, 40, 72),
            ],
            72,
        );
        assert!(l.validate().is_ok());
    }

    #[test]
    fn gap_and_reorder_are_rejected() {
        let gap = layout(
            &[(SectionId::Preamble, 0, 10), (SectionId::Counters, 12, 20)],
            20,
        );
        assert!(gap.validate().is_err());

        let reordered = layout(
            &[(SectionId::Counters, 0, 10), (SectionId::Preamble, 10, 20)],
            20,
        );
        assert!(reordered.validate().is_err());
    }
}
