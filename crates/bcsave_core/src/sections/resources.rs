//! Item inventories stored as plain prefixed `i32` lists, plus event tickets.

use crate::error::{Result, SaveError};
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};
use crate::version::GameVersion;

use super::{Section, SectionContext};

/// Per-slot catfruit ceiling before 11.4.
pub const LEGACY_CATFRUIT_MAX: i32 = 128;

/// Highest slot count the catfruit setter will grow the list to.
pub const MAX_CATFRUIT_SLOTS: usize = 1 << 10;

macro_rules! item_list {
    ($(#[$meta:meta])* $name:ident, $id:expr, $field:literal, $gate:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Default)]
        pub struct $name {
            pub amounts: Vec<i32>,
        }

        impl $name {
            pub fn get(&self, index: usize) -> i32 {
                self.amounts.get(index).copied().unwrap_or(0)
            }
        }

        impl Section for $name {
            const ID: SectionId = $id;

            fn is_present(version: GameVersion) -> bool {
                let gate: fn(GameVersion) -> bool = $gate;
                gate(version)
            }

            fn fresh(_ctx: &SectionContext) -> Self {
                Self::default()
            }

            fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
                Ok(Self {
                    amounts: r.read_int_list_prefixed()?,
                })
            }

            fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
                w.write_int_list_prefixed(&self.amounts, $field)
            }
        }
    };
}

item_list!(Catfruit, SectionId::Catfruit, "catfruit", |_| true);
item_list!(Catseyes, SectionId::Catseyes, "catseyes", |v| v >= 50_000);
item_list!(Catamins, SectionId::Catamins, "catamins", |v| v >= 90_000);
item_list!(
    /// Gamatoto and ototo engineering materials.
    BaseMaterials,
    SectionId::BaseMaterials,
    "base_materials",
    |v| v >= 80_000
);
item_list!(
    LabyrinthMedals,
    SectionId::LabyrinthMedals,
    "labyrinth_medals",
    |v| v >= 110_000
);
item_list!(
    TreasureChests,
    SectionId::TreasureChests,
    "treasure_chests",
    |v| v >= 100_000
);

impl Catfruit {
    pub fn slot_max(version: GameVersion) -> Option<i32> {
        if version < 110_400 {
            Some(LEGACY_CATFRUIT_MAX)
        } else {
            None
        }
    }

    /// Set one slot, growing the list and clamping to the version's ceiling.
    pub fn set(&mut self, index: usize, amount: i32, version: GameVersion) -> Result<()> {
        if index >= MAX_CATFRUIT_SLOTS {
            return Err(SaveError::invariant(
                "catfruit",
                format!("slot {index} is past the last slot {}", MAX_CATFRUIT_SLOTS - 1),
            ));
        }
        let amount = match Self::slot_max(version) {
            Some(max) => amount.clamp(0, max),
            None => amount.max(0),
        };
        if self.amounts.len() <= index {
            self.amounts.resize(index + 1, 0);
        }
        self.amounts[index] = amount;
        Ok(())
    }

    /// Lower every slot above the ceiling of `version`. Returns how many changed.
    pub fn clamp_to(&mut self, version: GameVersion) -> usize {
        let Some(max) = Self::slot_max(version) else {
            return 0;
        };
        let mut clamped = 0;
        for amount in self.amounts.iter_mut().filter(|amount| **amount > max) {
            *amount = max;
            clamped += 1;
        }
        clamped
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTicket {
    pub id: i32,
    pub amount: i32,
    pub expires_at: i32,
}

/// Three parallel arrays on the wire: ids, amounts, expiries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventTickets {
    pub tickets: Vec<EventTicket>,
}

impl Section for EventTickets {
    const ID: SectionId = SectionId::EventTickets;

    fn is_present(version: GameVersion) -> bool {
        version >= 90_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        let n = r.read_count()?;
        let ids = r.read_int_list(n)?;
        let amounts = r.read_int_list(n)?;
        let expiries = r.read_int_list(n)?;
        let tickets = ids
            .into_iter()
            .zip(amounts)
            .zip(expiries)
            .map(|((id, amount), expires_at)| EventTicket {
                id,
                amount,
                expires_at,
            })
            .collect();
        Ok(Self { tickets })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        w.write_count(self.tickets.len(), "event_tickets")?;
        for ticket in &self.tickets {
            w.write_i32(ticket.id);
        }
        for ticket in &self.tickets {
            w.write_i32(ticket.amount);
        }
        for ticket in &self.tickets {
            w.write_i32(ticket.expires_at);
        }
        Ok(())
    }
}

impl EventTickets {
    pub fn amount(&self, id: i32) -> i32 {
        self.tickets
            .iter()
            .find(|ticket| ticket.id == id)
            .map_or(0, |ticket| ticket.amount)
    }

    pub fn set_amount(&mut self, id: i32, amount: i32) -> Result<()> {
        match self.tickets.iter_mut().find(|ticket| ticket.id == id) {
            Some(ticket) => {
                ticket.amount = amount;
                Ok(())
            }
            None => Err(SaveError::invariant(
                "event_tickets",
                format!("no event ticket with id {id}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::sections::test_support::{ctx, encode, round_trip};

    #[test]
    fn gates_follow_item_introduction() {
        assert!(Catfruit::is_present(GameVersion::new(1)));
        assert!(!Catseyes::is_present(GameVersion::new(40_000)));
        assert!(Catseyes::is_present(GameVersion::new(50_000)));
        assert!(!LabyrinthMedals::is_present(GameVersion::new(100_900)));
        assert!(TreasureChests::is_present(GameVersion::new(100_000)));
    }

    #[test]
    fn catfruit_clamps_before_110400() {
        let mut fruit = Catfruit::default();
        fruit.set(2, 500, GameVersion::new(110_300)).unwrap();
        assert_eq!(fruit.amounts, vec![0, 0, 128]);
        fruit.set(2, 500, GameVersion::new(110_400)).unwrap();
        assert_eq!(fruit.get(2), 500);
        let _: Catfruit = round_trip(&encode(&fruit, &ctx(110_400)), &ctx(110_400));
    }

    #[test]
    fn catfruit_slot_index_is_bounded() {
        let mut fruit = Catfruit::default();
        fruit.set(1, 9, GameVersion::new(110_600)).unwrap();

        for index in [MAX_CATFRUIT_SLOTS, usize::MAX] {
            let err = fruit.set(index, 1, GameVersion::new(110_600)).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvariantViolation);
            assert!(err.to_string().contains("catfruit"));
        }
        assert_eq!(fruit.amounts, vec![0, 9]);

        fruit
            .set(MAX_CATFRUIT_SLOTS - 1, 3, GameVersion::new(110_600))
            .unwrap();
        assert_eq!(fruit.amounts.len(), MAX_CATFRUIT_SLOTS);
    }

    #[test]
    fn clamp_to_lowers_only_slots_over_the_ceiling() {
        let mut fruit = Catfruit {
            amounts: vec![500, 12, 129, 128],
        };
        assert_eq!(fruit.clamp_to(GameVersion::new(110_400)), 0);
        assert_eq!(fruit.amounts, vec![500, 12, 129, 128]);
        assert_eq!(fruit.clamp_to(GameVersion::new(110_300)), 2);
        assert_eq!(fruit.amounts, vec![128, 12, 128, 128]);
    }

    #[test]
    fn event_tickets_are_parallel_arrays() {
        let tickets = EventTickets {
            tickets: vec![
                EventTicket {
                    id: 1,
                    amount: 5,
                    expires_at: 100,
                },
                EventTicket {
                    id: 2,
                    amount: 6,
                    expires_at: 200,
                },
            ],
        };
        let bytes = encode(&tickets, &ctx(90_000));
        assert_eq!(&bytes[4..8], &1i32.to_le_bytes());
        assert_eq!(&bytes[8..12], &2i32.to_le_bytes());
        assert_eq!(&bytes[12..16], &5i32.to_le_bytes());
        let decoded: EventTickets = round_trip(&bytes, &ctx(90_000));
        assert_eq!(decoded.amount(2), 6);
    }
}
