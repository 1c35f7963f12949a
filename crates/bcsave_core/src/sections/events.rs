//! Small event-bookkeeping sections near the end of the save.

use crate::dict::Dict;
use crate::error::{Result, SaveError};
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};
use crate::version::GameVersion;

use super::{Section, SectionContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeaconEvent {
    pub id: i32,
    pub triggered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BeaconEvents {
    pub events: Vec<BeaconEvent>,
}

impl Section for BeaconEvents {
    const ID: SectionId = SectionId::BeaconEvents;

    fn is_present(version: GameVersion) -> bool {
        version >= 90_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        let n = r.read_variable_length_count()?;
        let mut events = Vec::with_capacity(n.min(r.remaining() / 5));
        for _ in 0..n {
            events.push(BeaconEvent {
                id: r.read_i32()?,
                triggered: r.read_bool()?,
            });
        }
        Ok(Self { events })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        w.write_variable_length_count(self.events.len(), "beacon_events")?;
        for event in &self.events {
            w.write_i32(event.id);
            w.write_bool(event.triggered);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleCount {
    pub sale_id: u32,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MySale {
    pub sales: Vec<SaleCount>,
    pub primed: Dict<i32, bool>,
}

impl Section for MySale {
    const ID: SectionId = SectionId::MySale;

    fn is_present(version: GameVersion) -> bool {
        version >= 90_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        let n = r.read_variable_length_count()?;
        let mut sales = Vec::with_capacity(n.min(r.remaining() / 2));
        for _ in 0..n {
            sales.push(SaleCount {
                sale_id: r.read_variable_length_int()?,
                count: r.read_variable_length_int()?,
            });
        }
        Ok(Self {
            sales,
            primed: r.read_int_bool_dict()?,
        })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        w.write_variable_length_count(self.sales.len(), "my_sale")?;
        for sale in &self.sales {
            w.write_variable_length_int(sale.sale_id, "my_sale.sale_id")?;
            w.write_variable_length_int(sale.count, "my_sale.count")?;
        }
        w.write_int_bool_dict(&self.primed, "my_sale.primed")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnlockPopups {
    pub seen: Dict<i16, bool>,
}

impl Section for UnlockPopups {
    const ID: SectionId = SectionId::UnlockPopups;

    fn is_present(version: GameVersion) -> bool {
        version >= 90_000
    }

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        Ok(Self {
            seen: r.read_short_bool_dict()?,
        })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        w.write_short_bool_dict(&self.seen, "unlock_popups")
    }
}

impl MySale {
    pub fn count(&self, sale_id: u32) -> u32 {
        self.sales
            .iter()
            .find(|sale| sale.sale_id == sale_id)
            .map_or(0, |sale| sale.count)
    }

    pub fn set_count(&mut self, sale_id: u32, count: u32) -> Result<()> {
        if count >= 1 << 28 {
            return Err(SaveError::invariant(
                "my_sale.count",
                format!("{count} does not fit a variable-length int"),
            ));
        }
        match self.sales.iter_mut().find(|sale| sale.sale_id == sale_id) {
            Some(sale) => sale.count = count,
            None => self.sales.push(SaleCount { sale_id, count }),
        }
        Ok(())
    }
}
