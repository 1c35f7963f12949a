use crate::error::Result;
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};

use super::{Section, SectionContext};

/// Rewards queued by server-side schemes and the ones already handed out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchemeItems {
    pub to_obtain: Vec<i32>,
    pub received: Vec<i32>,
}

impl Section for SchemeItems {
    const ID: SectionId = SectionId::SchemeItems;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        Ok(Self {
            to_obtain: r.read_int_list_prefixed()?,
            received: r.read_int_list_prefixed()?,
        })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        w.write_int_list_prefixed(&self.to_obtain, "scheme_items.to_obtain")?;
        w.write_int_list_prefixed(&self.received, "scheme_items.received")
    }
}
