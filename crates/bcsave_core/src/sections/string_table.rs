use crate::error::Result;
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter, SaveString};

use super::{Section, SectionContext};

/// Free-form key/value strings at the end of the payload, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringTable {
    entries: Vec<(SaveString, SaveString)>,
}

impl StringTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&SaveString> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }

    /// Replace the value in place, or append a new entry.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        match self.entries.iter_mut().find(|(k, _)| k.as_str() == key) {
            Some((_, v)) => v.set(value),
            None => self
                .entries
                .push((SaveString::new(key), SaveString::new(value))),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<SaveString> {
        let idx = self.entries.iter().position(|(k, _)| k.as_str() == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Section for StringTable {
    const ID: SectionId = SectionId::StringTable;

    fn fresh(_ctx: &SectionContext) -> Self {
        Self::default()
    }

    fn decode(r: &mut ByteReader<'_>, _ctx: &SectionContext) -> Result<Self> {
        let n = r.read_count()?;
        let mut entries = Vec::with_capacity(n.min(r.remaining() / 8));
        for _ in 0..n {
            let key = r.read_string()?;
            let value = r.read_string()?;
            entries.push((key, value));
        }
        Ok(Self { entries })
    }

    fn encode(&self, w: &mut ByteWriter, _ctx: &SectionContext) -> Result<()> {
        w.write_count(self.entries.len(), "string_table")?;
        for (key, value) in &self.entries {
            w.write_string(key, "string_table.key")?;
            w.write_string(value, "string_table.value")?;
        }
        Ok(())
    }
}
