//! One codec per save section.
//!
//! Each section type decodes a bounded, version-determined span and encodes
//! the same layout back. Gates are written as plain comparisons against the
//! version stamp so each branch can be audited against the wire layout.

pub mod battle_items;
pub mod cat_shrine;
pub mod cats;
pub mod counters;
pub mod events;
pub mod gamatoto;
pub mod gambling;
pub mod gatya;
pub mod item_packs;
pub mod lineups;
pub mod login_bonuses;
pub mod maps;
pub mod medals;
pub mod missions;
pub mod officer_pass;
pub mod ototo;
pub mod resources;
pub mod scheme_items;
pub mod special_skills;
pub mod stamps;
pub mod string_table;
pub mod talent_orbs;
pub mod user_rank;

use crate::error::{Result, SaveError};
use crate::layout::SectionId;
use crate::stream::{ByteReader, ByteWriter};
use crate::version::GameVersion;

/// State shared by section codecs during a single decode or encode pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionContext {
    pub version: GameVersion,
    /// Number of cats, fixed by the cats section and used by later sections
    /// whose arrays carry no prefix of their own.
    pub cat_count: usize,
}

impl SectionContext {
    pub fn new(version: GameVersion) -> Self {
        Self {
            version,
            cat_count: 0,
        }
    }
}

pub trait Section: Sized {
    const ID: SectionId;

    /// Whether the section exists at all at `version`.
    fn is_present(_version: GameVersion) -> bool {
        true
    }

    /// A default value that encodes validly at `ctx.version`.
    fn fresh(ctx: &SectionContext) -> Self;

    fn decode(r: &mut ByteReader<'_>, ctx: &SectionContext) -> Result<Self>;

    fn encode(&self, w: &mut ByteWriter, ctx: &SectionContext) -> Result<()>;

    /// Publish anything later sections depend on.
    fn update_context(&self, _ctx: &mut SectionContext) {}
}

pub(crate) fn check_len(field: &'static str, actual: usize, expected: usize) -> Result<()> {
    if actual != expected {
        return Err(SaveError::invariant(
            field,
            format!("expected {expected} entries, found {actual}"),
        ));
    }
    Ok(())
}
