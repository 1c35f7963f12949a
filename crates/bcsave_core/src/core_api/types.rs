use serde::Serialize;

use crate::backup::ManagedItem;
use crate::options::IntegrityStatus;
use crate::version::{CountryCode, GameVersion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub catfood: i32,
    pub xp: i32,
    pub normal_tickets: i32,
    pub rare_tickets: i32,
    pub platinum_tickets: i32,
    pub legend_tickets: i32,
    pub platinum_shards: i32,
    pub np: i32,
    pub leadership: i16,
    pub play_time: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub country: CountryCode,
    pub game_version: GameVersion,
    pub inquiry_code: String,
    pub counters: CounterSnapshot,
    pub user_rank: u32,
    pub owned_cats: usize,
    pub total_cats: usize,
    pub managed_items: Vec<ManagedItem>,
    pub integrity: IntegrityStatus,
}
