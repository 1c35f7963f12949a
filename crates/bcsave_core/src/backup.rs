//! Managed-item log and the signed backup payload built from it.
//!
//! Every change to a monetised currency is recorded as a managed item. The
//! log travels inside the save's string table so later sessions see earlier
//! deltas, and is rendered as canonical JSON when a backup is uploaded.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Result, SaveError};
use crate::sections::string_table::StringTable;
use crate::signature::Signature;

/// String-table key holding the JSON array of managed items.
pub const MANAGED_ITEMS_KEY: &str = "__managed_items__";

pub const NONCE_BYTES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManagedItemType {
    #[serde(rename = "catfood")]
    Catfood,
    #[serde(rename = "rareTicket")]
    RareTicket,
    #[serde(rename = "platinumTicket")]
    PlatinumTicket,
    #[serde(rename = "legendTicket")]
    LegendTicket,
}

impl ManagedItemType {
    pub const ALL: [ManagedItemType; 4] = [
        ManagedItemType::Catfood,
        ManagedItemType::RareTicket,
        ManagedItemType::PlatinumTicket,
        ManagedItemType::LegendTicket,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ManagedItemType::Catfood => "catfood",
            ManagedItemType::RareTicket => "rareTicket",
            ManagedItemType::PlatinumTicket => "platinumTicket",
            ManagedItemType::LegendTicket => "legendTicket",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Get,
    Use,
}

impl Direction {
    pub fn sign(&self) -> i64 {
        match self {
            Direction::Get => 1,
            Direction::Use => -1,
        }
    }
}

/// Field order is the wire key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedItem {
    pub amount: u32,
    pub detail_code: Uuid,
    pub detail_created_at: i64,
    pub detail_type: Direction,
    pub managed_item_type: ManagedItemType,
}

impl ManagedItem {
    pub fn signed_amount(&self) -> i64 {
        self.detail_type.sign() * i64::from(self.amount)
    }
}

/// Source of `detailCreatedAt` timestamps.
pub trait Clock {
    /// Unix seconds.
    fn now(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs() as i64)
    }
}

/// Account values the payload carries alongside the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadContext<'a> {
    pub inquiry_code: &'a str,
    pub play_time: i32,
    pub rank: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignedPayload<'a> {
    managed_item_details: &'a [ManagedItem],
    nonce: &'a str,
    play_time: i32,
    rank: u32,
    receipt_log_ids: [u8; 0],
    #[serde(rename = "signature_v1")]
    signature_v1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    save_key: Option<&'a str>,
}

fn to_json<T: Serialize>(value: &T, field: &'static str) -> Result<String> {
    serde_json::to_string(value).map_err(|err| SaveError::invariant(field, err.to_string()))
}

pub fn random_nonce<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    let mut bytes = [0u8; NONCE_BYTES];
    rng.fill_bytes(&mut bytes);
    let mut nonce = String::with_capacity(NONCE_BYTES * 2);
    for byte in bytes {
        let _ = write!(nonce, "{byte:02x}");
    }
    nonce
}

/// Append-only log of managed items. Tracks whether anything was recorded
/// since it was loaded so an untouched save keeps its stored text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackupMetaData {
    items: Vec<ManagedItem>,
    dirty: bool,
}

impl BackupMetaData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[ManagedItem] {
        &self.items
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Net signed amount recorded for `kind`.
    pub fn net_amount(&self, kind: ManagedItemType) -> i64 {
        self.items
            .iter()
            .filter(|item| item.managed_item_type == kind)
            .map(ManagedItem::signed_amount)
            .sum()
    }

    /// Record `delta` of `kind` with an OS-random id and the wall clock.
    pub fn record(&mut self, delta: i32, kind: ManagedItemType) -> Option<&ManagedItem> {
        self.record_with(delta, kind, &mut OsRng, &SystemClock)
    }

    /// A zero delta records nothing.
    pub fn record_with<R, C>(
        &mut self,
        delta: i32,
        kind: ManagedItemType,
        rng: &mut R,
        clock: &C,
    ) -> Option<&ManagedItem>
    where
        R: RngCore + CryptoRng,
        C: Clock + ?Sized,
    {
        if delta == 0 {
            return None;
        }
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        let item = ManagedItem {
            amount: delta.unsigned_abs(),
            detail_code: uuid::Builder::from_random_bytes(bytes).into_uuid(),
            detail_created_at: clock.now(),
            detail_type: if delta > 0 {
                Direction::Get
            } else {
                Direction::Use
            },
            managed_item_type: kind,
        };
        debug!(
            kind = kind.as_str(),
            delta,
            id = %item.detail_code,
            "recorded managed item"
        );
        self.push(item);
        self.items.last()
    }

    pub fn push(&mut self, item: ManagedItem) {
        self.items.push(item);
        self.dirty = true;
    }

    pub fn build_payload(&self, ctx: &PayloadContext<'_>, save_key: Option<&str>) -> Result<String> {
        let nonce = random_nonce(&mut OsRng);
        self.build_payload_with_nonce(ctx, save_key, &nonce)
    }

    /// Canonical payload JSON. `signature_v1` covers only the managed-items
    /// array, so it does not change with the nonce, play time or rank.
    pub fn build_payload_with_nonce(
        &self,
        ctx: &PayloadContext<'_>,
        save_key: Option<&str>,
        nonce: &str,
    ) -> Result<String> {
        let signature = Signature::new(ctx.inquiry_code)?;
        let items = to_json(&self.items, "managed_items")?;
        let signature_v1 = signature.sign(items.as_bytes())?;
        to_json(
            &SignedPayload {
                managed_item_details: &self.items,
                nonce,
                play_time: ctx.play_time,
                rank: ctx.rank,
                receipt_log_ids: [],
                signature_v1,
                save_key,
            },
            "backup_payload",
        )
    }

    /// Upload request signature over a finished payload.
    pub fn request_signature(inquiry_code: &str, payload: &str) -> Result<String> {
        Signature::new(inquiry_code)?.sign_tagged(payload.as_bytes())
    }

    /// Read the log from the string table. Malformed entries are skipped.
    pub(crate) fn load(table: &StringTable) -> Self {
        let Some(text) = table.get(MANAGED_ITEMS_KEY) else {
            return Self::default();
        };
        let values: Vec<serde_json::Value> = match serde_json::from_str(text.as_str()) {
            Ok(values) => values,
            Err(err) => {
                warn!(error = %err, "managed item log is not a JSON array, ignoring it");
                return Self::default();
            }
        };
        let mut items = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<ManagedItem>(value) {
                Ok(item) => items.push(item),
                Err(err) => warn!(index, error = %err, "skipping malformed managed item"),
            }
        }
        Self {
            items,
            dirty: false,
        }
    }

    /// The string table to encode: unchanged unless items were recorded.
    pub(crate) fn apply<'t>(&self, table: &'t StringTable) -> Result<Cow<'t, StringTable>> {
        if !self.dirty {
            return Ok(Cow::Borrowed(table));
        }
        let mut table = table.clone();
        table.set(MANAGED_ITEMS_KEY, to_json(&self.items, "managed_items")?);
        Ok(Cow::Owned(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use hmac::{Hmac, Mac};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use sha2::Sha256;

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now(&self) -> i64 {
            self.0
        }
    }

    fn nil_item() -> ManagedItem {
        ManagedItem {
            amount: 1,
            detail_code: Uuid::nil(),
            detail_created_at: 0,
            detail_type: Direction::Get,
            managed_item_type: ManagedItemType::RareTicket,
        }
    }

    #[test]
    fn zero_delta_records_nothing() {
        let mut log = BackupMetaData::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(
            log.record_with(0, ManagedItemType::Catfood, &mut rng, &FixedClock(5))
                .is_none()
        );
        assert!(!log.is_dirty());

        let item = log
            .record_with(-40, ManagedItemType::Catfood, &mut rng, &FixedClock(5))
            .cloned()
            .unwrap();
        assert_eq!(item.amount, 40);
        assert_eq!(item.detail_type, Direction::Use);
        assert_eq!(item.detail_created_at, 5);
        assert_eq!(item.detail_code.get_version_num(), 4);
        assert!(log.is_dirty());
    }

    #[test]
    fn payload_is_canonical_and_signed_over_the_items() {
        let mut log = BackupMetaData::new();
        log.push(nil_item());
        let nonce = "0".repeat(32);
        let ctx = PayloadContext {
            inquiry_code: "abcdefghi",
            play_time: 0,
            rank: 0,
        };
        let payload = log.build_payload_with_nonce(&ctx, None, &nonce).unwrap();

        let items = "[{\"amount\":1,\"detailCode\":\"00000000-0000-0000-0000-000000000000\",\"detailCreatedAt\":0,\"detailType\":\"get\",\"managedItemType\":\"rareTicket\"}]";
        let mut mac = Hmac::<Sha256>::new_from_slice(b"abcdefghi").unwrap();
        mac.update(items.as_bytes());
        let expected = format!("{:x}", mac.finalize().into_bytes());

        assert_eq!(
            payload,
            format!(
                "{{\"managedItemDetails\":{items},\"nonce\":\"{nonce}\",\"playTime\":0,\"rank\":0,\"receiptLogIds\":[],\"signature_v1\":\"{expected}\"}}"
            )
        );
    }

    #[test]
    fn signature_ignores_nonce_and_account_values() {
        let mut log = BackupMetaData::new();
        log.push(nil_item());
        let ctx = PayloadContext {
            inquiry_code: "abcdefghi",
            play_time: 0,
            rank: 0,
        };
        let first: serde_json::Value = serde_json::from_str(
            &log.build_payload_with_nonce(&ctx, None, &"0".repeat(32))
                .unwrap(),
        )
        .unwrap();
        let moved = PayloadContext {
            play_time: 7_200,
            rank: 40,
            ..ctx
        };
        let second: serde_json::Value = serde_json::from_str(
            &log.build_payload_with_nonce(&moved, Some("key"), &"f".repeat(32))
                .unwrap(),
        )
        .unwrap();
        assert_ne!(first["nonce"], second["nonce"]);
        assert_eq!(first["signature_v1"], second["signature_v1"]);
    }

    #[test]
    fn save_key_is_appended_last() {
        let log = BackupMetaData::new();
        let ctx = PayloadContext {
            inquiry_code: "abcdefghi",
            play_time: 30,
            rank: 12,
        };
        let payload = log
            .build_payload_with_nonce(&ctx, Some("key"), &"f".repeat(32))
            .unwrap();
        assert!(payload.starts_with("{\"managedItemDetails\":[],"));
        assert!(payload.ends_with(",\"saveKey\":\"key\"}"));
        assert!(!payload.contains(' '));
    }

    #[test]
    fn missing_key_material_fails_signing() {
        let ctx = PayloadContext {
            inquiry_code: "",
            play_time: 0,
            rank: 0,
        };
        let err = BackupMetaData::new().build_payload(&ctx, None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::SignatureFailed);
    }

    #[test]
    fn nonce_is_32_hex_chars() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let nonce = random_nonce(&mut rng);
        assert_eq!(nonce.len(), 32);
        assert!(nonce.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn load_skips_malformed_entries() {
        let mut table = StringTable::default();
        let good = serde_json::to_string(&nil_item()).unwrap();
        table.set(
            MANAGED_ITEMS_KEY,
            format!("[{good},{{\"amount\":\"lots\"}},{good}]"),
        );
        let log = BackupMetaData::load(&table);
        assert_eq!(log.items().len(), 2);
        assert!(!log.is_dirty());
        assert!(matches!(log.apply(&table).unwrap(), Cow::Borrowed(_)));

        table.set(MANAGED_ITEMS_KEY, "not json");
        assert!(BackupMetaData::load(&table).items().is_empty());
    }

    #[test]
    fn apply_writes_the_log_when_dirty() {
        let table = StringTable::default();
        let mut log = BackupMetaData::new();
        log.push(nil_item());
        let written = log.apply(&table).unwrap();
        let reloaded = BackupMetaData::load(&written);
        assert_eq!(reloaded.items(), log.items());
        assert_eq!(reloaded.net_amount(ManagedItemType::RareTicket), 1);
    }
}
