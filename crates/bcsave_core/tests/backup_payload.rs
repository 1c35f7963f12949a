use bcsave_core::backup::{Clock, Direction};
use bcsave_core::{CountryCode, ErrorCode, GameVersion, ManagedItemType, SaveFile, Signature};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;

struct FixedClock(i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

fn account() -> SaveFile {
    let mut file = SaveFile::new(CountryCode::En, GameVersion::new(110_600)).expect("fresh");
    file.set_inquiry_code("abcdefghi");
    file.save.counters.play_time = 900;
    file
}

fn parse(payload: &str) -> Value {
    serde_json::from_str(payload).expect("payload should be JSON")
}

#[test]
fn payload_reflects_the_account() {
    let mut file = account();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    file.add_managed_item_with(25, ManagedItemType::Catfood, &mut rng, &FixedClock(1_700_000_000));
    file.add_managed_item_with(-2, ManagedItemType::LegendTicket, &mut rng, &FixedClock(1_700_000_060));

    let nonce = "a".repeat(32);
    let payload = file
        .backup_payload_with_nonce(None, &nonce)
        .expect("payload");
    let json = parse(&payload);

    assert_eq!(json["playTime"], 900);
    assert_eq!(json["rank"], file.user_rank());
    assert_eq!(json["nonce"], nonce.as_str());
    assert_eq!(json["receiptLogIds"], Value::Array(Vec::new()));
    assert!(json.get("saveKey").is_none());

    let details = json["managedItemDetails"].as_array().expect("details");
    assert_eq!(details.len(), 2);
    assert_eq!(details[0]["amount"], 25);
    assert_eq!(details[0]["detailType"], "get");
    assert_eq!(details[0]["detailCreatedAt"], 1_700_000_000i64);
    assert_eq!(details[1]["managedItemType"], "legendTicket");
    assert_eq!(details[1]["detailType"], "use");
}

#[test]
fn signature_is_over_the_managed_items_array() {
    let mut file = account();
    file.set_rare_tickets(4).expect("rare tickets");
    let payload = file
        .backup_payload_with_nonce(Some("save-key"), &"0".repeat(32))
        .expect("payload");

    let items = serde_json::to_string(file.managed_items()).expect("items");
    let expected = Signature::new("abcdefghi")
        .expect("key")
        .sign(items.as_bytes())
        .expect("sign");
    let json = parse(&payload);
    assert_eq!(json["signature_v1"], expected.as_str());
    assert_eq!(json["saveKey"], "save-key");
    assert!(payload.starts_with(&format!("{{\"managedItemDetails\":{items},")));
}

#[test]
fn signature_is_stable_across_nonces() {
    let mut file = account();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    file.add_managed_item_with(7, ManagedItemType::PlatinumTicket, &mut rng, &FixedClock(0));

    let nonce = "1".repeat(32);
    let first = file.backup_payload_with_nonce(None, &nonce).expect("payload");
    let second = file.backup_payload_with_nonce(None, &nonce).expect("payload");
    assert_eq!(first, second);

    let other = file
        .backup_payload_with_nonce(None, &"2".repeat(32))
        .expect("payload");
    assert_ne!(first, other);
    assert_eq!(
        parse(&first)["signature_v1"],
        parse(&other)["signature_v1"]
    );

    file.save.counters.play_time += 60;
    let later = file.backup_payload_with_nonce(None, &nonce).expect("payload");
    assert_eq!(parse(&later)["playTime"], 960);
    assert_eq!(
        parse(&first)["signature_v1"],
        parse(&later)["signature_v1"]
    );

    file.add_managed_item_with(-1, ManagedItemType::PlatinumTicket, &mut rng, &FixedClock(0));
    let spent = file.backup_payload_with_nonce(None, &nonce).expect("payload");
    assert_ne!(
        parse(&first)["signature_v1"],
        parse(&spent)["signature_v1"]
    );
}

#[test]
fn random_nonce_changes_between_payloads() {
    let file = account();
    let first = parse(&file.backup_payload(None).expect("payload"));
    let second = parse(&file.backup_payload(None).expect("payload"));
    let nonce = first["nonce"].as_str().expect("nonce");
    assert_eq!(nonce.len(), 32);
    assert!(nonce.bytes().all(|b| b.is_ascii_hexdigit()));
    assert_ne!(first["nonce"], second["nonce"]);
}

#[test]
fn payload_does_not_consume_items() {
    let mut file = account();
    file.set_catfood(10).expect("catfood");
    file.backup_payload(None).expect("payload");
    assert_eq!(file.managed_items().len(), 1);

    let reopened = SaveFile::open(&file.serialize().expect("encode")).expect("decode");
    assert_eq!(reopened.managed_items().len(), 1);
    assert_eq!(reopened.managed_items()[0].detail_type, Direction::Get);
}

#[test]
fn missing_inquiry_code_fails_signing() {
    let file = SaveFile::new(CountryCode::Tw, GameVersion::new(110_600)).expect("fresh");
    let err = file.backup_payload(None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::SignatureFailed);
}

#[test]
fn request_signature_uses_the_tagged_construction() {
    let payload = account()
        .backup_payload_with_nonce(None, &"0".repeat(32))
        .expect("payload");
    let request = bcsave_core::BackupMetaData::request_signature("abcdefghi", &payload)
        .expect("request signature");
    let plain = Signature::new("abcdefghi")
        .expect("key")
        .sign(format!("HMACSHA256{payload}").as_bytes())
        .expect("sign");
    assert_eq!(request, plain);
}
