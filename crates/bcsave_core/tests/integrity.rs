use bcsave_core::trailer::{self, TRAILER_LEN};
use bcsave_core::{
    CountryCode, ErrorCode, GameVersion, IntegrityPolicy, IntegrityStatus, OpenOptions, SaveFile,
    SectionId,
};

fn sample() -> Vec<u8> {
    let mut file = SaveFile::new(CountryCode::En, GameVersion::new(110_600)).expect("fresh");
    file.set_inquiry_code("abcdefghi");
    file.set_catfood(75).expect("catfood");
    file.set_cat_count(30);
    file.serialize().expect("encode")
}

/// Append a trailer that matches `payload`.
fn reseal(country: CountryCode, payload: &[u8]) -> Vec<u8> {
    let mut out = payload.to_vec();
    out.extend_from_slice(trailer::compute(country, payload).as_bytes());
    out
}

#[test]
fn trailer_is_lowercase_hex() {
    let bytes = sample();
    let stored = &bytes[bytes.len() - TRAILER_LEN..];
    assert!(
        stored
            .iter()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(b))
    );
    let file = SaveFile::open(&bytes).expect("decode");
    assert_eq!(file.integrity(), &IntegrityStatus::Verified);
}

#[test]
fn mismatch_is_rejected_with_the_model_attached() {
    let mut bytes = sample();
    let at = bytes.len() - 1;
    bytes[at] = if bytes[at] == b'0' { b'1' } else { b'0' };

    let err = SaveFile::open(&bytes).unwrap_err();
    assert_eq!(err.code(), ErrorCode::IntegrityFailed);
    assert!(err.code().is_recoverable());
    let recovered = err.into_save().expect("model rides along");
    assert_eq!(recovered.catfood(), 75);
    assert!(recovered.integrity().is_mismatch());
}

#[test]
fn mismatch_can_be_accepted() {
    let mut bytes = sample();
    let at = bytes.len() - TRAILER_LEN;
    bytes[at] ^= 0x01;

    let options = OpenOptions::new().integrity(IntegrityPolicy::Accept);
    let file = SaveFile::open_with(&bytes, &options).expect("accepted");
    match file.integrity() {
        IntegrityStatus::Mismatch { stored, computed } => {
            assert_ne!(stored, computed);
            assert_eq!(computed.len(), TRAILER_LEN);
        }
        other => panic!("expected mismatch, got {other:?}"),
    }

    // Re-encoding writes a fresh trailer.
    let healed = file.serialize().expect("encode");
    assert_eq!(
        SaveFile::open(&healed).expect("decode").integrity(),
        &IntegrityStatus::Verified
    );
}

#[test]
fn trailer_salt_depends_on_country() {
    let payload = b"same payload";
    assert_ne!(
        trailer::compute(CountryCode::En, payload),
        trailer::compute(CountryCode::Jp, payload)
    );
}

#[test]
fn truncated_input_is_reported() {
    let bytes = sample();
    let file = SaveFile::open(&bytes).expect("decode");
    let preamble_end = file
        .layout()
        .section(SectionId::Preamble)
        .expect("preamble")
        .range
        .end;

    let short = reseal(CountryCode::En, &bytes[..preamble_end + 4]);
    let err = SaveFile::open(&short).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Truncated);

    let err = SaveFile::open(&bytes[..10]).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Truncated);
}

#[test]
fn implausible_counts_are_refused() {
    let bytes = sample();
    let options = OpenOptions::new().count_cap(16);
    let err = SaveFile::open_with(&bytes, &options).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Implausible);
    assert!(!err.code().is_recoverable());

    assert!(SaveFile::open_with(&bytes, &OpenOptions::new().count_cap(1 << 16)).is_ok());
}

#[test]
fn bytes_after_the_string_table_survive_a_round_trip() {
    let bytes = sample();
    let mut payload = bytes[..bytes.len() - TRAILER_LEN].to_vec();
    payload.extend_from_slice(&[0xAB, 0xCD, 0x00, 0x7F]);
    let extended = reseal(CountryCode::En, &payload);

    let file = SaveFile::open(&extended).expect("decode");
    assert_eq!(file.tail(), &[0xABu8, 0xCD, 0x00, 0x7F]);
    let tail = file.layout().section(SectionId::Tail).expect("tail").range;
    assert_eq!(tail.len(), 4);
    assert_eq!(file.serialize().expect("encode"), extended);
}

#[test]
fn malformed_managed_item_log_is_left_untouched() {
    let mut file = SaveFile::new(CountryCode::Kr, GameVersion::new(110_600)).expect("fresh");
    file.save
        .string_table
        .set("__managed_items__", r#"[{"amount":1},{"oops":true}]"#);
    let bytes = file.serialize().expect("encode");

    let reopened = SaveFile::open(&bytes).expect("decode");
    assert!(reopened.managed_items().is_empty());
    assert_eq!(reopened.serialize().expect("re-encode"), bytes);

    file.save.string_table.set("__managed_items__", "not json");
    let bytes = file.serialize().expect("encode");
    let reopened = SaveFile::open(&bytes).expect("decode");
    assert!(reopened.managed_items().is_empty());
    assert_eq!(reopened.serialize().expect("re-encode"), bytes);
}

#[test]
fn unknown_country_and_version_are_rejected() {
    let bytes = sample();
    let mut payload = bytes[..bytes.len() - TRAILER_LEN].to_vec();

    // Preamble: i32 length 2, "en", i32 version.
    payload[4..6].copy_from_slice(b"zz");
    let err = SaveFile::open(&reseal(CountryCode::En, &payload)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidEncoding);

    payload[4..6].copy_from_slice(b"en");
    payload[6..10].copy_from_slice(&0i32.to_le_bytes());
    let err = SaveFile::open(&reseal(CountryCode::En, &payload)).unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnsupportedVersion);
}
