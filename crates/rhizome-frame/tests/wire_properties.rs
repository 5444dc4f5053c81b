//! Property tests over the version 1 wire format.

use proptest::prelude::*;
use rhizome_frame::{
    decode_frame, encode_frame, DecodeErrorKind, EncodeError, Field, Object, PayloadEncoding,
    MAX_PAYLOAD_LEN, MAX_STRING_LEN,
};

/// Strings whose UTF-8 encoding fits a u8 prefix.
fn short_string() -> impl Strategy<Value = String> {
    ".{0,80}".prop_filter("fits u8 prefix", |s| s.len() <= MAX_STRING_LEN)
}

fn uid() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,64}"
}

fn object_strategy() -> impl Strategy<Value = Object> {
    (
        any::<u8>(),
        any::<u8>(),
        any::<u8>(),
        uid(),
        [short_string(), short_string(), short_string(), short_string()],
        any::<u8>(),
        prop::collection::vec(any::<u8>(), 0..2048),
    )
        .prop_map(|(obj_type, cmd_type, ack_policy, uid, args, tag, payload)| {
            let [a1, a2, a3, a4] = args;
            Object::new(uid)
                .with_types(obj_type, cmd_type)
                .with_ack_policy(ack_policy)
                .with_args(a1, a2, a3, a4)
                .with_payload(PayloadEncoding::from_tag(tag), payload)
        })
}

proptest! {
    #[test]
    fn prop_roundtrip_identity(obj in object_strategy()) {
        let encoded = encode_frame(&obj).unwrap();
        let decoded = decode_frame(&encoded, None).unwrap();
        prop_assert_eq!(&decoded, &obj);
        prop_assert_eq!(&decoded.response.uid, &obj.uid);
    }

    #[test]
    fn prop_truncation_always_errors(obj in object_strategy(), cut in any::<prop::sample::Index>()) {
        let encoded = encode_frame(&obj).unwrap();
        let len = cut.index(encoded.len());
        prop_assert!(decode_frame(&encoded[..len], None).is_err());
    }

    #[test]
    fn prop_trailing_data_rejected(
        obj in object_strategy(),
        extra in prop::collection::vec(any::<u8>(), 1..64),
    ) {
        let mut wire = encode_frame(&obj).unwrap().to_vec();
        wire.extend_from_slice(&extra);
        let err = decode_frame(&wire, None).unwrap_err();
        prop_assert_eq!(err.kind, DecodeErrorKind::TrailingData { remaining: extra.len() });
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decode_frame(&bytes, None);
    }

    #[test]
    fn prop_unknown_version_rejected(version in 2u8.., rest in prop::collection::vec(any::<u8>(), 0..32)) {
        let mut wire = vec![version];
        wire.extend_from_slice(&rest);
        let err = decode_frame(&wire, None).unwrap_err();
        prop_assert_eq!(err.kind, DecodeErrorKind::UnsupportedVersion(version));
    }
}

#[test]
fn every_truncation_of_a_full_frame_errors() {
    let obj = Object::new("uid-123")
        .with_args("arg1", "arg2", "arg3", "arg4")
        .with_payload(PayloadEncoding::Json, &br#"{"k":1}"#[..]);
    let encoded = encode_frame(&obj).unwrap();
    for len in 0..encoded.len() {
        assert!(
            decode_frame(&encoded[..len], None).is_err(),
            "truncation to {len} bytes decoded"
        );
    }
}

#[test]
fn version_zero_rejected() {
    let err = decode_frame(&[0], None).unwrap_err();
    assert_eq!(err.kind, DecodeErrorKind::UnsupportedVersion(0));
}

#[test]
fn string_boundary() {
    let fits = Object::new("x".repeat(255)).with_args("y".repeat(255), "", "", "");
    let encoded = encode_frame(&fits).unwrap();
    assert_eq!(decode_frame(&encoded, None).unwrap(), fits);

    let over = Object::new("x".repeat(256));
    assert!(matches!(
        encode_frame(&over),
        Err(EncodeError::StringTooLong { len: 256, .. })
    ));
}

#[test]
fn payload_boundary() {
    let fits = Object::new("p").with_payload(PayloadEncoding::Na, vec![1u8; MAX_PAYLOAD_LEN]);
    let encoded = encode_frame(&fits).unwrap();
    assert_eq!(decode_frame(&encoded, None).unwrap(), fits);

    let over = Object::new("p").with_payload(PayloadEncoding::Na, vec![1u8; MAX_PAYLOAD_LEN + 1]);
    assert!(matches!(
        encode_frame(&over),
        Err(EncodeError::PayloadTooLarge { len: 65_536, .. })
    ));
}

#[test]
fn non_utf8_argument_rejects_whole_frame() {
    let obj = Object::new("u").with_args("", "ab", "", "");
    let mut wire = encode_frame(&obj).unwrap().to_vec();
    // version, three tags, uid len + "u", arg1 len, arg2 len, then arg2 bytes
    let arg2_start = 1 + 3 + 2 + 1 + 1;
    assert_eq!(&wire[arg2_start..arg2_start + 2], b"ab");
    wire[arg2_start] = 0xFF;

    let err = decode_frame(&wire, None).unwrap_err();
    assert_eq!(
        err.kind,
        DecodeErrorKind::InvalidUtf8 {
            field: Field::Arg2
        }
    );
}

#[test]
fn zero_uid_prefix_is_empty_uid_error() {
    // version, obj, cmd, ack policy, uid len 0, four empty args, encoding, empty payload
    let wire = [1u8, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    let err = decode_frame(&wire, None).unwrap_err();
    assert_eq!(err.kind, DecodeErrorKind::EmptyUid);
}
