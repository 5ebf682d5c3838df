//! Tests for the Serializer Registry
//!
//! These tests verify:
//! - Tag resolution (aliases, case, unknown tags)
//! - Round-trip encode/decode for every concrete codec
//! - Write-time inference and its documented ambiguities

use colkv::error::CodecError;
use colkv::serializer::{infer, resolve, INFERENCE_TABLE};
use colkv::{ColError, Serializer, Value};
use proptest::prelude::*;

// =============================================================================
// Resolution Tests
// =============================================================================

#[test]
fn test_resolve_known_tags() {
    assert_eq!(resolve("bytes").unwrap(), Serializer::Bytes);
    assert_eq!(resolve("string").unwrap(), Serializer::String);
    assert_eq!(resolve("ascii").unwrap(), Serializer::Ascii);
    assert_eq!(resolve("integer").unwrap(), Serializer::Integer);
    assert_eq!(resolve("long").unwrap(), Serializer::Long);
    assert_eq!(resolve("boolean").unwrap(), Serializer::Boolean);
    assert_eq!(resolve("double").unwrap(), Serializer::Double);
    assert_eq!(resolve("infer").unwrap(), Serializer::Infer);
}

#[test]
fn test_resolve_is_case_insensitive_and_accepts_symbol_prefix() {
    assert_eq!(resolve(":string").unwrap(), Serializer::String);
    assert_eq!(resolve("LONG").unwrap(), Serializer::Long);
    assert_eq!("Bytes".parse::<Serializer>().unwrap(), Serializer::Bytes);
}

#[test]
fn test_resolve_unknown_tag() {
    match resolve("uuid") {
        Err(ColError::UnknownSerializer(tag)) => assert_eq!(tag, "uuid"),
        other => panic!("Expected UnknownSerializer, got {:?}", other),
    }
}

#[test]
fn test_tag_round_trips_through_resolve() {
    for (_, serializer) in INFERENCE_TABLE {
        assert_eq!(resolve(serializer.tag()).unwrap(), serializer);
    }
}

// =============================================================================
// Inference Tests
// =============================================================================

#[test]
fn test_inference_table_covers_every_variant() {
    assert_eq!(infer(&Value::from(b"raw")), Serializer::Bytes);
    assert_eq!(infer(&Value::from("text")), Serializer::String);
    assert_eq!(infer(&Value::from(7i32)), Serializer::Integer);
    assert_eq!(infer(&Value::from(7i64)), Serializer::Long);
    assert_eq!(infer(&Value::from(true)), Serializer::Boolean);
    assert_eq!(infer(&Value::from(1.5f64)), Serializer::Double);
}

#[test]
fn test_infer_encodes_by_runtime_type() {
    assert_eq!(Serializer::Infer.encode(&Value::from("a")).unwrap(), b"a".to_vec());
    assert_eq!(Serializer::Infer.encode(&Value::Integer(1)).unwrap(), vec![0, 0, 0, 1]);
    assert_eq!(Serializer::Infer.encode(&Value::Long(1)).unwrap().len(), 8);
}

#[test]
fn test_integer_and_long_widths_are_not_interchangeable() {
    let as_integer = Serializer::Infer.encode(&Value::Integer(1)).unwrap();
    let as_long = Serializer::Infer.encode(&Value::Long(1)).unwrap();

    assert!(matches!(
        Serializer::Long.decode(&as_integer),
        Err(CodecError::Width { expected: 8, actual: 4, .. })
    ));
    assert!(matches!(
        Serializer::Integer.decode(&as_long),
        Err(CodecError::Width { expected: 4, actual: 8, .. })
    ));
}

#[test]
fn test_infer_is_write_only() {
    assert_eq!(Serializer::Infer.decode(b"a"), Err(CodecError::InferOnRead));
}

#[test]
fn test_concrete_for() {
    assert_eq!(Serializer::Infer.concrete_for(&Value::from("k")), Serializer::String);
    assert_eq!(Serializer::Long.concrete_for(&Value::from("k")), Serializer::Long);
}

// =============================================================================
// Codec Edge Cases
// =============================================================================

#[test]
fn test_ascii_rejects_non_ascii() {
    assert!(Serializer::Ascii.encode(&Value::from("héllo")).is_err());
    assert!(Serializer::Ascii.decode("héllo".as_bytes()).is_err());
}

#[test]
fn test_string_rejects_invalid_utf8() {
    assert!(matches!(
        Serializer::String.decode(&[0xff, 0xfe]),
        Err(CodecError::Invalid { tag: "string", .. })
    ));
}

#[test]
fn test_boolean_rejects_other_bytes() {
    assert_eq!(Serializer::Boolean.decode(&[1]).unwrap(), Value::Boolean(true));
    assert!(Serializer::Boolean.decode(&[2]).is_err());
}

#[test]
fn test_concrete_codec_rejects_other_types() {
    assert!(matches!(
        Serializer::Integer.encode(&Value::from("1")),
        Err(CodecError::TypeMismatch { tag: "integer", found: "string" })
    ));
}

// =============================================================================
// Round-Trip Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_bytes_round_trip(b in proptest::collection::vec(any::<u8>(), 0..64)) {
        let v = Value::Bytes(b);
        prop_assert_eq!(Serializer::Bytes.decode(&Serializer::Bytes.encode(&v).unwrap()).unwrap(), v);
    }

    #[test]
    fn prop_string_round_trip(s in ".*") {
        let v = Value::String(s);
        prop_assert_eq!(Serializer::String.decode(&Serializer::String.encode(&v).unwrap()).unwrap(), v);
    }

    #[test]
    fn prop_ascii_round_trip(s in "[ -~]*") {
        let v = Value::String(s);
        prop_assert_eq!(Serializer::Ascii.decode(&Serializer::Ascii.encode(&v).unwrap()).unwrap(), v);
    }

    #[test]
    fn prop_integer_round_trip(n in any::<i32>()) {
        let v = Value::Integer(n);
        prop_assert_eq!(Serializer::Integer.decode(&Serializer::Integer.encode(&v).unwrap()).unwrap(), v);
    }

    #[test]
    fn prop_long_round_trip(n in any::<i64>()) {
        let v = Value::Long(n);
        prop_assert_eq!(Serializer::Long.decode(&Serializer::Long.encode(&v).unwrap()).unwrap(), v);
    }

    #[test]
    fn prop_boolean_round_trip(b in any::<bool>()) {
        let v = Value::Boolean(b);
        prop_assert_eq!(Serializer::Boolean.decode(&Serializer::Boolean.encode(&v).unwrap()).unwrap(), v);
    }

    #[test]
    fn prop_double_round_trip(d in any::<f64>()) {
        let v = Value::Double(d);
        prop_assert_eq!(Serializer::Double.decode(&Serializer::Double.encode(&v).unwrap()).unwrap(), v);
    }

    #[test]
    fn prop_infer_then_concrete_decode(n in any::<i64>()) {
        let v = Value::Long(n);
        let bytes = Serializer::Infer.encode(&v).unwrap();
        prop_assert_eq!(infer(&v).decode(&bytes).unwrap(), v);
    }
}
