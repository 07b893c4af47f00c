// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn binary_payload_reports_byte_length() {
    let p = Payload::Binary(vec![1, 2, 3]);
    assert_eq!(p.len(), 3);
    assert!(!p.is_empty());
}

#[test]
fn text_payload_round_trips_as_string() {
    let p = Payload::Text("hello".to_string());
    assert_eq!(p.clone().into_string_lossy(), "hello");
    assert_eq!(p.into_bytes(), b"hello".to_vec());
}

#[test]
fn binary_payload_into_string_lossy_replaces_invalid_utf8() {
    let p = Payload::Binary(vec![0xff, 0xfe]);
    assert!(p.into_string_lossy().contains('\u{fffd}'));
}

#[test]
fn empty_payload_reports_empty() {
    assert!(Payload::Binary(Vec::new()).is_empty());
    assert!(Payload::Text(String::new()).is_empty());
}
