// SPDX-License-Identifier: MIT

use super::*;
use std::io::Cursor;

#[test]
fn binary_high_priority_round_trips() {
    let mut buf = Vec::new();
    write_frame(&mut buf, &Payload::Binary(vec![1, 2, 3]), Priority::High).expect("write");
    let mut cursor = Cursor::new(buf);
    let (payload, priority) = read_frame(&mut cursor).expect("read").expect("some frame");
    assert_eq!(payload, Payload::Binary(vec![1, 2, 3]));
    assert_eq!(priority, Priority::High);
}

#[test]
fn text_low_priority_round_trips() {
    let mut buf = Vec::new();
    write_frame(&mut buf, &Payload::Text("hello".into()), Priority::Low).expect("write");
    let mut cursor = Cursor::new(buf);
    let (payload, priority) = read_frame(&mut cursor).expect("read").expect("some frame");
    assert_eq!(payload, Payload::Text("hello".into()));
    assert_eq!(priority, Priority::Low);
}

#[test]
fn multiple_frames_in_sequence() {
    let mut buf = Vec::new();
    write_frame(&mut buf, &Payload::Binary(vec![1]), Priority::High).expect("write");
    write_frame(&mut buf, &Payload::Binary(vec![2]), Priority::Low).expect("write");
    let mut cursor = Cursor::new(buf);
    let (first, _) = read_frame(&mut cursor).expect("read").expect("first");
    let (second, _) = read_frame(&mut cursor).expect("read").expect("second");
    assert_eq!(first, Payload::Binary(vec![1]));
    assert_eq!(second, Payload::Binary(vec![2]));
}

#[test]
fn clean_eof_before_any_byte_yields_none() {
    let mut cursor = Cursor::new(Vec::<u8>::new());
    assert!(read_frame(&mut cursor).expect("read").is_none());
}

#[test]
fn empty_payload_round_trips() {
    let mut buf = Vec::new();
    write_frame(&mut buf, &Payload::Binary(vec![]), Priority::High).expect("write");
    let mut cursor = Cursor::new(buf);
    let (payload, _) = read_frame(&mut cursor).expect("read").expect("some frame");
    assert_eq!(payload, Payload::Binary(vec![]));
}
