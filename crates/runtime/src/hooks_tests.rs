// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn identity_hooks_decode_is_passthrough() {
    let hooks = IdentityHooks;
    let payload = hooks.decode_data(vec![1, 2, 3]).expect("decode");
    assert_eq!(payload, Payload::Binary(vec![1, 2, 3]));
}

#[test]
fn identity_hooks_open_file_yields_the_name_as_sole_item() {
    let hooks = IdentityHooks;
    let items = hooks.open_file("frame-0042.hdf5").expect("open_file");
    assert_eq!(items, vec![Payload::Text("frame-0042.hdf5".to_string())]);
}

#[test]
fn identity_hooks_process_data_returns_input_unchanged() {
    let hooks = IdentityHooks;
    let out = hooks.process_data(Payload::Binary(vec![9, 9]), Priority::High).expect("process");
    assert_eq!(out, Payload::Binary(vec![9, 9]));
}

#[test]
fn identity_hooks_config_is_a_no_op() {
    let hooks = IdentityHooks;
    hooks.config("{}");
}
