// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Diagnostics emitted through `tracing`.

use overstory_primitives::{Dialog, DialogConfig, Host};
use tracing_test::traced_test;

#[traced_test]
#[test]
fn dialog_without_title_warns_on_open() {
    let mut host = Host::new();
    let mut dialog = Dialog::new(&mut host, DialogConfig {
        has_description: true,
        ..DialogConfig::default()
    })
    .unwrap();
    assert!(!logs_contain("no title"));

    dialog.open(&mut host).unwrap();
    assert!(logs_contain("dialog content has no title"));
    assert!(!logs_contain("no description"));
}

#[traced_test]
#[test]
fn labelled_dialog_is_quiet() {
    let mut host = Host::new();
    let mut dialog = Dialog::new(&mut host, DialogConfig {
        has_title: true,
        has_description: true,
        ..DialogConfig::default()
    })
    .unwrap();
    dialog.open(&mut host).unwrap();
    assert!(!logs_contain("WARN"));
}
