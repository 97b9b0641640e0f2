// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mode-switch diagnostics of controllable cells.

use overstory_state::ControllableCell;
use tracing_test::traced_test;

const MODE_SWITCH: &str = "switched between controlled and uncontrolled state";

#[traced_test]
#[test]
fn becoming_controlled_warns_once_and_keeps_mode() {
    let mut cell = ControllableCell::uncontrolled(1);
    cell.sync(Some(2));
    cell.sync(Some(3));
    assert!(!cell.is_controlled());
    assert_eq!(*cell.read(), 1);

    logs_assert(|lines: &[&str]| {
        match lines.iter().filter(|line| line.contains(MODE_SWITCH)).count() {
            1 => Ok(()),
            n => Err(format!("expected one warning, got {n}")),
        }
    });
}

#[traced_test]
#[test]
fn becoming_uncontrolled_warns() {
    let mut cell = ControllableCell::controlled(true);
    cell.sync(None);
    assert!(cell.is_controlled());
    assert!(logs_contain(MODE_SWITCH));
    assert!(logs_contain("WARN"));
}

#[traced_test]
#[test]
fn staying_in_mode_is_quiet() {
    let mut controlled = ControllableCell::controlled(0);
    controlled.sync(Some(5));
    let mut uncontrolled = ControllableCell::uncontrolled(0);
    uncontrolled.sync(None);
    assert!(!logs_contain(MODE_SWITCH));
}
