// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end behavior of the non-overlay primitives.

use std::cell::RefCell;
use std::rc::Rc;

use overstory_collection::Key;
use overstory_primitives::{
    Accordion, AccordionConfig, AccordionKind, Checkbox, CheckboxConfig, CheckedState,
    Collapsible, CollapsibleConfig, Dialog, DialogConfig, EngineConfig, Host,
};
use overstory_presence::PresenceConfig;
use overstory_tree::NodeAttrs;

#[test]
fn single_accordion_keeps_one_item_open() {
    let mut host = Host::new();
    let body = host.body();
    let mut accordion = Accordion::new(&mut host, body, AccordionConfig::default());
    for value in ["a", "b", "c"] {
        accordion.add_item(&mut host, value, false).unwrap();
    }

    accordion.click(&mut host, "a").unwrap();
    assert_eq!(accordion.value(), ["a"]);
    // Not collapsible: clicking the open item changes nothing.
    accordion.click(&mut host, "a").unwrap();
    assert_eq!(accordion.value(), ["a"]);

    accordion.click(&mut host, "b").unwrap();
    assert_eq!(accordion.value(), ["b"]);
    assert!(accordion.item("a").unwrap().content().is_none());
    assert!(accordion.item("b").unwrap().content().is_some());
}

#[test]
fn controlled_accordion_waits_for_the_owner() {
    let requests = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&requests);
    let mut host = Host::new();
    let body = host.body();
    let mut accordion = Accordion::new(&mut host, body, AccordionConfig {
        kind: AccordionKind::Multiple,
        value: Some(Vec::new()),
        ..AccordionConfig::default()
    })
    .with_on_value_change(move |v| seen.borrow_mut().push(v.clone()));
    accordion.add_item(&mut host, "x", false).unwrap();

    accordion.click(&mut host, "x").unwrap();
    assert_eq!(*requests.borrow(), [vec![String::from("x")]]);
    assert!(accordion.value().is_empty());
    assert!(!accordion.is_item_open("x"));

    accordion.sync_value(&mut host, Some(vec!["x".into()]));
    assert!(accordion.is_item_open("x"));
}

#[test]
fn accordion_navigation_follows_tree_order() {
    let mut host = Host::new();
    let body = host.body();
    let mut accordion = Accordion::new(&mut host, body, AccordionConfig::default());
    for value in ["one", "two", "three"] {
        accordion.add_item(&mut host, value, false).unwrap();
    }
    let trigger = |a: &Accordion, v: &str| a.item(v).unwrap().trigger();

    accordion.move_item(&mut host, "three", 0).unwrap();
    let first = trigger(&accordion, "three");
    let next = accordion
        .key_down(&mut host, first, Key::ArrowDown)
        .unwrap();
    assert_eq!(next, Some(trigger(&accordion, "one")));

    accordion.set_disabled(&mut host, true).unwrap();
    assert_eq!(accordion.key_down(&mut host, first, Key::Home).unwrap(), None);
}

#[test]
fn checkbox_leaves_indeterminate_as_checked() {
    let mut host = Host::new();
    let body = host.body();
    let mut checkbox = Checkbox::new(&mut host, body, CheckboxConfig::default());
    assert_eq!(checkbox.indicator(), None);

    checkbox.set_checked(&mut host, CheckedState::Indeterminate);
    let indicator = checkbox.indicator().unwrap();
    assert_eq!(host.tree.state(indicator), Some("indeterminate"));

    assert!(checkbox.key_down(&mut host, Key::Space));
    assert_eq!(checkbox.checked(), CheckedState::Checked);
    assert_eq!(host.tree.state(checkbox.node()), Some("checked"));

    checkbox.click(&mut host);
    assert_eq!(checkbox.checked(), CheckedState::Unchecked);
    assert_eq!(checkbox.indicator(), None);

    checkbox.reset(&mut host);
    assert_eq!(checkbox.checked(), CheckedState::Unchecked);
}

#[test]
fn content_without_animation_leaves_at_once() {
    let mut host = Host::new();
    let body = host.body();
    let mut section = Collapsible::new(&mut host, body, CollapsibleConfig {
        default_open: true,
        ..CollapsibleConfig::default()
    });
    let content = section.content().unwrap();
    section.toggle(&mut host);
    assert_eq!(section.content(), None);
    assert!(!host.tree.is_alive(content));
    assert_eq!(host.exit_token(content), None);
}

#[test]
fn stale_animation_end_is_ignored() {
    let mut host = Host::new();
    let body = host.body();
    let mut section = Collapsible::new(&mut host, body, CollapsibleConfig {
        default_open: true,
        content_attrs: NodeAttrs::new().with_exit_animation("collapse"),
        ..CollapsibleConfig::default()
    });
    let content = section.content().unwrap();

    section.toggle(&mut host);
    let stale = host.exit_token(content).unwrap();
    // Reopen mid-exit, then close again.
    section.toggle(&mut host);
    assert_eq!(host.exit_token(content), None);
    section.toggle(&mut host);
    let current = host.exit_token(content).unwrap();
    assert_ne!(stale, current);

    assert!(section.finish_animation(&mut host, content, stale));
    assert_eq!(section.content(), Some(content));

    assert!(section.finish_animation(&mut host, content, current));
    assert_eq!(section.content(), None);
}

#[test]
fn missing_animation_end_times_out() {
    let mut host = Host::with_config(EngineConfig {
        presence: PresenceConfig {
            exit_timeout_ms: Some(300),
        },
        ..EngineConfig::default()
    });
    let mut dialog = Dialog::new(&mut host, DialogConfig {
        default_open: true,
        has_title: true,
        has_description: true,
        content_attrs: NodeAttrs::new().with_exit_animation("fade"),
        ..DialogConfig::default()
    })
    .unwrap();

    dialog.close(&mut host).unwrap();
    assert!(dialog.content().is_some());
    assert!(host.layers.is_empty());

    host.advance(299, &mut [&mut dialog]).unwrap();
    assert!(dialog.content().is_some());
    host.advance(1, &mut [&mut dialog]).unwrap();
    assert_eq!(dialog.content(), None);
}
