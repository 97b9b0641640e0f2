// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overstory Primitives: headless composite widgets.
//!
//! Each primitive is a small state machine wired from the lower-level engine crates:
//!
//! - open, value and checked state live in a
//!   [`ControllableCell`](overstory_state::ControllableCell), so every primitive can be
//!   controlled or uncontrolled;
//! - content parts mount and unmount through a
//!   [`Presence`](overstory_presence::Presence) record, so exit animations finish before
//!   nodes leave the tree;
//! - overlays push a layer on the host's
//!   [`LayerStack`](overstory_dismiss::LayerStack) while their content is shown;
//! - composites with items register them in a collection scope and navigate them in live
//!   tree order.
//!
//! All of them operate on one [`Host`], which owns the node tree, the layer stack, the
//! collections and the clock. Host events enter through the `Host` (for dismissal) or
//! through the primitive's own input methods (`click`, `key_down`, ...).
//!
//! | Primitive | State | Notes |
//! | --- | --- | --- |
//! | [`Collapsible`] | `open: bool` | Trigger plus one present content part. |
//! | [`Accordion`] | `value: Vec<String>` | Collapsibles keyed by value; single or multiple. |
//! | [`Checkbox`] | [`CheckedState`] | Tri-state; the indicator is a present part. |
//! | [`Dialog`] | `open: bool` | Modal or not; overlay and content parts; one layer. |
//! | [`AlertDialog`] | `open: bool` | Always modal; ignores outside interaction. |
//! | [`Menu`] | `open: bool` | Items with roving highlight and typeahead. |
//!
//! ## Example
//!
//! ```rust
//! use overstory_primitives::{Collapsible, CollapsibleConfig, Host};
//!
//! let mut host = Host::new();
//! let body = host.body();
//! let mut section = Collapsible::new(&mut host, body, CollapsibleConfig::default());
//! assert_eq!(section.content(), None);
//!
//! section.toggle(&mut host);
//! assert!(section.is_open());
//! assert!(section.content().is_some());
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod accordion;
mod checkbox;
mod collapsible;
mod config;
mod dialog;
mod error;
mod host;
mod menu;
mod present;

pub use accordion::{Accordion, AccordionConfig, AccordionKind};
pub use checkbox::{Checkbox, CheckboxConfig, CheckedState};
pub use collapsible::{Collapsible, CollapsibleConfig};
pub use config::EngineConfig;
pub use dialog::{AlertDialog, Dialog, DialogConfig};
pub use error::Error;
pub use host::{CollectionItem, DismissHandlers, Host, Overlay};
pub use menu::{Menu, MenuConfig, MenuItem, SelectEvent};
