// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overstory Dismiss: a layer stack for outside-interaction dismissal.
//!
//! Overlays (dialogs, menus, popovers) close when the user clicks or focuses outside them
//! or presses Escape. With several overlays open at once, *which* overlay reacts depends
//! on their stacking order. [`LayerStack`] is the single owned registry of mounted layers
//! that answers that question:
//!
//! - **Pointer-down outside**: every layer that does not contain the target is notified,
//!   topmost first, down to and including the first modal layer
//!   ([`Layer::with_disable_outside_pointer_events`]). Layers beneath a modal layer are
//!   inert to pointer input.
//! - **Focus outside**: the same containment test, without the modal cut-off.
//! - **Escape**: only the topmost layer is notified, so nested overlays close innermost
//!   first.
//!
//! "Inside" covers the layer's node, its branches (regions rendered elsewhere that belong
//! to the layer, see [`Layer::with_branch`]) and any layer nested in it
//! ([`Layer::with_parent`]).
//!
//! ## Handlers and default prevention
//!
//! The stack does not own callbacks. Each dispatch method takes a handler closure that
//! receives the [`LayerId`] and a mutable [`DismissEvent`]; calling
//! [`DismissEvent::prevent_default`] keeps that layer open. The method returns the ids to
//! dismiss and the caller applies them once dispatch is over.
//!
//! ## Lifecycle
//!
//! Push a layer when its content mounts and remove it when the content unmounts, on every
//! exit path. A removed layer receives no further dispatch.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod stack;
mod types;

pub use stack::LayerStack;
pub use types::{DismissError, DismissEvent, DismissKind, Layer, LayerId};
