// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overstory Tree: the host node tree the interaction engine runs against.
//!
//! Headless primitives need a handful of answers from the platform that renders them:
//! which nodes exist right now, what order they appear in, whether one node lies inside
//! another, and what a styling layer has declared about a node (its visible state and its
//! exit animation). This crate models exactly that and nothing more.
//!
//! - [`Tree`]: generational node storage with parent/child structure and document order.
//! - [`NodeId`]: generational handle of a node; stale handles behave as absent nodes.
//! - [`NodeAttrs`] / [`NodeFlags`]: the host-visible attributes of a node
//!   (`data-state`, `data-disabled`, `data-highlighted`, focusability, exit animation).
//! - [`NodeTree`]: the read-only trait the rest of the engine queries, so other hosts
//!   can plug in their own tree.
//!
//! ## Not a renderer
//!
//! The tree stores no geometry and performs no layout or painting. Callers mirror their
//! real render tree into it (or implement [`NodeTree`] over their own).
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod lookup;
mod tree;
mod types;

pub use lookup::NodeTree;
pub use tree::{Descendants, Tree};
pub use types::{NodeAttrs, NodeFlags, NodeId};
