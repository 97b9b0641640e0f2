// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overstory Collection: item registries that follow the live tree.
//!
//! Composite widgets (accordions, menus, tab lists) need to know their items in the order
//! the user sees them, even though items mount in arbitrary order, get reordered, or
//! render conditionally. Rather than tracking indices, items register their host node
//! in a scope and the registry asks the tree for the order whenever it is needed.
//!
//! - [`Collections`]: scoped registries. Each composite instance gets its own
//!   [`ScopeId`], so nested composites of the same kind never see each other's items.
//! - [`Collections::ordered_items`]: the registered entries of a scope in current
//!   document order, recomputed from the tree on every call.
//! - [`next_item`] / [`Navigation`]: roving keyboard navigation that skips disabled items.
//! - [`Typeahead`]: incremental text search across item labels.
//!
//! ## Minimal example
//!
//! ```rust
//! use overstory_collection::{Collections, Navigation, WrapMode, next_item};
//! use overstory_tree::{NodeAttrs, Tree};
//!
//! let mut tree = Tree::new();
//! let list = tree.insert(None, NodeAttrs::new());
//! let a = tree.insert(Some(list), NodeAttrs::new());
//! let b = tree.insert(Some(list), NodeAttrs::new());
//!
//! let mut collections = Collections::new();
//! let scope = collections.create_scope(list);
//! let _rb = collections.register(scope, b, ()).unwrap();
//! let _ra = collections.register(scope, a, ()).unwrap();
//!
//! // Move b in front of a: the order follows the tree.
//! tree.move_child(b, 0);
//! let items = collections.ordered_items(scope, &tree);
//! assert_eq!(items.iter().map(|e| e.node).collect::<Vec<_>>(), [b, a]);
//! assert_eq!(next_item(&items, Some(b), Navigation::Next, WrapMode::Never), Some(a));
//! ```
//!
//! The registry is generic over the node key, so any tree implementing
//! [`NodeTree`](overstory_tree::NodeTree) can back it.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod navigation;
mod registry;
mod typeahead;

pub use navigation::{ItemInfo, Key, Navigation, NavigationConfig, Orientation, WrapMode, next_item};
pub use registry::{CollectionEntry, CollectionError, Collections, ItemId, Registration, ScopeId};
pub use typeahead::{Typeahead, TypeaheadConfig};
