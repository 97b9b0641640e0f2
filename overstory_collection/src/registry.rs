// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scoped registries of collection items.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;
use overstory_tree::NodeTree;

/// Opaque token isolating one composite instance's items from its siblings and nested
/// instances of the same kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

/// Opaque identity of a registered item.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) u32);

/// A registered item: its identity, its host node, and caller metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionEntry<K, D> {
    /// Identity assigned at registration.
    pub id: ItemId,
    /// Host node of the item.
    pub node: K,
    /// Item metadata (for example a disabled flag or a text value).
    pub data: D,
}

/// Proof of a live registration.
///
/// Returned by [`Collections::register`] when an item mounts and consumed by
/// [`Collections::unregister`] when it unmounts. Dropping it without
/// unregistering leaves a dangling entry behind.
#[must_use = "pass the registration to `Collections::unregister` when the item unmounts"]
#[derive(Debug, PartialEq, Eq)]
pub struct Registration<K> {
    scope: ScopeId,
    item: ItemId,
    node: K,
}

impl<K: Copy> Registration<K> {
    /// Scope the item was registered in.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Identity assigned to the item.
    pub fn item(&self) -> ItemId {
        self.item
    }

    /// Host node the item was registered with.
    pub fn node(&self) -> K {
        self.node
    }
}

/// Errors from misuse of scopes and registrations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    /// The scope was never created or has been removed.
    #[error("unknown collection scope {0:?}")]
    UnknownScope(ScopeId),
    /// The registration was already released or replaced by a newer one.
    #[error("collection item {0:?} is no longer registered")]
    StaleRegistration(ItemId),
}

#[derive(Clone, Debug)]
struct Scope<K, D> {
    root: K,
    items: HashMap<K, CollectionEntry<K, D>>,
}

/// All collection scopes of a host.
///
/// Each composite instance creates its own scope with [`Collections::create_scope`],
/// rooted at the node its items render under. Items register as they mount; the
/// registry keeps no order of its own. [`Collections::ordered_items`] recomputes
/// order from the live tree on every call, so reordered or conditionally rendered
/// children are always reported in their current visual order.
///
/// ## Example
///
/// ```rust
/// use overstory_collection::Collections;
/// use overstory_tree::{NodeAttrs, Tree};
///
/// let mut tree = Tree::new();
/// let list = tree.insert(None, NodeAttrs::new());
/// let first = tree.insert(Some(list), NodeAttrs::new());
/// let second = tree.insert(Some(list), NodeAttrs::new());
///
/// let mut items = Collections::new();
/// let scope = items.create_scope(list);
/// // Mount order does not matter.
/// let r2 = items.register(scope, second, "second").unwrap();
/// let r1 = items.register(scope, first, "first").unwrap();
///
/// let order: Vec<_> = items.ordered_items(scope, &tree).iter().map(|e| e.data).collect();
/// assert_eq!(order, ["first", "second"]);
///
/// items.unregister(r1).unwrap();
/// items.unregister(r2).unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct Collections<K, D> {
    scopes: HashMap<ScopeId, Scope<K, D>>,
    next_scope: u32,
    next_item: u32,
}

impl<K, D> Default for Collections<K, D> {
    fn default() -> Self {
        Self {
            scopes: HashMap::new(),
            next_scope: 0,
            next_item: 0,
        }
    }
}

impl<K: Copy + Eq + Hash, D> Collections<K, D> {
    /// Create an empty set of scopes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope whose items render under `root`.
    pub fn create_scope(&mut self, root: K) -> ScopeId {
        let id = ScopeId(self.next_scope);
        self.next_scope = self.next_scope.wrapping_add(1);
        self.scopes.insert(
            id,
            Scope {
                root,
                items: HashMap::new(),
            },
        );
        id
    }

    /// Remove a scope and every entry in it.
    ///
    /// Returns the number of entries that were still registered.
    pub fn remove_scope(&mut self, scope: ScopeId) -> Result<usize, CollectionError> {
        let removed = self
            .scopes
            .remove(&scope)
            .ok_or(CollectionError::UnknownScope(scope))?;
        if !removed.items.is_empty() {
            tracing::debug!(
                ?scope,
                live = removed.items.len(),
                "scope removed with live items"
            );
        }
        Ok(removed.items.len())
    }

    /// Point a scope at a new root node (for example after its container remounts).
    pub fn set_root(&mut self, scope: ScopeId, root: K) -> Result<(), CollectionError> {
        self.scope_mut(scope)?.root = root;
        Ok(())
    }

    /// Root node of a scope.
    pub fn root(&self, scope: ScopeId) -> Option<K> {
        self.scopes.get(&scope).map(|s| s.root)
    }

    /// Register an item that just mounted.
    ///
    /// Registering a node that is already present in the scope replaces its entry;
    /// the older registration becomes stale.
    pub fn register(
        &mut self,
        scope: ScopeId,
        node: K,
        data: D,
    ) -> Result<Registration<K>, CollectionError> {
        let entries = &mut self
            .scopes
            .get_mut(&scope)
            .ok_or(CollectionError::UnknownScope(scope))?
            .items;
        let item = ItemId(self.next_item);
        self.next_item = self.next_item.wrapping_add(1);
        entries.insert(
            node,
            CollectionEntry {
                id: item,
                node,
                data,
            },
        );
        Ok(Registration { scope, item, node })
    }

    /// Release a registration when its item unmounts, returning the item metadata.
    pub fn unregister(&mut self, registration: Registration<K>) -> Result<D, CollectionError> {
        let Registration { scope, item, node } = registration;
        let entries = &mut self.scope_mut(scope)?.items;
        if !entries.get(&node).is_some_and(|e| e.id == item) {
            return Err(CollectionError::StaleRegistration(item));
        }
        entries
            .remove(&node)
            .map(|e| e.data)
            .ok_or(CollectionError::StaleRegistration(item))
    }

    /// Replace the metadata of a live registration.
    pub fn update_data(
        &mut self,
        registration: &Registration<K>,
        data: D,
    ) -> Result<(), CollectionError> {
        let entries = &mut self.scope_mut(registration.scope)?.items;
        match entries.get_mut(&registration.node) {
            Some(entry) if entry.id == registration.item => {
                entry.data = data;
                Ok(())
            }
            _ => Err(CollectionError::StaleRegistration(registration.item)),
        }
    }

    /// Entry registered for `node` in `scope`, if any.
    pub fn get(&self, scope: ScopeId, node: K) -> Option<&CollectionEntry<K, D>> {
        self.scopes.get(&scope)?.items.get(&node)
    }

    /// Number of registered entries in a scope (zero for unknown scopes).
    pub fn len(&self, scope: ScopeId) -> usize {
        self.scopes.get(&scope).map_or(0, |s| s.items.len())
    }

    /// Returns true if the scope has no registered entries.
    pub fn is_empty(&self, scope: ScopeId) -> bool {
        self.len(scope) == 0
    }

    /// Registered items of a scope in live tree order.
    ///
    /// Walks the descendants of the scope root in document order and keeps the
    /// nodes registered in this scope. Entries whose node is not (yet) in the tree
    /// under the root are dropped. Unknown or empty scopes yield an empty vector.
    pub fn ordered_items<T: NodeTree<K>>(
        &self,
        scope: ScopeId,
        tree: &T,
    ) -> Vec<&CollectionEntry<K, D>> {
        let Some(s) = self.scopes.get(&scope) else {
            return Vec::new();
        };
        if s.items.is_empty() {
            return Vec::new();
        }
        let ordered: Vec<_> = tree
            .descendants(s.root)
            .filter_map(|node| s.items.get(&node))
            .collect();
        if ordered.len() != s.items.len() {
            tracing::trace!(
                ?scope,
                registered = s.items.len(),
                rendered = ordered.len(),
                "registered items missing from the tree"
            );
        }
        ordered
    }

    fn scope_mut(&mut self, scope: ScopeId) -> Result<&mut Scope<K, D>, CollectionError> {
        self.scopes
            .get_mut(&scope)
            .ok_or(CollectionError::UnknownScope(scope))
    }
}
