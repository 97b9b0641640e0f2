// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Read-only view of a host tree used by the interaction engine.

/// Structural queries the engine needs from a host tree.
///
/// Collections use [`NodeTree::descendants`] to recover live tree order, and
/// dismissable layers use [`NodeTree::contains`] to decide whether an event
/// target lies inside or outside a layer. Stale handles must behave as absent
/// nodes: no parent, no descendants, never contained.
pub trait NodeTree<K: Copy + Eq> {
    /// Iterator over descendants in depth-first (document) order.
    type Descendants<'a>: Iterator<Item = K>
    where
        Self: 'a;

    /// Returns true if `node` refers to a live node.
    fn is_alive(&self, node: K) -> bool;

    /// Returns the parent of a live node, or `None` for roots and stale handles.
    fn parent_of(&self, node: K) -> Option<K>;

    /// Live descendants of `root` in depth-first order, excluding `root` itself.
    fn descendants(&self, root: K) -> Self::Descendants<'_>;

    /// Returns true if `node` is `ancestor` or lies in its subtree.
    fn contains(&self, ancestor: K, node: K) -> bool {
        if !self.is_alive(ancestor) || !self.is_alive(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent_of(n);
        }
        false
    }
}
