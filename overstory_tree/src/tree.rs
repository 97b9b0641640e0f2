// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, attributes, traversal.

use alloc::{vec, vec::Vec};

use crate::lookup::NodeTree;
use crate::types::{NodeAttrs, NodeFlags, NodeId};

/// Host node tree.
///
/// Nodes live in generational slots: removing a node frees its slot, and a
/// later insert into the same slot bumps the generation so stale [`NodeId`]s
/// never alias a new node. Children are kept in insertion order unless moved
/// with [`Tree::move_child`]; that order is the tree (document) order reported
/// by [`Tree::descendants`].
///
/// ## Example
///
/// ```rust
/// use overstory_tree::{NodeAttrs, Tree};
///
/// let mut tree = Tree::new();
/// let root = tree.insert(None, NodeAttrs::new());
/// let a = tree.insert(Some(root), NodeAttrs::new());
/// let b = tree.insert(Some(root), NodeAttrs::new());
///
/// assert_eq!(tree.descendants(root).collect::<Vec<_>>(), vec![a, b]);
///
/// // Move `b` in front of `a`.
/// tree.move_child(b, 0);
/// assert_eq!(tree.descendants(root).collect::<Vec<_>>(), vec![b, a]);
/// ```
pub struct Tree {
    slots: Vec<Slot>,
    vacant: Vec<u32>,
}

/// A storage slot. The generation outlives the node so reused slots get fresh ids.
#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attrs: NodeAttrs,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tree")
            .field("live", &self.len())
            .field("slots", &self.slots.len())
            .field("vacant", &self.vacant.len())
            .finish_non_exhaustive()
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Insert a new node as the last child of `parent` (or as a root if `None`).
    ///
    /// A stale `parent` inserts the node as a root.
    pub fn insert(&mut self, parent: Option<NodeId>, attrs: NodeAttrs) -> NodeId {
        let parent = parent.filter(|&p| self.is_alive(p));
        let node = Node {
            parent,
            children: Vec::new(),
            attrs,
        };
        let id = match self.vacant.pop() {
            Some(idx) => {
                let slot = &mut self.slots[idx as usize];
                slot.generation = slot.generation.wrapping_add(1);
                slot.node = Some(node);
                NodeId::new(idx, slot.generation)
            }
            None => {
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "node ids are 32-bit; a tree never holds 2^32 slots"
                )]
                let idx = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId::new(idx, 0)
            }
        };
        if let Some(p) = parent
            && let Some(pn) = self.node_mut(p)
        {
            pn.children.push(id);
        }
        id
    }

    /// Remove a node and its whole subtree. Every removed id goes stale.
    pub fn remove(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).map(|n| n.parent) else {
            return;
        };
        if let Some(p) = parent {
            self.detach_from(p, id);
        }
        let mut pending = vec![id];
        while let Some(n) = pending.pop() {
            if let Some(node) = self.slots[n.idx()].node.take() {
                pending.extend(node.children);
                self.vacant.push(n.0);
            }
        }
    }

    /// Reparent `id` under `new_parent` as its last child, or make it a root.
    ///
    /// Moving a node into its own subtree, or under a stale parent, is ignored.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) {
        let Some(old_parent) = self.node(id).map(|n| n.parent) else {
            return;
        };
        if let Some(p) = new_parent
            && (!self.is_alive(p) || self.contains(id, p))
        {
            return;
        }
        if let Some(p) = old_parent {
            self.detach_from(p, id);
        }
        if let Some(p) = new_parent
            && let Some(pn) = self.node_mut(p)
        {
            pn.children.push(id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = new_parent;
        }
    }

    /// Move `id` to position `index` among its siblings (clamped to the sibling count).
    ///
    /// Roots have no siblings and are left untouched.
    pub fn move_child(&mut self, id: NodeId, index: usize) {
        let Some(parent) = self.parent_of(id) else {
            return;
        };
        let Some(siblings) = self.node_mut(parent).map(|n| &mut n.children) else {
            return;
        };
        let Some(pos) = siblings.iter().position(|&c| c == id) else {
            return;
        };
        siblings.remove(pos);
        let index = index.min(siblings.len());
        siblings.insert(index, id);
    }

    /// Attributes of a live node.
    pub fn attrs(&self, id: NodeId) -> Option<&NodeAttrs> {
        self.node(id).map(|n| &n.attrs)
    }

    /// Flags of a live node.
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.node(id).map(|n| n.attrs.flags)
    }

    /// Insert or remove a single flag.
    pub fn set_flag(&mut self, id: NodeId, flag: NodeFlags, on: bool) {
        if let Some(n) = self.node_mut(id) {
            n.attrs.flags.set(flag, on);
        }
    }

    /// Visible state attribute of a live node.
    pub fn state(&self, id: NodeId) -> Option<&'static str> {
        self.node(id).and_then(|n| n.attrs.state)
    }

    /// Update the visible state attribute.
    pub fn set_state(&mut self, id: NodeId, state: Option<&'static str>) {
        if let Some(n) = self.node_mut(id) {
            n.attrs.state = state;
        }
    }

    /// Declared exit animation of a live node.
    pub fn exit_animation(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|n| n.attrs.exit_animation.as_deref())
    }

    /// Declare (or clear) the exit animation of a node.
    pub fn set_exit_animation(&mut self, id: NodeId, name: Option<&str>) {
        if let Some(n) = self.node_mut(id) {
            n.attrs.exit_animation = name.map(Into::into);
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    /// Whether the tree holds no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` refers to a live node (its slot is occupied at the same generation).
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Parent of a live node; `None` for roots and stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    /// Children of a live node in order; empty for stale ids.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Returns true if `node` is `ancestor` or lies in its subtree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        <Self as NodeTree<NodeId>>::contains(self, ancestor, node)
    }

    /// Live descendants of `root` in depth-first order, excluding `root`.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let stack = self.children_of(root).iter().rev().copied().collect();
        Descendants { tree: self, stack }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.node.as_mut()
    }

    fn detach_from(&mut self, parent: NodeId, child: NodeId) {
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|&c| c != child);
        }
    }
}

/// Depth-first iterator over the descendants of a node.
///
/// Created by [`Tree::descendants`].
#[derive(Debug)]
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        // Push children in reverse so they pop in sibling order.
        self.stack
            .extend(self.tree.children_of(id).iter().rev().copied());
        Some(id)
    }
}

impl NodeTree<NodeId> for Tree {
    type Descendants<'a> = Descendants<'a>;

    fn is_alive(&self, node: NodeId) -> bool {
        Self::is_alive(self, node)
    }

    fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        Self::parent_of(self, node)
    }

    fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Self::descendants(self, root)
    }
}
