// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The ordered layer registry and its dispatch rules.

use alloc::vec::Vec;

use overstory_tree::NodeTree;

use crate::types::{DismissError, DismissEvent, DismissKind, Layer, LayerId};

/// Ordered registry of active overlay layers.
///
/// Insertion order is z-order and dismissal priority: the most recently pushed layer is
/// on top. The stack never calls into layers on its own. Dispatch methods walk the layers,
/// hand a [`DismissEvent`] to the caller's handler for every layer that should be notified,
/// and return the ids whose dismissal was not prevented. The caller applies dismissals
/// (and [`LayerStack::remove`]s unmounted layers) after dispatch returns, so the stack is
/// never mutated mid-iteration.
///
/// ## Example
///
/// ```rust
/// use overstory_dismiss::{Layer, LayerStack};
/// use overstory_tree::{NodeAttrs, Tree};
///
/// let mut tree = Tree::new();
/// let body = tree.insert(None, NodeAttrs::new());
/// let outside = tree.insert(Some(body), NodeAttrs::new());
/// let popover = tree.insert(Some(body), NodeAttrs::new());
///
/// let mut layers = LayerStack::new();
/// let id = layers.push(Layer::new(popover)).unwrap();
///
/// // Clicking outside asks the popover to dismiss.
/// assert_eq!(layers.pointer_down(&tree, outside, |_, _| {}), [id]);
/// // Unless a handler prevents it.
/// assert!(layers.pointer_down(&tree, outside, |_, ev| ev.prevent_default()).is_empty());
/// // Escape goes to the topmost layer only.
/// assert_eq!(layers.escape_key_down(|_, _| {}), Some(id));
///
/// layers.remove(id).unwrap();
/// assert!(layers.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct LayerStack<K> {
    layers: Vec<(LayerId, Layer<K>)>,
    next_id: u64,
}

impl<K> Default for LayerStack<K> {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<K: Copy + Eq> LayerStack<K> {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a layer on top of the stack when it mounts.
    ///
    /// Fails if the layer names a parent that is not on the stack.
    #[must_use = "the layer id is needed to remove the layer when it unmounts"]
    pub fn push(&mut self, layer: Layer<K>) -> Result<LayerId, DismissError> {
        if let Some(parent) = layer.parent
            && !self.contains(parent)
        {
            return Err(DismissError::UnknownLayer(parent));
        }
        let id = LayerId(self.next_id);
        self.next_id += 1;
        self.layers.push((id, layer));
        tracing::debug!(layer = id.0, depth = self.layers.len(), "layer pushed");
        Ok(id)
    }

    /// Remove a layer when it unmounts. It receives no further dispatch.
    ///
    /// Layers nested in the removed layer are re-attached to its parent.
    pub fn remove(&mut self, id: LayerId) -> Result<Layer<K>, DismissError> {
        let pos = self.position(id).ok_or(DismissError::UnknownLayer(id))?;
        let (_, layer) = self.layers.remove(pos);
        for (_, above) in &mut self.layers[pos..] {
            if above.parent == Some(id) {
                above.parent = layer.parent;
            }
        }
        tracing::debug!(layer = id.0, depth = self.layers.len(), "layer removed");
        Ok(layer)
    }

    /// Remove every layer whose node is no longer alive in `tree`.
    ///
    /// Content torn down together with an ancestor never unmounts its own layer; hosts
    /// call this after removing nodes. Returns the removed ids, bottom first.
    pub fn retain_live<T: NodeTree<K>>(&mut self, tree: &T) -> Vec<LayerId> {
        let dead: Vec<LayerId> = self
            .layers
            .iter()
            .filter(|(_, layer)| !tree.is_alive(layer.node))
            .map(|(id, _)| *id)
            .collect();
        for &id in &dead {
            if self.remove(id).is_ok() {
                tracing::debug!(layer = id.0, "released layer of a removed node");
            }
        }
        dead
    }

    /// Exclude the subtree at `node` from the layer's outside determination.
    pub fn add_branch(&mut self, id: LayerId, node: K) -> Result<(), DismissError> {
        let layer = self.get_mut(id)?;
        if !layer.branches.contains(&node) {
            layer.branches.push(node);
        }
        Ok(())
    }

    /// Stop excluding `node`. Returns whether it was a branch of the layer.
    pub fn remove_branch(&mut self, id: LayerId, node: K) -> Result<bool, DismissError> {
        let layer = self.get_mut(id)?;
        let before = layer.branches.len();
        layer.branches.retain(|b| *b != node);
        Ok(layer.branches.len() != before)
    }

    /// Layer registered under `id`.
    pub fn get(&self, id: LayerId) -> Option<&Layer<K>> {
        self.layers.iter().find(|(l, _)| *l == id).map(|(_, layer)| layer)
    }

    /// Returns true if `id` is on the stack.
    pub fn contains(&self, id: LayerId) -> bool {
        self.position(id).is_some()
    }

    /// Topmost layer.
    pub fn top(&self) -> Option<LayerId> {
        self.layers.last().map(|(id, _)| *id)
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if no layer is mounted.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers from bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (LayerId, &Layer<K>)> + '_ {
        self.layers.iter().map(|(id, layer)| (*id, layer))
    }

    /// The layer owning exclusive pointer capture: the topmost one that disables
    /// outside pointer events.
    pub fn pointer_capture_owner(&self) -> Option<LayerId> {
        self.capture_index().map(|pos| self.layers[pos].0)
    }

    /// Whether a layer receives pointer input (it is at or above the capture owner).
    pub fn pointer_events_enabled(&self, id: LayerId) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        self.capture_index().is_none_or(|owner| pos >= owner)
    }

    /// Whether pointer input on `target` is swallowed because a modal layer owns capture
    /// and `target` lies in none of the layers at or above it.
    pub fn is_pointer_blocked<T: NodeTree<K>>(&self, tree: &T, target: K) -> bool {
        let Some(owner) = self.capture_index() else {
            return false;
        };
        !self.layers[owner..]
            .iter()
            .any(|(_, layer)| tree.contains(layer.node, target))
    }

    /// Dispatch a pointer-down on `target`.
    ///
    /// Walks from the topmost layer down. Every layer that does not contain `target`
    /// (its node, its branches, or a layer nested in it) is handed a
    /// [`DismissKind::PointerDownOutside`] event. The walk stops after the first layer
    /// that disables outside pointer events; layers beneath it are inert.
    ///
    /// Returns the notified layers whose dismissal was not prevented, topmost first.
    pub fn pointer_down<T: NodeTree<K>>(
        &self,
        tree: &T,
        target: K,
        handler: impl FnMut(LayerId, &mut DismissEvent<K>),
    ) -> Vec<LayerId> {
        self.dispatch_outside(tree, target, DismissKind::PointerDownOutside, handler)
    }

    /// Dispatch focus moving to `target`.
    ///
    /// Like [`LayerStack::pointer_down`] with [`DismissKind::FocusOutside`], except that
    /// modal layers do not shield the layers beneath them.
    pub fn focus_in<T: NodeTree<K>>(
        &self,
        tree: &T,
        target: K,
        handler: impl FnMut(LayerId, &mut DismissEvent<K>),
    ) -> Vec<LayerId> {
        self.dispatch_outside(tree, target, DismissKind::FocusOutside, handler)
    }

    /// Dispatch an Escape key press.
    ///
    /// Only the topmost layer is notified. Returns it unless its handler prevented the
    /// dismissal; nothing propagates to the layers beneath.
    pub fn escape_key_down(
        &self,
        mut handler: impl FnMut(LayerId, &mut DismissEvent<K>),
    ) -> Option<LayerId> {
        let top = self.top()?;
        let mut event = DismissEvent::new(DismissKind::EscapeKeyDown, None);
        handler(top, &mut event);
        if event.is_default_prevented() {
            tracing::trace!(layer = top.0, "escape dismissal prevented");
            None
        } else {
            Some(top)
        }
    }

    fn dispatch_outside<T: NodeTree<K>>(
        &self,
        tree: &T,
        target: K,
        kind: DismissKind,
        mut handler: impl FnMut(LayerId, &mut DismissEvent<K>),
    ) -> Vec<LayerId> {
        let modal_cutoff = kind == DismissKind::PointerDownOutside;
        let mut dismissed = Vec::new();
        for pos in (0..self.layers.len()).rev() {
            let (id, layer) = &self.layers[pos];
            if !self.is_inside(tree, pos, target) {
                let mut event = DismissEvent::new(kind, Some(target));
                handler(*id, &mut event);
                if event.is_default_prevented() {
                    tracing::trace!(layer = id.0, ?kind, "outside dismissal prevented");
                } else {
                    dismissed.push(*id);
                }
            }
            if modal_cutoff && layer.disable_outside_pointer_events {
                break;
            }
        }
        dismissed
    }

    /// Whether `target` is inside the layer at `pos`: in its node, its branches, or any
    /// layer nested in it.
    fn is_inside<T: NodeTree<K>>(&self, tree: &T, pos: usize, target: K) -> bool {
        let id = self.layers[pos].0;
        // Nested layers are always pushed after their parent.
        self.layers[pos..]
            .iter()
            .any(|(other, layer)| owns(tree, layer, target) && self.is_nested_in(*other, id))
    }

    fn is_nested_in(&self, mut layer: LayerId, ancestor: LayerId) -> bool {
        loop {
            if layer == ancestor {
                return true;
            }
            match self.get(layer).and_then(|l| l.parent) {
                Some(parent) => layer = parent,
                None => return false,
            }
        }
    }

    fn capture_index(&self) -> Option<usize> {
        self.layers
            .iter()
            .rposition(|(_, layer)| layer.disable_outside_pointer_events)
    }

    fn position(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|(l, _)| *l == id)
    }

    fn get_mut(&mut self, id: LayerId) -> Result<&mut Layer<K>, DismissError> {
        self.layers
            .iter_mut()
            .find(|(l, _)| *l == id)
            .map(|(_, layer)| layer)
            .ok_or(DismissError::UnknownLayer(id))
    }
}

fn owns<K: Copy + Eq, T: NodeTree<K>>(tree: &T, layer: &Layer<K>, target: K) -> bool {
    tree.contains(layer.node, target) || layer.branches.iter().any(|&b| tree.contains(b, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use overstory_tree::{NodeAttrs, NodeId, Tree};

    /// body -> [outside, a, b, c]
    fn fixture() -> (Tree, NodeId, [NodeId; 3]) {
        let mut tree = Tree::new();
        let body = tree.insert(None, NodeAttrs::new());
        let outside = tree.insert(Some(body), NodeAttrs::new());
        let nodes = [(); 3].map(|()| tree.insert(Some(body), NodeAttrs::new()));
        (tree, outside, nodes)
    }

    #[test]
    fn pointer_outside_notifies_top_to_bottom() {
        let (tree, outside, [a, b, _]) = fixture();
        let mut stack = LayerStack::new();
        let la = stack.push(Layer::new(a)).unwrap();
        let lb = stack.push(Layer::new(b)).unwrap();

        let mut seen = Vec::new();
        let dismissed = stack.pointer_down(&tree, outside, |id, ev| {
            assert_eq!(ev.kind, DismissKind::PointerDownOutside);
            seen.push(id);
        });
        assert_eq!(seen, vec![lb, la]);
        assert_eq!(dismissed, vec![lb, la]);
    }

    #[test]
    fn pointer_inside_is_not_outside() {
        let (mut tree, _, [a, b, _]) = fixture();
        let inner = tree.insert(Some(a), NodeAttrs::new());
        let mut stack = LayerStack::new();
        let la = stack.push(Layer::new(a)).unwrap();
        let lb = stack.push(Layer::new(b)).unwrap();

        // Inside `a` is outside `b`.
        let dismissed = stack.pointer_down(&tree, inner, |_, _| {});
        assert_eq!(dismissed, vec![lb]);
        assert!(!dismissed.contains(&la));
    }

    #[test]
    fn modal_layer_shields_layers_beneath() {
        let (tree, outside, [a, b, c]) = fixture();
        let mut stack = LayerStack::new();
        let la = stack.push(Layer::new(a)).unwrap();
        let lb = stack
            .push(Layer::new(b).with_disable_outside_pointer_events(true))
            .unwrap();
        let lc = stack.push(Layer::new(c)).unwrap();

        let dismissed = stack.pointer_down(&tree, outside, |_, _| {});
        assert_eq!(dismissed, vec![lc, lb]);

        assert_eq!(stack.pointer_capture_owner(), Some(lb));
        assert!(!stack.pointer_events_enabled(la));
        assert!(stack.pointer_events_enabled(lb));
        assert!(stack.pointer_events_enabled(lc));
        assert!(stack.is_pointer_blocked(&tree, a));
        assert!(stack.is_pointer_blocked(&tree, outside));
        assert!(!stack.is_pointer_blocked(&tree, c));

        // Removing the modal layer releases capture.
        stack.remove(lb).unwrap();
        assert_eq!(stack.pointer_capture_owner(), None);
        assert!(stack.pointer_events_enabled(la));
        assert!(!stack.is_pointer_blocked(&tree, outside));
    }

    #[test]
    fn focus_outside_ignores_modal_cutoff() {
        let (tree, outside, [a, b, _]) = fixture();
        let mut stack = LayerStack::new();
        let la = stack.push(Layer::new(a)).unwrap();
        let lb = stack
            .push(Layer::new(b).with_disable_outside_pointer_events(true))
            .unwrap();
        let dismissed = stack.focus_in(&tree, outside, |_, ev| {
            assert_eq!(ev.kind, DismissKind::FocusOutside);
        });
        assert_eq!(dismissed, vec![lb, la]);
    }

    #[test]
    fn branches_are_not_outside() {
        let (tree, outside, [a, b, _]) = fixture();
        let mut stack = LayerStack::new();
        let la = stack.push(Layer::new(a).with_branch(b)).unwrap();
        assert!(stack.pointer_down(&tree, b, |_, _| {}).is_empty());

        assert_eq!(stack.remove_branch(la, b), Ok(true));
        assert_eq!(stack.pointer_down(&tree, b, |_, _| {}), vec![la]);
        stack.add_branch(la, outside).unwrap();
        assert!(stack.pointer_down(&tree, outside, |_, _| {}).is_empty());
        assert_eq!(stack.get(la).map(Layer::branches), Some(&[outside][..]));
    }

    #[test]
    fn nested_layer_is_inside_its_parent() {
        let (tree, outside, [a, b, _]) = fixture();
        let mut stack = LayerStack::new();
        let la = stack.push(Layer::new(a)).unwrap();
        // `b` is rendered beside `a` but logically nested in it.
        let lb = stack.push(Layer::new(b).with_parent(la)).unwrap();

        assert!(stack.pointer_down(&tree, b, |_, _| {}).is_empty());
        assert_eq!(stack.pointer_down(&tree, a, |_, _| {}), vec![lb]);
        assert_eq!(stack.pointer_down(&tree, outside, |_, _| {}), vec![lb, la]);
    }

    #[test]
    fn removing_a_parent_reattaches_children() {
        let (tree, _, [a, b, c]) = fixture();
        let mut stack = LayerStack::new();
        let la = stack.push(Layer::new(a)).unwrap();
        let lb = stack.push(Layer::new(b).with_parent(la)).unwrap();
        let lc = stack.push(Layer::new(c).with_parent(lb)).unwrap();
        stack.remove(lb).unwrap();
        assert_eq!(stack.get(lc).and_then(Layer::parent), Some(la));
        // `c` still counts as inside `a`.
        assert!(stack.pointer_down(&tree, c, |_, _| {}).is_empty());
    }

    #[test]
    fn dead_layers_are_released() {
        let (mut tree, outside, [a, b, c]) = fixture();
        let inner = tree.insert(Some(b), NodeAttrs::new());
        let mut stack = LayerStack::new();
        let la = stack.push(Layer::new(a)).unwrap();
        let lb = stack
            .push(Layer::new(b).with_disable_outside_pointer_events(true))
            .unwrap();
        let li = stack.push(Layer::new(inner).with_parent(lb)).unwrap();
        let lc = stack.push(Layer::new(c).with_parent(la)).unwrap();
        tree.remove(b);
        assert_eq!(stack.retain_live(&tree), vec![lb, li]);
        assert!(!stack.contains(li));
        assert_eq!(stack.get(lc).and_then(Layer::parent), Some(la));
        assert!(!stack.is_pointer_blocked(&tree, outside));
        assert!(stack.retain_live(&tree).is_empty());
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let (_, _, [a, b, _]) = fixture();
        let mut stack = LayerStack::new();
        let la = stack.push(Layer::new(a)).unwrap();
        stack.remove(la).unwrap();
        assert_eq!(
            stack.push(Layer::new(b).with_parent(la)),
            Err(DismissError::UnknownLayer(la))
        );
        assert_eq!(stack.remove(la), Err(DismissError::UnknownLayer(la)));
        assert_eq!(stack.add_branch(la, b), Err(DismissError::UnknownLayer(la)));
    }

    #[test]
    fn prevented_layers_are_not_dismissed() {
        let (tree, outside, [a, b, _]) = fixture();
        let mut stack = LayerStack::new();
        let la = stack.push(Layer::new(a)).unwrap();
        let lb = stack.push(Layer::new(b)).unwrap();
        let dismissed = stack.pointer_down(&tree, outside, |id, ev| {
            if id == lb {
                ev.prevent_default();
            }
        });
        assert_eq!(dismissed, vec![la]);
    }

    #[test]
    fn escape_is_lifo() {
        let (_, _, [a, b, _]) = fixture();
        let mut stack = LayerStack::new();
        let la = stack.push(Layer::new(a)).unwrap();
        let lb = stack.push(Layer::new(b).with_parent(la)).unwrap();

        let mut notified = Vec::new();
        assert_eq!(stack.escape_key_down(|id, _| notified.push(id)), Some(lb));
        assert_eq!(notified, vec![lb]);
        stack.remove(lb).unwrap();

        assert_eq!(stack.escape_key_down(|_, _| {}), Some(la));
        stack.remove(la).unwrap();
        assert_eq!(stack.escape_key_down(|_, _| {}), None);
    }

    #[test]
    fn prevented_escape_does_not_propagate() {
        let (_, _, [a, b, _]) = fixture();
        let mut stack = LayerStack::new();
        let _la = stack.push(Layer::new(a)).unwrap();
        let _lb = stack.push(Layer::new(b)).unwrap();
        let mut calls = 0;
        let dismissed = stack.escape_key_down(|_, ev| {
            calls += 1;
            ev.prevent_default();
        });
        assert_eq!(dismissed, None);
        assert_eq!(calls, 1);
    }

    #[test]
    fn ids_are_not_reused() {
        let (_, _, [a, _, _]) = fixture();
        let mut stack = LayerStack::new();
        let first = stack.push(Layer::new(a)).unwrap();
        stack.remove(first).unwrap();
        let second = stack.push(Layer::new(a)).unwrap();
        assert_ne!(first, second);
        assert!(!stack.contains(first));
        assert_eq!(stack.top(), Some(second));
        assert_eq!(stack.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec![second]);
    }
}
