// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer descriptors, dismissal events and errors.

use smallvec::SmallVec;

/// Identifier of a layer pushed on a [`LayerStack`](crate::LayerStack).
///
/// Ids are never reused within a stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub(crate) u64);

/// An overlay surface participating in outside-interaction dismissal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layer<K> {
    pub(crate) node: K,
    pub(crate) disable_outside_pointer_events: bool,
    pub(crate) branches: SmallVec<[K; 2]>,
    pub(crate) parent: Option<LayerId>,
}

impl<K: Copy + Eq> Layer<K> {
    /// A non-modal layer rooted at `node`.
    pub fn new(node: K) -> Self {
        Self {
            node,
            disable_outside_pointer_events: false,
            branches: SmallVec::new(),
            parent: None,
        }
    }

    /// Make the layer own pointer input: layers beneath it become inert to pointer events.
    pub fn with_disable_outside_pointer_events(mut self, disable: bool) -> Self {
        self.disable_outside_pointer_events = disable;
        self
    }

    /// Exclude the subtree at `node` from the layer's outside determination.
    pub fn with_branch(mut self, node: K) -> Self {
        if !self.branches.contains(&node) {
            self.branches.push(node);
        }
        self
    }

    /// Nest this layer inside `parent`.
    ///
    /// Interaction inside a nested layer is never outside any of its ancestors, even when
    /// the nested layer is rendered elsewhere in the tree (for example portaled to the root).
    pub fn with_parent(mut self, parent: LayerId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Root node of the layer.
    pub fn node(&self) -> K {
        self.node
    }

    /// Whether the layer disables pointer events outside itself.
    pub fn disables_outside_pointer_events(&self) -> bool {
        self.disable_outside_pointer_events
    }

    /// Branch roots of the layer.
    pub fn branches(&self) -> &[K] {
        &self.branches
    }

    /// Logical parent layer, if nested.
    pub fn parent(&self) -> Option<LayerId> {
        self.parent
    }
}

/// Kind of interaction being dispatched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DismissKind {
    /// A pointer went down outside the layer.
    PointerDownOutside,
    /// Focus moved outside the layer.
    FocusOutside,
    /// Escape was pressed while the layer was topmost.
    EscapeKeyDown,
}

impl DismissKind {
    /// Outside interactions (pointer or focus), as opposed to Escape.
    pub fn is_interact_outside(self) -> bool {
        matches!(self, Self::PointerDownOutside | Self::FocusOutside)
    }
}

/// Payload handed to a layer's handlers during dispatch.
///
/// Handlers call [`DismissEvent::prevent_default`] to keep the layer open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DismissEvent<K> {
    /// What happened.
    pub kind: DismissKind,
    /// Node the interaction targeted (`None` for keyboard events).
    pub target: Option<K>,
    default_prevented: bool,
}

impl<K> DismissEvent<K> {
    /// Create an event that has not been prevented.
    pub fn new(kind: DismissKind, target: Option<K>) -> Self {
        Self {
            kind,
            target,
            default_prevented: false,
        }
    }

    /// Keep the layer from being dismissed by this event.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether a handler prevented the dismissal.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Errors from misuse of layer ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DismissError {
    /// The layer is not (or no longer) on the stack.
    #[error("layer {0:?} is not on the stack")]
    UnknownLayer(LayerId),
}
