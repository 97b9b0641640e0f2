// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the host tree: node identifiers, flags, and per-node attributes.

use alloc::string::String;

/// Identifier for a node in the tree (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Node flags a styling layer can observe without querying primitive state.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is rendered. Hidden nodes (`display: none`) never run exit animations.
        const VISIBLE     = 0b0000_0001;
        /// Node can receive focus.
        const FOCUSABLE   = 0b0000_0010;
        /// Node is disabled (`data-disabled`).
        const DISABLED    = 0b0000_0100;
        /// Node is the highlighted item of a menu-like collection (`data-highlighted`).
        const HIGHLIGHTED = 0b0000_1000;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

/// Host-visible attributes of a node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeAttrs {
    /// Visibility, focus and interaction flags.
    pub flags: NodeFlags,
    /// Visible state attribute (`data-state`), for example `open` or `checked`.
    pub state: Option<&'static str>,
    /// Name of the exit animation the styling layer declares for this node, if any.
    ///
    /// This is the slice of computed style that presence tracking inspects when
    /// a node is asked to hide.
    pub exit_animation: Option<String>,
}

impl NodeAttrs {
    /// Attributes for a plain visible node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes for a visible, focusable node.
    pub fn focusable() -> Self {
        Self {
            flags: NodeFlags::VISIBLE | NodeFlags::FOCUSABLE,
            ..Self::default()
        }
    }

    /// Set the visible state attribute.
    pub fn with_state(mut self, state: &'static str) -> Self {
        self.state = Some(state);
        self
    }

    /// Declare an exit animation.
    pub fn with_exit_animation(mut self, name: impl Into<String>) -> Self {
        self.exit_animation = Some(name.into());
        self
    }
}
