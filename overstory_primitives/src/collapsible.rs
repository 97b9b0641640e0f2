// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collapsible: a trigger that shows and hides a content region.

use alloc::boxed::Box;

use overstory_presence::AnimationToken;
use overstory_state::ControllableCell;
use overstory_tree::{NodeAttrs, NodeFlags, NodeId};

use crate::Host;
use crate::present::PresentNode;

/// Visible state attribute for an open flag.
pub(crate) fn open_state(open: bool) -> &'static str {
    if open { "open" } else { "closed" }
}

/// Construction options of a [`Collapsible`].
#[derive(Clone, Debug, Default)]
pub struct CollapsibleConfig {
    /// Controlled open state. `None` leaves the collapsible uncontrolled.
    pub open: Option<bool>,
    /// Initial open state when uncontrolled.
    pub default_open: bool,
    /// Disabled collapsibles ignore trigger activation.
    pub disabled: bool,
    /// Keep the content node mounted while closed.
    pub force_mount: bool,
    /// Attributes the content node is created with (for example its exit animation).
    pub content_attrs: NodeAttrs,
}

/// A root node with a trigger and a presence-managed content node.
///
/// Root, trigger and content expose `data-state` = `open` | `closed`.
pub struct Collapsible {
    open: ControllableCell<bool>,
    disabled: bool,
    root: NodeId,
    trigger: NodeId,
    content: PresentNode,
}

impl core::fmt::Debug for Collapsible {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Collapsible")
            .field("open", self.open.read())
            .field("disabled", &self.disabled)
            .field("root", &self.root)
            .field("content", &self.content.node())
            .finish_non_exhaustive()
    }
}

impl Collapsible {
    /// Mount a collapsible under `parent`.
    pub fn new(host: &mut Host, parent: NodeId, config: CollapsibleConfig) -> Self {
        let open = ControllableCell::new(config.open, config.default_open);
        let root = host.tree.insert(Some(parent), NodeAttrs::new());
        let trigger = host.tree.insert(Some(root), NodeAttrs::focusable());
        let content = PresentNode::new(
            host,
            root,
            config.content_attrs,
            *open.read(),
            config.force_mount,
        );
        let this = Self {
            open,
            disabled: config.disabled,
            root,
            trigger,
            content,
        };
        this.reflect(host);
        this
    }

    /// Attach the open-change callback.
    pub fn with_on_open_change(mut self, f: impl FnMut(&bool) + 'static) -> Self {
        self.open.set_on_change(Some(Box::new(f)));
        self
    }

    /// Current open state.
    pub fn is_open(&self) -> bool {
        *self.open.read()
    }

    /// Whether trigger activation is ignored.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Trigger node.
    pub fn trigger(&self) -> NodeId {
        self.trigger
    }

    /// Content node, while mounted.
    pub fn content(&self) -> Option<NodeId> {
        self.content.node()
    }

    /// Enable or disable the collapsible.
    pub fn set_disabled(&mut self, host: &mut Host, disabled: bool) {
        self.disabled = disabled;
        self.reflect(host);
    }

    /// Trigger activation: flip the open state unless disabled.
    pub fn toggle(&mut self, host: &mut Host) {
        if self.disabled {
            return;
        }
        self.open.update(|open| !open);
        self.reconcile(host);
    }

    /// Request an open state.
    pub fn set_open(&mut self, host: &mut Host, open: bool) {
        self.open.set(open);
        self.reconcile(host);
    }

    /// Feed the controlled open state for the next render.
    pub fn sync_open(&mut self, host: &mut Host, open: Option<bool>) {
        self.open.sync(open);
        self.reconcile(host);
    }

    /// Report the end of an exit animation. Returns whether `node` belonged to this
    /// collapsible.
    pub fn finish_animation(&mut self, host: &mut Host, node: NodeId, token: AnimationToken) -> bool {
        let routed = self.content.finish_animation(host, node, token);
        if routed {
            self.reflect(host);
        }
        routed
    }

    /// Fire the presence fallback timeout.
    pub fn tick(&mut self, host: &mut Host) {
        self.content.tick(host);
        self.reflect(host);
    }

    /// Remove the collapsible from the tree.
    pub fn unmount(mut self, host: &mut Host) {
        self.content.unmount(host);
        host.remove_node(self.root);
    }

    fn reconcile(&mut self, host: &mut Host) {
        let open = *self.open.read();
        self.content.set_visible(host, open);
        self.reflect(host);
    }

    fn reflect(&self, host: &mut Host) {
        let state = open_state(*self.open.read());
        for node in [self.root, self.trigger] {
            host.tree.set_state(node, Some(state));
            host.tree.set_flag(node, NodeFlags::DISABLED, self.disabled);
        }
        self.content.set_state(host, state);
    }
}
