// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A host node whose existence is driven by a presence record.

use overstory_presence::{AnimationToken, Phase, Presence};
use overstory_tree::{NodeAttrs, NodeId};

use crate::Host;

/// Content node mounted and detached through [`Presence`].
///
/// The node is created from `attrs` under `parent` whenever the record is present and
/// removed (with its subtree) once it detaches. `force_mount` keeps it in the tree
/// regardless of phase.
#[derive(Debug)]
pub(crate) struct PresentNode {
    presence: Presence,
    node: Option<NodeId>,
    parent: NodeId,
    attrs: NodeAttrs,
    force_mount: bool,
}

impl PresentNode {
    pub(crate) fn new(
        host: &mut Host,
        parent: NodeId,
        attrs: NodeAttrs,
        visible: bool,
        force_mount: bool,
    ) -> Self {
        let mut this = Self {
            presence: Presence::with_config(visible, host.config.presence),
            node: None,
            parent,
            attrs,
            force_mount,
        };
        this.reconcile(host);
        this
    }

    pub(crate) fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub(crate) fn presence(&self) -> &Presence {
        &self.presence
    }

    /// Mounted, still in the tree, and with no exit in flight. Exiting and force-mounted
    /// closed nodes are inactive.
    pub(crate) fn is_active(&self, host: &Host) -> bool {
        self.node.is_some_and(|n| host.tree.is_alive(n)) && self.presence.phase() == Phase::Mounted
    }

    /// Request visibility. Returns true when the record went from detached to mounted.
    pub(crate) fn set_visible(&mut self, host: &mut Host, visible: bool) -> bool {
        self.drop_removed_node(host);
        let was_detached = self.presence.phase() == Phase::Detached;
        // The change is observed through `reconcile` and the phase.
        let _change = self
            .presence
            .set_visible(visible, self.node, &host.tree, host.now());
        self.reconcile(host);
        was_detached && self.presence.phase() == Phase::Mounted
    }

    /// Route an animation completion. Returns false if `node` is not this part's node.
    pub(crate) fn finish_animation(
        &mut self,
        host: &mut Host,
        node: NodeId,
        token: AnimationToken,
    ) -> bool {
        if self.node != Some(node) {
            return false;
        }
        let _change = self.presence.animation_end(token);
        self.reconcile(host);
        true
    }

    pub(crate) fn tick(&mut self, host: &mut Host) {
        self.drop_removed_node(host);
        let _change = self.presence.tick(host.now());
        self.reconcile(host);
    }

    pub(crate) fn set_state(&self, host: &mut Host, state: &'static str) {
        if let Some(node) = self.node {
            host.tree.set_state(node, Some(state));
        }
    }

    /// Remove the node whatever the phase.
    pub(crate) fn unmount(&mut self, host: &mut Host) {
        if let Some(node) = self.node.take() {
            host.remove_node(node);
        }
    }

    /// Forget a node that was removed together with an ancestor. The record detaches
    /// without an exit, so the content stays gone until it is shown again.
    fn drop_removed_node(&mut self, host: &mut Host) {
        if let Some(node) = self.node
            && !host.tree.is_alive(node)
        {
            tracing::debug!(?node, "content node was removed with its ancestor");
            self.node = None;
            host.set_exit_token(node, None);
            let _change = self
                .presence
                .set_visible(false, None::<NodeId>, &host.tree, host.now());
        }
    }

    fn reconcile(&mut self, host: &mut Host) {
        self.drop_removed_node(host);
        let present = self.presence.is_present(self.force_mount);
        match self.node {
            Some(node) if !present => {
                host.remove_node(node);
                self.node = None;
            }
            None if present => self.mount(host),
            _ => {}
        }
        if let Some(node) = self.node {
            let exiting = self.presence.phase() == Phase::ExitPending;
            host.set_exit_token(node, self.presence.last_token().filter(|_| exiting));
        }
    }

    fn mount(&mut self, host: &mut Host) {
        let parent = if host.tree.is_alive(self.parent) {
            self.parent
        } else {
            host.body()
        };
        self.node = Some(host.tree.insert(Some(parent), self.attrs.clone()));
    }
}
