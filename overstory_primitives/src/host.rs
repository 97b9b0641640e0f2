// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host coordinator: one owner for the tree, the layer stack and the clock.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use overstory_collection::{Collections, ItemInfo};
use overstory_dismiss::{DismissEvent, DismissKind, LayerId, LayerStack};
use overstory_presence::AnimationToken;
use overstory_tree::{NodeAttrs, NodeFlags, NodeId, Tree};

use crate::{EngineConfig, Error};

/// Metadata of an item registered in a [`Host`]'s collections.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollectionItem {
    /// Value identifying the item within its composite.
    pub value: String,
    /// Text matched by typeahead.
    pub text: String,
    /// Disabled items are skipped by navigation.
    pub disabled: bool,
}

impl ItemInfo for CollectionItem {
    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn text_value(&self) -> &str {
        &self.text
    }
}

/// The single logical owner of host state shared by every primitive.
///
/// A `Host` owns the node [`Tree`], the [`LayerStack`] of mounted overlays, the item
/// [`Collections`] of every composite, and the current time. Host events (pointer down,
/// focus, Escape) enter through the `Host`, which routes them through the layer stack to
/// the [`Overlay`]s passed in.
///
/// ## Example
///
/// ```rust
/// use overstory_primitives::{Dialog, DialogConfig, Host, Overlay};
///
/// let mut host = Host::new();
/// let mut dialog = Dialog::new(&mut host, DialogConfig {
///     default_open: true,
///     has_title: true,
///     has_description: true,
///     ..DialogConfig::default()
/// })
/// .unwrap();
/// assert!(dialog.is_open());
///
/// host.escape_key_down(&mut [&mut dialog]).unwrap();
/// assert!(!dialog.is_open());
/// assert!(host.layers.is_empty());
/// ```
#[derive(Debug)]
pub struct Host {
    /// The host node tree.
    pub tree: Tree,
    /// Mounted overlay layers.
    pub layers: LayerStack<NodeId>,
    /// Item registries of all composites.
    pub collections: Collections<NodeId, CollectionItem>,
    /// Defaults for primitives created on this host.
    pub config: EngineConfig,
    body: NodeId,
    now: u64,
    exits: Vec<(NodeId, AnimationToken)>,
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    /// Create a host with an empty tree holding only the body node.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a host with the given defaults.
    pub fn with_config(config: EngineConfig) -> Self {
        let mut tree = Tree::new();
        let body = tree.insert(None, NodeAttrs::new());
        Self {
            tree,
            layers: LayerStack::new(),
            collections: Collections::new(),
            config,
            body,
            now: 0,
            exits: Vec::new(),
        }
    }

    /// Root node of the tree; portaled content mounts here by default.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Current time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Set the current time. Time never runs backwards; earlier values are ignored.
    pub fn set_time(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    /// Token of the exit animation running on `node`.
    ///
    /// Hosts read it when an exit starts and pass it back to the owning primitive's
    /// `finish_animation` once the animation ends.
    pub fn exit_token(&self, node: NodeId) -> Option<AnimationToken> {
        self.exits
            .iter()
            .find(|(n, _)| *n == node)
            .map(|(_, token)| *token)
    }

    pub(crate) fn set_exit_token(&mut self, node: NodeId, token: Option<AnimationToken>) {
        self.exits.retain(|(n, _)| *n != node);
        if let Some(token) = token {
            self.exits.push((node, token));
        }
    }

    /// Remove `node` and its subtree from the tree.
    ///
    /// Layers mounted by content inside the subtree are released, so overlays nested in
    /// removed content stop capturing input.
    pub fn remove_node(&mut self, node: NodeId) {
        self.tree.remove(node);
        self.release_removed();
    }

    fn release_removed(&mut self) {
        let released = self.layers.retain_live(&self.tree);
        if !released.is_empty() {
            tracing::debug!(count = released.len(), "released layers of removed content");
        }
        let tree = &self.tree;
        self.exits.retain(|(n, _)| tree.is_alive(*n));
    }

    /// Advance the clock by `ms` and let `overlays` fire their presence timeouts.
    pub fn advance(&mut self, ms: u64, overlays: &mut [&mut dyn Overlay]) -> Result<(), Error> {
        self.now = self.now.saturating_add(ms);
        for overlay in overlays.iter_mut() {
            overlay.tick(self)?;
        }
        Ok(())
    }

    /// Whether pointer input on `target` is swallowed by a modal layer.
    ///
    /// Layers of nodes removed directly through [`Host::tree`] still count until the next
    /// routed event; [`Host::remove_node`] releases them at once.
    pub fn is_pointer_blocked(&self, target: NodeId) -> bool {
        self.layers.is_pointer_blocked(&self.tree, target)
    }

    /// Route a pointer-down on `target` and dismiss the layers it is outside of.
    ///
    /// Returns the dismissed layers, topmost first.
    pub fn pointer_down(
        &mut self,
        target: NodeId,
        overlays: &mut [&mut dyn Overlay],
    ) -> Result<Vec<LayerId>, Error> {
        self.release_removed();
        let dismissed = self.layers.pointer_down(&self.tree, target, |id, event| {
            notify(overlays, &self.tree, id, event);
        });
        self.apply(&dismissed, overlays)?;
        Ok(dismissed)
    }

    /// Route focus moving to `target` and dismiss the layers it left.
    ///
    /// Targets that cannot take focus are ignored.
    pub fn focus_in(
        &mut self,
        target: NodeId,
        overlays: &mut [&mut dyn Overlay],
    ) -> Result<Vec<LayerId>, Error> {
        self.release_removed();
        let focusable = self
            .tree
            .flags(target)
            .is_some_and(|f| f.contains(NodeFlags::FOCUSABLE) && !f.contains(NodeFlags::DISABLED));
        if !focusable {
            tracing::trace!(?target, "focus target is not focusable");
            return Ok(Vec::new());
        }
        let dismissed = self.layers.focus_in(&self.tree, target, |id, event| {
            notify(overlays, &self.tree, id, event);
        });
        self.apply(&dismissed, overlays)?;
        Ok(dismissed)
    }

    /// Route an Escape key press to the topmost layer.
    pub fn escape_key_down(
        &mut self,
        overlays: &mut [&mut dyn Overlay],
    ) -> Result<Option<LayerId>, Error> {
        self.release_removed();
        let dismissed = self.layers.escape_key_down(|id, event| {
            notify(overlays, &self.tree, id, event);
        });
        if let Some(id) = dismissed {
            self.apply(&[id], overlays)?;
        }
        Ok(dismissed)
    }

    fn apply(&mut self, dismissed: &[LayerId], overlays: &mut [&mut dyn Overlay]) -> Result<(), Error> {
        for &id in dismissed {
            match overlays.iter_mut().find(|o| o.layer() == Some(id)) {
                Some(overlay) => overlay.dismiss(self)?,
                None => tracing::debug!(layer = ?id, "no overlay owns the dismissed layer"),
            }
        }
        Ok(())
    }
}

fn notify(
    overlays: &mut [&mut dyn Overlay],
    tree: &Tree,
    id: LayerId,
    event: &mut DismissEvent<NodeId>,
) {
    if let Some(overlay) = overlays.iter_mut().find(|o| o.layer() == Some(id)) {
        overlay.on_dismiss_event(tree, event);
    }
}

/// A primitive that mounts a layer on the host's [`LayerStack`].
pub trait Overlay {
    /// The layer currently mounted for this overlay.
    fn layer(&self) -> Option<LayerId>;

    /// Run the overlay's handlers for an event aimed at its layer.
    ///
    /// Handlers call [`DismissEvent::prevent_default`] to keep the overlay open.
    fn on_dismiss_event(&mut self, tree: &Tree, event: &mut DismissEvent<NodeId>);

    /// Close the overlay after an undisputed dismissal.
    fn dismiss(&mut self, host: &mut Host) -> Result<(), Error>;

    /// Fire presence fallback timeouts at the host's current time.
    fn tick(&mut self, host: &mut Host) -> Result<(), Error>;
}

type DismissHandler = Box<dyn FnMut(&mut DismissEvent<NodeId>)>;

/// User handlers consulted before an overlay is dismissed.
///
/// The kind-specific handler runs first, then `on_interact_outside` for pointer and focus
/// events. Any of them may prevent the dismissal.
#[derive(Default)]
pub struct DismissHandlers {
    on_escape_key_down: Option<DismissHandler>,
    on_pointer_down_outside: Option<DismissHandler>,
    on_focus_outside: Option<DismissHandler>,
    on_interact_outside: Option<DismissHandler>,
}

impl core::fmt::Debug for DismissHandlers {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DismissHandlers")
            .field("on_escape_key_down", &self.on_escape_key_down.is_some())
            .field("on_pointer_down_outside", &self.on_pointer_down_outside.is_some())
            .field("on_focus_outside", &self.on_focus_outside.is_some())
            .field("on_interact_outside", &self.on_interact_outside.is_some())
            .finish()
    }
}

impl DismissHandlers {
    /// Handle Escape while the overlay is topmost.
    pub fn on_escape_key_down(
        &mut self,
        f: impl FnMut(&mut DismissEvent<NodeId>) + 'static,
    ) -> &mut Self {
        self.on_escape_key_down = Some(Box::new(f));
        self
    }

    /// Handle a pointer-down outside the overlay.
    pub fn on_pointer_down_outside(
        &mut self,
        f: impl FnMut(&mut DismissEvent<NodeId>) + 'static,
    ) -> &mut Self {
        self.on_pointer_down_outside = Some(Box::new(f));
        self
    }

    /// Handle focus moving outside the overlay.
    pub fn on_focus_outside(
        &mut self,
        f: impl FnMut(&mut DismissEvent<NodeId>) + 'static,
    ) -> &mut Self {
        self.on_focus_outside = Some(Box::new(f));
        self
    }

    /// Handle any outside interaction (pointer or focus).
    pub fn on_interact_outside(
        &mut self,
        f: impl FnMut(&mut DismissEvent<NodeId>) + 'static,
    ) -> &mut Self {
        self.on_interact_outside = Some(Box::new(f));
        self
    }

    pub(crate) fn run(&mut self, event: &mut DismissEvent<NodeId>) {
        let specific = match event.kind {
            DismissKind::EscapeKeyDown => &mut self.on_escape_key_down,
            DismissKind::PointerDownOutside => &mut self.on_pointer_down_outside,
            DismissKind::FocusOutside => &mut self.on_focus_outside,
        };
        if let Some(f) = specific {
            f(event);
        }
        if event.kind.is_interact_outside()
            && let Some(f) = &mut self.on_interact_outside
        {
            f(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use overstory_dismiss::Layer;
    use core::cell::Cell;

    #[test]
    fn time_is_monotonic() {
        let mut host = Host::new();
        host.set_time(100);
        host.set_time(50);
        assert_eq!(host.now(), 100);
        host.advance(25, &mut []).unwrap();
        assert_eq!(host.now(), 125);
    }

    #[test]
    fn handlers_run_specific_then_interact_outside() {
        let order = Rc::new(Cell::new(0_u8));
        let mut handlers = DismissHandlers::default();
        let o1 = Rc::clone(&order);
        let o2 = Rc::clone(&order);
        handlers
            .on_pointer_down_outside(move |_| o1.set(o1.get() * 10 + 1))
            .on_interact_outside(move |ev| {
                o2.set(o2.get() * 10 + 2);
                ev.prevent_default();
            });

        let mut event = DismissEvent::new(DismissKind::PointerDownOutside, None);
        handlers.run(&mut event);
        assert_eq!(order.get(), 12);
        assert!(event.is_default_prevented());

        // Escape does not reach the interact-outside handler.
        let mut escape = DismissEvent::new(DismissKind::EscapeKeyDown, None);
        handlers.run(&mut escape);
        assert!(!escape.is_default_prevented());
    }

    #[test]
    fn removing_content_releases_nested_layers() {
        let mut host = Host::new();
        let body = host.body();
        let panel = host.tree.insert(Some(body), NodeAttrs::new());
        let popup = host.tree.insert(Some(panel), NodeAttrs::new());
        let other = host.tree.insert(Some(body), NodeAttrs::new());
        let layer = host
            .layers
            .push(Layer::new(popup).with_disable_outside_pointer_events(true))
            .unwrap();
        assert!(host.is_pointer_blocked(other));

        host.remove_node(panel);
        assert!(!host.layers.contains(layer));
        assert!(!host.is_pointer_blocked(other));
    }

    #[test]
    fn routed_events_skip_layers_removed_behind_the_host() {
        let mut host = Host::new();
        let body = host.body();
        let popup = host.tree.insert(Some(body), NodeAttrs::new());
        let _layer = host.layers.push(Layer::new(popup)).unwrap();
        host.tree.remove(popup);
        assert_eq!(host.escape_key_down(&mut []).unwrap(), None);
        assert!(host.layers.is_empty());
    }

    #[test]
    fn focus_on_inert_nodes_is_ignored() {
        let mut host = Host::new();
        let plain = host.tree.insert(Some(host.body()), NodeAttrs::new());
        assert!(host.focus_in(plain, &mut []).unwrap().is_empty());
    }
}
