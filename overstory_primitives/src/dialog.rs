// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dialog and AlertDialog: overlays with a backdrop, a content layer and open state.

use alloc::boxed::Box;

use overstory_dismiss::{DismissEvent, DismissKind, Layer, LayerId};
use overstory_presence::AnimationToken;
use overstory_state::ControllableCell;
use overstory_tree::{NodeAttrs, NodeId, Tree};

use crate::collapsible::open_state;
use crate::present::PresentNode;
use crate::{DismissHandlers, Error, Host, Overlay};

/// Construction options of a [`Dialog`].
#[derive(Clone, Debug)]
pub struct DialogConfig {
    /// Controlled open state. `None` leaves the dialog uncontrolled.
    pub open: Option<bool>,
    /// Initial open state when uncontrolled.
    pub default_open: bool,
    /// Modal dialogs render a backdrop, block pointer input beneath them and keep focus.
    pub modal: bool,
    /// Keep the overlay and content nodes mounted while closed.
    pub force_mount: bool,
    /// Trigger node toggling the dialog, if any.
    pub trigger: Option<NodeId>,
    /// Node the overlay and content mount under. Defaults to the host body.
    pub container: Option<NodeId>,
    /// Layer this dialog is nested in (for dialogs opened from another overlay).
    pub parent_layer: Option<LayerId>,
    /// The content renders an accessible title.
    pub has_title: bool,
    /// The content renders an accessible description.
    pub has_description: bool,
    /// Attributes the overlay node is created with.
    pub overlay_attrs: NodeAttrs,
    /// Attributes the content node is created with.
    pub content_attrs: NodeAttrs,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            open: None,
            default_open: false,
            modal: true,
            force_mount: false,
            trigger: None,
            container: None,
            parent_layer: None,
            has_title: false,
            has_description: false,
            overlay_attrs: NodeAttrs::new(),
            content_attrs: NodeAttrs::new(),
        }
    }
}

/// A dialog window.
///
/// While the content node is mounted the dialog holds a layer on the host's stack; it
/// closes on Escape and on outside interaction unless a handler prevents it. Modal
/// dialogs also mount an overlay node, shield the layers beneath them from pointer input
/// and never lose focus to the outside. Non-modal dialogs ignore outside interaction
/// with their trigger, which toggles them instead.
///
/// Missing title or description logs a warning each time the content mounts.
pub struct Dialog {
    open: ControllableCell<bool>,
    modal: bool,
    alert: bool,
    has_title: bool,
    has_description: bool,
    trigger: Option<NodeId>,
    parent_layer: Option<LayerId>,
    overlay: Option<PresentNode>,
    content: PresentNode,
    layer: Option<LayerId>,
    handlers: DismissHandlers,
}

impl core::fmt::Debug for Dialog {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dialog")
            .field("open", self.open.read())
            .field("modal", &self.modal)
            .field("alert", &self.alert)
            .field("content", &self.content.node())
            .field("layer", &self.layer)
            .finish_non_exhaustive()
    }
}

impl Dialog {
    /// Create a dialog. Mounts its content right away if it starts open.
    pub fn new(host: &mut Host, config: DialogConfig) -> Result<Self, Error> {
        Self::build(host, config, false)
    }

    fn build(host: &mut Host, config: DialogConfig, alert: bool) -> Result<Self, Error> {
        let open = ControllableCell::new(config.open, config.default_open);
        let visible = *open.read();
        let container = config.container.unwrap_or(host.body());
        let modal = config.modal || alert;
        let overlay = modal.then(|| {
            PresentNode::new(host, container, config.overlay_attrs, visible, config.force_mount)
        });
        let content = PresentNode::new(host, container, config.content_attrs, visible, config.force_mount);
        let mut this = Self {
            open,
            modal,
            alert,
            has_title: config.has_title,
            has_description: config.has_description,
            trigger: config.trigger,
            parent_layer: config.parent_layer,
            overlay,
            content,
            layer: None,
            handlers: DismissHandlers::default(),
        };
        if this.content.is_active(host) {
            this.check_labels();
        }
        this.sync_layer(host)?;
        this.reflect(host);
        Ok(this)
    }

    /// Attach the open-change callback.
    pub fn with_on_open_change(mut self, f: impl FnMut(&bool) + 'static) -> Self {
        self.open.set_on_change(Some(Box::new(f)));
        self
    }

    /// Dismissal handlers.
    pub fn handlers_mut(&mut self) -> &mut DismissHandlers {
        &mut self.handlers
    }

    /// Current open state.
    pub fn is_open(&self) -> bool {
        *self.open.read()
    }

    /// Whether the dialog is modal.
    pub fn is_modal(&self) -> bool {
        self.modal
    }

    /// Trigger node, if any.
    pub fn trigger(&self) -> Option<NodeId> {
        self.trigger
    }

    /// Set (or clear) the trigger node.
    pub fn set_trigger(&mut self, host: &mut Host, trigger: Option<NodeId>) {
        self.trigger = trigger;
        self.reflect(host);
    }

    /// Nest this dialog in another layer from the next time its content mounts.
    pub fn set_parent_layer(&mut self, parent: Option<LayerId>) {
        self.parent_layer = parent;
    }

    /// Overlay (backdrop) node of a modal dialog, while mounted.
    pub fn overlay(&self) -> Option<NodeId> {
        self.overlay.as_ref().and_then(PresentNode::node)
    }

    /// Content node, while mounted.
    pub fn content(&self) -> Option<NodeId> {
        self.content.node()
    }

    /// Request the dialog to open.
    pub fn open(&mut self, host: &mut Host) -> Result<(), Error> {
        self.set_open(host, true)
    }

    /// Request the dialog to close.
    pub fn close(&mut self, host: &mut Host) -> Result<(), Error> {
        self.set_open(host, false)
    }

    /// Trigger activation.
    pub fn toggle(&mut self, host: &mut Host) -> Result<(), Error> {
        let open = self.is_open();
        self.set_open(host, !open)
    }

    /// Request an open state.
    pub fn set_open(&mut self, host: &mut Host, open: bool) -> Result<(), Error> {
        self.open.set(open);
        self.reconcile(host)
    }

    /// Feed the controlled open state for the next render.
    pub fn sync_open(&mut self, host: &mut Host, open: Option<bool>) -> Result<(), Error> {
        self.open.sync(open);
        self.reconcile(host)
    }

    /// Report the end of an exit animation of the overlay or content node.
    ///
    /// Returns whether `node` belonged to this dialog.
    pub fn finish_animation(
        &mut self,
        host: &mut Host,
        node: NodeId,
        token: AnimationToken,
    ) -> Result<bool, Error> {
        let routed = self
            .overlay
            .as_mut()
            .is_some_and(|o| o.finish_animation(host, node, token))
            || self.content.finish_animation(host, node, token);
        self.sync_layer(host)?;
        Ok(routed)
    }

    /// Fire presence fallback timeouts.
    pub fn tick(&mut self, host: &mut Host) -> Result<(), Error> {
        if let Some(overlay) = &mut self.overlay {
            overlay.tick(host);
        }
        self.content.tick(host);
        self.sync_layer(host)
    }

    /// Remove the dialog's nodes and layer, whatever their phase.
    pub fn unmount(&mut self, host: &mut Host) -> Result<(), Error> {
        if let Some(overlay) = &mut self.overlay {
            overlay.unmount(host);
        }
        self.content.unmount(host);
        if let Some(layer) = self.layer.take()
            && host.layers.contains(layer)
        {
            host.layers.remove(layer)?;
        }
        Ok(())
    }

    fn reconcile(&mut self, host: &mut Host) -> Result<(), Error> {
        let open = self.is_open();
        if let Some(overlay) = &mut self.overlay {
            overlay.set_visible(host, open);
        }
        if self.content.set_visible(host, open) {
            self.check_labels();
        }
        self.sync_layer(host)?;
        self.reflect(host);
        Ok(())
    }

    /// Hold a layer exactly while the content is active.
    ///
    /// A layer released by the host (content removed with an ancestor) is forgotten. A
    /// parent layer that is gone is not linked.
    fn sync_layer(&mut self, host: &mut Host) -> Result<(), Error> {
        if let Some(layer) = self.layer
            && !host.layers.contains(layer)
        {
            self.layer = None;
        }
        let active = self.content.is_active(host);
        match (self.content.node(), self.layer) {
            (Some(node), None) if active => {
                let mut layer = Layer::new(node).with_disable_outside_pointer_events(self.modal);
                if let Some(parent) = self.parent_layer.filter(|&p| host.layers.contains(p)) {
                    layer = layer.with_parent(parent);
                }
                self.layer = Some(host.layers.push(layer)?);
            }
            (_, Some(layer)) if !active => {
                host.layers.remove(layer)?;
                self.layer = None;
            }
            _ => {}
        }
        Ok(())
    }

    fn reflect(&self, host: &mut Host) {
        let state = open_state(self.is_open());
        if let Some(trigger) = self.trigger {
            host.tree.set_state(trigger, Some(state));
        }
        if let Some(overlay) = &self.overlay {
            overlay.set_state(host, state);
        }
        self.content.set_state(host, state);
    }

    fn check_labels(&self) {
        let kind = if self.alert { "alert dialog" } else { "dialog" };
        if !self.has_title {
            tracing::warn!(kind, "dialog content has no title; screen readers cannot announce it");
        }
        if !self.has_description {
            tracing::warn!(kind, "dialog content has no description");
        }
    }
}

impl Overlay for Dialog {
    fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    fn on_dismiss_event(&mut self, tree: &Tree, event: &mut DismissEvent<NodeId>) {
        self.handlers.run(event);
        if !event.kind.is_interact_outside() {
            return;
        }
        let on_trigger = self
            .trigger
            .zip(event.target)
            .is_some_and(|(trigger, target)| tree.contains(trigger, target));
        let keep_open = self.alert
            || (self.modal && event.kind == DismissKind::FocusOutside)
            || (!self.modal && on_trigger);
        if keep_open {
            event.prevent_default();
        }
    }

    fn dismiss(&mut self, host: &mut Host) -> Result<(), Error> {
        self.close(host)
    }

    fn tick(&mut self, host: &mut Host) -> Result<(), Error> {
        Self::tick(self, host)
    }
}

/// A modal dialog that interrupts the user and expects a response.
///
/// Always modal. Outside pointer and focus interaction never dismiss it; Escape and its
/// explicit actions do.
#[derive(Debug)]
pub struct AlertDialog {
    dialog: Dialog,
}

impl AlertDialog {
    /// Create an alert dialog. `config.modal` is ignored.
    pub fn new(host: &mut Host, config: DialogConfig) -> Result<Self, Error> {
        Ok(Self {
            dialog: Dialog::build(host, config, true)?,
        })
    }

    /// Attach the open-change callback.
    pub fn with_on_open_change(self, f: impl FnMut(&bool) + 'static) -> Self {
        Self {
            dialog: self.dialog.with_on_open_change(f),
        }
    }

    /// The underlying dialog.
    pub fn dialog(&self) -> &Dialog {
        &self.dialog
    }

    /// The underlying dialog, mutably.
    pub fn dialog_mut(&mut self) -> &mut Dialog {
        &mut self.dialog
    }

    /// Current open state.
    pub fn is_open(&self) -> bool {
        self.dialog.is_open()
    }

    /// Request the alert dialog to open.
    pub fn open(&mut self, host: &mut Host) -> Result<(), Error> {
        self.dialog.open(host)
    }

    /// The confirming action: closes the dialog.
    pub fn action(&mut self, host: &mut Host) -> Result<(), Error> {
        self.dialog.close(host)
    }

    /// The cancelling action: closes the dialog.
    pub fn cancel(&mut self, host: &mut Host) -> Result<(), Error> {
        self.dialog.close(host)
    }
}

impl Overlay for AlertDialog {
    fn layer(&self) -> Option<LayerId> {
        self.dialog.layer
    }

    fn on_dismiss_event(&mut self, tree: &Tree, event: &mut DismissEvent<NodeId>) {
        self.dialog.on_dismiss_event(tree, event);
    }

    fn dismiss(&mut self, host: &mut Host) -> Result<(), Error> {
        self.dialog.close(host)
    }

    fn tick(&mut self, host: &mut Host) -> Result<(), Error> {
        self.dialog.tick(host)
    }
}
