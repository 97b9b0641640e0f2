// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Menu: a popup list of actions with a roving highlight and typeahead.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use overstory_collection::{
    Key, Navigation, NavigationConfig, Registration, ScopeId, Typeahead, next_item,
};
use overstory_dismiss::{DismissEvent, DismissKind, Layer, LayerId};
use overstory_presence::AnimationToken;
use overstory_state::ControllableCell;
use overstory_tree::{NodeAttrs, NodeFlags, NodeId, Tree};

use crate::collapsible::open_state;
use crate::present::PresentNode;
use crate::{CollectionItem, DismissHandlers, Error, Host, Overlay};

/// An entry of a [`Menu`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuItem {
    /// Value reported to the select handler.
    pub value: String,
    /// Label matched by typeahead.
    pub text: String,
    /// Disabled items cannot be highlighted or selected.
    pub disabled: bool,
}

impl MenuItem {
    /// An enabled item whose value and label are both `text`.
    pub fn new(text: &str) -> Self {
        Self {
            value: text.into(),
            text: text.into(),
            disabled: false,
        }
    }

    /// Mark the item disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Payload of a menu item selection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectEvent {
    default_prevented: bool,
}

impl SelectEvent {
    /// Keep the menu open after this selection.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether the handler kept the menu open.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Construction options of a [`Menu`].
#[derive(Clone, Debug)]
pub struct MenuConfig {
    /// Controlled open state. `None` leaves the menu uncontrolled.
    pub open: Option<bool>,
    /// Initial open state when uncontrolled.
    pub default_open: bool,
    /// Modal menus block pointer input beneath them and keep focus.
    pub modal: bool,
    /// Trigger node, if any.
    pub trigger: Option<NodeId>,
    /// Node the content mounts under. Defaults to the host body.
    pub container: Option<NodeId>,
    /// Layer this menu is nested in.
    pub parent_layer: Option<LayerId>,
    /// Keyboard navigation override; defaults to the host's configuration.
    pub navigation: Option<NavigationConfig>,
    /// Attributes the content node is created with.
    pub content_attrs: NodeAttrs,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            open: None,
            default_open: false,
            modal: true,
            trigger: None,
            container: None,
            parent_layer: None,
            navigation: None,
            content_attrs: NodeAttrs::new(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    item: MenuItem,
    mounted: Option<(NodeId, Registration<NodeId>)>,
}

type SelectHandler = Box<dyn FnMut(&str, &mut SelectEvent)>;

/// A menu whose items mount with its content.
///
/// Items are declared with [`Menu::add_item`]; their nodes exist while the content is
/// mounted and register in a collection scoped to the menu. The highlight moves with
/// arrow keys, Home and End (wrapping per [`NavigationConfig::wrap`]), with typeahead,
/// and with the pointer. Selecting an item closes the menu unless the select handler
/// prevents it.
///
/// ## Example
///
/// ```rust
/// use overstory_collection::Key;
/// use overstory_primitives::{Host, Menu, MenuConfig, MenuItem};
///
/// let mut host = Host::new();
/// let mut menu = Menu::new(&mut host, MenuConfig::default()).unwrap();
/// for label in ["Cut", "Copy", "Paste"] {
///     menu.add_item(&mut host, MenuItem::new(label)).unwrap();
/// }
///
/// menu.open(&mut host).unwrap();
/// menu.key_down(&mut host, Key::Character('p')).unwrap();
/// assert_eq!(menu.highlighted_value(), Some("Paste"));
///
/// menu.key_down(&mut host, Key::Enter).unwrap();
/// assert!(!menu.is_open());
/// ```
pub struct Menu {
    open: ControllableCell<bool>,
    modal: bool,
    navigation: NavigationConfig,
    trigger: Option<NodeId>,
    parent_layer: Option<LayerId>,
    content: PresentNode,
    layer: Option<LayerId>,
    scope: ScopeId,
    entries: Vec<Entry>,
    highlighted: Option<NodeId>,
    typeahead: Typeahead,
    handlers: DismissHandlers,
    on_select: Option<SelectHandler>,
}

impl core::fmt::Debug for Menu {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Menu")
            .field("open", self.open.read())
            .field("modal", &self.modal)
            .field("content", &self.content.node())
            .field("entries", &self.entries)
            .field("highlighted", &self.highlighted)
            .field("layer", &self.layer)
            .finish_non_exhaustive()
    }
}

impl Menu {
    /// Create a menu. Mounts its content right away if it starts open.
    pub fn new(host: &mut Host, config: MenuConfig) -> Result<Self, Error> {
        let open = ControllableCell::new(config.open, config.default_open);
        let container = config.container.unwrap_or(host.body());
        let content = PresentNode::new(host, container, config.content_attrs, *open.read(), false);
        let scope = host.collections.create_scope(content.node().unwrap_or(container));
        let mut this = Self {
            open,
            modal: config.modal,
            navigation: config.navigation.unwrap_or(host.config.navigation),
            trigger: config.trigger,
            parent_layer: config.parent_layer,
            content,
            layer: None,
            scope,
            entries: Vec::new(),
            highlighted: None,
            typeahead: Typeahead::new(host.config.typeahead),
            handlers: DismissHandlers::default(),
            on_select: None,
        };
        this.sync_mounted(host)?;
        Ok(this)
    }

    /// Attach the open-change callback.
    pub fn with_on_open_change(mut self, f: impl FnMut(&bool) + 'static) -> Self {
        self.open.set_on_change(Some(Box::new(f)));
        self
    }

    /// Attach the select handler. It receives the item value.
    pub fn with_on_select(mut self, f: impl FnMut(&str, &mut SelectEvent) + 'static) -> Self {
        self.on_select = Some(Box::new(f));
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

    /// Content node, while mounted.
    pub fn content(&self) -> Option<NodeId> {
        self.content.node()
    }

    /// Collection scope of the items.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Nest this menu in another layer from the next time its content mounts.
    pub fn set_parent_layer(&mut self, parent: Option<LayerId>) {
        self.parent_layer = parent;
    }

    /// Node of the item with `value`, while the content is mounted.
    pub fn item_node(&self, value: &str) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|e| e.item.value == value)
            .and_then(|e| e.mounted.as_ref().map(|(node, _)| *node))
    }

    /// Highlighted item node.
    pub fn highlighted(&self) -> Option<NodeId> {
        self.highlighted
    }

    /// Value of the highlighted item.
    pub fn highlighted_value(&self) -> Option<&str> {
        let node = self.highlighted?;
        self.entry_at(node).map(|e| e.item.value.as_str())
    }

    /// Append an item. It mounts immediately if the content is mounted.
    pub fn add_item(&mut self, host: &mut Host, item: MenuItem) -> Result<(), Error> {
        self.entries.push(Entry { item, mounted: None });
        self.sync_mounted(host)
    }

    /// Remove the item with `value`.
    pub fn remove_item(&mut self, host: &mut Host, value: &str) -> Result<(), Error> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.item.value == value)
            .ok_or_else(|| Error::UnknownItem(value.into()))?;
        let entry = self.entries.remove(pos);
        if let Some((node, registration)) = entry.mounted {
            host.collections.unregister(registration)?;
            host.remove_node(node);
            if self.highlighted == Some(node) {
                self.highlighted = None;
            }
        }
        Ok(())
    }

    /// Request the menu to open.
    pub fn open(&mut self, host: &mut Host) -> Result<(), Error> {
        self.set_open(host, true)
    }

    /// Request the menu to close.
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

    /// Keyboard input on the trigger: Enter, Space and ArrowDown open the menu and
    /// highlight the first item.
    pub fn trigger_key_down(&mut self, host: &mut Host, key: Key) -> Result<(), Error> {
        if !matches!(key, Key::Enter | Key::Space | Key::ArrowDown) {
            return Ok(());
        }
        self.open(host)?;
        if self.is_open() {
            self.navigate(host, Navigation::First);
        }
        Ok(())
    }

    /// Keyboard input while the content has focus.
    pub fn key_down(&mut self, host: &mut Host, key: Key) -> Result<(), Error> {
        if self.content.node().is_none() {
            return Ok(());
        }
        match key {
            Key::Enter | Key::Space => {
                if let Some(node) = self.highlighted {
                    self.select(host, node)?;
                }
            }
            Key::Character(ch) => {
                let found = {
                    let items = host.collections.ordered_items(self.scope, &host.tree);
                    self.typeahead.search(ch, host.now(), &items, self.highlighted)
                };
                if let Some(node) = found {
                    self.highlight(host, Some(node));
                }
            }
            other => {
                if let Some(navigation) = Navigation::from_key(other, self.navigation.orientation) {
                    self.navigate(host, navigation);
                }
            }
        }
        Ok(())
    }

    /// Pointer moved over `node`: highlight it if it is an enabled item, clear the
    /// highlight otherwise.
    pub fn pointer_move(&mut self, host: &mut Host, node: NodeId) {
        let target = self
            .entry_at(node)
            .filter(|e| !e.item.disabled)
            .map(|_| node);
        self.highlight(host, target);
    }

    /// Pointer left the content.
    pub fn pointer_leave(&mut self, host: &mut Host) {
        self.highlight(host, None);
    }

    /// Select the item at `node`.
    ///
    /// Returns whether an enabled item was selected. The menu closes unless the select
    /// handler prevented it.
    pub fn select(&mut self, host: &mut Host, node: NodeId) -> Result<bool, Error> {
        let Some(entry) = self.entry_at(node).filter(|e| !e.item.disabled) else {
            return Ok(false);
        };
        let value = entry.item.value.clone();
        let mut event = SelectEvent::default();
        if let Some(on_select) = &mut self.on_select {
            on_select(&value, &mut event);
        }
        if !event.is_default_prevented() {
            self.close(host)?;
        }
        Ok(true)
    }

    /// Report the end of the content's exit animation.
    pub fn finish_animation(
        &mut self,
        host: &mut Host,
        node: NodeId,
        token: AnimationToken,
    ) -> Result<bool, Error> {
        let routed = self.content.finish_animation(host, node, token);
        self.sync_mounted(host)?;
        Ok(routed)
    }

    /// Fire the content's presence fallback timeout.
    pub fn tick(&mut self, host: &mut Host) -> Result<(), Error> {
        self.content.tick(host);
        self.sync_mounted(host)
    }

    /// Remove the content, its items and its layer, and release the collection scope.
    pub fn unmount(mut self, host: &mut Host) -> Result<(), Error> {
        self.content.unmount(host);
        self.sync_mounted(host)?;
        host.collections.remove_scope(self.scope)?;
        Ok(())
    }

    fn reconcile(&mut self, host: &mut Host) -> Result<(), Error> {
        let open = self.is_open();
        self.content.set_visible(host, open);
        if !open {
            self.highlight(host, None);
            self.typeahead.reset();
        }
        self.sync_mounted(host)
    }

    /// Mount or unmount items and the layer to match the content node.
    fn sync_mounted(&mut self, host: &mut Host) -> Result<(), Error> {
        match self.content.node().filter(|&n| host.tree.is_alive(n)) {
            Some(content) => {
                host.collections.set_root(self.scope, content)?;
                for entry in &mut self.entries {
                    if entry.mounted.is_some() {
                        continue;
                    }
                    let mut attrs = NodeAttrs::focusable();
                    attrs.flags.set(NodeFlags::DISABLED, entry.item.disabled);
                    let node = host.tree.insert(Some(content), attrs);
                    let registration = host.collections.register(
                        self.scope,
                        node,
                        CollectionItem {
                            value: entry.item.value.clone(),
                            text: entry.item.text.clone(),
                            disabled: entry.item.disabled,
                        },
                    )?;
                    entry.mounted = Some((node, registration));
                }
            }
            None => {
                for entry in &mut self.entries {
                    if let Some((_, registration)) = entry.mounted.take() {
                        host.collections.unregister(registration)?;
                    }
                }
                self.highlighted = None;
            }
        }

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

        let state = open_state(self.is_open());
        if let Some(trigger) = self.trigger {
            host.tree.set_state(trigger, Some(state));
        }
        self.content.set_state(host, state);
        Ok(())
    }

    fn navigate(&mut self, host: &mut Host, navigation: Navigation) {
        let next = {
            let items = host.collections.ordered_items(self.scope, &host.tree);
            next_item(&items, self.highlighted, navigation, self.navigation.wrap)
        };
        if let Some(node) = next {
            self.highlight(host, Some(node));
        }
    }

    fn highlight(&mut self, host: &mut Host, node: Option<NodeId>) {
        if self.highlighted == node {
            return;
        }
        if let Some(old) = self.highlighted {
            host.tree.set_flag(old, NodeFlags::HIGHLIGHTED, false);
        }
        if let Some(new) = node {
            host.tree.set_flag(new, NodeFlags::HIGHLIGHTED, true);
        }
        self.highlighted = node;
    }

    fn entry_at(&self, node: NodeId) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|e| e.mounted.as_ref().is_some_and(|(n, _)| *n == node))
    }
}

impl Overlay for Menu {
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
        if on_trigger || (self.modal && event.kind == DismissKind::FocusOutside) {
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
