// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accordion: a vertically (or horizontally) stacked set of collapsible items.

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use overstory_collection::{
    Key, Navigation, Orientation, Registration, ScopeId, WrapMode, next_item,
};
use overstory_presence::AnimationToken;
use overstory_state::ControllableCell;
use overstory_tree::{NodeAttrs, NodeFlags, NodeId};

use crate::collapsible::{Collapsible, CollapsibleConfig};
use crate::{CollectionItem, Error, Host};

/// Selection behavior of an accordion.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AccordionKind {
    /// At most one item is open; opening another closes it.
    Single {
        /// Whether the open item may be closed, leaving none open.
        collapsible: bool,
    },
    /// Items open and close independently.
    Multiple,
}

impl AccordionKind {
    /// Trim an open-value list to what this kind can hold.
    fn normalize(self, mut value: Vec<String>) -> Vec<String> {
        if matches!(self, Self::Single { .. }) {
            value.truncate(1);
        }
        value
    }
}

/// Construction options of an [`Accordion`].
#[derive(Clone, Debug)]
pub struct AccordionConfig {
    /// Selection behavior.
    pub kind: AccordionKind,
    /// Controlled open values. `None` leaves the accordion uncontrolled.
    pub value: Option<Vec<String>>,
    /// Initially open values when uncontrolled.
    pub default_value: Vec<String>,
    /// Disable every item.
    pub disabled: bool,
    /// Arrow-key axis for moving between triggers.
    pub orientation: Orientation,
}

impl Default for AccordionConfig {
    fn default() -> Self {
        Self {
            kind: AccordionKind::Single { collapsible: false },
            value: None,
            default_value: Vec::new(),
            disabled: false,
            orientation: Orientation::Vertical,
        }
    }
}

struct AccordionItem {
    value: String,
    disabled: bool,
    collapsible: Collapsible,
    registration: Registration<NodeId>,
}

/// A set of collapsible items keyed by value.
///
/// The open state is a list of values: in [`AccordionKind::Single`] mode it holds at most
/// one. Item triggers register in a collection scoped to the accordion, so arrow keys
/// move between triggers in their current tree order, skipping disabled ones.
///
/// ## Example
///
/// ```rust
/// use overstory_primitives::{Accordion, AccordionConfig, Host};
///
/// let mut host = Host::new();
/// let body = host.body();
/// let mut accordion = Accordion::new(&mut host, body, AccordionConfig::default());
/// accordion.add_item(&mut host, "a", false).unwrap();
/// accordion.add_item(&mut host, "b", false).unwrap();
///
/// accordion.open_item(&mut host, "a").unwrap();
/// accordion.open_item(&mut host, "b").unwrap();
/// assert_eq!(accordion.value(), ["b"]);
/// ```
pub struct Accordion {
    kind: AccordionKind,
    value: ControllableCell<Vec<String>>,
    disabled: bool,
    orientation: Orientation,
    root: NodeId,
    scope: ScopeId,
    items: Vec<AccordionItem>,
}

impl core::fmt::Debug for Accordion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Accordion")
            .field("kind", &self.kind)
            .field("value", self.value.read())
            .field("root", &self.root)
            .field("items", &self.items.len())
            .finish_non_exhaustive()
    }
}

impl Accordion {
    /// Mount an accordion root under `parent`.
    pub fn new(host: &mut Host, parent: NodeId, config: AccordionConfig) -> Self {
        let kind = config.kind;
        let value = ControllableCell::new(
            config.value.map(|v| kind.normalize(v)),
            kind.normalize(config.default_value),
        );
        let root = host.tree.insert(Some(parent), NodeAttrs::new());
        host.tree.set_flag(root, NodeFlags::DISABLED, config.disabled);
        let scope = host.collections.create_scope(root);
        Self {
            kind,
            value,
            disabled: config.disabled,
            orientation: config.orientation,
            root,
            scope,
            items: Vec::new(),
        }
    }

    /// Attach the value-change callback.
    pub fn with_on_value_change(mut self, f: impl FnMut(&Vec<String>) + 'static) -> Self {
        self.value.set_on_change(Some(Box::new(f)));
        self
    }

    /// Root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Collection scope of the item triggers.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Open values.
    pub fn value(&self) -> &[String] {
        self.value.read()
    }

    /// Whether the item with `value` is open.
    pub fn is_item_open(&self, value: &str) -> bool {
        self.value.read().iter().any(|v| v == value)
    }

    /// The collapsible backing the item with `value`.
    pub fn item(&self, value: &str) -> Option<&Collapsible> {
        self.items
            .iter()
            .find(|i| i.value == value)
            .map(|i| &i.collapsible)
    }

    /// Mount an item and register its trigger. Returns the item root.
    pub fn add_item(&mut self, host: &mut Host, value: &str, disabled: bool) -> Result<NodeId, Error> {
        let collapsible = Collapsible::new(host, self.root, CollapsibleConfig {
            open: Some(self.is_item_open(value)),
            disabled: self.disabled || disabled,
            ..CollapsibleConfig::default()
        });
        let registration = host.collections.register(
            self.scope,
            collapsible.trigger(),
            CollectionItem {
                value: value.to_string(),
                text: value.to_string(),
                disabled: self.disabled || disabled,
            },
        )?;
        let root = collapsible.root();
        self.items.push(AccordionItem {
            value: value.to_string(),
            disabled,
            collapsible,
            registration,
        });
        Ok(root)
    }

    /// Unregister and unmount an item.
    pub fn remove_item(&mut self, host: &mut Host, value: &str) -> Result<(), Error> {
        let pos = self.position(value)?;
        let item = self.items.remove(pos);
        host.collections.unregister(item.registration)?;
        item.collapsible.unmount(host);
        Ok(())
    }

    /// Move an item to position `index` among the accordion's children.
    pub fn move_item(&mut self, host: &mut Host, value: &str, index: usize) -> Result<(), Error> {
        let pos = self.position(value)?;
        host.tree.move_child(self.items[pos].collapsible.root(), index);
        Ok(())
    }

    /// Enable or disable the whole accordion.
    pub fn set_disabled(&mut self, host: &mut Host, disabled: bool) -> Result<(), Error> {
        self.disabled = disabled;
        host.tree.set_flag(self.root, NodeFlags::DISABLED, disabled);
        for item in &mut self.items {
            let effective = disabled || item.disabled;
            item.collapsible.set_disabled(host, effective);
            host.collections.update_data(
                &item.registration,
                CollectionItem {
                    value: item.value.clone(),
                    text: item.value.clone(),
                    disabled: effective,
                },
            )?;
        }
        Ok(())
    }

    /// Trigger activation: open a closed item or close an open one.
    pub fn click(&mut self, host: &mut Host, value: &str) -> Result<(), Error> {
        let pos = self.position(value)?;
        if self.items[pos].collapsible.is_disabled() {
            return Ok(());
        }
        if self.is_item_open(value) {
            self.close_item(host, value)
        } else {
            self.open_item(host, value)
        }
    }

    /// Request the item with `value` to open.
    ///
    /// In single mode this closes whichever item was open.
    pub fn open_item(&mut self, host: &mut Host, value: &str) -> Result<(), Error> {
        self.position(value)?;
        match self.kind {
            AccordionKind::Single { .. } => self.value.set(vec![value.to_string()]),
            AccordionKind::Multiple => self.value.update(|open| {
                let mut next = open.clone();
                if !next.iter().any(|v| v == value) {
                    next.push(value.to_string());
                }
                next
            }),
        }
        self.sync_items(host);
        Ok(())
    }

    /// Request the item with `value` to close.
    ///
    /// In single mode without `collapsible` the open item cannot be closed directly;
    /// the request is a no-op.
    pub fn close_item(&mut self, host: &mut Host, value: &str) -> Result<(), Error> {
        self.position(value)?;
        match self.kind {
            AccordionKind::Single { collapsible: false } => {
                tracing::trace!(value, "accordion item cannot collapse");
                return Ok(());
            }
            AccordionKind::Single { collapsible: true } | AccordionKind::Multiple => {
                self.value
                    .update(|open| open.iter().filter(|v| *v != value).cloned().collect());
            }
        }
        self.sync_items(host);
        Ok(())
    }

    /// Feed the controlled value for the next render.
    ///
    /// A single accordion keeps only the first value.
    pub fn sync_value(&mut self, host: &mut Host, value: Option<Vec<String>>) {
        let kind = self.kind;
        self.value.sync(value.map(|v| kind.normalize(v)));
        self.sync_items(host);
    }

    /// Keyboard input on the trigger `focused`.
    ///
    /// Enter and Space activate the trigger. Arrow keys along the orientation, Home and
    /// End return the trigger that should take focus next (wrapping at the ends).
    pub fn key_down(&mut self, host: &mut Host, focused: NodeId, key: Key) -> Result<Option<NodeId>, Error> {
        if matches!(key, Key::Enter | Key::Space) {
            if let Some(value) = self
                .items
                .iter()
                .find(|i| i.collapsible.trigger() == focused)
                .map(|i| i.value.clone())
            {
                self.click(host, &value)?;
            }
            return Ok(None);
        }
        let Some(navigation) = Navigation::from_key(key, self.orientation) else {
            return Ok(None);
        };
        let items = host.collections.ordered_items(self.scope, &host.tree);
        Ok(next_item(&items, Some(focused), navigation, WrapMode::Wrap))
    }

    /// Report the end of an exit animation of an item's content.
    pub fn finish_animation(&mut self, host: &mut Host, node: NodeId, token: AnimationToken) -> bool {
        self.items
            .iter_mut()
            .any(|i| i.collapsible.finish_animation(host, node, token))
    }

    /// Fire presence fallback timeouts of every item.
    pub fn tick(&mut self, host: &mut Host) {
        for item in &mut self.items {
            item.collapsible.tick(host);
        }
    }

    /// Unregister every item and remove the accordion from the tree.
    pub fn unmount(mut self, host: &mut Host) -> Result<(), Error> {
        for item in self.items.drain(..) {
            host.collections.unregister(item.registration)?;
            item.collapsible.unmount(host);
        }
        host.collections.remove_scope(self.scope)?;
        host.remove_node(self.root);
        Ok(())
    }

    fn sync_items(&mut self, host: &mut Host) {
        let open = self.value.read();
        for item in &mut self.items {
            let is_open = open.iter().any(|v| *v == item.value);
            item.collapsible.sync_open(host, Some(is_open));
        }
    }

    fn position(&self, value: &str) -> Result<usize, Error> {
        self.items
            .iter()
            .position(|i| i.value == value)
            .ok_or_else(|| Error::UnknownItem(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accordion(host: &mut Host, kind: AccordionKind, values: &[&str]) -> Accordion {
        let body = host.body();
        let mut a = Accordion::new(host, body, AccordionConfig {
            kind,
            ..AccordionConfig::default()
        });
        for v in values {
            a.add_item(host, v, false).unwrap();
        }
        a
    }

    #[test]
    fn multiple_items_are_independent() {
        let mut host = Host::new();
        let mut a = accordion(&mut host, AccordionKind::Multiple, &["a", "b"]);
        a.open_item(&mut host, "a").unwrap();
        a.open_item(&mut host, "b").unwrap();
        assert_eq!(a.value(), ["a", "b"]);
        a.close_item(&mut host, "a").unwrap();
        assert_eq!(a.value(), ["b"]);
        assert!(a.item("a").unwrap().content().is_none());
        assert!(a.item("b").unwrap().content().is_some());
    }

    #[test]
    fn single_collapsible_can_close() {
        let mut host = Host::new();
        let mut a = accordion(&mut host, AccordionKind::Single { collapsible: true }, &["a"]);
        a.click(&mut host, "a").unwrap();
        assert_eq!(a.value(), ["a"]);
        a.click(&mut host, "a").unwrap();
        assert!(a.value().is_empty());
    }

    #[test]
    fn unknown_value_is_an_error() {
        let mut host = Host::new();
        let mut a = accordion(&mut host, AccordionKind::Multiple, &["a"]);
        assert_eq!(
            a.open_item(&mut host, "zzz"),
            Err(Error::UnknownItem("zzz".to_string()))
        );
    }

    #[test]
    fn single_default_keeps_one_value() {
        let mut host = Host::new();
        let body = host.body();
        let a = Accordion::new(&mut host, body, AccordionConfig {
            default_value: vec!["a".to_string(), "b".to_string()],
            ..AccordionConfig::default()
        });
        assert_eq!(a.value(), ["a"]);
    }

    #[test]
    fn single_controlled_value_keeps_one_value() {
        let mut host = Host::new();
        let body = host.body();
        let mut a = Accordion::new(&mut host, body, AccordionConfig {
            value: Some(Vec::new()),
            ..AccordionConfig::default()
        });
        a.add_item(&mut host, "a", false).unwrap();
        a.add_item(&mut host, "b", false).unwrap();

        a.sync_value(&mut host, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(a.value(), ["a"]);
        assert!(a.item("a").unwrap().content().is_some());
        assert!(a.item("b").unwrap().content().is_none());
    }

    #[test]
    fn disabled_items_ignore_clicks() {
        let mut host = Host::new();
        let mut a = accordion(&mut host, AccordionKind::Multiple, &["a"]);
        a.set_disabled(&mut host, true).unwrap();
        a.click(&mut host, "a").unwrap();
        assert!(a.value().is_empty());
        let trigger = a.item("a").unwrap().trigger();
        assert!(host.tree.flags(trigger).unwrap().contains(NodeFlags::DISABLED));
    }
}
