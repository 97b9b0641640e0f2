// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Checkbox: a three-state toggle.

use alloc::boxed::Box;

use overstory_collection::Key;
use overstory_presence::AnimationToken;
use overstory_state::ControllableCell;
use overstory_tree::{NodeAttrs, NodeFlags, NodeId};

use crate::Host;
use crate::present::PresentNode;

/// Value of a checkbox.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CheckedState {
    /// Not checked.
    #[default]
    Unchecked,
    /// Checked.
    Checked,
    /// Mixed. Only reachable by assignment, never by interaction.
    Indeterminate,
}

impl CheckedState {
    /// The `data-state` value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unchecked => "unchecked",
            Self::Checked => "checked",
            Self::Indeterminate => "indeterminate",
        }
    }

    /// State after a user click. Indeterminate counts as unchecked.
    pub fn toggled(self) -> Self {
        match self {
            Self::Checked => Self::Unchecked,
            Self::Unchecked | Self::Indeterminate => Self::Checked,
        }
    }
}

/// Construction options of a [`Checkbox`].
#[derive(Clone, Debug, Default)]
pub struct CheckboxConfig {
    /// Controlled state. `None` leaves the checkbox uncontrolled.
    pub checked: Option<CheckedState>,
    /// Initial state when uncontrolled.
    pub default_checked: CheckedState,
    /// Disabled checkboxes ignore clicks.
    pub disabled: bool,
    /// Keep the indicator node mounted while unchecked.
    pub force_mount_indicator: bool,
    /// Attributes the indicator node is created with.
    pub indicator_attrs: NodeAttrs,
}

/// A checkbox button with a presence-managed indicator.
///
/// The button and indicator expose `data-state` = `checked` | `unchecked` |
/// `indeterminate`. The indicator is mounted while the state is not unchecked.
pub struct Checkbox {
    checked: ControllableCell<CheckedState>,
    initial: CheckedState,
    disabled: bool,
    node: NodeId,
    indicator: PresentNode,
}

impl core::fmt::Debug for Checkbox {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Checkbox")
            .field("checked", self.checked.read())
            .field("disabled", &self.disabled)
            .field("node", &self.node)
            .finish_non_exhaustive()
    }
}

impl Checkbox {
    /// Mount a checkbox under `parent`.
    pub fn new(host: &mut Host, parent: NodeId, config: CheckboxConfig) -> Self {
        let checked = ControllableCell::new(config.checked, config.default_checked);
        let initial = *checked.read();
        let node = host.tree.insert(Some(parent), NodeAttrs::focusable());
        let indicator = PresentNode::new(
            host,
            node,
            config.indicator_attrs,
            initial != CheckedState::Unchecked,
            config.force_mount_indicator,
        );
        let this = Self {
            checked,
            initial,
            disabled: config.disabled,
            node,
            indicator,
        };
        this.reflect(host);
        this
    }

    /// Attach the change callback.
    pub fn with_on_checked_change(mut self, f: impl FnMut(&CheckedState) + 'static) -> Self {
        self.checked.set_on_change(Some(Box::new(f)));
        self
    }

    /// Current state.
    pub fn checked(&self) -> CheckedState {
        *self.checked.read()
    }

    /// Button node.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Indicator node, while mounted.
    pub fn indicator(&self) -> Option<NodeId> {
        self.indicator.node()
    }

    /// Enable or disable the checkbox.
    pub fn set_disabled(&mut self, host: &mut Host, disabled: bool) {
        self.disabled = disabled;
        self.reflect(host);
    }

    /// User click.
    pub fn click(&mut self, host: &mut Host) {
        if self.disabled {
            return;
        }
        self.checked.update(|state| state.toggled());
        self.reconcile(host);
    }

    /// Keyboard input. Space clicks; Enter is swallowed, as checkboxes do not submit on
    /// Enter. Returns whether the key was handled.
    pub fn key_down(&mut self, host: &mut Host, key: Key) -> bool {
        match key {
            Key::Space => {
                self.click(host);
                true
            }
            Key::Enter => true,
            _ => false,
        }
    }

    /// Assign a state programmatically (the only way back to indeterminate).
    pub fn set_checked(&mut self, host: &mut Host, state: CheckedState) {
        self.checked.set(state);
        self.reconcile(host);
    }

    /// Feed the controlled state for the next render.
    pub fn sync_checked(&mut self, host: &mut Host, state: Option<CheckedState>) {
        self.checked.sync(state);
        self.reconcile(host);
    }

    /// Form reset: return to the state the checkbox was created with.
    pub fn reset(&mut self, host: &mut Host) {
        self.checked.set(self.initial);
        self.reconcile(host);
    }

    /// Report the end of the indicator's exit animation.
    pub fn finish_animation(&mut self, host: &mut Host, node: NodeId, token: AnimationToken) -> bool {
        let routed = self.indicator.finish_animation(host, node, token);
        self.reflect(host);
        routed
    }

    /// Fire the indicator's presence fallback timeout.
    pub fn tick(&mut self, host: &mut Host) {
        self.indicator.tick(host);
        self.reflect(host);
    }

    fn reconcile(&mut self, host: &mut Host) {
        let visible = self.checked() != CheckedState::Unchecked;
        self.indicator.set_visible(host, visible);
        self.reflect(host);
    }

    fn reflect(&self, host: &mut Host) {
        let state = self.checked().as_str();
        host.tree.set_state(self.node, Some(state));
        host.tree.set_flag(self.node, NodeFlags::DISABLED, self.disabled);
        self.indicator.set_state(host, state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkbox(host: &mut Host, config: CheckboxConfig) -> Checkbox {
        let body = host.body();
        Checkbox::new(host, body, config)
    }

    #[test]
    fn click_cycles_between_checked_and_unchecked() {
        let mut host = Host::new();
        let mut c = checkbox(&mut host, CheckboxConfig::default());
        assert_eq!(c.indicator(), None);
        c.click(&mut host);
        assert_eq!(c.checked(), CheckedState::Checked);
        assert_eq!(host.tree.state(c.node()), Some("checked"));
        assert!(c.indicator().is_some());
        c.click(&mut host);
        assert_eq!(c.checked(), CheckedState::Unchecked);
        assert_eq!(c.indicator(), None);
    }

    #[test]
    fn space_clicks_and_enter_is_swallowed() {
        let mut host = Host::new();
        let mut c = checkbox(&mut host, CheckboxConfig::default());
        assert!(c.key_down(&mut host, Key::Enter));
        assert_eq!(c.checked(), CheckedState::Unchecked);
        assert!(c.key_down(&mut host, Key::Space));
        assert_eq!(c.checked(), CheckedState::Checked);
        assert!(!c.key_down(&mut host, Key::Tab));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut host = Host::new();
        let mut c = checkbox(&mut host, CheckboxConfig {
            default_checked: CheckedState::Indeterminate,
            ..CheckboxConfig::default()
        });
        c.click(&mut host);
        c.click(&mut host);
        assert_eq!(c.checked(), CheckedState::Unchecked);
        c.reset(&mut host);
        assert_eq!(c.checked(), CheckedState::Indeterminate);
        assert_eq!(host.tree.state(c.node()), Some("indeterminate"));
    }

    #[test]
    fn disabled_ignores_clicks() {
        let mut host = Host::new();
        let mut c = checkbox(&mut host, CheckboxConfig {
            disabled: true,
            ..CheckboxConfig::default()
        });
        c.click(&mut host);
        assert_eq!(c.checked(), CheckedState::Unchecked);
        assert!(host.tree.flags(c.node()).unwrap().contains(NodeFlags::DISABLED));
    }
}
