// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine-wide configuration.

use overstory_collection::{NavigationConfig, TypeaheadConfig};
use overstory_presence::PresenceConfig;

/// Defaults applied by a [`Host`](crate::Host) to the primitives it drives.
///
/// ```rust
/// use overstory_primitives::EngineConfig;
///
/// let config = EngineConfig {
///     presence: overstory_presence::PresenceConfig { exit_timeout_ms: Some(500) },
///     ..EngineConfig::default()
/// };
/// assert_eq!(config.typeahead.reset_ms, 1000);
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Presence records created for content nodes.
    pub presence: PresenceConfig,
    /// Keyboard navigation in menus.
    pub navigation: NavigationConfig,
    /// Typeahead in menus.
    pub typeahead: TypeaheadConfig,
}
