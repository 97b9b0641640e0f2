// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Roving keyboard navigation over ordered collection items.
//!
//! Navigation works on the output of
//! [`Collections::ordered_items`](crate::Collections::ordered_items), so it always
//! follows the live visual order. Disabled items are skipped.

use alloc::vec::Vec;

use crate::registry::CollectionEntry;

/// Keys a host forwards to keyboard-driven primitives.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Arrow up.
    ArrowUp,
    /// Arrow down.
    ArrowDown,
    /// Arrow left.
    ArrowLeft,
    /// Arrow right.
    ArrowRight,
    /// Home.
    Home,
    /// End.
    End,
    /// Enter.
    Enter,
    /// Space bar.
    Space,
    /// Escape.
    Escape,
    /// Tab.
    Tab,
    /// A printable character (typeahead input).
    Character(char),
}

/// Navigation intent within an ordered collection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Navigation {
    /// Move to the next enabled item.
    Next,
    /// Move to the previous enabled item.
    Prev,
    /// Move to the first enabled item.
    First,
    /// Move to the last enabled item.
    Last,
}

/// Axis along which arrow keys move.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Left/right arrows move.
    Horizontal,
    /// Up/down arrows move.
    Vertical,
    /// All arrows move.
    Both,
}

/// Whether navigation wraps at the ends of a collection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WrapMode {
    /// Stop at the first and last items.
    Never,
    /// Wrap from the last item to the first and back.
    Wrap,
}

/// Keyboard navigation configuration of a composite.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavigationConfig {
    /// Wrap behavior at the ends.
    pub wrap: WrapMode,
    /// Arrow-key axis.
    pub orientation: Orientation,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            wrap: WrapMode::Wrap,
            orientation: Orientation::Vertical,
        }
    }
}

impl Navigation {
    /// Map a key to a navigation intent for the given orientation.
    ///
    /// Home and End work on every axis; arrows only along `orientation`.
    pub fn from_key(key: Key, orientation: Orientation) -> Option<Self> {
        let vertical = matches!(orientation, Orientation::Vertical | Orientation::Both);
        let horizontal = matches!(orientation, Orientation::Horizontal | Orientation::Both);
        match key {
            Key::Home => Some(Self::First),
            Key::End => Some(Self::Last),
            Key::ArrowDown if vertical => Some(Self::Next),
            Key::ArrowUp if vertical => Some(Self::Prev),
            Key::ArrowRight if horizontal => Some(Self::Next),
            Key::ArrowLeft if horizontal => Some(Self::Prev),
            _ => None,
        }
    }
}

/// Metadata navigation needs from an item.
pub trait ItemInfo {
    /// Disabled items are skipped by navigation and typeahead.
    fn is_disabled(&self) -> bool {
        false
    }

    /// Text matched by typeahead.
    fn text_value(&self) -> &str {
        ""
    }
}

impl ItemInfo for () {}

/// Select the item reached from `origin` by `navigation`.
///
/// `items` must be in tree order. A missing or unknown `origin` starts from the
/// edge: `Next` yields the first enabled item and `Prev` the last.
pub fn next_item<K, D>(
    items: &[&CollectionEntry<K, D>],
    origin: Option<K>,
    navigation: Navigation,
    wrap: WrapMode,
) -> Option<K>
where
    K: Copy + Eq,
    D: ItemInfo,
{
    let mut enabled = items.iter().filter(|e| !e.data.is_disabled());
    let forward = match navigation {
        Navigation::First => return enabled.next().map(|e| e.node),
        Navigation::Last => return enabled.next_back().map(|e| e.node),
        Navigation::Next => true,
        Navigation::Prev => false,
    };

    let candidates: Vec<K> = enabled.map(|e| e.node).collect();
    let last = candidates.len().checked_sub(1)?;
    let origin_pos = origin.and_then(|o| candidates.iter().position(|&k| k == o));

    let target = match origin_pos {
        None if forward => 0,
        None => last,
        Some(pos) if forward && pos < last => pos + 1,
        Some(pos) if !forward && pos > 0 => pos - 1,
        Some(_) => match (wrap, forward) {
            (WrapMode::Wrap, true) => 0,
            (WrapMode::Wrap, false) => last,
            (WrapMode::Never, _) => return None,
        },
    };
    Some(candidates[target])
}
