// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typeahead: jump to the item whose text starts with what the user typed.
//!
//! Characters typed in quick succession accumulate into a search string; a pause longer
//! than [`TypeaheadConfig::reset_ms`] starts a new search. Typing the same character
//! repeatedly cycles through the items starting with it.
//!
//! ```
//! use overstory_collection::{CollectionEntry, ItemInfo, Typeahead};
//! # use overstory_collection::Collections;
//! # use overstory_tree::{NodeAttrs, Tree};
//!
//! struct Label(&'static str);
//! impl ItemInfo for Label {
//!     fn text_value(&self) -> &str { self.0 }
//! }
//!
//! # let mut tree = Tree::new();
//! # let menu = tree.insert(None, NodeAttrs::new());
//! # let mut c = Collections::new();
//! # let scope = c.create_scope(menu);
//! # let mut nodes = Vec::new();
//! # for label in ["Apple", "Banana", "Blueberry"] {
//! #     let n = tree.insert(Some(menu), NodeAttrs::new());
//! #     let _r = c.register(scope, n, Label(label)).unwrap();
//! #     nodes.push(n);
//! # }
//! let items = c.ordered_items(scope, &tree);
//! let mut typeahead = Typeahead::default();
//!
//! assert_eq!(typeahead.search('b', 0, &items, None), Some(nodes[1]));
//! // Same letter again, quickly: cycle to the next "b" item.
//! assert_eq!(typeahead.search('b', 100, &items, Some(nodes[1])), Some(nodes[2]));
//! // After a pause the buffer resets.
//! assert_eq!(typeahead.search('a', 5_000, &items, Some(nodes[2])), Some(nodes[0]));
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use crate::navigation::ItemInfo;
use crate::registry::CollectionEntry;

/// Typeahead timing configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeaheadConfig {
    /// Pause (in milliseconds) after which the search buffer is cleared.
    pub reset_ms: u64,
}

impl Default for TypeaheadConfig {
    fn default() -> Self {
        Self { reset_ms: 1000 }
    }
}

/// Accumulating typeahead search state.
#[derive(Clone, Debug, Default)]
pub struct Typeahead {
    /// Timing configuration.
    pub config: TypeaheadConfig,
    buffer: String,
    last_input: Option<u64>,
}

impl Typeahead {
    /// Create typeahead state with the given configuration.
    pub fn new(config: TypeaheadConfig) -> Self {
        Self {
            config,
            buffer: String::new(),
            last_input: None,
        }
    }

    /// Current search string.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Clear the search string.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last_input = None;
    }

    /// Append `ch` (typed at `now`, in milliseconds) and find the next match.
    ///
    /// The search starts at `current` and wraps around. Single-character searches
    /// skip `current` so repeated presses cycle. Returns `None` when nothing matches
    /// or the match is the current item.
    pub fn search<K, D>(
        &mut self,
        ch: char,
        now: u64,
        items: &[&CollectionEntry<K, D>],
        current: Option<K>,
    ) -> Option<K>
    where
        K: Copy + Eq,
        D: ItemInfo,
    {
        if self
            .last_input
            .is_some_and(|t| now.saturating_sub(t) >= self.config.reset_ms)
        {
            self.buffer.clear();
        }
        self.last_input = Some(now);
        self.buffer.push(ch);
        next_match(items, &self.buffer, current)
    }
}

fn next_match<K, D>(items: &[&CollectionEntry<K, D>], search: &str, current: Option<K>) -> Option<K>
where
    K: Copy + Eq,
    D: ItemInfo,
{
    let mut chars = search.chars();
    let first = chars.next()?;
    let repeated = chars.clone().next().is_some() && chars.all(|c| c == first);
    let mut single = [0_u8; 4];
    let needle = if repeated {
        first.encode_utf8(&mut single).to_lowercase()
    } else {
        search.to_lowercase()
    };
    let exclude_current = needle.chars().count() == 1;

    let enabled: Vec<&CollectionEntry<K, D>> = items
        .iter()
        .copied()
        .filter(|e| !e.data.is_disabled())
        .collect();
    let start = current
        .and_then(|c| enabled.iter().position(|e| e.node == c))
        .unwrap_or(0);

    let found = enabled[start..]
        .iter()
        .chain(&enabled[..start])
        .filter(|e| !(exclude_current && Some(e.node) == current))
        .find(|e| e.data.text_value().to_lowercase().starts_with(&needle))
        .map(|e| e.node);
    found.filter(|&n| Some(n) != current)
}
