// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type of the composite primitives.

use alloc::string::String;

use overstory_collection::CollectionError;
use overstory_dismiss::DismissError;

/// Misuse of a primitive's handles or item values.
///
/// Normal interaction never fails; these errors report stale handles and unknown
/// item values passed in by the caller.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A collection scope or registration was stale.
    #[error(transparent)]
    Collection(#[from] CollectionError),
    /// A layer id was stale.
    #[error(transparent)]
    Dismiss(#[from] DismissError),
    /// No item is registered under this value.
    #[error("no item with value {0:?}")]
    UnknownItem(String),
}
