// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overstory State: controllable state cells.
//!
//! Every stateful primitive accepts an optional controlled value, a default value, and a
//! change callback. [`ControllableCell`] reconciles those into a single read/write surface:
//!
//! - **Controlled** (a value was supplied): reads return the external value and writes only
//!   *request* a change through the callback. The owner reflects the accepted value on the
//!   next render with [`ControllableCell::sync`].
//! - **Uncontrolled** (no value supplied): reads return internal storage, writes mutate it,
//!   and the callback fires after a settle pass detects an actual change.
//!
//! The mode is resolved once, at construction.
//!
//! ## Minimal example
//!
//! ```rust
//! use overstory_state::ControllableCell;
//!
//! // Uncontrolled: writes land immediately.
//! let mut open = ControllableCell::new(None, false);
//! open.set(true);
//! assert!(*open.read());
//!
//! // Controlled: writes are requests; the owner decides.
//! let mut open = ControllableCell::new(Some(false), false);
//! open.set(true);
//! assert!(!*open.read());
//! open.sync(Some(true));
//! assert!(*open.read());
//! ```
//!
//! ## Switching modes
//!
//! A cell never changes mode. Handing a defined value to an uncontrolled cell, or dropping
//! the value of a controlled cell, logs a warning once per cell and is otherwise ignored:
//! controlled cells keep their last external value and uncontrolled cells keep their
//! internal value.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::boxed::Box;

type ChangeHandler<T> = Box<dyn FnMut(&T)>;

/// Where a cell's value comes from. Resolved once per cell.
#[derive(Clone, Debug)]
enum Source<T> {
    Controlled { value: T },
    Uncontrolled { value: T, settled: T },
}

/// A value that may be driven externally (controlled) or internally (uncontrolled).
///
/// See the [crate documentation](crate) for the semantics of each mode.
pub struct ControllableCell<T> {
    source: Source<T>,
    on_change: Option<ChangeHandler<T>>,
    warned_mode_switch: bool,
}

impl<T: core::fmt::Debug> core::fmt::Debug for ControllableCell<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControllableCell")
            .field("source", &self.source)
            .field("has_on_change", &self.on_change.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + PartialEq> ControllableCell<T> {
    /// Create a cell from an optional controlled value and a default.
    ///
    /// `Some(prop)` makes the cell controlled and `default` is ignored.
    pub fn new(prop: Option<T>, default: T) -> Self {
        match prop {
            Some(value) => Self::controlled(value),
            None => Self::uncontrolled(default),
        }
    }

    /// Create a controlled cell.
    pub fn controlled(value: T) -> Self {
        Self {
            source: Source::Controlled { value },
            on_change: None,
            warned_mode_switch: false,
        }
    }

    /// Create an uncontrolled cell holding `default`.
    pub fn uncontrolled(default: T) -> Self {
        Self {
            source: Source::Uncontrolled {
                value: default.clone(),
                settled: default,
            },
            on_change: None,
            warned_mode_switch: false,
        }
    }

    /// Attach the change callback.
    pub fn with_on_change(mut self, on_change: impl FnMut(&T) + 'static) -> Self {
        self.on_change = Some(Box::new(on_change));
        self
    }

    /// Replace (or clear) the change callback.
    pub fn set_on_change(&mut self, on_change: Option<Box<dyn FnMut(&T)>>) {
        self.on_change = on_change;
    }

    /// Whether the cell reads an external value.
    pub fn is_controlled(&self) -> bool {
        matches!(self.source, Source::Controlled { .. })
    }

    /// Current value: the external value when controlled, internal storage otherwise.
    pub fn read(&self) -> &T {
        match &self.source {
            Source::Controlled { value } | Source::Uncontrolled { value, .. } => value,
        }
    }

    /// Write a literal next value.
    pub fn set(&mut self, next: T) {
        self.write(next);
    }

    /// Write a value computed from the current externally visible value.
    ///
    /// Under control the previous value is the external value, never a stale
    /// internal copy.
    pub fn update(&mut self, f: impl FnOnce(&T) -> T) {
        let next = f(self.read());
        self.write(next);
    }

    /// Feed the controlled value for the next render.
    ///
    /// Controlled cells adopt `Some(value)` silently. Mode switches are ignored
    /// and logged once per cell.
    pub fn sync(&mut self, prop: Option<T>) {
        let controlled = self.is_controlled();
        match prop {
            Some(next) if controlled => {
                if let Source::Controlled { value } = &mut self.source {
                    *value = next;
                }
            }
            None if !controlled => {}
            None => self.warn_mode_switch("controlled", "uncontrolled"),
            Some(_) => self.warn_mode_switch("uncontrolled", "controlled"),
        }
    }

    fn write(&mut self, next: T) {
        match &mut self.source {
            Source::Controlled { value } => {
                if next != *value
                    && let Some(cb) = self.on_change.as_mut()
                {
                    cb(&next);
                }
            }
            Source::Uncontrolled { value, .. } => {
                *value = next;
                self.settle();
            }
        }
    }

    /// Change detection: notify only if the value differs from the last settled one.
    fn settle(&mut self) {
        if let Source::Uncontrolled { value, settled } = &mut self.source
            && *value != *settled
        {
            *settled = value.clone();
            if let Some(cb) = self.on_change.as_mut() {
                cb(value);
            }
        }
    }

    fn warn_mode_switch(&mut self, from: &str, to: &str) {
        if self.warned_mode_switch {
            return;
        }
        self.warned_mode_switch = true;
        tracing::warn!(
            from,
            to,
            "component switched between controlled and uncontrolled state; keeping the original mode"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    fn recorder<T: Clone + 'static>() -> (Rc<RefCell<Vec<T>>>, impl FnMut(&T) + 'static) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |v: &T| sink.borrow_mut().push(v.clone()))
    }

    #[test]
    fn uncontrolled_write_is_immediate() {
        let (log, cb) = recorder::<u32>();
        let mut cell = ControllableCell::new(None, 1).with_on_change(cb);
        assert!(!cell.is_controlled());

        cell.set(2);
        assert_eq!(*cell.read(), 2);
        assert_eq!(*log.borrow(), vec![2]);
    }

    #[test]
    fn uncontrolled_same_value_is_silent() {
        let (log, cb) = recorder::<u32>();
        let mut cell = ControllableCell::uncontrolled(7).with_on_change(cb);
        cell.set(7);
        cell.update(|v| *v);
        assert!(log.borrow().is_empty());

        cell.set(8);
        cell.set(8);
        assert_eq!(*log.borrow(), vec![8]);
    }

    #[test]
    fn controlled_write_only_requests() {
        let (log, cb) = recorder::<bool>();
        let mut cell = ControllableCell::new(Some(false), true).with_on_change(cb);
        assert!(cell.is_controlled());
        assert!(!*cell.read(), "default is ignored under control");

        cell.set(true);
        assert!(!*cell.read());
        assert_eq!(*log.borrow(), vec![true]);

        // Requesting the current value does not notify.
        cell.set(false);
        assert_eq!(log.borrow().len(), 1);

        cell.sync(Some(true));
        assert!(*cell.read());
        assert_eq!(log.borrow().len(), 1, "sync never notifies");
    }

    #[test]
    fn functional_update_sees_external_value() {
        let (log, cb) = recorder::<u32>();
        let mut cell = ControllableCell::controlled(10).with_on_change(cb);
        cell.update(|prev| prev + 1);
        cell.update(|prev| prev + 1);
        // Both updates start from the external 10, not from a stale local copy.
        assert_eq!(*log.borrow(), vec![11, 11]);
    }

    #[test]
    fn mode_switches_are_ignored() {
        let mut cell = ControllableCell::uncontrolled(1);
        cell.sync(Some(5));
        assert!(!cell.is_controlled());
        assert_eq!(*cell.read(), 1);

        let mut cell = ControllableCell::controlled(3);
        cell.sync(None);
        assert!(cell.is_controlled());
        assert_eq!(*cell.read(), 3);
        cell.sync(Some(4));
        assert_eq!(*cell.read(), 4);
    }
}
