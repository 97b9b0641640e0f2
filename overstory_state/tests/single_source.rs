// Copyright 2025 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the single-source rule of controllable cells.

use std::cell::RefCell;
use std::rc::Rc;

use overstory_state::ControllableCell;
use proptest::prelude::*;

proptest! {
    /// Under control, writes never move `read()`; only `sync` does.
    #[test]
    fn controlled_reads_only_follow_sync(initial in any::<i16>(), writes in prop::collection::vec(any::<i16>(), 0..32)) {
        let requested = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&requested);
        let mut cell = ControllableCell::controlled(initial)
            .with_on_change(move |v: &i16| sink.borrow_mut().push(*v));

        for w in &writes {
            cell.set(*w);
            prop_assert_eq!(*cell.read(), initial);
        }

        // Every request that differed from the external value was reported, in order.
        let expected: Vec<i16> = writes.iter().copied().filter(|w| *w != initial).collect();
        prop_assert_eq!(&*requested.borrow(), &expected);

        if let Some(last) = writes.last() {
            cell.sync(Some(*last));
            prop_assert_eq!(*cell.read(), *last);
        }
    }

    /// Without control, writes land immediately and notify only on real changes.
    #[test]
    fn uncontrolled_reads_follow_writes(initial in any::<i16>(), writes in prop::collection::vec(any::<i16>(), 0..32)) {
        let notified = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&notified);
        let mut cell = ControllableCell::uncontrolled(initial)
            .with_on_change(move |v: &i16| sink.borrow_mut().push(*v));

        let mut previous = initial;
        let mut expected = Vec::new();
        for w in &writes {
            cell.set(*w);
            prop_assert_eq!(*cell.read(), *w);
            if *w != previous {
                expected.push(*w);
            }
            previous = *w;
        }
        prop_assert_eq!(&*notified.borrow(), &expected);
    }
}
