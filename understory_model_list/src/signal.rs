// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal single-threaded notification channel.
//!
//! [`Signal`] stores a list of handlers that are invoked in connection order
//! by [`Signal::emit`]. Handlers can be blocked and unblocked individually,
//! which is how the list engine writes to a scroll position model without
//! re-triggering its own value-changed handler.
//!
//! Emission works on a snapshot of the handler list, so handlers may connect,
//! disconnect, block or unblock (themselves or others) while an emission is in
//! progress. Re-entrant emission that would call the *same* handler again
//! while it is still running is a feedback loop and panics.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

/// Identifies a connected handler on a particular signal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

struct Slot<A> {
    id: HandlerId,
    blocked: Cell<u32>,
    connected: Cell<bool>,
    callback: RefCell<Box<dyn FnMut(&A)>>,
}

/// A list of handlers receiving `&A` on every emission.
pub(crate) struct Signal<A> {
    next_id: Cell<u64>,
    slots: RefCell<Vec<Rc<Slot<A>>>>,
}

impl<A> Signal<A> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            slots: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn connect(&self, callback: Box<dyn FnMut(&A)>) -> HandlerId {
        let id = HandlerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.slots.borrow_mut().push(Rc::new(Slot {
            id,
            blocked: Cell::new(0),
            connected: Cell::new(true),
            callback: RefCell::new(callback),
        }));
        id
    }

    /// Disconnects `id`. Unknown ids are ignored.
    pub(crate) fn disconnect(&self, id: HandlerId) {
        let mut slots = self.slots.borrow_mut();
        if let Some(pos) = slots.iter().position(|slot| slot.id == id) {
            let slot = slots.remove(pos);
            slot.connected.set(false);
        }
    }

    /// Increments the block count of `id`; blocked handlers are skipped by `emit`.
    pub(crate) fn block(&self, id: HandlerId) {
        let slot = self.slot(id);
        slot.blocked.set(slot.blocked.get() + 1);
    }

    pub(crate) fn unblock(&self, id: HandlerId) {
        let slot = self.slot(id);
        let blocked = slot.blocked.get();
        assert!(blocked > 0, "unblocking handler {id:?} that is not blocked");
        slot.blocked.set(blocked - 1);
    }

    pub(crate) fn is_blocked(&self, id: HandlerId) -> bool {
        self.slots
            .borrow()
            .iter()
            .find(|slot| slot.id == id)
            .is_some_and(|slot| slot.blocked.get() > 0)
    }

    pub(crate) fn handler_count(&self) -> usize {
        self.slots.borrow().len()
    }

    pub(crate) fn emit(&self, arg: &A) {
        let snapshot: Vec<Rc<Slot<A>>> = self.slots.borrow().clone();
        for slot in snapshot {
            if !slot.connected.get() || slot.blocked.get() > 0 {
                continue;
            }
            let Ok(mut callback) = slot.callback.try_borrow_mut() else {
                panic!(
                    "handler {:?} re-entered while it was still running; \
                     writes from inside a handler must block it first",
                    slot.id
                );
            };
            callback(arg);
        }
    }

    fn slot(&self, id: HandlerId) -> Rc<Slot<A>> {
        let slots = self.slots.borrow();
        match slots.iter().find(|slot| slot.id == id) {
            Some(slot) => slot.clone(),
            None => panic!("handler {id:?} is not connected to this signal"),
        }
    }
}

impl<A> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("handlers", &self.handler_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::vec;

    fn recorder() -> (Rc<RefCell<Vec<u32>>>, Box<dyn FnMut(&u32)>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, Box::new(move |v: &u32| sink.borrow_mut().push(*v)))
    }

    #[test]
    fn emits_to_handlers_in_connection_order() {
        let signal = Signal::<u32>::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in [1_u32, 2, 3] {
            let order = order.clone();
            signal.connect(Box::new(move |_| order.borrow_mut().push(tag)));
        }
        signal.emit(&0);
        assert_eq!(*order.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn blocked_handlers_are_skipped_until_unblocked() {
        let signal = Signal::<u32>::new();
        let (seen, handler) = recorder();
        let id = signal.connect(handler);

        signal.block(id);
        signal.block(id);
        signal.emit(&1);
        signal.unblock(id);
        assert!(signal.is_blocked(id));
        signal.emit(&2);
        signal.unblock(id);
        signal.emit(&3);

        assert_eq!(*seen.borrow(), vec![3]);
    }

    #[test]
    fn disconnect_stops_delivery() {
        let signal = Signal::<u32>::new();
        let (seen, handler) = recorder();
        let id = signal.connect(handler);
        signal.emit(&7);
        signal.disconnect(id);
        signal.emit(&8);
        assert_eq!(*seen.borrow(), vec![7]);
        assert_eq!(signal.handler_count(), 0);
    }

    #[test]
    fn handler_may_disconnect_another_mid_emission() {
        let signal = Rc::new(Signal::<u32>::new());
        let (seen, handler) = recorder();
        let victim = Rc::new(Cell::new(None));

        let s = signal.clone();
        let v = victim.clone();
        signal.connect(Box::new(move |_| {
            if let Some(id) = v.get() {
                s.disconnect(id);
            }
        }));
        victim.set(Some(signal.connect(handler)));

        signal.emit(&1);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    #[should_panic(expected = "re-entered")]
    fn reentrant_emission_panics() {
        let signal = Rc::new(Signal::<u32>::new());
        let s = signal.clone();
        signal.connect(Box::new(move |v| s.emit(&(v + 1))));
        signal.emit(&0);
    }

    #[test]
    #[should_panic(expected = "not blocked")]
    fn unbalanced_unblock_panics() {
        let signal = Signal::<u32>::new();
        let id = signal.connect(Box::new(|_| {}));
        signal.unblock(id);
    }
}
