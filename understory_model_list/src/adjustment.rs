// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll position model shared between a scroller and a scrollable child.

use alloc::boxed::Box;
use core::cell::Cell;
use core::fmt;

use crate::signal::{HandlerId, Signal};

/// A bounded scroll position: `value` within `[lower, upper - page_size]`.
///
/// The adjustment is owned by the host (usually shared via `Rc` between a
/// scrollbar and a scrollable child) and uses interior mutability so that all
/// parties can hold shared references.
///
/// Only [`Adjustment::set_value`] clamps. Setting the bounds stores them as
/// given and leaves `value` alone, so callers that change `upper` or
/// `page_size` are responsible for re-clamping.
///
/// ```rust
/// use understory_model_list::Adjustment;
///
/// let adj = Adjustment::new(0.0, 0.0, 1000.0, 200.0);
/// adj.set_value(5000.0);
/// assert_eq!(adj.value(), 800.0);
/// ```
pub struct Adjustment {
    value: Cell<f64>,
    lower: Cell<f64>,
    upper: Cell<f64>,
    page_size: Cell<f64>,
    value_changed: Signal<f64>,
}

impl Adjustment {
    /// Creates an adjustment with the given state.
    ///
    /// `value` is clamped into the valid range.
    #[must_use]
    pub fn new(value: f64, lower: f64, upper: f64, page_size: f64) -> Self {
        let adj = Self {
            value: Cell::new(lower),
            lower: Cell::new(lower),
            upper: Cell::new(upper),
            page_size: Cell::new(page_size),
            value_changed: Signal::new(),
        };
        adj.value.set(adj.clamp_value(value));
        adj
    }

    /// Returns the current value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value.get()
    }

    /// Returns the lower bound.
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.lower.get()
    }

    /// Returns the upper bound.
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.upper.get()
    }

    /// Returns the page size (the visible extent).
    #[must_use]
    pub fn page_size(&self) -> f64 {
        self.page_size.get()
    }

    /// Largest value [`Adjustment::set_value`] accepts: `max(lower, upper - page_size)`.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        (self.upper.get() - self.page_size.get()).max(self.lower.get())
    }

    /// Sets the value, clamped to `[lower, max_value()]`.
    ///
    /// Notifies value-changed handlers if the stored value actually changed.
    pub fn set_value(&self, value: f64) {
        let value = self.clamp_value(value);
        if value == self.value.get() {
            return;
        }
        self.value.set(value);
        self.value_changed.emit(&value);
    }

    /// Sets the lower bound without re-clamping the value.
    pub fn set_lower(&self, lower: f64) {
        self.lower.set(lower);
    }

    /// Sets the upper bound without re-clamping the value.
    pub fn set_upper(&self, upper: f64) {
        self.upper.set(upper);
    }

    /// Sets the page size without re-clamping the value.
    pub fn set_page_size(&self, page_size: f64) {
        self.page_size.set(page_size);
    }

    /// Sets all bounds, then the (clamped) value.
    pub fn configure(&self, value: f64, lower: f64, upper: f64, page_size: f64) {
        self.lower.set(lower);
        self.upper.set(upper);
        self.page_size.set(page_size);
        self.set_value(value);
    }

    /// Registers a handler called with the new value after every change.
    pub fn connect_value_changed(&self, handler: impl FnMut(f64) + 'static) -> HandlerId {
        let mut handler = handler;
        self.value_changed
            .connect(Box::new(move |value: &f64| handler(*value)))
    }

    /// Removes a handler registered with [`Adjustment::connect_value_changed`].
    pub fn disconnect(&self, id: HandlerId) {
        self.value_changed.disconnect(id);
    }

    /// Suppresses one handler until the returned guard is dropped.
    ///
    /// Other handlers still observe changes made while the guard is alive.
    /// Guards nest.
    #[must_use = "the handler is unblocked as soon as the guard is dropped"]
    pub fn block_value_changed(&self, id: HandlerId) -> ValueChangedBlock<'_> {
        self.value_changed.block(id);
        ValueChangedBlock { adjustment: self, id }
    }

    /// Returns `true` if `id` is currently blocked.
    #[must_use]
    pub fn is_blocked(&self, id: HandlerId) -> bool {
        self.value_changed.is_blocked(id)
    }

    fn clamp_value(&self, value: f64) -> f64 {
        value.min(self.max_value()).max(self.lower.get())
    }
}

impl Default for Adjustment {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

impl fmt::Debug for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adjustment")
            .field("value", &self.value.get())
            .field("lower", &self.lower.get())
            .field("upper", &self.upper.get())
            .field("page_size", &self.page_size.get())
            .field("value_changed", &self.value_changed)
            .finish()
    }
}

/// Scoped suppression of one value-changed handler.
///
/// Created by [`Adjustment::block_value_changed`]; unblocks on drop, including
/// during unwinding.
pub struct ValueChangedBlock<'a> {
    adjustment: &'a Adjustment,
    id: HandlerId,
}

impl Drop for ValueChangedBlock<'_> {
    fn drop(&mut self) {
        self.adjustment.value_changed.unblock(self.id);
    }
}

impl fmt::Debug for ValueChangedBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueChangedBlock")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
