// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row renderer lifecycle: binding, releasing, and pooling host row handles.
//!
//! Every live row handle is either attached (bound to exactly one model item
//! inside the window, in model order) or pooled (unbound, waiting to be
//! rebound). Handles move between the two by value, so a handle can never be
//! in both places at once.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt;

use crate::host::ListHost;

/// Binds an item to a row: `(item, recycled_row, index) -> row`.
///
/// When a recycled row is passed in, the function must rebind that same row
/// in place and return it; returning a different row is a contract violation
/// and panics. When `None` is passed, a new row must be created.
pub(crate) type FillFn<I, R> = Box<dyn FnMut(&I, Option<R>, usize) -> R>;

/// Unbinds a row from its item before the row goes back to the pool:
/// `(row, item, index)`.
///
/// This is where hosts cancel pending loads or drop per-item wiring.
pub(crate) type RemoveFn<I, R> = Box<dyn FnMut(&R, &I, usize)>;

/// An attached row together with the item it is bound to and its measured height.
pub(crate) struct AttachedRow<R, I> {
    pub(crate) row: R,
    pub(crate) item: I,
    pub(crate) height: f64,
}

pub(crate) struct Rows<R, I> {
    attached: VecDeque<AttachedRow<R, I>>,
    pool: Vec<R>,
    fill: Option<FillFn<I, R>>,
    remove: Option<RemoveFn<I, R>>,
}

impl<R: Clone, I> Rows<R, I> {
    pub(crate) fn new() -> Self {
        Self {
            attached: VecDeque::with_capacity(20),
            pool: Vec::with_capacity(10),
            fill: None,
            remove: None,
        }
    }

    pub(crate) fn set_fill(&mut self, fill: FillFn<I, R>) {
        self.fill = Some(fill);
    }

    pub(crate) fn set_remove(&mut self, remove: Option<RemoveFn<I, R>>) {
        self.remove = remove;
    }

    pub(crate) fn has_fill(&self) -> bool {
        self.fill.is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.attached.len()
    }

    pub(crate) fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &AttachedRow<R, I>> {
        self.attached.iter()
    }

    pub(crate) fn heights(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.attached.iter().map(|row| row.height)
    }

    /// Sum of the measured heights of all attached rows.
    pub(crate) fn bin_height(&self) -> f64 {
        self.heights().sum()
    }

    pub(crate) fn first_height(&self) -> Option<f64> {
        self.attached.front().map(|row| row.height)
    }

    pub(crate) fn last_height(&self) -> Option<f64> {
        self.attached.back().map(|row| row.height)
    }

    /// Binds `item` to a pooled row if one is available, otherwise to a new one.
    ///
    /// The row is parented, made child-visible, and measured, but not yet
    /// inserted into the attached list.
    pub(crate) fn bind<H>(
        &mut self,
        host: &mut H,
        item: I,
        index: usize,
        for_width: f64,
    ) -> AttachedRow<R, I>
    where
        H: ListHost<Row = R>,
    {
        let Some(fill) = self.fill.as_mut() else {
            panic!("binding row {index} without a fill function");
        };
        let recycled = self.pool.pop();
        let witness = recycled.clone();
        let row = fill(&item, recycled, index);
        match witness {
            Some(witness) => assert!(
                H::same_row(&witness, &row),
                "fill function returned a different row for index {index} instead of rebinding the recycled one"
            ),
            None => assert!(
                !self.owns::<H>(&row),
                "fill function returned a row for index {index} that is already attached or pooled"
            ),
        }

        host.attach(&row);
        host.set_child_visible(&row, true);
        let height = measure(host, &row, for_width);
        AttachedRow { row, item, height }
    }

    pub(crate) fn push_front(&mut self, row: AttachedRow<R, I>) {
        self.attached.push_front(row);
    }

    pub(crate) fn push_back(&mut self, row: AttachedRow<R, I>) {
        self.attached.push_back(row);
    }

    /// Unbinds the attached row at `position` and returns it to the pool.
    ///
    /// `index` is the model index the row is shown for.
    pub(crate) fn release<H>(&mut self, host: &mut H, position: usize, index: usize)
    where
        H: ListHost<Row = R>,
    {
        let Some(AttachedRow { row, item, .. }) = self.attached.remove(position) else {
            panic!(
                "releasing row at position {position} of {} attached",
                self.attached.len()
            );
        };
        host.set_child_visible(&row, false);
        if let Some(remove) = self.remove.as_mut() {
            remove(&row, &item, index);
        }
        self.pool.push(row);
    }

    /// Releases every attached row, last first. `from` is the model index of the first row.
    pub(crate) fn release_all<H>(&mut self, host: &mut H, from: usize)
    where
        H: ListHost<Row = R>,
    {
        while !self.attached.is_empty() {
            let position = self.attached.len() - 1;
            self.release(host, position, from + position);
        }
    }

    /// Re-measures every attached row at `for_width`.
    pub(crate) fn remeasure<H>(&mut self, host: &H, for_width: f64)
    where
        H: ListHost<Row = R>,
    {
        for attached in &mut self.attached {
            attached.height = measure(host, &attached.row, for_width);
        }
    }

    /// Releases attached rows, then detaches and drops every row handle.
    pub(crate) fn teardown<H>(&mut self, host: &mut H, from: usize)
    where
        H: ListHost<Row = R>,
    {
        self.release_all(host, from);
        for row in self.pool.drain(..) {
            host.detach(&row);
        }
    }

    fn owns<H>(&self, row: &R) -> bool
    where
        H: ListHost<Row = R>,
    {
        self.attached
            .iter()
            .any(|attached| H::same_row(&attached.row, row))
            || self.pool.iter().any(|pooled| H::same_row(pooled, row))
    }
}

fn measure<H: ListHost>(host: &H, row: &H::Row, for_width: f64) -> f64 {
    let height = host.measure_height(row, for_width);
    assert!(
        height.is_finite() && height >= 0.0,
        "row measured with invalid height {height}"
    );
    height
}

impl<R, I> fmt::Debug for Rows<R, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rows")
            .field("attached", &self.attached.len())
            .field("pool", &self.pool.len())
            .field("has_fill", &self.fill.is_some())
            .field("has_remove", &self.remove.is_some())
            .finish()
    }
}
