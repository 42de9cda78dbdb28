// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host layout protocol the list engine drives.
//!
//! The engine never lays out or paints row contents itself. It asks the host
//! to measure rows, tells it where rows go, and delegates painting. Rows are
//! host-owned handles (typically reference counted widgets); the engine only
//! moves handles between its attached list and its reuse pool.

use kurbo::Rect;

/// Host-side operations on row handles.
pub trait ListHost {
    /// A handle to a host visual object used as a row renderer.
    ///
    /// Cloning must produce another handle to the *same* object, so that
    /// [`ListHost::same_row`] can compare a clone against the original.
    type Row: Clone;

    /// Returns `true` if both handles refer to the same row object.
    fn same_row(a: &Self::Row, b: &Self::Row) -> bool;

    /// Minimum height of `row` when given `for_width` of horizontal space.
    ///
    /// Rows are only ever allocated their minimum height. A negative or
    /// non-finite result is a host contract violation.
    fn measure_height(&self, row: &Self::Row, for_width: f64) -> f64;

    /// Minimum and natural width of `row`.
    fn measure_width(&self, row: &Self::Row) -> (f64, f64);

    /// Parents `row` under the list if it is not parented yet.
    ///
    /// Called every time a row is bound; implementations must tolerate rows
    /// that are already attached.
    fn attach(&mut self, row: &Self::Row);

    /// Toggles whether a parented row takes part in drawing and input.
    fn set_child_visible(&mut self, row: &Self::Row, visible: bool);

    /// Gives `row` its final rectangle in list coordinates.
    fn place(&mut self, row: &Self::Row, rect: Rect);

    /// Unparents `row` and releases host-level resources held for it.
    fn detach(&mut self, row: &Self::Row);

    /// Starts clipping subsequent paint calls to `rect`.
    fn push_clip(&mut self, rect: Rect);

    /// Ends the most recent [`ListHost::push_clip`].
    fn pop_clip(&mut self);

    /// Paints one attached row.
    fn paint_row(&mut self, row: &Self::Row);
}
