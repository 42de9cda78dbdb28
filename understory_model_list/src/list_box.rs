// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The list box engine and its public API.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::ops::Range;

use kurbo::{Rect, Size};

use crate::adjustment::Adjustment;
use crate::estimate::HeightEstimate;
use crate::host::ListHost;
use crate::model::{ItemsChanged, ListModel};
use crate::report::LayoutPassReport;
use crate::rows::Rows;
use crate::signal::HandlerId;
use crate::window::Window;

/// State shared with the model and adjustment handlers.
///
/// Handlers never touch the engine directly: they record what happened and
/// request a layout pass, which the host runs at its own pace.
#[derive(Debug, Default)]
struct Invalidation {
    layout_requested: Cell<bool>,
    pending: RefCell<Vec<ItemsChanged>>,
}

impl Invalidation {
    fn items_changed(&self, change: ItemsChanged) {
        self.pending.borrow_mut().push(change);
        self.layout_requested.set(true);
    }

    fn request_layout(&self) {
        self.layout_requested.set(true);
    }
}

/// A vertically scrolling list that materializes only the rows in view.
///
/// `ModelListBox` reads items from a [`ListModel`], binds them to host rows
/// through a fill function, and keeps just enough rows attached to cover the
/// viewport. Rows that scroll out of view are unbound and pooled for reuse.
/// The total content height is estimated from the mean height of the attached
/// rows, and the scroll [`Adjustment`] is kept consistent with that estimate
/// as it changes.
///
/// The engine does no work on its own. Model and scroll changes only mark it
/// as needing layout (see [`ModelListBox::needs_layout`]); the host then calls
/// [`ModelListBox::perform_layout_pass`] with the viewport size, and
/// [`ModelListBox::paint`] when drawing.
pub struct ModelListBox<M: ListModel, H: ListHost> {
    pub(crate) host: H,
    pub(crate) model: Option<Rc<M>>,
    model_handler: Option<HandlerId>,
    pub(crate) vadjustment: Option<Rc<Adjustment>>,
    pub(crate) value_handler: Option<HandlerId>,
    pub(crate) rows: Rows<H::Row, M::Item>,
    pub(crate) window: Window,
    pub(crate) viewport: Size,
    /// Average row height from the last pass that had rows attached.
    pub(crate) last_row_height: f64,
    invalidation: Rc<Invalidation>,
    pass_serial: u64,
}

impl<M: ListModel, H: ListHost> ModelListBox<M, H> {
    /// Creates an empty list box driving `host`.
    ///
    /// Nothing is shown until a model, an adjustment and a fill function are set.
    pub fn new(host: H) -> Self {
        Self {
            host,
            model: None,
            model_handler: None,
            vadjustment: None,
            value_handler: None,
            rows: Rows::new(),
            window: Window::default(),
            viewport: Size::ZERO,
            last_row_height: 0.0,
            invalidation: Rc::new(Invalidation::default()),
            pass_serial: 0,
        }
    }

    /// Sets or clears the model.
    ///
    /// Every attached row is released and the window resets to the start.
    pub fn set_model(&mut self, model: Option<Rc<M>>) {
        if let (Some(old), Some(id)) = (self.model.as_ref(), self.model_handler.take()) {
            old.disconnect_items_changed(id);
        }
        self.release_window(0);
        self.window.bin_y_diff = 0.0;
        self.invalidation.pending.borrow_mut().clear();

        if let Some(model) = &model {
            let invalidation = self.invalidation.clone();
            self.model_handler = Some(
                model.connect_items_changed(Box::new(move |change| {
                    invalidation.items_changed(change);
                })),
            );
        }
        self.model = model;
        self.invalidation.request_layout();
    }

    /// Returns the current model.
    #[must_use]
    pub fn model(&self) -> Option<&Rc<M>> {
        self.model.as_ref()
    }

    /// Sets or clears the vertical scroll adjustment.
    ///
    /// User changes to its value request a layout pass. The engine's own
    /// corrections to the value do not.
    pub fn set_vadjustment(&mut self, adjustment: Option<Rc<Adjustment>>) {
        if let (Some(old), Some(id)) = (self.vadjustment.as_ref(), self.value_handler.take()) {
            old.disconnect(id);
        }
        if let Some(adjustment) = &adjustment {
            let invalidation = self.invalidation.clone();
            self.value_handler =
                Some(adjustment.connect_value_changed(move |_| invalidation.request_layout()));
        }
        self.vadjustment = adjustment;
        self.invalidation.request_layout();
    }

    /// Returns the current vertical adjustment.
    #[must_use]
    pub fn vadjustment(&self) -> Option<&Rc<Adjustment>> {
        self.vadjustment.as_ref()
    }

    /// Sets the function that binds an item to a row.
    ///
    /// It is called as `fill(item, recycled, index)`. When `recycled` is
    /// `Some`, the function must rebind and return that same row; otherwise
    /// it creates a new one.
    ///
    /// # Panics
    ///
    /// A later layout pass panics if the function returns a different row
    /// than the recycled one it was given.
    pub fn set_fill_function(
        &mut self,
        fill: impl FnMut(&M::Item, Option<H::Row>, usize) -> H::Row + 'static,
    ) {
        self.rows.set_fill(Box::new(fill));
        self.invalidation.request_layout();
    }

    /// Sets the function called as `remove(row, item, index)` before a row is
    /// pooled.
    ///
    /// `item` is the item the row was bound to, even if the model has since
    /// dropped it.
    pub fn set_remove_function(&mut self, remove: impl FnMut(&H::Row, &M::Item, usize) + 'static) {
        self.rows.set_remove(Some(Box::new(remove)));
    }

    /// Clears the remove function.
    pub fn clear_remove_function(&mut self) {
        self.rows.set_remove(None);
    }

    /// Returns `true` if something changed since the last layout pass.
    #[must_use]
    pub fn needs_layout(&self) -> bool {
        self.invalidation.layout_requested.get()
    }

    /// Applies queued model changes to the window.
    ///
    /// A change entirely below the window leaves the rows alone and only
    /// updates the scroll bounds. Any other change releases every row and
    /// collapses the window, to be repopulated by the next pass.
    ///
    /// Called at the start of every [`ModelListBox::perform_layout_pass`].
    pub fn flush_model_changes(&mut self) {
        let pending = core::mem::take(&mut *self.invalidation.pending.borrow_mut());
        if pending.is_empty() {
            return;
        }
        let to = self.window.to;
        if pending.iter().all(|change| change.position >= to) {
            self.reconfigure();
            return;
        }

        let n_items = self.model.as_ref().map_or(0, |model| model.n_items());
        #[cfg(feature = "tracing")]
        tracing::debug!(
            changes = pending.len(),
            from = self.window.from,
            to,
            n_items,
            "model changed inside the window, releasing rows"
        );
        self.release_window(self.window.from.min(n_items));
        self.window.bin_y_diff = 0.0;
    }

    /// Reconciles the window, rows and scroll position for `viewport`.
    ///
    /// After the pass every attached row has been measured at the viewport
    /// width and placed at `Rect(0, y, width, y + height)`, where `y` starts at
    /// the window top and accumulates row heights.
    pub fn perform_layout_pass(&mut self, viewport: Size) -> LayoutPassReport {
        self.viewport = viewport;
        self.invalidation.layout_requested.set(false);
        self.flush_model_changes();

        self.pass_serial += 1;
        let mut report = LayoutPassReport {
            serial: self.pass_serial,
            ..LayoutPassReport::default()
        };

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "layout_pass",
            pass = self.pass_serial,
            width = viewport.width,
            height = viewport.height,
        )
        .entered();

        self.ensure_visible_rows(&mut report);
        self.place_rows();

        report.model_from = self.window.from;
        report.model_to = self.window.to;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            from = report.model_from,
            to = report.model_to,
            added = report.top_added + report.bottom_added,
            removed = report.top_removed + report.bottom_removed,
            relocated = report.relocated,
            "layout pass done"
        );
        report
    }

    fn place_rows(&mut self) {
        let Some(adjustment) = self.vadjustment.as_deref() else {
            return;
        };
        let width = self.viewport.width;
        let mut y = self.bin_y(adjustment);
        for attached in self.rows.iter() {
            let rect = Rect::new(0.0, y, width, y + attached.height);
            self.host.place(&attached.row, rect);
            y += attached.height;
        }
    }

    /// Paints the attached rows in order, clipped to the viewport.
    pub fn paint(&mut self) {
        self.host.push_clip(self.viewport.to_rect());
        for attached in self.rows.iter() {
            self.host.paint_row(&attached.row);
        }
        self.host.pop_clip();
    }

    /// Minimum and natural width: the largest of the attached rows.
    #[must_use]
    pub fn preferred_width(&self) -> (f64, f64) {
        self.rows.iter().fold((0.0, 0.0), |(min, natural), attached| {
            let (row_min, row_natural) = self.host.measure_width(&attached.row);
            (f64::max(min, row_min), f64::max(natural, row_natural))
        })
    }

    /// Minimum and natural height.
    ///
    /// Always `(1.0, 1.0)`: the list takes whatever height its scroller gives it.
    #[must_use]
    pub fn preferred_height(&self) -> (f64, f64) {
        (1.0, 1.0)
    }

    /// Viewport size of the last layout pass.
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Materialized model index range.
    #[must_use]
    pub fn window(&self) -> Range<usize> {
        self.window.from..self.window.to
    }

    /// First materialized model index.
    #[must_use]
    pub fn model_from(&self) -> usize {
        self.window.from
    }

    /// One past the last materialized model index.
    #[must_use]
    pub fn model_to(&self) -> usize {
        self.window.to
    }

    /// Number of attached rows.
    #[must_use]
    pub fn attached_len(&self) -> usize {
        self.rows.len()
    }

    /// Number of pooled rows waiting to be rebound.
    #[must_use]
    pub fn pool_len(&self) -> usize {
        self.rows.pool_len()
    }

    /// Pixels between the scroll value and the window top: `bin_y = -value + bin_y_diff`.
    #[must_use]
    pub fn bin_y_diff(&self) -> f64 {
        self.window.bin_y_diff
    }

    /// Attached rows in model order.
    pub fn attached_rows(&self) -> impl Iterator<Item = &H::Row> + '_ {
        self.rows.iter().map(|attached| &attached.row)
    }

    /// Height estimate from the rows attached now, or `None` without a model.
    #[must_use]
    pub fn height_estimate(&self) -> Option<HeightEstimate> {
        self.model
            .as_deref()
            .map(|model| self.estimate_with(model))
    }

    /// Mean height of the attached rows, or `0.0` if none are attached.
    #[must_use]
    pub fn estimated_row_height(&self) -> f64 {
        self.height_estimate()
            .map_or(0.0, |estimate| estimate.row_height)
    }

    /// Estimated height of the whole list.
    #[must_use]
    pub fn estimated_total_height(&self) -> f64 {
        self.height_estimate()
            .map_or(0.0, |estimate| estimate.total())
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns the host mutably.
    ///
    /// Changes that affect row heights take effect at the next layout pass.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub(crate) fn estimate_with(&self, model: &M) -> HeightEstimate {
        HeightEstimate::new(
            self.rows.heights(),
            model.n_items(),
            self.window.from,
            self.window.to,
        )
    }
}

impl<M: ListModel, H: ListHost> Drop for ModelListBox<M, H> {
    fn drop(&mut self) {
        if let (Some(model), Some(id)) = (self.model.as_ref(), self.model_handler.take()) {
            model.disconnect_items_changed(id);
        }
        if let (Some(adjustment), Some(id)) =
            (self.vadjustment.as_ref(), self.value_handler.take())
        {
            adjustment.disconnect(id);
        }
        self.rows.teardown(&mut self.host, self.window.from);
    }
}

impl<M: ListModel, H: ListHost + fmt::Debug> fmt::Debug for ModelListBox<M, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelListBox")
            .field("host", &self.host)
            .field("n_items", &self.model.as_ref().map(|model| model.n_items()))
            .field("vadjustment", &self.vadjustment)
            .field("rows", &self.rows)
            .field("window", &self.window)
            .field("viewport", &self.viewport)
            .field("last_row_height", &self.last_row_height)
            .field("needs_layout", &self.needs_layout())
            .field("pass_serial", &self.pass_serial)
            .finish_non_exhaustive()
    }
}
