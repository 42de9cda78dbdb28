// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The window maintainer: one reconciliation pass over the materialized rows.
//!
//! A pass runs the steps below in order. Steps 3 to 7 repeat until growing
//! at the top stops and neither edge needs shifting.
//!
//! 1. Clamp the scroll value to the estimated content height.
//! 2. Relocate the window if it no longer intersects the viewport at all.
//! 3. Shift the window to the content edges it reaches.
//! 4. Trim rows that scrolled off the top.
//! 5. Trim rows that scrolled off the bottom, keeping at least one.
//! 6. Grow rows at the top while there is a gap above the first row.
//! 7. Grow rows at the bottom while there is a gap below the last row.
//! 8. Re-derive the scroll value if the estimate changed, keeping the top edge fixed.
//! 9. Configure the scroll bounds from the estimate and viewport.
//!
//! Row coordinates are relative to the viewport top. The window's top edge
//! is `bin_y = -value + bin_y_diff`.

use crate::adjustment::Adjustment;
use crate::host::ListHost;
use crate::list_box::ModelListBox;
use crate::model::ListModel;
use crate::report::LayoutPassReport;

/// Tolerance for pixel comparisons in invariant checks and edge fixups.
pub(crate) const PIXEL_EPSILON: f64 = 1e-6;

/// The materialized index range and its pixel offset.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) struct Window {
    /// First materialized model index.
    pub(crate) from: usize,
    /// One past the last materialized model index.
    pub(crate) to: usize,
    /// Pixels owed above the window: the window top sits at `-value + bin_y_diff`.
    pub(crate) bin_y_diff: f64,
}

impl Window {
    pub(crate) fn collapse_at(&mut self, index: usize) {
        self.from = index;
        self.to = index;
    }
}

impl<M: ListModel, H: ListHost> ModelListBox<M, H> {
    /// Top edge of the window relative to the viewport top.
    pub(crate) fn bin_y(&self, adjustment: &Adjustment) -> f64 {
        -adjustment.value() + self.window.bin_y_diff
    }

    fn bin_bottom(&self, adjustment: &Adjustment) -> f64 {
        self.bin_y(adjustment) + self.rows.bin_height()
    }

    pub(crate) fn check_window(&self, n_items: usize) {
        let Window { from, to, .. } = self.window;
        assert!(
            from <= to && to <= n_items,
            "window {from}..{to} is invalid for a model of {n_items} items"
        );
        assert_eq!(
            self.rows.len(),
            to - from,
            "attached rows out of sync with window {from}..{to}"
        );
    }

    /// Releases every attached row and collapses the window at `index`.
    pub(crate) fn release_window(&mut self, index: usize) {
        self.rows.release_all(&mut self.host, self.window.from);
        self.window.collapse_at(index);
    }

    /// Runs steps 1 through 9 for the current viewport.
    pub(crate) fn ensure_visible_rows(&mut self, report: &mut LayoutPassReport) {
        let (Some(model), Some(adjustment)) = (self.model.clone(), self.vadjustment.clone())
        else {
            return;
        };
        if !self.rows.has_fill() {
            return;
        }
        let n_items = model.n_items();
        if n_items == 0 {
            self.release_window(0);
            self.window.bin_y_diff = 0.0;
            return;
        }
        let viewport_height = self.viewport.height;
        if viewport_height.is_nan() || viewport_height <= 0.0 {
            self.release_window(self.window.from.min(n_items));
            self.window.bin_y_diff = 0.0;
            return;
        }

        // Step 1 may write 0, which must not be clamped up to a host-set lower bound.
        adjustment.set_lower(0.0);
        self.rows.remeasure(&self.host, self.viewport.width);
        self.check_window(n_items);

        // 1. Clamp.
        let upper_before = self.estimate_with(&*model).total();
        report.upper_before = upper_before;
        let max_value = (upper_before - viewport_height).max(0.0);
        if adjustment.value() > max_value {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                value = adjustment.value(),
                max_value,
                "clamping scroll value to estimated height"
            );
            self.write_value(&adjustment, max_value);
            report.value_clamped = true;
        }

        // 2. Relocate if out of sight.
        let bin_y = self.bin_y(&adjustment);
        if bin_y + self.rows.bin_height() < 0.0 || bin_y >= viewport_height {
            self.relocate(&*model, &adjustment);
            report.relocated = true;
        }

        // 3-7. Settle.
        let mut iterations = 0;
        loop {
            iterations += 1;
            let n_items = model.n_items();
            assert!(
                iterations <= 2 * n_items + 2,
                "window failed to settle after {iterations} iterations over {n_items} items"
            );
            self.shift_to_edges(&*model, &adjustment, viewport_height);
            report.top_removed += self.trim_top(&adjustment);
            report.bottom_removed += self.trim_bottom(&adjustment, viewport_height);
            let top_added = self.grow_top(&*model, &adjustment);
            report.top_added += top_added;
            report.bottom_added += self.grow_bottom(&*model, &adjustment, viewport_height);
            if top_added == 0 && !self.needs_edge_shift(&*model, &adjustment, viewport_height) {
                break;
            }
            #[cfg(feature = "tracing")]
            tracing::trace!(
                iteration = iterations,
                from = self.window.from,
                bin_y = self.bin_y(&adjustment),
                "grew at the top, settling again"
            );
        }
        report.settle_iterations = iterations;
        self.check_window(model.n_items());

        // 8. Re-derive the value if the estimate moved.
        let estimate = self.estimate_with(&*model);
        if estimate.total() != upper_before || self.window.bin_y_diff < -PIXEL_EPSILON {
            self.rederive_value(&adjustment, estimate, viewport_height);
            report.value_rederived = true;
        }

        // 9. Settle the scroll bounds.
        self.configure_adjustment(&*model, &adjustment, viewport_height);
        if estimate.row_height > 0.0 {
            self.last_row_height = estimate.row_height;
        }

        self.check_settled(&*model, &adjustment, viewport_height);
        report.upper_after = adjustment.upper();
    }

    /// Jumps the window to the index proportional to the scroll value.
    fn relocate(&mut self, model: &M, adjustment: &Adjustment) {
        let average = self.estimate_with(model).row_height;
        let average = if average > 0.0 {
            average
        } else {
            self.last_row_height
        };

        let span = adjustment.upper() - adjustment.page_size();
        let percentage = if span > 0.0 {
            (adjustment.value() / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let n_items = model.n_items();
        let index = round_index(n_items as f64 * percentage).min(n_items);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            value = adjustment.value(),
            percentage,
            from = self.window.from,
            to = self.window.to,
            index,
            "window out of sight, relocating"
        );

        self.release_window(index);
        self.window.bin_y_diff = if average > 0.0 {
            index as f64 * average
        } else {
            adjustment.value()
        };
    }

    fn shift_to_edges(&mut self, model: &M, adjustment: &Adjustment, viewport_height: f64) {
        let bottom = self.bin_bottom(adjustment);
        if self.window.to == model.n_items()
            && self.window.from > 0
            && bottom < viewport_height - PIXEL_EPSILON
        {
            self.window.bin_y_diff += viewport_height - bottom;
        }
        if self.window.from == 0 && self.bin_y(adjustment) > PIXEL_EPSILON {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                bin_y = self.bin_y(adjustment),
                "first row below the top, snapping to 0"
            );
            self.window.bin_y_diff = 0.0;
            self.write_value(adjustment, 0.0);
        }
    }

    fn needs_edge_shift(&self, model: &M, adjustment: &Adjustment, viewport_height: f64) -> bool {
        let bin_y = self.bin_y(adjustment);
        let at_end = self.window.to == model.n_items()
            && self.window.from > 0
            && self.bin_bottom(adjustment) < viewport_height - PIXEL_EPSILON;
        let at_start = self.window.from == 0 && bin_y > PIXEL_EPSILON;
        at_end || at_start
    }

    fn trim_top(&mut self, adjustment: &Adjustment) -> usize {
        let mut removed = 0;
        while let Some(height) = self.rows.first_height() {
            if self.bin_y(adjustment) + height >= 0.0 {
                break;
            }
            self.rows.release(&mut self.host, 0, self.window.from);
            self.window.from += 1;
            self.window.bin_y_diff += height;
            removed += 1;
        }
        removed
    }

    fn trim_bottom(&mut self, adjustment: &Adjustment, viewport_height: f64) -> usize {
        let mut removed = 0;
        while self.rows.len() > 1 {
            let last_height = self.rows.last_height().unwrap_or_default();
            if self.bin_bottom(adjustment) - last_height < viewport_height {
                break;
            }
            let position = self.rows.len() - 1;
            self.rows
                .release(&mut self.host, position, self.window.to - 1);
            self.window.to -= 1;
            removed += 1;
        }
        removed
    }

    fn grow_top(&mut self, model: &M, adjustment: &Adjustment) -> usize {
        let mut added = 0;
        while self.bin_y(adjustment) > 0.0 && self.window.from > 0 {
            let index = self.window.from - 1;
            let height = self.materialize(model, index, true);
            self.window.from = index;
            self.window.bin_y_diff -= height;
            added += 1;
        }
        added
    }

    fn grow_bottom(&mut self, model: &M, adjustment: &Adjustment, viewport_height: f64) -> usize {
        let mut added = 0;
        while self.bin_bottom(adjustment) < viewport_height && self.window.to < model.n_items() {
            let index = self.window.to;
            self.materialize(model, index, false);
            self.window.to += 1;
            added += 1;
        }
        added
    }

    /// Binds a row for `index` and attaches it at the front or back; returns its height.
    fn materialize(&mut self, model: &M, index: usize, front: bool) -> f64 {
        let Some(item) = model.item(index) else {
            panic!(
                "model reports {} items but has no item at {index}",
                model.n_items()
            );
        };
        let row = self
            .rows
            .bind(&mut self.host, item, index, self.viewport.width);
        let height = row.height;
        if front {
            self.rows.push_front(row);
        } else {
            self.rows.push_back(row);
        }
        height
    }

    fn check_settled(&self, model: &M, adjustment: &Adjustment, viewport_height: f64) {
        let bin_y = self.bin_y(adjustment);
        assert!(
            self.window.bin_y_diff >= -PIXEL_EPSILON,
            "bin_y_diff {} is negative after a pass",
            self.window.bin_y_diff
        );
        assert!(
            bin_y <= PIXEL_EPSILON,
            "window top {bin_y} is below the viewport top after a pass"
        );
        if self.window.from > 0 && self.window.to == model.n_items() {
            let bottom = self.bin_bottom(adjustment);
            assert!(
                bottom >= viewport_height - PIXEL_EPSILON,
                "window reaches the end but its bottom {bottom} is above the viewport bottom {viewport_height}"
            );
        }
    }
}

/// Rounds a non-negative index estimate to the nearest integer.
fn round_index(value: f64) -> usize {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Index approximation; the result is clamped to the model length by the caller"
    )]
    {
        (value + 0.5) as usize
    }
}
