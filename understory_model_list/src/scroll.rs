// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll position reconciliation.
//!
//! Every write the engine makes to the adjustment value blocks its own
//! value-changed handler for the duration of the write, so internal
//! corrections never request another layout pass.

use crate::adjustment::Adjustment;
use crate::estimate::HeightEstimate;
use crate::host::ListHost;
use crate::list_box::ModelListBox;
use crate::model::ListModel;
use crate::window::PIXEL_EPSILON;

impl<M: ListModel, H: ListHost> ModelListBox<M, H> {
    /// Writes `value` without notifying our own handler.
    ///
    /// Leaves `bin_y_diff` alone, so rows move on screen by the difference.
    pub(crate) fn write_value(&self, adjustment: &Adjustment, value: f64) {
        match self.value_handler {
            Some(id) => {
                let _block = adjustment.block_value_changed(id);
                adjustment.set_value(value);
            }
            None => adjustment.set_value(value),
        }
        let actual = adjustment.value();
        assert!(
            approx_eq(actual, value),
            "scroll value write of {value} was clamped to {actual} by the adjustment"
        );
    }

    /// Writes `value` and moves `bin_y_diff` by the same amount, so rows stay put.
    pub(crate) fn write_value_keeping_top(&mut self, adjustment: &Adjustment, value: f64) {
        let current = adjustment.value();
        self.write_value(adjustment, value);
        self.window.bin_y_diff -= current - value;
    }

    /// Re-derives the value from the window index and the new average, then
    /// publishes the new upper bound.
    pub(crate) fn rederive_value(
        &mut self,
        adjustment: &Adjustment,
        estimate: HeightEstimate,
        viewport_height: f64,
    ) {
        let bin_y = self.bin_y(adjustment);
        let upper = estimate.total();
        let value = (self.window.from as f64 * estimate.row_height - bin_y)
            .min(upper - viewport_height)
            .max(0.0);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            old_value = adjustment.value(),
            value,
            old_upper = adjustment.upper(),
            upper,
            "re-deriving scroll value from the window"
        );

        adjustment.set_upper(upper);
        adjustment.set_page_size(viewport_height);
        self.write_value_keeping_top(adjustment, value);
    }

    /// Publishes scroll bounds for the current estimate and re-clamps the value.
    pub(crate) fn configure_adjustment(
        &mut self,
        model: &M,
        adjustment: &Adjustment,
        viewport_height: f64,
    ) {
        let estimated = self.estimate_with(model).total();
        let upper = if estimated > 0.0 {
            estimated
        } else {
            viewport_height
        };
        adjustment.set_upper(upper);
        adjustment.set_page_size(viewport_height);
        adjustment.set_lower(0.0);

        let max_value = (estimated - viewport_height).max(0.0);
        if adjustment.value() > max_value {
            self.write_value_keeping_top(adjustment, max_value);
        }
    }

    /// Reconfigures the bounds outside a pass, using the last viewport.
    ///
    /// Does nothing until a pass has seen a positive viewport height.
    pub(crate) fn reconfigure(&mut self) {
        let (Some(model), Some(adjustment)) = (self.model.clone(), self.vadjustment.clone())
        else {
            return;
        };
        let viewport_height = self.viewport.height;
        if viewport_height.is_nan() || viewport_height <= 0.0 {
            return;
        }
        self.configure_adjustment(&*model, &adjustment, viewport_height);
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    a - b <= PIXEL_EPSILON && b - a <= PIXEL_EPSILON
}
