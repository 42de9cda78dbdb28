// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-pass record of what the window maintainer did.

/// What a single layout pass did.
///
/// Returned by [`ModelListBox::perform_layout_pass`](crate::ModelListBox::perform_layout_pass)
/// whether or not the `tracing` feature is enabled. Useful for tests,
/// debugging overlays, and deciding whether a repaint is needed.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LayoutPassReport {
    /// Monotonic pass counter for this list box, starting at 1.
    pub serial: u64,
    /// First model index of the window after the pass.
    pub model_from: usize,
    /// One past the last model index of the window after the pass.
    pub model_to: usize,
    /// Rows released from the top edge.
    pub top_removed: usize,
    /// Rows materialized at the top edge.
    pub top_added: usize,
    /// Rows released from the bottom edge.
    pub bottom_removed: usize,
    /// Rows materialized at the bottom edge.
    pub bottom_added: usize,
    /// The window jumped because it was entirely out of sight.
    pub relocated: bool,
    /// The scroll position exceeded the estimated height and was pulled back.
    pub value_clamped: bool,
    /// The scroll position was re-derived from the window after the estimate changed.
    pub value_rederived: bool,
    /// Number of times the edge shift and trim/grow steps ran.
    pub settle_iterations: usize,
    /// Estimated total height at the start of the pass.
    pub upper_before: f64,
    /// Scroll upper bound at the end of the pass.
    pub upper_after: f64,
}

impl LayoutPassReport {
    /// Returns `true` if any row was bound or released during the pass.
    #[must_use]
    pub fn rows_changed(&self) -> bool {
        self.relocated
            || self.top_removed + self.top_added + self.bottom_removed + self.bottom_added > 0
    }
}
