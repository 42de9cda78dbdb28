// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Total list height estimation from the rows that are actually materialized.

/// Height estimate for a list whose rows are only partly materialized.
///
/// The total height is the exact height of the attached rows plus
/// `row_height` for every unmaterialized row on either side of them. When no
/// row is attached, `row_height` is `0.0` and the estimate collapses to `0.0`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HeightEstimate {
    /// Mean height of the attached rows, or `0.0` if none are attached.
    pub row_height: f64,
    /// Exact summed height of the attached rows.
    pub materialized_height: f64,
    /// Number of unmaterialized rows above the window.
    pub above: usize,
    /// Number of unmaterialized rows below the window.
    pub below: usize,
}

impl HeightEstimate {
    /// Builds an estimate from the attached row heights and the window `from..to`
    /// over `n_items` items.
    ///
    /// The caller is responsible for `from <= to <= n_items` and for passing
    /// exactly `to - from` heights.
    pub(crate) fn new(
        heights: impl ExactSizeIterator<Item = f64>,
        n_items: usize,
        from: usize,
        to: usize,
    ) -> Self {
        let count = heights.len();
        let materialized_height: f64 = heights.sum();
        let row_height = if count == 0 {
            0.0
        } else {
            materialized_height / count as f64
        };
        Self {
            row_height,
            materialized_height,
            above: from,
            below: n_items.saturating_sub(to),
        }
    }

    /// Estimated height of the whole list.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.above as f64 * self.row_height
            + self.materialized_height
            + self.below as f64 * self.row_height
    }
}
