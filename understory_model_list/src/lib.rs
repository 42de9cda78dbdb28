// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_model_list --heading-base-level=0

//! Understory Model List: a windowed list engine over an observable model.
//!
//! This crate keeps a vertically scrolling list of arbitrarily many items
//! responsive by materializing only the rows that intersect the viewport.
//! Row heights do not need to be known up front: the engine measures the rows
//! it has attached, estimates the total height from their mean, and keeps the
//! scroll position consistent as that estimate shifts.
//!
//! The core pieces are:
//!
//! - [`ListModel`]: an ordered, observable collection with items-changed
//!   notifications. [`ListStore`] is a vector-backed implementation.
//! - [`ListHost`]: what the host UI provides. It measures rows, parents and
//!   places them, toggles their visibility, and paints them.
//! - [`Adjustment`]: the scroll position model `(value, lower, upper, page_size)`,
//!   shared with whatever scrollbar drives the list.
//! - [`ModelListBox`]: the engine. It binds items to rows through a host fill
//!   function, pools released rows for reuse, and reconciles the window and
//!   the adjustment in [`ModelListBox::perform_layout_pass`].
//!
//! The engine never runs on its own. Model and scroll changes mark it as
//! needing layout; the host runs a pass when it lays out, with the current
//! viewport size. Each pass returns a [`LayoutPassReport`] describing what it
//! did.
//!
//! ## Minimal example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use kurbo::{Rect, Size};
//! use understory_model_list::{Adjustment, ListHost, ListStore, ModelListBox};
//!
//! /// Rows are rebindable labels with a fixed height.
//! type Label = Rc<RefCell<String>>;
//!
//! #[derive(Default)]
//! struct Host {
//!     placed: Vec<(String, Rect)>,
//! }
//!
//! impl ListHost for Host {
//!     type Row = Label;
//!
//!     fn same_row(a: &Label, b: &Label) -> bool {
//!         Rc::ptr_eq(a, b)
//!     }
//!     fn measure_height(&self, _row: &Label, _for_width: f64) -> f64 {
//!         20.0
//!     }
//!     fn measure_width(&self, row: &Label) -> (f64, f64) {
//!         let w = 8.0 * row.borrow().len() as f64;
//!         (w, w)
//!     }
//!     fn attach(&mut self, _row: &Label) {}
//!     fn set_child_visible(&mut self, _row: &Label, _visible: bool) {}
//!     fn place(&mut self, row: &Label, rect: Rect) {
//!         self.placed.push((row.borrow().clone(), rect));
//!     }
//!     fn detach(&mut self, _row: &Label) {}
//!     fn push_clip(&mut self, _rect: Rect) {}
//!     fn pop_clip(&mut self) {}
//!     fn paint_row(&mut self, _row: &Label) {}
//! }
//!
//! let store = Rc::new(ListStore::from_vec((0..1000).collect::<Vec<u32>>()));
//! let adjustment = Rc::new(Adjustment::default());
//!
//! let mut list = ModelListBox::new(Host::default());
//! list.set_model(Some(store));
//! list.set_vadjustment(Some(adjustment.clone()));
//! // Rebind recycled rows in place; create new ones only when the pool is empty.
//! list.set_fill_function(|item: &u32, recycled: Option<Label>, _index| {
//!     let row = recycled.unwrap_or_default();
//!     *row.borrow_mut() = format!("row {item}");
//!     row
//! });
//!
//! let report = list.perform_layout_pass(Size::new(200.0, 100.0));
//! assert_eq!(list.window(), 0..5);
//! assert_eq!(report.upper_after, 20_000.0);
//! assert_eq!(adjustment.upper(), 20_000.0);
//!
//! // A large jump relocates the window and rebinds the same five rows.
//! adjustment.set_value(10_000.0);
//! assert!(list.needs_layout());
//! let report = list.perform_layout_pass(Size::new(200.0, 100.0));
//! assert!(report.relocated);
//! assert_eq!(list.window(), 500..505);
//! assert_eq!(list.pool_len(), 0);
//! assert_eq!(list.host().placed.last().map(|(label, _)| label.as_str()), Some("row 504"));
//! ```
//!
//! Returning a different row than the recycled one passed to the fill
//! function is a contract violation and panics.
//!
//! ## Features
//!
//! - `std` (default): forwards to Kurbo's `std` feature.
//! - `libm`: forwards to Kurbo's `libm` feature for `no_std` builds.
//! - `tracing`: emits `tracing` events and a `layout_pass` span per pass.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod adjustment;
mod estimate;
mod host;
mod list_box;
mod model;
mod report;
mod rows;
mod scroll;
mod signal;
mod window;

pub use adjustment::{Adjustment, ValueChangedBlock};
pub use estimate::HeightEstimate;
pub use host::ListHost;
pub use list_box::ModelListBox;
pub use model::{ItemsChanged, ListModel, ListStore};
pub use report::LayoutPassReport;
pub use signal::HandlerId;
