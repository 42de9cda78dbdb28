// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared recording host and fixture for list box integration tests.

#![allow(
    missing_docs,
    reason = "Integration-test helper module; not part of the public API."
)]
#![allow(
    dead_code,
    reason = "Each integration test binary uses a different subset of the helpers."
)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use kurbo::{Rect, Size};
use understory_model_list::{Adjustment, LayoutPassReport, ListHost, ListStore, ModelListBox};

pub const WIDTH: f64 = 300.0;
pub const EPSILON: f64 = 1e-6;

/// A model entry: a label to identify it and the height its row measures at.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Entry {
    pub label: u32,
    pub height: f64,
}

#[derive(Debug)]
pub struct TestRow {
    pub id: usize,
    pub bound: Cell<Option<Entry>>,
}

pub type Row = Rc<TestRow>;

/// Everything the host was asked to do, keyed by row id.
#[derive(Debug, Default)]
pub struct HostLog {
    pub placed: BTreeMap<usize, Rect>,
    pub visible: BTreeMap<usize, bool>,
    pub parented: BTreeSet<usize>,
    pub detached: Vec<usize>,
    pub painted: Vec<usize>,
    pub clip_stack: Vec<Rect>,
    pub clips: Vec<Rect>,
}

#[derive(Debug, Default)]
pub struct TestHost {
    pub log: Rc<RefCell<HostLog>>,
}

impl ListHost for TestHost {
    type Row = Row;

    fn same_row(a: &Row, b: &Row) -> bool {
        Rc::ptr_eq(a, b)
    }

    fn measure_height(&self, row: &Row, _for_width: f64) -> f64 {
        row.bound.get().map_or(0.0, |entry| entry.height)
    }

    fn measure_width(&self, row: &Row) -> (f64, f64) {
        let label = row.bound.get().map_or(0, |entry| entry.label);
        (10.0, 10.0 + f64::from(label))
    }

    fn attach(&mut self, row: &Row) {
        self.log.borrow_mut().parented.insert(row.id);
    }

    fn set_child_visible(&mut self, row: &Row, visible: bool) {
        self.log.borrow_mut().visible.insert(row.id, visible);
    }

    fn place(&mut self, row: &Row, rect: Rect) {
        self.log.borrow_mut().placed.insert(row.id, rect);
    }

    fn detach(&mut self, row: &Row) {
        let mut log = self.log.borrow_mut();
        assert!(log.parented.remove(&row.id), "detaching unparented row {}", row.id);
        log.detached.push(row.id);
    }

    fn push_clip(&mut self, rect: Rect) {
        let mut log = self.log.borrow_mut();
        log.clip_stack.push(rect);
        log.clips.push(rect);
    }

    fn pop_clip(&mut self) {
        let popped = self.log.borrow_mut().clip_stack.pop();
        assert!(popped.is_some(), "pop_clip without push_clip");
    }

    fn paint_row(&mut self, row: &Row) {
        let mut log = self.log.borrow_mut();
        assert!(!log.clip_stack.is_empty(), "row painted outside a clip");
        log.painted.push(row.id);
    }
}

pub fn entries(heights: impl IntoIterator<Item = f64>) -> Vec<Entry> {
    heights
        .into_iter()
        .zip(0..)
        .map(|(height, label)| Entry { label, height })
        .collect()
}

pub type TestListBox = ModelListBox<ListStore<Entry>, TestHost>;

/// A list box wired to a store, an adjustment and a recycling fill function.
pub struct Fixture {
    pub list: TestListBox,
    pub store: Rc<ListStore<Entry>>,
    pub adjustment: Rc<Adjustment>,
    pub log: Rc<RefCell<HostLog>>,
    pub created: Rc<Cell<usize>>,
    pub unbound: Rc<RefCell<Vec<(u32, usize)>>>,
}

impl Fixture {
    pub fn new(heights: impl IntoIterator<Item = f64>) -> Self {
        let store = Rc::new(ListStore::from_vec(entries(heights)));
        let adjustment = Rc::new(Adjustment::default());
        let host = TestHost::default();
        let log = host.log.clone();
        let created = Rc::new(Cell::new(0));
        let unbound = Rc::new(RefCell::new(Vec::new()));

        let mut list = ModelListBox::new(host);
        list.set_model(Some(store.clone()));
        list.set_vadjustment(Some(adjustment.clone()));
        list.set_fill_function(recycling_fill(created.clone()));
        let sink = unbound.clone();
        list.set_remove_function(move |row: &Row, entry: &Entry, index| {
            assert_eq!(
                row.bound.get().map(|bound| bound.label),
                Some(entry.label),
                "row unbound with an item it was not bound to"
            );
            sink.borrow_mut().push((entry.label, index));
        });

        Self {
            list,
            store,
            adjustment,
            log,
            created,
            unbound,
        }
    }

    pub fn layout(&mut self, height: f64) -> LayoutPassReport {
        self.list.perform_layout_pass(Size::new(WIDTH, height))
    }

    /// Labels and last placements of the attached rows, in order.
    pub fn rows(&self) -> Vec<(u32, Rect)> {
        let log = self.log.borrow();
        self.list
            .attached_rows()
            .map(|row| {
                let label = row.bound.get().map(|entry| entry.label);
                (
                    label.expect("attached rows are bound"),
                    log.placed[&row.id],
                )
            })
            .collect()
    }

    pub fn labels(&self) -> Vec<u32> {
        self.rows().into_iter().map(|(label, _)| label).collect()
    }

    pub fn scroll_to(&mut self, value: f64, height: f64) -> LayoutPassReport {
        self.adjustment.set_value(value);
        self.layout(height)
    }

    /// Checks the window, placement and scroll invariants after a pass.
    pub fn check_invariants(&self, viewport_height: f64) {
        let n = self.store.len();
        let window = self.list.window();
        assert!(
            window.start <= window.end && window.end <= n,
            "window {window:?} out of range for {n} items"
        );
        assert_eq!(
            self.list.attached_len(),
            window.len(),
            "attached rows out of sync with window {window:?}"
        );
        assert!(
            self.list.bin_y_diff() >= -EPSILON,
            "bin_y_diff {} negative",
            self.list.bin_y_diff()
        );

        let adj = &self.adjustment;
        assert!(
            adj.value() >= -EPSILON && adj.value() <= (adj.upper() - adj.page_size()).max(0.0) + EPSILON,
            "value {} outside [0, {} - {}]",
            adj.value(),
            adj.upper(),
            adj.page_size()
        );

        let rows = self.rows();
        let labels: Vec<u32> = rows.iter().map(|(label, _)| *label).collect();
        let expected: Vec<u32> = (window.start..window.end)
            .map(|i| self.store.get(i).expect("window within model").label)
            .collect();
        assert_eq!(labels, expected, "attached rows not in model order");

        let Some(((_, first), (_, last))) = rows.first().zip(rows.last()) else {
            return;
        };
        for pair in rows.windows(2) {
            assert!(
                (pair[0].1.y1 - pair[1].1.y0).abs() <= EPSILON,
                "gap between rows {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
        for (_, rect) in &rows {
            assert_eq!(rect.x0, 0.0, "rows start at x = 0");
            assert_eq!(rect.x1, WIDTH, "rows span the viewport width");
        }
        assert!(first.y0 <= EPSILON, "gap above the first row: {first:?}");
        assert!(first.y1 >= -EPSILON, "first row entirely above the viewport: {first:?}");
        if window.start == 0 {
            assert!(first.y0.abs() <= EPSILON, "row 0 not flush with the top: {first:?}");
        }
        if window.end < n || window.start > 0 {
            assert!(
                last.y1 >= viewport_height - EPSILON,
                "gap below the last row: {last:?} in viewport {viewport_height}"
            );
        }
        if rows.len() > 1 {
            assert!(
                last.y0 < viewport_height + EPSILON,
                "last row entirely below the viewport: {last:?}"
            );
        }
    }
}

/// A fill function that rebinds recycled rows and counts newly created ones.
pub fn recycling_fill(created: Rc<Cell<usize>>) -> impl FnMut(&Entry, Option<Row>, usize) -> Row {
    move |entry: &Entry, recycled: Option<Row>, _index: usize| {
        let row = recycled.unwrap_or_else(|| {
            let id = created.get();
            created.set(id + 1);
            Rc::new(TestRow {
                id,
                bound: Cell::new(None),
            })
        });
        row.bound.set(Some(*entry));
        row
    }
}
