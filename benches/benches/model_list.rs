// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Rect, Size};
use std::cell::Cell;
use std::rc::Rc;
use understory_model_list::{Adjustment, ListHost, ListStore, ModelListBox};

/// A row is just a rebindable height.
type Row = Rc<Cell<f64>>;

/// Host that measures rows by their bound height and discards placements.
#[derive(Debug, Default)]
struct NullHost;

impl ListHost for NullHost {
    type Row = Row;

    fn same_row(a: &Row, b: &Row) -> bool {
        Rc::ptr_eq(a, b)
    }

    fn measure_height(&self, row: &Row, _for_width: f64) -> f64 {
        row.get()
    }

    fn measure_width(&self, _row: &Row) -> (f64, f64) {
        (0.0, 0.0)
    }

    fn attach(&mut self, _row: &Row) {}

    fn set_child_visible(&mut self, _row: &Row, _visible: bool) {}

    fn place(&mut self, _row: &Row, _rect: Rect) {}

    fn detach(&mut self, _row: &Row) {}

    fn push_clip(&mut self, _rect: Rect) {}

    fn pop_clip(&mut self) {}

    fn paint_row(&mut self, _row: &Row) {}
}

fn list_box(heights: Vec<f64>) -> (ModelListBox<ListStore<f64>, NullHost>, Rc<Adjustment>) {
    let adjustment = Rc::new(Adjustment::default());
    let mut list = ModelListBox::new(NullHost);
    list.set_model(Some(Rc::new(ListStore::from_vec(heights))));
    list.set_vadjustment(Some(adjustment.clone()));
    list.set_fill_function(|height: &f64, recycled: Option<Row>, _index| {
        let row = recycled.unwrap_or_default();
        row.set(*height);
        row
    });
    (list, adjustment)
}

fn mixed_heights(len: usize) -> Vec<f64> {
    (0..len).map(|i| 18.0 + ((i * 7) % 11) as f64 * 4.0).collect()
}

fn bench_smooth_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_list/smooth_scroll");
    let viewport = Size::new(400.0, 800.0);

    for len in [1_000usize, 100_000] {
        group.throughput(Throughput::Elements(100));
        group.bench_with_input(BenchmarkId::new("mixed", len), &len, |b, &len| {
            let (mut list, adjustment) = list_box(mixed_heights(len));
            list.perform_layout_pass(viewport);
            b.iter(|| {
                // 100 frames of 13px scrolling, wrapping at the end.
                for _ in 0..100 {
                    let next = adjustment.value() + 13.0;
                    let next = if next >= adjustment.max_value() { 0.0 } else { next };
                    adjustment.set_value(next);
                    black_box(list.perform_layout_pass(viewport));
                }
            });
        });
    }

    group.finish();
}

fn bench_jumps(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_list/jump");
    let viewport = Size::new(400.0, 800.0);

    for len in [1_000usize, 100_000] {
        group.bench_with_input(BenchmarkId::new("relocate", len), &len, |b, &len| {
            let (mut list, adjustment) = list_box(mixed_heights(len));
            list.perform_layout_pass(viewport);
            let mut fraction = 0.0_f64;
            b.iter(|| {
                fraction = (fraction + 0.37) % 1.0;
                adjustment.set_value(adjustment.max_value() * fraction);
                black_box(list.perform_layout_pass(viewport));
            });
        });
    }

    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_list/resize");

    group.bench_function("grow_and_shrink", |b| {
        let (mut list, adjustment) = list_box(mixed_heights(10_000));
        list.perform_layout_pass(Size::new(400.0, 300.0));
        adjustment.set_value(50_000.0);
        list.perform_layout_pass(Size::new(400.0, 300.0));
        b.iter(|| {
            for height in (300..1500).step_by(60).chain((300..1500).step_by(60).rev()) {
                black_box(list.perform_layout_pass(Size::new(400.0, f64::from(height))));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_smooth_scroll, bench_jumps, bench_resize);
criterion_main!(benches);
