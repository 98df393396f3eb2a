//! Viewport and scroll tests
//!
//! Window computation, hysteresis and clamping, driven through `TableView`
//! and the calculator directly.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{assert_window_materialized, columns_with_widths, loaded_view, uniform_columns};
use gridview::{GeometryIndex, GridConfig, PixelRange, ScrollState, ViewportCalculator, Viewport};
use test_case::test_case;

fn geometry(widths: &[f64], rows: u32) -> GeometryIndex {
    GeometryIndex::from_columns(&columns_with_widths(widths), rows, &GridConfig::default())
}

// lefts = [32, 82, 132]
#[test_case(0.0, 0 ; "left of the first column")]
#[test_case(32.0, 0 ; "on the first left edge")]
#[test_case(81.0, 0 ; "inside the first column")]
#[test_case(82.0, 0 ; "on the second left edge")]
#[test_case(83.0, 1 ; "just inside the second column")]
#[test_case(133.0, 2 ; "inside the last column")]
#[test_case(1e9, 2 ; "far past the last column")]
fn test_column_lookup(x: f64, expected: u32) {
    assert_eq!(geometry(&[50.0, 50.0, 50.0], 10).column_at(x), expected);
}

#[test]
fn test_compute_is_idempotent() {
    let geometry = geometry(&[120.0, 40.0, 300.0, 75.0, 90.0], 5000);
    let calc = ViewportCalculator::new(&GridConfig::default());
    let view = PixelRange::new(1234.0, 1777.0, 151.0, 640.0);

    let first = calc.compute(&view, &geometry);
    let second = calc.compute(&view, &geometry);

    assert_eq!(first, second);
}

#[test]
fn test_short_dataset_clamps_rows() {
    let v = loaded_view(uniform_columns(3, 50.0), 3, 1000.0, 500.0);

    assert_eq!(v.viewport(), Some(Viewport::new(0, 2, 0, 2)));
    assert_window_materialized(&v);
}

#[test]
fn test_last_column_is_unbounded() {
    let mut v = loaded_view(columns_with_widths(&[50.0, 50.0, 50.0]), 100, 1000.0, 300.0);

    assert_eq!(v.viewport().unwrap().right, 2);
    assert_eq!(v.outer_range().right, f64::INFINITY);

    // Scrolling further right never escapes horizontally
    assert!(v.scroll_to(5000.0, 0.0).is_none());
}

#[test]
fn test_outer_range_encloses_view_after_every_scroll() {
    let mut v = loaded_view(uniform_columns(40, 90.0), 100_000, 800.0, 600.0);
    let positions = [
        (0.0, 0.0),
        (0.0, 19.0),
        (0.0, 21.0),
        (45.0, 400.0),
        (1500.0, 400.0),
        (1500.0, 100_000.0),
        (0.0, 1_999_420.0),
        (3000.0, 5.0),
    ];

    for (x, y) in positions {
        v.scroll_to(x, y);
        let view = ScrollState {
            scroll_x: x,
            scroll_y: y,
            width: 800.0,
            height: 600.0,
        }
        .view_range(20.0);
        assert!(
            v.outer_range().encloses(&view),
            "outer range {:?} does not enclose {view:?}",
            v.outer_range()
        );
        assert_window_materialized(&v);
    }
}

#[test]
fn test_scroll_within_row_is_free() {
    let mut v = loaded_view(uniform_columns(10, 100.0), 1000, 400.0, 300.0);
    v.scroll_to(0.0, 405.0);
    let viewport = v.viewport();
    v.materializer_mut().reset_counts();

    // View 405..685 snaps to the outer range 400..700
    for y in [400.0, 410.0, 415.0] {
        assert!(v.scroll_to(0.0, y).is_none());
    }

    assert_eq!(v.viewport(), viewport);
    assert_eq!(v.materializer().counts().created, 0);
}

#[test]
fn test_window_keeps_row_above_view() {
    let mut v = loaded_view(uniform_columns(3, 100.0), 1000, 300.0, 220.0);

    v.scroll_to(0.0, 205.0);

    // First visible row is 10; the window starts one row above it
    let viewport = v.viewport().unwrap();
    assert_eq!(viewport.top, 9);
    assert_eq!(viewport.bottom, 20);
    assert_window_materialized(&v);
}

#[test]
fn test_overscan_materializes_extra_rows_and_columns() {
    let config = GridConfig {
        overscan_rows: 3,
        overscan_cols: 1,
        ..GridConfig::default()
    };
    let v = common::loaded_view_with(config, uniform_columns(10, 100.0), 1000, 400.0, 300.0);

    // Without overscan the window is rows 0..=13, columns 0..=3
    assert_eq!(v.viewport(), Some(Viewport::new(0, 16, 0, 4)));
    assert_window_materialized(&v);
}

#[test]
fn test_headers_follow_horizontal_scroll() {
    let mut v = loaded_view(uniform_columns(10, 100.0), 1000, 400.0, 300.0);

    v.scroll_to(250.0, 0.0);

    assert_eq!(v.materializer().header_offset(), 250.0);
    assert_eq!(v.materializer().column_headers().len(), 10);
}
