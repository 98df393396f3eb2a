//! Common test utilities and assertion helpers.
//!
//! Builds views over synthetic datasets and checks the materialized cells
//! against the window the view reports.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use gridview::render::CellId;
use gridview::{Column, DataProvider, GridConfig, MemoryProvider, RecordingMaterializer, TableView, Viewport};

pub type View = TableView<RecordingMaterializer, MemoryProvider>;

/// Columns of one width, named `C0`, `C1`, ...
#[must_use]
pub fn uniform_columns(count: u32, width: f64) -> Vec<Column> {
    (0..count)
        .map(|i| Column::new(format!("C{i}"), width))
        .collect()
}

/// Columns with the given widths
#[must_use]
pub fn columns_with_widths(widths: &[f64]) -> Vec<Column> {
    widths
        .iter()
        .enumerate()
        .map(|(i, w)| Column::new(format!("C{i}"), *w))
        .collect()
}

/// A loaded view over a sequential dataset (`value(r, c) = r * cols + c`)
#[must_use]
pub fn loaded_view(columns: Vec<Column>, rows: u32, width: f64, height: f64) -> View {
    loaded_view_with(GridConfig::default(), columns, rows, width, height)
}

#[must_use]
pub fn loaded_view_with(
    config: GridConfig,
    columns: Vec<Column>,
    rows: u32,
    width: f64,
    height: f64,
) -> View {
    let provider = MemoryProvider::sequential(columns, rows);
    let mut view = TableView::new(config, RecordingMaterializer::new(), provider)
        .expect("valid config")
        .with_size(width, height);
    view.load();
    view
}

/// Every cell of `viewport`, in (row, col) order
#[must_use]
pub fn cells_of(viewport: &Viewport) -> Vec<CellId> {
    let mut cells = Vec::new();
    for row in viewport.rows() {
        for col in viewport.columns() {
            cells.push(CellId { row, col });
        }
    }
    cells
}

/// The live cells are exactly the window's cells, stored in row order per
/// column, positioned at their row's top edge, and every row has a header.
pub fn assert_window_materialized<P: DataProvider>(view: &TableView<RecordingMaterializer, P>) {
    let viewport = view.viewport().expect("view has a window");
    let backend = view.materializer();

    let live: Vec<CellId> = backend.live_cells().map(|(id, _)| *id).collect();
    assert_eq!(live, cells_of(&viewport), "live cells differ from window");

    let row_height = view.geometry().row_height();
    for (id, cell) in backend.live_cells() {
        assert_eq!(cell.top, f64::from(id.row) * row_height, "cell {id:?} misplaced");
    }

    for col in viewport.columns() {
        let rows: Vec<u32> = view
            .cells()
            .column(col)
            .unwrap()
            .iter()
            .map(|id| id.row)
            .collect();
        assert_eq!(rows, viewport.rows().collect::<Vec<_>>(), "column {col} out of order");
    }

    let labels: Vec<String> = viewport.rows().map(|r| (r + 1).to_string()).collect();
    assert_eq!(backend.row_header_labels(), labels);
    assert_eq!(backend.counts().unknown_cells, 0);
}
