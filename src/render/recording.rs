//! Materializer that records cells instead of drawing them.
//!
//! Backs the CLI, the benchmarks and the tests: every live cell is kept with
//! its position and text, and every call is counted.

use serde::Serialize;
use std::collections::BTreeMap;

use super::backend::{row_label, CellMaterializer};
use crate::layout::{GeometryIndex, ScrollState};
use crate::types::Column;

/// Identity of a recorded cell
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId {
    pub row: u32,
    pub col: u32,
}

/// A live recorded cell
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RecordedCell {
    pub top: f64,
    pub height: f64,
    pub text: String,
}

/// Running totals of materializer calls
#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallCounts {
    pub created: u64,
    pub destroyed: u64,
    pub headers_created: u64,
    pub headers_destroyed: u64,
    pub content_updates: u64,
    /// Destroy or update calls for cells that were not live
    pub unknown_cells: u64,
}

#[derive(Debug, Default)]
pub struct RecordingMaterializer {
    cells: BTreeMap<CellId, RecordedCell>,
    row_headers: BTreeMap<u32, String>,
    column_headers: Vec<String>,
    header_offset: f64,
    counts: CallCounts,
}

impl RecordingMaterializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> CallCounts {
        self.counts
    }

    pub fn reset_counts(&mut self) {
        self.counts = CallCounts::default();
    }

    /// Number of live cells
    pub fn live_count(&self) -> usize {
        self.cells.len()
    }

    /// Live cells in (row, col) order
    pub fn live_cells(&self) -> impl Iterator<Item = (&CellId, &RecordedCell)> {
        self.cells.iter()
    }

    pub fn is_live(&self, row: u32, col: u32) -> bool {
        self.cells.contains_key(&CellId { row, col })
    }

    /// Displayed text of a live cell
    pub fn text(&self, row: u32, col: u32) -> Option<&str> {
        self.cells
            .get(&CellId { row, col })
            .map(|cell| cell.text.as_str())
    }

    /// Row-header labels in row order
    pub fn row_header_labels(&self) -> Vec<&str> {
        self.row_headers.values().map(String::as_str).collect()
    }

    /// Column-header labels created by the last `prepare`
    pub fn column_headers(&self) -> &[String] {
        &self.column_headers
    }

    /// Horizontal scroll offset the headers were last aligned to
    pub fn header_offset(&self) -> f64 {
        self.header_offset
    }
}

impl CellMaterializer for RecordingMaterializer {
    type Cell = CellId;
    type RowHeader = u32;

    fn prepare(&mut self, _geometry: &GeometryIndex, columns: &[Column]) {
        self.column_headers = columns.iter().map(|c| c.name.clone()).collect();
    }

    fn materialize(&mut self, row: u32, col: u32, top: f64, height: f64) -> CellId {
        let id = CellId { row, col };
        self.cells.insert(
            id,
            RecordedCell {
                top,
                height,
                text: String::new(),
            },
        );
        self.counts.created += 1;
        id
    }

    fn materialize_row_header(&mut self, row: u32, _top: f64, _height: f64) -> u32 {
        self.row_headers.insert(row, row_label(row));
        self.counts.headers_created += 1;
        row
    }

    fn destroy(&mut self, cell: CellId) {
        if self.cells.remove(&cell).is_some() {
            self.counts.destroyed += 1;
        } else {
            self.counts.unknown_cells += 1;
        }
    }

    fn destroy_row_header(&mut self, header: u32) {
        self.row_headers.remove(&header);
        self.counts.headers_destroyed += 1;
    }

    fn set_content(&mut self, cell: &CellId, text: &str) {
        match self.cells.get_mut(cell) {
            Some(recorded) => {
                recorded.text.clear();
                recorded.text.push_str(text);
                self.counts.content_updates += 1;
            }
            None => self.counts.unknown_cells += 1,
        }
    }

    fn reposition_headers(&mut self, scroll: &ScrollState) {
        self.header_offset = scroll.scroll_x;
    }

    fn teardown(&mut self) {
        self.cells.clear();
        self.row_headers.clear();
        self.column_headers.clear();
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;

    #[test]
    fn test_records_lifecycle() {
        let mut backend = RecordingMaterializer::new();
        let cell = backend.materialize(3, 1, 60.0, 20.0);
        backend.set_content(&cell, "4.5");

        assert_eq!(backend.text(3, 1), Some("4.5"));
        assert_eq!(backend.live_count(), 1);

        backend.destroy(cell);
        assert!(!backend.is_live(3, 1));
        assert_eq!(backend.counts().created, 1);
        assert_eq!(backend.counts().destroyed, 1);
        assert_eq!(backend.counts().unknown_cells, 0);
    }

    #[test]
    fn test_unknown_cells_are_counted() {
        let mut backend = RecordingMaterializer::new();
        backend.destroy(CellId { row: 0, col: 0 });
        backend.set_content(&CellId { row: 1, col: 1 }, "x");
        assert_eq!(backend.counts().unknown_cells, 2);
    }

    #[test]
    fn test_row_headers_are_labelled() {
        let mut backend = RecordingMaterializer::new();
        backend.materialize_row_header(9, 180.0, 20.0);
        backend.materialize_row_header(10, 200.0, 20.0);
        assert_eq!(backend.row_header_labels(), vec!["10", "11"]);
    }
}
