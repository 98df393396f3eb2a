//! Materializer trait for pluggable cell surfaces.
//!
//! The diff engine decides which cells exist; a `CellMaterializer` decides
//! what a cell is (a DOM element, a recorded id, a terminal region). Cells are
//! created empty and filled in when data arrives.

use crate::layout::{GeometryIndex, ScrollState};
use crate::types::Column;

/// Creates and destroys the visual representation of cells and row headers.
///
/// Destroying must be side-effect free apart from removing the element: no
/// data requests, no model changes.
pub trait CellMaterializer {
    /// Handle to one materialized cell
    type Cell;
    /// Handle to one materialized row header
    type RowHeader;

    /// Called once per dataset load or column-set change, before any cell
    /// is materialized. Backends create column containers and header cells here.
    fn prepare(&mut self, _geometry: &GeometryIndex, _columns: &[Column]) {}

    /// Create an empty placeholder cell at an absolute position.
    fn materialize(&mut self, row: u32, col: u32, top: f64, height: f64) -> Self::Cell;

    /// Create the row header for `row`, labelled with `row_label(row)`.
    fn materialize_row_header(&mut self, row: u32, top: f64, height: f64) -> Self::RowHeader;

    /// Remove a cell.
    fn destroy(&mut self, cell: Self::Cell);

    /// Remove a row header.
    fn destroy_row_header(&mut self, header: Self::RowHeader);

    /// Replace a cell's displayed text.
    fn set_content(&mut self, cell: &Self::Cell, text: &str);

    /// Keep the column-header band and the row-header column aligned with the
    /// scroll position. Called on every handled scroll or resize.
    fn reposition_headers(&mut self, _scroll: &ScrollState) {}

    /// Remove everything created since the last `prepare`.
    fn teardown(&mut self) {}
}

/// 1-based label shown in a row header
pub fn row_label(row: u32) -> String {
    (u64::from(row) + 1).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_label_is_one_based() {
        assert_eq!(row_label(0), "1");
        assert_eq!(row_label(41), "42");
        assert_eq!(row_label(u32::MAX), "4294967296");
    }
}
