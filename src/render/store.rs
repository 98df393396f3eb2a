//! Ownership of materialized cell handles.
//!
//! Each column owns its cells as a deque ordered by row, so the window can
//! grow or shrink at either end without touching the rest of the column.

use std::collections::VecDeque;

/// Materialized cells, per column, plus the row-header column.
///
/// Invariant: column `c` holds exactly the rows `top..=bottom` of the current
/// window when `c` is inside it, in row order, and nothing otherwise.
#[derive(Debug)]
pub struct CellStore<C, H> {
    columns: Vec<VecDeque<C>>,
    row_headers: Vec<H>,
}

impl<C, H> Default for CellStore<C, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, H> CellStore<C, H> {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            row_headers: Vec::new(),
        }
    }

    /// Make room for `count` columns. Existing cells must already be released.
    pub fn reset(&mut self, count: u32) {
        self.columns.clear();
        self.columns.resize_with(count as usize, VecDeque::new);
        self.row_headers.clear();
    }

    /// Remove every handle, returning them for destruction
    pub fn drain(&mut self) -> (Vec<C>, Vec<H>) {
        let cells = self.columns.iter_mut().flat_map(|c| c.drain(..)).collect();
        let headers = std::mem::take(&mut self.row_headers);
        (cells, headers)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, col: u32) -> Option<&VecDeque<C>> {
        self.columns.get(col as usize)
    }

    pub(crate) fn column_mut(&mut self, col: u32) -> Option<&mut VecDeque<C>> {
        self.columns.get_mut(col as usize)
    }

    /// The cell at position `index` within a column (0 = window top)
    pub fn cell(&self, col: u32, index: usize) -> Option<&C> {
        self.column(col).and_then(|cells| cells.get(index))
    }

    pub fn row_headers(&self) -> &[H] {
        &self.row_headers
    }

    pub(crate) fn row_headers_mut(&mut self) -> &mut Vec<H> {
        &mut self.row_headers
    }

    /// Total number of materialized cells (row headers excluded)
    pub fn len(&self) -> usize {
        self.columns.iter().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(VecDeque::is_empty)
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
    fn test_reset_and_drain() {
        let mut store: CellStore<u32, u32> = CellStore::new();
        store.reset(3);
        assert_eq!(store.column_count(), 3);
        assert!(store.is_empty());

        store.column_mut(1).unwrap().push_back(10);
        store.column_mut(1).unwrap().push_back(11);
        store.column_mut(2).unwrap().push_front(20);
        store.row_headers_mut().push(0);

        assert_eq!(store.len(), 3);
        assert_eq!(store.cell(1, 1), Some(&11));
        assert_eq!(store.cell(0, 0), None);

        let (cells, headers) = store.drain();
        assert_eq!(cells.len(), 3);
        assert_eq!(headers, vec![0]);
        assert!(store.is_empty());
        assert_eq!(store.column_count(), 3);
    }

    #[test]
    fn test_out_of_range_column() {
        let mut store: CellStore<u32, u32> = CellStore::new();
        store.reset(1);
        assert!(store.column(5).is_none());
        assert!(store.column_mut(5).is_none());
    }
}
