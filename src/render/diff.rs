//! Incremental window diff.
//!
//! Given the previously materialized window and a new one, issue the
//! materialize/destroy calls that turn one into the other. Overlapping windows
//! are patched one edge at a time, so a one-row scroll costs one row per
//! visible column. Disjoint windows are rebuilt from scratch.

use serde::Serialize;
use std::ops::RangeInclusive;
use tracing::{debug, trace};

use super::backend::CellMaterializer;
use super::store::CellStore;
use crate::layout::GeometryIndex;
use crate::types::{Shift, Viewport};

/// What the data provider must be told after a diff
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WindowChange {
    /// Nothing reusable: fetch the whole window
    Full { viewport: Viewport },
    /// Edges moved: shift the cache and fetch what is new
    Shift { shift: Shift },
    /// The recomputed window equals the old one
    Unchanged,
}

/// Counts of backend calls issued by one diff
#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiffStats {
    /// Cells created
    pub materialized: u64,
    /// Cells destroyed
    pub destroyed: u64,
    /// Row headers created
    pub row_headers: u64,
}

impl DiffStats {
    /// Cells of the previous window that survived the diff
    pub fn reused(&self, previous_cells: u64) -> u64 {
        previous_cells.saturating_sub(self.destroyed)
    }
}

/// Result of one diff
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct DiffOutcome {
    pub change: WindowChange,
    pub stats: DiffStats,
}

/// Applies a window transition to a `CellStore` through a materializer.
pub struct DiffEngine<'a, M: CellMaterializer> {
    geometry: &'a GeometryIndex,
    store: &'a mut CellStore<M::Cell, M::RowHeader>,
    materializer: &'a mut M,
    stats: DiffStats,
}

/// Transition the store from `old` (None on first computation) to `new`.
pub fn refresh_cells<M: CellMaterializer>(
    old: Option<Viewport>,
    new: Viewport,
    geometry: &GeometryIndex,
    store: &mut CellStore<M::Cell, M::RowHeader>,
    materializer: &mut M,
) -> DiffOutcome {
    DiffEngine::new(geometry, store, materializer).refresh(old, new)
}

impl<'a, M: CellMaterializer> DiffEngine<'a, M> {
    pub fn new(
        geometry: &'a GeometryIndex,
        store: &'a mut CellStore<M::Cell, M::RowHeader>,
        materializer: &'a mut M,
    ) -> Self {
        Self {
            geometry,
            store,
            materializer,
            stats: DiffStats::default(),
        }
    }

    pub fn refresh(mut self, old: Option<Viewport>, new: Viewport) -> DiffOutcome {
        if self.geometry.is_empty() {
            // Nothing can be materialized for an empty dataset
            if let Some(old) = old {
                self.clear(&old);
            }
            self.clear_row_headers();
            return self.finish(WindowChange::Unchanged);
        }

        let rows_moved = old.map_or(true, |o| o.top != new.top || o.bottom != new.bottom);
        if rows_moved {
            self.rebuild_row_headers(&new);
        }

        let change = match old {
            Some(old) if old.overlaps(&new) => {
                self.patch(&old, &new);
                let shift = Shift::between(&old, &new);
                if shift.is_zero() {
                    WindowChange::Unchanged
                } else {
                    WindowChange::Shift { shift }
                }
            }
            _ => {
                if let Some(old) = old {
                    self.clear(&old);
                }
                self.fill(&new);
                WindowChange::Full { viewport: new }
            }
        };

        debug!(
            target: "gridview::diff",
            ?old,
            ?new,
            ?change,
            materialized = self.stats.materialized,
            destroyed = self.stats.destroyed,
            "refresh_cells"
        );
        self.finish(change)
    }

    fn finish(self, change: WindowChange) -> DiffOutcome {
        DiffOutcome {
            change,
            stats: self.stats,
        }
    }

    /// Patch each edge independently. `old` and `new` must overlap.
    fn patch(&mut self, old: &Viewport, new: &Viewport) {
        let new_rows = new.rows();

        if new.right > old.right {
            for col in (old.right + 1)..=new.right {
                self.append_rows(col, new_rows.clone());
            }
        } else if new.right < old.right {
            for col in (new.right + 1)..=old.right {
                self.clear_column(col);
            }
        }

        if new.left < old.left {
            for col in new.left..old.left {
                self.append_rows(col, new_rows.clone());
            }
        } else if new.left > old.left {
            for col in old.left..new.left {
                self.clear_column(col);
            }
        }

        // Columns present in both windows only need their rows adjusted
        let shared = old.left.max(new.left)..=old.right.min(new.right);

        if new.bottom > old.bottom {
            for col in shared.clone() {
                self.append_rows(col, (old.bottom + 1)..=new.bottom);
            }
        } else if new.bottom < old.bottom {
            let count = old.bottom - new.bottom;
            for col in shared.clone() {
                self.remove_back(col, count);
            }
        }

        if new.top < old.top {
            for col in shared.clone() {
                self.prepend_rows(col, new.top..=(old.top - 1));
            }
        } else if new.top > old.top {
            let count = new.top - old.top;
            for col in shared {
                self.remove_front(col, count);
            }
        }
    }

    /// Materialize every cell of `window`
    fn fill(&mut self, window: &Viewport) {
        for col in window.columns() {
            self.append_rows(col, window.rows());
        }
    }

    /// Destroy every cell of `window`
    fn clear(&mut self, window: &Viewport) {
        for col in window.columns() {
            self.clear_column(col);
        }
    }

    fn rebuild_row_headers(&mut self, window: &Viewport) {
        self.clear_row_headers();
        let height = self.geometry.row_height();
        for row in window.rows() {
            let top = self.geometry.row_top(row);
            let header = self.materializer.materialize_row_header(row, top, height);
            self.store.row_headers_mut().push(header);
            self.stats.row_headers += 1;
        }
    }

    fn clear_row_headers(&mut self) {
        let headers = std::mem::take(self.store.row_headers_mut());
        for header in headers {
            self.materializer.destroy_row_header(header);
        }
    }

    fn append_rows(&mut self, col: u32, rows: RangeInclusive<u32>) {
        let height = self.geometry.row_height();
        let Some(cells) = self.store.column_mut(col) else {
            return;
        };
        for row in rows {
            let top = self.geometry.row_top(row);
            cells.push_back(self.materializer.materialize(row, col, top, height));
            self.stats.materialized += 1;
        }
    }

    fn prepend_rows(&mut self, col: u32, rows: RangeInclusive<u32>) {
        let height = self.geometry.row_height();
        let Some(cells) = self.store.column_mut(col) else {
            return;
        };
        for row in rows.rev() {
            let top = self.geometry.row_top(row);
            cells.push_front(self.materializer.materialize(row, col, top, height));
            self.stats.materialized += 1;
        }
    }

    fn clear_column(&mut self, col: u32) {
        let Some(cells) = self.store.column_mut(col) else {
            return;
        };
        trace!(target: "gridview::diff", col, cells = cells.len(), "clear_column");
        for cell in cells.drain(..) {
            self.materializer.destroy(cell);
            self.stats.destroyed += 1;
        }
    }

    fn remove_back(&mut self, col: u32, count: u32) {
        let Some(cells) = self.store.column_mut(col) else {
            return;
        };
        for _ in 0..count {
            let Some(cell) = cells.pop_back() else {
                break;
            };
            self.materializer.destroy(cell);
            self.stats.destroyed += 1;
        }
    }

    fn remove_front(&mut self, col: u32, count: u32) {
        let Some(cells) = self.store.column_mut(col) else {
            return;
        };
        for _ in 0..count {
            let Some(cell) = cells.pop_front() else {
                break;
            };
            self.materializer.destroy(cell);
            self.stats.destroyed += 1;
        }
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
    use crate::render::RecordingMaterializer;
    use crate::types::{Column, GridConfig};

    struct Fixture {
        geometry: GeometryIndex,
        store: CellStore<<RecordingMaterializer as CellMaterializer>::Cell, u32>,
        backend: RecordingMaterializer,
    }

    impl Fixture {
        fn new(rows: u32, cols: u32) -> Self {
            let columns: Vec<Column> = (0..cols)
                .map(|i| Column::new(format!("C{i}"), 100.0))
                .collect();
            let geometry = GeometryIndex::from_columns(&columns, rows, &GridConfig::default());
            let mut store = CellStore::new();
            store.reset(cols);
            Self {
                geometry,
                store,
                backend: RecordingMaterializer::new(),
            }
        }

        fn refresh(&mut self, old: Option<Viewport>, new: Viewport) -> DiffOutcome {
            refresh_cells(old, new, &self.geometry, &mut self.store, &mut self.backend)
        }

        /// Rows held by a column, in store order
        fn column_rows(&self, col: u32) -> Vec<u32> {
            self.store
                .column(col)
                .unwrap()
                .iter()
                .map(|id| id.row)
                .collect()
        }
    }

    #[test]
    fn test_first_refresh_materializes_everything() {
        let mut f = Fixture::new(100, 10);
        let new = Viewport::new(0, 9, 0, 4);

        let outcome = f.refresh(None, new);

        assert_eq!(outcome.change, WindowChange::Full { viewport: new });
        assert_eq!(outcome.stats.materialized, 50);
        assert_eq!(outcome.stats.destroyed, 0);
        assert_eq!(outcome.stats.row_headers, 10);
        assert_eq!(f.store.len(), 50);
        assert_eq!(f.column_rows(2), (0..=9).collect::<Vec<_>>());
    }

    #[test]
    fn test_scroll_down_one_row() {
        let mut f = Fixture::new(100, 10);
        let old = Viewport::new(10, 20, 0, 4);
        let new = Viewport::new(11, 21, 0, 4);
        f.refresh(None, old);

        let outcome = f.refresh(Some(old), new);

        assert_eq!(
            outcome.change,
            WindowChange::Shift {
                shift: Shift {
                    left: 0,
                    top: 1,
                    right: 0,
                    bottom: 1
                }
            }
        );
        assert_eq!(outcome.stats.materialized, 5);
        assert_eq!(outcome.stats.destroyed, 5);
        for col in 0..=4 {
            assert_eq!(f.column_rows(col), (11..=21).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_scroll_up_prepends_in_row_order() {
        let mut f = Fixture::new(100, 3);
        let old = Viewport::new(10, 20, 0, 2);
        let new = Viewport::new(7, 17, 0, 2);
        f.refresh(None, old);

        f.refresh(Some(old), new);

        assert_eq!(f.column_rows(0), (7..=17).collect::<Vec<_>>());
        assert_eq!(f.column_rows(2), (7..=17).collect::<Vec<_>>());
    }

    #[test]
    fn test_scroll_right_moves_columns() {
        let mut f = Fixture::new(100, 10);
        let old = Viewport::new(0, 9, 0, 4);
        let new = Viewport::new(0, 9, 2, 6);
        f.refresh(None, old);

        let outcome = f.refresh(Some(old), new);

        assert_eq!(outcome.stats.materialized, 20);
        assert_eq!(outcome.stats.destroyed, 20);
        // Rows did not move, so row headers are left alone
        assert_eq!(outcome.stats.row_headers, 0);
        assert!(f.column_rows(0).is_empty());
        assert!(f.column_rows(1).is_empty());
        assert_eq!(f.column_rows(6), (0..=9).collect::<Vec<_>>());
    }

    #[test]
    fn test_diagonal_move_new_columns_use_new_rows() {
        let mut f = Fixture::new(100, 10);
        let old = Viewport::new(0, 9, 0, 4);
        let new = Viewport::new(3, 12, 1, 5);
        f.refresh(None, old);

        f.refresh(Some(old), new);

        assert!(f.column_rows(0).is_empty());
        for col in 1..=5 {
            assert_eq!(f.column_rows(col), (3..=12).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_disjoint_windows_rebuild() {
        let mut f = Fixture::new(1000, 5);
        let old = Viewport::new(0, 9, 0, 4);
        let new = Viewport::new(500, 509, 0, 4);
        f.refresh(None, old);

        let outcome = f.refresh(Some(old), new);

        assert_eq!(outcome.change, WindowChange::Full { viewport: new });
        assert_eq!(outcome.stats.destroyed, 50);
        assert_eq!(outcome.stats.materialized, 50);
        assert_eq!(outcome.stats.reused(old.cell_count()), 0);
    }

    #[test]
    fn test_unchanged_window() {
        let mut f = Fixture::new(100, 10);
        let window = Viewport::new(5, 15, 2, 3);
        f.refresh(None, window);

        let outcome = f.refresh(Some(window), window);

        assert_eq!(outcome.change, WindowChange::Unchanged);
        assert_eq!(outcome.stats, DiffStats::default());
    }

    #[test]
    fn test_shrink_on_all_edges() {
        let mut f = Fixture::new(100, 10);
        let old = Viewport::new(10, 30, 1, 8);
        let new = Viewport::new(12, 25, 3, 6);
        f.refresh(None, old);

        let outcome = f.refresh(Some(old), new);

        assert_eq!(outcome.stats.materialized, 0);
        assert_eq!(f.store.len() as u64, new.cell_count());
        assert_eq!(f.column_rows(3), (12..=25).collect::<Vec<_>>());
        assert!(f.column_rows(8).is_empty());
    }

    #[test]
    fn test_empty_dataset_materializes_nothing() {
        let mut f = Fixture::new(0, 0);

        let outcome = f.refresh(None, Viewport::default());

        assert_eq!(outcome.change, WindowChange::Unchanged);
        assert_eq!(outcome.stats, DiffStats::default());
        assert!(f.store.is_empty());
        assert!(f.store.row_headers().is_empty());
    }
}
