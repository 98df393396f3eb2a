//! Incremental diff tests
//!
//! Every transition must leave exactly the cells a wholesale rebuild of the
//! new window would, while touching only the cells that changed.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use common::{cells_of, uniform_columns};
use gridview::render::{refresh_cells, CellId, CellStore, DiffOutcome};
use gridview::{GeometryIndex, GridConfig, RecordingMaterializer, Shift, Viewport, WindowChange};
use test_case::test_case;

struct Grid {
    geometry: GeometryIndex,
    store: CellStore<CellId, u32>,
    backend: RecordingMaterializer,
    window: Option<Viewport>,
}

impl Grid {
    fn new(rows: u32, cols: u32) -> Self {
        let geometry =
            GeometryIndex::from_columns(&uniform_columns(cols, 100.0), rows, &GridConfig::default());
        let mut store = CellStore::new();
        store.reset(cols);
        Self {
            geometry,
            store,
            backend: RecordingMaterializer::new(),
            window: None,
        }
    }

    fn show(&mut self, window: Viewport) -> DiffOutcome {
        let outcome = refresh_cells(
            self.window,
            window,
            &self.geometry,
            &mut self.store,
            &mut self.backend,
        );
        self.window = Some(window);
        outcome
    }

    /// Store contents as (col, rows) pairs for non-empty columns
    fn layout(&self) -> Vec<(u32, Vec<u32>)> {
        (0..u32::try_from(self.store.column_count()).unwrap())
            .filter_map(|col| {
                let rows: Vec<u32> = self.store.column(col)?.iter().map(|id| id.row).collect();
                (!rows.is_empty()).then_some((col, rows))
            })
            .collect()
    }
}

fn v(top: u32, bottom: u32, left: u32, right: u32) -> Viewport {
    Viewport::new(top, bottom, left, right)
}

#[test_case(v(10, 30, 2, 6), v(11, 31, 2, 6) ; "one row down")]
#[test_case(v(10, 30, 2, 6), v(9, 29, 2, 6) ; "one row up")]
#[test_case(v(10, 30, 2, 6), v(10, 30, 3, 7) ; "one column right")]
#[test_case(v(10, 30, 2, 6), v(10, 30, 1, 5) ; "one column left")]
#[test_case(v(10, 30, 2, 6), v(25, 45, 5, 9) ; "diagonal down right")]
#[test_case(v(10, 30, 2, 6), v(0, 12, 0, 2) ; "diagonal up left")]
#[test_case(v(10, 30, 2, 6), v(5, 40, 0, 9) ; "grow on every edge")]
#[test_case(v(10, 30, 2, 6), v(15, 20, 4, 4) ; "shrink on every edge")]
#[test_case(v(10, 30, 2, 6), v(0, 10, 6, 9) ; "corner overlap")]
#[test_case(v(10, 30, 2, 6), v(10, 30, 2, 6) ; "same window")]
fn test_incremental_matches_rebuild(old: Viewport, new: Viewport) {
    let mut incremental = Grid::new(100, 10);
    incremental.show(old);
    incremental.backend.reset_counts();
    let outcome = incremental.show(new);

    let mut rebuilt = Grid::new(100, 10);
    rebuilt.show(new);

    assert_eq!(incremental.layout(), rebuilt.layout());
    let live: Vec<CellId> = incremental.backend.live_cells().map(|(id, _)| *id).collect();
    assert_eq!(live, cells_of(&new));

    // Only cells outside the overlap were touched
    let overlap = old.intersect(&new).unwrap().cell_count();
    assert_eq!(outcome.stats.destroyed, old.cell_count() - overlap);
    assert_eq!(outcome.stats.materialized, new.cell_count() - overlap);
    assert_eq!(outcome.stats.reused(old.cell_count()), overlap);
    assert_eq!(incremental.backend.counts().unknown_cells, 0);
}

#[test_case(v(0, 9, 0, 4), v(500, 509, 0, 4) ; "far below")]
#[test_case(v(0, 9, 0, 4), v(0, 9, 5, 9) ; "adjacent columns")]
#[test_case(v(20, 29, 5, 9), v(0, 19, 0, 4) ; "adjacent corner")]
fn test_disjoint_windows_rebuild(old: Viewport, new: Viewport) {
    let mut grid = Grid::new(1000, 10);
    grid.show(old);

    let outcome = grid.show(new);

    assert_eq!(outcome.change, WindowChange::Full { viewport: new });
    assert_eq!(outcome.stats.destroyed, old.cell_count());
    assert_eq!(outcome.stats.materialized, new.cell_count());
    assert_eq!(outcome.stats.reused(old.cell_count()), 0);
    let live: Vec<CellId> = grid.backend.live_cells().map(|(id, _)| *id).collect();
    assert_eq!(live, cells_of(&new));
}

#[test]
fn test_containment_is_an_overlap() {
    let mut grid = Grid::new(100, 10);
    let outer = v(10, 40, 1, 8);
    let inner = v(20, 25, 3, 4);
    grid.show(outer);

    let outcome = grid.show(inner);

    assert!(matches!(outcome.change, WindowChange::Shift { .. }));
    assert_eq!(outcome.stats.materialized, 0);
}

#[test]
fn test_shift_is_new_minus_old_per_edge() {
    let mut grid = Grid::new(100, 10);
    grid.show(v(10, 30, 2, 6));

    let outcome = grid.show(v(12, 29, 1, 8));

    assert_eq!(
        outcome.change,
        WindowChange::Shift {
            shift: Shift {
                left: -1,
                top: 2,
                right: 2,
                bottom: -1,
            }
        }
    );
}

#[test]
fn test_random_walk_stays_consistent() {
    let mut grid = Grid::new(200, 20);
    let mut window = v(0, 15, 0, 5);
    grid.show(window);

    // Deterministic pseudo-random walk, mixing small steps and jumps
    let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;
    for _ in 0..200 {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        let top = u32::try_from(seed % 185).unwrap();
        let left = u32::try_from((seed >> 16) % 15).unwrap();
        let height = u32::try_from((seed >> 32) % 15).unwrap();
        let width = u32::try_from((seed >> 40) % 5).unwrap();
        let next = v(top, top + height, left, left + width);

        let outcome = grid.show(next);
        let live: Vec<CellId> = grid.backend.live_cells().map(|(id, _)| *id).collect();
        assert_eq!(live, cells_of(&next), "after {window:?} -> {next:?}");
        if window.overlaps(&next) {
            assert_ne!(outcome.change, WindowChange::Full { viewport: next });
        }
        window = next;
    }
    assert_eq!(grid.backend.counts().unknown_cells, 0);
}
