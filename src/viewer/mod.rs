//! `TableView` - the controller that keeps the materialized window in step
//! with the scroll position.
//!
//! This module ties together:
//! - The geometry index, rebuilt on dataset load and column changes
//! - The viewport calculator and its hysteresis range
//! - The diff engine issuing materialize/destroy calls
//! - Provider notifications (full change or shift) and data arrival
//!
//! All state is owned by one thread. Data produced elsewhere reaches the view
//! as `DataEvent`s, applied with `handle_data_event` or drained from a channel.

mod data;
mod notify;
mod scroll;

#[cfg(target_arch = "wasm32")]
mod web;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::layout::{GeometryIndex, ScrollState, ViewportCalculator};
use crate::numfmt::{CellFormatter, DecimalFormatter};
use crate::provider::DataProvider;
use crate::render::{refresh_cells, CellMaterializer, CellStore, DiffOutcome, WindowChange};
use crate::types::{GridConfig, PixelRange, Viewport};

pub use notify::{Notification, NotificationLevel};
#[cfg(target_arch = "wasm32")]
pub use web::GridViewer;

use notify::Listener;

/// Virtualized grid over a data provider, drawing through a materializer.
pub struct TableView<M: CellMaterializer, P: DataProvider> {
    config: GridConfig,
    materializer: M,
    provider: P,
    formatter: Box<dyn CellFormatter>,
    geometry: GeometryIndex,
    calculator: ViewportCalculator,
    cells: CellStore<M::Cell, M::RowHeader>,
    /// The materialized window, `None` before the first load
    viewport: Option<Viewport>,
    scroll: ScrollState,
    active: bool,
    has_dataset: bool,
    last_diff: Option<DiffOutcome>,
    discarded_blocks: u64,
    listeners: Vec<Listener>,
}

impl<M: CellMaterializer, P: DataProvider> TableView<M, P> {
    /// Create a view. Nothing is materialized until `load` is called.
    pub fn new(config: GridConfig, materializer: M, provider: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            geometry: GeometryIndex::new(config.row_height, config.row_header_width),
            calculator: ViewportCalculator::new(&config),
            config,
            materializer,
            provider,
            formatter: Box::new(DecimalFormatter::default()),
            cells: CellStore::new(),
            viewport: None,
            scroll: ScrollState::default(),
            active: true,
            has_dataset: false,
            last_diff: None,
            discarded_blocks: 0,
            listeners: Vec::new(),
        })
    }

    /// Replace the formatting collaborator
    #[must_use]
    pub fn with_formatter(mut self, formatter: impl CellFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Set the element size before the first load
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.scroll.width = width;
        self.scroll.height = height;
        self
    }

    /// (Re)load the dataset from the provider.
    ///
    /// Tears down everything materialized, rebuilds the geometry index and
    /// materializes the window for the current scroll position. Only the first
    /// `column_count()` columns of the provider's metadata are laid out.
    pub fn load(&mut self) -> DiffOutcome {
        self.teardown();

        let columns = self.provider.columns();
        let column_count = self.provider.column_count() as usize;
        if column_count != columns.len() {
            warn!(
                target: "gridview::viewer",
                column_count,
                metadata = columns.len(),
                "column count disagrees with column metadata"
            );
        }
        let columns = columns.get(..column_count).unwrap_or(columns);
        self.geometry.rebuild(columns, self.provider.row_count());
        self.cells.reset(self.geometry.column_count());
        self.materializer.prepare(&self.geometry, columns);
        self.has_dataset = true;

        info!(
            target: "gridview::viewer",
            rows = self.geometry.row_count(),
            columns = self.geometry.column_count(),
            width = self.geometry.total_width(),
            height = self.geometry.total_height(),
            "dataset loaded"
        );

        let outcome = self.update_view_range();
        self.materializer.reposition_headers(&self.scroll);
        outcome
    }

    /// The column set changed: same as a reload
    pub fn columns_changed(&mut self) -> DiffOutcome {
        self.load()
    }

    /// Destroy every materialized cell and row header
    pub fn teardown(&mut self) {
        let (cells, headers) = self.cells.drain();
        for cell in cells {
            self.materializer.destroy(cell);
        }
        for header in headers {
            self.materializer.destroy_row_header(header);
        }
        self.materializer.teardown();
        self.viewport = None;
        self.calculator.reset();
        self.has_dataset = false;
    }

    /// Recompute the window for the current scroll state and patch the
    /// materialized cells to match.
    pub fn update_view_range(&mut self) -> DiffOutcome {
        let view = self.scroll.view_range(self.geometry.row_height());
        let new = self.calculator.recompute(&view, &self.geometry);
        self.apply_window(new)
    }

    fn apply_window(&mut self, new: Viewport) -> DiffOutcome {
        let old = self.viewport;
        let new = if self.geometry.is_empty() {
            Viewport::default()
        } else {
            new
        };
        let outcome = refresh_cells(
            old,
            new,
            &self.geometry,
            &mut self.cells,
            &mut self.materializer,
        );
        self.viewport = Some(new);

        match outcome.change {
            WindowChange::Full { viewport } => {
                debug!(target: "gridview::viewer", ?viewport, "viewport changed");
                self.provider.on_viewport_changed(viewport);
                self.pull_cells(viewport);
            }
            WindowChange::Shift { shift } => {
                debug!(target: "gridview::viewer", ?shift, "viewport shifted");
                self.provider.on_shift(shift);
                self.pull_cells(new);
            }
            WindowChange::Unchanged => {}
        }

        self.last_diff = Some(outcome);
        outcome
    }

    /// The materialized window
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// The hysteresis range around the materialized window
    pub fn outer_range(&self) -> PixelRange {
        self.calculator.outer_range()
    }

    /// The view range at the last recomputation
    pub fn view_range(&self) -> PixelRange {
        self.calculator.view_range()
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll
    }

    pub fn geometry(&self) -> &GeometryIndex {
        &self.geometry
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn materializer(&self) -> &M {
        &self.materializer
    }

    pub fn materializer_mut(&mut self) -> &mut M {
        &mut self.materializer
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Materialized cell handles, per column
    pub fn cells(&self) -> &CellStore<M::Cell, M::RowHeader> {
        &self.cells
    }

    /// Outcome of the most recent window recomputation
    pub fn last_diff(&self) -> Option<DiffOutcome> {
        self.last_diff
    }

    /// Blocks dropped because they no longer intersected the window
    pub fn discarded_blocks(&self) -> u64 {
        self.discarded_blocks
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_dataset(&self) -> bool {
        self.has_dataset
    }

    /// Subscribe to user-facing notifications
    pub fn on_notification(&mut self, listener: impl FnMut(&Notification) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub(crate) fn notify(&mut self, notification: &Notification) {
        for listener in &mut self.listeners {
            listener(notification);
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
    use crate::provider::{CellBlock, Dataset, MemoryProvider, ProviderNotice};
    use crate::render::RecordingMaterializer;
    use crate::types::{Column, Shift};

    /// Reports fewer columns than its metadata lists
    struct Truncated {
        data: MemoryProvider,
        column_count: u32,
    }

    impl DataProvider for Truncated {
        fn columns(&self) -> &[Column] {
            self.data.columns()
        }

        fn row_count(&self) -> u32 {
            self.data.row_count()
        }

        fn column_count(&self) -> u32 {
            self.column_count
        }

        fn on_viewport_changed(&mut self, viewport: Viewport) {
            self.data.on_viewport_changed(viewport);
        }

        fn on_shift(&mut self, shift: Shift) {
            self.data.on_shift(shift);
        }

        fn cells(&self, range: &Viewport) -> Option<CellBlock> {
            self.data.cells(range)
        }
    }

    fn view(rows: u32, cols: u32) -> TableView<RecordingMaterializer, MemoryProvider> {
        let columns = (0..cols).map(|i| Column::new(format!("C{i}"), 100.0)).collect();
        let provider = MemoryProvider::sequential(columns, rows);
        TableView::new(GridConfig::default(), RecordingMaterializer::new(), provider)
            .unwrap()
            .with_size(400.0, 300.0)
    }

    #[test]
    fn test_load_materializes_initial_window() {
        let mut v = view(1000, 10);
        v.load();

        assert_eq!(v.viewport(), Some(Viewport::new(0, 13, 0, 3)));
        assert_eq!(v.materializer().live_count(), 14 * 4);
        assert_eq!(v.materializer().row_header_labels().len(), 14);
        assert_eq!(v.materializer().column_headers().len(), 10);
        assert_eq!(
            v.provider().notices(),
            &[ProviderNotice::ViewportChanged {
                viewport: Viewport::new(0, 13, 0, 3)
            }]
        );
        // Sequential values: (r, c) = r * 10 + c
        assert_eq!(v.materializer().text(2, 3), Some("23"));
    }

    #[test]
    fn test_load_lays_out_reported_column_count() {
        let columns = (0..10).map(|i| Column::new(format!("C{i}"), 100.0)).collect();
        let provider = Truncated {
            data: MemoryProvider::sequential(columns, 1000),
            column_count: 2,
        };
        let mut v = TableView::new(GridConfig::default(), RecordingMaterializer::new(), provider)
            .unwrap()
            .with_size(400.0, 300.0);

        let outcome = v.load();

        assert_eq!(
            outcome.change,
            WindowChange::Full {
                viewport: Viewport::new(0, 13, 0, 1)
            }
        );
        assert_eq!(v.geometry().column_count(), 2);
        assert_eq!(v.materializer().column_headers().len(), 2);
        assert_eq!(v.materializer().live_count(), 14 * 2);
    }

    #[test]
    fn test_reload_tears_down() {
        let mut v = view(100, 5);
        v.load();
        v.scroll_to(0.0, 500.0);
        v.load();

        let counts = v.materializer().counts();
        assert_eq!(counts.unknown_cells, 0);
        assert_eq!(
            v.materializer().live_count() as u64,
            v.viewport().unwrap().cell_count()
        );
    }

    #[test]
    fn test_empty_dataset() {
        let provider = MemoryProvider::new(Dataset {
            columns: Vec::new(),
            row_count: 0,
            values: Vec::new(),
        });
        let mut v =
            TableView::new(GridConfig::default(), RecordingMaterializer::new(), provider).unwrap();
        v.load();

        assert_eq!(v.viewport(), Some(Viewport::default()));
        assert_eq!(v.materializer().live_count(), 0);
        assert!(v.materializer().row_header_labels().is_empty());
        assert!(v.provider().notices().is_empty());
    }

    #[test]
    fn test_rows_without_columns() {
        let provider = MemoryProvider::new(Dataset {
            columns: Vec::new(),
            row_count: 50,
            values: Vec::new(),
        });
        let mut v =
            TableView::new(GridConfig::default(), RecordingMaterializer::new(), provider).unwrap();
        v.load();
        v.scroll_to(0.0, 400.0);

        assert_eq!(v.viewport(), Some(Viewport::default()));
        assert_eq!(v.materializer().live_count(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GridConfig {
            row_height: 0.0,
            ..GridConfig::default()
        };
        let provider = MemoryProvider::sequential(Vec::new(), 0);
        assert!(TableView::new(config, RecordingMaterializer::new(), provider).is_err());
    }
}
