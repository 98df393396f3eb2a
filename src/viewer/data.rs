//! Data arrival for `TableView`: blocks of values, change notices and fetch
//! failures.

use std::sync::mpsc::Receiver;

use tracing::{debug, warn};

use super::{Notification, TableView};
use crate::error::GridviewError;
use crate::numfmt::display_text;
use crate::provider::{CellBlock, DataEvent, DataProvider};
use crate::render::CellMaterializer;
use crate::types::Viewport;

impl<M: CellMaterializer, P: DataProvider> TableView<M, P> {
    /// Apply one data event
    pub fn handle_data_event(&mut self, event: DataEvent) {
        match event {
            DataEvent::CellsLoaded { block } => {
                self.apply_block(&block);
            }
            DataEvent::CellsChanged { range } => self.cells_changed(range),
            DataEvent::FetchFailed { range, message } => {
                let visible = self
                    .viewport
                    .is_some_and(|viewport| range.overlaps(&viewport));
                warn!(target: "gridview::viewer", ?range, visible, %message, "fetch failed");
                let error = GridviewError::Fetch(message);
                let notification = if visible {
                    Notification::from_error("Unable to load cells", &error)
                } else {
                    Notification::warning("Unable to load cells", error.to_string())
                };
                self.notify(&notification);
            }
        }
    }

    /// Apply every event waiting on `events` without blocking. Returns the
    /// number of events applied.
    pub fn drain_events(&mut self, events: &Receiver<DataEvent>) -> usize {
        let mut applied = 0;
        while let Ok(event) = events.try_recv() {
            self.handle_data_event(event);
            applied += 1;
        }
        applied
    }

    /// Fill materialized cells from a block.
    ///
    /// Only the part of the block inside the current window is applied. A block
    /// that misses the window entirely is stale and dropped. Returns whether
    /// anything was applied.
    pub fn apply_block(&mut self, block: &CellBlock) -> bool {
        let target = self
            .viewport
            .and_then(|viewport| block.range.intersect(&viewport).map(|t| (viewport, t)));
        let Some((viewport, target)) = target else {
            self.discarded_blocks += 1;
            debug!(
                target: "gridview::viewer",
                range = ?block.range,
                viewport = ?self.viewport,
                "discarding stale block"
            );
            return false;
        };

        for col in target.columns() {
            let Some(values) = block.column(col) else {
                continue;
            };
            let formatting = self.formatter.determine_formatting(values);
            for row in target.rows() {
                let Some(value) = block.value(row, col) else {
                    continue;
                };
                let index = (row - viewport.top) as usize;
                let Some(cell) = self.cells.cell(col, index) else {
                    continue;
                };
                let text = display_text(value, self.formatter.as_ref(), &formatting);
                self.materializer.set_content(cell, &text);
            }
        }
        true
    }

    /// Values in `range` changed: re-read the affected visible columns.
    ///
    /// Whole columns of the window are read back so their formatting stays
    /// consistent.
    pub fn cells_changed(&mut self, range: Viewport) {
        let Some(viewport) = self.viewport else {
            return;
        };
        let Some(target) = range.intersect(&viewport) else {
            return;
        };
        let columns = Viewport {
            top: viewport.top,
            bottom: viewport.bottom,
            ..target
        };
        if let Some(block) = self.provider.cells(&columns) {
            self.apply_block(&block);
        }
    }

    /// Read whatever the provider already has for `range`
    pub(super) fn pull_cells(&mut self, range: Viewport) {
        if let Some(block) = self.provider.cells(&range) {
            self.apply_block(&block);
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
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc;

    use crate::provider::{CellBlock, DataEvent, MemoryProvider};
    use crate::render::RecordingMaterializer;
    use crate::types::{CellValue, Column, GridConfig, Viewport};
    use crate::viewer::{NotificationLevel, TableView};

    fn view() -> TableView<RecordingMaterializer, MemoryProvider> {
        let columns = (0..4).map(|i| Column::new(format!("C{i}"), 100.0)).collect();
        let mut provider = MemoryProvider::sequential(columns, 100);
        provider.set_available(false);
        let mut view =
            TableView::new(GridConfig::default(), RecordingMaterializer::new(), provider)
                .unwrap()
                .with_size(300.0, 120.0);
        view.load();
        view
    }

    #[test]
    fn test_async_provider_leaves_placeholders() {
        let v = view();
        // View 0..100 px covers rows 0..=4
        assert_eq!(v.viewport(), Some(Viewport::new(0, 4, 0, 2)));
        assert_eq!(v.materializer().text(0, 0), Some(""));
        assert_eq!(v.materializer().counts().content_updates, 0);
    }

    #[test]
    fn test_loaded_block_fills_cells() {
        let mut v = view();
        let block = v.provider().block(&Viewport::new(0, 4, 0, 2));

        v.handle_data_event(DataEvent::CellsLoaded { block });

        assert_eq!(v.materializer().text(0, 0), Some("0"));
        assert_eq!(v.materializer().text(4, 2), Some("18"));
        assert_eq!(v.materializer().counts().content_updates, 15);
    }

    #[test]
    fn test_stale_block_is_discarded() {
        let mut v = view();
        let block = v.provider().block(&Viewport::new(50, 54, 0, 2));

        assert!(!v.apply_block(&block));

        assert_eq!(v.discarded_blocks(), 1);
        assert_eq!(v.materializer().counts().content_updates, 0);
    }

    #[test]
    fn test_partially_stale_block_applies_overlap() {
        let mut v = view();
        let block = v.provider().block(&Viewport::new(3, 8, 1, 3));

        assert!(v.apply_block(&block));

        // Rows 3..=4 of columns 1..=2 are materialized
        assert_eq!(v.materializer().counts().content_updates, 4);
        assert_eq!(v.materializer().text(3, 1), Some("13"));
        assert_eq!(v.materializer().counts().unknown_cells, 0);
    }

    #[test]
    fn test_drain_events_from_channel() {
        let mut v = view();
        let (tx, rx) = mpsc::channel();
        let first = v.provider().block(&Viewport::new(0, 4, 0, 0));
        let second = v.provider().block(&Viewport::new(0, 4, 1, 1));
        std::thread::spawn(move || {
            tx.send(DataEvent::CellsLoaded { block: first }).unwrap();
            tx.send(DataEvent::CellsLoaded { block: second }).unwrap();
        })
        .join()
        .unwrap();

        assert_eq!(v.drain_events(&rx), 2);
        assert_eq!(v.materializer().text(2, 1), Some("9"));
        assert_eq!(v.drain_events(&rx), 0);
    }

    #[test]
    fn test_fetch_failure_notifies_and_keeps_content() {
        let mut v = view();
        let block = v.provider().block(&Viewport::new(0, 4, 0, 2));
        v.apply_block(&block);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        v.on_notification(move |n| sink.borrow_mut().push(n.clone()));

        v.handle_data_event(DataEvent::FetchFailed {
            range: Viewport::new(0, 4, 0, 2),
            message: "connection reset".to_string(),
        });

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].level, NotificationLevel::Error);
        assert!(seen[0].message.contains("connection reset"));
        assert_eq!(v.materializer().text(1, 1), Some("5"));
    }

    #[test]
    fn test_fetch_failure_outside_window_warns() {
        let mut v = view();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        v.on_notification(move |n| sink.borrow_mut().push(n.clone()));

        v.handle_data_event(DataEvent::FetchFailed {
            range: Viewport::new(500, 510, 0, 2),
            message: "timeout".to_string(),
        });

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].level, NotificationLevel::Warning);
        assert_eq!(seen[0].message, "Fetch failed: timeout");
    }

    #[test]
    fn test_cells_changed_rereads_columns() {
        let mut v = view();
        v.provider_mut().set_available(true);
        v.provider_mut().set_value(2, 1, CellValue::from(2.5));

        v.handle_data_event(DataEvent::CellsChanged {
            range: Viewport::new(2, 2, 1, 1),
        });

        // The whole visible column is reformatted to one decimal place
        assert_eq!(v.materializer().text(2, 1), Some("2.5"));
        assert_eq!(v.materializer().text(0, 1), Some("1.0"));
        assert_eq!(v.materializer().text(0, 0), Some(""));
    }

    #[test]
    fn test_missing_values_display_empty() {
        let mut v = view();
        let block = CellBlock::new(
            Viewport::new(0, 1, 0, 0),
            vec![vec![CellValue::Missing, CellValue::Number(f64::NAN)]],
        );

        v.apply_block(&block);

        assert_eq!(v.materializer().text(0, 0), Some(""));
        assert_eq!(v.materializer().text(1, 0), Some(""));
        assert_eq!(v.materializer().counts().content_updates, 2);
    }
}
