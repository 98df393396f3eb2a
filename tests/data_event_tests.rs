//! Data arrival tests
//!
//! Blocks produced on another thread, stale blocks, change notices, fetch
//! failures and degenerate datasets.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use common::{assert_window_materialized, uniform_columns};
use gridview::{
    CellBlock, CellValue, Column, DataEvent, DataProvider, Dataset, GridConfig, MemoryProvider,
    Notification, NotificationLevel, RecordingMaterializer, Shift, TableView, Viewport,
};

/// Provider that fetches on a worker thread and never answers synchronously
struct ThreadedProvider {
    columns: Vec<Column>,
    row_count: u32,
    window: Option<Viewport>,
    requests: Option<Sender<Viewport>>,
}

impl ThreadedProvider {
    fn spawn(columns: Vec<Column>, row_count: u32) -> (Self, Receiver<DataEvent>, JoinHandle<()>) {
        let (request_tx, request_rx) = mpsc::channel::<Viewport>();
        let (event_tx, event_rx) = mpsc::channel();
        let width = u32::try_from(columns.len()).unwrap();
        let worker = thread::spawn(move || {
            for range in request_rx {
                let values = range
                    .columns()
                    .map(|c| {
                        range
                            .rows()
                            .map(|r| CellValue::Integer(i64::from(r * width + c)))
                            .collect()
                    })
                    .collect();
                let block = CellBlock::new(range, values);
                if event_tx.send(DataEvent::CellsLoaded { block }).is_err() {
                    break;
                }
            }
        });
        let provider = Self {
            columns,
            row_count,
            window: None,
            requests: Some(request_tx),
        };
        (provider, event_rx, worker)
    }

    /// Stop the worker once it has answered every request
    fn close(&mut self) {
        self.requests = None;
    }

    fn request(&self, range: Viewport) {
        if let Some(requests) = &self.requests {
            requests.send(range).unwrap();
        }
    }
}

impl DataProvider for ThreadedProvider {
    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn row_count(&self) -> u32 {
        self.row_count
    }

    fn on_viewport_changed(&mut self, viewport: Viewport) {
        self.window = Some(viewport);
        self.request(viewport);
    }

    fn on_shift(&mut self, shift: Shift) {
        let Some(window) = self.window else {
            return;
        };
        let moved = |edge: u32, delta: i64| u32::try_from(i64::from(edge) + delta).unwrap();
        let window = Viewport {
            top: moved(window.top, shift.top),
            bottom: moved(window.bottom, shift.bottom),
            left: moved(window.left, shift.left),
            right: moved(window.right, shift.right),
        };
        self.window = Some(window);
        self.request(window);
    }

    fn cells(&self, _range: &Viewport) -> Option<CellBlock> {
        None
    }
}

#[test]
fn test_worker_blocks_fill_latest_window_only() {
    let (provider, events, worker) = ThreadedProvider::spawn(uniform_columns(5, 100.0), 100_000);
    let mut view = TableView::new(GridConfig::default(), RecordingMaterializer::new(), provider)
        .unwrap()
        .with_size(400.0, 300.0);

    view.load();
    view.scroll_to(0.0, 10_000.0);
    view.scroll_to(0.0, 50_000.0);
    view.provider_mut().close();
    worker.join().unwrap();

    assert_eq!(view.drain_events(&events), 3);

    // The first two windows were jumped away from before their data arrived
    assert_eq!(view.discarded_blocks(), 2);
    let viewport = view.viewport().unwrap();
    assert_eq!(viewport, Viewport::new(2499, 2513, 0, 3));
    for (id, cell) in view.materializer().live_cells() {
        assert_eq!(cell.text, (id.row * 5 + id.col).to_string());
    }
    assert_window_materialized(&view);
}

#[test]
fn test_shift_requests_are_applied_to_overlap() {
    let (provider, events, worker) = ThreadedProvider::spawn(uniform_columns(5, 100.0), 1000);
    let mut view = TableView::new(GridConfig::default(), RecordingMaterializer::new(), provider)
        .unwrap()
        .with_size(400.0, 300.0);

    view.load();
    view.scroll_to(0.0, 30.0);
    view.provider_mut().close();
    worker.join().unwrap();

    assert_eq!(view.drain_events(&events), 2);

    // Both blocks intersect the final window; nothing was stale
    assert_eq!(view.discarded_blocks(), 0);
    assert!(view
        .materializer()
        .live_cells()
        .all(|(_, cell)| !cell.text.is_empty()));
}

#[test]
fn test_fetch_failure_is_reported_once() {
    let mut view = common::loaded_view(uniform_columns(4, 100.0), 50, 400.0, 300.0);
    let seen: Rc<RefCell<Vec<Notification>>> = Rc::default();
    let sink = Rc::clone(&seen);
    view.on_notification(move |n| sink.borrow_mut().push(n.clone()));
    let before: Vec<String> = view
        .materializer()
        .live_cells()
        .map(|(_, c)| c.text.clone())
        .collect();

    view.handle_data_event(DataEvent::FetchFailed {
        range: Viewport::new(0, 13, 0, 3),
        message: "timeout".to_string(),
    });

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].level, NotificationLevel::Error);
    assert_eq!(seen[0].message, "Fetch failed: timeout");
    let after: Vec<String> = view
        .materializer()
        .live_cells()
        .map(|(_, c)| c.text.clone())
        .collect();
    assert_eq!(before, after);

    let json = serde_json::to_value(&seen[0]).unwrap();
    assert_eq!(json["level"], "error");
}

#[test]
fn test_formatting_is_per_column() {
    let columns = uniform_columns(2, 100.0);
    let dataset = Dataset {
        columns,
        row_count: 3,
        values: vec![
            vec![1.into(), 2.into(), 3.into()],
            vec![0.5.into(), 2.into(), 1.125.into()],
        ],
    };
    let provider = MemoryProvider::new(dataset);
    let mut view = TableView::new(GridConfig::default(), RecordingMaterializer::new(), provider)
        .unwrap()
        .with_size(400.0, 300.0);
    view.load();

    let backend = view.materializer();
    assert_eq!(backend.text(1, 0), Some("2"));
    assert_eq!(backend.text(0, 1), Some("0.500"));
    assert_eq!(backend.text(1, 1), Some("2.000"));
    assert_eq!(backend.text(2, 1), Some("1.125"));
}

#[test]
fn test_text_and_missing_values() {
    let dataset: Dataset = serde_json::from_str(
        r#"{
            "columns": [{"name": "Gender", "width": 80, "measureType": "nominal", "dataType": "text"}],
            "rowCount": 3,
            "values": [["Male", null, -2147483648]]
        }"#,
    )
    .unwrap();
    let mut view = TableView::new(
        GridConfig::default(),
        RecordingMaterializer::new(),
        MemoryProvider::new(dataset),
    )
    .unwrap();
    view.load();

    let backend = view.materializer();
    assert_eq!(backend.text(0, 0), Some("Male"));
    assert_eq!(backend.text(1, 0), Some(""));
    assert_eq!(backend.text(2, 0), Some(""));
}

#[test]
fn test_zero_rows_materializes_nothing() {
    let mut view = common::loaded_view(uniform_columns(5, 100.0), 0, 400.0, 300.0);

    assert_eq!(view.viewport(), Some(Viewport::default()));
    assert_eq!(view.materializer().live_count(), 0);
    assert!(view.materializer().row_header_labels().is_empty());
    assert!(view.provider().notices().is_empty());

    view.scroll_to(100.0, 100.0);
    view.resize(800.0, 900.0);
    assert_eq!(view.materializer().live_count(), 0);
    assert!(view.provider().notices().is_empty());
}

#[test]
fn test_blocks_before_load_are_discarded() {
    let provider = MemoryProvider::sequential(uniform_columns(2, 100.0), 10);
    let block = provider.block(&Viewport::new(0, 1, 0, 1));
    let mut view =
        TableView::new(GridConfig::default(), RecordingMaterializer::new(), provider).unwrap();

    assert!(!view.apply_block(&block));
    assert_eq!(view.discarded_blocks(), 1);
}

#[test]
fn test_columns_changed_rebuilds() {
    let mut view = common::loaded_view(uniform_columns(3, 100.0), 100, 400.0, 300.0);
    view.scroll_to(0.0, 600.0);

    *view.provider_mut() = MemoryProvider::sequential(uniform_columns(8, 50.0), 100);
    view.columns_changed();

    // The scroll position is kept; the wider column set now fills the width
    let viewport = view.viewport().unwrap();
    assert_eq!(viewport.top, 29);
    assert_eq!(viewport.right, 7);
    assert_eq!(view.materializer().column_headers().len(), 8);
    assert_window_materialized(&view);
}

#[test]
fn test_cells_changed_outside_window_is_ignored() {
    let mut view = common::loaded_view(uniform_columns(5, 100.0), 1000, 400.0, 300.0);
    view.materializer_mut().reset_counts();
    view.provider_mut().set_value(500, 0, CellValue::from(7.25));

    view.handle_data_event(DataEvent::CellsChanged {
        range: Viewport::new(500, 500, 0, 0),
    });

    assert_eq!(view.materializer().counts().content_updates, 0);
    assert_eq!(view.materializer().text(0, 0), Some("0"));

    view.scroll_to(0.0, 10_000.0);
    assert_eq!(view.materializer().text(500, 0), Some("7.25"));
}

#[test]
fn test_cells_changed_before_load_is_ignored() {
    let provider = MemoryProvider::sequential(uniform_columns(2, 100.0), 10);
    let mut view =
        TableView::new(GridConfig::default(), RecordingMaterializer::new(), provider).unwrap();

    view.handle_data_event(DataEvent::CellsChanged {
        range: Viewport::new(0, 1, 0, 1),
    });

    assert_eq!(view.viewport(), None);
    assert_eq!(view.materializer().live_count(), 0);
    assert_eq!(view.materializer().counts().content_updates, 0);
    assert_eq!(view.discarded_blocks(), 0);
}
