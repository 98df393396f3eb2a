//! gridview - virtualized data grid for the web
//!
//! Shows datasets of any size by materializing only the cells near the
//! visible region:
//! - Column geometry index with binary-search column lookup
//! - Hysteresis range so small scrolls cost nothing
//! - Incremental four-edge diff reusing every overlapping cell
//! - Shift notifications so data providers can keep their caches
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { GridViewer } from 'gridview';
//! await init();
//! const grid = new GridViewer(root, undefined, {
//!   onViewportChanged: (viewport) => fetchCells(viewport),
//!   onShift: (shift) => shiftCache(shift),
//! });
//! grid.loadDataset({ columns, rowCount });
//! grid.cellsLoaded({ range, columns: values });
//! ```

pub mod error;
pub mod layout;
pub mod numfmt;
pub mod provider;
pub mod render;
pub mod types;
pub mod viewer;

use serde::Deserialize;
use wasm_bindgen::prelude::*;

pub use error::{GridviewError, Result};
pub use layout::{GeometryIndex, ScrollState, ViewportCalculator};
pub use provider::{CellBlock, DataEvent, DataProvider, Dataset, MemoryProvider};
pub use render::{CellMaterializer, RecordingMaterializer, WindowChange};
pub use types::*;
pub use viewer::{Notification, NotificationLevel, TableView};

#[cfg(target_arch = "wasm32")]
pub use viewer::GridViewer;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WindowRequest {
    #[serde(default)]
    config: GridConfig,
    columns: Vec<Column>,
    row_count: u32,
    scroll: ScrollState,
}

/// Compute the logical window for a scroll position without materializing
/// anything.
///
/// Takes `{ config?, columns, rowCount, scroll }` as JSON and returns the
/// window as JSON.
///
/// # Errors
/// Returns an error if the request is not valid JSON or the config is invalid.
#[wasm_bindgen]
pub fn compute_window(request: &str) -> std::result::Result<String, JsValue> {
    window_json(request).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn window_json(request: &str) -> Result<String> {
    let request: WindowRequest = serde_json::from_str(request)?;
    request.config.validate()?;
    let geometry = GeometryIndex::from_columns(&request.columns, request.row_count, &request.config);
    let calculator = ViewportCalculator::new(&request.config);
    let view = request.scroll.view_range(request.config.row_height);
    let viewport = if geometry.is_empty() {
        Viewport::default()
    } else {
        calculator.compute(&view, &geometry).viewport
    };
    Ok(serde_json::to_string(&viewport)?)
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
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
    fn test_window_json() {
        let json = window_json(
            r#"{
                "columns": [{"name": "a", "width": 50}, {"name": "b", "width": 50}, {"name": "c", "width": 50}],
                "rowCount": 3,
                "scroll": {"scrollX": 0, "scrollY": 0, "width": 1000, "height": 500}
            }"#,
        )
        .unwrap();
        let viewport: Viewport = serde_json::from_str(&json).unwrap();
        assert_eq!(viewport, Viewport::new(0, 2, 0, 2));
    }

    #[test]
    fn test_window_json_rejects_bad_config() {
        let err = window_json(
            r#"{"config": {"rowHeight": -1}, "columns": [], "rowCount": 0,
                "scroll": {"scrollX": 0, "scrollY": 0, "width": 10, "height": 10}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GridviewError::Config(_)));
    }

    #[test]
    fn test_version() {
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}
