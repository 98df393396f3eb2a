//! Browser tests for the JavaScript binding.
//!
//! Run with: wasm-pack test --headless --firefox

#![cfg(target_arch = "wasm32")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use gridview::{CellBlock, CellValue, Column, Dataset, GridViewer, Viewport};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

fn root() -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let root: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    root.style().set_property("width", "400px").unwrap();
    root.style().set_property("height", "300px").unwrap();
    document.body().unwrap().append_child(&root).unwrap();
    root
}

fn dataset(rows: u32) -> JsValue {
    let dataset = Dataset {
        columns: (0..10).map(|i| Column::new(format!("C{i}"), 100.0)).collect(),
        row_count: rows,
        values: Vec::new(),
    };
    serde_wasm_bindgen::to_value(&dataset).unwrap()
}

#[wasm_bindgen_test]
fn test_load_materializes_cells() {
    let root = root();
    let grid = GridViewer::new(root.clone(), JsValue::UNDEFINED, JsValue::UNDEFINED).unwrap();

    grid.load_dataset(dataset(1000)).unwrap();

    let viewport: Viewport = serde_wasm_bindgen::from_value(grid.viewport()).unwrap();
    assert_eq!(viewport, Viewport::new(0, 13, 0, 3));
    let cells = root.query_selector_all(".gridview-cell").unwrap();
    assert_eq!(cells.length(), 14 * 4);
}

#[wasm_bindgen_test]
fn test_cells_loaded_sets_text() {
    let root = root();
    let grid = GridViewer::new(root.clone(), JsValue::UNDEFINED, JsValue::UNDEFINED).unwrap();
    grid.load_dataset(dataset(1000)).unwrap();

    let block = CellBlock::new(Viewport::new(0, 0, 0, 0), vec![vec![CellValue::Integer(42)]]);
    let block = serde_wasm_bindgen::to_value(&block).unwrap();
    grid.cells_loaded(block).unwrap();

    let first = root.query_selector(".gridview-cell").unwrap().unwrap();
    assert_eq!(first.text_content().as_deref(), Some("42"));
}

#[wasm_bindgen_test]
fn test_destroy_removes_grid_elements() {
    let root = root();
    let grid = GridViewer::new(root.clone(), JsValue::UNDEFINED, JsValue::UNDEFINED).unwrap();
    grid.load_dataset(dataset(100)).unwrap();
    assert_eq!(root.child_element_count(), 2);

    grid.destroy();

    assert_eq!(root.query_selector_all(".gridview-cell").unwrap().length(), 0);
    assert!(root.query_selector(".gridview-header").unwrap().is_none());
    assert!(root.query_selector(".gridview-container").unwrap().is_none());
    assert_eq!(root.child_element_count(), 0);
}
