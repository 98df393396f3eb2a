//! DOM materializer (wasm32 only).
//!
//! Layout under the root element:
//!
//! ```text
//! root (relative)
//! ├── header band (absolute, one row high, column-header cells)
//! └── container (absolute below the header, overflow auto, the scroll element)
//!     └── body (sized to the content)
//!         ├── row-header column (follows scroll_x)
//!         └── one column div per column (measure-type class)
//!             └── cells (absolute, top/height per row)
//! ```

use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{CssStyleDeclaration, Document, HtmlElement};

use super::backend::{row_label, CellMaterializer};
use crate::error::{GridviewError, Result};
use crate::layout::{GeometryIndex, ScrollState};
use crate::types::{Column, GridConfig};

fn set_px(style: &CssStyleDeclaration, property: &str, value: f64) {
    let _ = style.set_property(property, &format!("{value}px"));
}

/// Materializes cells as absolutely positioned `div`s.
pub struct DomMaterializer {
    document: Document,
    row_height: f64,
    header: HtmlElement,
    container: HtmlElement,
    body: HtmlElement,
    row_header_column: HtmlElement,
    columns: Vec<HtmlElement>,
    column_headers: Vec<HtmlElement>,
}

impl DomMaterializer {
    /// Build the header band, scroll container and body under `root`.
    pub fn new(root: &HtmlElement, config: &GridConfig) -> Result<Self> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| GridviewError::Render("no document".to_string()))?;

        let create = |class: &str| -> Result<HtmlElement> {
            let element = document
                .create_element("div")
                .ok()
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
                .ok_or_else(|| GridviewError::Render(format!("cannot create {class}")))?;
            element.set_class_name(class);
            Ok(element)
        };

        let header = create("gridview-header")?;
        let container = create("gridview-container")?;
        let body = create("gridview-body")?;
        let row_header_column = create("gridview-row-headers")?;

        let root_style = root.style();
        if root_style
            .get_property_value("position")
            .unwrap_or_default()
            .is_empty()
        {
            let _ = root_style.set_property("position", "relative");
        }
        let _ = root_style.set_property("overflow", "hidden");

        let header_style = header.style();
        let _ = header_style.set_property("position", "absolute");
        let _ = header_style.set_property("top", "0");
        let _ = header_style.set_property("left", "0");
        let _ = header_style.set_property("white-space", "nowrap");
        set_px(&header_style, "height", config.row_height);

        let container_style = container.style();
        let _ = container_style.set_property("position", "absolute");
        set_px(&container_style, "top", config.row_height);
        let _ = container_style.set_property("left", "0");
        let _ = container_style.set_property("right", "0");
        let _ = container_style.set_property("bottom", "0");
        let _ = container_style.set_property("overflow", "auto");

        let body_style = body.style();
        let _ = body_style.set_property("position", "relative");

        let row_header_style = row_header_column.style();
        let _ = row_header_style.set_property("position", "absolute");
        let _ = row_header_style.set_property("top", "0");
        let _ = row_header_style.set_property("z-index", "1");
        set_px(&row_header_style, "width", config.row_header_width);

        let attach = |parent: &HtmlElement, child: &HtmlElement| -> Result<()> {
            parent
                .append_child(child)
                .map(|_| ())
                .map_err(|_| GridviewError::Render("cannot attach element".to_string()))
        };
        attach(&body, &row_header_column)?;
        attach(&container, &body)?;
        attach(root, &header)?;
        attach(root, &container)?;

        Ok(Self {
            document,
            row_height: config.row_height,
            header,
            container,
            body,
            row_header_column,
            columns: Vec::new(),
            column_headers: Vec::new(),
        })
    }

    /// The scrolling element; scroll events are read from here
    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    /// Remove the header band and the scroll container from the root.
    /// Cells must already be torn down.
    pub fn detach(&mut self) {
        self.header.remove();
        self.container.remove();
    }

    fn create_div(&self, class: &str) -> Option<HtmlElement> {
        let element = self
            .document
            .create_element("div")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        match element {
            Some(element) => {
                element.set_class_name(class);
                Some(element)
            }
            None => {
                warn!(target: "gridview::dom", class, "element creation failed");
                None
            }
        }
    }

    fn positioned(
        &self,
        class: &str,
        parent: &HtmlElement,
        top: f64,
        height: f64,
    ) -> Option<HtmlElement> {
        let element = self.create_div(class)?;
        let style = element.style();
        let _ = style.set_property("position", "absolute");
        let _ = style.set_property("left", "0");
        let _ = style.set_property("right", "0");
        set_px(&style, "top", top);
        set_px(&style, "height", height);
        parent.append_child(&element).ok()?;
        Some(element)
    }
}

impl CellMaterializer for DomMaterializer {
    /// `None` when the element could not be created
    type Cell = Option<HtmlElement>;
    type RowHeader = Option<HtmlElement>;

    fn prepare(&mut self, geometry: &GeometryIndex, columns: &[Column]) {
        let body_style = self.body.style();
        set_px(&body_style, "width", geometry.total_width());
        set_px(&body_style, "height", geometry.total_height());
        set_px(&self.header.style(), "width", geometry.total_width());

        for (col, column) in (0u32..).zip(columns) {
            let left = geometry.column_left(col);
            let width = geometry.column_width(col);
            let class = format!("gridview-column {}", column.measure_type.css_class());

            if let Some(div) = self.create_div(class.trim()) {
                let style = div.style();
                let _ = style.set_property("position", "absolute");
                let _ = style.set_property("top", "0");
                set_px(&style, "left", left);
                set_px(&style, "width", width);
                set_px(&style, "height", geometry.total_height());
                if self.body.append_child(&div).is_ok() {
                    self.columns.push(div);
                }
            }

            if let Some(cell) = self.create_div("gridview-column-header") {
                let style = cell.style();
                let _ = style.set_property("position", "absolute");
                let _ = style.set_property("top", "0");
                set_px(&style, "left", left);
                set_px(&style, "width", width);
                set_px(&style, "height", self.row_height);
                cell.set_text_content(Some(&column.name));
                if self.header.append_child(&cell).is_ok() {
                    self.column_headers.push(cell);
                }
            }
        }
    }

    fn materialize(&mut self, _row: u32, col: u32, top: f64, height: f64) -> Self::Cell {
        let parent = self.columns.get(col as usize)?.clone();
        self.positioned("gridview-cell", &parent, top, height)
    }

    fn materialize_row_header(&mut self, row: u32, top: f64, height: f64) -> Self::RowHeader {
        let parent = self.row_header_column.clone();
        let header = self.positioned("gridview-row-header", &parent, top, height)?;
        header.set_text_content(Some(&row_label(row)));
        Some(header)
    }

    fn destroy(&mut self, cell: Self::Cell) {
        if let Some(cell) = cell {
            cell.remove();
        }
    }

    fn destroy_row_header(&mut self, header: Self::RowHeader) {
        if let Some(header) = header {
            header.remove();
        }
    }

    fn set_content(&mut self, cell: &Self::Cell, text: &str) {
        if let Some(cell) = cell {
            cell.set_text_content(Some(text));
        }
    }

    fn reposition_headers(&mut self, scroll: &ScrollState) {
        set_px(&self.header.style(), "left", -scroll.scroll_x);
        set_px(&self.row_header_column.style(), "left", scroll.scroll_x);
    }

    fn teardown(&mut self) {
        for element in self.columns.drain(..).chain(self.column_headers.drain(..)) {
            element.remove();
        }
        self.row_header_column.set_text_content(None);
    }
}
