//! JavaScript binding (wasm32 only).
//!
//! `GridViewer` owns a `TableView` over the DOM materializer. The host hands
//! over the dataset description and receives window notifications through
//! callbacks; values fetched asynchronously come back via `cellsLoaded`.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};

use js_sys::{Function, Reflect};
use tracing::warn;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use super::TableView;
use crate::provider::{CellBlock, DataEvent, DataProvider, Dataset, MemoryProvider};
use crate::render::DomMaterializer;
use crate::types::{Column, GridConfig, Shift, Viewport};

fn callback(callbacks: &JsValue, name: &str) -> Option<Function> {
    Reflect::get(callbacks, &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.dyn_into::<Function>().ok())
}

fn invoke(function: Option<&Function>, value: &impl serde::Serialize) {
    let Some(function) = function else {
        return;
    };
    match serde_wasm_bindgen::to_value(value) {
        Ok(arg) => {
            if let Err(err) = function.call1(&JsValue::NULL, &arg) {
                warn!(target: "gridview::web", ?err, "callback threw");
            }
        }
        Err(err) => warn!(target: "gridview::web", %err, "cannot convert callback argument"),
    }
}

/// Provider backed by host callbacks. Values shipped with the dataset are
/// served synchronously; otherwise the host answers with `cellsLoaded`.
struct JsProvider {
    data: MemoryProvider,
    on_viewport_changed: Option<Function>,
    on_shift: Option<Function>,
}

impl DataProvider for JsProvider {
    fn columns(&self) -> &[Column] {
        self.data.columns()
    }

    fn row_count(&self) -> u32 {
        self.data.row_count()
    }

    fn on_viewport_changed(&mut self, viewport: Viewport) {
        invoke(self.on_viewport_changed.as_ref(), &viewport);
    }

    fn on_shift(&mut self, shift: Shift) {
        invoke(self.on_shift.as_ref(), &shift);
    }

    fn cells(&self, range: &Viewport) -> Option<CellBlock> {
        if self.data.dataset().values.is_empty() {
            return None;
        }
        self.data.cells(range)
    }
}

type View = TableView<DomMaterializer, JsProvider>;

/// Apply queued data events unless the view is busy; a busy view drains the
/// queue on its next call.
fn flush(view: &RefCell<View>, inbox: &Receiver<DataEvent>) {
    if let Ok(mut view) = view.try_borrow_mut() {
        view.drain_events(inbox);
    }
}

/// The grid exported to JavaScript
#[wasm_bindgen]
pub struct GridViewer {
    root: HtmlElement,
    view: Rc<RefCell<View>>,
    /// Data events from the host, queued so callbacks may answer re-entrantly
    events: Sender<DataEvent>,
    inbox: Rc<Receiver<DataEvent>>,
    scroll_closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl GridViewer {
    /// Run `f` on the view, then apply queued data events
    fn with_view<R>(&self, f: impl FnOnce(&mut View) -> R) -> Option<R> {
        let result = match self.view.try_borrow_mut() {
            Ok(mut view) => Some(f(&mut view)),
            Err(_) => {
                warn!(target: "gridview::web", "grid is busy; call ignored");
                None
            }
        };
        flush(&self.view, &self.inbox);
        result
    }

    fn dispatch(&self, event: DataEvent) {
        if self.events.send(event).is_ok() {
            flush(&self.view, &self.inbox);
        }
    }
}

#[wasm_bindgen]
impl GridViewer {
    /// Create a grid inside `root`.
    ///
    /// `config` is a `GridConfig` object (or undefined for defaults).
    /// `callbacks` may carry `onViewportChanged(viewport)` and `onShift(shift)`.
    #[wasm_bindgen(constructor)]
    pub fn new(root: HtmlElement, config: JsValue, callbacks: JsValue) -> Result<GridViewer, JsValue> {
        console_error_panic_hook::set_once();

        let config: GridConfig = if config.is_undefined() || config.is_null() {
            GridConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };

        let materializer = DomMaterializer::new(&root, &config)?;
        let container = materializer.container().clone();
        let provider = JsProvider {
            data: MemoryProvider::new(Dataset {
                columns: Vec::new(),
                row_count: 0,
                values: Vec::new(),
            }),
            on_viewport_changed: callback(&callbacks, "onViewportChanged"),
            on_shift: callback(&callbacks, "onShift"),
        };

        let view = TableView::new(config, materializer, provider)?.with_size(
            f64::from(root.client_width()),
            f64::from(root.client_height()),
        );
        let view = Rc::new(RefCell::new(view));
        let (events, inbox) = mpsc::channel();
        let inbox = Rc::new(inbox);

        let scroll_closure = {
            let view = Rc::clone(&view);
            let inbox = Rc::clone(&inbox);
            let container = container.clone();
            Closure::wrap(Box::new(move |_event: web_sys::Event| {
                if let Ok(mut view) = view.try_borrow_mut() {
                    view.scroll_to(
                        f64::from(container.scroll_left()),
                        f64::from(container.scroll_top()),
                    );
                }
                flush(&view, &inbox);
            }) as Box<dyn FnMut(web_sys::Event)>)
        };
        container
            .add_event_listener_with_callback("scroll", scroll_closure.as_ref().unchecked_ref())?;

        Ok(GridViewer {
            root,
            view,
            events,
            inbox,
            scroll_closure,
        })
    }

    /// Load a dataset: `{ columns, rowCount, values? }`
    #[wasm_bindgen(js_name = "loadDataset")]
    pub fn load_dataset(&self, dataset: JsValue) -> Result<(), JsValue> {
        let dataset: Dataset = serde_wasm_bindgen::from_value(dataset)?;
        self.with_view(|view| {
            view.provider_mut().data = MemoryProvider::new(dataset);
            view.load();
        });
        Ok(())
    }

    /// Values fetched for a window: `{ range, columns }`
    #[wasm_bindgen(js_name = "cellsLoaded")]
    pub fn cells_loaded(&self, block: JsValue) -> Result<(), JsValue> {
        let block: CellBlock = serde_wasm_bindgen::from_value(block)?;
        self.dispatch(DataEvent::CellsLoaded { block });
        Ok(())
    }

    /// Values inside `range` changed
    #[wasm_bindgen(js_name = "cellsChanged")]
    pub fn cells_changed(&self, range: JsValue) -> Result<(), JsValue> {
        let range: Viewport = serde_wasm_bindgen::from_value(range)?;
        self.dispatch(DataEvent::CellsChanged { range });
        Ok(())
    }

    /// A fetch for `range` failed
    #[wasm_bindgen(js_name = "fetchFailed")]
    pub fn fetch_failed(&self, range: JsValue, message: String) -> Result<(), JsValue> {
        let range: Viewport = serde_wasm_bindgen::from_value(range)?;
        self.dispatch(DataEvent::FetchFailed { range, message });
        Ok(())
    }

    /// Re-read the root element's size
    pub fn resize(&self) {
        let width = f64::from(self.root.client_width());
        let height = f64::from(self.root.client_height());
        self.with_view(|view| view.resize(width, height));
    }

    #[wasm_bindgen(js_name = "setActive")]
    pub fn set_active(&self, active: bool) {
        self.with_view(|view| view.set_active(active));
    }

    /// Subscribe to notifications: `listener({ title, message, level })`
    #[wasm_bindgen(js_name = "onNotification")]
    pub fn on_notification(&self, listener: Function) {
        self.with_view(|view| {
            view.on_notification(move |notification| invoke(Some(&listener), notification));
        });
    }

    /// The materialized window, or undefined before the first load
    pub fn viewport(&self) -> JsValue {
        let viewport = self.view.try_borrow().ok().and_then(|view| view.viewport());
        viewport
            .and_then(|v| serde_wasm_bindgen::to_value(&v).ok())
            .unwrap_or(JsValue::UNDEFINED)
    }

    /// Remove every element the grid created and stop listening for scrolls.
    /// The grid cannot be used afterwards.
    pub fn destroy(&self) {
        self.with_view(|view| {
            view.teardown();
            let container = view.materializer().container().clone();
            let _ = container.remove_event_listener_with_callback(
                "scroll",
                self.scroll_closure.as_ref().unchecked_ref(),
            );
            view.materializer_mut().detach();
        });
    }
}
