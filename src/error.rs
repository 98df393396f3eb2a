//! Structured error types for gridview.
//!
//! The windowing core never fails: out-of-range geometry is clamped. These errors
//! cover configuration, decoding of host-supplied data, and the host surface.

/// All errors that can occur outside the infallible windowing core.
#[derive(Debug, thiserror::Error)]
pub enum GridviewError {
    /// Invalid grid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON decoding or encoding error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Host surface failure (element creation, event wiring).
    #[error("Render error: {0}")]
    Render(String),

    /// Data provider failed to deliver cells.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GridviewError>;

impl From<String> for GridviewError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for GridviewError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<GridviewError> for wasm_bindgen::JsValue {
    fn from(e: GridviewError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
