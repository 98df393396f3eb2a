//! Cell materialization with pluggable backends.
//!
//! This module provides:
//! - The `CellMaterializer` trait implemented by every cell surface
//! - Per-column ownership of materialized cells
//! - The incremental window diff
//! - A recording backend (native) and a DOM backend (wasm32)

pub mod backend;
pub mod diff;
pub mod recording;
pub mod store;

#[cfg(target_arch = "wasm32")]
pub mod dom;

// Re-export commonly used types
pub use backend::{row_label, CellMaterializer};
pub use diff::{refresh_cells, DiffEngine, DiffOutcome, DiffStats, WindowChange};
pub use recording::{CallCounts, CellId, RecordedCell, RecordingMaterializer};
pub use store::CellStore;

#[cfg(target_arch = "wasm32")]
pub use dom::DomMaterializer;
