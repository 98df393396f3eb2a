//! Layout engine for mapping pixels to rows and columns.
//!
//! This module handles:
//! - Pre-computing column left edges from column widths
//! - Binary search for the column at an x coordinate
//! - Deriving the logical window from the scroll state
//! - The outer hysteresis range that limits how often the window is recomputed

mod geometry;
mod viewport;

pub use geometry::GeometryIndex;
pub use viewport::{ScrollState, ViewportCalculator, WindowUpdate};
