//! Scroll state and the logical window derived from it.
//!
//! The calculator keeps an outer pixel range around the last computed window.
//! While the visible range stays inside it, nothing is recomputed.

use serde::{Deserialize, Serialize};

use super::geometry::{ceil_index, floor_index, GeometryIndex};
use crate::types::{GridConfig, PixelRange, Viewport};

/// Scroll offset and size of the scrolling element
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScrollState {
    /// Horizontal scroll offset in pixels
    pub scroll_x: f64,
    /// Vertical scroll offset in pixels
    pub scroll_y: f64,
    /// Element width in pixels
    pub width: f64,
    /// Element height in pixels (including the header band)
    pub height: f64,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl ScrollState {
    /// Create a scroll state at the origin for an element of the given size
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width,
            height,
        }
    }

    /// Pixel rectangle currently scrolled into view.
    ///
    /// The header band takes one row of the element's height.
    pub fn view_range(&self, row_height: f64) -> PixelRange {
        let top = self.scroll_y;
        let left = self.scroll_x;
        PixelRange {
            top,
            bottom: top + self.height - row_height,
            left,
            right: left + self.width,
        }
    }
}

/// A freshly computed window and the hysteresis range around it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowUpdate {
    pub viewport: Viewport,
    pub outer_range: PixelRange,
}

/// Converts view ranges to logical windows and decides when to recompute.
#[derive(Debug, Clone)]
pub struct ViewportCalculator {
    overscan_rows: i64,
    overscan_cols: i64,
    view_range: PixelRange,
    outer_range: PixelRange,
}

impl ViewportCalculator {
    pub fn new(config: &GridConfig) -> Self {
        Self {
            overscan_rows: i64::from(config.overscan_rows),
            overscan_cols: i64::from(config.overscan_cols),
            view_range: PixelRange::EMPTY,
            outer_range: PixelRange::EMPTY,
        }
    }

    /// The view range seen by the last recomputation
    pub fn view_range(&self) -> PixelRange {
        self.view_range
    }

    /// The hysteresis range of the current window
    pub fn outer_range(&self) -> PixelRange {
        self.outer_range
    }

    /// Forget the current outer range so the next check always recomputes
    pub fn reset(&mut self) {
        self.view_range = PixelRange::EMPTY;
        self.outer_range = PixelRange::EMPTY;
    }

    /// True when `view` has escaped the outer range
    pub fn needs_update(&self, view: &PixelRange) -> bool {
        !self.outer_range.encloses(view)
    }

    /// Compute the logical window for a view range. Pure: the same inputs
    /// always give the same window.
    ///
    /// The window starts one row above the first visible row. The outer range
    /// is snapped to whole rows and columns rather than copied from `view`;
    /// the first and last columns are unbounded outward, since any view past
    /// them clamps to the same window. An element shorter than a row still
    /// gets at least the row above the view.
    pub fn compute(&self, view: &PixelRange, geometry: &GeometryIndex) -> WindowUpdate {
        let row_height = geometry.row_height();

        let top_row = floor_index(view.top / row_height) - 1 - self.overscan_rows;
        let bottom_row =
            (ceil_index(view.bottom / row_height) - 1 + self.overscan_rows).max(top_row);

        let left_col = geometry.clamp_column(geometry.column_index(view.left) - self.overscan_cols);
        let right_col =
            geometry.clamp_column(geometry.column_index(view.right) + self.overscan_cols);

        #[allow(clippy::cast_precision_loss)]
        let outer_range = PixelRange {
            top: (top_row + 1) as f64 * row_height,
            bottom: (bottom_row + 1) as f64 * row_height,
            left: if left_col == 0 {
                f64::NEG_INFINITY
            } else {
                geometry.column_left(left_col)
            },
            right: geometry.column_right(right_col),
        };

        let viewport = Viewport {
            top: geometry.clamp_row(top_row),
            bottom: geometry.clamp_row(bottom_row),
            left: left_col,
            right: right_col,
        };

        WindowUpdate {
            viewport,
            outer_range,
        }
    }

    /// Recompute if `view` escaped the outer range. Returns the new window, or
    /// `None` when the current one still covers the view.
    pub fn check(&mut self, view: &PixelRange, geometry: &GeometryIndex) -> Option<Viewport> {
        if !self.needs_update(view) {
            return None;
        }
        Some(self.recompute(view, geometry))
    }

    /// Unconditionally recompute the window for `view`
    pub fn recompute(&mut self, view: &PixelRange, geometry: &GeometryIndex) -> Viewport {
        let update = self.compute(view, geometry);
        self.view_range = *view;
        self.outer_range = update.outer_range;
        update.viewport
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
    use crate::types::Column;

    fn geometry(cols: usize, width: f64, rows: u32) -> GeometryIndex {
        let columns: Vec<Column> = (0..cols)
            .map(|i| Column::new(format!("C{i}"), width))
            .collect();
        GeometryIndex::from_columns(&columns, rows, &GridConfig::default())
    }

    #[test]
    fn test_view_range_excludes_header_band() {
        let scroll = ScrollState {
            scroll_x: 10.0,
            scroll_y: 200.0,
            width: 400.0,
            height: 300.0,
        };
        let view = scroll.view_range(20.0);
        assert_eq!(view, PixelRange::new(200.0, 480.0, 10.0, 410.0));
    }

    #[test]
    fn test_initial_window() {
        let geometry = geometry(10, 100.0, 1000);
        let calc = ViewportCalculator::new(&GridConfig::default());
        let view = ScrollState::new(400.0, 300.0).view_range(20.0);

        let update = calc.compute(&view, &geometry);

        // Rows 0..=13 cover 0..280 px; columns 0..=3 end at x = 432
        assert_eq!(update.viewport, Viewport::new(0, 13, 0, 3));
        assert_eq!(update.outer_range.top, 0.0);
        assert_eq!(update.outer_range.bottom, 280.0);
        assert_eq!(update.outer_range.left, f64::NEG_INFINITY);
        assert_eq!(update.outer_range.right, 432.0);
        assert!(update.outer_range.encloses(&view));
    }

    #[test]
    fn test_window_includes_row_above_view() {
        let geometry = geometry(3, 100.0, 1000);
        let calc = ViewportCalculator::new(&GridConfig::default());
        let view = PixelRange::new(205.0, 405.0, 0.0, 100.0);

        let update = calc.compute(&view, &geometry);

        assert_eq!(update.viewport.top, 9);
        assert_eq!(update.viewport.bottom, 20);
        assert_eq!(update.outer_range.top, 200.0);
        assert_eq!(update.outer_range.bottom, 420.0);
    }

    #[test]
    fn test_element_shorter_than_a_row() {
        let geometry = geometry(5, 100.0, 1000);
        let calc = ViewportCalculator::new(&GridConfig::default());
        let scroll = ScrollState {
            scroll_x: 0.0,
            scroll_y: 5000.0,
            width: 400.0,
            height: 0.0,
        };
        let view = scroll.view_range(20.0);

        let update = calc.compute(&view, &geometry);

        assert_eq!(update.viewport, Viewport::new(249, 249, 0, 3));
        assert!(update.outer_range.encloses(&view));
    }

    #[test]
    fn test_check_only_recomputes_on_escape() {
        let geometry = geometry(10, 100.0, 1000);
        let mut calc = ViewportCalculator::new(&GridConfig::default());
        let mut scroll = ScrollState::new(400.0, 300.0);

        assert!(calc.check(&scroll.view_range(20.0), &geometry).is_some());

        // Horizontal movement inside columns 0..=3 stays enclosed
        scroll.scroll_x = 20.0;
        scroll.width = 380.0;
        assert!(calc.check(&scroll.view_range(20.0), &geometry).is_none());

        // Outer bottom is 280 and the view bottom already touches it
        scroll.scroll_y = 5.0;
        assert!(calc.check(&scroll.view_range(20.0), &geometry).is_some());
    }

    #[test]
    fn test_overscan_widens_window_and_outer_range() {
        let geometry = geometry(10, 100.0, 1000);
        let config = GridConfig {
            overscan_rows: 2,
            overscan_cols: 1,
            ..GridConfig::default()
        };
        let calc = ViewportCalculator::new(&config);
        let view = PixelRange::new(400.0, 600.0, 332.0, 532.0);

        let update = calc.compute(&view, &geometry);

        assert_eq!(update.viewport, Viewport::new(17, 31, 1, 5));
        assert_eq!(update.outer_range.top, 360.0);
        assert_eq!(update.outer_range.bottom, 640.0);
    }

    #[test]
    fn test_reset_forces_recompute() {
        let geometry = geometry(2, 100.0, 10);
        let mut calc = ViewportCalculator::new(&GridConfig::default());
        let view = PixelRange::new(0.0, 100.0, 0.0, 100.0);

        assert!(calc.check(&view, &geometry).is_some());
        assert!(calc.check(&view, &geometry).is_none());
        calc.reset();
        assert!(calc.check(&view, &geometry).is_some());
    }
}
