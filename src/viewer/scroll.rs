//! Scroll and resize handling for `TableView`.

use tracing::trace;

use super::TableView;
use crate::provider::DataProvider;
use crate::render::{CellMaterializer, DiffOutcome};

impl<M: CellMaterializer, P: DataProvider> TableView<M, P> {
    /// Scroll to an absolute offset.
    ///
    /// Returns the diff outcome when the view escaped the outer range and the
    /// window was recomputed, `None` when the current window still covers it.
    pub fn scroll_to(&mut self, x: f64, y: f64) -> Option<DiffOutcome> {
        self.scroll.scroll_x = x;
        self.scroll.scroll_y = y;
        self.handle_view_change()
    }

    /// Scroll by a delta, clamped to the scrollable extent
    pub fn scroll_by(&mut self, dx: f64, dy: f64) -> Option<DiffOutcome> {
        let (max_x, max_y) = self.max_scroll();
        let x = (self.scroll.scroll_x + dx).clamp(0.0, max_x);
        let y = (self.scroll.scroll_y + dy).clamp(0.0, max_y);
        self.scroll_to(x, y)
    }

    /// The element was resized
    pub fn resize(&mut self, width: f64, height: f64) -> Option<DiffOutcome> {
        self.scroll.width = width;
        self.scroll.height = height;
        self.handle_view_change()
    }

    /// Activate or deactivate the view.
    ///
    /// An inactive view records scroll and size changes without materializing
    /// anything; activating it catches up with the recorded position.
    pub fn set_active(&mut self, active: bool) -> Option<DiffOutcome> {
        if self.active == active {
            return None;
        }
        self.active = active;
        trace!(target: "gridview::viewer", active, "set_active");
        if active {
            self.handle_view_change()
        } else {
            None
        }
    }

    /// Largest scroll offsets: the content size less the visible area below
    /// the header band.
    pub fn max_scroll(&self) -> (f64, f64) {
        let visible_height = self.scroll.height - self.geometry.row_height();
        let max_x = (self.geometry.total_width() - self.scroll.width).max(0.0);
        let max_y = (self.geometry.total_height() - visible_height).max(0.0);
        (max_x, max_y)
    }

    fn handle_view_change(&mut self) -> Option<DiffOutcome> {
        if !self.active || !self.has_dataset {
            return None;
        }

        let view = self.scroll.view_range(self.geometry.row_height());
        let outcome = match self.calculator.check(&view, &self.geometry) {
            Some(window) => Some(self.apply_window(window)),
            None => {
                trace!(target: "gridview::viewer", ?view, "view enclosed");
                None
            }
        };

        self.materializer.reposition_headers(&self.scroll);
        outcome
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
    use crate::provider::{MemoryProvider, ProviderNotice};
    use crate::render::{RecordingMaterializer, WindowChange};
    use crate::types::{Column, GridConfig, Shift, Viewport};
    use crate::viewer::TableView;

    fn view() -> TableView<RecordingMaterializer, MemoryProvider> {
        let columns = (0..10).map(|i| Column::new(format!("C{i}"), 100.0)).collect();
        let provider = MemoryProvider::sequential(columns, 1000);
        let mut view =
            TableView::new(GridConfig::default(), RecordingMaterializer::new(), provider)
                .unwrap()
                .with_size(400.0, 300.0);
        view.load();
        view
    }

    #[test]
    fn test_enclosed_scroll_does_nothing() {
        let mut v = view();
        v.materializer_mut().reset_counts();

        assert!(v.scroll_to(20.0, 0.0).is_none());

        assert_eq!(v.materializer().counts().created, 0);
        assert_eq!(v.provider().notices().len(), 1);
        // Headers still follow the scroll position
        assert_eq!(v.materializer().header_offset(), 20.0);
    }

    #[test]
    fn test_scroll_down_shifts() {
        let mut v = view();
        v.provider_mut().take_notices();

        let outcome = v.scroll_to(0.0, 25.0).unwrap();

        // View bottom 305 px reaches into row 15
        assert_eq!(v.viewport(), Some(Viewport::new(0, 15, 0, 3)));
        let shift = Shift {
            left: 0,
            top: 0,
            right: 0,
            bottom: 2,
        };
        assert_eq!(outcome.change, WindowChange::Shift { shift });
        assert_eq!(v.provider().notices(), &[ProviderNotice::Shifted { shift }]);
        // Newly materialized cells were filled from the provider
        assert_eq!(v.materializer().text(15, 3), Some("153"));
    }

    #[test]
    fn test_far_jump_rebuilds() {
        let mut v = view();
        v.provider_mut().take_notices();

        let outcome = v.scroll_to(0.0, 10_000.0).unwrap();

        let viewport = Viewport::new(499, 513, 0, 3);
        assert_eq!(v.viewport(), Some(viewport));
        assert_eq!(outcome.change, WindowChange::Full { viewport });
        assert_eq!(
            v.provider().notices(),
            &[ProviderNotice::ViewportChanged { viewport }]
        );
    }

    #[test]
    fn test_inactive_view_records_scroll_only() {
        let mut v = view();
        v.set_active(false);
        v.materializer_mut().reset_counts();

        assert!(v.scroll_to(0.0, 10_000.0).is_none());
        assert_eq!(v.materializer().counts().created, 0);
        assert_eq!(v.viewport(), Some(Viewport::new(0, 13, 0, 3)));

        let outcome = v.set_active(true).unwrap();
        assert_eq!(
            outcome.change,
            WindowChange::Full {
                viewport: Viewport::new(499, 513, 0, 3)
            }
        );
    }

    #[test]
    fn test_zero_height_keeps_window_ordered() {
        let mut v = view();
        assert!(v.resize(400.0, 0.0).is_none());
        v.provider_mut().take_notices();

        v.scroll_to(0.0, 5000.0).unwrap();

        let viewport = v.viewport().unwrap();
        assert_eq!(viewport, Viewport::new(249, 249, 0, 3));
        assert_eq!(
            v.provider().notices(),
            &[ProviderNotice::ViewportChanged { viewport }]
        );
        assert_eq!(v.materializer().live_count(), 4);
    }

    #[test]
    fn test_resize_grows_window() {
        let mut v = view();

        v.resize(400.0, 500.0).unwrap();

        assert_eq!(v.viewport(), Some(Viewport::new(0, 23, 0, 3)));
        assert_eq!(v.materializer().live_count(), 24 * 4);
    }

    #[test]
    fn test_scroll_by_is_clamped() {
        let mut v = view();

        v.scroll_by(-50.0, 1e9);

        let state = v.scroll_state();
        assert_eq!(state.scroll_x, 0.0);
        // 1000 rows * 20 px, less the 280 px below the header band
        assert_eq!(state.scroll_y, 19_720.0);
        assert_eq!(v.viewport().unwrap().bottom, 999);
    }
}
