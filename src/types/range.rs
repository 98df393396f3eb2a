use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Logical window of rows and columns (inclusive bounds).
///
/// Used both for the materialized window and for sub-rectangles of it
/// (changed cells, fetched blocks).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Viewport {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl Viewport {
    pub fn new(top: u32, bottom: u32, left: u32, right: u32) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// Closed-interval intersection test on both axes.
    pub fn overlaps(&self, other: &Viewport) -> bool {
        let rows = self.top <= other.bottom && other.top <= self.bottom;
        let cols = self.left <= other.right && other.left <= self.right;
        rows && cols
    }

    /// The shared sub-rectangle, or `None` when the windows are disjoint.
    pub fn intersect(&self, other: &Viewport) -> Option<Viewport> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Viewport {
            top: self.top.max(other.top),
            bottom: self.bottom.min(other.bottom),
            left: self.left.max(other.left),
            right: self.right.min(other.right),
        })
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        self.rows().contains(&row) && self.columns().contains(&col)
    }

    pub fn rows(&self) -> RangeInclusive<u32> {
        self.top..=self.bottom
    }

    pub fn columns(&self) -> RangeInclusive<u32> {
        self.left..=self.right
    }

    /// Number of rows (0 if the bounds are inverted)
    pub fn row_count(&self) -> u32 {
        if self.bottom < self.top {
            return 0;
        }
        self.bottom - self.top + 1
    }

    /// Number of columns (0 if the bounds are inverted)
    pub fn column_count(&self) -> u32 {
        if self.right < self.left {
            return 0;
        }
        self.right - self.left + 1
    }

    pub fn cell_count(&self) -> u64 {
        u64::from(self.row_count()) * u64::from(self.column_count())
    }
}

/// Signed movement of each edge of the window, `new - old`.
///
/// Positive `top`/`bottom` means the edge moved down, positive `left`/`right`
/// means it moved right.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Shift {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Shift {
    pub fn between(old: &Viewport, new: &Viewport) -> Self {
        Self {
            left: i64::from(new.left) - i64::from(old.left),
            top: i64::from(new.top) - i64::from(old.top),
            right: i64::from(new.right) - i64::from(old.right),
            bottom: i64::from(new.bottom) - i64::from(old.bottom),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.left == 0 && self.top == 0 && self.right == 0 && self.bottom == 0
    }
}

/// Pixel rectangle in content coordinates.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PixelRange {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl PixelRange {
    /// A range that encloses nothing, so the first check always recomputes.
    pub const EMPTY: PixelRange = PixelRange {
        top: 0.0,
        bottom: -1.0,
        left: 0.0,
        right: -1.0,
    };

    pub fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
        }
    }

    /// True if `inner` lies entirely within this range (edges may touch).
    pub fn encloses(&self, inner: &PixelRange) -> bool {
        self.left <= inner.left
            && self.right >= inner.right
            && self.top <= inner.top
            && self.bottom >= inner.bottom
    }
}

impl Default for PixelRange {
    fn default() -> Self {
        Self::EMPTY
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

    #[test]
    fn test_overlaps_partial() {
        let a = Viewport::new(0, 10, 0, 4);
        let b = Viewport::new(5, 20, 2, 8);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_overlaps_containment() {
        let outer = Viewport::new(0, 100, 0, 20);
        let inner = Viewport::new(10, 20, 5, 6);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn test_overlaps_touching_edges() {
        let a = Viewport::new(0, 9, 0, 4);
        let b = Viewport::new(9, 18, 4, 8);
        assert!(a.overlaps(&b));

        let c = Viewport::new(10, 18, 0, 4);
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_rows_disjoint_columns_shared() {
        let a = Viewport::new(0, 9, 0, 4);
        let b = Viewport::new(500, 509, 0, 4);
        assert!(!a.overlaps(&b));
        assert_eq!(a.intersect(&b), None);
    }

    #[test]
    fn test_intersect() {
        let a = Viewport::new(0, 10, 0, 4);
        let b = Viewport::new(5, 20, 2, 8);
        assert_eq!(a.intersect(&b), Some(Viewport::new(5, 10, 2, 4)));
    }

    #[test]
    fn test_counts() {
        let v = Viewport::new(10, 20, 3, 5);
        assert_eq!(v.row_count(), 11);
        assert_eq!(v.column_count(), 3);
        assert_eq!(v.cell_count(), 33);
        assert!(v.contains(10, 5));
        assert!(!v.contains(21, 5));
    }

    #[test]
    fn test_shift_between() {
        let old = Viewport::new(10, 20, 0, 4);
        let new = Viewport::new(11, 21, 0, 4);
        let shift = Shift::between(&old, &new);
        assert_eq!(
            shift,
            Shift {
                left: 0,
                top: 1,
                right: 0,
                bottom: 1
            }
        );
        assert!(!shift.is_zero());
        assert!(Shift::between(&old, &old).is_zero());
    }

    #[test]
    fn test_encloses() {
        let outer = PixelRange::new(0.0, 100.0, 0.0, f64::INFINITY);
        assert!(outer.encloses(&PixelRange::new(0.0, 100.0, 50.0, 5000.0)));
        assert!(!outer.encloses(&PixelRange::new(0.0, 100.5, 50.0, 60.0)));
        assert!(!PixelRange::EMPTY.encloses(&PixelRange::new(0.0, 0.0, 0.0, 0.0)));
    }
}
