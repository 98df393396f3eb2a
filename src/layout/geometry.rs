//! Pre-computed column offsets for the current column set.
//!
//! Column widths vary, rows share a fixed height. Column lookup is a binary
//! search over the cumulative left edges, row lookup is a division.

use crate::types::{Column, GridConfig};

/// Cumulative column offsets and row metrics for one dataset.
#[derive(Debug, Clone)]
pub struct GeometryIndex {
    /// `lefts[i]` = x of column i's left edge (non-decreasing)
    lefts: Vec<f64>,
    /// Column widths in pixels
    widths: Vec<f64>,
    /// Fixed height of every row
    row_height: f64,
    /// Number of rows in the dataset
    row_count: u32,
    /// x where column 0 starts (the row-header column sits to its left)
    origin_x: f64,
}

/// Round down to a signed index; NaN maps to 0 and infinities saturate.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn floor_index(value: f64) -> i64 {
    value.floor() as i64
}

/// Round up to a signed index; NaN maps to 0 and infinities saturate.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn ceil_index(value: f64) -> i64 {
    value.ceil() as i64
}

/// Clamp a signed index into `[0, count - 1]`. An empty extent clamps to 0.
pub(crate) fn clamp_index(index: i64, count: u32) -> u32 {
    let max = i64::from(count.saturating_sub(1));
    u32::try_from(index.clamp(0, max)).unwrap_or(0)
}

impl GeometryIndex {
    /// Create an index with no columns and no rows
    pub fn new(row_height: f64, origin_x: f64) -> Self {
        Self {
            lefts: Vec::new(),
            widths: Vec::new(),
            row_height,
            row_count: 0,
            origin_x,
        }
    }

    /// Build an index for a column set using the configured row metrics
    pub fn from_columns(columns: &[Column], row_count: u32, config: &GridConfig) -> Self {
        let mut geometry = Self::new(config.row_height, config.row_header_width);
        geometry.rebuild(columns, row_count);
        geometry
    }

    /// Recompute the offsets for a new column set or row count
    pub fn rebuild(&mut self, columns: &[Column], row_count: u32) {
        self.lefts.clear();
        self.widths.clear();
        self.lefts.reserve(columns.len());
        self.widths.reserve(columns.len());

        let mut left = self.origin_x;
        for column in columns {
            self.lefts.push(left);
            self.widths.push(column.width);
            left += column.width;
        }
        self.row_count = row_count;
    }

    /// Left edges of every column
    pub fn lefts(&self) -> &[f64] {
        &self.lefts
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    /// x where column 0 starts; the row-header column fills `[0, origin_x)`
    pub fn origin_x(&self) -> f64 {
        self.origin_x
    }

    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    pub fn column_count(&self) -> u32 {
        u32::try_from(self.lefts.len()).unwrap_or(u32::MAX)
    }

    /// True when there is nothing to materialize (no rows or no columns)
    pub fn is_empty(&self) -> bool {
        self.row_count == 0 || self.lefts.is_empty()
    }

    /// Width of the scrollable content including the row-header column
    pub fn total_width(&self) -> f64 {
        match (self.lefts.last(), self.widths.last()) {
            (Some(left), Some(width)) => left + width,
            _ => self.origin_x,
        }
    }

    /// Height of the scrollable content (`row_count * row_height`)
    pub fn total_height(&self) -> f64 {
        f64::from(self.row_count) * self.row_height
    }

    /// Left edge of a column (the origin for an unknown column)
    pub fn column_left(&self, col: u32) -> f64 {
        self.lefts
            .get(col as usize)
            .copied()
            .unwrap_or(self.origin_x)
    }

    /// Width of a column (0 for an unknown column)
    pub fn column_width(&self, col: u32) -> f64 {
        self.widths.get(col as usize).copied().unwrap_or(0.0)
    }

    /// Right edge of a column. The last column extends to fill, so its right
    /// edge is unbounded.
    pub fn column_right(&self, col: u32) -> f64 {
        if col.saturating_add(1) >= self.column_count() {
            return f64::INFINITY;
        }
        self.column_left(col) + self.column_width(col)
    }

    /// Top edge of a row
    pub fn row_top(&self, row: u32) -> f64 {
        f64::from(row) * self.row_height
    }

    /// Column whose span holds `x`: the insertion point of `x` into the left
    /// edges minus one, clamped to a valid column.
    pub fn column_at(&self, x: f64) -> u32 {
        clamp_index(self.column_index(x), self.column_count())
    }

    /// Row whose span holds `y`, clamped to a valid row.
    pub fn row_at(&self, y: f64) -> u32 {
        clamp_index(floor_index(y / self.row_height), self.row_count)
    }

    /// Unclamped column index for `x` (may be -1 or past the last column)
    pub(crate) fn column_index(&self, x: f64) -> i64 {
        let insertion = self.lefts.partition_point(|left| *left < x);
        i64::try_from(insertion).unwrap_or(i64::MAX) - 1
    }

    pub(crate) fn clamp_row(&self, row: i64) -> u32 {
        clamp_index(row, self.row_count)
    }

    pub(crate) fn clamp_column(&self, col: i64) -> u32 {
        clamp_index(col, self.column_count())
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

    fn columns(widths: &[f64]) -> Vec<Column> {
        widths
            .iter()
            .enumerate()
            .map(|(i, w)| Column::new(format!("C{i}"), *w))
            .collect()
    }

    #[test]
    fn test_basic_geometry() {
        let geometry = GeometryIndex::from_columns(
            &columns(&[50.0, 80.0, 20.0]),
            100,
            &GridConfig::default(),
        );

        assert_eq!(geometry.lefts(), &[32.0, 82.0, 162.0]);
        assert_eq!(geometry.column_count(), 3);
        assert_eq!(geometry.total_width(), 182.0);
        assert_eq!(geometry.total_height(), 2000.0);
    }

    #[test]
    fn test_lefts_are_cumulative() {
        let widths = [10.0, 0.0, 35.5, 100.0, 1.0];
        let geometry = GeometryIndex::from_columns(&columns(&widths), 1, &GridConfig::default());
        let lefts = geometry.lefts();
        for i in 0..lefts.len() - 1 {
            assert!(lefts[i] <= lefts[i + 1]);
            assert_eq!(lefts[i] + widths[i], lefts[i + 1]);
        }
    }

    #[test]
    fn test_column_at_uses_insertion_point() {
        let geometry = GeometryIndex::from_columns(
            &columns(&[50.0, 50.0, 50.0]),
            10,
            &GridConfig::default(),
        );

        // Left of column 0 (inside the row header) clamps to 0
        assert_eq!(geometry.column_at(0.0), 0);
        assert_eq!(geometry.column_at(33.0), 0);
        // A left edge itself inserts before the column, so it maps to the previous one
        assert_eq!(geometry.column_at(82.0), 0);
        assert_eq!(geometry.column_at(83.0), 1);
        assert_eq!(geometry.column_at(140.0), 2);
    }

    #[test]
    fn test_last_column_extends_to_fill() {
        let geometry = GeometryIndex::from_columns(
            &columns(&[50.0, 50.0, 50.0]),
            10,
            &GridConfig::default(),
        );

        assert_eq!(geometry.column_at(1000.0), 2);
        assert_eq!(geometry.column_right(2), f64::INFINITY);
        assert_eq!(geometry.column_right(1), 132.0);
    }

    #[test]
    fn test_row_at() {
        let geometry =
            GeometryIndex::from_columns(&columns(&[50.0]), 10, &GridConfig::default());

        assert_eq!(geometry.row_at(0.0), 0);
        assert_eq!(geometry.row_at(19.9), 0);
        assert_eq!(geometry.row_at(20.0), 1);
        assert_eq!(geometry.row_at(-50.0), 0);
        assert_eq!(geometry.row_at(10_000.0), 9);
    }

    #[test]
    fn test_empty_geometry_clamps_to_zero() {
        let geometry = GeometryIndex::from_columns(&[], 0, &GridConfig::default());

        assert!(geometry.is_empty());
        assert_eq!(geometry.column_at(500.0), 0);
        assert_eq!(geometry.row_at(500.0), 0);
        assert_eq!(geometry.total_width(), 32.0);
        assert_eq!(geometry.total_height(), 0.0);
    }

    #[test]
    fn test_rebuild_replaces_columns() {
        let mut geometry = GeometryIndex::from_columns(
            &columns(&[50.0, 50.0]),
            5,
            &GridConfig::default(),
        );
        geometry.rebuild(&columns(&[10.0]), 7);

        assert_eq!(geometry.lefts(), &[32.0]);
        assert_eq!(geometry.row_count(), 7);
    }

    #[test]
    fn test_index_helpers() {
        assert_eq!(floor_index(-0.5), -1);
        assert_eq!(ceil_index(0.1), 1);
        assert_eq!(floor_index(f64::NAN), 0);
        assert_eq!(clamp_index(-3, 10), 0);
        assert_eq!(clamp_index(50, 10), 9);
        assert_eq!(clamp_index(50, 0), 0);
    }
}
