//! Data provider interface.
//!
//! The provider owns the dataset. The grid tells it which window is
//! materialized (a full change, or a shift of the previous window) and reads
//! cell values back as `CellBlock`s. Values that arrive later, possibly from
//! another thread, are delivered as `DataEvent`s.

use serde::{Deserialize, Serialize};

use crate::types::{CellValue, Column, Shift, Viewport};

/// Column-major block of raw values covering `range`.
///
/// `columns[c - range.left][r - range.top]` is the value at (r, c). The range
/// is the window the block was fetched for, so a late block can be matched
/// against the current window.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CellBlock {
    pub range: Viewport,
    pub columns: Vec<Vec<CellValue>>,
}

impl CellBlock {
    pub fn new(range: Viewport, columns: Vec<Vec<CellValue>>) -> Self {
        Self { range, columns }
    }

    /// Values of one column, `None` if the column is outside the block
    pub fn column(&self, col: u32) -> Option<&[CellValue]> {
        let offset = col.checked_sub(self.range.left)?;
        self.columns.get(offset as usize).map(Vec::as_slice)
    }

    pub fn value(&self, row: u32, col: u32) -> Option<&CellValue> {
        let offset = row.checked_sub(self.range.top)?;
        self.column(col)?.get(offset as usize)
    }
}

/// Data arriving after the window was materialized
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DataEvent {
    /// Values fetched for a window
    CellsLoaded { block: CellBlock },
    /// Values inside `range` changed and should be read again
    CellsChanged { range: Viewport },
    /// A fetch for `range` failed
    FetchFailed { range: Viewport, message: String },
}

/// Source of dataset metadata and cell values.
pub trait DataProvider {
    /// Ordered column metadata
    fn columns(&self) -> &[Column];

    fn row_count(&self) -> u32;

    fn column_count(&self) -> u32 {
        u32::try_from(self.columns().len()).unwrap_or(u32::MAX)
    }

    /// The materialized window was replaced; nothing cached can be reused.
    fn on_viewport_changed(&mut self, viewport: Viewport);

    /// The materialized window's edges moved by `shift`; cached values for
    /// the overlap stay valid.
    fn on_shift(&mut self, shift: Shift);

    /// Values currently available for `range`. Asynchronous providers return
    /// `None` and deliver `DataEvent::CellsLoaded` later.
    fn cells(&self, range: &Viewport) -> Option<CellBlock>;
}

/// Notification received by a provider, as recorded by `MemoryProvider`
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProviderNotice {
    ViewportChanged { viewport: Viewport },
    Shifted { shift: Shift },
}

/// Dataset description: column metadata, row count and optional values
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub columns: Vec<Column>,
    pub row_count: u32,
    /// Column-major values; missing entries read as `CellValue::Missing`
    #[serde(default)]
    pub values: Vec<Vec<CellValue>>,
}

/// Synchronous provider over an in-memory dataset.
///
/// Records every notification it receives and tracks the window it was last
/// told about.
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    dataset: Dataset,
    window: Option<Viewport>,
    notices: Vec<ProviderNotice>,
    available: bool,
}

impl MemoryProvider {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            window: None,
            notices: Vec::new(),
            available: true,
        }
    }

    /// Dataset whose cell at (r, c) holds `r * columns + c`
    pub fn sequential(columns: Vec<Column>, row_count: u32) -> Self {
        let width = columns.len();
        let values = (0..width)
            .map(|c| {
                (0..row_count)
                    .map(|r| {
                        let n = i64::from(r) * i64::try_from(width).unwrap_or(0)
                            + i64::try_from(c).unwrap_or(0);
                        CellValue::Integer(n)
                    })
                    .collect()
            })
            .collect();
        Self::new(Dataset {
            columns,
            row_count,
            values,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The window from the last notification, shifted as reported
    pub fn window(&self) -> Option<Viewport> {
        self.window
    }

    pub fn notices(&self) -> &[ProviderNotice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<ProviderNotice> {
        std::mem::take(&mut self.notices)
    }

    /// When unavailable, `cells` returns `None` as an asynchronous provider would
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Overwrite one value. Returns false if the cell is outside the dataset.
    pub fn set_value(&mut self, row: u32, col: u32, value: CellValue) -> bool {
        if row >= self.dataset.row_count {
            return false;
        }
        let Some(column) = self.dataset.values.get_mut(col as usize) else {
            return false;
        };
        let index = row as usize;
        if column.len() <= index {
            column.resize(index + 1, CellValue::Missing);
        }
        match column.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Build the block for `range` regardless of availability
    pub fn block(&self, range: &Viewport) -> CellBlock {
        let columns = range
            .columns()
            .map(|col| {
                let values = self.dataset.values.get(col as usize);
                range
                    .rows()
                    .map(|row| {
                        values
                            .and_then(|v| v.get(row as usize))
                            .cloned()
                            .unwrap_or(CellValue::Missing)
                    })
                    .collect()
            })
            .collect();
        CellBlock::new(*range, columns)
    }
}

impl DataProvider for MemoryProvider {
    fn columns(&self) -> &[Column] {
        &self.dataset.columns
    }

    fn row_count(&self) -> u32 {
        self.dataset.row_count
    }

    fn on_viewport_changed(&mut self, viewport: Viewport) {
        self.window = Some(viewport);
        self.notices
            .push(ProviderNotice::ViewportChanged { viewport });
    }

    fn on_shift(&mut self, shift: Shift) {
        if let Some(window) = self.window.as_mut() {
            let moved = |edge: u32, delta: i64| {
                u32::try_from(i64::from(edge) + delta).unwrap_or(edge)
            };
            *window = Viewport {
                top: moved(window.top, shift.top),
                bottom: moved(window.bottom, shift.bottom),
                left: moved(window.left, shift.left),
                right: moved(window.right, shift.right),
            };
        }
        self.notices.push(ProviderNotice::Shifted { shift });
    }

    fn cells(&self, range: &Viewport) -> Option<CellBlock> {
        if !self.available {
            return None;
        }
        Some(self.block(range))
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

    fn provider() -> MemoryProvider {
        let columns = (0..4).map(|i| Column::new(format!("C{i}"), 80.0)).collect();
        MemoryProvider::sequential(columns, 10)
    }

    #[test]
    fn test_sequential_values() {
        let p = provider();
        let block = p.cells(&Viewport::new(2, 3, 1, 2)).unwrap();
        assert_eq!(block.value(2, 1), Some(&CellValue::Integer(9)));
        assert_eq!(block.value(3, 2), Some(&CellValue::Integer(14)));
        assert_eq!(block.value(4, 2), None);
        assert_eq!(block.column(0), None);
    }

    #[test]
    fn test_out_of_dataset_reads_missing() {
        let p = provider();
        let block = p.block(&Viewport::new(9, 11, 3, 4));
        assert_eq!(block.value(9, 3), Some(&CellValue::Integer(39)));
        assert_eq!(block.value(11, 4), Some(&CellValue::Missing));
    }

    #[test]
    fn test_shift_tracks_window() {
        let mut p = provider();
        p.on_viewport_changed(Viewport::new(0, 5, 0, 2));
        p.on_shift(Shift {
            left: 1,
            top: 2,
            right: 1,
            bottom: 2,
        });
        assert_eq!(p.window(), Some(Viewport::new(2, 7, 1, 3)));
        assert_eq!(p.notices().len(), 2);
    }

    #[test]
    fn test_unavailable_returns_none() {
        let mut p = provider();
        p.set_available(false);
        assert!(p.cells(&Viewport::new(0, 0, 0, 0)).is_none());
    }

    #[test]
    fn test_set_value() {
        let mut p = provider();
        assert!(p.set_value(1, 1, CellValue::from("x")));
        assert!(!p.set_value(10, 1, CellValue::from("x")));
        assert!(!p.set_value(1, 9, CellValue::from("x")));
        assert_eq!(
            p.cells(&Viewport::new(1, 1, 1, 1)).unwrap().value(1, 1),
            Some(&CellValue::from("x"))
        );
    }

    #[test]
    fn test_data_event_json() {
        let event: DataEvent = serde_json::from_str(
            r#"{"kind":"cellsLoaded","block":{"range":{"top":0,"bottom":1,"left":0,"right":0},"columns":[[1,null]]}}"#,
        )
        .unwrap();
        let DataEvent::CellsLoaded { block } = event else {
            panic!("expected cellsLoaded");
        };
        assert_eq!(block.value(1, 0), Some(&CellValue::Missing));
    }
}
