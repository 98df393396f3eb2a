use serde::{Deserialize, Serialize};

use crate::error::{GridviewError, Result};

/// Default row height in pixels (also the height of the column-header band)
pub const DEFAULT_ROW_HEIGHT: f64 = 20.0;

/// Default width of the row-header column in pixels
pub const DEFAULT_ROW_HEADER_WIDTH: f64 = 32.0;

/// Grid configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    /// Fixed height of every row in pixels
    pub row_height: f64,
    /// Width of the row-header column; column 0 starts at this offset
    pub row_header_width: f64,
    /// Extra rows materialized above and below the visible rows
    pub overscan_rows: u32,
    /// Extra columns materialized left and right of the visible columns
    pub overscan_cols: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            row_height: DEFAULT_ROW_HEIGHT,
            row_header_width: DEFAULT_ROW_HEADER_WIDTH,
            overscan_rows: 0,
            overscan_cols: 0,
        }
    }
}

impl GridConfig {
    /// Parse a configuration object and validate it.
    ///
    /// Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GridConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.row_height.is_finite() || self.row_height <= 0.0 {
            return Err(GridviewError::Config(format!(
                "rowHeight must be a positive number, got {}",
                self.row_height
            )));
        }
        if !self.row_header_width.is_finite() || self.row_header_width < 0.0 {
            return Err(GridviewError::Config(format!(
                "rowHeaderWidth must be zero or positive, got {}",
                self.row_header_width
            )));
        }
        Ok(())
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
    fn test_defaults_from_empty_object() {
        let config = GridConfig::from_json("{}").unwrap();
        assert_eq!(config, GridConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = GridConfig::from_json(r#"{"rowHeight": 24, "overscanRows": 2}"#).unwrap();
        assert_eq!(config.row_height, 24.0);
        assert_eq!(config.overscan_rows, 2);
        assert_eq!(config.row_header_width, DEFAULT_ROW_HEADER_WIDTH);
    }

    #[test]
    fn test_rejects_zero_row_height() {
        let err = GridConfig::from_json(r#"{"rowHeight": 0}"#).unwrap_err();
        assert!(matches!(err, GridviewError::Config(_)));
    }

    #[test]
    fn test_rejects_negative_header_width() {
        let config = GridConfig {
            row_header_width: -1.0,
            ..GridConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = GridConfig::from_json("{rowHeight").unwrap_err();
        assert!(matches!(err, GridviewError::Json(_)));
    }
}
