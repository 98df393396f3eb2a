use serde::{Deserialize, Serialize};

/// Integer the data provider uses to mark a missing value.
pub const MISSING_INTEGER: i64 = i32::MIN as i64;

/// A raw cell value as delivered by the data provider.
///
/// Deserializes from a JSON number, string or `null`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// True for the missing sentinel, NaN and `null`. These render as an empty string.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Integer(i) => *i == MISSING_INTEGER,
            Self::Number(n) => n.is_nan(),
            Self::Text(_) => false,
            Self::Missing => true,
        }
    }

    /// Numeric value, if this is a non-missing number.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        if self.is_missing() {
            return None;
        }
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Number(n) => Some(*n),
            Self::Text(_) | Self::Missing => None,
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        Self::Text(v)
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
    fn test_missing_values() {
        assert!(CellValue::Integer(MISSING_INTEGER).is_missing());
        assert!(CellValue::Number(f64::NAN).is_missing());
        assert!(CellValue::Missing.is_missing());
        assert!(!CellValue::Integer(0).is_missing());
        assert!(!CellValue::Text(String::new()).is_missing());
    }

    #[test]
    fn test_deserialize_from_json() {
        let values: Vec<CellValue> =
            serde_json::from_str(r#"[1, 2.5, "abc", null, -2147483648]"#).unwrap();
        assert_eq!(values[0], CellValue::Integer(1));
        assert_eq!(values[1], CellValue::Number(2.5));
        assert_eq!(values[2], CellValue::Text("abc".to_string()));
        assert_eq!(values[3], CellValue::Missing);
        assert!(values[4].is_missing());
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(CellValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(CellValue::Integer(MISSING_INTEGER).as_f64(), None);
        assert_eq!(CellValue::from("x").as_f64(), None);
    }
}
