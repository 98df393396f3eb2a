use serde::{Deserialize, Serialize};

/// Statistical measure type of a column.
///
/// Serializes to the lowercase names used as CSS classes on header and column
/// elements. Deserializes from those names or from the provider's numeric wire
/// codes.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", try_from = "MeasureTypeRepr")]
pub enum MeasureType {
    #[default]
    None,
    Nominal,
    Ordinal,
    Continuous,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MeasureTypeRepr {
    Code(u32),
    Name(String),
}

impl TryFrom<MeasureTypeRepr> for MeasureType {
    type Error = String;

    fn try_from(repr: MeasureTypeRepr) -> Result<Self, Self::Error> {
        match repr {
            MeasureTypeRepr::Code(code) => Ok(Self::from_code(code)),
            MeasureTypeRepr::Name(name) => match name.as_str() {
                "none" => Ok(Self::None),
                "nominal" => Ok(Self::Nominal),
                "ordinal" => Ok(Self::Ordinal),
                "continuous" => Ok(Self::Continuous),
                other => Err(format!("unknown measure type: {other}")),
            },
        }
    }
}

impl MeasureType {
    /// Decode the provider's numeric measure type code.
    pub fn from_code(code: u32) -> Self {
        match code {
            2 => Self::Nominal,
            3 => Self::Ordinal,
            4 => Self::Continuous,
            _ => Self::None,
        }
    }

    /// CSS class name for the column and its header. Empty for `None`.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Nominal => "nominal",
            Self::Ordinal => "ordinal",
            Self::Continuous => "continuous",
        }
    }
}

/// Display kind of the values held in a column.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Integer,
    Decimal,
    Text,
}

/// Column metadata supplied by the data provider.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    /// Width in pixels
    pub width: f64,
    #[serde(default)]
    pub measure_type: MeasureType,
    #[serde(default)]
    pub data_type: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, width: f64) -> Self {
        Self {
            name: name.into(),
            width,
            measure_type: MeasureType::None,
            data_type: DataType::Integer,
        }
    }

    #[must_use]
    pub fn with_measure_type(mut self, measure_type: MeasureType) -> Self {
        self.measure_type = measure_type;
        self
    }

    #[must_use]
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
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
    fn test_measure_type_from_wire_code() {
        let column: Column =
            serde_json::from_str(r#"{"name":"a","width":50,"measureType":2}"#).unwrap();
        assert_eq!(column.measure_type, MeasureType::Nominal);

        let column: Column =
            serde_json::from_str(r#"{"name":"b","width":50,"measureType":4}"#).unwrap();
        assert_eq!(column.measure_type, MeasureType::Continuous);
    }

    #[test]
    fn test_measure_type_from_name() {
        let column: Column = serde_json::from_str(
            r#"{"name":"a","width":50,"measureType":"ordinal","dataType":"decimal"}"#,
        )
        .unwrap();
        assert_eq!(
            column,
            Column::new("a", 50.0)
                .with_measure_type(MeasureType::Ordinal)
                .with_data_type(DataType::Decimal)
        );
    }

    #[test]
    fn test_unknown_code_is_none_and_unknown_name_fails() {
        let column: Column =
            serde_json::from_str(r#"{"name":"a","width":50,"measureType":9}"#).unwrap();
        assert_eq!(column.measure_type, MeasureType::None);
        assert!(
            serde_json::from_str::<Column>(r#"{"name":"a","width":50,"measureType":"odd"}"#)
                .is_err()
        );
    }

    #[test]
    fn test_measure_type_serializes_as_name() {
        let json = serde_json::to_string(&MeasureType::Continuous).unwrap();
        assert_eq!(json, r#""continuous""#);
    }
}
