//! Display formatting for cell values.
//!
//! Formatting is decided once per column for the values being shown, then
//! applied to each value, so a column of `1.5, 2, 3.25` reads `1.50, 2.00, 3.25`.
//! Missing values (the integer sentinel, NaN, `null`) display as empty text.

use crate::types::CellValue;

/// Per-column display decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Formatting {
    /// Digits after the decimal point
    pub decimal_places: usize,
    /// Use exponent notation
    pub exponent: bool,
}

/// Formatting collaborator used by the grid to turn raw numbers into text.
pub trait CellFormatter {
    /// Choose a formatting for a column's values
    fn determine_formatting(&self, values: &[CellValue]) -> Formatting;

    /// Format one number
    fn format(&self, value: f64, formatting: &Formatting) -> String;
}

/// Smallest decimal count that shows every value in the column, capped.
#[derive(Debug, Clone, Copy)]
pub struct DecimalFormatter {
    max_decimal_places: usize,
}

impl Default for DecimalFormatter {
    fn default() -> Self {
        Self::new(3)
    }
}

impl DecimalFormatter {
    pub fn new(max_decimal_places: usize) -> Self {
        Self { max_decimal_places }
    }
}

/// Values this large or this small switch the column to exponent notation
fn needs_exponent(value: f64) -> bool {
    let magnitude = value.abs();
    magnitude >= 1e11 || (magnitude > 0.0 && magnitude < 1e-4)
}

/// Decimal digits needed to show `value` at up to `max` places. In exponent
/// notation this counts the mantissa's digits.
fn decimals_needed(value: f64, max: usize, exponent: bool) -> usize {
    let s = if exponent {
        format!("{:.max$e}", value.abs())
    } else {
        format!("{:.max$}", value.abs())
    };
    let mantissa = s.split('e').next().unwrap_or_default();
    match mantissa.split_once('.') {
        Some((_, fraction)) => fraction.trim_end_matches('0').len(),
        None => 0,
    }
}

impl CellFormatter for DecimalFormatter {
    fn determine_formatting(&self, values: &[CellValue]) -> Formatting {
        let numbers: Vec<f64> = values
            .iter()
            .filter_map(CellValue::as_f64)
            .filter(|n| n.is_finite())
            .collect();
        let exponent = numbers.iter().any(|n| needs_exponent(*n));
        let decimal_places = numbers
            .iter()
            .map(|n| decimals_needed(*n, self.max_decimal_places, exponent))
            .max()
            .unwrap_or(0);
        Formatting {
            decimal_places,
            exponent,
        }
    }

    fn format(&self, value: f64, formatting: &Formatting) -> String {
        let places = formatting.decimal_places;
        let text = if formatting.exponent {
            format!("{value:.places$e}")
        } else {
            format!("{value:.places$}")
        };
        // Rounding can leave a negative zero ("-0.00")
        match text.strip_prefix('-') {
            Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
            _ => text,
        }
    }
}

/// Text shown for a raw value under a column's formatting
pub fn display_text(
    value: &CellValue,
    formatter: &dyn CellFormatter,
    formatting: &Formatting,
) -> String {
    if value.is_missing() {
        return String::new();
    }
    match value {
        CellValue::Text(text) => text.clone(),
        _ => value
            .as_f64()
            .map(|n| formatter.format(n, formatting))
            .unwrap_or_default(),
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
    use crate::types::MISSING_INTEGER;

    fn determine(values: &[CellValue]) -> Formatting {
        DecimalFormatter::default().determine_formatting(values)
    }

    #[test]
    fn test_integers_have_no_decimals() {
        let values = vec![CellValue::from(1), CellValue::from(20), CellValue::from(-3)];
        assert_eq!(determine(&values).decimal_places, 0);
    }

    #[test]
    fn test_decimals_follow_widest_value() {
        let values: Vec<CellValue> = vec![1.5.into(), 2.into(), 3.25.into()];
        let formatting = determine(&values);
        assert_eq!(formatting.decimal_places, 2);

        let formatter = DecimalFormatter::default();
        assert_eq!(formatter.format(2.0, &formatting), "2.00");
        assert_eq!(formatter.format(1.5, &formatting), "1.50");
    }

    #[test]
    fn test_decimals_are_capped() {
        let values = vec![CellValue::from(1.0 / 3.0)];
        assert_eq!(determine(&values).decimal_places, 3);
    }

    #[test]
    fn test_missing_and_text_do_not_affect_formatting() {
        let values = vec![
            CellValue::Integer(MISSING_INTEGER),
            CellValue::Number(f64::NAN),
            CellValue::from("abc"),
            CellValue::from(4),
        ];
        assert_eq!(determine(&values), Formatting::default());
    }

    #[test]
    fn test_exponent_for_extreme_values() {
        let values = vec![CellValue::from(1.5e12), CellValue::from(3.0)];
        let formatting = determine(&values);
        assert!(formatting.exponent);
        let text = DecimalFormatter::default().format(1.5e12, &formatting);
        assert_eq!(text, "1.5e12");
    }

    #[test]
    fn test_negative_zero_is_unsigned() {
        let formatting = Formatting {
            decimal_places: 1,
            exponent: false,
        };
        assert_eq!(DecimalFormatter::default().format(-0.01, &formatting), "0.0");
        assert_eq!(DecimalFormatter::default().format(-0.5, &formatting), "-0.5");
    }

    #[test]
    fn test_display_text() {
        let formatter = DecimalFormatter::default();
        let formatting = Formatting {
            decimal_places: 2,
            exponent: false,
        };

        assert_eq!(
            display_text(&CellValue::Integer(MISSING_INTEGER), &formatter, &formatting),
            ""
        );
        assert_eq!(
            display_text(&CellValue::Number(f64::NAN), &formatter, &formatting),
            ""
        );
        assert_eq!(display_text(&CellValue::Missing, &formatter, &formatting), "");
        assert_eq!(
            display_text(&CellValue::from("Male"), &formatter, &formatting),
            "Male"
        );
        assert_eq!(
            display_text(&CellValue::from(7), &formatter, &formatting),
            "7.00"
        );
    }
}
