pub mod panels;
pub mod plot;

use crate::data::model::CellValue;

/// Shown wherever an aggregate is undefined.
pub const PLACEHOLDER: &str = "N/A";

/// Two-decimal number, or the placeholder when undefined.
pub fn format_number(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Cell text, or the placeholder when undefined.
pub fn format_value(value: Option<&CellValue>) -> String {
    match value {
        Some(v) if !v.is_null() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_values_render_as_placeholder() {
        assert_eq!(format_number(None), "N/A");
        assert_eq!(format_number(Some(0.0)), "0.00");
        assert_eq!(format_number(Some(0.456)), "0.46");
        assert_eq!(format_value(None), "N/A");
        assert_eq!(format_value(Some(&CellValue::Null)), "N/A");
        assert_eq!(format_value(Some(&CellValue::Text("pop".into()))), "pop");
    }
}
