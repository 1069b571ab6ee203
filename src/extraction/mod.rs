//! Energy value extraction from recognized label text
//!
//! Finds the first `<number> <unit> [period]` reading, then converts it to
//! kWh per year.

pub mod matcher;
pub mod reading;

pub use matcher::{find_reading, MatchRule, ReadingMatch};
pub use reading::{round2, round_to, EnergyUnit, ParsedReading, ReportingPeriod};

use serde::Serialize;

/// Outcome of extracting an annual figure from label text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    /// kWh per year, `None` when no reading was found
    pub annual_kwh: Option<f64>,
    pub reading: Option<ReadingMatch>,
    /// The text as it was passed in
    pub text: String,
}

/// Lower-case, use `.` as decimal separator and fold lines into one
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase().replace(',', ".").replace('\n', " ")
}

/// Parse label text into an annual kWh estimate
pub fn extract_reading(text: &str) -> Extraction {
    let reading = if text.is_empty() {
        None
    } else {
        find_reading(&normalize_text(text))
    };

    Extraction {
        annual_kwh: reading.as_ref().map(|m| m.reading.annual_kwh()),
        reading,
        text: text.to_string(),
    }
}

/// `(annual kWh or unknown, original text)`
pub fn extract(text: &str) -> (Option<f64>, String) {
    let extraction = extract_reading(text);
    (extraction.annual_kwh, extraction.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annual_kwh_with_period() {
        let text = "energy consumption 150 kwh/year";
        assert_eq!(extract(text), (Some(150.0), text.to_string()));
    }

    #[test]
    fn test_kwh_without_period_is_annual() {
        assert_eq!(extract("150 kwh").0, Some(150.0));
    }

    #[test]
    fn test_monthly_kwh_is_annualized() {
        assert_eq!(extract("12 kwh/month").0, Some(144.0));
    }

    #[test]
    fn test_watts_assume_three_hours_a_day() {
        assert_eq!(extract("40 w").0, Some(43.8));
    }

    #[test]
    fn test_annual_keyword_text() {
        assert_eq!(extract("annual energy consumption: 230 kwh").0, Some(230.0));
    }

    #[test]
    fn test_no_match_returns_text_unchanged() {
        assert_eq!(extract("no numbers here"), (None, "no numbers here".to_string()));
    }

    #[test]
    fn test_empty_text_is_unknown() {
        assert_eq!(extract(""), (None, String::new()));
    }

    #[test]
    fn test_ocr_text_is_normalized_before_matching() {
        let text = "ENERGY\nConsumption\n1,5 KWH\nPER DAY";
        let extraction = extract_reading(text);
        let reading = extraction.reading.unwrap().reading;
        assert_eq!(reading, ParsedReading::new(1.5, EnergyUnit::KilowattHour, ReportingPeriod::Day));
        assert_eq!(extraction.annual_kwh, Some(547.5));
        // Caller gets the raw recognized text back, not the normalized form
        assert_eq!(extraction.text, text);
    }

    #[test]
    fn test_reading_split_across_lines() {
        assert_eq!(extract("230\nkWh/annum").0, Some(230.0));
        assert_eq!(extract("0.5 kw\nday").0, Some(182.5));
    }

    #[test]
    fn test_kilowatt_without_period_is_continuous_draw() {
        assert_eq!(extract("Rated power 1.2 kW").0, Some(10512.0));
        assert_eq!(extract("1.2 kW/month").0, Some(14.4));
    }

    #[test]
    fn test_thousands_comma_becomes_decimal_point() {
        // "1,234 kwh" reads as 1.234 kWh
        assert_eq!(extract("1,234 kWh/year").0, Some(1.23));
    }

    #[test]
    fn test_annual_value_rounds_exact_binary_value() {
        assert_eq!(extract("1 w").0, Some(1.09));
        assert_eq!(extract("0.001 kwh/day").0, Some(0.36));
        assert_eq!(extract("0.015 kwh").0, Some(0.01));
        assert_eq!(extract("0.125 kwh").0, Some(0.12));
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("A,B\nC"), "a.b c");
    }

    #[test]
    fn test_extract_is_exhaustive_over_unit_period_table() {
        let cases = [
            ("10 w", 10.95),
            ("10 w/day", 10.95),
            ("10 w/month", 10.95),
            ("10 w/year", 10.95),
            ("10 kw", 87600.0),
            ("10 kw/yr", 87600.0),
            ("10 kw/mo", 120.0),
            ("10 kw/d", 3650.0),
            ("10 kwh", 10.0),
            ("10 kwh/yr", 10.0),
            ("10 kwh/mo", 120.0),
            ("10 kwh/d", 3650.0),
        ];
        for (text, expected) in cases {
            assert_eq!(extract(text).0, Some(expected), "{text}");
        }
    }
}
