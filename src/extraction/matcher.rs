//! Scanner for `<number> <unit> [/|per] [<period>]` readings
//!
//! Works on `char` positions of already-normalized text (lower-cased, `.` as
//! decimal separator, no newlines). Candidates are tried left to right; the
//! first position that yields a number directly followed by a unit wins.

use super::reading::{EnergyUnit, ParsedReading, ReportingPeriod};
use serde::Serialize;
use std::ops::Range;

/// Keywords that introduce an annual figure, tried in this order
pub const ANNUAL_KEYWORDS: [&str; 3] = ["annual", "yearly", "per year"];
/// Characters allowed between an annual keyword and its number
pub const MAX_KEYWORD_GAP: usize = 30;

/// Which rule produced a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// Number, unit, optional separator and period anywhere in the text
    Quantity,
    /// Annual keyword followed closely by a number and unit
    AnnualKeyword,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingMatch {
    pub reading: ParsedReading,
    pub rule: MatchRule,
    /// Char range of the matched text
    pub span: Range<usize>,
}

/// Find the first reading in normalized text, falling back to annual keywords
pub fn find_reading(normalized: &str) -> Option<ReadingMatch> {
    let chars: Vec<char> = normalized.chars().collect();
    find_quantity(&chars).or_else(|| find_after_annual_keyword(&chars))
}

/// Leftmost `<number>\s*<unit>\s*[/|per]\s*[<period>]`
fn find_quantity(chars: &[char]) -> Option<ReadingMatch> {
    (0..chars.len()).find_map(|start| {
        let (value, unit, after_unit) = match_number_unit(chars, start)?;

        let mut pos = skip_whitespace(chars, after_unit);
        if chars.get(pos) == Some(&'/') {
            pos += 1;
        } else if starts_with(chars, pos, "per") {
            pos += 3;
        }
        pos = skip_whitespace(chars, pos);

        let (period, end) = match match_period(chars, pos) {
            Some((period, end)) => (period, end),
            None => (ReportingPeriod::Unspecified, pos),
        };

        Some(ReadingMatch {
            reading: ParsedReading::new(value, unit, period),
            rule: MatchRule::Quantity,
            span: start..end,
        })
    })
}

/// Leftmost annual keyword followed within the gap by `<number>\s*<unit>`
fn find_after_annual_keyword(chars: &[char]) -> Option<ReadingMatch> {
    (0..chars.len()).find_map(|start| {
        let keyword = ANNUAL_KEYWORDS
            .iter()
            .find(|k| starts_with(chars, start, k))?;
        let body = start + keyword.chars().count();

        // Shortest gap first; the gap may not cross a line break
        (0..=MAX_KEYWORD_GAP)
            .take_while(|&gap| body + gap <= chars.len())
            .take_while(|&gap| gap == 0 || chars[body + gap - 1] != '\n')
            .find_map(|gap| {
                let (value, unit, end) = match_number_unit(chars, body + gap)?;
                Some(ReadingMatch {
                    reading: ParsedReading::new(value, unit, ReportingPeriod::Year),
                    rule: MatchRule::AnnualKeyword,
                    span: start..end,
                })
            })
    })
}

/// `<number>\s*<unit>` starting exactly at `start`
///
/// Prefers the number with its fractional part and falls back to the integer
/// part alone, so `1.2.3w` read from `2` gives `2.3`, and `5.x w` never parses.
fn match_number_unit(chars: &[char], start: usize) -> Option<(f64, EnergyUnit, usize)> {
    let int_end = digits_end(chars, start);
    if int_end == start {
        return None;
    }

    let mut candidates = Vec::with_capacity(2);
    if chars.get(int_end) == Some(&'.') {
        let frac_end = digits_end(chars, int_end + 1);
        if frac_end > int_end + 1 {
            candidates.push(frac_end);
        }
    }
    candidates.push(int_end);

    candidates.into_iter().find_map(|number_end| {
        let unit_start = skip_whitespace(chars, number_end);
        let (unit, unit_end) = EnergyUnit::TOKENS
            .iter()
            .find(|(token, _)| starts_with(chars, unit_start, token))
            .map(|(token, unit)| (*unit, unit_start + token.len()))?;
        let value = parse_number(&chars[start..number_end])?;
        Some((value, unit, unit_end))
    })
}

fn match_period(chars: &[char], pos: usize) -> Option<(ReportingPeriod, usize)> {
    ReportingPeriod::TOKENS
        .iter()
        .find(|(token, _)| starts_with(chars, pos, token))
        .map(|(token, period)| (*period, pos + token.len()))
}

fn digits_end(chars: &[char], start: usize) -> usize {
    let mut pos = start;
    while chars.get(pos).and_then(|&c| decimal_digit(c)).is_some() {
        pos += 1;
    }
    pos
}

fn skip_whitespace(chars: &[char], start: usize) -> usize {
    let mut pos = start;
    while chars.get(pos).is_some_and(|c| c.is_whitespace()) {
        pos += 1;
    }
    pos
}

/// ASCII-only token comparison at a char position
fn starts_with(chars: &[char], pos: usize, token: &str) -> bool {
    let len = token.len();
    pos + len <= chars.len() && chars[pos..pos + len].iter().copied().eq(token.chars())
}

/// First code point of every Unicode decimal digit (Nd) block
///
/// Each block holds the digits 0-9 in order, so a digit's value is its
/// offset from the block start. Sorted for binary search.
const DIGIT_ZEROS: [u32; 66] = [
    0x0030, 0x0660, 0x06F0, 0x07C0, 0x0966, 0x09E6, 0x0A66, 0x0AE6,
    0x0B66, 0x0BE6, 0x0C66, 0x0CE6, 0x0D66, 0x0DE6, 0x0E50, 0x0ED0,
    0x0F20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946, 0x19D0, 0x1A80,
    0x1A90, 0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900,
    0xA9D0, 0xA9F0, 0xAA50, 0xABF0, 0xFF10, 0x104A0, 0x10D30, 0x11066,
    0x110F0, 0x11136, 0x111D0, 0x112F0, 0x11450, 0x114D0, 0x11650, 0x116C0,
    0x11730, 0x118E0, 0x11950, 0x11C50, 0x11D50, 0x11DA0, 0x16A60, 0x16AC0,
    0x16B50, 0x1D7CE, 0x1D7D8, 0x1D7E2, 0x1D7EC, 0x1D7F6, 0x1E140, 0x1E2F0,
    0x1E950, 0x1FBF0,
];

fn decimal_digit(c: char) -> Option<u32> {
    let code = c as u32;
    let block = match DIGIT_ZEROS.binary_search(&code) {
        Ok(i) => i,
        Err(0) => return None,
        Err(i) => i - 1,
    };
    let offset = code - DIGIT_ZEROS[block];
    (offset < 10).then_some(offset)
}

fn parse_number(chars: &[char]) -> Option<f64> {
    let ascii: String = chars
        .iter()
        .map(|&c| match decimal_digit(c) {
            Some(d) => char::from_digit(d, 10).unwrap_or(c),
            None => c,
        })
        .collect();
    ascii.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use EnergyUnit::*;
    use ReportingPeriod::*;

    fn reading(text: &str) -> Option<ParsedReading> {
        find_reading(text).map(|m| m.reading)
    }

    fn triple(value: f64, unit: EnergyUnit, period: ReportingPeriod) -> Option<ParsedReading> {
        Some(ParsedReading::new(value, unit, period))
    }

    #[test]
    fn test_number_unit_period() {
        assert_eq!(reading("energy consumption 150 kwh/year"), triple(150.0, KilowattHour, Year));
        assert_eq!(reading("12 kwh/month"), triple(12.0, KilowattHour, Month));
        assert_eq!(reading("0.8kwh per day"), triple(0.8, KilowattHour, Day));
        assert_eq!(reading("2 kw / mo"), triple(2.0, Kilowatt, Month));
        assert_eq!(reading("300kwh/yr"), triple(300.0, KilowattHour, Year));
    }

    #[test]
    fn test_period_is_optional() {
        assert_eq!(reading("150 kwh"), triple(150.0, KilowattHour, Unspecified));
        assert_eq!(reading("rated 40 w"), triple(40.0, Watt, Unspecified));
        assert_eq!(reading("1.5 kw per annum"), triple(1.5, Kilowatt, Unspecified));
    }

    #[test]
    fn test_unit_prefers_longest_token() {
        assert_eq!(reading("5kwh"), triple(5.0, KilowattHour, Unspecified));
        assert_eq!(reading("5kw"), triple(5.0, Kilowatt, Unspecified));
        assert_eq!(reading("5 watts"), triple(5.0, Watt, Unspecified));
    }

    #[test]
    fn test_period_tokens_match_word_prefixes() {
        // Period tokens are not word-bounded: "model" starts with "mo"
        assert_eq!(reading("90 kwh model x"), triple(90.0, KilowattHour, Month));
        assert_eq!(reading("3 kw daily"), triple(3.0, Kilowatt, Day));
        assert_eq!(reading("60 w dimmable"), triple(60.0, Watt, Day));
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(reading("a 2 w b 300 kwh/year"), triple(2.0, Watt, Unspecified));
    }

    #[test]
    fn test_numbers_without_unit_are_skipped() {
        assert_eq!(
            reading("model 2023 class a 215 kwh/year"),
            triple(215.0, KilowattHour, Year)
        );
    }

    #[test]
    fn test_fraction_falls_back_to_integer_part() {
        // "1.2" is not followed by a unit, "2.3" is
        assert_eq!(reading("1.2.3w"), triple(2.3, Watt, Unspecified));
        // Trailing dot: the integer alone carries the unit only if it follows directly
        assert_eq!(reading("7. kwh"), None);
        assert_eq!(reading("7 .kwh"), None);
    }

    #[test]
    fn test_whitespace_between_number_and_unit() {
        assert_eq!(reading("150 \t kwh"), triple(150.0, KilowattHour, Unspecified));
        assert_eq!(reading("150kwh  /  year"), triple(150.0, KilowattHour, Year));
    }

    #[test]
    fn test_span_covers_match() {
        let m = find_reading("about 12 kwh/month here").unwrap();
        assert_eq!(m.span, 6..18);
        assert_eq!(m.rule, MatchRule::Quantity);
    }

    #[test]
    fn test_non_ascii_digits() {
        // Devanagari "१५०" and Arabic-Indic "٢٠"
        assert_eq!(reading("१५० kwh/year"), triple(150.0, KilowattHour, Year));
        assert_eq!(reading("٢٠ w"), triple(20.0, Watt, Unspecified));
    }

    #[test]
    fn test_annual_keyword_rule() {
        let chars: Vec<char> = "annual energy consumption: 230 kwh".chars().collect();
        let m = find_after_annual_keyword(&chars).unwrap();
        assert_eq!(m.reading, ParsedReading::new(230.0, KilowattHour, Year));
        assert_eq!(m.rule, MatchRule::AnnualKeyword);
    }

    #[test]
    fn test_annual_keyword_forces_year() {
        let chars: Vec<char> = "yearly usage 2 kw".chars().collect();
        let m = find_after_annual_keyword(&chars).unwrap();
        assert_eq!(m.reading.period, Year);
    }

    #[test]
    fn test_annual_keyword_gap_limit() {
        let near = format!("annual{}150 kwh", " ".repeat(MAX_KEYWORD_GAP));
        let far = format!("annual{}150 kwh", " ".repeat(MAX_KEYWORD_GAP + 1));

        let near: Vec<char> = near.chars().collect();
        let far: Vec<char> = far.chars().collect();

        assert!(find_after_annual_keyword(&near).is_some());
        assert!(find_after_annual_keyword(&far).is_none());
    }

    #[test]
    fn test_annual_keyword_skips_numbers_without_unit() {
        let chars: Vec<char> = "annual 2023 edition, 150 kwh".chars().collect();
        let m = find_after_annual_keyword(&chars).unwrap();
        assert_eq!(m.reading.value, 150.0);
        assert_eq!(m.span, 0..28);
    }

    #[test]
    fn test_digits_from_any_decimal_script() {
        // Bengali, Thai, Myanmar, Mathematical bold
        assert_eq!(reading("১২ kwh/month"), triple(12.0, KilowattHour, Month));
        assert_eq!(reading("๔๐ w"), triple(40.0, Watt, Unspecified));
        assert_eq!(reading("၃ kw/day"), triple(3.0, Kilowatt, Day));
        assert_eq!(reading("\u{1D7CF}\u{1D7CE} kwh"), triple(10.0, KilowattHour, Unspecified));
    }

    #[test]
    fn test_decimal_digit_table() {
        assert_eq!(decimal_digit('7'), Some(7));
        assert_eq!(decimal_digit('\u{0669}'), Some(9));
        assert_eq!(decimal_digit('\u{FF15}'), Some(5));
        // Between blocks and before the first one
        assert_eq!(decimal_digit('\u{066A}'), None);
        assert_eq!(decimal_digit('a'), None);
        assert_eq!(decimal_digit(' '), None);
        // Superscripts and fractions are numeric but not decimal digits
        assert_eq!(decimal_digit('²'), None);
        assert_eq!(decimal_digit('½'), None);
    }

    #[test]
    fn test_no_reading() {
        assert_eq!(reading("no numbers here"), None);
        assert_eq!(reading("energy class a+++"), None);
        assert_eq!(reading(""), None);
    }
}
