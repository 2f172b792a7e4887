// Utility helpers for parsing and basic statistics.
//
// All the forgiving CSV/number/date handling lives here so the rest of the
// code can assume clean, typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in CSV exports.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (except exponents).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for anything that cannot be safely parsed, including
///   values that overflow to infinity.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    // Integer columns are sometimes exported as floats ("2010.0").
    match s.parse::<i32>() {
        Ok(v) => Some(v),
        Err(_) => {
            let f = s.parse::<f64>().ok()?;
            (f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64).then(|| f as i32)
        }
    }
}

pub fn parse_u32_safe(s: Option<&str>) -> Option<u32> {
    parse_i32_safe(s).and_then(|v| u32::try_from(v).ok())
}

/// Date formats seen in sales exports, most common first.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y"];

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    // Drop a time-of-day suffix ("2010-02-05 00:00:00" or "2010-02-05T00:00:00").
    let day = s.split([' ', 'T']).next().unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

pub fn parse_bool_safe(s: Option<&str>) -> Option<bool> {
    match s?.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" => Some(true),
        "false" | "0" | "0.0" => Some(false),
        _ => None,
    }
}

pub fn average(v: &[f64]) -> f64 {
    // Arithmetic mean; 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed number of decimal places plus locale-aware thousands
    // separators (e.g., `1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: u64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    }
    // Avoid printing "-0" for values that round to zero.
    let is_zero = res.chars().all(|c| matches!(c, '0' | ',' | '.'));
    if n.is_sign_negative() && !is_zero {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in log lines and table notes (e.g., `9,855 rows`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_forgiving_numbers() {
        assert_eq!(parse_f64_safe(Some(" 1,234.5 ")), Some(1234.5));
        assert_eq!(parse_f64_safe(Some("-7.25")), Some(-7.25));
        assert_eq!(parse_f64_safe(Some("abc")), None);
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(None), None);
        assert_eq!(parse_f64_safe(Some("1e3")), Some(1000.0));
        assert_eq!(parse_f64_safe(Some("1e400")), None);
        assert_eq!(parse_f64_safe(Some("-1e400")), None);
    }

    #[test]
    fn parses_integer_columns_exported_as_floats() {
        assert_eq!(parse_i32_safe(Some("2010")), Some(2010));
        assert_eq!(parse_i32_safe(Some("2010.0")), Some(2010));
        assert_eq!(parse_i32_safe(Some("2010.5")), None);
        assert_eq!(parse_u32_safe(Some("-3")), None);
        assert_eq!(parse_u32_safe(Some("52")), Some(52));
    }

    #[test]
    fn parses_supported_date_layouts() {
        let expected = NaiveDate::from_ymd_opt(2010, 2, 5);
        assert_eq!(parse_date_safe(Some("2010-02-05")), expected);
        assert_eq!(parse_date_safe(Some("05-02-2010")), expected);
        assert_eq!(parse_date_safe(Some("02/05/2010")), expected);
        assert_eq!(parse_date_safe(Some("2010-02-05 00:00:00")), expected);
        assert_eq!(parse_date_safe(Some("not a date")), None);
    }

    #[test]
    fn parses_holiday_flags() {
        assert_eq!(parse_bool_safe(Some("TRUE")), Some(true));
        assert_eq!(parse_bool_safe(Some("False")), Some(false));
        assert_eq!(parse_bool_safe(Some("1")), Some(true));
        assert_eq!(parse_bool_safe(Some("0")), Some(false));
        assert_eq!(parse_bool_safe(Some("yes")), None);
    }

    #[test]
    fn formats_with_thousands_separators() {
        assert_eq!(format_number(1234567.891, 0), "1,234,568");
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-9876.5, 1), "-9,876.5");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(-0.2, 0), "0");
        assert_eq!(format_int(9855), "9,855");
    }

    #[test]
    fn average_of_empty_is_zero() {
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[100.0, 50.0]), 75.0);
    }
}
