/// Formats an integer with thousands separators (commas)
///
/// # Examples
/// ```ignore
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(-4200), "-4,200");
/// ```
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut result = String::new();
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    if n < 0 {
        result.push('-');
    }
    result.chars().rev().collect()
}

/// Currency with zero decimals: `$1,234`, `-$50`
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    if rounded < 0.0 {
        format!("-${}", format_number((-rounded) as i64))
    } else {
        format!("${}", format_number(rounded as i64))
    }
}

/// Byte counts in the request log
pub fn format_size(n: usize) -> String {
    format_number(n as i64)
}
