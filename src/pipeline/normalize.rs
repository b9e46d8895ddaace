//! Text normalisation applied to every cell, header and OCR line.

/// Collapse every whitespace run (newlines included) to one space and trim.
pub fn normalize(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`normalize`] for cells that may be absent; `None` maps to `""`.
pub fn normalize_opt(value: Option<&str>) -> String {
    value.map(normalize).unwrap_or_default()
}

/// ASCII form of a decimal digit; full-width `０`–`９` map to `0`–`9`.
pub fn ascii_digit(c: char) -> Option<char> {
    match c {
        '0'..='9' => Some(c),
        '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32),
        _ => None,
    }
}

/// Parse a decimal number whose digits may be full-width.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let ascii: String = text.chars().map(|c| ascii_digit(c).unwrap_or(c)).collect();
    ascii.parse().ok()
}
