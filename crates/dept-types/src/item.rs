//! Item type: one element of a container's ordered sequence.

use chrono::{DateTime, SecondsFormat, Utc};

/// A single item held by a container.
///
/// Items are heterogeneous but every operation knows how to treat each
/// variant, usually through [`Item::to_text`].
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// Placeholder for a missing item (e.g. `at` past the end).
    Undefined,
    Text(String),
    Number(f64),
    /// A nested sequence, produced by `split` or by collapsing branches.
    List(Vec<Item>),
    /// Raw file contents that were not valid UTF-8.
    Bytes(Vec<u8>),
    /// A point in time (file birth time from `date`).
    Time(DateTime<Utc>),
}

impl Item {
    /// The string form used by every text-oriented operation.
    pub fn to_text(&self) -> String {
        match self {
            Item::Undefined => "undefined".to_string(),
            Item::Text(s) => s.clone(),
            Item::Number(n) => format_number(*n),
            Item::List(items) => items
                .iter()
                .map(Item::to_text)
                .collect::<Vec<_>>()
                .join(","),
            Item::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Item::Time(t) => t.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// The raw bytes this item contributes when written to a file.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Item::Bytes(bytes) => bytes.clone(),
            other => other.to_text().into_bytes(),
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Item::Undefined => "undefined",
            Item::Text(_) => "text",
            Item::Number(_) => "number",
            Item::List(_) => "list",
            Item::Bytes(_) => "bytes",
            Item::Time(_) => "time",
        }
    }

    pub fn as_list(&self) -> Option<&[Item]> {
        match self {
            Item::List(items) => Some(items),
            _ => None,
        }
    }

    /// Decode file contents: text when valid UTF-8, bytes otherwise.
    pub fn from_contents(data: Vec<u8>) -> Self {
        match String::from_utf8(data) {
            Ok(text) => Item::Text(text),
            Err(e) => Item::Bytes(e.into_bytes()),
        }
    }
}

impl From<&str> for Item {
    fn from(s: &str) -> Self {
        Item::Text(s.to_string())
    }
}

impl From<String> for Item {
    fn from(s: String) -> Self {
        Item::Text(s)
    }
}

impl From<f64> for Item {
    fn from(n: f64) -> Self {
        Item::Number(n)
    }
}

impl From<i64> for Item {
    fn from(n: i64) -> Self {
        Item::Number(n as f64)
    }
}

impl From<i32> for Item {
    fn from(n: i32) -> Self {
        Item::Number(f64::from(n))
    }
}

impl From<Vec<Item>> for Item {
    fn from(items: Vec<Item>) -> Self {
        Item::List(items)
    }
}

impl From<Vec<u8>> for Item {
    fn from(bytes: Vec<u8>) -> Self {
        Item::Bytes(bytes)
    }
}

impl From<DateTime<Utc>> for Item {
    fn from(t: DateTime<Utc>) -> Self {
        Item::Time(t)
    }
}

/// Format a number the way a script console would: integral values have no
/// decimal point, and non-finite values are spelled out.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Parse the longest leading float in `s`, ignoring leading whitespace.
///
/// Returns `NaN` when no number starts the string. Trailing garbage is
/// ignored, so `"12px"` parses as `12`.
pub fn parse_float_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return f64::NAN;
    }

    // Exponent only counts when followed by at least one digit
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}
