//! Display rendering for item sequences.

use crate::item::{format_number, Item};

/// Maximum number of bytes shown for a `Bytes` item before eliding.
const MAX_SHOWN_BYTES: usize = 50;

/// Render a sequence of items for display: `[ 'a', 1, [ 'b' ] ]`.
pub fn inspect(items: &[Item]) -> String {
    let mut out = String::new();
    write_list(&mut out, items);
    out
}

/// Render a single item (strings quoted).
pub fn inspect_item(item: &Item) -> String {
    let mut out = String::new();
    write_item(&mut out, item);
    out
}

/// Cut `text` to at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn write_list(out: &mut String, items: &[Item]) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }
    out.push_str("[ ");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_item(out, item);
    }
    out.push_str(" ]");
}

fn write_item(out: &mut String, item: &Item) {
    match item {
        Item::Undefined => out.push_str("undefined"),
        Item::Text(s) => write_quoted(out, s),
        Item::Number(n) => out.push_str(&format_number(*n)),
        Item::List(items) => write_list(out, items),
        Item::Bytes(bytes) => {
            out.push_str("<Buffer");
            for b in bytes.iter().take(MAX_SHOWN_BYTES) {
                out.push_str(&format!(" {b:02x}"));
            }
            if bytes.len() > MAX_SHOWN_BYTES {
                out.push_str(&format!(" ... {} more bytes", bytes.len() - MAX_SHOWN_BYTES));
            }
            out.push('>');
        }
        Item::Time(_) => out.push_str(&item.to_text()),
    }
}

fn write_quoted(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_flat() {
        let items = vec![Item::from("a"), Item::from(1), Item::Undefined];
        assert_eq!(inspect(&items), "[ 'a', 1, undefined ]");
    }

    #[test]
    fn test_inspect_empty() {
        assert_eq!(inspect(&[]), "[]");
    }

    #[test]
    fn test_inspect_nested_and_escaped() {
        let items = vec![Item::List(vec![Item::from("it's\n")]), Item::List(vec![])];
        assert_eq!(inspect(&items), r"[ [ 'it\'s\n' ], [] ]");
    }

    #[test]
    fn test_inspect_bytes() {
        assert_eq!(inspect_item(&Item::Bytes(vec![0x61, 0xff])), "<Buffer 61 ff>");
        let long = Item::Bytes(vec![0; 52]);
        assert!(inspect_item(&long).ends_with(" ... 2 more bytes>"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
