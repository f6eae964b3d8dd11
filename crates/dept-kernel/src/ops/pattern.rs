//! Delimiter/search patterns for `split` and `replace`.

use regex::Regex;

/// Literal text or a compiled regex.
#[derive(Debug, Clone)]
pub enum Pattern {
    Literal(String),
    Regex(Regex),
}

impl Pattern {
    /// Compile a regex pattern.
    pub fn regex(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Pattern::Regex)
    }

    /// Split `text` into parts.
    ///
    /// An empty literal splits into characters.
    pub fn split(&self, text: &str) -> Vec<String> {
        match self {
            Pattern::Literal(delim) if delim.is_empty() => {
                text.chars().map(String::from).collect()
            }
            Pattern::Literal(delim) => text.split(delim.as_str()).map(String::from).collect(),
            Pattern::Regex(re) => re.split(text).map(String::from).collect(),
        }
    }

    /// Replace matches in `text`.
    ///
    /// A literal replaces its first occurrence; a regex replaces every match
    /// and may reference capture groups (`$1`).
    pub fn replace(&self, text: &str, with: &str) -> String {
        match self {
            Pattern::Literal(from) => text.replacen(from.as_str(), with, 1),
            Pattern::Regex(re) => re.replace_all(text, with).into_owned(),
        }
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Pattern::Literal(s.to_string())
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Pattern::Literal(s)
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Pattern::Regex(re)
    }
}

/// Split on `\n`, dropping a `\r` before each break.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_split() {
        assert_eq!(Pattern::from(",").split("a,b,,c"), vec!["a", "b", "", "c"]);
        assert_eq!(Pattern::from("").split("héy"), vec!["h", "é", "y"]);
        assert_eq!(Pattern::from(",").split(""), vec![""]);
    }

    #[test]
    fn test_regex_split() {
        let p = Pattern::regex(r"\s+").unwrap();
        assert_eq!(p.split("a  b\tc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_replace_literal_first_only() {
        assert_eq!(Pattern::from("o").replace("foo", "0"), "f0o");
    }

    #[test]
    fn test_replace_regex_all_with_groups() {
        let p = Pattern::regex(r"(\d+)").unwrap();
        assert_eq!(p.replace("a1 b22", "<$1>"), "a<1> b<22>");
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\r\nb\nc\n"), vec!["a", "b", "c", ""]);
    }
}
