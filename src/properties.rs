//! Loader for the `.properties` text format: one `key=value` entry per
//! logical line. Supports `#`/`!` comments, `=`, `:` or whitespace
//! separators, backslash line continuations and the usual escapes including
//! `\uXXXX`.

use std::collections::HashMap;
use std::io::Read;

use regex::Regex;

use crate::error::{AddContext, UCError};
use crate::Result;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Properties(HashMap<String, String>);

impl Properties {
    pub fn new() -> Self {
        Properties(HashMap::new())
    }

    /// Read the whole stream and parse it. Content that is not valid UTF-8 is
    /// decoded as ISO-8859-1, the historical encoding of the format.
    pub fn load<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|err| UCError::TransportError(err.to_string()))
            .err_context("Could not read properties stream")?;
        let text = match String::from_utf8(data) {
            Ok(text) => text,
            Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
        };
        Self::parse(&text)
    }

    pub fn parse(data: &str) -> Result<Self> {
        lazy_static! {
            static ref RE_ENTRY: Regex =
                Regex::new(r"^(?P<key>(?:\\.|[^=:\s\\])*)(?:\s*[=:]\s*|\s+)?(?P<value>.*)$")
                    .unwrap();
        }
        let mut properties = Properties::new();
        for line in logical_lines(data) {
            let captures = RE_ENTRY.captures(&line).ok_or_else(|| {
                UCError::FormatError(format!("Malformed properties line: {}", line))
            })?;
            let key = unescape(&captures["key"])?;
            let value = unescape(&captures["value"])?;
            properties.set(key, value);
        }
        Ok(properties)
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    /// Comma separated value split into trimmed, non-empty items.
    pub fn get_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Joins continuation lines and drops blanks and comments. Leading whitespace
// of every natural line is not significant.
fn logical_lines(data: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut continued = false;
    for raw in data.lines() {
        let line = raw.trim_start();
        if !continued && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }
        let trailing_backslashes = line.chars().rev().take_while(|c| *c == '\\').count();
        if trailing_backslashes % 2 == 1 {
            current.push_str(&line[..line.len() - 1]);
            continued = true;
            continue;
        }
        current.push_str(line);
        lines.push(std::mem::take(&mut current));
        continued = false;
    }
    if continued && !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn unescape(escaped: &str) -> Result<String> {
    let mut unescaped = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => unescaped.push('\t'),
            Some('n') => unescaped.push('\n'),
            Some('r') => unescaped.push('\r'),
            Some('f') => unescaped.push('\u{000C}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        UCError::FormatError(format!("Malformed \\uxxxx encoding: \\u{}", hex))
                    })?;
                unescaped.push(code);
            }
            Some(other) => unescaped.push(other),
            None => {}
        }
    }
    Ok(unescaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separators() {
        let data = "a=1\nb: 2\nc 3\nd   =   4\ne\n";
        let properties = Properties::parse(data).unwrap();
        assert_eq!(Some("1"), properties.get("a"));
        assert_eq!(Some("2"), properties.get("b"));
        assert_eq!(Some("3"), properties.get("c"));
        assert_eq!(Some("4"), properties.get("d"));
        assert_eq!(Some(""), properties.get("e"));
        assert_eq!(5, properties.len());
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let data = "# comment\n! another\n\n   \nkey=value\n";
        let properties = Properties::parse(data).unwrap();
        assert_eq!(1, properties.len());
        assert_eq!(Some("value"), properties.get("key"));
    }

    #[test]
    fn test_value_keeps_separators_after_first() {
        let properties = Properties::parse("url=http://host:9000/a=b").unwrap();
        assert_eq!(Some("http://host:9000/a=b"), properties.get("url"));
    }

    #[test]
    fn test_line_continuation() {
        let data = "plugins=java,\\\n    findbugs,\\\n    pmd\nnext=1";
        let properties = Properties::parse(data).unwrap();
        assert_eq!(Some("java,findbugs,pmd"), properties.get("plugins"));
        assert_eq!(Some("1"), properties.get("next"));
    }

    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        let data = "path=c:\\\\\nother=x";
        let properties = Properties::parse(data).unwrap();
        assert_eq!(Some("c:\\"), properties.get("path"));
        assert_eq!(Some("x"), properties.get("other"));
    }

    #[test]
    fn test_escapes() {
        let data = "key\\ with\\=sep=tab\\there \\u00e9";
        let properties = Properties::parse(data).unwrap();
        assert_eq!(Some("tab\there é"), properties.get("key with=sep"));
    }

    #[test]
    fn test_malformed_unicode_escape_is_format_error() {
        let err = Properties::parse("key=\\u12").unwrap_err();
        match err.downcast_ref::<UCError>() {
            Some(UCError::FormatError(_)) => (),
            _ => panic!("Expected FormatError"),
        }
    }

    #[test]
    fn test_later_entries_override_earlier_ones() {
        let properties = Properties::parse("a=1\na=2").unwrap();
        assert_eq!(Some("2"), properties.get("a"));
    }

    #[test]
    fn test_get_list() {
        let properties = Properties::parse("versions=1.0, 1.1,,2.0 ").unwrap();
        assert_eq!(vec!["1.0", "1.1", "2.0"], properties.get_list("versions"));
        assert!(properties.get_list("missing").is_empty());
    }

    #[test]
    fn test_load_latin1_stream() {
        let bytes: &[u8] = b"name=caf\xe9";
        let properties = Properties::load(bytes).unwrap();
        assert_eq!(Some("café"), properties.get("name"));
    }
}
