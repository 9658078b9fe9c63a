//! Placeholder tokens of the form `{name}`

use std::ops::Range;

use docgen_core::PlaceholderData;
use regex::Regex;

use crate::error::Result;

/// Names may use letters, digits, `_`, `.` and `-`; spaces inside the braces
/// are ignored.
const TOKEN_PATTERN: &str = r"\{\s*([A-Za-z0-9_.\-]+)\s*\}";

/// A token found in plain text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Byte range of the whole token, braces included
    pub span: Range<usize>,
    pub name: &'a str,
}

/// Placeholder token matcher
#[derive(Debug, Clone)]
pub struct Tokens {
    pattern: Regex,
}

impl Tokens {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(TOKEN_PATTERN)?,
        })
    }

    /// All tokens in `text`, left to right
    pub fn find<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let name = caps.get(1)?;
                Some(Token {
                    span: whole.range(),
                    name: name.as_str(),
                })
            })
            .collect()
    }

    /// Append names found in `text` that are not in `names` yet
    pub fn collect_names(&self, text: &str, names: &mut Vec<String>) {
        for token in self.find(text) {
            if !names.iter().any(|n| n == token.name) {
                names.push(token.name.to_string());
            }
        }
    }

    /// Value substituted for `name`; unknown names render empty
    pub fn value<'d>(name: &str, data: &'d PlaceholderData) -> &'d str {
        data.get(name).map(String::as_str).unwrap_or_default()
    }
}
