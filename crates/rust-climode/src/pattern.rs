//! Prompt patterns.
//!
//! A [`PromptPattern`] is a compiled regular expression that remembers its
//! source text. The source is what gets offered to the transport, the
//! compiled form is what the engine uses locally (error detection, pager
//! detection in tests, section headers).

use std::fmt;

use regex::Regex;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// A compiled prompt pattern.
#[derive(Clone)]
pub struct PromptPattern {
    source: String,
    regex: Regex,
}

impl PromptPattern {
    /// Compile a pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the regex pattern is invalid.
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = Regex::new(&source)?;
        Ok(Self { source, regex })
    }

    /// Build a pattern matching `text` literally.
    #[must_use]
    pub fn literal(text: &str) -> Self {
        let source = regex::escape(text);
        let regex = Regex::new(&source).unwrap_or_else(|_| unreachable!("escaped literal"));
        Self { source, regex }
    }

    /// The pattern source, as offered to the transport.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The compiled regex.
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Check if the pattern matches anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Number of capture groups, including the implicit group 0.
    #[must_use]
    pub fn captures_len(&self) -> usize {
        self.regex.captures_len()
    }

    /// Search `text`, returning whether it matched and the first group.
    ///
    /// `None` means no match; `Some(None)` a match without a first group.
    #[must_use]
    pub fn find_with_detail(&self, text: &str) -> Option<Option<String>> {
        self.regex
            .captures(text)
            .map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
    }

    /// The prompt source with its first capturing group pinned to `literal`.
    ///
    /// The body of the first capturing group is replaced by the escaped
    /// literal, so `^([\w-]+)#\s*$` pinned to `core-1` becomes
    /// `^(core\-1)#\s*$`. Without a capturing group the result is the
    /// escaped literal as a single group.
    #[must_use]
    pub fn pinned_source(&self, literal: &str) -> String {
        pin_first_group(&self.source, literal)
            .unwrap_or_else(|| format!("({})", regex::escape(literal)))
    }
}

impl fmt::Debug for PromptPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PromptPattern({:?})", self.source)
    }
}

impl fmt::Display for PromptPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for PromptPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for PromptPattern {}

impl TryFrom<&str> for PromptPattern {
    type Error = regex::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Regex> for PromptPattern {
    fn from(regex: Regex) -> Self {
        Self {
            source: regex.as_str().to_string(),
            regex,
        }
    }
}

impl Serialize for PromptPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for PromptPattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PatternVisitor;

        impl Visitor<'_> for PatternVisitor {
            type Value = PromptPattern;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a regular expression string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                PromptPattern::new(v).map_err(|e| E::custom(format!("invalid regex '{v}': {e}")))
            }
        }

        deserializer.deserialize_str(PatternVisitor)
    }
}

/// Locate the body of the first capturing group in a regex source.
///
/// Returns the byte range between the group header and its closing
/// parenthesis. Escapes, character classes and non-capturing groups are
/// skipped.
fn first_group_body(source: &str) -> Option<(usize, usize)> {
    let bytes = source.as_bytes();
    let mut i = 0;
    let mut in_class = false;
    let mut start = None;
    let mut depth = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'[' if !in_class => {
                in_class = true;
                // A ']' right after '[' or '[^' is a literal member.
                if bytes.get(i + 1) == Some(&b'^') {
                    i += 1;
                }
                if bytes.get(i + 1) == Some(&b']') {
                    i += 1;
                }
            }
            b']' if in_class => in_class = false,
            b'(' if !in_class => {
                if start.is_some() {
                    depth += 1;
                } else if let Some(header_len) = capturing_header_len(&source[i..]) {
                    start = Some(i + header_len);
                    depth = 0;
                    i += header_len;
                    continue;
                }
            }
            b')' if !in_class => {
                if let Some(body_start) = start {
                    if depth == 0 {
                        return Some((body_start, i));
                    }
                    depth -= 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Length of a capturing group header at the start of `rest`.
///
/// `rest` starts with `(`. Returns `None` for non-capturing groups,
/// look-arounds and inline flag groups.
fn capturing_header_len(rest: &str) -> Option<usize> {
    let after = &rest[1..];
    if !after.starts_with('?') {
        return Some(1);
    }
    for prefix in ["?P<", "?<"] {
        if let Some(name) = after.strip_prefix(prefix) {
            if name.starts_with('=') || name.starts_with('!') {
                return None;
            }
            let close = name.find('>')?;
            return Some(1 + prefix.len() + close + 1);
        }
    }
    None
}

/// Replace the body of the first capturing group with an escaped literal.
fn pin_first_group(source: &str, literal: &str) -> Option<String> {
    let (start, end) = first_group_body(source)?;
    let mut pinned = String::with_capacity(source.len() + literal.len());
    pinned.push_str(&source[..start]);
    pinned.push_str(&regex::escape(literal));
    pinned.push_str(&source[end..]);
    Some(pinned)
}
