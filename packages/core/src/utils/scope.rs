//! Scope pointer dialect
//!
//! UI schema controls address their property with a JSON-Pointer-like scope:
//! `#/properties/<seg1>/properties/<seg2>/.../properties/<key>`.
//! Derivation generates these strings and import parses them back, so both
//! directions go through `ScopePath`.
//!
//! Segments are escaped the JSON Pointer way (`~` as `~0`, `/` as `~1`).

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

static SCOPE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:/properties/[^/]+)*$").unwrap());

static SEGMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/properties/([^/]+)").unwrap());

/// Scope string that does not follow the `#/properties/...` dialect
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid scope '{0}': expected #/properties/<key>[/properties/<key>...]")]
pub struct ScopeParseError(pub String);

/// Property path from the document root, one segment per schema level
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ScopePath {
    segments: Vec<String>,
}

impl ScopePath {
    /// The document root (`#`)
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Path one level deeper
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(key.to_string());
        Self { segments }
    }

    /// Render as a scope pointer
    pub fn to_pointer(&self) -> String {
        self.to_string()
    }

    /// Parse a scope pointer
    ///
    /// # Errors
    ///
    /// `ScopeParseError` when the input is not `#` followed by zero or more
    /// `/properties/<segment>` groups.
    pub fn parse(input: &str) -> Result<Self, ScopeParseError> {
        if !SCOPE_PATTERN.is_match(input) {
            return Err(ScopeParseError(input.to_string()));
        }

        let segments = SEGMENT_PATTERN
            .captures_iter(input)
            .map(|caps| unescape(&caps[1]))
            .collect();
        Ok(Self { segments })
    }
}

impl fmt::Display for ScopePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#")?;
        for segment in &self.segments {
            f.write_str("/properties/")?;
            f.write_str(&escape(segment))?;
        }
        Ok(())
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_pointer() {
        let path = ScopePath::root().child("address").child("city");
        assert_eq!(path.to_pointer(), "#/properties/address/properties/city");
        assert_eq!(path.last(), Some("city"));
    }

    #[test]
    fn test_parse_matches_generation() {
        let path = ScopePath::parse("#/properties/address/properties/city").unwrap();
        assert_eq!(path.segments(), ["address".to_string(), "city".to_string()]);

        let root = ScopePath::parse("#").unwrap();
        assert!(root.is_root());
    }

    #[test]
    fn test_escaped_segments() {
        let path = ScopePath::root().child("a/b").child("c~d");
        let pointer = path.to_pointer();
        assert_eq!(pointer, "#/properties/a~1b/properties/c~0d");
        assert_eq!(ScopePath::parse(&pointer).unwrap(), path);
    }

    #[test]
    fn test_rejects_other_dialects() {
        assert!(ScopePath::parse("#/items/0").is_err());
        assert!(ScopePath::parse("properties/name").is_err());
        assert!(ScopePath::parse("#/properties/").is_err());
        assert!(ScopePath::parse("#/properties/a/").is_err());
    }
}
