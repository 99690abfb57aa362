//! Ignore patterns for excluding named objects from comparison
//!
//! Patterns have the form `[kind:]wildcard`. The kind is an object selector
//! (`table`, `column`, ...) or `*`; omitting it means every kind. In the
//! wildcard, `*` matches any run of characters and `?` exactly one. Matching
//! is case-sensitive and anchored to the whole name.

use crate::error::{Error, Result};
use crate::schema::ObjectKind;
use regex::Regex;

/// Which object kinds a pattern applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindSelector {
    /// Every kind
    Any,

    /// One kind only
    Kind(ObjectKind),
}

impl KindSelector {
    fn matches(&self, kind: ObjectKind) -> bool {
        match self {
            Self::Any => true,
            Self::Kind(selected) => *selected == kind,
        }
    }
}

/// A single compiled ignore pattern
#[derive(Debug, Clone)]
pub struct IgnorePattern {
    /// Original pattern text, prefix included
    pub source: String,

    pub selector: KindSelector,

    matcher: Regex,
}

impl IgnorePattern {
    /// Compile one `[kind:]wildcard` pattern
    pub fn parse(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(Error::invalid_pattern(pattern, "pattern is empty"));
        }

        let (selector, wildcard) = match pattern.split_once(':') {
            Some(("*", wildcard)) => (KindSelector::Any, wildcard),
            Some((kind, wildcard)) => {
                let kind = ObjectKind::from_selector(kind).ok_or_else(|| {
                    Error::invalid_pattern(pattern, format!("unknown object kind '{}'", kind))
                })?;
                (KindSelector::Kind(kind), wildcard)
            }
            None => (KindSelector::Any, pattern),
        };

        if wildcard.is_empty() {
            return Err(Error::invalid_pattern(pattern, "name pattern is empty"));
        }

        let matcher = Regex::new(&wildcard_to_regex(wildcard))
            .map_err(|e| Error::invalid_pattern(pattern, e.to_string()))?;

        Ok(Self {
            source: pattern.to_string(),
            selector,
            matcher,
        })
    }

    /// Check whether this pattern ignores `name` of the given kind
    pub fn matches(&self, kind: ObjectKind, name: &str) -> bool {
        self.selector.matches(kind) && self.matcher.is_match(name)
    }
}

/// A compiled set of ignore patterns
///
/// Immutable once built, so it can be shared across threads freely.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilter {
    patterns: Vec<IgnorePattern>,
}

impl IgnoreFilter {
    /// Compile every pattern, failing on the first malformed one
    pub fn compile<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| IgnorePattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// A filter that ignores nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check whether an object should be excluded
    pub fn should_ignore(&self, kind: ObjectKind, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(kind, name))
    }

    /// Keep only the items this filter does not ignore
    pub fn retain<'a, T>(
        &self,
        kind: ObjectKind,
        items: &'a [T],
        name_of: impl Fn(&T) -> &str,
    ) -> Vec<&'a T> {
        items
            .iter()
            .filter(|item| !self.should_ignore(kind, name_of(item)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn patterns(&self) -> &[IgnorePattern] {
        &self.patterns
    }
}

/// Translate a wildcard into an anchored regex with all literals escaped
fn wildcard_to_regex(wildcard: &str) -> String {
    let mut regex = String::with_capacity(wildcard.len() + 8);
    regex.push_str("(?s)^");

    let mut literal = [0u8; 4];
    for ch in wildcard.chars() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            _ => regex.push_str(&regex::escape(ch.encode_utf8(&mut literal))),
        }
    }

    regex.push('$');
    regex
}
