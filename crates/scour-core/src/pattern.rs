use std::fmt;
use std::str::FromStr;

use crate::error::ScourError;

/// A base-name pattern with at most one interpreted `*`.
///
/// A pattern starting with `*` is a suffix match on the rest. A pattern with
/// a `*` anywhere else is split at the first `*` into a prefix and a suffix.
/// Everything after the interpreted wildcard is literal, so `*.local.*`
/// matches names ending in the text `.local.*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Exact(String),
    SuffixWildcard(String),
    PrefixSuffixWildcard { prefix: String, suffix: String },
}

impl Pattern {
    /// Parse a pattern. Empty patterns are rejected.
    pub fn parse(raw: &str) -> Result<Self, ScourError> {
        if raw.is_empty() {
            return Err(ScourError::InvalidPattern(raw.to_string()));
        }
        Ok(Self::new(raw))
    }

    /// Classify `raw` without validation. An empty string is an exact
    /// pattern that no base name matches.
    pub fn new(raw: &str) -> Self {
        if let Some(suffix) = raw.strip_prefix('*') {
            return Pattern::SuffixWildcard(suffix.to_string());
        }
        match raw.split_once('*') {
            Some((prefix, suffix)) => Pattern::PrefixSuffixWildcard {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            },
            None => Pattern::Exact(raw.to_string()),
        }
    }

    /// Test a base name against this pattern.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Pattern::Exact(exact) => name == exact,
            Pattern::SuffixWildcard(suffix) => name.ends_with(suffix.as_str()),
            Pattern::PrefixSuffixWildcard { prefix, suffix } => {
                name.len() >= prefix.len() + suffix.len()
                    && name.starts_with(prefix.as_str())
                    && name.ends_with(suffix.as_str())
            }
        }
    }
}

impl FromStr for Pattern {
    type Err = ScourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Exact(exact) => write!(f, "{exact}"),
            Pattern::SuffixWildcard(suffix) => write!(f, "*{suffix}"),
            Pattern::PrefixSuffixWildcard { prefix, suffix } => write!(f, "{prefix}*{suffix}"),
        }
    }
}

/// An ordered list of patterns; a name matches the set if any pattern matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self, ScourError> {
        let patterns = raw
            .iter()
            .map(|p| Pattern::parse(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Build a set from trusted built-in tables.
    pub fn from_static(raw: &[&'static str]) -> Self {
        Self {
            patterns: raw.iter().map(|p| Pattern::new(p)).collect(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
