//! The "unknown" placeholder that tag editors write instead of a real value.

use serde::{Deserialize, Serialize};

/// Placeholder word most tag editors use for a missing artist or title.
pub const UNKNOWN: &str = "Unknown";

/// How a value is compared against the placeholder word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentinelMatch {
    /// Byte-for-byte equality.
    #[default]
    Exact,
    /// Equality after lower-casing both sides.
    IgnoreCase,
}

/// A placeholder word together with the comparison used at one call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinel {
    word: String,
    matching: SentinelMatch,
}

impl Sentinel {
    pub fn new(word: impl Into<String>, matching: SentinelMatch) -> Self {
        Self {
            word: word.into(),
            matching,
        }
    }

    /// `"Unknown"`, compared exactly.
    pub fn exact() -> Self {
        Self::new(UNKNOWN, SentinelMatch::Exact)
    }

    /// `"Unknown"`, compared case-insensitively.
    pub fn ignore_case() -> Self {
        Self::new(UNKNOWN, SentinelMatch::IgnoreCase)
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn matching(&self) -> SentinelMatch {
        self.matching
    }

    /// Whether `value` is the placeholder.
    pub fn matches(&self, value: &str) -> bool {
        match self.matching {
            SentinelMatch::Exact => value == self.word,
            SentinelMatch::IgnoreCase => value.to_lowercase() == self.word.to_lowercase(),
        }
    }

    /// Whether `value` carries no usable information: absent, empty, or the placeholder.
    pub fn is_vacant(&self, value: Option<&str>) -> bool {
        value.is_none_or(|v| v.is_empty() || self.matches(v))
    }
}

impl Default for Sentinel {
    fn default() -> Self {
        Self::exact()
    }
}
