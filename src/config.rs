//! Analysis configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::text::collation::CharKey;
use crate::text::locale::Locale;

/// Default minimum length of a reported Kasiski sequence.
pub const DEFAULT_KASISKI_MIN_LENGTH: usize = 2;

/// Which character classes are skipped before any statistic is taken.
///
/// Explicit ignore sets are applied on top of this filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Skip characters whose first code point is whitespace.
    pub ignore_whitespace: bool,
    /// Skip characters whose first code point is a control character.
    pub ignore_control: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignore_whitespace: true,
            ignore_control: true,
        }
    }
}

impl FilterConfig {
    /// A filter that lets every character through.
    pub fn accept_all() -> Self {
        Self {
            ignore_whitespace: false,
            ignore_control: false,
        }
    }

    /// True if `c` passes the whitespace/control rules.
    pub fn accepts(&self, c: &CharKey) -> bool {
        !((self.ignore_whitespace && c.is_whitespace()) || (self.ignore_control && c.is_control()))
    }
}

/// Settings for an analysis session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Locale of the ciphertext's language.
    pub locale: Locale,
    /// Character-class filter.
    pub filter: FilterConfig,
    /// Whether every substitution alphabet starts injective.
    pub injective: bool,
    /// Whether alphabets keep separate ignore sets.
    pub ignored_independent: bool,
    /// Shortest Kasiski sequence to report.
    pub kasiski_min_length: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            filter: FilterConfig::default(),
            injective: true,
            ignored_independent: false,
            kasiski_min_length: DEFAULT_KASISKI_MIN_LENGTH,
        }
    }
}

impl AnalyzerConfig {
    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::collation::Collator;

    #[test]
    fn test_default_filter_skips_whitespace_and_control() {
        let c = Collator::default();
        let filter = FilterConfig::default();
        assert!(filter.accepts(&c.key("a")));
        assert!(!filter.accepts(&c.key(" ")));
        assert!(!filter.accepts(&c.key("\u{7}")));
        assert!(FilterConfig::accept_all().accepts(&c.key(" ")));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AnalyzerConfig::from_json(r#"{ "locale": "es_MX", "injective": false }"#).unwrap();
        assert_eq!(config.locale.to_string(), "es_MX");
        assert!(!config.injective);
        assert_eq!(config.filter, FilterConfig::default());
        assert_eq!(config.kasiski_min_length, DEFAULT_KASISKI_MIN_LENGTH);
    }

    #[test]
    fn test_nested_filter_json() {
        let config =
            AnalyzerConfig::from_json(r#"{ "filter": { "ignore_whitespace": false } }"#).unwrap();
        assert!(!config.filter.ignore_whitespace);
        assert!(config.filter.ignore_control);
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(AnalyzerConfig::from_json("{ not json").is_err());
        assert!(AnalyzerConfig::from_json(r#"{ "locale": "?" }"#).is_err());
    }
}
