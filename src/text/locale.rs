//! Locale identifiers.
//!
//! A locale selects the collation tailoring and the case mapping used when
//! comparing user characters. Only the language and the optional country are
//! kept; anything after them (`.UTF-8`, `@euro`) is discarded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Default language when none is given.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A language plus an optional country, e.g. `es_MX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    country: Option<String>,
}

impl Locale {
    /// Creates a locale from a language code and an optional country code.
    pub fn new(language: &str, country: Option<&str>) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            country: country
                .filter(|c| !c.is_empty())
                .map(|c| c.to_ascii_uppercase()),
        }
    }

    /// Returns the ISO 639 language code (lowercase).
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Returns the ISO 3166 country code (uppercase), if any.
    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// True for languages whose dotted and dotless i are distinct letters.
    fn has_dotted_i(&self) -> bool {
        matches!(self.language.as_str(), "tr" | "az")
    }

    /// Lowercases `s` following this locale's case rules.
    pub fn to_lowercase(&self, s: &str) -> String {
        if self.has_dotted_i() {
            s.chars()
                .map(|c| match c {
                    'I' => "ı".to_string(),
                    'İ' => "i".to_string(),
                    other => other.to_lowercase().collect(),
                })
                .collect()
        } else {
            s.to_lowercase()
        }
    }

    /// Uppercases `s` following this locale's case rules.
    pub fn to_uppercase(&self, s: &str) -> String {
        if self.has_dotted_i() {
            s.chars()
                .map(|c| match c {
                    'i' => "İ".to_string(),
                    'ı' => "I".to_string(),
                    other => other.to_uppercase().collect(),
                })
                .collect()
        } else {
            s.to_uppercase()
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE, None)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}_{}", self.language, country),
            None => write!(f, "{}", self.language),
        }
    }
}

/// Error returned when a locale identifier cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLocaleError(pub String);

impl fmt::Display for ParseLocaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid locale identifier: '{}'", self.0)
    }
}

impl std::error::Error for ParseLocaleError {}

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Drop encoding and modifier suffixes ("es_ES.UTF-8@euro")
        let base = s.split(['.', '@']).next().unwrap_or("").trim();
        let mut parts = base.split(['_', '-']);

        let language = parts.next().unwrap_or("");
        if language.len() < 2
            || language.len() > 3
            || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ParseLocaleError(s.to_string()));
        }

        let country = parts.next();
        if let Some(c) = country {
            if c.is_empty() || !c.chars().all(|ch| ch.is_ascii_alphanumeric()) {
                return Err(ParseLocaleError(s.to_string()));
            }
        }

        Ok(Locale::new(language, country))
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language_only() {
        let loc: Locale = "ES".parse().unwrap();
        assert_eq!(loc.language(), "es");
        assert_eq!(loc.country(), None);
        assert_eq!(loc.to_string(), "es");
    }

    #[test]
    fn test_parse_with_country() {
        let a: Locale = "es_MX".parse().unwrap();
        let b: Locale = "es-mx".parse().unwrap();
        let c: Locale = "es_MX.UTF-8".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.country(), Some("MX"));
        assert_eq!(a.to_string(), "es_MX");
    }

    #[test]
    fn test_parse_invalid() {
        assert!("".parse::<Locale>().is_err());
        assert!("x".parse::<Locale>().is_err());
        assert!("e1".parse::<Locale>().is_err());
        assert!("es_".parse::<Locale>().is_err());
    }

    #[test]
    fn test_turkish_case_mapping() {
        let tr: Locale = "tr".parse().unwrap();
        assert_eq!(tr.to_lowercase("I"), "ı");
        assert_eq!(tr.to_uppercase("i"), "İ");

        let en = Locale::default();
        assert_eq!(en.to_lowercase("I"), "i");
        assert_eq!(en.to_uppercase("i"), "I");
    }

    #[test]
    fn test_serde_as_string() {
        let loc: Locale = "de_AT".parse().unwrap();
        let json = serde_json::to_string(&loc).unwrap();
        assert_eq!(json, "\"de_AT\"");
        let back: Locale = serde_json::from_str(&json).unwrap();
        assert_eq!(back, loc);
    }
}
