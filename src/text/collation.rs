//! Locale-aware ordering of user characters.
//!
//! Characters are compared through sort keys rather than code points, so
//! that `é` written as one code point and `e` + U+0301 are the same letter,
//! and `ñ` sorts where a Spanish reader expects it.
//!
//! The default [`LocaleCollation`] builds a four-level key:
//! 1. primary: base letters, case- and accent-folded (with locale tailorings)
//! 2. secondary: combining marks attached to each base letter
//! 3. tertiary: letter case (lowercase first)
//! 4. identical: the NFC code points
//!
//! Because the last level is the canonical composition of the source,
//! two strings have equal keys exactly when they are canonically equivalent.
//! Any other ordering can be plugged in by implementing [`Collation`].

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Serialize, Serializer};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::locale::Locale;

/// Separator between key levels; lower than every weight.
const LEVEL_SEPARATOR: u32 = 0;

/// Separator between the mark groups of consecutive base letters.
const MARK_SEPARATOR: u32 = 1;

/// An opaque, totally ordered collation key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey(Vec<u32>);

impl SortKey {
    /// Wraps raw weights. Custom [`Collation`]s use this to build their keys.
    pub fn from_weights(weights: Vec<u32>) -> Self {
        Self(weights)
    }

    /// Returns the raw weights.
    pub fn weights(&self) -> &[u32] {
        &self.0
    }
}

/// A pluggable total order over strings.
///
/// Equality of two keys must mean the strings are the same letter(s) for
/// analysis purposes; ordering is used for every sorted structure.
pub trait Collation: Send + Sync {
    /// Computes the sort key of `text`.
    fn sort_key(&self, text: &str) -> SortKey;
}

/// Default collation: accent/case-insensitive primary order with
/// per-language letter tailorings.
#[derive(Debug, Clone)]
pub struct LocaleCollation {
    tailoring: HashMap<char, u32>,
}

/// Primary weight of an untailored lowercase base letter.
fn base_weight(c: char) -> u32 {
    (c as u32 + 1) << 8
}

impl LocaleCollation {
    /// Creates the collation for `locale`.
    pub fn new(locale: &Locale) -> Self {
        let mut tailoring = HashMap::new();

        match locale.language() {
            "es" => {
                tailoring.insert('ñ', base_weight('n') + 0x80);
            }
            "sv" | "fi" => {
                for (i, c) in ['å', 'ä', 'ö'].into_iter().enumerate() {
                    tailoring.insert(c, base_weight('z') + 0x80 + i as u32);
                }
            }
            "da" | "no" | "nb" | "nn" => {
                for (i, c) in ['æ', 'ø', 'å'].into_iter().enumerate() {
                    tailoring.insert(c, base_weight('z') + 0x80 + i as u32);
                }
            }
            _ => {}
        }

        Self { tailoring }
    }
}

impl Collation for LocaleCollation {
    fn sort_key(&self, text: &str) -> SortKey {
        let composed: Vec<char> = text.nfc().collect();

        let mut primary = Vec::with_capacity(composed.len());
        let mut secondary = Vec::with_capacity(composed.len() * 2);
        let mut tertiary = Vec::with_capacity(composed.len());

        for &c in &composed {
            tertiary.push(if c.is_uppercase() { 2 } else { 1 });

            for lower in c.to_lowercase() {
                if let Some(&weight) = self.tailoring.get(&lower) {
                    primary.push(weight);
                    secondary.push(MARK_SEPARATOR);
                    continue;
                }

                for d in lower.to_string().nfd() {
                    if is_combining_mark(d) && !primary.is_empty() {
                        secondary.push(d as u32 + 2);
                    } else {
                        if !primary.is_empty() {
                            secondary.push(MARK_SEPARATOR);
                        }
                        primary.push(base_weight(d));
                    }
                }
            }
        }
        if !primary.is_empty() {
            secondary.push(MARK_SEPARATOR);
        }

        let mut weights =
            Vec::with_capacity(primary.len() + secondary.len() + tertiary.len() + composed.len() + 3);
        weights.extend(primary);
        weights.push(LEVEL_SEPARATOR);
        weights.extend(secondary);
        weights.push(LEVEL_SEPARATOR);
        weights.extend(tertiary);
        weights.push(LEVEL_SEPARATOR);
        weights.extend(composed.iter().map(|&c| c as u32));

        SortKey(weights)
    }
}

/// A locale plus the collation used to key strings in that locale.
#[derive(Clone)]
pub struct Collator {
    locale: Locale,
    collation: Arc<dyn Collation>,
}

impl Collator {
    /// Creates the default collator for `locale`.
    pub fn for_locale(locale: Locale) -> Self {
        let collation = Arc::new(LocaleCollation::new(&locale));
        Self { locale, collation }
    }

    /// Creates a collator backed by a custom ordering.
    pub fn with_collation(locale: Locale, collation: impl Collation + 'static) -> Self {
        Self {
            locale,
            collation: Arc::new(collation),
        }
    }

    /// Returns the locale this collator was built for.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Builds the key for `text`.
    pub fn key(&self, text: &str) -> CharKey {
        CharKey {
            key: self.collation.sort_key(text),
            source: text.to_string(),
        }
    }

    /// Compares two strings under this collation.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.collation.sort_key(a).cmp(&self.collation.sort_key(b))
    }

    /// True if both strings collate equal.
    pub fn equal(&self, a: &str, b: &str) -> bool {
        self.compare(a, b) == Ordering::Equal
    }

    /// Sorts strings in collation order.
    pub fn sort(&self, items: &mut [String]) {
        items.sort_by_cached_key(|s| self.collation.sort_key(s));
    }

    /// Re-keys `key` under this collator, keeping its source text.
    pub fn rekey(&self, key: &CharKey) -> CharKey {
        self.key(key.as_str())
    }
}

impl Default for Collator {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}

impl fmt::Debug for Collator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collator")
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}

/// A user character (or short sequence) together with its collation key.
///
/// Equality, ordering and hashing use only the key, so two spellings of the
/// same letter are interchangeable. The original text is kept for display
/// and round-trip reconstruction.
#[derive(Clone)]
pub struct CharKey {
    source: String,
    key: SortKey,
}

impl CharKey {
    /// Returns the source text this key was built from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the collation key.
    pub fn sort_key(&self) -> &SortKey {
        &self.key
    }

    /// True if the first code point is whitespace.
    pub fn is_whitespace(&self) -> bool {
        self.source.chars().next().is_some_and(char::is_whitespace)
    }

    /// True if the first code point is a control character.
    pub fn is_control(&self) -> bool {
        self.source.chars().next().is_some_and(char::is_control)
    }
}

impl PartialEq for CharKey {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for CharKey {}

impl PartialOrd for CharKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CharKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Hash for CharKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for CharKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CharKey({:?})", self.source)
    }
}

impl fmt::Display for CharKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for CharKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collator(lang: &str) -> Collator {
        Collator::for_locale(lang.parse().unwrap())
    }

    #[test]
    fn test_canonically_equivalent_strings_are_equal() {
        let c = collator("en");
        assert!(c.equal("é", "e\u{301}"));
        assert_eq!(c.key("é"), c.key("e\u{301}"));
    }

    #[test]
    fn test_case_and_accent_are_distinct() {
        let c = collator("en");
        assert!(!c.equal("a", "A"));
        assert!(!c.equal("a", "á"));
    }

    #[test]
    fn test_linguistic_order() {
        let c = collator("en");
        // Code point order would put 'B' before 'a' and 'á' after 'z'
        assert_eq!(c.compare("a", "B"), Ordering::Less);
        assert_eq!(c.compare("á", "b"), Ordering::Less);
        assert_eq!(c.compare("a", "á"), Ordering::Less);
        assert_eq!(c.compare("a", "A"), Ordering::Less);
        assert_eq!(c.compare("ab", "b"), Ordering::Less);
        assert_eq!(c.compare("a", "ab"), Ordering::Less);
    }

    #[test]
    fn test_spanish_enye_tailoring() {
        let es = collator("es");
        assert_eq!(es.compare("ñ", "nz"), Ordering::Greater);
        assert_eq!(es.compare("ñ", "o"), Ordering::Less);
        assert_eq!(es.compare("n", "ñ"), Ordering::Less);

        // Without tailoring ñ is an accented n and sorts before "nz"
        let en = collator("en");
        assert_eq!(en.compare("ñ", "nz"), Ordering::Less);
    }

    #[test]
    fn test_swedish_letters_after_z() {
        let sv = collator("sv");
        assert_eq!(sv.compare("z", "å"), Ordering::Less);
        assert_eq!(sv.compare("å", "ä"), Ordering::Less);
        assert_eq!(sv.compare("ä", "ö"), Ordering::Less);
    }

    #[test]
    fn test_sort_strings() {
        let c = collator("en");
        let mut items = vec!["b".to_string(), "A".to_string(), "a".to_string(), "á".to_string()];
        c.sort(&mut items);
        assert_eq!(items, vec!["a", "A", "á", "b"]);
    }

    #[test]
    fn test_custom_collation() {
        #[derive(Debug)]
        struct CodePoints;
        impl Collation for CodePoints {
            fn sort_key(&self, text: &str) -> SortKey {
                SortKey::from_weights(text.chars().map(|c| c as u32).collect())
            }
        }

        let c = Collator::with_collation(Locale::default(), CodePoints);
        assert_eq!(c.compare("B", "a"), Ordering::Less);
        assert!(!c.equal("é", "e\u{301}"));
    }

    #[test]
    fn test_char_key_classification() {
        let c = collator("en");
        assert!(c.key(" ").is_whitespace());
        assert!(c.key("\n").is_control());
        assert!(c.key("\r\n").is_whitespace());
        assert!(!c.key("a").is_whitespace());
        assert!(!c.key("a").is_control());
    }
}
