//! Sorted, duplicate-free character sets.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::text::collation::{CharKey, Collator};

/// Characters excluded from substitution and statistics.
pub type IgnoreSet = BTreeSet<CharKey>;

/// An ordered collection of distinct user characters.
///
/// Used for cipher alphabets and plain alphabets. Lookups are binary searches
/// in collation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Alphabet {
    chars: Vec<CharKey>,
}

impl Alphabet {
    /// Creates an empty alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an alphabet from strings, keyed with `collator`.
    pub fn from_strs<'a>(chars: impl IntoIterator<Item = &'a str>, collator: &Collator) -> Self {
        chars.into_iter().map(|c| collator.key(c)).collect()
    }

    /// Returns the number of characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns true if the alphabet is empty.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Returns the characters in order.
    pub fn as_slice(&self) -> &[CharKey] {
        &self.chars
    }

    /// Iterates over the characters in order.
    pub fn iter(&self) -> std::slice::Iter<'_, CharKey> {
        self.chars.iter()
    }

    /// Returns the character at `index`.
    pub fn get(&self, index: usize) -> Option<&CharKey> {
        self.chars.get(index)
    }

    /// True if `c` is in the alphabet.
    pub fn contains(&self, c: &CharKey) -> bool {
        self.chars.binary_search(c).is_ok()
    }

    /// Returns the position of `c`, if present.
    pub fn position(&self, c: &CharKey) -> Option<usize> {
        self.chars.binary_search(c).ok()
    }

    /// Inserts `c` at its sorted position.
    ///
    /// Returns the insertion index, or `None` if it was already present.
    pub fn insert(&mut self, c: CharKey) -> Option<usize> {
        match self.chars.binary_search(&c) {
            Ok(_) => None,
            Err(idx) => {
                self.chars.insert(idx, c);
                Some(idx)
            }
        }
    }

    /// Removes `c`, returning the index it occupied.
    pub fn remove(&mut self, c: &CharKey) -> Option<usize> {
        let idx = self.chars.binary_search(c).ok()?;
        self.chars.remove(idx);
        Some(idx)
    }

    /// Re-keys every character with `collator` and restores the order.
    pub fn recollate(&mut self, collator: &Collator) {
        let rekeyed: Alphabet = self.chars.iter().map(|c| collator.rekey(c)).collect();
        *self = rekeyed;
    }

    /// Returns the characters as a set.
    pub fn to_set(&self) -> BTreeSet<CharKey> {
        self.chars.iter().cloned().collect()
    }

    /// Returns the source strings in order.
    pub fn to_strings(&self) -> Vec<String> {
        self.chars.iter().map(|c| c.as_str().to_string()).collect()
    }
}

impl FromIterator<CharKey> for Alphabet {
    fn from_iter<I: IntoIterator<Item = CharKey>>(iter: I) -> Self {
        let mut chars: Vec<CharKey> = iter.into_iter().collect();
        chars.sort();
        chars.dedup();
        Self { chars }
    }
}

impl<'a> IntoIterator for &'a Alphabet {
    type Item = &'a CharKey;
    type IntoIter = std::slice::Iter<'a, CharKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.chars.iter()
    }
}

impl From<Alphabet> for Vec<CharKey> {
    fn from(alphabet: Alphabet) -> Self {
        alphabet.chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc(chars: &[&str]) -> (Alphabet, Collator) {
        let c = Collator::default();
        (Alphabet::from_strs(chars.iter().copied(), &c), c)
    }

    #[test]
    fn test_sorted_and_deduplicated() {
        let (alpha, _) = abc(&["c", "a", "b", "a", "e\u{301}", "é"]);
        assert_eq!(alpha.to_strings(), vec!["a", "b", "c", "e\u{301}"]);
    }

    #[test]
    fn test_insert_and_remove() {
        let (mut alpha, c) = abc(&["a", "c"]);

        assert_eq!(alpha.insert(c.key("b")), Some(1));
        assert_eq!(alpha.insert(c.key("b")), None);
        assert_eq!(alpha.to_strings(), vec!["a", "b", "c"]);

        assert_eq!(alpha.remove(&c.key("a")), Some(0));
        assert_eq!(alpha.remove(&c.key("a")), None);
        assert_eq!(alpha.len(), 2);
    }

    #[test]
    fn test_lookup() {
        let (alpha, c) = abc(&["x", "y"]);
        assert!(alpha.contains(&c.key("y")));
        assert!(!alpha.contains(&c.key("z")));
        assert_eq!(alpha.position(&c.key("y")), Some(1));
        assert_eq!(alpha.get(0).map(CharKey::as_str), Some("x"));
    }

    #[test]
    fn test_recollate_reorders() {
        let (mut alpha, _) = abc(&["o", "ñ", "nz"]);
        assert_eq!(alpha.to_strings(), vec!["ñ", "nz", "o"]);

        alpha.recollate(&Collator::for_locale("es".parse().unwrap()));
        assert_eq!(alpha.to_strings(), vec!["nz", "ñ", "o"]);
    }
}
