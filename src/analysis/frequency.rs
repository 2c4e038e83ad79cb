//! Character, bigram and trigram frequency tables.
//!
//! Tables are kept sorted in collation order and updated with an
//! insert-or-increment step (binary search, then either bump the count or
//! insert a new entry at the sorted position).
//!
//! In monoalphabetic mode the ciphertext yields three tables: characters,
//! bigrams and trigrams. N-grams only join characters that were accepted one
//! right after the other; a rejected character (ignored, or filtered out as
//! whitespace/control) breaks the chain.
//!
//! In polyalphabetic mode each accepted character goes to the current
//! alphabet, then the alphabet index moves on by one (mod N). Rejected
//! characters do not move the rotation, so punctuation and spaces never use
//! up a key position.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FilterConfig;
use crate::error::{AnalysisError, Result};
use crate::text::alphabet::{Alphabet, IgnoreSet};
use crate::text::collation::{CharKey, Collator};
use crate::text::tokenize::Ciphertext;

/// A string (user character or short sequence) and its number of occurrences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringFreq {
    key: CharKey,
    count: u64,
}

impl StringFreq {
    /// Creates an entry with the given count.
    pub fn new(key: CharKey, count: u64) -> Self {
        Self { key, count }
    }

    /// Returns the keyed string.
    pub fn key(&self) -> &CharKey {
        &self.key
    }

    /// Returns the source text.
    pub fn as_str(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the number of occurrences.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Adds one occurrence.
    pub fn increment(&mut self) {
        self.count += 1;
    }

    /// Collation order of the strings.
    pub fn compare_by_string(a: &Self, b: &Self) -> Ordering {
        a.key.cmp(&b.key)
    }

    /// Descending count, ties broken by collation order.
    pub fn compare_by_frequency(a: &Self, b: &Self) -> Ordering {
        b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key))
    }
}

/// Plain serializable form of a table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyRow {
    /// The counted string.
    pub text: String,
    /// Number of occurrences.
    pub count: u64,
}

/// A frequency table sorted in collation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<StringFreq>,
}

impl FrequencyTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table listing every character of `alphabet` with count 0.
    pub fn seeded<'a>(alphabet: impl IntoIterator<Item = &'a CharKey>) -> Self {
        let mut entries: Vec<StringFreq> = alphabet
            .into_iter()
            .map(|c| StringFreq::new(c.clone(), 0))
            .collect();
        entries.sort_by(StringFreq::compare_by_string);
        entries.dedup_by(|a, b| a.key == b.key);
        Self { entries }
    }

    /// Rebuilds a table from rows, keying them with `collator`.
    ///
    /// Rows whose strings collate equal are merged.
    pub fn from_rows(rows: &[FrequencyRow], collator: &Collator) -> Self {
        let mut table = Self::new();
        for row in rows {
            table.add_count(collator.key(&row.text), row.count);
        }
        table
    }

    /// Records one occurrence of `key`.
    pub fn add(&mut self, key: CharKey) {
        self.add_count(key, 1);
    }

    fn add_count(&mut self, key: CharKey, count: u64) {
        match self.entries.binary_search_by(|e| e.key.cmp(&key)) {
            Ok(idx) => self.entries[idx].count += count,
            Err(idx) => self.entries.insert(idx, StringFreq::new(key, count)),
        }
    }

    /// Returns the count for `key` (0 if absent).
    pub fn get(&self, key: &CharKey) -> u64 {
        self.entries
            .binary_search_by(|e| e.key.cmp(key))
            .map(|idx| self.entries[idx].count)
            .unwrap_or(0)
    }

    /// Returns the number of distinct strings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries in collation order.
    pub fn entries(&self) -> &[StringFreq] {
        &self.entries
    }

    /// Iterates over the entries in collation order.
    pub fn iter(&self) -> std::slice::Iter<'_, StringFreq> {
        self.entries.iter()
    }

    /// Returns the sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(StringFreq::count).sum()
    }

    /// Returns the entries ordered by descending count.
    pub fn by_frequency(&self) -> Vec<&StringFreq> {
        let mut sorted: Vec<&StringFreq> = self.entries.iter().collect();
        sorted.sort_by(|a, b| StringFreq::compare_by_frequency(a, b));
        sorted
    }

    /// Coincidence index of the counts: `Σ f(f−1) / (N(N−1))`.
    ///
    /// Returns `None` when the table holds fewer than two occurrences.
    pub fn coincidence_index(&self) -> Option<f64> {
        let n = self.total();
        if n < 2 {
            return None;
        }
        let pairs = n as f64 * (n - 1) as f64;
        let same: f64 = self
            .entries
            .iter()
            .map(|e| e.count as f64 * e.count.saturating_sub(1) as f64)
            .sum();
        Some(same / pairs)
    }

    /// Returns the table as plain rows.
    pub fn rows(&self) -> Vec<FrequencyRow> {
        self.entries
            .iter()
            .map(|e| FrequencyRow {
                text: e.as_str().to_string(),
                count: e.count,
            })
            .collect()
    }
}

/// The tables produced for one frequency analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrequencyReport {
    /// One alphabet: character, bigram and trigram tables.
    Monoalphabetic {
        /// Single character counts.
        characters: FrequencyTable,
        /// Counts of two consecutive accepted characters.
        bigrams: FrequencyTable,
        /// Counts of three consecutive accepted characters.
        trigrams: FrequencyTable,
    },
    /// Several alphabets: one character table per alphabet.
    Polyalphabetic {
        /// Character counts per key position.
        alphabets: Vec<FrequencyTable>,
    },
}

impl FrequencyReport {
    /// Returns the tables as a fixed-size list.
    ///
    /// Three tables for a monoalphabetic report, one per alphabet otherwise.
    pub fn tables(&self) -> Vec<&FrequencyTable> {
        match self {
            Self::Monoalphabetic {
                characters,
                bigrams,
                trigrams,
            } => vec![characters, bigrams, trigrams],
            Self::Polyalphabetic { alphabets } => alphabets.iter().collect(),
        }
    }

    /// Returns the character table of alphabet `index`.
    pub fn characters(&self, index: usize) -> Option<&FrequencyTable> {
        match self {
            Self::Monoalphabetic { characters, .. } if index == 0 => Some(characters),
            Self::Monoalphabetic { .. } => None,
            Self::Polyalphabetic { alphabets } => alphabets.get(index),
        }
    }

    /// Returns the number of alphabets the report was computed for.
    pub fn number_of_alphabets(&self) -> usize {
        match self {
            Self::Monoalphabetic { .. } => 1,
            Self::Polyalphabetic { alphabets } => alphabets.len(),
        }
    }
}

/// Builds character, bigram and trigram tables from a stream of characters.
#[derive(Debug)]
pub(crate) struct NgramCounter<'a> {
    collator: &'a Collator,
    before_last: Option<String>,
    last: Option<String>,
    characters: FrequencyTable,
    bigrams: FrequencyTable,
    trigrams: FrequencyTable,
}

impl<'a> NgramCounter<'a> {
    pub(crate) fn new(collator: &'a Collator, characters: FrequencyTable) -> Self {
        Self {
            collator,
            before_last: None,
            last: None,
            characters,
            bigrams: FrequencyTable::new(),
            trigrams: FrequencyTable::new(),
        }
    }

    /// Counts an accepted character.
    pub(crate) fn accept(&mut self, c: &CharKey) {
        self.characters.add(c.clone());

        if let Some(last) = &self.last {
            if let Some(before_last) = &self.before_last {
                let trigram = format!("{}{}{}", before_last, last, c.as_str());
                self.trigrams.add(self.collator.key(&trigram));
            }
            let bigram = format!("{}{}", last, c.as_str());
            self.bigrams.add(self.collator.key(&bigram));
        }

        self.before_last = self.last.take();
        self.last = Some(c.as_str().to_string());
    }

    /// Records a rejected character, which ends the current chain.
    pub(crate) fn reject(&mut self) {
        self.before_last = None;
        self.last = None;
    }

    pub(crate) fn finish(self) -> (FrequencyTable, FrequencyTable, FrequencyTable) {
        (self.characters, self.bigrams, self.trigrams)
    }
}

/// Walks the ciphertext once, routing accepted characters by key rotation.
fn count_rotating(
    ciphertext: &Ciphertext,
    mut tables: Vec<FrequencyTable>,
    accepts: impl Fn(usize, &CharKey) -> bool,
) -> Vec<FrequencyTable> {
    let n = tables.len();
    let mut slot = 0;
    for c in ciphertext.chars() {
        if accepts(slot, c) {
            tables[slot].add(c.clone());
            slot = (slot + 1) % n;
        }
    }
    tables
}

fn count_monoalphabetic(
    ciphertext: &Ciphertext,
    seed: FrequencyTable,
    accepts: impl Fn(&CharKey) -> bool,
) -> FrequencyReport {
    let mut counter = NgramCounter::new(ciphertext.collator(), seed);
    for c in ciphertext.chars() {
        if accepts(c) {
            counter.accept(c);
        } else {
            counter.reject();
        }
    }
    let (characters, bigrams, trigrams) = counter.finish();
    debug!(
        characters = characters.len(),
        bigrams = bigrams.len(),
        trigrams = trigrams.len(),
        "monoalphabetic frequencies"
    );
    FrequencyReport::Monoalphabetic {
        characters,
        bigrams,
        trigrams,
    }
}

/// Counts frequencies, skipping each alphabet's ignored characters.
///
/// `ignored` holds one set per alphabet; its length is the number of
/// alphabets. With one alphabet the report carries character, bigram and
/// trigram tables; with more, one character table per alphabet.
pub fn frequencies_by_ignoring(
    ciphertext: &Ciphertext,
    ignored: &[IgnoreSet],
    filter: &FilterConfig,
) -> Result<FrequencyReport> {
    match ignored {
        [] => Err(AnalysisError::InvalidAlphabetCount(0)),
        [only] => Ok(count_monoalphabetic(ciphertext, FrequencyTable::new(), |c| {
            !only.contains(c) && filter.accepts(c)
        })),
        _ => {
            let tables = vec![FrequencyTable::new(); ignored.len()];
            let alphabets = count_rotating(ciphertext, tables, |slot, c| {
                !ignored[slot].contains(c) && filter.accepts(c)
            });
            Ok(FrequencyReport::Polyalphabetic { alphabets })
        }
    }
}

/// Counts frequencies of the characters each alphabet allows.
///
/// Same rotation rule as [`frequencies_by_ignoring`], but a character is
/// accepted only if it belongs to the current alphabet's allowed set. Every
/// character table starts with a zero entry for each allowed character.
pub fn frequencies_by_allowing(
    ciphertext: &Ciphertext,
    allowed: &[Alphabet],
    filter: &FilterConfig,
) -> Result<FrequencyReport> {
    match allowed {
        [] => Err(AnalysisError::InvalidAlphabetCount(0)),
        [only] => Ok(count_monoalphabetic(
            ciphertext,
            FrequencyTable::seeded(only),
            |c| only.contains(c) && filter.accepts(c),
        )),
        _ => {
            let tables = allowed.iter().map(FrequencyTable::seeded).collect();
            let alphabets = count_rotating(ciphertext, tables, |slot, c| {
                allowed[slot].contains(c) && filter.accepts(c)
            });
            Ok(FrequencyReport::Polyalphabetic { alphabets })
        }
    }
}

/// Checks that per-alphabet data matches the number of alphabets.
pub fn check_alphabet_count(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(AnalysisError::AlphabetCountMismatch { expected, got });
    }
    Ok(())
}
