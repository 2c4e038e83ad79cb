//! Kasiski examination.
//!
//! Repeated sequences in a ciphertext are found by comparing the text with
//! shifted copies of itself. For every shift `i` the scan walks the text
//! looking for runs where `A[i+k] == A[k]`; each run of two or more
//! characters contributes all of its substrings of length ≥ 2, together with
//! the two start positions where they were seen.
//!
//! The positions collected for a sequence are the ones this scan reaches.
//! That is not always every occurrence of the sequence: a match found inside
//! a longer run skips ahead to the end of that run.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::FilterConfig;
use crate::error::{AnalysisError, Result};
use crate::text::alphabet::IgnoreSet;
use crate::text::collation::CharKey;
use crate::text::tokenize::Ciphertext;

/// A repeated sequence and the spacing between its occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KasiskiEntry {
    sequence: CharKey,
    length: usize,
    positions: Vec<usize>,
    distances: Vec<usize>,
    factors: Vec<Vec<usize>>,
}

impl KasiskiEntry {
    /// Builds an entry from a sequence and its occurrence positions.
    ///
    /// Positions are sorted and deduplicated; distances and their prime
    /// factors are derived from them.
    pub fn new(sequence: CharKey, length: usize, positions: impl IntoIterator<Item = usize>) -> Self {
        let positions: Vec<usize> = positions
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let distances: Vec<usize> = positions.windows(2).map(|w| w[1] - w[0]).collect();
        let factors = distances.iter().map(|&d| prime_factors(d)).collect();

        Self {
            sequence,
            length,
            positions,
            distances,
            factors,
        }
    }

    /// Returns the repeated sequence.
    pub fn sequence(&self) -> &CharKey {
        &self.sequence
    }

    /// Returns the sequence length in user characters.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Returns the sorted start positions (in accepted characters).
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Returns the number of occurrences found.
    pub fn occurrences(&self) -> usize {
        self.positions.len()
    }

    /// Returns the distances between consecutive positions.
    pub fn distances(&self) -> &[usize] {
        &self.distances
    }

    /// Returns the prime factors of each distance.
    pub fn factors(&self) -> &[Vec<usize>] {
        &self.factors
    }

    /// Longer sequences first, then collation order.
    pub fn compare_by_length(a: &Self, b: &Self) -> Ordering {
        b.length
            .cmp(&a.length)
            .then_with(|| a.sequence.cmp(&b.sequence))
    }

    /// More occurrences first, then [`compare_by_length`](Self::compare_by_length).
    pub fn compare_by_frequency(a: &Self, b: &Self) -> Ordering {
        b.positions
            .len()
            .cmp(&a.positions.len())
            .then_with(|| Self::compare_by_length(a, b))
    }
}

/// Display order for Kasiski results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KasiskiOrder {
    /// Longest sequences first.
    #[default]
    Length,
    /// Most frequent sequences first.
    Frequency,
}

/// Sorts entries in the requested order.
pub fn sort_entries(entries: &mut [KasiskiEntry], order: KasiskiOrder) {
    match order {
        KasiskiOrder::Length => entries.sort_by(KasiskiEntry::compare_by_length),
        KasiskiOrder::Frequency => entries.sort_by(KasiskiEntry::compare_by_frequency),
    }
}

/// Prime factorization by trial division, factors ascending with repeats.
///
/// `1` (and `0`) factor as themselves.
pub fn prime_factors(n: usize) -> Vec<usize> {
    if n < 2 {
        return vec![n];
    }

    let mut factors = Vec::new();
    let mut rest = n;
    while rest % 2 == 0 {
        factors.push(2);
        rest /= 2;
    }
    let mut divisor = 3;
    while divisor * divisor <= rest {
        while rest % divisor == 0 {
            factors.push(divisor);
            rest /= divisor;
        }
        divisor += 2;
    }
    if rest > 1 {
        factors.push(rest);
    }
    factors
}

/// Finds repeated sequences, sorted by descending length.
pub fn find_repeats(
    ciphertext: &Ciphertext,
    ignored: &IgnoreSet,
    filter: &FilterConfig,
) -> Vec<KasiskiEntry> {
    scan(ciphertext, ignored, filter, |_, _| true).unwrap_or_default()
}

/// Same scan as [`find_repeats`], reporting progress before each shift.
///
/// `progress(shift, total_shifts)` returning `false` stops the scan with
/// [`AnalysisError::Cancelled`].
pub fn find_repeats_with_progress(
    ciphertext: &Ciphertext,
    ignored: &IgnoreSet,
    filter: &FilterConfig,
    progress: impl FnMut(usize, usize) -> bool,
) -> Result<Vec<KasiskiEntry>> {
    scan(ciphertext, ignored, filter, progress)
}

fn scan(
    ciphertext: &Ciphertext,
    ignored: &IgnoreSet,
    filter: &FilterConfig,
    mut progress: impl FnMut(usize, usize) -> bool,
) -> Result<Vec<KasiskiEntry>> {
    let text: Vec<&CharKey> = ciphertext
        .chars()
        .iter()
        .filter(|c| !ignored.contains(*c) && filter.accepts(c))
        .collect();
    let len = text.len();
    let total_shifts = len.saturating_sub(1);
    let collator = ciphertext.collator();

    let mut found: HashMap<CharKey, (usize, BTreeSet<usize>)> = HashMap::new();

    for shift in 1..len {
        if !progress(shift, total_shifts) {
            debug!(shift, total_shifts, "kasiski scan cancelled");
            return Err(AnalysisError::Cancelled);
        }

        let mut start = 0;
        while shift + start < len {
            let mut end = start;
            while shift + end < len && text[shift + end] == text[end] {
                end += 1;
            }

            if end > start + 1 {
                trace!(shift, start, run = end - start, "matching run");
                for length in 2..=end - start {
                    for at in start..=end - length {
                        let sequence: String =
                            text[at..at + length].iter().map(|c| c.as_str()).collect();
                        let (_, positions) = found
                            .entry(collator.key(&sequence))
                            .or_insert_with(|| (length, BTreeSet::new()));
                        positions.insert(at);
                        positions.insert(shift + at);
                    }
                }
                start = end;
            } else {
                start += 1;
            }
        }
    }

    let mut entries: Vec<KasiskiEntry> = found
        .into_iter()
        .filter(|(_, (_, positions))| positions.len() >= 2)
        .map(|(sequence, (length, positions))| KasiskiEntry::new(sequence, length, positions))
        .collect();
    sort_entries(&mut entries, KasiskiOrder::Length);

    debug!(characters = len, sequences = entries.len(), "kasiski scan");
    Ok(entries)
}
