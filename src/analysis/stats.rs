//! Coincidence index and the Friedman estimate of the key length.

use tracing::debug;

use crate::analysis::frequency::FrequencyTable;
use crate::config::FilterConfig;
use crate::error::{AnalysisError, Result};
use crate::text::alphabet::IgnoreSet;
use crate::text::tokenize::Ciphertext;

/// Counts the characters that are neither ignored nor filtered out.
pub fn accepted_characters(
    ciphertext: &Ciphertext,
    ignored: &IgnoreSet,
    filter: &FilterConfig,
) -> FrequencyTable {
    let mut table = FrequencyTable::new();
    for c in ciphertext.chars() {
        if !ignored.contains(c) && filter.accepts(c) {
            table.add(c.clone());
        }
    }
    table
}

/// Coincidence index of the accepted characters of a ciphertext.
///
/// The probability that two characters drawn at random are the same:
/// `Σ f(f−1) / (N(N−1))`. Returns `None` when fewer than two characters
/// are accepted.
pub fn coincidence_index(
    ciphertext: &Ciphertext,
    ignored: &IgnoreSet,
    filter: &FilterConfig,
) -> Option<f64> {
    accepted_characters(ciphertext, ignored, filter).coincidence_index()
}

/// Friedman's kappa test: estimated number of alphabets of a ciphertext.
///
/// `reference_ci` is the coincidence index of the plaintext language and
/// `alphabet_size` the size of its alphabet. The caller should only trust
/// the estimate when the plain alphabet is at least as large as the cipher
/// alphabet.
pub fn estimate_number_of_alphabets(
    ciphertext: &Ciphertext,
    ignored: &IgnoreSet,
    filter: &FilterConfig,
    reference_ci: f64,
    alphabet_size: usize,
) -> Result<f64> {
    check_reference(reference_ci, alphabet_size)?;

    let table = accepted_characters(ciphertext, ignored, filter);
    let found = table.total();
    let text_ci = table
        .coincidence_index()
        .ok_or(AnalysisError::TooFewCharacters {
            found: found as usize,
        })?;

    let estimate = friedman_estimate(text_ci, found, reference_ci, alphabet_size)?;
    debug!(text_ci, reference_ci, alphabet_size, characters = found, estimate, "friedman estimate");
    Ok(estimate)
}

/// The Friedman formula on precomputed values.
///
/// `(κp − κr)·N / (κo·(N−1) − κr·N + κp)` where κp is the reference index,
/// κr = 1/m the index of uniformly random text and κo the text's index.
pub fn friedman_estimate(
    text_ci: f64,
    characters: u64,
    reference_ci: f64,
    alphabet_size: usize,
) -> Result<f64> {
    check_reference(reference_ci, alphabet_size)?;
    if characters < 2 {
        return Err(AnalysisError::TooFewCharacters {
            found: characters as usize,
        });
    }

    let n = characters as f64;
    let random_ci = 1.0 / alphabet_size as f64;
    Ok((reference_ci - random_ci) * n / (text_ci * (n - 1.0) - random_ci * n + reference_ci))
}

fn check_reference(reference_ci: f64, alphabet_size: usize) -> Result<()> {
    if !(reference_ci > 0.0 && reference_ci < 1.0) {
        return Err(AnalysisError::InvalidReferenceIndex(reference_ci));
    }
    if alphabet_size == 0 {
        return Err(AnalysisError::InvalidAlphabetSize(alphabet_size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::collation::Collator;

    fn ct(text: &str) -> Ciphertext {
        Ciphertext::new(text, &Collator::default())
    }

    fn ci(text: &str) -> Option<f64> {
        coincidence_index(&ct(text), &IgnoreSet::new(), &FilterConfig::default())
    }

    #[test]
    fn test_all_distinct_is_zero() {
        assert_eq!(ci("ABCDEFG"), Some(0.0));
    }

    #[test]
    fn test_single_repeated_is_one() {
        assert_eq!(ci("QQQQQ"), Some(1.0));
        assert_eq!(ci("Q Q Q"), Some(1.0));
    }

    #[test]
    fn test_too_short_is_undefined() {
        assert_eq!(ci(""), None);
        assert_eq!(ci("A   "), None);
    }

    #[test]
    fn test_ignored_characters_are_excluded() {
        let c = Collator::default();
        let text = ct("AAB");
        let ignored: IgnoreSet = [c.key("B")].into_iter().collect();
        assert_eq!(
            coincidence_index(&text, &ignored, &FilterConfig::default()),
            Some(1.0)
        );
    }

    #[test]
    fn test_bounds() {
        let value = ci("THE QUICK BROWN FOX JUMPS OVER THE LAZY DOG").unwrap();
        assert!((0.0..=1.0).contains(&value));
    }

    #[test]
    fn test_reference_validation() {
        let text = ct("ABAB");
        let none = IgnoreSet::new();
        let filter = FilterConfig::default();
        assert!(matches!(
            estimate_number_of_alphabets(&text, &none, &filter, 0.0, 26),
            Err(AnalysisError::InvalidReferenceIndex(_))
        ));
        assert!(matches!(
            estimate_number_of_alphabets(&text, &none, &filter, 1.0, 26),
            Err(AnalysisError::InvalidReferenceIndex(_))
        ));
        assert!(matches!(
            estimate_number_of_alphabets(&text, &none, &filter, 0.065, 0),
            Err(AnalysisError::InvalidAlphabetSize(0))
        ));
        assert!(matches!(
            estimate_number_of_alphabets(&ct("A"), &none, &filter, 0.065, 26),
            Err(AnalysisError::TooFewCharacters { found: 1 })
        ));
    }

    #[test]
    fn test_monoalphabetic_text_estimates_one() {
        // When the text's own index is the reference, the formula gives 1.
        let text = ct("ATTACKATDAWNTHENRETREATATDUSK");
        let none = IgnoreSet::new();
        let filter = FilterConfig::default();
        let reference = coincidence_index(&text, &none, &filter).unwrap();
        let estimate = estimate_number_of_alphabets(&text, &none, &filter, reference, 26).unwrap();
        assert!((estimate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_friedman_formula() {
        // κp = 0.065, κr = 1/26, κo = 0.045, N = 1000
        let estimate = friedman_estimate(0.045, 1000, 0.065, 26).unwrap();
        let random = 1.0 / 26.0;
        let expected = (0.065 - random) * 1000.0 / (0.045 * 999.0 - random * 1000.0 + 0.065);
        assert!((estimate - expected).abs() < 1e-12);
        assert!(estimate > 2.0 && estimate < 5.0);
    }
}
