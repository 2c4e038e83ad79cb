//! Analysis session.
//!
//! A [`Session`] ties a ciphertext to the substitution being worked out for
//! it and, optionally, to a language profile that supplies the plain
//! alphabet and the reference coincidence index.

use std::fmt;

use tracing::{debug, info};

use crate::analysis::frequency::{frequencies_by_allowing, frequencies_by_ignoring, FrequencyReport};
use crate::analysis::kasiski::{find_repeats_with_progress, KasiskiEntry};
use crate::analysis::language::LanguageProfile;
use crate::analysis::stats;
use crate::config::{AnalyzerConfig, FilterConfig};
use crate::error::{AnalysisError, Result};
use crate::subst::plaintext::reconstruct_plaintext;
use crate::subst::substitution::{Substitution, SubstitutionMode};
use crate::text::alphabet::Alphabet;
use crate::text::collation::Collator;
use crate::text::locale::Locale;
use crate::text::tokenize::Ciphertext;

/// Text shown in place of an estimate that cannot be computed.
pub const NO_ESTIMATE: &str = "---";

/// Why the number of alphabets cannot be estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateUnavailable {
    /// No language profile is loaded.
    NoProfile,
    /// The profile's coincidence index is undefined or outside (0, 1).
    InvalidReferenceIndex,
    /// The plain alphabet is empty.
    EmptyPlainAlphabet,
    /// The plain alphabet is smaller than the cipher alphabet.
    PlainAlphabetTooSmall { plain: usize, cipher: usize },
    /// Fewer than two characters are counted.
    TooFewCharacters,
}

/// Result of the Friedman estimate for a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlphabetEstimate {
    Estimate(f64),
    CannotEstimate(EstimateUnavailable),
}

impl AlphabetEstimate {
    /// Returns the estimate, if there is one.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Estimate(value) => Some(*value),
            Self::CannotEstimate(_) => None,
        }
    }
}

impl fmt::Display for AlphabetEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Estimate(value) => write!(f, "{:.2}", value),
            Self::CannotEstimate(_) => f.write_str(NO_ESTIMATE),
        }
    }
}

/// A ciphertext under analysis and its substitution.
#[derive(Debug)]
pub struct Session {
    config: AnalyzerConfig,
    collator: Collator,
    ciphertext: Ciphertext,
    substitution: Substitution,
    profile: Option<LanguageProfile>,
}

impl Session {
    /// Creates a session with an empty ciphertext.
    pub fn new(config: AnalyzerConfig) -> Self {
        Self::with_text("", config)
    }

    /// Creates a session for `text`.
    ///
    /// The cipher alphabet is discovered from the text; the plain alphabet
    /// starts empty.
    pub fn with_text(text: &str, config: AnalyzerConfig) -> Self {
        let collator = Collator::for_locale(config.locale.clone());
        let ciphertext = Ciphertext::new(text, &collator);
        let cipher = ciphertext.cipher_alphabet(&config.filter);

        let mut substitution = Substitution::new(cipher, Alphabet::new(), &collator);
        substitution.set_injective(config.injective);
        substitution.set_ignored_independent(config.ignored_independent);

        Self {
            config,
            collator,
            ciphertext,
            substitution,
            profile: None,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.config.filter
    }

    pub fn collator(&self) -> &Collator {
        &self.collator
    }

    pub fn ciphertext(&self) -> &Ciphertext {
        &self.ciphertext
    }

    pub fn substitution(&self) -> &Substitution {
        &self.substitution
    }

    /// Mutable access for editing the substitution.
    pub fn substitution_mut(&mut self) -> &mut Substitution {
        &mut self.substitution
    }

    pub fn profile(&self) -> Option<&LanguageProfile> {
        self.profile.as_ref()
    }

    /// Replaces the ciphertext.
    ///
    /// The substitution goes back to one alphabet with the newly discovered
    /// cipher alphabet; selections and ignore sets are cleared. Listeners
    /// stay subscribed.
    pub fn load_text(&mut self, text: &str) {
        self.ciphertext = Ciphertext::new(text, &self.collator);
        let cipher = self.ciphertext.cipher_alphabet(&self.config.filter);
        info!(
            characters = self.ciphertext.len(),
            cipher_alphabet = cipher.len(),
            "loaded ciphertext"
        );

        // Shrinking cannot fail: 1 is always a valid count
        let _ = self.substitution.set_number_of_alphabets(1);
        self.substitution.set_cipher_alphabet(cipher);
    }

    /// Uses `profile` for the plain alphabet and the reference statistics.
    ///
    /// The profile's locale becomes the session's locale.
    pub fn set_profile(&mut self, profile: LanguageProfile) {
        let collator = profile.collator().clone();
        self.config.locale = profile.locale().clone();
        self.ciphertext.recollate(&collator);
        self.substitution
            .set_plain_alphabet(profile.alphabet(), &collator);
        self.collator = collator;
        debug!(locale = %self.config.locale, "language profile set");
        self.profile = Some(profile);
    }

    /// Changes the locale, re-keying the ciphertext and the alphabets.
    pub fn set_locale(&mut self, locale: Locale) {
        let collator = Collator::for_locale(locale.clone());
        let mut plain = self.substitution.plain_alphabet().clone();
        plain.recollate(&collator);

        self.ciphertext.recollate(&collator);
        self.substitution.set_plain_alphabet(plain, &collator);
        self.collator = collator;
        self.config.locale = locale;
    }

    /// Frequency tables for the current substitution.
    ///
    /// One alphabet: characters, bigrams and trigrams skipping slot 0's
    /// ignored characters. Several: one character table per slot, counting
    /// that slot's active cipher characters.
    pub fn frequencies(&self) -> Result<FrequencyReport> {
        match self.substitution.mode() {
            SubstitutionMode::Monoalphabetic => frequencies_by_ignoring(
                &self.ciphertext,
                &self.substitution.ignored_characters(),
                &self.config.filter,
            ),
            SubstitutionMode::Polyalphabetic => frequencies_by_allowing(
                &self.ciphertext,
                &self.substitution.active_cipher_alphabets(),
                &self.config.filter,
            ),
        }
    }

    /// Coincidence index of the ciphertext, skipping slot 0's ignored characters.
    pub fn coincidence_index(&self) -> Option<f64> {
        stats::coincidence_index(
            &self.ciphertext,
            self.substitution.first_ignored(),
            &self.config.filter,
        )
    }

    /// Repeated sequences at least `kasiski_min_length` long.
    pub fn kasiski(&self) -> Vec<KasiskiEntry> {
        self.kasiski_with_progress(|_, _| true).unwrap_or_default()
    }

    /// Same as [`kasiski`](Self::kasiski) with a cancellable progress callback.
    pub fn kasiski_with_progress(
        &self,
        progress: impl FnMut(usize, usize) -> bool,
    ) -> Result<Vec<KasiskiEntry>> {
        let min_length = self.config.kasiski_min_length;
        let mut entries = find_repeats_with_progress(
            &self.ciphertext,
            self.substitution.first_ignored(),
            &self.config.filter,
            progress,
        )?;
        entries.retain(|e| e.length() >= min_length);
        Ok(entries)
    }

    /// Friedman estimate of the number of alphabets.
    pub fn number_of_alphabets_estimate(&self) -> AlphabetEstimate {
        use EstimateUnavailable::*;

        let Some(profile) = &self.profile else {
            return AlphabetEstimate::CannotEstimate(NoProfile);
        };
        let reference = match profile.coincidence_index() {
            Some(ci) if ci > 0.0 && ci < 1.0 => ci,
            _ => return AlphabetEstimate::CannotEstimate(InvalidReferenceIndex),
        };

        let plain = self.substitution.plain_alphabet().len();
        if plain == 0 {
            return AlphabetEstimate::CannotEstimate(EmptyPlainAlphabet);
        }
        let cipher = self.substitution.slots()[0].cipher_alphabet().len();
        if plain < cipher {
            return AlphabetEstimate::CannotEstimate(PlainAlphabetTooSmall { plain, cipher });
        }

        match stats::estimate_number_of_alphabets(
            &self.ciphertext,
            self.substitution.first_ignored(),
            &self.config.filter,
            reference,
            plain,
        ) {
            Ok(estimate) => AlphabetEstimate::Estimate(estimate),
            Err(AnalysisError::TooFewCharacters { .. }) => {
                AlphabetEstimate::CannotEstimate(TooFewCharacters)
            }
            Err(_) => AlphabetEstimate::CannotEstimate(InvalidReferenceIndex),
        }
    }

    /// The ciphertext deciphered with the current substitution.
    pub fn plaintext(&self) -> String {
        reconstruct_plaintext(&self.ciphertext, &self.substitution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::language::AlphabetRules;

    fn profile(sample: &str) -> LanguageProfile {
        LanguageProfile::extract(
            sample,
            &AlphabetRules::default(),
            &Collator::default(),
            &FilterConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_load_text_discovers_cipher_alphabet() {
        let mut session = Session::with_text("BAC CAB", AnalyzerConfig::default());
        assert_eq!(
            session.substitution().cipher_alphabet().to_strings(),
            vec!["A", "B", "C"]
        );

        session.substitution_mut().set_number_of_alphabets(3).unwrap();
        session.load_text("ZZY");
        assert_eq!(session.substitution().number_of_alphabets(), 1);
        assert_eq!(
            session.substitution().cipher_alphabet().to_strings(),
            vec!["Y", "Z"]
        );
    }

    #[test]
    fn test_config_flags_reach_substitution() {
        let config = AnalyzerConfig {
            injective: false,
            ignored_independent: true,
            ..AnalyzerConfig::default()
        };
        let session = Session::with_text("AB", config);
        assert!(!session.substitution().is_injective());
        assert!(session.substitution().is_ignored_independent());
    }

    #[test]
    fn test_frequencies_follow_mode() {
        let mut session = Session::with_text("ABAB", AnalyzerConfig::default());
        assert_eq!(session.frequencies().unwrap().tables().len(), 3);

        session.substitution_mut().set_number_of_alphabets(2).unwrap();
        let report = session.frequencies().unwrap();
        assert_eq!(report.tables().len(), 2);
        assert_eq!(report.characters(0).unwrap().total(), 2);
    }

    #[test]
    fn test_estimate_sentinels() {
        let mut session = Session::with_text("ABCABC", AnalyzerConfig::default());
        assert_eq!(
            session.number_of_alphabets_estimate(),
            AlphabetEstimate::CannotEstimate(EstimateUnavailable::NoProfile)
        );
        assert_eq!(session.number_of_alphabets_estimate().to_string(), NO_ESTIMATE);

        session.set_profile(profile("aab"));
        assert_eq!(
            session.number_of_alphabets_estimate(),
            AlphabetEstimate::CannotEstimate(EstimateUnavailable::PlainAlphabetTooSmall {
                plain: 2,
                cipher: 3
            })
        );
    }

    #[test]
    fn test_estimate_with_profile() {
        let mut session = Session::with_text("ABCABCAB", AnalyzerConfig::default());
        session.set_profile(profile("aaabbbccd"));
        let estimate = session.number_of_alphabets_estimate();
        assert!(estimate.value().is_some());
        assert!(estimate.to_string().contains('.'));
    }

    #[test]
    fn test_kasiski_min_length() {
        let config = AnalyzerConfig {
            kasiski_min_length: 3,
            ..AnalyzerConfig::default()
        };
        let session = Session::with_text("ABCXYZABCPQRABC", config);
        let entries = session.kasiski();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].sequence().as_str(), "ABC");
    }

    #[test]
    fn test_plaintext_with_profile_alphabet() {
        let mut session = Session::with_text("AB BA", AnalyzerConfig::default());
        session.set_profile(profile("ab"));
        session.substitution_mut().select_identity();
        assert_eq!(session.plaintext(), "ab ba");
    }

    #[test]
    fn test_set_locale_rekeys() {
        let mut session = Session::with_text("ñno", AnalyzerConfig::default());
        session.set_locale("es".parse().unwrap());
        assert_eq!(session.config().locale.language(), "es");
        assert_eq!(session.ciphertext().collator().locale().language(), "es");
        assert_eq!(session.substitution().collator().locale().language(), "es");
    }
}
