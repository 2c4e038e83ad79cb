//! Statistical cryptanalysis of ciphertexts.
//!
//! - [`frequency`]: character, bigram and trigram frequency tables
//! - [`stats`]: coincidence index and Friedman's key-length estimate
//! - [`kasiski`]: repeated sequences and the spacing between them
//! - [`language`]: reference frequencies of a language

pub mod frequency;
pub mod kasiski;
pub mod language;
pub mod stats;

pub use frequency::{
    frequencies_by_allowing, frequencies_by_ignoring, FrequencyReport, FrequencyRow,
    FrequencyTable, StringFreq,
};
pub use kasiski::{
    find_repeats, find_repeats_with_progress, prime_factors, sort_entries, KasiskiEntry,
    KasiskiOrder,
};
pub use language::{AlphabetRules, LanguageProfile, ProfileRecord};
pub use stats::{coincidence_index, estimate_number_of_alphabets, friedman_estimate};
