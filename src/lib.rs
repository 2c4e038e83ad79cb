//! # Picklock - classical cryptanalysis toolkit
//!
//! Picklock helps break classical substitution ciphers (monoalphabetic and
//! polyalphabetic, Vigenère-style) by hand. It computes the statistics a
//! cryptanalyst needs and keeps track of the substitution being worked out.
//!
//! ## Overview
//!
//! - Text is split into **user characters** (what a reader sees as one
//!   letter, possibly several code points) and compared under a
//!   **locale-aware collation**, so `é` and `e` + U+0301 are the same letter
//! - **Frequency tables** of characters, bigrams and trigrams, or one table
//!   per key position for polyalphabetic ciphers
//! - **Coincidence index** and **Friedman's test** to estimate the key length
//! - **Kasiski examination**: repeated sequences and the prime factors of
//!   their spacing
//! - A **substitution model** over 1..N rotating alphabets with injectivity
//!   checks, identity/complete/reverse/invert/shift helpers and change events
//! - **Language profiles** extracted from sample texts
//!
//! ## Example Usage
//!
//! ```rust
//! use picklock::{AnalyzerConfig, Session};
//!
//! let session = Session::with_text("LXFOPVEFRNHR LXFOPV", AnalyzerConfig::default());
//!
//! let ci = session.coincidence_index().unwrap();
//! assert!(ci > 0.0 && ci < 1.0);
//!
//! let repeats = session.kasiski();
//! assert_eq!(repeats[0].sequence().as_str(), "LXFOPV");
//! assert_eq!(repeats[0].distances(), &[12]);
//! ```
//!
//! ## Modules
//!
//! - [`text`]: locales, collation keys, tokenization and alphabets
//! - [`analysis`]: frequencies, coincidence index, Friedman, Kasiski, profiles
//! - [`subst`]: substitution model and plaintext reconstruction
//! - [`session`]: a ciphertext together with its substitution
//! - [`config`]: analysis settings

pub mod analysis;
pub mod config;
pub mod error;
pub mod session;
pub mod subst;
pub mod text;

// Re-export commonly used types at the crate root
pub use analysis::{
    coincidence_index, estimate_number_of_alphabets, find_repeats, frequencies_by_allowing,
    frequencies_by_ignoring, AlphabetRules, FrequencyReport, FrequencyTable, KasiskiEntry,
    KasiskiOrder, LanguageProfile, StringFreq,
};
pub use config::{AnalyzerConfig, FilterConfig};
pub use error::{AnalysisError, Result};
pub use session::{AlphabetEstimate, EstimateUnavailable, Session};
pub use subst::{
    reconstruct_plaintext, Direction, MonoAlphaSubst, Substitution, SubstitutionEvent,
    SubstitutionMode,
};
pub use text::{Alphabet, CharKey, Ciphertext, Collator, IgnoreSet, Locale};
