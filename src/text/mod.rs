//! Text handling for cryptanalysis.
//!
//! This module provides:
//! - Locale identifiers with locale-aware case mapping
//! - Collation keys so equal letters compare equal regardless of encoding
//! - User-character tokenization and ciphertext utilities
//! - Sorted alphabets and ignore sets

pub mod alphabet;
pub mod collation;
pub mod locale;
pub mod tokenize;

pub use alphabet::{Alphabet, IgnoreSet};
pub use collation::{CharKey, Collation, Collator, LocaleCollation, SortKey};
pub use locale::{Locale, ParseLocaleError};
pub use tokenize::{is_user_character, tokenize, user_character_key, Ciphertext};
