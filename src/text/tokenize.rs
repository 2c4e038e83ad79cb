//! User-character tokenization.
//!
//! A user character is what a reader perceives as one letter. It may span
//! several code points (`u` + U+0308 is one `ü`), so the text is split on
//! extended grapheme cluster boundaries rather than on `char`s. Every piece
//! keeps its source text, so joining the tokens gives back the input exactly.

use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

use crate::config::FilterConfig;
use crate::error::{AnalysisError, Result};
use crate::text::alphabet::Alphabet;
use crate::text::collation::{CharKey, Collator};

/// Maximum line width used by [`Ciphertext::in_blocks_of`].
pub const MAX_BLOCK_LINE_WIDTH: usize = 60;

/// Splits `text` into user characters and keys each one with `collator`.
pub fn tokenize(text: &str, collator: &Collator) -> Vec<CharKey> {
    text.graphemes(true).map(|g| collator.key(g)).collect()
}

/// True if `s` is exactly one user character.
pub fn is_user_character(s: &str) -> bool {
    let mut graphemes = s.graphemes(true);
    graphemes.next().is_some() && graphemes.next().is_none()
}

/// Validates a single-character argument and returns its key.
pub fn user_character_key(s: &str, collator: &Collator) -> Result<CharKey> {
    if s.is_empty() {
        return Err(AnalysisError::EmptyCharacter);
    }
    if !is_user_character(s) {
        return Err(AnalysisError::NotUserCharacter(s.to_string()));
    }
    Ok(collator.key(s))
}

/// A ciphertext tokenized into keyed user characters.
#[derive(Debug, Clone)]
pub struct Ciphertext {
    source: String,
    collator: Collator,
    chars: Vec<CharKey>,
}

impl Ciphertext {
    /// Tokenizes `text` with `collator`.
    pub fn new(text: &str, collator: &Collator) -> Self {
        let chars = tokenize(text, collator);
        debug!(
            bytes = text.len(),
            user_chars = chars.len(),
            locale = %collator.locale(),
            "tokenized ciphertext"
        );

        Self {
            source: text.to_string(),
            collator: collator.clone(),
            chars,
        }
    }

    /// Returns the original text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the collator the tokens were keyed with.
    pub fn collator(&self) -> &Collator {
        &self.collator
    }

    /// Returns the user characters in order.
    pub fn chars(&self) -> &[CharKey] {
        &self.chars
    }

    /// Returns the number of user characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns true if the ciphertext is empty.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Re-keys every token with a new collator.
    pub fn recollate(&mut self, collator: &Collator) {
        self.chars = tokenize(&self.source, collator);
        self.collator = collator.clone();
    }

    /// Joins the source text of every token.
    pub fn reconstruct(&self) -> String {
        self.chars.iter().map(CharKey::as_str).collect()
    }

    /// Returns the sorted distinct characters the filter accepts.
    ///
    /// This is the cipher alphabet discovered when a text is loaded.
    pub fn cipher_alphabet(&self, filter: &FilterConfig) -> Alphabet {
        self.chars
            .iter()
            .filter(|c| filter.accepts(c))
            .cloned()
            .collect()
    }

    /// Returns the source text with every occurrence of `remove` dropped.
    pub fn without(&self, remove: &[CharKey]) -> String {
        if remove.is_empty() {
            return self.source.clone();
        }
        self.chars
            .iter()
            .filter(|c| !remove.contains(c))
            .map(CharKey::as_str)
            .collect()
    }

    /// Regroups the text into blocks of `block_size` characters.
    ///
    /// Whitespace is dropped, blocks are separated by a space and lines are
    /// broken before they reach [`MAX_BLOCK_LINE_WIDTH`] columns.
    pub fn in_blocks_of(&self, block_size: usize) -> Result<String> {
        if block_size < 1 {
            return Err(AnalysisError::InvalidBlockSize(block_size));
        }

        let mut out = String::with_capacity(self.source.len() + self.source.len() / block_size);
        let mut in_block = 0;
        let mut blocks_in_line = 0;

        for c in self.chars.iter().filter(|c| !c.is_whitespace()) {
            if in_block < block_size {
                out.push_str(c.as_str());
                in_block += 1;
                continue;
            }

            blocks_in_line += 1;
            if (blocks_in_line + 1) * block_size + blocks_in_line < MAX_BLOCK_LINE_WIDTH {
                out.push(' ');
            } else {
                blocks_in_line = 0;
                out.push_str(" \n");
            }
            out.push_str(c.as_str());
            in_block = 1;
        }

        if !self.chars.is_empty() {
            out.push('\n');
        }
        Ok(out)
    }
}
