//! One substitution alphabet (a single key-rotation slot).
//!
//! A [`MonoAlphaSubst`] keeps a cipher alphabet, a plain alphabet, an ignore
//! set and a selection: for every active cipher character, the plain
//! character it stands for, or nothing yet.
//!
//! Invariants kept by every operation:
//! - the cipher alphabet and the ignore set never share a character
//! - the selection has exactly one entry per cipher character
//! - in injective mode no plain character is selected twice

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::text::alphabet::{Alphabet, IgnoreSet};
use crate::text::collation::{CharKey, Collator};
use crate::text::locale::Locale;
use crate::text::tokenize::user_character_key;

/// Rotation direction for [`MonoAlphaSubst::shift_selection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Each cipher character takes the value of the next one.
    Left,
    /// Each cipher character takes the value of the previous one.
    Right,
}

/// Cipher→plain mapping for one alphabet.
#[derive(Debug, Clone)]
pub struct MonoAlphaSubst {
    collator: Collator,
    injective: bool,
    cipher: Alphabet,
    plain: Alphabet,
    ignored: IgnoreSet,
    /// Index-aligned with `cipher`.
    selection: Vec<Option<CharKey>>,
}

impl MonoAlphaSubst {
    /// Creates an injective substitution with nothing selected.
    pub fn new(cipher: Alphabet, plain: Alphabet, collator: &Collator) -> Self {
        let selection = vec![None; cipher.len()];
        Self {
            collator: collator.clone(),
            injective: true,
            cipher,
            plain,
            ignored: IgnoreSet::new(),
            selection,
        }
    }

    pub fn collator(&self) -> &Collator {
        &self.collator
    }

    /// Returns the active cipher characters.
    pub fn cipher_alphabet(&self) -> &Alphabet {
        &self.cipher
    }

    pub fn plain_alphabet(&self) -> &Alphabet {
        &self.plain
    }

    /// Returns the ignored characters.
    pub fn ignored(&self) -> &IgnoreSet {
        &self.ignored
    }

    pub fn is_injective(&self) -> bool {
        self.injective
    }

    /// True if `c` is an active cipher character.
    pub fn is_cipher_character(&self, c: &CharKey) -> bool {
        self.cipher.contains(c)
    }

    /// True if `c` is ignored.
    pub fn is_ignored(&self, c: &CharKey) -> bool {
        self.ignored.contains(c)
    }

    /// Looks up a cipher character.
    ///
    /// `None` if `c` is not an active cipher character, `Some(None)` if it is
    /// but nothing is selected for it.
    pub fn lookup(&self, c: &CharKey) -> Option<Option<&CharKey>> {
        self.cipher
            .position(c)
            .map(|idx| self.selection[idx].as_ref())
    }

    /// Returns the plain character selected for `c`, if any.
    pub fn selected(&self, c: &CharKey) -> Option<&CharKey> {
        self.lookup(c).flatten()
    }

    /// Iterates over every cipher character and its selection.
    pub fn pairs(&self) -> impl Iterator<Item = (&CharKey, Option<&CharKey>)> {
        self.cipher
            .iter()
            .zip(self.selection.iter().map(Option::as_ref))
    }

    /// Returns the selected pairs only.
    pub fn selection(&self) -> BTreeMap<CharKey, CharKey> {
        self.pairs()
            .filter_map(|(c, p)| p.map(|p| (c.clone(), p.clone())))
            .collect()
    }

    /// Plain characters currently selected for some cipher character.
    pub fn used_plain_characters(&self) -> BTreeSet<CharKey> {
        self.selection.iter().flatten().cloned().collect()
    }

    /// Plain characters that can still be selected.
    ///
    /// In injective mode these are the ones not in use; otherwise the whole
    /// plain alphabet.
    pub fn available_plain_characters(&self) -> Vec<CharKey> {
        if !self.injective {
            return self.plain.as_slice().to_vec();
        }
        let used = self.used_plain_characters();
        self.plain
            .iter()
            .filter(|p| !used.contains(*p))
            .cloned()
            .collect()
    }

    /// Adds a character to the cipher alphabet.
    ///
    /// An ignored character is moved back into the alphabet. Returns `false`
    /// if it was already an active cipher character.
    pub fn add_to_cipher_alphabet(&mut self, c: &str) -> Result<bool> {
        let key = user_character_key(c, &self.collator)?;
        Ok(self.add_cipher_key(key))
    }

    pub(crate) fn add_cipher_key(&mut self, key: CharKey) -> bool {
        let was_ignored = self.ignored.remove(&key);
        match self.cipher.insert(key) {
            Some(idx) => {
                self.selection.insert(idx, None);
                true
            }
            None => was_ignored,
        }
    }

    /// Adds a character to the plain alphabet.
    ///
    /// Returns `false` if it was already there.
    pub fn add_to_plain_alphabet(&mut self, c: &str) -> Result<bool> {
        let key = user_character_key(c, &self.collator)?;
        Ok(self.add_plain_key(key))
    }

    pub(crate) fn add_plain_key(&mut self, key: CharKey) -> bool {
        self.plain.insert(key).is_some()
    }

    /// Moves an active cipher character to the ignore set.
    ///
    /// Its selection, if any, is dropped.
    pub fn ignore(&mut self, c: &CharKey) -> Result<()> {
        let idx = self
            .cipher
            .remove(c)
            .ok_or_else(|| AnalysisError::NotInCipherAlphabet(c.as_str().to_string()))?;
        self.selection.remove(idx);
        self.ignored.insert(c.clone());
        Ok(())
    }

    /// Moves an ignored character back into the cipher alphabet, unselected.
    pub fn include(&mut self, c: &CharKey) -> Result<()> {
        if !self.ignored.remove(c) {
            return Err(AnalysisError::NotIgnored(c.as_str().to_string()));
        }
        if let Some(idx) = self.cipher.insert(c.clone()) {
            self.selection.insert(idx, None);
        }
        Ok(())
    }

    /// Makes `ignored` the ignore set.
    ///
    /// Ignored characters not in `ignored` are included again; cipher
    /// characters in it are ignored. Characters that are neither are
    /// skipped. Returns true if anything moved.
    pub fn set_ignored(&mut self, ignored: &IgnoreSet) -> bool {
        let to_include: Vec<CharKey> = self.ignored.difference(ignored).cloned().collect();
        let to_ignore: Vec<CharKey> = ignored
            .iter()
            .filter(|c| self.cipher.contains(c))
            .cloned()
            .collect();

        for c in &to_include {
            self.ignored.remove(c);
            if let Some(idx) = self.cipher.insert(c.clone()) {
                self.selection.insert(idx, None);
            }
        }
        for c in &to_ignore {
            if let Some(idx) = self.cipher.remove(c) {
                self.selection.remove(idx);
            }
            self.ignored.insert(c.clone());
        }

        !(to_include.is_empty() && to_ignore.is_empty())
    }

    /// Turns injective mode on or off.
    ///
    /// Turning it on keeps each repeated plain character only for the first
    /// cipher character (in alphabet order) that selects it. Returns true if
    /// any selection was reset.
    pub fn set_injective(&mut self, injective: bool) -> bool {
        self.injective = injective;
        if !injective {
            return false;
        }

        let mut seen = BTreeSet::new();
        let mut reset = 0;
        for value in self.selection.iter_mut() {
            if let Some(p) = value {
                if !seen.insert(p.clone()) {
                    *value = None;
                    reset += 1;
                }
            }
        }
        if reset > 0 {
            debug!(reset, "duplicate selections dropped for injective mode");
        }
        reset > 0
    }

    /// Selects `plain` for the cipher character `cipher` (or clears it with `None`).
    ///
    /// Returns true if the selection changed.
    pub fn select(&mut self, cipher: &CharKey, plain: Option<&CharKey>) -> Result<bool> {
        let idx = self
            .cipher
            .position(cipher)
            .ok_or_else(|| AnalysisError::NotInCipherAlphabet(cipher.as_str().to_string()))?;

        if let Some(p) = plain {
            if !self.plain.contains(p) {
                return Err(AnalysisError::NotInPlainAlphabet(p.as_str().to_string()));
            }
            let taken = self
                .selection
                .iter()
                .enumerate()
                .any(|(i, v)| i != idx && v.as_ref() == Some(p));
            if self.injective && taken {
                return Err(AnalysisError::PlainCharacterInUse(p.as_str().to_string()));
            }
        }

        let plain = plain.cloned();
        if self.selection[idx] == plain {
            return Ok(false);
        }
        self.selection[idx] = plain;
        Ok(true)
    }

    /// Clears every selection.
    pub fn clear_selections(&mut self) {
        self.selection.iter_mut().for_each(|v| *v = None);
    }

    /// Selects each cipher character for itself where possible.
    ///
    /// A first pass maps characters found in the plain alphabet to
    /// themselves. Characters still unset then try their lowercase form and
    /// finally their uppercase form, as long as that form is in the plain
    /// alphabet and is not itself an active cipher character.
    pub fn select_identity(&mut self) {
        self.clear_selections();
        let mut used = BTreeSet::new();

        for idx in 0..self.cipher.len() {
            let c = &self.cipher.as_slice()[idx];
            if self.plain.contains(c) && used.insert(c.clone()) {
                self.selection[idx] = Some(c.clone());
            }
        }

        let locale = self.collator.locale().clone();
        let folds: [fn(&Locale, &str) -> String; 2] = [Locale::to_lowercase, Locale::to_uppercase];
        for fold in folds {
            for idx in 0..self.cipher.len() {
                if self.selection[idx].is_some() {
                    continue;
                }
                let c = &self.cipher.as_slice()[idx];
                let folded = fold(&locale, c.as_str());
                if folded == c.as_str() {
                    continue;
                }
                let candidate = self.collator.key(&folded);
                if !self.plain.contains(&candidate) || self.cipher.contains(&candidate) {
                    continue;
                }
                if self.injective && used.contains(&candidate) {
                    continue;
                }
                used.insert(candidate.clone());
                self.selection[idx] = Some(candidate);
            }
        }
    }

    /// Gives every unset cipher character an unused plain character.
    ///
    /// Plain characters are handed out in alphabet order.
    pub fn complete_selection(&mut self) {
        let used = self.used_plain_characters();
        let mut available = self.plain.iter().filter(|p| !used.contains(*p));

        for value in self.selection.iter_mut().filter(|v| v.is_none()) {
            match available.next() {
                Some(p) => *value = Some(p.clone()),
                None => break,
            }
        }
    }

    /// Reverses the selection along the cipher alphabet.
    ///
    /// The value of the last cipher character goes to the first, and so on.
    pub fn reverse_selection(&mut self) {
        self.selection.reverse();
    }

    /// Rotates the selected values by one position, wrapping around.
    pub fn shift_selection(&mut self, direction: Direction) {
        if self.selection.len() < 2 {
            return;
        }
        match direction {
            Direction::Left => self.selection.rotate_left(1),
            Direction::Right => self.selection.rotate_right(1),
        }
    }

    /// Replaces the selection with its inverse where possible.
    ///
    /// Each `cipher → plain` pair becomes `plain → cipher`. That needs the
    /// plain character to be a cipher character and the cipher character to
    /// be a plain one; when either is not, its other-case form is tried
    /// instead. Pairs that cannot be inverted are dropped.
    pub fn invert_selection(&mut self) {
        let pairs: Vec<(CharKey, CharKey)> = self.selection().into_iter().collect();
        let mut inverse: BTreeMap<CharKey, CharKey> = BTreeMap::new();

        for (key, value) in pairs {
            if inverse.contains_key(&value) {
                continue;
            }
            let key_in_plain = self.plain.contains(&key);
            let value_in_cipher = self.cipher.contains(&value);

            let inverted = match (key_in_plain, value_in_cipher) {
                (true, true) => Some((value, key)),
                (false, true) => self
                    .change_case(&key)
                    .filter(|k| !self.cipher.contains(k) && self.plain.contains(k))
                    .map(|k| (value, k)),
                (true, false) => self
                    .change_case(&value)
                    .filter(|v| {
                        !inverse.contains_key(v) && !self.plain.contains(v) && self.cipher.contains(v)
                    })
                    .map(|v| (v, key)),
                (false, false) => {
                    let k = self
                        .change_case(&key)
                        .filter(|k| !self.cipher.contains(k) && self.plain.contains(k));
                    let v = self.change_case(&value).filter(|v| {
                        !inverse.contains_key(v) && !self.plain.contains(v) && self.cipher.contains(v)
                    });
                    k.zip(v).map(|(k, v)| (v, k))
                }
            };

            if let Some((cipher, plain)) = inverted {
                inverse.insert(cipher, plain);
            }
        }

        self.clear_selections();
        let mut used = BTreeSet::new();
        for (cipher, plain) in inverse {
            if self.injective && !used.insert(plain.clone()) {
                continue;
            }
            if let Some(idx) = self.cipher.position(&cipher) {
                self.selection[idx] = Some(plain);
            }
        }
    }

    /// Uppercase form if it differs, else lowercase form if it differs.
    fn change_case(&self, c: &CharKey) -> Option<CharKey> {
        let locale = self.collator.locale();
        let upper = self.collator.key(&locale.to_uppercase(c.as_str()));
        if upper != *c {
            return Some(upper);
        }
        let lower = self.collator.key(&locale.to_lowercase(c.as_str()));
        if lower != *c {
            return Some(lower);
        }
        None
    }

    /// Replaces the selection with `selection`.
    ///
    /// Entries whose value is not in the plain alphabet, or whose key is not
    /// an active cipher character, are dropped. In injective mode a plain
    /// character already given to an earlier cipher character is dropped
    /// too. Returns false if the selection was already equal.
    pub fn set_selection(&mut self, selection: &BTreeMap<CharKey, CharKey>) -> bool {
        if self.selection() == *selection {
            return false;
        }

        self.clear_selections();
        let mut used = BTreeSet::new();
        for (idx, c) in self.cipher.iter().enumerate() {
            let Some(p) = selection.get(c) else {
                continue;
            };
            if !self.plain.contains(p) {
                continue;
            }
            if self.injective && !used.insert(p.clone()) {
                continue;
            }
            self.selection[idx] = Some(p.clone());
        }
        true
    }

    /// Replaces the cipher alphabet, clearing the ignore set and selection.
    pub fn set_cipher_alphabet(&mut self, cipher: Alphabet) {
        self.selection = vec![None; cipher.len()];
        self.cipher = cipher;
        self.ignored.clear();
    }

    /// Replaces the plain alphabet and collator, clearing the selection.
    ///
    /// The cipher alphabet and ignore set are re-keyed with `collator`.
    pub fn set_plain_alphabet(&mut self, plain: Alphabet, collator: &Collator) {
        self.cipher.recollate(collator);
        self.ignored = self.ignored.iter().map(|c| collator.rekey(c)).collect();
        self.plain = plain;
        self.collator = collator.clone();
        self.selection = vec![None; self.cipher.len()];
    }

    /// Copies the ignore set and selection of `other`.
    pub(crate) fn copy_from(&mut self, other: &MonoAlphaSubst) -> (bool, bool) {
        let ignored_changed = self.set_ignored(&other.ignored);
        let selection_changed = self.set_selection(&other.selection());
        (ignored_changed, selection_changed)
    }
}
