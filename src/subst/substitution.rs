//! Mono- and polyalphabetic substitutions.
//!
//! A [`Substitution`] holds one [`MonoAlphaSubst`] per key-rotation slot.
//! With one slot it is monoalphabetic; with more, slot `i` deciphers the
//! characters at rotation position `i`. Every change is reported to the
//! subscribed listeners as a [`SubstitutionEvent`].
//!
//! Unless ignored sets are independent, a character ignored in one slot is
//! ignored in all of them.

use std::collections::BTreeMap;
use std::sync::mpsc;

use tracing::{debug, info, trace};

use crate::error::{AnalysisError, Result};
use crate::subst::event::{ListenerId, Listeners, SubstitutionEvent};
use crate::subst::mono::{Direction, MonoAlphaSubst};
use crate::text::alphabet::{Alphabet, IgnoreSet};
use crate::text::collation::{CharKey, Collator};
use crate::text::tokenize::user_character_key;

/// Whether a substitution uses one alphabet or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstitutionMode {
    Monoalphabetic,
    Polyalphabetic,
}

/// A substitution over one or more rotating alphabets.
#[derive(Debug)]
pub struct Substitution {
    collator: Collator,
    cipher: Alphabet,
    plain: Alphabet,
    slots: Vec<MonoAlphaSubst>,
    current: usize,
    injective: bool,
    ignored_independent: bool,
    listeners: Listeners,
}

impl Substitution {
    /// Creates a monoalphabetic, injective substitution.
    pub fn new(cipher: Alphabet, plain: Alphabet, collator: &Collator) -> Self {
        let slot = MonoAlphaSubst::new(cipher.clone(), plain.clone(), collator);
        Self {
            collator: collator.clone(),
            cipher,
            plain,
            slots: vec![slot],
            current: 0,
            injective: true,
            ignored_independent: false,
            listeners: Listeners::default(),
        }
    }

    pub fn collator(&self) -> &Collator {
        &self.collator
    }

    /// Every cipher character known to the substitution, ignored or not.
    pub fn cipher_alphabet(&self) -> &Alphabet {
        &self.cipher
    }

    pub fn plain_alphabet(&self) -> &Alphabet {
        &self.plain
    }

    pub fn number_of_alphabets(&self) -> usize {
        self.slots.len()
    }

    pub fn mode(&self) -> SubstitutionMode {
        if self.slots.len() == 1 {
            SubstitutionMode::Monoalphabetic
        } else {
            SubstitutionMode::Polyalphabetic
        }
    }

    pub fn is_injective(&self) -> bool {
        self.injective
    }

    pub fn is_ignored_independent(&self) -> bool {
        self.ignored_independent
    }

    /// Returns the slots in rotation order.
    pub fn slots(&self) -> &[MonoAlphaSubst] {
        &self.slots
    }

    /// Returns slot `index`.
    pub fn slot(&self, index: usize) -> Result<&MonoAlphaSubst> {
        self.check_index(index)?;
        Ok(&self.slots[index])
    }

    /// Index of the slot the convenience operations act on.
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> &MonoAlphaSubst {
        &self.slots[self.current]
    }

    /// Chooses the slot the convenience operations act on.
    pub fn set_current(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.current = index;
        Ok(())
    }

    /// Ignore set of slot 0, used by whole-text statistics.
    pub fn first_ignored(&self) -> &IgnoreSet {
        self.slots[0].ignored()
    }

    /// Ignore set of every slot, in rotation order.
    pub fn ignored_characters(&self) -> Vec<IgnoreSet> {
        self.slots.iter().map(|s| s.ignored().clone()).collect()
    }

    /// Active cipher alphabet of every slot, in rotation order.
    pub fn active_cipher_alphabets(&self) -> Vec<Alphabet> {
        self.slots.iter().map(|s| s.cipher_alphabet().clone()).collect()
    }

    /// Selected pairs of every slot, in rotation order.
    pub fn selections(&self) -> Vec<BTreeMap<CharKey, CharKey>> {
        self.slots.iter().map(MonoAlphaSubst::selection).collect()
    }

    /// Registers a callback for change events.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&SubstitutionEvent) + Send + 'static,
    ) -> ListenerId {
        self.listeners.subscribe(callback)
    }

    /// Removes a callback. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Returns a receiver that gets every subsequent change event.
    pub fn channel(&mut self) -> mpsc::Receiver<SubstitutionEvent> {
        self.listeners.channel()
    }

    fn emit(&mut self, event: SubstitutionEvent) {
        trace!(?event, "substitution changed");
        self.listeners.emit(&event);
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.slots.len() {
            return Err(AnalysisError::IndexOutOfRange {
                index,
                len: self.slots.len(),
            });
        }
        Ok(())
    }

    fn new_slot(&self) -> MonoAlphaSubst {
        let mut slot = MonoAlphaSubst::new(self.cipher.clone(), self.plain.clone(), &self.collator);
        slot.set_injective(self.injective);
        if !self.ignored_independent {
            slot.set_ignored(self.slots[0].ignored());
        }
        slot
    }

    /// Grows or shrinks the number of alphabets.
    ///
    /// New slots start from the full cipher and plain alphabets; unless
    /// ignore sets are independent they also take slot 0's ignore set.
    pub fn set_number_of_alphabets(&mut self, count: usize) -> Result<()> {
        if count < 1 {
            return Err(AnalysisError::InvalidAlphabetCount(count));
        }
        if count == self.slots.len() {
            return Ok(());
        }

        while self.slots.len() < count {
            let slot = self.new_slot();
            self.slots.push(slot);
        }
        self.slots.truncate(count);
        self.current = self.current.min(count - 1);

        info!(count, "number of alphabets changed");
        self.emit(SubstitutionEvent::NumberOfAlphabetsChanged { count });
        Ok(())
    }

    /// Adds a character to every slot's cipher alphabet.
    ///
    /// Returns true if any slot changed.
    pub fn add_character_to_cipher_alphabet(&mut self, c: &str) -> Result<bool> {
        let key = user_character_key(c, &self.collator)?;
        self.cipher.insert(key.clone());

        let mut changed = false;
        for slot in self.slots.iter_mut() {
            changed |= slot.add_cipher_key(key.clone());
        }
        if changed {
            self.emit(SubstitutionEvent::CipherAlphabetChanged { alphabet: None });
        }
        Ok(changed)
    }

    /// Adds a character to every slot's plain alphabet.
    ///
    /// Returns true if any slot changed.
    pub fn add_character_to_plain_alphabet(&mut self, c: &str) -> Result<bool> {
        let key = user_character_key(c, &self.collator)?;
        self.plain.insert(key.clone());

        let mut changed = false;
        for slot in self.slots.iter_mut() {
            changed |= slot.add_plain_key(key.clone());
        }
        if changed {
            self.emit(SubstitutionEvent::PlainAlphabetChanged { alphabet: None });
        }
        Ok(changed)
    }

    /// Replaces the cipher alphabet of every slot.
    ///
    /// Ignore sets and selections are cleared.
    pub fn set_cipher_alphabet(&mut self, cipher: Alphabet) {
        for slot in self.slots.iter_mut() {
            slot.set_cipher_alphabet(cipher.clone());
        }
        self.cipher = cipher;
        self.emit(SubstitutionEvent::CipherAlphabetChanged { alphabet: None });
    }

    /// Replaces the plain alphabet and the collation of every slot.
    ///
    /// Selections are cleared.
    pub fn set_plain_alphabet(&mut self, plain: Alphabet, collator: &Collator) {
        for slot in self.slots.iter_mut() {
            slot.set_plain_alphabet(plain.clone(), collator);
        }
        self.cipher.recollate(collator);
        self.plain = plain;
        self.collator = collator.clone();
        self.emit(SubstitutionEvent::PlainAlphabetChanged { alphabet: None });
    }

    /// Turns injective mode on or off for every slot.
    pub fn set_injective(&mut self, injective: bool) {
        self.injective = injective;
        let changed: Vec<usize> = self
            .slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.set_injective(injective).then_some(i))
            .collect();
        for alphabet in changed {
            self.emit(SubstitutionEvent::SubstitutionPairChanged { alphabet });
        }
    }

    /// Lets slots keep separate ignore sets, or makes them share one.
    ///
    /// Going back to shared ignore sets applies the union of all of them to
    /// every slot.
    pub fn set_ignored_independent(&mut self, independent: bool) {
        let was_independent = self.ignored_independent;
        self.ignored_independent = independent;
        if independent || !was_independent {
            return;
        }

        let union: IgnoreSet = self
            .slots
            .iter()
            .flat_map(|s| s.ignored().iter().cloned())
            .collect();
        debug!(characters = union.len(), "merging ignore sets");
        self.set_ignored_everywhere(&union);
    }

    /// Applies `ignored` to every slot.
    pub fn set_ignored_everywhere(&mut self, ignored: &IgnoreSet) {
        let changed: Vec<usize> = self
            .slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.set_ignored(ignored).then_some(i))
            .collect();
        for alphabet in changed {
            self.emit(SubstitutionEvent::IgnoredCharactersChanged { alphabet });
        }
    }

    /// Sets the ignore set of each slot.
    ///
    /// `ignored` must have one set per slot. When ignore sets are shared,
    /// their union is applied to every slot.
    pub fn set_ignored_characters(&mut self, ignored: &[IgnoreSet]) -> Result<()> {
        if ignored.len() != self.slots.len() {
            return Err(AnalysisError::AlphabetCountMismatch {
                expected: self.slots.len(),
                got: ignored.len(),
            });
        }

        if !self.ignored_independent {
            let union: IgnoreSet = ignored.iter().flatten().cloned().collect();
            self.set_ignored_everywhere(&union);
            return Ok(());
        }

        for (alphabet, set) in ignored.iter().enumerate() {
            if self.slots[alphabet].set_ignored(set) {
                self.emit(SubstitutionEvent::IgnoredCharactersChanged { alphabet });
            }
        }
        Ok(())
    }

    /// Sets the ignore set of one slot (of all slots when shared).
    pub fn set_ignored(&mut self, index: usize, ignored: &IgnoreSet) -> Result<()> {
        self.check_index(index)?;
        if !self.ignored_independent {
            self.set_ignored_everywhere(ignored);
        } else if self.slots[index].set_ignored(ignored) {
            self.emit(SubstitutionEvent::IgnoredCharactersChanged { alphabet: index });
        }
        Ok(())
    }

    /// Ignores `c` in slot `index` (in all slots when shared).
    pub fn ignore(&mut self, index: usize, c: &CharKey) -> Result<()> {
        self.check_index(index)?;
        if !self.slots[index].is_cipher_character(c) {
            return Err(AnalysisError::NotInCipherAlphabet(c.as_str().to_string()));
        }

        let targets = if self.ignored_independent {
            vec![index]
        } else {
            (0..self.slots.len())
                .filter(|&i| self.slots[i].is_cipher_character(c))
                .collect()
        };
        for alphabet in targets {
            self.slots[alphabet].ignore(c)?;
            self.emit(SubstitutionEvent::IgnoredCharactersChanged { alphabet });
        }
        Ok(())
    }

    /// Includes the ignored `c` in slot `index` (in all slots when shared).
    pub fn include(&mut self, index: usize, c: &CharKey) -> Result<()> {
        self.check_index(index)?;
        if !self.slots[index].is_ignored(c) {
            return Err(AnalysisError::NotIgnored(c.as_str().to_string()));
        }

        let targets = if self.ignored_independent {
            vec![index]
        } else {
            (0..self.slots.len())
                .filter(|&i| self.slots[i].is_ignored(c))
                .collect()
        };
        for alphabet in targets {
            self.slots[alphabet].include(c)?;
            self.emit(SubstitutionEvent::IgnoredCharactersChanged { alphabet });
        }
        Ok(())
    }

    /// Selects `plain` for `cipher` in slot `index`.
    pub fn select(&mut self, index: usize, cipher: &CharKey, plain: Option<&CharKey>) -> Result<bool> {
        self.check_index(index)?;
        let changed = self.slots[index].select(cipher, plain)?;
        if changed {
            self.emit(SubstitutionEvent::SubstitutionPairChanged { alphabet: index });
        }
        Ok(changed)
    }

    /// Replaces the selection of slot `index`.
    pub fn set_selection(&mut self, index: usize, selection: &BTreeMap<CharKey, CharKey>) -> Result<()> {
        self.check_index(index)?;
        if self.slots[index].set_selection(selection) {
            self.emit(SubstitutionEvent::SubstitutionPairChanged { alphabet: index });
        }
        Ok(())
    }

    /// Replaces the selection of every slot; one map per slot.
    pub fn set_selections(&mut self, selections: &[BTreeMap<CharKey, CharKey>]) -> Result<()> {
        if selections.len() != self.slots.len() {
            return Err(AnalysisError::AlphabetCountMismatch {
                expected: self.slots.len(),
                got: selections.len(),
            });
        }
        for (index, selection) in selections.iter().enumerate() {
            self.set_selection(index, selection)?;
        }
        Ok(())
    }

    fn update_current(&mut self, update: impl FnOnce(&mut MonoAlphaSubst)) {
        update(&mut self.slots[self.current]);
        let alphabet = self.current;
        self.emit(SubstitutionEvent::SubstitutionPairChanged { alphabet });
    }

    /// Clears the selection of the current slot.
    pub fn clear_selections(&mut self) {
        self.update_current(MonoAlphaSubst::clear_selections);
    }

    /// See [`MonoAlphaSubst::select_identity`].
    pub fn select_identity(&mut self) {
        self.update_current(MonoAlphaSubst::select_identity);
    }

    /// See [`MonoAlphaSubst::complete_selection`].
    pub fn complete_selection(&mut self) {
        self.update_current(MonoAlphaSubst::complete_selection);
    }

    /// See [`MonoAlphaSubst::reverse_selection`].
    pub fn reverse_selection(&mut self) {
        self.update_current(MonoAlphaSubst::reverse_selection);
    }

    /// See [`MonoAlphaSubst::invert_selection`].
    pub fn invert_selection(&mut self) {
        self.update_current(MonoAlphaSubst::invert_selection);
    }

    /// See [`MonoAlphaSubst::shift_selection`].
    pub fn shift_selection(&mut self, direction: Direction) {
        self.update_current(|slot| slot.shift_selection(direction));
    }

    /// Copies slot 0's ignore set and selection into the current slot.
    pub fn copy_first_selection_to_current(&mut self) {
        if self.current == 0 {
            return;
        }
        let first = self.slots[0].clone();
        let alphabet = self.current;
        let (ignored_changed, selection_changed) = self.slots[alphabet].copy_from(&first);
        if ignored_changed {
            self.emit(SubstitutionEvent::IgnoredCharactersChanged { alphabet });
        }
        if selection_changed {
            self.emit(SubstitutionEvent::SubstitutionPairChanged { alphabet });
        }
    }
}
