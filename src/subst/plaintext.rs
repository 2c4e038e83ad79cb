//! Plaintext reconstruction.

use crate::subst::substitution::Substitution;
use crate::text::tokenize::Ciphertext;

/// Deciphers `ciphertext` with `substitution`.
///
/// Each character is looked up in the current rotation slot:
/// - a selected cipher character becomes its plain character
/// - a cipher character with nothing selected becomes a space
/// - anything else (ignored, whitespace) is copied unchanged and does not
///   move the rotation
pub fn reconstruct_plaintext(ciphertext: &Ciphertext, substitution: &Substitution) -> String {
    let slots = substitution.slots();
    let mut out = String::with_capacity(ciphertext.as_str().len());
    let mut slot = 0;

    for c in ciphertext.chars() {
        match slots[slot].lookup(c) {
            Some(Some(plain)) => {
                out.push_str(plain.as_str());
                slot = (slot + 1) % slots.len();
            }
            Some(None) => {
                out.push(' ');
                slot = (slot + 1) % slots.len();
            }
            None => out.push_str(c.as_str()),
        }
    }
    out
}
