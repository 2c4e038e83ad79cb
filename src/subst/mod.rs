//! Substitution model: cipher→plain mappings over rotating alphabets.

pub mod event;
pub mod mono;
pub mod plaintext;
pub mod substitution;

pub use event::{ListenerId, SubstitutionEvent};
pub use mono::{Direction, MonoAlphaSubst};
pub use plaintext::reconstruct_plaintext;
pub use substitution::{Substitution, SubstitutionMode};
