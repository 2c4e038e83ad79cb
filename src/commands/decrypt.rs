//! Decrypt command - apply a substitution key to a ciphertext.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;
use tracing::warn;

use picklock::text::user_character_key;
use picklock::{CharKey, IgnoreSet, Session};

use super::{open_session, CommandExecutor, CommonArgs};

/// A substitution key as stored on disk.
///
/// ```json
/// { "ignore": [",", "."], "alphabets": [ { "A": "e", "B": "t" }, { "A": "a" } ] }
/// ```
///
/// One map per alphabet, in rotation order; each maps a cipher character
/// to its plain character.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct KeyFile {
    /// Characters copied through without moving the rotation.
    pub ignore: Vec<String>,
    /// Selections, one per alphabet.
    pub alphabets: Vec<BTreeMap<String, String>>,
}

impl KeyFile {
    /// Loads a key from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read key {}", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Invalid key file {}", path.display()))
    }

    /// Sets up the session's substitution from this key.
    ///
    /// Every plain character of the key is added to the plain alphabet.
    /// Entries the substitution rejects (unknown cipher characters, or plain
    /// characters reused in injective mode) are skipped with a warning.
    pub fn apply(&self, session: &mut Session) -> Result<()> {
        let collator = session.collator().clone();
        let substitution = session.substitution_mut();

        substitution.set_number_of_alphabets(self.alphabets.len().max(1))?;

        let ignored = self
            .ignore
            .iter()
            .map(|c| user_character_key(c, &collator))
            .collect::<picklock::Result<IgnoreSet>>()?;
        substitution.set_ignored_everywhere(&ignored);

        for (index, pairs) in self.alphabets.iter().enumerate() {
            let mut selection = BTreeMap::new();
            for (cipher, plain) in pairs {
                substitution.add_character_to_plain_alphabet(plain)?;
                let cipher: CharKey = user_character_key(cipher, &collator)?;
                selection.insert(cipher, user_character_key(plain, &collator)?);
            }
            substitution.set_selection(index, &selection)?;

            let applied = substitution.slot(index)?.selection().len();
            if applied < selection.len() {
                warn!(
                    alphabet = index,
                    skipped = selection.len() - applied,
                    "some key entries were not applied"
                );
            }
        }
        Ok(())
    }
}

/// Decipher a ciphertext with a substitution key.
///
/// Cipher characters the key leaves unmapped are shown as spaces; ignored
/// characters and whitespace are copied unchanged.
#[derive(Args, Debug)]
pub struct DecryptCommand {
    /// Ciphertext file ("-" reads stdin)
    pub input: PathBuf,

    /// Key file (JSON)
    #[arg(short, long)]
    pub key: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommandExecutor for DecryptCommand {
    fn execute(&self) -> Result<()> {
        let key = KeyFile::load(&self.key)?;
        let mut session = open_session(self.common.load_config()?, &self.input, None)?;
        key.apply(&mut session)?;
        println!("{}", session.plaintext());
        Ok(())
    }
}
