//! Freq command - character, bigram and trigram frequencies.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use picklock::{FrequencyReport, FrequencyTable, Session};

use super::{display_key, open_session, CommandExecutor, CommonArgs};

/// Count how often each character appears in a ciphertext.
///
/// With one alphabet, bigram and trigram tables are printed too. With
/// several (-n), characters are dealt to the alphabets in rotation and one
/// table is printed per alphabet.
#[derive(Args, Debug)]
pub struct FreqCommand {
    /// Ciphertext file ("-" reads stdin)
    pub input: PathBuf,

    /// Number of alphabets of the key
    #[arg(short = 'n', long, default_value_t = 1)]
    pub alphabets: usize,

    /// Characters to leave out, e.g. ",.;"
    #[arg(short, long)]
    pub ignore: Option<String>,

    /// Sort by count instead of alphabetically
    #[arg(long)]
    pub by_frequency: bool,

    /// Print JSON instead of tables
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommandExecutor for FreqCommand {
    fn execute(&self) -> Result<()> {
        let mut session = open_session(self.common.load_config()?, &self.input, self.ignore.as_deref())?;
        print!("{}", self.render(&mut session)?);
        Ok(())
    }
}

impl FreqCommand {
    fn render(&self, session: &mut Session) -> Result<String> {
        session
            .substitution_mut()
            .set_number_of_alphabets(self.alphabets)?;
        let report = session.frequencies()?;

        if self.json {
            let value = match &report {
                FrequencyReport::Monoalphabetic {
                    characters,
                    bigrams,
                    trigrams,
                } => json!({
                    "characters": characters.rows(),
                    "bigrams": bigrams.rows(),
                    "trigrams": trigrams.rows(),
                }),
                FrequencyReport::Polyalphabetic { alphabets } => json!({
                    "alphabets": alphabets.iter().map(FrequencyTable::rows).collect::<Vec<_>>(),
                }),
            };
            return Ok(serde_json::to_string_pretty(&value)? + "\n");
        }

        let mut out = String::new();
        match &report {
            FrequencyReport::Monoalphabetic {
                characters,
                bigrams,
                trigrams,
            } => {
                self.write_table(&mut out, "Characters", characters);
                self.write_table(&mut out, "Bigrams", bigrams);
                self.write_table(&mut out, "Trigrams", trigrams);
            }
            FrequencyReport::Polyalphabetic { alphabets } => {
                for (i, table) in alphabets.iter().enumerate() {
                    self.write_table(&mut out, &format!("Alphabet {}", i + 1), table);
                }
            }
        }
        Ok(out)
    }

    fn write_table(&self, out: &mut String, title: &str, table: &FrequencyTable) {
        let total = table.total();
        let _ = writeln!(out, "{} ({} counted)", title, total);

        let entries: Vec<_> = if self.by_frequency {
            table.by_frequency()
        } else {
            table.iter().collect()
        };
        for entry in entries {
            let percent = if total == 0 {
                0.0
            } else {
                entry.count() as f64 * 100.0 / total as f64
            };
            let _ = writeln!(
                out,
                "  {:<6} {:>6} {:>6.2}%",
                display_key(entry.key()),
                entry.count(),
                percent
            );
        }
        out.push('\n');
    }
}
