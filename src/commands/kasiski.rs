//! Kasiski command - repeated sequences and their spacing.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use tracing::debug;

use picklock::analysis::sort_entries;
use picklock::{KasiskiEntry, KasiskiOrder, Session};

use super::{open_session, CommandExecutor, CommonArgs};

/// Shifts between two progress log lines.
const PROGRESS_STEP: usize = 1000;

/// Sort order of the listing.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortBy {
    /// Longest sequences first
    #[default]
    Length,
    /// Most repeated sequences first
    Frequency,
}

impl From<SortBy> for KasiskiOrder {
    fn from(sort: SortBy) -> Self {
        match sort {
            SortBy::Length => KasiskiOrder::Length,
            SortBy::Frequency => KasiskiOrder::Frequency,
        }
    }
}

/// List repeated sequences, the distances between them and the prime
/// factors of those distances.
///
/// Factors shared by most distances hint at the key length of a
/// polyalphabetic cipher.
#[derive(Args, Debug)]
pub struct KasiskiCommand {
    /// Ciphertext file ("-" reads stdin)
    pub input: PathBuf,

    /// Characters to leave out, e.g. ",.;"
    #[arg(short, long)]
    pub ignore: Option<String>,

    /// Shortest sequence to list (overrides the config file)
    #[arg(short, long)]
    pub min_length: Option<usize>,

    /// Sort order
    #[arg(short, long, value_enum, default_value_t = SortBy::Length)]
    pub sort: SortBy,

    /// List at most this many sequences
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print JSON instead of a listing
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommandExecutor for KasiskiCommand {
    fn execute(&self) -> Result<()> {
        let mut config = self.common.load_config()?;
        if let Some(min_length) = self.min_length {
            config.kasiski_min_length = min_length;
        }

        let session = open_session(config, &self.input, self.ignore.as_deref())?;
        print!("{}", self.render(&session)?);
        Ok(())
    }
}

impl KasiskiCommand {
    fn render(&self, session: &Session) -> Result<String> {
        let mut entries = session.kasiski_with_progress(|shift, total| {
            if shift % PROGRESS_STEP == 0 {
                debug!(shift, total, "kasiski scan");
            }
            true
        })?;
        sort_entries(&mut entries, self.sort.into());
        if let Some(limit) = self.limit {
            entries.truncate(limit);
        }

        if self.json {
            return Ok(serde_json::to_string_pretty(&entries)? + "\n");
        }

        if entries.is_empty() {
            return Ok("No repeated sequences\n".to_string());
        }
        let mut out = String::new();
        for entry in &entries {
            write_entry(&mut out, entry);
        }
        Ok(out)
    }
}

fn write_entry(out: &mut String, entry: &KasiskiEntry) {
    let positions: Vec<String> = entry.positions().iter().map(|p| p.to_string()).collect();
    let spacing: Vec<String> = entry
        .distances()
        .iter()
        .zip(entry.factors())
        .map(|(distance, factors)| {
            let factors: Vec<String> = factors.iter().map(|f| f.to_string()).collect();
            format!("{} ({})", distance, factors.join("x"))
        })
        .collect();

    let _ = writeln!(
        out,
        "{}  x{}  at {}  distances {}",
        entry.sequence().as_str(),
        entry.occurrences(),
        positions.join(", "),
        spacing.join(", ")
    );
}
