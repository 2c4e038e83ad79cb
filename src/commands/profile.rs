//! Profile command - extract language frequencies from a sample text.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use picklock::{AlphabetRules, AnalyzerConfig, Collator, LanguageProfile};

use super::{read_input, CommandExecutor, CommonArgs};

/// Build a language profile from a sample plaintext.
///
/// The profile holds character, bigram and trigram counts. Its characters
/// become the plain alphabet and its coincidence index the reference for
/// the key-length estimate (see the stats command).
///
/// Alphabet rules (JSON) select which characters count:
/// { "locale": "es", "include": [..], "ignore": [..],
///   "include_exclusively": [..], "replace": { "á": "a" } }
#[derive(Args, Debug)]
pub struct ProfileCommand {
    /// Sample text file ("-" reads stdin)
    pub sample: PathBuf,

    /// Alphabet rules file (JSON)
    #[arg(short, long)]
    pub rules: Option<PathBuf>,

    /// Output file (prints to stdout if not given)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommandExecutor for ProfileCommand {
    fn execute(&self) -> Result<()> {
        let config = self.common.load_config()?;
        let rules = match &self.rules {
            Some(path) => AlphabetRules::from_json_file(path)
                .with_context(|| format!("Failed to load rules {}", path.display()))?,
            None => AlphabetRules::default(),
        };
        let sample = read_input(&self.sample)?;

        let profile = build_profile(&sample, &rules, &config)?;
        match &self.output {
            Some(path) => {
                profile
                    .save(path)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), "profile written");
                println!(
                    "Profile written to {} ({} characters)",
                    path.display(),
                    profile.characters().len()
                );
            }
            None => println!("{}", profile.to_json()?),
        }
        Ok(())
    }
}

/// Extracts a profile; the rules' locale wins over the configured one.
fn build_profile(
    sample: &str,
    rules: &AlphabetRules,
    config: &AnalyzerConfig,
) -> Result<LanguageProfile> {
    let locale = rules.locale.clone().unwrap_or_else(|| config.locale.clone());
    let collator = Collator::for_locale(locale);
    Ok(LanguageProfile::extract(
        sample,
        rules,
        &collator,
        &config.filter,
    )?)
}
