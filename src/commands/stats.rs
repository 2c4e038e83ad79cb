//! Stats command - coincidence index and Friedman's key-length estimate.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use picklock::analysis::stats;
use picklock::session::NO_ESTIMATE;
use picklock::{AlphabetEstimate, AnalysisError, EstimateUnavailable, LanguageProfile, Session};

use super::{open_session, CommandExecutor, CommonArgs};

/// Print the coincidence index of a ciphertext and estimate how many
/// alphabets its key has.
///
/// The estimate needs the coincidence index of the plaintext language,
/// either from a language profile (--profile) or given directly
/// (--reference-ci with --alphabet-size).
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Ciphertext file ("-" reads stdin)
    pub input: PathBuf,

    /// Characters to leave out, e.g. ",.;"
    #[arg(short, long)]
    pub ignore: Option<String>,

    /// Language profile (JSON, see the profile command)
    #[arg(short, long, conflicts_with_all = ["reference_ci", "alphabet_size"])]
    pub profile: Option<PathBuf>,

    /// Coincidence index of the plaintext language, e.g. 0.0667 for English
    #[arg(long, requires = "alphabet_size")]
    pub reference_ci: Option<f64>,

    /// Size of the plaintext alphabet, e.g. 26
    #[arg(long, requires = "reference_ci")]
    pub alphabet_size: Option<usize>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommandExecutor for StatsCommand {
    fn execute(&self) -> Result<()> {
        let mut session = open_session(self.common.load_config()?, &self.input, self.ignore.as_deref())?;
        if let Some(path) = &self.profile {
            let profile = LanguageProfile::load(path)
                .with_context(|| format!("Failed to load profile {}", path.display()))?;
            session.set_profile(profile);
        }
        print!("{}", self.render(&session));
        Ok(())
    }
}

impl StatsCommand {
    fn render(&self, session: &Session) -> String {
        let ignored = session.substitution().first_ignored();
        let counted = stats::accepted_characters(session.ciphertext(), ignored, session.filter()).total();

        let mut out = String::new();
        let _ = writeln!(out, "Characters: {}", counted);
        let _ = match session.coincidence_index() {
            Some(ci) => writeln!(out, "Coincidence index: {:.4}", ci),
            None => writeln!(out, "Coincidence index: {}", NO_ESTIMATE),
        };

        let (estimate, reason) = self.estimate(session);
        let _ = match reason {
            Some(reason) => writeln!(out, "Estimated alphabets: {} ({})", estimate, reason),
            None => writeln!(out, "Estimated alphabets: {}", estimate),
        };
        out
    }

    fn estimate(&self, session: &Session) -> (String, Option<String>) {
        if let (Some(reference), Some(size)) = (self.reference_ci, self.alphabet_size) {
            return match stats::estimate_number_of_alphabets(
                session.ciphertext(),
                session.substitution().first_ignored(),
                session.filter(),
                reference,
                size,
            ) {
                Ok(value) => (format!("{:.2}", value), None),
                Err(e) => (NO_ESTIMATE.to_string(), Some(error_reason(&e))),
            };
        }

        let estimate = session.number_of_alphabets_estimate();
        let reason = match estimate {
            AlphabetEstimate::Estimate(_) => None,
            AlphabetEstimate::CannotEstimate(why) => Some(unavailable_reason(why)),
        };
        (estimate.to_string(), reason)
    }
}

fn unavailable_reason(why: EstimateUnavailable) -> String {
    match why {
        EstimateUnavailable::NoProfile => {
            "no language profile; use --profile or --reference-ci".to_string()
        }
        EstimateUnavailable::InvalidReferenceIndex => {
            "the profile has no usable coincidence index".to_string()
        }
        EstimateUnavailable::EmptyPlainAlphabet => "the plain alphabet is empty".to_string(),
        EstimateUnavailable::PlainAlphabetTooSmall { plain, cipher } => format!(
            "plain alphabet ({}) is smaller than the cipher alphabet ({})",
            plain, cipher
        ),
        EstimateUnavailable::TooFewCharacters => "too few characters".to_string(),
    }
}

fn error_reason(e: &AnalysisError) -> String {
    match e {
        AnalysisError::TooFewCharacters { .. } => "too few characters".to_string(),
        other => other.to_string(),
    }
}
