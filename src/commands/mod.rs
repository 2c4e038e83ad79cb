//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.
//! Options shared by every command (locale, config file, filters, verbosity)
//! live in [`CommonArgs`] and are flattened into each command.

mod blocks;
mod decrypt;
mod freq;
mod kasiski;
mod profile;
mod stats;

pub use blocks::BlocksCommand;
pub use decrypt::DecryptCommand;
pub use freq::FreqCommand;
pub use kasiski::KasiskiCommand;
pub use profile::ProfileCommand;
pub use stats::StatsCommand;

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use picklock::text::tokenize;
use picklock::{AnalyzerConfig, CharKey, Collator, IgnoreSet, Locale, Session};

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self) -> Result<()>;
}

/// Options accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Locale of the text, e.g. en, es_MX (overrides the config file)
    #[arg(short, long)]
    pub locale: Option<Locale>,

    /// JSON config file (missing fields take their defaults)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long)]
    pub verbose: bool,

    /// Count whitespace as ordinary characters
    #[arg(long)]
    pub keep_whitespace: bool,

    /// Count control characters as ordinary characters
    #[arg(long)]
    pub keep_control: bool,
}

impl CommonArgs {
    /// Loads the config file, if any, and applies the command-line overrides.
    pub fn load_config(&self) -> Result<AnalyzerConfig> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => AnalyzerConfig::default(),
        };

        if let Some(locale) = &self.locale {
            config.locale = locale.clone();
        }
        if self.keep_whitespace {
            config.filter.ignore_whitespace = false;
        }
        if self.keep_control {
            config.filter.ignore_control = false;
        }
        Ok(config)
    }
}

/// Reads the input text from a file, or from stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read text from stdin")?;
        return Ok(buffer);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Opens a session on `input`.
///
/// `ignore` lists characters to leave out of every statistic.
pub fn open_session(config: AnalyzerConfig, input: &Path, ignore: Option<&str>) -> Result<Session> {
    let text = read_input(input)?;
    let mut session = Session::with_text(&text, config);

    let ignored = ignore_set(ignore, session.collator());
    if !ignored.is_empty() {
        session.substitution_mut().set_ignored_everywhere(&ignored);
    }
    Ok(session)
}

/// Splits a command-line character list into an ignore set.
pub fn ignore_set(chars: Option<&str>, collator: &Collator) -> IgnoreSet {
    chars
        .map(|chars| tokenize::tokenize(chars, collator).into_iter().collect())
        .unwrap_or_default()
}

/// Renders a character for terminal output, escaping invisible ones.
pub fn display_char(c: &str) -> String {
    if c.chars().any(|ch| ch.is_whitespace() || ch.is_control()) {
        c.escape_default().to_string()
    } else {
        c.to_string()
    }
}

/// Renders a key's text for terminal output.
pub fn display_key(c: &CharKey) -> String {
    display_char(c.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_overrides() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "locale": "fr", "injective": false }}"#).unwrap();

        let args = CommonArgs {
            locale: Some("es".parse().unwrap()),
            config: Some(file.path().to_path_buf()),
            keep_whitespace: true,
            ..Default::default()
        };
        let config = args.load_config().unwrap();
        assert_eq!(config.locale.language(), "es");
        assert!(!config.injective);
        assert!(!config.filter.ignore_whitespace);
        assert!(config.filter.ignore_control);
    }

    #[test]
    fn test_missing_config_is_error() {
        let args = CommonArgs {
            config: Some(PathBuf::from("/nonexistent/picklock.json")),
            ..Default::default()
        };
        assert!(args.load_config().is_err());
    }

    #[test]
    fn test_read_input_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "LXFOPV").unwrap();
        assert_eq!(read_input(file.path()).unwrap(), "LXFOPV");
    }

    #[test]
    fn test_open_session_applies_ignore_list() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "AB,C.").unwrap();

        let session = open_session(AnalyzerConfig::default(), file.path(), Some(",.")).unwrap();
        assert_eq!(
            session.substitution().slots()[0].cipher_alphabet().to_strings(),
            vec!["A", "B", "C"]
        );
        assert_eq!(session.substitution().first_ignored().len(), 2);
    }

    #[test]
    fn test_ignore_set_splits_user_characters() {
        let c = Collator::default();
        let set = ignore_set(Some(",.e\u{301}"), &c);
        assert_eq!(set.len(), 3);
        assert!(set.contains(&c.key("é")));
        assert!(ignore_set(None, &c).is_empty());
    }

    #[test]
    fn test_display_char() {
        assert_eq!(display_char("a"), "a");
        assert_eq!(display_char(" "), " ");
        assert_eq!(display_char("\n"), "\\n");
    }
}
