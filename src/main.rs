//! Picklock - classical cryptanalysis from the command line
//!
//! Frequency tables, coincidence index, Friedman and Kasiski tests, language
//! profiles and substitution keys for breaking classical ciphers by hand.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    BlocksCommand, CommandExecutor, CommonArgs, DecryptCommand, FreqCommand, KasiskiCommand,
    ProfileCommand, StatsCommand,
};

/// Picklock - classical cryptanalysis toolkit
///
/// Statistics for breaking monoalphabetic and polyalphabetic (Vigenère-style)
/// substitution ciphers. Text is compared letter by letter the way a reader
/// of the chosen locale sees it.
#[derive(Parser)]
#[command(name = "picklock")]
#[command(version)]
#[command(about = "Classical cryptanalysis: frequencies, coincidence index, Friedman and Kasiski tests")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Character, bigram and trigram frequencies
    Freq(FreqCommand),

    /// Repeated sequences and the factors of their spacing
    Kasiski(KasiskiCommand),

    /// Coincidence index and estimated number of alphabets
    Stats(StatsCommand),

    /// Build a language profile from a sample text
    Profile(ProfileCommand),

    /// Decipher a text with a substitution key
    Decrypt(DecryptCommand),

    /// Regroup a text in blocks of N characters
    Blocks(BlocksCommand),
}

impl Commands {
    fn common(&self) -> &CommonArgs {
        match self {
            Commands::Freq(cmd) => &cmd.common,
            Commands::Kasiski(cmd) => &cmd.common,
            Commands::Stats(cmd) => &cmd.common,
            Commands::Profile(cmd) => &cmd.common,
            Commands::Decrypt(cmd) => &cmd.common,
            Commands::Blocks(cmd) => &cmd.common,
        }
    }

    fn executor(&self) -> &dyn CommandExecutor {
        match self {
            Commands::Freq(cmd) => cmd,
            Commands::Kasiski(cmd) => cmd,
            Commands::Stats(cmd) => cmd,
            Commands::Profile(cmd) => cmd,
            Commands::Decrypt(cmd) => cmd,
            Commands::Blocks(cmd) => cmd,
        }
    }
}

/// Logs go to stderr. RUST_LOG wins unless --verbose is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("picklock=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("picklock=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.command.common().verbose);

    cli.command.executor().execute()
}
