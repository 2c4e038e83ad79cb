//! Blocks command - regroup a ciphertext into fixed-size blocks.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use picklock::Session;

use super::{open_session, CommandExecutor, CommonArgs};

/// Rewrite a ciphertext in blocks of N characters.
///
/// Whitespace is dropped first, so blocks of the key length line up the
/// characters enciphered with the same alphabet.
#[derive(Args, Debug)]
pub struct BlocksCommand {
    /// Ciphertext file ("-" reads stdin)
    pub input: PathBuf,

    /// Characters per block
    #[arg(short, long, default_value_t = 5)]
    pub size: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl CommandExecutor for BlocksCommand {
    fn execute(&self) -> Result<()> {
        let session = open_session(self.common.load_config()?, &self.input, None)?;
        print!("{}", self.render(&session)?);
        Ok(())
    }
}

impl BlocksCommand {
    fn render(&self, session: &Session) -> Result<String> {
        Ok(session.ciphertext().in_blocks_of(self.size)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picklock::AnalyzerConfig;

    fn command(size: usize) -> BlocksCommand {
        BlocksCommand {
            input: PathBuf::from("-"),
            size,
            common: CommonArgs::default(),
        }
    }

    #[test]
    fn test_zero_size_is_error() {
        let session = Session::with_text("ABCDEF", AnalyzerConfig::default());
        assert!(command(0).render(&session).is_err());
    }

    #[test]
    fn test_blocks_match_library() {
        let session = Session::with_text("ABC DEF\nGH", AnalyzerConfig::default());
        assert_eq!(
            command(3).render(&session).unwrap(),
            session.ciphertext().in_blocks_of(3).unwrap()
        );
    }
}
