//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for docchat
#[derive(Parser, Debug)]
#[command(name = "docchat")]
#[command(author, version, about = "Ask questions about your documents from the terminal")]
#[command(long_about = r#"
docchat talks to a document question-answering service. Each question is
sent with the current conversation id, and the answer is streamed back as
it is generated.

Configuration files are loaded from (in priority order):
1. DOCCHAT_* environment variables (e.g. DOCCHAT_SERVER__BASE_URL)
2. --config <path>     Explicit config file
3. ./docchat.toml      Project-level config
4. ~/.config/docchat/config.toml   Global config

Example:
  docchat "What does the onboarding guide say about VPN access?"
  docchat -c 3f2c9a0e-... "And for contractors?"
  docchat -c 3f2c9a0e-... --history
  docchat --chat
"#)]
pub struct Cli {
    /// The question to ask (not required in chat or history mode)
    pub question: Option<String>,

    /// Continue an existing conversation (its history is loaded first)
    #[arg(short = 'c', long = "conversation", value_name = "ID")]
    pub conversation: Option<String>,

    /// Print the transcript of --conversation and exit
    #[arg(long, requires = "conversation")]
    pub history: bool,

    /// Start interactive chat mode
    #[arg(long)]
    pub chat: bool,

    /// Print the final session as JSON instead of streaming text
    #[arg(long)]
    pub json: bool,

    /// Service base URL (overrides server.base_url)
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Do not stream answer chunks as they arrive
    #[arg(short, long)]
    pub quiet: bool,

    /// Append a JSONL transcript of session events to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_resume_with_question() {
        let cli = Cli::try_parse_from(["docchat", "-c", "abc", "next?"]).unwrap();
        assert_eq!(cli.conversation.as_deref(), Some("abc"));
        assert_eq!(cli.question.as_deref(), Some("next?"));
        assert!(!cli.history);
    }

    #[test]
    fn history_requires_conversation() {
        assert!(Cli::try_parse_from(["docchat", "--history"]).is_err());
        let cli = Cli::try_parse_from(["docchat", "--history", "-c", "abc"]).unwrap();
        assert!(cli.history);
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["docchat", "-vv", "--chat"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.chat);
    }
}
