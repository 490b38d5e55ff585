//! Slash commands understood by the chat REPL

/// A parsed `/command` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Clear the session and start a fresh conversation
    New,
    /// Replace the session with the transcript of a conversation
    Load(String),
    /// Show the current conversation id
    Id,
    /// Print the transcript
    History,
    Help,
    Quit,
    /// A known command was given without its argument
    MissingArgument(&'static str),
    Unknown(String),
}

impl ReplCommand {
    /// Parse a line; `None` when it is not a command
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let rest = line.strip_prefix('/')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name {
            "new" | "clear" => ReplCommand::New,
            "load" | "l" if arg.is_empty() => ReplCommand::MissingArgument("/load <conversation-id>"),
            "load" | "l" => ReplCommand::Load(arg.to_string()),
            "id" => ReplCommand::Id,
            "history" | "hist" => ReplCommand::History,
            "help" | "h" | "?" => ReplCommand::Help,
            "quit" | "exit" | "q" => ReplCommand::Quit,
            _ => ReplCommand::Unknown(line.to_string()),
        };
        Some(command)
    }

    pub fn help_text() -> &'static str {
        "Commands:\n  \
         /new               - Start a new conversation\n  \
         /load <id>         - Load an existing conversation\n  \
         /id                - Show the current conversation id\n  \
         /history           - Print the transcript\n  \
         /help, /h, /?      - Show this help\n  \
         /quit, /exit, /q   - Exit chat"
    }
}
