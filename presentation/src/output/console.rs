//! Console output formatter for conversation sessions

use colored::Colorize;
use docchat_domain::{ConversationSession, Message, MessageStatus, Role};

/// Formats sessions and messages for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the whole transcript, one block per message
    pub fn format_transcript(session: &ConversationSession) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {}\n",
            "Conversation:".cyan().bold(),
            session
                .id()
                .map(|id| id.as_str())
                .unwrap_or("(none)")
        ));

        if session.is_empty() {
            output.push_str(&format!("{}\n", "No messages yet.".dimmed()));
        }
        for message in session.messages() {
            output.push('\n');
            output.push_str(&Self::format_message(message));
        }

        if let Some(error) = session.error() {
            output.push('\n');
            output.push_str(&Self::format_error(error));
        }

        output
    }

    /// Format a single message with its role label
    pub fn format_message(message: &Message) -> String {
        let label = match message.role {
            Role::User => "You:".green().bold(),
            Role::Assistant => "Assistant:".blue().bold(),
        };
        let suffix = match message.status {
            MessageStatus::Final => String::new(),
            MessageStatus::Pending => format!(" {}", "(pending)".yellow()),
            MessageStatus::Failed => format!(" {}", "(failed)".red()),
        };
        format!("{}{}\n{}\n", label, suffix, message.text)
    }

    pub fn format_error(error: &str) -> String {
        format!("{} {}\n", "Error:".red().bold(), error)
    }

    /// Trailer printed after a streamed answer
    pub fn format_conversation_id(session: &ConversationSession) -> String {
        match session.id() {
            Some(id) => format!("{} {}", "conversation:".dimmed(), id.as_str().dimmed()),
            None => String::new(),
        }
    }

    /// Format the session snapshot as JSON
    pub fn format_json(session: &ConversationSession) -> String {
        serde_json::to_string_pretty(session).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use docchat_domain::{ConversationId, MessageId};

    fn session() -> ConversationSession {
        let at = Utc.with_ymd_and_hms(2025, 3, 16, 12, 0, 0).unwrap();
        let mut session = ConversationSession::new();
        session.set_id(ConversationId::from("c-7"));
        session
            .append(Message::user(MessageId::from("m1"), 1, "What is docchat?", at))
            .unwrap();
        session
            .append(Message::placeholder(MessageId::from("m2"), 2, at))
            .unwrap();
        session
            .append_chunk(&MessageId::from("m2"), "A terminal client")
            .unwrap();
        session
    }

    #[test]
    fn transcript_lists_messages_in_order() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format_transcript(&session());
        assert_eq!(
            output,
            "Conversation: c-7\n\
             \nYou:\nWhat is docchat?\n\
             \nAssistant: (pending)\nA terminal client\n"
        );
    }

    #[test]
    fn empty_transcript_says_so() {
        colored::control::set_override(false);
        let output = ConsoleFormatter::format_transcript(&ConversationSession::new());
        assert_eq!(output, "Conversation: (none)\nNo messages yet.\n");
    }

    #[test]
    fn json_snapshot_carries_messages() {
        let value: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&session())).unwrap();
        assert_eq!(value["id"], "c-7");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][1]["status"], "pending");
        assert_eq!(value["activity"], "idle");
    }
}
