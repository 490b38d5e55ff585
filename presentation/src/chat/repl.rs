//! REPL (Read-Eval-Print Loop) for interactive chat

use super::command::ReplCommand;
use crate::ConsoleFormatter;
use colored::Colorize;
use docchat_application::{ConversationController, HistoryError, HydrationOutcome, SendError};
use docchat_domain::{ConversationId, Role};
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

const HISTORY_CAPACITY: usize = 1000;

/// Interactive chat REPL
pub struct ChatRepl {
    controller: Arc<ConversationController>,
    /// Answers are streamed by the controller's observer
    show_progress: bool,
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new(controller: Arc<ConversationController>) -> Self {
        Self {
            controller,
            show_progress: true,
            history_path: dirs::data_dir().map(|p| p.join("docchat").join("history.txt")),
        }
    }

    /// Set whether answers are already streamed while they arrive
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Override the line-editor history file
    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.history_path = path;
        }
        self
    }

    fn line_editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_path else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("Could not open REPL history {}: {}", path.display(), e);
                editor
            }
        }
    }

    /// Run the interactive REPL until `/quit` or end of input
    pub async fn run(&self) -> io::Result<()> {
        let mut editor = self.line_editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("docchat".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if let Some(command) = ReplCommand::parse(line) {
                        if self.handle_command(command).await {
                            break;
                        }
                        continue;
                    }

                    self.process_question(line).await;
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                _ => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "docchat - chat mode".cyan().bold());
        match self.controller.state().id() {
            Some(id) => println!("Conversation: {}", id),
            None => println!("A new conversation starts with your first question."),
        }
        println!();
        println!("{}", ReplCommand::help_text());
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    async fn handle_command(&self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => {
                println!();
                println!("{}", ReplCommand::help_text());
                println!();
            }
            ReplCommand::New => {
                self.controller.clear();
                println!("Started a new conversation.");
            }
            ReplCommand::Id => match self.controller.state().id() {
                Some(id) => println!("{}", id),
                None => println!("(no conversation yet)"),
            },
            ReplCommand::History => {
                println!();
                print!(
                    "{}",
                    ConsoleFormatter::format_transcript(&self.controller.state())
                );
                println!();
            }
            ReplCommand::Load(id) => self.load(ConversationId::from(id)).await,
            ReplCommand::MissingArgument(usage) => println!("Usage: {}", usage),
            ReplCommand::Unknown(line) => {
                println!("Unknown command: {}", line);
                println!("Type /help for available commands");
            }
        }
        false
    }

    async fn load(&self, id: ConversationId) {
        match self.controller.try_load_history(&id).await {
            Ok(HydrationOutcome::Skipped) => println!("Already showing {}.", id),
            Ok(HydrationOutcome::Loaded { .. }) => {
                println!();
                print!(
                    "{}",
                    ConsoleFormatter::format_transcript(&self.controller.state())
                );
                println!();
            }
            Err(HistoryError::Failed(error)) => eprint!("{}", ConsoleFormatter::format_error(&error)),
            Err(e) => eprint!("{}", ConsoleFormatter::format_error(&e.to_string())),
        }
    }

    async fn process_question(&self, question: &str) {
        println!();

        match self.controller.try_send(question).await {
            Ok(_) => {
                if !self.show_progress
                    && let Some(answer) = self
                        .controller
                        .state()
                        .messages()
                        .iter()
                        .rev()
                        .find(|m| m.role == Role::Assistant)
                {
                    println!("{}", answer.text);
                }
            }
            Err(SendError::Busy) => {
                eprintln!("{}", "Still waiting on the previous answer.".yellow())
            }
            Err(e) => eprint!("{}", ConsoleFormatter::format_error(&e.to_string())),
        }
        println!();
    }
}
