//! Interactive chat module
//!
//! Provides a line-editor based chat loop over one conversation session.

mod command;
mod repl;

pub use command::ReplCommand;
pub use repl::ChatRepl;
