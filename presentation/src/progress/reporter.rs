//! Streams answer chunks to the terminal as they arrive

use colored::Colorize;
use docchat_application::ExchangeObserver;
use docchat_domain::ConversationId;
use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Writes each chunk immediately, followed by a newline once the answer is complete
pub struct StreamPrinter<W: Write + Send = Stdout> {
    out: Mutex<W>,
    /// Whether anything was written for the current answer
    wrote_chunk: AtomicBool,
}

impl StreamPrinter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> StreamPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            wrote_chunk: AtomicBool::new(false),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }

    fn end_answer(&self) {
        if self.wrote_chunk.swap(false, Ordering::SeqCst) {
            self.write("\n");
        }
    }
}

impl<W: Write + Send> ExchangeObserver for StreamPrinter<W> {
    fn on_exchange_start(&self, _question: &str, _conversation_id: &ConversationId) {
        self.wrote_chunk.store(false, Ordering::SeqCst);
    }

    fn on_chunk(&self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        self.wrote_chunk.store(true, Ordering::SeqCst);
        self.write(chunk);
    }

    fn on_exchange_complete(&self, _conversation_id: &ConversationId) {
        self.end_answer();
    }

    fn on_exchange_failed(&self, _error: &str) {
        self.end_answer();
    }

    fn on_history_loaded(&self, conversation_id: &ConversationId, turns: usize) {
        self.write(&format!(
            "{}\n",
            format!("Loaded {} turns of {}", turns, conversation_id).dimmed()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(printer: StreamPrinter<Vec<u8>>) -> String {
        String::from_utf8(printer.into_inner()).unwrap()
    }

    #[test]
    fn chunks_are_written_in_order_then_terminated() {
        let printer = StreamPrinter::new(Vec::new());
        let id = ConversationId::from("c");

        printer.on_exchange_start("q", &id);
        printer.on_chunk("Hel");
        printer.on_chunk("");
        printer.on_chunk("lo");
        printer.on_exchange_complete(&id);

        assert_eq!(output(printer), "Hello\n");
    }

    #[test]
    fn failure_without_chunks_writes_nothing() {
        let printer = StreamPrinter::new(Vec::new());
        printer.on_exchange_start("q", &ConversationId::from("c"));
        printer.on_exchange_failed("HTTP 500: boom");

        assert_eq!(output(printer), "");
    }

    #[test]
    fn history_notice_is_one_line() {
        colored::control::set_override(false);
        let printer = StreamPrinter::new(Vec::new());
        printer.on_history_loaded(&ConversationId::from("c-9"), 3);

        assert_eq!(output(printer), "Loaded 3 turns of c-9\n");
    }
}
