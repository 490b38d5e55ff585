//! History hydration: replay a persisted transcript into the session

use super::{ConversationController, HistoryError, describe_history_failure};
use crate::ports::conversation_logger::ConversationEvent;
use docchat_domain::{Activity, ConversationId, Message};
use tracing::{debug, info, warn};

/// What a history load did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// The session already shows this conversation; nothing was fetched
    Skipped,
    /// The transcript replaced the message list
    Loaded { turns: usize },
}

impl ConversationController {
    /// Replace the session with the persisted transcript of `id`.
    ///
    /// Failures are recorded on the session's `error` field.
    pub async fn load_history(&self, id: &ConversationId) {
        let _ = self.try_load_history(id).await;
    }

    /// Like [`load_history`](Self::load_history), but reports the outcome
    pub async fn try_load_history(
        &self,
        id: &ConversationId,
    ) -> Result<HydrationOutcome, HistoryError> {
        let ticket = self.store.mutate(|txn| {
            if txn.id() == Some(id) && !txn.is_empty() {
                return None;
            }
            let ticket = txn.supersede();
            txn.begin(Activity::Hydrating);
            Some(ticket)
        });
        let Some(ticket) = ticket else {
            debug!("History for {} already loaded, skipping", id);
            return Ok(HydrationOutcome::Skipped);
        };

        info!("Loading history for conversation {}", id);
        let fetched = tokio::select! {
            _ = ticket.cancellation().cancelled() => {
                debug!("History load for {} superseded", id);
                return Err(HistoryError::Superseded);
            }
            fetched = self.history.fetch_history(id) => fetched,
        };

        let turns = match fetched {
            Ok(turns) => turns,
            Err(error) => {
                let message = describe_history_failure(&error);
                let applied = self
                    .store
                    .mutate_if_current(&ticket, |txn| txn.fail(message.clone(), None));
                if applied.is_none() {
                    return Err(HistoryError::Superseded);
                }
                warn!("Loading history for {} failed: {}", id, error);
                self.logger.log(ConversationEvent::new(
                    "history_failed",
                    serde_json::json!({ "conversation_id": id, "error": message }),
                ));
                return Err(HistoryError::Failed(message));
            }
        };

        let now = self.clock.now();
        let count = turns.len();

        self.store
            .mutate_if_current(&ticket, |txn| {
                let mut messages = Vec::with_capacity(count * 2);
                for turn in turns {
                    let sequence = txn.next_sequence();
                    messages.push(Message::user(
                        self.ids.message_id(),
                        sequence,
                        turn.question,
                        now,
                    ));
                    let sequence = txn.next_sequence();
                    messages.push(Message::assistant(
                        self.ids.message_id(),
                        sequence,
                        turn.answer,
                        now,
                    ));
                }
                txn.replace_transcript(id.clone(), messages)
            })
            .ok_or(HistoryError::Superseded)??;

        info!("Loaded {} turns for conversation {}", count, id);
        self.observer.on_history_loaded(id, count);
        self.logger.log(ConversationEvent::new(
            "history_loaded",
            serde_json::json!({ "conversation_id": id, "turns": count }),
        ));
        Ok(HydrationOutcome::Loaded { turns: count })
    }
}
