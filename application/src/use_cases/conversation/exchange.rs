//! Message lifecycle: one streamed exchange
//!
//! `Idle → Sending → Streaming → { Resolved | Failed }`
//!
//! The user message and an empty pending placeholder are appended
//! optimistically, the transport is asked, chunks are appended to the
//! placeholder in arrival order, and on completion the placeholder is
//! frozen and the conversation id reconciled.

use super::{ConversationController, SendError, describe_send_failure};
use crate::config::PlaceholderPolicy;
use crate::identity::Reconciled;
use crate::ports::answer_transport::GatewayError;
use crate::ports::conversation_logger::ConversationEvent;
use crate::store::Ticket;
use docchat_domain::{Activity, ConversationId, Message, MessageId, Question, StreamEvent};
use tracing::{debug, info, warn};

impl ConversationController {
    /// Send a question and wait for the streamed answer.
    ///
    /// Returns the (possibly server-updated) conversation id, or `None` when
    /// the question was blank, another request was in flight, the exchange
    /// failed, or the session moved on before the answer arrived.
    pub async fn send_message(&self, text: &str) -> Option<ConversationId> {
        self.try_send(text).await.ok()
    }

    /// Like [`send_message`](Self::send_message), but reports why no id was produced
    pub async fn try_send(&self, text: &str) -> Result<ConversationId, SendError> {
        let question = Question::try_new(text).ok_or(SendError::EmptyQuestion)?;

        let now = self.clock.now();
        let user_id = self.ids.message_id();
        let placeholder_id = self.ids.message_id();

        let (ticket, conversation_id) = self
            .store
            .mutate(|txn| -> Result<(Ticket, ConversationId), SendError> {
                if txn.is_loading() {
                    return Err(SendError::Busy);
                }
                if let Some(abandoned) = txn.close_abandoned() {
                    debug!("Closed abandoned placeholder {}", abandoned);
                }
                let ticket = txn.supersede();

                let sequence = txn.next_sequence();
                txn.append(Message::user(user_id, sequence, question.content(), now))?;

                let negotiated = self.identity.obtain(txn.id());
                if negotiated.tentative {
                    txn.set_id(negotiated.id.clone());
                }

                let sequence = txn.next_sequence();
                txn.append(Message::placeholder(placeholder_id.clone(), sequence, now))?;
                txn.begin(Activity::Sending);
                Ok((ticket, negotiated.id))
            })
            .inspect_err(|e| {
                if matches!(e, SendError::Busy) {
                    warn!("Rejected send while another request is in progress");
                }
            })?;

        info!("Exchange started in conversation {}", conversation_id);
        self.observer.on_exchange_start(question.content(), &conversation_id);
        self.logger.log(ConversationEvent::new(
            "exchange_started",
            serde_json::json!({
                "conversation_id": conversation_id,
                "question": question.content(),
            }),
        ));

        match self
            .stream_answer(&ticket, &question, &conversation_id, &placeholder_id)
            .await
        {
            Ok(id) => Ok(id),
            Err(StreamFailure::Superseded) => {
                debug!(
                    "Dropping exchange from generation {} after the session moved on",
                    ticket.generation()
                );
                Err(SendError::Superseded)
            }
            Err(StreamFailure::Domain(e)) => Err(SendError::Domain(e)),
            Err(StreamFailure::Gateway(error)) => {
                Err(self.fail_exchange(&ticket, &placeholder_id, &error))
            }
        }
    }

    async fn stream_answer(
        &self,
        ticket: &Ticket,
        question: &Question,
        conversation_id: &ConversationId,
        placeholder_id: &MessageId,
    ) -> Result<ConversationId, StreamFailure> {
        let cancellation = ticket.cancellation().clone();

        let opened = tokio::select! {
            _ = cancellation.cancelled() => return Err(StreamFailure::Superseded),
            opened = self.transport.ask_stream(question, Some(conversation_id)) => opened,
        };
        let mut stream = opened.map_err(StreamFailure::Gateway)?;

        self.store
            .mutate_if_current(ticket, |txn| txn.set_activity(Activity::Streaming))
            .ok_or(StreamFailure::Superseded)?;

        let mut answer = String::new();
        loop {
            let event = tokio::select! {
                _ = cancellation.cancelled() => return Err(StreamFailure::Superseded),
                event = stream.receiver.recv() => event,
            };

            match event {
                Some(StreamEvent::Delta(chunk)) => {
                    self.store
                        .mutate_if_current(ticket, |txn| txn.append_chunk(placeholder_id, &chunk))
                        .ok_or(StreamFailure::Superseded)??;
                    self.observer.on_chunk(&chunk);
                    answer.push_str(&chunk);
                }
                Some(StreamEvent::Completed(text)) => {
                    if answer.is_empty() && !text.is_empty() {
                        self.observer.on_chunk(&text);
                        answer = text;
                    }
                    break;
                }
                Some(StreamEvent::Error(e)) => {
                    return Err(StreamFailure::Gateway(GatewayError::StreamInterrupted(e)));
                }
                // Channel closed without Completed: the body simply ended
                None => break,
            }
        }

        let reconciled = self
            .store
            .mutate_if_current(ticket, |txn| -> Result<Reconciled, StreamFailure> {
                let current = txn.id().cloned().unwrap_or_else(|| conversation_id.clone());
                let reconciled = self
                    .identity
                    .reconcile(&current, stream.conversation_id.take());
                if let Reconciled::Replaced { confirmed, .. } = &reconciled {
                    txn.set_id(confirmed.clone());
                }
                txn.finalize(placeholder_id, answer.clone())?;
                txn.finish();
                Ok(reconciled)
            })
            .ok_or(StreamFailure::Superseded)??;

        if let Reconciled::Replaced {
            previous,
            confirmed,
        } = &reconciled
        {
            info!("Server confirmed conversation {} (was {})", confirmed, previous);
        }
        let id = reconciled.into_id();

        info!(
            "Exchange completed in conversation {} ({} bytes)",
            id,
            answer.len()
        );
        self.observer.on_exchange_complete(&id);
        self.logger.log(ConversationEvent::new(
            "exchange_completed",
            serde_json::json!({
                "conversation_id": id,
                "question": question.content(),
                "answer": answer,
            }),
        ));
        Ok(id)
    }

    /// Record a failed exchange on the session, if it is still current
    fn fail_exchange(
        &self,
        ticket: &Ticket,
        placeholder_id: &MessageId,
        error: &GatewayError,
    ) -> SendError {
        let message = describe_send_failure(error);
        let close = match self.config.placeholder_on_failure {
            PlaceholderPolicy::KeepPending => None,
            PlaceholderPolicy::MarkFailed => Some(placeholder_id),
        };

        let applied = self
            .store
            .mutate_if_current(ticket, |txn| txn.fail(message.clone(), close));
        if applied.is_none() {
            debug!("Dropping failure from a superseded exchange: {}", error);
            return SendError::Superseded;
        }

        warn!("Exchange failed: {}", error);
        self.observer.on_exchange_failed(&message);
        self.logger.log(ConversationEvent::new(
            "exchange_failed",
            serde_json::json!({ "error": message }),
        ));
        SendError::Failed(message)
    }
}

enum StreamFailure {
    Superseded,
    Gateway(GatewayError),
    Domain(docchat_domain::DomainError),
}

impl From<docchat_domain::DomainError> for StreamFailure {
    fn from(e: docchat_domain::DomainError) -> Self {
        StreamFailure::Domain(e)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::config::{PlaceholderPolicy, SessionConfig};
    use crate::ports::answer_transport::GatewayError;
    use crate::SendError;
    use docchat_domain::{Activity, ConversationId, MessageStatus, Role, StreamEvent};
    use std::sync::Arc;

    #[tokio::test]
    async fn n_exchanges_alternate_user_and_assistant() {
        let transport = ScriptedTransport::new(vec![
            Ok(answer(None, &["one"])),
            Ok(answer(None, &["t", "wo"])),
            Ok(answer(None, &["three"])),
        ]);
        let controller = controller(transport, ScriptedHistory::new(vec![]));

        for q in ["q1", "q2", "q3"] {
            assert!(controller.send_message(q).await.is_some());
        }

        let state = controller.state();
        let messages = state.messages();
        assert_eq!(messages.len(), 6);
        let texts: Vec<_> = messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["q1", "one", "q2", "two", "q3", "three"]);
        for (i, m) in messages.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(m.role, expected);
            assert_eq!(m.status, MessageStatus::Final);
        }
        assert!(messages.windows(2).all(|w| w[0].sequence < w[1].sequence));
        assert!(!state.is_loading());
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn first_send_assigns_tentative_id_and_sends_it() {
        let transport = ScriptedTransport::new(vec![Ok(answer(None, &["a"]))]);
        let controller = controller(transport.clone(), ScriptedHistory::new(vec![]));

        let id = controller.send_message("hello").await.unwrap();
        assert_eq!(controller.state().id(), Some(&id));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "hello");
        assert_eq!(requests[0].1.as_ref(), Some(&id));
    }

    #[tokio::test]
    async fn id_stays_stable_without_server_confirmation() {
        let transport = ScriptedTransport::new(vec![
            Ok(answer(Some("X"), &["1"])),
            Ok(answer(None, &["2"])),
        ]);
        let controller = controller(transport.clone(), ScriptedHistory::new(vec![]));

        let first = controller.send_message("a").await.unwrap();
        assert_eq!(first.as_str(), "X");
        let second = controller.send_message("b").await.unwrap();
        assert_eq!(second.as_str(), "X");
        assert_eq!(controller.state().id(), Some(&ConversationId::from("X")));
        assert_eq!(transport.requests()[1].1, Some(ConversationId::from("X")));
    }

    #[tokio::test]
    async fn server_id_replaces_current_without_reordering() {
        let transport = ScriptedTransport::new(vec![
            Ok(answer(Some("X"), &["1"])),
            Ok(answer(Some("Y"), &["2"])),
        ]);
        let controller = controller(transport, ScriptedHistory::new(vec![]));

        controller.send_message("a").await.unwrap();
        let before: Vec<_> = controller
            .state()
            .messages()
            .iter()
            .map(|m| m.id.clone())
            .collect();

        let id = controller.send_message("b").await.unwrap();
        assert_eq!(id.as_str(), "Y");

        let state = controller.state();
        assert_eq!(state.id(), Some(&ConversationId::from("Y")));
        let after: Vec<_> = state.messages().iter().map(|m| m.id.clone()).collect();
        assert_eq!(&after[..2], &before[..]);
    }

    #[tokio::test]
    async fn transport_rejection_leaves_pending_placeholder() {
        let transport = ScriptedTransport::new(vec![Err(GatewayError::Connection(
            "connection refused".to_string(),
        ))]);
        let controller = controller(transport, ScriptedHistory::new(vec![]));

        let result = controller.try_send("hi").await;
        assert_eq!(
            result,
            Err(SendError::Failed("Connection error: connection refused".to_string()))
        );

        let state = controller.state();
        assert!(!state.is_loading());
        assert!(!state.error().unwrap().is_empty());
        let messages = state.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].text, "hi");
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].status, MessageStatus::Pending);
        assert!(messages[1].text.is_empty());
    }

    #[tokio::test]
    async fn server_error_is_reported_with_status() {
        let transport = ScriptedTransport::new(vec![Err(GatewayError::Server {
            status: 502,
            body: "bad gateway".to_string(),
            detail: None,
        })]);
        let controller = controller(transport, ScriptedHistory::new(vec![]));

        assert!(controller.send_message("hi").await.is_none());
        assert_eq!(controller.state().error(), Some("HTTP 502: bad gateway"));
    }

    #[tokio::test]
    async fn mark_failed_policy_closes_placeholder() {
        let transport =
            ScriptedTransport::new(vec![Err(GatewayError::Timeout), Ok(answer(None, &["ok"]))]);
        let controller = controller(transport, ScriptedHistory::new(vec![])).with_config(
            SessionConfig::default().with_placeholder_policy(PlaceholderPolicy::MarkFailed),
        );

        controller.send_message("hi").await;
        let state = controller.state();
        assert_eq!(state.messages()[1].status, MessageStatus::Failed);
        assert!(state.pending_message().is_none());
    }

    #[tokio::test]
    async fn next_send_closes_abandoned_placeholder() {
        let transport = ScriptedTransport::new(vec![
            Err(GatewayError::Timeout),
            Ok(answer(None, &["second"])),
        ]);
        let controller = controller(transport, ScriptedHistory::new(vec![]));

        assert!(controller.send_message("first").await.is_none());
        let failed = controller.state();
        assert_eq!(failed.messages()[1].status, MessageStatus::Pending);
        assert_eq!(failed.error(), Some("Request timed out"));

        let id = controller.send_message("first").await;
        assert!(id.is_some());

        let state = controller.state();
        assert_eq!(state.messages().len(), 4);
        assert_eq!(state.messages()[1].status, MessageStatus::Failed);
        assert_eq!(state.messages()[3].text, "second");
        assert!(state.pending_message().is_none());
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn blank_question_is_a_no_op() {
        let transport = ScriptedTransport::new(vec![]);
        let controller = controller(transport.clone(), ScriptedHistory::new(vec![]));

        assert_eq!(controller.try_send("   ").await, Err(SendError::EmptyQuestion));
        assert!(controller.state().messages().is_empty());
        assert!(controller.state().id().is_none());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn completed_text_used_when_no_deltas() {
        let transport = ScriptedTransport::new(vec![Ok(Scripted {
            conversation_id: None,
            events: vec![StreamEvent::Completed("whole answer".to_string())],
        })]);
        let controller = controller(transport, ScriptedHistory::new(vec![]));

        controller.send_message("q").await.unwrap();
        assert_eq!(controller.state().messages()[1].text, "whole answer");
    }

    #[tokio::test]
    async fn mid_stream_error_fails_exchange() {
        let transport = ScriptedTransport::new(vec![Ok(Scripted {
            conversation_id: None,
            events: vec![
                StreamEvent::Delta("par".to_string()),
                StreamEvent::Error("connection reset".to_string()),
            ],
        })]);
        let controller = controller(transport, ScriptedHistory::new(vec![]));

        assert!(controller.send_message("q").await.is_none());
        let state = controller.state();
        assert_eq!(state.error(), Some("Stream interrupted: connection reset"));
        assert_eq!(state.messages()[1].status, MessageStatus::Pending);
        assert_eq!(state.messages()[1].text, "par");
    }

    #[tokio::test]
    async fn chunks_reach_observer_in_order() {
        let observer = Arc::new(RecordingObserver::default());
        let transport = ScriptedTransport::new(vec![Ok(answer(Some("C"), &["a", "b", "c"]))]);
        let controller =
            controller(transport, ScriptedHistory::new(vec![])).with_observer(observer.clone());

        controller.send_message("q").await.unwrap();
        assert_eq!(*observer.chunks.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(
            *observer.completed.lock().unwrap(),
            vec![ConversationId::from("C")]
        );
    }

    #[tokio::test]
    async fn exchange_events_are_logged() {
        let logger = Arc::new(RecordingLogger::default());
        let transport =
            ScriptedTransport::new(vec![Ok(answer(None, &["a"])), Err(GatewayError::Timeout)]);
        let controller =
            controller(transport, ScriptedHistory::new(vec![])).with_logger(logger.clone());

        controller.send_message("one").await;
        controller.send_message("two").await;
        assert_eq!(
            logger.types(),
            vec![
                "exchange_started",
                "exchange_completed",
                "exchange_started",
                "exchange_failed"
            ]
        );
    }

    #[tokio::test]
    async fn reentrant_send_is_rejected_while_streaming() {
        let (transport, tx) = GatedTransport::new(Some("S"));
        let controller = Arc::new(controller(transport, ScriptedHistory::new(vec![])));

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.try_send("first").await })
        };
        wait_until(&controller, |s| s.activity() == Activity::Streaming).await;

        tx.send(StreamEvent::Delta("partial".to_string())).await.unwrap();
        wait_until(&controller, |s| {
            s.pending_message().map(|m| m.text.as_str()) == Some("partial")
        })
        .await;

        assert_eq!(controller.try_send("second").await, Err(SendError::Busy));
        let state = controller.state();
        assert_eq!(state.messages().len(), 2);
        assert!(state.is_loading());

        tx.send(StreamEvent::Completed(String::new())).await.unwrap();
        let id = first.await.unwrap().unwrap();
        assert_eq!(id.as_str(), "S");

        let state = controller.state();
        assert_eq!(state.messages()[1].text, "partial");
        assert_eq!(state.messages()[1].status, MessageStatus::Final);
        assert!(!state.is_loading());
    }

    #[tokio::test]
    async fn clear_discards_late_completion() {
        let (transport, tx) = GatedTransport::new(Some("S"));
        let controller = Arc::new(controller(transport, ScriptedHistory::new(vec![])));

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.try_send("first").await })
        };
        wait_until(&controller, |s| s.activity() == Activity::Streaming).await;

        controller.clear();
        assert_eq!(first.await.unwrap(), Err(SendError::Superseded));

        // The transport may still try to deliver; nothing reaches the session
        let _ = tx.send(StreamEvent::Completed("late".to_string())).await;
        tokio::task::yield_now().await;

        let state = controller.state();
        assert!(state.id().is_none());
        assert!(state.messages().is_empty());
        assert!(state.error().is_none());
        assert!(!state.is_loading());
    }
}
