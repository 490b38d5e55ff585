//! Deterministic fakes for controller tests

use super::ConversationController;
use crate::ports::answer_transport::{AnswerStream, AnswerTransport, GatewayError};
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::exchange_observer::ExchangeObserver;
use crate::ports::history_source::HistorySource;
use crate::ports::identity::{Clock, IdGenerator};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use docchat_domain::{
    ConversationId, ConversationSession, HistoryTurn, MessageId, Question, StreamEvent,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// ==================== Transports ====================

/// A scripted answer: the confirmed id plus the events to deliver
pub struct Scripted {
    pub conversation_id: Option<ConversationId>,
    pub events: Vec<StreamEvent>,
}

pub fn answer(conversation_id: Option<&str>, chunks: &[&str]) -> Scripted {
    Scripted {
        conversation_id: conversation_id.map(ConversationId::from),
        events: chunks
            .iter()
            .map(|c| StreamEvent::Delta(c.to_string()))
            .collect(),
    }
}

/// Replays pre-recorded answers and records every request
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Scripted, GatewayError>>>,
    pub requests: Mutex<Vec<(String, Option<ConversationId>)>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<Scripted, GatewayError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<(String, Option<ConversationId>)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerTransport for ScriptedTransport {
    async fn ask_stream(
        &self,
        question: &Question,
        conversation_id: Option<&ConversationId>,
    ) -> Result<AnswerStream, GatewayError> {
        self.requests
            .lock()
            .unwrap()
            .push((question.content().to_string(), conversation_id.cloned()));
        let scripted = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Connection("no more responses".to_string())))?;

        let (tx, rx) = mpsc::channel(scripted.events.len().max(1));
        for event in scripted.events {
            tx.try_send(event).unwrap();
        }
        Ok(AnswerStream::new(scripted.conversation_id, rx))
    }
}

/// Hands out a stream whose events the test pushes by hand
pub struct GatedTransport {
    stream: Mutex<Option<AnswerStream>>,
}

impl GatedTransport {
    pub fn new(conversation_id: Option<&str>) -> (Arc<Self>, mpsc::Sender<StreamEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let stream = AnswerStream::new(conversation_id.map(ConversationId::from), rx);
        (
            Arc::new(Self {
                stream: Mutex::new(Some(stream)),
            }),
            tx,
        )
    }
}

#[async_trait]
impl AnswerTransport for GatedTransport {
    async fn ask_stream(
        &self,
        _question: &Question,
        _conversation_id: Option<&ConversationId>,
    ) -> Result<AnswerStream, GatewayError> {
        self.stream
            .lock()
            .unwrap()
            .take()
            .ok_or(GatewayError::TransportClosed)
    }
}

// ==================== History ====================

pub struct ScriptedHistory {
    responses: Mutex<VecDeque<Result<Vec<HistoryTurn>, GatewayError>>>,
    pub calls: AtomicU64,
}

impl ScriptedHistory {
    pub fn new(responses: Vec<Result<Vec<HistoryTurn>, GatewayError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicU64::new(0),
        })
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistorySource for ScriptedHistory {
    async fn fetch_history(
        &self,
        _conversation_id: &ConversationId,
    ) -> Result<Vec<HistoryTurn>, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Connection("no more history".to_string())))
    }
}

/// History fetch that waits until the test releases it
pub struct GatedHistory {
    release: Mutex<Option<tokio::sync::oneshot::Receiver<Vec<HistoryTurn>>>>,
}

impl GatedHistory {
    pub fn new() -> (Arc<Self>, tokio::sync::oneshot::Sender<Vec<HistoryTurn>>) {
        let (tx, rx) = tokio::sync::oneshot::channel();
        (
            Arc::new(Self {
                release: Mutex::new(Some(rx)),
            }),
            tx,
        )
    }
}

#[async_trait]
impl HistorySource for GatedHistory {
    async fn fetch_history(
        &self,
        _conversation_id: &ConversationId,
    ) -> Result<Vec<HistoryTurn>, GatewayError> {
        let rx = self
            .release
            .lock()
            .unwrap()
            .take()
            .ok_or(GatewayError::TransportClosed)?;
        rx.await.map_err(|_| GatewayError::TransportClosed)
    }
}

// ==================== Ids, clock, observers ====================

#[derive(Default)]
pub struct SequentialIds(AtomicU64);

impl IdGenerator for SequentialIds {
    fn conversation_id(&self) -> ConversationId {
        ConversationId::new(format!("conv-{}", self.0.fetch_add(1, Ordering::SeqCst)))
    }

    fn message_id(&self) -> MessageId {
        MessageId::new(format!("msg-{}", self.0.fetch_add(1, Ordering::SeqCst)))
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingLogger {
    pub fn types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }
}

impl ConversationLogger for RecordingLogger {
    fn log(&self, event: ConversationEvent) {
        self.events.lock().unwrap().push(event.event_type);
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    pub chunks: Mutex<Vec<String>>,
    pub completed: Mutex<Vec<ConversationId>>,
    pub failures: Mutex<Vec<String>>,
}

impl ExchangeObserver for RecordingObserver {
    fn on_chunk(&self, chunk: &str) {
        self.chunks.lock().unwrap().push(chunk.to_string());
    }

    fn on_exchange_complete(&self, conversation_id: &ConversationId) {
        self.completed.lock().unwrap().push(conversation_id.clone());
    }

    fn on_exchange_failed(&self, error: &str) {
        self.failures.lock().unwrap().push(error.to_string());
    }
}

// ==================== Helpers ====================

pub fn controller(
    transport: Arc<dyn AnswerTransport>,
    history: Arc<dyn HistorySource>,
) -> ConversationController {
    ConversationController::new(
        transport,
        history,
        Arc::new(SequentialIds::default()),
        Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 3, 16, 12, 0, 0).unwrap())),
    )
}

/// Yield until `pred` holds for the controller state
pub async fn wait_until(
    controller: &ConversationController,
    pred: impl Fn(&ConversationSession) -> bool,
) {
    for _ in 0..200 {
        if pred(&controller.state()) {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached: {:?}", controller.state());
}
