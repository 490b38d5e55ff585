//! HTTP gateway implementation

use crate::http::decoder::Utf8StreamDecoder;
use crate::http::error::{HttpError, Result};
use crate::http::protocol::{
    CONVERSATION_HEADER, HISTORY_PATH, QUERY_STREAM_PATH, QueryRequest, parse_detail,
};
use async_trait::async_trait;
use docchat_application::{AnswerStream, AnswerTransport, GatewayError, HistorySource};
use docchat_domain::{ConversationId, HistoryTurn, Question, StreamEvent};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Explicit configuration for [`HttpChatGateway`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpGatewayConfig {
    /// Service base address, e.g. `http://localhost:8000`
    pub base_url: String,
    /// Whole-request timeout for history fetches
    pub request_timeout: Option<Duration>,
    /// TCP/TLS connect timeout for every request
    pub connect_timeout: Option<Duration>,
    /// Response header carrying the authoritative conversation id
    pub conversation_header: String,
    /// Capacity of the chunk channel between the body reader and the controller
    pub stream_buffer: usize,
}

impl Default for HttpGatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout: Some(Duration::from_secs(30)),
            connect_timeout: Some(Duration::from_secs(10)),
            conversation_header: CONVERSATION_HEADER.to_string(),
            stream_buffer: 64,
        }
    }
}

/// Gateway to the question-answering service over HTTP
pub struct HttpChatGateway {
    client: reqwest::Client,
    base_url: String,
    /// `{base_url}/v1/history`; the conversation id is pushed as one path segment
    history_url: reqwest::Url,
    config: HttpGatewayConfig,
}

impl HttpChatGateway {
    /// Create a gateway for the configured base address
    pub fn new(config: HttpGatewayConfig) -> Result<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        let history_url = reqwest::Url::parse(&format!("{}{}", base_url, HISTORY_PATH))
            .map_err(|e| HttpError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: e.to_string(),
            })?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("docchat/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build().map_err(HttpError::Client)?;

        info!("HttpChatGateway initialized for {}", base_url);

        Ok(Self {
            client,
            base_url,
            history_url,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST the question and start pumping the body into an [`AnswerStream`].
    ///
    /// Resolves as soon as the status and headers are in; the body is read
    /// by a background task that stops once the receiver is dropped.
    pub async fn open_answer_stream(
        &self,
        question: &Question,
        conversation_id: Option<&ConversationId>,
    ) -> Result<AnswerStream> {
        let body = QueryRequest {
            question: question.content(),
            conversation_id: conversation_id.map(|id| id.as_str()),
        };

        debug!(
            "POST {} (conversation {:?})",
            QUERY_STREAM_PATH, body.conversation_id
        );
        let response = self
            .client
            .post(self.url(QUERY_STREAM_PATH))
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let confirmed = response
            .headers()
            .get(self.config.conversation_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(ConversationId::from);

        let (tx, rx) = mpsc::channel(self.config.stream_buffer.max(1));
        tokio::spawn(pump_body(response, tx));

        Ok(AnswerStream::new(confirmed, rx))
    }

    /// GET the transcript of a conversation
    pub async fn fetch_transcript(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<HistoryTurn>> {
        let mut url = self.history_url.clone();
        url.path_segments_mut()
            .map_err(|_| HttpError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: "cannot be a base".to_string(),
            })?
            .push(conversation_id.as_str());
        debug!("GET {}", url);

        let mut request = self.client.get(url);
        if let Some(timeout) = self.config.request_timeout {
            request = request.timeout(timeout);
        }
        let response = ensure_success(request.send().await?).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl AnswerTransport for HttpChatGateway {
    async fn ask_stream(
        &self,
        question: &Question,
        conversation_id: Option<&ConversationId>,
    ) -> std::result::Result<AnswerStream, GatewayError> {
        self.open_answer_stream(question, conversation_id)
            .await
            .map_err(GatewayError::from)
    }
}

#[async_trait]
impl HistorySource for HttpChatGateway {
    async fn fetch_history(
        &self,
        conversation_id: &ConversationId,
    ) -> std::result::Result<Vec<HistoryTurn>, GatewayError> {
        self.fetch_transcript(conversation_id)
            .await
            .map_err(GatewayError::from)
    }
}

/// Turn a non-success response into [`HttpError::Status`], keeping the body text
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let detail = parse_detail(&body);
    warn!("Service returned {}: {}", status, body);
    Err(HttpError::Status {
        status: status.as_u16(),
        body,
        detail,
    })
}

/// Read the body chunk by chunk and forward decoded text in order.
///
/// Returns as soon as the receiver is gone, which drops the response and
/// closes the connection even if the server has stalled.
async fn pump_body(response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
    let mut body = response.bytes_stream();
    let mut decoder = Utf8StreamDecoder::new();
    let mut answer = String::new();

    loop {
        let item = tokio::select! {
            _ = tx.closed() => {
                debug!("Answer receiver dropped, stop reading body");
                return;
            }
            item = body.next() => item,
        };
        let Some(item) = item else {
            break;
        };

        match item {
            Ok(bytes) => {
                let text = decoder.decode(&bytes);
                if text.is_empty() {
                    continue;
                }
                answer.push_str(&text);
                if tx.send(StreamEvent::Delta(text)).await.is_err() {
                    debug!("Answer receiver dropped, stop reading body");
                    return;
                }
            }
            Err(e) => {
                warn!("Answer stream broke: {}", e);
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
        }
    }

    let tail = decoder.finish();
    if !tail.is_empty() {
        answer.push_str(&tail);
        if tx.send(StreamEvent::Delta(tail)).await.is_err() {
            return;
        }
    }
    let _ = tx.send(StreamEvent::Completed(answer)).await;
}

/// Validate the scheme and strip trailing slashes
fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(HttpError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(HttpError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }
    Ok(trimmed.to_string())
}
