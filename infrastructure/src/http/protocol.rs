//! Wire types for the question-answering HTTP API

use serde::{Deserialize, Serialize};

/// Path of the streamed question endpoint
pub const QUERY_STREAM_PATH: &str = "/v1/query-stream";

/// Path prefix of the history endpoint (`/v1/history/{conversation_id}`)
pub const HISTORY_PATH: &str = "/v1/history";

/// Default response header carrying the authoritative conversation id
pub const CONVERSATION_HEADER: &str = "x-conversation-id";

/// Body of a streamed question request
#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub question: &'a str,
    /// `null` when the client has no id yet
    pub conversation_id: Option<&'a str>,
}

/// Error body returned by the service on non-success statuses
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

/// Extract a human-readable `detail` from an error body, if present.
///
/// String details are used as-is; structured details (e.g. validation
/// error lists) are rendered as compact JSON.
pub fn parse_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}
