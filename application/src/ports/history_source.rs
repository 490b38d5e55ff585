//! History source port
//!
//! Fetches the persisted transcript of a conversation.

use super::answer_transport::GatewayError;
use async_trait::async_trait;
use docchat_domain::{ConversationId, HistoryTurn};

/// Source of persisted question/answer transcripts
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Fetch all turns of a conversation, oldest first
    async fn fetch_history(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<Vec<HistoryTurn>, GatewayError>;
}
