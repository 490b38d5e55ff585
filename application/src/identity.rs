//! Conversation identity negotiation
//!
//! The client invents a tentative id the first time one is needed; the
//! transport's completion metadata is authoritative afterwards. Ids and
//! message order are independent: nothing here touches messages.

use crate::ports::identity::IdGenerator;
use docchat_domain::ConversationId;
use std::sync::Arc;

/// Id chosen before an exchange is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated {
    pub id: ConversationId,
    /// True when `id` was freshly generated and must be stored on the session
    pub tentative: bool,
}

/// Result of comparing the current id with the server-confirmed one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    /// No confirmation, or the server echoed the current id
    Kept(ConversationId),
    /// The server assigned a different id
    Replaced {
        previous: ConversationId,
        confirmed: ConversationId,
    },
}

impl Reconciled {
    /// The canonical id after reconciliation
    pub fn id(&self) -> &ConversationId {
        match self {
            Reconciled::Kept(id) => id,
            Reconciled::Replaced { confirmed, .. } => confirmed,
        }
    }

    pub fn into_id(self) -> ConversationId {
        match self {
            Reconciled::Kept(id) => id,
            Reconciled::Replaced { confirmed, .. } => confirmed,
        }
    }
}

/// Produces and reconciles conversation ids
pub struct IdentityNegotiator {
    ids: Arc<dyn IdGenerator>,
}

impl IdentityNegotiator {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    /// Return the current id, or generate a tentative one if none exists
    pub fn obtain(&self, current: Option<&ConversationId>) -> Negotiated {
        match current {
            Some(id) => Negotiated {
                id: id.clone(),
                tentative: false,
            },
            None => Negotiated {
                id: self.ids.conversation_id(),
                tentative: true,
            },
        }
    }

    /// Decide the canonical id once the transport has answered
    pub fn reconcile(
        &self,
        current: &ConversationId,
        confirmed: Option<ConversationId>,
    ) -> Reconciled {
        match confirmed {
            Some(confirmed) if &confirmed != current => Reconciled::Replaced {
                previous: current.clone(),
                confirmed,
            },
            _ => Reconciled::Kept(current.clone()),
        }
    }
}
