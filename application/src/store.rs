//! Session state store
//!
//! The single source of truth for the conversation session. Every
//! mutation runs under one lock, so readers never observe a half-applied
//! change. The lock is never held across an `.await`.
//!
//! Each store carries a *generation*. Operations that replace what the
//! session is about (a new exchange, a history load, a clear) take a new
//! generation and receive a [`Ticket`]; continuations that resume later
//! must present their ticket, and are dropped if the generation moved on.

use docchat_domain::ConversationSession;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

/// Proof that an operation was started under a given generation
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    cancellation: CancellationToken,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fires when the generation is superseded
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

struct StoreState {
    session: ConversationSession,
    generation: u64,
    next_sequence: u64,
    cancellation: CancellationToken,
}

/// Exclusive access to the session for the duration of one mutation
pub struct Transaction<'a> {
    state: &'a mut StoreState,
}

impl Transaction<'_> {
    /// Allocate the next message sequence number
    pub fn next_sequence(&mut self) -> u64 {
        let sequence = self.state.next_sequence;
        self.state.next_sequence += 1;
        sequence
    }

    /// Start a new generation, cancelling whatever ran under the old one
    pub fn supersede(&mut self) -> Ticket {
        self.state.cancellation.cancel();
        self.state.generation += 1;
        self.state.cancellation = CancellationToken::new();
        Ticket {
            generation: self.state.generation,
            cancellation: self.state.cancellation.clone(),
        }
    }
}

impl Deref for Transaction<'_> {
    type Target = ConversationSession;

    fn deref(&self) -> &Self::Target {
        &self.state.session
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state.session
    }
}

/// Lock-guarded owner of the conversation session
pub struct SessionStore {
    state: Mutex<StoreState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                session: ConversationSession::new(),
                generation: 0,
                next_sequence: 0,
                cancellation: CancellationToken::new(),
            }),
        }
    }

    /// A consistent copy of the current session
    pub fn snapshot(&self) -> ConversationSession {
        self.lock().session.clone()
    }

    /// Apply a mutation unconditionally
    pub fn mutate<R>(&self, f: impl FnOnce(&mut Transaction<'_>) -> R) -> R {
        let mut guard = self.lock();
        let mut txn = Transaction { state: &mut *guard };
        f(&mut txn)
    }

    /// Apply a mutation only if `ticket` still matches the current generation.
    ///
    /// Returns `None` (and leaves the session untouched) for stale tickets.
    pub fn mutate_if_current<R>(
        &self,
        ticket: &Ticket,
        f: impl FnOnce(&mut Transaction<'_>) -> R,
    ) -> Option<R> {
        let mut guard = self.lock();
        if guard.generation != ticket.generation {
            return None;
        }
        let mut txn = Transaction { state: &mut *guard };
        Some(f(&mut txn))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        // Mutations never panic midway, so a poisoned state is still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
