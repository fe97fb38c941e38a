//! Cooperative cancellation registry for long-running requests.
//!
//! Every supervised request registers under a logical key. Starting a new
//! request for a key cancels the previous one, which notices at its next
//! checkpoint and aborts. Nothing here blocks or preempts; a cancelled
//! request keeps running until it calls [`RequestRegistry::check`].
//!
//! Tokens live in a sharded [`DashMap`] so unrelated keys never contend on a
//! single lock; each token carries its own atomic cancel flag.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::CancellationError;
use crate::domain::models::Category;

/// Logical identity of a supervised request: one live guide generation per
/// vote and guide type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub vote_id: Uuid,
    pub guide_type: Category,
}

impl RequestKey {
    pub fn new(vote_id: Uuid, guide_type: Category) -> Self {
        Self { vote_id, guide_type }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.vote_id, self.guide_type)
    }
}

#[derive(Debug)]
struct RequestToken {
    generation: u64,
    cancelled: AtomicBool,
}

impl RequestToken {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Handle returned by [`RequestRegistry::start`]. Identifies one particular
/// request, so a superseded caller keeps observing its own token rather than
/// the one that replaced it.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    key: RequestKey,
    token: Arc<RequestToken>,
    had_previous: bool,
}

impl RequestTicket {
    pub fn key(&self) -> RequestKey {
        self.key
    }

    /// Whether starting this request cancelled an in-flight one.
    pub fn had_previous(&self) -> bool {
        self.had_previous
    }

    /// Whether this request's own token has been flipped.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Per-key cancellation tokens plus a global shutdown flag.
#[derive(Debug, Default)]
pub struct RequestRegistry {
    tokens: DashMap<RequestKey, Arc<RequestToken>>,
    shutdown: AtomicBool,
    next_generation: AtomicU64,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh token for `key`, cancelling any token already there.
    ///
    /// The swap happens under the key's shard lock, so concurrent starts for
    /// the same key are linearizable: exactly one of them observes an empty
    /// slot, and every later one cancels its predecessor.
    pub fn start(&self, key: RequestKey) -> RequestTicket {
        let token = Arc::new(RequestToken {
            generation: self.next_generation.fetch_add(1, Ordering::Relaxed),
            cancelled: AtomicBool::new(false),
        });

        let had_previous = match self.tokens.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.get().cancel();
                slot.insert(Arc::clone(&token));
                true
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::clone(&token));
                false
            }
        };

        if had_previous {
            tracing::info!(key = %key, "superseded in-flight request");
        }

        RequestTicket { key, token, had_previous }
    }

    /// Remove the ticket's token. A newer token under the same key is left alone.
    pub fn end(&self, ticket: &RequestTicket) {
        self.tokens
            .remove_if(&ticket.key, |_, current| current.generation == ticket.token.generation);
    }

    /// Like [`start`](Self::start), but the returned guard ends the request
    /// when dropped, including when the owning future is dropped mid-await.
    pub fn enter(&self, key: RequestKey) -> RequestGuard<'_> {
        RequestGuard {
            registry: self,
            ticket: self.start(key),
        }
    }

    /// Cancel the live request for `key` without removing it. Returns whether
    /// a request was registered.
    pub fn mark_cancelled(&self, key: RequestKey) -> bool {
        match self.tokens.get(&key) {
            Some(token) => {
                token.cancel();
                tracing::debug!(key = %key, "request marked cancelled");
                true
            }
            None => false,
        }
    }

    /// Checkpoint for the live request under `key`.
    pub fn check_cancellation(&self, key: RequestKey) -> Result<(), CancellationError> {
        if self.is_shutdown() {
            return Err(CancellationError::ShuttingDown);
        }
        match self.tokens.get(&key) {
            None => Err(CancellationError::Released { key: key.to_string() }),
            Some(token) if token.is_cancelled() => {
                Err(CancellationError::Cancelled { key: key.to_string() })
            }
            Some(_) => Ok(()),
        }
    }

    /// Checkpoint for a specific request.
    ///
    /// Fails when the registry is shutting down, when the ticket was
    /// cancelled, or when its token is no longer the one registered.
    pub fn check(&self, ticket: &RequestTicket) -> Result<(), CancellationError> {
        if self.is_shutdown() {
            return Err(CancellationError::ShuttingDown);
        }

        let key = ticket.key.to_string();
        let is_current = self
            .tokens
            .get(&ticket.key)
            .is_some_and(|t| t.generation == ticket.token.generation);

        match (is_current, ticket.token.is_cancelled()) {
            (true, false) => Ok(()),
            (true, true) => Err(CancellationError::Cancelled { key }),
            // only `start` cancels a token it also replaces
            (false, true) => Err(CancellationError::Superseded { key }),
            (false, false) => Err(CancellationError::Released { key }),
        }
    }

    /// Fail every current and future checkpoint.
    pub fn shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            tracing::info!(in_flight = self.tokens.len(), "request registry shutting down");
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Number of registered requests.
    pub fn in_flight(&self) -> usize {
        self.tokens.len()
    }
}

/// Scope guard around a [`RequestTicket`]. Calls [`RequestRegistry::end`] on drop.
#[derive(Debug)]
pub struct RequestGuard<'a> {
    registry: &'a RequestRegistry,
    ticket: RequestTicket,
}

impl Deref for RequestGuard<'_> {
    type Target = RequestTicket;

    fn deref(&self) -> &RequestTicket {
        &self.ticket
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.registry.end(&self.ticket);
    }
}
