//! Per-caller wait context.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A caller's own cancellation scope.
///
/// Only the caller's *wait* is bound to this context. Cancelling it (or letting
/// its timeout elapse) makes that caller give up; it never reaches the record or
/// the worker computing it. Clones share the same token.
#[derive(Debug, Clone)]
pub struct CallerContext {
    request_id: Uuid,
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallerContext {
    /// A context that is never cancelled and never times out.
    pub fn background() -> Self {
        Self {
            request_id: Uuid::now_v7(),
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// Use an existing request id (e.g. from an `x-request-id` header).
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Give up waiting once `timeout` has elapsed from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this caller's wait.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves once the caller is cancelled or its timeout elapses.
    pub async fn cancelled(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    () = self.token.cancelled() => {}
                    () = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Context for work spawned on behalf of this caller.
    ///
    /// Keeps the request id for log correlation but shares neither the token
    /// nor the deadline, so the spawned work outlives the caller.
    pub(crate) fn detached(&self) -> Self {
        Self {
            request_id: self.request_id,
            token: CancellationToken::new(),
            deadline: None,
        }
    }
}

impl Default for CallerContext {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn timeout_resolves_cancelled() {
        let ctx = CallerContext::background().with_timeout(Duration::from_secs(2));
        assert!(!ctx.is_cancelled());

        ctx.cancelled().await;
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_is_shared_by_clones() {
        let ctx = CallerContext::background();
        let clone = ctx.clone();
        clone.cancel();

        ctx.cancelled().await;
        assert!(ctx.is_cancelled());
    }

    #[test]
    fn detached_context_keeps_request_id_only() {
        let ctx = CallerContext::background().with_timeout(Duration::from_secs(1));
        ctx.cancel();

        let detached = ctx.detached();
        assert_eq!(detached.request_id(), ctx.request_id());
        assert!(detached.deadline().is_none());
        assert!(!detached.is_cancelled());
    }
}
