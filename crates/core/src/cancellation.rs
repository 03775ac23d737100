//! Cooperative cancellation for handler invocations.
//!
//! A [`CancellationToken`] is created by the runtime for every dispatched
//! call. The caller keeps one clone (through [`PendingCall`]) and the handler
//! receives another. The flag moves from pending to cancelled at most once and
//! is never reset.
//!
//! [`PendingCall`]: crate::runtime::PendingCall

use std::future::Future;
use thiserror::Error;

/// Returned by cancellation checkpoints once the token has been cancelled.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

/// One-shot cancellation flag shared by a call site and a handler invocation.
///
/// Cloning the token does not create a new flag: every clone observes and can
/// request cancellation of the same invocation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: tokio_util::sync::CancellationToken,
}

impl CancellationToken {
    /// Create a new token in the pending state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    ///
    /// Idempotent and non-blocking. Calling it on an already cancelled token
    /// has no effect.
    pub fn request_cancellation(&self) {
        self.inner.cancel();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Wait until cancellation is requested.
    pub async fn cancelled(&self) {
        self.inner.cancelled().await;
    }

    /// Cancellation checkpoint for handlers.
    ///
    /// ```
    /// use ak_core::cancellation::{Cancelled, CancellationToken};
    ///
    /// fn step(token: &CancellationToken) -> Result<u32, Cancelled> {
    ///     token.check()?;
    ///     Ok(42)
    /// }
    ///
    /// let token = CancellationToken::new();
    /// assert_eq!(step(&token), Ok(42));
    /// token.request_cancellation();
    /// assert_eq!(step(&token), Err(Cancelled));
    /// ```
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Drive `fut` until it completes or cancellation is requested, whichever
    /// happens first.
    ///
    /// A token that is already cancelled wins without polling `fut`.
    pub async fn run_until_cancelled<F>(&self, fut: F) -> Result<F::Output, Cancelled>
    where
        F: Future,
    {
        tokio::select! {
            biased;
            _ = self.inner.cancelled() => Err(Cancelled),
            value = fut => Ok(value),
        }
    }
}
