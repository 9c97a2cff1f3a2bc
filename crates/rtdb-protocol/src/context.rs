//! Deadline and cancellation carried through every network call.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{ProtocolError, ProtocolResult};

/// Per-call context: an optional deadline and an optional cancellation token.
///
/// A context is passed unchanged from the public operation down to each
/// network call. Every call races against both; whichever fires first aborts
/// the in-flight request.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
}

impl CallContext {
    /// A context that never expires and cannot be cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Expire `timeout` from now, or earlier if a deadline is already set.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Expire at `deadline`, or earlier if a deadline is already set.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Fail fast if the context is already cancelled or expired.
    pub fn check(&self) -> ProtocolResult<()> {
        if self.is_cancelled() {
            return Err(ProtocolError::Cancelled);
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(ProtocolError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drive `fut` to completion unless the context fires first.
    pub async fn run<F, T>(&self, fut: F) -> ProtocolResult<T>
    where
        F: Future<Output = ProtocolResult<T>>,
    {
        self.check()?;

        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(ProtocolError::Cancelled),
            _ = expired => Err(ProtocolError::DeadlineExceeded),
            result = fut => result,
        }
    }
}
