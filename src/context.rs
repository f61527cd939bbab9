use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{Result, SyncError};

/// Cancellation and deadline carried into every blocking database call.
///
/// Cancellation is cooperative: the in-flight driver future is dropped when
/// the token fires or the timeout elapses.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl Context {
    /// A context that is never cancelled and has no timeout.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// A context cancelled whenever this one is, but cancellable on its own.
    pub fn child(&self) -> Self {
        Self {
            cancel: self.cancel.child_token(),
            timeout: self.timeout,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Drive `fut` to completion unless cancelled or timed out first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(SyncError::Cancelled);
        }
        let guarded = async {
            tokio::select! {
                _ = self.cancel.cancelled() => Err(SyncError::Cancelled),
                res = fut => res,
            }
        };
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, guarded)
                .await
                .map_err(|_| SyncError::Timeout)?,
            None => guarded.await,
        }
    }
}
