//! Per-analysis cancellation scope.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A child cancellation token that also fires after `timeout`.
///
/// The token is cancelled when the parent is cancelled, when the deadline
/// passes, or when the scope is dropped, whichever happens first.
#[derive(Debug)]
pub struct DeadlineScope {
    token: CancellationToken,
    timer: JoinHandle<()>,
}

impl DeadlineScope {
    /// Opens a scope under `parent`. Must be called inside a Tokio runtime.
    pub fn new(parent: &CancellationToken, timeout: Duration) -> Self {
        let token = parent.child_token();
        let timer_token = token.clone();
        let timer = tokio::spawn(async move {
            tokio::select! {
                _ = timer_token.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    log::debug!("Analysis deadline of {}ms reached", timeout.as_millis());
                    timer_token.cancel();
                }
            }
        });
        Self { token, timer }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for DeadlineScope {
    fn drop(&mut self) {
        self.token.cancel();
        self.timer.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_timeout() {
        let parent = CancellationToken::new();
        let scope = DeadlineScope::new(&parent, Duration::from_secs(5));
        assert!(!scope.is_cancelled());

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(scope.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_follows_parent() {
        let parent = CancellationToken::new();
        let scope = DeadlineScope::new(&parent, Duration::from_secs(60));
        parent.cancel();
        assert!(scope.is_cancelled());
    }

    #[tokio::test]
    async fn test_drop_cancels_token_only() {
        let parent = CancellationToken::new();
        let scope = DeadlineScope::new(&parent, Duration::from_secs(60));
        let token = scope.token().clone();
        drop(scope);
        assert!(token.is_cancelled());
        assert!(!parent.is_cancelled());
    }
}
