//! Shutdown signal handling.
//!
//! [`SigDown`] listens for SIGTERM/SIGINT (Ctrl+C elsewhere) and cancels a
//! [`CancellationToken`]. The HTTP service uses it for graceful shutdown and
//! the `switch` command uses it to abandon a pending wallet prompt.

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Cancels its token on the first shutdown signal.
#[allow(missing_debug_implementations)]
pub struct SigDown {
    task_tracker: TaskTracker,
    cancellation_token: CancellationToken,
}

impl SigDown {
    /// Registers the signal handlers and spawns the listener task.
    ///
    /// # Errors
    ///
    /// Returns an [`std::io::Error`] if signal registration fails.
    #[allow(clippy::unnecessary_wraps)]
    pub fn try_new() -> Result<Self, std::io::Error> {
        let inner = CancellationToken::new();
        let outer = inner.clone();
        let task_tracker = TaskTracker::new();

        #[cfg(unix)]
        {
            let mut sigterm = signal(SignalKind::terminate())?;
            let mut sigint = signal(SignalKind::interrupt())?;
            task_tracker.spawn(async move {
                let received = tokio::select! {
                    _ = sigterm.recv() => "SIGTERM",
                    _ = sigint.recv() => "SIGINT",
                    () = inner.cancelled() => return,
                };
                tracing::info!(signal = received, "shutdown signal received");
                inner.cancel();
            });
        }

        #[cfg(not(unix))]
        {
            task_tracker.spawn(async move {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!(signal = "ctrl_c", "shutdown signal received");
                        inner.cancel();
                    }
                    () = inner.cancelled() => {}
                }
            });
        }

        task_tracker.close();
        Ok(Self {
            task_tracker,
            cancellation_token: outer,
        })
    }

    /// Token cancelled on shutdown.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Stops listening and waits for the listener task to exit.
    pub async fn close(self) {
        self.cancellation_token.cancel();
        self.task_tracker.wait().await;
    }
}
