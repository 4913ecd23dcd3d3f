//! Stops the dispatcher on SIGTERM, next to the ctrl-c handler teloxide
//! installs, so the caller always gets to persist the sessions.

use std::{future::Future, time::Duration};

use teloxide::dispatching::ShutdownToken;

/// The dispatcher refuses a shutdown until it is actually running.
const IDLE_RETRIES: u32 = 50;
const IDLE_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Resolves when the process receives SIGTERM. Never resolves where the
/// signal does not exist or cannot be listened to.
pub(crate) async fn terminate_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                return;
            }
            Err(err) => tracing::warn!("failed to listen for SIGTERM: {err}"),
        }
    }

    std::future::pending::<()>().await;
}

/// Waits for `signal`, then asks the dispatcher behind `token` to stop and
/// waits until it has. Returns `false` if the dispatcher never started.
pub(crate) async fn stop_on<F>(token: ShutdownToken, signal: F) -> bool
where
    F: Future<Output = ()>,
{
    signal.await;
    tracing::info!("Termination requested, stopping telegram bot...");

    for _ in 0..IDLE_RETRIES {
        match token.shutdown() {
            Ok(stopped) => {
                stopped.await;
                return true;
            }
            Err(_) => tokio::time::sleep(IDLE_RETRY_DELAY).await,
        }
    }

    tracing::warn!("dispatcher is not running, nothing to stop");
    false
}

#[cfg(test)]
mod tests {
    use teloxide::{RequestError, dispatching::UpdateHandler, prelude::*};

    use super::*;

    fn idle_token() -> ShutdownToken {
        let handler: UpdateHandler<RequestError> =
            dptree::entry().endpoint(|| async { Ok(()) });
        Dispatcher::builder(teloxide::Bot::new("123:abc"), handler)
            .build()
            .shutdown_token()
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_happens_before_the_signal() {
        let stopping = stop_on(idle_token(), std::future::pending());
        assert!(
            tokio::time::timeout(Duration::from_secs(3600), stopping)
                .await
                .is_err()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_on_a_dispatcher_that_never_runs() {
        assert!(!stop_on(idle_token(), std::future::ready(())).await);
    }
}
