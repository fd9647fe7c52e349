//! Shutdown signal listener
//!
//! Waits for Ctrl+C or SIGTERM, or for an explicit `close`, then runs the
//! shutdown callback exactly once.

use std::sync::Mutex;

use tokio::sync::watch;
use tracing::{info, warn};

type Callback = Box<dyn FnOnce() + Send>;

pub struct ShutdownListener {
    callback: Mutex<Option<Callback>>,
    closed: watch::Sender<bool>,
}

impl ShutdownListener {
    pub fn new(callback: impl FnOnce() + Send + 'static) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            callback: Mutex::new(Some(Box::new(callback))),
            closed,
        }
    }

    /// Block until a shutdown signal arrives or `close` is called, then
    /// invoke the callback
    ///
    /// The callback runs at most once across all `listen` calls.
    pub async fn listen(&self) {
        tokio::select! {
            _ = wait_for_signal() => {
                info!("Received application shutdown signal");
            }
            _ = wait_for_close(self.closed.subscribe()) => {}
        }
        self.fire();
    }

    /// Unsubscribe from further signals. Idempotent.
    pub fn close(&self) {
        let was_closed = self.closed.send_replace(true);
        if !was_closed {
            info!("Unsubscribed from further application shutdown signals");
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    fn fire(&self) {
        let callback = match self.callback.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(callback) = callback {
            callback();
        }
    }
}

async fn wait_for_close(mut closed: watch::Receiver<bool>) {
    loop {
        let is_closed = *closed.borrow_and_update();
        if is_closed || closed.changed().await.is_err() {
            return;
        }
    }
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn counting_listener() -> (Arc<ShutdownListener>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let listener = ShutdownListener::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (Arc::new(listener), calls)
    }

    #[tokio::test]
    async fn test_close_unblocks_listen_and_runs_callback() {
        let (listener, calls) = counting_listener();

        let task = tokio::spawn({
            let listener = Arc::clone(&listener);
            async move { listener.listen().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        listener.close();

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("listen should return after close")
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (listener, _) = counting_listener();
        assert!(!listener.is_closed());

        listener.close();
        listener.close();

        assert!(listener.is_closed());
    }

    #[tokio::test]
    async fn test_listen_after_close_returns_immediately() {
        let (listener, calls) = counting_listener();
        listener.close();

        tokio::time::timeout(Duration::from_secs(1), listener.listen())
            .await
            .expect("listen should not block once closed");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        listener.listen().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_runs_once() {
        let (listener, calls) = counting_listener();

        listener.fire();
        listener.fire();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
