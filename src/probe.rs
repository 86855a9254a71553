//! Single-port probe
//!
//! One connection attempt against one port, classified into a
//! [`ScanOutcome`]. A successful handshake is the whole signal; the
//! connection is released immediately without exchanging any payload.

use crate::dialer::Dialer;
use crate::error::DialError;
use crate::outcome::ScanOutcome;
use std::time::Duration;

/// Retry ceiling for transient descriptor exhaustion. Past it the port
/// reports a terminal [`DialError::ResourceExhausted`] outcome instead of
/// retrying forever.
pub(crate) const MAX_EXHAUSTION_RETRIES: u32 = 8;

/// Probe one port through the given strategy.
///
/// Resource exhaustion says nothing about the target port, only about this
/// process, so the probe pauses for one `timeout` and tries again, up to
/// [`MAX_EXHAUSTION_RETRIES`] retries. Every other failure is terminal for
/// the port and lands in the outcome.
pub async fn probe(dialer: &dyn Dialer, host: &str, port: u16, timeout: Duration) -> ScanOutcome {
    let mut exhausted = 0u32;
    loop {
        match dialer.dial(host, port, timeout).await {
            Ok(connection) => {
                drop(connection);
                return ScanOutcome::open(host, port);
            }
            Err(DialError::ResourceExhausted) => {
                exhausted += 1;
                if exhausted > MAX_EXHAUSTION_RETRIES {
                    return ScanOutcome::closed(host, port, DialError::ResourceExhausted);
                }
                log::warn!(
                    "out of descriptors probing {}:{}, backing off {:?} (retry {}/{})",
                    host,
                    port,
                    timeout,
                    exhausted,
                    MAX_EXHAUSTION_RETRIES
                );
                tokio::time::sleep(timeout).await;
            }
            Err(err) => return ScanOutcome::closed(host, port, err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialer::Connection;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::net::{TcpListener, TcpStream};

    /// Dials a real local listener so the probe sees a genuine handshake.
    struct LoopbackDialer {
        port: u16,
    }

    #[async_trait]
    impl Dialer for LoopbackDialer {
        async fn dial(
            &self,
            _host: &str,
            _port: u16,
            _timeout: Duration,
        ) -> Result<Connection, DialError> {
            let stream = TcpStream::connect(("127.0.0.1", self.port))
                .await
                .map_err(|e| DialError::Other(e.to_string()))?;
            Ok(Connection::direct(stream))
        }

        fn close(&self) {}
    }

    struct FailingDialer {
        error: DialError,
        attempts: AtomicU32,
    }

    impl FailingDialer {
        fn new(error: DialError) -> Self {
            Self {
                error,
                attempts: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Dialer for FailingDialer {
        async fn dial(
            &self,
            _host: &str,
            _port: u16,
            _timeout: Duration,
        ) -> Result<Connection, DialError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }

        fn close(&self) {}
    }

    #[tokio::test]
    async fn successful_handshake_reports_open() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                let _ = listener.accept().await;
            }
        });

        let dialer = LoopbackDialer { port };
        let outcome = probe(&dialer, "127.0.0.1", port, Duration::from_secs(1)).await;
        assert!(outcome.open);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn refusal_is_terminal_on_the_first_attempt() {
        let dialer = FailingDialer::new(DialError::Refused);
        let outcome = probe(&dialer, "127.0.0.1", 81, Duration::from_millis(1)).await;
        assert!(!outcome.open);
        assert_eq!(outcome.error, Some(DialError::Refused));
        assert_eq!(dialer.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_retries_are_bounded() {
        let dialer = FailingDialer::new(DialError::ResourceExhausted);
        let outcome = probe(&dialer, "127.0.0.1", 81, Duration::from_millis(1)).await;
        assert!(!outcome.open);
        assert_eq!(outcome.error, Some(DialError::ResourceExhausted));
        // Initial attempt plus the full retry budget.
        assert_eq!(
            dialer.attempts.load(Ordering::SeqCst),
            MAX_EXHAUSTION_RETRIES + 1
        );
    }
}
