//! Direct TCP connection strategy

use crate::dialer::{Connection, Dialer};
use crate::error::DialError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

/// Dials the target directly from the local process.
///
/// Cancellation is a bounded wait: the attempt is abandoned once `timeout`
/// elapses or [`Dialer::close`] fires, whichever comes first.
pub struct DirectDialer {
    cancel: CancellationToken,
}

impl DirectDialer {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
        }
    }
}

impl Default for DirectDialer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Dialer for DirectDialer {
    async fn dial(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Connection, DialError> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(DialError::Cancelled),
            attempt = tokio::time::timeout(timeout, TcpStream::connect((host, port))) => {
                match attempt {
                    Ok(Ok(stream)) => Ok(Connection::direct(stream)),
                    Ok(Err(err)) => Err(DialError::from_io(&err, timeout)),
                    Err(_) => Err(DialError::TimedOut(timeout)),
                }
            }
        }
    }

    fn close(&self) {
        self.cancel.cancel();
    }
}
