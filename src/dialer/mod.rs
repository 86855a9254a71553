//! Connection strategies
//!
//! A [`Dialer`] is the pluggable mechanism a scan uses to open timed-out
//! connections: [`direct::DirectDialer`] dials from the local process,
//! [`bastion::BastionDialer`] tunnels every attempt through an authenticated
//! SSH session. One dialer instance is shared by all probe tasks of a scan.

pub mod bastion;
pub mod direct;

use crate::error::DialError;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::net::TcpStream;

/// Capability for opening a timed-out network connection to `host:port`.
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Attempt to establish a connection within `timeout`.
    ///
    /// Returns a [`Connection`] handle on success; dropping the handle
    /// releases the underlying resources without further I/O. Failures are
    /// classified into [`DialError`] so the prober can tell transient
    /// resource exhaustion apart from terminal results.
    async fn dial(&self, host: &str, port: u16, timeout: Duration)
        -> Result<Connection, DialError>;

    /// Idempotent teardown of session-level resources.
    ///
    /// Safe to call multiple times and concurrently with in-flight `dial`
    /// calls: those resolve with [`DialError::Cancelled`] instead of hanging.
    fn close(&self);
}

/// Handle to an established connection.
///
/// The completed handshake is the only signal a probe needs, so the handle
/// exposes no I/O; it exists to be dropped.
pub struct Connection {
    _inner: ConnectionInner,
}

enum ConnectionInner {
    Direct(TcpStream),
    Tunneled(ssh2::Channel),
}

impl Connection {
    pub(crate) fn direct(stream: TcpStream) -> Self {
        Self {
            _inner: ConnectionInner::Direct(stream),
        }
    }

    pub(crate) fn tunneled(channel: ssh2::Channel) -> Self {
        Self {
            _inner: ConnectionInner::Tunneled(channel),
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self._inner {
            ConnectionInner::Direct(stream) => f.debug_tuple("Direct").field(stream).finish(),
            ConnectionInner::Tunneled(_) => f.debug_tuple("Tunneled").finish(),
        }
    }
}
