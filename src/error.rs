//! Error handling for the portreach scanner
//!
//! Two layers: [`ScanError`] is fatal and aborts a scan before any outcome is
//! produced (bad configuration, bastion session failure), while [`DialError`]
//! is per-port and travels inside the port's outcome without affecting the
//! rest of the scan.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Fatal error raised before any probe runs.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid scan target: {0}")]
    InvalidTarget(String),

    #[error("invalid port range: {0}")]
    PortRange(String),

    #[error("bastion credentials missing: configure a private key or a password")]
    MissingCredential,

    #[error("bastion host key verification not configured: pin a host key or opt in to accept_any_host_key")]
    HostKeyNotConfigured,

    #[error("bastion host key mismatch for {0}")]
    HostKeyMismatch(String),

    #[error("bastion session error: {0}")]
    Session(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Per-port failure recorded in a [`crate::ScanOutcome`].
///
/// `ResourceExhausted` is normally absorbed by the probe retry policy and only
/// surfaces here once the retry ceiling is hit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialError {
    #[error("connection refused")]
    Refused,

    #[error("connection timed out after {0:?}")]
    TimedOut(Duration),

    #[error("host unreachable")]
    Unreachable,

    #[error("tunnel rejected by bastion: {0}")]
    TunnelRejected(String),

    #[error("process out of file descriptors")]
    ResourceExhausted,

    #[error("scan cancelled")]
    Cancelled,

    #[error("connect failed: {0}")]
    Other(String),
}

impl DialError {
    /// Classify an OS-level connect failure.
    pub(crate) fn from_io(err: &io::Error, timeout: Duration) -> Self {
        if is_resource_exhaustion(err) {
            return DialError::ResourceExhausted;
        }
        if is_unreachable(err) {
            return DialError::Unreachable;
        }
        match err.kind() {
            io::ErrorKind::ConnectionRefused => DialError::Refused,
            io::ErrorKind::TimedOut => DialError::TimedOut(timeout),
            _ => DialError::Other(err.to_string()),
        }
    }
}

#[cfg(unix)]
fn is_resource_exhaustion(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EMFILE) | Some(libc::ENFILE))
}

#[cfg(not(unix))]
fn is_resource_exhaustion(_err: &io::Error) -> bool {
    false
}

#[cfg(unix)]
fn is_unreachable(err: &io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc::EHOSTUNREACH) | Some(libc::ENETUNREACH)
    )
}

#[cfg(not(unix))]
fn is_unreachable(_err: &io::Error) -> bool {
    false
}
