//! Per-port scan outcome record

use crate::error::DialError;
use serde::{Serialize, Serializer};

/// The result of probing one port.
///
/// Exactly one outcome is produced per requested port. `open == true` implies
/// `error.is_none()`; a closed port may carry the failure that ended its probe
/// (connection refused is recorded like any other dial failure).
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub host: String,
    pub port: u16,
    pub open: bool,
    #[serde(
        serialize_with = "error_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<DialError>,
}

impl ScanOutcome {
    pub(crate) fn open(host: &str, port: u16) -> Self {
        Self {
            host: host.to_string(),
            port,
            open: true,
            error: None,
        }
    }

    pub(crate) fn closed(host: &str, port: u16, error: DialError) -> Self {
        Self {
            host: host.to_string(),
            port,
            open: false,
            error: Some(error),
        }
    }

    pub(crate) fn cancelled(host: &str, port: u16) -> Self {
        Self::closed(host, port, DialError::Cancelled)
    }

    /// Whether this outcome was produced by scan cancellation rather than a
    /// completed probe.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.error, Some(DialError::Cancelled))
    }
}

fn error_as_string<S>(error: &Option<DialError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match error {
        Some(err) => serializer.serialize_str(&err.to_string()),
        None => serializer.serialize_none(),
    }
}
