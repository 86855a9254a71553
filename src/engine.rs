//! Scan orchestrator
//!
//! Fans a port range out into independent probe tasks, admits each through
//! the limiter, and streams outcomes back over a rendezvous channel as they
//! arrive.

use crate::config::{PortSpec, ScanConfig};
use crate::dialer::{bastion::BastionDialer, direct::DirectDialer, Dialer};
use crate::error::ScanError;
use crate::limiter::ProbeLimiter;
use crate::outcome::ScanOutcome;
use crate::probe::probe;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Orchestrates one scan: shared dialer, admission gate, fan-out, and the
/// outcome stream.
///
/// For N requested ports exactly N outcomes are delivered, in completion
/// order, before the receiver sees end-of-stream. Producers block handing
/// over their outcome until the consumer is ready, so **callers must drain
/// the receiver to completion or call [`ScanEngine::cancel`]**; a stalled
/// consumer stalls the tasks still waiting to deliver, which in turn hold
/// their limiter slots.
pub struct ScanEngine {
    host: String,
    ports: PortSpec,
    timeout: Duration,
    dialer: Arc<dyn Dialer>,
    limiter: Arc<ProbeLimiter>,
    cancel: CancellationToken,
}

impl ScanEngine {
    /// Build an engine from configuration: direct dialer by default, bastion
    /// dialer when bastion settings are present. Configuration and session
    /// errors abort here, before any probe runs.
    pub async fn new(config: ScanConfig) -> crate::Result<Self> {
        config.validate()?;

        let dialer: Arc<dyn Dialer> = match &config.bastion {
            Some(bastion) => {
                let bastion = bastion.clone();
                let dialer = tokio::task::spawn_blocking(move || BastionDialer::connect(&bastion))
                    .await
                    .map_err(|e| ScanError::Session(e.to_string()))??;
                Arc::new(dialer)
            }
            None => Arc::new(DirectDialer::new()),
        };

        let timeout = config.timeout();
        Ok(Self::with_dialer(
            dialer,
            Arc::new(ProbeLimiter::from_fd_budget()),
            config.host,
            config.ports,
            timeout,
        ))
    }

    /// Build an engine from explicit parts. Every scan gets its own dialer
    /// and limiter; nothing here is process-global.
    pub fn with_dialer(
        dialer: Arc<dyn Dialer>,
        limiter: Arc<ProbeLimiter>,
        host: impl Into<String>,
        ports: PortSpec,
        timeout: Duration,
    ) -> Self {
        Self {
            host: host.into(),
            ports,
            timeout,
            dialer,
            limiter,
            cancel: CancellationToken::new(),
        }
    }

    pub fn limiter(&self) -> &Arc<ProbeLimiter> {
        &self.limiter
    }

    /// Start the scan and return the outcome stream.
    ///
    /// Each call produces a fresh, independent sequence. The channel closes
    /// only after every launched task has delivered its outcome.
    pub fn run(&self) -> mpsc::Receiver<ScanOutcome> {
        // tokio has no zero-capacity channel; capacity 1 is the nearest
        // rendezvous approximation, buffering at most one outcome ahead of
        // the consumer. Hence the drain-or-cancel contract above.
        let (tx, rx) = mpsc::channel(1);

        let host = self.host.clone();
        let ports = self.ports.clone();
        let timeout = self.timeout;
        let dialer = self.dialer.clone();
        let limiter = self.limiter.clone();
        let cancel = self.cancel.clone();

        log::info!(
            "scanning {} ports on {} ({} admission slots)",
            ports.len(),
            host,
            limiter.capacity()
        );

        tokio::spawn(async move {
            let mut tasks = Vec::with_capacity(ports.len());

            for port in ports.iter() {
                // Admission before launch; a cancelled scan skips the wait
                // and still reports the port below.
                let slot = tokio::select! {
                    _ = cancel.cancelled() => None,
                    slot = limiter.acquire() => Some(slot),
                };

                let tx = tx.clone();
                let host = host.clone();
                let dialer = dialer.clone();
                let cancel = cancel.clone();

                tasks.push(tokio::spawn(async move {
                    let outcome = match &slot {
                        Some(_) => tokio::select! {
                            _ = cancel.cancelled() => ScanOutcome::cancelled(&host, port),
                            outcome = probe(dialer.as_ref(), &host, port, timeout) => outcome,
                        },
                        None => ScanOutcome::cancelled(&host, port),
                    };

                    if tx.send(outcome).await.is_err() {
                        log::debug!("receiver gone before {}:{} reported", host, port);
                    }
                    // The limiter slot is held until the outcome has been
                    // handed over.
                    drop(slot);
                }));
            }

            drop(tx);
            join_all(tasks).await;
            log::debug!("scan of {} complete", host);
        });

        rx
    }

    /// Cancel the scan. In-flight dials abort promptly and every port not yet
    /// probed still delivers exactly one outcome, marked cancelled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Explicit teardown: cancel outstanding work and release the dialer's
    /// session-level resources. Idempotent.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        self.dialer.close();
    }
}
