//! portreach - concurrent TCP port-reachability scanning
//!
//! Determines which ports on a target accept a connection within a timeout,
//! optionally routing every attempt through an SSH-tunneled bastion host.
//! Concurrency is admission-gated to the process's file-descriptor budget and
//! outcomes stream back as they arrive.
//!
//! ```no_run
//! use portreach::{PortSpec, ScanConfig, ScanEngine};
//!
//! # async fn scan() -> portreach::Result<()> {
//! let config = ScanConfig::new("10.0.0.5").with_ports(PortSpec::range(1, 1024));
//! let engine = ScanEngine::new(config).await?;
//! let mut results = engine.run();
//! while let Some(outcome) = results.recv().await {
//!     if outcome.open {
//!         println!("{}:{} open", outcome.host, outcome.port);
//!     }
//! }
//! engine.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dialer;
pub mod engine;
pub mod error;
pub mod limiter;
pub mod outcome;
pub mod probe;

pub use config::{BastionConfig, PortSpec, ScanConfig};
pub use dialer::{bastion::BastionDialer, direct::DirectDialer, Connection, Dialer};
pub use engine::ScanEngine;
pub use error::{DialError, ScanError};
pub use limiter::ProbeLimiter;
pub use outcome::ScanOutcome;
pub use probe::probe;

/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, ScanError>;
