//! Host Connectors for GreenPost
//!
//! ## Overview
//!
//! `greenpost-core` never touches hardware; it talks to the platform through
//! a handful of traits. This crate implements those traits on a hosted
//! `std` platform so the same measurement cycle runs on a Linux gateway, a
//! developer laptop or in CI:
//!
//! | Seam              | Implementation                      | Backed by                  |
//! |-------------------|-------------------------------------|----------------------------|
//! | `Connectivity`    | [`net::StdConnectivity`]            | `std::net` TCP and DNS     |
//! | `SensorProvider`  | [`sensors::SimulatedSensors`]       | seeded deterministic drift |
//! | `Liveness`        | [`watchdog::SoftwareWatchdog`]      | `std::time::Instant`       |
//! | `TimeSource`      | [`clock::MonotonicClock`]           | `std::time::Instant`       |
//! | `DelayNs`         | [`clock::StdDelay`]                 | `std::thread::sleep`       |
//!
//! Configuration is read from a JSON file by [`config::load_config`].
//!
//! ## Network Bring-up on a Host
//!
//! A host is already on a network when the client starts, so joining is a
//! formality: the credentials are logged and accepted. Address assignment
//! reports the interface address the OS would use for outbound traffic.
//!
//! ## Example Usage
//!
//! ```no_run
//! use greenpost_connectors::{
//!     clock::{MonotonicClock, StdDelay},
//!     config::load_config,
//!     net::StdConnectivity,
//!     sensors::SimulatedSensors,
//!     watchdog::SoftwareWatchdog,
//! };
//! use greenpost_core::TelemetryClient;
//!
//! let config = load_config("greenpost.json")?;
//! let mut client = TelemetryClient::new(
//!     &config,
//!     SimulatedSensors::new(42),
//!     StdConnectivity::default(),
//!     MonotonicClock::new(),
//!     StdDelay,
//! )?;
//! let mut watchdog = SoftwareWatchdog::new();
//! let report = client.run_cycle(&mut watchdog)?;
//! println!("posted {} bytes", report.body_bytes);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod clock;
pub mod config;
pub mod net;
pub mod sensors;
pub mod watchdog;

pub use clock::{MonotonicClock, StdDelay};
pub use config::{load_config, parse_config};
pub use net::{StdConnectivity, TcpConnection};
pub use sensors::SimulatedSensors;
pub use watchdog::SoftwareWatchdog;

use greenpost_core::ConfigError;
use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;
