//! Core telemetry engine for GreenPost
//!
//! Samples a fixed set of analog sensors, renders the readings as a JSON
//! document and posts it over HTTP, once per measurement cycle.
//! Designed for sensor nodes with a few KB of RAM.
//!
//! Key constraints:
//! - No heap allocation anywhere in the cycle
//! - `Content-Length` is known before the first body byte is written
//! - The body is streamed straight into the socket, never buffered whole
//!
//! The serializer runs every document twice: a Measure pass that only counts
//! bytes and an Emit pass that writes them. Both passes go through the same
//! code, so the header can never disagree with the body.
//!
//! ```no_run
//! use greenpost_core::{ClientConfig, Document};
//!
//! let config = ClientConfig::default();
//! let registry = config.build_registry().unwrap();
//! let identity = config.identity().unwrap();
//!
//! let document = Document::build(&registry, &identity, &config.layout());
//! let content_length = document.length();
//! # let _ = content_length;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(not(any(feature = "log", feature = "defmt")), allow(unused_variables))]

// Logging facade: `log` on hosted builds, `defmt` on firmware, nothing otherwise.
#[cfg(feature = "log")]
macro_rules! gp_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}
#[cfg(feature = "log")]
macro_rules! gp_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}
#[cfg(feature = "log")]
macro_rules! gp_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}
#[cfg(feature = "log")]
macro_rules! gp_error {
    ($($arg:tt)*) => { log::error!($($arg)*) };
}

#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! gp_debug {
    ($($arg:tt)*) => { defmt::debug!($($arg)*) };
}
#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! gp_info {
    ($($arg:tt)*) => { defmt::info!($($arg)*) };
}
#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! gp_warn {
    ($($arg:tt)*) => { defmt::warn!($($arg)*) };
}
#[cfg(all(feature = "defmt", not(feature = "log")))]
macro_rules! gp_error {
    ($($arg:tt)*) => { defmt::error!($($arg)*) };
}

#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! gp_debug {
    ($($arg:tt)*) => {{}};
}
#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! gp_info {
    ($($arg:tt)*) => {{}};
}
#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! gp_warn {
    ($($arg:tt)*) => {{}};
}
#[cfg(not(any(feature = "log", feature = "defmt")))]
macro_rules! gp_error {
    ($($arg:tt)*) => {{}};
}

pub mod alert;
pub mod client;
pub mod config;
pub mod constants;
pub mod document;
pub mod encoder;
pub mod errors;
pub mod http;
pub mod sampler;
pub mod sensors;
pub mod time;
pub mod traits;
pub mod transport;

// Public API
pub use alert::{any_alert, evaluate, AlertState, AlertThreshold, Condition};
pub use client::{CycleReport, TelemetryClient};
pub use config::{ClientConfig, NetworkConfig, ServerConfig};
pub use document::{Document, DocumentLayout, GroupPolicy};
pub use encoder::{Discard, Encoder, Mode};
pub use errors::{
    ConfigError, ConfigResult, CycleError, EncodeError, EncodeResult, TransportError,
    TransportResult,
};
pub use sampler::Sampler;
pub use sensors::{DeviceIdentity, SensorKind, SensorName, SensorReading, SensorRegistry};
pub use traits::{AddressInfo, Connectivity, Liveness, NoopLiveness, Security, SensorProvider};
pub use http::RequestHead;
pub use transport::{Delivery, RetryPolicy, TransportDriver, TransportSettings, TransportState, TransportStats};

/// Crate version, also used in the default `User-Agent`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
