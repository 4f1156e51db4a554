//! Constants for GreenPost Core
//!
//! Centralized numeric values for the sensor node. Defaults mirror the
//! values the deployed firmware has always used, so a node configured with
//! `ClientConfig::default()` behaves like one flashed with the stock image.
//!
//! ## Organization
//!
//! - **Encoding**: Fixed number width and document field names
//! - **Sampling**: ADC range, sample counts and conversion factors
//! - **Time**: Cycle interval, timeouts and retry backoff
//! - **Buffers**: Capacities of every bounded string and collection
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Capacities are compile-time limits; values beyond them are
//!    configuration errors, never truncated
//! 3. Use descriptive names that include units

/// JSON document shape and fixed-width number rendering.
pub mod encoding;

/// Analog sampling and raw-value conversions.
pub mod sampling;

/// Intervals, timeouts and backoff.
pub mod time;

/// Bounded string and collection capacities.
pub mod buffers;

pub use encoding::{DEFAULT_DECIMALS, NUMBER_LENGTH};

pub use sampling::{ADC_MAX, DEFAULT_SAMPLE_COUNT, MAX_SAMPLE_COUNT, MIN_SAMPLE_COUNT};

pub use time::{DEFAULT_IDLE_TIMEOUT_MS, DEFAULT_SEND_INTERVAL_MS, DEFAULT_WATCHDOG_TIMEOUT_MS};

pub use buffers::{MAX_NAME_LEN, MAX_SENSORS};
