//! Collaborator Seams for GreenPost
//!
//! The core never touches hardware. Everything it needs from the platform
//! comes through the traits in this module, so the same cycle runs on a
//! microcontroller, on a Linux gateway and inside the test suite.
//!
//! ## Module Organization
//!
//! - [`sensor`] - Raw analog sampling ([`SensorProvider`])
//! - [`liveness`] - Watchdog supervision ([`Liveness`])
//! - [`network`] - Join, address assignment, DNS and TCP ([`Connectivity`])
//!
//! Time comes from [`crate::time::TimeSource`]; sleeping goes through
//! `embedded_hal::delay::DelayNs`, which every HAL already implements.
//!
//! ## Design Philosophy
//!
//! - **Static Dispatch**: Providers are generic parameters, no trait objects
//! - **Blocking**: Calls block the whole node; that is acceptable because
//!   it has nothing else to do. Steps that may take a while report "not yet"
//!   through `nb::Result` so the caller owns the retry loop and can keep the
//!   watchdog fed.
//! - **Capabilities, not globals**: The watchdog is passed into every long
//!   step as `&mut impl Liveness` instead of being kicked from wherever.
//!
//! ## Usage Example
//!
//! ```rust
//! use greenpost_core::traits::SensorProvider;
//!
//! struct Potentiometer(u16);
//!
//! impl SensorProvider for Potentiometer {
//!     fn read_channel(&mut self, _channel: u8) -> u16 {
//!         self.0
//!     }
//! }
//! ```

pub mod liveness;
pub mod network;
pub mod sensor;

pub use liveness::{Liveness, NoopLiveness};
pub use network::{AddressInfo, Connectivity, Security};
pub use sensor::SensorProvider;

pub use crate::time::TimeSource;
