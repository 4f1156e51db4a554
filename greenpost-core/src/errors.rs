//! Error Types for Configuration, Encoding and Transport Failures
//!
//! ## Design Philosophy
//!
//! GreenPost's error system follows the constraints of the devices it runs on:
//!
//! 1. **Small Size**: Variants carry a few scalars at most. Errors travel up
//!    the measurement cycle and end up in a log line, nothing more.
//!
//! 2. **No Heap Allocation**: Only `&'static str` and plain numbers. I/O
//!    failures are reduced to an [`embedded_io::ErrorKind`].
//!
//! 3. **Copy Semantics**: Every error is `Copy`, so it can be logged and
//!    returned without ownership juggling.
//!
//! ## Error Categories
//!
//! ### Configuration Violations ([`ConfigError`])
//! Caught once, when the static configuration is loaded. A name longer than
//! its bounded buffer, a precision that doesn't fit the fixed number width or
//! an identity whose declared digit count is wrong all end here, long before
//! the first byte is serialized.
//!
//! ### Encoding Failures ([`EncodeError`])
//! The output sink refused bytes. The encoder itself cannot produce a wrong
//! length; the only thing that can go wrong while emitting is I/O.
//!
//! ### Transport Failures ([`TransportError`])
//! Join, address assignment, DNS and TCP connect failures are recoverable:
//! the cycle is abandoned and retried after the next sleep. A length mismatch
//! between the Measure and Emit passes is a contract violation and aborts the
//! send before a malformed body goes out.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use greenpost_core::{CycleError, TransportError};
//!
//! fn report(result: Result<(), CycleError>) {
//!     match result {
//!         Ok(()) => {}
//!         Err(CycleError::Network(TransportError::Resolve(_))) => {
//!             // DNS not ready yet - try again next cycle
//!         }
//!         Err(CycleError::Delivery(TransportError::LengthMismatch { .. })) => {
//!             // Serializer bug - never expected in the field
//!         }
//!         Err(_) => {
//!             // Log and sleep until the next cycle
//!         }
//!     }
//! }
//! ```

use embedded_io::ErrorKind;
use thiserror_no_std::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for encoder operations
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Configuration violations - detected at load time, never while sending
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A bounded string would have to be truncated to fit
    #[error("{field} is {actual} bytes, limit is {max}")]
    TooLong {
        /// Which configuration field overflowed
        field: &'static str,
        /// Capacity of the bounded buffer
        max: usize,
        /// Length that was offered
        actual: usize,
    },

    /// A required value is empty
    #[error("{field} must not be empty")]
    Missing {
        /// Which configuration field is empty
        field: &'static str,
    },

    /// A sensor name contains characters that would need JSON escaping
    #[error("sensor name rejected: {reason}")]
    InvalidName {
        /// What is wrong with the name
        reason: &'static str,
    },

    /// A value copied into the request head would break the header block
    #[error("{field} contains whitespace or control characters")]
    InvalidHeader {
        /// Which server setting is malformed
        field: &'static str,
    },

    /// Fractional digits do not fit in the fixed number width
    #[error("{decimals} decimals do not fit a {width}-character number")]
    Precision {
        /// Requested fractional digits
        decimals: u8,
        /// Fixed width of every rendered number
        width: usize,
    },

    /// Declared identity length doesn't match the rendered identifier
    #[error("identity declares {declared} digits but renders as {actual}")]
    IdentityDigitMismatch {
        /// Digit count from configuration
        declared: u8,
        /// Digit count of the decimal rendering
        actual: u8,
    },

    /// Sample count outside the range the denoiser supports
    #[error("sample count {count} outside [{min}, {max}]")]
    SampleCount {
        /// Configured sample count
        count: usize,
        /// Smallest supported count
        min: usize,
        /// Largest supported count
        max: usize,
    },

    /// More sensors configured than the registry can hold
    #[error("{count} sensors configured, registry holds {max}")]
    TooManySensors {
        /// Sensors requested
        count: usize,
        /// Registry capacity
        max: usize,
    },

    /// Analog channel outside the converter's channel range
    #[error("channel {channel} exceeds highest channel {max}")]
    ChannelOutOfRange {
        /// Offending channel (environment sensors also use `channel + 1`)
        channel: u8,
        /// Highest usable channel
        max: u8,
    },

    /// Alert band is inverted
    #[error("alert band [{min}, {max}] is inverted")]
    InvertedThreshold {
        /// Configured lower bound
        min: f32,
        /// Configured upper bound
        max: f32,
    },

    /// A timing value makes the cycle impossible (zero interval, zero timeout)
    #[error("invalid timing: {reason}")]
    InvalidTiming {
        /// Which timing value is wrong
        reason: &'static str,
    },
}

/// Errors raised while emitting bytes
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum EncodeError {
    /// The output sink failed
    #[error("sink write failed: {0:?}")]
    Sink(ErrorKind),
}

/// Errors raised by the transport driver
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum TransportError {
    /// Network join rejected
    #[error("network join failed: {0:?}")]
    Join(ErrorKind),

    /// No address was assigned
    #[error("address assignment failed: {0:?}")]
    Address(ErrorKind),

    /// Host name could not be resolved
    #[error("name resolution failed: {0:?}")]
    Resolve(ErrorKind),

    /// TCP connection could not be opened
    #[error("connect failed: {0:?}")]
    Connect(ErrorKind),

    /// A bounded retry loop ran out of attempts
    #[error("{step} still pending after {attempts} attempts")]
    RetriesExhausted {
        /// Step that never completed
        step: &'static str,
        /// Attempts made
        attempts: u32,
    },

    /// Reading or writing the open connection failed
    #[error("connection I/O failed: {0:?}")]
    Io(ErrorKind),

    /// Emit pass produced a different byte count than the Measure pass
    #[error("body length mismatch: measured {measured}, emitted {emitted}")]
    LengthMismatch {
        /// Measure pass total (the advertised Content-Length)
        measured: usize,
        /// Bytes the Emit pass produced
        emitted: usize,
    },
}

impl From<EncodeError> for TransportError {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::Sink(kind) => TransportError::Io(kind),
        }
    }
}

/// Why a measurement cycle was abandoned
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CycleError {
    /// Network could not be brought up or reached (join, DHCP, DNS, connect)
    #[error("network unavailable: {0}")]
    Network(TransportError),

    /// Connected, but the request did not go out intact
    #[error("delivery failed: {0}")]
    Delivery(TransportError),
}

impl CycleError {
    /// Underlying transport failure
    pub fn transport(&self) -> TransportError {
        match self {
            Self::Network(err) | Self::Delivery(err) => *err,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::TooLong { field, max, actual } =>
                defmt::write!(fmt, "{} is {} bytes, limit {}", field, actual, max),
            Self::Missing { field } =>
                defmt::write!(fmt, "{} is empty", field),
            Self::InvalidName { reason } =>
                defmt::write!(fmt, "Sensor name: {}", reason),
            Self::InvalidHeader { field } =>
                defmt::write!(fmt, "Header value: {}", field),
            Self::Precision { decimals, width } =>
                defmt::write!(fmt, "{} decimals in width {}", decimals, width),
            Self::IdentityDigitMismatch { declared, actual } =>
                defmt::write!(fmt, "Identity digits {} != {}", declared, actual),
            Self::SampleCount { count, min, max } =>
                defmt::write!(fmt, "Sample count {} not in [{}, {}]", count, min, max),
            Self::TooManySensors { count, max } =>
                defmt::write!(fmt, "{} sensors, max {}", count, max),
            Self::ChannelOutOfRange { channel, max } =>
                defmt::write!(fmt, "Channel {} > {}", channel, max),
            Self::InvertedThreshold { min, max } =>
                defmt::write!(fmt, "Inverted band [{}, {}]", min, max),
            Self::InvalidTiming { reason } =>
                defmt::write!(fmt, "Timing: {}", reason),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for EncodeError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Sink(kind) => defmt::write!(fmt, "Sink: {}", defmt::Debug2Format(kind)),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TransportError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Join(kind) => defmt::write!(fmt, "Join: {}", defmt::Debug2Format(kind)),
            Self::Address(kind) => defmt::write!(fmt, "Address: {}", defmt::Debug2Format(kind)),
            Self::Resolve(kind) => defmt::write!(fmt, "Resolve: {}", defmt::Debug2Format(kind)),
            Self::Connect(kind) => defmt::write!(fmt, "Connect: {}", defmt::Debug2Format(kind)),
            Self::RetriesExhausted { step, attempts } =>
                defmt::write!(fmt, "{} pending after {} attempts", step, attempts),
            Self::Io(kind) => defmt::write!(fmt, "I/O: {}", defmt::Debug2Format(kind)),
            Self::LengthMismatch { measured, emitted } =>
                defmt::write!(fmt, "Length {} != {}", measured, emitted),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for CycleError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::Network(err) => defmt::write!(fmt, "Network: {}", err),
            Self::Delivery(err) => defmt::write!(fmt, "Delivery: {}", err),
        }
    }
}
