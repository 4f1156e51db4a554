//! Analog Sampling Constants
//!
//! The node reads a 10-bit converter against a 5 V reference. Conversions
//! from raw counts to reported values are part of the observable contract
//! with the collecting server; changing them recalibrates every deployed
//! greenhouse.

// ===== CONVERTER =====

/// Largest raw sample a 10-bit converter returns.
pub const ADC_MAX: u16 = 1023;

/// Converter reference voltage (volts).
pub const ADC_REFERENCE_VOLTS: f32 = 5.0;

/// Highest analog channel the node exposes.
///
/// Environment sensors read their light sensor on `channel + 1`, so their
/// base channel must stay below this.
pub const MAX_CHANNEL: u8 = 15;

// ===== DENOISING =====

/// Default samples per denoised reading.
pub const DEFAULT_SAMPLE_COUNT: usize = 9;

/// Smallest sample count the sorted-index pick supports.
///
/// The pick reads index `(n + 1) / 2`, which is out of bounds for `n = 1`.
pub const MIN_SAMPLE_COUNT: usize = 2;

/// Largest sample count (bounds the on-stack sample buffer).
pub const MAX_SAMPLE_COUNT: usize = 32;

// ===== CONVERSIONS =====

/// Scale from volts to reported temperature units (LM35-style 10 mV/unit).
pub const TEMPERATURE_SCALE: f32 = 100.0;

/// Scale from raw counts to soil humidity percent.
pub const SOIL_HUMIDITY_SCALE: f32 = 100.0;

/// Ceiling of the reported illuminance.
pub const ILLUMINANCE_CEILING: f32 = 1000.0;

/// Reported for the unpopulated air humidity sensor.
pub const HUMIDITY_PLACEHOLDER: f32 = 0.0;
