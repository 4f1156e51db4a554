//! Temperature alert evaluation
//!
//! A temperature sensor carries a band `[min, max]`. Each cycle its latest
//! reading is classified:
//!
//! - `temp > max` → [`Condition::TooWarm`]
//! - otherwise `temp < min` → [`Condition::TooCold`]
//! - otherwise → [`Condition::Ok`]
//!
//! Readings exactly on a bound are `Ok`; the node leans towards not
//! alerting. Only the most recent condition is kept, nothing carries over
//! between cycles.

use crate::errors::{ConfigError, ConfigResult};
use crate::sensors::SensorRegistry;

/// Classification of a temperature against its band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Condition {
    /// Within the band (bounds included)
    #[default]
    Ok,
    /// Above the upper bound
    TooWarm,
    /// Below the lower bound
    TooCold,
}

impl Condition {
    /// Wire name used in the document
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::TooWarm => "too_warm",
            Self::TooCold => "too_cold",
        }
    }

    /// True for anything but `Ok`
    pub fn is_abnormal(&self) -> bool {
        !matches!(self, Self::Ok)
    }
}

/// Alert band
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AlertThreshold {
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
}

impl AlertThreshold {
    /// Band `[min, max]`, rejected when inverted
    pub fn new(min: f32, max: f32) -> ConfigResult<Self> {
        if min > max {
            return Err(ConfigError::InvertedThreshold { min, max });
        }
        Ok(Self { min, max })
    }
}

/// Band plus the condition from the latest evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertState {
    /// Lower bound
    pub min: f32,
    /// Upper bound
    pub max: f32,
    /// Condition of the most recent reading
    pub condition: Condition,
}

impl AlertState {
    /// Fresh state, `Ok` until the first evaluation
    pub fn new(threshold: AlertThreshold) -> Self {
        Self {
            min: threshold.min,
            max: threshold.max,
            condition: Condition::Ok,
        }
    }

    /// The band this state checks against
    pub fn threshold(&self) -> AlertThreshold {
        AlertThreshold {
            min: self.min,
            max: self.max,
        }
    }

    /// Re-evaluate against `temp` and store the result
    pub fn update(&mut self, temp: f32) -> Condition {
        self.condition = evaluate(temp, &self.threshold());
        self.condition
    }
}

/// Classify `temp` against `threshold`
pub fn evaluate(temp: f32, threshold: &AlertThreshold) -> Condition {
    if temp > threshold.max {
        Condition::TooWarm
    } else if temp < threshold.min {
        Condition::TooCold
    } else {
        Condition::Ok
    }
}

/// True iff any temperature reading is currently abnormal
pub fn any_alert(registry: &SensorRegistry) -> bool {
    registry
        .temperatures()
        .any(|reading| reading.alert.condition.is_abnormal())
}

/// Re-evaluate every temperature reading from its latest value
///
/// Returns the number of abnormal readings.
pub fn refresh_alerts(registry: &mut SensorRegistry) -> usize {
    let mut abnormal = 0;
    for reading in registry.temperatures_mut() {
        let condition = reading.alert.update(reading.temp);
        if condition.is_abnormal() {
            gp_info!("{} is {} ({})", reading.name.as_str(), condition.as_str(), reading.temp);
            abnormal += 1;
        }
    }
    abnormal
}
