//! Sensor Model
//!
//! Typed records for every sensor group, the registry that owns them and
//! the device identity. Records are built once from configuration and then
//! overwritten in place every cycle; nothing is allocated or freed while the
//! node runs.
//!
//! ## Groups
//!
//! | Kind          | Reported values                                | Channels        |
//! |---------------|------------------------------------------------|-----------------|
//! | Environment   | temperature, humidity (placeholder), illuminance | `ch`, `ch + 1` |
//! | Soil          | humidity                                       | `ch`            |
//! | Temperature   | temperature plus alert condition               | `ch`            |
//!
//! ## Conversions
//!
//! Raw converter counts become reported values with fixed formulas, the
//! same ones the collecting server's dashboards are calibrated for:
//!
//! ```text
//! temperature  = raw * 5 * 100 / 1023
//! illuminance  = min(1000, 1023 - raw(ch + 1))
//! soil         = raw * 100 / 1023
//! humidity     = 0            (sensor not populated)
//! ```

use core::ops::Deref;

use heapless::{String, Vec};

use crate::alert::{AlertState, AlertThreshold};
use crate::constants::buffers::{MAX_NAME_LEN, MAX_SENSORS};
use crate::constants::sampling::{
    ADC_MAX, ADC_REFERENCE_VOLTS, HUMIDITY_PLACEHOLDER, ILLUMINANCE_CEILING, MAX_CHANNEL,
    SOIL_HUMIDITY_SCALE, TEMPERATURE_SCALE,
};
use crate::config::json_safe;
use crate::encoder::decimal_digits;
use crate::errors::{ConfigError, ConfigResult};
use crate::sampler::Sampler;
use crate::traits::{Liveness, SensorProvider};

/// Temperature from a denoised raw value
pub fn temperature_from_raw(raw: f32) -> f32 {
    raw * ADC_REFERENCE_VOLTS * TEMPERATURE_SCALE / f32::from(ADC_MAX)
}

/// Illuminance from a denoised raw value of the light channel
pub fn illuminance_from_raw(raw: f32) -> f32 {
    (f32::from(ADC_MAX) - raw).min(ILLUMINANCE_CEILING)
}

/// Soil humidity from a denoised raw value
pub fn soil_humidity_from_raw(raw: f32) -> f32 {
    raw * SOIL_HUMIDITY_SCALE / f32::from(ADC_MAX)
}

/// Bounded, JSON-safe sensor name
///
/// Construction fails instead of truncating, and rejects characters that
/// would need escaping so the encoder can count a name by its length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorName(String<MAX_NAME_LEN>);

impl SensorName {
    /// Validate and copy `name`
    pub fn new(name: &str) -> ConfigResult<Self> {
        if name.is_empty() {
            return Err(ConfigError::InvalidName { reason: "empty" });
        }
        json_safe(name, "quote, backslash or control character")?;
        let mut bounded = String::new();
        bounded.push_str(name).map_err(|_| ConfigError::TooLong {
            field: "sensor name",
            max: MAX_NAME_LEN,
            actual: name.len(),
        })?;
        Ok(Self(bounded))
    }

    /// Name as text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for SensorName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

fn check_channel(channel: u8, max: u8) -> ConfigResult<u8> {
    if channel > max {
        return Err(ConfigError::ChannelOutOfRange { channel, max });
    }
    Ok(channel)
}

/// Air temperature, humidity and light at one spot
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentReading {
    /// Sensor name
    pub name: SensorName,
    /// Temperature from the last cycle
    pub temperature: f32,
    /// Air humidity (always the placeholder, sensor not populated)
    pub humidity: f32,
    /// Illuminance from the last cycle
    pub illuminance: f32,
    /// Temperature channel; light is read on the next one
    pub channel: u8,
}

impl EnvironmentReading {
    /// New record with zeroed values
    pub fn new(name: SensorName, channel: u8) -> ConfigResult<Self> {
        // the light sensor sits on channel + 1
        check_channel(channel, MAX_CHANNEL - 1)?;
        Ok(Self {
            name,
            temperature: 0.0,
            humidity: HUMIDITY_PLACEHOLDER,
            illuminance: 0.0,
            channel,
        })
    }

    /// Sample both channels and overwrite the values
    pub fn measure<P: SensorProvider>(&mut self, sampler: &Sampler, provider: &mut P) {
        self.temperature = temperature_from_raw(sampler.read_denoised(provider, self.channel));
        self.humidity = HUMIDITY_PLACEHOLDER;
        self.illuminance = illuminance_from_raw(sampler.read_denoised(provider, self.channel + 1));
    }
}

/// Soil moisture probe
#[derive(Debug, Clone, PartialEq)]
pub struct SoilReading {
    /// Sensor name
    pub name: SensorName,
    /// Soil humidity from the last cycle
    pub humidity: f32,
    /// Probe channel
    pub channel: u8,
}

impl SoilReading {
    /// New record with zeroed values
    pub fn new(name: SensorName, channel: u8) -> ConfigResult<Self> {
        Ok(Self {
            name,
            humidity: 0.0,
            channel: check_channel(channel, MAX_CHANNEL)?,
        })
    }

    /// Sample the probe and overwrite the value
    pub fn measure<P: SensorProvider>(&mut self, sampler: &Sampler, provider: &mut P) {
        self.humidity = soil_humidity_from_raw(sampler.read_denoised(provider, self.channel));
    }
}

/// Temperature probe with an alert band
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureReading {
    /// Sensor name
    pub name: SensorName,
    /// Temperature from the last cycle
    pub temp: f32,
    /// Band and latest condition
    pub alert: AlertState,
    /// Probe channel
    pub channel: u8,
}

impl TemperatureReading {
    /// New record, condition `Ok` until first evaluated
    pub fn new(name: SensorName, channel: u8, threshold: AlertThreshold) -> ConfigResult<Self> {
        Ok(Self {
            name,
            temp: 0.0,
            alert: AlertState::new(threshold),
            channel: check_channel(channel, MAX_CHANNEL)?,
        })
    }

    /// Sample the probe, overwrite the value and re-evaluate the alert
    pub fn measure<P: SensorProvider>(&mut self, sampler: &Sampler, provider: &mut P) {
        self.temp = temperature_from_raw(sampler.read_denoised(provider, self.channel));
        self.alert.update(self.temp);
    }
}

/// Sensor group a reading belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    /// Air temperature, humidity and light
    Environment,
    /// Soil moisture
    Soil,
    /// Temperature with alert band
    Temperature,
}

/// One physical sensor and its latest values
#[derive(Debug, Clone, PartialEq)]
pub enum SensorReading {
    /// Environment sensor
    Environment(EnvironmentReading),
    /// Soil probe
    Soil(SoilReading),
    /// Temperature probe with alert
    Temperature(TemperatureReading),
}

impl SensorReading {
    /// Group this reading is reported in
    pub fn kind(&self) -> SensorKind {
        match self {
            Self::Environment(_) => SensorKind::Environment,
            Self::Soil(_) => SensorKind::Soil,
            Self::Temperature(_) => SensorKind::Temperature,
        }
    }

    /// Sensor name
    pub fn name(&self) -> &SensorName {
        match self {
            Self::Environment(r) => &r.name,
            Self::Soil(r) => &r.name,
            Self::Temperature(r) => &r.name,
        }
    }

    /// Primary channel
    pub fn channel(&self) -> u8 {
        match self {
            Self::Environment(r) => r.channel,
            Self::Soil(r) => r.channel,
            Self::Temperature(r) => r.channel,
        }
    }

    /// Sample and overwrite this reading's values
    pub fn measure<P: SensorProvider>(&mut self, sampler: &Sampler, provider: &mut P) {
        match self {
            Self::Environment(r) => r.measure(sampler, provider),
            Self::Soil(r) => r.measure(sampler, provider),
            Self::Temperature(r) => r.measure(sampler, provider),
        }
    }
}

/// Every sensor on the node, in configuration order
///
/// Shape is fixed once built; only values change. Group views preserve
/// insertion order, which is the order items appear in the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorRegistry {
    readings: Vec<SensorReading, MAX_SENSORS>,
}

impl SensorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self { readings: Vec::new() }
    }

    /// Append a sensor
    pub fn push(&mut self, reading: SensorReading) -> ConfigResult<()> {
        self.readings.push(reading).map_err(|_| ConfigError::TooManySensors {
            count: MAX_SENSORS + 1,
            max: MAX_SENSORS,
        })
    }

    /// Number of sensors across all groups
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// True if no sensor is configured
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// All sensors in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &SensorReading> + Clone {
        self.readings.iter()
    }

    /// Number of sensors in `kind`'s group
    pub fn count(&self, kind: SensorKind) -> usize {
        self.readings.iter().filter(|r| r.kind() == kind).count()
    }

    /// Environment group
    pub fn environments(&self) -> impl Iterator<Item = &EnvironmentReading> + Clone {
        self.readings.iter().filter_map(|r| match r {
            SensorReading::Environment(env) => Some(env),
            _ => None,
        })
    }

    /// Soil group
    pub fn soils(&self) -> impl Iterator<Item = &SoilReading> + Clone {
        self.readings.iter().filter_map(|r| match r {
            SensorReading::Soil(soil) => Some(soil),
            _ => None,
        })
    }

    /// Temperature group
    pub fn temperatures(&self) -> impl Iterator<Item = &TemperatureReading> + Clone {
        self.readings.iter().filter_map(|r| match r {
            SensorReading::Temperature(temp) => Some(temp),
            _ => None,
        })
    }

    /// Temperature group, mutable
    pub fn temperatures_mut(&mut self) -> impl Iterator<Item = &mut TemperatureReading> {
        self.readings.iter_mut().filter_map(|r| match r {
            SensorReading::Temperature(temp) => Some(temp),
            _ => None,
        })
    }

    /// Sample every sensor, refreshing `liveness` after each one
    pub fn measure_all<P, L>(&mut self, sampler: &Sampler, provider: &mut P, liveness: &mut L)
    where
        P: SensorProvider,
        L: Liveness,
    {
        for reading in self.readings.iter_mut() {
            reading.measure(sampler, provider);
            liveness.refresh();
        }
        gp_debug!("measured {} sensors", self.readings.len());
    }
}

/// Identifier the collecting server files readings under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceIdentity {
    id: u32,
    declared_digits: u8,
}

impl DeviceIdentity {
    /// Identity whose declared digit count must match `id`'s rendering
    pub fn new(id: u32, declared_digits: u8) -> ConfigResult<Self> {
        let actual = decimal_digits(id);
        if actual != declared_digits {
            return Err(ConfigError::IdentityDigitMismatch {
                declared: declared_digits,
                actual,
            });
        }
        Ok(Self { id, declared_digits })
    }

    /// Identifier value
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Digit count of the rendered identifier
    pub fn digits(&self) -> u8 {
        self.declared_digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::Condition;
    use crate::traits::NoopLiveness;

    /// Returns a fixed value per channel
    struct Fixed([u16; 4]);

    impl SensorProvider for Fixed {
        fn read_channel(&mut self, channel: u8) -> u16 {
            self.0[channel as usize]
        }
    }

    fn name(text: &str) -> SensorName {
        SensorName::new(text).unwrap()
    }

    #[test]
    fn names_reject_instead_of_truncating() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            SensorName::new(&long),
            Err(ConfigError::TooLong { field: "sensor name", max: MAX_NAME_LEN, actual: MAX_NAME_LEN + 1 })
        );
        assert!(SensorName::new(&"x".repeat(MAX_NAME_LEN)).is_ok());
        assert!(SensorName::new("say \"hi\"").is_err());
        assert!(SensorName::new("back\\slash").is_err());
        assert!(SensorName::new("").is_err());
        assert_eq!(name("in").as_str(), "in");
    }

    #[test]
    fn conversions() {
        assert!((temperature_from_raw(1023.0) - 500.0).abs() < 1e-3);
        assert!((temperature_from_raw(0.0)).abs() < 1e-6);
        assert_eq!(illuminance_from_raw(0.0), 1000.0);
        assert_eq!(illuminance_from_raw(1000.0), 23.0);
        assert!((soil_humidity_from_raw(1023.0) - 100.0).abs() < 1e-3);
    }

    #[test]
    fn environment_reads_two_channels() {
        let sampler = Sampler::new(3).unwrap();
        let mut provider = Fixed([0, 1023, 100, 0]);
        let mut env = EnvironmentReading::new(name("in"), 1).unwrap();

        env.measure(&sampler, &mut provider);

        assert!((env.temperature - 500.0).abs() < 1e-3);
        assert_eq!(env.illuminance, 923.0);
        assert_eq!(env.humidity, 0.0);
    }

    #[test]
    fn environment_needs_room_for_light_channel() {
        assert!(EnvironmentReading::new(name("edge"), MAX_CHANNEL).is_err());
        assert!(EnvironmentReading::new(name("edge"), MAX_CHANNEL - 1).is_ok());
        assert!(SoilReading::new(name("deep"), MAX_CHANNEL + 1).is_err());
    }

    #[test]
    fn temperature_updates_alert() {
        let sampler = Sampler::new(2).unwrap();
        let mut provider = Fixed([1023, 0, 0, 0]);
        let band = AlertThreshold::new(10.0, 40.0).unwrap();
        let mut probe = TemperatureReading::new(name("bench"), 0, band).unwrap();

        probe.measure(&sampler, &mut provider);

        assert_eq!(probe.alert.condition, Condition::TooWarm);
    }

    #[test]
    fn registry_groups_keep_order() {
        let mut registry = SensorRegistry::new();
        registry.push(SensorReading::Soil(SoilReading::new(name("s1"), 0).unwrap())).unwrap();
        registry
            .push(SensorReading::Environment(EnvironmentReading::new(name("e1"), 2).unwrap()))
            .unwrap();
        registry.push(SensorReading::Soil(SoilReading::new(name("s2"), 4).unwrap())).unwrap();

        let soils: std::vec::Vec<&str> = registry.soils().map(|s| s.name.as_str()).collect();
        assert_eq!(soils, ["s1", "s2"]);
        assert_eq!(registry.count(SensorKind::Environment), 1);
        assert_eq!(registry.count(SensorKind::Temperature), 0);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn registry_capacity() {
        let mut registry = SensorRegistry::new();
        for _ in 0..MAX_SENSORS {
            registry.push(SensorReading::Soil(SoilReading::new(name("s"), 0).unwrap())).unwrap();
        }
        let overflow = registry.push(SensorReading::Soil(SoilReading::new(name("s"), 0).unwrap()));
        assert!(matches!(overflow, Err(ConfigError::TooManySensors { .. })));
    }

    #[test]
    fn measure_all_refreshes_per_sensor() {
        struct Counting(u32);
        impl Liveness for Counting {
            fn arm(&mut self, _timeout_ms: u32) {}
            fn refresh(&mut self) {
                self.0 += 1;
            }
            fn disarm(&mut self) {}
        }

        let mut registry = SensorRegistry::new();
        registry.push(SensorReading::Soil(SoilReading::new(name("a"), 0).unwrap())).unwrap();
        registry.push(SensorReading::Soil(SoilReading::new(name("b"), 1).unwrap())).unwrap();
        let mut provider = Fixed([1023, 0, 0, 0]);
        let mut watchdog = Counting(0);

        registry.measure_all(&Sampler::default(), &mut provider, &mut watchdog);
        registry.measure_all(&Sampler::default(), &mut provider, &mut NoopLiveness);

        assert_eq!(watchdog.0, 2);
        let humidity: std::vec::Vec<f32> = registry.soils().map(|s| s.humidity).collect();
        assert!((humidity[0] - 100.0).abs() < 1e-3);
        assert_eq!(humidity[1], 0.0);
    }

    #[test]
    fn identity_digits_validated() {
        assert_eq!(DeviceIdentity::new(400, 3).unwrap().id(), 400);
        assert_eq!(
            DeviceIdentity::new(400, 4),
            Err(ConfigError::IdentityDigitMismatch { declared: 4, actual: 3 })
        );
        assert_eq!(DeviceIdentity::new(0, 1).unwrap().digits(), 1);
    }
}
