//! Node Configuration
//!
//! Everything a node needs to know is static: network credentials, where to
//! post, which sensors sit on which channels and how to render numbers.
//! [`ClientConfig`] holds all of it as plain data, deserializable from JSON
//! on hosted builds and constructible in code on firmware.
//!
//! Every violation is caught by [`ClientConfig::validate`] before the first
//! cycle, never while a document is being sent.
//!
//! ```json
//! {
//!   "network": { "ssid": "greenhouse", "passphrase": "secret", "security": "wpa2_personal" },
//!   "server": { "host": "iot.example.org", "port": 80, "path": "/post" },
//!   "identity": { "id": 400, "digits": 3 },
//!   "environments": [{ "name": "in", "channel": 0 }],
//!   "soils": [{ "name": "soil_1", "channel": 2 }],
//!   "temperatures": [{ "name": "bench", "channel": 3, "min": 10.0, "max": 30.0 }],
//!   "alerts": { "recipient": "ops@example.org" }
//! }
//! ```

use core::fmt::Write as _;

use heapless::{String, Vec};

use crate::alert::AlertThreshold;
use crate::constants::buffers::{
    MAX_AGENT_LEN, MAX_FIELD_NAME_LEN, MAX_HOST_LEN, MAX_NAME_LEN, MAX_PASSPHRASE_LEN,
    MAX_PATH_LEN, MAX_RECIPIENT_LEN, MAX_SENSORS, MAX_SSID_LEN,
};
use crate::constants::encoding::{DEFAULT_DECIMALS, DEFAULT_ID_FIELD, NUMBER_LENGTH};
use crate::constants::sampling::DEFAULT_SAMPLE_COUNT;
use crate::constants::time::{
    DEFAULT_IDLE_TIMEOUT_MS, DEFAULT_SEND_INTERVAL_MS, DEFAULT_WATCHDOG_TIMEOUT_MS,
};
use crate::document::{DocumentLayout, GroupPolicy};
use crate::errors::{ConfigError, ConfigResult};
use crate::sampler::Sampler;
use crate::sensors::{
    DeviceIdentity, EnvironmentReading, SensorName, SensorReading, SensorRegistry, SoilReading,
    TemperatureReading,
};
use crate::traits::Security;
use crate::transport::{RetryPolicy, TransportSettings};

/// Copy `value` into a bounded string, failing instead of truncating
pub fn bounded<const N: usize>(field: &'static str, value: &str) -> ConfigResult<String<N>> {
    let mut out = String::new();
    out.push_str(value).map_err(|_| ConfigError::TooLong {
        field,
        max: N,
        actual: value.len(),
    })?;
    Ok(out)
}

/// Reject text the encoder would have to escape inside a JSON string
pub(crate) fn json_safe(value: &str, reason: &'static str) -> ConfigResult<()> {
    if value.chars().any(|c| c == '"' || c == '\\' || c.is_control()) {
        return Err(ConfigError::InvalidName { reason });
    }
    Ok(())
}

/// Reject text that would end or split a request head line
fn header_safe(value: &str, field: &'static str, spaces_allowed: bool) -> ConfigResult<()> {
    let breaks_line = |c: char| c.is_control() || (!spaces_allowed && c.is_whitespace());
    if value.chars().any(breaks_line) {
        return Err(ConfigError::InvalidHeader { field });
    }
    Ok(())
}

fn required(value: &str, field: &'static str) -> ConfigResult<()> {
    if value.is_empty() {
        return Err(ConfigError::Missing { field });
    }
    Ok(())
}

/// Wireless network credentials
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NetworkConfig {
    /// Network name
    pub ssid: String<MAX_SSID_LEN>,
    /// Pre-shared key, empty for open networks
    pub passphrase: String<MAX_PASSPHRASE_LEN>,
    /// Security mode
    pub security: Security,
}

impl NetworkConfig {
    /// Credentials from plain strings
    pub fn new(ssid: &str, passphrase: &str, security: Security) -> ConfigResult<Self> {
        Ok(Self {
            ssid: bounded("ssid", ssid)?,
            passphrase: bounded("passphrase", passphrase)?,
            security,
        })
    }
}

/// Collecting server
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ServerConfig {
    /// Host name, sent as the `Host` header
    pub host: String<MAX_HOST_LEN>,
    /// TCP port
    pub port: u16,
    /// Request target
    pub path: String<MAX_PATH_LEN>,
    /// `User-Agent` header value
    pub agent: String<MAX_AGENT_LEN>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let mut path = String::new();
        let _ = path.push('/');
        let mut agent = String::new();
        // "greenpost/" plus a semver fits the agent buffer
        let _ = write!(agent, "greenpost/{}", crate::VERSION);
        Self {
            host: String::new(),
            port: 80,
            path,
            agent,
        }
    }
}

impl ServerConfig {
    /// Server at `host:port` receiving posts on `path`
    pub fn new(host: &str, port: u16, path: &str) -> ConfigResult<Self> {
        Ok(Self {
            host: bounded("host", host)?,
            port,
            path: bounded("path", path)?,
            ..Self::default()
        })
    }
}

/// Device identity as configured
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IdentityConfig {
    /// Identifier the server files readings under
    pub id: u32,
    /// Declared decimal digit count of `id`
    pub digits: u8,
    /// Document key carrying the identifier
    pub field: String<MAX_FIELD_NAME_LEN>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        let mut field = String::new();
        let _ = field.push_str(DEFAULT_ID_FIELD);
        Self {
            id: 1,
            digits: 1,
            field,
        }
    }
}

/// Environment sensor entry
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct EnvironmentEntry {
    /// Sensor name
    pub name: String<MAX_NAME_LEN>,
    /// Temperature channel (light is read on `channel + 1`)
    pub channel: u8,
}

/// Soil probe entry
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SoilEntry {
    /// Sensor name
    pub name: String<MAX_NAME_LEN>,
    /// Probe channel
    pub channel: u8,
}

/// Temperature probe entry with its alert band
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct TemperatureEntry {
    /// Sensor name
    pub name: String<MAX_NAME_LEN>,
    /// Probe channel
    pub channel: u8,
    /// Lower alert bound
    pub min: f32,
    /// Upper alert bound
    pub max: f32,
}

/// Denoising
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SamplingConfig {
    /// Raw samples per reading
    pub sample_count: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
        }
    }
}

/// Number rendering and group handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EncodingConfig {
    /// Fractional digits of every number
    pub decimals: u8,
    /// Empty group handling
    pub group_policy: GroupPolicy,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            decimals: DEFAULT_DECIMALS,
            group_policy: GroupPolicy::default(),
        }
    }
}

/// Cycle pacing and supervision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScheduleConfig {
    /// Pause between cycles
    pub send_interval_ms: u32,
    /// Quiet period that ends draining the reply
    pub idle_timeout_ms: u32,
    /// Watchdog deadline
    pub watchdog_timeout_ms: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            send_interval_ms: DEFAULT_SEND_INTERVAL_MS,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            watchdog_timeout_ms: DEFAULT_WATCHDOG_TIMEOUT_MS,
        }
    }
}

/// Alert delivery
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlertConfig {
    /// Address put in the `"to"` member of the alerts block
    pub recipient: String<MAX_RECIPIENT_LEN>,
}

/// Complete node configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClientConfig {
    /// Wireless credentials
    pub network: NetworkConfig,
    /// Collecting server
    pub server: ServerConfig,
    /// Device identity
    pub identity: IdentityConfig,
    /// Environment sensors
    pub environments: Vec<EnvironmentEntry, MAX_SENSORS>,
    /// Soil probes
    pub soils: Vec<SoilEntry, MAX_SENSORS>,
    /// Temperature probes with alert bands
    pub temperatures: Vec<TemperatureEntry, MAX_SENSORS>,
    /// Denoising
    pub sampling: SamplingConfig,
    /// Number rendering
    pub encoding: EncodingConfig,
    /// Pacing and supervision
    pub schedule: ScheduleConfig,
    /// Alert delivery
    pub alerts: AlertConfig,
    /// Polling for address assignment and resolution
    pub retry: RetryPolicy,
}

impl ClientConfig {
    fn sensor_count(&self) -> usize {
        self.environments.len() + self.soils.len() + self.temperatures.len()
    }

    fn check_capacity(&self) -> ConfigResult<()> {
        if self.sensor_count() >= MAX_SENSORS {
            return Err(ConfigError::TooManySensors {
                count: self.sensor_count() + 1,
                max: MAX_SENSORS,
            });
        }
        Ok(())
    }

    /// Add an environment sensor
    pub fn add_environment(&mut self, name: &str, channel: u8) -> ConfigResult<()> {
        self.check_capacity()?;
        let name = bounded("sensor name", name)?;
        let _ = self.environments.push(EnvironmentEntry { name, channel });
        Ok(())
    }

    /// Add a soil probe
    pub fn add_soil(&mut self, name: &str, channel: u8) -> ConfigResult<()> {
        self.check_capacity()?;
        let name = bounded("sensor name", name)?;
        let _ = self.soils.push(SoilEntry { name, channel });
        Ok(())
    }

    /// Add a temperature probe with alert band `[min, max]`
    pub fn add_temperature(&mut self, name: &str, channel: u8, min: f32, max: f32) -> ConfigResult<()> {
        self.check_capacity()?;
        let name = bounded("sensor name", name)?;
        let _ = self.temperatures.push(TemperatureEntry { name, channel, min, max });
        Ok(())
    }

    /// Check every constraint the cycle relies on
    pub fn validate(&self) -> ConfigResult<()> {
        required(&self.network.ssid, "ssid")?;
        required(&self.server.host, "host")?;
        required(&self.server.path, "path")?;
        required(&self.identity.field, "identity field")?;
        header_safe(&self.server.host, "host", false)?;
        header_safe(&self.server.path, "path", false)?;
        header_safe(&self.server.agent, "agent", true)?;
        json_safe(&self.identity.field, "identity field needs escaping")?;
        json_safe(&self.alerts.recipient, "alert recipient needs escaping")?;

        if usize::from(self.encoding.decimals) >= NUMBER_LENGTH {
            return Err(ConfigError::Precision {
                decimals: self.encoding.decimals,
                width: NUMBER_LENGTH,
            });
        }

        let schedule = &self.schedule;
        if schedule.send_interval_ms == 0 {
            return Err(ConfigError::InvalidTiming { reason: "send interval is zero" });
        }
        if schedule.idle_timeout_ms == 0 {
            return Err(ConfigError::InvalidTiming { reason: "idle timeout is zero" });
        }
        if schedule.watchdog_timeout_ms == 0 {
            return Err(ConfigError::InvalidTiming { reason: "watchdog timeout is zero" });
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidTiming { reason: "retry policy allows no attempt" });
        }
        if self.retry.max_backoff_ms >= schedule.watchdog_timeout_ms {
            return Err(ConfigError::InvalidTiming {
                reason: "retry backoff outlasts the watchdog",
            });
        }

        self.sampler()?;
        self.identity()?;
        self.build_registry()?;
        Ok(())
    }

    /// Identity with its declared digit count checked
    pub fn identity(&self) -> ConfigResult<DeviceIdentity> {
        DeviceIdentity::new(self.identity.id, self.identity.digits)
    }

    /// Sampler with the configured sample count
    pub fn sampler(&self) -> ConfigResult<Sampler> {
        Sampler::new(self.sampling.sample_count)
    }

    /// Registry with one zeroed reading per configured sensor
    ///
    /// Environments come first, then soils, then temperatures, each in
    /// configuration order.
    pub fn build_registry(&self) -> ConfigResult<SensorRegistry> {
        if self.sensor_count() > MAX_SENSORS {
            return Err(ConfigError::TooManySensors {
                count: self.sensor_count(),
                max: MAX_SENSORS,
            });
        }

        let mut registry = SensorRegistry::new();
        for entry in &self.environments {
            let reading = EnvironmentReading::new(SensorName::new(&entry.name)?, entry.channel)?;
            registry.push(SensorReading::Environment(reading))?;
        }
        for entry in &self.soils {
            let reading = SoilReading::new(SensorName::new(&entry.name)?, entry.channel)?;
            registry.push(SensorReading::Soil(reading))?;
        }
        for entry in &self.temperatures {
            let band = AlertThreshold::new(entry.min, entry.max)?;
            let reading = TemperatureReading::new(SensorName::new(&entry.name)?, entry.channel, band)?;
            registry.push(SensorReading::Temperature(reading))?;
        }
        Ok(registry)
    }

    /// Document layout
    pub fn layout(&self) -> DocumentLayout {
        DocumentLayout {
            id_field: self.identity.field.clone(),
            recipient: self.alerts.recipient.clone(),
            decimals: self.encoding.decimals,
            group_policy: self.encoding.group_policy,
        }
    }

    /// Transport driver settings
    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            host: self.server.host.clone(),
            port: self.server.port,
            path: self.server.path.clone(),
            agent: self.server.agent.clone(),
            idle_timeout_ms: self.schedule.idle_timeout_ms,
            retry: self.retry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ClientConfig {
        let mut config = ClientConfig {
            network: NetworkConfig::new("greenhouse", "secret", Security::Wpa2Personal).unwrap(),
            server: ServerConfig::new("iot.example.org", 80, "/post").unwrap(),
            ..ClientConfig::default()
        };
        config.identity.id = 400;
        config.identity.digits = 3;
        config.add_environment("in", 0).unwrap();
        config.add_soil("soil_1", 2).unwrap();
        config.add_temperature("bench", 3, 10.0, 30.0).unwrap();
        config
    }

    #[test]
    fn defaults_mirror_firmware() {
        let config = ClientConfig::default();
        assert_eq!(config.sampling.sample_count, 9);
        assert_eq!(config.encoding.decimals, 2);
        assert_eq!(config.schedule.idle_timeout_ms, 3000);
        assert_eq!(config.identity.field.as_str(), "greenhouse");
        assert!(config.server.agent.starts_with("greenpost/"));
        assert!(config.build_registry().unwrap().is_empty());
    }

    #[test]
    fn valid_config_builds() {
        let config = valid();
        config.validate().unwrap();

        let registry = config.build_registry().unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(config.identity().unwrap().id(), 400);
        assert_eq!(config.layout().decimals, 2);
        assert_eq!(config.transport_settings().host.as_str(), "iot.example.org");
    }

    #[test]
    fn precision_must_fit_width() {
        let mut config = valid();
        config.encoding.decimals = NUMBER_LENGTH as u8;
        assert_eq!(
            config.validate(),
            Err(ConfigError::Precision { decimals: 9, width: NUMBER_LENGTH })
        );
    }

    #[test]
    fn identity_digits_checked() {
        let mut config = valid();
        config.identity.digits = 4;
        assert_eq!(
            config.validate(),
            Err(ConfigError::IdentityDigitMismatch { declared: 4, actual: 3 })
        );
    }

    #[test]
    fn single_sample_rejected() {
        let mut config = valid();
        config.sampling.sample_count = 1;
        assert!(matches!(config.validate(), Err(ConfigError::SampleCount { count: 1, .. })));
    }

    #[test]
    fn oversize_values_rejected() {
        let long = "n".repeat(MAX_NAME_LEN + 1);
        let mut config = valid();
        assert!(matches!(config.add_soil(&long, 1), Err(ConfigError::TooLong { .. })));
        assert!(ServerConfig::new(&"h".repeat(MAX_HOST_LEN + 1), 80, "/").is_err());
    }

    #[test]
    fn capacity_counts_all_groups() {
        let mut config = ClientConfig::default();
        for channel in 0..MAX_SENSORS as u8 {
            config.add_soil("s", channel % 16).unwrap();
        }
        assert!(matches!(
            config.add_temperature("t", 0, 0.0, 1.0),
            Err(ConfigError::TooManySensors { .. })
        ));
    }

    #[test]
    fn bad_entries_surface_on_validate() {
        let mut config = valid();
        config.add_temperature("inverted", 4, 30.0, 10.0).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvertedThreshold { .. })));

        let mut config = valid();
        config.add_soil("say \"hi\"", 5).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidName { .. })));

        let mut config = valid();
        config.add_environment("edge", 15).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::ChannelOutOfRange { .. })));
    }

    #[test]
    fn timing_checked() {
        let mut config = valid();
        config.schedule.idle_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTiming { .. })));

        let mut config = valid();
        config.retry.max_backoff_ms = config.schedule.watchdog_timeout_ms;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTiming { .. })));
    }

    #[test]
    fn missing_host_rejected() {
        let mut config = valid();
        config.server.host.clear();
        assert_eq!(config.validate(), Err(ConfigError::Missing { field: "host" }));
    }

    #[test]
    fn recipient_must_be_json_safe() {
        let mut config = valid();
        config.alerts.recipient = bounded("recipient", "ops\"@x").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidName { .. })));
    }

    #[test]
    fn header_injection_rejected() {
        let mut config = valid();
        config.server = ServerConfig::new("iot.example.org\r\nX-Extra: 1", 80, "/post").unwrap();
        assert_eq!(config.validate(), Err(ConfigError::InvalidHeader { field: "host" }));

        let mut config = valid();
        config.server.path = bounded("path", "/a b").unwrap();
        assert_eq!(config.validate(), Err(ConfigError::InvalidHeader { field: "path" }));

        let mut config = valid();
        config.server.agent = bounded("agent", "x\r\nContent-Length: 0").unwrap();
        assert_eq!(config.validate(), Err(ConfigError::InvalidHeader { field: "agent" }));
    }

    #[test]
    fn agent_may_contain_spaces() {
        let mut config = valid();
        config.server.agent = bounded("agent", "greenpost/1 (bench)").unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn names_and_recipient_share_one_rule() {
        for text in ["tab\there", "back\\slash", "quo\"te"] {
            assert!(matches!(SensorName::new(text), Err(ConfigError::InvalidName { .. })));

            let mut config = valid();
            config.alerts.recipient = bounded("recipient", text).unwrap();
            assert!(matches!(config.validate(), Err(ConfigError::InvalidName { .. })));

            let mut config = valid();
            config.identity.field = bounded("identity field", text).unwrap();
            assert!(matches!(config.validate(), Err(ConfigError::InvalidName { .. })));
        }
    }
}
