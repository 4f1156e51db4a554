//! Document Assembler
//!
//! Renders the sensor registry as the one JSON document the collecting
//! server accepts, in a fixed member order:
//!
//! ```text
//! {"greenhouse":400
//!  ,"environments": [{"name":..,"temp":..,"humidity":..,"luminence":..},..]
//!  ,"soils": [{"name":..,"humidity":..},..]
//!  ,"temps": [{"name":..,"temp":..,"condition":..},..]
//!  ,"alerts": {"to":"..","messages": [{"name":..,"condition":..,"temp":..,"min":..,"max":..},..]}
//! }
//! ```
//!
//! (Line breaks for reading only; the body has none.)
//!
//! Which optional members appear is decided once, in [`Document::build`].
//! Both passes then run the same private `assemble` routine, so the
//! Measure pass and the Emit pass can't disagree about what is included.

use embedded_io::Write;
use heapless::String;

use crate::alert::any_alert;
use crate::constants::buffers::{MAX_FIELD_NAME_LEN, MAX_RECIPIENT_LEN};
use crate::constants::encoding::{
    ALERTS_KEY, ALERT_MESSAGES_KEY, ALERT_RECIPIENT_KEY, DEFAULT_DECIMALS, DEFAULT_ID_FIELD,
    ENVIRONMENTS_KEY, LUMINANCE_KEY, SOILS_KEY, TEMPS_KEY,
};
use crate::encoder::Encoder;
use crate::errors::{EncodeResult, TransportError, TransportResult};
use crate::sensors::{DeviceIdentity, SensorKind, SensorRegistry};
use crate::traits::{Liveness, NoopLiveness};

/// How empty sensor groups are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum GroupPolicy {
    /// Leave the key out entirely
    #[default]
    OmitEmpty,
    /// Always write the key, as `"soils": []` when empty
    AlwaysInclude,
}

/// Static document settings
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    /// Key of the identity member
    pub id_field: String<MAX_FIELD_NAME_LEN>,
    /// Address alert messages go to
    pub recipient: String<MAX_RECIPIENT_LEN>,
    /// Fractional digits of every number
    pub decimals: u8,
    /// Empty group handling
    pub group_policy: GroupPolicy,
}

impl Default for DocumentLayout {
    fn default() -> Self {
        let mut id_field = String::new();
        // the default key fits the bounded buffer
        let _ = id_field.push_str(DEFAULT_ID_FIELD);
        Self {
            id_field,
            recipient: String::new(),
            decimals: DEFAULT_DECIMALS,
            group_policy: GroupPolicy::default(),
        }
    }
}

/// Which optional members appear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Inclusion {
    environments: bool,
    soils: bool,
    temps: bool,
    alerts: bool,
}

/// One cycle's document, ready to measure and emit
#[derive(Debug, Clone)]
pub struct Document<'a> {
    registry: &'a SensorRegistry,
    identity: DeviceIdentity,
    layout: DocumentLayout,
    inclusion: Inclusion,
}

impl<'a> Document<'a> {
    /// Snapshot the inclusion decisions for `registry`
    ///
    /// Alert conditions must already be current; see
    /// [`crate::alert::refresh_alerts`].
    pub fn build(
        registry: &'a SensorRegistry,
        identity: &DeviceIdentity,
        layout: &DocumentLayout,
    ) -> Self {
        let present = |kind| match layout.group_policy {
            GroupPolicy::AlwaysInclude => true,
            GroupPolicy::OmitEmpty => registry.count(kind) > 0,
        };
        let inclusion = Inclusion {
            environments: present(SensorKind::Environment),
            soils: present(SensorKind::Soil),
            temps: present(SensorKind::Temperature),
            alerts: any_alert(registry),
        };
        Self {
            registry,
            identity: *identity,
            layout: layout.clone(),
            inclusion,
        }
    }

    /// Whether the alerts member is part of this document
    pub fn has_alerts(&self) -> bool {
        self.inclusion.alerts
    }

    /// Body length in bytes (Measure pass)
    pub fn length(&self) -> usize {
        let mut encoder = Encoder::measure();
        // the measuring sink cannot fail
        let _ = self.assemble(&mut encoder, &mut NoopLiveness);
        encoder.finish()
    }

    /// Write the body to `sink` (Emit pass)
    ///
    /// Refreshes `liveness` after every group. Returns the bytes written.
    pub fn write_to<W, L>(&self, sink: &mut W, liveness: &mut L) -> EncodeResult<usize>
    where
        W: Write,
        L: Liveness,
    {
        let mut encoder = Encoder::emit(sink);
        self.assemble(&mut encoder, liveness)?;
        Ok(encoder.finish())
    }

    /// Emit pass checked against the advertised `Content-Length`
    pub fn emit_checked<W, L>(
        &self,
        sink: &mut W,
        liveness: &mut L,
        advertised: usize,
    ) -> TransportResult<usize>
    where
        W: Write,
        L: Liveness,
    {
        let emitted = self.write_to(sink, liveness)?;
        if emitted != advertised {
            gp_error!("body length mismatch: advertised {}, emitted {}", advertised, emitted);
            return Err(TransportError::LengthMismatch {
                measured: advertised,
                emitted,
            });
        }
        Ok(emitted)
    }

    fn assemble<W, L>(&self, enc: &mut Encoder<'_, W>, liveness: &mut L) -> EncodeResult<usize>
    where
        W: Write,
        L: Liveness,
    {
        let decimals = self.layout.decimals;
        let mut written = enc.begin_object()?;
        written += enc.integer_field(&self.layout.id_field, self.identity.id(), true)?;

        if self.inclusion.environments {
            written += enc.separator()?;
            written += enc.array_of(ENVIRONMENTS_KEY, self.registry.environments(), |enc, env| {
                Ok(enc.string_field("name", &env.name, false)?
                    + enc.numeric_field("temp", env.temperature, decimals, false)?
                    + enc.numeric_field("humidity", env.humidity, decimals, false)?
                    + enc.numeric_field(LUMINANCE_KEY, env.illuminance, decimals, true)?)
            })?;
            liveness.refresh();
        }

        if self.inclusion.soils {
            written += enc.separator()?;
            written += enc.array_of(SOILS_KEY, self.registry.soils(), |enc, soil| {
                Ok(enc.string_field("name", &soil.name, false)?
                    + enc.numeric_field("humidity", soil.humidity, decimals, true)?)
            })?;
            liveness.refresh();
        }

        if self.inclusion.temps {
            written += enc.separator()?;
            written += enc.array_of(TEMPS_KEY, self.registry.temperatures(), |enc, probe| {
                Ok(enc.string_field("name", &probe.name, false)?
                    + enc.numeric_field("temp", probe.temp, decimals, false)?
                    + enc.string_field("condition", probe.alert.condition.as_str(), true)?)
            })?;
            liveness.refresh();
        }

        if self.inclusion.alerts {
            let abnormal = self
                .registry
                .temperatures()
                .filter(|probe| probe.alert.condition.is_abnormal());
            written += enc.separator()?;
            written += enc.object_of(ALERTS_KEY, |enc| {
                Ok(enc.string_field(ALERT_RECIPIENT_KEY, &self.layout.recipient, false)?
                    + enc.array_of(ALERT_MESSAGES_KEY, abnormal, |enc, probe| {
                        Ok(enc.string_field("name", &probe.name, false)?
                            + enc.string_field("condition", probe.alert.condition.as_str(), false)?
                            + enc.numeric_field("temp", probe.temp, decimals, false)?
                            + enc.numeric_field("min", probe.alert.min, decimals, false)?
                            + enc.numeric_field("max", probe.alert.max, decimals, true)?)
                    })?)
            })?;
            liveness.refresh();
        }

        Ok(written + enc.end_object()?)
    }
}
