//! Property tests: the Measure pass always predicts the Emit pass

use core::convert::Infallible;

use embedded_io::{ErrorType, Write};
use greenpost_core::{
    alert::{refresh_alerts, AlertThreshold},
    sensors::{EnvironmentReading, SoilReading, TemperatureReading},
    traits::NoopLiveness,
    DeviceIdentity, Document, DocumentLayout, Encoder, GroupPolicy, SensorName, SensorReading,
    SensorRegistry,
};
use proptest::prelude::*;

#[derive(Default)]
struct Collect(Vec<u8>);

impl ErrorType for Collect {
    type Error = Infallible;
}

impl Write for Collect {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn any_value() -> impl Strategy<Value = f32> {
    prop_oneof![
        8 => -1.0e6f32..1.0e6f32,
        1 => prop::num::f32::ANY,
        1 => Just(f32::NAN),
    ]
}

fn any_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,30}"
}

#[derive(Debug, Clone)]
enum Spec {
    Env(String, f32, f32),
    Soil(String, f32),
    Temp(String, f32, f32, f32),
}

fn any_sensor() -> impl Strategy<Value = Spec> {
    prop_oneof![
        (any_name(), any_value(), any_value()).prop_map(|(n, t, l)| Spec::Env(n, t, l)),
        (any_name(), any_value()).prop_map(|(n, h)| Spec::Soil(n, h)),
        (any_name(), any_value(), -50.0f32..50.0, 0.0f32..60.0)
            .prop_map(|(n, t, lo, width)| Spec::Temp(n, t, lo, lo + width)),
    ]
}

fn registry_from(specs: &[Spec]) -> SensorRegistry {
    let mut registry = SensorRegistry::new();
    for spec in specs {
        let reading = match spec {
            Spec::Env(name, temp, light) => {
                let mut env = EnvironmentReading::new(SensorName::new(name).unwrap(), 0).unwrap();
                env.temperature = *temp;
                env.illuminance = *light;
                SensorReading::Environment(env)
            }
            Spec::Soil(name, humidity) => {
                let mut soil = SoilReading::new(SensorName::new(name).unwrap(), 0).unwrap();
                soil.humidity = *humidity;
                SensorReading::Soil(soil)
            }
            Spec::Temp(name, temp, min, max) => {
                let band = AlertThreshold::new(*min, *max).unwrap();
                let mut probe = TemperatureReading::new(SensorName::new(name).unwrap(), 0, band).unwrap();
                probe.temp = *temp;
                SensorReading::Temperature(probe)
            }
        };
        registry.push(reading).unwrap();
    }
    refresh_alerts(&mut registry);
    registry
}

proptest! {
    #[test]
    fn numeric_field_width_is_constant(value in any_value(), decimals in 0u8..9) {
        let mut sink = Collect::default();
        let emitted = Encoder::emit(&mut sink).numeric_field("v", value, decimals, true).unwrap();
        let measured = Encoder::measure().numeric_field("v", value, decimals, true).unwrap();

        prop_assert_eq!(emitted, measured);
        prop_assert_eq!(emitted, sink.0.len());
        prop_assert_eq!(emitted, 1 + 1 + 2 + 9);
    }

    #[test]
    fn string_field_counts_bytes(name in any_name(), value in any_name(), last in any::<bool>()) {
        let mut sink = Collect::default();
        let emitted = Encoder::emit(&mut sink).string_field(&name, &value, last).unwrap();

        let expected = 1 + name.len() + 3 + value.len() + 1 + usize::from(!last);
        prop_assert_eq!(emitted, expected);
        prop_assert_eq!(Encoder::measure().string_field(&name, &value, last).unwrap(), expected);
    }

    #[test]
    fn document_length_matches_body(
        specs in prop::collection::vec(any_sensor(), 0..16),
        id in any::<u32>(),
        always in any::<bool>(),
        decimals in 0u8..5,
    ) {
        let registry = registry_from(&specs);
        let identity = DeviceIdentity::new(id, greenpost_core::encoder::decimal_digits(id)).unwrap();
        let layout = DocumentLayout {
            decimals,
            group_policy: if always { GroupPolicy::AlwaysInclude } else { GroupPolicy::OmitEmpty },
            ..DocumentLayout::default()
        };
        let document = Document::build(&registry, &identity, &layout);

        let measured = document.length();
        let mut sink = Collect::default();
        let emitted = document.write_to(&mut sink, &mut NoopLiveness).unwrap();

        prop_assert_eq!(measured, emitted);
        prop_assert_eq!(emitted, sink.0.len());
        prop_assert_eq!(document.length(), measured);

        let parsed: serde_json::Value = serde_json::from_slice(&sink.0).unwrap();
        prop_assert_eq!(parsed["greenhouse"].as_u64(), Some(u64::from(id)));
        prop_assert_eq!(parsed.get("alerts").is_some(), document.has_alerts());
    }
}
