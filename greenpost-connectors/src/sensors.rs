//! Simulated analog front end
//!
//! Each channel holds a raw converter count that drifts by a small random
//! step on every read, so consecutive cycles look like a slowly changing
//! greenhouse. The generator is seeded, so a run is reproducible.

use greenpost_core::constants::sampling::{ADC_MAX, MAX_CHANNEL};
use greenpost_core::traits::SensorProvider;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Largest step a channel moves per read
const MAX_STEP: u16 = 3;

/// Seeded, drifting `SensorProvider`
#[derive(Debug, Clone)]
pub struct SimulatedSensors {
    rng: StdRng,
    levels: [u16; MAX_CHANNEL as usize + 1],
}

impl SimulatedSensors {
    /// Start every channel at a random level drawn from `seed`
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut levels = [0; MAX_CHANNEL as usize + 1];
        for level in &mut levels {
            *level = rng.gen_range(0..=ADC_MAX);
        }
        Self { rng, levels }
    }

    /// Pin `channel` to `raw`; drift continues from there
    pub fn set_level(&mut self, channel: u8, raw: u16) {
        if let Some(level) = self.levels.get_mut(usize::from(channel)) {
            *level = raw.min(ADC_MAX);
        }
    }

    /// Current level of `channel`
    pub fn level(&self, channel: u8) -> Option<u16> {
        self.levels.get(usize::from(channel)).copied()
    }
}

impl SensorProvider for SimulatedSensors {
    fn read_channel(&mut self, channel: u8) -> u16 {
        let roll = self.rng.gen_range(0..=2 * MAX_STEP);
        match self.levels.get_mut(usize::from(channel)) {
            Some(level) => {
                *level = (*level + roll).saturating_sub(MAX_STEP).min(ADC_MAX);
                *level
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SimulatedSensors::new(7);
        let mut b = SimulatedSensors::new(7);
        for channel in 0..4 {
            assert_eq!(a.read_channel(channel), b.read_channel(channel));
        }
    }

    #[test]
    fn test_seed_selects_starting_levels() {
        let a = SimulatedSensors::new(7);
        let b = SimulatedSensors::new(8);
        let levels = |s: &SimulatedSensors| (0..=MAX_CHANNEL).map(|ch| s.level(ch)).collect::<Vec<_>>();
        assert_eq!(levels(&a), levels(&SimulatedSensors::new(7)));
        assert_ne!(levels(&a), levels(&b));
    }

    #[test]
    fn test_readings_stay_in_range_and_drift_slowly() {
        let mut sensors = SimulatedSensors::new(1);
        sensors.set_level(0, ADC_MAX);
        sensors.set_level(1, 0);
        let mut previous = sensors.level(0).unwrap();
        for _ in 0..1000 {
            let raw = sensors.read_channel(0);
            assert!(raw <= ADC_MAX);
            assert!(raw.abs_diff(previous) <= MAX_STEP);
            previous = raw;

            assert!(sensors.read_channel(1) <= ADC_MAX);
        }
    }

    #[test]
    fn test_unknown_channel_reads_zero() {
        let mut sensors = SimulatedSensors::new(3);
        assert_eq!(sensors.read_channel(MAX_CHANNEL + 1), 0);
        assert_eq!(sensors.level(MAX_CHANNEL + 1), None);
    }
}
