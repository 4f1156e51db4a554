//! Raw analog sampling seam

/// Source of raw analog samples
///
/// Implementations return the converter count for `channel` in
/// `0..=ADC_MAX`. Read failures are a hardware concern: the provider always
/// returns a value and the core does not judge its plausibility.
pub trait SensorProvider {
    /// Read one raw sample from `channel`
    fn read_channel(&mut self, channel: u8) -> u16;
}

impl<T: SensorProvider + ?Sized> SensorProvider for &mut T {
    fn read_channel(&mut self, channel: u8) -> u16 {
        (**self).read_channel(channel)
    }
}
