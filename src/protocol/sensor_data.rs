//! Current sensor values parsing.
//!
//! Parses the fixed-layout packet read from the measurement characteristic.

use bytes::{Buf, BufMut};
use tracing::trace;

use crate::error::{Error, Result};

/// Decoded current sensor values from the measurement characteristic.
///
/// The packet is kept as its raw field groups; the scaled physical
/// quantities are exposed through accessor methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorData {
    /// The four leading 8-bit fields. Only field 1 is consumed: relative
    /// humidity in steps of 0.5 %RH.
    pub bytes: [u8; 4],
    /// The eight 16-bit fields following the byte block.
    pub words: [u16; 8],
}

impl SensorData {
    /// Exact size of the current-values packet in bytes.
    pub const SIZE: usize = 20;

    /// Parse current sensor values from characteristic data.
    ///
    /// The packet layout is:
    /// - Bytes 0-3: four uint8 fields; field 1 is relative humidity (0.5 %RH steps)
    /// - Bytes 4-5: radon day average (uint16 little-endian, raw)
    /// - Bytes 6-7: radon long-term average (uint16 little-endian, raw)
    /// - Bytes 8-9: temperature (uint16 little-endian, hundredths of a degree Celsius)
    /// - Bytes 10-11: relative atmospheric pressure (uint16 little-endian, fiftieths of an hPa)
    /// - Bytes 12-13: CO2 level (uint16 little-endian, raw)
    /// - Bytes 14-15: VOC level (uint16 little-endian, raw)
    /// - Bytes 16-19: two uint16 fields, unused
    pub fn parse(data: &[u8]) -> Result<Self> {
        trace!("SensorData::parse called with {} bytes", data.len());

        if data.len() != Self::SIZE {
            return Err(Error::Decode {
                context: format!(
                    "Measurement data wrong size: {} bytes (need exactly {})",
                    data.len(),
                    Self::SIZE
                ),
            });
        }

        let mut buf = data;
        let mut bytes = [0u8; 4];
        buf.copy_to_slice(&mut bytes);
        let mut words = [0u16; 8];
        for word in &mut words {
            *word = buf.get_u16_le();
        }

        Ok(Self { bytes, words })
    }

    /// Re-encode into the exact wire layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::SIZE);
        buf.put_slice(&self.bytes);
        for word in self.words {
            buf.put_u16_le(word);
        }
        buf
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> f64 {
        f64::from(self.bytes[1]) / 2.0
    }

    /// Radon concentration averaged over the last day, raw sensor units.
    pub fn radon_day_average(&self) -> u16 {
        self.words[0]
    }

    /// Radon concentration averaged over the device lifetime, raw sensor units.
    pub fn radon_total_average(&self) -> u16 {
        self.words[1]
    }

    /// Temperature in degrees Celsius.
    pub fn temperature(&self) -> f64 {
        f64::from(self.words[2]) / 100.0
    }

    /// Relative atmospheric pressure in hPa.
    pub fn pressure(&self) -> f64 {
        f64::from(self.words[3]) / 50.0
    }

    /// CO2 level, raw sensor units.
    pub fn co2(&self) -> f64 {
        f64::from(self.words[4])
    }

    /// VOC level, raw sensor units.
    pub fn voc(&self) -> f64 {
        f64::from(self.words[5])
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;

    fn create_test_measurement_data() -> Vec<u8> {
        let mut data = Vec::with_capacity(SensorData::SIZE);
        data.put_slice(&[1, 120, 0, 0]);
        for word in [55u16, 100, 2215, 49870, 800, 150, 0, 0] {
            data.put_u16_le(word);
        }
        data
    }

    #[test]
    fn test_parse_valid_packet() {
        let data = create_test_measurement_data();
        let parsed = SensorData::parse(&data).unwrap();

        assert_eq!(parsed.bytes, [1, 120, 0, 0]);
        assert_eq!(parsed.words, [55, 100, 2215, 49870, 800, 150, 0, 0]);
    }

    #[test]
    fn test_accessor_scaling() {
        let data = create_test_measurement_data();
        let parsed = SensorData::parse(&data).unwrap();

        assert_eq!(parsed.humidity(), 60.0);
        assert_eq!(parsed.radon_day_average(), 55);
        assert_eq!(parsed.radon_total_average(), 100);
        assert_eq!(parsed.temperature(), 22.15);
        assert_eq!(parsed.pressure(), 997.4);
        assert_eq!(parsed.co2(), 800.0);
        assert_eq!(parsed.voc(), 150.0);
    }

    #[test]
    fn test_parse_rejects_short_packet() {
        let data = vec![0u8; SensorData::SIZE - 1];
        let result = SensorData::parse(&data);
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_parse_rejects_long_packet() {
        let data = vec![0u8; SensorData::SIZE + 1];
        let result = SensorData::parse(&data);
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_round_trip() {
        let data = create_test_measurement_data();
        let parsed = SensorData::parse(&data).unwrap();
        assert_eq!(parsed.to_bytes(), data);
    }

    proptest! {
        #[test]
        fn round_trips_any_field_values(bytes in any::<[u8; 4]>(), words in any::<[u16; 8]>()) {
            let original = SensorData { bytes, words };
            let encoded = original.to_bytes();
            prop_assert_eq!(encoded.len(), SensorData::SIZE);
            let decoded = SensorData::parse(&encoded).unwrap();
            prop_assert_eq!(decoded, original);
        }
    }
}
