//! Command characteristic protocol.
//!
//! The command characteristic answers a single-byte trigger write with one
//! notification carrying device status fields.

use bytes::Buf;
use tracing::trace;

use crate::error::{Error, Result};
use crate::utils::battery_percentage;

/// Command written to the command characteristic to request a status
/// notification.
pub const COMMAND_TRIGGER: u8 = 0x6D;

/// Parsed payload of a command-characteristic notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResponse {
    /// The leading 32-bit field of the payload.
    pub dword: u32,
    /// The twelve 8-bit fields after the dword. Field 1 carries illuminance.
    pub bytes: [u8; 12],
    /// The six 16-bit fields at the tail. Field 4 carries battery potential
    /// in millivolts.
    pub words: [u16; 6],
}

impl CommandResponse {
    /// Size of the header/sequence marker preceding the field layout.
    pub const HEADER_SIZE: usize = 2;
    /// Minimum payload size: the header plus the 28-byte field layout.
    pub const MIN_SIZE: usize = Self::HEADER_SIZE + 28;

    /// Parse a command notification payload.
    ///
    /// The payload layout is:
    /// - Bytes 0-1: header/sequence marker, skipped
    /// - Bytes 2-5: one uint32 little-endian field
    /// - Bytes 6-17: twelve uint8 fields; field 1 is illuminance
    /// - Bytes 18-29: six uint16 little-endian fields; field 4 is battery
    ///   potential in millivolts
    ///
    /// Trailing bytes beyond the layout are ignored.
    pub fn parse(data: &[u8]) -> Result<Self> {
        trace!("CommandResponse::parse called with {} bytes", data.len());

        if data.len() < Self::MIN_SIZE {
            return Err(Error::Decode {
                context: format!(
                    "Command data too short: {} bytes (need at least {})",
                    data.len(),
                    Self::MIN_SIZE
                ),
            });
        }

        let mut buf = &data[Self::HEADER_SIZE..];
        let dword = buf.get_u32_le();
        let mut bytes = [0u8; 12];
        buf.copy_to_slice(&mut bytes);
        let mut words = [0u16; 6];
        for word in &mut words {
            *word = buf.get_u16_le();
        }

        Ok(Self { dword, bytes, words })
    }

    /// Ambient illuminance, raw sensor units.
    pub fn illuminance(&self) -> u8 {
        self.bytes[1]
    }

    /// Battery potential in volts.
    pub fn battery_voltage(&self) -> f64 {
        f64::from(self.words[4]) / 1000.0
    }
}

/// Device status distilled from a command exchange.
///
/// `Default` is the all-zero value substituted when the exchange times out.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CommandData {
    /// Ambient illuminance, raw sensor units.
    pub illuminance: u8,
    /// Battery potential in volts.
    pub battery_voltage: f64,
    /// Battery charge estimate, 0-100.
    pub battery_percentage: u8,
}

impl From<&CommandResponse> for CommandData {
    fn from(response: &CommandResponse) -> Self {
        let battery_voltage = response.battery_voltage();
        Self {
            illuminance: response.illuminance(),
            battery_voltage,
            battery_percentage: battery_percentage(battery_voltage),
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::BufMut;
    use pretty_assertions::assert_eq;

    use super::*;

    fn create_test_command_data(illuminance: u8, battery_millivolts: u16) -> Vec<u8> {
        let mut data = Vec::with_capacity(CommandResponse::MIN_SIZE);
        data.put_slice(&[COMMAND_TRIGGER, 0x00]);
        data.put_u32_le(7);
        data.put_slice(&[9, illuminance, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        for word in [0u16, 0, 0, 0, battery_millivolts, 0] {
            data.put_u16_le(word);
        }
        data
    }

    #[test]
    fn test_trigger_byte_value() {
        assert_eq!(COMMAND_TRIGGER, 0x6D);
    }

    #[test]
    fn test_parse_valid_payload() {
        let data = create_test_command_data(42, 2700);
        let parsed = CommandResponse::parse(&data).unwrap();

        assert_eq!(parsed.dword, 7);
        assert_eq!(parsed.bytes[0], 9);
        assert_eq!(parsed.illuminance(), 42);
        assert_eq!(parsed.battery_voltage(), 2.7);
    }

    #[test]
    fn test_parse_rejects_short_payload() {
        let data = vec![0u8; CommandResponse::MIN_SIZE - 1];
        let result = CommandResponse::parse(&data);
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_parse_accepts_trailing_bytes() {
        let mut data = create_test_command_data(42, 2700);
        data.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD]);
        let parsed = CommandResponse::parse(&data).unwrap();
        assert_eq!(parsed.illuminance(), 42);
    }

    #[test]
    fn test_command_data_from_response() {
        let data = create_test_command_data(42, 2700);
        let parsed = CommandResponse::parse(&data).unwrap();
        let distilled = CommandData::from(&parsed);

        assert_eq!(distilled.illuminance, 42);
        assert_eq!(distilled.battery_voltage, 2.7);
        assert_eq!(distilled.battery_percentage, 50);
    }

    #[test]
    fn test_command_data_default_is_all_zero() {
        let distilled = CommandData::default();
        assert_eq!(distilled.illuminance, 0);
        assert_eq!(distilled.battery_voltage, 0.0);
        assert_eq!(distilled.battery_percentage, 0);
    }
}
