//! BLE Characteristic UUIDs.
//!
//! Contains all UUID constants used for Airthings device communication.

use std::collections::HashMap;

use uuid::Uuid;

// Device Information Service (Standard BLE)
/// Model Number characteristic UUID.
pub const MODEL_NUMBER_UUID: Uuid = Uuid::from_u128(0x0000_2a24_0000_1000_8000_00805f9b34fb);
/// Serial Number characteristic UUID.
pub const SERIAL_NUMBER_UUID: Uuid = Uuid::from_u128(0x0000_2a25_0000_1000_8000_00805f9b34fb);

// Wave Plus sensor characteristics (Airthings Custom)
/// Current sensor values characteristic UUID (Read).
pub const MEASUREMENT_UUID: Uuid = Uuid::from_u128(0xb42e_2a68_ade7_11e4_89d3_123b93f75cba);
/// Command characteristic UUID (Write, Notify).
pub const COMMAND_UUID: Uuid = Uuid::from_u128(0xb42e_2d06_ade7_11e4_89d3_123b93f75cba);

// Airthings manufacturer ID for advertising data
/// Airthings ASA's Bluetooth manufacturer ID.
pub const AIRTHINGS_MANUFACTURER_ID: u16 = 0x0334;

/// Check whether advertised manufacturer data identifies an Airthings device.
pub fn is_airthings_advertisement(manufacturer_data: &HashMap<u16, Vec<u8>>) -> bool {
    manufacturer_data.contains_key(&AIRTHINGS_MANUFACTURER_ID)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_format() {
        // The constants must render as the documented identifiers
        let model = MODEL_NUMBER_UUID.to_string();
        assert!(model.contains("2a24"));

        let serial = SERIAL_NUMBER_UUID.to_string();
        assert!(serial.contains("2a25"));

        let measurement = MEASUREMENT_UUID.to_string();
        assert!(measurement.contains("b42e2a68"));

        let command = COMMAND_UUID.to_string();
        assert!(command.contains("b42e2d06"));
    }

    #[test]
    fn test_custom_uuids_share_vendor_suffix() {
        let measurement = MEASUREMENT_UUID.to_string();
        let command = COMMAND_UUID.to_string();
        assert!(measurement.ends_with("ade7-11e4-89d3-123b93f75cba"));
        assert!(command.ends_with("ade7-11e4-89d3-123b93f75cba"));
    }

    #[test]
    fn test_is_airthings_advertisement() {
        let mut data = HashMap::new();
        assert!(!is_airthings_advertisement(&data));

        data.insert(0x004C, vec![0x02, 0x15]);
        assert!(!is_airthings_advertisement(&data));

        data.insert(AIRTHINGS_MANUFACTURER_ID, vec![0x01, 0x02, 0x03]);
        assert!(is_airthings_advertisement(&data));
    }
}
