//! Error types for the waveplus-ble crate.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Bus-level failure reported by the BLE transport.
    #[error("Bluetooth error: {0}")]
    Bluetooth(#[from] btleplug::Error),

    /// No usable Bluetooth adapter on this system.
    #[error("Bluetooth not available or disabled")]
    BluetoothUnavailable,

    /// The specified device was never discovered by this scanner.
    #[error("Device not found: {address}")]
    DeviceNotFound {
        /// The address that was looked up.
        address: String,
    },

    /// Characteristic not found on the device.
    #[error("Characteristic not found: {uuid}")]
    CharacteristicNotFound {
        /// The UUID of the characteristic that was not found.
        uuid: String,
    },

    /// A payload could not be decoded.
    #[error("Decode error: {context}")]
    Decode {
        /// Description of what was wrong with the data.
        context: String,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
