//! BLE communication module.
//!
//! This module provides low-level Bluetooth Low Energy functionality
//! for discovering and communicating with Airthings devices.

pub mod scanner;
pub mod session;
pub mod uuids;

pub use scanner::{DeviceIdentity, WaveScanner};
pub use session::WaveSession;
pub use uuids::*;
