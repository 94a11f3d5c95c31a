//! Data structures for device readings.
//!
//! This module contains the core data types used to represent assembled
//! readings and their output wrapping.

pub mod reading;

pub use reading::{DeviceReport, WaveReading};
