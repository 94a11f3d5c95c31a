//! Protocol module for parsing device payloads.
//!
//! This module contains the implementations for:
//! - Current sensor values parsing
//! - Command exchange payload parsing

pub mod command;
pub mod sensor_data;

pub use command::{CommandData, CommandResponse, COMMAND_TRIGGER};
pub use sensor_data::SensorData;
