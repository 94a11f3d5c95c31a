//! Device sessions.
//!
//! A session owns one connection to an Airthings device, reads its
//! characteristics and assembles a complete reading.

use btleplug::api::{Characteristic, Peripheral as _, ValueNotification, WriteType};
use btleplug::platform::Peripheral;
use chrono::Utc;
use futures::stream::{Stream, StreamExt};
use std::time::Duration;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::ble::uuids::{COMMAND_UUID, MEASUREMENT_UUID, MODEL_NUMBER_UUID, SERIAL_NUMBER_UUID};
use crate::data::WaveReading;
use crate::error::{Error, Result};
use crate::protocol::{CommandData, CommandResponse, SensorData, COMMAND_TRIGGER};
use crate::utils::absolute_humidity;

/// An open connection to one Airthings device.
///
/// Created through [`WaveScanner::connect`](crate::WaveScanner::connect).
/// Dropping a session does not disconnect; call
/// [`disconnect`](Self::disconnect) or use
/// [`WaveScanner::read_device`](crate::WaveScanner::read_device), which
/// closes the connection in every outcome.
pub struct WaveSession {
    /// The connected peripheral.
    peripheral: Peripheral,
    /// The device address, for log lines.
    address: String,
}

impl WaveSession {
    /// How long a command exchange waits for its notification.
    pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

    /// Connect to a peripheral and enumerate its services.
    pub(crate) async fn connect(peripheral: Peripheral, address: String) -> Result<Self> {
        info!("Connecting to {}", address);

        peripheral.connect().await.map_err(Error::Bluetooth)?;

        if let Err(e) = peripheral.discover_services().await {
            let _ = peripheral.disconnect().await;
            return Err(Error::Bluetooth(e));
        }

        debug!("Connected to {}", address);
        Ok(Self {
            peripheral,
            address,
        })
    }

    /// Take one complete reading from the device.
    ///
    /// A device that reports no services yields the all-zero
    /// [`WaveReading::default`] rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if any characteristic read fails or a payload
    /// cannot be decoded. A command-exchange timeout is not an error; the
    /// command fields fall back to zero.
    pub async fn read(&self) -> Result<WaveReading> {
        if self.peripheral.services().is_empty() {
            info!(
                "Device {} reports no services, returning empty reading",
                self.address
            );
            return Ok(WaveReading::default());
        }

        let sensor = self.read_sensor_data().await?;
        let serial_no = self.read_serial_number().await?;
        let command = self.read_command_data().await?;

        Ok(assemble_reading(&sensor, serial_no, &command))
    }

    /// Read and decode the current sensor values.
    pub async fn read_sensor_data(&self) -> Result<SensorData> {
        debug!("Reading measurements");

        let data = self.read_characteristic(&MEASUREMENT_UUID).await?;
        SensorData::parse(&data)
    }

    /// Read the device model number and serial number, concatenated.
    pub async fn read_serial_number(&self) -> Result<String> {
        debug!("Reading model and serial number");

        let model = self.read_string(&MODEL_NUMBER_UUID).await?;
        let serial = self.read_string(&SERIAL_NUMBER_UUID).await?;
        Ok(format!("{}{}", model, serial))
    }

    /// Run one command exchange against the command characteristic.
    ///
    /// Subscribes, writes the trigger byte, and waits up to
    /// [`COMMAND_TIMEOUT`](Self::COMMAND_TIMEOUT) for the answering
    /// notification. The subscription is released in every outcome. On
    /// timeout the all-zero [`CommandData::default`] is returned.
    pub async fn read_command_data(&self) -> Result<CommandData> {
        debug!("Reading command data");

        let characteristic = self.characteristic(&COMMAND_UUID)?;

        // The stream must exist before the trigger write so the response
        // cannot be missed.
        let mut notifications = self
            .peripheral
            .notifications()
            .await
            .map_err(Error::Bluetooth)?;

        self.peripheral
            .subscribe(&characteristic)
            .await
            .map_err(Error::Bluetooth)?;

        let outcome = self.trigger_and_wait(&characteristic, &mut notifications).await;

        // Unsubscribe no matter how the wait ended.
        if let Err(e) = self.peripheral.unsubscribe(&characteristic).await {
            warn!("Failed to unsubscribe from command characteristic: {}", e);
        }

        let payload = match outcome? {
            Some(payload) => payload,
            None => {
                info!("Timeout on command data for {}", self.address);
                return Ok(CommandData::default());
            }
        };

        let response = CommandResponse::parse(&payload)?;
        Ok(CommandData::from(&response))
    }

    /// Close the connection.
    pub async fn disconnect(self) -> Result<()> {
        info!("Disconnecting from {}", self.address);
        self.peripheral.disconnect().await.map_err(Error::Bluetooth)
    }

    /// Write the trigger byte and wait for the answering notification.
    async fn trigger_and_wait<S>(
        &self,
        characteristic: &Characteristic,
        notifications: &mut S,
    ) -> Result<Option<Vec<u8>>>
    where
        S: Stream<Item = ValueNotification> + Unpin,
    {
        self.peripheral
            .write(characteristic, &[COMMAND_TRIGGER], WriteType::WithResponse)
            .await
            .map_err(Error::Bluetooth)?;

        Ok(wait_for_notification(notifications, COMMAND_UUID, Self::COMMAND_TIMEOUT).await)
    }

    /// Read a characteristic value.
    async fn read_characteristic(&self, uuid: &Uuid) -> Result<Vec<u8>> {
        let characteristic = self.characteristic(uuid)?;

        let data = self
            .peripheral
            .read(&characteristic)
            .await
            .map_err(Error::Bluetooth)?;

        trace!("Read {} bytes from characteristic {}", data.len(), uuid);

        Ok(data)
    }

    /// Read a string value from a characteristic.
    async fn read_string(&self, uuid: &Uuid) -> Result<String> {
        let data = self.read_characteristic(uuid).await?;
        String::from_utf8(data).map_err(|_| Error::Decode {
            context: format!("Invalid UTF-8 in characteristic {}", uuid),
        })
    }

    /// Find a characteristic by UUID on the connected device.
    fn characteristic(&self, uuid: &Uuid) -> Result<Characteristic> {
        self.peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == *uuid)
            .ok_or_else(|| Error::CharacteristicNotFound {
                uuid: uuid.to_string(),
            })
    }
}

/// Wait for the next notification on `uuid`, up to `timeout`.
///
/// Notifications for other characteristics are skipped. Returns `None` when
/// the timeout elapses or the stream ends first.
async fn wait_for_notification<S>(
    notifications: &mut S,
    uuid: Uuid,
    timeout: Duration,
) -> Option<Vec<u8>>
where
    S: Stream<Item = ValueNotification> + Unpin,
{
    tokio::time::timeout(timeout, async {
        while let Some(notification) = notifications.next().await {
            trace!(
                "Notification from {}: {} bytes",
                notification.uuid,
                notification.value.len()
            );
            if notification.uuid == uuid {
                return Some(notification.value);
            }
        }
        None
    })
    .await
    .unwrap_or(None)
}

/// Build a reading out of the decoded session parts, stamping it with the
/// assembly time.
fn assemble_reading(sensor: &SensorData, serial_no: String, command: &CommandData) -> WaveReading {
    let humidity_rel = sensor.humidity();
    let temperature = sensor.temperature();
    let pressure = sensor.pressure();

    WaveReading {
        radon_day_average: sensor.radon_day_average(),
        radon_total_average: sensor.radon_total_average(),
        temperature,
        pressure,
        co2: sensor.co2(),
        voc: sensor.voc(),
        timestamp: Some(Utc::now()),
        serial_no,
        illuminance: command.illuminance,
        battery_voltage: command.battery_voltage,
        battery_percentage: command.battery_percentage,
        humidity_rel,
        humidity_abs: absolute_humidity(humidity_rel, temperature, pressure),
    }
}
