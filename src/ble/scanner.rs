//! BLE scanning functionality.
//!
//! Provides the scanner for discovering Airthings devices.

use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral, PeripheralId};
use futures::stream::StreamExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::ble::session::WaveSession;
use crate::ble::uuids::is_airthings_advertisement;
use crate::data::WaveReading;
use crate::error::{Error, Result};

/// An advertising Airthings device seen during discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceIdentity {
    /// Opaque peripheral identifier; the deduplication key.
    pub address: String,
    /// Advertised device name, if any.
    pub name: Option<String>,
    /// Signal strength in dBm.
    pub rssi: Option<i16>,
    /// Raw advertised manufacturer data, keyed by vendor identifier.
    pub manufacturer_data: HashMap<u16, Vec<u8>>,
}

impl DeviceIdentity {
    /// Whether the manufacturer data identifies an Airthings device.
    pub fn is_airthings(&self) -> bool {
        is_airthings_advertisement(&self.manufacturer_data)
    }

    /// The advertised name, or a placeholder when none was seen.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }
}

/// BLE scanner for discovering Airthings devices.
///
/// Devices admitted by one call to [`discover`](Self::discover) stay in the
/// scanner's accumulated set; repeated calls only grow it.
pub struct WaveScanner {
    /// The BLE adapter to use for scanning.
    adapter: Adapter,
    /// Devices admitted so far, in discovery order.
    found: RwLock<Vec<DeviceIdentity>>,
    /// Transport handles for admitted devices, keyed by address.
    peripherals: RwLock<HashMap<String, Peripheral>>,
}

impl WaveScanner {
    /// Default number of scan passes per `discover` call.
    pub const DEFAULT_SCANS: usize = 2;

    /// Default duration of one scan pass.
    pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(5);

    /// Create a new scanner using the first available Bluetooth adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if Bluetooth is not available.
    pub async fn new() -> Result<Self> {
        let manager = Manager::new()
            .await
            .map_err(|_e| Error::BluetoothUnavailable)?;

        let adapters = manager.adapters().await.map_err(Error::Bluetooth)?;

        let adapter = adapters
            .into_iter()
            .next()
            .ok_or(Error::BluetoothUnavailable)?;

        info!(
            "Using Bluetooth adapter: {:?}",
            adapter.adapter_info().await.ok()
        );

        Ok(Self::with_adapter(adapter))
    }

    /// Create a new scanner with a specific adapter.
    pub fn with_adapter(adapter: Adapter) -> Self {
        Self {
            adapter,
            found: RwLock::new(Vec::new()),
            peripherals: RwLock::new(HashMap::new()),
        }
    }

    /// Scan for Airthings devices.
    ///
    /// Runs `scans` sequential passes, each listening for `timeout`. Every
    /// advertising device carrying the Airthings vendor identifier is
    /// admitted once, keyed by address; devices already in the accumulated
    /// set are skipped.
    ///
    /// Returns the devices newly admitted by this call. The full
    /// accumulated set is available from [`found_devices`](Self::found_devices).
    ///
    /// # Errors
    ///
    /// Returns an error if the scan cannot be started or stopped.
    pub async fn discover(&self, scans: usize, timeout: Duration) -> Result<Vec<DeviceIdentity>> {
        info!(
            "Scanning for Airthings devices ({} passes of {:?})",
            scans, timeout
        );

        let mut new_devices = Vec::new();
        for pass in 0..scans {
            debug!("Scan pass {} of {}", pass + 1, scans);
            self.scan_pass(timeout, &mut new_devices).await?;
        }

        info!("Total {} device(s) found", self.device_count());
        Ok(new_devices)
    }

    /// Run one bounded scan pass, admitting devices into `new_devices`.
    async fn scan_pass(
        &self,
        window: Duration,
        new_devices: &mut Vec<DeviceIdentity>,
    ) -> Result<()> {
        let mut events = self.adapter.events().await.map_err(Error::Bluetooth)?;

        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(Error::Bluetooth)?;

        // The window elapsing is the normal way a pass ends.
        let _ = tokio::time::timeout(window, async {
            while let Some(event) = events.next().await {
                self.handle_event(event, new_devices).await;
            }
        })
        .await;

        self.adapter.stop_scan().await.map_err(Error::Bluetooth)?;

        Ok(())
    }

    /// All devices admitted so far, in discovery order.
    pub fn found_devices(&self) -> Vec<DeviceIdentity> {
        self.found.read().clone()
    }

    /// Running count of devices admitted so far.
    pub fn device_count(&self) -> usize {
        self.found.read().len()
    }

    /// Connect to a previously discovered device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeviceNotFound`] if the device was never admitted by
    /// this scanner, or a Bluetooth error if the connection fails.
    pub async fn connect(&self, device: &DeviceIdentity) -> Result<WaveSession> {
        let peripheral = self
            .peripherals
            .read()
            .get(&device.address)
            .cloned()
            .ok_or_else(|| Error::DeviceNotFound {
                address: device.address.clone(),
            })?;

        WaveSession::connect(peripheral, device.address.clone()).await
    }

    /// Connect to a device, take one full reading, and disconnect.
    ///
    /// The connection is closed even when the read fails.
    pub async fn read_device(&self, device: &DeviceIdentity) -> Result<WaveReading> {
        let session = self.connect(device).await?;
        let result = session.read().await;

        if let Err(e) = session.disconnect().await {
            warn!("Failed to disconnect from {}: {}", device.address, e);
        }

        result
    }

    /// Handle a BLE central event.
    async fn handle_event(&self, event: CentralEvent, new_devices: &mut Vec<DeviceIdentity>) {
        match event {
            CentralEvent::DeviceDiscovered(id) => {
                trace!("Device discovered: {:?}", id);
                self.process_peripheral(id, new_devices).await;
            }
            CentralEvent::DeviceUpdated(id) => {
                trace!("Device updated: {:?}", id);
                self.process_peripheral(id, new_devices).await;
            }
            CentralEvent::ManufacturerDataAdvertisement {
                id,
                manufacturer_data,
            } => {
                if is_airthings_advertisement(&manufacturer_data) {
                    trace!("Airthings device advertisement: {:?}", id);
                    self.process_peripheral(id, new_devices).await;
                }
            }
            CentralEvent::DeviceConnected(id) => {
                debug!("Device connected: {:?}", id);
            }
            CentralEvent::DeviceDisconnected(id) => {
                debug!("Device disconnected: {:?}", id);
            }
            CentralEvent::ServiceDataAdvertisement { .. } => {}
            CentralEvent::ServicesAdvertisement { .. } => {}
            CentralEvent::StateUpdate(_) => {}
        }
    }

    /// Process a discovered peripheral.
    async fn process_peripheral(&self, id: PeripheralId, new_devices: &mut Vec<DeviceIdentity>) {
        let peripheral = match self.adapter.peripheral(&id).await {
            Ok(p) => p,
            Err(e) => {
                trace!("Failed to get peripheral: {}", e);
                return;
            }
        };

        let properties = match peripheral.properties().await {
            Ok(Some(p)) => p,
            _ => return,
        };

        let identity = DeviceIdentity {
            address: id.to_string(),
            name: properties.local_name,
            rssi: properties.rssi,
            manufacturer_data: properties.manufacturer_data,
        };

        let admitted = Self::admit(&mut self.found.write(), &identity);
        if admitted {
            self.peripherals
                .write()
                .insert(identity.address.clone(), peripheral);
            new_devices.push(identity);
        }
    }

    /// Admit an identity into the accumulated set.
    ///
    /// Identities without the Airthings vendor identifier are rejected;
    /// re-advertisements of a known address are ignored (first occurrence
    /// wins). Returns whether the identity was newly admitted.
    fn admit(found: &mut Vec<DeviceIdentity>, identity: &DeviceIdentity) -> bool {
        if !identity.is_airthings() {
            return false;
        }

        if found.iter().any(|d| d.address == identity.address) {
            trace!("Already discovered: {}", identity.address);
            return false;
        }

        info!(
            "Discovered {} device: {} RSSI: {:?}",
            identity.display_name(),
            identity.address,
            identity.rssi
        );
        found.push(identity.clone());
        true
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ble::uuids::AIRTHINGS_MANUFACTURER_ID;

    fn airthings_identity(address: &str) -> DeviceIdentity {
        let mut manufacturer_data = HashMap::new();
        manufacturer_data.insert(AIRTHINGS_MANUFACTURER_ID, vec![0x01, 0x02]);
        DeviceIdentity {
            address: address.to_string(),
            name: Some("Airthings Wave+".to_string()),
            rssi: Some(-60),
            manufacturer_data,
        }
    }

    #[test]
    fn test_admit_rejects_foreign_vendor() {
        let mut found = Vec::new();
        let mut identity = airthings_identity("aa:bb:cc:dd:ee:ff");
        identity.manufacturer_data.clear();
        identity.manufacturer_data.insert(0x004C, vec![0x02, 0x15]);

        assert!(!WaveScanner::admit(&mut found, &identity));
        assert!(found.is_empty());
    }

    #[test]
    fn test_admit_deduplicates_by_address() {
        let mut found = Vec::new();
        let identity = airthings_identity("aa:bb:cc:dd:ee:ff");

        assert!(WaveScanner::admit(&mut found, &identity));
        assert!(!WaveScanner::admit(&mut found, &identity));

        // First occurrence wins, later advertisements never replace it.
        let mut renamed = airthings_identity("aa:bb:cc:dd:ee:ff");
        renamed.name = Some("Renamed".to_string());
        assert!(!WaveScanner::admit(&mut found, &renamed));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name.as_deref(), Some("Airthings Wave+"));
    }

    #[test]
    fn test_admit_accumulates_distinct_addresses() {
        let mut found = Vec::new();

        assert!(WaveScanner::admit(&mut found, &airthings_identity("aa:aa")));
        assert!(WaveScanner::admit(&mut found, &airthings_identity("bb:bb")));

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].address, "aa:aa");
        assert_eq!(found[1].address, "bb:bb");
    }

    #[test]
    fn test_display_name_placeholder() {
        let mut identity = airthings_identity("aa:aa");
        assert_eq!(identity.display_name(), "Airthings Wave+");

        identity.name = None;
        assert_eq!(identity.display_name(), "(unnamed)");
    }
}
