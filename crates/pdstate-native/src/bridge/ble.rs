//! BLE monitor for the PD-State wearable
//!
//! Subscribes to the device's motion state service and folds the per-value
//! notifications back into [`StatusUpdate`] snapshots.
//!
//! # Service UUIDs
//!
//! The wearable advertises as `PD-State` and exposes one custom service
//! (16-bit UUIDs on the Bluetooth base):
//! - `0000a000-...` - Motion State Service
//!
//! # Characteristics
//!
//! - `0000a010-...` - Encoded motion state, u8 0-3 (read/notify)
//! - `0000a011-...` - Tremor flag, u8 0/1 (read/notify)
//! - `0000a012-...` - Dyskinesia flag, u8 0/1 (read/notify)
//! - `0000a013-...` - FOG flag, u8 0/1 (read/notify)

use std::sync::Arc;
use std::time::Duration;

use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tokio::sync::{mpsc, RwLock};
use tokio_stream::StreamExt;
use uuid::Uuid;

use pdstate_core::types::{MotionState, StatusUpdate};

/// Motion state service UUID
pub const STATE_SERVICE_UUID: Uuid = Uuid::from_u128(0x0000a000_0000_1000_8000_00805f9b34fb);

/// Encoded motion state characteristic (u8, 0-3)
pub const STATE_CHAR_UUID: Uuid = Uuid::from_u128(0x0000a010_0000_1000_8000_00805f9b34fb);

/// Tremor flag characteristic (u8, 0/1)
pub const TREMOR_CHAR_UUID: Uuid = Uuid::from_u128(0x0000a011_0000_1000_8000_00805f9b34fb);

/// Dyskinesia flag characteristic (u8, 0/1)
pub const DYSKINESIA_CHAR_UUID: Uuid = Uuid::from_u128(0x0000a012_0000_1000_8000_00805f9b34fb);

/// FOG flag characteristic (u8, 0/1)
pub const FOG_CHAR_UUID: Uuid = Uuid::from_u128(0x0000a013_0000_1000_8000_00805f9b34fb);

/// Advertised device name
pub const DEVICE_NAME: &str = "PD-State";

/// A device seen during scanning.
#[derive(Clone, Debug)]
pub struct DiscoveredDevice {
    /// BLE address
    pub address: String,
    /// Advertised local name
    pub name: Option<String>,
    /// Signal strength at discovery
    pub rssi: i16,
    /// Whether the motion state service was advertised
    pub has_state_service: bool,
}

impl DiscoveredDevice {
    /// Whether this looks like a PD-State wearable.
    #[must_use]
    pub fn is_wearable(&self) -> bool {
        self.has_state_service || self.name.as_deref() == Some(DEVICE_NAME)
    }
}

/// Events emitted by the monitor.
#[derive(Clone, Debug)]
pub enum MonitorEvent {
    /// A device was seen during scanning
    DeviceDiscovered(DiscoveredDevice),
    /// Connected and subscribed to the state service
    Connected {
        /// Address of the connected device
        address: String,
    },
    /// A notification updated the status snapshot
    StatusChanged(StatusUpdate),
    /// The notification stream ended
    Disconnected {
        /// Human-readable reason, when known
        reason: Option<String>,
    },
}

/// Host-side monitor for a running wearable.
///
/// Holds the latest merged status snapshot; every notification also emits a
/// [`MonitorEvent`] on the channel returned by [`StateMonitor::new`].
pub struct StateMonitor {
    adapter: Adapter,
    latest: Arc<RwLock<StatusUpdate>>,
    event_tx: mpsc::Sender<MonitorEvent>,
    scan_duration: Duration,
}

impl StateMonitor {
    /// Create a monitor on the first Bluetooth adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if Bluetooth is not available.
    pub async fn new() -> Result<(Self, mpsc::Receiver<MonitorEvent>), anyhow::Error> {
        let manager = Manager::new().await?;
        let adapters = manager.adapters().await?;

        let adapter = adapters
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No Bluetooth adapter found"))?;

        let (event_tx, event_rx) = mpsc::channel(256);

        Ok((
            Self {
                adapter,
                latest: Arc::new(RwLock::new(StatusUpdate::default())),
                event_tx,
                scan_duration: Duration::from_secs(5),
            },
            event_rx,
        ))
    }

    /// Set scan duration
    pub fn set_scan_duration(&mut self, duration: Duration) {
        self.scan_duration = duration;
    }

    /// Scan for wearables.
    ///
    /// Returns every discovered device that advertises the state service or
    /// the `PD-State` name.
    ///
    /// # Errors
    ///
    /// Returns an error when the adapter cannot scan.
    pub async fn scan(&self) -> Result<Vec<DiscoveredDevice>, anyhow::Error> {
        tracing::info!("Starting BLE scan for PD-State wearables...");

        let filter = ScanFilter {
            services: vec![STATE_SERVICE_UUID],
        };
        self.adapter.start_scan(filter).await?;
        tokio::time::sleep(self.scan_duration).await;
        self.adapter.stop_scan().await?;

        let peripherals = self.adapter.peripherals().await?;
        let mut devices = Vec::new();

        for peripheral in peripherals {
            if let Some(properties) = peripheral.properties().await? {
                let has_service = properties
                    .services
                    .iter()
                    .any(|uuid| *uuid == STATE_SERVICE_UUID);

                let device = DiscoveredDevice {
                    address: peripheral.address().to_string(),
                    name: properties.local_name.clone(),
                    rssi: properties.rssi.unwrap_or(0),
                    has_state_service: has_service,
                };

                let _ = self
                    .event_tx
                    .send(MonitorEvent::DeviceDiscovered(device.clone()))
                    .await;

                if device.is_wearable() {
                    devices.push(device);
                }
            }
        }

        tracing::info!("Scan complete: found {} wearables", devices.len());
        Ok(devices)
    }

    /// Connect to a wearable and subscribe to its state characteristics.
    ///
    /// # Errors
    ///
    /// Returns an error when the device cannot be found, connected, or
    /// subscribed.
    pub async fn connect(&self, device: &DiscoveredDevice) -> Result<(), anyhow::Error> {
        tracing::info!("Connecting to wearable: {}", device.address);

        let peripherals = self.adapter.peripherals().await?;
        let peripheral = peripherals
            .into_iter()
            .find(|p| p.address().to_string() == device.address)
            .ok_or_else(|| anyhow::anyhow!("Device not found: {}", device.address))?;

        peripheral.connect().await?;
        peripheral.discover_services().await?;

        let mut subscribed = 0;
        for service in peripheral.services() {
            for characteristic in &service.characteristics {
                match characteristic.uuid {
                    uuid if uuid == STATE_CHAR_UUID
                        || uuid == TREMOR_CHAR_UUID
                        || uuid == DYSKINESIA_CHAR_UUID
                        || uuid == FOG_CHAR_UUID =>
                    {
                        peripheral.subscribe(characteristic).await?;
                        subscribed += 1;
                    }
                    _ => {}
                }
            }
        }
        if subscribed == 0 {
            return Err(anyhow::anyhow!(
                "Device {} exposes no state characteristics",
                device.address
            ));
        }
        tracing::info!("Subscribed to {subscribed} state characteristics");

        self.spawn_notification_handler(peripheral);

        let _ = self
            .event_tx
            .send(MonitorEvent::Connected {
                address: device.address.clone(),
            })
            .await;
        Ok(())
    }

    /// Latest merged status snapshot.
    pub async fn latest(&self) -> StatusUpdate {
        *self.latest.read().await
    }

    fn spawn_notification_handler(&self, peripheral: Peripheral) {
        let event_tx = self.event_tx.clone();
        let latest = Arc::clone(&self.latest);

        tokio::spawn(async move {
            let mut stream = match peripheral.notifications().await {
                Ok(s) => s,
                Err(e) => {
                    let _ = event_tx
                        .send(MonitorEvent::Disconnected {
                            reason: Some(format!("Failed to get notification stream: {e}")),
                        })
                        .await;
                    return;
                }
            };

            while let Some(notification) = stream.next().await {
                let snapshot = {
                    let mut current = latest.write().await;
                    if !apply_notification(&mut current, notification.uuid, &notification.value)
                    {
                        continue;
                    }
                    *current
                };
                let _ = event_tx.send(MonitorEvent::StatusChanged(snapshot)).await;
            }

            let _ = event_tx
                .send(MonitorEvent::Disconnected {
                    reason: Some("Notification stream ended".to_string()),
                })
                .await;
        });
    }
}

/// Fold one characteristic notification into the status snapshot.
///
/// Returns false for unknown characteristics, empty payloads, and state
/// codes outside 0-3, leaving the snapshot untouched.
fn apply_notification(update: &mut StatusUpdate, uuid: Uuid, value: &[u8]) -> bool {
    let Some(&byte) = value.first() else {
        return false;
    };
    match uuid {
        u if u == STATE_CHAR_UUID => match MotionState::from_code(byte) {
            Some(state) => {
                update.state = state;
                true
            }
            None => false,
        },
        u if u == TREMOR_CHAR_UUID => {
            update.tremor = byte != 0;
            true
        }
        u if u == DYSKINESIA_CHAR_UUID => {
            update.dyskinesia = byte != 0;
            true
        }
        u if u == FOG_CHAR_UUID => {
            update.fog = byte != 0;
            true
        }
        _ => false,
    }
}
