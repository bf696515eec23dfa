//! BLE Peripheral for Motion Status Reporting
//!
//! Portable GATT-facing state for the wrist unit. The vendor BLE stack
//! owns advertising and the connection; this module owns the
//! characteristic values, connection bookkeeping, and the advertising
//! payload, all behind lock-free atomics so the sampling loop and stack
//! callbacks never contend.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  BLE Peripheral                  │
//! ├──────────────────────────────────────────────────┤
//! │  Generic Access Service (0x1800)                 │
//! │  └── Device Name (0x2A00)      "PD-State"        │
//! ├──────────────────────────────────────────────────┤
//! │  Motion State Service (0xA000)                   │
//! │  ├── Motion State (0xA010)     [Read, Notify]    │
//! │  ├── Tremor Flag (0xA011)      [Read, Notify]    │
//! │  ├── Dyskinesia Flag (0xA012)  [Read, Notify]    │
//! │  └── FOG Flag (0xA013)         [Read, Notify]    │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! # Data Rates
//!
//! One status update per completed analysis window, four single-byte
//! notifications each. At a 3 second window that is under 2 bytes/sec;
//! latency matters here, throughput does not.

use core::convert::Infallible;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

use heapless::{String, Vec};

use pdstate_core::transport::StatusTransport;
use pdstate_core::types::{MotionState, StatusUpdate};

// ============================================================================
// Service and Characteristic UUIDs
// ============================================================================

/// Motion state service UUID (16-bit, on the Bluetooth base UUID)
pub const STATE_SERVICE_UUID: u16 = 0xA000;

/// Motion state characteristic - priority-encoded state code (0-3)
pub const STATE_CHAR_UUID: u16 = 0xA010;

/// Tremor flag characteristic - 0x00 or 0x01
pub const TREMOR_CHAR_UUID: u16 = 0xA011;

/// Dyskinesia flag characteristic - 0x00 or 0x01
pub const DYSKINESIA_CHAR_UUID: u16 = 0xA012;

/// FOG flag characteristic - 0x00 or 0x01
pub const FOG_CHAR_UUID: u16 = 0xA013;

/// Advertised device name
pub const DEVICE_NAME: &str = "PD-State";

/// Legacy advertising PDU payload limit
pub const ADV_PAYLOAD_MAX: usize = 31;

/// Expand a 16-bit assigned number onto the Bluetooth base UUID
#[must_use]
pub const fn uuid128(short: u16) -> u128 {
    0x0000_0000_0000_1000_8000_0080_5f9b_34fb | ((short as u128) << 96)
}

/// Advertising data structure types
mod ad {
    /// Flags
    pub const FLAGS: u8 = 0x01;
    /// Complete list of 16-bit service UUIDs
    pub const COMPLETE_UUID16: u8 = 0x03;
    /// Shortened local name
    pub const NAME_SHORT: u8 = 0x08;
    /// Complete local name
    pub const NAME_COMPLETE: u8 = 0x09;
    /// LE General Discoverable Mode, BR/EDR not supported
    pub const FLAGS_LE_GENERAL: u8 = 0x06;
}

// ============================================================================
// Configuration
// ============================================================================

/// Advertising configuration for the peripheral
#[derive(Clone, Debug)]
pub struct PeripheralConfig {
    /// Advertised device name (max 20 chars)
    pub name: String<20>,
    /// Advertising interval in 0.625 ms units
    pub adv_interval: u16,
}

impl Default for PeripheralConfig {
    fn default() -> Self {
        Self {
            name: String::try_from(DEVICE_NAME).unwrap_or_default(),
            adv_interval: 160, // 100 ms
        }
    }
}

// ============================================================================
// Peripheral State
// ============================================================================

/// Shared state for the BLE peripheral (lock-free atomics for ISR safety).
///
/// Implements [`StatusTransport`], so the motion pipeline publishes
/// straight into the characteristic values. The stack glue reads them
/// back out through [`BlePeripheral::characteristic_value`] and reports
/// connection edges through [`BlePeripheral::set_connected`].
pub struct BlePeripheral {
    /// Current characteristic values
    state: AtomicU8,
    tremor: AtomicU8,
    dyskinesia: AtomicU8,
    fog: AtomicU8,
    /// Central currently connected
    connected: AtomicBool,
    /// Connection state at the last `service` call
    was_connected: AtomicBool,
    /// Advertising restart requested after a disconnect
    advertise_pending: AtomicBool,
    /// Updates published
    updates_published: AtomicU32,
    /// Updates published with no central to notify
    notifications_dropped: AtomicU32,
}

impl BlePeripheral {
    /// Create new peripheral state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(0),
            tremor: AtomicU8::new(0),
            dyskinesia: AtomicU8::new(0),
            fog: AtomicU8::new(0),
            connected: AtomicBool::new(false),
            was_connected: AtomicBool::new(false),
            advertise_pending: AtomicBool::new(true),
            updates_published: AtomicU32::new(0),
            notifications_dropped: AtomicU32::new(0),
        }
    }

    /// Record a connection edge from the stack's connect/disconnect callbacks
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }

    /// Check if a central is connected
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Current value of a characteristic, for GATT read callbacks
    #[must_use]
    pub fn characteristic_value(&self, characteristic: u16) -> Option<u8> {
        match characteristic {
            STATE_CHAR_UUID => Some(self.state.load(Ordering::Relaxed)),
            TREMOR_CHAR_UUID => Some(self.tremor.load(Ordering::Relaxed)),
            DYSKINESIA_CHAR_UUID => Some(self.dyskinesia.load(Ordering::Relaxed)),
            FOG_CHAR_UUID => Some(self.fog.load(Ordering::Relaxed)),
            _ => None,
        }
    }

    /// Snapshot of the most recently published update
    #[must_use]
    pub fn latest(&self) -> StatusUpdate {
        StatusUpdate {
            state: MotionState::from_code(self.state.load(Ordering::Relaxed))
                .unwrap_or_default(),
            tremor: self.tremor.load(Ordering::Relaxed) != 0,
            dyskinesia: self.dyskinesia.load(Ordering::Relaxed) != 0,
            fog: self.fog.load(Ordering::Relaxed) != 0,
        }
    }

    /// Consume a pending advertising restart request.
    ///
    /// Returns true exactly once per disconnect (and once at startup);
    /// the stack glue polls this each loop and starts the advertiser.
    pub fn take_advertise_request(&self) -> bool {
        self.advertise_pending.swap(false, Ordering::Relaxed)
    }

    /// How many updates have been published
    #[must_use]
    pub fn updates_published(&self) -> u32 {
        self.updates_published.load(Ordering::Relaxed)
    }

    /// How many updates found no connected central to notify
    #[must_use]
    pub fn notifications_dropped(&self) -> u32 {
        self.notifications_dropped.load(Ordering::Relaxed)
    }
}

impl Default for BlePeripheral {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTransport for BlePeripheral {
    type Error = Infallible;

    fn publish(&mut self, update: &StatusUpdate) -> Result<(), Self::Error> {
        self.state.store(update.state.code(), Ordering::Relaxed);
        self.tremor.store(u8::from(update.tremor), Ordering::Relaxed);
        self.dyskinesia.store(u8::from(update.dyskinesia), Ordering::Relaxed);
        self.fog.store(u8::from(update.fog), Ordering::Relaxed);
        self.updates_published.fetch_add(1, Ordering::Relaxed);

        // The values are retained either way; a read after reconnect sees
        // the latest window.
        if !self.is_connected() {
            self.notifications_dropped.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn service(&mut self) {
        let connected = self.connected.load(Ordering::Relaxed);
        let was = self.was_connected.swap(connected, Ordering::Relaxed);
        if was && !connected {
            // Central dropped; ask the stack glue to advertise again
            self.advertise_pending.store(true, Ordering::Relaxed);
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Build the legacy advertising payload: flags, the motion state service,
/// and the device name (shortened when it cannot fit).
#[must_use]
pub fn advertising_payload(name: &str) -> Vec<u8, ADV_PAYLOAD_MAX> {
    let mut payload = Vec::new();
    let _ = payload.extend_from_slice(&[0x02, ad::FLAGS, ad::FLAGS_LE_GENERAL]);

    // Advertise the service so scanners can filter without connecting
    let uuid = STATE_SERVICE_UUID.to_le_bytes();
    let _ = payload.extend_from_slice(&[0x03, ad::COMPLETE_UUID16, uuid[0], uuid[1]]);

    let room = ADV_PAYLOAD_MAX - payload.len() - 2;
    let name_bytes = name.as_bytes();
    let (ad_type, take) = if name_bytes.len() <= room {
        (ad::NAME_COMPLETE, name_bytes.len())
    } else {
        (ad::NAME_SHORT, room)
    };
    let _ = payload.push((take + 1) as u8);
    let _ = payload.push(ad_type);
    let _ = payload.extend_from_slice(&name_bytes[..take]);
    payload
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pdstate_core::types::SymptomFlags;

    #[test]
    fn test_uuid128_expansion() {
        assert_eq!(uuid128(STATE_SERVICE_UUID), 0x0000_A000_0000_1000_8000_0080_5f9b_34fb);
        assert_eq!(uuid128(FOG_CHAR_UUID), 0x0000_A013_0000_1000_8000_0080_5f9b_34fb);
    }

    #[test]
    fn test_advertising_payload_layout() {
        let config = PeripheralConfig::default();
        assert_eq!(config.name.as_str(), DEVICE_NAME);

        let payload = advertising_payload(&config.name);
        assert_eq!(
            payload.as_slice(),
            &[
                0x02, 0x01, 0x06, // flags
                0x03, 0x03, 0x00, 0xA0, // 16-bit service list: 0xA000
                0x09, 0x09, b'P', b'D', b'-', b'S', b't', b'a', b't', b'e',
            ]
        );
    }

    #[test]
    fn test_advertising_payload_shortens_long_name() {
        let payload = advertising_payload("a-wearable-with-a-very-long-name");
        assert_eq!(payload.len(), ADV_PAYLOAD_MAX);
        // Name structure starts after flags (3) and service list (4)
        assert_eq!(payload[8], ad::NAME_SHORT);
    }

    #[test]
    fn test_publish_updates_characteristics() {
        let mut ble = BlePeripheral::new();
        let update = StatusUpdate::from_flags(
            SymptomFlags { tremor: true, dyskinesia: false, gait: false },
            false,
        );
        ble.publish(&update).unwrap();

        assert_eq!(ble.characteristic_value(STATE_CHAR_UUID), Some(1));
        assert_eq!(ble.characteristic_value(TREMOR_CHAR_UUID), Some(1));
        assert_eq!(ble.characteristic_value(DYSKINESIA_CHAR_UUID), Some(0));
        assert_eq!(ble.characteristic_value(FOG_CHAR_UUID), Some(0));
        assert_eq!(ble.characteristic_value(0xA0FF), None);
        assert_eq!(ble.latest(), update);
    }

    #[test]
    fn test_disconnect_requests_advertising() {
        let mut ble = BlePeripheral::new();
        // Startup advertises once
        assert!(ble.take_advertise_request());
        assert!(!ble.take_advertise_request());

        ble.set_connected(true);
        ble.service();
        assert!(!ble.take_advertise_request());

        ble.set_connected(false);
        ble.service();
        assert!(ble.take_advertise_request());
        assert!(!ble.take_advertise_request());
    }

    #[test]
    fn test_counts_unnotified_updates() {
        let mut ble = BlePeripheral::new();
        let update = StatusUpdate::default();

        ble.publish(&update).unwrap();
        assert_eq!(ble.updates_published(), 1);
        assert_eq!(ble.notifications_dropped(), 1);

        ble.set_connected(true);
        ble.publish(&update).unwrap();
        assert_eq!(ble.updates_published(), 2);
        assert_eq!(ble.notifications_dropped(), 1);
    }
}
