//! Application-wide constants and compile-time configuration.
//!
//! All BLE identifiers, capacities, and timing parameters live here so
//! they can be tuned in one place.

// BLE GATT layout (fixed by the companion app - do not change)
//
// The gatt_service macro in `ble::gatt` needs these as string literals;
// keep the two places in sync.

/// 16-bit UUID of the main GATT service.
pub const MAIN_SERVICE_UUID: u16 = 0x1FF8;

/// 16-bit UUID of the read+notify characteristic carrying CAN data.
pub const CAN_DATA_CHARACTERISTIC_UUID: u16 = 0x0001;

/// 16-bit UUID of the write-only characteristic receiving filter requests.
pub const FILTER_REQUEST_CHARACTERISTIC_UUID: u16 = 0x0002;

// Advertising

/// Device name advertised to the companion app.
/// The practical limit is 19 visible characters.
pub const BLE_DEVICE_NAME: &str = "can2ble";

/// Fast advertising interval (in 0.625 ms units). 32 = 20 ms.
pub const BLE_ADV_INTERVAL_FAST: u16 = 32;

/// Slow advertising interval (in 0.625 ms units). 244 = 152.5 ms.
pub const BLE_ADV_INTERVAL_SLOW: u16 = 244;

/// Fast-advertising timeout before falling back to slow mode (seconds).
pub const BLE_ADV_FAST_TIMEOUT_SECS: u16 = 30;

// PID registry

/// Maximum number of distinct PIDs the registry can track per session.
/// The backing store is a fixed array; this bound is never grown.
pub const MAX_PID_ENTRIES: usize = 128;

// Filter command queue

/// Depth of the decoded-command queue between the GATT write callback
/// and the main control loop.
pub const FILTER_QUEUE_DEPTH: usize = 8;

// Timing

/// Polling granularity of `wait_for_connection` (ms).
pub const CONNECTION_POLL_MS: u64 = 100;
