//! Transport seam between the control loop and the BLE stack.
//!
//! The control loop only needs two things from the radio: "is anyone
//! listening" and "push this payload". [`BleTransport`] captures that,
//! so the loop stays independent of the SoftDevice (other boards slot
//! in their own impl at build time).

use embassy_time::{Duration, Instant, Timer};
use heapless::Vec;
use nrf_softdevice::ble::Connection;

use crate::ble::gatt::Server;
use crate::config::CONNECTION_POLL_MS;
use crate::error::Error;
use crate::protocol::MAX_NOTIFY_LEN;

/// Minimal outbound interface the control loop depends on.
pub trait BleTransport {
    /// Whether a peer is currently connected.
    fn is_connected(&self) -> bool;

    /// Send one CAN-data notification payload.
    ///
    /// Not-connected and a full SoftDevice TX queue are both non-fatal;
    /// the caller decides whether to retry or drop the frame.
    fn send_notification(&self, payload: &[u8]) -> Result<(), Error>;
}

/// [`BleTransport`] over one live GATT connection.
pub struct GattTransport<'a> {
    server: &'a Server,
    conn: &'a Connection,
}

impl<'a> GattTransport<'a> {
    pub fn new(server: &'a Server, conn: &'a Connection) -> Self {
        Self { server, conn }
    }
}

impl BleTransport for GattTransport<'_> {
    fn is_connected(&self) -> bool {
        self.conn.handle().is_some()
    }

    fn send_notification(&self, payload: &[u8]) -> Result<(), Error> {
        if !self.is_connected() {
            return Err(Error::NotConnected);
        }

        let mut value: Vec<u8, MAX_NOTIFY_LEN> = Vec::new();
        value
            .extend_from_slice(payload)
            .map_err(|_| Error::NotifyFailed)?;

        self.server
            .canbus
            .can_data_notify(self.conn, &value)
            .map_err(|_| Error::NotifyFailed)
    }
}

/// Busy-poll until a peer connects, with `CONNECTION_POLL_MS`
/// granularity, bounded by `timeout_ms`.
///
/// Must not run on the context that services transport events, or the
/// connection it is waiting for can never be delivered.
pub async fn wait_for_connection<T: BleTransport>(transport: &T, timeout_ms: u32) -> bool {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms as u64);
    while !transport.is_connected() {
        if Instant::now() >= deadline {
            return false;
        }
        Timer::after(Duration::from_millis(CONNECTION_POLL_MS)).await;
    }
    true
}
