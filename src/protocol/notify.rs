//! CAN-data notification encoding.
//!
//! Layout (4-12 bytes):
//! ```text
//! Byte 0-3: PID, little-endian
//! Byte 4..: CAN frame data, up to 8 bytes
//! ```
//!
//! The data cap mirrors the classic CAN frame size; the app-side format
//! has no provision for longer frames, so anything past 8 bytes is
//! silently truncated rather than rejected.

use heapless::Vec;

/// Maximum CAN data bytes carried per notification.
pub const MAX_CAN_DATA_LEN: usize = 8;

/// Maximum notification payload size (4-byte PID + data).
pub const MAX_NOTIFY_LEN: usize = 4 + MAX_CAN_DATA_LEN;

/// Pack a (pid, data) pair into a notification payload.
///
/// Truncation of oversized `data` is the only lossy case; this function
/// cannot otherwise fail.
pub fn encode_can_data(pid: u32, data: &[u8]) -> Vec<u8, MAX_NOTIFY_LEN> {
    let len = data.len().min(MAX_CAN_DATA_LEN);

    let mut payload = Vec::new();
    // Capacity is exactly MAX_NOTIFY_LEN, so these cannot overflow.
    let _ = payload.extend_from_slice(&pid.to_le_bytes());
    let _ = payload.extend_from_slice(&data[..len]);
    payload
}
