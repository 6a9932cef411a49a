//! Wire protocol between the device and the companion app.
//!
//! The app talks to us over two GATT characteristics on service 0x1FF8:
//!
//! | Characteristic | UUID   | Perms        | Direction |
//! |----------------|--------|--------------|-----------|
//! | Filter request | 0x0002 | Write        | app → us  |
//! | CAN data       | 0x0001 | Read, Notify | us → app  |
//!
//! Inbound filter requests are decoded by [`request`]; outbound CAN
//! frames are packed by [`notify`]. Note the endianness asymmetry, which
//! is fixed by the existing app: request fields are big-endian, while
//! the PID in a notification is little-endian.
//!
//! The protocol has no error channel back to the app. Malformed
//! requests are silently dropped ("ignore and wait for a well-formed
//! frame"); [`FilterStats`] keeps local counters so firmware can still
//! surface drops in logs.

pub mod notify;
pub mod request;

pub use notify::{encode_can_data, MAX_CAN_DATA_LEN, MAX_NOTIFY_LEN};
pub use request::FilterCommand;

/// Local diagnostics for the filter-request path.
///
/// The peer protocol is deliberately silent about errors, so these
/// counters are the only visibility into dropped requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FilterStats {
    /// Well-formed commands applied to the registry.
    pub applied: u32,
    /// Frames discarded for bad length or unknown opcode.
    pub malformed: u32,
    /// `AllowOne` commands dropped because the registry was full.
    pub registry_full: u32,
}

impl FilterStats {
    pub const fn new() -> Self {
        Self {
            applied: 0,
            malformed: 0,
            registry_full: 0,
        }
    }

    pub fn record_applied(&mut self) {
        self.applied = self.applied.wrapping_add(1);
    }

    pub fn record_malformed(&mut self) {
        self.malformed = self.malformed.wrapping_add(1);
    }

    pub fn record_registry_full(&mut self) {
        self.registry_full = self.registry_full.wrapping_add(1);
    }
}
