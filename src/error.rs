//! Unified error type for can2ble.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

use crate::pid::registry::RegistryFull;

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // BLE
    /// A notification was requested while no peer is connected.
    /// Non-fatal: the caller may retry or drop the frame.
    NotConnected,

    /// The SoftDevice rejected a notification (e.g. TX queue full).
    NotifyFailed,

    // Registry
    /// The PID registry is at capacity; the subscription was not added.
    /// Capacity is a hard ceiling - there is no eviction policy.
    RegistryFull,
}

// Convenience conversions

impl From<RegistryFull> for Error {
    fn from(_: RegistryFull) -> Self {
        Error::RegistryFull
    }
}
