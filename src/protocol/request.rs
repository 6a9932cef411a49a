//! Filter-request decoding.
//!
//! Each write to the filter-request characteristic carries exactly one
//! command (3 formats, 12 bytes max - no reassembly needed):
//!
//! ```text
//! Opcode 0 (deny all):   [0x00]
//! Opcode 1 (allow all):  [0x01, interval_hi, interval_lo]
//! Opcode 2 (allow one):  [0x02, interval_hi, interval_lo,
//!                         pid_b3, pid_b2, pid_b1, pid_b0]
//! ```
//!
//! Multi-byte fields are big-endian. Anything else - empty frame,
//! unknown opcode, length not matching the opcode - decodes to `None`
//! and causes no registry mutation at all.

use crate::pid::registry::{PidRegistry, RegistryFull};

/// One decoded filter request from the companion app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterCommand {
    /// Drop every subscription and disable allow-all.
    DenyAll,
    /// Subscribe all PIDs lazily at a shared default interval.
    AllowAll { update_interval_ms: u16 },
    /// Subscribe a single PID.
    AllowOne { pid: u32, update_interval_ms: u16 },
}

impl FilterCommand {
    /// Decode a raw characteristic write. Returns `None` for any
    /// malformed frame; the protocol has no way to NACK, so the
    /// documented policy is to ignore it and wait for a good one.
    pub fn decode(data: &[u8]) -> Option<Self> {
        match (*data.first()?, data.len()) {
            (0x00, 1) => Some(Self::DenyAll),
            (0x01, 3) => Some(Self::AllowAll {
                update_interval_ms: u16::from_be_bytes([data[1], data[2]]),
            }),
            (0x02, 7) => Some(Self::AllowOne {
                update_interval_ms: u16::from_be_bytes([data[1], data[2]]),
                pid: u32::from_be_bytes([data[3], data[4], data[5], data[6]]),
            }),
            _ => None,
        }
    }

    /// Apply this command to a registry.
    ///
    /// Only `AllowOne` can fail (registry at capacity); the failed call
    /// leaves the registry unchanged and stays invisible to the peer.
    pub fn apply<E: Default, const N: usize>(
        &self,
        registry: &mut PidRegistry<E, N>,
    ) -> Result<(), RegistryFull> {
        match *self {
            Self::DenyAll => {
                registry.reset();
                Ok(())
            }
            Self::AllowAll { update_interval_ms } => {
                registry.allow_all(update_interval_ms);
                Ok(())
            }
            Self::AllowOne {
                pid,
                update_interval_ms,
            } => registry.allow_one(pid, update_interval_ms),
        }
    }
}
