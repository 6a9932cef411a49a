//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **GATT server** - exposes the service the companion app expects
//!    (0x1FF8 with a write-only filter-request characteristic and a
//!    read+notify CAN-data characteristic).
//! 2. **Transport** - the [`transport::BleTransport`] seam the control
//!    loop uses to push notifications, plus `wait_for_connection`.
//!
//! The SoftDevice delivers characteristic writes on its own execution
//! context, while the control loop iterates the PID registry on another.
//! The registry is never shared between the two: the write handler only
//! decodes the frame and pushes the resulting [`FilterCommand`] into
//! [`FILTER_COMMANDS`], and the control loop drains that queue strictly
//! between full registry passes. That single-consumer queue is the whole
//! serialization story.

pub mod gatt;
pub mod transport;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::config::FILTER_QUEUE_DEPTH;
use crate::protocol::FilterCommand;

/// Decoded filter requests, written by the GATT write handler and
/// drained by the control loop. Bounded; a full queue drops the newest
/// command (logged), which the peer protocol cannot observe anyway.
pub static FILTER_COMMANDS: Channel<CriticalSectionRawMutex, FilterCommand, FILTER_QUEUE_DEPTH> =
    Channel::new();
