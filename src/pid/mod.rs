//! PID subscription bookkeeping.
//!
//! The companion app tells us which CAN identifiers ("PIDs") it wants to
//! observe and how often, either one PID at a time or via a blanket
//! allow-all mode. [`registry::PidRegistry`] is the fixed-capacity table
//! that tracks those subscriptions; the main control loop walks it to
//! decide what to poll on the CAN bus and when to notify.

pub mod registry;

pub use registry::{PidEntry, PidRegistry, RegistryFull};
