//! Host-testable library interface for can2ble.
//!
//! The subscription registry and the wire protocol are pure `no_std`
//! logic and compile on any host (no embedded hardware required).
//!
//! Usage: `cargo test --lib`
//!
//! The embedded binary (main.rs, `#![no_std]`/`#![no_main]`) layers the
//! SoftDevice GATT transport on top; enable the `embedded` feature to
//! build it.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod error;
pub mod pid;
pub mod protocol;

#[cfg(feature = "embedded")]
pub mod ble;

pub use error::Error;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::pid::{PidRegistry, RegistryFull};
    use crate::protocol::{encode_can_data, FilterCommand, FilterStats, MAX_NOTIFY_LEN};

    /// Small capacity makes full-table cases cheap to hit.
    type TestRegistry = PidRegistry<u8, 4>;

    fn pids<E: Default, const N: usize>(reg: &PidRegistry<E, N>) -> Vec<u32> {
        reg.iter().map(|e| e.pid()).collect()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Registry Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn registry_starts_empty() {
        let reg = TestRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
        assert_eq!(reg.capacity(), 4);
        assert!(reg.allow_all_interval().is_none());
    }

    #[test]
    fn allow_one_inserts_sorted_regardless_of_call_order() {
        let mut reg = TestRegistry::new();
        for pid in [500, 10, 8000, 42] {
            reg.allow_one(pid, 100).unwrap();
        }
        assert_eq!(pids(&reg), vec![10, 42, 500, 8000]);
    }

    #[test]
    fn allow_one_same_pid_overwrites_interval_keeps_extra() {
        let mut reg = TestRegistry::new();
        reg.allow_one(2000, 100).unwrap();
        reg.lookup_or_create(2000).unwrap().extra = 77;

        reg.allow_one(2000, 250).unwrap();

        assert_eq!(reg.len(), 1);
        let entry = reg.get(2000).unwrap();
        assert_eq!(entry.update_interval_ms(), 250);
        assert_eq!(entry.extra, 77);
    }

    #[test]
    fn allow_one_full_registry_fails_without_mutation() {
        let mut reg = TestRegistry::new();
        for pid in [1, 2, 3, 4] {
            reg.allow_one(pid, 50).unwrap();
        }
        let before = pids(&reg);

        assert_eq!(reg.allow_one(5, 50), Err(RegistryFull));
        assert_eq!(pids(&reg), before);

        // Updating an existing entry still works at capacity.
        assert_eq!(reg.allow_one(3, 99), Ok(()));
        assert_eq!(reg.get(3).unwrap().update_interval_ms(), 99);
    }

    #[test]
    fn allow_one_full_registry_fails_for_low_pid_too() {
        // Insertion point at the front must not shift anything out.
        let mut reg = TestRegistry::new();
        for pid in [10, 20, 30, 40] {
            reg.allow_one(pid, 50).unwrap();
        }
        assert_eq!(reg.allow_one(5, 50), Err(RegistryFull));
        assert_eq!(pids(&reg), vec![10, 20, 30, 40]);
    }

    #[test]
    fn allow_all_does_not_touch_existing_entries() {
        let mut reg = TestRegistry::new();
        reg.allow_one(100, 500).unwrap();

        reg.allow_all(50);

        assert_eq!(reg.allow_all_interval(), Some(50));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(100).unwrap().update_interval_ms(), 500);
    }

    #[test]
    fn allow_all_creates_entries_lazily_on_lookup() {
        let mut reg = TestRegistry::new();
        reg.allow_all(75);
        assert!(reg.is_empty());

        let entry = reg.lookup_or_create(1234).unwrap();
        assert_eq!(entry.pid(), 1234);
        assert_eq!(entry.update_interval_ms(), 75);
        assert_eq!(entry.extra, 0);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn lookup_without_allow_all_does_not_create() {
        let mut reg = TestRegistry::new();
        assert!(reg.lookup_or_create(1234).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn lookup_or_create_returns_existing_entry_unchanged() {
        let mut reg = TestRegistry::new();
        reg.allow_one(7, 300).unwrap();
        reg.allow_all(10);

        // Pre-existing entry keeps its own interval, not the default.
        let entry = reg.lookup_or_create(7).unwrap();
        assert_eq!(entry.update_interval_ms(), 300);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn lookup_or_create_full_registry_returns_none() {
        let mut reg = TestRegistry::new();
        reg.allow_all(10);
        for pid in [1, 2, 3, 4] {
            reg.lookup_or_create(pid).unwrap();
        }

        assert!(reg.lookup_or_create(5).is_none());
        assert_eq!(pids(&reg), vec![1, 2, 3, 4]);
    }

    #[test]
    fn reset_clears_entries_and_allow_all() {
        let mut reg = TestRegistry::new();
        reg.allow_all(10);
        reg.allow_one(1, 20).unwrap();
        reg.lookup_or_create(2).unwrap();

        reg.reset();

        assert!(reg.is_empty());
        assert!(reg.allow_all_interval().is_none());
        assert_eq!(reg.iter().count(), 0);
        assert!(reg.lookup_or_create(1).is_none());
    }

    #[test]
    fn registry_stays_sorted_under_mixed_operations() {
        let mut reg = PidRegistry::<u8, 16>::new();
        reg.allow_one(300, 10).unwrap();
        reg.allow_all(20);
        reg.lookup_or_create(5).unwrap();
        reg.allow_one(300, 30).unwrap();
        reg.lookup_or_create(1000).unwrap();
        reg.allow_one(5, 40).unwrap();
        reg.lookup_or_create(50).unwrap();

        let got = pids(&reg);
        let mut sorted = got.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(got, sorted);
        assert_eq!(got, vec![5, 50, 300, 1000]);
    }

    #[test]
    fn iter_mut_updates_extra_in_place() {
        let mut reg = TestRegistry::new();
        reg.allow_one(1, 10).unwrap();
        reg.allow_one(2, 10).unwrap();

        for entry in reg.iter_mut() {
            entry.extra = entry.pid() as u8;
        }

        assert_eq!(reg.get(1).unwrap().extra, 1);
        assert_eq!(reg.get(2).unwrap().extra, 2);
    }

    #[test]
    fn registry_at_configured_capacity() {
        let mut reg = PidRegistry::<(), { crate::config::MAX_PID_ENTRIES }>::new();
        for pid in 0..crate::config::MAX_PID_ENTRIES as u32 {
            reg.allow_one(pid, 10).unwrap();
        }
        assert_eq!(reg.len(), crate::config::MAX_PID_ENTRIES);
        assert_eq!(
            reg.allow_one(crate::config::MAX_PID_ENTRIES as u32, 10),
            Err(RegistryFull)
        );
    }

    // ════════════════════════════════════════════════════════════════════════
    // Request Decoder Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn decode_deny_all() {
        assert_eq!(FilterCommand::decode(&[0x00]), Some(FilterCommand::DenyAll));
    }

    #[test]
    fn decode_allow_all() {
        assert_eq!(
            FilterCommand::decode(&[0x01, 0x00, 0x64]),
            Some(FilterCommand::AllowAll {
                update_interval_ms: 100
            })
        );
    }

    #[test]
    fn decode_allow_one() {
        // interval 100, pid 2000 (0x000007D0), both big-endian.
        assert_eq!(
            FilterCommand::decode(&[0x02, 0x00, 0x64, 0x00, 0x00, 0x07, 0xD0]),
            Some(FilterCommand::AllowOne {
                pid: 2000,
                update_interval_ms: 100
            })
        );
    }

    #[test]
    fn decode_big_endian_extremes() {
        assert_eq!(
            FilterCommand::decode(&[0x01, 0xFF, 0xFF]),
            Some(FilterCommand::AllowAll {
                update_interval_ms: 0xFFFF
            })
        );
        assert_eq!(
            FilterCommand::decode(&[0x02, 0x12, 0x34, 0xDE, 0xAD, 0xBE, 0xEF]),
            Some(FilterCommand::AllowOne {
                pid: 0xDEADBEEF,
                update_interval_ms: 0x1234
            })
        );
    }

    #[test]
    fn decode_empty_frame_discarded() {
        assert_eq!(FilterCommand::decode(&[]), None);
    }

    #[test]
    fn decode_unknown_opcode_discarded() {
        assert_eq!(FilterCommand::decode(&[0x03]), None);
        assert_eq!(FilterCommand::decode(&[0xFF, 0x00, 0x64]), None);
    }

    #[test]
    fn decode_wrong_length_discarded() {
        // Deny-all with trailing garbage.
        assert_eq!(FilterCommand::decode(&[0x00, 0x00]), None);
        // Allow-all too short / too long.
        assert_eq!(FilterCommand::decode(&[0x01, 0x00]), None);
        assert_eq!(FilterCommand::decode(&[0x01, 0x00, 0x64, 0x00]), None);
        // Allow-one with allow-all's length.
        assert_eq!(FilterCommand::decode(&[0x02, 0x00, 0x64]), None);
    }

    #[test]
    fn apply_dispatches_to_registry() {
        let mut reg = TestRegistry::new();

        FilterCommand::decode(&[0x01, 0x00, 0x64])
            .unwrap()
            .apply(&mut reg)
            .unwrap();
        assert_eq!(reg.allow_all_interval(), Some(100));

        FilterCommand::decode(&[0x02, 0x00, 0x64, 0x00, 0x00, 0x07, 0xD0])
            .unwrap()
            .apply(&mut reg)
            .unwrap();
        assert_eq!(reg.get(2000).unwrap().update_interval_ms(), 100);

        FilterCommand::decode(&[0x00]).unwrap().apply(&mut reg).unwrap();
        assert!(reg.is_empty());
        assert!(reg.allow_all_interval().is_none());
    }

    #[test]
    fn apply_allow_one_reports_full_registry() {
        let mut reg = TestRegistry::new();
        for pid in [1, 2, 3, 4] {
            reg.allow_one(pid, 10).unwrap();
        }
        let cmd = FilterCommand::AllowOne {
            pid: 5,
            update_interval_ms: 10,
        };
        assert_eq!(cmd.apply(&mut reg), Err(RegistryFull));
    }

    #[test]
    fn filter_stats_counters() {
        let mut stats = FilterStats::new();
        stats.record_applied();
        stats.record_applied();
        stats.record_malformed();
        stats.record_registry_full();
        assert_eq!(
            stats,
            FilterStats {
                applied: 2,
                malformed: 1,
                registry_full: 1
            }
        );
    }

    // ════════════════════════════════════════════════════════════════════════
    // Notification Encoder Tests
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn encode_oversized_data_truncated_to_8() {
        let payload = encode_can_data(2000, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(payload.len(), MAX_NOTIFY_LEN);
        assert_eq!(
            payload.as_slice(),
            &[0xD0, 0x07, 0x00, 0x00, 1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn encode_pid_is_little_endian() {
        let payload = encode_can_data(0x12345678, &[]);
        assert_eq!(payload.as_slice(), &[0x78, 0x56, 0x34, 0x12]);
    }

    #[test]
    fn encode_short_data_kept_as_is() {
        let payload = encode_can_data(1, &[0xAA, 0xBB]);
        assert_eq!(payload.as_slice(), &[0x01, 0x00, 0x00, 0x00, 0xAA, 0xBB]);
    }

    #[test]
    fn encode_exactly_8_data_bytes() {
        let payload = encode_can_data(0, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(payload.len(), 12);
        assert_eq!(&payload.as_slice()[4..], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }
}
