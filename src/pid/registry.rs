//! Fixed-capacity PID subscription table.
//!
//! Entries are kept in an array sorted by PID, which gives O(log N)
//! lookup and O(N) insertion. A hash map would make both O(1), but at
//! the cost of extra code and memory - and N (distinct PIDs the app
//! cares about) is small and bounded, with insertions happening roughly
//! once per PID near session start. On a device this size the sorted
//! array is the better trade.
//!
//! No allocation happens after construction: storage is a
//! `heapless::Vec` with a const-generic capacity.

use heapless::Vec;

/// Returned by [`PidRegistry::allow_one`] when the table is at capacity.
/// The failed call leaves the registry untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegistryFull;

/// One tracked subscription.
///
/// `extra` is caller-owned bookkeeping the registry never interprets -
/// typically the timestamp of the last notification sent for this PID.
/// It is default-initialized when the entry is created and preserved
/// across interval updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidEntry<E> {
    pid: u32,
    update_interval_ms: u16,
    /// Application-defined payload attached to this subscription.
    pub extra: E,
}

impl<E> PidEntry<E> {
    /// The CAN identifier this entry tracks.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Requested reporting interval in milliseconds.
    pub fn update_interval_ms(&self) -> u16 {
        self.update_interval_ms
    }
}

/// Subscription table sorted by ascending PID, unique PIDs, bounded by
/// the const-generic capacity `N`.
///
/// Besides the per-PID entries it holds one scalar: the allow-all
/// default interval. While allow-all is active, a lookup of an unseen
/// PID lazily creates an entry at that interval - it never retroactively
/// changes entries that already exist.
pub struct PidRegistry<E, const N: usize> {
    entries: Vec<PidEntry<E>, N>,
    allow_all: Option<u16>,
}

impl<E: Default, const N: usize> PidRegistry<E, N> {
    /// Create an empty registry with allow-all unset.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            allow_all: None,
        }
    }

    /// Clear all entries and the allow-all flag.
    ///
    /// This implements the peer's "deny all" request, and must also be
    /// called on disconnect: a reconnecting peer starts its filter set
    /// from scratch and must not inherit a stale one.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.allow_all = None;
    }

    /// Subscribe a single PID at the given interval.
    ///
    /// If the PID is already tracked, its interval is overwritten and
    /// its `extra` left untouched. If it is new and the table is full,
    /// the call fails without mutating anything.
    pub fn allow_one(&mut self, pid: u32, update_interval_ms: u16) -> Result<(), RegistryFull> {
        match self.position(pid) {
            Ok(i) => {
                self.entries[i].update_interval_ms = update_interval_ms;
                Ok(())
            }
            Err(i) => self.insert_at(i, pid, update_interval_ms).map(|_| ()),
        }
    }

    /// Activate allow-all mode with the given default interval.
    ///
    /// Does not touch existing entries and does not pre-populate any;
    /// unseen PIDs get their entry lazily on first lookup.
    pub fn allow_all(&mut self, update_interval_ms: u16) {
        self.allow_all = Some(update_interval_ms);
    }

    /// The allow-all default interval, or `None` if allow-all is off.
    pub fn allow_all_interval(&self) -> Option<u16> {
        self.allow_all
    }

    /// Look up `pid`, lazily creating an entry when allow-all is active.
    ///
    /// Returns `None` if the PID is untracked and either allow-all is
    /// off or the table is full. This is the one path the polling loop
    /// uses to decide per PID whether (and how often) to report.
    pub fn lookup_or_create(&mut self, pid: u32) -> Option<&mut PidEntry<E>> {
        let i = match self.position(pid) {
            Ok(i) => i,
            Err(i) => {
                let interval = self.allow_all?;
                self.insert_at(i, pid, interval).ok()?
            }
        };
        Some(&mut self.entries[i])
    }

    /// Non-creating lookup.
    pub fn get(&self, pid: u32) -> Option<&PidEntry<E>> {
        self.position(pid).ok().map(|i| &self.entries[i])
    }

    /// Iterate entries in ascending PID order.
    pub fn iter(&self) -> impl Iterator<Item = &PidEntry<E>> {
        self.entries.iter()
    }

    /// Iterate entries in ascending PID order with mutable access to
    /// each entry's `extra`.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PidEntry<E>> {
        self.entries.iter_mut()
    }

    /// Number of tracked PIDs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of tracked PIDs (compile-time bound).
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Binary search: `Ok(index)` when the PID is present, `Err(index)`
    /// with the insertion point otherwise.
    fn position(&self, pid: u32) -> Result<usize, usize> {
        self.entries.binary_search_by_key(&pid, |e| e.pid)
    }

    /// Insert a fresh entry at `index`, shifting the tail up one slot.
    /// Returns the index on success so callers can re-borrow.
    fn insert_at(
        &mut self,
        index: usize,
        pid: u32,
        update_interval_ms: u16,
    ) -> Result<usize, RegistryFull> {
        let entry = PidEntry {
            pid,
            update_interval_ms,
            extra: E::default(),
        };
        match self.entries.insert(index, entry) {
            Ok(()) => Ok(index),
            Err(_) => Err(RegistryFull),
        }
    }
}

impl<E: Default, const N: usize> Default for PidRegistry<E, N> {
    fn default() -> Self {
        Self::new()
    }
}
