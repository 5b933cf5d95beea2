//! Concurrent cache: a four-way asymmetric cuckoo hash table keyed by
//! Zobrist key, shared by the transposition and evaluation caches.
//!
//! Slots are read and written without locks. An entry's key is stored XORed
//! with its packed payload, so a torn read or a racing write produces a key
//! that fails to match the probe and the entry is simply ignored. The `busy`
//! flag lives outside the XORed payload and is mutated in place; a race on it
//! only costs extra or missed work. Locks guard only clearing, bulk removal,
//! and iteration.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

/// Sub-table capacity shares, in per-mille of the total slot count.
const SUBTABLE_SHARES: [usize; 4] = [325, 275, 225, 175];

/// Value types storable in the cache. The packed payload must be non-zero
/// (reserve a tag bit) so an all-zero slot reads as empty.
pub trait CacheEntry: Copy {
    /// Zobrist key of the position this entry describes.
    fn key(&self) -> u64;
    /// Pack every tear-protected field into one word. Must never return 0.
    fn pack(&self) -> u64;
    /// Rebuild the entry from its key, packed payload, and busy flag.
    fn unpack(key: u64, data: u64, busy: bool) -> Self;
    /// Replacement priority: true if `self` should displace `other`.
    fn better_than(&self, other: &Self) -> bool;
    /// Busy flag to write alongside the entry. Entries without one return false.
    fn busy(&self) -> bool {
        false
    }
}

struct Slot {
    /// Key XOR packed payload; 0 data means the slot is empty.
    key: AtomicU64,
    data: AtomicU64,
    busy: AtomicBool,
}

impl Slot {
    fn empty() -> Self {
        Slot {
            key: AtomicU64::new(0),
            data: AtomicU64::new(0),
            busy: AtomicBool::new(false),
        }
    }

    #[inline]
    fn write(&self, key: u64, data: u64, busy: bool) {
        self.key.store(key ^ data, Ordering::Relaxed);
        self.data.store(data, Ordering::Relaxed);
        self.busy.store(busy, Ordering::Relaxed);
    }

    #[inline]
    fn wipe(&self) {
        self.key.store(0, Ordering::Relaxed);
        self.data.store(0, Ordering::Relaxed);
        self.busy.store(false, Ordering::Relaxed);
    }
}

/// Four sub-tables of decreasing capacity. A key probes one slot per
/// sub-table; insertion may evict a lower-priority incumbent and relocate it
/// into an empty slot of another sub-table (never cascading further).
pub struct CuckooTable<E: CacheEntry> {
    tables: [Box<[Slot]>; 4],
    maintenance: Mutex<()>,
    _marker: PhantomData<E>,
}

impl<E: CacheEntry> CuckooTable<E> {
    /// Create a table using approximately `size_mb` megabytes.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let slot_size = std::mem::size_of::<Slot>();
        let total_slots = (size_mb * 1024 * 1024 / slot_size).max(4);

        let tables = SUBTABLE_SHARES.map(|share| {
            let len = (total_slots * share / 1000).max(1);
            let mut slots = Vec::with_capacity(len);
            slots.resize_with(len, Slot::empty);
            slots.into_boxed_slice()
        });
        log::info!(
            "cache sized {}MB: {} slots across sub-tables {:?}",
            size_mb,
            total_slots,
            tables.iter().map(|t| t.len()).collect::<Vec<_>>()
        );

        CuckooTable {
            tables,
            maintenance: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Slot index of `key` in sub-table `t`: the key with the sign bit masked
    /// off, modulo the sub-table length.
    #[inline]
    fn index(&self, key: u64, t: usize) -> usize {
        ((key & 0x7FFF_FFFF_FFFF_FFFF) % self.tables[t].len() as u64) as usize
    }

    /// Probe the four sub-tables in order and return the first entry whose
    /// reconstructed key matches.
    #[must_use]
    pub fn get(&self, key: u64) -> Option<E> {
        for t in 0..4 {
            let slot = &self.tables[t][self.index(key, t)];
            let data = slot.data.load(Ordering::Relaxed);
            if data == 0 {
                continue;
            }
            let stored_key = slot.key.load(Ordering::Relaxed);
            if stored_key ^ data == key {
                return Some(E::unpack(key, data, slot.busy.load(Ordering::Relaxed)));
            }
        }
        None
    }

    /// Insert an entry. Returns true if it was absorbed (placed, merged into
    /// its own slot, or judged not better than the incumbent for its key) and
    /// false only when every candidate slot holds a higher-priority entry for
    /// some other key.
    pub fn put(&self, entry: &E) -> bool {
        let key = entry.key();
        let data = entry.pack();

        // First pass: empty slot or same-key slot
        for t in 0..4 {
            let slot = &self.tables[t][self.index(key, t)];
            let slot_data = slot.data.load(Ordering::Relaxed);
            if slot_data == 0 {
                slot.write(key, data, entry.busy());
                return true;
            }
            if slot.key.load(Ordering::Relaxed) ^ slot_data == key {
                let incumbent = E::unpack(key, slot_data, slot.busy.load(Ordering::Relaxed));
                if entry.better_than(&incumbent) {
                    slot.write(key, data, entry.busy());
                }
                return true;
            }
        }

        // Second pass: evict the first lower-priority incumbent and try to
        // relocate it into an empty slot elsewhere (no cascading)
        for t in 0..4 {
            let slot = &self.tables[t][self.index(key, t)];
            let slot_data = slot.data.load(Ordering::Relaxed);
            let incumbent_key = slot.key.load(Ordering::Relaxed) ^ slot_data;
            let incumbent = E::unpack(
                incumbent_key,
                slot_data,
                slot.busy.load(Ordering::Relaxed),
            );
            if !entry.better_than(&incumbent) {
                continue;
            }

            slot.write(key, data, entry.busy());

            if slot_data != 0 {
                for u in 0..4 {
                    if u == t {
                        continue;
                    }
                    let spare = &self.tables[u][self.index(incumbent_key, u)];
                    if spare.data.load(Ordering::Relaxed) == 0 {
                        spare.write(incumbent_key, slot_data, incumbent.busy());
                        break;
                    }
                }
            }
            return true;
        }

        false
    }

    /// Update the busy flag on the entry stored for `key`, if present.
    pub fn set_busy(&self, key: u64, busy: bool) {
        for t in 0..4 {
            let slot = &self.tables[t][self.index(key, t)];
            let data = slot.data.load(Ordering::Relaxed);
            if data != 0 && slot.key.load(Ordering::Relaxed) ^ data == key {
                slot.busy.store(busy, Ordering::Relaxed);
                return;
            }
        }
    }

    /// Empty every slot. Readers racing with a clear see either the old entry
    /// or an empty slot, both of which they already tolerate.
    pub fn clear(&self) {
        let _guard = self.maintenance.lock();
        for table in &self.tables {
            for slot in table.iter() {
                slot.wipe();
            }
        }
    }

    /// Remove every entry matching the predicate.
    pub fn remove(&self, predicate: impl Fn(&E) -> bool) {
        let _guard = self.maintenance.lock();
        for table in &self.tables {
            for slot in table.iter() {
                let data = slot.data.load(Ordering::Relaxed);
                if data == 0 {
                    continue;
                }
                let key = slot.key.load(Ordering::Relaxed) ^ data;
                let entry = E::unpack(key, data, slot.busy.load(Ordering::Relaxed));
                if predicate(&entry) {
                    slot.wipe();
                }
            }
        }
    }

    /// Occupancy estimate in per-mille, from a bounded sample of the first
    /// sub-table.
    #[must_use]
    pub fn fill_per_mille(&self) -> u32 {
        let table = &self.tables[0];
        let sample = table.len().min(1000);
        if sample == 0 {
            return 0;
        }
        let occupied = table[..sample]
            .iter()
            .filter(|slot| slot.data.load(Ordering::Relaxed) != 0)
            .count();
        (occupied * 1000 / sample) as u32
    }
}
