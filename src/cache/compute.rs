//! Direct-mapped compute table.
//!
//! Each key hashes to exactly one slot and a collision simply overwrites the
//! previous entry. The table doubles (up to `max_size`) once the number of
//! occupied slots exceeds `size * load_limit`.

use log::{debug, warn};

use crate::cache::{CacheValue, ComputeCache};
use crate::reference::Ref;
use crate::utils::MyHash;

pub struct ComputeTable<const N: usize, V = Ref> {
    name: &'static str,
    entries: Vec<Option<([Ref; N], V)>>,
    used: usize,
    load_limit: f64,
    max_size: usize,
    next_limit: usize,
    hits: usize,
    misses: usize,
    faults: usize,
}

fn alloc_entries<T>(size: usize) -> Option<Vec<Option<T>>> {
    let mut entries = Vec::new();
    entries.try_reserve_exact(size).ok()?;
    entries.resize_with(size, || None);
    Some(entries)
}

impl<const N: usize, V: CacheValue> ComputeTable<N, V> {
    /// Creates a table with `size` slots (rounded up to a power of two).
    pub fn new(name: &'static str, size: usize, load_limit: f64, max_size: usize) -> Self {
        let size = size.max(1).next_power_of_two();
        let mut table = Self {
            name,
            entries: Vec::new(),
            used: 0,
            load_limit,
            max_size: max_size.max(size),
            next_limit: 0,
            hits: 0,
            misses: 0,
            faults: 0,
        };
        // A table that cannot even get its initial slots stays empty and
        // behaves as a permanent miss.
        match alloc_entries(size) {
            Some(entries) => table.entries = entries,
            None => warn!("{}: could not allocate {} slots", name, size),
        }
        table.update_limit();
        table
    }

    fn update_limit(&mut self) {
        self.next_limit = (self.entries.len() as f64 * self.load_limit) as usize;
    }

    #[inline]
    fn index(&self, key: &[Ref; N]) -> usize {
        (key.hash() as usize) & (self.entries.len() - 1)
    }

    /// Looks up a key.
    pub fn get(&mut self, key: &[Ref; N]) -> Option<V> {
        if self.entries.is_empty() {
            self.misses += 1;
            return None;
        }
        let idx = self.index(key);
        match &self.entries[idx] {
            Some((k, v)) if k == key => {
                self.hits += 1;
                Some(v.clone())
            }
            Some(_) => {
                self.faults += 1;
                self.misses += 1;
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Stores a result, evicting whatever occupied the slot.
    pub fn put(&mut self, key: [Ref; N], value: V) {
        if self.used >= self.next_limit && self.entries.len() < self.max_size {
            self.resize(self.entries.len() * 2);
        }
        if self.entries.is_empty() {
            return;
        }
        let idx = self.index(&key);
        if self.entries[idx].is_none() {
            self.used += 1;
        }
        self.entries[idx] = Some((key, value));
    }

    fn resize(&mut self, new_size: usize) {
        let Some(new_entries) = alloc_entries(new_size) else {
            warn!("{}: could not grow to {} slots, keeping {}", self.name, new_size, self.entries.len());
            self.max_size = self.entries.len();
            return;
        };
        debug!("{}: resize {} -> {}", self.name, self.entries.len(), new_size);

        let old = std::mem::replace(&mut self.entries, new_entries);
        self.used = 0;
        for (key, value) in old.into_iter().flatten() {
            let idx = self.index(&key);
            if self.entries[idx].is_none() {
                self.used += 1;
            }
            self.entries[idx] = Some((key, value));
        }
        self.update_limit();
    }

    pub fn faults(&self) -> usize {
        self.faults
    }
}

impl<const N: usize, V: CacheValue> ComputeCache for ComputeTable<N, V> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn capacity(&self) -> usize {
        self.entries.len()
    }

    fn used(&self) -> usize {
        self.used
    }

    fn hits(&self) -> usize {
        self.hits
    }

    fn misses(&self) -> usize {
        self.misses
    }

    fn sweep(&mut self, is_dead: &dyn Fn(Ref) -> bool) -> usize {
        let mut removed = 0;
        for entry in &mut self.entries {
            let dead = match entry {
                Some((key, value)) => key.iter().any(|&r| is_dead(r)) || is_dead(value.edge()),
                None => false,
            };
            if dead {
                *entry = None;
                removed += 1;
            }
        }
        self.used -= removed;
        removed
    }

    fn clear(&mut self) {
        if self.used == 0 {
            return;
        }
        for entry in &mut self.entries {
            *entry = None;
        }
        self.used = 0;
    }

    fn set_load_limit(&mut self, load_limit: f64) {
        self.load_limit = load_limit;
        self.update_limit();
    }

    fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
    }
}
