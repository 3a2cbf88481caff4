//! Open-addressing table keyed on (identity, id) with linear probing,
//! tombstoned deletes and load-factor driven rehashing.
//!
//! Layout:
//!   slot: Empty | Occupied(entry) | Tombstone(entry)
//!   entry: identity, id, raw line, stored hash (display), line number
//!
//! Probing walks forward from the bucket index, wrapping modulo capacity;
//! Empty terminates a probe, Tombstone never does. The band [0.3, 0.7] of
//! the load factor drives halving/doubling, with capacity clamped to at
//! least `MIN_CAPACITY`. Only a rehash purges tombstones.

use crate::consts::{GROW_AT, HASH_BASE, KNUTH_A, MIN_CAPACITY, SHRINK_AT};
use crate::errors::Result;
use crate::record::{parse_record, RecordKey};
use std::io::{self, Write};

/// One stored record. Tombstoned entries keep their fields so diagnostic
/// reports can still show the deleted row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub identity: String,
    pub id: u32,
    /// The verbatim source line.
    pub raw: String,
    /// Bucket index computed at insertion time; display only.
    pub stored_hash: usize,
    /// 1-based ordinal of the record in its source corpus.
    pub line_number: usize,
}

/// Slot states of the open-addressing array.
#[derive(Debug, Clone, Default)]
pub enum Slot {
    #[default]
    Empty,
    Occupied(Entry),
    Tombstone(Entry),
}

impl Slot {
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Slot::Empty => None,
            Slot::Occupied(e) | Slot::Tombstone(e) => Some(e),
        }
    }
}

/// Lookup outcome: the stored line number when found, and the number of
/// slots the probe visited, the terminating one included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub line_number: Option<usize>,
    pub steps: usize,
}

pub struct NameTable {
    slots: Vec<Slot>,
    len: usize,
}

impl NameTable {
    /// New table with the given capacity, clamped to `MIN_CAPACITY`.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        Self {
            slots: vec![Slot::Empty; capacity],
            len: 0,
        }
    }

    /// Number of live (occupied) entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Raw slot array, in physical order. Report rendering walks this.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Live entries in slot order.
    pub fn iter_live(&self) -> impl Iterator<Item = &Entry> {
        self.slots.iter().filter_map(|s| match s {
            Slot::Occupied(e) => Some(e),
            _ => None,
        })
    }

    /// Probe start for a key: 32-bit wrapping rolling hash over the identity
    /// bytes, the id folded in last, then Knuth multiplicative dispersion
    /// scaled to the current capacity. Insert, search and remove all start
    /// from the index this returns.
    fn bucket_index(&self, identity: &str, id: u32) -> usize {
        let mut h = 0u32;
        for b in identity.bytes() {
            h = h.wrapping_mul(HASH_BASE).wrapping_add(u32::from(b));
        }
        h = h.wrapping_mul(HASH_BASE).wrapping_add(id);
        let frac = (f64::from(h) * KNUTH_A).fract();
        (frac * self.capacity() as f64) as usize
    }

    /// Insert a record, or update it in place when the key already exists.
    ///
    /// The growth check runs before anything else: when the table would
    /// reach a 0.7 load factor, capacity doubles first and the record lands
    /// in the rebuilt array. A malformed line errors out with the table
    /// untouched.
    pub fn insert(&mut self, line: &str, line_number: usize) -> Result<()> {
        if (self.len as f64 + 1.0) / self.capacity() as f64 >= GROW_AT {
            self.resize(self.capacity() * 2);
        }

        let key = parse_record(line)?;
        let base = self.bucket_index(&key.identity, key.id);
        let cap = self.capacity();

        // Update pass: walk the cluster; an equal key is overwritten in
        // place and never duplicated.
        for i in 0..cap {
            let idx = (base + i) % cap;
            match &mut self.slots[idx] {
                Slot::Empty => break,
                Slot::Occupied(e) if e.identity == key.identity && e.id == key.id => {
                    e.raw = line.to_string();
                    e.line_number = line_number;
                    e.stored_hash = base;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Placement pass: first Empty ends the scan, but a tombstone seen
        // on the way wins the slot (first-tombstone reclamation).
        let mut first_tombstone = None;
        for i in 0..cap {
            let idx = (base + i) % cap;
            match &self.slots[idx] {
                Slot::Empty => {
                    let dst = first_tombstone.unwrap_or(idx);
                    self.occupy(dst, &key, line, base, line_number);
                    return Ok(());
                }
                Slot::Tombstone(_) if first_tombstone.is_none() => {
                    first_tombstone = Some(idx);
                }
                _ => {}
            }
        }
        if let Some(idx) = first_tombstone {
            self.occupy(idx, &key, line, base, line_number);
            return Ok(());
        }

        // A full probe with no Empty and no Tombstone; unreachable while
        // the growth threshold holds. The probe terminates, the record is
        // dropped.
        tracing::warn!(capacity = cap, line_number, "probe exhausted, insert dropped");
        Ok(())
    }

    fn occupy(&mut self, idx: usize, key: &RecordKey, line: &str, base: usize, line_number: usize) {
        self.slots[idx] = Slot::Occupied(Entry {
            identity: key.identity.clone(),
            id: key.id,
            raw: line.to_string(),
            stored_hash: base,
            line_number,
        });
        self.len += 1;
    }

    /// Rehash-only placement: entries are known distinct and the capacity
    /// is final, so there is no growth check and no update pass. Takes the
    /// first Empty-or-Tombstone slot from the bucket index.
    fn insert_for_rehash(&mut self, mut entry: Entry) {
        let base = self.bucket_index(&entry.identity, entry.id);
        entry.stored_hash = base;
        let cap = self.capacity();
        for i in 0..cap {
            let idx = (base + i) % cap;
            if matches!(self.slots[idx], Slot::Empty | Slot::Tombstone(_)) {
                self.slots[idx] = Slot::Occupied(entry);
                self.len += 1;
                return;
            }
        }
    }

    /// Look a record up by the key parsed from `line`, counting every slot
    /// the probe visits. The probe starts at the same bucket index an
    /// insert of this key would use, so the sequences match step for step.
    pub fn search(&self, line: &str) -> Result<Probe> {
        let key = parse_record(line)?;
        let base = self.bucket_index(&key.identity, key.id);
        let cap = self.capacity();
        let mut steps = 0;
        for i in 0..cap {
            let idx = (base + i) % cap;
            steps += 1;
            match &self.slots[idx] {
                Slot::Empty => break,
                Slot::Occupied(e) if e.identity == key.identity && e.id == key.id => {
                    return Ok(Probe {
                        line_number: Some(e.line_number),
                        steps,
                    });
                }
                _ => {}
            }
        }
        Ok(Probe {
            line_number: None,
            steps,
        })
    }

    /// Tombstone the record whose key *and* verbatim line both match the
    /// input. A key match with a different stored line is not enough; the
    /// call is then a no-op and returns false.
    ///
    /// A successful delete that leaves the load factor at or below 0.3
    /// halves the table, never below `MIN_CAPACITY`.
    pub fn remove(&mut self, line: &str) -> Result<bool> {
        let key = parse_record(line)?;
        let base = self.bucket_index(&key.identity, key.id);
        let cap = self.capacity();
        for i in 0..cap {
            let idx = (base + i) % cap;
            let matched = match &self.slots[idx] {
                Slot::Empty => break,
                Slot::Occupied(e) => {
                    e.identity == key.identity && e.id == key.id && e.raw == line
                }
                Slot::Tombstone(_) => false,
            };
            if matched {
                if let Slot::Occupied(e) = std::mem::take(&mut self.slots[idx]) {
                    self.slots[idx] = Slot::Tombstone(e);
                    self.len -= 1;
                }
                if self.capacity() > MIN_CAPACITY && self.load_factor() <= SHRINK_AT {
                    self.resize(self.capacity() / 2);
                }
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Full rebuild at a new capacity, clamped to `MIN_CAPACITY`. Live
    /// entries are replayed in old slot order; tombstones do not survive.
    fn resize(&mut self, new_capacity: usize) {
        let new_capacity = new_capacity.max(MIN_CAPACITY);
        tracing::debug!(old = self.capacity(), new = new_capacity, len = self.len, "rehash");
        let old = std::mem::replace(&mut self.slots, vec![Slot::Empty; new_capacity]);
        self.len = 0;
        for slot in old {
            if let Slot::Occupied(entry) = slot {
                self.insert_for_rehash(entry);
            }
        }
    }

    /// Write every live record, in slot order, one per line.
    pub fn export<W: Write>(&self, w: &mut W) -> io::Result<()> {
        for entry in self.iter_live() {
            writeln!(w, "{}", entry.raw)?;
        }
        Ok(())
    }
}
