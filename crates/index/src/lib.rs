//! # Simdex Index
//!
//! This crate provides an in-memory near-duplicate index over simhash
//! [`Fingerprint`]s. Given a query fingerprint it returns every stored
//! identifier whose fingerprint lies within the configured Hamming distance,
//! without comparing the query against every stored entry.
//!
//! ## How it works
//!
//! Each fingerprint is cut into `k` contiguous partitions, where `k` is the
//! distance threshold (see [`partition`]). Every partition yields one key
//! (`"{group}-{base64(bits)}"`) and the entry is stored in the bucket of each
//! of its `k` keys. A query looks up its own `k` keys, plus the one-bit
//! neighbours of a single partition, and filters the candidates by exact
//! Hamming distance.
//!
//! - Any fingerprint within distance `< k` shares a key with the query.
//! - At distance exactly `k` the neighbour lookup catches the case where every
//!   partition differs in one bit.
//!
//! ## Key Concepts
//!
//! [`NearDupIndex`] is an owned, single-writer structure: mutations take
//! `&mut self`. [`SharedIndex`] wraps it in a `RwLock` for services that
//! mutate and query from several threads.
//!
//! An entry is identified by the pair `(id, fingerprint bytes)`. Several
//! fingerprint versions may coexist under one identifier; deleting one
//! leaves the others in place.
//!
//! ## Example Usage
//!
//! ```
//! use index::{IndexConfig, NearDupIndex};
//! use perceptual::Fingerprint;
//!
//! let cfg = IndexConfig::new().with_distance_threshold(3);
//! let mut index = NearDupIndex::new(cfg).unwrap();
//!
//! index.add(1u64, &Fingerprint::from_u64(0xFFFF_0000_FFFF_0000)).unwrap();
//! index.add(2u64, &Fingerprint::from_u64(0x0000_FFFF_0000_FFFF)).unwrap();
//!
//! // Two bits away from entry 1.
//! let query = Fingerprint::from_u64(0xFFFF_0000_FFFF_0003);
//! let dups = index.near_duplicates(&query).unwrap();
//! assert_eq!(dups.len(), 1);
//! assert!(dups.contains(&1));
//! ```

mod config;
pub mod partition;
mod shared;

use std::hash::Hash;
use std::sync::Arc;
use std::time::Instant;

use hashbrown::HashMap;
use perceptual::{distance, Fingerprint};
use rayon::prelude::*;
use tracing::{debug, info};

pub use crate::config::{IndexConfig, IndexError, DEFAULT_DISTANCE_THRESHOLD};
pub use crate::partition::{PartitionKeys, PartitionLayout};
pub use crate::shared::SharedIndex;
/// Set type returned by near-duplicate queries.
pub use hashbrown::HashSet;

/// One stored `(id, fingerprint)` pair. Shared by the `k` buckets it sits in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Entry<I> {
    id: I,
    fingerprint: Fingerprint,
}

/// A near-duplicate hit with its exact Hamming distance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NearDupMatch<I> {
    pub id: I,
    pub distance: u32,
}

/// Partition-key bucket index.
#[derive(Debug, Clone)]
pub struct NearDupIndex<I = u64> {
    cfg: IndexConfig,
    layout: PartitionLayout,
    buckets: HashMap<String, HashSet<Arc<Entry<I>>>>,
    /// Every stored entry with its insertion sequence number.
    entries: HashMap<Arc<Entry<I>>, u64>,
    next_seq: u64,
}

impl<I> NearDupIndex<I>
where
    I: Eq + Hash + Clone,
{
    /// Create an empty index. Fails on an invalid configuration.
    pub fn new(cfg: IndexConfig) -> Result<Self, IndexError> {
        cfg.validate()?;
        let layout = PartitionLayout::new(cfg.width_bits, cfg.distance_threshold)?;
        Ok(Self {
            cfg,
            layout,
            buckets: HashMap::new(),
            entries: HashMap::new(),
            next_seq: 0,
        })
    }

    /// Build an index from an initial set of entries.
    ///
    /// Equivalent to calling [`add`](Self::add) for each entry, except that
    /// nothing is inserted if any fingerprint has the wrong width. With
    /// `use_parallel` the partition keys are derived on the rayon pool.
    pub fn from_entries<T>(cfg: IndexConfig, entries: T) -> Result<Self, IndexError>
    where
        T: IntoIterator<Item = (I, Fingerprint)>,
        I: Send,
    {
        let start = Instant::now();
        let mut index = Self::new(cfg)?;
        let layout = index.layout;
        let entries: Vec<(I, Fingerprint)> = entries.into_iter().collect();
        let count = entries.len();

        let derive = |(id, fp): (I, Fingerprint)| -> Result<_, IndexError> {
            let keys: Vec<String> = layout.keys(&fp)?.collect();
            Ok((keys, id, fp))
        };
        let keyed: Vec<(Vec<String>, I, Fingerprint)> = if index.cfg.use_parallel {
            entries.into_par_iter().map(derive).collect::<Result<_, _>>()?
        } else {
            entries.into_iter().map(derive).collect::<Result<_, _>>()?
        };

        for (keys, id, fingerprint) in keyed {
            index.insert_keyed(keys, Entry { id, fingerprint });
        }

        info!(
            entries = count,
            buckets = index.bucket_count(),
            distance_threshold = index.cfg.distance_threshold,
            parallel = index.cfg.use_parallel,
            elapsed_micros = start.elapsed().as_micros(),
            "index_bulk_load"
        );
        Ok(index)
    }

    pub fn config(&self) -> &IndexConfig {
        &self.cfg
    }

    pub fn layout(&self) -> &PartitionLayout {
        &self.layout
    }

    /// Store `(id, fp)` under each of its partition keys.
    ///
    /// Adding a pair that is already present is a no-op.
    pub fn add(&mut self, id: I, fp: &Fingerprint) -> Result<(), IndexError> {
        let keys = self.layout.keys(fp)?;
        debug!(fingerprint = %fp, "index_add");
        self.insert_keyed(
            keys,
            Entry {
                id,
                fingerprint: fp.clone(),
            },
        );
        Ok(())
    }

    fn insert_keyed<K>(&mut self, keys: K, entry: Entry<I>)
    where
        K: IntoIterator<Item = String>,
    {
        if self.entries.contains_key(&entry) {
            return;
        }
        let entry = Arc::new(entry);
        self.entries.insert(Arc::clone(&entry), self.next_seq);
        self.next_seq += 1;
        for key in keys {
            self.buckets
                .entry(key)
                .or_default()
                .insert(Arc::clone(&entry));
        }
    }

    /// Remove the entry matching both `id` and the exact bytes of `fp`.
    ///
    /// Entries with the same id but other fingerprint bytes are kept. A
    /// fingerprint of the wrong width cannot be stored, so it is treated as
    /// nothing to delete. Returns whether an entry was removed.
    pub fn delete(&mut self, id: &I, fp: &Fingerprint) -> bool {
        let keys = match self.layout.keys(fp) {
            Ok(keys) => keys,
            Err(err) => {
                debug!(error = %err, "index_delete_skipped");
                return false;
            }
        };
        let target = Entry {
            id: id.clone(),
            fingerprint: fp.clone(),
        };

        let removed = self.entries.remove(&target).is_some();
        if removed {
            for key in keys {
                if let Some(bucket) = self.buckets.get_mut(&key) {
                    bucket.remove(&target);
                    if bucket.is_empty() {
                        self.buckets.remove(&key);
                    }
                }
            }
        }
        debug!(fingerprint = %fp, removed, "index_delete");
        removed
    }

    /// Whether exactly `(id, fp)` is stored.
    pub fn contains(&self, id: &I, fp: &Fingerprint) -> bool {
        self.entries.contains_key(&Entry {
            id: id.clone(),
            fingerprint: fp.clone(),
        })
    }

    /// Identifiers of every stored fingerprint within the distance threshold
    /// of `fp`. Each identifier appears once.
    pub fn near_duplicates(&self, fp: &Fingerprint) -> Result<HashSet<I>, IndexError> {
        let mut out = HashSet::new();
        self.for_each_within_threshold(fp, |entry, _| {
            if !out.contains(&entry.id) {
                out.insert(entry.id.clone());
            }
        })?;
        Ok(out)
    }

    /// Like [`near_duplicates`](Self::near_duplicates) but with distances,
    /// closest first. An id stored under several fingerprints reports its
    /// closest one. Equal distances keep insertion order, so the result is
    /// deterministic for a given sequence of mutations.
    pub fn matches(&self, fp: &Fingerprint) -> Result<Vec<NearDupMatch<I>>, IndexError> {
        // id -> (distance, insertion seq) of its closest stored fingerprint
        let mut best: HashMap<I, (u32, u64)> = HashMap::new();
        self.for_each_within_threshold(fp, |entry, d| {
            let seq = self.entries.get(entry).copied().unwrap_or(u64::MAX);
            match best.get_mut(&entry.id) {
                Some(current) => *current = (*current).min((d, seq)),
                None => {
                    best.insert(entry.id.clone(), (d, seq));
                }
            }
        })?;
        let mut ranked: Vec<(u32, u64, I)> = best
            .into_iter()
            .map(|(id, (distance, seq))| (distance, seq, id))
            .collect();
        ranked.sort_unstable_by_key(|&(distance, seq, _)| (distance, seq));
        Ok(ranked
            .into_iter()
            .map(|(distance, _, id)| NearDupMatch { id, distance })
            .collect())
    }

    /// The partition keys of `fp` in derivation order, exactly as used for
    /// storage.
    pub fn keys(&self, fp: &Fingerprint) -> Result<Vec<String>, IndexError> {
        Ok(self.layout.keys(fp)?.collect())
    }

    /// Every stored `(id, fingerprint)` pair, each once, in no particular
    /// order.
    pub fn entries(&self) -> impl Iterator<Item = (&I, &Fingerprint)> + '_ {
        self.entries
            .keys()
            .map(|entry| (&entry.id, &entry.fingerprint))
    }

    /// Number of distinct stored `(id, fingerprint)` pairs.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of non-empty buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.entries.clear();
        self.next_seq = 0;
    }

    fn for_each_within_threshold<F>(
        &self,
        fp: &Fingerprint,
        mut visit: F,
    ) -> Result<(), IndexError>
    where
        F: FnMut(&Entry<I>, u32),
    {
        let exact = self.layout.keys(fp)?;
        let neighbors = self
            .layout
            .neighbor_keys(fp, self.layout.narrowest_group())?;

        let mut candidates = 0usize;
        for key in exact.chain(neighbors) {
            let Some(bucket) = self.buckets.get(&key) else {
                continue;
            };
            for entry in bucket {
                candidates += 1;
                let d = distance(fp, &entry.fingerprint).map_err(|_| IndexError::SizeMismatch {
                    expected: self.cfg.width_bits,
                    actual: fp.width_bits(),
                })?;
                if d as usize <= self.cfg.distance_threshold {
                    visit(entry, d);
                }
            }
        }
        debug!(fingerprint = %fp, candidates, "index_lookup");
        Ok(())
    }
}
