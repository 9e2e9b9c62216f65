//! Thread-safe wrapper around [`NearDupIndex`].

use std::hash::Hash;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use perceptual::Fingerprint;

use crate::{HashSet, IndexConfig, IndexError, NearDupIndex, NearDupMatch};

/// A [`NearDupIndex`] behind a `RwLock`.
///
/// Queries share the lock; `add`, `delete` and `clear` take it exclusively.
/// A panic in another thread while holding the lock does not make the index
/// unusable: the guard is recovered and the operation proceeds, since every
/// mutation leaves the buckets consistent between individual inserts.
#[derive(Debug)]
pub struct SharedIndex<I = u64> {
    inner: RwLock<NearDupIndex<I>>,
}

impl<I> SharedIndex<I>
where
    I: Eq + Hash + Clone,
{
    pub fn new(cfg: IndexConfig) -> Result<Self, IndexError> {
        Ok(Self::from(NearDupIndex::new(cfg)?))
    }

    pub fn from_entries<T>(cfg: IndexConfig, entries: T) -> Result<Self, IndexError>
    where
        T: IntoIterator<Item = (I, Fingerprint)>,
        I: Send,
    {
        Ok(Self::from(NearDupIndex::from_entries(cfg, entries)?))
    }

    fn read(&self) -> RwLockReadGuard<'_, NearDupIndex<I>> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, NearDupIndex<I>> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn config(&self) -> IndexConfig {
        self.read().config().clone()
    }

    pub fn add(&self, id: I, fp: &Fingerprint) -> Result<(), IndexError> {
        self.write().add(id, fp)
    }

    pub fn delete(&self, id: &I, fp: &Fingerprint) -> bool {
        self.write().delete(id, fp)
    }

    pub fn contains(&self, id: &I, fp: &Fingerprint) -> bool {
        self.read().contains(id, fp)
    }

    pub fn near_duplicates(&self, fp: &Fingerprint) -> Result<HashSet<I>, IndexError> {
        self.read().near_duplicates(fp)
    }

    pub fn matches(&self, fp: &Fingerprint) -> Result<Vec<NearDupMatch<I>>, IndexError> {
        self.read().matches(fp)
    }

    pub fn keys(&self, fp: &Fingerprint) -> Result<Vec<String>, IndexError> {
        self.read().keys(fp)
    }

    pub fn entry_count(&self) -> usize {
        self.read().entry_count()
    }

    pub fn bucket_count(&self) -> usize {
        self.read().bucket_count()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Run `f` against a consistent snapshot of the index under one read
    /// lock.
    pub fn with_index<R>(&self, f: impl FnOnce(&NearDupIndex<I>) -> R) -> R {
        f(&self.read())
    }

    pub fn into_inner(self) -> NearDupIndex<I> {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<I> From<NearDupIndex<I>> for SharedIndex<I> {
    fn from(index: NearDupIndex<I>) -> Self {
        Self {
            inner: RwLock::new(index),
        }
    }
}
