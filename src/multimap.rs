// MIT License
//
// Copyright (c) 2020 Gregory Meyer
//
// Permission is hereby granted, free of charge, to any person
// obtaining a copy of this software and associated documentation files
// (the "Software"), to deal in the Software without restriction,
// including without limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of the Software,
// and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS
// BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN
// ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Host-side bulk interface over the lockfree core.


use std::{
    hash::{BuildHasher, Hash, Hasher},
    sync::atomic::{AtomicUsize, Ordering},
};

use fxhash::FxBuildHasher;
use rayon::prelude::*;

use crate::common::table::{MutView, Table, View};
use crate::common::word::Word;
use crate::error::Error;

/// Fixed-capacity concurrent multimap.
///
/// Keys and values are atomic machine words; a key may be stored any
/// number of times, and stored pairs are never overwritten or removed.
/// Bulk operations fan the batch out across a thread pool, one group of
/// `W` cooperating lanes per key, and return only after every worker has
/// finished, so each bulk call observes all writes of the calls before it.
/// Reads concurrent with an insert batch have no defined semantics beyond
/// never reporting a sentinel as a stored value.
///
/// `W` is the group width: windowed probing advances one window of `W`
/// slots at a time. `W = 1` selects the single-worker protocol instead.
pub struct MultiMap<K: Word, V: Word, S = FxBuildHasher, const W: usize = 2> {
    table: Table<K, V, W>,
    hash_builder: S,
}

impl<K: Word, V: Word, const W: usize> MultiMap<K, V, FxBuildHasher, W> {
    /// Builds a table of at least `capacity` slots, every one initialized
    /// to the sentinel pair.
    ///
    /// The sentinels must never occur as a stored key or value; storing
    /// one anyway corrupts the table undetectably.
    pub fn with_capacity(capacity: usize, empty_key: K, empty_value: V) -> Result<Self, Error> {
        Self::with_capacity_and_hasher(capacity, empty_key, empty_value, FxBuildHasher::default())
    }
}

impl<K: Word, V: Word, S: BuildHasher, const W: usize> MultiMap<K, V, S, W> {
    pub fn with_capacity_and_hasher(
        capacity: usize,
        empty_key: K,
        empty_value: V,
        hash_builder: S,
    ) -> Result<Self, Error> {
        Ok(Self {
            table: Table::with_capacity(capacity, empty_key, empty_value)?,
            hash_builder,
        })
    }

    /// Slot count: the requested capacity rounded up to a multiple of `W`.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn empty_key_sentinel(&self) -> K {
        self.view().empty_key_sentinel()
    }

    pub fn empty_value_sentinel(&self) -> V {
        self.view().empty_value_sentinel()
    }

    /// Immutable per-worker handle.
    pub fn view(&self) -> View<'_, K, V, W> {
        self.table.view()
    }

    /// Mutable per-worker handle.
    pub fn mut_view(&self) -> MutView<'_, K, V, W> {
        self.table.mut_view()
    }
}

impl<K, V, S, const W: usize> MultiMap<K, V, S, W>
where
    K: Word + Hash + Eq,
    V: Word,
    S: BuildHasher + Sync,
{
    fn hash(&self, key: &K) -> u64 {
        let mut hasher = self.hash_builder.build_hasher();
        key.hash(&mut hasher);

        hasher.finish()
    }

    /// Inserts every pair of the batch.
    ///
    /// Fails with [`Error::CapacityExceeded`] once any worker's probe
    /// exhausts the table; pairs dispatched before the failure may or may
    /// not have been stored, and the table should be considered saturated.
    pub fn insert(&self, pairs: &[(K, V)]) -> Result<(), Error> {
        let view = self.mut_view();

        pairs.par_iter().try_for_each(|&(key, value)| {
            let hash = self.hash(&key);

            if W == 1 {
                view.insert(key, value, hash)
            } else {
                view.insert_windowed(key, value, hash)
            }
        })
    }

    /// Looks every key up, writing results in input order: the first
    /// stored value for the key, or the value sentinel for a miss.
    pub fn find(&self, keys: &[K], out: &mut [V]) {
        assert_eq!(keys.len(), out.len());

        let view = self.view();

        keys.par_iter().zip(out.par_iter_mut()).for_each(|(key, out)| {
            let hash = self.hash(key);

            let found = if W == 1 {
                view.find(*key, hash, |a, b| a == b)
            } else {
                view.find_windowed(*key, hash, |a, b| a == b)
            };

            *out = found.unwrap_or_else(|| view.empty_value_sentinel());
        });
    }

    /// Tests every key for membership, writing results in input order.
    pub fn contains(&self, keys: &[K], out: &mut [bool]) {
        assert_eq!(keys.len(), out.len());

        let view = self.view();

        keys.par_iter().zip(out.par_iter_mut()).for_each(|(key, out)| {
            let hash = self.hash(key);

            *out = if W == 1 {
                view.contains(*key, hash, |a, b| a == b)
            } else {
                view.contains_windowed(*key, hash, |a, b| a == b)
            };
        });
    }

    /// Total number of stored pairs whose key equals any queried key.
    pub fn count(&self, keys: &[K]) -> usize {
        let view = self.view();

        keys.par_iter()
            .map(|key| {
                let hash = self.hash(key);

                if W == 1 {
                    view.count(*key, hash, |a, b| a == b)
                } else {
                    view.count_windowed(*key, hash, |a, b| a == b)
                }
            })
            .sum()
    }

    /// Writes every stored pair matching any queried key into `out`, in
    /// unspecified order, and returns the number written.
    ///
    /// Workers claim output positions through a shared counter, so `out`
    /// must have room for every match; size it with [`MultiMap::count`].
    ///
    /// # Panics
    ///
    /// Panics if `out` is too small for the matches found.
    pub fn find_all(&self, keys: &[K], out: &mut [(K, V)]) -> usize {
        let view = self.view();
        let emitted = AtomicUsize::new(0);
        let out_len = out.len();
        let out_base = SendPtr(out.as_mut_ptr());

        keys.par_iter().for_each(|key| {
            let hash = self.hash(key);
            let out_base = out_base;

            let mut emit = |pair: (K, V)| {
                let index = emitted.fetch_add(1, Ordering::Relaxed);
                assert!(index < out_len, "find_all output buffer too small");

                // Disjoint destinations: each index is claimed by exactly
                // one fetch_add winner.
                unsafe { out_base.0.add(index).write(pair) };
            };

            if W == 1 {
                view.find_all(*key, hash, |a, b| a == b).for_each(&mut emit);
            } else {
                view.find_all_windowed(*key, hash, |a, b| a == b)
                    .for_each(&mut emit);
            }
        });

        emitted.load(Ordering::Relaxed)
    }
}

/// Raw base of a bulk output buffer, handed to the worker pool.
#[derive(Clone, Copy)]
struct SendPtr<T>(*mut T);

unsafe impl<T: Send> Send for SendPtr<T> {}
unsafe impl<T: Send> Sync for SendPtr<T> {}
