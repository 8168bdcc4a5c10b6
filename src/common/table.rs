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

mod find;
mod find_all;
mod insert;
mod probe_loop;
mod window;

pub use find_all::{Matches, WindowedMatches};

use crate::common::word::Word;
use crate::error::Error;

/// One (key, value) cell of the table.
///
/// Both fields are independently atomic. The key word commits the slot: it
/// is written exactly once, by the compare-exchange that wins it, and never
/// changes afterwards. The value word may transiently hold the value
/// sentinel while an insert is in flight and converges to the intended
/// value through the winner's retry loop.
#[repr(C)]
pub(crate) struct Slot<K: Word, V: Word> {
    key: K::Atomic,
    value: V::Atomic,
}

/// Owns the slot array. `W` is the group width: windowed operations probe
/// `W` consecutive slots at a time, so the capacity is kept divisible by
/// `W`.
pub(crate) struct Table<K: Word, V: Word, const W: usize> {
    slots: Box<[Slot<K, V>]>,
    empty_key: K,
    empty_value: V,
}

impl<K: Word, V: Word, const W: usize> Table<K, V, W> {
    pub(crate) fn with_capacity(
        capacity: usize,
        empty_key: K,
        empty_value: V,
    ) -> Result<Self, Error> {
        assert!(W >= 1 && W <= 32, "group width must be between 1 and 32");

        // smallest positive multiple of W holding the request
        let capacity = match capacity.max(1) % W {
            0 => capacity.max(1),
            rem => capacity.max(1) + (W - rem),
        };

        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| Error::AllocationFailed)?;
        slots.extend((0..capacity).map(|_| Slot {
            key: empty_key.into_atomic(),
            value: empty_value.into_atomic(),
        }));

        Ok(Self {
            slots: slots.into_boxed_slice(),
            empty_key,
            empty_value,
        })
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn view(&self) -> View<'_, K, V, W> {
        View {
            slots: &self.slots,
            empty_key: self.empty_key,
            empty_value: self.empty_value,
        }
    }

    pub(crate) fn mut_view(&self) -> MutView<'_, K, V, W> {
        MutView { view: self.view() }
    }
}

/// Immutable per-worker handle: the slot array, its capacity and the
/// sentinel pair. Cheap to copy; workers take it by value.
///
/// The query operations come in two flavors with distinct probe sequences:
/// plain (one slot per step) and windowed (one window of `W` slots per
/// step). A table must be operated with a single flavor throughout its
/// lifetime, since a pair stored through one sequence is not guaranteed to
/// lie on the other.
#[derive(Clone, Copy)]
pub struct View<'t, K: Word, V: Word, const W: usize> {
    slots: &'t [Slot<K, V>],
    empty_key: K,
    empty_value: V,
}

impl<'t, K: Word, V: Word, const W: usize> View<'t, K, V, W> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn empty_key_sentinel(&self) -> K {
        self.empty_key
    }

    pub fn empty_value_sentinel(&self) -> V {
        self.empty_value
    }

    fn slot(&self, index: usize) -> &'t Slot<K, V> {
        &self.slots[index]
    }
}

/// Mutable per-worker handle; adds the insert protocols on top of
/// [`View`].
#[derive(Clone, Copy)]
pub struct MutView<'t, K: Word, V: Word, const W: usize> {
    view: View<'t, K, V, W>,
}

impl<'t, K: Word, V: Word, const W: usize> MutView<'t, K, V, W> {
    /// Downgrades to the query handle.
    pub fn view(&self) -> View<'t, K, V, W> {
        self.view
    }
}
