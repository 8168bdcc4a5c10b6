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

use std::sync::atomic::{
    AtomicI16, AtomicI32, AtomicI64, AtomicI8, AtomicIsize, AtomicU16, AtomicU32, AtomicU64,
    AtomicU8, AtomicUsize, Ordering,
};

/// A key or value type stored directly in a table slot.
///
/// Implementors map the type onto a single lock-free atomic machine word.
/// Every access the table performs is relaxed: slots are independent of one
/// another and the key word's compare-exchange is the only linearization
/// point an insert needs.
///
/// Emptiness is always decided by [`same_bits`] against the table's
/// sentinel. User-supplied key equality is undefined on sentinels and is
/// never consulted for them.
///
/// [`same_bits`]: Word::same_bits
pub trait Word: Copy + Send + Sync + 'static {
    /// The `std::sync::atomic` type holding this word.
    type Atomic: Send + Sync;

    fn into_atomic(self) -> Self::Atomic;

    fn load(this: &Self::Atomic) -> Self;

    fn store(this: &Self::Atomic, value: Self);

    /// Relaxed compare-exchange; `Ok` iff the word held `current`.
    fn compare_exchange(this: &Self::Atomic, current: Self, new: Self) -> Result<Self, Self>;

    /// Bit-pattern equality, independent of any user equality relation.
    fn same_bits(self, other: Self) -> bool;
}

macro_rules! impl_word {
    ($($word:ty => $atomic:ty,)*) => {$(
        impl Word for $word {
            type Atomic = $atomic;

            fn into_atomic(self) -> $atomic {
                <$atomic>::new(self)
            }

            fn load(this: &$atomic) -> Self {
                this.load(Ordering::Relaxed)
            }

            fn store(this: &$atomic, value: Self) {
                this.store(value, Ordering::Relaxed);
            }

            fn compare_exchange(this: &$atomic, current: Self, new: Self) -> Result<Self, Self> {
                this.compare_exchange(current, new, Ordering::Relaxed, Ordering::Relaxed)
            }

            fn same_bits(self, other: Self) -> bool {
                self == other
            }
        }
    )*};
}

impl_word! {
    i8 => AtomicI8,
    i16 => AtomicI16,
    i32 => AtomicI32,
    i64 => AtomicI64,
    isize => AtomicIsize,
    u8 => AtomicU8,
    u16 => AtomicU16,
    u32 => AtomicU32,
    u64 => AtomicU64,
    usize => AtomicUsize,
}
