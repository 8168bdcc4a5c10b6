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

//! Lane cooperation primitives.
//!
//! A group of `W` lanes examines `W` consecutive slots at once. Lanes are
//! materialized as entries of a stack-local snapshot, a ballot is a `u32`
//! with one bit per lane, and election takes the lowest-rank set bit.
//! Positions are broadcast between lanes as slot indices.

use super::View;

use crate::common::word::Word;

/// One window of `W` slots, loaded lane by lane.
#[derive(Clone, Copy)]
pub(super) struct Window<K, V, const W: usize> {
    pub(super) keys: [K; W],
    pub(super) values: [V; W],
}

impl<K: Word, V: Word, const W: usize> Window<K, V, W> {
    pub(super) fn load(view: View<'_, K, V, W>, base: usize) -> Self {
        let mut keys = [view.empty_key_sentinel(); W];
        let mut values = [view.empty_value_sentinel(); W];

        for lane in 0..W {
            let slot = view.slot(base + lane);
            keys[lane] = K::load(&slot.key);
            values[lane] = V::load(&slot.value);
        }

        Self { keys, values }
    }

    /// Ballot of lanes whose key word is the empty key sentinel.
    pub(super) fn empty_ballot(&self, empty_key: K) -> u32 {
        let mut ballot = 0;

        for lane in 0..W {
            if self.keys[lane].same_bits(empty_key) {
                ballot |= 1 << lane;
            }
        }

        ballot
    }

    /// Ballot of non-empty lanes whose key satisfies `key_eq` against
    /// `query`. Empty lanes are masked out before `key_eq` runs; the user
    /// relation is never applied to a sentinel.
    pub(super) fn match_ballot<E: Fn(K, K) -> bool>(
        &self,
        empty: u32,
        query: K,
        key_eq: &E,
    ) -> u32 {
        let mut ballot = 0;

        for lane in 0..W {
            if empty & (1 << lane) == 0 && key_eq(self.keys[lane], query) {
                ballot |= 1 << lane;
            }
        }

        ballot
    }

    /// Drops match lanes whose value word still holds the value sentinel.
    /// Such a lane is a half-finished insert; reporting it would hand the
    /// sentinel out as a stored value.
    pub(super) fn settled_ballot(&self, matches: u32, empty_value: V) -> u32 {
        let mut settled = matches;
        let mut rest = matches;

        while rest != 0 {
            let lane = rest.trailing_zeros() as usize;
            rest &= rest - 1;

            if self.values[lane].same_bits(empty_value) {
                settled &= !(1 << lane);
            }
        }

        settled
    }
}

/// Lowest-rank lane of a non-empty ballot.
pub(super) fn elect(ballot: u32) -> usize {
    debug_assert_ne!(ballot, 0);

    ballot.trailing_zeros() as usize
}
