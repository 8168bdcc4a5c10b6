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

use super::probe_loop::{Action as ProbeLoopAction, ProbeSeq, Result as ProbeLoopResult};
use super::window::{self, Window};
use super::View;

use crate::common::word::Word;

// Because nothing is ever deleted, the probe path from a key's initial
// position to any slot holding it contains no empty slot. Seeing an empty
// slot therefore proves absence, and both lookup flavors stop there.

impl<'t, K: Word, V: Word, const W: usize> View<'t, K, V, W> {
    /// Single-worker lookup: the first matching slot's value, or `None`
    /// once an empty slot proves the key absent.
    pub fn find<E: Fn(K, K) -> bool>(&self, key: K, hash: u64, key_eq: E) -> Option<V> {
        let seq = ProbeSeq::scalar(hash, self.capacity());

        match self.probe_loop(seq, |index| {
            let slot = self.slot(index);
            let existing = K::load(&slot.key);

            if existing.same_bits(self.empty_key_sentinel()) {
                return ProbeLoopAction::Return(None);
            }

            if key_eq(existing, key) {
                let value = V::load(&slot.value);

                // A matching key whose value word still holds the sentinel
                // is a half-finished insert; skip it rather than hand the
                // sentinel out as a match.
                if !value.same_bits(self.empty_value_sentinel()) {
                    return ProbeLoopAction::Return(Some(value));
                }
            }

            ProbeLoopAction::Advance
        }) {
            ProbeLoopResult::Returned(found) => found,
            ProbeLoopResult::Exhausted => None,
        }
    }

    /// Single-worker membership test.
    pub fn contains<E: Fn(K, K) -> bool>(&self, key: K, hash: u64, key_eq: E) -> bool {
        let seq = ProbeSeq::scalar(hash, self.capacity());

        match self.probe_loop(seq, |index| {
            let existing = K::load(&self.slot(index).key);

            if existing.same_bits(self.empty_key_sentinel()) {
                ProbeLoopAction::Return(false)
            } else if key_eq(existing, key) {
                ProbeLoopAction::Return(true)
            } else {
                ProbeLoopAction::Advance
            }
        }) {
            ProbeLoopResult::Returned(found) => found,
            ProbeLoopResult::Exhausted => false,
        }
    }

    /// Group-cooperative lookup over one window per step. A settled match
    /// anywhere in the window wins; failing that, an empty lane proves
    /// absence.
    pub fn find_windowed<E: Fn(K, K) -> bool>(&self, key: K, hash: u64, key_eq: E) -> Option<V> {
        let seq = ProbeSeq::windowed(hash, self.capacity(), W);

        match self.probe_loop(seq, |base| {
            let snapshot = Window::load(*self, base);
            let empty = snapshot.empty_ballot(self.empty_key_sentinel());
            let matches = snapshot.match_ballot(empty, key, &key_eq);
            let settled = snapshot.settled_ballot(matches, self.empty_value_sentinel());

            if settled != 0 {
                ProbeLoopAction::Return(Some(snapshot.values[window::elect(settled)]))
            } else if empty != 0 {
                ProbeLoopAction::Return(None)
            } else {
                ProbeLoopAction::Advance
            }
        }) {
            ProbeLoopResult::Returned(found) => found,
            ProbeLoopResult::Exhausted => None,
        }
    }

    /// Group-cooperative membership test.
    pub fn contains_windowed<E: Fn(K, K) -> bool>(&self, key: K, hash: u64, key_eq: E) -> bool {
        let seq = ProbeSeq::windowed(hash, self.capacity(), W);

        match self.probe_loop(seq, |base| {
            let snapshot = Window::load(*self, base);
            let empty = snapshot.empty_ballot(self.empty_key_sentinel());

            if snapshot.match_ballot(empty, key, &key_eq) != 0 {
                ProbeLoopAction::Return(true)
            } else if empty != 0 {
                ProbeLoopAction::Return(false)
            } else {
                ProbeLoopAction::Advance
            }
        }) {
            ProbeLoopResult::Returned(found) => found,
            ProbeLoopResult::Exhausted => false,
        }
    }
}
