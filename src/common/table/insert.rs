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
use super::{MutView, Slot};

use crate::common::word::Word;
use crate::error::Error;

impl<'t, K: Word, V: Word, const W: usize> MutView<'t, K, V, W> {
    /// Single-worker insert: probe one slot at a time and claim the first
    /// empty one.
    ///
    /// A pair is stored once per call; inserting an equal key again stores
    /// a second pair. Fails with [`Error::CapacityExceeded`] when the probe
    /// sequence exhausts without finding an empty slot.
    pub fn insert(&self, key: K, value: V, hash: u64) -> Result<(), Error> {
        debug_assert!(!key.same_bits(self.view.empty_key_sentinel()));

        let seq = ProbeSeq::scalar(hash, self.view.capacity());

        match self.view.probe_loop(seq, |index| {
            if self.claim_slot(self.view.slot(index), key, value) {
                ProbeLoopAction::Return(())
            } else {
                ProbeLoopAction::Advance
            }
        }) {
            ProbeLoopResult::Returned(()) => Ok(()),
            ProbeLoopResult::Exhausted => Err(Error::CapacityExceeded),
        }
    }

    /// Group-cooperative insert: ballot the window's empty lanes, let the
    /// lowest-rank one run the claim protocol, and retry the same window
    /// while it still might hold an empty slot.
    pub fn insert_windowed(&self, key: K, value: V, hash: u64) -> Result<(), Error> {
        debug_assert!(!key.same_bits(self.view.empty_key_sentinel()));

        let seq = ProbeSeq::windowed(hash, self.view.capacity(), W);

        match self.view.probe_loop(seq, |base| {
            let snapshot = Window::load(self.view, base);
            let empty = snapshot.empty_ballot(self.view.empty_key_sentinel());

            if empty == 0 {
                return ProbeLoopAction::Advance;
            }

            let lane = window::elect(empty);

            if self.claim_slot(self.view.slot(base + lane), key, value) {
                ProbeLoopAction::Return(())
            } else {
                // Another group took the elected slot first. The window may
                // still hold an empty lane, so ballot it again.
                ProbeLoopAction::Retry
            }
        }) {
            ProbeLoopResult::Returned(()) => Ok(()),
            ProbeLoopResult::Exhausted => Err(Error::CapacityExceeded),
        }
    }

    /// The two-word claim protocol.
    ///
    /// The key compare-exchange is the commit point: whichever worker wins
    /// it owns the slot. The value word is decoupled from the commit, so
    /// two cleanup obligations remain. A loser whose value write landed
    /// first rolls that word back to the sentinel, and a winner retries
    /// its value compare-exchange until it sticks (invariant: the value
    /// word of an owned slot converges after finitely many loser
    /// rollbacks).
    fn claim_slot(&self, slot: &Slot<K, V>, key: K, value: V) -> bool {
        let empty_key = self.view.empty_key_sentinel();
        let empty_value = self.view.empty_value_sentinel();

        let key_won = K::compare_exchange(&slot.key, empty_key, key).is_ok();
        let mut value_won = V::compare_exchange(&slot.value, empty_value, value).is_ok();

        if key_won {
            while !value_won {
                value_won = V::compare_exchange(&slot.value, empty_value, value).is_ok();
            }

            true
        } else {
            if value_won {
                // Orphaned write: the slot's key belongs to another worker
                // whose own value store is pending on this word holding
                // the sentinel.
                V::store(&slot.value, empty_value);
            }

            false
        }
    }
}
