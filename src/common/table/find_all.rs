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

//! Enumeration cursors.
//!
//! A cursor is not a bare slot reference: continuing an enumeration needs
//! the key, the view and the probe position, so the iterators carry all
//! three and resume probing on every `next`.

use super::probe_loop::ProbeSeq;
use super::window::{self, Window};
use super::View;

use crate::common::word::Word;

impl<'t, K: Word, V: Word, const W: usize> View<'t, K, V, W> {
    /// Single-worker enumeration of every stored pair matching `key`, in
    /// probe order, up to the first empty slot.
    pub fn find_all<E: Fn(K, K) -> bool>(
        &self,
        key: K,
        hash: u64,
        key_eq: E,
    ) -> Matches<'t, K, V, E, W> {
        Matches {
            view: *self,
            key,
            key_eq,
            seq: ProbeSeq::scalar(hash, self.capacity()),
            done: false,
        }
    }

    /// Group-cooperative enumeration: one window per step, matches yielded
    /// in lane order, terminating after draining a window that holds an
    /// empty slot.
    pub fn find_all_windowed<E: Fn(K, K) -> bool>(
        &self,
        key: K,
        hash: u64,
        key_eq: E,
    ) -> WindowedMatches<'t, K, V, E, W> {
        WindowedMatches {
            view: *self,
            key,
            key_eq,
            seq: ProbeSeq::windowed(hash, self.capacity(), W),
            snapshot: Window {
                keys: [self.empty_key_sentinel(); W],
                values: [self.empty_value_sentinel(); W],
            },
            pending: 0,
            done: false,
        }
    }

    /// Number of stored pairs matching `key`: enumeration plus counting.
    pub fn count<E: Fn(K, K) -> bool>(&self, key: K, hash: u64, key_eq: E) -> usize {
        self.find_all(key, hash, key_eq).count()
    }

    /// Windowed flavor of [`count`](View::count).
    pub fn count_windowed<E: Fn(K, K) -> bool>(&self, key: K, hash: u64, key_eq: E) -> usize {
        self.find_all_windowed(key, hash, key_eq).count()
    }
}

/// Single-worker enumeration cursor; see [`View::find_all`].
pub struct Matches<'t, K: Word, V: Word, E, const W: usize> {
    view: View<'t, K, V, W>,
    key: K,
    key_eq: E,
    seq: ProbeSeq,
    done: bool,
}

impl<'t, K: Word, V: Word, E: Fn(K, K) -> bool, const W: usize> Iterator
    for Matches<'t, K, V, E, W>
{
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        if self.done {
            return None;
        }

        while let Some(index) = self.seq.next() {
            let slot = self.view.slot(index);
            let existing = K::load(&slot.key);

            if existing.same_bits(self.view.empty_key_sentinel()) {
                break;
            }

            if (self.key_eq)(existing, self.key) {
                let value = V::load(&slot.value);

                if !value.same_bits(self.view.empty_value_sentinel()) {
                    return Some((existing, value));
                }
            }
        }

        self.done = true;

        None
    }
}

/// Group-cooperative enumeration cursor; see [`View::find_all_windowed`].
pub struct WindowedMatches<'t, K: Word, V: Word, E, const W: usize> {
    view: View<'t, K, V, W>,
    key: K,
    key_eq: E,
    seq: ProbeSeq,
    snapshot: Window<K, V, W>,
    pending: u32,
    done: bool,
}

impl<'t, K: Word, V: Word, E: Fn(K, K) -> bool, const W: usize> Iterator
    for WindowedMatches<'t, K, V, E, W>
{
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        loop {
            if self.pending != 0 {
                let lane = window::elect(self.pending);
                self.pending &= self.pending - 1;

                return Some((self.snapshot.keys[lane], self.snapshot.values[lane]));
            }

            if self.done {
                return None;
            }

            match self.seq.next() {
                Some(base) => {
                    self.snapshot = Window::load(self.view, base);

                    let empty = self.snapshot.empty_ballot(self.view.empty_key_sentinel());
                    let matches = self.snapshot.match_ballot(empty, self.key, &self.key_eq);
                    self.pending = self
                        .snapshot
                        .settled_ballot(matches, self.view.empty_value_sentinel());

                    if empty != 0 {
                        // an empty lane ends the probe once this window's
                        // matches have been yielded
                        self.done = true;
                    }
                }
                None => self.done = true,
            }
        }
    }
}
