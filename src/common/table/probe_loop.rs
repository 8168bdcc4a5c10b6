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

use super::View;

use crate::common::word::Word;

pub(super) enum Action<T> {
    /// Move to the next probe position.
    Advance,
    /// Re-examine the current position.
    Retry,
    Return(T),
}

pub(super) enum Result<T> {
    Returned(T),
    /// Every position was visited without returning; the sequence would
    /// wrap back to its start.
    Exhausted,
}

/// Deterministic position sequence for one key.
///
/// Starts at the key's initial position and advances by a fixed step,
/// wrapping modulo the capacity. The step always divides the capacity, so
/// the sequence visits every position exactly once before exhausting.
#[derive(Clone, Copy)]
pub(super) struct ProbeSeq {
    index: usize,
    step: usize,
    capacity: usize,
    remaining: usize,
}

impl ProbeSeq {
    /// Linear probing over single slots.
    pub(super) fn scalar(hash: u64, capacity: usize) -> Self {
        Self {
            index: (hash % capacity as u64) as usize,
            step: 1,
            capacity,
            remaining: capacity,
        }
    }

    /// Probing over windows of `window` consecutive slots; yielded
    /// positions are window base indices.
    pub(super) fn windowed(hash: u64, capacity: usize, window: usize) -> Self {
        let windows = capacity / window;

        Self {
            index: (hash % windows as u64) as usize * window,
            step: window,
            capacity,
            remaining: windows,
        }
    }

    pub(super) fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }

        self.remaining -= 1;
        let index = self.index;
        self.index = (self.index + self.step) % self.capacity;

        Some(index)
    }
}

impl<'t, K: Word, V: Word, const W: usize> View<'t, K, V, W> {
    pub(super) fn probe_loop<T, F: FnMut(usize) -> Action<T>>(
        &self,
        mut seq: ProbeSeq,
        mut f: F,
    ) -> Result<T> {
        while let Some(index) = seq.next() {
            loop {
                match f(index) {
                    Action::Advance => break,
                    Action::Retry => (),
                    Action::Return(value) => return Result::Returned(value),
                }
            }
        }

        Result::Exhausted
    }
}
