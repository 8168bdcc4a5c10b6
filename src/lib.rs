// MIT License
//
// Copyright (c) 2019 Gregory Meyer
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

//! Lockfree fixed-capacity concurrent multimap.
//!
//! A key may be stored any number of times. The table is sized once, at
//! construction, and never rehashes, never overwrites and never deletes:
//! an insert claims an empty slot with an atomic compare-exchange on the
//! slot's key word, and the slot keeps that pair for the table's lifetime.
//! Emptiness is encoded by caller-supplied sentinel bit patterns, so both
//! words of a slot stay plain atomics and every access is a single relaxed
//! load, store or compare-exchange. No locks anywhere, on any path.
//!
//! Batches of keys are processed by groups of `W` cooperating lanes that
//! examine `W` consecutive slots per probe step, ballot their findings and
//! elect one lane to act, which keeps probe chains short where a slot-at-
//! a-time scan would crawl.

pub mod error;
pub mod multimap;

mod common;

pub use common::table::{Matches, MutView, View, WindowedMatches};
pub use common::word::Word;
pub use error::Error;
pub use multimap::MultiMap;

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::thread::{self, JoinHandle};

    const EMPTY: u64 = u64::MAX;

    #[test]
    fn multimap_insertion() {
        let map = MultiMap::<u64, u64>::with_capacity(64, EMPTY, EMPTY).unwrap();

        map.insert(&[(1, 10), (2, 20), (1, 11)]).unwrap();

        let mut values = [0; 3];
        map.find(&[1, 2, 3], &mut values);
        assert!(values[0] == 10 || values[0] == 11);
        assert_eq!(values[1], 20);
        assert_eq!(values[2], EMPTY);

        let mut present = [false; 3];
        map.contains(&[1, 2, 3], &mut present);
        assert_eq!(present, [true, true, false]);

        assert_eq!(map.count(&[1, 2, 3]), 3);
    }

    #[test]
    fn multimap_duplicates() {
        let map = MultiMap::<u64, u64>::with_capacity(64, EMPTY, EMPTY).unwrap();

        map.insert(&[(7, 1), (7, 2), (7, 3), (7, 4)]).unwrap();

        assert_eq!(map.count(&[7]), 4);

        let mut pairs = vec![(0, 0); 4];
        assert_eq!(map.find_all(&[7], &mut pairs), 4);

        let mut values: Vec<_> = pairs.iter().map(|&(_, v)| v).collect();
        values.sort_unstable();
        assert_eq!(values, [1, 2, 3, 4]);
    }

    #[test]
    fn multimap_saturation() {
        let map = MultiMap::<u64, u64>::with_capacity(4, EMPTY, EMPTY).unwrap();

        assert_eq!(map.capacity(), 4);
        map.insert(&[(1, 1), (2, 2), (3, 3), (4, 4)]).unwrap();

        assert_eq!(map.insert(&[(5, 5)]), Err(Error::CapacityExceeded));
        assert_eq!(map.count(&[1, 2, 3, 4]), 4);
    }

    #[test]
    fn multimap_concurrent_bulk_insertion() {
        const NUM_THREADS: usize = 8;
        const PAIRS_PER_THREAD: u64 = 512;

        let map = Arc::new(
            MultiMap::<u64, u64>::with_capacity(4 * NUM_THREADS * PAIRS_PER_THREAD as usize, EMPTY, EMPTY)
                .unwrap(),
        );

        let threads: Vec<_> = (0..NUM_THREADS as u64)
            .map(|i| {
                let map = map.clone();

                thread::spawn(move || {
                    let pairs: Vec<_> = (0..PAIRS_PER_THREAD)
                        .map(|j| (i * PAIRS_PER_THREAD + j, j))
                        .collect();

                    map.insert(&pairs).unwrap();
                })
            })
            .collect();

        for result in threads.into_iter().map(JoinHandle::join) {
            assert!(result.is_ok());
        }

        let keys: Vec<_> = (0..NUM_THREADS as u64 * PAIRS_PER_THREAD).collect();
        assert_eq!(map.count(&keys), keys.len());

        let mut present = vec![false; keys.len()];
        map.contains(&keys, &mut present);
        assert!(present.iter().all(|&p| p));
    }
}
