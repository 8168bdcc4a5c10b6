use cmm::{Error, MultiMap};

use std::sync::Arc;
use std::thread;

fn main() {
    const NUM_THREADS: usize = 16;
    const NUM_KEYS: u64 = 64;
    const CAPACITY: usize = 1 << 20;
    const BATCH: u64 = 4096;

    let map = Arc::new(MultiMap::<u64, u64>::with_capacity(CAPACITY, u64::MAX, u64::MAX).unwrap());

    let threads: Vec<_> = (0..NUM_THREADS as u64)
        .map(|i| {
            let map = map.clone();

            thread::spawn(move || {
                let pairs: Vec<_> = (0..BATCH).map(|j| (j % NUM_KEYS, i * BATCH + j)).collect();

                loop {
                    match map.insert(&pairs) {
                        Ok(()) => (),
                        Err(Error::CapacityExceeded) => break,
                        Err(e) => panic!("insert failed: {}", e),
                    }
                }
            })
        })
        .collect();

    for result in threads.into_iter().map(|t| t.join()) {
        assert!(result.is_ok());
    }

    let keys: Vec<_> = (0..NUM_KEYS).collect();
    let stored = map.count(&keys);

    assert!(stored <= map.capacity());
    println!("saturated: {} pairs stored in {} slots", stored, map.capacity());
}
