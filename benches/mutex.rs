use std::hash::{BuildHasher, Hash};

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use fxhash::FxBuildHasher;
use hashbrown::HashMap;
use parking_lot::RwLock;
use rand::{rngs::StdRng, Rng, SeedableRng};

struct LockedMultiMap<K: Hash + Eq, V, S: BuildHasher> {
    map: RwLock<HashMap<K, Vec<V>, S>>,
}

impl<K: Hash + Eq, V> LockedMultiMap<K, V, FxBuildHasher> {
    fn new() -> LockedMultiMap<K, V, FxBuildHasher> {
        LockedMultiMap {
            map: RwLock::new(HashMap::with_hasher(FxBuildHasher::default())),
        }
    }
}

impl<K: Hash + Eq + Copy, V: Copy, S: BuildHasher> LockedMultiMap<K, V, S> {
    fn insert(&self, pairs: &[(K, V)]) {
        let mut guard = self.map.write();

        for &(key, value) in pairs {
            guard.entry(key).or_insert_with(Vec::new).push(value);
        }
    }

    fn find(&self, keys: &[K], out: &mut [Option<V>]) {
        let guard = self.map.read();

        for (key, out) in keys.iter().zip(out.iter_mut()) {
            *out = guard.get(key).and_then(|values| values.first().copied());
        }
    }

    fn count(&self, keys: &[K]) -> usize {
        let guard = self.map.read();

        keys.iter()
            .map(|key| guard.get(key).map_or(0, Vec::len))
            .sum()
    }
}

fn random_pairs(numel: usize, distinct_keys: u64) -> Vec<(u64, u64)> {
    let mut rng = StdRng::seed_from_u64(0x9e37_79b9_7f4a_7c15);

    (0..numel)
        .map(|_| (rng.gen_range(0..distinct_keys), rng.gen_range(0..1 << 32)))
        .collect()
}

fn bench_bulk_insert(c: &mut Criterion) {
    c.bench_function_over_inputs(
        "hashbrown/parking_lot: bulk insert",
        |b, &&numel| {
            let pairs = random_pairs(numel, numel as u64 / 4);

            b.iter_batched(
                LockedMultiMap::new,
                |map| map.insert(&pairs),
                BatchSize::LargeInput,
            )
        },
        [1024, 16384, 262144].iter(),
    );
}

fn bench_bulk_find(c: &mut Criterion) {
    c.bench_function_over_inputs(
        "hashbrown/parking_lot: bulk find",
        |b, &&numel| {
            let pairs = random_pairs(numel, numel as u64 / 4);
            let map = LockedMultiMap::new();
            map.insert(&pairs);

            let keys: Vec<_> = pairs.iter().map(|&(k, _)| k).collect();
            let mut out = vec![None; keys.len()];

            b.iter(|| map.find(criterion::black_box(&keys), &mut out))
        },
        [1024, 16384, 262144].iter(),
    );
}

fn bench_bulk_count(c: &mut Criterion) {
    c.bench_function_over_inputs(
        "hashbrown/parking_lot: bulk count",
        |b, &&numel| {
            let pairs = random_pairs(numel, numel as u64 / 4);
            let map = LockedMultiMap::new();
            map.insert(&pairs);

            let mut keys: Vec<_> = pairs.iter().map(|&(k, _)| k).collect();
            keys.sort_unstable();
            keys.dedup();

            b.iter(|| map.count(criterion::black_box(&keys)))
        },
        [1024, 16384, 262144].iter(),
    );
}

criterion_group!(benches, bench_bulk_insert, bench_bulk_find, bench_bulk_count);
criterion_main!(benches);
