// ==============================================
// MODEL-BASED FUZZ (integration)
// ==============================================
//
// Seeded random operation streams replayed against every strategy and an
// oracle built from std collections: the set of resident keys, the set of
// active keys, and a bounded FIFO of inactive keys. After every step the
// cache must agree with the oracle.

use std::collections::{HashMap, HashSet, VecDeque};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use retirekit::builder::{Cache, CacheBuilder, Strategy};
use retirekit::hash::{HashFunction, MetroHash64};

const OPS: usize = 10_000;
const PARAMS: [(usize, usize); 8] = [
    (1, 200),
    (1, 666),
    (2, 200),
    (2, 666),
    (4, 200),
    (4, 666),
    (32, 200),
    (32, 666),
];

#[derive(Debug, Clone, Copy)]
enum Action {
    Put,
    Deactivate,
    Get,
    Check,
}

impl Action {
    fn from_roll(roll: u32) -> Self {
        match roll {
            0..45 => Action::Put,
            45..75 => Action::Deactivate,
            75..95 => Action::Get,
            _ => Action::Check,
        }
    }
}

#[derive(Default)]
struct Oracle {
    resident: HashMap<String, usize>,
    active: HashSet<String>,
    inactive: VecDeque<String>,
}

fn key(i: usize) -> String {
    format!("E-{}", i)
}

fn check_agreement<H: HashFunction>(
    cache: &Cache<usize, H>,
    oracle: &Oracle,
    total: usize,
    context: &str,
) {
    assert_eq!(cache.len(), oracle.resident.len(), "{context}: len");
    assert_eq!(cache.inactive_len(), oracle.inactive.len(), "{context}: inactive_len");

    for i in 0..total {
        let k = key(i);
        match oracle.resident.get(&k) {
            Some(value) => {
                let entry = cache
                    .get(&k)
                    .unwrap_or_else(|| panic!("{context}: missing {k}"));
                assert_eq!(entry.key(), k.as_str(), "{context}");
                assert_eq!(entry.value(), value, "{context}: value of {k}");
                assert_eq!(entry.is_active(), oracle.active.contains(&k), "{context}: state of {k}");
            },
            None => assert!(cache.get(&k).is_none(), "{context}: {k} should be absent"),
        }
    }

    if let Err(err) = cache.check_invariants() {
        panic!("{context}: {err}");
    }
}

fn run<H: HashFunction>(
    mut cache: Cache<usize, H>,
    max_inactive: usize,
    total: usize,
    seed: u64,
) {
    let strategy = cache.strategy();
    let context = format!("{strategy} [maxInactive={max_inactive}, total={total}]");
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut oracle = Oracle::default();

    for op in 0..OPS {
        let index = rng.gen_range(0..total);
        let k = key(index);

        match Action::from_roll(rng.gen_range(0..100)) {
            Action::Put => {
                let existed = oracle.resident.contains_key(&k);
                let inserted = cache.put_if_empty(k.as_str(), index);
                assert_eq!(inserted, !existed, "{context} op {op}: put {k}");
                if inserted {
                    oracle.resident.insert(k.clone(), index);
                    oracle.active.insert(k);
                }
            },
            Action::Deactivate => {
                let result = cache.deactivate(&k);
                if oracle.active.remove(&k) {
                    assert!(result.is_ok(), "{context} op {op}: deactivate {k}");
                    oracle.inactive.push_back(k);
                    while oracle.inactive.len() > max_inactive {
                        if let Some(evicted) = oracle.inactive.pop_front() {
                            oracle.resident.remove(&evicted);
                        }
                    }
                } else {
                    assert!(result.is_err(), "{context} op {op}: deactivate {k} must fail");
                }
            },
            Action::Get => {
                let got = cache.get(&k).map(|e| *e.value());
                assert_eq!(got, oracle.resident.get(&k).copied(), "{context} op {op}: get {k}");
            },
            Action::Check => check_agreement(&cache, &oracle, total, &context),
        }
    }

    check_agreement(&cache, &oracle, total, &context);
}

fn seed_for(max_inactive: usize) -> u64 {
    0xC0FFEE_5EED + max_inactive as u64
}

// ==============================================
// Polynomial hash, default load factor
// ==============================================

mod default_configuration {
    use super::*;

    fn fuzz(strategy: Strategy) {
        for (max_inactive, total) in PARAMS {
            let cache = CacheBuilder::new(16)
                .retention(max_inactive)
                .build::<usize>(strategy);
            run(cache, max_inactive, total, seed_for(max_inactive));
        }
    }

    #[test]
    fn chaining() {
        fuzz(Strategy::Chaining);
    }

    #[test]
    fn linear_probing() {
        fuzz(Strategy::LinearProbing);
    }

    #[test]
    fn robin_hood() {
        fuzz(Strategy::RobinHood);
    }
}

// ==============================================
// Full-load probing and alternate hashes
// ==============================================

mod stressed_configuration {
    use super::*;

    #[test]
    fn probing_tables_at_full_load() {
        for strategy in [Strategy::LinearProbing, Strategy::RobinHood] {
            // A full table makes every miss scan all slots; keep the key space small.
            for (max_inactive, total) in PARAMS.into_iter().filter(|(_, total)| *total == 200) {
                let cache = CacheBuilder::new(16)
                    .retention(max_inactive)
                    .load_factor(100)
                    .build::<usize>(strategy);
                run(cache, max_inactive, total, seed_for(max_inactive) ^ 0x100);
            }
        }
    }

    #[test]
    fn metro_hash_all_strategies() {
        for strategy in Strategy::ALL {
            for (max_inactive, total) in PARAMS {
                let cache = CacheBuilder::new(16)
                    .retention(max_inactive)
                    .hasher(MetroHash64)
                    .build::<usize>(strategy);
                run(cache, max_inactive, total, seed_for(max_inactive));
            }
        }
    }

    #[test]
    fn clustered_hash_all_strategies() {
        for strategy in Strategy::ALL {
            let cache = CacheBuilder::new(16)
                .retention(4)
                .hasher(|key: &[u8]| key.last().map_or(0, |b| i32::from(*b & 0x3)))
                .build::<usize>(strategy);
            run(cache, 4, 200, seed_for(4) ^ 0x200);
        }
    }
}
