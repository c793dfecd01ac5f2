#![no_main]

use std::collections::{HashSet, VecDeque};

use libfuzzer_sys::fuzz_target;
use retirekit::builder::{Cache, CacheBuilder, Strategy};
use retirekit::hash::HashFunction;

// Fuzz the put/deactivate/get lifecycle on every strategy
//
// Keys come from a small alphabet so duplicates, double deactivates and
// evictions all happen often. A two-bucket hash is mixed in to force long
// clusters.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let strategy = Strategy::ALL[usize::from(data[0]) % Strategy::ALL.len()];
    let retention = 1usize << (data[1] % 4);
    let load_factor = [50, 75, 100][usize::from(data[1] >> 4) % 3];

    let builder = CacheBuilder::new(16)
        .retention(retention)
        .load_factor(load_factor);
    if data[1] & 0x04 != 0 {
        let cache = builder
            .hasher(|key: &[u8]| i32::from(key.first().copied().unwrap_or(0) & 0x1))
            .build::<u8>(strategy);
        drive(cache, retention, &data[2..]);
    } else {
        drive(builder.build::<u8>(strategy), retention, &data[2..]);
    }
});

fn drive<H: HashFunction>(mut cache: Cache<u8, H>, retention: usize, ops: &[u8]) {
    let mut resident: HashSet<u8> = HashSet::new();
    let mut active: HashSet<u8> = HashSet::new();
    let mut inactive: VecDeque<u8> = VecDeque::new();

    for pair in ops.chunks_exact(2) {
        let id = pair[1] % 64;
        let key = [id, b'k'];

        match pair[0] % 3 {
            0 => {
                // put_if_empty
                let inserted = cache.put_if_empty(&key[..], id);
                assert_eq!(inserted, !resident.contains(&id));
                if inserted {
                    resident.insert(id);
                    active.insert(id);
                }
            },
            1 => {
                // deactivate
                let result = cache.deactivate(&key[..]);
                if active.remove(&id) {
                    assert!(result.is_ok());
                    inactive.push_back(id);
                    if inactive.len() > retention {
                        if let Some(evicted) = inactive.pop_front() {
                            resident.remove(&evicted);
                        }
                    }
                } else {
                    assert!(result.is_err());
                }
            },
            _ => {
                // get
                let got = cache.get(&key[..]).map(|e| *e.value());
                assert_eq!(got, resident.contains(&id).then_some(id));
            },
        }

        assert_eq!(cache.len(), resident.len());
        assert_eq!(cache.inactive_len(), inactive.len());
        if let Err(err) = cache.check_invariants() {
            panic!("{}", err);
        }
    }
}
