//! DHAT heap profiler for retirekit.
//!
//! Run with: cargo run --bin dhat_profile --release --features dhat-heap
//! View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use retirekit::builder::{CacheBuilder, Strategy};
use retirekit::traits::RetentionCache;

/// Simple XorShift64 RNG for deterministic workloads.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Order-book style churn: every key is inserted, read a few times, then
/// retired. Active population stays around `live`.
fn order_churn<C: RetentionCache<u64>>(cache: &mut C, operations: usize, live: usize, seed: u64) {
    let mut rng = XorShift64::new(seed);
    for i in 0..operations {
        cache.put_if_empty(format!("O-{}", i), i as u64);

        let probe = rng.next_u64() as usize % (i + 1);
        let _ = cache.get(&format!("O-{}", probe));

        if i >= live {
            let _ = cache.deactivate(&format!("O-{}", i - live));
        }
    }
}

/// Growth workload: insert without retiring so the table doubles repeatedly.
fn growth<C: RetentionCache<u64>>(cache: &mut C, operations: usize) {
    for i in 0..operations {
        cache.put_if_empty(format!("G-{}", i), i as u64);
    }
}

fn profile(strategy: Strategy) {
    println!("=== Profiling {} ===", strategy);
    let operations = 100_000;
    let live = 4096;

    let mut cache = CacheBuilder::new(live)
        .retention(1024)
        .build::<u64>(strategy);
    order_churn(&mut cache, operations, live, 42);
    println!(
        "  Churn: len={} capacity={} collisions={}",
        cache.len(),
        cache.capacity(),
        cache.collision_count()
    );

    let mut cache = CacheBuilder::new(16).retention(16).build::<u64>(strategy);
    growth(&mut cache, operations / 2);
    println!(
        "  Growth: len={} capacity={}",
        cache.len(),
        cache.capacity()
    );
}

fn main() {
    let _profiler = dhat::Profiler::new_heap();

    println!("retirekit DHAT Heap Profiling");
    println!("=============================\n");

    for strategy in Strategy::ALL {
        profile(strategy);
    }

    println!("\n=============================");
    println!("Profiling complete!");
    println!(
        "View results: Open dhat-heap.json in <https://nnethercote.github.io/dh_view/dh_view.html>"
    );
}
