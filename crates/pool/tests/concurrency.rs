//! Concurrent use of shared pools.
//!
//! Every pooled object carries an exclusive-use marker that is set on
//! checkout and cleared before return. Observing the marker already set
//! means the pool handed one instance to two callers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use nebula_pool::{FixedPool, PoolConfig, Poolable, SizedPool};

struct Marked {
    in_use: Arc<AtomicBool>,
}

impl Poolable for Marked {
    fn reset(&mut self) {}
}

fn checkout(marked: &Marked, conflicts: &AtomicUsize) {
    if marked.in_use.swap(true, Ordering::AcqRel) {
        conflicts.fetch_add(1, Ordering::Relaxed);
    }
}

fn release(marked: &Marked) {
    marked.in_use.store(false, Ordering::Release);
}

#[test]
fn fixed_pool_never_shares_an_instance() {
    const ITERATIONS: usize = 10_000;

    let pool = Arc::new(FixedPool::new(|| Marked {
        in_use: Arc::new(AtomicBool::new(false)),
    }));
    let conflicts = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let pool = Arc::clone(&pool);
            let conflicts = Arc::clone(&conflicts);
            thread::spawn(move || {
                for _ in 0..ITERATIONS {
                    let marked = pool.allocate();
                    checkout(&marked, &conflicts);
                    thread::yield_now();
                    release(&marked);
                    pool.free(marked);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(conflicts.load(Ordering::Relaxed), 0);
    let stats = pool.stats();
    assert_eq!(stats.allocations, 2 * ITERATIONS as u64);
    assert_eq!(stats.frees, 2 * ITERATIONS as u64);
    // At most one instance per thread was ever needed
    assert!(stats.creations <= 2);
}

#[test]
fn bounded_pool_under_contention() {
    let pool = Arc::new(
        FixedPool::with_config(PoolConfig::bounded(2), || Marked {
            in_use: Arc::new(AtomicBool::new(false)),
        })
        .unwrap(),
    );
    let conflicts = Arc::new(AtomicUsize::new(0));

    thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..1_000 {
                    let marked = pool.get();
                    checkout(&marked, &conflicts);
                    release(&marked);
                }
            });
        }
    });

    assert_eq!(conflicts.load(Ordering::Relaxed), 0);
    assert!(pool.size() <= 2);
}

#[test]
fn sized_pool_keeps_order_under_contention() {
    let pool = SizedPool::<Vec<u8>>::with_config(PoolConfig::unbounded()).unwrap();

    thread::scope(|scope| {
        for worker in 0..4_usize {
            let pool = &pool;
            scope.spawn(move || {
                for i in 0..2_000_usize {
                    let size = (worker * 997 + i * 31) % 9000;
                    let mut buf = pool.allocate(size);
                    assert!(buf.capacity() >= size);
                    assert!(buf.is_empty());
                    buf.push(1);
                    pool.free(buf);
                }
            });
        }
    });

    let lengths = pool.pooled_lengths();
    assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
    assert!(!lengths.is_empty());
}
