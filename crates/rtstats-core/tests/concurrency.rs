#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Barrier};
use std::thread;

use rtstats_core::{RuntimeStats, RuntimeUnit};

const THREADS: usize = 16;
const ADDS_PER_THREAD: i64 = 5_000;

#[test]
fn racing_first_writers_share_one_accumulator() {
    for _ in 0..20 {
        let stats = RuntimeStats::new();
        let barrier = Barrier::new(THREADS);
        let seen: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        stats.add_metric_value("race", RuntimeUnit::None, 1);
                        stats.get_metric("race").unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winner = stats.get_metric("race").unwrap();
        assert!(seen.iter().all(|m| Arc::ptr_eq(m, &winner)));
        assert_eq!(winner.count(), THREADS as i64);
        assert_eq!(winner.sum(), THREADS as i64);
    }
}

#[test]
fn no_lost_updates_on_same_name() {
    let stats = RuntimeStats::new();
    thread::scope(|s| {
        for t in 0..THREADS as i64 {
            let stats = &stats;
            s.spawn(move || {
                for i in 0..ADDS_PER_THREAD {
                    stats.add_metric_value("rows", RuntimeUnit::None, t * ADDS_PER_THREAD + i);
                }
            });
        }
    });

    let n = THREADS as i64 * ADDS_PER_THREAD;
    let m = stats.get_metric("rows").unwrap();
    assert_eq!(m.count(), n);
    assert_eq!(m.sum(), n * (n - 1) / 2);
    assert_eq!(m.min(), 0);
    assert_eq!(m.max(), n - 1);
}

#[test]
fn distinct_names_are_independent() {
    let stats = RuntimeStats::new();
    thread::scope(|s| {
        for t in 0..THREADS {
            let stats = &stats;
            s.spawn(move || {
                let name = format!("op{t}");
                for _ in 0..ADDS_PER_THREAD {
                    stats.add_metric_value(&name, RuntimeUnit::Byte, 2);
                }
            });
        }
    });

    assert_eq!(stats.len(), THREADS);
    for t in 0..THREADS {
        let m = stats.get_metric(&format!("op{t}")).unwrap();
        assert_eq!(m.sum(), 2 * ADDS_PER_THREAD);
    }
}

#[test]
fn snapshot_and_copy_while_writing() {
    let stats = RuntimeStats::new();
    let barrier = Barrier::new(THREADS + 1);
    thread::scope(|s| {
        for t in 0..THREADS {
            let (stats, barrier) = (&stats, &barrier);
            s.spawn(move || {
                barrier.wait();
                for i in 0..ADDS_PER_THREAD {
                    stats.add_metric_value(&format!("m{}", (t as i64 + i) % 64), RuntimeUnit::None, 1);
                }
            });
        }

        barrier.wait();
        let mut last_total = 0;
        for _ in 0..200 {
            let copy = RuntimeStats::copy_of(&stats);
            let total: i64 = copy.snapshot().values().map(|m| m.count()).sum();
            assert!(total >= last_total);
            assert!(total <= THREADS as i64 * ADDS_PER_THREAD);
            last_total = total;
        }
    });

    let total: i64 = stats.snapshot().values().map(|m| m.count()).sum();
    assert_eq!(total, THREADS as i64 * ADDS_PER_THREAD);
}

#[test]
fn concurrent_merges_into_shared_target() {
    let target = RuntimeStats::new();
    let part = RuntimeStats::new();
    part.add_metric_value("rows", RuntimeUnit::None, 10);
    part.add_metric_value("bytes", RuntimeUnit::Byte, 100);

    thread::scope(|s| {
        for _ in 0..THREADS {
            let (target, part) = (&target, &part);
            s.spawn(move || {
                for _ in 0..100 {
                    target.merge_with(Some(part));
                    target.add_metric_value("rows", RuntimeUnit::None, 1);
                }
            });
        }
    });

    let rows = target.get_metric("rows").unwrap();
    assert_eq!(rows.sum(), THREADS as i64 * 100 * 11);
    assert_eq!(rows.count(), THREADS as i64 * 100 * 2);
    assert_eq!(target.get_metric("bytes").unwrap().sum(), THREADS as i64 * 100 * 100);
}

#[test]
fn merging_into_itself_doubles() {
    let stats = RuntimeStats::new();
    stats.add_metric_value("x", RuntimeUnit::None, 4);
    stats.merge_with(Some(&stats));
    assert_eq!(stats.get_metric("x").unwrap().sum(), 8);
}
