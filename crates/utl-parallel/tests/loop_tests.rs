use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use utl_parallel::{Blocks, Grain, TaskError, ThreadPool};

/// One counter per index, so double or missed visits are visible.
fn visit_counts(n: usize) -> Arc<Vec<AtomicUsize>> {
    Arc::new((0..n).map(|_| AtomicUsize::new(0)).collect())
}

fn assert_each_visited_once(counts: &[AtomicUsize]) {
    for (i, c) in counts.iter().enumerate() {
        assert_eq!(c.load(Ordering::SeqCst), 1, "index {i}");
    }
}

// ============================================================================
// Blocks
// ============================================================================

#[test]
fn blocks_cover_range_contiguously() {
    let blocks = Blocks::new(5..22, 4);
    let ranges: Vec<Range<usize>> = blocks.iter().collect();
    assert_eq!(ranges, [5..10, 10..14, 14..18, 18..22]);
    assert_eq!(blocks.len(), 17);
    assert_eq!(blocks.num_blocks(), 4);
}

#[test]
fn blocks_even_split() {
    let ranges: Vec<_> = Blocks::new(0..12, 3).iter().collect();
    assert_eq!(ranges, [0..4, 4..8, 8..12]);
}

#[test]
fn more_blocks_than_indices() {
    let ranges: Vec<_> = Blocks::new(0..3, 10).iter().collect();
    assert_eq!(ranges, [0..1, 1..2, 2..3]);
}

#[test]
fn empty_range_has_no_blocks() {
    let blocks = Blocks::new(7..7, 4);
    assert!(blocks.is_empty());
    assert_eq!(blocks.num_blocks(), 0);
    assert_eq!(blocks.iter().count(), 0);
}

#[test]
fn zero_blocks_requested_means_one() {
    let ranges: Vec<_> = Blocks::new(0..5, 0).iter().collect();
    assert_eq!(ranges, [0..5]);
}

#[test]
#[should_panic(expected = "out of range")]
fn block_index_past_end_panics() {
    Blocks::new(0..5, 2).block(2);
}

#[test]
fn grain_block_counts() {
    assert_eq!(Grain::Auto.block_count(100, 4), 4);
    assert_eq!(Grain::Auto.block_count(100, 0), 1);
    assert_eq!(Grain::Size(10).block_count(100, 4), 10);
    assert_eq!(Grain::Size(30).block_count(100, 4), 4);
    assert_eq!(Grain::Size(0).block_count(3, 4), 3);
    assert_eq!(Grain::default(), Grain::Auto);
}

#[test]
fn grain_size_bounds_block_length() {
    let pool = ThreadPool::new(2);
    let blocks = pool.blocks(0..101, Grain::Size(7));
    assert!(blocks.iter().all(|b| b.len() <= 7));
    assert_eq!(blocks.iter().map(|b| b.len()).sum::<usize>(), 101);
}

// ============================================================================
// Index loops
// ============================================================================

#[test]
fn blocking_loop_visits_every_index_once() {
    let pool = ThreadPool::new(4);
    let counts = visit_counts(1009);
    let c = Arc::clone(&counts);
    pool.blocking_loop(0..1009, Grain::Auto, move |i| {
        c[i].fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();
    assert_each_visited_once(&counts);
}

#[test]
fn blocking_loop_with_offset_range_and_small_grain() {
    let pool = ThreadPool::new(3);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    pool.blocking_loop(10..50, Grain::Size(3), move |i| {
        s.lock().unwrap().push(i);
    })
    .unwrap();
    let mut seen = seen.lock().unwrap().clone();
    seen.sort_unstable();
    assert_eq!(seen, (10..50).collect::<Vec<_>>());
}

#[test]
fn detached_loop_then_wait() {
    let pool = ThreadPool::new(3);
    let counts = visit_counts(500);
    let c = Arc::clone(&counts);
    pool.detached_loop(0..500, Grain::Size(16), move |i| {
        c[i].fetch_add(1, Ordering::SeqCst);
    });
    pool.wait();
    assert_each_visited_once(&counts);
}

#[test]
fn awaitable_loop_returns_one_future_per_block() {
    let pool = ThreadPool::new(4);
    let counts = visit_counts(64);
    let c = Arc::clone(&counts);
    let mut futures = pool.awaitable_loop(0..64, Grain::Size(8), move |i| {
        c[i].fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(futures.len(), 8);
    futures.wait();
    assert_eq!(futures.ready_count(), 8);
    assert_eq!(futures.get().unwrap().len(), 8);
    assert_each_visited_once(&counts);
}

#[test]
fn empty_range_submits_nothing() {
    let pool = ThreadPool::new(2);
    let futures = pool.awaitable_loop(3..3, Grain::Auto, |_| panic!("never called"));
    assert!(futures.is_empty());
    pool.blocking_loop(0..0, Grain::Auto, |_| panic!("never called"))
        .unwrap();
}

#[test]
fn loop_on_zero_thread_pool_runs_inline() {
    let pool = ThreadPool::new(0);
    let counts = visit_counts(37);
    let c = Arc::clone(&counts);
    pool.blocking_loop(0..37, Grain::Auto, move |i| {
        c[i].fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();
    assert_each_visited_once(&counts);
}

#[test]
fn panic_in_loop_body_is_reported_after_all_blocks_finish() {
    let pool = ThreadPool::new(4);
    let counts = visit_counts(100);
    let c = Arc::clone(&counts);
    let result = pool.blocking_loop(0..100, Grain::Size(10), move |i| {
        c[i].fetch_add(1, Ordering::SeqCst);
        if i == 55 {
            panic!("index {i} failed");
        }
    });
    assert_eq!(result, Err(TaskError::Panicked("index 55 failed".into())));
    // Every other block still ran to completion.
    for (i, count) in counts.iter().enumerate() {
        if !(56..60).contains(&i) {
            assert_eq!(count.load(Ordering::SeqCst), 1, "index {i}");
        }
    }
}

// ============================================================================
// Block loops and map
// ============================================================================

#[test]
fn blocking_blocks_returns_results_in_block_order() {
    let pool = ThreadPool::new(4);
    let sums = pool
        .blocking_blocks(0..10, Grain::Size(3), |block| block.sum::<usize>())
        .unwrap();
    // Blocks: 0..3, 3..6, 6..8, 8..10
    assert_eq!(sums, [3, 12, 13, 17]);
}

#[test]
fn detached_blocks_see_whole_ranges() {
    let pool = ThreadPool::new(2);
    let ranges = Arc::new(Mutex::new(Vec::new()));
    let r = Arc::clone(&ranges);
    pool.detached_blocks(0..9, Grain::Size(4), move |block| {
        r.lock().unwrap().push(block);
    });
    pool.wait();
    let mut ranges = ranges.lock().unwrap().clone();
    ranges.sort_by_key(|r| r.start);
    assert_eq!(ranges, [0..3, 3..6, 6..9]);
}

#[test]
fn blocking_map_preserves_input_order() {
    let pool = ThreadPool::new(3);
    let words: Vec<String> = ["alpha", "be", "gamma", "", "delta"]
        .into_iter()
        .map(String::from)
        .collect();
    let lengths = pool.blocking_map(words, Grain::Size(2), |w| w.len()).unwrap();
    assert_eq!(lengths, [5, 2, 5, 0, 5]);
}

#[test]
fn nested_blocking_loop_inside_task_does_not_deadlock() {
    let pool = Arc::new(ThreadPool::new(1));
    let p = Arc::clone(&pool);
    let total = pool
        .awaitable_task(move || {
            p.blocking_reduce(0..100, Grain::Size(10), |i| i, |a, b| a + b)
        })
        .get()
        .unwrap()
        .unwrap();
    assert_eq!(total, Some(4950));
}
