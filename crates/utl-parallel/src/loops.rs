//! Parallel loops and reductions built on [`ThreadPool`] tasks.
//!
//! Every primitive splits its range with [`Blocks`] and submits one task per
//! block. The `blocks` variants hand each task a whole `Range<usize>`; the
//! `loop` variants call the closure once per index. `detached_*` return at once,
//! `awaitable_*` return futures, `blocking_*` wait and return the results.
//!
//! Called from one of the pool's own workers, the blocking variants run every
//! block on the calling thread instead of waiting on tasks that might need that
//! very worker to make progress.

use std::ops::Range;
use std::sync::Arc;

use crate::blocks::{Blocks, Grain};
use crate::error::{panic_message, Result, TaskError};
use crate::future::{MultiFuture, ReduceFuture};
use crate::pool::ThreadPool;

impl ThreadPool {
    /// The partition a loop over `range` with `grain` would use on this pool.
    pub fn blocks(&self, range: Range<usize>, grain: Grain) -> Blocks {
        let count = grain.block_count(range.len(), self.thread_count());
        Blocks::new(range, count)
    }

    pub fn detached_blocks<F>(&self, range: Range<usize>, grain: Grain, f: F)
    where
        F: Fn(Range<usize>) + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        for block in self.blocks(range, grain).iter() {
            let f = Arc::clone(&f);
            self.detached_task(move || f(block));
        }
    }

    pub fn awaitable_blocks<F, R>(&self, range: Range<usize>, grain: Grain, f: F) -> MultiFuture<R>
    where
        F: Fn(Range<usize>) -> R + Send + Sync + 'static,
        R: Send + 'static,
    {
        let f = Arc::new(f);
        self.blocks(range, grain)
            .iter()
            .map(|block| {
                let f = Arc::clone(&f);
                self.awaitable_task(move || f(block))
            })
            .collect()
    }

    /// Run `f` over every block and return the per-block results in block order.
    pub fn blocking_blocks<F, R>(&self, range: Range<usize>, grain: Grain, f: F) -> Result<Vec<R>>
    where
        F: Fn(Range<usize>) -> R + Send + Sync + 'static,
        R: Send + 'static,
    {
        if self.is_worker_thread() {
            return self.blocks(range, grain).iter().map(|b| run_inline(&f, b)).collect();
        }
        self.awaitable_blocks(range, grain, f).get()
    }

    pub fn detached_loop<F>(&self, range: Range<usize>, grain: Grain, f: F)
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.detached_blocks(range, grain, move |block| block.for_each(&f));
    }

    pub fn awaitable_loop<F>(&self, range: Range<usize>, grain: Grain, f: F) -> MultiFuture<()>
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.awaitable_blocks(range, grain, move |block| block.for_each(&f))
    }

    /// Call `f(i)` for every `i` in `range` and wait for all calls to finish.
    ///
    /// ```
    /// use std::sync::atomic::{AtomicU64, Ordering};
    /// use std::sync::Arc;
    /// use utl_parallel::{Grain, ThreadPool};
    ///
    /// let pool = ThreadPool::new(3);
    /// let sum = Arc::new(AtomicU64::new(0));
    /// let s = Arc::clone(&sum);
    /// pool.blocking_loop(0..1000, Grain::Auto, move |i| {
    ///     s.fetch_add(i as u64, Ordering::Relaxed);
    /// })
    /// .unwrap();
    /// assert_eq!(sum.load(Ordering::Relaxed), 499_500);
    /// ```
    pub fn blocking_loop<F>(&self, range: Range<usize>, grain: Grain, f: F) -> Result<()>
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.blocking_blocks(range, grain, move |block| block.for_each(&f))
            .map(drop)
    }

    /// Apply `f` to every element of `items` in parallel, returning the outputs
    /// in input order.
    pub fn blocking_map<T, R, F>(&self, items: Vec<T>, grain: Grain, f: F) -> Result<Vec<R>>
    where
        T: Send + Sync + 'static,
        R: Send + 'static,
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        let items: Arc<[T]> = items.into();
        let len = items.len();
        let chunks = self.blocking_blocks(0..len, grain, move |block| {
            items[block].iter().map(&f).collect::<Vec<R>>()
        })?;
        Ok(chunks.into_iter().flatten().collect())
    }

    /// Reduce `map(i)` over `range` with `op`, one partial fold per block.
    ///
    /// Partials are combined serially in block order when the future is read.
    /// `op` must be associative; a non-commutative `op` still sees operands in
    /// index order, so the result does not depend on the partition.
    pub fn awaitable_reduce<T, M, O>(
        &self,
        range: Range<usize>,
        grain: Grain,
        map: M,
        op: O,
    ) -> ReduceFuture<T>
    where
        T: Send + 'static,
        M: Fn(usize) -> T + Send + Sync + 'static,
        O: Fn(T, T) -> T + Send + Sync + 'static,
    {
        let op: Arc<dyn Fn(T, T) -> T + Send + Sync> = Arc::new(op);
        let block_op = Arc::clone(&op);
        let partials = self.awaitable_blocks(range, grain, move |block| {
            block.map(&map).reduce(|acc, item| block_op(acc, item))
        });
        ReduceFuture::new(partials, op)
    }

    /// Blocking form of [`awaitable_reduce`](Self::awaitable_reduce). An empty
    /// range reduces to `None`.
    ///
    /// ```
    /// use utl_parallel::{Grain, ThreadPool};
    ///
    /// let pool = ThreadPool::new(4);
    /// let max = pool
    ///     .blocking_reduce(0..997, Grain::Auto, |i| (i * 7919) % 997, usize::max)
    ///     .unwrap();
    /// assert_eq!(max, Some(996));
    /// ```
    pub fn blocking_reduce<T, M, O>(
        &self,
        range: Range<usize>,
        grain: Grain,
        map: M,
        op: O,
    ) -> Result<Option<T>>
    where
        T: Send + 'static,
        M: Fn(usize) -> T + Send + Sync + 'static,
        O: Fn(T, T) -> T + Send + Sync + 'static,
    {
        if self.is_worker_thread() {
            let partials = self
                .blocks(range, grain)
                .iter()
                .map(|b| run_inline(&|block: Range<usize>| block.map(&map).reduce(&op), b))
                .collect::<Result<Vec<_>>>()?;
            return Ok(partials.into_iter().flatten().reduce(&op));
        }
        self.awaitable_reduce(range, grain, map, op).get()
    }
}

/// Run one block on the calling thread with the same panic reporting as a task.
fn run_inline<F, R>(f: &F, block: Range<usize>) -> Result<R>
where
    F: Fn(Range<usize>) -> R,
{
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(block)))
        .map_err(|payload| TaskError::Panicked(panic_message(payload.as_ref())))
}
