//! The thread pool: a shared task queue served by a resizable set of workers.
//!
//! # Locking
//!
//! Two locks guard a pool. The configuration lock (`workers`) owns the worker
//! join handles and is held for the whole of a resize, so concurrent resizes run
//! one after another. The queue lock (`Shared::state`) guards the task queue and
//! the counters. Submission and consumption take only the queue lock. When both
//! are needed the configuration lock is always taken first.
//!
//! # Lifecycle
//!
//! Workers exit only when the pool is stopping *and* the queue is empty, checked
//! under the queue lock, so every queued task runs before its worker leaves. A
//! pool with no live workers runs submitted tasks on the submitting thread.

use std::collections::VecDeque;
use std::fmt;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use crate::error::panic_message;
use crate::future::TaskFuture;
use crate::this_thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

static NEXT_POOL_ID: AtomicUsize = AtomicUsize::new(1);

/// Process-unique identifier of a [`ThreadPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(usize);

impl PoolId {
    fn next() -> Self {
        PoolId(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool-{}", self.0)
    }
}

struct QueueState {
    tasks: VecDeque<Job>,
    /// Tasks currently executing, on workers or inline.
    running: usize,
    /// Workers that have been spawned and have not yet exited.
    live_workers: usize,
    stopping: bool,
    thread_count: usize,
}

struct Shared {
    id: PoolId,
    state: Mutex<QueueState>,
    task_available: Condvar,
    tasks_done: Condvar,
    detached_panics: AtomicUsize,
}

impl Shared {
    // Tasks never run while the queue lock is held, so a poisoned lock still
    // holds consistent state.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one job, containing any panic that escapes it.
    ///
    /// Awaitable jobs catch their own panics and hand them to the future, so
    /// whatever reaches this point came from a detached task.
    fn execute(&self, job: Job, worker: Option<usize>) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
            self.detached_panics.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                target: "utl::pool",
                pool = %self.id,
                worker = ?worker,
                message = %panic_message(payload.as_ref()),
                "detached task panicked"
            );
        }
    }

    fn finish_one(&self) {
        let mut state = self.lock();
        state.running -= 1;
        if state.running == 0 && state.tasks.is_empty() {
            self.tasks_done.notify_all();
        }
    }

    fn next_job(&self) -> Option<Job> {
        let mut state = self.lock();
        loop {
            if let Some(job) = state.tasks.pop_front() {
                state.running += 1;
                return Some(job);
            }
            if state.stopping {
                state.live_workers -= 1;
                return None;
            }
            state = self
                .task_available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

fn worker_loop(shared: Arc<Shared>, index: usize) {
    this_thread::set_worker(Some((shared.id, index)));
    tracing::debug!(target: "utl::pool", pool = %shared.id, worker = index, "worker started");
    while let Some(job) = shared.next_job() {
        shared.execute(job, Some(index));
        shared.finish_one();
    }
    tracing::debug!(target: "utl::pool", pool = %shared.id, worker = index, "worker exiting");
    this_thread::set_worker(None);
}

/// A pool of worker threads consuming a shared FIFO task queue.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use utl_parallel::ThreadPool;
///
/// let pool = ThreadPool::new(4);
/// let counter = Arc::new(AtomicUsize::new(0));
/// for _ in 0..100 {
///     let counter = Arc::clone(&counter);
///     pool.detached_task(move || {
///         counter.fetch_add(1, Ordering::Relaxed);
///     });
/// }
/// pool.wait();
/// assert_eq!(counter.load(Ordering::Relaxed), 100);
///
/// let answer = pool.awaitable_task(|| 6 * 7);
/// assert_eq!(answer.get().unwrap(), 42);
/// ```
pub struct ThreadPool {
    shared: Arc<Shared>,
    /// Configuration lock; see the module docs for the lock order.
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPool {
    /// Create a pool with `threads` workers. Zero is allowed; tasks then run on
    /// the submitting thread.
    pub fn new(threads: usize) -> Self {
        let shared = Arc::new(Shared {
            id: PoolId::next(),
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                running: 0,
                live_workers: 0,
                stopping: false,
                thread_count: 0,
            }),
            task_available: Condvar::new(),
            tasks_done: Condvar::new(),
            detached_panics: AtomicUsize::new(0),
        });
        let pool = ThreadPool {
            shared,
            workers: Mutex::new(Vec::new()),
        };
        pool.set_thread_count(threads);
        pool
    }

    pub fn id(&self) -> PoolId {
        self.shared.id
    }

    /// Number of workers started by the last resize.
    pub fn thread_count(&self) -> usize {
        self.shared.lock().thread_count
    }

    /// Tasks waiting in the queue.
    pub fn tasks_queued(&self) -> usize {
        self.shared.lock().tasks.len()
    }

    /// Tasks currently executing.
    pub fn tasks_running(&self) -> usize {
        self.shared.lock().running
    }

    /// Queued plus running tasks.
    pub fn tasks_total(&self) -> usize {
        let state = self.shared.lock();
        state.tasks.len() + state.running
    }

    /// Number of detached tasks that panicked since the pool was created.
    pub fn detached_panics(&self) -> usize {
        self.shared.detached_panics.load(Ordering::Relaxed)
    }

    /// `true` if the calling thread is one of this pool's workers.
    pub fn is_worker_thread(&self) -> bool {
        this_thread::pool_id() == Some(self.id())
    }

    /// The calling thread's index in this pool, if it is one of its workers.
    pub fn current_worker_index(&self) -> Option<usize> {
        match this_thread::worker() {
            Some((id, index)) if id == self.id() => Some(index),
            _ => None,
        }
    }

    /// Replace the workers with `threads` new ones.
    ///
    /// Current workers finish every queued task, then exit and are joined before
    /// the new workers start. Safe to call from several threads at once and
    /// while other threads submit tasks.
    ///
    /// # Panics
    /// If called from one of this pool's own workers, which could never be joined.
    pub fn set_thread_count(&self, threads: usize) {
        assert!(
            !self.is_worker_thread(),
            "set_thread_count called from a worker of {}",
            self.id()
        );
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        self.stop_workers(&mut workers);

        self.shared.lock().stopping = false;
        for index in 0..threads {
            self.shared.lock().live_workers += 1;
            let shared = Arc::clone(&self.shared);
            let spawned = thread::Builder::new()
                .name(format!("utl-{}-{index}", self.id()))
                .spawn(move || worker_loop(shared, index));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    self.shared.lock().live_workers -= 1;
                    tracing::error!(target: "utl::pool", pool = %self.id(), error = %e, "failed to spawn worker");
                }
            }
        }
        self.shared.lock().thread_count = workers.len();
        tracing::debug!(target: "utl::pool", pool = %self.id(), threads = workers.len(), "pool resized");
    }

    /// Signal stop, let workers drain the queue, and join them.
    fn stop_workers(&self, workers: &mut Vec<JoinHandle<()>>) {
        self.shared.lock().stopping = true;
        self.shared.task_available.notify_all();
        for handle in workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!(target: "utl::pool", pool = %self.id(), "worker thread panicked");
            }
        }
    }

    fn submit(&self, job: Job) {
        let mut state = self.shared.lock();
        if state.live_workers == 0 {
            state.running += 1;
            drop(state);
            self.shared.execute(job, None);
            self.shared.finish_one();
        } else {
            state.tasks.push_back(job);
            drop(state);
            self.shared.task_available.notify_one();
        }
    }

    /// Submit a task whose result is not observed.
    ///
    /// A panic inside the task is logged and counted in
    /// [`detached_panics`](Self::detached_panics); the worker carries on.
    pub fn detached_task<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Box::new(task));
    }

    /// Submit a task and get a future for its result.
    ///
    /// A panic inside the task is captured and reported by
    /// [`TaskFuture::get`] as [`TaskError::Panicked`](crate::TaskError::Panicked).
    pub fn awaitable_task<F, R>(&self, task: F) -> TaskFuture<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        self.submit(Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(task));
            // The future may already be gone; the result is then discarded.
            let _ = sender.send(outcome);
        }));
        TaskFuture::new(receiver)
    }

    /// Block until the queue is empty and no task is running.
    ///
    /// # Panics
    /// If called from one of this pool's own workers, which would wait on itself.
    pub fn wait(&self) {
        assert!(
            !self.is_worker_thread(),
            "wait called from a worker of {}",
            self.id()
        );
        let mut state = self.shared.lock();
        while state.running > 0 || !state.tasks.is_empty() {
            state = self
                .shared
                .tasks_done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

impl Default for ThreadPool {
    /// One worker per available CPU.
    fn default() -> Self {
        ThreadPool::new(thread::available_parallelism().map_or(1, NonZeroUsize::get))
    }
}

impl fmt::Debug for ThreadPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("ThreadPool")
            .field("id", &self.shared.id)
            .field("thread_count", &state.thread_count)
            .field("queued", &state.tasks.len())
            .field("running", &state.running)
            .finish()
    }
}

impl Drop for ThreadPool {
    /// Runs every queued task, then joins the workers. When the last handle is
    /// dropped by one of the pool's own workers, the workers are signalled but
    /// left to exit on their own.
    fn drop(&mut self) {
        if self.is_worker_thread() {
            self.shared.lock().stopping = true;
            self.shared.task_available.notify_all();
            return;
        }
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        self.stop_workers(&mut workers);
        tracing::debug!(target: "utl::pool", pool = %self.id(), "pool dropped");
    }
}
