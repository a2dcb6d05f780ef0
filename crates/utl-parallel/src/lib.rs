//! # utl-parallel
//!
//! A resizable thread pool with fire-and-forget and awaitable tasks, parallel
//! loops over index ranges, and parallel reductions.
//!
//! ## Guarantees
//!
//! - Every submitted task runs exactly once, including across concurrent
//!   [`ThreadPool::set_thread_count`] calls.
//! - A panicking task never takes down its worker. Awaitable tasks report the
//!   panic through their future; detached panics are logged and counted.
//! - A pool with zero workers runs tasks on the submitting thread.
//!
//! ## Modules
//!
//! - [`pool`] — `ThreadPool`, submission, resize, `wait`
//! - [`future`] — `TaskFuture`, `MultiFuture`, `ReduceFuture`
//! - [`blocks`] — `Blocks` range partitioning and `Grain`
//! - [`this_thread`] — pool identity of the calling thread
//! - [`error`] — `TaskError`
//!
//! Parallel loops and reductions are methods on [`ThreadPool`].

pub mod blocks;
pub mod error;
pub mod future;
mod loops;
pub mod pool;
pub mod this_thread;

pub use blocks::{Blocks, Grain};
pub use error::{Result, TaskError};
pub use future::{MultiFuture, ReduceFuture, TaskFuture};
pub use pool::{PoolId, ThreadPool};
