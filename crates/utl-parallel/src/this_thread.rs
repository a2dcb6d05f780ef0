//! Identity of the calling thread with respect to thread pools.
//!
//! Every worker records which pool it belongs to and its index within that
//! pool. Threads that are not pool workers report `None`.

use std::cell::Cell;

use crate::pool::PoolId;

thread_local! {
    static CURRENT: Cell<Option<(PoolId, usize)>> = const { Cell::new(None) };
}

pub(crate) fn set_worker(worker: Option<(PoolId, usize)>) {
    CURRENT.with(|current| current.set(worker));
}

/// The pool and worker index of the calling thread, if it is a pool worker.
pub fn worker() -> Option<(PoolId, usize)> {
    CURRENT.with(Cell::get)
}

/// The pool the calling thread works for.
pub fn pool_id() -> Option<PoolId> {
    worker().map(|(id, _)| id)
}

/// The calling thread's index within its pool.
pub fn index() -> Option<usize> {
    worker().map(|(_, index)| index)
}
