//! Handles for results of awaitable tasks.

use std::sync::Arc;
use std::thread;

use crossbeam_channel::Receiver;

use crate::error::{panic_message, Result, TaskError};

/// The pending result of one [`awaitable_task`](crate::ThreadPool::awaitable_task).
///
/// Dropping the future does not cancel the task; its result is discarded.
pub struct TaskFuture<R> {
    receiver: Receiver<thread::Result<R>>,
    outcome: Option<thread::Result<R>>,
}

impl<R> TaskFuture<R> {
    pub(crate) fn new(receiver: Receiver<thread::Result<R>>) -> Self {
        Self {
            receiver,
            outcome: None,
        }
    }

    /// `true` once the task has finished, successfully or not.
    pub fn is_ready(&self) -> bool {
        self.outcome.is_some() || !self.receiver.is_empty()
    }

    /// Block until the task has finished, keeping the result for [`get`](Self::get).
    pub fn wait(&mut self) {
        if self.outcome.is_none() {
            if let Ok(outcome) = self.receiver.recv() {
                self.outcome = Some(outcome);
            }
        }
    }

    /// Block until the task has finished and return its value.
    pub fn get(mut self) -> Result<R> {
        let outcome = match self.outcome.take() {
            Some(outcome) => outcome,
            None => self.receiver.recv().map_err(|_| TaskError::Abandoned)?,
        };
        outcome.map_err(|payload| TaskError::Panicked(panic_message(payload.as_ref())))
    }
}

impl<R> std::fmt::Debug for TaskFuture<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskFuture")
            .field("ready", &self.is_ready())
            .finish()
    }
}

/// A group of task futures, typically one per block of a parallel loop.
#[derive(Debug)]
pub struct MultiFuture<R> {
    futures: Vec<TaskFuture<R>>,
}

impl<R> MultiFuture<R> {
    pub fn len(&self) -> usize {
        self.futures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.futures.is_empty()
    }

    /// Number of tasks that have already finished.
    pub fn ready_count(&self) -> usize {
        self.futures.iter().filter(|f| f.is_ready()).count()
    }

    /// Block until every task has finished.
    pub fn wait(&mut self) {
        for future in &mut self.futures {
            future.wait();
        }
    }

    /// Wait for every task, then return the results in submission order.
    ///
    /// If any task failed, the error of the first failed task is returned, but
    /// only after all tasks have finished.
    pub fn get(mut self) -> Result<Vec<R>> {
        self.wait();
        self.futures.into_iter().map(TaskFuture::get).collect()
    }
}

impl<R> Default for MultiFuture<R> {
    fn default() -> Self {
        Self {
            futures: Vec::new(),
        }
    }
}

impl<R> FromIterator<TaskFuture<R>> for MultiFuture<R> {
    fn from_iter<I: IntoIterator<Item = TaskFuture<R>>>(iter: I) -> Self {
        Self {
            futures: iter.into_iter().collect(),
        }
    }
}

impl<R> Extend<TaskFuture<R>> for MultiFuture<R> {
    fn extend<I: IntoIterator<Item = TaskFuture<R>>>(&mut self, iter: I) {
        self.futures.extend(iter);
    }
}

impl<R> IntoIterator for MultiFuture<R> {
    type Item = TaskFuture<R>;
    type IntoIter = std::vec::IntoIter<TaskFuture<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.futures.into_iter()
    }
}

/// The pending result of an [`awaitable_reduce`](crate::ThreadPool::awaitable_reduce).
///
/// Holds one partial result per block; [`get`](Self::get) combines them in block
/// order on the calling thread.
pub struct ReduceFuture<T> {
    partials: MultiFuture<Option<T>>,
    op: Arc<dyn Fn(T, T) -> T + Send + Sync>,
}

impl<T> ReduceFuture<T> {
    pub(crate) fn new(
        partials: MultiFuture<Option<T>>,
        op: Arc<dyn Fn(T, T) -> T + Send + Sync>,
    ) -> Self {
        Self { partials, op }
    }

    pub fn is_ready(&self) -> bool {
        self.partials.ready_count() == self.partials.len()
    }

    pub fn wait(&mut self) {
        self.partials.wait();
    }

    /// The reduction of the whole range, `None` if it was empty.
    pub fn get(self) -> Result<Option<T>> {
        let op = self.op;
        Ok(self
            .partials
            .get()?
            .into_iter()
            .flatten()
            .reduce(|acc, item| op(acc, item)))
    }
}

impl<T> std::fmt::Debug for ReduceFuture<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReduceFuture")
            .field("blocks", &self.partials.len())
            .field("ready", &self.partials.ready_count())
            .finish()
    }
}
