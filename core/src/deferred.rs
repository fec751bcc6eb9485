//! Deferred single-value results
//!
//! A [`Single`] captures a blocking operation without running it. It is
//! either run on the calling thread with [`Single::blocking_get`] or handed to
//! a [`Scheduler`] with [`Single::subscribe_on`], which returns a [`Pending`]
//! handle for the eventual outcome.

use crate::error::{RelataError, Result};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// A task handed to a [`Scheduler`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Execution context for deferred work.
pub trait Scheduler {
    /// Runs `task` at some point. A scheduler that cannot run the task drops
    /// it, which resolves the corresponding [`Pending`] as cancelled.
    fn schedule(&self, task: Task);
}

/// Runs tasks on the calling thread, before `schedule` returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl Scheduler for Immediate {
    fn schedule(&self, task: Task) {
        task();
    }
}

/// Runs each task on a freshly spawned OS thread.
#[derive(Debug, Clone, Default)]
pub struct NewThread {
    name: Option<String>,
}

impl NewThread {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

impl Scheduler for NewThread {
    fn schedule(&self, task: Task) {
        let mut builder = std::thread::Builder::new();
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        if let Err(_e) = builder.spawn(task) {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "relata: failed to spawn worker thread");
        }
    }
}

/// Runs tasks on a tokio runtime's blocking pool.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone)]
pub struct TokioBlocking {
    handle: tokio::runtime::Handle,
}

#[cfg(feature = "tokio")]
impl TokioBlocking {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime the caller is running on.
    pub fn current() -> Result<Self> {
        tokio::runtime::Handle::try_current()
            .map(Self::new)
            .map_err(|e| RelataError::Other(e.to_string()))
    }
}

#[cfg(feature = "tokio")]
impl Scheduler for TokioBlocking {
    fn schedule(&self, task: Task) {
        drop(self.handle.spawn_blocking(task));
    }
}

//------------------------------------------------------------------------------
// Single
//------------------------------------------------------------------------------

/// A deferred operation producing exactly one value or an error.
#[must_use = "a Single does nothing until it is run"]
pub struct Single<T> {
    op: Box<dyn FnOnce() -> Result<T> + Send + 'static>,
}

/// A deferred operation producing a value, no value, or an error.
pub type Maybe<T> = Single<Option<T>>;

impl<T: Send + 'static> Single<T> {
    pub fn new(op: impl FnOnce() -> Result<T> + Send + 'static) -> Self {
        Self { op: Box::new(op) }
    }

    /// An already-known value.
    pub fn just(value: T) -> Self {
        Self::new(move || Ok(value))
    }

    /// Composes `f` onto the eventual value without running anything.
    pub fn map<U: Send + 'static>(self, f: impl FnOnce(T) -> U + Send + 'static) -> Single<U> {
        let op = self.op;
        Single::new(move || op().map(f))
    }

    /// Runs the operation on the calling thread.
    pub fn blocking_get(self) -> Result<T> {
        (self.op)()
    }

    /// Hands the operation to `scheduler` and returns a handle to its outcome.
    pub fn subscribe_on<S: Scheduler + ?Sized>(self, scheduler: &S) -> Pending<T> {
        let (tx, rx) = oneshot::channel();
        let op = self.op;
        scheduler.schedule(Box::new(move || {
            // The receiver may already be gone; the outcome is then unobserved.
            let _ = tx.send(op());
        }));
        Pending { rx }
    }
}

impl<T> fmt::Debug for Single<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Single").finish_non_exhaustive()
    }
}

//------------------------------------------------------------------------------
// Pending
//------------------------------------------------------------------------------

/// Outcome of a scheduled [`Single`].
///
/// Dropping the handle stops nothing: a statement that has started runs to
/// completion and its result is discarded.
#[must_use]
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Pending<T> {
    /// Blocks the current thread until the outcome is known.
    ///
    /// Must not be called from inside an async runtime; await the handle there.
    pub fn wait(self) -> Result<T> {
        self.rx.blocking_recv().unwrap_or(Err(RelataError::Cancelled))
    }

    /// The outcome if it is already available.
    pub fn try_take(&mut self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(RelataError::Cancelled)),
        }
    }
}

impl<T> Future for Pending<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|outcome| outcome.unwrap_or(Err(RelataError::Cancelled)))
    }
}

impl<T> fmt::Debug for Pending<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending").finish_non_exhaustive()
    }
}
