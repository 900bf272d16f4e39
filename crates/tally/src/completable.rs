use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use tracing::warn;

use crate::error::ProgressError;
use crate::sink::Sink;

/// Explicit, one-shot "I am done" signal, independent of reporting a final value.
pub trait Completable {
    fn report_completion(&self) -> Result<(), ProgressError>;
}

/// A sink with explicit completion feedback.
pub trait CompletableSink<T>: Sink<T> + Completable {}

impl<T, S: Sink<T> + Completable + ?Sized> CompletableSink<T> for S {}

impl<C: Completable + ?Sized> Completable for &C {
    fn report_completion(&self) -> Result<(), ProgressError> {
        (**self).report_completion()
    }
}

impl<C: Completable + ?Sized> Completable for Box<C> {
    fn report_completion(&self) -> Result<(), ProgressError> {
        (**self).report_completion()
    }
}

impl<C: Completable + ?Sized> Completable for Arc<C> {
    fn report_completion(&self) -> Result<(), ProgressError> {
        (**self).report_completion()
    }
}

/// Turns a plain sink into a completable one, see [`crate::SinkExt::with_completion`].
pub struct WithCompletion<S, C> {
    inner: S,
    on_completion: C,
}

impl<S, C> WithCompletion<S, C> {
    pub(crate) fn new(inner: S, on_completion: C) -> Self {
        Self {
            inner,
            on_completion,
        }
    }
}

impl<T, S: Sink<T>, C> Sink<T> for WithCompletion<S, C> {
    fn report(&self, value: T) {
        self.inner.report(value)
    }
}

impl<S, C: Fn()> Completable for WithCompletion<S, C> {
    /// Calls the completion callback on every invocation.
    fn report_completion(&self) -> Result<(), ProgressError> {
        (self.on_completion)();
        Ok(())
    }
}

/// Guarantees that completion is reported exactly once when the guard goes out of scope,
/// whichever way the scope is left.
///
/// Use [`CompletionGuard::complete`] to complete early and observe the result.
pub struct CompletionGuard<S: Completable> {
    inner: S,
    completed: bool,
}

impl<S: Completable> CompletionGuard<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            completed: false,
        }
    }

    pub fn complete(mut self) -> Result<(), ProgressError> {
        self.completed = true;
        self.inner.report_completion()
    }
}

impl<S: Completable> Deref for CompletionGuard<S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T, S: Completable + Sink<T>> Sink<T> for CompletionGuard<S> {
    fn report(&self, value: T) {
        self.inner.report(value)
    }
}

impl<S: Completable + Debug> Debug for CompletionGuard<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionGuard")
            .field("inner", &self.inner)
            .field("completed", &self.completed)
            .finish()
    }
}

impl<S: Completable> Drop for CompletionGuard<S> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        self.completed = true;

        if let Err(error) = self.inner.report_completion() {
            warn!("Unable to report completion when leaving scope. error: {}", error);
        }
    }
}

pub trait CompletableExt: Completable + Sized {
    /// Wraps this value in a [`CompletionGuard`].
    fn into_guard(self) -> CompletionGuard<Self> {
        CompletionGuard::new(self)
    }
}

impl<C: Completable> CompletableExt for C {}
