//! Value-transform combinators over the [`Sink`] contract.
//!
//! None of these take part in aggregation; they shape the values travelling between a producer
//! and its target. Stateful adapters keep a single last-value box behind their own lock.

use std::marker::PhantomData;

use parking_lot::Mutex;

use crate::completable::WithCompletion;
use crate::muxer::Muxer;
use crate::percentage::Percentage;
use crate::sink::Sink;

pub trait SinkExt<T>: Sink<T> + Sized {
    /// Projects reports of type `U` into the shape accepted by this sink.
    fn map<U, F>(self, map: F) -> Map<Self, F, U>
    where
        F: Fn(U) -> T,
    {
        Map {
            inner: self,
            map,
            _marker: PhantomData,
        }
    }

    /// Forwards only the reports satisfying the predicate.
    fn filter<P>(self, predicate: P) -> Filter<Self, P>
    where
        P: Fn(&T) -> bool,
    {
        Filter {
            inner: self,
            predicate,
        }
    }

    /// Drops consecutive reports with the same key.
    fn distinct_by_key<K, F>(self, key: F) -> Distinct<Self, F, K>
    where
        F: Fn(&T) -> K,
        K: PartialEq,
    {
        Distinct {
            inner: self,
            key,
            last: Mutex::new(None),
        }
    }

    /// Drops consecutive duplicate reports.
    fn distinct(self) -> Distinct<Self, fn(&T) -> T, T>
    where
        T: Clone + PartialEq,
    {
        self.distinct_by_key(T::clone as fn(&T) -> T)
    }

    /// Drops reports lower than the last forwarded one.
    fn ordered(self) -> Ordered<Self, T>
    where
        T: PartialOrd + Clone,
    {
        Ordered {
            inner: self,
            last: Mutex::new(None),
        }
    }

    /// Forwards every report to both this sink and `other`.
    fn merge<O>(self, other: O) -> Merge<Self, O>
    where
        O: Sink<T>,
        T: Clone,
    {
        Merge {
            first: self,
            second: other,
        }
    }

    /// Adds explicit completion, `on_completion` is invoked whenever completion is reported.
    fn with_completion<C>(self, on_completion: C) -> WithCompletion<Self, C>
    where
        C: Fn(),
    {
        WithCompletion::new(self, on_completion)
    }

    /// Creates a muxer reporting into this sink, allowing it to aggregate reports from multiple
    /// sources.
    fn into_muxer(self) -> Muxer
    where
        Self: Sink<Percentage> + Send + 'static,
    {
        Muxer::new(self)
    }
}

impl<T, S: Sink<T>> SinkExt<T> for S {}

pub struct Map<S, F, U> {
    inner: S,
    map: F,
    _marker: PhantomData<fn(U)>,
}

impl<S, F, T, U> Sink<U> for Map<S, F, U>
where
    S: Sink<T>,
    F: Fn(U) -> T,
{
    fn report(&self, value: U) {
        self.inner.report((self.map)(value))
    }
}

pub struct Filter<S, P> {
    inner: S,
    predicate: P,
}

impl<T, S, P> Sink<T> for Filter<S, P>
where
    S: Sink<T>,
    P: Fn(&T) -> bool,
{
    fn report(&self, value: T) {
        if (self.predicate)(&value) {
            self.inner.report(value)
        }
    }
}

pub struct Distinct<S, F, K> {
    inner: S,
    key: F,
    last: Mutex<Option<K>>,
}

impl<T, S, F, K> Sink<T> for Distinct<S, F, K>
where
    S: Sink<T>,
    F: Fn(&T) -> K,
    K: PartialEq,
{
    fn report(&self, value: T) {
        let mut last = self.last.lock();

        let key = (self.key)(&value);
        if last.as_ref() == Some(&key) {
            return;
        }

        self.inner.report(value);
        *last = Some(key);
    }
}

pub struct Ordered<S, T> {
    inner: S,
    last: Mutex<Option<T>>,
}

impl<T, S> Sink<T> for Ordered<S, T>
where
    S: Sink<T>,
    T: PartialOrd + Clone,
{
    fn report(&self, value: T) {
        let mut last = self.last.lock();

        if matches!(last.as_ref(), Some(previous) if *previous > value) {
            return;
        }

        *last = Some(value.clone());
        self.inner.report(value);
    }
}

pub struct Merge<A, B> {
    first: A,
    second: B,
}

impl<T, A, B> Sink<T> for Merge<A, B>
where
    A: Sink<T>,
    B: Sink<T>,
    T: Clone,
{
    fn report(&self, value: T) {
        self.first.report(value.clone());
        self.second.report(value);
    }
}

pub struct MergeAll<S> {
    targets: Vec<S>,
}

impl<T, S> Sink<T> for MergeAll<S>
where
    S: Sink<T>,
    T: Clone,
{
    fn report(&self, value: T) {
        for target in &self.targets {
            target.report(value.clone());
        }
    }
}

/// Merges multiple sinks into one.
pub fn merge_all<S>(targets: impl IntoIterator<Item = S>) -> MergeAll<S> {
    MergeAll {
        targets: targets.into_iter().collect(),
    }
}

/// Accepts percentages, reports them to a fraction based (`0.0..=1.0`) sink.
pub fn percentage_to_fraction<S: Sink<f64>>(sink: S) -> Map<S, fn(Percentage) -> f64, Percentage> {
    sink.map(Percentage::fraction as fn(Percentage) -> f64)
}

/// Accepts percentages, reports them to a value based (`0.0..=100.0`) sink.
pub fn percentage_to_value<S: Sink<f64>>(sink: S) -> Map<S, fn(Percentage) -> f64, Percentage> {
    sink.map(Percentage::value as fn(Percentage) -> f64)
}

/// Accepts percentages, reports their value, truncated, to an integer based sink.
pub fn percentage_to_int<S: Sink<i32>>(sink: S) -> Map<S, fn(Percentage) -> i32, Percentage> {
    sink.map((|percentage: Percentage| percentage.value() as i32) as fn(Percentage) -> i32)
}

/// Accepts fractions (`0.0..=1.0`), reports them to a percentage based sink.
pub fn fraction_to_percentage<S: Sink<Percentage>>(sink: S) -> Map<S, fn(f64) -> Percentage, f64> {
    sink.map(Percentage::from_fraction as fn(f64) -> Percentage)
}

/// Accepts values (`0.0..=100.0`), reports them to a percentage based sink.
pub fn value_to_percentage<S: Sink<Percentage>>(sink: S) -> Map<S, fn(f64) -> Percentage, f64> {
    sink.map(Percentage::from_value as fn(f64) -> Percentage)
}

/// Accepts integer values (`0..=100`), reports them to a percentage based sink.
pub fn int_to_percentage<S: Sink<Percentage>>(sink: S) -> Map<S, fn(i32) -> Percentage, i32> {
    sink.map((|value: i32| Percentage::from_value(f64::from(value))) as fn(i32) -> Percentage)
}
