use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Consumer of reported values.
///
/// Reporting takes `&self`, so a sink can be shared between the threads doing the work.
/// Implementations needing state use interior mutability.
pub trait Sink<T> {
    fn report(&self, value: T);
}

impl<T, S: Sink<T> + ?Sized> Sink<T> for &S {
    fn report(&self, value: T) {
        (**self).report(value)
    }
}

impl<T, S: Sink<T> + ?Sized> Sink<T> for Box<S> {
    fn report(&self, value: T) {
        (**self).report(value)
    }
}

impl<T, S: Sink<T> + ?Sized> Sink<T> for Arc<S> {
    fn report(&self, value: T) {
        (**self).report(value)
    }
}

/// Sink that hands every value to a closure, without any thread scheduling.
#[derive(Clone)]
pub struct FnSink<F> {
    report: F,
}

impl<F> Debug for FnSink<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSink").finish_non_exhaustive()
    }
}

impl<T, F: Fn(T)> Sink<T> for FnSink<F> {
    fn report(&self, value: T) {
        (self.report)(value)
    }
}

pub fn sink_fn<T, F: Fn(T)>(report: F) -> FnSink<F> {
    FnSink {
        report,
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    #[test]
    fn closure_sink_receives_reports() {
        // given
        let reports = Mutex::new(Vec::new());
        let sink = sink_fn(|value: u8| reports.lock().push(value));

        // when
        sink.report(1u8);
        sink.report(2u8);

        // then
        assert_eq!(*reports.lock(), vec![1, 2]);
    }

    #[test]
    fn shared_and_boxed_sinks_forward_to_the_same_target() {
        // given
        let reports = Arc::new(Mutex::new(Vec::new()));
        let reports_for_sink = reports.clone();
        let shared = Arc::new(sink_fn(move |value: u8| reports_for_sink.lock().push(value)));
        let boxed: Box<dyn Sink<u8>> = Box::new(shared.clone());

        // when
        shared.report(1u8);
        boxed.report(2u8);
        (&*shared).report(3u8);

        // then
        assert_eq!(*reports.lock(), vec![1, 2, 3]);
    }
}
