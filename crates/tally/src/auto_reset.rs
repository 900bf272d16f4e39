//! A muxer that returns to a clean state after each "wave" of inputs.
//!
//! Every input created through an [`AutoResetMuxer`] is pending until it reports completion. Once
//! no input is pending, the wrapped [`Muxer`] is reset: all inputs are disconnected and zero is
//! reported, so the next wave starts from scratch against the same target.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::completable::Completable;
use crate::error::ProgressError;
use crate::muxer::{Muxer, MuxerInput};
use crate::percentage::Percentage;
use crate::sink::Sink;

struct AutoResetState {
    muxer: Muxer,
    pending: usize,
}

#[derive(Clone)]
pub struct AutoResetMuxer {
    state: Arc<Mutex<AutoResetState>>,
}

impl Debug for AutoResetMuxer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AutoResetMuxer")
            .field("muxer", &state.muxer)
            .field("pending", &state.pending)
            .finish()
    }
}

impl AutoResetMuxer {
    pub fn new(muxer: Muxer) -> Self {
        Self {
            state: Arc::new(Mutex::new(AutoResetState {
                muxer,
                pending: 0,
            })),
        }
    }

    /// Creates an input that reports to the wrapped muxer, see [`Muxer::create_input`].
    ///
    /// The returned input can report completion. Once all inputs created so far report completion,
    /// the muxer is reset and those inputs are disconnected.
    pub fn create_input(&self, weight: f64) -> Result<AutoResetInput, ProgressError> {
        let mut state = self.state.lock();
        let input = state.muxer.create_input(weight)?;

        // only counted once the input was created successfully
        state.pending += 1;

        Ok(AutoResetInput {
            parent: self.state.clone(),
            input,
            completed: Mutex::new(false),
        })
    }

    /// Number of inputs that have not reported completion yet.
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending
    }
}

impl Muxer {
    /// Wraps this muxer in an adapter that disconnects all inputs once they all report completion.
    pub fn with_auto_reset(self) -> AutoResetMuxer {
        AutoResetMuxer::new(self)
    }
}

pub struct AutoResetInput {
    parent: Arc<Mutex<AutoResetState>>,
    input: MuxerInput,
    completed: Mutex<bool>,
}

impl Debug for AutoResetInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoResetInput")
            .field("input", &self.input)
            .field("completed", &*self.completed.lock())
            .finish()
    }
}

impl AutoResetInput {
    pub fn weight(&self) -> f64 {
        self.input.weight()
    }

    pub fn is_completed(&self) -> bool {
        *self.completed.lock()
    }
}

impl Sink<Percentage> for AutoResetInput {
    fn report(&self, value: Percentage) {
        let _state = self.parent.lock();
        self.input.report(value);
    }
}

impl Completable for AutoResetInput {
    /// Fails with [`ProgressError::AlreadyCompleted`] on the second and later calls, without
    /// affecting the pending count.
    fn report_completion(&self) -> Result<(), ProgressError> {
        let mut state = self.parent.lock();

        let mut completed = self.completed.lock();
        if *completed {
            return Err(ProgressError::AlreadyCompleted);
        }
        *completed = true;

        state.pending = state.pending.saturating_sub(1);
        if state.pending == 0 {
            debug!("All inputs completed, resetting muxer.");
            state.muxer.reset();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::SinkExt;
    use crate::completable::CompletableExt;
    use crate::muxer::DEFAULT_WEIGHT;
    use crate::terminal::Collector;
    use crate::test::assert_percentages;

    fn fixture() -> (Arc<Collector<Percentage>>, AutoResetMuxer) {
        let collector = Arc::new(Collector::new());
        let muxer = collector
            .clone()
            .into_muxer()
            .with_auto_reset();
        (collector, muxer)
    }

    #[test]
    fn each_wave_starts_from_zero() {
        // given
        let (collector, muxer) = fixture();

        // when
        {
            let input1 = muxer.create_input(DEFAULT_WEIGHT).unwrap().into_guard();
            let input2 = muxer.create_input(DEFAULT_WEIGHT).unwrap().into_guard();
            let input3 = muxer.create_input(DEFAULT_WEIGHT).unwrap().into_guard();

            input1.report(Percentage::from_fraction(1.0));
            input2.report(Percentage::from_fraction(0.5));
            input3.report(Percentage::from_fraction(0.25));
        }

        {
            let input4 = muxer.create_input(DEFAULT_WEIGHT).unwrap().into_guard();
            let input5 = muxer.create_input(DEFAULT_WEIGHT).unwrap().into_guard();
            let input6 = muxer.create_input(DEFAULT_WEIGHT).unwrap().into_guard();

            input4.report(Percentage::from_fraction(0.65));
            input5.report(Percentage::from_fraction(0.25));
            input6.report(Percentage::from_fraction(0.09));
        }

        // then
        assert_percentages(&collector.reports(), &[
            1.0 / 3.0,
            (1.0 + 0.5) / 3.0,
            (1.0 + 0.5 + 0.25) / 3.0,
            0.0,
            0.65 / 3.0,
            (0.65 + 0.25) / 3.0,
            (0.65 + 0.25 + 0.09) / 3.0,
            0.0,
        ]);
        assert_eq!(muxer.pending_count(), 0);
    }

    #[test]
    fn no_reset_while_an_input_is_pending() {
        // given
        let (collector, muxer) = fixture();
        let input1 = muxer.create_input(DEFAULT_WEIGHT).unwrap();
        let input2 = muxer.create_input(DEFAULT_WEIGHT).unwrap();
        input1.report(Percentage::from_fraction(1.0));

        // when
        input1.report_completion().unwrap();

        // then
        assert_eq!(muxer.pending_count(), 1);
        assert_percentages(&collector.reports(), &[0.5]);

        // and when
        input2.report(Percentage::from_fraction(0.5));
        input2.report_completion().unwrap();

        // then
        assert_eq!(muxer.pending_count(), 0);
        assert_percentages(&collector.reports(), &[0.5, 0.75, 0.0]);
    }

    #[test]
    fn double_completion_is_rejected_and_does_not_reset_early() {
        // given
        let (collector, muxer) = fixture();
        let input1 = muxer.create_input(DEFAULT_WEIGHT).unwrap();
        let input2 = muxer.create_input(DEFAULT_WEIGHT).unwrap();
        input2.report(Percentage::from_fraction(0.5));

        // when
        let first = input1.report_completion();
        let second = input1.report_completion();

        // then
        assert_eq!(first, Ok(()));
        assert_eq!(second, Err(ProgressError::AlreadyCompleted));
        assert!(input1.is_completed());
        assert_eq!(muxer.pending_count(), 1);
        assert_percentages(&collector.reports(), &[0.25]);
    }

    #[test]
    fn invalid_weight_does_not_count_as_pending() {
        // given
        let (_collector, muxer) = fixture();

        // when
        let result = muxer.create_input(0.0);

        // then
        assert!(matches!(result, Err(ProgressError::InvalidWeight(_))));
        assert_eq!(muxer.pending_count(), 0);
    }

    #[test]
    fn inputs_of_a_finished_wave_are_disconnected() {
        // given
        let (collector, muxer) = fixture();
        let input = muxer.create_input(DEFAULT_WEIGHT).unwrap();
        input.report(Percentage::from_fraction(0.4));
        input.report_completion().unwrap();

        // when
        input.report(Percentage::from_fraction(0.9));

        // then
        assert_percentages(&collector.reports(), &[0.4, 0.0]);
    }
}
