//! Aggregation of many progress sources into a single report.
//!
//! A [`Muxer`] owns a dynamic set of inputs, each with a weight and the last value it reported.
//! Whenever an input reports, the weighted mean of all inputs is forwarded to the target sink.
//!
//! # Invariants
//!
//! 1. The value forwarded to the target is always `Σ(weight·value) / Σweight` over the current
//!    input set, or zero when that weighted sum is exactly zero.
//! 2. Nothing is forwarded when inputs are created before any input has reported, so speculative
//!    inputs don't produce a burst of zero reports.
//! 3. An input removed by [`Muxer::reset`] never contributes again, even if its slot is re-used.
//!
//! # Locking
//!
//! Each muxer has one lock, held while the aggregate is computed *and* forwarded, so reports
//! reach the target in the order they were aggregated. The target must not report back into the
//! same muxer synchronously, that deadlocks.

use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};
use tracing::{debug, trace};

use crate::aggregate::weighted_mean;
use crate::error::ProgressError;
use crate::percentage::Percentage;
use crate::sink::Sink;

pub const DEFAULT_WEIGHT: f64 = 1.0;

new_key_type! {
    struct InputKey;
}

struct InputSlot {
    weight: f64,
    last_value: Percentage,
}

struct MuxerState {
    target: Box<dyn Sink<Percentage> + Send>,
    inputs: SlotMap<InputKey, InputSlot>,
    has_reported: bool,
}

impl MuxerState {
    fn report_aggregate(&self) {
        let fraction = weighted_mean(
            self.inputs
                .values()
                .map(|input| (input.weight, input.last_value.fraction())),
        );
        trace!("Reporting aggregated progress. inputs: {}, fraction: {}", self.inputs.len(), fraction);

        self.target
            .report(Percentage::from_fraction(fraction));
    }
}

/// Aggregates multiple progress reports into a single target.
///
/// Cloning a `Muxer` creates a new handle to the same set of inputs.
#[derive(Clone)]
pub struct Muxer {
    state: Arc<Mutex<MuxerState>>,
}

impl Debug for Muxer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Muxer")
            .field("inputs", &state.inputs.len())
            .field("has_reported", &state.has_reported)
            .finish()
    }
}

impl Muxer {
    pub fn new<S>(target: S) -> Self
    where
        S: Sink<Percentage> + Send + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(MuxerState {
                target: Box::new(target),
                inputs: SlotMap::with_key(),
                has_reported: false,
            })),
        }
    }

    /// Creates an input that reports to this muxer.
    ///
    /// The weight determines the influence of this input relative to the others; progress
    /// reported on an input with a higher weight affects the aggregate to a greater degree.
    ///
    /// Fails with [`ProgressError::InvalidWeight`] unless the weight is positive and finite.
    pub fn create_input(&self, weight: f64) -> Result<MuxerInput, ProgressError> {
        if !(weight > 0.0 && weight.is_finite()) {
            return Err(ProgressError::InvalidWeight(weight));
        }

        let mut state = self.state.lock();
        let key = state.inputs.insert(InputSlot {
            weight,
            last_value: Percentage::ZERO,
        });
        debug!("Created muxer input. weight: {}, inputs: {}", weight, state.inputs.len());

        // late joiners only count once real data exists
        if state.has_reported {
            state.report_aggregate();
        }

        Ok(MuxerInput {
            muxer: Arc::downgrade(&self.state),
            key,
            weight,
        })
    }

    /// Disconnects all inputs and reports zero to the target.
    ///
    /// This is the only way to force a report while the input set is empty.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.inputs.clear();
        state.has_reported = false;
        debug!("Muxer reset.");

        state
            .target
            .report(Percentage::ZERO);
    }

    pub fn input_count(&self) -> usize {
        self.state.lock().inputs.len()
    }
}

/// A sink connected to one slot of a [`Muxer`].
///
/// The handle only holds a weak reference to the muxer; reports are ignored once the input has
/// been disconnected by a reset, or once the muxer itself is gone.
#[derive(Clone)]
pub struct MuxerInput {
    muxer: Weak<Mutex<MuxerState>>,
    key: InputKey,
    weight: f64,
}

impl Debug for MuxerInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MuxerInput")
            .field("key", &self.key)
            .field("weight", &self.weight)
            .finish()
    }
}

impl MuxerInput {
    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_connected(&self) -> bool {
        self.muxer
            .upgrade()
            .is_some_and(|state| state.lock().inputs.contains_key(self.key))
    }
}

impl Sink<Percentage> for MuxerInput {
    fn report(&self, value: Percentage) {
        let Some(state) = self.muxer.upgrade() else {
            return;
        };
        let mut state = state.lock();

        let Some(input) = state.inputs.get_mut(self.key) else {
            trace!("Ignoring report from a disconnected input. value: {}", value);
            return;
        };
        input.last_value = value;

        state.report_aggregate();
        state.has_reported = true;
    }
}
