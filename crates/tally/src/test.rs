//! Helpers shared by unit and integration tests, enabled with the `testing` feature.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::percentage::Percentage;

pub const TOLERANCE: f64 = 1e-9;

#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() <= TOLERANCE,
        "values differ. actual: {}, expected: {}",
        actual,
        expected
    );
}

#[track_caller]
pub fn assert_percentages(actual: &[Percentage], expected: &[f64]) {
    let actual_fractions: Vec<f64> = actual
        .iter()
        .map(|percentage| percentage.fraction())
        .collect();

    assert_eq!(
        actual_fractions.len(),
        expected.len(),
        "report count differs. actual: {:?}, expected: {:?}",
        actual_fractions,
        expected
    );
    for (actual_fraction, expected_fraction) in actual_fractions.iter().zip(expected) {
        assert!(
            (actual_fraction - expected_fraction).abs() <= TOLERANCE,
            "reports differ. actual: {:?}, expected: {:?}",
            actual_fractions,
            expected
        );
    }
}

/// Routes `tracing` output to the test harness, filtered by `RUST_LOG`.
///
/// Safe to call from every test, only the first call installs the subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init();
}
