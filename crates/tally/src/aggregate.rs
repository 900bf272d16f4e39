/// Weighted mean of `(weight, fraction)` pairs, `Σ(w·v) / Σw`.
///
/// Degrades to `0.0` whenever the weighted sum is exactly zero, which covers an empty set, a set
/// whose members are all still at zero and a set whose total weight is zero.
pub(crate) fn weighted_mean(items: impl IntoIterator<Item = (f64, f64)>) -> f64 {
    let (weighted_sum, weighted_max) = items
        .into_iter()
        .fold((0.0, 0.0), |(sum, max), (weight, fraction)| {
            (sum + weight * fraction, max + weight)
        });

    if weighted_sum == 0.0 {
        return 0.0;
    }

    weighted_sum / weighted_max
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::weighted_mean;
    use crate::test::assert_close;

    #[rstest]
    #[case::empty(vec![], 0.0)]
    #[case::all_at_zero(vec![(1.0, 0.0), (3.0, 0.0)], 0.0)]
    #[case::zero_weight(vec![(0.0, 0.5)], 0.0)]
    #[case::single(vec![(4.0, 0.44)], 0.44)]
    #[case::weighted(vec![(1.0, 1.0), (2.0, 0.5), (7.0, 0.25)], 0.375)]
    #[case::manager_scenario(vec![(2.0, 0.8), (8.0, 0.4)], 0.48)]
    fn mean(#[case] items: Vec<(f64, f64)>, #[case] expected: f64) {
        assert_close(weighted_mean(items), expected);
    }

    #[test]
    fn iteration_order_does_not_matter() {
        // given
        let items = vec![(1.0, 0.1), (2.0, 0.2), (3.0, 0.3), (4.0, 0.4)];
        let mut reversed = items.clone();
        reversed.reverse();

        // expect
        assert_close(weighted_mean(items), weighted_mean(reversed));
    }
}
