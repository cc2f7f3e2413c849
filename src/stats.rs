//! Basic sample statistics over `f64` slices.
//!
//! Both functions return `None` for empty input rather than producing NaN,
//! so callers are forced to handle the degenerate case explicitly.

/// Arithmetic mean of a slice.
///
/// Returns `None` if the slice is empty.
///
/// # Examples
///
/// ```
/// use spc_engine::stats::mean;
///
/// assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
/// assert_eq!(mean(&[]), None);
/// ```
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of a slice.
///
/// The input is copied and sorted; the original order does not matter.
/// For an even-length slice the median is the mean of the two middle
/// sorted values. Returns `None` if the slice is empty.
///
/// # Panics
///
/// Panics if `values` contains NaN. Observation parsing rejects non-finite
/// values, so callers inside the engine never pass NaN.
///
/// # Examples
///
/// ```
/// use spc_engine::stats::median;
///
/// assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
/// assert_eq!(median(&[]), None);
/// ```
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("values must not contain NaN"));
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn mean_of_singleton() {
        assert_eq!(mean(&[7.5]), Some(7.5));
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn median_odd_is_exact_middle() {
        assert_eq!(median(&[9.0, 1.0, 5.0, 3.0, 7.0]), Some(5.0));
    }

    #[test]
    fn median_even_averages_middle_pair() {
        assert_eq!(median(&[10.0, 20.0, 30.0, 40.0]), Some(25.0));
    }

    #[test]
    fn median_of_singleton() {
        assert_eq!(median(&[2.5]), Some(2.5));
    }

    proptest! {
        /// Median is invariant under input reordering.
        #[test]
        fn median_order_invariant(mut values in prop::collection::vec(-1e6..1e6f64, 1..50)) {
            let forward = median(&values).unwrap();
            values.reverse();
            let reversed = median(&values).unwrap();
            values.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let sorted = median(&values).unwrap();
            prop_assert_eq!(forward, reversed);
            prop_assert_eq!(forward, sorted);
        }

        /// Median of a sorted array matches the middle element / middle pair.
        #[test]
        fn median_matches_sorted_middle(values in prop::collection::vec(-1e6..1e6f64, 1..50)) {
            let mut sorted = values.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let n = sorted.len();
            let expected = if n % 2 == 1 {
                sorted[n / 2]
            } else {
                (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
            };
            prop_assert_eq!(median(&values).unwrap(), expected);
        }
    }
}
