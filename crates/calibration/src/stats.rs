//! Sample statistics.

/// Median of `values`: the middle element, or the mean of the two middle
/// elements for an even count. `None` when empty.
///
/// Values are ordered with [`f64::total_cmp`].
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}
