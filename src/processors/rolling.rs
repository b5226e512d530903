/// Centered moving average requiring a full window.
///
/// Alignment matches the usual centered convention for even windows: the
/// window for position `i` spans `window / 2` periods before it and
/// `(window - 1) / 2` after it. Positions without a full window, or whose
/// window contains a null, are null.
pub fn centered_rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    let after = (window - 1) / 2;
    let before = window - 1 - after;

    (0..values.len())
        .map(|i| {
            if i < before || i + after >= values.len() {
                return None;
            }
            let slice = &values[i - before..=i + after];
            let sum = slice.iter().try_fold(0.0, |acc, v| v.map(|v| acc + v))?;
            Some(sum / window as f64)
        })
        .collect()
}

/// Centered moving average applied independently to each run of equal
/// `groups` entries; windows never span two groups. Input must already be
/// ordered by group, then chronologically.
pub fn grouped_centered_rolling_mean<K: PartialEq>(
    groups: &[K],
    values: &[Option<f64>],
    window: usize,
) -> Vec<Option<f64>> {
    debug_assert_eq!(groups.len(), values.len());

    let mut result = Vec::with_capacity(values.len());
    let mut start = 0;
    while start < values.len() {
        let end = groups[start..]
            .iter()
            .position(|g| *g != groups[start])
            .map_or(values.len(), |offset| start + offset);
        result.extend(centered_rolling_mean(&values[start..end], window));
        start = end;
    }
    result
}
