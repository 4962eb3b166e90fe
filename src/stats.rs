//! Sequence statistics shared by the scroll and timing detectors.

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance. `None` for fewer than 2 values.
pub fn variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    Some(values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64)
}

/// Regularity of a sample sequence: `1 - variance / mean^2`.
///
/// Approaches 1.0 for perfectly uniform (machine-like) sequences and drops
/// toward 0 as jitter grows; floored at 0 so wildly irregular input never
/// goes negative. `None` for fewer than 2 values or a zero mean.
pub fn regularity(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if m == 0.0 {
        return None;
    }
    let v = variance(values)?;
    Some((1.0 - v / (m * m)).max(0.0))
}

/// Consecutive differences of a monotonic timestamp sequence, in ms.
pub fn intervals(timestamps_ms: &[u64]) -> Vec<f64> {
    timestamps_ms
        .windows(2)
        .map(|w| w[1].saturating_sub(w[0]) as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_variance() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
        assert_eq!(variance(&[5.0]), None);
        assert_eq!(variance(&[2.0, 4.0]), Some(1.0));
    }

    #[test]
    fn test_regularity_uniform_sequence() {
        let r = regularity(&[100.0, 100.0, 100.0, 100.0]).unwrap();
        assert!((r - 1.0).abs() < f64::EPSILON, "Uniform input is perfectly regular");
    }

    #[test]
    fn test_regularity_jittered_sequence() {
        let r = regularity(&[80.0, 130.0, 95.0, 160.0, 70.0]).unwrap();
        assert!(r < 0.95, "Jittered input must not look machine-like: {r}");
    }

    #[test]
    fn test_regularity_floors_at_zero() {
        // Variance far above mean^2 would go negative without the floor.
        let r = regularity(&[1.0, 1000.0, 2.0, 900.0]).unwrap();
        assert_eq!(r, 0.0);
    }

    #[test]
    fn test_regularity_zero_mean() {
        assert_eq!(regularity(&[0.0, 0.0, 0.0]), None);
    }

    #[test]
    fn test_intervals() {
        assert_eq!(intervals(&[100, 250, 400]), vec![150.0, 150.0]);
        assert!(intervals(&[42]).is_empty());
    }
}
