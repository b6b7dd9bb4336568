//! Scalar statistics shared by the signal checks
//!
//! Functions return `None` when the input is too short or has no variance,
//! so callers never divide by a degenerate denominator.

/// Variance below this is treated as zero
const EPSILON: f64 = 1e-12;

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Fraction of values matching `predicate`; 0.0 for an empty slice
pub fn fraction<F>(values: &[f64], predicate: F) -> f64
where
    F: Fn(f64) -> bool,
{
    if values.is_empty() {
        return 0.0;
    }
    values.iter().filter(|v| predicate(**v)).count() as f64 / values.len() as f64
}

/// Population coefficient of variation (std / mean); 0.0 when the mean is zero
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if values.is_empty() || m.abs() < EPSILON {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt() / m
}

/// Lag-1 autocorrelation
pub fn autocorrelation_lag1(values: &[f64]) -> Option<f64> {
    if values.len() < 3 {
        return None;
    }
    let m = mean(values);
    let denominator: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    if denominator < EPSILON {
        return None;
    }
    let numerator: f64 = values
        .windows(2)
        .map(|w| (w[0] - m) * (w[1] - m))
        .sum();
    Some(numerator / denominator)
}

/// Pearson correlation over the common prefix of `a` and `b`
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let n = a.len().min(b.len());
    if n < 3 {
        return None;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let (mean_a, mean_b) = (mean(a), mean(b));

    let var_a: f64 = a.iter().map(|v| (v - mean_a).powi(2)).sum();
    let var_b: f64 = b.iter().map(|v| (v - mean_b).powi(2)).sum();
    if var_a < EPSILON || var_b < EPSILON {
        return None;
    }

    let covariance: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum();
    Some(covariance / (var_a * var_b).sqrt())
}

/// Coefficient of determination of a least-squares line through
/// `(index, value)`. A constant series is fit perfectly and returns 1.0.
pub fn linear_fit_r2(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 1.0;
    }
    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = mean(values);

    let ss_tot: f64 = values.iter().map(|v| (v - mean_y).powi(2)).sum();
    if ss_tot < EPSILON {
        return 1.0;
    }

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, v) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (v - mean_y);
        sxx += dx * dx;
    }
    (sxy * sxy) / (sxx * ss_tot)
}

/// Shannon entropy of a histogram, normalized to [0, 1] by the bucket count
pub fn normalized_entropy(counts: &[usize]) -> Option<f64> {
    let total: usize = counts.iter().sum();
    if total == 0 || counts.len() < 2 {
        return None;
    }
    let entropy: f64 = counts
        .iter()
        .filter(|c| **c > 0)
        .map(|c| {
            let p = *c as f64 / total as f64;
            -p * p.log2()
        })
        .sum();
    Some(entropy / (counts.len() as f64).log2())
}
