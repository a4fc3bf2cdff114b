use chrono::{DateTime, Utc};

/// Per-period simple returns from a chronologically ordered equity curve,
/// equivalent to `pd.Series(equity).pct_change().dropna()`.
pub fn pct_change(equity_curve: &[(DateTime<Utc>, f64)]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .filter_map(|pair| {
            let (prev, cur) = (pair[0].1, pair[1].1);
            if prev == 0.0 {
                None
            } else {
                Some((cur - prev) / prev)
            }
        })
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (`ddof=1`), matching pandas' default.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|r| (r - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Sample skewness with pandas' bias correction (Fisher-Pearson, adjusted).
pub fn skew(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 3 {
        return 0.0;
    }
    let m = mean(values);
    let s = std_dev(values);
    if s == 0.0 {
        return 0.0;
    }
    let m3 = values.iter().map(|r| (r - m).powi(3)).sum::<f64>();
    (n / ((n - 1.0) * (n - 2.0))) * m3 / s.powi(3)
}

/// Excess kurtosis with pandas' bias correction (Fisher, adjusted), then
/// converted back to raw kurtosis by the caller (`+3`) where needed.
pub fn excess_kurtosis(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    if values.len() < 4 {
        return 0.0;
    }
    let m = mean(values);
    let s = std_dev(values);
    if s == 0.0 {
        return 0.0;
    }
    let m4 = values.iter().map(|r| (r - m).powi(4)).sum::<f64>();
    let term = (n * (n + 1.0)) / ((n - 1.0) * (n - 2.0) * (n - 3.0)) * m4 / s.powi(4);
    let correction = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    term - correction
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn pct_change_skips_first_point() {
        let curve = vec![(at(1), 100.0), (at(2), 110.0), (at(3), 99.0)];
        let returns = pct_change(&curve);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - 0.10).abs() < 1e-9);
        assert!((returns[1] - (-0.1)).abs() < 1e-9);
    }

    #[test]
    fn std_dev_of_constant_series_is_zero() {
        assert_eq!(std_dev(&[0.01, 0.01, 0.01]), 0.0);
    }
}
