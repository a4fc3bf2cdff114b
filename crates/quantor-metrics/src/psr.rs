use statrs::distribution::{ContinuousCDF, Normal};

use crate::returns::{excess_kurtosis, mean, std_dev};
use crate::sharpe::ANNUAL_RISK_FREE_RATE;

/// Probability that the strategy's true Sharpe ratio exceeds `sr_benchmark`,
/// adjusted for skew and kurtosis of the return distribution (Lo 2002).
/// Returns a value in `[0, 1]`.
pub fn psr(returns: &[f64], periods_per_year: u32, sr_benchmark: f64) -> f64 {
    let t = returns.len();
    if t < 2 {
        return 0.0;
    }

    let rf = ANNUAL_RISK_FREE_RATE / periods_per_year as f64;
    let excess: Vec<f64> = returns.iter().map(|r| r - rf).collect();

    let mu = mean(&excess);
    let sigma = std_dev(&excess);
    if sigma == 0.0 {
        return 0.0;
    }

    let sr_hat = (mu / sigma) * (periods_per_year as f64).sqrt();

    let skew = crate::returns::skew(returns);
    let kurt = excess_kurtosis(returns) + 3.0;

    let t = t as f64;
    let sr_var = (1.0 - skew * sr_hat + ((kurt - 1.0) / 4.0) * sr_hat.powi(2)) / (t - 1.0);
    if sr_var <= 0.0 || sr_var.is_nan() {
        return 0.0;
    }
    let sr_std = sr_var.sqrt();

    let z = (sr_hat - sr_benchmark) / sr_std;

    let normal = Normal::new(0.0, 1.0).expect("standard normal parameters are always valid");
    normal.cdf(z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_return_is_zero() {
        assert_eq!(psr(&[0.01], 252, 1.0), 0.0);
    }

    #[test]
    fn flat_zero_returns_stay_zero() {
        assert_eq!(psr(&[0.0, 0.0, 0.0, 0.0], 252, 1.0), 0.0);
    }

    #[test]
    fn strong_steady_outperformance_has_high_psr() {
        let returns: Vec<f64> = (0..60)
            .map(|i| 0.01 + if i % 2 == 0 { 0.001 } else { -0.001 })
            .collect();
        assert!(psr(&returns, 252, 0.5) > 0.9);
    }
}
