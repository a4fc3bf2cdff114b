use crate::returns::{mean, std_dev};

pub const ANNUAL_RISK_FREE_RATE: f64 = 0.035;

pub fn per_period_rf(periods_per_year: u32) -> f64 {
    ANNUAL_RISK_FREE_RATE / periods_per_year as f64
}

/// `sqrt(N) * (mean(r) - rf) / std(r)`.
pub fn sharpe(returns: &[f64], periods_per_year: u32) -> f64 {
    let sd = std_dev(returns);
    if returns.len() > 1 && sd > 0.0 {
        let rf = per_period_rf(periods_per_year);
        (periods_per_year as f64).sqrt() * (mean(returns) - rf) / sd
    } else {
        0.0
    }
}

/// Downside-deviation-adjusted Sharpe: only returns below the risk-free rate
/// count against the denominator.
pub fn sortino(returns: &[f64], periods_per_year: u32) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let rf = per_period_rf(periods_per_year);
    let excess: Vec<f64> = returns.iter().map(|r| r - rf).collect();
    let downside_sq_mean =
        excess.iter().map(|e| e.min(0.0).powi(2)).sum::<f64>() / excess.len() as f64;
    let dd = downside_sq_mean.sqrt();
    if dd == 0.0 {
        return 0.0;
    }
    (periods_per_year as f64).sqrt() * mean(&excess) / dd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_returns_have_zero_sharpe() {
        assert_eq!(sharpe(&[0.0, 0.0, 0.0], 252), 0.0);
    }

    #[test]
    fn positive_drift_gives_positive_sharpe() {
        let returns = vec![0.01, 0.02, 0.015, 0.005, 0.012];
        assert!(sharpe(&returns, 252) > 0.0);
    }

    #[test]
    fn sortino_ignores_upside_volatility() {
        let all_up = vec![0.01, 0.05, 0.02, 0.08];
        let mixed = vec![0.01, -0.05, 0.02, -0.08];
        assert!(sortino(&all_up, 252) > sortino(&mixed, 252));
    }
}
