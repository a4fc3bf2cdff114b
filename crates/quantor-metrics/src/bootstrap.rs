use rayon::prelude::*;
use rust_decimal::prelude::ToPrimitive;

use quantor_model::{Trade, TradeType};

/// 95% confidence interval on Sharpe and win rate, built by resampling the
/// trade list with replacement. Exposed alongside the point estimates in
/// [`PerformanceMetrics`](quantor_model::PerformanceMetrics) for callers that
/// want a sense of how much a single run's numbers could have varied.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceInterval {
    pub sharpe_lo: f64,
    pub sharpe_hi: f64,
    pub win_rate_lo: f64,
    pub win_rate_hi: f64,
}

/// Returns `None` when there aren't enough trades for the resample to be
/// meaningful.
pub fn bootstrap_confidence_interval(
    trades: &[Trade],
    periods_per_year: u32,
    num_samples: u32,
) -> Option<ConfidenceInterval> {
    if trades.len() < 5 || num_samples == 0 {
        return None;
    }

    let n = trades.len();
    let pnls: Vec<f64> = trades
        .iter()
        .map(|t| t.price.to_f64().unwrap_or(0.0) * if t.trade_type == TradeType::Sell { 1.0 } else { -1.0 } * t.shares)
        .collect();

    let samples: Vec<(f64, f64)> = (0..num_samples)
        .into_par_iter()
        .map(|_| {
            let mut rng = rand::thread_rng();
            let resampled: Vec<f64> = (0..n)
                .map(|_| pnls[rand::Rng::gen_range(&mut rng, 0..n)])
                .collect();

            let wins = resampled.iter().filter(|pnl| **pnl > 0.0).count();
            let win_rate = wins as f64 / n as f64;

            let mean = resampled.iter().sum::<f64>() / n as f64;
            let var =
                resampled.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0).max(1.0);
            let std = var.sqrt();
            let sharpe = if std > 1e-10 {
                (mean / std) * (periods_per_year as f64).sqrt()
            } else {
                0.0
            };

            (sharpe, win_rate)
        })
        .collect();

    let mut sharpes: Vec<f64> = samples.iter().map(|(s, _)| *s).collect();
    let mut win_rates: Vec<f64> = samples.iter().map(|(_, w)| *w).collect();

    Some(ConfidenceInterval {
        sharpe_lo: percentile(&mut sharpes, 2.5),
        sharpe_hi: percentile(&mut sharpes, 97.5),
        win_rate_lo: percentile(&mut win_rates, 2.5),
        win_rate_hi: percentile(&mut win_rates, 97.5),
    })
}

fn percentile(samples: &mut [f64], p: f64) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if samples.is_empty() {
        return 0.0;
    }
    let idx = ((p / 100.0) * (samples.len() - 1) as f64).round() as usize;
    samples[idx.min(samples.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn trade(trade_type: TradeType, price: i64, shares: f64) -> Trade {
        Trade {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            symbol: "SPY".to_string(),
            trade_type,
            price: Decimal::from(price),
            shares,
        }
    }

    #[test]
    fn too_few_trades_returns_none() {
        let trades = vec![trade(TradeType::Buy, 100, 1.0)];
        assert!(bootstrap_confidence_interval(&trades, 252, 500).is_none());
    }

    #[test]
    fn interval_bounds_are_ordered() {
        let trades = vec![
            trade(TradeType::Buy, 100, 1.0),
            trade(TradeType::Sell, 120, 1.0),
            trade(TradeType::Buy, 90, 1.0),
            trade(TradeType::Sell, 80, 1.0),
            trade(TradeType::Buy, 50, 1.0),
            trade(TradeType::Sell, 70, 1.0),
        ];
        let ci = bootstrap_confidence_interval(&trades, 252, 200).unwrap();
        assert!(ci.sharpe_lo <= ci.sharpe_hi);
        assert!(ci.win_rate_lo <= ci.win_rate_hi);
    }
}
