use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use quantor_model::{Bar, BarSize};
use quantor_market_data::MarketDataProvider;

use crate::returns::mean;
use crate::sharpe::ANNUAL_RISK_FREE_RATE;

const BENCHMARK_SYMBOL: &str = "^GSPC";

/// CAPM alpha/beta against the S&P 500, fetched through the same provider
/// (and at the same bar size) strategy data came from, so both series line
/// up period-for-period. Never propagates a failure past this boundary: a
/// fetch error or too little overlap reports the sentinel and logs instead.
pub async fn alpha_beta(
    equity_curve: &[(DateTime<Utc>, f64)],
    provider: &MarketDataProvider,
    bar_size: BarSize,
    periods_per_year: u32,
) -> (f64, f64) {
    let Some(start) = equity_curve.first().map(|(t, _)| t.date_naive()) else {
        return (f64::NEG_INFINITY, f64::NEG_INFINITY);
    };
    let end = equity_curve
        .last()
        .map(|(t, _)| t.date_naive())
        .unwrap_or(start);

    let strategy_returns = returns_by_date(equity_curve);

    let benchmark = match provider
        .get_data(&[BENCHMARK_SYMBOL.to_string()], start, end, bar_size)
        .await
    {
        Ok(frame) => frame,
        Err(err) => {
            tracing::warn!(error = %err, "alpha/beta calculation failed: benchmark fetch");
            return (f64::NEG_INFINITY, f64::NEG_INFINITY);
        }
    };

    let Some(bars) = benchmark.series.get(BENCHMARK_SYMBOL) else {
        tracing::warn!("alpha/beta calculation failed: no benchmark bars returned");
        return (f64::NEG_INFINITY, f64::NEG_INFINITY);
    };
    let benchmark_returns = returns_by_date_from_bars(bars);

    let (aligned_strategy, aligned_benchmark) = inner_join(&strategy_returns, &benchmark_returns);
    if aligned_strategy.len() < 2 {
        tracing::warn!("alpha/beta calculation failed: fewer than two aligned periods");
        return (f64::NEG_INFINITY, f64::NEG_INFINITY);
    }

    let beta = covariance(&aligned_strategy, &aligned_benchmark) / variance(&aligned_benchmark);

    let n = periods_per_year as f64;
    let strategy_annual = (1.0 + mean(&aligned_strategy)).powf(n) - 1.0;
    let benchmark_annual = (1.0 + mean(&aligned_benchmark)).powf(n) - 1.0;
    let alpha = strategy_annual
        - (ANNUAL_RISK_FREE_RATE + beta * (benchmark_annual - ANNUAL_RISK_FREE_RATE));

    (alpha, beta)
}

fn returns_by_date(equity_curve: &[(DateTime<Utc>, f64)]) -> BTreeMap<NaiveDate, f64> {
    let mut out = BTreeMap::new();
    for pair in equity_curve.windows(2) {
        let (prev, cur) = (pair[0].1, pair[1].1);
        if prev != 0.0 {
            out.insert(pair[1].0.date_naive(), (cur - prev) / prev);
        }
    }
    out
}

fn returns_by_date_from_bars(bars: &[Bar]) -> BTreeMap<NaiveDate, f64> {
    let mut out = BTreeMap::new();
    for pair in bars.windows(2) {
        let (prev, cur) = (pair[0].close, pair[1].close);
        if prev != 0.0 {
            out.insert(pair[1].date, (cur - prev) / prev);
        }
    }
    out
}

fn inner_join(
    a: &BTreeMap<NaiveDate, f64>,
    b: &BTreeMap<NaiveDate, f64>,
) -> (Vec<f64>, Vec<f64>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for (date, value) in a {
        if let Some(other) = b.get(date) {
            left.push(*value);
            right.push(*other);
        }
    }
    (left, right)
}

fn variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

fn covariance(a: &[f64], b: &[f64]) -> f64 {
    let ma = mean(a);
    let mb = mean(b);
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - ma) * (y - mb))
        .sum::<f64>()
        / (a.len() - 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn no_equity_points_is_sentinel() {
        // Exercised indirectly: returns_by_date on an empty curve should be empty.
        assert!(returns_by_date(&[]).is_empty());
    }

    #[test]
    fn covariance_of_identical_series_equals_variance() {
        let xs = vec![0.01, 0.02, -0.01, 0.03];
        assert!((covariance(&xs, &xs) - variance(&xs)).abs() < 1e-12);
    }

    #[test]
    fn returns_by_date_keys_on_the_later_bar() {
        let curve = vec![(at(1), 100.0), (at(2), 110.0)];
        let returns = returns_by_date(&curve);
        assert_eq!(returns.len(), 1);
        assert!(returns.contains_key(&at(2).date_naive()));
    }
}
