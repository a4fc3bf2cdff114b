mod alpha_beta;
mod bootstrap;
mod drawdown;
mod psr;
mod returns;
mod sharpe;
mod trades;

use chrono::{DateTime, Utc};
use quantor_model::{BarSize, PerformanceMetrics, Trade};
use quantor_market_data::MarketDataProvider;

pub use bootstrap::{bootstrap_confidence_interval, ConfidenceInterval};
pub use sharpe::ANNUAL_RISK_FREE_RATE;

/// Benchmark Sharpe the PSR asks "how sure are we we beat this?" — fixed at
/// 1.0, matching the rest of the risk stack's assumed hurdle rate.
const PSR_BENCHMARK_SHARPE: f64 = 1.0;

/// Computes every field of [`PerformanceMetrics`] from a single backtest run.
///
/// `equity_curve` must be chronologically ordered. Alpha/beta fetch the
/// `^GSPC` benchmark through `provider` at `bar_size`; any failure there
/// degrades to the `-inf` sentinel rather than failing the whole calculation.
pub async fn calculate_metrics(
    equity_curve: &[(DateTime<Utc>, f64)],
    trades: &[Trade],
    initial_capital: f64,
    provider: &MarketDataProvider,
    bar_size: BarSize,
) -> PerformanceMetrics {
    let periods_per_year = bar_size.periods_per_year();
    let values: Vec<f64> = equity_curve.iter().map(|(_, v)| *v).collect();
    let period_returns = returns::pct_change(equity_curve);

    let final_value = values.last().copied().unwrap_or(initial_capital);
    let total_return = if initial_capital != 0.0 {
        (final_value - initial_capital) / initial_capital
    } else {
        0.0
    };

    let annualized_return = annualized_return(&period_returns, periods_per_year);
    let sharpe = sharpe::sharpe(&period_returns, periods_per_year);
    let sortino = sharpe::sortino(&period_returns, periods_per_year);
    let max_drawdown = drawdown::max_drawdown(&values);
    let win_rate = trades::win_rate(trades);
    let (avg_win, avg_loss) = trades::avg_win_loss(trades);
    let psr = psr::psr(&period_returns, periods_per_year, PSR_BENCHMARK_SHARPE);
    let (alpha, beta) =
        alpha_beta::alpha_beta(equity_curve, provider, bar_size, periods_per_year).await;

    PerformanceMetrics {
        sharpe,
        sortino,
        alpha,
        beta,
        psr,
        total_return,
        annualized_return,
        max_drawdown,
        win_rate,
        total_orders: trades.len() as u32,
        avg_win,
        avg_loss,
    }
}

/// Geometric annualization once there's enough history for it to be stable,
/// arithmetic otherwise, matching the original's short-horizon fallback.
fn annualized_return(returns: &[f64], periods_per_year: u32) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let min_periods_for_geometric = (periods_per_year / 4).max(4) as usize;
    if returns.len() >= min_periods_for_geometric {
        returns.iter().map(|r| 1.0 + r).product::<f64>().powf(periods_per_year as f64 / returns.len() as f64) - 1.0
    } else {
        returns::mean(returns) * periods_per_year as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn empty_curve_falls_back_to_initial_capital() {
        let provider = MarketDataProvider::new(tempdir().unwrap().path());
        let metrics = calculate_metrics(&[], &[], 10_000.0, &provider, BarSize::Daily).await;
        assert_eq!(metrics.total_return, 0.0);
        assert_eq!(metrics.total_orders, 0);
    }

    #[tokio::test]
    async fn rising_equity_curve_has_positive_total_return() {
        let curve = vec![(at(1), 10_000.0), (at(2), 10_500.0), (at(3), 11_000.0)];
        let provider = MarketDataProvider::new(tempdir().unwrap().path());
        let metrics = calculate_metrics(&curve, &[], 10_000.0, &provider, BarSize::Daily).await;
        assert!(metrics.total_return > 0.0);
        // No network access in this test environment: alpha/beta degrade to the sentinel.
        assert_eq!(metrics.alpha, f64::NEG_INFINITY);
        assert_eq!(metrics.beta, f64::NEG_INFINITY);
    }
}
