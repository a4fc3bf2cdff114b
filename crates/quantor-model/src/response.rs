use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cadence::Cadence;
use crate::trade::Trade;

/// Risk/return metrics computed by `quantor-metrics` over the isolate's
/// equity curve and trade list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    #[serde(rename = "sharpe_ratio")]
    pub sharpe: f64,
    pub sortino: f64,
    pub alpha: f64,
    pub beta: f64,
    pub psr: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub total_orders: u32,
    pub avg_win: f64,
    pub avg_loss: f64,
}

/// One OHLC candle of the portfolio equity curve, resampled to the request's
/// bar size. `time` is a Unix timestamp, matching the charting library the
/// dashboard feeds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EquityCandle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Portfolio-level summary stats that sit alongside the metrics block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EquityStats {
    pub starting_value: f64,
    pub ending_value: f64,
    pub net_profit: f64,
    pub total_volume: f64,
}

/// Echo of the request parameters the job actually ran with, so a client
/// polling for results doesn't need to keep its own copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestParameters {
    pub name: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub initial_capital: Decimal,
    pub commission: Decimal,
    pub slippage: Decimal,
    pub cadence: Cadence,
}

/// The final payload returned for a completed job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResponse {
    pub parameters: BacktestParameters,
    pub metrics: PerformanceMetrics,
    pub equity_curve: Vec<EquityCandle>,
    pub equity_stats: EquityStats,
    pub trades: Vec<Trade>,
}
