use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::ErrorList;
use crate::market_data::MarketFrame;
use crate::trade::Trade;

/// Everything the isolate needs to run a backtest, serialized to its stdin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPayload {
    pub strategy_code: String,
    pub name: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub initial_capital: Decimal,
    pub commission: Decimal,
    pub slippage: Decimal,
    pub market_data: MarketFrame,
}

/// One point on the equity curve as produced inside the isolate, before the
/// candle-bucketing done by the orchestrator for the external response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// One point of the portfolio's own OHLC curve as produced inside the
/// isolate, before it's turned into a [`crate::response::EquityCandle`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OhlcPoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Raw result read back from the isolate's stdout. Never trusted as-is:
/// the output validator checks every numeric field before it becomes a
/// [`crate::response::BacktestResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExecutionResult {
    #[serde(default)]
    pub trades: Vec<Trade>,
    #[serde(default)]
    pub equity_curve: Vec<EquityPoint>,
    #[serde(default)]
    pub ohlc: Vec<OhlcPoint>,
    #[serde(default)]
    pub final_value: f64,
    #[serde(default)]
    pub final_cash: f64,
    #[serde(default)]
    pub final_positions: BTreeMap<String, f64>,
    #[serde(default)]
    pub execution_time: f64,
    #[serde(default)]
    pub errors: ErrorList,
}

impl RawExecutionResult {
    /// Zeroed shell used when the isolate can't be reasoned about at all
    /// (empty stdout, timeout, spawn failure) — the errors list carries the
    /// reason and the caller raises from there, it never raises itself.
    pub fn failed(errors: ErrorList) -> Self {
        Self {
            trades: Vec::new(),
            equity_curve: Vec::new(),
            ohlc: Vec::new(),
            final_value: 0.0,
            final_cash: 0.0,
            final_positions: BTreeMap::new(),
            execution_time: 0.0,
            errors,
        }
    }
}
