use rust_decimal::prelude::ToPrimitive;

use quantor_model::{
    BacktestParameters, BacktestRequest, BacktestResponse, EquityCandle, EquityStats,
    PerformanceMetrics, RawExecutionResult, StrategyMetadata,
};

pub fn build(
    request: &BacktestRequest,
    metadata: &StrategyMetadata,
    output: RawExecutionResult,
    metrics: PerformanceMetrics,
) -> BacktestResponse {
    let starting_value = request.initial_capital.to_f64().unwrap_or(0.0);
    let ending_value = output.final_value;

    let total_volume: f64 = output
        .trades
        .iter()
        .map(|t| t.price.to_f64().unwrap_or(0.0) * t.shares)
        .sum();

    let equity_curve = output
        .ohlc
        .iter()
        .map(|bar| EquityCandle {
            time: bar.timestamp.timestamp(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
        })
        .collect();

    BacktestResponse {
        parameters: BacktestParameters {
            name: request.name.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            initial_capital: request.initial_capital,
            commission: request.commission,
            slippage: request.slippage,
            cadence: metadata.cadence,
        },
        metrics,
        equity_curve,
        equity_stats: EquityStats {
            starting_value,
            ending_value,
            net_profit: ending_value - starting_value,
            total_volume,
        },
        trades: output.trades,
    }
}
