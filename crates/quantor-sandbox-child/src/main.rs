mod conversions;
mod loader;
mod py_strategy;
mod shim;

use std::io::{self, Read, Write};
use std::time::Instant;

use pyo3::prelude::*;
use quantor_engine::{BacktestEngine, ExecutionFrictions};
use quantor_model::{EquityPoint, ErrorList, ExecutionPayload, OhlcPoint, RawExecutionResult};
use rust_decimal::prelude::ToPrimitive;

use py_strategy::PyStrategy;

fn main() {
    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        emit(RawExecutionResult::failed(single_error(format!(
            "failed to read stdin: {e}"
        ))));
        std::process::exit(1);
    }

    let payload: ExecutionPayload = match serde_json::from_str(&input) {
        Ok(p) => p,
        Err(e) => {
            emit(RawExecutionResult::failed(single_error(format!(
                "failed to parse execution payload: {e}"
            ))));
            std::process::exit(1);
        }
    };

    let start = Instant::now();
    let mut result = run(payload);
    result.execution_time = start.elapsed().as_secs_f64();

    let failed = !result.errors.is_empty();
    emit(result);
    if failed {
        std::process::exit(1);
    }
}

fn run(payload: ExecutionPayload) -> RawExecutionResult {
    let metadata = match quantor_analyzer::extract_metadata(&payload.strategy_code) {
        Ok(m) => m,
        Err(e) => return RawExecutionResult::failed(single_error(format!("strategy metadata error: {e}"))),
    };

    let slippage_bps = payload.slippage.to_f64().unwrap_or(0.0) * 10_000.0;
    let initial_cash = payload.initial_capital.to_f64().unwrap_or(0.0);
    let frictions = ExecutionFrictions {
        slippage_bps,
        ..ExecutionFrictions::default()
    };

    let strategy_result: PyResult<PyStrategy> =
        Python::with_gil(|py| loader::load_strategy(py, &payload.strategy_code).map(PyStrategy::new));

    let strategy = match strategy_result {
        Ok(s) => s,
        Err(e) => return RawExecutionResult::failed(single_error(format!("strategy load error: {e}"))),
    };

    let mut engine = BacktestEngine::new(strategy, metadata.cadence, frictions);
    match engine.run(&payload.market_data, initial_cash) {
        Ok(output) => RawExecutionResult {
            trades: output.trades,
            equity_curve: output
                .equity_curve
                .into_iter()
                .map(|(timestamp, value)| EquityPoint { timestamp, value })
                .collect(),
            ohlc: output
                .ohlc
                .into_iter()
                .map(|bar| OhlcPoint {
                    timestamp: bar.timestamp,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                })
                .collect(),
            final_value: output.final_value,
            final_cash: output.final_cash,
            final_positions: output.final_positions,
            execution_time: 0.0,
            errors: ErrorList::new(),
        },
        Err(e) => RawExecutionResult::failed(single_error(format!("strategy execution error: {e}"))),
    }
}

fn single_error(message: String) -> ErrorList {
    let mut errors = ErrorList::new();
    errors.push(message);
    errors
}

fn emit(result: RawExecutionResult) {
    match serde_json::to_string(&result) {
        Ok(json) => {
            let _ = io::stdout().write_all(json.as_bytes());
        }
        Err(e) => {
            tracing::error!("failed to serialize result: {e}");
        }
    }
}
