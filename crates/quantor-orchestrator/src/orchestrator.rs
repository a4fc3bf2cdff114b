use std::sync::Arc;

use tokio::sync::Semaphore;

use quantor_analyzer::StaticAnalyzer;
use quantor_market_data::{DataError, MarketDataProvider};
use quantor_model::{
    BacktestRequest, BacktestResponse, ExecutionError, ExecutionPayload, PipelineError,
    ValidationError,
};
use quantor_sandbox::{Executor, SandboxConfig};

use crate::output_validator;
use crate::response_builder;

/// Maximum number of backtests run concurrently — one per member, per the
/// club's usual headcount.
const MAX_CONCURRENT_BACKTESTS: usize = 13;

/// Runs the full pipeline from a submitted request to a validated,
/// metrics-complete response: static analysis, metadata extraction, market
/// data, sandboxed execution, output validation, and metrics.
pub struct Orchestrator {
    data_provider: Arc<MarketDataProvider>,
    executor: Executor,
    admission: Arc<Semaphore>,
}

impl Orchestrator {
    pub fn new(data_provider: Arc<MarketDataProvider>, sandbox_config: SandboxConfig) -> Self {
        Self {
            data_provider,
            executor: Executor::new(sandbox_config),
            admission: Arc::new(Semaphore::new(MAX_CONCURRENT_BACKTESTS)),
        }
    }

    pub async fn run(&self, request: BacktestRequest) -> Result<BacktestResponse, PipelineError> {
        let _permit = self
            .admission
            .acquire()
            .await
            .expect("semaphore is never closed");

        request
            .validate_fields()
            .map_err(|e| PipelineError::Validation(ValidationError::single(e.to_string())))?;

        let analysis_errors = StaticAnalyzer::analyze(&request.strategy_code);
        if !analysis_errors.is_empty() {
            return Err(PipelineError::Validation(ValidationError::new(
                analysis_errors,
            )));
        }

        let metadata = quantor_analyzer::extract_metadata(&request.strategy_code)
            .map_err(|e| PipelineError::Validation(ValidationError::single(e.to_string())))?;

        tracing::info!(
            universe = ?metadata.universe,
            bar_size = metadata.cadence.bar_size.as_str(),
            "parsed strategy metadata"
        );

        let market_data = self
            .data_provider
            .get_data(
                &metadata.universe,
                request.start_date.date_naive(),
                request.end_date.date_naive(),
                metadata.cadence.bar_size,
            )
            .await
            .map_err(|e| match e {
                // Runtime data-availability problems: the user's requested
                // universe/window just doesn't have data, not a bug.
                DataError::Empty { .. } | DataError::Fetch { .. } => {
                    PipelineError::Execution(ExecutionError::single(e.to_string()))
                }
                // Programmer errors: an unsupported bar size should have been
                // caught by metadata extraction, and cache I/O failures are
                // an operational fault, not something the request caused.
                DataError::UnsupportedBarSize(_) | DataError::Cache { .. } => {
                    PipelineError::Internal(anyhow::Error::from(e))
                }
            })?;

        tracing::info!(bars = market_data.series.len(), "fetched market data");

        let payload = ExecutionPayload {
            strategy_code: request.strategy_code.clone(),
            name: request.name.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            initial_capital: request.initial_capital,
            commission: request.commission,
            slippage: request.slippage,
            market_data,
        };

        let raw_result = self.executor.execute(&payload).await;
        if !raw_result.errors.is_empty() {
            return Err(PipelineError::Execution(
                ExecutionError::new(raw_result.errors),
            ));
        }

        output_validator::validate(&raw_result).map_err(PipelineError::Execution)?;

        let initial_capital = rust_decimal::prelude::ToPrimitive::to_f64(&request.initial_capital)
            .unwrap_or(0.0);
        let metrics = quantor_metrics::calculate_metrics(
            &raw_result
                .equity_curve
                .iter()
                .map(|p| (p.timestamp, p.value))
                .collect::<Vec<_>>(),
            &raw_result.trades,
            initial_capital,
            &self.data_provider,
            metadata.cadence.bar_size,
        )
        .await;

        tracing::info!(final_value = raw_result.final_value, "pipeline complete");

        Ok(response_builder::build(&request, &metadata, raw_result, metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use quantor_model::ErrorList;
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    fn orchestrator() -> (Orchestrator, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let provider = Arc::new(MarketDataProvider::new(dir.path()));
        let orchestrator = Orchestrator::new(provider, SandboxConfig::default());
        (orchestrator, dir)
    }

    fn base_request(strategy_code: &str) -> BacktestRequest {
        BacktestRequest {
            strategy_code: strategy_code.into(),
            name: None,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            initial_capital: Decimal::from(10_000),
            commission: Decimal::ZERO,
            slippage: Decimal::ZERO,
            errors: ErrorList::new(),
        }
    }

    #[tokio::test]
    async fn rejects_malformed_request_before_touching_market_data() {
        let (orchestrator, _dir) = orchestrator();
        let mut request = base_request("class S(Strategy): pass");
        request.end_date = request.start_date;

        let err = orchestrator.run(request).await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_strategy_that_fails_static_analysis() {
        let (orchestrator, _dir) = orchestrator();
        let request = base_request("import os\nclass S(Strategy): pass");

        let err = orchestrator.run(request).await.unwrap_err();
        assert!(matches!(err, PipelineError::Validation(_)));
    }
}
