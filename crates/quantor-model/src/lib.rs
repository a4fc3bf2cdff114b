pub mod cadence;
pub mod errors;
pub mod execution;
pub mod job;
pub mod market_data;
pub mod request;
pub mod response;
pub mod trade;

pub use cadence::{BarSize, Cadence, ExecutionTiming, StrategyMetadata};
pub use errors::{ErrorEntry, ErrorList, ExecutionError, PipelineError, ValidationError};
pub use execution::{EquityPoint, ExecutionPayload, OhlcPoint, RawExecutionResult};
pub use job::{JobRecord, JobStatus};
pub use market_data::{Bar, MarketFrame, SymbolSeries};
pub use request::{BacktestRequest, RequestValidationError, MAX_STRATEGY_CODE_BYTES};
pub use response::{
    BacktestParameters, BacktestResponse, EquityCandle, EquityStats, PerformanceMetrics,
};
pub use trade::{Trade, TradeType};
