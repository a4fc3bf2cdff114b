use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("target weights sum to {sum}, must be <= 1.0")]
    WeightsExceedOne { sum: f64 },
    #[error("no price available for '{symbol}'")]
    MissingPrice { symbol: String },
    #[error("strategy raised: {0}")]
    StrategyFailed(String),
    #[error("unsupported bar size for the backtest engine")]
    UnsupportedBarSize,
}
