use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ErrorList;

/// Maximum encoded size of `strategy_code`, per spec (1 MiB).
pub const MAX_STRATEGY_CODE_BYTES: usize = 1_000_000;

/// Submitted-by-the-client backtest request.
///
/// `errors` is transient pipeline state: it accumulates findings from the
/// static analyzer and is never serialized back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub strategy_code: String,
    #[serde(default)]
    pub name: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default = "default_initial_capital")]
    pub initial_capital: Decimal,
    #[serde(default)]
    pub commission: Decimal,
    #[serde(default)]
    pub slippage: Decimal,
    #[serde(skip)]
    pub errors: ErrorList,
}

fn default_initial_capital() -> Decimal {
    Decimal::from(10_000)
}

/// Field-level problems found while parsing/validating an incoming
/// [`BacktestRequest`] before the pipeline even starts (HTTP 422 territory).
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("strategy_code exceeds {MAX_STRATEGY_CODE_BYTES} bytes encoded")]
    StrategyCodeTooLarge,
    #[error("end_date must be after start_date")]
    EndNotAfterStart,
    #[error("initial_capital must be greater than 0")]
    NonPositiveCapital,
    #[error("commission must be non-negative")]
    NegativeCommission,
    #[error("slippage must be in [0, 1]")]
    SlippageOutOfRange,
}

impl BacktestRequest {
    /// Field-level checks independent of strategy content (HTTP 422 territory,
    /// distinct from the static analyzer's `analysis_errors`).
    pub fn validate_fields(&self) -> Result<(), RequestValidationError> {
        if self.strategy_code.len() > MAX_STRATEGY_CODE_BYTES {
            return Err(RequestValidationError::StrategyCodeTooLarge);
        }
        if self.end_date <= self.start_date {
            return Err(RequestValidationError::EndNotAfterStart);
        }
        if self.initial_capital <= Decimal::ZERO {
            return Err(RequestValidationError::NonPositiveCapital);
        }
        if self.commission < Decimal::ZERO {
            return Err(RequestValidationError::NegativeCommission);
        }
        if self.slippage < Decimal::ZERO || self.slippage > Decimal::ONE {
            return Err(RequestValidationError::SlippageOutOfRange);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base_request() -> BacktestRequest {
        BacktestRequest {
            strategy_code: "class S(Strategy): pass".into(),
            name: None,
            start_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            initial_capital: Decimal::from(10_000),
            commission: Decimal::ZERO,
            slippage: Decimal::ZERO,
            errors: ErrorList::new(),
        }
    }

    #[test]
    fn accepts_well_formed_request() {
        assert!(base_request().validate_fields().is_ok());
    }

    #[test]
    fn rejects_end_before_start() {
        let mut req = base_request();
        req.end_date = req.start_date;
        assert_eq!(
            req.validate_fields(),
            Err(RequestValidationError::EndNotAfterStart)
        );
    }

    #[test]
    fn rejects_non_positive_capital() {
        let mut req = base_request();
        req.initial_capital = Decimal::ZERO;
        assert_eq!(
            req.validate_fields(),
            Err(RequestValidationError::NonPositiveCapital)
        );
    }

    #[test]
    fn rejects_oversized_code() {
        let mut req = base_request();
        req.strategy_code = "x".repeat(MAX_STRATEGY_CODE_BYTES + 1);
        assert_eq!(
            req.validate_fields(),
            Err(RequestValidationError::StrategyCodeTooLarge)
        );
    }

    #[test]
    fn rejects_slippage_over_one() {
        let mut req = base_request();
        req.slippage = Decimal::from(2);
        assert_eq!(
            req.validate_fields(),
            Err(RequestValidationError::SlippageOutOfRange)
        );
    }
}
