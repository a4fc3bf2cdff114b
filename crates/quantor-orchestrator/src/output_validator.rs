use quantor_model::{ErrorList, ExecutionError, RawExecutionResult};
use rust_decimal::Decimal;

/// Final checkpoint before a raw isolate result is trusted enough to feed
/// into metrics: no NaN/infinite values, no negative final value, no
/// non-positive trade prices or sizes, and at least one equity point.
pub fn validate(output: &RawExecutionResult) -> Result<(), ExecutionError> {
    let mut errors = ErrorList::new();

    if !output.final_value.is_finite() {
        errors.push(format!("Invalid final_value: {}", output.final_value));
    }
    if output.final_value < 0.0 {
        errors.push(format!("Negative final portfolio value: {}", output.final_value));
    }

    for point in &output.equity_curve {
        if !point.value.is_finite() {
            errors.push(format!(
                "Invalid equity curve value at {}: {}",
                point.timestamp, point.value
            ));
        }
    }

    for trade in &output.trades {
        if trade.price <= Decimal::ZERO {
            errors.push(format!("Trade with non-positive price: {}", trade.price));
        }
        if trade.shares <= 0.0 {
            errors.push(format!("Trade with non-positive amount: {}", trade.shares));
        }
    }

    if output.equity_curve.is_empty() {
        errors.push("Empty equity curve — execution produced no data");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ExecutionError::new(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quantor_model::EquityPoint;

    #[test]
    fn empty_equity_curve_is_rejected() {
        let output = RawExecutionResult::failed(ErrorList::new());
        assert!(validate(&output).is_err());
    }

    #[test]
    fn nan_equity_point_is_rejected() {
        let mut output = RawExecutionResult::failed(ErrorList::new());
        output.final_value = 100.0;
        output.equity_curve.push(EquityPoint {
            timestamp: Utc::now(),
            value: f64::NAN,
        });
        assert!(validate(&output).is_err());
    }

    #[test]
    fn well_formed_result_passes() {
        let mut output = RawExecutionResult::failed(ErrorList::new());
        output.final_value = 11_000.0;
        output.equity_curve.push(EquityPoint {
            timestamp: Utc::now(),
            value: 11_000.0,
        });
        assert!(validate(&output).is_ok());
    }
}
