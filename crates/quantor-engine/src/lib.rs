mod engine;
mod errors;
mod portfolio;
mod signal;
mod slice;
mod strategy;

pub use engine::{BacktestEngine, EngineOutput, PortfolioBar};
pub use errors::EngineError;
pub use portfolio::{ExecutionFrictions, Portfolio};
pub use signal::Signal;
pub use slice::{PortfolioView, Slice};
pub use strategy::Strategy;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use quantor_model::{Bar, BarSize, Cadence, ExecutionTiming, MarketFrame};
    use std::collections::BTreeMap;

    struct BuyAndHold {
        weight: f64,
        done: bool,
    }

    impl Strategy for BuyAndHold {
        fn on_data(&mut self, _slice: &Slice, _view: &PortfolioView) -> Result<Signal, EngineError> {
            if self.done {
                return Ok(Signal::Hold);
            }
            self.done = true;
            let mut weights = BTreeMap::new();
            weights.insert("SPY".to_string(), self.weight);
            Ok(Signal::TargetWeights(weights))
        }
    }

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn buy_and_hold_ends_in_cash_after_final_liquidation() {
        let mut series = BTreeMap::new();
        series.insert(
            "SPY".to_string(),
            vec![bar(1, 100.0), bar(2, 110.0), bar(3, 120.0)],
        );
        let market = MarketFrame {
            bar_size: BarSize::Daily,
            series,
        };

        let mut engine = BacktestEngine::new(
            BuyAndHold {
                weight: 0.5,
                done: false,
            },
            Cadence {
                bar_size: BarSize::Daily,
                execution: ExecutionTiming::CloseToClose,
            },
            ExecutionFrictions::default(),
        );

        let output = engine.run(&market, 10_000.0).unwrap();
        assert_eq!(output.final_positions["SPY"], 0.0);
        assert!(output.final_value > 10_000.0); // price went up, position profited
        assert_eq!(output.equity_curve.len(), 3);
    }
}
