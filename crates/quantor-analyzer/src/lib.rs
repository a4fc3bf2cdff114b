mod line_index;
mod metadata;
mod static_analyzer;
mod whitelist;

pub use metadata::{extract_metadata, MetadataError};
pub use static_analyzer::StaticAnalyzer;

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_STRATEGY: &str = r#"
from hqg_algorithms import Strategy, Cadence, BarSize, ExecutionTiming

class MomentumStrategy(Strategy):
    universe = ["SPY", "IEF"]
    cadence = Cadence(bar_size=BarSize.WEEKLY, execution=ExecutionTiming.CLOSE_TO_NEXT_OPEN)

    def on_data(self, data):
        return {}
"#;

    #[test]
    fn accepts_well_formed_strategy() {
        let errors = StaticAnalyzer::analyze(VALID_STRATEGY);
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn rejects_eval_call() {
        let source = r#"
from hqg_algorithms import Strategy

class BadStrategy(Strategy):
    universe = ["SPY"]

    def on_data(self, data):
        eval("1 + 1")
"#;
        let errors = StaticAnalyzer::analyze(source);
        assert!(!errors.is_empty());
        assert!(errors.messages().iter().any(|m| m.contains("eval")));
    }

    #[test]
    fn rejects_disallowed_import() {
        let source = r#"
import os
from hqg_algorithms import Strategy

class BadStrategy(Strategy):
    universe = ["SPY"]
"#;
        let errors = StaticAnalyzer::analyze(source);
        assert!(errors.messages().iter().any(|m| m.contains("os")));
    }

    #[test]
    fn rejects_forbidden_attribute() {
        let source = r#"
from hqg_algorithms import Strategy

class BadStrategy(Strategy):
    universe = ["SPY"]

    def on_data(self, data):
        return self.__class__.__subclasses__()
"#;
        let errors = StaticAnalyzer::analyze(source);
        assert!(errors
            .messages()
            .iter()
            .any(|m| m.contains("__subclasses__")));
    }

    #[test]
    fn requires_strategy_base_class() {
        let source = r#"
class NotAStrategy:
    universe = ["SPY"]
"#;
        let errors = StaticAnalyzer::analyze(source);
        assert!(errors
            .messages()
            .iter()
            .any(|m| m.contains("inherits from Strategy")));
    }

    #[test]
    fn extracts_universe_and_cadence() {
        let metadata = extract_metadata(VALID_STRATEGY).expect("metadata");
        assert_eq!(metadata.universe, vec!["SPY".to_string(), "IEF".to_string()]);
        assert_eq!(metadata.cadence.bar_size, quantor_model::BarSize::Weekly);
    }

    #[test]
    fn rejects_missing_universe() {
        let source = r#"
class NoUniverse(Strategy):
    def on_data(self, data):
        pass
"#;
        let err = extract_metadata(source).unwrap_err();
        assert!(matches!(err, MetadataError::NoUniverse));
    }

    #[test]
    fn rejects_duplicate_tickers_silently_deduped() {
        let source = r#"
class Dup(Strategy):
    universe = ["SPY", "spy", " SPY "]
"#;
        let metadata = extract_metadata(source).expect("metadata");
        assert_eq!(metadata.universe, vec!["SPY".to_string()]);
    }
}
