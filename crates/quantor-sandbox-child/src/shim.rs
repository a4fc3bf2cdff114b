/// Minimal stand-in for the `hqg_algorithms` package a strategy imports
/// `Strategy`/`Cadence`/`BarSize`/`ExecutionTiming` from. The real metadata
/// (`universe`, `cadence`) is already pulled out statically before this
/// container ever starts — this only needs to exist so the strategy's own
/// `class MyStrategy(Strategy):` and `cadence = Cadence(...)` lines resolve
/// inside the embedded interpreter without error.
pub const SHIM_SOURCE: &str = r#"
class BarSize:
    DAILY = "DAILY"
    WEEKLY = "WEEKLY"
    MONTHLY = "MONTHLY"
    QUARTERLY = "QUARTERLY"


class ExecutionTiming:
    CLOSE_TO_CLOSE = "CLOSE_TO_CLOSE"
    CLOSE_TO_NEXT_OPEN = "CLOSE_TO_NEXT_OPEN"
    OPEN_TO_OPEN = "OPEN_TO_OPEN"


class Cadence:
    def __init__(self, bar_size=BarSize.DAILY, execution=ExecutionTiming.CLOSE_TO_CLOSE):
        self.bar_size = bar_size
        self.execution = execution


class Strategy:
    universe = []
    cadence = Cadence()

    def on_data(self, slice, view):
        raise NotImplementedError
"#;
