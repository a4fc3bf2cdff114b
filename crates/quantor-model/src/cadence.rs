use serde::{Deserialize, Serialize};

/// Supported bar durations. Intraday is explicitly unsupported — see
/// `quantor-market-data`'s `unsupported bar size` error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BarSize {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

impl BarSize {
    /// Trading periods per year, used to annualize metrics.
    pub fn periods_per_year(self) -> u32 {
        match self {
            BarSize::Daily => 252,
            BarSize::Weekly => 52,
            BarSize::Monthly => 12,
            BarSize::Quarterly => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BarSize::Daily => "DAILY",
            BarSize::Weekly => "WEEKLY",
            BarSize::Monthly => "MONTHLY",
            BarSize::Quarterly => "QUARTERLY",
        }
    }

    pub fn from_member_name(name: &str) -> Option<Self> {
        match name {
            "DAILY" => Some(BarSize::Daily),
            "WEEKLY" => Some(BarSize::Weekly),
            "MONTHLY" => Some(BarSize::Monthly),
            "QUARTERLY" => Some(BarSize::Quarterly),
            _ => None,
        }
    }
}

impl Default for BarSize {
    fn default() -> Self {
        BarSize::Daily
    }
}

/// When a decision turns into a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionTiming {
    CloseToClose,
    CloseToNextOpen,
    OpenToOpen,
}

impl ExecutionTiming {
    pub fn from_member_name(name: &str) -> Option<Self> {
        match name {
            "CLOSE_TO_CLOSE" => Some(ExecutionTiming::CloseToClose),
            "CLOSE_TO_NEXT_OPEN" => Some(ExecutionTiming::CloseToNextOpen),
            "OPEN_TO_OPEN" => Some(ExecutionTiming::OpenToOpen),
            _ => None,
        }
    }
}

impl Default for ExecutionTiming {
    fn default() -> Self {
        ExecutionTiming::CloseToClose
    }
}

/// `(bar_size, execution_timing)` pair describing when a strategy thinks and
/// when its trades actually fill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cadence {
    pub bar_size: BarSize,
    pub execution: ExecutionTiming,
}

/// `{universe, cadence}` extracted statically from strategy source, without
/// executing any user code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyMetadata {
    pub universe: Vec<String>,
    pub cadence: Cadence,
}
