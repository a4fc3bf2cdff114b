use std::collections::BTreeMap;

use quantor_model::Bar;

/// Read-only view of every symbol's bar at the current timestamp, handed to
/// a strategy's `on_data`. Symbols absent from this bar's timeline (holiday,
/// late listing) simply have no entry.
#[derive(Debug, Clone, Default)]
pub struct Slice {
    bars: BTreeMap<String, Bar>,
}

impl Slice {
    pub fn new(bars: BTreeMap<String, Bar>) -> Self {
        Self { bars }
    }

    pub fn get(&self, symbol: &str) -> Option<&Bar> {
        self.bars.get(symbol)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &String> {
        self.bars.keys()
    }

    pub fn closes(&self) -> BTreeMap<String, f64> {
        self.bars.iter().map(|(s, b)| (s.clone(), b.close)).collect()
    }

    pub fn opens(&self) -> BTreeMap<String, f64> {
        self.bars.iter().map(|(s, b)| (s.clone(), b.open)).collect()
    }
}

/// Snapshot of portfolio state handed to a strategy alongside its [`Slice`],
/// so `on_data` can size positions without mutating anything directly.
#[derive(Debug, Clone)]
pub struct PortfolioView {
    pub cash: f64,
    pub equity: f64,
    pub positions: BTreeMap<String, f64>,
    pub weights: BTreeMap<String, f64>,
}
