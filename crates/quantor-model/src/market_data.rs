use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single OHLCV bar for one symbol on one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Per-symbol daily OHLCV series, the on-disk unit of [`crate::SymbolCache`].
/// Invariant: `bars` strictly increasing by `date`, no NaN rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolSeries {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

impl SymbolSeries {
    pub fn min_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Merge `other` into `self`: dedupe by date (keep the incoming value on
    /// conflict), re-sort ascending. Used when merging a fresh upstream
    /// fetch into the existing on-disk cache.
    pub fn merge(&mut self, other: &SymbolSeries) {
        let mut by_date: BTreeMap<NaiveDate, Bar> =
            self.bars.iter().map(|b| (b.date, *b)).collect();
        for bar in &other.bars {
            by_date.insert(bar.date, *bar);
        }
        self.bars = by_date.into_values().collect();
    }
}

/// Timestamp-indexed table keyed by `(symbol, field)`, sorted ascending with
/// no duplicate timestamps per symbol. The shape the backtest engine walks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketFrame {
    pub bar_size: crate::cadence::BarSize,
    /// Symbol -> ascending bars.
    pub series: BTreeMap<String, Vec<Bar>>,
}

impl MarketFrame {
    pub fn is_empty(&self) -> bool {
        self.series.values().all(|bars| bars.is_empty())
    }

    pub fn symbols(&self) -> impl Iterator<Item = &String> {
        self.series.keys()
    }
}
