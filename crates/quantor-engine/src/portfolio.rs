use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use quantor_model::{Trade, TradeType};
use uuid::Uuid;

use crate::errors::EngineError;
use crate::slice::Slice;

const DUST_THRESHOLD_USD: f64 = 1.0;
const MAX_WEIGHT_SUM: f64 = 1.0001;

/// Execution frictions applied on top of the raw rebalance math.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionFrictions {
    pub slippage_bps: f64,
    pub max_volume_participation: Option<f64>,
    pub allow_short_selling: bool,
}

/// Cash + share holdings, the single source of truth the engine mutates bar
/// by bar.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub cash: f64,
    pub positions: BTreeMap<String, f64>,
}

impl Portfolio {
    pub fn new(initial_cash: f64, universe: &[String]) -> Self {
        Self {
            cash: initial_cash,
            positions: universe.iter().map(|s| (s.clone(), 0.0)).collect(),
        }
    }

    pub fn total_value(&self, prices: &BTreeMap<String, f64>) -> f64 {
        let positions_value: f64 = self
            .positions
            .iter()
            .map(|(symbol, shares)| shares * prices.get(symbol).copied().unwrap_or(0.0))
            .sum();
        self.cash + positions_value
    }

    pub fn weights(&self, prices: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
        let total = self.total_value(prices);
        if total == 0.0 {
            return BTreeMap::new();
        }
        self.positions
            .iter()
            .filter_map(|(symbol, shares)| {
                prices.get(symbol).map(|price| (symbol.clone(), price * shares / total))
            })
            .collect()
    }

    /// Resolve `target_weights` to share counts at `prices`, without placing
    /// any trades. Used to fix share counts at decision time (this bar's
    /// closes) ahead of an execution that happens on a later bar.
    pub fn shares_for_weights(
        &self,
        target_weights: &BTreeMap<String, f64>,
        prices: &BTreeMap<String, f64>,
    ) -> Result<BTreeMap<String, f64>, EngineError> {
        let total_weight: f64 = target_weights.values().sum();
        if total_weight > MAX_WEIGHT_SUM {
            return Err(EngineError::WeightsExceedOne { sum: total_weight });
        }

        let total_value = self.total_value(prices);

        let mut target_shares = BTreeMap::new();
        for (symbol, weight) in target_weights {
            let price = *prices
                .get(symbol)
                .ok_or_else(|| EngineError::MissingPrice {
                    symbol: symbol.clone(),
                })?;
            target_shares.insert(symbol.clone(), total_value * weight / price);
        }
        Ok(target_shares)
    }

    /// Rebalance to `target_weights` at `prices`, producing one trade per
    /// symbol whose share delta clears the dust threshold. Valuation and
    /// sizing both happen at `prices`.
    pub fn rebalance(
        &mut self,
        target_weights: &BTreeMap<String, f64>,
        prices: &BTreeMap<String, f64>,
        timestamp: DateTime<Utc>,
        frictions: ExecutionFrictions,
    ) -> Result<Vec<Trade>, EngineError> {
        let target_shares = self.shares_for_weights(target_weights, prices)?;
        Ok(self.execute_shares(&target_shares, prices, timestamp, frictions))
    }

    /// Trade toward already-resolved `target_shares` at `prices`. Used when
    /// the share counts were fixed on an earlier bar and only the fill price
    /// (plus slippage) comes from `prices`.
    pub fn execute_shares(
        &mut self,
        target_shares: &BTreeMap<String, f64>,
        prices: &BTreeMap<String, f64>,
        timestamp: DateTime<Utc>,
        frictions: ExecutionFrictions,
    ) -> Vec<Trade> {
        let mut trades = Vec::new();
        let symbols: Vec<String> = self.positions.keys().cloned().collect();

        for symbol in symbols {
            let Some(&price) = prices.get(&symbol) else {
                continue;
            };
            let current = self.positions[&symbol];
            let target = target_shares.get(&symbol).copied().unwrap_or(0.0);
            let mut delta = target - current;

            if (delta * price).abs() < DUST_THRESHOLD_USD {
                continue;
            }

            if delta < 0.0 && !frictions.allow_short_selling {
                delta = delta.max(-current);
                if (delta * price).abs() < DUST_THRESHOLD_USD {
                    continue;
                }
            }

            let exec_price = if delta > 0.0 {
                price * (1.0 + frictions.slippage_bps / 1e4)
            } else {
                price * (1.0 - frictions.slippage_bps / 1e4)
            };

            let trade_value = delta.abs() * exec_price;

            if delta > 0.0 {
                *self.positions.get_mut(&symbol).unwrap() += delta;
                self.cash -= trade_value;
            } else {
                *self.positions.get_mut(&symbol).unwrap() += delta; // delta negative
                self.cash += trade_value;
            }

            trades.push(Trade {
                id: Uuid::new_v4(),
                timestamp,
                symbol,
                trade_type: if delta > 0.0 { TradeType::Buy } else { TradeType::Sell },
                price: rust_decimal::Decimal::try_from(exec_price).unwrap_or_default(),
                shares: delta.abs(),
            });
        }

        trades
    }

    /// Liquidate every non-zero position at `prices`, used once on the final
    /// bar of the timeline.
    pub fn liquidate(
        &mut self,
        prices: &BTreeMap<String, f64>,
        timestamp: DateTime<Utc>,
    ) -> Vec<Trade> {
        let zero_shares = BTreeMap::new();
        self.execute_shares(
            &zero_shares,
            prices,
            timestamp,
            ExecutionFrictions {
                allow_short_selling: true,
                ..Default::default()
            },
        )
    }

    /// Per-bar OHLC of the portfolio's mark-to-market value: cash plus each
    /// held position valued at the bar's O/H/L/C. Positions with zero or
    /// negative shares are skipped, matching long-only valuation.
    pub fn bar_ohlc(&self, slice: &Slice) -> (f64, f64, f64, f64) {
        let mut o = self.cash;
        let mut h = self.cash;
        let mut l = self.cash;
        let mut c = self.cash;

        for (symbol, &shares) in &self.positions {
            if shares <= 0.0 {
                continue;
            }
            if let Some(bar) = slice.get(symbol) {
                o += shares * bar.open;
                h += shares * bar.high;
                l += shares * bar.low;
                c += shares * bar.close;
            }
        }

        (o, h, l, c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn prices(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn rejects_weights_over_one() {
        let mut p = Portfolio::new(10_000.0, &["SPY".into()]);
        let mut weights = BTreeMap::new();
        weights.insert("SPY".to_string(), 1.1);
        let err = p
            .rebalance(&weights, &prices(&[("SPY", 100.0)]), ts(), ExecutionFrictions::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::WeightsExceedOne { .. }));
    }

    #[test]
    fn buys_into_target_weight() {
        let mut p = Portfolio::new(10_000.0, &["SPY".into()]);
        let mut weights = BTreeMap::new();
        weights.insert("SPY".to_string(), 0.5);
        let trades = p
            .rebalance(&weights, &prices(&[("SPY", 100.0)]), ts(), ExecutionFrictions::default())
            .unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].trade_type, TradeType::Buy);
        assert!((p.positions["SPY"] - 50.0).abs() < 1e-9);
        assert!((p.cash - 5_000.0).abs() < 1e-6);
    }

    #[test]
    fn skips_dust_sized_changes() {
        let mut p = Portfolio::new(10_000.0, &["SPY".into()]);
        p.positions.insert("SPY".to_string(), 50.0);
        p.cash = 5_000.0;
        let mut weights = BTreeMap::new();
        // Same target as current, tiny price move shouldn't force a trade.
        weights.insert("SPY".to_string(), 0.500001);
        let trades = p
            .rebalance(&weights, &prices(&[("SPY", 100.0)]), ts(), ExecutionFrictions::default())
            .unwrap();
        assert!(trades.is_empty());
    }

    #[test]
    fn clamps_sells_when_short_selling_disabled() {
        let mut p = Portfolio::new(10_000.0, &["SPY".into()]);
        p.positions.insert("SPY".to_string(), 10.0);
        p.cash = 9_000.0;
        let weights = BTreeMap::new(); // liquidate to zero, not negative
        let trades = p
            .rebalance(
                &weights,
                &prices(&[("SPY", 100.0)]),
                ts(),
                ExecutionFrictions {
                    allow_short_selling: false,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(trades.len(), 1);
        assert!((p.positions["SPY"]).abs() < 1e-9);
    }
}
