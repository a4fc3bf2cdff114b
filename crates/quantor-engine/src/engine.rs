use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use quantor_model::{Cadence, ExecutionTiming, MarketFrame, Trade};

use crate::errors::EngineError;
use crate::portfolio::{ExecutionFrictions, Portfolio};
use crate::signal::Signal;
use crate::slice::{PortfolioView, Slice};
use crate::strategy::Strategy;

/// One point of the portfolio's own OHLC curve, keyed like [`quantor_model::execution::EquityPoint`]
/// but carrying the full bar rather than just a close.
#[derive(Debug, Clone, Copy)]
pub struct PortfolioBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<(DateTime<Utc>, f64)>,
    pub ohlc: Vec<PortfolioBar>,
    pub final_value: f64,
    pub final_cash: f64,
    pub final_positions: BTreeMap<String, f64>,
}

/// An order placed on one bar and filled on a later one. Which variant is
/// used depends on the cadence's [`ExecutionTiming`]: `CLOSE_TO_NEXT_OPEN`
/// fixes share counts at decision time ([`PendingOrder::Shares`]);
/// `OPEN_TO_OPEN` defers sizing to the fill bar too ([`PendingOrder::Weights`]).
enum PendingOrder {
    Weights(BTreeMap<String, f64>),
    Shares(BTreeMap<String, f64>),
}

pub struct BacktestEngine<S: Strategy> {
    strategy: S,
    cadence: Cadence,
    frictions: ExecutionFrictions,
}

impl<S: Strategy> BacktestEngine<S> {
    pub fn new(strategy: S, cadence: Cadence, frictions: ExecutionFrictions) -> Self {
        Self {
            strategy,
            cadence,
            frictions,
        }
    }

    /// Run the full timeline: the intersection of per-symbol bar dates so
    /// every bar sees the whole universe, falling back to the union when
    /// the intersection is empty (non-overlapping calendars).
    pub fn run(&mut self, market: &MarketFrame, initial_cash: f64) -> Result<EngineOutput, EngineError> {
        let universe: Vec<String> = market.series.keys().cloned().collect();
        let mut portfolio = Portfolio::new(initial_cash, &universe);

        let by_symbol_date = index_by_date(market);
        let timeline = canonical_timeline(market);
        let mut equity_curve = Vec::with_capacity(timeline.len());
        let mut ohlc = Vec::with_capacity(timeline.len());
        let mut trades = Vec::new();
        let mut pending_order: Option<PendingOrder> = None;
        let mut final_closes = BTreeMap::new();

        for (i, date) in timeline.iter().enumerate() {
            let timestamp = to_timestamp(*date);
            let slice = build_slice(&by_symbol_date, *date);

            // 1. Execute any pending order from the previous decision bar.
            if let Some(order) = pending_order.take() {
                let open_prices = slice.opens();
                let fills = match order {
                    // OPEN_TO_OPEN: sizing was deferred too, so resolve the
                    // weights against this bar's opens before trading.
                    PendingOrder::Weights(weights) => {
                        portfolio.rebalance(&weights, &open_prices, timestamp, self.frictions)?
                    }
                    // CLOSE_TO_NEXT_OPEN: shares were already fixed against
                    // the decision bar's closes; only the fill happens here.
                    PendingOrder::Shares(shares) => {
                        portfolio.execute_shares(&shares, &open_prices, timestamp, self.frictions)
                    }
                };
                trades.extend(fills);
            }

            // 2/3. Mark-to-market and build the view handed to the strategy.
            let closes = slice.closes();
            final_closes = closes.clone();
            let equity = portfolio.total_value(&closes);
            equity_curve.push((timestamp, equity));

            let (o, h, l, c) = portfolio.bar_ohlc(&slice);
            ohlc.push(PortfolioBar {
                timestamp,
                open: o,
                high: h,
                low: l,
                close: c,
            });

            let view = PortfolioView {
                cash: portfolio.cash,
                equity,
                positions: portfolio.positions.clone(),
                weights: portfolio.weights(&closes),
            };

            // 4. Ask the strategy what to do.
            let signal = self
                .strategy
                .on_data(&slice, &view)
                .map_err(|e| EngineError::StrategyFailed(e.to_string()))?;

            let Some(target) = signal.target_weights() else {
                continue;
            };

            match self.cadence.execution {
                ExecutionTiming::CloseToClose => {
                    let fills = portfolio.rebalance(&target, &closes, timestamp, self.frictions)?;
                    trades.extend(fills);
                }
                ExecutionTiming::CloseToNextOpen => {
                    // Decide with this bar's closes, fill on the next bar's open.
                    if i + 1 < timeline.len() {
                        let shares = portfolio.shares_for_weights(&target, &closes)?;
                        pending_order = Some(PendingOrder::Shares(shares));
                    }
                    // No next bar to execute on: the position never opens.
                }
                ExecutionTiming::OpenToOpen => {
                    // Defer both sizing and fill to the next bar's open.
                    if i + 1 < timeline.len() {
                        pending_order = Some(PendingOrder::Weights(target));
                    }
                }
            }
        }

        // Final-bar liquidation of whatever remains open.
        let mut final_value = portfolio.total_value(&final_closes);
        if let Some(last_date) = timeline.last() {
            let timestamp = to_timestamp(*last_date);
            let fills = portfolio.liquidate(&final_closes, timestamp);
            trades.extend(fills);
            final_value = portfolio.total_value(&final_closes);

            if let Some(last_point) = equity_curve.last_mut() {
                last_point.1 = final_value;
            }
        }

        Ok(EngineOutput {
            trades,
            equity_curve,
            ohlc,
            final_value,
            final_cash: portfolio.cash,
            final_positions: portfolio.positions,
        })
    }
}

type DateIndex = BTreeMap<String, BTreeMap<NaiveDate, quantor_model::Bar>>;

fn index_by_date(market: &MarketFrame) -> DateIndex {
    market
        .series
        .iter()
        .map(|(symbol, bars)| (symbol.clone(), bars.iter().map(|b| (b.date, *b)).collect()))
        .collect()
}

/// Intersection of per-symbol bar dates, preferred so every bar sees the
/// whole universe; falls back to the union when symbols have no common
/// trading days (disjoint calendars).
fn canonical_timeline(market: &MarketFrame) -> Vec<NaiveDate> {
    let mut series = market.series.values();
    let intersection = match series.next() {
        Some(first) => {
            let mut dates: BTreeSet<NaiveDate> = first.iter().map(|b| b.date).collect();
            for bars in series {
                let this_symbol: BTreeSet<NaiveDate> = bars.iter().map(|b| b.date).collect();
                dates = dates.intersection(&this_symbol).copied().collect();
            }
            dates
        }
        None => BTreeSet::new(),
    };

    if intersection.is_empty() {
        union_timeline(market)
    } else {
        intersection.into_iter().collect()
    }
}

fn union_timeline(market: &MarketFrame) -> Vec<NaiveDate> {
    let mut dates: BTreeSet<NaiveDate> = BTreeSet::new();
    for bars in market.series.values() {
        for bar in bars {
            dates.insert(bar.date);
        }
    }
    dates.into_iter().collect()
}

fn build_slice(by_symbol_date: &DateIndex, date: NaiveDate) -> Slice {
    let mut bars = BTreeMap::new();
    for (symbol, dated) in by_symbol_date {
        if let Some(bar) = dated.get(&date) {
            bars.insert(symbol.clone(), *bar);
        }
    }
    Slice::new(bars)
}

fn to_timestamp(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0).unwrap().and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantor_model::{Bar, BarSize};

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

    fn ohlc_bar(day: u32, open: f64, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 1_000.0,
        }
    }

    fn market(series: BTreeMap<String, Vec<Bar>>) -> MarketFrame {
        MarketFrame {
            bar_size: BarSize::Daily,
            series,
        }
    }

    /// Targets 100% of the portfolio into a single symbol on the first bar
    /// it sees, then holds.
    struct BuyOnceStrategy {
        symbol: String,
        placed: bool,
    }

    impl Strategy for BuyOnceStrategy {
        fn on_data(&mut self, _slice: &Slice, _view: &PortfolioView) -> Result<Signal, EngineError> {
            if self.placed {
                return Ok(Signal::Hold);
            }
            self.placed = true;
            let mut weights = BTreeMap::new();
            weights.insert(self.symbol.clone(), 1.0);
            Ok(Signal::TargetWeights(weights))
        }
    }

    /// CLOSE_TO_NEXT_OPEN sizes shares from the decision bar's close, then
    /// fills those fixed shares at the next bar's open.
    #[test]
    fn close_to_next_open_sizes_at_the_decision_closes_not_the_fill_opens() {
        let mut series = BTreeMap::new();
        series.insert(
            "AAA".to_string(),
            vec![ohlc_bar(1, 10.0, 20.0), ohlc_bar(2, 100.0, 100.0)],
        );
        let strategy = BuyOnceStrategy {
            symbol: "AAA".to_string(),
            placed: false,
        };
        let cadence = Cadence {
            bar_size: BarSize::Daily,
            execution: ExecutionTiming::CloseToNextOpen,
        };
        let mut engine = BacktestEngine::new(strategy, cadence, ExecutionFrictions::default());
        let output = engine.run(&market(series), 1_000.0).unwrap();

        // 1_000 / day-1 close (20.0) = 50 shares, filled at day-2's open (100.0).
        let buy = output.trades.iter().find(|t| t.trade_type == quantor_model::TradeType::Buy).unwrap();
        assert!((buy.shares - 50.0).abs() < 1e-9);
    }

    /// OPEN_TO_OPEN defers both sizing and fill to the next bar's open.
    #[test]
    fn open_to_open_sizes_and_fills_at_the_next_bar_opens() {
        let mut series = BTreeMap::new();
        series.insert(
            "AAA".to_string(),
            vec![ohlc_bar(1, 10.0, 20.0), ohlc_bar(2, 100.0, 100.0)],
        );
        let strategy = BuyOnceStrategy {
            symbol: "AAA".to_string(),
            placed: false,
        };
        let cadence = Cadence {
            bar_size: BarSize::Daily,
            execution: ExecutionTiming::OpenToOpen,
        };
        let mut engine = BacktestEngine::new(strategy, cadence, ExecutionFrictions::default());
        let output = engine.run(&market(series), 1_000.0).unwrap();

        // 1_000 / day-2 open (100.0) = 10 shares, both sized and filled there.
        let buy = output.trades.iter().find(|t| t.trade_type == quantor_model::TradeType::Buy).unwrap();
        assert!((buy.shares - 10.0).abs() < 1e-9);
    }

    #[test]
    fn canonical_timeline_prefers_the_intersection() {
        let mut series = BTreeMap::new();
        series.insert("AAA".to_string(), vec![bar(1, 1.0), bar(2, 1.0), bar(3, 1.0)]);
        series.insert("BBB".to_string(), vec![bar(2, 1.0), bar(3, 1.0), bar(4, 1.0)]);
        let timeline = canonical_timeline(&market(series));

        assert_eq!(
            timeline,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            ]
        );
    }

    #[test]
    fn canonical_timeline_falls_back_to_the_union_when_calendars_never_overlap() {
        let mut series = BTreeMap::new();
        series.insert("AAA".to_string(), vec![bar(1, 1.0), bar(2, 1.0)]);
        series.insert("BBB".to_string(), vec![bar(3, 1.0), bar(4, 1.0)]);
        let timeline = canonical_timeline(&market(series));

        assert_eq!(
            timeline,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            ]
        );
    }
}
