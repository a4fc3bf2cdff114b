use std::collections::BTreeMap;

use quantor_model::{Trade, TradeType};
use rust_decimal::prelude::ToPrimitive;

struct Lot {
    price: f64,
    qty: f64,
}

#[derive(Default)]
struct SymbolTrades {
    buys: Vec<Lot>,
    sells: Vec<Lot>,
}

fn group_by_symbol(trades: &[Trade]) -> BTreeMap<&str, SymbolTrades> {
    let mut by_symbol: BTreeMap<&str, SymbolTrades> = BTreeMap::new();
    for trade in trades {
        let entry = by_symbol.entry(trade.symbol.as_str()).or_default();
        let lot = Lot {
            price: trade.price.to_f64().unwrap_or(0.0),
            qty: trade.shares,
        };
        match trade.trade_type {
            TradeType::Buy => entry.buys.push(lot),
            TradeType::Sell => entry.sells.push(lot),
        }
    }
    by_symbol
}

/// Win rate over FIFO-matched buy/sell lots, not over whole trades — a trade
/// larger than the oldest open lot gets split across multiple matches.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }

    let mut winning = 0u32;
    let mut closed = 0u32;

    for (_, mut sides) in group_by_symbol(trades) {
        let mut buy_idx = 0usize;
        for sell in &sides.sells {
            let mut remaining = sell.qty;
            while remaining > 0.0 && buy_idx < sides.buys.len() {
                let buy = &mut sides.buys[buy_idx];
                let matched = remaining.min(buy.qty);

                let pnl = (sell.price - buy.price) * matched;
                if pnl > 0.0 {
                    winning += 1;
                }
                closed += 1;

                remaining -= matched;
                buy.qty -= matched;
                if buy.qty <= 0.0 {
                    buy_idx += 1;
                }
            }
        }
    }

    if closed == 0 {
        0.0
    } else {
        winning as f64 / closed as f64
    }
}

/// Average winning and losing percentage return per FIFO-matched lot.
pub fn avg_win_loss(trades: &[Trade]) -> (f64, f64) {
    if trades.is_empty() {
        return (0.0, 0.0);
    }

    let mut wins = Vec::new();
    let mut losses = Vec::new();

    for (_, mut sides) in group_by_symbol(trades) {
        let mut buy_idx = 0usize;
        for sell in &sides.sells {
            let mut remaining = sell.qty;
            while remaining > 0.0 && buy_idx < sides.buys.len() {
                let buy = &mut sides.buys[buy_idx];
                let matched = remaining.min(buy.qty);

                let pnl_pct = if buy.price != 0.0 {
                    (sell.price - buy.price) / buy.price
                } else {
                    0.0
                };
                if pnl_pct > 0.0 {
                    wins.push(pnl_pct);
                } else if pnl_pct < 0.0 {
                    losses.push(pnl_pct);
                }

                remaining -= matched;
                buy.qty -= matched;
                if buy.qty <= 0.0 {
                    buy_idx += 1;
                }
            }
        }
    }

    let avg = |xs: &[f64]| {
        if xs.is_empty() {
            0.0
        } else {
            xs.iter().sum::<f64>() / xs.len() as f64
        }
    };
    (avg(&wins), avg(&losses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn trade(symbol: &str, trade_type: TradeType, price: i64, shares: f64) -> Trade {
        Trade {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            symbol: symbol.to_string(),
            trade_type,
            price: Decimal::from(price),
            shares,
        }
    }

    #[test]
    fn profitable_round_trip_counts_as_a_win() {
        let trades = vec![
            trade("SPY", TradeType::Buy, 100, 10.0),
            trade("SPY", TradeType::Sell, 120, 10.0),
        ];
        assert_eq!(win_rate(&trades), 1.0);
        let (win, loss) = avg_win_loss(&trades);
        assert!((win - 0.2).abs() < 1e-9);
        assert_eq!(loss, 0.0);
    }

    #[test]
    fn sell_larger_than_oldest_lot_splits_across_buys() {
        let trades = vec![
            trade("SPY", TradeType::Buy, 100, 5.0),
            trade("SPY", TradeType::Buy, 110, 5.0),
            trade("SPY", TradeType::Sell, 115, 10.0),
        ];
        // Two matched lots: (100->115) win, (110->115) win.
        assert_eq!(win_rate(&trades), 1.0);
    }

    #[test]
    fn no_trades_is_zero_not_nan() {
        assert_eq!(win_rate(&[]), 0.0);
        assert_eq!(avg_win_loss(&[]), (0.0, 0.0));
    }
}
