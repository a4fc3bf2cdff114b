use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Buy/sell side of a [`Trade`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeType {
    #[serde(rename = "Buy")]
    Buy,
    #[serde(rename = "Sell")]
    Sell,
}

/// A single fill produced by the engine's rebalance step.
///
/// Invariant: `price > 0` and `amount > 0` — direction lives entirely in
/// `trade_type`, never in the sign of either field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "ticker")]
    pub symbol: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub price: Decimal,
    #[serde(rename = "amount")]
    pub shares: f64,
}
