use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use quantor_model::Bar;

const CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Thin wrapper over the Yahoo Finance chart endpoint. The provider this
/// backs is pluggable in name only for now — swapping the upstream means
/// swapping this client for one with the same `fetch_daily` contract.
#[derive(Clone)]
pub struct YahooFinanceClient {
    client: reqwest::Client,
}

impl YahooFinanceClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
                .build()
                .expect("reqwest client"),
        }
    }

    /// Fetch daily OHLCV bars for `symbol` covering `[start, end]`, inclusive.
    pub async fn fetch_daily(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>> {
        let period1 = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        let period2 = end.and_hms_opt(23, 59, 59).unwrap().and_utc().timestamp();

        let url = format!(
            "{CHART_URL}/{symbol}?period1={period1}&period2={period2}&interval=1d"
        );

        let response = self.client.get(&url).send().await?;
        let json: serde_json::Value = response.json().await?;

        let chart = json
            .get("chart")
            .and_then(|v| v.get("result"))
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .ok_or_else(|| anyhow!("no chart data for {symbol}"))?;

        let timestamps = chart
            .get("timestamp")
            .and_then(|v| v.as_array())
            .ok_or_else(|| anyhow!("no timestamps for {symbol}"))?;

        let quote = chart
            .get("indicators")
            .and_then(|v| v.get("quote"))
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .ok_or_else(|| anyhow!("no quote block for {symbol}"))?;

        let opens = field(quote, "open")?;
        let highs = field(quote, "high")?;
        let lows = field(quote, "low")?;
        let closes = field(quote, "close")?;
        let volumes = field(quote, "volume")?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for i in 0..timestamps.len() {
            let (Some(ts), Some(o), Some(h), Some(l), Some(c), Some(v)) = (
                timestamps[i].as_i64(),
                opens[i].as_f64(),
                highs[i].as_f64(),
                lows[i].as_f64(),
                closes[i].as_f64(),
                volumes[i].as_f64(),
            ) else {
                continue; // Yahoo nulls out rows for halted/missing sessions.
            };

            let date = chrono::DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| anyhow!("invalid timestamp for {symbol}"))?
                .date_naive();

            bars.push(Bar {
                date,
                open: o,
                high: h,
                low: l,
                close: c,
                volume: v,
            });
        }

        Ok(bars)
    }
}

fn field<'a>(quote: &'a serde_json::Value, name: &str) -> Result<&'a Vec<serde_json::Value>> {
    quote
        .get(name)
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("no {name} field in quote block"))
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}
