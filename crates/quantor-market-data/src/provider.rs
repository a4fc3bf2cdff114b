use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate, Utc};

use quantor_model::{BarSize, MarketFrame, SymbolSeries};

use crate::cache::SymbolCache;
use crate::client::YahooFinanceClient;
use crate::errors::DataError;
use crate::lock::SymbolLockTable;
use crate::resample::resample;

/// Everything older than this is fetched and cached on first touch, so later
/// requests for the same symbol — regardless of who asked — can often be
/// served from disk alone.
pub fn default_floor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()
}

/// Tolerance for a symbol's first trade landing after `DEFAULT_FLOOR` (young
/// IPOs, recently listed ETFs) so coverage checks don't refetch forever.
const YOUNG_SYMBOL_GRACE_DAYS: i64 = 30;

pub struct MarketDataProvider {
    cache: SymbolCache,
    client: YahooFinanceClient,
    locks: SymbolLockTable,
}

impl MarketDataProvider {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache: SymbolCache::new(cache_dir),
            client: YahooFinanceClient::new(),
            locks: SymbolLockTable::new(),
        }
    }

    /// Fetch `symbols` over `[start, end]` at `bar_size`, ensuring the
    /// per-symbol cache covers the window first.
    pub async fn get_data(
        &self,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
        bar_size: BarSize,
    ) -> Result<MarketFrame, DataError> {
        let fetch_start = start.min(default_floor());
        let fetch_end = last_trading_day();

        let mut needs_fetch = Vec::new();
        for symbol in symbols {
            let cached = self.cache.load(symbol)?;
            if !covers(&cached, fetch_start, fetch_end) {
                needs_fetch.push(symbol.clone());
            }
        }

        if !needs_fetch.is_empty() {
            let _guards = self.locks.acquire_sorted(&needs_fetch).await;
            for symbol in &needs_fetch {
                // Re-check under lock: another task may have just filled
                // this symbol's gap while we were waiting.
                let cached = self.cache.load(symbol)?;
                if covers(&cached, fetch_start, fetch_end) {
                    continue;
                }

                let fetched = self
                    .client
                    .fetch_daily(symbol, fetch_start, fetch_end)
                    .await
                    .map_err(|source| DataError::Fetch {
                        symbol: symbol.clone(),
                        source,
                    })?;

                let mut series = cached.unwrap_or_else(|| SymbolSeries {
                    symbol: symbol.clone(),
                    bars: Vec::new(),
                });
                series.merge(&SymbolSeries {
                    symbol: symbol.clone(),
                    bars: fetched,
                });
                self.cache.store(&series)?;
            }
        }

        let mut series_by_symbol = BTreeMap::new();
        for symbol in symbols {
            let series = self.cache.load(symbol)?.ok_or_else(|| DataError::Empty {
                symbol: symbol.clone(),
            })?;

            let daily: Vec<_> = series
                .bars
                .into_iter()
                .filter(|b| b.date >= start && b.date <= end)
                .collect();

            if daily.is_empty() {
                return Err(DataError::Empty {
                    symbol: symbol.clone(),
                });
            }

            series_by_symbol.insert(symbol.clone(), resample(&daily, bar_size));
        }

        Ok(MarketFrame {
            bar_size,
            series: series_by_symbol,
        })
    }
}

fn covers(cached: &Option<SymbolSeries>, fetch_start: NaiveDate, fetch_end: NaiveDate) -> bool {
    let Some(series) = cached else {
        return false;
    };
    let (Some(min), Some(max)) = (series.min_date(), series.max_date()) else {
        return false;
    };

    let covers_end = max >= fetch_end;
    let covers_start =
        fetch_start >= default_floor() || min <= fetch_start + Duration::days(YOUNG_SYMBOL_GRACE_DAYS);

    covers_end && covers_start
}

/// Last day upstream could plausibly have published a close for, ignoring
/// market holidays — trimmed to the most recent weekday.
fn last_trading_day() -> NaiveDate {
    use chrono::Weekday;

    let mut day = Utc::now().date_naive();
    loop {
        match day.weekday() {
            Weekday::Sat | Weekday::Sun => day -= Duration::days(1),
            _ => return day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quantor_model::Bar;

    fn series(min: NaiveDate, max: NaiveDate) -> SymbolSeries {
        SymbolSeries {
            symbol: "SPY".into(),
            bars: vec![
                Bar {
                    date: min,
                    open: 1.0,
                    high: 1.0,
                    low: 1.0,
                    close: 1.0,
                    volume: 1.0,
                },
                Bar {
                    date: max,
                    open: 1.0,
                    high: 1.0,
                    low: 1.0,
                    close: 1.0,
                    volume: 1.0,
                },
            ],
        }
    }

    #[test]
    fn missing_series_never_covers() {
        assert!(!covers(&None, default_floor(), default_floor()));
    }

    #[test]
    fn covers_when_window_fully_cached() {
        let s = series(
            NaiveDate::from_ymd_opt(1999, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        );
        assert!(covers(
            &Some(s),
            default_floor(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        ));
    }

    #[test]
    fn young_symbol_within_grace_period_covers() {
        let s = series(
            NaiveDate::from_ymd_opt(2000, 1, 20).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        );
        assert!(covers(
            &Some(s),
            default_floor(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        ));
    }

    #[test]
    fn stale_end_does_not_cover() {
        let s = series(
            default_floor(),
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        );
        assert!(!covers(
            &Some(s),
            default_floor(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        ));
    }
}
