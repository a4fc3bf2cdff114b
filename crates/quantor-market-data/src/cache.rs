use std::io::Write;
use std::path::{Path, PathBuf};

use quantor_model::{Bar, SymbolSeries};

use crate::errors::DataError;

/// Durable per-symbol daily-bar cache. One NDJSON file per symbol — a
/// Parquet-shaped store buys nothing here since each file holds a single
/// `Vec<Bar>` and is read/written whole, and NDJSON keeps the dependency
/// surface aligned with what the rest of the pipeline already uses.
pub struct SymbolCache {
    root: PathBuf,
}

impl SymbolCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.root.join(format!("{symbol}.ndjson"))
    }

    pub fn load(&self, symbol: &str) -> Result<Option<SymbolSeries>, DataError> {
        let path = self.path_for(symbol);
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let mut bars = Vec::new();
                for line in contents.lines() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let bar: Bar = serde_json::from_str(line).map_err(|e| DataError::Cache {
                        symbol: symbol.to_string(),
                        source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
                    })?;
                    bars.push(bar);
                }
                Ok(Some(SymbolSeries {
                    symbol: symbol.to_string(),
                    bars,
                }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DataError::Cache {
                symbol: symbol.to_string(),
                source: e,
            }),
        }
    }

    /// Write `series` atomically: serialize to a temp file in the same
    /// directory, then rename over the target so a reader never observes a
    /// half-written cache file.
    pub fn store(&self, series: &SymbolSeries) -> Result<(), DataError> {
        std::fs::create_dir_all(&self.root).map_err(|e| DataError::Cache {
            symbol: series.symbol.clone(),
            source: e,
        })?;

        let final_path = self.path_for(&series.symbol);
        let tmp_path = self.root.join(format!("{}.ndjson.tmp", series.symbol));

        let write_result = (|| -> std::io::Result<()> {
            let mut file = std::fs::File::create(&tmp_path)?;
            for bar in &series.bars {
                let line = serde_json::to_string(bar)?;
                writeln!(file, "{line}")?;
            }
            file.sync_all()?;
            Ok(())
        })();

        write_result.map_err(|e| DataError::Cache {
            symbol: series.symbol.clone(),
            source: e,
        })?;

        std::fs::rename(&tmp_path, &final_path).map_err(|e| DataError::Cache {
            symbol: series.symbol.clone(),
            source: e,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 100.0,
        }
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SymbolCache::new(dir.path());
        let series = SymbolSeries {
            symbol: "SPY".to_string(),
            bars: vec![bar(1), bar(2)],
        };
        cache.store(&series).unwrap();

        let loaded = cache.load("SPY").unwrap().unwrap();
        assert_eq!(loaded.bars.len(), 2);
        assert_eq!(loaded.bars[0].date, bar(1).date);
    }

    #[test]
    fn missing_symbol_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SymbolCache::new(dir.path());
        assert!(cache.load("NOPE").unwrap().is_none());
    }
}
