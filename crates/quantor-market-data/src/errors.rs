use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("no market data available for '{symbol}' in the requested window")]
    Empty { symbol: String },
    #[error("unsupported bar size '{0:?}'")]
    UnsupportedBarSize(quantor_model::BarSize),
    #[error("upstream fetch failed for '{symbol}': {source}")]
    Fetch {
        symbol: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("cache I/O failed for '{symbol}': {source}")]
    Cache {
        symbol: String,
        #[source]
        source: std::io::Error,
    },
}
