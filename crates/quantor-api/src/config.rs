use std::time::Duration;

/// Process configuration, read once at startup from the environment
/// (`dotenvy`-loaded `.env` file plus the real environment).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_cache_dir: String,
    pub log_dir: Option<String>,
    pub max_execution_time: Duration,
    pub max_request_time: Duration,
    pub rate_limit_per_minute: u32,
    pub rate_limit_per_hour: u32,
    pub jwks_url: Option<String>,
    pub profile: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or("API_HOST", "0.0.0.0"),
            port: env_parsed("API_PORT", 8000),
            data_cache_dir: env_or("DATA_CACHE_DIR", "./data"),
            log_dir: std::env::var("LOG_DIR").ok(),
            max_execution_time: Duration::from_secs(env_parsed("MAX_EXECUTION_TIME", 300)),
            max_request_time: Duration::from_secs(env_parsed("MAX_REQUEST_TIME", 600)),
            rate_limit_per_minute: env_parsed("RATE_LIMIT_PER_MINUTE", 60),
            rate_limit_per_hour: env_parsed("RATE_LIMIT_PER_HOUR", 1000),
            jwks_url: std::env::var("HQG_DASH_JWKS_URL").ok(),
            profile: env_or("HQG_PROFILE", "default"),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane_when_nothing_is_set() {
        // Safe to read without scrubbing the environment: these keys aren't
        // used anywhere else in the test binary.
        let config = Config::from_env();
        assert!(config.port > 0);
        assert!(config.rate_limit_per_minute > 0);
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let mut config = Config::from_env();
        config.host = "127.0.0.1".into();
        config.port = 9000;
        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
    }
}
