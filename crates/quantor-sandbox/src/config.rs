use std::time::Duration;

const DEFAULT_IMAGE: &str = "quantor-sandbox-child";
const DEFAULT_MAX_EXECUTION_SECS: u64 = 30;

/// Everything the executor needs to know about the container it spawns.
/// Read from the environment by `quantor-api`'s config loader; tests build
/// it directly.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    pub image: String,
    pub timeout: Duration,
    pub non_root_uid: u32,
    pub profile: String,
}

impl SandboxConfig {
    pub fn from_env() -> Self {
        let timeout_secs = std::env::var("MAX_EXECUTION_TIME")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_EXECUTION_SECS);

        Self {
            image: std::env::var("SANDBOX_IMAGE").unwrap_or_else(|_| DEFAULT_IMAGE.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            non_root_uid: 1000,
            profile: std::env::var("HQG_PROFILE").unwrap_or_else(|_| "0".to_string()),
        }
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            timeout: Duration::from_secs(DEFAULT_MAX_EXECUTION_SECS),
            non_root_uid: 1000,
            profile: "0".to_string(),
        }
    }
}
