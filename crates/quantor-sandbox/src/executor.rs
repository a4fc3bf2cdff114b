use std::process::Stdio;

use quantor_model::{ErrorList, ExecutionPayload, RawExecutionResult};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::config::SandboxConfig;
use crate::errors::SandboxError;

/// Runs a validated strategy inside a hardened, network-isolated container
/// and speaks single-shot JSON over its stdin/stdout.
pub struct Executor {
    config: SandboxConfig,
}

impl Executor {
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    /// Spawn the container, send `payload` on stdin, read a
    /// [`RawExecutionResult`] back from stdout.
    ///
    /// Never returns an `Err`: every failure mode (spawn failure, timeout,
    /// empty stdout, malformed JSON) collapses to a zeroed result with the
    /// reason recorded in its `errors` field, matching the boundary the
    /// orchestrator expects.
    pub async fn execute(&self, payload: &ExecutionPayload) -> RawExecutionResult {
        match self.run(payload).await {
            Ok(result) => result,
            Err(message) => {
                let mut errors = ErrorList::new();
                errors.push(message);
                RawExecutionResult::failed(errors)
            }
        }
    }

    async fn run(&self, payload: &ExecutionPayload) -> Result<RawExecutionResult, String> {
        let payload_json =
            serde_json::to_vec(payload).map_err(|e| format!("failed to serialize payload: {e}"))?;

        let mut child = self
            .spawn()
            .map_err(|e| SandboxError::Spawn(e).to_string())?;

        let mut stdin = child.stdin.take().expect("stdin was piped");
        let write_result = stdin.write_all(&payload_json).await;
        drop(stdin); // close stdin so the container sees EOF
        write_result.map_err(|e| SandboxError::WriteStdin(e).to_string())?;

        let output = tokio::time::timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| format!("container timed out after {}s", self.config.timeout.as_secs()))?
            .map_err(|e| format!("container execution failed: {e}"))?;

        if !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("CONTAINER PROFILE") {
                tracing::info!("container stderr:\n{stderr}");
            } else {
                let truncated: String = stderr.chars().take(500).collect();
                tracing::warn!("container stderr: {truncated}");
            }
        }

        if output.stdout.iter().all(|b| b.is_ascii_whitespace()) {
            let stderr_snippet: String =
                String::from_utf8_lossy(&output.stderr).chars().take(500).collect();
            return Err(format!("container returned empty output. stderr: {stderr_snippet}"));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| format!("container returned malformed result: {e}"))
    }

    fn spawn(&self) -> std::io::Result<tokio::process::Child> {
        Command::new("docker")
            .args([
                "run",
                "--rm",
                "--interactive",
                "--network=none",
                "--read-only",
                "--tmpfs",
                "/tmp:size=64m,noexec,nosuid",
                "--memory=512m",
                "--cpus=1",
                "--pids-limit=64",
                "--security-opt=no-new-privileges",
                "--cap-drop=ALL",
                "--user",
                &self.config.non_root_uid.to_string(),
                "-e",
                &format!("HQG_PROFILE={}", self.config.profile),
                &self.config.image,
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quantor_model::{BarSize, MarketFrame};
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn payload() -> ExecutionPayload {
        ExecutionPayload {
            strategy_code: "class S(Strategy): pass".to_string(),
            name: None,
            start_date: Utc::now(),
            end_date: Utc::now(),
            initial_capital: Decimal::from(10_000),
            commission: Decimal::ZERO,
            slippage: Decimal::ZERO,
            market_data: MarketFrame {
                bar_size: BarSize::Daily,
                series: BTreeMap::new(),
            },
        }
    }

    #[tokio::test]
    async fn missing_docker_image_degrades_to_failed_result() {
        let config = SandboxConfig {
            image: "quantor-sandbox-child".to_string(),
            timeout: Duration::from_secs(5),
            non_root_uid: 1000,
            profile: "0".to_string(),
        };
        let executor = Executor::new(config);
        let result = executor.execute(&payload()).await;
        // No docker daemon in this test environment: the call either fails to
        // spawn or the container fails, both collapsing to a zeroed result.
        assert_eq!(result.final_value, 0.0);
        assert!(!result.errors.is_empty());
    }
}
