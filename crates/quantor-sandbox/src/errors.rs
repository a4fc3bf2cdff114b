use thiserror::Error;

/// Failures in spawning or talking to the container itself, as distinct from
/// failures the strategy caused inside it — those are reported through
/// [`quantor_model::RawExecutionResult::errors`], never through this type.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("failed to spawn docker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to write payload to container stdin: {0}")]
    WriteStdin(#[source] std::io::Error),
}
