use serde::{Deserialize, Serialize};
use std::fmt;

/// A single accumulated problem found while validating or running a strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEntry {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{} (line {})", self.message, line),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Ordered, accumulating list of [`ErrorEntry`] values.
///
/// Mirrors `BacktestRequestError` from the original implementation: callers
/// `push` as they walk a request or an AST, then check `is_empty()` as a gate
/// between pipeline stages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorList(pub Vec<ErrorEntry>);

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(ErrorEntry {
            message: message.into(),
            line: None,
        });
    }

    pub fn push_at(&mut self, message: impl Into<String>, line: Option<u32>) {
        self.0.push(ErrorEntry {
            message: message.into(),
            line,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ErrorEntry> {
        self.0.iter()
    }

    pub fn extend(&mut self, other: ErrorList) {
        self.0.extend(other.0);
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(|e| e.to_string()).collect()
    }
}

impl IntoIterator for ErrorList {
    type Item = ErrorEntry;
    type IntoIter = std::vec::IntoIter<ErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// User-fixable errors: syntax, disallowed imports/builtins/attributes,
/// missing `Strategy` subclass, malformed `universe`/`cadence` literals.
/// Rendered inline in the strategy editor as `analysis_errors`.
#[derive(Debug, thiserror::Error, Clone)]
#[error("validation failed: {0}")]
pub struct ValidationError(pub ErrorList);

impl ValidationError {
    pub fn new(errors: ErrorList) -> Self {
        Self(errors)
    }

    pub fn single(message: impl Into<String>) -> Self {
        let mut errors = ErrorList::new();
        errors.push(message);
        Self(errors)
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}

/// Runtime/system errors: empty market data, isolate timeout/non-zero exit,
/// user-code exceptions, output-validator rejections. Shown to the user as
/// a traceback, as `execution_errors`.
#[derive(Debug, thiserror::Error, Clone)]
#[error("execution failed: {0}")]
pub struct ExecutionError(pub ErrorList);

impl ExecutionError {
    pub fn new(errors: ErrorList) -> Self {
        Self(errors)
    }

    pub fn single(message: impl Into<String>) -> Self {
        let mut errors = ErrorList::new();
        errors.push(message);
        Self(errors)
    }
}

/// The three error surfaces a pipeline stage can raise, threaded by the
/// orchestrator and mapped to HTTP status codes at the API boundary.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
