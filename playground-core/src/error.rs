use thiserror::Error;

use crate::bridge::USAGE_ERROR;

/// Caller-contract violations.
///
/// These are never source diagnostics: the host receives them as a plain
/// string through the usage-error channel instead of a `CompileResult`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("{}", USAGE_ERROR)]
    InvalidArgumentCount { given: usize },
    #[error("Invalid argument passed: {0}")]
    InvalidArgument(String),
}
