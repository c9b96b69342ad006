use std::path::PathBuf;

use thiserror::Error;

/// Problems with the compile settings, reported before any analysis.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrontendError {
    #[error("unsupported target language '{0}'")]
    UnsupportedLanguage(String),
    #[error("runtime path {0:?} is not valid UTF-8")]
    InvalidRuntimePath(PathBuf),
}
