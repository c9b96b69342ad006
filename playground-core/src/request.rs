//! Adapting host call arguments into a `CompileRequest`.
//!
//! Two call shapes are accepted for the single argument:
//!
//! - a string, which is the source text itself;
//! - a record `{ source, lang?, disableTypes?, runtime? }`.
//!
//! Both produce the same `CompileRequest`, so everything downstream runs
//! through one path. Option values are passed along untouched; checking
//! them is the compiler's job.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::compiler::CompileOptions;
use crate::error::BridgeError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileRequest {
    pub source: String,
    pub language: Option<String>,
    pub disable_types: Option<bool>,
    pub runtime_path: Option<PathBuf>,
}

/// Wire form of the structured call shape.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuredArgs {
    source: String,
    #[serde(default)]
    lang: Option<String>,
    #[serde(default)]
    disable_types: Option<bool>,
    #[serde(default)]
    runtime: Option<PathBuf>,
}

impl From<StructuredArgs> for CompileRequest {
    fn from(args: StructuredArgs) -> Self {
        CompileRequest {
            source: args.source,
            language: args.lang,
            disable_types: args.disable_types,
            runtime_path: args.runtime,
        }
    }
}

impl CompileRequest {
    /// A request carrying only source text; every setting is left to the
    /// compiler's defaults.
    pub fn new(source: impl Into<String>) -> Self {
        CompileRequest {
            source: source.into(),
            ..CompileRequest::default()
        }
    }

    /// Build a request from the full host argument list.
    pub fn from_args(args: &[Value]) -> Result<Self, BridgeError> {
        match args {
            [arg] => Self::from_value(arg),
            _ => Err(BridgeError::InvalidArgumentCount { given: args.len() }),
        }
    }

    /// Build a request from a single host argument of either shape.
    pub fn from_value(arg: &Value) -> Result<Self, BridgeError> {
        let request = match arg {
            Value::String(source) => CompileRequest::new(source.clone()),
            Value::Object(_) => StructuredArgs::deserialize(arg)
                .map(CompileRequest::from)
                .map_err(|err| BridgeError::InvalidArgument(err.to_string()))?,
            other => {
                return Err(BridgeError::InvalidArgument(format!(
                    "expected source text or a request record, found {}",
                    value_kind(other)
                )));
            }
        };
        tracing::trace!(
            source_len = request.source.len(),
            language = ?request.language,
            disable_types = ?request.disable_types,
            runtime_path = ?request.runtime_path,
            "adapted compile request"
        );
        Ok(request)
    }

    /// Settings to hand to the compiler, or `None` when nothing was set.
    pub fn options(&self) -> Option<CompileOptions> {
        let options = CompileOptions {
            language: self.language.clone(),
            runtime_path: self.runtime_path.clone(),
            disable_types: self.disable_types,
        };
        if options.is_empty() { None } else { Some(options) }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a record",
    }
}
