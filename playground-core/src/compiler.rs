//! Contract of the external compiler collaborator.
//!
//! The bridge treats the compiler as a black box: it hands over the source
//! text wrapped in a `SourceStream` plus optional settings, and gets back
//! either an artifact or the list of errors the compiler reported.

use std::fmt;
use std::path::PathBuf;
use std::str::Chars;

use serde::Serialize;
use thiserror::Error;

/// Anything that can turn source text into an artifact.
pub trait Compiler {
    /// Compile `input`. `options` is `None` when the caller supplied no
    /// settings at all; the compiler then applies its own defaults.
    fn compile(
        &self,
        input: SourceStream<'_>,
        options: Option<&CompileOptions>,
    ) -> Result<Artifact, Vec<CompilerError>>;
}

/// Read-only view of the source text handed to the compiler.
///
/// The content is never transformed on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceStream<'src> {
    text: &'src str,
}

impl<'src> SourceStream<'src> {
    pub fn new(text: &'src str) -> Self {
        SourceStream { text }
    }

    pub fn as_str(&self) -> &'src str {
        self.text
    }

    pub fn chars(&self) -> Chars<'src> {
        self.text.chars()
    }
}

/// Optional compiler settings. `None` fields mean "use the compiler default".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub language: Option<String>,
    pub runtime_path: Option<PathBuf>,
    pub disable_types: Option<bool>,
}

impl CompileOptions {
    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.runtime_path.is_none() && self.disable_types.is_none()
    }
}

/// Compiled output, passed to the host verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Artifact(String);

impl Artifact {
    pub fn new(text: impl Into<String>) -> Self {
        Artifact(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Location of a single token as the compiler reports it.
///
/// `line` is 1-based, `column` is 0-based. The offsets are inclusive
/// character indices into the source, so a one-character token has
/// `start_offset == stop_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub line: u32,
    pub column: u32,
    pub start_offset: usize,
    pub stop_offset: usize,
}

/// Grammar rule node an error was attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleNode {
    pub name: String,
    pub start: TokenSpan,
    pub stop: TokenSpan,
}

/// Error detected by the lexer or parser at a single location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

/// Error detected by the type checker, attributed to a rule node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    pub message: String,
    pub rule: RuleNode,
}

/// One entry of the compiler's error list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilerError {
    #[error("syntax error at {}:{}: {}", .0.line, .0.column, .0.message)]
    Syntax(SyntaxError),
    #[error("type error in {}: {}", .0.rule.name, .0.message)]
    Type(TypeError),
    #[error("{0}")]
    Other(String),
}

impl CompilerError {
    pub fn syntax(message: impl Into<String>, line: u32, column: u32) -> Self {
        CompilerError::Syntax(SyntaxError {
            message: message.into(),
            line,
            column,
        })
    }

    pub fn type_error(message: impl Into<String>, rule: RuleNode) -> Self {
        CompilerError::Type(TypeError {
            message: message.into(),
            rule,
        })
    }

    /// Wrap any value without position data, keeping only its text.
    pub fn other(value: impl fmt::Display) -> Self {
        CompilerError::Other(value.to_string())
    }

    /// The bare message, without any location prefix.
    pub fn message(&self) -> &str {
        match self {
            CompilerError::Syntax(err) => &err.message,
            CompilerError::Type(err) => &err.message,
            CompilerError::Other(text) => text,
        }
    }
}
