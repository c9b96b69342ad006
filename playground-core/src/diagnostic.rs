//! Positional diagnostics handed back to the host.
//!
//! Every entry of the compiler's error list is normalized into exactly one
//! `Diagnostic`. Lines are 1-based and columns 0-based, matching the
//! compiler's own numbering; the only adjustment made anywhere is the
//! end column of a type error, which points one past the last character
//! of the rule's final token.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::compiler::{CompilerError, RuleNode, SyntaxError, TokenSpan, TypeError};

/// A `(line, column)` pair. Ordered by line, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

/// Hosts receive positions as `[line, column]`.
impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.line, self.column).serialize(serializer)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Normalized error record.
///
/// `start` and `end` are both `None` for errors that carry no position
/// (they are omitted from the serialized form). Whenever they are present,
/// `end` is not before `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<Position>,
}

impl Diagnostic {
    /// A diagnostic spanning `start..end`, with `end` clamped to `start`.
    pub fn spanning(message: impl Into<String>, start: Position, end: Position) -> Self {
        let message = message.into();
        let end = if end < start {
            tracing::warn!(%start, %end, "diagnostic end precedes start, clamping");
            start
        } else {
            end
        };
        Diagnostic {
            message,
            start: Some(start),
            end: Some(end),
        }
    }

    /// A zero-width diagnostic at `at`.
    pub fn point(message: impl Into<String>, at: Position) -> Self {
        Diagnostic {
            message: message.into(),
            start: Some(at),
            end: Some(at),
        }
    }

    /// A diagnostic with no position at all.
    pub fn unpositioned(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            start: None,
            end: None,
        }
    }

    pub fn has_position(&self) -> bool {
        self.start.is_some()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start {
            Some(start) => write!(f, "{start}: error: {}", self.message),
            None => write!(f, "error: {}", self.message),
        }
    }
}

/// Normalize one compiler error. Total: every input yields a diagnostic.
pub fn normalize(error: &CompilerError) -> Diagnostic {
    match error {
        CompilerError::Syntax(err) => from_syntax(err),
        CompilerError::Type(err) => from_type(err),
        CompilerError::Other(text) => Diagnostic::unpositioned(text.clone()),
    }
}

impl From<&CompilerError> for Diagnostic {
    fn from(error: &CompilerError) -> Self {
        normalize(error)
    }
}

impl From<CompilerError> for Diagnostic {
    fn from(error: CompilerError) -> Self {
        normalize(&error)
    }
}

fn from_syntax(err: &SyntaxError) -> Diagnostic {
    Diagnostic::point(err.message.clone(), Position::new(err.line, err.column))
}

fn from_type(err: &TypeError) -> Diagnostic {
    let RuleNode { start, stop, .. } = &err.rule;
    Diagnostic::spanning(
        err.message.clone(),
        Position::new(start.line, start.column),
        end_of_token(stop),
    )
}

/// One column past the last character of `token`.
fn end_of_token(token: &TokenSpan) -> Position {
    let width = token.stop_offset as i64 - token.start_offset as i64;
    let column = i64::from(token.column) + width + 1;
    Position::new(token.line, saturate(column))
}

fn saturate(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Render diagnostics one per line, in order, for terminal output.
pub fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut output = String::new();
    for diag in diagnostics {
        output.push_str(&diag.to_string());
        output.push('\n');
    }
    output
}
