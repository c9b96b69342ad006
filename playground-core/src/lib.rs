//! Host-callable compile bridge.
//!
//! This crate sits between an embedding host (a browser page, a terminal
//! front end, a test harness) and an external compiler. It does not lex,
//! parse or type-check anything itself. A call flows as:
//!
//!   host arguments
//!     -> request    (call shape -> CompileRequest)
//!     -> bridge     (invoke the Compiler collaborator)
//!     -> diagnostic (each compiler error -> positional Diagnostic)
//!     -> CompileResult / HostResponse back to the host
//!
//! Hosts should depend on this crate and supply a `Compiler`
//! implementation rather than reimplementing the adaptation logic.

// ---------------------------------------------------------------------
// Error handling and diagnostics
// ---------------------------------------------------------------------

pub mod error;
pub mod diagnostic;

// ---------------------------------------------------------------------
// Collaborator contract
// ---------------------------------------------------------------------

pub mod compiler;

// ---------------------------------------------------------------------
// Request adaptation and orchestration
// ---------------------------------------------------------------------

pub mod request;
pub mod bridge;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use bridge::{Bridge, CompileResult, ENTRY_POINT, GLOBAL_NAME, HostResponse, USAGE_ERROR};
pub use compiler::{
    Artifact, CompileOptions, Compiler, CompilerError, RuleNode, SourceStream, SyntaxError,
    TokenSpan, TypeError,
};
pub use diagnostic::{Diagnostic, Position, normalize, render_diagnostics};
pub use error::BridgeError;
pub use request::CompileRequest;
