//! Reference compiler for the playground language.
//!
//! This crate is the collaborator behind `playground_core::Bridge`: it
//! implements `playground_core::Compiler` and reports its errors in the
//! shapes the bridge knows how to normalize. The pipeline is:
//!
//!   source
//!     -> lexer     (tokens, syntax errors)
//!     -> parser    (AST with rule nodes, syntax errors)
//!     -> typecheck (statement types, type errors)
//!     -> codegen   (TypeScript or Go text)

// ---------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------

pub mod error;

// ---------------------------------------------------------------------
// Front-end: lexing and parsing
// ---------------------------------------------------------------------

pub mod lexer;
pub mod ast;
pub mod parser;

// ---------------------------------------------------------------------
// Semantic layer
// ---------------------------------------------------------------------

pub mod types;
pub mod typecheck;

// ---------------------------------------------------------------------
// Back-end and orchestration
// ---------------------------------------------------------------------

pub mod codegen;
pub mod compiler;
pub mod samples;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use codegen::Target;
pub use compiler::{DEFAULT_RUNTIME, PlaygroundCompiler};
pub use error::FrontendError;
pub use samples::{SAMPLES, Sample, find_sample};
