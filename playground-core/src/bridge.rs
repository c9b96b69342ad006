//! The compile entry point exposed to hosts.
//!
//! `Bridge::call` is what a host registers under `GLOBAL_NAME.ENTRY_POINT`.
//! Each call is independent: validate arity, adapt the argument, invoke the
//! compiler once, normalize whatever it reported. Nothing is retained
//! between calls.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::compiler::{Artifact, Compiler, SourceStream};
use crate::diagnostic::{Diagnostic, normalize};
use crate::request::CompileRequest;

/// Global object the entry point is registered on.
pub const GLOBAL_NAME: &str = "playground";

/// Name of the entry point on `GLOBAL_NAME`.
pub const ENTRY_POINT: &str = "compile";

/// Usage string returned for calls with the wrong number of arguments.
pub const USAGE_ERROR: &str = "Invalid no of arguments passed";

const EMPTY_FAILURE: &str = "compilation failed without diagnostics";

/// Outcome of one compilation.
///
/// Serialized as `{ "errors": [...], "output": <text> | null }`. Exactly
/// one side is populated: a failure always holds at least one diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileResult {
    outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Success(Artifact),
    Failure(Vec<Diagnostic>),
}

impl CompileResult {
    pub fn success(output: Artifact) -> Self {
        CompileResult {
            outcome: Outcome::Success(output),
        }
    }

    /// A failed compilation. An empty list is replaced by a single
    /// unpositioned diagnostic.
    pub fn failure(errors: Vec<Diagnostic>) -> Self {
        let errors = if errors.is_empty() {
            tracing::warn!("compiler failed without reporting any errors");
            vec![Diagnostic::unpositioned(EMPTY_FAILURE)]
        } else {
            errors
        };
        CompileResult {
            outcome: Outcome::Failure(errors),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    pub fn errors(&self) -> &[Diagnostic] {
        match &self.outcome {
            Outcome::Success(_) => &[],
            Outcome::Failure(errors) => errors,
        }
    }

    pub fn output(&self) -> Option<&Artifact> {
        match &self.outcome {
            Outcome::Success(output) => Some(output),
            Outcome::Failure(_) => None,
        }
    }
}

impl Serialize for CompileResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CompileResult", 2)?;
        state.serialize_field("errors", self.errors())?;
        state.serialize_field("output", &self.output())?;
        state.end()
    }
}

/// What the host gets back from the entry point: a plain string for
/// caller mistakes, a `CompileResult` record otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HostResponse {
    Usage(String),
    Result(CompileResult),
}

impl HostResponse {
    pub fn is_usage_error(&self) -> bool {
        matches!(self, HostResponse::Usage(_))
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// Compile bridge over a compiler collaborator.
#[derive(Debug, Clone, Default)]
pub struct Bridge<C> {
    compiler: C,
}

impl<C: Compiler> Bridge<C> {
    pub fn new(compiler: C) -> Self {
        Bridge { compiler }
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// Host entry point. Never panics on malformed source or arguments.
    pub fn call(&self, args: &[Value]) -> HostResponse {
        match CompileRequest::from_args(args) {
            Ok(request) => HostResponse::Result(self.compile(&request)),
            Err(err) => {
                tracing::debug!(given = args.len(), %err, "rejected host call");
                HostResponse::Usage(err.to_string())
            }
        }
    }

    /// Compile an already adapted request.
    pub fn compile(&self, request: &CompileRequest) -> CompileResult {
        let options = request.options();
        let input = SourceStream::new(&request.source);
        tracing::debug!(
            source_len = input.as_str().len(),
            with_options = options.is_some(),
            "invoking compiler"
        );

        let result = match self.compiler.compile(input, options.as_ref()) {
            Ok(output) => CompileResult::success(output),
            Err(errors) => CompileResult::failure(errors.iter().map(normalize).collect()),
        };

        tracing::debug!(errors = result.errors().len(), "compile finished");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{CompileOptions, CompilerError, RuleNode, TokenSpan};
    use crate::diagnostic::Position;
    use serde_json::json;
    use std::cell::RefCell;

    /// Replies with a canned outcome and records every invocation.
    struct ScriptedCompiler {
        reply: Result<Artifact, Vec<CompilerError>>,
        calls: RefCell<Vec<(String, Option<CompileOptions>)>>,
    }

    impl ScriptedCompiler {
        fn succeeding(output: &str) -> Self {
            ScriptedCompiler {
                reply: Ok(Artifact::new(output)),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing(errors: Vec<CompilerError>) -> Self {
            ScriptedCompiler {
                reply: Err(errors),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl Compiler for ScriptedCompiler {
        fn compile(
            &self,
            input: SourceStream<'_>,
            options: Option<&CompileOptions>,
        ) -> Result<Artifact, Vec<CompilerError>> {
            self.calls
                .borrow_mut()
                .push((input.as_str().to_string(), options.cloned()));
            self.reply.clone()
        }
    }

    fn token(line: u32, column: u32, start_offset: usize, stop_offset: usize) -> TokenSpan {
        TokenSpan {
            line,
            column,
            start_offset,
            stop_offset,
        }
    }

    fn assert_exhaustive(result: &CompileResult) {
        let value = serde_json::to_value(result).expect("serialize");
        let errors = value["errors"].as_array().expect("errors array");
        let output = &value["output"];
        assert!(
            (errors.is_empty() && !output.is_null()) || (!errors.is_empty() && output.is_null()),
            "result violates the errors/output exclusivity: {value}"
        );
    }

    #[test]
    fn successful_compile_returns_artifact() {
        let bridge = Bridge::new(ScriptedCompiler::succeeding("const x = 1;"));
        let response = bridge.call(&[json!("let x = 1")]);
        let HostResponse::Result(result) = &response else {
            panic!("expected a result record");
        };
        assert!(result.is_success());
        assert_eq!(result.output().map(Artifact::as_str), Some("const x = 1;"));
        assert_exhaustive(result);

        let value = response.to_value().expect("serialize");
        assert_eq!(value, json!({ "errors": [], "output": "const x = 1;" }));
    }

    #[test]
    fn syntax_error_becomes_point_diagnostic() {
        let bridge = Bridge::new(ScriptedCompiler::failing(vec![CompilerError::syntax(
            "unexpected end of input",
            2,
            5,
        )]));
        let value = bridge.call(&[json!("let x = \n  (1 +")]).to_value().expect("serialize");
        assert_eq!(
            value,
            json!({
                "errors": [{ "message": "unexpected end of input", "start": [2, 5], "end": [2, 5] }],
                "output": null,
            })
        );
    }

    #[test]
    fn type_error_spans_to_one_past_stop_token() {
        let rule = RuleNode {
            name: "binary".to_string(),
            start: token(3, 8, 38, 38),
            stop: token(3, 10, 40, 42),
        };
        let bridge = Bridge::new(ScriptedCompiler::failing(vec![CompilerError::type_error(
            "mismatched operands",
            rule,
        )]));
        let HostResponse::Result(result) = bridge.call(&[json!("...")]) else {
            panic!("expected a result record");
        };
        let diag = &result.errors()[0];
        assert_eq!(diag.start, Some(Position::new(3, 8)));
        assert_eq!(diag.end, Some(Position::new(3, 13)));
        assert_eq!(result.output(), None);
    }

    #[test]
    fn wrong_arity_returns_usage_string_without_compiling() {
        let bridge = Bridge::new(ScriptedCompiler::succeeding("unused"));

        let response = bridge.call(&[json!("a"), json!("b")]);
        assert_eq!(response, HostResponse::Usage(USAGE_ERROR.to_string()));
        assert_eq!(response.to_value().expect("serialize"), json!(USAGE_ERROR));

        assert!(bridge.call(&[]).is_usage_error());
        assert!(bridge.call(&[json!("a"), json!("b"), json!("c")]).is_usage_error());
        assert_eq!(bridge.compiler().call_count(), 0);
    }

    #[test]
    fn invalid_argument_shape_is_a_usage_error() {
        let bridge = Bridge::new(ScriptedCompiler::succeeding("unused"));
        let response = bridge.call(&[json!([1, 2, 3])]);
        assert!(response.is_usage_error());
        assert_eq!(bridge.compiler().call_count(), 0);
    }

    #[test]
    fn preserves_compiler_error_order() {
        let bridge = Bridge::new(ScriptedCompiler::failing(vec![
            CompilerError::syntax("third line", 3, 0),
            CompilerError::other("no location"),
            CompilerError::syntax("first line", 1, 0),
        ]));
        let HostResponse::Result(result) = bridge.call(&[json!("src")]) else {
            panic!("expected a result record");
        };
        let messages: Vec<_> = result.errors().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["third line", "no location", "first line"]);
        assert_exhaustive(&result);
    }

    #[test]
    fn empty_error_list_still_reports_a_failure() {
        let bridge = Bridge::new(ScriptedCompiler::failing(Vec::new()));
        let HostResponse::Result(result) = bridge.call(&[json!("src")]) else {
            panic!("expected a result record");
        };
        assert!(!result.is_success());
        assert_eq!(result.errors().len(), 1);
        assert!(!result.errors()[0].has_position());
        assert_exhaustive(&result);
    }

    #[test]
    fn failure_constructor_never_yields_an_empty_record() {
        let result = CompileResult::failure(Vec::new());
        assert_eq!(result.errors(), [Diagnostic::unpositioned(EMPTY_FAILURE)]);
        assert_eq!(
            serde_json::to_value(&result).expect("serialize"),
            json!({ "errors": [{ "message": EMPTY_FAILURE }], "output": null })
        );

        let kept = vec![Diagnostic::point("bad", Position::new(1, 0))];
        assert_eq!(CompileResult::failure(kept.clone()).errors(), kept.as_slice());
    }

    #[test]
    fn plain_text_call_passes_no_options() {
        let bridge = Bridge::new(ScriptedCompiler::succeeding("ok"));
        bridge.call(&[json!("print 1")]);
        bridge.call(&[json!({ "source": "print 1" })]);

        let calls = bridge.compiler().calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ("print 1".to_string(), None));
        assert_eq!(calls[0], calls[1]);
    }

    #[test]
    fn structured_call_forwards_options_untouched() {
        let bridge = Bridge::new(ScriptedCompiler::succeeding("ok"));
        bridge.call(&[json!({
            "source": "print 1",
            "lang": "ts",
            "disableTypes": true,
            "runtime": "/runtime.js",
        })]);

        let calls = bridge.compiler().calls.borrow();
        let options = calls[0].1.as_ref().expect("options forwarded");
        assert_eq!(options.language.as_deref(), Some("ts"));
        assert_eq!(options.disable_types, Some(true));
        assert_eq!(
            options.runtime_path.as_deref(),
            Some(std::path::Path::new("/runtime.js"))
        );
    }

    #[test]
    fn compiling_twice_gives_identical_results() {
        let bridge = Bridge::new(ScriptedCompiler::failing(vec![CompilerError::syntax(
            "bad", 1, 1,
        )]));
        let request = CompileRequest::new("x");
        assert_eq!(bridge.compile(&request), bridge.compile(&request));
        assert_eq!(bridge.compiler().call_count(), 2);
    }
}
