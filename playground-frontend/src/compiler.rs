use playground_core::{Artifact, CompileOptions, Compiler, CompilerError, SourceStream};

use crate::codegen::{EmitSettings, Target, emit};
use crate::error::FrontendError;
use crate::lexer::lex;
use crate::parser::parse;
use crate::typecheck::typecheck;

/// Runtime module imported by emitted code when none is configured.
pub const DEFAULT_RUNTIME: &str = "@playground/runtime";

/// The playground language compiler.
///
/// Stateless; one value can serve any number of compilations.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaygroundCompiler;

impl PlaygroundCompiler {
    pub fn new() -> Self {
        PlaygroundCompiler
    }
}

impl Compiler for PlaygroundCompiler {
    fn compile(
        &self,
        input: SourceStream<'_>,
        options: Option<&CompileOptions>,
    ) -> Result<Artifact, Vec<CompilerError>> {
        let settings = resolve_settings(options).map_err(|err| vec![CompilerError::other(err)])?;

        let lexed = lex(input);
        let parsed = parse(&lexed.tokens);
        tracing::debug!(
            tokens = lexed.tokens.len(),
            statements = parsed.program.statements.len(),
            "parsed source"
        );

        let mut syntax_errors = lexed.errors;
        syntax_errors.extend(parsed.errors);
        if !syntax_errors.is_empty() {
            syntax_errors.sort_by_key(position_key);
            return Err(syntax_errors);
        }

        let checked = typecheck(&parsed.program);
        if !checked.errors.is_empty() {
            return Err(checked.errors);
        }

        let output = emit(&parsed.program, &checked.types, &settings);
        tracing::debug!(language = ?settings.target, bytes = output.len(), "emitted program");
        Ok(Artifact::new(output))
    }
}

fn resolve_settings(options: Option<&CompileOptions>) -> Result<EmitSettings, FrontendError> {
    let mut settings = EmitSettings {
        target: Target::default(),
        runtime: DEFAULT_RUNTIME.to_string(),
        typed: true,
    };
    let Some(options) = options else {
        return Ok(settings);
    };

    if let Some(name) = options.language.as_deref() {
        settings.target = Target::from_name(name)?;
    }
    if let Some(path) = &options.runtime_path {
        settings.runtime = path
            .to_str()
            .ok_or_else(|| FrontendError::InvalidRuntimePath(path.clone()))?
            .to_string();
    }
    settings.typed = !options.disable_types.unwrap_or(false);
    Ok(settings)
}

/// Lexer and parser errors are merged into source order.
fn position_key(error: &CompilerError) -> (u32, u32) {
    match error {
        CompilerError::Syntax(err) => (err.line, err.column),
        CompilerError::Type(err) => (err.rule.start.line, err.rule.start.column),
        CompilerError::Other(_) => (0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::SAMPLES;
    use playground_core::{Bridge, CompileResult, HostResponse, Position, USAGE_ERROR};
    use serde_json::json;

    fn bridge() -> Bridge<PlaygroundCompiler> {
        Bridge::new(PlaygroundCompiler::new())
    }

    fn result_of(response: HostResponse) -> CompileResult {
        match response {
            HostResponse::Result(result) => result,
            HostResponse::Usage(text) => panic!("unexpected usage error: {text}"),
        }
    }

    #[test]
    fn compiles_simple_let() {
        let value = bridge().call(&[json!("let x = 1")]).to_value().expect("serialize");
        assert_eq!(value["errors"], json!([]));
        assert_eq!(
            value["output"],
            json!("import * as runtime from \"@playground/runtime\";\n\nconst x: number = 1;\n")
        );
    }

    #[test]
    fn unterminated_statement_is_a_point_at_end_of_input() {
        let value = bridge()
            .call(&[json!("print 1\nlet x")])
            .to_value()
            .expect("serialize");
        assert_eq!(
            value,
            json!({
                "errors": [{ "message": "unexpected end of input", "start": [2, 5], "end": [2, 5] }],
                "output": null,
            })
        );
    }

    #[test]
    fn type_error_covers_the_whole_binary_expression() {
        let source = "let a = 1\nlet bcd = \"strings\"\nlet c = a+bcd";
        let result = result_of(bridge().call(&[json!(source)]));
        assert_eq!(result.errors().len(), 1);
        let diag = &result.errors()[0];
        assert_eq!(diag.message, "operator '+' cannot be applied to Int and String");
        assert_eq!(diag.start, Some(Position::new(3, 8)));
        assert_eq!(diag.end, Some(Position::new(3, 13)));
        assert_eq!(result.output(), None);
    }

    #[test]
    fn two_arguments_give_the_usage_string() {
        let response = bridge().call(&[json!("let x = 1"), json!("let y = 2")]);
        assert_eq!(response, HostResponse::Usage(USAGE_ERROR.to_string()));
    }

    #[test]
    fn syntax_errors_from_lexer_and_parser_are_ordered() {
        let result = result_of(bridge().call(&[json!("let a = 1 #\nlet = 2\nprint \"x")]));
        let starts: Vec<_> = result.errors().iter().map(|d| d.start).collect();
        assert_eq!(
            starts,
            [
                Some(Position::new(1, 10)),
                Some(Position::new(2, 4)),
                Some(Position::new(3, 6)),
                Some(Position::new(3, 8)),
            ]
        );
        assert!(result.errors().iter().all(|d| d.start == d.end));
    }

    #[test]
    fn unsupported_language_is_reported_without_position() {
        let result = result_of(bridge().call(&[json!({ "source": "let x = 1", "lang": "cobol" })]));
        let diag = &result.errors()[0];
        assert_eq!(diag.message, "unsupported target language 'cobol'");
        assert!(!diag.has_position());
    }

    #[test]
    fn structured_options_reach_the_emitter() {
        let result = result_of(bridge().call(&[json!({
            "source": "let x = 1\nprint x",
            "lang": "ts",
            "disableTypes": true,
            "runtime": "/assets/runtime.js",
        })]));
        assert_eq!(
            result.output().map(|a| a.as_str()),
            Some("import * as runtime from \"/assets/runtime.js\";\n\nconst x = 1;\nruntime.print(x);\n")
        );
    }

    #[test]
    fn plain_and_bare_record_calls_compile_identically() {
        let plain = bridge().call(&[json!("print 1 + 2")]);
        let record = bridge().call(&[json!({ "source": "print 1 + 2" })]);
        assert_eq!(plain, record);
    }

    #[test]
    fn every_sample_compiles_for_every_target() {
        for sample in SAMPLES {
            for lang in ["ts", "go"] {
                let result =
                    result_of(bridge().call(&[json!({ "source": sample.source, "lang": lang })]));
                assert!(
                    result.is_success(),
                    "sample {} failed for {lang}: {:?}",
                    sample.name,
                    result.errors()
                );
            }
        }
    }

    #[test]
    fn deeply_nested_parentheses_are_a_diagnostic() {
        let source = format!("print {}1{}", "(".repeat(5_000), ")".repeat(5_000));
        let result = result_of(bridge().call(&[json!(source)]));
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.errors()[0].message, "expression nested too deeply");
        assert!(result.errors()[0].has_position());
    }

    #[test]
    fn very_long_operator_chains_are_a_diagnostic() {
        let source = format!("print 1{}", " + 1".repeat(20_000));
        let result = result_of(bridge().call(&[json!(source)]));
        let messages: Vec<_> = result.errors().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["expression nested too deeply"]);
    }

    #[test]
    fn malformed_input_never_escapes_as_a_fault() {
        for source in ["", "(((", "let", "\"", "print )", "let x: = ;", "+-*", "\u{0}"] {
            let response = bridge().call(&[json!(source)]);
            let HostResponse::Result(result) = response else {
                panic!("source {source:?} produced a usage error");
            };
            assert_eq!(result.is_success(), result.errors().is_empty());
        }
    }
}
