//! Source emission for the supported targets.
//!
//! Emission only runs on programs that lexed, parsed and type-checked
//! cleanly, so it has no failure path of its own.

use crate::ast::{Expr, ExprKind, Program, StmtKind};
use crate::error::FrontendError;
use crate::types::Type;

/// Language the program is emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    TypeScript,
    Go,
}

impl Target {
    pub fn from_name(name: &str) -> Result<Target, FrontendError> {
        match name {
            "ts" | "typescript" => Ok(Target::TypeScript),
            "go" => Ok(Target::Go),
            other => Err(FrontendError::UnsupportedLanguage(other.to_string())),
        }
    }

    fn type_name(self, ty: Type) -> &'static str {
        match (self, ty) {
            (Target::TypeScript, Type::Int) => "number",
            (Target::TypeScript, Type::String) => "string",
            (Target::TypeScript, Type::Bool) => "boolean",
            (Target::Go, Type::Int) => "int",
            (Target::Go, Type::String) => "string",
            (Target::Go, Type::Bool) => "bool",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitSettings {
    pub target: Target,
    /// Module specifier the emitted code imports its runtime from.
    pub runtime: String,
    /// Whether to write type annotations.
    pub typed: bool,
}

pub fn emit(program: &Program, types: &[Option<Type>], settings: &EmitSettings) -> String {
    match settings.target {
        Target::TypeScript => emit_typescript(program, types, settings),
        Target::Go => emit_go(program, types, settings),
    }
}

fn emit_typescript(program: &Program, types: &[Option<Type>], settings: &EmitSettings) -> String {
    let mut out = format!("import * as runtime from {:?};\n", settings.runtime);
    if !program.statements.is_empty() {
        out.push('\n');
    }

    for (stmt, ty) in program.statements.iter().zip(types) {
        match &stmt.kind {
            StmtKind::Let { name, value, .. } => {
                let annotation = match ty {
                    Some(ty) if settings.typed => {
                        format!(": {}", Target::TypeScript.type_name(*ty))
                    }
                    _ => String::new(),
                };
                out.push_str(&format!(
                    "const {}{annotation} = {};\n",
                    name.name,
                    emit_expr(value)
                ));
            }
            StmtKind::Print(expr) => {
                out.push_str(&format!("runtime.print({});\n", emit_expr(expr)));
            }
        }
    }
    out
}

fn emit_go(program: &Program, types: &[Option<Type>], settings: &EmitSettings) -> String {
    let mut out = String::from("package main\n\n");
    out.push_str(&format!("import runtime {:?}\n\n", settings.runtime));
    out.push_str("func main() {\n");

    for (stmt, ty) in program.statements.iter().zip(types) {
        match &stmt.kind {
            StmtKind::Let { name, value, .. } => match ty {
                Some(ty) if settings.typed => out.push_str(&format!(
                    "\tvar {} {} = {}\n",
                    name.name,
                    Target::Go.type_name(*ty),
                    emit_expr(value)
                )),
                _ => out.push_str(&format!("\t{} := {}\n", name.name, emit_expr(value))),
            },
            StmtKind::Print(expr) => {
                out.push_str(&format!("\truntime.Print({})\n", emit_expr(expr)));
            }
        }
    }

    out.push_str("}\n");
    out
}

/// Expressions read the same in both targets.
fn emit_expr(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Int(value) => value.to_string(),
        ExprKind::Str(raw) => format!("\"{raw}\""),
        ExprKind::Bool(value) => value.to_string(),
        ExprKind::Var(name) => name.clone(),
        ExprKind::Binary { op, lhs, rhs } => {
            format!("{} {} {}", emit_expr(lhs), op.symbol(), emit_expr(rhs))
        }
        ExprKind::Paren(inner) => format!("({})", emit_expr(inner)),
    }
}
