//! Type checking for parsed programs.
//!
//! Every error is attributed to the rule node of the offending construct:
//! the identifier term for unresolved names, the binary expression for
//! operand mismatches, the annotation or the whole `let` statement for
//! declaration problems. Checking continues after an error; an expression
//! whose type cannot be determined is `None` and does not cascade.

use std::collections::HashMap;

use playground_core::{CompilerError, RuleNode};

use crate::ast::{BinaryOp, Expr, ExprKind, Program, Stmt, StmtKind, TypeAnnotation};
use crate::types::Type;

/// Types per statement plus the collected errors.
///
/// `types[i]` is the type bound by statement `i` (for `let`) or the type of
/// the printed value (for `print`).
#[derive(Debug)]
pub struct TypeCheckResult {
    pub types: Vec<Option<Type>>,
    pub errors: Vec<CompilerError>,
}

pub fn typecheck(program: &Program) -> TypeCheckResult {
    let mut checker = TypeChecker::default();
    let types = program
        .statements
        .iter()
        .map(|stmt| checker.check_stmt(stmt))
        .collect();
    TypeCheckResult {
        types,
        errors: checker.errors,
    }
}

/// Declared names. A name bound to `None` exists but its type is unknown.
#[derive(Debug, Default)]
struct TypeEnv {
    entries: HashMap<String, Option<Type>>,
}

impl TypeEnv {
    fn declare(&mut self, name: &str, ty: Option<Type>) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(name.to_string(), ty);
        true
    }

    fn lookup(&self, name: &str) -> Option<Option<Type>> {
        self.entries.get(name).copied()
    }
}

#[derive(Debug, Default)]
struct TypeChecker {
    env: TypeEnv,
    errors: Vec<CompilerError>,
}

impl TypeChecker {
    fn error(&mut self, rule: &RuleNode, message: String) {
        self.errors.push(CompilerError::type_error(message, rule.clone()));
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Option<Type> {
        match &stmt.kind {
            StmtKind::Let {
                name,
                annotation,
                value,
            } => {
                let inferred = self.check_expr(value);
                let declared = annotation.as_ref().and_then(|a| self.check_annotation(a));
                if let (Some(declared), Some(inferred)) = (declared, inferred) {
                    if declared != inferred {
                        self.error(
                            &stmt.rule,
                            format!("expected {declared}, found {inferred}"),
                        );
                    }
                }

                let ty = declared.or(inferred);
                if !self.env.declare(&name.name, ty) {
                    self.error(
                        &stmt.rule,
                        format!("'{}' is already declared", name.name),
                    );
                }
                ty
            }
            StmtKind::Print(expr) => self.check_expr(expr),
        }
    }

    fn check_annotation(&mut self, annotation: &TypeAnnotation) -> Option<Type> {
        let ty = Type::from_name(&annotation.name);
        if ty.is_none() {
            self.error(
                &annotation.rule,
                format!("unknown type '{}'", annotation.name),
            );
        }
        ty
    }

    fn check_expr(&mut self, expr: &Expr) -> Option<Type> {
        match &expr.kind {
            ExprKind::Int(_) => Some(Type::Int),
            ExprKind::Str(_) => Some(Type::String),
            ExprKind::Bool(_) => Some(Type::Bool),
            ExprKind::Var(name) => match self.env.lookup(name) {
                Some(ty) => ty,
                None => {
                    self.error(&expr.rule, format!("unresolved identifier '{name}'"));
                    None
                }
            },
            ExprKind::Paren(inner) => self.check_expr(inner),
            ExprKind::Binary { op, lhs, rhs } => {
                let left = self.check_expr(lhs);
                let right = self.check_expr(rhs);
                self.check_binary(expr, *op, left?, right?)
            }
        }
    }

    fn check_binary(&mut self, expr: &Expr, op: BinaryOp, left: Type, right: Type) -> Option<Type> {
        let result = match (op, left, right) {
            (BinaryOp::Add, Type::Int, Type::Int) => Some(Type::Int),
            (BinaryOp::Add, Type::String, Type::String) => Some(Type::String),
            (BinaryOp::Sub | BinaryOp::Mul, Type::Int, Type::Int) => Some(Type::Int),
            _ => None,
        };
        if result.is_none() {
            self.error(
                &expr.rule,
                format!(
                    "operator '{}' cannot be applied to {left} and {right}",
                    op.symbol()
                ),
            );
        }
        result
    }
}
