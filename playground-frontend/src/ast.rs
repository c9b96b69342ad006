//! Surface syntax tree.
//!
//! Every node keeps the `RuleNode` it was parsed from so later phases can
//! attribute errors to the exact token span of the construct.

use playground_core::{RuleNode, TokenSpan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub rule: RuleNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    Let {
        name: Ident,
        annotation: Option<TypeAnnotation>,
        value: Expr,
    },
    Print(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: TokenSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
    pub name: String,
    pub rule: RuleNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub kind: ExprKind,
    pub rule: RuleNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    Int(i64),
    /// Raw string content, escapes as written.
    Str(String),
    Bool(bool),
    Var(String),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Paren(Box<Expr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
        }
    }
}

/// Rule node named `name` covering `start..=stop`.
pub fn rule(name: &str, start: TokenSpan, stop: TokenSpan) -> RuleNode {
    RuleNode {
        name: name.to_string(),
        start,
        stop,
    }
}
