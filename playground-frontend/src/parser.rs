use playground_core::CompilerError;

use crate::ast::{BinaryOp, Expr, ExprKind, Ident, Program, Stmt, StmtKind, TypeAnnotation, rule};
use crate::lexer::{Token, TokenKind};

/// Parsed program plus every syntax error met on the way.
///
/// A statement that fails to parse is dropped; the parser resumes at the
/// next `let` or `print` keyword.
#[derive(Debug)]
pub struct ParseResult {
    pub program: Program,
    pub errors: Vec<CompilerError>,
}

/// Deepest expression tree the parser builds. Type checking and emission
/// walk expressions recursively, so this also bounds their stack use.
pub const MAX_EXPR_DEPTH: usize = 256;

/// Parse a token list produced by `lexer::lex` (which always ends in `Eof`).
/// An empty slice parses as an empty program.
pub fn parse(tokens: &[Token]) -> ParseResult {
    if tokens.is_empty() {
        return ParseResult {
            program: Program {
                statements: Vec::new(),
            },
            errors: Vec::new(),
        };
    }
    let mut parser = Parser {
        tokens,
        position: 0,
        nesting: 0,
        errors: Vec::new(),
    };
    let program = parser.parse_program();
    ParseResult {
        program,
        errors: parser.errors,
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    position: usize,
    /// Open parentheses around the current position.
    nesting: usize,
    errors: Vec<CompilerError>,
}

type Parsed<T> = Result<T, CompilerError>;

impl<'t> Parser<'t> {
    fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.at(TokenKind::Eof) {
            let start = self.position;
            match self.parse_stmt() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    self.errors.push(err);
                    self.recover(start);
                }
            }
        }
        Program { statements }
    }

    fn parse_stmt(&mut self) -> Parsed<Stmt> {
        let first = self.current().span();
        let kind = match self.current().kind {
            TokenKind::Let => self.parse_let()?,
            TokenKind::Print => {
                self.advance();
                StmtKind::Print(self.parse_expr()?)
            }
            _ => return Err(self.unexpected("'let' or 'print'")),
        };
        self.eat(TokenKind::Semi);
        Ok(Stmt {
            kind,
            rule: rule("statement", first, self.previous().span()),
        })
    }

    fn parse_let(&mut self) -> Parsed<StmtKind> {
        self.advance(); // let
        let name = self.expect(TokenKind::Ident, "an identifier")?;
        let name = Ident {
            name: name.text.clone(),
            span: name.span(),
        };

        let annotation = if self.eat(TokenKind::Colon) {
            let ty = self.expect(TokenKind::Ident, "a type name")?;
            Some(TypeAnnotation {
                name: ty.text.clone(),
                rule: rule("type", ty.span(), ty.span()),
            })
        } else {
            None
        };

        self.expect(TokenKind::Equal, "'='")?;
        let value = self.parse_expr()?;
        Ok(StmtKind::Let {
            name,
            annotation,
            value,
        })
    }

    fn parse_expr(&mut self) -> Parsed<Expr> {
        self.parse_operands().map(|(expr, _)| expr)
    }

    /// expr := term (('+' | '-' | '*') term)*, left associative.
    ///
    /// Returns the expression with its tree height.
    fn parse_operands(&mut self) -> Parsed<(Expr, usize)> {
        let (mut lhs, mut height) = self.parse_term()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                TokenKind::Star => BinaryOp::Mul,
                _ => break,
            };
            let op_token = self.current();
            self.advance();
            let (rhs, rhs_height) = self.parse_term()?;
            height = height.max(rhs_height) + 1;
            if height > MAX_EXPR_DEPTH {
                return Err(too_deep(op_token));
            }
            let node = rule("binary", lhs.rule.start, rhs.rule.stop);
            lhs = Expr {
                kind: ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                rule: node,
            };
        }
        Ok((lhs, height))
    }

    fn parse_term(&mut self) -> Parsed<(Expr, usize)> {
        let token = self.current();
        let span = token.span();
        let kind = match token.kind {
            TokenKind::IntLiteral => {
                let value = token.text.parse::<i64>().map_err(|_| {
                    CompilerError::syntax("integer literal out of range", token.line, token.column)
                })?;
                ExprKind::Int(value)
            }
            TokenKind::StringLiteral => ExprKind::Str(token.text.clone()),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::Ident => ExprKind::Var(token.text.clone()),
            TokenKind::LParen => {
                if self.nesting >= MAX_EXPR_DEPTH {
                    return Err(too_deep(token));
                }
                self.advance();
                self.nesting += 1;
                let inner = self.parse_operands();
                self.nesting -= 1;
                let (inner, inner_height) = inner?;
                self.expect(TokenKind::RParen, "')'")?;
                if inner_height + 1 > MAX_EXPR_DEPTH {
                    return Err(too_deep(token));
                }
                let expr = Expr {
                    kind: ExprKind::Paren(Box::new(inner)),
                    rule: rule("paren", span, self.previous().span()),
                };
                return Ok((expr, inner_height + 1));
            }
            _ => return Err(self.unexpected("an expression")),
        };
        self.advance();
        let expr = Expr {
            kind,
            rule: rule("term", span, span),
        };
        Ok((expr, 1))
    }

    /// Skip to the next statement keyword, always making progress.
    fn recover(&mut self, start: usize) {
        if self.position == start {
            self.advance();
        }
        while !matches!(
            self.current().kind,
            TokenKind::Let | TokenKind::Print | TokenKind::Eof
        ) {
            self.advance();
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Parsed<&'t Token> {
        if self.at(kind) {
            let token = self.current();
            self.advance();
            Ok(token)
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, what: &str) -> CompilerError {
        let token = self.current();
        if token.kind == TokenKind::Eof {
            CompilerError::syntax("unexpected end of input", token.line, token.column)
        } else {
            CompilerError::syntax(
                format!("expected {what}, found {}", token.describe()),
                token.line,
                token.column,
            )
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    fn current(&self) -> &'t Token {
        let tokens = self.tokens;
        &tokens[self.position.min(tokens.len().saturating_sub(1))]
    }

    fn previous(&self) -> &'t Token {
        let tokens = self.tokens;
        &tokens[self.position.saturating_sub(1)]
    }

    fn advance(&mut self) {
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
    }
}

fn too_deep(token: &Token) -> CompilerError {
    CompilerError::syntax("expression nested too deeply", token.line, token.column)
}
