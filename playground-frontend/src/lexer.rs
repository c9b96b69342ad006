//! Lexer for the playground language.
//!
//! Positions follow the usual parser-generator convention: lines are
//! 1-based, columns are 0-based, and offsets are inclusive character
//! indices into the source. Lexing never stops early; bad input is
//! recorded as a syntax error and skipped.

use playground_core::{CompilerError, SourceStream, TokenSpan};

/// Kind of a token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Special
    Eof,

    // Identifiers and literals
    Ident,
    IntLiteral,
    StringLiteral,

    // Punctuation
    LParen, // (
    RParen, // )
    Colon,  // :
    Equal,  // =
    Semi,   // ;
    Plus,   // +
    Minus,  // -
    Star,   // *

    // Keywords
    Let,
    Print,
    True,
    False,
}

/// A single token with its text and location.
///
/// For string literals `text` is the raw content between the quotes,
/// escapes left as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub column: u32,
    pub start: usize,
    pub stop: usize,
}

impl Token {
    pub fn span(&self) -> TokenSpan {
        TokenSpan {
            line: self.line,
            column: self.column,
            start_offset: self.start,
            stop_offset: self.stop,
        }
    }

    /// How the token reads in an error message.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::StringLiteral => format!("\"{}\"", self.text),
            _ => format!("'{}'", self.text),
        }
    }
}

/// Result of lexing a source text.
#[derive(Debug)]
pub struct LexResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<CompilerError>,
}

/// Lex the whole input. The token list always ends with an `Eof` token.
pub fn lex(input: SourceStream<'_>) -> LexResult {
    let mut lexer = Lexer {
        chars: input.chars().collect(),
        index: 0,
        line: 1,
        column: 0,
        errors: Vec::new(),
    };
    lexer.run()
}

struct Lexer {
    chars: Vec<char>,
    index: usize,
    line: u32,
    column: u32,
    errors: Vec<CompilerError>,
}

/// Where a token began.
#[derive(Clone, Copy)]
struct Mark {
    index: usize,
    line: u32,
    column: u32,
}

impl Lexer {
    fn run(&mut self) -> LexResult {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                self.consume_char();
                continue;
            }
            if ch == '/' && self.peek_next() == Some('/') {
                self.skip_comment();
                continue;
            }

            let mark = self.mark();
            let token = match ch {
                '(' => self.single(TokenKind::LParen, mark),
                ')' => self.single(TokenKind::RParen, mark),
                ':' => self.single(TokenKind::Colon, mark),
                '=' => self.single(TokenKind::Equal, mark),
                ';' => self.single(TokenKind::Semi, mark),
                '+' => self.single(TokenKind::Plus, mark),
                '-' => self.single(TokenKind::Minus, mark),
                '*' => self.single(TokenKind::Star, mark),
                '"' => self.lex_string(mark),
                '0'..='9' => self.lex_number(mark),
                _ if is_ident_start(ch) => self.lex_ident_or_keyword(mark),
                _ => {
                    self.consume_char();
                    self.errors.push(CompilerError::syntax(
                        format!("unexpected character '{ch}'"),
                        mark.line,
                        mark.column,
                    ));
                    None
                }
            };

            if let Some(tok) = token {
                tokens.push(tok);
            }
        }

        // EOF token at end
        tokens.push(Token {
            kind: TokenKind::Eof,
            text: String::new(),
            line: self.line,
            column: self.column,
            start: self.index,
            stop: self.index,
        });

        LexResult {
            tokens,
            errors: std::mem::take(&mut self.errors),
        }
    }

    fn single(&mut self, kind: TokenKind, mark: Mark) -> Option<Token> {
        self.consume_char();
        Some(self.token(kind, mark))
    }

    /// Token covering everything consumed since `mark`.
    fn token(&self, kind: TokenKind, mark: Mark) -> Token {
        Token {
            kind,
            text: self.chars[mark.index..self.index].iter().collect(),
            line: mark.line,
            column: mark.column,
            start: mark.index,
            stop: self.index.saturating_sub(1).max(mark.index),
        }
    }

    fn lex_string(&mut self, mark: Mark) -> Option<Token> {
        self.consume_char(); // opening quote

        let content_start = self.index;
        while let Some(ch) = self.peek_char() {
            match ch {
                '"' => {
                    let text = self.chars[content_start..self.index].iter().collect();
                    self.consume_char(); // closing quote
                    let mut token = self.token(TokenKind::StringLiteral, mark);
                    token.text = text;
                    return Some(token);
                }
                '\n' => break,
                '\\' => {
                    self.consume_char();
                    if self.peek_char().is_some_and(|next| next != '\n') {
                        self.consume_char();
                    }
                }
                _ => self.consume_char(),
            }
        }

        self.errors.push(CompilerError::syntax(
            "unterminated string literal",
            mark.line,
            mark.column,
        ));
        None
    }

    fn lex_number(&mut self, mark: Mark) -> Option<Token> {
        while self.peek_char().is_some_and(|ch| ch.is_ascii_digit()) {
            self.consume_char();
        }
        Some(self.token(TokenKind::IntLiteral, mark))
    }

    fn lex_ident_or_keyword(&mut self, mark: Mark) -> Option<Token> {
        while self.peek_char().is_some_and(is_ident_continue) {
            self.consume_char();
        }

        let mut token = self.token(TokenKind::Ident, mark);
        token.kind = match token.text.as_str() {
            "let" => TokenKind::Let,
            "print" => TokenKind::Print,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => TokenKind::Ident,
        };
        Some(token)
    }

    fn skip_comment(&mut self) {
        while self.peek_char().is_some_and(|ch| ch != '\n') {
            self.consume_char();
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            index: self.index,
            line: self.line,
            column: self.column,
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.index + 1).copied()
    }

    fn consume_char(&mut self) {
        let Some(ch) = self.peek_char() else {
            return;
        };
        self.index += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_ident_continue(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_core::SyntaxError;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(SourceStream::new(source))
            .tokens
            .iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_let_statement() {
        assert_eq!(
            kinds("let x: Int = 1 + 2;"),
            vec![
                TokenKind::Let,
                TokenKind::Ident,
                TokenKind::Colon,
                TokenKind::Ident,
                TokenKind::Equal,
                TokenKind::IntLiteral,
                TokenKind::Plus,
                TokenKind::IntLiteral,
                TokenKind::Semi,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tracks_lines_columns_and_offsets() {
        let result = lex(SourceStream::new("let a = 1\n  print abc"));
        let abc = &result.tokens[5];
        assert_eq!(abc.text, "abc");
        assert_eq!((abc.line, abc.column), (2, 8));
        assert_eq!((abc.start, abc.stop), (18, 20));

        let eof = result.tokens.last().expect("eof");
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!((eof.line, eof.column), (2, 11));
    }

    #[test]
    fn string_token_keeps_raw_content_and_full_span() {
        let result = lex(SourceStream::new(r#"print "a\"b""#));
        let string = &result.tokens[1];
        assert_eq!(string.kind, TokenKind::StringLiteral);
        assert_eq!(string.text, r#"a\"b"#);
        assert_eq!((string.start, string.stop), (6, 11));
    }

    #[test]
    fn skips_line_comments() {
        assert_eq!(
            kinds("// leading\nprint 1 // trailing"),
            vec![TokenKind::Print, TokenKind::IntLiteral, TokenKind::Eof]
        );
    }

    #[test]
    fn reports_unexpected_characters_and_keeps_going() {
        let result = lex(SourceStream::new("print 1 # 2 @"));
        assert_eq!(result.errors.len(), 2);
        assert_eq!(
            result.errors[0],
            CompilerError::Syntax(SyntaxError {
                message: "unexpected character '#'".to_string(),
                line: 1,
                column: 8,
            })
        );
        assert_eq!(result.tokens.len(), 4);
    }

    #[test]
    fn reports_unterminated_string_at_opening_quote() {
        let result = lex(SourceStream::new("print 1\nprint \"oops\nprint 2"));
        assert_eq!(
            result.errors,
            vec![CompilerError::syntax("unterminated string literal", 2, 6)]
        );
    }

    #[test]
    fn counts_columns_in_characters() {
        let result = lex(SourceStream::new("print \"é\" + x"));
        let x = &result.tokens[3];
        assert_eq!(x.text, "x");
        assert_eq!(x.column, 12);
    }
}
