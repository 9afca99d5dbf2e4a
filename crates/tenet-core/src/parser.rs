//! # Parser Module
//!
//! A `logos` tokenizer and a recursive-descent parser for program and
//! query text.
//!
//! ```text
//! program  := clause*
//! clause   := atom ( ":-" literal ( "," literal )* )? "."
//! literal  := "!" atom | atom | term "=" term | term "!=" term
//! atom     := ident ( "(" ( term ( "," term )* )? ")" )?
//! term     := Variable | "_" | integer | "string" | /name
//! query    := "?"? atom "."?
//! ```
//!
//! Comments run from `#` or `//` to the end of the line. Every `_` inside a
//! clause becomes a fresh anonymous variable; inside a query it stays `_`.

use crate::primitives::MAX_ARITY;
use crate::types::{FRESH_PREFIX, WILDCARD};
use crate::{Atom, Clause, Constant, Literal, TenetError, Term, Variable};
use logos::Logos;

// =============================================================================
// TOKENS
// =============================================================================

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"([ \t\r\n\f]+|#[^\n]*|//[^\n]*)")]
enum Token {
    // Delimiters
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token(":-")]
    Turnstile,

    #[token("!")]
    Bang,

    #[token("=")]
    Eq,

    #[token("!=")]
    Neq,

    #[token("?")]
    Question,

    // Constants
    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Number(i64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    Str(String),

    /// One `/segment` of a name constant; adjacent segments are joined by
    /// the parser.
    #[regex(r"/[A-Za-z0-9_]+", |lex| lex.slice().to_string())]
    NameSegment(String),

    // Identifiers
    #[regex(r"[a-z][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r"[A-Z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Var(String),

    /// Appended after the last real token.
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Ident(s) => format!("identifier '{}'", s),
            Self::Var(s) => format!("variable '{}'", s),
            Self::Number(n) => format!("number {}", n),
            Self::Str(_) => "string literal".to_string(),
            Self::NameSegment(n) => format!("name '{}'", n),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::Comma => "','".to_string(),
            Self::Dot => "'.'".to_string(),
            Self::Turnstile => "':-'".to_string(),
            Self::Bang => "'!'".to_string(),
            Self::Eq => "'='".to_string(),
            Self::Neq => "'!='".to_string(),
            Self::Question => "'?'".to_string(),
            Self::Eof => "end of input".to_string(),
        }
    }
}

/// Strip the quotes of a string literal and resolve its escapes.
///
/// Returns `None` for an escape other than `\" \\ \n \t`, which the lexer
/// reports as an invalid token.
fn unescape(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            '"' => out.push('"'),
            '\\' => out.push('\\'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            _ => return None,
        }
    }
    Some(out)
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    start: usize,
    end: usize,
}

/// 1-based line and column of byte `offset` in `src`.
fn position(src: &str, offset: usize) -> (usize, usize) {
    let before = src.get(..offset).unwrap_or(src);
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().unwrap_or("").chars().count() + 1;
    (line, column)
}

fn syntax(src: &str, offset: usize, message: impl Into<String>) -> TenetError {
    let (line, column) = position(src, offset);
    TenetError::Syntax {
        line,
        column,
        message: message.into(),
    }
}

// =============================================================================
// LEXER
// =============================================================================

/// Explain why the text at `start` did not form a token.
fn lex_error(src: &str, start: usize, end: usize) -> TenetError {
    let slice = src.get(start..end).unwrap_or("");
    let message = match slice.chars().next() {
        Some('"') if slice.len() > 1 && slice.ends_with('"') => {
            "unknown escape in string literal".to_string()
        }
        Some('"') => "unterminated string literal".to_string(),
        Some(c) if c.is_ascii_digit() || (c == '-' && slice.len() > 1) => {
            format!("invalid number '{}'", slice)
        }
        Some('-') => "expected digits after '-'".to_string(),
        Some(':') => "expected ':-'".to_string(),
        Some(c) => format!("unexpected character '{}'", c),
        None => "unexpected end of input".to_string(),
    };
    syntax(src, start, message)
}

fn tokenize(src: &str) -> Result<Vec<Spanned>, TenetError> {
    let mut out = Vec::new();
    for (token, span) in Token::lexer(src).spanned() {
        match token {
            Ok(token) => out.push(Spanned {
                token,
                start: span.start,
                end: span.end,
            }),
            Err(()) => return Err(lex_error(src, span.start, span.end)),
        }
    }
    out.push(Spanned {
        token: Token::Eof,
        start: src.len(),
        end: src.len(),
    });
    Ok(out)
}

// =============================================================================
// PARSER
// =============================================================================

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Spanned>,
    pos: usize,
    /// Rename each `_` to a fresh variable (clauses) or keep it (queries).
    fresh_wildcards: bool,
    wildcard_count: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, fresh_wildcards: bool) -> Result<Self, TenetError> {
        Ok(Self {
            src,
            tokens: tokenize(src)?,
            pos: 0,
            fresh_wildcards,
            wildcard_count: 0,
        })
    }

    /// Token `ahead` places past the cursor, clamped to `Eof`.
    fn peek_at(&self, ahead: usize) -> &Spanned {
        // tokenize always ends with Eof, so the list is never empty
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + ahead).min(last)]
    }

    fn peek(&self) -> &Spanned {
        self.peek_at(0)
    }

    fn advance(&mut self) -> Spanned {
        let tok = self.peek().clone();
        if tok.token != Token::Eof {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, token: &Token) -> bool {
        &self.peek().token == token
    }

    fn text(&self, tok: &Spanned) -> &'a str {
        self.src.get(tok.start..tok.end).unwrap_or("")
    }

    fn unexpected(&self, expected: &str) -> TenetError {
        let tok = self.peek();
        syntax(
            self.src,
            tok.start,
            format!("expected {}, found {}", expected, tok.token.describe()),
        )
    }

    fn expect(&mut self, token: &Token, expected: &str) -> Result<(), TenetError> {
        if self.at(token) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn program(&mut self) -> Result<Vec<Clause>, TenetError> {
        let mut clauses = Vec::new();
        while !self.at(&Token::Eof) {
            clauses.push(self.clause()?);
        }
        Ok(clauses)
    }

    fn clause(&mut self) -> Result<Clause, TenetError> {
        let head = self.atom()?;
        let mut body = Vec::new();
        if self.at(&Token::Turnstile) {
            self.advance();
            body.push(self.literal()?);
            while self.at(&Token::Comma) {
                self.advance();
                body.push(self.literal()?);
            }
        }
        self.expect(&Token::Dot, "'.' at end of clause")?;
        Ok(Clause { head, body })
    }

    fn literal(&mut self) -> Result<Literal, TenetError> {
        let next = self.peek().token.clone();
        match next {
            Token::Bang => {
                self.advance();
                Ok(Literal::Negated(self.atom()?))
            }
            Token::Ident(_) => Ok(Literal::Positive(self.atom()?)),
            _ => {
                let left = self.term()?;
                let op = self.advance();
                let right = self.term()?;
                match op.token {
                    Token::Eq => Ok(Literal::Eq(left, right)),
                    Token::Neq => Ok(Literal::Neq(left, right)),
                    other => Err(syntax(
                        self.src,
                        op.start,
                        format!("expected '=' or '!=', found {}", other.describe()),
                    )),
                }
            }
        }
    }

    /// Predicate names may contain interior dots (`net.reachable`). A dot
    /// glued to a word on both sides continues the name; any other dot ends
    /// the clause.
    fn predicate_name(&mut self) -> Result<(String, usize), TenetError> {
        let start = self.peek().clone();
        let Token::Ident(mut name) = start.token else {
            return Err(self.unexpected("predicate name"));
        };
        self.advance();

        let mut end = start.end;
        loop {
            let dot = self.peek_at(0);
            let word = self.peek_at(1);
            let word_text = self.text(word);
            let continues = dot.token == Token::Dot
                && dot.start == end
                && word.start == dot.end
                && !word_text.is_empty()
                && word_text
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !continues {
                break;
            }
            name.push('.');
            name.push_str(word_text);
            end = word.end;
            self.advance();
            self.advance();
        }
        Ok((name, start.start))
    }

    fn atom(&mut self) -> Result<Atom, TenetError> {
        let (predicate, start) = self.predicate_name()?;

        let mut args = Vec::new();
        if self.at(&Token::LParen) {
            self.advance();
            if !self.at(&Token::RParen) {
                args.push(self.term()?);
                while self.at(&Token::Comma) {
                    self.advance();
                    args.push(self.term()?);
                }
            }
            self.expect(&Token::RParen, "')' or ','")?;
        }
        if args.len() > MAX_ARITY {
            return Err(syntax(
                self.src,
                start,
                format!(
                    "atom {} has {} arguments, limit is {}",
                    predicate,
                    args.len(),
                    MAX_ARITY
                ),
            ));
        }
        Ok(Atom::new(predicate, args))
    }

    fn term(&mut self) -> Result<Term, TenetError> {
        let tok = self.advance();
        match tok.token {
            Token::Var(name) if name == WILDCARD && self.fresh_wildcards => {
                self.wildcard_count += 1;
                Ok(Term::var(format!("{}{}", FRESH_PREFIX, self.wildcard_count)))
            }
            Token::Var(name) => Ok(Term::Variable(Variable::new(name))),
            Token::Number(n) => Ok(Term::Constant(Constant::Number(n))),
            Token::Str(s) => Ok(Term::Constant(Constant::String(s))),
            Token::NameSegment(mut name) => {
                let mut end = tok.end;
                while let Token::NameSegment(segment) = &self.peek().token {
                    if self.peek().start != end {
                        break;
                    }
                    name.push_str(segment);
                    end = self.peek().end;
                    self.advance();
                }
                Ok(Term::Constant(Constant::Name(name)))
            }
            other => Err(syntax(
                self.src,
                tok.start,
                format!("expected a term, found {}", other.describe()),
            )),
        }
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Parse program text into clauses. Empty text yields no clauses.
pub fn parse_program(src: &str) -> Result<Vec<Clause>, TenetError> {
    Parser::new(src, true)?.program()
}

/// Parse a single query atom, e.g. `f(X, 2)` or `?f(X, 2).`.
pub fn parse_query(src: &str) -> Result<Atom, TenetError> {
    let mut parser = Parser::new(src, false)?;
    if parser.at(&Token::Question) {
        parser.advance();
    }
    let atom = parser.atom()?;
    if parser.at(&Token::Dot) {
        parser.advance();
    }
    if !parser.at(&Token::Eof) {
        return Err(parser.unexpected("end of query"));
    }
    Ok(atom)
}

// =============================================================================
// TESTS
// =============================================================================
