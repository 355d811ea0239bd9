//! Predicate compilation and evaluation for `where` clauses.
//!
//! Predicates support equality (`col == "text"`, `col == true`),
//! conjunction (`and`), and membership (`col in ("a", "b")`). The text is
//! tokenized and parsed into a typed AST by recursive descent; there is no
//! dynamic code evaluation surface.
//!
//! Evaluation degrades gracefully: when the full parse fails, or when the
//! expression references columns the dataset does not have, a restricted
//! evaluator takes over that only understands `and`-joined equality
//! comparisons against known columns, silently dropping tokens it cannot
//! parse. A predicate the restricted evaluator cannot use at all becomes a
//! pass-all filter; callers surface that in result metadata.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::models::{Dataset, NormalizedRecord, bool_like, scalar_to_string};

/// Restricted-evaluator pattern for `col == "text"`.
///
/// Anchored at the start only; trailing garbage after the closing quote is
/// ignored, matching the lenient scan this fallback replaces.
#[allow(clippy::unwrap_used)] // Pattern is a compile-time constant.
static EQ_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^(\w+)\s*==\s*"(.*)""#).unwrap());

/// Restricted-evaluator pattern for `col == true/false`.
#[allow(clippy::unwrap_used)] // Pattern is a compile-time constant.
static EQ_BOOL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\w+)\s*==\s*(true|false)").unwrap());

/// Splitter for `and`-joined fallback tokens.
#[allow(clippy::unwrap_used)] // Pattern is a compile-time constant.
static AND_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\band\b").unwrap());

/// A literal value in a predicate.
#[derive(Debug, Clone, PartialEq)]
enum Literal {
    /// A quoted string.
    Text(String),
    /// A boolean keyword, matched through boolean-like coercion.
    Truthy(bool),
    /// A bare number.
    Number(f64),
}

/// A typed predicate expression.
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    /// `column == literal`
    Eq { column: String, literal: Literal },
    /// `column in (l1, l2, ...)`
    In { column: String, literals: Vec<Literal> },
    /// `e1 and e2 and ...`
    And(Vec<Expr>),
}

impl Expr {
    /// Collects every column the expression references.
    fn columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Eq { column, .. } | Self::In { column, .. } => out.push(column),
            Self::And(exprs) => {
                for expr in exprs {
                    expr.columns(out);
                }
            }
        }
    }

    /// Evaluates the expression against one record.
    fn matches(&self, record: &NormalizedRecord) -> bool {
        match self {
            Self::Eq { column, literal } => literal_matches(record.get(column), literal),
            Self::In { column, literals } => literals
                .iter()
                .any(|literal| literal_matches(record.get(column), literal)),
            Self::And(exprs) => exprs.iter().all(|expr| expr.matches(record)),
        }
    }
}

/// Compares one record value against a literal.
///
/// Strings compare exactly against string values. Booleans go through
/// boolean-like coercion so `isfire == true` matches `"yes"`. Numbers
/// compare against numeric values or their string rendering. Null,
/// missing, and nested values never match.
fn literal_matches(value: Option<&Value>, literal: &Literal) -> bool {
    let Some(value) = value else {
        return false;
    };
    match literal {
        Literal::Text(text) => value.as_str() == Some(text.as_str()),
        Literal::Truthy(wanted) => scalar_to_string(value)
            .and_then(|s| bool_like(&s))
            .is_some_and(|b| b == *wanted),
        Literal::Number(n) => match value {
            Value::Number(v) => v.as_f64().is_some_and(|v| (v - *n).abs() < f64::EPSILON),
            Value::String(s) => s.parse::<f64>().is_ok_and(|v| (v - *n).abs() < f64::EPSILON),
            _ => false,
        },
    }
}

/// One usable condition recovered by the restricted evaluator.
#[derive(Debug, Clone, PartialEq)]
struct Equality {
    column: String,
    literal: Literal,
}

/// How a compiled predicate evaluates records.
#[derive(Debug, Clone, PartialEq)]
enum Strategy {
    /// The full expression parsed and all its columns are known.
    Ast(Expr),
    /// Restricted fallback: `and`-joined equalities against known columns.
    Equalities(Vec<Equality>),
    /// Nothing was usable; every record passes.
    PassAll,
}

/// A predicate compiled against a dataset's column set.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledPredicate {
    strategy: Strategy,
}

impl CompiledPredicate {
    /// Compiles predicate text, trying the full parser first and the
    /// restricted evaluator second.
    #[must_use]
    pub fn compile(text: &str, dataset: &Dataset) -> Self {
        if let Some(expr) = parse_expression(text) {
            let mut columns = Vec::new();
            expr.columns(&mut columns);
            if columns.iter().all(|column| dataset.has_column(column)) {
                return Self {
                    strategy: Strategy::Ast(expr),
                };
            }
        }

        let equalities = restricted_conditions(text, dataset);
        if equalities.is_empty() {
            return Self {
                strategy: Strategy::PassAll,
            };
        }
        Self {
            strategy: Strategy::Equalities(equalities),
        }
    }

    /// True when the predicate degraded to passing every record.
    #[must_use]
    pub fn is_pass_all(&self) -> bool {
        self.strategy == Strategy::PassAll
    }

    /// Evaluates the predicate against one record.
    #[must_use]
    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        match &self.strategy {
            Strategy::Ast(expr) => expr.matches(record),
            Strategy::Equalities(equalities) => equalities
                .iter()
                .all(|eq| literal_matches(record.get(&eq.column), &eq.literal)),
            Strategy::PassAll => true,
        }
    }
}

/// Extracts `and`-joined equality conditions the restricted evaluator
/// understands, dropping everything else.
fn restricted_conditions(text: &str, dataset: &Dataset) -> Vec<Equality> {
    let mut conditions = Vec::new();
    for token in AND_SPLIT.split(text) {
        let token = token.trim();
        if let Some(caps) = EQ_TEXT.captures(token) {
            let column = caps[1].to_string();
            if dataset.has_column(&column) {
                conditions.push(Equality {
                    column,
                    literal: Literal::Text(caps[2].to_string()),
                });
            }
        } else if let Some(caps) = EQ_BOOL.captures(token) {
            let column = caps[1].to_string();
            if dataset.has_column(&column) {
                conditions.push(Equality {
                    column,
                    literal: Literal::Truthy(caps[2].eq_ignore_ascii_case("true")),
                });
            }
        }
    }
    conditions
}

// ---------------------------------------------------------------------------
// Tokenizer and recursive-descent parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Text(String),
    Number(f64),
    Bool(bool),
    EqEq,
    LParen,
    RParen,
    Comma,
    And,
    In,
}

/// Tokenizes predicate text. Returns `None` on any unrecognized input.
fn tokenize(text: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '=' => {
                chars.next();
                if chars.next() != Some('=') {
                    return None;
                }
                tokens.push(Token::EqEq);
            }
            '"' | '\'' => {
                let quote = c;
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == quote => break,
                        Some(ch) => text.push(ch),
                        None => return None,
                    }
                }
                tokens.push(Token::Text(text));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut number = String::new();
                number.push(c);
                chars.next();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        number.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(number.parse().ok()?));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut word = String::new();
                while let Some(&w) = chars.peek() {
                    if w.is_alphanumeric() || w == '_' {
                        word.push(w);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match word.to_lowercase().as_str() {
                    "and" => tokens.push(Token::And),
                    "in" => tokens.push(Token::In),
                    "true" => tokens.push(Token::Bool(true)),
                    "false" => tokens.push(Token::Bool(false)),
                    _ => tokens.push(Token::Ident(word)),
                }
            }
            _ => return None,
        }
    }

    Some(tokens)
}

/// Parses a full predicate expression. Returns `None` when the text does
/// not fit the grammar; the caller then falls back to the restricted
/// evaluator.
fn parse_expression(text: &str) -> Option<Expr> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expression()?;
    parser.at_end().then_some(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// expression := comparison ('and' comparison)*
    fn expression(&mut self) -> Option<Expr> {
        let mut comparisons = vec![self.comparison()?];
        while self.peek() == Some(&Token::And) {
            self.next();
            comparisons.push(self.comparison()?);
        }
        if comparisons.len() == 1 {
            comparisons.pop()
        } else {
            Some(Expr::And(comparisons))
        }
    }

    /// comparison := IDENT '==' literal | IDENT 'in' '(' literal (',' literal)* ')'
    fn comparison(&mut self) -> Option<Expr> {
        let Some(Token::Ident(column)) = self.next() else {
            return None;
        };
        match self.next()? {
            Token::EqEq => {
                let literal = self.literal()?;
                Some(Expr::Eq { column, literal })
            }
            Token::In => {
                if self.next()? != Token::LParen {
                    return None;
                }
                let mut literals = vec![self.literal()?];
                loop {
                    match self.next()? {
                        Token::Comma => literals.push(self.literal()?),
                        Token::RParen => break,
                        _ => return None,
                    }
                }
                Some(Expr::In { column, literals })
            }
            _ => None,
        }
    }

    fn literal(&mut self) -> Option<Literal> {
        match self.next()? {
            Token::Text(text) => Some(Literal::Text(text)),
            Token::Bool(b) => Some(Literal::Truthy(b)),
            Token::Number(n) => Some(Literal::Number(n)),
            _ => None,
        }
    }
}
