//! APIGEE flow condition parser.
//!
//! Turns a condition such as
//! `(proxy.pathsuffix MatchesPath "/pets/*") and (request.verb = "GET")`
//! into a flat, ordered list of [`ConditionClause`]s.
//!
//! Grammar accepted:
//!
//! ```text
//! expr       := term (connective? term)*
//! term       := '(' expr ')' | clause
//! connective := and | or | && | ||        (any case, discarded)
//! clause     := variable operator value
//! variable   := [a-z.]+
//! operator   := [A-Za-z][A-Za-z0-9_]* | run of symbol characters (=, !=, ~/, ...)
//! value      := "..." | '...' | bare token up to whitespace or ')'
//! ```
//!
//! A connective may only be omitted between two parenthesized terms, and
//! groups nest at most [`MAX_DEPTH`] levels.
//! Nesting is flattened: the result says nothing about how the clauses were
//! combined, only which clauses appear and in what order.

use thiserror::Error;

/// The literal APIGEE writes for "no condition".
pub const NULL_CONDITION: &str = "null";

/// Deepest parenthesis nesting a condition may use.
pub const MAX_DEPTH: usize = 64;

/// One atomic predicate of a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionClause {
    pub variable: String,
    pub operator: String,
    pub value: String,
}

impl ConditionClause {
    pub fn new(
        variable: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            variable: variable.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// Why a condition was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConditionErrorKind {
    #[error("expected a variable name")]
    MissingVariable,
    #[error("variable names may only contain lowercase letters and dots")]
    InvalidVariable,
    #[error("expected an operator")]
    MissingOperator,
    #[error("expected a value")]
    MissingValue,
    #[error("unterminated quoted value")]
    UnterminatedQuote,
    #[error("unbalanced parenthesis")]
    UnbalancedParen,
    #[error("expected `and`, `or` or end of condition")]
    ExpectedConnective,
    #[error("parentheses nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,
}

/// E2001: a condition does not match the clause grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("E2001: invalid condition `{segment}` at offset {offset}: {kind}")]
pub struct ConditionError {
    /// The full (trimmed) condition text.
    pub input: String,
    /// Byte offset of the failure within `input`.
    pub offset: usize,
    /// The clause being parsed when the failure happened.
    pub segment: String,
    pub kind: ConditionErrorKind,
}

/// Parse a raw condition into its clauses.
///
/// `"null"` and blank text mean "no condition" and yield an empty list.
pub fn parse_conditions(raw: &str) -> Result<Vec<ConditionClause>, ConditionError> {
    let input = raw.trim();
    if input.is_empty() || input == NULL_CONDITION {
        return Ok(Vec::new());
    }

    let mut parser = Parser {
        input,
        pos: 0,
        clauses: Vec::new(),
    };
    parser.parse_expr(0)?;
    Ok(parser.clauses)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    clauses: Vec<ConditionClause>,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_ws(&mut self) {
        self.take_while(char::is_whitespace);
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.input[start..self.pos]
    }

    fn error(&self, start: usize, offset: usize, kind: ConditionErrorKind) -> ConditionError {
        // The segment runs from the start of the clause to the next ')' (or the end).
        let end = self.input[offset..]
            .find(')')
            .map(|i| offset + i)
            .unwrap_or(self.input.len());
        let mut segment = self.input[start..end].trim();
        if segment.is_empty() {
            segment = self.input[start..].trim();
        }
        ConditionError {
            input: self.input.to_string(),
            offset,
            segment: segment.to_string(),
            kind,
        }
    }

    fn parse_expr(&mut self, depth: usize) -> Result<(), ConditionError> {
        loop {
            self.skip_ws();
            self.parse_term(depth)?;
            self.skip_ws();

            match self.peek() {
                None => return Ok(()),
                Some(')') if depth > 0 => return Ok(()),
                Some(')') => {
                    return Err(self.error(self.pos, self.pos, ConditionErrorKind::UnbalancedParen))
                }
                // Juxtaposed groups: `(a = "1") (b = "2")`
                Some('(') => continue,
                Some(_) => self.parse_connective()?,
            }
        }
    }

    fn parse_term(&mut self, depth: usize) -> Result<(), ConditionError> {
        let start = self.pos;
        if self.peek() != Some('(') {
            return self.parse_clause();
        }

        if depth >= MAX_DEPTH {
            return Err(self.error(start, self.pos, ConditionErrorKind::TooDeep));
        }
        self.bump();
        self.parse_expr(depth + 1)?;
        self.skip_ws();
        if self.peek() == Some(')') {
            self.bump();
            Ok(())
        } else {
            Err(self.error(start, self.pos, ConditionErrorKind::UnbalancedParen))
        }
    }

    fn parse_connective(&mut self) -> Result<(), ConditionError> {
        let start = self.pos;
        if self.rest().starts_with("&&") || self.rest().starts_with("||") {
            self.pos += 2;
            return Ok(());
        }

        let word = self.take_while(|c| c.is_ascii_alphabetic());
        if word.eq_ignore_ascii_case("and") || word.eq_ignore_ascii_case("or") {
            Ok(())
        } else {
            self.pos = start;
            Err(self.error(start, start, ConditionErrorKind::ExpectedConnective))
        }
    }

    fn parse_clause(&mut self) -> Result<(), ConditionError> {
        let start = self.pos;

        let variable = self.take_while(|c| c.is_ascii_lowercase() || c == '.');
        if variable.is_empty() {
            return Err(self.error(start, self.pos, ConditionErrorKind::MissingVariable));
        }
        if self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '-')
        {
            return Err(self.error(start, self.pos, ConditionErrorKind::InvalidVariable));
        }

        self.skip_ws();
        let operator = match self.peek() {
            Some(c) if c.is_ascii_alphabetic() => {
                self.take_while(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            Some(c) if is_operator_symbol(c) => self.take_while(is_operator_symbol),
            _ => "",
        };
        if operator.is_empty() {
            return Err(self.error(start, self.pos, ConditionErrorKind::MissingOperator));
        }

        self.skip_ws();
        let value = self.parse_value(start)?;

        self.clauses.push(ConditionClause::new(variable, operator, value));
        Ok(())
    }

    fn parse_value(&mut self, clause_start: usize) -> Result<&'a str, ConditionError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                let open = self.pos;
                self.bump();
                match self.rest().find(quote) {
                    Some(len) => {
                        let value = &self.rest()[..len];
                        self.pos += len + quote.len_utf8();
                        Ok(value)
                    }
                    None => Err(self.error(
                        clause_start,
                        open,
                        ConditionErrorKind::UnterminatedQuote,
                    )),
                }
            }
            // Quoted text is kept as written; bare tokens lose stray delimiters.
            Some(c) if c != ')' => Ok(self
                .take_while(|c| !c.is_whitespace() && c != ')')
                .trim_matches(|c| matches!(c, '(' | '"' | '\''))),
            _ => Err(self.error(clause_start, self.pos, ConditionErrorKind::MissingValue)),
        }
    }
}

fn is_operator_symbol(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace() && !matches!(c, '"' | '\'' | '(' | ')')
}
