//! Pratt parser for Lyra source
//!
//! Consumes the lexer's token stream and emits canonical expressions:
//! operator syntax, bracket indexing/slicing, underscore patterns and
//! the function shorthand all normalize into symbolic heads. Errors are
//! accumulated with their source positions; the parser fails once at
//! the end with the full diagnostic list.

use crate::error::{Diagnostics, ParserError, SourceLocation};
use crate::expr::Expr;
use crate::lexer::{Token, TokenType};
use crate::number;
use crate::symbols;

// Binding powers, loosest first. Left-associative operators parse their
// right side one level tighter; right-associative ones reuse their own
// level.
const BP_COMPOUND: u8 = 1;
const BP_ASSIGN: u8 = 3;
const BP_RULE: u8 = 5;
const BP_OR: u8 = 7;
const BP_AND: u8 = 9;
const BP_EQUALITY: u8 = 11;
const BP_COMPARISON: u8 = 13;
const BP_SUM: u8 = 15;
const BP_PRODUCT: u8 = 17;
const BP_UNARY: u8 = 19;
const BP_POWER: u8 = 21;
const BP_POSTFIX: u8 = 23;

/// Parser for Lyra token streams
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    errors: Diagnostics,
}

impl Parser {
    /// Create a new parser with the given tokens
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
            errors: Diagnostics::new(),
        }
    }

    /// Parse the whole input as one expression. Empty input is the
    /// symbol `Null`; any accumulated diagnostics fail the parse as a
    /// batch.
    pub fn parse(mut self) -> Result<Expr, Diagnostics> {
        if self.at_eof() {
            return Ok(Expr::null());
        }
        let expr = self.parse_expression(0);
        if !self.at_eof() {
            self.error(ParserError::TrailingInput {
                location: self.location(),
            });
        }
        if self.errors.is_empty() {
            Ok(expr)
        } else {
            Err(self.errors)
        }
    }

    fn parse_expression(&mut self, min_bp: u8) -> Expr {
        let mut lhs = self.parse_prefix();
        loop {
            let (lbp, right_assoc) = match self.infix_binding() {
                Some(binding) => binding,
                None => break,
            };
            if lbp < min_bp {
                break;
            }
            let rhs_bp = if right_assoc { lbp } else { lbp + 1 };
            lhs = self.parse_infix(lhs, rhs_bp);
        }
        lhs
    }

    fn infix_binding(&self) -> Option<(u8, bool)> {
        let binding = match self.current() {
            TokenType::Semicolon => (BP_COMPOUND, false),
            TokenType::Set | TokenType::SetDelayed | TokenType::Unset => (BP_ASSIGN, true),
            TokenType::Colon | TokenType::RuleDelayed => (BP_RULE, false),
            TokenType::Or => (BP_OR, false),
            TokenType::And => (BP_AND, false),
            TokenType::Equal | TokenType::Unequal | TokenType::SameQ | TokenType::UnsameQ => {
                (BP_EQUALITY, false)
            }
            TokenType::Less
            | TokenType::Greater
            | TokenType::LessEqual
            | TokenType::GreaterEqual => (BP_COMPARISON, false),
            TokenType::Plus | TokenType::Minus => (BP_SUM, false),
            TokenType::Multiply | TokenType::Divide => (BP_PRODUCT, false),
            TokenType::Caret => (BP_POWER, true),
            TokenType::LeftParen | TokenType::LeftBracket | TokenType::Ampersand => {
                (BP_POSTFIX, false)
            }
            _ => return None,
        };
        Some(binding)
    }

    fn parse_infix(&mut self, lhs: Expr, rhs_bp: u8) -> Expr {
        let token = self.current().clone();
        match token {
            TokenType::Semicolon => {
                self.advance();
                let rhs = if self.starts_expression() {
                    self.parse_expression(rhs_bp)
                } else {
                    Expr::null()
                };
                flatten_into(symbols::COMPOUND_EXPRESSION, lhs, rhs)
            }
            TokenType::Set => {
                self.advance();
                let rhs = self.parse_expression(rhs_bp);
                rewrite_assignment(lhs, rhs)
            }
            TokenType::SetDelayed => {
                self.advance();
                let rhs = self.parse_expression(rhs_bp);
                Expr::normal(symbols::SET_DELAYED, vec![lhs, rhs])
            }
            TokenType::Unset => {
                self.advance();
                Expr::normal(symbols::UNSET, vec![lhs])
            }
            TokenType::Colon => {
                self.advance();
                let rhs = self.parse_expression(rhs_bp);
                Expr::normal(symbols::RULE, vec![lhs, rhs])
            }
            TokenType::RuleDelayed => {
                self.advance();
                let rhs = self.parse_expression(rhs_bp);
                Expr::normal(symbols::RULE_DELAYED, vec![lhs, rhs])
            }
            TokenType::Or => self.binary(lhs, rhs_bp, symbols::OR),
            TokenType::And => self.binary(lhs, rhs_bp, symbols::AND),
            TokenType::Equal => self.binary(lhs, rhs_bp, symbols::EQUAL),
            TokenType::Unequal => self.binary(lhs, rhs_bp, symbols::UNEQUAL),
            TokenType::SameQ => self.binary(lhs, rhs_bp, symbols::SAME_Q),
            TokenType::UnsameQ => self.binary(lhs, rhs_bp, symbols::UNSAME_Q),
            TokenType::Less => self.binary(lhs, rhs_bp, symbols::LESS),
            TokenType::Greater => self.binary(lhs, rhs_bp, symbols::GREATER),
            TokenType::LessEqual => self.binary(lhs, rhs_bp, symbols::LESS_EQUAL),
            TokenType::GreaterEqual => self.binary(lhs, rhs_bp, symbols::GREATER_EQUAL),
            TokenType::Plus => {
                self.advance();
                let rhs = self.parse_expression(rhs_bp);
                flatten_into(symbols::PLUS, lhs, rhs)
            }
            TokenType::Minus => self.binary(lhs, rhs_bp, symbols::SUBTRACT),
            TokenType::Multiply => {
                self.advance();
                let rhs = self.parse_expression(rhs_bp);
                flatten_into(symbols::TIMES, lhs, rhs)
            }
            TokenType::Divide => self.binary(lhs, rhs_bp, symbols::DIVIDE),
            TokenType::Caret => self.binary(lhs, rhs_bp, symbols::POWER),
            TokenType::LeftParen => self.parse_application(lhs),
            TokenType::LeftBracket => self.parse_index(lhs),
            TokenType::Ampersand => {
                self.advance();
                Expr::normal(symbols::FUNCTION, vec![lhs])
            }
            other => {
                // Unreachable while infix_binding and this dispatch
                // stay in sync.
                self.error(ParserError::UnexpectedToken {
                    expected: "operator".to_string(),
                    found: other.describe(),
                    location: self.location(),
                });
                self.advance();
                lhs
            }
        }
    }

    fn binary(&mut self, lhs: Expr, rhs_bp: u8, head: &str) -> Expr {
        self.advance();
        let rhs = self.parse_expression(rhs_bp);
        Expr::normal(head, vec![lhs, rhs])
    }

    /// `f(args...)`: application of `f` to zero or more arguments.
    fn parse_application(&mut self, head: Expr) -> Expr {
        self.advance(); // (
        let mut args = Vec::new();
        if self.current() != &TokenType::RightParen {
            loop {
                if self.at_eof() {
                    break;
                }
                args.push(self.parse_expression(BP_COMPOUND + 1));
                if self.current() == &TokenType::Comma {
                    self.advance();
                    if self.current() == &TokenType::RightParen {
                        break;
                    }
                    continue;
                }
                break;
            }
        }
        self.expect(TokenType::RightParen);
        Expr::list(head, args)
    }

    /// `expr[...]`: element access and slices. `expr[]` is an error.
    fn parse_index(&mut self, target: Expr) -> Expr {
        self.advance(); // [
        if self.current() == &TokenType::RightBracket {
            self.error(ParserError::EmptyIndex {
                location: self.location(),
            });
            self.advance();
            return target;
        }
        // `expr[:b]` takes a prefix of the expression.
        if self.current() == &TokenType::Colon {
            self.advance();
            let to = self.parse_expression(BP_RULE + 1);
            self.expect(TokenType::RightBracket);
            return Expr::normal(symbols::TAKE, vec![target, to]);
        }
        let first = self.parse_expression(BP_RULE + 1);
        match self.current() {
            TokenType::Colon => {
                self.advance();
                if self.current() == &TokenType::RightBracket {
                    self.advance();
                    // `expr[a:]` runs to the end.
                    let spec = Expr::list_of(vec![first, Expr::integer(-1)]);
                    return Expr::normal(symbols::TAKE, vec![target, spec]);
                }
                let to = self.parse_expression(BP_RULE + 1);
                self.expect(TokenType::RightBracket);
                let spec = Expr::list_of(vec![first, to]);
                Expr::normal(symbols::TAKE, vec![target, spec])
            }
            TokenType::Comma => {
                let mut indices = vec![first];
                while self.current() == &TokenType::Comma {
                    self.advance();
                    indices.push(self.parse_expression(BP_RULE + 1));
                }
                self.expect(TokenType::RightBracket);
                let mut args = vec![target];
                args.extend(indices);
                Expr::normal(symbols::PART, args)
            }
            _ => {
                self.expect(TokenType::RightBracket);
                Expr::normal(symbols::PART, vec![target, first])
            }
        }
    }

    fn parse_prefix(&mut self) -> Expr {
        let location = self.location();
        match self.current().clone() {
            TokenType::Integer(text) => {
                self.advance();
                match number::parse_integer(&text) {
                    Ok(n) => Expr::Number(n),
                    Err(message) => {
                        self.error(ParserError::InvalidLiteral {
                            value: text,
                            message,
                            location,
                        });
                        Expr::null()
                    }
                }
            }
            TokenType::Float(text) => {
                self.advance();
                match number::parse_real(&text) {
                    Ok(n) => Expr::Number(n),
                    Err(message) => {
                        self.error(ParserError::InvalidLiteral {
                            value: text,
                            message,
                            location,
                        });
                        Expr::null()
                    }
                }
            }
            TokenType::Str(value) => {
                self.advance();
                Expr::Str(value)
            }
            TokenType::Symbol(name) => {
                self.advance();
                if let TokenType::Underscore(count) = self.current() {
                    let count = *count;
                    self.advance();
                    let blank = self.parse_blank(count);
                    return Expr::normal(
                        symbols::PATTERN,
                        vec![Expr::symbol(name), blank],
                    );
                }
                Expr::Sym(name)
            }
            TokenType::Underscore(count) => {
                self.advance();
                self.parse_blank(count)
            }
            TokenType::LeftParen => {
                self.advance();
                if self.current() == &TokenType::RightParen {
                    self.error(ParserError::UnexpectedToken {
                        expected: "expression".to_string(),
                        found: "')'".to_string(),
                        location: self.location(),
                    });
                    self.advance();
                    return Expr::null();
                }
                let inner = self.parse_expression(0);
                self.expect(TokenType::RightParen);
                inner
            }
            TokenType::LeftBracket => self.parse_list_literal(),
            TokenType::LeftBrace => self.parse_association(),
            TokenType::Minus => {
                self.advance();
                let operand = self.parse_expression(BP_UNARY);
                match operand {
                    // Negative literals fold so they render and reparse
                    // as themselves.
                    Expr::Number(n) => Expr::Number(n.neg()),
                    other => Expr::normal(symbols::MINUS, vec![other]),
                }
            }
            TokenType::Plus => {
                self.advance();
                self.parse_expression(BP_UNARY)
            }
            TokenType::Not => {
                self.advance();
                let operand = self.parse_expression(BP_UNARY);
                Expr::normal(symbols::NOT, vec![operand])
            }
            TokenType::Eof => {
                self.error(ParserError::UnexpectedEof { location });
                Expr::null()
            }
            other => {
                self.error(ParserError::UnexpectedToken {
                    expected: "expression".to_string(),
                    found: other.describe(),
                    location,
                });
                self.advance();
                Expr::null()
            }
        }
    }

    /// Underscore forms: `_`, `__`, `___`, optionally followed by a
    /// type symbol.
    fn parse_blank(&mut self, count: u8) -> Expr {
        let head = match count {
            1 => symbols::BLANK,
            2 => symbols::BLANK_SEQUENCE,
            _ => symbols::BLANK_NULL_SEQUENCE,
        };
        if let TokenType::Symbol(type_name) = self.current() {
            let type_name = type_name.clone();
            self.advance();
            return Expr::normal(head, vec![Expr::symbol(type_name)]);
        }
        Expr::normal(head, vec![])
    }

    /// `[a, b, c]` with an optional trailing comma.
    fn parse_list_literal(&mut self) -> Expr {
        self.advance(); // [
        let mut items = Vec::new();
        loop {
            if self.current() == &TokenType::RightBracket {
                break;
            }
            if self.at_eof() {
                break;
            }
            items.push(self.parse_expression(BP_COMPOUND + 1));
            if self.current() == &TokenType::Comma {
                self.advance();
                continue;
            }
            break;
        }
        self.expect(TokenType::RightBracket);
        Expr::list_of(items)
    }

    /// `{k: v, ...}` builds an association; the `:` entries arrive as
    /// rules from the infix layer.
    fn parse_association(&mut self) -> Expr {
        self.advance(); // {
        let mut entries = Vec::new();
        loop {
            if self.current() == &TokenType::RightBrace {
                break;
            }
            if self.at_eof() {
                break;
            }
            entries.push(self.parse_expression(BP_COMPOUND + 1));
            if self.current() == &TokenType::Comma {
                self.advance();
                continue;
            }
            break;
        }
        self.expect(TokenType::RightBrace);
        Expr::normal(symbols::ASSOCIATION, entries)
    }

    fn starts_expression(&self) -> bool {
        matches!(
            self.current(),
            TokenType::Symbol(_)
                | TokenType::Integer(_)
                | TokenType::Float(_)
                | TokenType::Str(_)
                | TokenType::Underscore(_)
                | TokenType::LeftParen
                | TokenType::LeftBracket
                | TokenType::LeftBrace
                | TokenType::Minus
                | TokenType::Plus
                | TokenType::Not
        )
    }

    fn current(&self) -> &TokenType {
        self.tokens
            .get(self.position)
            .map(|t| &t.token_type)
            .unwrap_or(&TokenType::Eof)
    }

    fn location(&self) -> SourceLocation {
        self.tokens
            .get(self.position)
            .map(|t| t.location.clone())
            .unwrap_or_else(SourceLocation::unknown)
    }

    fn at_eof(&self) -> bool {
        self.current() == &TokenType::Eof
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn expect(&mut self, expected: TokenType) {
        if self.current() == &expected {
            self.advance();
            return;
        }
        let delimiter = match expected {
            TokenType::RightParen => Some(')'),
            TokenType::RightBracket => Some(']'),
            TokenType::RightBrace => Some('}'),
            _ => None,
        };
        let location = self.location();
        match delimiter {
            Some(delimiter) => self.error(ParserError::UnmatchedDelimiter {
                delimiter,
                location,
            }),
            None => self.error(ParserError::UnexpectedToken {
                expected: expected.describe(),
                found: self.current().describe(),
                location,
            }),
        }
    }

    fn error(&mut self, error: ParserError) {
        self.errors.push(error);
    }
}

/// Append `rhs` into a flattening head: consecutive `+`, `*` or `;`
/// build one `Plus`/`Times`/`CompoundExpression` list.
fn flatten_into(head: &str, lhs: Expr, rhs: Expr) -> Expr {
    match lhs.as_list() {
        Some(list) if lhs.head_name() == Some(head) => {
            let mut args = list.args.clone();
            args.push(rhs);
            Expr::normal(head, args)
        }
        _ => Expr::normal(head, vec![lhs, rhs]),
    }
}

/// Rewrite `lhs = rhs` by the shape of the left side: part access
/// becomes `PartSet`, slices become `SliceSet`, everything else is a
/// plain `Set`.
fn rewrite_assignment(lhs: Expr, rhs: Expr) -> Expr {
    if let Some(list) = lhs.as_list() {
        match lhs.head_name() {
            Some(name) if name == symbols::PART && list.args.len() >= 2 => {
                let mut args = list.args.clone();
                args.push(rhs);
                return Expr::normal(symbols::PART_SET, args);
            }
            Some(name) if name == symbols::TAKE && list.args.len() == 2 => {
                let target = list.args[0].clone();
                let spec = &list.args[1];
                let (from, to) = match spec.as_list() {
                    Some(bounds)
                        if spec.head_name() == Some(symbols::LIST)
                            && bounds.args.len() == 2 =>
                    {
                        (bounds.args[0].clone(), bounds.args[1].clone())
                    }
                    _ => (Expr::integer(1), spec.clone()),
                };
                return Expr::normal(symbols::SLICE_SET, vec![target, from, to, rhs]);
            }
            _ => {}
        }
    }
    Expr::normal(symbols::SET, vec![lhs, rhs])
}
