//! The expression model of the Lyra kernel
//!
//! An expression is a tagged variant over atoms (the six numeric types,
//! strings, symbols, byte arrays) and compound lists (a head expression
//! plus ordered arguments). Every expression is an immutable value;
//! compound nodes are shared by reference count, so cloning is cheap.

use std::fmt;
use std::sync::Arc;

use crate::error::tags;
use crate::number::Number;
use crate::symbols;

/// A compound expression: a head applied to ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub head: Expr,
    pub args: Vec<Expr>,
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Number),
    Str(String),
    Sym(String),
    Bytes(Arc<Vec<u8>>),
    List(Arc<List>),
}

impl Expr {
    pub fn integer(value: i64) -> Self {
        Expr::Number(Number::Int(value))
    }

    pub fn real(value: f64) -> Self {
        Expr::Number(Number::Real(value))
    }

    pub fn rational(num: i64, den: i64) -> Self {
        Expr::Number(Number::rat(num, den))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::Str(value.into())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Sym(name.into())
    }

    pub fn bytes(data: Vec<u8>) -> Self {
        Expr::Bytes(Arc::new(data))
    }

    pub fn null() -> Self {
        Expr::symbol(symbols::NULL)
    }

    /// A compound expression with an arbitrary head.
    pub fn list(head: Expr, args: Vec<Expr>) -> Self {
        Expr::List(Arc::new(List { head, args }))
    }

    /// A compound expression whose head is the named symbol.
    pub fn normal(head: &str, args: Vec<Expr>) -> Self {
        Expr::list(Expr::symbol(head), args)
    }

    /// A `List`-headed list, the form sequence bindings are tagged with.
    pub fn list_of(args: Vec<Expr>) -> Self {
        Expr::normal(symbols::LIST, args)
    }

    /// Materialized error value: `Error[tag, message, args...]`.
    /// Errors are ordinary expressions, never unwinds.
    pub fn error(tag: &str, message: impl Into<String>, args: Vec<Expr>) -> Self {
        let mut full = vec![Expr::string(tag), Expr::string(message.into())];
        full.extend(args);
        Expr::normal(symbols::ERROR, full)
    }

    pub fn is_error(&self) -> bool {
        self.head_name() == Some(symbols::ERROR) && !self.is_atom()
    }

    pub fn is_atom(&self) -> bool {
        !matches!(self, Expr::List(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Expr::Number(_))
    }

    /// Argument count; atoms have length zero.
    pub fn length(&self) -> usize {
        match self {
            Expr::List(list) => list.args.len(),
            _ => 0,
        }
    }

    /// The head of a compound expression, or the symbol naming an
    /// atom's intrinsic type.
    pub fn head(&self) -> Expr {
        match self {
            Expr::List(list) => list.head.clone(),
            Expr::Number(n) => Expr::symbol(n.head_name()),
            Expr::Str(_) => Expr::symbol(symbols::STRING),
            Expr::Sym(_) => Expr::symbol(symbols::SYMBOL),
            Expr::Bytes(_) => Expr::symbol(symbols::BYTE_ARRAY),
        }
    }

    /// Head name when the head is a symbol; compound heads that are not
    /// symbols have no name.
    pub fn head_name(&self) -> Option<&str> {
        match self {
            Expr::List(list) => match &list.head {
                Expr::Sym(name) => Some(name),
                _ => None,
            },
            Expr::Number(n) => Some(n.head_name()),
            Expr::Str(_) => Some(symbols::STRING),
            Expr::Sym(_) => Some(symbols::SYMBOL),
            Expr::Bytes(_) => Some(symbols::BYTE_ARRAY),
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Sym(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Expr::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Expr::List(list) => Some(list),
            _ => None,
        }
    }

    /// Machine integer value of an exact integer atom.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Expr::Number(Number::Int(v)) => Some(*v),
            Expr::Number(Number::BigInt(v)) => v.to_i64(),
            _ => None,
        }
    }

    /// Whether this expression has the named symbol as head.
    pub fn has_head(&self, name: &str) -> bool {
        self.head_name() == Some(name)
    }

    /// One-based element access; negative indices count from the end.
    /// Out-of-range access materializes a PartError expression.
    pub fn part(&self, index: i64) -> Expr {
        match self {
            Expr::List(list) => match resolve_index(index, list.args.len()) {
                Some(i) => list.args[i].clone(),
                None => Expr::error(
                    tags::PART_ERROR,
                    format!("part {} of a length-{} expression", index, list.args.len()),
                    vec![self.clone(), Expr::integer(index)],
                ),
            },
            Expr::Bytes(data) => match resolve_index(index, data.len()) {
                Some(i) => Expr::integer(data[i] as i64),
                None => Expr::error(
                    tags::PART_ERROR,
                    format!("part {} of a length-{} byte array", index, data.len()),
                    vec![self.clone(), Expr::integer(index)],
                ),
            },
            _ => Expr::error(
                tags::PART_ERROR,
                "part access on an atom",
                vec![self.clone(), Expr::integer(index)],
            ),
        }
    }

    /// One-based inclusive slice. Endpoints outside the expression or
    /// crossed endpoints are PartErrors.
    pub fn take(&self, from: i64, to: i64) -> Expr {
        let len = match self {
            Expr::List(list) => list.args.len(),
            Expr::Bytes(data) => data.len(),
            _ => {
                return Expr::error(
                    tags::PART_ERROR,
                    "slice of an atom",
                    vec![self.clone()],
                )
            }
        };
        let (a, b) = match (resolve_index(from, len), resolve_index(to, len)) {
            (Some(a), Some(b)) if a <= b => (a, b),
            _ => {
                return Expr::error(
                    tags::PART_ERROR,
                    format!("inconsistent slice {}..{} of length {}", from, to, len),
                    vec![self.clone(), Expr::integer(from), Expr::integer(to)],
                )
            }
        };
        match self {
            Expr::List(list) => Expr::list(list.head.clone(), list.args[a..=b].to_vec()),
            Expr::Bytes(data) => Expr::bytes(data[a..=b].to_vec()),
            _ => unreachable!(),
        }
    }

    /// Functional element replacement; returns a new expression. Byte
    /// contexts require an integer value in `0..=255` (TypeError /
    /// ValueError otherwise).
    pub fn part_set(&self, index: i64, value: Expr) -> Expr {
        match self {
            Expr::List(list) => match resolve_index(index, list.args.len()) {
                Some(i) => {
                    let mut args = list.args.clone();
                    args[i] = value;
                    Expr::list(list.head.clone(), args)
                }
                None => Expr::error(
                    tags::PART_ERROR,
                    format!("part {} of a length-{} expression", index, list.args.len()),
                    vec![self.clone(), Expr::integer(index)],
                ),
            },
            Expr::Bytes(data) => {
                let byte = match byte_value(&value) {
                    Ok(b) => b,
                    Err(e) => return e,
                };
                match resolve_index(index, data.len()) {
                    Some(i) => {
                        let mut bytes = (**data).clone();
                        bytes[i] = byte;
                        Expr::bytes(bytes)
                    }
                    None => Expr::error(
                        tags::PART_ERROR,
                        format!("part {} of a length-{} byte array", index, data.len()),
                        vec![self.clone(), Expr::integer(index)],
                    ),
                }
            }
            _ => Expr::error(
                tags::PART_ERROR,
                "part assignment on an atom",
                vec![self.clone(), Expr::integer(index)],
            ),
        }
    }

    /// Functional slice replacement over `from..=to` (one-based). The
    /// replacement must be a `List`-headed list (or a byte array /
    /// integer list in byte contexts).
    pub fn slice_set(&self, from: i64, to: i64, value: Expr) -> Expr {
        match self {
            Expr::List(list) => {
                let replacement = match value.as_list() {
                    Some(l) if value.has_head(symbols::LIST) => l.args.clone(),
                    _ => {
                        return Expr::error(
                            tags::TYPE_ERROR,
                            "slice assignment requires a list value",
                            vec![self.clone(), value],
                        )
                    }
                };
                let len = list.args.len();
                let (a, b) = match (resolve_index(from, len), resolve_index(to, len)) {
                    (Some(a), Some(b)) if a <= b => (a, b),
                    _ => {
                        return Expr::error(
                            tags::PART_ERROR,
                            format!("inconsistent slice {}..{} of length {}", from, to, len),
                            vec![self.clone(), Expr::integer(from), Expr::integer(to)],
                        )
                    }
                };
                let mut args = list.args[..a].to_vec();
                args.extend(replacement);
                args.extend_from_slice(&list.args[b + 1..]);
                Expr::list(list.head.clone(), args)
            }
            Expr::Bytes(data) => {
                let len = data.len();
                let (a, b) = match (resolve_index(from, len), resolve_index(to, len)) {
                    (Some(a), Some(b)) if a <= b => (a, b),
                    _ => {
                        return Expr::error(
                            tags::PART_ERROR,
                            format!("inconsistent slice {}..{} of length {}", from, to, len),
                            vec![self.clone(), Expr::integer(from), Expr::integer(to)],
                        )
                    }
                };
                let replacement = match &value {
                    Expr::Bytes(new) => (**new).clone(),
                    Expr::List(l) if value.has_head(symbols::LIST) => {
                        let mut bytes = Vec::with_capacity(l.args.len());
                        for arg in &l.args {
                            match byte_value(arg) {
                                Ok(b) => bytes.push(b),
                                Err(e) => return e,
                            }
                        }
                        bytes
                    }
                    _ => {
                        return Expr::error(
                            tags::TYPE_ERROR,
                            "byte slice assignment requires bytes or an integer list",
                            vec![self.clone(), value],
                        )
                    }
                };
                let mut bytes = data[..a].to_vec();
                bytes.extend(replacement);
                bytes.extend_from_slice(&data[b + 1..]);
                Expr::bytes(bytes)
            }
            _ => Expr::error(
                tags::PART_ERROR,
                "slice assignment on an atom",
                vec![self.clone()],
            ),
        }
    }
}

/// Resolve a one-based index (negative counts from the end) into a
/// zero-based offset.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let resolved = if index > 0 {
        index - 1
    } else if index < 0 {
        len + index
    } else {
        return None;
    };
    if (0..len).contains(&resolved) {
        Some(resolved as usize)
    } else {
        None
    }
}

/// Check that an expression is usable as a byte; integers outside
/// `0..=255` are ValueErrors, non-integers TypeErrors.
fn byte_value(value: &Expr) -> Result<u8, Expr> {
    match value.as_i64() {
        Some(v) if (0..=255).contains(&v) => Ok(v as u8),
        Some(_) => Err(Expr::error(
            tags::VALUE_ERROR,
            "byte value out of range",
            vec![value.clone()],
        )),
        None => Err(Expr::error(
            tags::TYPE_ERROR,
            "byte assignment requires an integer",
            vec![value.clone()],
        )),
    }
}

impl fmt::Display for Expr {
    /// Renders the input form: application syntax for compound heads,
    /// `[...]` for `List`-headed lists, `{k: v}` for associations.
    /// Parsing the rendering yields an equal expression.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Str(s) => write_quoted(f, s),
            Expr::Sym(name) => write!(f, "{}", name),
            Expr::Bytes(data) => {
                write!(f, "ByteArray(")?;
                for (i, b) in data.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", b)?;
                }
                write!(f, ")")
            }
            Expr::List(list) => {
                if self.has_head(symbols::LIST) {
                    write!(f, "[")?;
                    write_args(f, &list.args)?;
                    return write!(f, "]");
                }
                if self.has_head(symbols::ASSOCIATION)
                    && list.args.iter().all(|a| a.has_head(symbols::RULE) && a.length() == 2)
                {
                    write!(f, "{{")?;
                    for (i, entry) in list.args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        let rule = entry.as_list().expect("rule entry");
                        write!(f, "{}: {}", rule.args[0], rule.args[1])?;
                    }
                    return write!(f, "}}");
                }
                write!(f, "{}(", list.head)?;
                write_args(f, &list.args)?;
                write!(f, ")")
            }
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Expr]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            _ => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}
