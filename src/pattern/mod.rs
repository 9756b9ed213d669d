//! Pattern analysis for the Lyra kernel
//!
//! Recognizers and constructors for the symbolic pattern forms, the
//! specificity scorer used by rule tables, and structural pattern
//! equality that ignores variable names.

use crate::expr::Expr;
use crate::symbols;

/// Embedder hook resolving which type names are user-declared; the
/// kernel itself keeps no type registry.
pub trait TypeLookup {
    fn is_declared(&self, name: &str) -> bool;
}

/// The default lookup: nothing is declared.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeclaredTypes;

impl TypeLookup for NoDeclaredTypes {
    fn is_declared(&self, _name: &str) -> bool {
        false
    }
}

/// Which kind of blank a pattern element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankKind {
    /// `Blank[T?]` matches exactly one expression.
    Single,
    /// `BlankSequence[T?]` matches one or more consecutive arguments.
    Sequence,
    /// `BlankNullSequence[T?]` matches zero or more consecutive
    /// arguments.
    NullSequence,
}

impl BlankKind {
    pub fn head(self) -> &'static str {
        match self {
            BlankKind::Single => symbols::BLANK,
            BlankKind::Sequence => symbols::BLANK_SEQUENCE,
            BlankKind::NullSequence => symbols::BLANK_NULL_SEQUENCE,
        }
    }

    /// Fewest arguments the blank may consume in a list.
    pub fn min_consume(self) -> usize {
        match self {
            BlankKind::NullSequence => 0,
            _ => 1,
        }
    }
}

/// An unnamed blank: `Blank[]`, `Blank[T]`.
pub fn blank() -> Expr {
    Expr::normal(symbols::BLANK, vec![])
}

pub fn blank_typed(type_name: &str) -> Expr {
    Expr::normal(symbols::BLANK, vec![Expr::symbol(type_name)])
}

pub fn blank_sequence() -> Expr {
    Expr::normal(symbols::BLANK_SEQUENCE, vec![])
}

pub fn blank_null_sequence() -> Expr {
    Expr::normal(symbols::BLANK_NULL_SEQUENCE, vec![])
}

/// A named pattern: `Pattern[name, body]`.
pub fn pattern(name: &str, body: Expr) -> Expr {
    Expr::normal(symbols::PATTERN, vec![Expr::symbol(name), body])
}

pub fn alternatives(branches: Vec<Expr>) -> Expr {
    Expr::normal(symbols::ALTERNATIVES, branches)
}

pub fn except(body: Expr) -> Expr {
    Expr::normal(symbols::EXCEPT, vec![body])
}

/// Classify an expression as a blank, returning its kind.
pub fn blank_kind(expr: &Expr) -> Option<BlankKind> {
    let name = expr.head_name()?;
    if expr.is_atom() || expr.length() > 1 {
        return None;
    }
    match name {
        _ if name == symbols::BLANK => Some(BlankKind::Single),
        _ if name == symbols::BLANK_SEQUENCE => Some(BlankKind::Sequence),
        _ if name == symbols::BLANK_NULL_SEQUENCE => Some(BlankKind::NullSequence),
        _ => None,
    }
}

/// The optional head-name constraint of a blank.
pub fn blank_constraint(expr: &Expr) -> Option<&str> {
    let list = expr.as_list()?;
    list.args.first().and_then(|a| a.as_symbol())
}

pub fn is_blank(expr: &Expr) -> bool {
    blank_kind(expr) == Some(BlankKind::Single)
}

pub fn is_sequence_blank(expr: &Expr) -> bool {
    matches!(
        blank_kind(expr),
        Some(BlankKind::Sequence) | Some(BlankKind::NullSequence)
    )
}

/// `Pattern[name, body]` with a symbol name and exactly one body.
pub fn is_pattern(expr: &Expr) -> bool {
    pattern_parts(expr).is_some()
}

/// Split a `Pattern[name, body]` into its pieces.
pub fn pattern_parts(expr: &Expr) -> Option<(&str, &Expr)> {
    let list = expr.as_list()?;
    if expr.head_name() != Some(symbols::PATTERN) || list.args.len() != 2 {
        return None;
    }
    let name = list.args[0].as_symbol()?;
    Some((name, &list.args[1]))
}

pub fn is_alternatives(expr: &Expr) -> bool {
    !expr.is_atom() && expr.head_name() == Some(symbols::ALTERNATIVES)
}

pub fn is_except(expr: &Expr) -> bool {
    !expr.is_atom() && expr.head_name() == Some(symbols::EXCEPT) && expr.length() == 1
}

/// Whether any pattern form occurs anywhere in the expression.
pub fn contains_pattern(expr: &Expr) -> bool {
    if blank_kind(expr).is_some() || is_pattern(expr) || is_alternatives(expr) || is_except(expr) {
        return true;
    }
    match expr.as_list() {
        Some(list) => {
            contains_pattern(&list.head) || list.args.iter().any(contains_pattern)
        }
        None => false,
    }
}

const LITERAL_BASE: u64 = 4;

/// Specificity score: a total ordering used by rule tables to try more
/// concrete patterns first. Higher is more specific; absolute values
/// are not observable.
pub fn specificity(expr: &Expr, types: &dyn TypeLookup) -> u64 {
    if let Some((_, body)) = pattern_parts(expr) {
        // Naming a pattern adds no specificity.
        return specificity(body, types);
    }
    if let Some(kind) = blank_kind(expr) {
        let base = constraint_base(blank_constraint(expr), types);
        let kind_bonus = match kind {
            BlankKind::NullSequence => 0,
            BlankKind::Sequence => 1,
            BlankKind::Single => 2,
        };
        return 10 * base + kind_bonus;
    }
    if is_alternatives(expr) {
        // A rule is only as specific as its most general branch.
        let list = expr.as_list().expect("alternatives list");
        return list
            .args
            .iter()
            .map(|b| specificity(b, types))
            .min()
            .unwrap_or(0);
    }
    if is_except(expr) {
        // Excludes structure without requiring any; scores as an
        // untyped single blank.
        return 2;
    }
    match expr.as_list() {
        Some(list) => {
            let args: u64 = list.args.iter().map(|a| specificity(a, types)).sum();
            1000 * specificity(&list.head, types) + 100 * list.args.len() as u64 + args
        }
        None => 100 * LITERAL_BASE,
    }
}

fn constraint_base(constraint: Option<&str>, types: &dyn TypeLookup) -> u64 {
    match constraint {
        None => 0,
        Some(name) if symbols::is_builtin_type(name) => 2,
        Some(name) if types.is_declared(name) => 3,
        Some(_) => 1,
    }
}

/// Structural pattern equality: variable names are ignored uniformly,
/// blanks compare by kind and type constraint, everything else
/// compares by value.
pub fn patterns_equal(a: &Expr, b: &Expr) -> bool {
    let a_body = pattern_parts(a).map(|(_, body)| body).unwrap_or(a);
    let b_body = pattern_parts(b).map(|(_, body)| body).unwrap_or(b);
    match (blank_kind(a_body), blank_kind(b_body)) {
        (Some(ka), Some(kb)) => {
            ka == kb && blank_constraint(a_body) == blank_constraint(b_body)
        }
        (None, None) => match (a_body.as_list(), b_body.as_list()) {
            (Some(la), Some(lb)) => {
                la.args.len() == lb.args.len()
                    && patterns_equal(&la.head, &lb.head)
                    && la
                        .args
                        .iter()
                        .zip(&lb.args)
                        .all(|(x, y)| patterns_equal(x, y))
            }
            _ => a_body == b_body,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_recognizers() {
        assert_eq!(blank_kind(&blank()), Some(BlankKind::Single));
        assert_eq!(blank_kind(&blank_sequence()), Some(BlankKind::Sequence));
        assert_eq!(
            blank_kind(&blank_null_sequence()),
            Some(BlankKind::NullSequence)
        );
        assert_eq!(blank_kind(&Expr::symbol("Blank")), None);
        assert_eq!(blank_constraint(&blank_typed("Integer")), Some("Integer"));
        assert_eq!(blank_constraint(&blank()), None);
    }

    #[test]
    fn test_pattern_parts() {
        let p = pattern("x", blank_typed("Integer"));
        let (name, body) = pattern_parts(&p).unwrap();
        assert_eq!(name, "x");
        assert!(is_blank(body));
        assert!(pattern_parts(&blank()).is_none());
    }

    #[test]
    fn test_contains_pattern() {
        let f = Expr::normal("f", vec![pattern("x", blank())]);
        assert!(contains_pattern(&f));
        let g = Expr::normal("g", vec![Expr::integer(1)]);
        assert!(!contains_pattern(&g));
    }

    #[test]
    fn test_specificity_orders_blank_kinds() {
        let lookup = NoDeclaredTypes;
        let null_seq = specificity(&blank_null_sequence(), &lookup);
        let seq = specificity(&blank_sequence(), &lookup);
        let single = specificity(&blank(), &lookup);
        let typed = specificity(&blank_typed("Integer"), &lookup);
        let literal = specificity(&Expr::integer(5), &lookup);
        assert!(null_seq < seq);
        assert!(seq < single);
        assert!(single < typed);
        assert!(typed < literal);
    }

    #[test]
    fn test_specificity_type_bases() {
        struct Declared;
        impl TypeLookup for Declared {
            fn is_declared(&self, name: &str) -> bool {
                name == "Quaternion"
            }
        }
        let builtin = specificity(&blank_typed("Integer"), &Declared);
        let declared = specificity(&blank_typed("Quaternion"), &Declared);
        let unknown = specificity(&blank_typed("Mystery"), &Declared);
        let untyped = specificity(&blank(), &Declared);
        assert!(untyped < unknown);
        assert!(unknown < builtin);
        assert!(builtin < declared);
    }

    #[test]
    fn test_specificity_compound_and_naming() {
        let lookup = NoDeclaredTypes;
        let named = pattern("x", blank_typed("Integer"));
        assert_eq!(
            specificity(&named, &lookup),
            specificity(&blank_typed("Integer"), &lookup)
        );
        let loose = Expr::normal("f", vec![blank()]);
        let tight = Expr::normal("f", vec![Expr::integer(1)]);
        assert!(specificity(&loose, &lookup) < specificity(&tight, &lookup));
    }

    #[test]
    fn test_specificity_alternatives_take_weakest_branch() {
        let lookup = NoDeclaredTypes;
        let alt = alternatives(vec![Expr::integer(1), blank()]);
        assert_eq!(specificity(&alt, &lookup), specificity(&blank(), &lookup));
    }

    #[test]
    fn test_patterns_equal_ignores_names() {
        let a = pattern("x", blank_typed("Integer"));
        let b = pattern("y", blank_typed("Integer"));
        assert!(patterns_equal(&a, &b));
        let c = pattern("x", blank_typed("Real"));
        assert!(!patterns_equal(&a, &c));
        let d = pattern("x", blank_sequence());
        assert!(!patterns_equal(&a, &d));
    }

    #[test]
    fn test_patterns_equal_structural() {
        let a = Expr::normal("f", vec![pattern("x", blank()), Expr::integer(2)]);
        let b = Expr::normal("f", vec![pattern("z", blank()), Expr::integer(2)]);
        assert!(patterns_equal(&a, &b));
        let c = Expr::normal("g", vec![pattern("z", blank()), Expr::integer(2)]);
        assert!(!patterns_equal(&a, &c));
    }
}
