//! The substituter
//!
//! Applies a binding environment to a template expression. A plain
//! symbol argument bound to a sequence value (a `List`-headed list) is
//! spliced: its elements are inlined at that position, one level deep.
//! Heads substitute but never splice. Purely functional, order-stable.

use crate::expr::Expr;
use crate::matcher::Bindings;
use crate::symbols;

/// Apply `env` to `template`, returning a new expression.
pub fn substitute(template: &Expr, env: &Bindings) -> Expr {
    match template {
        Expr::Sym(name) => env
            .get(name)
            .cloned()
            .unwrap_or_else(|| template.clone()),
        Expr::List(list) => {
            let head = substitute(&list.head, env);
            let mut args = Vec::with_capacity(list.args.len());
            for arg in &list.args {
                if let Expr::Sym(name) = arg {
                    if let Some(value) = env.get(name) {
                        if let Some(sequence) = sequence_elements(value) {
                            args.extend(sequence.iter().cloned());
                        } else {
                            args.push(value.clone());
                        }
                        continue;
                    }
                }
                args.push(substitute(arg, env));
            }
            Expr::list(head, args)
        }
        _ => template.clone(),
    }
}

/// The elements of a sequence value, when `value` is a `List`-headed
/// list.
fn sequence_elements(value: &Expr) -> Option<&[Expr]> {
    let list = value.as_list()?;
    if value.head_name() == Some(symbols::LIST) {
        Some(&list.args)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> Expr {
        Expr::integer(v)
    }

    fn sym(name: &str) -> Expr {
        Expr::symbol(name)
    }

    fn env_of(pairs: &[(&str, Expr)]) -> Bindings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_symbol_replacement() {
        let env = env_of(&[("x", int(5))]);
        assert_eq!(substitute(&sym("x"), &env), int(5));
        assert_eq!(substitute(&sym("y"), &env), sym("y"));
        assert_eq!(substitute(&int(1), &env), int(1));
    }

    #[test]
    fn test_sequence_splicing() {
        let env = env_of(&[("xs", Expr::list_of(vec![int(1), int(2)]))]);
        let template = Expr::normal("g", vec![sym("xs")]);
        assert_eq!(
            substitute(&template, &env),
            Expr::normal("g", vec![int(1), int(2)])
        );
    }

    #[test]
    fn test_empty_sequence_contributes_nothing() {
        let env = env_of(&[("xs", Expr::list_of(vec![]))]);
        let template = Expr::normal("g", vec![int(0), sym("xs"), int(9)]);
        assert_eq!(
            substitute(&template, &env),
            Expr::normal("g", vec![int(0), int(9)])
        );
    }

    #[test]
    fn test_splices_one_level_only() {
        let nested = Expr::list_of(vec![Expr::list_of(vec![int(1)]), int(2)]);
        let env = env_of(&[("xs", nested)]);
        let template = Expr::normal("g", vec![sym("xs")]);
        assert_eq!(
            substitute(&template, &env),
            Expr::normal("g", vec![Expr::list_of(vec![int(1)]), int(2)])
        );
    }

    #[test]
    fn test_non_sequence_value_not_spliced() {
        let env = env_of(&[("x", Expr::normal("f", vec![int(1), int(2)]))]);
        let template = Expr::normal("g", vec![sym("x")]);
        assert_eq!(
            substitute(&template, &env),
            Expr::normal("g", vec![Expr::normal("f", vec![int(1), int(2)])])
        );
    }

    #[test]
    fn test_head_substitutes_without_splicing() {
        let env = env_of(&[("h", sym("Plus"))]);
        let template = Expr::list(sym("h"), vec![int(1), int(2)]);
        assert_eq!(
            substitute(&template, &env),
            Expr::normal("Plus", vec![int(1), int(2)])
        );
    }

    #[test]
    fn test_sibling_order_stable() {
        let env = env_of(&[
            ("a", int(1)),
            ("bs", Expr::list_of(vec![int(2), int(3)])),
            ("c", int(4)),
        ]);
        let template = Expr::normal("g", vec![sym("a"), sym("bs"), sym("c")]);
        assert_eq!(
            substitute(&template, &env),
            Expr::normal("g", vec![int(1), int(2), int(3), int(4)])
        );
    }

    #[test]
    fn test_nested_templates() {
        let env = env_of(&[("x", int(2))]);
        let template = Expr::normal(
            "Power",
            vec![sym("x"), Expr::normal("Plus", vec![sym("x"), int(1)])],
        );
        assert_eq!(
            substitute(&template, &env),
            Expr::normal("Power", vec![int(2), Expr::normal("Plus", vec![int(2), int(1)])])
        );
    }
}
