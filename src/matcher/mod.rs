// Copyright 2025 the Lyra Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The pattern matcher
//!
//! A pure recursive walk over pattern and subject. The binding
//! environment grows incrementally; every speculative branch works on a
//! copy and commits only on success, so failure needs no rollback.
//! Sequence blanks are greedy: the widest window is tried first and
//! shrunk until the rest of the pattern fits.

use std::collections::BTreeMap;

use crate::expr::Expr;
use crate::pattern::{
    blank_constraint, blank_kind, is_alternatives, is_except, pattern_parts, BlankKind,
};
use crate::symbols;

/// Captured bindings, ordered by variable name so iteration is stable.
pub type Bindings = BTreeMap<String, Expr>;

/// Match `pattern` against `subject`, producing the bindings on
/// success. Neither input is mutated.
pub fn match_expr(pattern: &Expr, subject: &Expr) -> Option<Bindings> {
    let mut env = Bindings::new();
    match_into(pattern, subject, &mut env).then_some(env)
}

/// Whether `pattern` matches `subject`, discarding bindings.
pub fn matches(pattern: &Expr, subject: &Expr) -> bool {
    match_expr(pattern, subject).is_some()
}

fn match_into(pattern: &Expr, subject: &Expr, env: &mut Bindings) -> bool {
    if is_alternatives(pattern) {
        let list = pattern.as_list().expect("alternatives list");
        for branch in &list.args {
            let mut trial = Bindings::new();
            if match_into(branch, subject, &mut trial) {
                if let Some(merged) = merge_consistent(env, trial) {
                    *env = merged;
                    return true;
                }
            }
        }
        return false;
    }

    if is_except(pattern) {
        let inner = &pattern.as_list().expect("except list").args[0];
        // Binds nothing, even when the excluded pattern names variables.
        return match_expr(inner, subject).is_none();
    }

    if let Some((name, body)) = pattern_parts(pattern) {
        let mut trial = env.clone();
        if !match_into(body, subject, &mut trial) {
            return false;
        }
        if !bind_checked(&mut trial, name, subject.clone()) {
            return false;
        }
        *env = trial;
        return true;
    }

    if blank_kind(pattern).is_some() {
        // Outside a list-argument position a sequence blank covers a
        // run of exactly one, so every kind reduces to the constraint
        // check here.
        return constraint_matches(blank_constraint(pattern), subject);
    }

    match (pattern.as_list(), subject.as_list()) {
        (Some(p), Some(e)) => {
            let mut trial = env.clone();
            if !match_into(&p.head, &e.head, &mut trial) {
                return false;
            }
            if !match_args(&p.args, &e.args, 0, 0, &mut trial) {
                return false;
            }
            *env = trial;
            true
        }
        _ => pattern == subject,
    }
}

/// The list matcher: walk pattern args against subject args, letting
/// sequence blanks absorb windows of arguments.
fn match_args(
    pargs: &[Expr],
    eargs: &[Expr],
    pi: usize,
    ei: usize,
    env: &mut Bindings,
) -> bool {
    if pi == pargs.len() {
        return ei == eargs.len();
    }

    let element = &pargs[pi];
    let (name, body) = match pattern_parts(element) {
        Some((name, body)) => (Some(name), body),
        None => (None, element),
    };

    if let Some(kind) = blank_kind(body) {
        if kind != BlankKind::Single {
            return match_sequence(
                pargs,
                eargs,
                pi,
                ei,
                kind,
                name,
                blank_constraint(body),
                env,
            );
        }
    }

    let mut trial = env.clone();
    if ei < eargs.len()
        && match_into(element, &eargs[ei], &mut trial)
        && match_args(pargs, eargs, pi + 1, ei + 1, &mut trial)
    {
        *env = trial;
        return true;
    }
    false
}

#[allow(clippy::too_many_arguments)]
fn match_sequence(
    pargs: &[Expr],
    eargs: &[Expr],
    pi: usize,
    ei: usize,
    kind: BlankKind,
    name: Option<&str>,
    constraint: Option<&str>,
    env: &mut Bindings,
) -> bool {
    let rem_pattern = pargs.len() - pi - 1;
    let rem_subject = eargs.len() - ei;
    if rem_subject < rem_pattern {
        return false;
    }
    let max_consume = rem_subject - rem_pattern;
    let min_consume = kind.min_consume();
    if max_consume < min_consume {
        return false;
    }

    // Greedy: widest window first, shrinking on failure.
    for k in (min_consume..=max_consume).rev() {
        let window = &eargs[ei..ei + k];
        if !window.iter().all(|e| constraint_matches(constraint, e)) {
            continue;
        }
        let mut trial = env.clone();
        if let Some(name) = name {
            let value = Expr::list_of(window.to_vec());
            if !bind_checked(&mut trial, name, value) {
                continue;
            }
        }
        if match_args(pargs, eargs, pi + 1, ei + k, &mut trial) {
            *env = trial;
            return true;
        }
    }
    false
}

/// Record a binding, or verify an existing one agrees (back-reference
/// consistency).
fn bind_checked(env: &mut Bindings, name: &str, value: Expr) -> bool {
    match env.get(name) {
        Some(previous) => *previous == value,
        None => {
            env.insert(name.to_string(), value);
            true
        }
    }
}

/// Merge a successful alternative's fresh bindings into the outer
/// environment; variables already bound outside must agree.
fn merge_consistent(outer: &Bindings, inner: Bindings) -> Option<Bindings> {
    let mut merged = outer.clone();
    for (name, value) in inner {
        match merged.get(&name) {
            Some(previous) if *previous != value => return None,
            Some(_) => {}
            None => {
                merged.insert(name, value);
            }
        }
    }
    Some(merged)
}

/// Head-name constraint of a typed blank; the pseudo-type `Number`
/// covers every numeric variant.
fn constraint_matches(constraint: Option<&str>, subject: &Expr) -> bool {
    match constraint {
        None => true,
        Some(name) if name == symbols::NUMBER => subject.is_numeric(),
        Some(name) => subject.head_name() == Some(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{
        alternatives, blank, blank_null_sequence, blank_sequence, blank_typed, except, pattern,
    };

    fn int(v: i64) -> Expr {
        Expr::integer(v)
    }

    fn sym(name: &str) -> Expr {
        Expr::symbol(name)
    }

    fn f_of(args: Vec<Expr>) -> Expr {
        Expr::normal("f", args)
    }

    #[test]
    fn test_literal_match() {
        assert!(matches(&int(3), &int(3)));
        assert!(!matches(&int(3), &int(4)));
        assert!(matches(&sym("x"), &sym("x")));
        assert!(!matches(&sym("x"), &sym("y")));
    }

    #[test]
    fn test_blank_matches_anything() {
        assert!(matches(&blank(), &int(3)));
        assert!(matches(&blank(), &sym("x")));
        assert!(matches(&blank(), &f_of(vec![int(1)])));
    }

    #[test]
    fn test_typed_blank() {
        assert!(matches(&blank_typed("Integer"), &int(3)));
        assert!(!matches(&blank_typed("Integer"), &Expr::real(3.0)));
        assert!(matches(&blank_typed("Real"), &Expr::real(3.0)));
        assert!(matches(&blank_typed("Symbol"), &sym("x")));
        assert!(matches(&blank_typed("f"), &f_of(vec![int(1)])));
    }

    #[test]
    fn test_number_pseudo_type() {
        for subject in [
            int(1),
            Expr::rational(1, 2),
            Expr::real(0.5),
            Expr::Number(crate::number::Number::big_int(rug::Integer::from(7))),
        ] {
            assert!(matches(&blank_typed("Number"), &subject));
        }
        assert!(!matches(&blank_typed("Number"), &sym("x")));
        assert!(!matches(&blank_typed("Number"), &Expr::string("1")));
    }

    #[test]
    fn test_named_pattern_binds() {
        let p = pattern("x", blank_typed("Integer"));
        let env = match_expr(&p, &int(7)).unwrap();
        assert_eq!(env.get("x"), Some(&int(7)));
        assert!(match_expr(&p, &sym("a")).is_none());
    }

    #[test]
    fn test_back_reference_consistency() {
        let p = f_of(vec![pattern("x", blank()), pattern("x", blank())]);
        assert!(matches(&p, &f_of(vec![int(1), int(1)])));
        assert!(!matches(&p, &f_of(vec![int(1), int(2)])));
        // Numeric equality across widths counts as agreement.
        let widened = f_of(vec![
            int(3),
            Expr::Number(crate::number::Number::big_int(rug::Integer::from(3))),
        ]);
        assert!(matches(&p, &widened));
    }

    #[test]
    fn test_list_arity_must_agree() {
        let p = f_of(vec![blank(), blank()]);
        assert!(matches(&p, &f_of(vec![int(1), int(2)])));
        assert!(!matches(&p, &f_of(vec![int(1)])));
        assert!(!matches(&p, &f_of(vec![int(1), int(2), int(3)])));
    }

    #[test]
    fn test_head_is_matched_like_a_subexpression() {
        // _[x_, y_] matches any binary application.
        let p = Expr::list(blank(), vec![pattern("x", blank()), pattern("y", blank())]);
        let subject = Expr::normal("g", vec![int(1), int(2)]);
        let env = match_expr(&p, &subject).unwrap();
        assert_eq!(env.get("x"), Some(&int(1)));
        assert_eq!(env.get("y"), Some(&int(2)));
        // Head patterns can bind too.
        let p = Expr::list(pattern("h", blank()), vec![blank()]);
        let env = match_expr(&p, &Expr::normal("g", vec![int(1)])).unwrap();
        assert_eq!(env.get("h"), Some(&sym("g")));
    }

    #[test]
    fn test_sequence_blank_greedy() {
        let p = f_of(vec![pattern("xs", blank_sequence()), pattern("y", blank())]);
        let subject = f_of(vec![int(1), int(2), int(3)]);
        let env = match_expr(&p, &subject).unwrap();
        // Greedy: xs takes the widest window that still leaves y one.
        assert_eq!(env.get("xs"), Some(&Expr::list_of(vec![int(1), int(2)])));
        assert_eq!(env.get("y"), Some(&int(3)));
    }

    #[test]
    fn test_sequence_blank_requires_one() {
        let p = f_of(vec![pattern("xs", blank_sequence())]);
        assert!(match_expr(&p, &f_of(vec![])).is_none());
        let env = match_expr(&p, &f_of(vec![int(1)])).unwrap();
        assert_eq!(env.get("xs"), Some(&Expr::list_of(vec![int(1)])));
    }

    #[test]
    fn test_null_sequence_matches_empty() {
        let p = f_of(vec![pattern("xs", blank_null_sequence())]);
        let env = match_expr(&p, &f_of(vec![])).unwrap();
        assert_eq!(env.get("xs"), Some(&Expr::list_of(vec![])));
    }

    #[test]
    fn test_sequence_backtracks_for_literal_tail() {
        // xs__ must shrink so the literal 9 can match the last slot.
        let p = f_of(vec![pattern("xs", blank_sequence()), int(9)]);
        let subject = f_of(vec![int(1), int(9), int(9)]);
        let env = match_expr(&p, &subject).unwrap();
        assert_eq!(env.get("xs"), Some(&Expr::list_of(vec![int(1), int(9)])));
    }

    #[test]
    fn test_typed_sequence_window() {
        let p = f_of(vec![
            pattern("xs", Expr::normal(symbols::BLANK_SEQUENCE, vec![sym("Integer")])),
            pattern("rest", blank_null_sequence()),
        ]);
        let subject = f_of(vec![int(1), int(2), sym("a"), int(3)]);
        let env = match_expr(&p, &subject).unwrap();
        assert_eq!(env.get("xs"), Some(&Expr::list_of(vec![int(1), int(2)])));
        assert_eq!(
            env.get("rest"),
            Some(&Expr::list_of(vec![sym("a"), int(3)]))
        );
    }

    #[test]
    fn test_two_sequences_split_greedily() {
        let p = f_of(vec![
            pattern("xs", blank_null_sequence()),
            pattern("ys", blank_null_sequence()),
        ]);
        let subject = f_of(vec![int(1), int(2)]);
        let env = match_expr(&p, &subject).unwrap();
        assert_eq!(env.get("xs"), Some(&Expr::list_of(vec![int(1), int(2)])));
        assert_eq!(env.get("ys"), Some(&Expr::list_of(vec![])));
    }

    #[test]
    fn test_sequence_back_reference() {
        let p = f_of(vec![
            pattern("xs", blank_sequence()),
            pattern("xs", blank_sequence()),
        ]);
        assert!(matches(&p, &f_of(vec![int(1), int(2), int(1), int(2)])));
        assert!(!matches(&p, &f_of(vec![int(1), int(2), int(1), int(3)])));
    }

    #[test]
    fn test_alternatives() {
        let p = alternatives(vec![blank_typed("Integer"), blank_typed("Symbol")]);
        assert!(matches(&p, &int(1)));
        assert!(matches(&p, &sym("x")));
        assert!(!matches(&p, &Expr::string("s")));
    }

    #[test]
    fn test_alternatives_merge_respects_outer_bindings() {
        // f(x_, x_Integer | y_) : second slot's x must agree with first.
        let p = f_of(vec![
            pattern("x", blank()),
            alternatives(vec![
                pattern("x", blank_typed("Integer")),
                pattern("y", blank()),
            ]),
        ]);
        let env = match_expr(&p, &f_of(vec![int(1), int(1)])).unwrap();
        assert_eq!(env.get("x"), Some(&int(1)));
        assert!(env.get("y").is_none());
        // x disagrees, so the second branch must bind y instead.
        let env = match_expr(&p, &f_of(vec![int(1), int(2)])).unwrap();
        assert_eq!(env.get("y"), Some(&int(2)));
    }

    #[test]
    fn test_except() {
        let p = except(blank_typed("Integer"));
        assert!(!matches(&p, &int(1)));
        assert!(matches(&p, &sym("x")));
        // Named inner patterns bind nothing.
        let p = except(pattern("n", blank_typed("Integer")));
        let env = match_expr(&p, &sym("x")).unwrap();
        assert!(env.is_empty());
    }

    #[test]
    fn test_failed_match_leaves_no_bindings() {
        let p = f_of(vec![pattern("x", blank()), blank_typed("Integer")]);
        assert!(match_expr(&p, &f_of(vec![int(1), sym("a")])).is_none());
    }

    #[test]
    fn test_deterministic_binding_order() {
        let p = f_of(vec![
            pattern("b", blank()),
            pattern("a", blank()),
            pattern("c", blank()),
        ]);
        let env = match_expr(&p, &f_of(vec![int(1), int(2), int(3)])).unwrap();
        let names: Vec<&str> = env.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
