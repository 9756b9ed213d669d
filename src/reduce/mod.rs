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

//! Arithmetic reducers for `Plus` and `Times`
//!
//! Each reducer folds a heterogeneous argument list into a canonical
//! result: numeric arguments accumulate per-variant (machine and big
//! running totals, promoting on overflow), non-numeric arguments pass
//! through in their original order. The accumulators are the only
//! mutable state in the kernel and never escape a reducer call.

use rug::{Float, Integer, Rational};

use crate::expr::Expr;
use crate::number::Number;
use crate::symbols;

/// Fold an argument list under `Plus`. Numeric arguments collapse into
/// a single total through the promotion lattice; a zero total is
/// dropped when symbolic arguments remain; a single surviving element
/// is unwrapped (OneIdentity); the empty sum is the integer `0`.
pub fn plus_list(args: &[Expr]) -> Expr {
    reduce_list(args, FoldOp::Plus)
}

/// Fold an argument list under `Times`. A numerically zero total
/// annihilates the whole product to the integer `0`; an exact-one total
/// is dropped when other elements remain; the empty product is the
/// integer `1`.
pub fn times_list(args: &[Expr]) -> Expr {
    reduce_list(args, FoldOp::Times)
}

/// One bottom-up pass rewriting every `Plus`/`Times`-headed list
/// through the reducers. Not a general evaluator; heads other than
/// `Plus` and `Times` are rebuilt unchanged.
pub fn eval_arithmetic(expr: &Expr) -> Expr {
    match expr {
        Expr::List(list) => {
            let head = eval_arithmetic(&list.head);
            let args: Vec<Expr> = list.args.iter().map(eval_arithmetic).collect();
            match head.as_symbol() {
                Some(name) if name == symbols::PLUS => plus_list(&args),
                Some(name) if name == symbols::TIMES => times_list(&args),
                _ => Expr::list(head, args),
            }
        }
        _ => expr.clone(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FoldOp {
    Plus,
    Times,
}

impl FoldOp {
    fn head(self) -> &'static str {
        match self {
            FoldOp::Plus => symbols::PLUS,
            FoldOp::Times => symbols::TIMES,
        }
    }

    fn int_identity(self) -> i64 {
        match self {
            FoldOp::Plus => 0,
            FoldOp::Times => 1,
        }
    }

    fn float_identity(self) -> f64 {
        match self {
            FoldOp::Plus => 0.0,
            FoldOp::Times => 1.0,
        }
    }

    fn fold(self, acc: &Number, value: &Number) -> Number {
        match self {
            FoldOp::Plus => acc.add(value),
            FoldOp::Times => acc.mul(value),
        }
    }
}

fn reduce_list(args: &[Expr], op: FoldOp) -> Expr {
    // Error arguments poison the whole reduction.
    if let Some(err) = args.iter().find(|a| a.is_error()) {
        return err.clone();
    }

    let mut acc = Accumulator::new(op);
    let mut symbolic: Vec<Expr> = Vec::new();
    for arg in args {
        match arg {
            Expr::Number(n) => acc.ingest(n),
            other => symbolic.push(other.clone()),
        }
    }
    let total = acc.total();

    match op {
        FoldOp::Plus => {
            let mut elements = Vec::with_capacity(symbolic.len() + 1);
            if let Some(total) = total {
                if !(total.is_zero() && !symbolic.is_empty()) {
                    elements.push(Expr::Number(total));
                }
            }
            elements.extend(symbolic);
            finalize(elements, op, Expr::integer(0))
        }
        FoldOp::Times => {
            if let Some(total) = &total {
                if total.is_zero() {
                    return Expr::integer(0);
                }
            }
            let mut elements = Vec::with_capacity(symbolic.len() + 1);
            if let Some(total) = total {
                if !(total.is_exact_one() && !symbolic.is_empty()) {
                    elements.push(Expr::Number(total));
                }
            }
            elements.extend(symbolic);
            finalize(elements, op, Expr::integer(1))
        }
    }
}

fn finalize(mut elements: Vec<Expr>, op: FoldOp, empty: Expr) -> Expr {
    match elements.len() {
        0 => empty,
        1 => elements.pop().expect("single element"),
        _ => Expr::normal(op.head(), elements),
    }
}

/// Per-variant numeric accumulators. Each class tracks a machine-width
/// running total and promotes to its big-width sibling on overflow;
/// classes combine only in the final collapse.
struct Accumulator {
    op: FoldOp,
    int: IntAcc,
    rat: RatAcc,
    float: FloatAcc,
    big_float: BigFloatAcc,
}

impl Accumulator {
    fn new(op: FoldOp) -> Self {
        Self {
            op,
            int: IntAcc::new(op),
            rat: RatAcc::new(op),
            float: FloatAcc::new(op),
            big_float: BigFloatAcc::new(op),
        }
    }

    fn ingest(&mut self, value: &Number) {
        match value {
            Number::Int(_) | Number::BigInt(_) => self.int.ingest(value),
            Number::Rat { .. } | Number::BigRat(_) => self.rat.ingest(value),
            Number::Real(v) => self.float.ingest(*v),
            Number::BigReal(f) => self.big_float.ingest(f),
        }
    }

    /// Collapse the four classes into one total, if any argument was
    /// numeric at all.
    fn total(self) -> Option<Number> {
        let op = self.op;
        let int = self.int.total();
        let rat = self.rat.total();
        let float = self.float.total();
        let big_float = self.big_float.total();

        if big_float.is_some() || float.is_some() {
            // Floats are contagious: every exact contribution converts
            // into the float domain. A big float anywhere keeps the
            // total big.
            if let Some(big) = big_float {
                let mut total = Number::big_real(big);
                for part in [float.map(Number::Real), int, rat].into_iter().flatten() {
                    total = op.fold(&total, &part);
                }
                return Some(total);
            }
            let mut total = Number::Real(float.expect("machine float total"));
            for part in [int, rat].into_iter().flatten() {
                total = op.fold(&total, &part);
            }
            return Some(total);
        }

        match (int, rat) {
            (Some(int), Some(rat)) => Some(normalize_exact(op.fold(&rat, &int))),
            (Some(int), None) => Some(int),
            (None, Some(rat)) => Some(normalize_exact(rat)),
            (None, None) => None,
        }
    }
}

/// A rational total with denominator one collapses to the integer form
/// of the same width.
fn normalize_exact(value: Number) -> Number {
    match &value {
        Number::Rat { num, den } if *den == 1 => Number::Int(*num),
        Number::BigRat(r) if *r.denom() == 1 => Number::big_int(r.numer().clone()),
        _ => value,
    }
}

struct IntAcc {
    op: FoldOp,
    small: i64,
    big: Option<Integer>,
    seen: bool,
}

impl IntAcc {
    fn new(op: FoldOp) -> Self {
        Self {
            op,
            small: op.int_identity(),
            big: None,
            seen: false,
        }
    }

    fn ingest(&mut self, value: &Number) {
        self.seen = true;
        match value {
            Number::Int(v) => {
                if let Some(big) = &mut self.big {
                    match self.op {
                        FoldOp::Plus => *big += *v,
                        FoldOp::Times => *big *= *v,
                    }
                    return;
                }
                let combined = match self.op {
                    FoldOp::Plus => self.small.checked_add(*v),
                    FoldOp::Times => self.small.checked_mul(*v),
                };
                match combined {
                    Some(total) => self.small = total,
                    None => {
                        let mut big = Integer::from(self.small);
                        match self.op {
                            FoldOp::Plus => big += *v,
                            FoldOp::Times => big *= *v,
                        }
                        self.big = Some(big);
                    }
                }
            }
            Number::BigInt(v) => {
                let mut big = self
                    .big
                    .take()
                    .unwrap_or_else(|| Integer::from(self.small));
                match self.op {
                    FoldOp::Plus => big += &**v,
                    FoldOp::Times => big *= &**v,
                }
                self.big = Some(big);
            }
            _ => unreachable!("integer accumulator fed a non-integer"),
        }
    }

    fn total(self) -> Option<Number> {
        if !self.seen {
            return None;
        }
        Some(match self.big {
            Some(big) => Number::big_int(big),
            None => Number::Int(self.small),
        })
    }
}

struct RatAcc {
    op: FoldOp,
    small: Number,
    big: Option<Rational>,
    seen: bool,
}

impl RatAcc {
    fn new(op: FoldOp) -> Self {
        Self {
            op,
            small: Number::Rat {
                num: op.int_identity(),
                den: 1,
            },
            big: None,
            seen: false,
        }
    }

    fn ingest(&mut self, value: &Number) {
        self.seen = true;
        if let Some(big) = &mut self.big {
            let rhs = value.to_rational().expect("rational accumulator input");
            match self.op {
                FoldOp::Plus => *big += rhs,
                FoldOp::Times => *big *= rhs,
            }
            return;
        }
        match value {
            Number::Rat { .. } => {
                // Machine fold; Number's own arithmetic promotes on
                // overflow, which we detect by the result width.
                match self.op.fold(&self.small, value) {
                    Number::Rat { num, den } => {
                        self.small = Number::Rat { num, den };
                    }
                    Number::Int(v) => {
                        self.small = Number::Rat { num: v, den: 1 };
                    }
                    promoted => {
                        self.big = promoted.to_rational();
                    }
                }
            }
            Number::BigRat(v) => {
                let mut big = self
                    .small
                    .to_rational()
                    .expect("machine rational total");
                match self.op {
                    FoldOp::Plus => big += &**v,
                    FoldOp::Times => big *= &**v,
                }
                self.big = Some(big);
            }
            _ => unreachable!("rational accumulator fed a non-rational"),
        }
    }

    fn total(self) -> Option<Number> {
        if !self.seen {
            return None;
        }
        Some(match self.big {
            Some(big) => Number::big_rat(big),
            None => self.small,
        })
    }
}

struct FloatAcc {
    op: FoldOp,
    value: f64,
    seen: bool,
}

impl FloatAcc {
    fn new(op: FoldOp) -> Self {
        Self {
            op,
            value: op.float_identity(),
            seen: false,
        }
    }

    fn ingest(&mut self, value: f64) {
        self.seen = true;
        match self.op {
            FoldOp::Plus => self.value += value,
            FoldOp::Times => self.value *= value,
        }
    }

    fn total(self) -> Option<f64> {
        self.seen.then_some(self.value)
    }
}

struct BigFloatAcc {
    op: FoldOp,
    value: Option<Float>,
}

impl BigFloatAcc {
    fn new(op: FoldOp) -> Self {
        Self { op, value: None }
    }

    fn ingest(&mut self, value: &Float) {
        match self.value.take() {
            None => self.value = Some(value.clone()),
            Some(acc) => {
                let prec = acc.prec().max(value.prec());
                let mut acc = Float::with_val(prec, acc);
                match self.op {
                    FoldOp::Plus => acc += value,
                    FoldOp::Times => acc *= value,
                }
                self.value = Some(acc);
            }
        }
    }

    fn total(self) -> Option<Float> {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::Number;
    use rug::Integer;

    fn int(v: i64) -> Expr {
        Expr::integer(v)
    }

    fn sym(name: &str) -> Expr {
        Expr::symbol(name)
    }

    #[test]
    fn test_plus_mixed_int_float() {
        let result = plus_list(&[int(1), int(2), Expr::real(0.5)]);
        assert_eq!(result, Expr::real(3.5));
    }

    #[test]
    fn test_plus_overflow_promotes() {
        let result = plus_list(&[int(i64::MAX), int(1)]);
        let expected = Expr::Number(Number::big_int(Integer::from(i64::MAX) + 1));
        assert_eq!(result, expected);
    }

    #[test]
    fn test_times_rationals_with_symbol() {
        let result = times_list(&[
            Expr::rational(1, 2),
            Expr::rational(2, 3),
            sym("x"),
        ]);
        let expected = Expr::normal("Times", vec![Expr::rational(1, 3), sym("x")]);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_plus_zero_identity() {
        assert_eq!(plus_list(&[int(0), sym("x")]), sym("x"));
        assert_eq!(plus_list(&[]), int(0));
        assert_eq!(plus_list(&[int(7)]), int(7));
    }

    #[test]
    fn test_plus_zero_total_kept_when_no_symbols() {
        assert_eq!(plus_list(&[int(3), int(-3)]), int(0));
    }

    #[test]
    fn test_times_identities() {
        assert_eq!(times_list(&[int(1), sym("x")]), sym("x"));
        assert_eq!(times_list(&[]), int(1));
        assert_eq!(times_list(&[int(1)]), int(1));
        assert_eq!(
            times_list(&[int(0), sym("x"), sym("y")]),
            int(0)
        );
    }

    #[test]
    fn test_symbolic_order_preserved() {
        let result = plus_list(&[sym("b"), int(1), sym("a"), int(2)]);
        let expected = Expr::normal("Plus", vec![int(3), sym("b"), sym("a")]);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_int_and_rat_combine_to_rational() {
        let result = plus_list(&[int(1), Expr::rational(1, 2)]);
        assert_eq!(result, Expr::rational(3, 2));
    }

    #[test]
    fn test_rat_total_with_unit_denominator_is_integer() {
        let result = plus_list(&[Expr::rational(1, 2), Expr::rational(1, 2)]);
        assert_eq!(result, int(1));
        assert!(matches!(
            result,
            Expr::Number(Number::Int(1))
        ));
    }

    #[test]
    fn test_big_float_contagion() {
        let big = Expr::Number(Number::big_real(rug::Float::with_val(100, 2)));
        let result = plus_list(&[big, int(1), Expr::real(0.5)]);
        match result {
            Expr::Number(Number::BigReal(f)) => {
                assert!((f.to_f64() - 3.5).abs() < 1e-12);
            }
            other => panic!("expected BigReal total, got {:?}", other),
        }
    }

    #[test]
    fn test_promotion_monotonicity() {
        let args_machine = [int(5), Expr::rational(1, 3), sym("x")];
        let args_widened = [
            Expr::Number(Number::big_int(Integer::from(5))),
            Expr::rational(1, 3),
            sym("x"),
        ];
        assert_eq!(plus_list(&args_machine), plus_list(&args_widened));
    }

    #[test]
    fn test_error_propagation() {
        let err = Expr::error("PartError", "boom", vec![]);
        let result = plus_list(&[int(1), err.clone(), sym("x")]);
        assert_eq!(result, err);
    }

    #[test]
    fn test_eval_arithmetic_recurses() {
        // Plus(1, Times(2, 3)) -> 7
        let expr = Expr::normal(
            "Plus",
            vec![int(1), Expr::normal("Times", vec![int(2), int(3)])],
        );
        assert_eq!(eval_arithmetic(&expr), int(7));
        // Unknown heads rebuild unchanged.
        let f = Expr::normal("f", vec![Expr::normal("Plus", vec![int(1), int(1)])]);
        assert_eq!(eval_arithmetic(&f), Expr::normal("f", vec![int(2)]));
    }
}
