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

//! The numeric tower of the Lyra kernel
//!
//! Six variants: machine and arbitrary-precision integers, rationals and
//! floats. All arithmetic is total; machine overflow promotes upward
//! through the lattice
//!
//! ```text
//! Int -> BigInt -> Rat -> BigRat -> Real -> BigReal
//! ```
//!
//! and never demotes. Arbitrary-precision values come from the `rug`
//! backend (GMP/MPFR) and are shared by reference count.

use rug::float::Constant;
use rug::ops::Pow;
use rug::{Float, Integer, Rational};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::symbols;

/// Machine float precision in bits.
pub const MACHINE_PRECISION: u32 = 53;

/// Minimum precision of an arbitrary-precision float.
pub const MIN_BIG_PRECISION: u32 = 2;

/// Decimal literals shorter than this parse as machine floats.
const MACHINE_REAL_MAX_LEN: usize = 17;

/// A numeric atom.
///
/// Machine rationals keep `den > 0` and `gcd(num, den) == 1`. Big values
/// are immutable and shared; equality compares numeric value across
/// widths, so `Int(3)` equals `BigInt(3)`.
#[derive(Debug, Clone)]
pub enum Number {
    Int(i64),
    BigInt(Arc<Integer>),
    Rat { num: i64, den: i64 },
    BigRat(Arc<Rational>),
    Real(f64),
    BigReal(Arc<Float>),
}

impl Number {
    pub fn big_int(value: Integer) -> Self {
        Number::BigInt(Arc::new(value))
    }

    pub fn big_rat(value: Rational) -> Self {
        Number::BigRat(Arc::new(value))
    }

    pub fn big_real(value: Float) -> Self {
        Number::BigReal(Arc::new(value))
    }

    /// Construct a machine rational, normalizing sign and reducing by
    /// the gcd; promotes to `BigRat` when normalization overflows.
    ///
    /// Panics on a zero denominator (a programmer error, per the
    /// kernel's division-by-zero policy).
    pub fn rat(num: i64, den: i64) -> Self {
        assert!(den != 0, "rational with zero denominator");
        if num == 0 {
            return Number::Rat { num: 0, den: 1 };
        }
        // Sign lives on the numerator; negating i64::MIN overflows.
        if den < 0 {
            match (num.checked_neg(), den.checked_neg()) {
                (Some(n), Some(d)) => return Self::rat(n, d),
                _ => return Number::big_rat(Rational::from((num, den))),
            }
        }
        let g = gcd_u64(num.unsigned_abs(), den as u64) as i64;
        Number::Rat {
            num: num / g,
            den: den / g,
        }
    }

    /// Canonical head name of this variant.
    pub fn head_name(&self) -> &'static str {
        match self {
            Number::Int(_) | Number::BigInt(_) => symbols::INTEGER,
            Number::Rat { .. } | Number::BigRat(_) => symbols::RATIONAL,
            Number::Real(_) | Number::BigReal(_) => symbols::REAL,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Int(_) | Number::BigInt(_))
    }

    pub fn is_rational(&self) -> bool {
        matches!(self, Number::Rat { .. } | Number::BigRat(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Number::Real(_) | Number::BigReal(_))
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Int(v) => *v == 0,
            Number::BigInt(v) => v.cmp0() == Ordering::Equal,
            Number::Rat { num, .. } => *num == 0,
            Number::BigRat(v) => v.cmp0() == Ordering::Equal,
            Number::Real(v) => *v == 0.0,
            Number::BigReal(v) => v.is_zero(),
        }
    }

    /// True when this is the exact integer one (machine or big width).
    pub fn is_exact_one(&self) -> bool {
        match self {
            Number::Int(v) => *v == 1,
            Number::BigInt(v) => **v == 1,
            _ => false,
        }
    }

    /// Sign as -1, 0 or 1; total over every variant.
    pub fn sign(&self) -> i32 {
        match self {
            Number::Int(v) => v.signum() as i32,
            Number::BigInt(v) => match v.cmp0() {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            },
            Number::Rat { num, .. } => num.signum() as i32,
            Number::BigRat(v) => match v.cmp0() {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            },
            Number::Real(v) => {
                if *v == 0.0 || v.is_nan() {
                    0
                } else if *v < 0.0 {
                    -1
                } else {
                    1
                }
            }
            Number::BigReal(v) => match v.cmp0() {
                Some(Ordering::Less) => -1,
                Some(Ordering::Greater) => 1,
                _ => 0,
            },
        }
    }

    /// Precision in bits when this is a float variant.
    pub fn float_precision(&self) -> Option<u32> {
        match self {
            Number::Real(_) => Some(MACHINE_PRECISION),
            Number::BigReal(f) => Some(f.prec()),
            _ => None,
        }
    }

    /// Lossless conversion to a backend integer for exact integers.
    pub fn to_integer(&self) -> Option<Integer> {
        match self {
            Number::Int(v) => Some(Integer::from(*v)),
            Number::BigInt(v) => Some((**v).clone()),
            _ => None,
        }
    }

    /// Lossless conversion to a backend rational for exact variants.
    pub fn to_rational(&self) -> Option<Rational> {
        match self {
            Number::Int(v) => Some(Rational::from(*v)),
            Number::BigInt(v) => Some(Rational::from(&**v)),
            Number::Rat { num, den } => Some(Rational::from((*num, *den))),
            Number::BigRat(v) => Some((**v).clone()),
            _ => None,
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Number::Int(v) => *v as f64,
            Number::BigInt(v) => v.to_f64(),
            Number::Rat { num, den } => *num as f64 / *den as f64,
            Number::BigRat(v) => v.to_f64(),
            Number::Real(v) => *v,
            Number::BigReal(v) => v.to_f64(),
        }
    }

    /// Conversion to a backend float of the given precision.
    pub fn to_big_float(&self, prec: u32) -> Float {
        let prec = prec.max(MIN_BIG_PRECISION);
        match self {
            Number::Int(v) => Float::with_val(prec, *v),
            Number::BigInt(v) => Float::with_val(prec, &**v),
            Number::Rat { num, den } => Float::with_val(prec, Rational::from((*num, *den))),
            Number::BigRat(v) => Float::with_val(prec, &**v),
            Number::Real(v) => Float::with_val(prec, *v),
            Number::BigReal(v) => Float::with_val(prec, &**v),
        }
    }

    /// Re-round a float variant to `prec` bits; exact variants convert.
    pub fn with_precision(&self, prec: u32) -> Number {
        Number::big_real(self.to_big_float(prec))
    }

    /// Bit length of an exact integer (zero has bit length 0).
    pub fn bit_length(&self) -> Option<u32> {
        match self {
            Number::Int(v) => Some(64 - v.unsigned_abs().leading_zeros()),
            Number::BigInt(v) => Some(v.significant_bits()),
            _ => None,
        }
    }

    pub fn abs(&self) -> Number {
        if self.sign() >= 0 {
            self.clone()
        } else {
            self.neg()
        }
    }

    pub fn neg(&self) -> Number {
        match self {
            Number::Int(v) => match v.checked_neg() {
                Some(n) => Number::Int(n),
                None => Number::big_int(-Integer::from(*v)),
            },
            Number::BigInt(v) => Number::big_int(Integer::from(-&**v)),
            Number::Rat { num, den } => match num.checked_neg() {
                Some(n) => Number::Rat { num: n, den: *den },
                None => Number::big_rat(-Rational::from((*num, *den))),
            },
            Number::BigRat(v) => Number::big_rat(Rational::from(-&**v)),
            Number::Real(v) => Number::Real(-v),
            Number::BigReal(v) => Number::big_real(Float::with_val(v.prec(), -&**v)),
        }
    }

    /// Multiplicative inverse. Inverting an exact zero is a programmer
    /// error and panics; inverting a float zero yields infinity.
    pub fn invert(&self) -> Number {
        match self {
            Number::Int(v) => {
                assert!(*v != 0, "inverting integer zero");
                Number::rat(1, *v)
            }
            Number::BigInt(v) => {
                assert!(v.cmp0() != Ordering::Equal, "inverting integer zero");
                if **v == 1 || **v == -1 {
                    self.clone()
                } else {
                    Number::big_rat(Rational::from(&**v).recip())
                }
            }
            Number::Rat { num, den } => {
                assert!(*num != 0, "inverting rational zero");
                Number::rat(*den, *num)
            }
            Number::BigRat(v) => {
                assert!(v.cmp0() != Ordering::Equal, "inverting rational zero");
                Number::big_rat(Rational::from(&**v).recip())
            }
            Number::Real(v) => Number::Real(1.0 / v),
            Number::BigReal(v) => Number::big_real(Float::with_val(v.prec(), 1) / &**v),
        }
    }

    pub fn add(&self, other: &Number) -> Number {
        self.combine(other, ArithOp::Add)
    }

    pub fn mul(&self, other: &Number) -> Number {
        self.combine(other, ArithOp::Mul)
    }

    fn combine(&self, other: &Number, op: ArithOp) -> Number {
        // Any big float forces a big-float result at the widest float
        // precision among the operands.
        if matches!(self, Number::BigReal(_)) || matches!(other, Number::BigReal(_)) {
            let prec = self
                .float_precision()
                .into_iter()
                .chain(other.float_precision())
                .max()
                .unwrap_or(MACHINE_PRECISION);
            let a = self.to_big_float(prec);
            let b = other.to_big_float(prec);
            let result = match op {
                ArithOp::Add => a + b,
                ArithOp::Mul => a * b,
            };
            return Number::big_real(result);
        }
        if matches!(self, Number::Real(_)) || matches!(other, Number::Real(_)) {
            let (a, b) = (self.to_f64(), other.to_f64());
            return Number::Real(match op {
                ArithOp::Add => a + b,
                ArithOp::Mul => a * b,
            });
        }
        self.combine_exact(other, op)
    }

    fn combine_exact(&self, other: &Number, op: ArithOp) -> Number {
        use Number::*;
        match (self, other, op) {
            (Int(a), Int(b), ArithOp::Add) => match a.checked_add(*b) {
                Some(v) => Int(v),
                None => Number::big_int(Integer::from(*a) + *b),
            },
            (Int(a), Int(b), ArithOp::Mul) => match a.checked_mul(*b) {
                Some(v) => Int(v),
                None => Number::big_int(Integer::from(*a) * *b),
            },
            (Rat { num: a, den: b }, Rat { num: c, den: d }, ArithOp::Add) => {
                rat_add_machine(*a, *b, *c, *d)
            }
            (Rat { num: a, den: b }, Rat { num: c, den: d }, ArithOp::Mul) => {
                rat_mul_machine(*a, *b, *c, *d)
            }
            (Int(a), Rat { num, den }, _) | (Rat { num, den }, Int(a), _) => {
                int_rat_machine(*a, *num, *den, op)
            }
            // At least one big operand; the result class follows the
            // widest kind involved.
            _ => {
                if self.is_rational() || other.is_rational() {
                    let a = self.to_rational().expect("exact operand");
                    let b = other.to_rational().expect("exact operand");
                    Number::big_rat(match op {
                        ArithOp::Add => a + b,
                        ArithOp::Mul => a * b,
                    })
                } else {
                    let a = self.to_integer().expect("integer operand");
                    let b = other.to_integer().expect("integer operand");
                    Number::big_int(match op {
                        ArithOp::Add => a + b,
                        ArithOp::Mul => a * b,
                    })
                }
            }
        }
    }

    /// Total order over every pair of numeric variants. Exact pairs
    /// compare exactly; pairs involving a float compare at the widest
    /// float precision. NaN compares equal to keep the order total.
    pub fn cmp_value(&self, other: &Number) -> Ordering {
        use Number::*;
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Rat { num: a, den: b }, Rat { num: c, den: d }) => {
                (*a as i128 * *d as i128).cmp(&(*c as i128 * *b as i128))
            }
            (Int(a), Rat { num, den }) => (*a as i128 * *den as i128).cmp(&(*num as i128)),
            (Rat { num, den }, Int(b)) => (*num as i128).cmp(&(*b as i128 * *den as i128)),
            (Real(a), Real(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            _ => {
                if self.is_float() || other.is_float() {
                    let prec = self
                        .float_precision()
                        .into_iter()
                        .chain(other.float_precision())
                        .max()
                        .unwrap_or(MACHINE_PRECISION);
                    let a = self.to_big_float(prec);
                    let b = other.to_big_float(prec);
                    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
                } else {
                    let a = self.to_rational().expect("exact operand");
                    let b = other.to_rational().expect("exact operand");
                    a.cmp(&b)
                }
            }
        }
    }

    /// Integer exponentiation by squaring; any machine overflow promotes
    /// the whole computation to big integers. Exponent is non-negative.
    pub fn pow_integer(&self, exp: u32) -> Option<Number> {
        match self {
            Number::Int(v) => Some(pow_i64(*v, exp)),
            Number::BigInt(v) => Some(Number::big_int(Integer::from((&**v).pow(exp)))),
            _ => None,
        }
    }

    /// Quotient and remainder of two exact integers (truncated
    /// division). Panics on a zero divisor.
    pub fn div_rem(&self, other: &Number) -> Option<(Number, Number)> {
        if !self.is_integer() || !other.is_integer() {
            return None;
        }
        assert!(!other.is_zero(), "integer division by zero");
        if let (Number::Int(a), Number::Int(b)) = (self, other) {
            if let (Some(q), Some(r)) = (a.checked_div(*b), a.checked_rem(*b)) {
                return Some((Number::Int(q), Number::Int(r)));
            }
        }
        let a = self.to_integer().expect("integer operand");
        let b = other.to_integer().expect("integer operand");
        let (q, r) = a.div_rem(b);
        Some((Number::big_int(q), Number::big_int(r)))
    }

    /// Binomial coefficient of an exact integer.
    pub fn binomial(&self, k: u32) -> Option<Number> {
        let n = self.to_integer()?;
        let result = n.binomial(k);
        Some(match result.to_i64() {
            Some(v) if matches!(self, Number::Int(_)) => Number::Int(v),
            _ => Number::big_int(result),
        })
    }

    /// Greatest common divisor of two exact integers.
    pub fn gcd(&self, other: &Number) -> Option<Number> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => {
                let g = gcd_u64(a.unsigned_abs(), b.unsigned_abs());
                Some(match i64::try_from(g) {
                    Ok(v) => Number::Int(v),
                    Err(_) => Number::big_int(Integer::from(g)),
                })
            }
            _ => {
                let a = self.to_integer()?;
                let b = other.to_integer()?;
                Some(Number::big_int(a.gcd(&b)))
            }
        }
    }

    /// Elementary functions on floats; exact inputs compute at machine
    /// precision, matching the backend contract.
    pub fn sin(&self) -> Number {
        self.map_float(f64::sin, |f| f.sin())
    }

    pub fn cos(&self) -> Number {
        self.map_float(f64::cos, |f| f.cos())
    }

    pub fn tan(&self) -> Number {
        self.map_float(f64::tan, |f| f.tan())
    }

    pub fn exp(&self) -> Number {
        self.map_float(f64::exp, |f| f.exp())
    }

    pub fn sqrt(&self) -> Number {
        self.map_float(f64::sqrt, |f| f.sqrt())
    }

    pub fn pow_float(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::BigReal(_), _) | (_, Number::BigReal(_)) => {
                let prec = self
                    .float_precision()
                    .into_iter()
                    .chain(other.float_precision())
                    .max()
                    .unwrap_or(MACHINE_PRECISION);
                let base = self.to_big_float(prec);
                let exp = other.to_big_float(prec);
                Number::big_real(base.pow(exp))
            }
            _ => Number::Real(self.to_f64().powf(other.to_f64())),
        }
    }

    fn map_float(&self, machine: fn(f64) -> f64, big: fn(Float) -> Float) -> Number {
        match self {
            Number::BigReal(f) => Number::big_real(big((**f).clone())),
            _ => Number::Real(machine(self.to_f64())),
        }
    }

    /// The constant pi, at machine precision or at `prec` bits.
    pub fn pi(prec: Option<u32>) -> Number {
        match prec {
            None => Number::Real(std::f64::consts::PI),
            Some(p) => Number::big_real(Float::with_val(p.max(MIN_BIG_PRECISION), Constant::Pi)),
        }
    }

    /// Euler's number, at machine precision or at `prec` bits.
    pub fn e(prec: Option<u32>) -> Number {
        match prec {
            None => Number::Real(std::f64::consts::E),
            Some(p) => {
                let p = p.max(MIN_BIG_PRECISION);
                Number::big_real(Float::with_val(p, 1).exp())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithOp {
    Add,
    Mul,
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_value(other) == Ordering::Equal
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            Number::BigInt(v) => write!(f, "{}", v),
            Number::Rat { num, den } => write!(f, "{}/{}", num, den),
            Number::BigRat(v) => write!(f, "{}", v),
            Number::Real(v) => write!(f, "{:?}", v),
            Number::BigReal(v) => write!(f, "{:e}", **v),
        }
    }
}

/// a/b + c/d in machine width via the lcm of the denominators; any
/// overflow promotes the exact sum to a big rational.
fn rat_add_machine(a: i64, b: i64, c: i64, d: i64) -> Number {
    let machine = || -> Option<Number> {
        let l = lcm_i64(b, d)?;
        let x = a.checked_mul(l / b)?;
        let y = c.checked_mul(l / d)?;
        let n = x.checked_add(y)?;
        Some(Number::rat(n, l))
    };
    machine().unwrap_or_else(|| Number::big_rat(Rational::from((a, b)) + Rational::from((c, d))))
}

fn rat_mul_machine(a: i64, b: i64, c: i64, d: i64) -> Number {
    let machine = || -> Option<Number> {
        let n = a.checked_mul(c)?;
        let m = b.checked_mul(d)?;
        Some(Number::rat(n, m))
    };
    machine().unwrap_or_else(|| Number::big_rat(Rational::from((a, b)) * Rational::from((c, d))))
}

fn int_rat_machine(a: i64, num: i64, den: i64, op: ArithOp) -> Number {
    let machine = || -> Option<Number> {
        match op {
            // a + num/den = (a*den + num) / den
            ArithOp::Add => {
                let n = a.checked_mul(den)?.checked_add(num)?;
                Some(Number::rat(n, den))
            }
            ArithOp::Mul => {
                let n = a.checked_mul(num)?;
                Some(Number::rat(n, den))
            }
        }
    };
    machine().unwrap_or_else(|| {
        let big = Rational::from((num, den));
        Number::big_rat(match op {
            ArithOp::Add => big + Rational::from(a),
            ArithOp::Mul => big * Rational::from(a),
        })
    })
}

/// Greatest common divisor; `gcd(0, 0) == 0`.
pub fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Least common multiple with overflow detection; both operands must be
/// non-zero.
pub fn lcm_i64(a: i64, b: i64) -> Option<i64> {
    if a == 0 || b == 0 {
        return None;
    }
    let g = gcd_u64(a.unsigned_abs(), b.unsigned_abs());
    let l = (a.unsigned_abs() / g).checked_mul(b.unsigned_abs())?;
    i64::try_from(l).ok()
}

/// Machine exponentiation by squaring; the whole computation moves to
/// big integers the moment any intermediate overflows.
pub fn pow_i64(base: i64, exp: u32) -> Number {
    let mut result: i64 = 1;
    let mut acc = base;
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            match result.checked_mul(acc) {
                Some(v) => result = v,
                None => return Number::big_int(Integer::from(base).pow(exp)),
            }
        }
        e >>= 1;
        if e > 0 {
            match acc.checked_mul(acc) {
                Some(v) => acc = v,
                None => return Number::big_int(Integer::from(base).pow(exp)),
            }
        }
    }
    Number::Int(result)
}

/// Parse an integer literal: optional sign, `0x`/`0o`/`0b` radix
/// prefixes, and `_` digit separators (not leading, trailing or
/// doubled). Values outside machine range become big integers.
pub fn parse_integer(text: &str) -> Result<Number, String> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (radix, digits) = if let Some(rest) = body.strip_prefix("0x").or(body.strip_prefix("0X")) {
        (16, rest)
    } else if let Some(rest) = body.strip_prefix("0o").or(body.strip_prefix("0O")) {
        (8, rest)
    } else if let Some(rest) = body.strip_prefix("0b").or(body.strip_prefix("0B")) {
        (2, rest)
    } else {
        (10, body)
    };
    let cleaned = strip_separators(digits)?;
    if cleaned.is_empty() {
        return Err("no digits".to_string());
    }
    let value = Integer::from_str_radix(&cleaned, radix).map_err(|e| e.to_string())?;
    let value = if negative { -value } else { value };
    Ok(match value.to_i64() {
        Some(v) => Number::Int(v),
        None => Number::big_int(value),
    })
}

/// Parse a real literal. Short literals become machine floats; longer
/// ones become big floats whose precision is derived from the digit
/// count as `ceil(digits * log2(10))` bits.
pub fn parse_real(text: &str) -> Result<Number, String> {
    let cleaned = strip_separators(text)?;
    if text.len() < MACHINE_REAL_MAX_LEN {
        return cleaned
            .parse::<f64>()
            .map(Number::Real)
            .map_err(|e| e.to_string());
    }
    let mantissa = cleaned
        .split(['e', 'E'])
        .next()
        .unwrap_or(cleaned.as_str());
    let digits = mantissa.chars().filter(|c| c.is_ascii_digit()).count().max(1);
    let prec = ((digits as f64) * std::f64::consts::LOG2_10).ceil() as u32;
    let prec = prec.max(MIN_BIG_PRECISION);
    let parsed = Float::parse(&cleaned).map_err(|e| e.to_string())?;
    Ok(Number::big_real(Float::with_val(prec, parsed)))
}

/// Remove `_` digit separators, rejecting leading, trailing or doubled
/// underscores.
fn strip_separators(text: &str) -> Result<String, String> {
    if !text.contains('_') {
        return Ok(text.to_string());
    }
    if text.starts_with('_') || text.ends_with('_') || text.contains("__") {
        return Err("misplaced digit separator".to_string());
    }
    Ok(text.chars().filter(|c| *c != '_').collect())
}
