//! Canonical head names of the Lyra kernel
//!
//! Every head the kernel constructs or recognizes is exported here as a
//! string constant so embedders compare against one source of truth.

/// Head of machine and big integers.
pub const INTEGER: &str = "Integer";
/// Head of machine and big rationals.
pub const RATIONAL: &str = "Rational";
/// Head of machine and big floats.
pub const REAL: &str = "Real";
pub const STRING: &str = "String";
pub const SYMBOL: &str = "Symbol";
pub const LIST: &str = "List";
pub const ASSOCIATION: &str = "Association";
pub const BYTE_ARRAY: &str = "ByteArray";

pub const PLUS: &str = "Plus";
pub const TIMES: &str = "Times";
pub const SUBTRACT: &str = "Subtract";
pub const DIVIDE: &str = "Divide";
pub const MINUS: &str = "Minus";
pub const POWER: &str = "Power";

pub const PART: &str = "Part";
pub const TAKE: &str = "Take";
pub const PART_SET: &str = "PartSet";
pub const SLICE_SET: &str = "SliceSet";

pub const SET: &str = "Set";
pub const SET_DELAYED: &str = "SetDelayed";
pub const UNSET: &str = "Unset";
pub const RULE: &str = "Rule";
pub const RULE_DELAYED: &str = "RuleDelayed";

pub const AND: &str = "And";
pub const OR: &str = "Or";
pub const NOT: &str = "Not";
pub const EQUAL: &str = "Equal";
pub const UNEQUAL: &str = "Unequal";
pub const SAME_Q: &str = "SameQ";
pub const UNSAME_Q: &str = "UnsameQ";
pub const LESS: &str = "Less";
pub const GREATER: &str = "Greater";
pub const LESS_EQUAL: &str = "LessEqual";
pub const GREATER_EQUAL: &str = "GreaterEqual";

pub const COMPOUND_EXPRESSION: &str = "CompoundExpression";

pub const PATTERN: &str = "Pattern";
pub const BLANK: &str = "Blank";
pub const BLANK_SEQUENCE: &str = "BlankSequence";
pub const BLANK_NULL_SEQUENCE: &str = "BlankNullSequence";
pub const ALTERNATIVES: &str = "Alternatives";
pub const EXCEPT: &str = "Except";

pub const FUNCTION: &str = "Function";
pub const NULL: &str = "Null";

/// Pseudo-type accepted by typed blanks; matches any numeric atom.
pub const NUMBER: &str = "Number";

/// Head of materialized error expressions (tag + message + arguments).
pub const ERROR: &str = "Error";

/// Every canonical head, in a stable order, for embedders that populate
/// a symbol registry up front.
pub const ALL_HEADS: &[&str] = &[
    INTEGER,
    RATIONAL,
    REAL,
    STRING,
    SYMBOL,
    LIST,
    ASSOCIATION,
    BYTE_ARRAY,
    PLUS,
    TIMES,
    SUBTRACT,
    DIVIDE,
    MINUS,
    POWER,
    PART,
    TAKE,
    PART_SET,
    SLICE_SET,
    SET,
    SET_DELAYED,
    UNSET,
    RULE,
    RULE_DELAYED,
    AND,
    OR,
    NOT,
    EQUAL,
    UNEQUAL,
    SAME_Q,
    UNSAME_Q,
    LESS,
    GREATER,
    LESS_EQUAL,
    GREATER_EQUAL,
    COMPOUND_EXPRESSION,
    PATTERN,
    BLANK,
    BLANK_SEQUENCE,
    BLANK_NULL_SEQUENCE,
    ALTERNATIVES,
    EXCEPT,
    FUNCTION,
    NULL,
];

/// Type names that count as builtin for pattern specificity scoring.
pub const BUILTIN_TYPES: &[&str] = &[
    INTEGER,
    REAL,
    NUMBER,
    STRING,
    SYMBOL,
    LIST,
    ASSOCIATION,
    BYTE_ARRAY,
    RULE,
];

/// Whether `name` is one of the builtin type names a typed blank may
/// reference with elevated specificity.
pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}
