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

//! Lyra Kernel Library
//!
//! The kernel of the Lyra symbolic computation language: the expression
//! model and numeric tower, the arithmetic reducers for `Plus` and
//! `Times`, the pattern matcher and substituter, and the surface parser
//! that turns infix source into canonical symbolic forms.

pub mod error;
pub mod expr;
pub mod lexer;
pub mod matcher;
pub mod number;
pub mod parser;
pub mod pattern;
pub mod reduce;
pub mod subst;
pub mod symbols;

pub use error::KernelError;
pub use expr::Expr;
pub use matcher::{match_expr, Bindings};
pub use number::Number;
pub use reduce::{plus_list, times_list};
pub use subst::substitute;

use crate::lexer::Lexer;
use crate::parser::Parser;

/// Lex and parse one source string into an expression.
pub fn parse_source(source: &str, file_name: &str) -> Result<Expr, KernelError> {
    let mut lexer = Lexer::new(source, file_name.to_string());
    let tokens = lexer.tokenize()?;
    let expr = Parser::new(tokens).parse()?;
    Ok(expr)
}

/// Parse and run one bottom-up arithmetic reduction pass.
pub fn parse_and_reduce(source: &str, file_name: &str) -> Result<Expr, KernelError> {
    let expr = parse_source(source, file_name)?;
    Ok(reduce::eval_arithmetic(&expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_facade() {
        let expr = parse_source("1 + 2", "test.ly").unwrap();
        assert_eq!(
            expr,
            Expr::normal("Plus", vec![Expr::integer(1), Expr::integer(2)])
        );
    }

    #[test]
    fn test_parse_and_reduce_facade() {
        let expr = parse_and_reduce("1 + 2*3", "test.ly").unwrap();
        assert_eq!(expr, Expr::integer(7));
    }

    #[test]
    fn test_facade_surfaces_lex_errors() {
        assert!(matches!(
            parse_source("a ? b", "test.ly"),
            Err(KernelError::Lexer(_))
        ));
    }

    #[test]
    fn test_facade_surfaces_parse_errors() {
        assert!(matches!(
            parse_source("f(", "test.ly"),
            Err(KernelError::Parse(_))
        ));
    }
}
