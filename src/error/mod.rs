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

//! Error handling for the Lyra kernel
//!
//! Source locations, per-stage error types, and the multi-error
//! diagnostics container the parser accumulates into.

use std::fmt;
use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(file: String, line: usize, column: usize, offset: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset,
        }
    }

    pub fn unknown() -> Self {
        Self {
            file: "<unknown>".to_string(),
            line: 0,
            column: 0,
            offset: 0,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Lexical analysis errors
#[derive(Error, Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum LexerError {
    #[error("Unexpected character '{character}' at {location}")]
    UnexpectedCharacter {
        character: char,
        location: SourceLocation,
    },

    #[error("Unterminated string literal at {location}")]
    UnterminatedString { location: SourceLocation },

    #[error("Invalid escape sequence '\\{sequence}' at {location}")]
    InvalidEscapeSequence {
        sequence: String,
        location: SourceLocation,
    },

    #[error("Invalid number literal '{value}' at {location}")]
    InvalidNumber {
        value: String,
        location: SourceLocation,
    },
}

/// Parsing errors
#[derive(Error, Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ParserError {
    #[error("Unexpected token {found}, expected {expected} at {location}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    #[error("Unexpected end of input at {location}")]
    UnexpectedEof { location: SourceLocation },

    #[error("Unmatched '{delimiter}' at {location}")]
    UnmatchedDelimiter {
        delimiter: char,
        location: SourceLocation,
    },

    #[error("Empty index brackets at {location}")]
    EmptyIndex { location: SourceLocation },

    #[error("Invalid number literal '{value}' at {location}: {message}")]
    InvalidLiteral {
        value: String,
        message: String,
        location: SourceLocation,
    },

    #[error("Trailing input after expression at {location}")]
    TrailingInput { location: SourceLocation },
}

/// Every parse error found in one source, collected before failing once.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostics {
    pub errors: Vec<ParserError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: ParserError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

/// Top-level kernel error
#[derive(Error, Debug)]
pub enum KernelError {
    #[error("Lexer error: {0}")]
    Lexer(#[from] LexerError),

    #[error("parse failed with {count} error(s):\n{list}", count = .0.len(), list = .0)]
    Parse(#[from] Diagnostics),
}

/// Tags carried by materialized error expressions (part access and
/// byte contexts). These never unwind; see `crate::expr`.
pub mod tags {
    pub const PART_ERROR: &str = "PartError";
    pub const TYPE_ERROR: &str = "TypeError";
    pub const VALUE_ERROR: &str = "ValueError";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = SourceLocation::new("input.ly".to_string(), 3, 14, 42);
        assert_eq!(format!("{}", loc), "input.ly:3:14");
    }

    #[test]
    fn test_diagnostics_collects_multiple() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());
        diags.push(ParserError::UnexpectedEof {
            location: SourceLocation::unknown(),
        });
        diags.push(ParserError::EmptyIndex {
            location: SourceLocation::unknown(),
        });
        assert_eq!(diags.len(), 2);
        let rendered = format!("{}", diags);
        assert!(rendered.contains("Unexpected end of input"));
        assert!(rendered.contains("Empty index brackets"));
    }

    #[test]
    fn test_kernel_error_from_diagnostics() {
        let mut diags = Diagnostics::new();
        diags.push(ParserError::UnexpectedEof {
            location: SourceLocation::unknown(),
        });
        let err: KernelError = diags.into();
        let rendered = format!("{}", err);
        assert!(rendered.contains("1 error(s)"));
        assert!(rendered.contains("Unexpected end of input"));
    }
}
