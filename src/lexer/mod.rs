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

//! Lexical analysis for Lyra source text
//!
//! Tokenizes infix source into the token stream the parser consumes.
//! Number literals stay as raw text; the parser converts them through
//! the numeric tower so oversized integers survive.

use crate::error::{LexerError, SourceLocation};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Token types of the Lyra surface grammar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenType {
    // Literals and names; number literals carry their raw text
    Symbol(String),
    Integer(String),
    Float(String),
    Str(String),
    /// One, two or three underscores.
    Underscore(u8),

    // Structural tokens
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,

    // Operators
    Plus,
    Minus,
    Multiply,
    Divide,
    Caret,
    Set,
    SetDelayed,
    Unset,
    Colon,
    RuleDelayed,
    Equal,
    Unequal,
    SameQ,
    UnsameQ,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    And,
    Or,
    Not,
    Ampersand,

    // End of file
    Eof,
}

impl TokenType {
    /// Short name used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenType::Symbol(name) => format!("symbol '{}'", name),
            TokenType::Integer(text) | TokenType::Float(text) => format!("number '{}'", text),
            TokenType::Str(_) => "string".to_string(),
            TokenType::Underscore(n) => "_".repeat(*n as usize),
            TokenType::LeftParen => "'('".to_string(),
            TokenType::RightParen => "')'".to_string(),
            TokenType::LeftBracket => "'['".to_string(),
            TokenType::RightBracket => "']'".to_string(),
            TokenType::LeftBrace => "'{'".to_string(),
            TokenType::RightBrace => "'}'".to_string(),
            TokenType::Comma => "','".to_string(),
            TokenType::Semicolon => "';'".to_string(),
            TokenType::Plus => "'+'".to_string(),
            TokenType::Minus => "'-'".to_string(),
            TokenType::Multiply => "'*'".to_string(),
            TokenType::Divide => "'/'".to_string(),
            TokenType::Caret => "'^'".to_string(),
            TokenType::Set => "'='".to_string(),
            TokenType::SetDelayed => "':='".to_string(),
            TokenType::Unset => "'=.'".to_string(),
            TokenType::Colon => "':'".to_string(),
            TokenType::RuleDelayed => "':>'".to_string(),
            TokenType::Equal => "'=='".to_string(),
            TokenType::Unequal => "'!='".to_string(),
            TokenType::SameQ => "'==='".to_string(),
            TokenType::UnsameQ => "'=!='".to_string(),
            TokenType::Less => "'<'".to_string(),
            TokenType::Greater => "'>'".to_string(),
            TokenType::LessEqual => "'<='".to_string(),
            TokenType::GreaterEqual => "'>='".to_string(),
            TokenType::And => "'&&'".to_string(),
            TokenType::Or => "'||'".to_string(),
            TokenType::Not => "'!'".to_string(),
            TokenType::Ampersand => "'&'".to_string(),
            TokenType::Eof => "end of input".to_string(),
        }
    }
}

/// A token with its type and location information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub token_type: TokenType,
    pub location: SourceLocation,
    pub lexeme: String,
}

impl Token {
    pub fn new(token_type: TokenType, location: SourceLocation, lexeme: String) -> Self {
        Self {
            token_type,
            location,
            lexeme,
        }
    }
}

/// Lexer for Lyra source text
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
    line: usize,
    column: usize,
    file_name: String,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str, file_name: String) -> Self {
        let chars: Vec<char> = input.graphemes(true).flat_map(|g| g.chars()).collect();
        let current_char = chars.first().copied();

        Self {
            input: chars,
            position: 0,
            current_char,
            line: 1,
            column: 1,
            file_name,
        }
    }

    /// Tokenize the entire input, ending with an Eof token.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.token_type == TokenType::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();

        let location = self.location();
        let c = match self.current_char {
            None => return Ok(Token::new(TokenType::Eof, location, String::new())),
            Some(c) => c,
        };

        if c.is_ascii_digit() {
            return self.read_number(location);
        }
        if c.is_alphabetic() {
            return Ok(self.read_symbol(location));
        }
        match c {
            '_' => Ok(self.read_underscores(location)),
            '"' => self.read_string(location),
            '(' => Ok(self.single(TokenType::LeftParen, location)),
            ')' => Ok(self.single(TokenType::RightParen, location)),
            '[' => Ok(self.single(TokenType::LeftBracket, location)),
            ']' => Ok(self.single(TokenType::RightBracket, location)),
            '{' => Ok(self.single(TokenType::LeftBrace, location)),
            '}' => Ok(self.single(TokenType::RightBrace, location)),
            ',' => Ok(self.single(TokenType::Comma, location)),
            ';' => Ok(self.single(TokenType::Semicolon, location)),
            '+' => Ok(self.single(TokenType::Plus, location)),
            '-' => Ok(self.single(TokenType::Minus, location)),
            '*' => Ok(self.single(TokenType::Multiply, location)),
            '/' => Ok(self.single(TokenType::Divide, location)),
            '^' => Ok(self.single(TokenType::Caret, location)),
            '=' => Ok(self.read_equals(location)),
            ':' => Ok(self.read_colon(location)),
            '!' => Ok(self.read_bang(location)),
            '<' => Ok(self.read_comparison(location, TokenType::Less, TokenType::LessEqual)),
            '>' => Ok(self.read_comparison(location, TokenType::Greater, TokenType::GreaterEqual)),
            '&' => Ok(self.read_ampersand(location)),
            '|' => {
                self.advance();
                if self.current_char == Some('|') {
                    self.advance();
                    Ok(Token::new(TokenType::Or, location, "||".to_string()))
                } else {
                    Err(LexerError::UnexpectedCharacter {
                        character: '|',
                        location,
                    })
                }
            }
            other => Err(LexerError::UnexpectedCharacter {
                character: other,
                location,
            }),
        }
    }

    fn single(&mut self, token_type: TokenType, location: SourceLocation) -> Token {
        let lexeme = self.current_char.map(String::from).unwrap_or_default();
        self.advance();
        Token::new(token_type, location, lexeme)
    }

    fn read_equals(&mut self, location: SourceLocation) -> Token {
        self.advance();
        match self.current_char {
            Some('=') => {
                self.advance();
                if self.current_char == Some('=') {
                    self.advance();
                    Token::new(TokenType::SameQ, location, "===".to_string())
                } else {
                    Token::new(TokenType::Equal, location, "==".to_string())
                }
            }
            Some('!') if self.peek() == Some('=') => {
                self.advance();
                self.advance();
                Token::new(TokenType::UnsameQ, location, "=!=".to_string())
            }
            Some('.') => {
                self.advance();
                Token::new(TokenType::Unset, location, "=.".to_string())
            }
            _ => Token::new(TokenType::Set, location, "=".to_string()),
        }
    }

    fn read_colon(&mut self, location: SourceLocation) -> Token {
        self.advance();
        match self.current_char {
            Some('=') => {
                self.advance();
                Token::new(TokenType::SetDelayed, location, ":=".to_string())
            }
            Some('>') => {
                self.advance();
                Token::new(TokenType::RuleDelayed, location, ":>".to_string())
            }
            _ => Token::new(TokenType::Colon, location, ":".to_string()),
        }
    }

    fn read_bang(&mut self, location: SourceLocation) -> Token {
        self.advance();
        if self.current_char == Some('=') {
            self.advance();
            Token::new(TokenType::Unequal, location, "!=".to_string())
        } else {
            Token::new(TokenType::Not, location, "!".to_string())
        }
    }

    fn read_comparison(
        &mut self,
        location: SourceLocation,
        bare: TokenType,
        with_equal: TokenType,
    ) -> Token {
        let c = self.current_char.unwrap_or(' ');
        self.advance();
        if self.current_char == Some('=') {
            self.advance();
            Token::new(with_equal, location, format!("{}=", c))
        } else {
            Token::new(bare, location, c.to_string())
        }
    }

    fn read_ampersand(&mut self, location: SourceLocation) -> Token {
        self.advance();
        if self.current_char == Some('&') {
            self.advance();
            Token::new(TokenType::And, location, "&&".to_string())
        } else {
            Token::new(TokenType::Ampersand, location, "&".to_string())
        }
    }

    fn read_underscores(&mut self, location: SourceLocation) -> Token {
        let mut count: u8 = 0;
        while self.current_char == Some('_') && count < 3 {
            count += 1;
            self.advance();
        }
        Token::new(
            TokenType::Underscore(count),
            location,
            "_".repeat(count as usize),
        )
    }

    fn read_symbol(&mut self, location: SourceLocation) -> Token {
        let mut name = String::new();
        while let Some(c) = self.current_char {
            if c.is_alphanumeric() {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::new(TokenType::Symbol(name.clone()), location, name)
    }

    /// Scan a number literal. Radix prefixes, `_` separators and a
    /// decimal point / exponent are collected here; validation of
    /// separator placement happens when the parser converts the text.
    fn read_number(&mut self, location: SourceLocation) -> Result<Token, LexerError> {
        let mut text = String::new();
        let mut is_float = false;

        if self.current_char == Some('0') {
            if let Some(prefix) = self.peek() {
                if matches!(prefix, 'x' | 'X' | 'o' | 'O' | 'b' | 'B') {
                    text.push('0');
                    self.advance();
                    text.push(prefix);
                    self.advance();
                    while let Some(c) = self.current_char {
                        if c.is_ascii_alphanumeric() || c == '_' {
                            text.push(c);
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    return Ok(Token::new(
                        TokenType::Integer(text.clone()),
                        location,
                        text,
                    ));
                }
            }
        }

        while let Some(c) = self.current_char {
            if c.is_ascii_digit() || c == '_' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.current_char == Some('.') && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            text.push('.');
            self.advance();
            while let Some(c) = self.current_char {
                if c.is_ascii_digit() || c == '_' {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        if matches!(self.current_char, Some('e') | Some('E')) {
            let mut lookahead = self.position + 1;
            if matches!(self.input.get(lookahead), Some('+') | Some('-')) {
                lookahead += 1;
            }
            if self
                .input
                .get(lookahead)
                .is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                text.push(self.current_char.unwrap_or('e'));
                self.advance();
                if matches!(self.current_char, Some('+') | Some('-')) {
                    text.push(self.current_char.unwrap_or('+'));
                    self.advance();
                }
                while let Some(c) = self.current_char {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }

        let token_type = if is_float {
            TokenType::Float(text.clone())
        } else {
            TokenType::Integer(text.clone())
        };
        Ok(Token::new(token_type, location, text))
    }

    fn read_string(&mut self, location: SourceLocation) -> Result<Token, LexerError> {
        self.advance(); // opening quote
        let mut value = String::new();
        loop {
            match self.current_char {
                None => {
                    return Err(LexerError::UnterminatedString { location });
                }
                Some('"') => {
                    self.advance();
                    return Ok(Token::new(
                        TokenType::Str(value.clone()),
                        location,
                        value,
                    ));
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.current_char {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('\\') => '\\',
                        Some('"') => '"',
                        Some('0') => '\0',
                        other => {
                            return Err(LexerError::InvalidEscapeSequence {
                                sequence: other.map(String::from).unwrap_or_default(),
                                location: self.location(),
                            });
                        }
                    };
                    value.push(escaped);
                    self.advance();
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.current_char {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn advance(&mut self) {
        if self.current_char == Some('\n') {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.file_name.clone(), self.line, self.column, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<TokenType> {
        let mut lexer = Lexer::new(source, "test.ly".to_string());
        lexer
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.token_type)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = lex("( ) [ ] { } , ;");
        assert_eq!(
            tokens,
            vec![
                TokenType::LeftParen,
                TokenType::RightParen,
                TokenType::LeftBracket,
                TokenType::RightBracket,
                TokenType::LeftBrace,
                TokenType::RightBrace,
                TokenType::Comma,
                TokenType::Semicolon,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = lex("42 3.14 1_000 0xff 1.5e10 2E-3");
        assert_eq!(
            tokens,
            vec![
                TokenType::Integer("42".to_string()),
                TokenType::Float("3.14".to_string()),
                TokenType::Integer("1_000".to_string()),
                TokenType::Integer("0xff".to_string()),
                TokenType::Float("1.5e10".to_string()),
                TokenType::Float("2E-3".to_string()),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_minus_is_not_part_of_number() {
        let tokens = lex("-17");
        assert_eq!(
            tokens,
            vec![
                TokenType::Minus,
                TokenType::Integer("17".to_string()),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_strings() {
        let tokens = lex(r#""hello" "a\nb" "q\"q""#);
        assert_eq!(
            tokens,
            vec![
                TokenType::Str("hello".to_string()),
                TokenType::Str("a\nb".to_string()),
                TokenType::Str("q\"q".to_string()),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let mut lexer = Lexer::new("\"abc", "test.ly".to_string());
        assert!(matches!(
            lexer.tokenize(),
            Err(LexerError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn test_operators() {
        let tokens = lex("+ - * / ^ = := =. : :> == != === =!= < > <= >= && || ! &");
        assert_eq!(
            tokens,
            vec![
                TokenType::Plus,
                TokenType::Minus,
                TokenType::Multiply,
                TokenType::Divide,
                TokenType::Caret,
                TokenType::Set,
                TokenType::SetDelayed,
                TokenType::Unset,
                TokenType::Colon,
                TokenType::RuleDelayed,
                TokenType::Equal,
                TokenType::Unequal,
                TokenType::SameQ,
                TokenType::UnsameQ,
                TokenType::Less,
                TokenType::Greater,
                TokenType::LessEqual,
                TokenType::GreaterEqual,
                TokenType::And,
                TokenType::Or,
                TokenType::Not,
                TokenType::Ampersand,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_underscores_and_patterns() {
        let tokens = lex("x_Integer __ ___");
        assert_eq!(
            tokens,
            vec![
                TokenType::Symbol("x".to_string()),
                TokenType::Underscore(1),
                TokenType::Symbol("Integer".to_string()),
                TokenType::Underscore(2),
                TokenType::Underscore(3),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_symbols_exclude_underscore() {
        let tokens = lex("abc1 Δx");
        assert_eq!(
            tokens,
            vec![
                TokenType::Symbol("abc1".to_string()),
                TokenType::Symbol("Δx".to_string()),
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let mut lexer = Lexer::new("a\n  b", "test.ly".to_string());
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens[0].location.line, 1);
        assert_eq!(tokens[0].location.column, 1);
        assert_eq!(tokens[1].location.line, 2);
        assert_eq!(tokens[1].location.column, 3);
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("a ~ b", "test.ly".to_string());
        assert!(matches!(
            lexer.tokenize(),
            Err(LexerError::UnexpectedCharacter { character: '~', .. })
        ));
    }
}
