//! Lexical analysis (tokenization) for expression parsing
//!
//! This module converts expression strings into sequences of tokens.
//! The tokenizer is designed to be a pure function with no side effects.

use anyhow::{anyhow, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Token types for the lexer
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Identifier(String),

    // Operators
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    And,
    Or,
    Not,
    In,

    // Functions
    Contains,
    StartsWith,
    EndsWith,
    Matches,

    // Aggregate Functions
    Length,
    Sum,
    Count,
    Min,
    Max,
    Avg,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,
    Dot,
}

/// Parse operator tokens (!, !=, =, ==, >, >=, <, <=, &&, ||)
///
/// This helper function handles all operator parsing, including lookahead
/// for multi-character operators.
///
/// Returns `Some(Token)` if the character is an operator, `None` otherwise.
fn parse_operator(ch: char, chars: &mut Peekable<Chars>) -> Result<Option<Token>> {
    let token = match ch {
        '!' => {
            chars.next();
            if chars.peek() == Some(&'=') {
                chars.next();
                Token::NotEqual
            } else {
                Token::Not
            }
        }
        '=' => {
            chars.next();
            if chars.peek() == Some(&'=') {
                chars.next();
                Token::Equal
            } else {
                Token::Equal // Single = also means equal
            }
        }
        '>' => {
            chars.next();
            if chars.peek() == Some(&'=') {
                chars.next();
                Token::GreaterEqual
            } else {
                Token::Greater
            }
        }
        '<' => {
            chars.next();
            if chars.peek() == Some(&'=') {
                chars.next();
                Token::LessEqual
            } else {
                Token::Less
            }
        }
        '&' => {
            chars.next();
            if chars.peek() == Some(&'&') {
                chars.next();
                Token::And
            } else {
                return Err(anyhow!("Expected && but got single &"));
            }
        }
        '|' => {
            chars.next();
            if chars.peek() == Some(&'|') {
                chars.next();
                Token::Or
            } else {
                return Err(anyhow!("Expected || but got single |"));
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(token))
}

/// Tokenize an expression string into a sequence of tokens
///
/// This is a pure function that converts a string into tokens.
/// It handles:
/// - Literals (numbers, strings, booleans, null)
/// - Operators (==, !=, &&, ||, >, <, >=, <=, !)
/// - Identifiers and keywords
/// - Punctuation (parentheses, brackets)
///
/// # Examples
///
/// ```
/// use prodigy::cook::execution::expression::tokenizer::tokenize;
///
/// let tokens = tokenize("priority > 5").unwrap();
/// assert_eq!(tokens.len(), 3);
/// ```
pub fn tokenize(expr: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            ' ' | '\t' | '\n' => {
                chars.next();
            }
            '(' => {
                tokens.push(Token::LeftParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RightParen);
                chars.next();
            }
            '!' | '=' | '>' | '<' | '&' | '|' => {
                if let Some(token) = parse_operator(ch, &mut chars)? {
                    tokens.push(token);
                }
            }
            '"' | '\'' => {
                let quote = ch;
                chars.next();
                let mut string = String::new();
                for ch in chars.by_ref() {
                    if ch == quote {
                        break;
                    }
                    string.push(ch);
                }
                tokens.push(Token::String(string));
            }
            '0'..='9' | '-' => {
                let mut num_str = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_numeric() || ch == '.' || ch == '-' {
                        num_str.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if let Ok(num) = num_str.parse::<f64>() {
                    tokens.push(Token::Number(num));
                } else {
                    return Err(anyhow!("Invalid number: {}", num_str));
                }
            }
            _ if ch.is_alphabetic() || ch == '_' => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_alphanumeric()
                        || ch == '_'
                        || ch == '.'
                        || ch == '['
                        || ch == ']'
                        || ch == '*'
                    {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }

                // Check for keywords (case-insensitive for operators)
                match ident.to_lowercase().as_str() {
                    "true" => tokens.push(Token::Boolean(true)),
                    "false" => tokens.push(Token::Boolean(false)),
                    "null" => tokens.push(Token::Null),
                    "in" => tokens.push(Token::In),
                    "and" => tokens.push(Token::And),
                    "or" => tokens.push(Token::Or),
                    "not" => tokens.push(Token::Not),
                    "contains" => tokens.push(Token::Contains),
                    "starts_with" | "startswith" => tokens.push(Token::StartsWith),
                    "ends_with" | "endswith" => tokens.push(Token::EndsWith),
                    "matches" => tokens.push(Token::Matches),
                    "length" => tokens.push(Token::Length),
                    "sum" => tokens.push(Token::Sum),
                    "count" => tokens.push(Token::Count),
                    "min" => tokens.push(Token::Min),
                    "max" => tokens.push(Token::Max),
                    "avg" => tokens.push(Token::Avg),
                    _ => tokens.push(Token::Identifier(ident)),
                }
            }
            _ => {
                chars.next();
            }
        }
    }

    Ok(tokens)
}
