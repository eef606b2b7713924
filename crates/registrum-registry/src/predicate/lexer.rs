//! Hand-written tokenizer for RPEG v1 expressions.
//!
//! The grammar is LL(1) and byte positions matter for diagnostics, so the
//! scanner walks chars directly rather than going through a pattern engine.

use std::fmt;

use crate::error::ParseError;

/// A lexical token with its byte offset in the source expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// Byte offset where the token starts.
    pub at: usize,
}

/// Tokens of the predicate grammar.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier segment, e.g. `transition`.
    Ident(String),
    /// Double-quoted string literal (unescaped content).
    Str(String),
    /// Integer literal.
    Int(i64),
    /// `true`.
    True,
    /// `false`.
    False,
    /// `null`.
    Null,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `!`
    Not,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `>=`
    Ge,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `<`
    Lt,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(name) => write!(f, "{name}"),
            Token::Str(s) => write!(f, "\"{s}\""),
            Token::Int(i) => write!(f, "{i}"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::Dot => write!(f, "."),
            Token::Comma => write!(f, ","),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Not => write!(f, "!"),
            Token::AndAnd => write!(f, "&&"),
            Token::OrOr => write!(f, "||"),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::Ge => write!(f, ">="),
            Token::Gt => write!(f, ">"),
            Token::Le => write!(f, "<="),
            Token::Lt => write!(f, "<"),
        }
    }
}

/// Tokenizes an expression, or fails on the first character outside the
/// grammar.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, ParseError> {
    let bytes: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        let ch = bytes[pos];
        let at = pos;
        match ch {
            c if c.is_whitespace() => {
                pos += 1;
            }
            '.' => {
                tokens.push(Spanned { token: Token::Dot, at });
                pos += 1;
            }
            ',' => {
                tokens.push(Spanned { token: Token::Comma, at });
                pos += 1;
            }
            '(' => {
                tokens.push(Spanned { token: Token::LParen, at });
                pos += 1;
            }
            ')' => {
                tokens.push(Spanned { token: Token::RParen, at });
                pos += 1;
            }
            '&' => {
                if bytes.get(pos + 1) == Some(&'&') {
                    tokens.push(Spanned { token: Token::AndAnd, at });
                    pos += 2;
                } else {
                    return Err(ParseError::UnexpectedChar { ch: '&', at });
                }
            }
            '|' => {
                if bytes.get(pos + 1) == Some(&'|') {
                    tokens.push(Spanned { token: Token::OrOr, at });
                    pos += 2;
                } else {
                    return Err(ParseError::UnexpectedChar { ch: '|', at });
                }
            }
            '=' => {
                if bytes.get(pos + 1) == Some(&'=') {
                    tokens.push(Spanned { token: Token::EqEq, at });
                    pos += 2;
                } else {
                    return Err(ParseError::UnexpectedChar { ch: '=', at });
                }
            }
            '!' => {
                if bytes.get(pos + 1) == Some(&'=') {
                    tokens.push(Spanned { token: Token::NotEq, at });
                    pos += 2;
                } else {
                    tokens.push(Spanned { token: Token::Not, at });
                    pos += 1;
                }
            }
            '>' => {
                if bytes.get(pos + 1) == Some(&'=') {
                    tokens.push(Spanned { token: Token::Ge, at });
                    pos += 2;
                } else {
                    tokens.push(Spanned { token: Token::Gt, at });
                    pos += 1;
                }
            }
            '<' => {
                if bytes.get(pos + 1) == Some(&'=') {
                    tokens.push(Spanned { token: Token::Le, at });
                    pos += 2;
                } else {
                    tokens.push(Spanned { token: Token::Lt, at });
                    pos += 1;
                }
            }
            '"' => {
                let (literal, next) = scan_string(&bytes, pos)?;
                tokens.push(Spanned { token: Token::Str(literal), at });
                pos = next;
            }
            '-' => {
                // Negative integer literal; the grammar has no minus operator.
                if bytes.get(pos + 1).is_some_and(|c| c.is_ascii_digit()) {
                    let (value, next) = scan_int(&bytes, pos)?;
                    tokens.push(Spanned { token: Token::Int(value), at });
                    pos = next;
                } else {
                    return Err(ParseError::UnexpectedChar { ch: '-', at });
                }
            }
            c if c.is_ascii_digit() => {
                let (value, next) = scan_int(&bytes, pos)?;
                tokens.push(Spanned { token: Token::Int(value), at });
                pos = next;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut end = pos + 1;
                while end < bytes.len()
                    && (bytes[end].is_ascii_alphanumeric() || bytes[end] == '_')
                {
                    end += 1;
                }
                let word: String = bytes[pos..end].iter().collect();
                let token = match word.as_str() {
                    "true" => Token::True,
                    "false" => Token::False,
                    "null" => Token::Null,
                    _ => Token::Ident(word),
                };
                tokens.push(Spanned { token, at });
                pos = end;
            }
            other => return Err(ParseError::UnexpectedChar { ch: other, at }),
        }
    }

    Ok(tokens)
}

fn scan_string(bytes: &[char], start: usize) -> Result<(String, usize), ParseError> {
    let mut out = String::new();
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            '"' => return Ok((out, pos + 1)),
            '\\' => {
                let escape = bytes
                    .get(pos + 1)
                    .ok_or(ParseError::UnterminatedString { at: start })?;
                match escape {
                    '"' => out.push('"'),
                    '\\' => out.push('\\'),
                    'n' => out.push('\n'),
                    'r' => out.push('\r'),
                    't' => out.push('\t'),
                    other => {
                        return Err(ParseError::UnexpectedChar {
                            ch: *other,
                            at: pos + 1,
                        })
                    }
                }
                pos += 2;
            }
            other => {
                out.push(other);
                pos += 1;
            }
        }
    }
    Err(ParseError::UnterminatedString { at: start })
}

fn scan_int(bytes: &[char], start: usize) -> Result<(i64, usize), ParseError> {
    let mut end = start;
    if bytes[end] == '-' {
        end += 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let text: String = bytes[start..end].iter().collect();
    let value = text
        .parse::<i64>()
        .map_err(|_| ParseError::IntegerOutOfRange { at: start })?;
    Ok((value, end))
}
