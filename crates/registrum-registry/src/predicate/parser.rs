//! Recursive-descent parser for RPEG v1.
//!
//! Precedence, loosest first: `||`, `&&`, equality (`==` `!=`), relational
//! (`>=` `>` `<=` `<`), unary `!`, primary. Primaries are literals, dotted
//! identifier paths, builtin calls (a path followed by an argument list),
//! and parenthesized expressions.

use crate::error::ParseError;
use crate::predicate::ast::{BinaryOp, Expr, Literal};
use crate::predicate::lexer::{tokenize, Spanned, Token};

/// Parses an expression source into a syntax tree.
///
/// Fails on empty input, lexical errors, grammar violations, and trailing
/// tokens. Parsing performs no safety checks; that is the static
/// validator's job.
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(ParseError::EmptyExpression);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.expression()?;
    if let Some(spanned) = parser.peek() {
        return Err(ParseError::UnexpectedToken {
            found: spanned.token.to_string(),
            at: spanned.at,
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let spanned = self.tokens.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek().map(|s| &s.token) == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        match self.advance() {
            Some(spanned) if spanned.token == expected => Ok(()),
            Some(spanned) => Err(ParseError::UnexpectedToken {
                found: spanned.token.to_string(),
                at: spanned.at,
            }),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.and_expr()?;
        while self.eat(&Token::OrOr) {
            let right = self.and_expr()?;
            left = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.equality()?;
        while self.eat(&Token::AndAnd) {
            let right = self.equality()?;
            left = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.relational()?;
        loop {
            let op = match self.peek().map(|s| &s.token) {
                Some(Token::EqEq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::Ne,
                _ => break,
            };
            self.pos += 1;
            let right = self.relational()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn relational(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek().map(|s| &s.token) {
                Some(Token::Ge) => BinaryOp::Ge,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Lt) => BinaryOp::Lt,
                _ => break,
            };
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.eat(&Token::Not) {
            let operand = self.unary()?;
            return Ok(Expr::Not(Box::new(operand)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let spanned = self.advance().ok_or(ParseError::UnexpectedEnd)?;
        match spanned.token {
            Token::True => Ok(Expr::Literal(Literal::Bool(true))),
            Token::False => Ok(Expr::Literal(Literal::Bool(false))),
            Token::Null => Ok(Expr::Literal(Literal::Null)),
            Token::Int(i) => Ok(Expr::Literal(Literal::Int(i))),
            Token::Str(s) => Ok(Expr::Literal(Literal::Str(s))),
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(first) => self.path_or_call(first),
            other => Err(ParseError::UnexpectedToken {
                found: other.to_string(),
                at: spanned.at,
            }),
        }
    }

    /// Parses the remainder of a dotted path; a trailing `(` turns the path
    /// into a call whose name is the joined path.
    fn path_or_call(&mut self, first: String) -> Result<Expr, ParseError> {
        let mut path = vec![first];
        while self.eat(&Token::Dot) {
            match self.advance() {
                Some(Spanned {
                    token: Token::Ident(segment),
                    ..
                }) => path.push(segment),
                Some(spanned) => {
                    return Err(ParseError::UnexpectedToken {
                        found: spanned.token.to_string(),
                        at: spanned.at,
                    })
                }
                None => return Err(ParseError::UnexpectedEnd),
            }
        }

        if self.eat(&Token::LParen) {
            let mut args = Vec::new();
            if !self.eat(&Token::RParen) {
                loop {
                    args.push(self.expression()?);
                    if self.eat(&Token::Comma) {
                        continue;
                    }
                    self.expect(Token::RParen)?;
                    break;
                }
            }
            Ok(Expr::Call {
                name: Expr::join_path(&path),
                args,
            })
        } else {
            Ok(Expr::Identifier(path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(path: &[&str]) -> Expr {
        Expr::Identifier(path.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_empty_input_fails() {
        assert_eq!(parse(""), Err(ParseError::EmptyExpression));
        assert_eq!(parse("   "), Err(ParseError::EmptyExpression));
    }

    #[test]
    fn test_literals() {
        assert_eq!(parse("true").unwrap(), Expr::Literal(Literal::Bool(true)));
        assert_eq!(parse("null").unwrap(), Expr::Literal(Literal::Null));
        assert_eq!(parse("-3").unwrap(), Expr::Literal(Literal::Int(-3)));
        assert_eq!(
            parse(r#""x""#).unwrap(),
            Expr::Literal(Literal::Str("x".to_string()))
        );
    }

    #[test]
    fn test_dotted_identifier() {
        assert_eq!(
            parse("transition.to.id").unwrap(),
            ident(&["transition", "to", "id"])
        );
    }

    #[test]
    fn test_call_with_dotted_name() {
        assert_eq!(
            parse("registry.contains_state(transition.from)").unwrap(),
            Expr::Call {
                name: "registry.contains_state".to_string(),
                args: vec![ident(&["transition", "from"])],
            }
        );
    }

    #[test]
    fn test_zero_arg_call() {
        assert_eq!(
            parse("registry.max_order_index()").unwrap(),
            Expr::Call {
                name: "registry.max_order_index".to_string(),
                args: vec![],
            }
        );
    }

    #[test]
    fn test_precedence_or_lowest() {
        // a && b || c  parses as  (a && b) || c
        let expr = parse("a && b || c").unwrap();
        match expr {
            Expr::Binary { op: BinaryOp::Or, left, .. } => match *left {
                Expr::Binary { op: BinaryOp::And, .. } => {}
                other => panic!("expected && under ||, got {other:?}"),
            },
            other => panic!("expected || at root, got {other:?}"),
        }
    }

    #[test]
    fn test_precedence_relational_binds_tighter_than_equality() {
        // a > b == c < d  parses as  (a > b) == (c < d)
        let expr = parse("a > b == c < d").unwrap();
        match expr {
            Expr::Binary { op: BinaryOp::Eq, left, right } => {
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::Gt, .. }));
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::Lt, .. }));
            }
            other => panic!("expected == at root, got {other:?}"),
        }
    }

    #[test]
    fn test_unary_not_nests() {
        assert_eq!(
            parse("!!a").unwrap(),
            Expr::Not(Box::new(Expr::Not(Box::new(ident(&["a"])))))
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = parse("a && (b || c)").unwrap();
        match expr {
            Expr::Binary { op: BinaryOp::And, right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::Or, .. }));
            }
            other => panic!("expected && at root, got {other:?}"),
        }
    }

    #[test]
    fn test_trailing_tokens_fail() {
        assert!(matches!(
            parse("a b"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_unclosed_paren_fails() {
        assert_eq!(parse("(a"), Err(ParseError::UnexpectedEnd));
    }

    #[test]
    fn test_dangling_dot_fails() {
        assert_eq!(parse("state."), Err(ParseError::UnexpectedEnd));
    }

    #[test]
    fn test_dangling_operator_fails() {
        assert_eq!(parse("a &&"), Err(ParseError::UnexpectedEnd));
    }
}
