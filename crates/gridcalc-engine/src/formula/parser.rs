//! Formula parser
//!
//! A recursive descent parser for arithmetic formulas with proper operator
//! precedence:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := NUMBER | CELL | '(' expr ')'
//! ```

use thiserror::Error;

use super::ast::{BinaryOperator, Expr, UnaryOperator};
use crate::engine::Position;

/// The formula text could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at offset {offset}")]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Cell(Position),
    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,
    Eof,
}

/// Parse a formula body (without the leading `=`) into an expression tree.
pub(crate) fn parse(input: &str) -> Result<Expr, ParseError> {
    let mut parser = FormulaParser::new(input)?;
    let expr = parser.parse_expression()?;
    if parser.current != Token::Eof {
        return Err(parser.error("unexpected token after expression"));
    }
    Ok(expr)
}

struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current: Token,
    token_start: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> Result<Self, ParseError> {
        let mut parser = Self {
            input,
            pos: 0,
            current: Token::Eof,
            token_start: 0,
        };
        parser.advance()?;
        Ok(parser)
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError {
            message: message.to_string(),
            offset: self.token_start,
        }
    }

    // === Token scanning ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.eat_while(char::is_whitespace);
        self.token_start = self.pos;
        self.current = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> Result<Token, ParseError> {
        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.pos += 1;
            return Ok(token);
        }

        if c.is_ascii_digit() || c == '.' {
            return self.scan_number();
        }
        if c.is_ascii_uppercase() {
            return self.scan_cell();
        }

        Err(ParseError {
            message: format!("unexpected character '{}'", c),
            offset: self.pos,
        })
    }

    fn scan_number(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        self.eat_while(|c| c.is_ascii_digit());
        if self.peek_char() == Some('.') {
            self.pos += 1;
            self.eat_while(|c| c.is_ascii_digit());
        }

        // Exponent is only consumed when digits follow it.
        let rest = &self.input[self.pos..];
        let mut chars = rest.chars();
        if matches!(chars.next(), Some('e' | 'E')) {
            let mut len = 1;
            let mut next = chars.next();
            if matches!(next, Some('+' | '-')) {
                len += 1;
                next = chars.next();
            }
            if next.is_some_and(|c| c.is_ascii_digit()) {
                self.pos += len;
                self.eat_while(|c| c.is_ascii_digit());
            }
        }

        let text = &self.input[start..self.pos];
        text.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Token::Number)
            .ok_or_else(|| ParseError {
                message: format!("invalid number '{}'", text),
                offset: start,
            })
    }

    fn scan_cell(&mut self) -> Result<Token, ParseError> {
        let start = self.pos;
        self.eat_while(|c| c.is_ascii_uppercase());
        let letters_end = self.pos;
        self.eat_while(|c| c.is_ascii_digit());
        if self.pos == letters_end {
            return Err(ParseError {
                message: format!("unknown identifier '{}'", &self.input[start..letters_end]),
                offset: start,
            });
        }
        let text = &self.input[start..self.pos];
        Ok(Token::Cell(Position::from_a1(text).unwrap_or(Position::NONE)))
    }

    // === Grammar ===

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => return Ok(left),
            };
            self.advance()?;
            let right = self.parse_term()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => return Ok(left),
            };
            self.advance()?;
            let right = self.parse_unary()?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.current {
            Token::Plus => UnaryOperator::Plus,
            Token::Minus => UnaryOperator::Minus,
            _ => return self.parse_primary(),
        };
        self.advance()?;
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match self.current {
            Token::Number(n) => {
                self.advance()?;
                Ok(Expr::Number(n))
            }
            Token::Cell(pos) => {
                self.advance()?;
                Ok(Expr::Cell(pos))
            }
            Token::LeftParen => {
                self.advance()?;
                let inner = self.parse_expression()?;
                if self.current != Token::RightParen {
                    return Err(self.error("expected ')'"));
                }
                self.advance()?;
                Ok(inner)
            }
            Token::Eof => Err(self.error("unexpected end of formula")),
            _ => Err(self.error("expected a number, cell or '('")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let expr = parse("1+2*3").unwrap();
        match expr {
            Expr::Binary {
                op: BinaryOperator::Add,
                right,
                ..
            } => assert!(matches!(
                *right,
                Expr::Binary {
                    op: BinaryOperator::Multiply,
                    ..
                }
            )),
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_exponent_numbers() {
        assert_eq!(parse("1e3").unwrap(), Expr::Number(1000.0));
        assert_eq!(parse("2.5E-1").unwrap(), Expr::Number(0.25));
    }

    #[test]
    fn test_out_of_range_reference_parses() {
        match parse("ZZZZZ1").unwrap() {
            Expr::Cell(pos) => assert!(!pos.is_valid()),
            other => panic!("unexpected tree: {:?}", other),
        }
        assert_eq!(
            parse("ZZZZZZZZZZZZZZZZ1").unwrap(),
            Expr::Cell(Position::NONE)
        );
        assert_eq!(
            parse("A99999").unwrap(),
            Expr::Cell(Position::new(99998, 0))
        );
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse("").unwrap_err().offset, 0);
        assert_eq!(parse("1+").unwrap_err().offset, 2);
        assert!(parse("(1").is_err());
        assert!(parse("1)").is_err());
        assert!(parse("a1").is_err());
        assert!(parse("SUM").is_err());
        assert!(parse("1 2").is_err());
        assert!(parse(".").is_err());
    }
}
