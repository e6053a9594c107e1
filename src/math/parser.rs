//! Recursive descent parser over the token stream from [`super::lexer`].

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Pow};

use super::expr::{Constant, Expr, Function, Relation, RelOp, Statement};
use super::lexer::{Token, tokenize, tokenize_plain};
use crate::error::{FormulaError, FormulaResult};

/// Parses a formula, an equation, an inequality or a `cases` system
pub fn parse_statement(input: &str) -> FormulaResult<Statement> {
    parse_tokens(&tokenize(input)?)
}

/// Parses calculator notation, where letter runs are whole names
pub fn parse_plain_statement(input: &str) -> FormulaResult<Statement> {
    parse_tokens(&tokenize_plain(input)?)
}

fn parse_tokens(tokens: &[Token]) -> FormulaResult<Statement> {
    if tokens.is_empty() {
        return Err(FormulaError::EmptyExpression);
    }

    let mut parser = Parser::new(tokens);
    let statement = if parser.peek() == Some(&Token::BeginCases) {
        Statement::System(parser.parse_cases()?)
    } else {
        let lhs = parser.parse_expr()?;
        match parser.peek() {
            Some(Token::Rel(op)) => {
                let op = *op;
                parser.advance();
                let rhs = parser.parse_expr()?;
                if let Some(Token::Rel(_)) = parser.peek() {
                    return Err(fail("chained relations are not supported"));
                }
                Statement::Relation(Relation::new(lhs, op, rhs))
            }
            _ => Statement::Expr(lhs),
        }
    };

    parser.finish()?;
    Ok(statement)
}

/// Parses text that must not contain a relation
pub fn parse_expression(input: &str) -> FormulaResult<Expr> {
    match parse_statement(input)? {
        Statement::Expr(expr) => Ok(expr),
        _ => Err(fail("expected an expression without a relation")),
    }
}

fn fail(message: impl Into<String>) -> FormulaError {
    FormulaError::ParseFailure(message.into())
}

fn parse_number(digits: &str) -> FormulaResult<BigRational> {
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    let numer: BigInt = format!("{whole}{fraction}")
        .parse()
        .map_err(|e| fail(format!("invalid number '{digits}': {e}")))?;
    let denom = BigInt::from(10u32).pow(fraction.len());
    Ok(BigRational::new(numer, denom))
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        match self.advance() {
            Some(tok) if tok == expected => Ok(()),
            Some(tok) => Err(fail(format!("expected {expected:?}, found {tok:?}"))),
            None => Err(fail(format!("expected {expected:?}, found end of input"))),
        }
    }

    fn finish(&self) -> FormulaResult<()> {
        if self.pos < self.tokens.len() {
            Err(fail(format!(
                "unexpected {:?} after the end of the formula",
                self.tokens[self.pos]
            )))
        } else {
            Ok(())
        }
    }

    fn parse_cases(&mut self) -> FormulaResult<Vec<Relation>> {
        self.expect(&Token::BeginCases)?;
        let mut rows = Vec::new();
        loop {
            while self.eat(&Token::RowSep) || self.eat(&Token::Comma) {}
            match self.peek() {
                Some(Token::EndCases) => {
                    self.advance();
                    break;
                }
                None => return Err(fail("unterminated cases block")),
                Some(_) => rows.push(self.parse_row()?),
            }
        }
        if rows.is_empty() {
            return Err(fail("empty cases block"));
        }
        Ok(rows)
    }

    /// A row without a relation means `expr = 0`
    fn parse_row(&mut self) -> FormulaResult<Relation> {
        let lhs = self.parse_expr()?;
        match self.peek() {
            Some(Token::Rel(op)) => {
                let op = *op;
                self.advance();
                let rhs = self.parse_expr()?;
                Ok(Relation::new(lhs, op, rhs))
            }
            _ => Ok(Relation::new(lhs, RelOp::Eq, Expr::integer(0))),
        }
    }

    fn parse_expr(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_term()?;
        loop {
            if self.eat(&Token::Plus) {
                left = left.add(self.parse_term()?);
            } else if self.eat(&Token::Minus) {
                left = left.sub(self.parse_term()?);
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn starts_implicit_factor(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Number(_)
                    | Token::Ident(_)
                    | Token::Constant(_)
                    | Token::Function(_)
                    | Token::Frac
                    | Token::Sqrt
                    | Token::LParen
                    | Token::LBrace
            )
        )
    }

    fn parse_term(&mut self) -> FormulaResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            if self.eat(&Token::Times) {
                left = left.mul(self.parse_unary()?);
            } else if self.eat(&Token::Divide) {
                left = left.div(self.parse_unary()?);
            } else if self.starts_implicit_factor() {
                left = left.mul(self.parse_power()?);
            } else {
                break;
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<Expr> {
        if self.eat(&Token::Minus) {
            Ok(self.parse_unary()?.neg())
        } else if self.eat(&Token::Plus) {
            self.parse_unary()
        } else {
            self.parse_power()
        }
    }

    fn parse_power(&mut self) -> FormulaResult<Expr> {
        let base = self.parse_atom()?;
        if self.eat(&Token::Caret) {
            let exponent = self.parse_exponent()?;
            Ok(base.pow(exponent))
        } else {
            Ok(base)
        }
    }

    /// `x^{...}`, `x^2`, `x^-1`, or a right-associative `2**3**2`
    fn parse_exponent(&mut self) -> FormulaResult<Expr> {
        if self.peek() == Some(&Token::LBrace) {
            self.parse_group()
        } else {
            self.parse_unary()
        }
    }

    fn parse_group(&mut self) -> FormulaResult<Expr> {
        self.expect(&Token::LBrace)?;
        let inner = self.parse_expr()?;
        self.expect(&Token::RBrace)?;
        Ok(inner)
    }

    /// Braced group, or a single atom for OCR output such as `\frac x2`
    fn parse_argument(&mut self) -> FormulaResult<Expr> {
        if self.peek() == Some(&Token::LBrace) {
            self.parse_group()
        } else {
            self.parse_atom()
        }
    }

    fn parse_subscript(&mut self) -> FormulaResult<String> {
        let mut text = String::new();
        if self.eat(&Token::LBrace) {
            loop {
                match self.advance() {
                    Some(Token::RBrace) => break,
                    Some(Token::Number(n)) => text.push_str(n),
                    Some(Token::Ident(name)) => text.push_str(name),
                    Some(other) => return Err(fail(format!("unsupported subscript {other:?}"))),
                    None => return Err(fail("unterminated subscript")),
                }
            }
        } else {
            match self.advance() {
                Some(Token::Number(n)) => text.push_str(n),
                Some(Token::Ident(name)) => text.push_str(name),
                _ => return Err(fail("missing subscript")),
            }
        }
        Ok(text)
    }

    fn parse_function(&mut self, function: Function) -> FormulaResult<Expr> {
        let base = if function == Function::Log10 && self.eat(&Token::Underscore) {
            if self.peek() == Some(&Token::LBrace) {
                Some(self.parse_group()?)
            } else {
                Some(self.parse_atom()?)
            }
        } else {
            None
        };
        let power = if self.eat(&Token::Caret) {
            Some(self.parse_exponent()?)
        } else {
            None
        };

        let arg = match self.peek() {
            Some(Token::LParen) => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                inner
            }
            Some(Token::LBrace) => self.parse_group()?,
            _ => self.parse_power()?,
        };

        let mut call = match base {
            Some(base) => Expr::call(Function::Ln, arg).div(Expr::call(Function::Ln, base)),
            None => Expr::call(function, arg),
        };
        if let Some(power) = power {
            call = call.pow(power);
        }
        Ok(call)
    }

    fn parse_atom(&mut self) -> FormulaResult<Expr> {
        let Some(token) = self.advance().cloned() else {
            return Err(fail("unexpected end of input"));
        };

        match token {
            Token::Number(digits) => Ok(Expr::Number(parse_number(&digits)?)),
            Token::Ident(name) if name == "e" => Ok(Expr::Constant(Constant::E)),
            Token::Ident(name) => {
                if self.eat(&Token::Underscore) {
                    let subscript = self.parse_subscript()?;
                    Ok(Expr::Variable(format!("{name}_{subscript}")))
                } else {
                    Ok(Expr::Variable(name))
                }
            }
            Token::Constant(c) => Ok(Expr::Constant(c)),
            Token::LParen => {
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::LBracket => {
                let inner = self.parse_expr()?;
                self.expect(&Token::RBracket)?;
                Ok(inner)
            }
            Token::LBrace => {
                let inner = self.parse_expr()?;
                self.expect(&Token::RBrace)?;
                Ok(inner)
            }
            Token::Pipe => {
                let inner = self.parse_expr()?;
                self.expect(&Token::Pipe)?;
                Ok(Expr::call(Function::Abs, inner))
            }
            Token::Frac => {
                let numer = self.parse_argument()?;
                let denom = self.parse_argument()?;
                Ok(numer.div(denom))
            }
            Token::Sqrt => {
                if self.eat(&Token::LBracket) {
                    let index = self.parse_expr()?;
                    self.expect(&Token::RBracket)?;
                    let radicand = self.parse_argument()?;
                    Ok(radicand.pow(Expr::Number(BigRational::one()).div(index)))
                } else {
                    let radicand = self.parse_argument()?;
                    Ok(Expr::call(Function::Sqrt, radicand))
                }
            }
            Token::Function(function) => self.parse_function(function),
            other => Err(fail(format!("unexpected {other:?}"))),
        }
    }
}
