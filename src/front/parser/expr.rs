// ----------------------------
// File: src/front/parser/expr.rs
// ----------------------------
//! Pratt parsing of expressions. Binary integral, logical and relational
//! operators each construct their typed node, coercing operands as needed.

use super::Parser;
use crate::front::ast::{BinaryOp, Expr, IntegralExpr, LValue, LogicalExpr, LogicalOp, RelationalOp, UnaryOp};
use crate::front::token::{SyntaxError, TokenKind as K};

/// Binding strength, weakest first. `Unary` hands over to the prefix/primary
/// parser.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Prec {
    Assign,
    LogOr,
    LogAnd,
    BitOr,
    BitXor,
    BitAnd,
    Equality,
    Relational,
    Add,
    Mul,
    Unary,
}

impl Prec {
    fn next(self) -> Prec {
        use Prec::*;
        match self {
            Assign => LogOr,
            LogOr => LogAnd,
            LogAnd => BitOr,
            BitOr => BitXor,
            BitXor => BitAnd,
            BitAnd => Equality,
            Equality => Relational,
            Relational => Add,
            Add => Mul,
            Mul => Unary,
            Unary => Unary,
        }
    }
}

impl Parser {
    pub(super) fn parse_expression(&mut self) -> Result<Expr, SyntaxError> {
        self.parse_prec(Prec::Assign)
    }

    fn parse_prec(&mut self, prec: Prec) -> Result<Expr, SyntaxError> {
        if prec == Prec::Unary {
            return self.parse_unary();
        }
        let mut lhs = self.parse_prec(prec.next())?;
        loop {
            let kind = match self.ts.peek() {
                Some(t) => t.kind.clone(),
                None => break,
            };
            lhs = match kind {
                // right-associative; the target must be an l-value
                K::Assign if prec <= Prec::Assign => {
                    self.ts.bump();
                    let rhs = self.parse_prec(Prec::Assign)?;
                    let target = lvalue_of(lhs)?;
                    Expr::Integral(IntegralExpr::assignment(target, rhs))
                }

                K::OrOr if prec <= Prec::LogOr => {
                    self.ts.bump();
                    let rhs = self.parse_prec(Prec::LogOr.next())?;
                    Expr::Logical(LogicalExpr::binary(LogicalOp::Or, lhs, rhs))
                }
                K::AndAnd if prec <= Prec::LogAnd => {
                    self.ts.bump();
                    let rhs = self.parse_prec(Prec::LogAnd.next())?;
                    Expr::Logical(LogicalExpr::binary(LogicalOp::And, lhs, rhs))
                }

                K::Pipe if prec <= Prec::BitOr => self.binary(BinaryOp::Or, lhs, Prec::BitOr)?,
                K::Caret if prec <= Prec::BitXor => self.binary(BinaryOp::Xor, lhs, Prec::BitXor)?,
                K::Ampersand if prec <= Prec::BitAnd => self.binary(BinaryOp::And, lhs, Prec::BitAnd)?,

                K::EqualEqual if prec <= Prec::Equality => {
                    self.relational(RelationalOp::Equal, lhs, Prec::Equality)?
                }
                K::NotEqual if prec <= Prec::Equality => {
                    self.relational(RelationalOp::NotEqual, lhs, Prec::Equality)?
                }
                K::Less if prec <= Prec::Relational => {
                    self.relational(RelationalOp::Less, lhs, Prec::Relational)?
                }
                K::LessEqual if prec <= Prec::Relational => {
                    self.relational(RelationalOp::LessEqual, lhs, Prec::Relational)?
                }
                K::Greater if prec <= Prec::Relational => {
                    self.relational(RelationalOp::Greater, lhs, Prec::Relational)?
                }
                K::GreaterEqual if prec <= Prec::Relational => {
                    self.relational(RelationalOp::GreaterEqual, lhs, Prec::Relational)?
                }

                K::Plus if prec <= Prec::Add => self.binary(BinaryOp::Add, lhs, Prec::Add)?,
                K::Minus if prec <= Prec::Add => self.binary(BinaryOp::Sub, lhs, Prec::Add)?,
                K::Star if prec <= Prec::Mul => self.binary(BinaryOp::Mul, lhs, Prec::Mul)?,
                K::Slash if prec <= Prec::Mul => self.binary(BinaryOp::Div, lhs, Prec::Mul)?,

                _ => break,
            };
        }
        Ok(lhs)
    }

    fn binary(&mut self, op: BinaryOp, lhs: Expr, prec: Prec) -> Result<Expr, SyntaxError> {
        self.ts.bump();
        let rhs = self.parse_prec(prec.next())?;
        Ok(Expr::Integral(IntegralExpr::binary(op, lhs, rhs)))
    }

    fn relational(&mut self, op: RelationalOp, lhs: Expr, prec: Prec) -> Result<Expr, SyntaxError> {
        self.ts.bump();
        let rhs = self.parse_prec(prec.next())?;
        Ok(Expr::Logical(LogicalExpr::relational(op, lhs, rhs)))
    }

    fn parse_unary(&mut self) -> Result<Expr, SyntaxError> {
        let token = match self.ts.peek() {
            Some(t) => t.clone(),
            None => {
                return Err(SyntaxError::new(
                    self.ts.location(),
                    "expected expression but found end of input",
                ))
            }
        };
        match token.kind {
            K::Plus => self.prefix_integral(UnaryOp::Plus),
            K::Minus => self.prefix_integral(UnaryOp::Negate),
            K::Tilde => self.prefix_integral(UnaryOp::Complement),
            K::Not => {
                let token = self.ts.bump().expect("peeked token");
                let exp = self.parse_unary()?;
                Ok(Expr::Logical(LogicalExpr::not(exp, token.location)))
            }
            _ => self.parse_primary(),
        }
    }

    fn prefix_integral(&mut self, op: UnaryOp) -> Result<Expr, SyntaxError> {
        let token = self.ts.bump().expect("peeked token");
        let exp = self.parse_unary()?;
        Ok(Expr::Integral(IntegralExpr::unary(op, exp, token.location)))
    }

    fn parse_primary(&mut self) -> Result<Expr, SyntaxError> {
        let token = match self.ts.peek() {
            Some(t) => t.clone(),
            None => {
                return Err(SyntaxError::new(
                    self.ts.location(),
                    "expected expression but found end of input",
                ))
            }
        };
        match token.kind {
            K::Number(value) => {
                self.ts.bump();
                Ok(Expr::Integral(IntegralExpr::Constant { value, location: token.location }))
            }
            K::CharLiteral(value) => {
                self.ts.bump();
                Ok(Expr::Integral(IntegralExpr::Constant { value, location: token.location }))
            }
            K::StringLiteral(_) => Err(SyntaxError::new(
                token.location,
                "a string literal cannot appear in an expression",
            )),
            K::Identifier(name) => {
                self.ts.bump();
                if self.ts.eat(&K::LeftParen) {
                    let mut args = Vec::new();
                    if !self.ts.check(&K::RightParen) {
                        loop {
                            args.push(self.parse_expression()?);
                            if !self.ts.eat(&K::Comma) {
                                break;
                            }
                        }
                    }
                    let close = self.ts.expect(&K::RightParen)?;
                    let call =
                        IntegralExpr::call(name, args, token.location.to(close.location))?;
                    Ok(Expr::Integral(call))
                } else if self.ts.eat(&K::LeftBracket) {
                    let index = self.parse_expression()?;
                    let close = self.ts.expect(&K::RightBracket)?;
                    Ok(Expr::Integral(IntegralExpr::ArrayAccess {
                        name,
                        index: Box::new(index.into_integral()),
                        location: token.location.to(close.location),
                    }))
                } else {
                    Ok(Expr::Integral(IntegralExpr::Variable { name, location: token.location }))
                }
            }
            K::LeftParen => {
                self.ts.bump();
                let exp = self.parse_expression()?;
                self.ts.expect(&K::RightParen)?;
                Ok(exp)
            }
            _ => Err(SyntaxError::new(
                token.location,
                format!("expected expression but found {}", token.kind.describe()),
            )),
        }
    }
}

/// Restrict an expression to the assignable forms.
fn lvalue_of(exp: Expr) -> Result<LValue, SyntaxError> {
    match exp {
        Expr::Integral(IntegralExpr::Variable { name, location }) => {
            Ok(LValue::Variable { name, location })
        }
        Expr::Integral(IntegralExpr::ArrayAccess { name, index, location }) => {
            Ok(LValue::ArrayAccess { name, index, location })
        }
        other => Err(SyntaxError::new(
            other.location(),
            "assignment target must be a variable or an array element",
        )),
    }
}
