// ----------------------------
// File: src/front/semantics/const_eval.rs
// ----------------------------
//! Compile-time evaluation of integral expressions.

use crate::front::ast::{BinaryOp, IntegralExpr, UnaryOp};

/// Evaluate an integral expression to a constant where statically possible.
/// Arithmetic follows two's-complement 32-bit semantics. Division by a
/// constant zero is not precomputable (the runtime instruction decides).
pub fn precompute(exp: &IntegralExpr) -> Option<i32> {
    match exp {
        IntegralExpr::Constant { value, .. } => Some(*value),
        IntegralExpr::Unary { op, exp, .. } => {
            let a = precompute(exp)?;
            Some(match op {
                UnaryOp::Plus => a,
                UnaryOp::Negate => a.wrapping_neg(),
                UnaryOp::Complement => !a,
            })
        }
        IntegralExpr::Binary { op, exp1, exp2, .. } => {
            let a = precompute(exp1)?;
            let b = precompute(exp2)?;
            match op {
                BinaryOp::Add => Some(a.wrapping_add(b)),
                BinaryOp::Sub => Some(a.wrapping_sub(b)),
                BinaryOp::Mul => Some(a.wrapping_mul(b)),
                BinaryOp::Div => (b != 0).then(|| a.wrapping_div(b)),
                BinaryOp::And => Some(a & b),
                BinaryOp::Or => Some(a | b),
                BinaryOp::Xor => Some(a ^ b),
            }
        }
        IntegralExpr::Variable { .. }
        | IntegralExpr::ArrayAccess { .. }
        | IntegralExpr::Assignment { .. }
        | IntegralExpr::Call { .. }
        | IntegralExpr::Cast { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::front::ast::Expr;
    use crate::front::token::Location;

    fn constant(value: i32) -> Expr {
        Expr::Integral(IntegralExpr::Constant { value, location: Location::default() })
    }

    fn binary(op: BinaryOp, a: Expr, b: Expr) -> Expr {
        Expr::Integral(IntegralExpr::binary(op, a, b))
    }

    #[test]
    fn folds_arithmetic() {
        let e = binary(BinaryOp::Add, constant(2), binary(BinaryOp::Mul, constant(3), constant(4)));
        assert_eq!(precompute(&e.into_integral()), Some(14));
    }

    #[test]
    fn folds_unary_operators() {
        let neg = IntegralExpr::unary(UnaryOp::Negate, constant(5), Location::default());
        assert_eq!(precompute(&neg), Some(-5));
        let not = IntegralExpr::unary(UnaryOp::Complement, constant(0), Location::default());
        assert_eq!(precompute(&not), Some(-1));
    }

    #[test]
    fn division_by_constant_zero_is_not_precomputable() {
        let e = binary(BinaryOp::Div, constant(1), constant(0));
        assert_eq!(precompute(&e.into_integral()), None);
    }

    #[test]
    fn wraps_in_32_bits() {
        let e = binary(BinaryOp::Add, constant(i32::MAX), constant(1));
        assert_eq!(precompute(&e.into_integral()), Some(i32::MIN));
        let e = binary(BinaryOp::Mul, constant(1 << 30), constant(4));
        assert_eq!(precompute(&e.into_integral()), Some(0));
    }

    #[test]
    fn runtime_expressions_are_opaque() {
        let variable = || {
            Expr::Integral(IntegralExpr::Variable {
                name: "x".into(),
                location: Location::default(),
            })
        };
        assert_eq!(precompute(&variable().into_integral()), None);
        let sum = binary(BinaryOp::Add, variable(), constant(1));
        assert_eq!(precompute(&sum.into_integral()), None);
    }
}
