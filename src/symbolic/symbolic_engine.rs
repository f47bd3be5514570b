//! # Symbolic Engine Module
//!
//! Core expression type of the crate. Expressions are immutable trees over two
//! named variables; every transformation (substitution, differentiation,
//! simplification) returns a new tree.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Atoms**: `Var(String)` and `Const(Number)` - the numeric tower keeps constants exact
//!   as long as possible
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow`, `Neg`
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`, `ctg`, `arcsin`, `arccos`, `arctg`, `arcctg`
//! - **Opaque applications**: `Func(name, args)` for function symbols the engine does not know
//!
//! ### Key Methods
//! - `substitute(var, value)` - replace a variable and simplify
//! - `eval_number()` - numeric value of a variable-free expression
//! - `compare_sign()` - sign query with `Unknown` as a first-class answer
//! - `is_real()` - true for expressions that evaluate to a real constant
//!
//! Parsing lives in `parse_expr`, derivatives in `symbolic_engine_derivatives`,
//! simplification and algebraic equivalence in `symbolic_simplify`.

use crate::global::THRESHOLD;
use crate::symbolic::numbers::{Elementary, Number};
use itertools::Itertools;
use num::{BigRational, Signed, Zero};
use std::fmt;
use strum_macros::{Display, EnumIter};

/// Symbolic expression as an abstract syntax tree.
///
/// # Examples
/// ```rust, ignore
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::int(2)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "y")
    Var(String),
    /// Numerical constant, exact rational, real or complex
    Const(Number),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Negation: -expr
    Neg(Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    sin(Box<Expr>),
    cos(Box<Expr>),
    /// Tangent function, mathematical notation 'tg'
    tg(Box<Expr>),
    /// Cotangent function, mathematical notation 'ctg'
    ctg(Box<Expr>),
    arcsin(Box<Expr>),
    arccos(Box<Expr>),
    /// Arctangent function, mathematical notation 'arctg'
    arctg(Box<Expr>),
    /// Arccotangent function, mathematical notation 'arcctg'
    arcctg(Box<Expr>),
    /// Application of a function symbol with no known rules: kept opaque
    Func(String, Vec<Expr>),
}

/// Outcome of a symbolic sign query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum Sign {
    Positive,
    Negative,
    Zero,
    Unknown,
}

impl Expr {
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    pub fn int(value: i64) -> Expr {
        Expr::Const(Number::int(value))
    }

    pub fn rational(numer: i64, denom: i64) -> Expr {
        Expr::Const(Number::ratio(numer, denom))
    }

    pub fn real(value: f64) -> Expr {
        Expr::Const(Number::Real(value))
    }

    pub fn pow(self, exponent: Expr) -> Expr {
        Expr::Pow(self.boxed(), exponent.boxed())
    }

    /// Builds the application of an elementary function to `arg`.
    pub fn elementary(func: Elementary, arg: Expr) -> Expr {
        let arg = arg.boxed();
        match func {
            Elementary::Exp => Expr::Exp(arg),
            Elementary::Ln => Expr::Ln(arg),
            Elementary::Sin => Expr::sin(arg),
            Elementary::Cos => Expr::cos(arg),
            Elementary::Tg => Expr::tg(arg),
            Elementary::Ctg => Expr::ctg(arg),
            Elementary::Arcsin => Expr::arcsin(arg),
            Elementary::Arccos => Expr::arccos(arg),
            Elementary::Arctg => Expr::arctg(arg),
            Elementary::Arcctg => Expr::arcctg(arg),
        }
    }

    /// Splits an elementary function application into the function and its argument.
    pub fn as_elementary(&self) -> Option<(Elementary, &Expr)> {
        let res = match self {
            Expr::Exp(a) => (Elementary::Exp, a),
            Expr::Ln(a) => (Elementary::Ln, a),
            Expr::sin(a) => (Elementary::Sin, a),
            Expr::cos(a) => (Elementary::Cos, a),
            Expr::tg(a) => (Elementary::Tg, a),
            Expr::ctg(a) => (Elementary::Ctg, a),
            Expr::arcsin(a) => (Elementary::Arcsin, a),
            Expr::arccos(a) => (Elementary::Arccos, a),
            Expr::arctg(a) => (Elementary::Arctg, a),
            Expr::arcctg(a) => (Elementary::Arcctg, a),
            _ => return None,
        };
        Some((res.0, res.1.as_ref()))
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Expr::Const(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            Expr::Const(Number::Rational(r)) => Some(r),
            _ => None,
        }
    }

    /// true only for an exact or floating zero constant
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(n) if n.is_zero())
    }

    pub fn is_one(&self) -> bool {
        matches!(self, Expr::Const(n) if n.is_one())
    }

    /// Rebuilds the node with `f` applied to every direct child.
    pub fn map_children<F: FnMut(&Expr) -> Expr>(&self, mut f: F) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(a, b) => Expr::Add(f(a).boxed(), f(b).boxed()),
            Expr::Sub(a, b) => Expr::Sub(f(a).boxed(), f(b).boxed()),
            Expr::Mul(a, b) => Expr::Mul(f(a).boxed(), f(b).boxed()),
            Expr::Div(a, b) => Expr::Div(f(a).boxed(), f(b).boxed()),
            Expr::Pow(a, b) => Expr::Pow(f(a).boxed(), f(b).boxed()),
            Expr::Neg(a) => Expr::Neg(f(a).boxed()),
            Expr::Func(name, args) => Expr::Func(name.clone(), args.iter().map(&mut f).collect()),
            other => match other.as_elementary() {
                Some((func, arg)) => Expr::elementary(func, f(arg)),
                None => other.clone(),
            },
        }
    }

    /// Direct children of the node, in order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Var(_) | Expr::Const(_) => Vec::new(),
            Expr::Add(a, b)
            | Expr::Sub(a, b)
            | Expr::Mul(a, b)
            | Expr::Div(a, b)
            | Expr::Pow(a, b) => vec![a.as_ref(), b.as_ref()],
            Expr::Neg(a) => vec![a.as_ref()],
            Expr::Func(_, args) => args.iter().collect(),
            other => other.as_elementary().map(|(_, a)| vec![a]).unwrap_or_default(),
        }
    }

    pub fn contains_variable(&self, var: &str) -> bool {
        match self {
            Expr::Var(name) => name == var,
            _ => self.children().iter().any(|c| c.contains_variable(var)),
        }
    }

    /// true when no variable occurs anywhere in the tree
    pub fn is_constant(&self) -> bool {
        match self {
            Expr::Var(_) => false,
            _ => self.children().iter().all(|c| c.is_constant()),
        }
    }

    /// Replaces every occurrence of `var` with `value`, without simplifying.
    pub fn substitute_variable(&self, var: &str, value: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => value.clone(),
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            _ => self.map_children(|c| c.substitute_variable(var, value)),
        }
    }

    /// Replaces every occurrence of `var` with `value` and simplifies the result.
    pub fn substitute(&self, var: &str, value: &Expr) -> Expr {
        self.substitute_variable(var, value).simplify()
    }

    /// Substitutes several variables at once, then simplifies once.
    pub fn substitute_all(&self, values: &[(&str, &Expr)]) -> Expr {
        values
            .iter()
            .fold(self.clone(), |acc, (var, value)| acc.substitute_variable(var, value))
            .simplify()
    }

    /// Numeric value of a variable-free expression. `None` when a variable or an
    /// opaque function remains, or when evaluation hits a pole (`1/0`, `ln(0)`).
    pub fn eval_number(&self) -> Option<Number> {
        match self {
            Expr::Const(n) => Some(n.clone()),
            Expr::Var(_) | Expr::Func(..) => None,
            Expr::Add(a, b) => Some(a.eval_number()?.add(&b.eval_number()?)),
            Expr::Sub(a, b) => Some(a.eval_number()?.sub(&b.eval_number()?)),
            Expr::Mul(a, b) => Some(a.eval_number()?.mul(&b.eval_number()?)),
            Expr::Div(a, b) => a.eval_number()?.div(&b.eval_number()?),
            Expr::Pow(a, b) => a.eval_number()?.pow(&b.eval_number()?),
            Expr::Neg(a) => Some(a.eval_number()?.neg()),
            other => {
                let (func, arg) = other.as_elementary()?;
                arg.eval_number()?.apply(func)
            }
        }
    }

    /// Sign of the expression using the default zero tolerance.
    pub fn compare_sign(&self) -> Sign {
        self.compare_sign_with_tolerance(THRESHOLD)
    }

    /// Sign of the expression. Exact rationals get their exact sign; floating values
    /// whose magnitude does not exceed `zero_tolerance` are `Zero`. Complex values,
    /// NaN and anything that still depends on a variable are `Unknown`.
    pub fn compare_sign_with_tolerance(&self, zero_tolerance: f64) -> Sign {
        let simplified = self.simplify();
        if !simplified.is_constant() {
            return Sign::Unknown;
        }
        match simplified.eval_number() {
            Some(Number::Rational(r)) => {
                if r.is_zero() {
                    Sign::Zero
                } else if r.is_positive() {
                    Sign::Positive
                } else {
                    Sign::Negative
                }
            }
            Some(Number::Real(v)) => {
                if v.is_nan() {
                    Sign::Unknown
                } else if v.abs() <= zero_tolerance {
                    Sign::Zero
                } else if v > 0.0 {
                    Sign::Positive
                } else {
                    Sign::Negative
                }
            }
            _ => Sign::Unknown,
        }
    }

    /// true when the expression simplifies to a rational or real constant
    pub fn is_real(&self) -> bool {
        let simplified = self.simplify();
        simplified.is_constant()
            && match simplified.eval_number() {
                Some(Number::Rational(_)) => true,
                Some(Number::Real(v)) => !v.is_nan(),
                _ => false,
            }
    }

    /// binding strength used to decide where parentheses are needed
    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Neg(_) => 3,
            Expr::Pow(..) => 4,
            Expr::Const(Number::Complex(_)) => 1,
            Expr::Const(Number::Rational(r)) if !r.is_integer() => 2,
            Expr::Const(n) if n.is_negative() => 3,
            _ => 5,
        }
    }

    fn is_negative_leading(&self) -> bool {
        self.precedence() == 3
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.precedence() < min {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }

    fn fmt_additive_rhs(&self, f: &mut fmt::Formatter<'_>, min: u8) -> fmt::Result {
        if self.is_negative_leading() {
            write!(f, "({})", self)
        } else {
            self.fmt_operand(f, min)
        }
    }
}

/// Human readable form with the minimal parentheses, `^` for powers.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => {
                lhs.fmt_operand(f, 1)?;
                write!(f, " + ")?;
                rhs.fmt_additive_rhs(f, 1)
            }
            Expr::Sub(lhs, rhs) => {
                lhs.fmt_operand(f, 1)?;
                write!(f, " - ")?;
                rhs.fmt_additive_rhs(f, 2)
            }
            Expr::Mul(lhs, rhs) => {
                lhs.fmt_operand(f, 2)?;
                write!(f, " * ")?;
                rhs.fmt_operand(f, 4)
            }
            Expr::Div(lhs, rhs) => {
                lhs.fmt_operand(f, 2)?;
                write!(f, " / ")?;
                rhs.fmt_operand(f, 4)
            }
            Expr::Pow(base, exp) => {
                base.fmt_operand(f, 5)?;
                write!(f, "^")?;
                exp.fmt_operand(f, 4)
            }
            Expr::Neg(expr) => {
                write!(f, "-")?;
                expr.fmt_operand(f, 2)
            }
            Expr::Func(name, args) => write!(f, "{}({})", name, args.iter().join(", ")),
            other => match other.as_elementary() {
                Some((func, arg)) => write!(f, "{}({})", func, arg),
                None => Ok(()),
            },
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Neg(self.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_minimal_parentheses() {
        let x = Expr::var("x");
        let y = Expr::var("y");
        let e = x.clone().pow(Expr::int(3)) - Expr::int(3) * x.clone() * y.clone() + y.clone().pow(Expr::int(2));
        assert_eq!(e.to_string(), "x^3 - 3 * x * y + y^2");
        let e = (x.clone() + y.clone()) * (x.clone() - y.clone());
        assert_eq!(e.to_string(), "(x + y) * (x - y)");
        let e = x.clone() - (y.clone() - Expr::int(1));
        assert_eq!(e.to_string(), "x - (y - 1)");
        let e = (-x.clone()).pow(Expr::rational(1, 2));
        assert_eq!(e.to_string(), "(-x)^(1/2)");
        let e = Expr::sin(x.clone().boxed()) / Expr::int(2);
        assert_eq!(e.to_string(), "sin(x) / 2");
    }

    #[test]
    fn test_substitute_folds_constants() {
        let x = Expr::var("x");
        let e = x.clone() * x.clone() + Expr::int(1);
        assert_eq!(e.substitute("x", &Expr::int(3)), Expr::int(10));
        assert_eq!(e.substitute("y", &Expr::int(3)), e.simplify());
    }

    #[test]
    fn test_contains_variable_and_is_constant() {
        let e = Expr::Exp(Expr::var("y").boxed()) + Expr::int(2);
        assert!(e.contains_variable("y"));
        assert!(!e.contains_variable("x"));
        assert!(!e.is_constant());
        assert!(Expr::sin(Expr::int(1).boxed()).is_constant());
    }

    #[test]
    fn test_compare_sign() {
        assert_eq!(Expr::int(4).compare_sign(), Sign::Positive);
        assert_eq!(Expr::int(-9).compare_sign(), Sign::Negative);
        assert_eq!(Expr::int(0).compare_sign(), Sign::Zero);
        assert_eq!(Expr::real(1e-14).compare_sign(), Sign::Zero);
        assert_eq!(Expr::real(-0.25).compare_sign(), Sign::Negative);
        assert_eq!(Expr::var("x").compare_sign(), Sign::Unknown);
        assert_eq!((Expr::int(1) / Expr::int(0)).compare_sign(), Sign::Unknown);
        assert_eq!(Expr::sin(Expr::int(1).boxed()).compare_sign(), Sign::Positive);
        let sqrt2 = Expr::int(2).pow(Expr::rational(1, 2));
        assert_eq!((sqrt2 - Expr::int(1)).compare_sign(), Sign::Positive);
    }

    #[test]
    fn test_is_real() {
        assert!(Expr::rational(3, 2).is_real());
        assert!(Expr::real(0.5).is_real());
        assert!(!Expr::var("x").is_real());
        assert!(!Expr::int(-1).pow(Expr::rational(1, 2)).is_real());
        assert!(!Expr::Const(Number::Complex(num_complex::Complex64::new(0.0, 1.0))).is_real());
    }
}
