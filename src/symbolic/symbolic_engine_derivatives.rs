//! # Symbolic Engine Derivatives Module
//!
//! Analytical partial derivatives of symbolic expressions.
//!
//! ## Key Methods
//! - `diff(var)` - raw derivative tree built from the calculus rules
//! - `differentiate(var)` - derivative in simplified, deterministic form
//!
//! Opaque function symbols have no rules: differentiating one whose arguments depend
//! on the variable is an `UnsupportedOperation`.

use crate::errors::HessianError;
use crate::symbolic::numbers::Elementary;
use crate::symbolic::symbolic_engine::Expr;

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements the standard differentiation rules:
    /// - Power rule: d/dx(f^n) = n*f^(n-1)*f' for an exponent free of `var`
    /// - Exponential rule: d/dx(a^g) = a^g*ln(a)*g' for a base free of `var`
    /// - General power: d/dx(f^g) = f^g*(g'*ln(f) + g*f'/f)
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - f*g')/g^2
    /// - Chain rule through every elementary function
    ///
    /// # Arguments
    /// * `var` - Variable name to differentiate with respect to
    ///
    /// # Returns
    /// Unsimplified derivative tree, or `UnsupportedOperation` for an opaque function
    /// application that depends on `var`
    pub fn diff(&self, var: &str) -> Result<Expr, HessianError> {
        if self.is_constant() || !self.contains_variable(var) {
            return Ok(Expr::int(0));
        }
        let d = match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::int(1)
                } else {
                    Expr::int(0)
                }
            }
            Expr::Const(_) => Expr::int(0),
            Expr::Add(lhs, rhs) => lhs.diff(var)? + rhs.diff(var)?,
            Expr::Sub(lhs, rhs) => lhs.diff(var)? - rhs.diff(var)?,
            Expr::Neg(expr) => -expr.diff(var)?,
            Expr::Mul(lhs, rhs) => {
                lhs.diff(var)? * *rhs.clone() + *lhs.clone() * rhs.diff(var)?
            }
            Expr::Div(lhs, rhs) => {
                (lhs.diff(var)? * *rhs.clone() - *lhs.clone() * rhs.diff(var)?)
                    / rhs.as_ref().clone().pow(Expr::int(2))
            }
            Expr::Pow(base, exp) => {
                let base = base.as_ref();
                let exp = exp.as_ref();
                if !exp.contains_variable(var) {
                    exp.clone() * base.clone().pow(exp.clone() - Expr::int(1)) * base.diff(var)?
                } else if !base.contains_variable(var) {
                    self.clone() * Expr::Ln(base.clone().boxed()) * exp.diff(var)?
                } else {
                    self.clone()
                        * (exp.diff(var)? * Expr::Ln(base.clone().boxed())
                            + exp.clone() * base.diff(var)? / base.clone())
                }
            }
            Expr::Func(name, _) => {
                return Err(HessianError::UnsupportedOperation(format!(
                    "no differentiation rule for function '{}'",
                    name
                )));
            }
            other => match other.as_elementary() {
                Some((func, arg)) => elementary_derivative(func, arg) * arg.diff(var)?,
                None => {
                    return Err(HessianError::UnsupportedOperation(format!(
                        "cannot differentiate {}",
                        other
                    )));
                }
            },
        };
        Ok(d)
    } // end of diff

    /// Partial derivative with respect to `var`, simplified into canonical form.
    pub fn differentiate(&self, var: &str) -> Result<Expr, HessianError> {
        Ok(self.diff(var)?.simplify())
    }
}

/// Outer derivative of an elementary function, evaluated at `arg`.
fn elementary_derivative(func: Elementary, arg: &Expr) -> Expr {
    let a = || arg.clone();
    let one = || Expr::int(1);
    let two = || Expr::int(2);
    match func {
        Elementary::Exp => Expr::Exp(a().boxed()),
        Elementary::Ln => one() / a(),
        Elementary::Sin => Expr::cos(a().boxed()),
        Elementary::Cos => -Expr::sin(a().boxed()),
        Elementary::Tg => one() / Expr::cos(a().boxed()).pow(two()),
        Elementary::Ctg => -(one() / Expr::sin(a().boxed()).pow(two())),
        Elementary::Arcsin => one() / (one() - a().pow(two())).pow(Expr::rational(1, 2)),
        Elementary::Arccos => -(one() / (one() - a().pow(two())).pow(Expr::rational(1, 2))),
        Elementary::Arctg => one() / (one() + a().pow(two())),
        Elementary::Arcctg => -(one() / (one() + a().pow(two()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Expr {
        Expr::parse_expression(text, ("x", "y")).unwrap()
    }

    #[test]
    fn test_polynomial_partials() {
        let f = parse("x^3 - 3*x*y + y^2");
        assert_eq!(f.differentiate("x").unwrap(), parse("3*x^2 - 3*y").simplify());
        assert_eq!(f.differentiate("y").unwrap(), parse("-3*x + 2*y").simplify());
        assert_eq!(f.differentiate("x").unwrap().to_string(), "3 * x^2 - 3 * y");
    }

    #[test]
    fn test_chain_rule() {
        let f = parse("sin(x*y)");
        let dfdx = f.differentiate("x").unwrap();
        assert!(dfdx.is_equivalent(&parse("y*cos(x*y)")));
        let f = parse("exp(x^2)");
        assert!(f.differentiate("x").unwrap().is_equivalent(&parse("2*x*exp(x^2)")));
        let f = parse("ln(x)");
        assert!(f.differentiate("x").unwrap().is_equivalent(&parse("1/x")));
    }

    #[test]
    fn test_general_power() {
        let f = parse("x^y");
        let dfdy = f.differentiate("y").unwrap();
        assert!(dfdy.is_equivalent(&parse("x^y*ln(x)")));
        let f = parse("2^x");
        assert!(f.differentiate("x").unwrap().is_equivalent(&parse("2^x*ln(2)")));
    }

    #[test]
    fn test_quotient_rule() {
        let f = parse("x/y");
        assert!(f.differentiate("y").unwrap().is_equivalent(&parse("-x/y^2")));
    }

    #[test]
    fn test_opaque_function() {
        let f = parse("f(x) + y^2");
        assert!(matches!(
            f.differentiate("x"),
            Err(HessianError::UnsupportedOperation(_))
        ));
        assert_eq!(f.differentiate("y").unwrap(), parse("2*y").simplify());
    }
}
