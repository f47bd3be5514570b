/// numeric tower of constants: exact rationals, reals, complex numbers
pub mod numbers;
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedHessian::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("x^2*exp(y) + sin(x*y)", ("x", "y")).unwrap();
/// println!("parsed expression {}", f);
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) represents expressions as trees over two variables
/// 2) substitutes values, evaluates constants and answers sign queries
/// 3) turns a symbolic expression into a string for printing and control results
///# Example#
/// ```
/// use RustedHessian::symbolic::symbolic_engine::{Expr, Sign};
/// let f = Expr::parse_expression("x**3 - 3*x*y + y**2", ("x", "y")).unwrap();
/// // differentiate with respect to x and y
/// let df_dx = f.differentiate("x").unwrap();
/// let df_dy = f.differentiate("y").unwrap();
/// assert_eq!(df_dx.to_string(), "3 * x^2 - 3 * y");
/// assert_eq!(df_dy.to_string(), "-3 * x + 2 * y");
/// // value of the second derivative at x = 3/2
/// let fxx = df_dx.differentiate("x").unwrap();
/// let at_point = fxx.substitute("x", &Expr::rational(3, 2));
/// assert_eq!(at_point, Expr::int(9));
/// assert_eq!(at_point.compare_sign(), Sign::Positive);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
pub mod symbolic_engine_derivatives;
/// constant folding, canonical form and algebraic equivalence
pub mod symbolic_simplify;
///______________________________________________________________________________________________________________________________________________
/// sparse multivariate polynomials and rational functions with exact coefficients,
/// conversion of expressions into them and back
/// _____________________________________________________________________________________________________________________________________________
pub mod polynomial;
#[cfg(test)]
mod symbolic_engine_tests;
