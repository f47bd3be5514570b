use crate::critical_points::critical_point_solver::Point;
use crate::errors::HessianError;
use crate::symbolic::symbolic_engine::Expr;
use log::debug;

/// The three distinct second partial derivatives of a function of two variables.
#[derive(Clone, Debug, PartialEq)]
pub struct SecondPartials {
    pub fxx: Expr,
    pub fyy: Expr,
    pub fxy: Expr,
}

impl SecondPartials {
    /// Differentiates the gradient once more; `fxy` is taken from `fx`.
    pub fn from_gradient(fx: &Expr, fy: &Expr, variables: (&str, &str)) -> Result<Self, HessianError> {
        let (v1, v2) = variables;
        let partials = SecondPartials {
            fxx: fx.differentiate(v1)?,
            fyy: fy.differentiate(v2)?,
            fxy: fx.differentiate(v2)?,
        };
        debug!(
            "second partials: fxx = {}, fyy = {}, fxy = {}",
            partials.fxx, partials.fyy, partials.fxy
        );
        Ok(partials)
    }

    /// `fxx * fyy - fxy^2` as a function of the variables
    pub fn determinant(&self) -> Expr {
        (self.fxx.clone() * self.fyy.clone() - self.fxy.clone().pow(Expr::int(2))).simplify()
    }

    /// rows of the symmetric Hessian matrix
    pub fn matrix(&self) -> [[&Expr; 2]; 2] {
        [[&self.fxx, &self.fxy], [&self.fxy, &self.fyy]]
    }
}

/// Hessian determinant and `fxx` at a point.
///
/// The entries are substituted first and combined afterwards:
/// `det = fxx(p) * fyy(p) - fxy(p)^2`. Both results stay symbolic when the point
/// or the partials cannot be reduced to numbers.
pub fn evaluate_hessian(fxx: &Expr, fyy: &Expr, fxy: &Expr, point: &Point) -> (Expr, Expr) {
    let values = point.assignments();
    let fxx_at = fxx.substitute_all(&values);
    let fyy_at = fyy.substitute_all(&values);
    let fxy_at = fxy.substitute_all(&values);
    let determinant = (fxx_at.clone() * fyy_at - fxy_at.pow(Expr::int(2))).simplify();
    (determinant, fxx_at)
}
