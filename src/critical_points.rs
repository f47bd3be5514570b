/// dense univariate polynomials over the rationals: gcd, square-free part, roots
pub mod univariate;
///______________________________________________________________________________________________
/// polynomials in two variables and resultants by evaluation and interpolation
pub mod resultant;
///______________________________________________________________________________________________
/// # Critical point solver
/// the system `fx = 0, fy = 0` is reduced to univariate eliminants, their roots are found
/// exactly where possible and numerically otherwise, and the coordinates are paired up
///# Example
/// ```
/// use RustedHessian::config::HessianConfig;
/// use RustedHessian::critical_points::critical_point_solver::solve_critical_points;
/// use RustedHessian::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("x^2 + y^2", ("x", "y")).unwrap();
/// let fx = f.differentiate("x").unwrap();
/// let fy = f.differentiate("y").unwrap();
/// let points = solve_critical_points(&fx, &fy, ("x", "y"), &HessianConfig::default()).unwrap();
/// assert_eq!(points.len(), 1);
/// assert_eq!(points[0].to_string(), "(x = 0, y = 0)");
/// ```
pub mod critical_point_solver;
