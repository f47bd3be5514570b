//! Solving `fx = 0, fy = 0` for the critical points of a function of two variables.
//!
//! Both gradient components are brought into rational-function form over the two
//! variables; their numerators `P`, `Q` form the polynomial system. The `x`
//! coordinates of all solutions are roots of `Res_y(P, Q)`, the `y` coordinates roots
//! of `Res_x(P, Q)`. Exact rational `x` roots are completed with the roots of
//! `gcd(P(x, y), Q(x, y))`; approximate ones are paired with the `y` roots whose
//! residuals are small and polished with Newton steps in two variables. Points where
//! a denominator of the gradient vanishes are not critical points and are dropped.

use crate::config::HessianConfig;
use crate::critical_points::resultant::{BiPoly, residual_within, resultant_x, resultant_y};
use crate::critical_points::univariate::{Root, UniPoly};
use crate::errors::HessianError;
use crate::symbolic::numbers::Number;
use crate::symbolic::polynomial::{ExprConverter, MultiPoly};
use crate::symbolic::symbolic_engine::Expr;
use itertools::Itertools;
use log::{debug, info};
use num::{ToPrimitive, Zero};
use num_complex::Complex64;
use std::cmp::Ordering;
use std::fmt;

/// relative distance under which two approximate points are the same point
const SAME_POINT_TOLERANCE: f64 = 1e-9;

/// A point of the plane with one coordinate expression per variable.
#[derive(Clone, Debug, PartialEq)]
pub struct Point {
    pub variables: (String, String),
    pub x: Expr,
    pub y: Expr,
}

impl Point {
    pub fn new(variables: (&str, &str), x: Expr, y: Expr) -> Self {
        Point {
            variables: (variables.0.to_string(), variables.1.to_string()),
            x,
            y,
        }
    }

    /// both coordinates are real numbers
    pub fn is_real(&self) -> bool {
        self.x.is_real() && self.y.is_real()
    }

    /// `[(first variable, x), (second variable, y)]`, ready for substitution
    pub fn assignments(&self) -> [(&str, &Expr); 2] {
        [
            (self.variables.0.as_str(), &self.x),
            (self.variables.1.as_str(), &self.y),
        ]
    }

    fn numeric(&self) -> (Complex64, Complex64) {
        let value = |e: &Expr| {
            e.eval_number()
                .map_or(Complex64::new(f64::NAN, f64::NAN), |n| n.to_complex())
        };
        (value(&self.x), value(&self.y))
    }

    fn order(&self, other: &Point) -> Ordering {
        let (ax, ay) = self.numeric();
        let (bx, by) = other.numeric();
        ax.re
            .total_cmp(&bx.re)
            .then(ax.im.total_cmp(&bx.im))
            .then(ay.re.total_cmp(&by.re))
            .then(ay.im.total_cmp(&by.im))
    }

    fn same_as(&self, other: &Point) -> bool {
        if self == other {
            return true;
        }
        let (ax, ay) = self.numeric();
        let (bx, by) = other.numeric();
        let close = |a: Complex64, b: Complex64| {
            (a - b).norm() <= SAME_POINT_TOLERANCE * a.norm().max(b.norm()).max(1.0)
        };
        close(ax, bx) && close(ay, by)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({} = {}, {} = {})",
            self.variables.0, self.x, self.variables.1, self.y
        )
    }
}

/// Numerators and denominators of the gradient as polynomials in the two variables.
struct GradientSystem {
    p: BiPoly,
    q: BiPoly,
    p_den: BiPoly,
    q_den: BiPoly,
}

fn unsolvable(msg: String) -> HessianError {
    HessianError::Unsolvable(msg)
}

/// gcd of two polynomials in a single variable; a non-constant one means whole lines
/// of common zeros
fn check_one_variable_system(p: &UniPoly, q: &UniPoly, var: &str) -> Result<Vec<(Root, Root)>, HessianError> {
    let g = p.gcd(q);
    if g.is_constant() {
        Ok(Vec::new())
    } else {
        Err(unsolvable(format!(
            "both gradient components depend on {} alone and share a factor: infinitely many critical points",
            var
        )))
    }
}

fn polish(p: &BiPoly, q: &BiPoly, x0: Complex64, y0: Complex64) -> (Complex64, Complex64) {
    let residual = |x, y| p.eval_complex(x, y).norm() + q.eval_complex(x, y).norm();
    let (mut x, mut y) = (x0, y0);
    for _ in 0..3 {
        let (f, g) = (p.eval_complex(x, y), q.eval_complex(x, y));
        let (px, py) = p.gradient_complex(x, y);
        let (qx, qy) = q.gradient_complex(x, y);
        let det = px * qy - py * qx;
        if det.norm() == 0.0 {
            break;
        }
        let dx = (f * qy - py * g) / det;
        let dy = (px * g - f * qx) / det;
        let (nx, ny) = (x - dx, y - dy);
        if residual(nx, ny) < residual(x, y) {
            (x, y) = (nx, ny);
        } else {
            break;
        }
    }
    if x0.im == 0.0 && y0.im == 0.0 {
        (Complex64::new(x.re, 0.0), Complex64::new(y.re, 0.0))
    } else {
        (x, y)
    }
}

/// An approximate `x` root matched with a root of the `y` eliminant, after polishing.
struct Pairing {
    x_index: usize,
    y_index: usize,
    x: Complex64,
    y: Complex64,
    residual: f64,
}

impl GradientSystem {
    fn solve(&self, config: &HessianConfig) -> Result<Vec<(Root, Root)>, HessianError> {
        let (p, q) = (&self.p, &self.q);
        if p.is_zero() && q.is_zero() {
            return Err(unsolvable(
                "the gradient vanishes identically: every point is critical".to_string(),
            ));
        }
        if p.is_zero() || q.is_zero() {
            let other = if p.is_zero() { q } else { p };
            if other.is_constant() {
                return Ok(Vec::new());
            }
            return Err(unsolvable(
                "one gradient component vanishes identically: the critical points form a curve"
                    .to_string(),
            ));
        }
        if p.is_constant() || q.is_constant() {
            return Ok(Vec::new());
        }
        if p.degree_y() == 0 && q.degree_y() == 0 {
            return check_one_variable_system(&p.coeffs[0], &q.coeffs[0], "the first variable");
        }
        let (ps, qs) = (p.swap(), q.swap());
        if ps.degree_y() == 0 && qs.degree_y() == 0 {
            return check_one_variable_system(&ps.coeffs[0], &qs.coeffs[0], "the second variable");
        }

        let rx = resultant_y(p, q, config.max_degree).map_err(unsolvable)?;
        let ry = resultant_x(p, q, config.max_degree).map_err(unsolvable)?;
        if rx.is_zero() || ry.is_zero() {
            return Err(unsolvable(
                "the gradient components share a common factor: infinitely many critical points"
                    .to_string(),
            ));
        }
        let rx = rx.square_free();
        let ry = ry.square_free();
        debug!(
            "eliminants: degree {:?} in the first variable, {:?} in the second",
            rx.degree(),
            ry.degree()
        );
        let xs = rx.find_roots(config.max_root_iterations).map_err(unsolvable)?;
        let ys = ry.find_roots(config.max_root_iterations).map_err(unsolvable)?;

        let mut solutions = Vec::new();
        let mut paired: Vec<Pairing> = Vec::new();
        for (i, xi) in xs.iter().enumerate() {
            match xi {
                Root::Exact(a) => {
                    let g = p.eval_x(a).gcd(&q.eval_x(a));
                    if g.is_zero() {
                        return Err(unsolvable(format!(
                            "the gradient vanishes on the whole line where the first variable is {}",
                            a
                        )));
                    }
                    // constant gcd: the root of the eliminant is a solution at infinity
                    if g.is_constant() {
                        continue;
                    }
                    for eta in g.find_roots(config.max_root_iterations).map_err(unsolvable)? {
                        solutions.push((xi.clone(), eta));
                    }
                }
                Root::Approx(z) => {
                    for (j, eta) in ys.iter().enumerate() {
                        let w = eta.value();
                        let fits = residual_within(
                            p.eval_complex(*z, w),
                            p.magnitude(*z, w),
                            config.residual_tolerance,
                        ) && residual_within(
                            q.eval_complex(*z, w),
                            q.magnitude(*z, w),
                            config.residual_tolerance,
                        );
                        if fits {
                            let (zx, zy) = polish(p, q, *z, w);
                            let residual =
                                p.eval_complex(zx, zy).norm() + q.eval_complex(zx, zy).norm();
                            paired.push(Pairing {
                                x_index: i,
                                y_index: j,
                                x: zx,
                                y: zy,
                                residual,
                            });
                        }
                    }
                }
            }
        }
        // every pairing of one root reuses the value polished best among its pairings
        let best = |same_root: &dyn Fn(&Pairing) -> bool| {
            paired
                .iter()
                .filter(|c| same_root(c))
                .min_by(|a, b| a.residual.total_cmp(&b.residual))
        };
        for c in &paired {
            let x = best(&|o: &Pairing| o.x_index == c.x_index).map_or(c.x, |b| b.x);
            let eta = match &ys[c.y_index] {
                Root::Exact(b) => Root::Exact(b.clone()),
                Root::Approx(_) => {
                    Root::Approx(best(&|o: &Pairing| o.y_index == c.y_index).map_or(c.y, |b| b.y))
                }
            };
            solutions.push((Root::Approx(x), eta));
        }
        Ok(solutions
            .into_iter()
            .map(|(xr, yr)| {
                (
                    snap_to_zero(xr, config.zero_tolerance),
                    snap_to_zero(yr, config.zero_tolerance),
                )
            })
            .filter(|(xr, yr)| !self.on_pole(xr, yr, config.residual_tolerance))
            .collect())
    }

    /// true when a denominator of the gradient vanishes at the point
    fn on_pole(&self, xr: &Root, yr: &Root, tolerance: f64) -> bool {
        [&self.p_den, &self.q_den].iter().any(|den| {
            if let (Root::Exact(a), Root::Exact(b)) = (xr, yr) {
                return den.eval_exact(a, b).is_zero();
            }
            let (x, y) = (xr.value(), yr.value());
            residual_within(den.eval_complex(x, y), den.magnitude(x, y), tolerance)
        })
    }
}

/// zeroes the parts of an approximate root that are noise relative to its magnitude
fn snap_to_zero(root: Root, tolerance: f64) -> Root {
    match root {
        Root::Approx(z) => {
            let bound = tolerance * z.norm().max(1.0);
            let part = |v: f64| if v.abs() <= bound { 0.0 } else { v };
            Root::Approx(Complex64::new(part(z.re), part(z.im)))
        }
        exact => exact,
    }
}

/// Sorts the points and drops every point that repeats one kept before it.
fn sorted_unique(mut points: Vec<Point>) -> Vec<Point> {
    points.sort_by(|a, b| a.order(b));
    let mut unique: Vec<Point> = Vec::with_capacity(points.len());
    for point in points {
        if !unique.iter().any(|kept| kept.same_as(&point)) {
            unique.push(point);
        }
    }
    unique
}

fn coordinate(root: &Root, inexact: bool) -> Expr {
    match root {
        Root::Exact(q) if inexact => Expr::real(q.to_f64().unwrap_or(f64::NAN)),
        Root::Exact(q) => Expr::Const(Number::Rational(q.clone())),
        Root::Approx(z) if z.im == 0.0 => Expr::real(z.re),
        Root::Approx(z) => Expr::Const(Number::Complex(*z)),
    }
}

/// Finds all points where both gradient components vanish.
///
/// # Arguments
/// * `fx`, `fy` - the gradient components
/// * `variables` - names of the two variables, in the order of the coordinates
/// * `config` - effort bounds and tolerances
///
/// # Returns
/// The critical points ordered by `(Re x, Im x, Re y, Im y)`, complex ones included;
/// an empty vector when there are none. `Unsolvable` for gradients that are not
/// rational in the variables, for infinitely many solutions and when the effort bounds
/// are exceeded.
pub fn solve_critical_points(
    fx: &Expr,
    fy: &Expr,
    variables: (&str, &str),
    config: &HessianConfig,
) -> Result<Vec<Point>, HessianError> {
    let mut converter = ExprConverter::with_variables(&[variables.0, variables.1])
        .numeric()
        .with_expansion_limit(u32::try_from(config.max_degree).unwrap_or(u32::MAX));
    let gx = converter.convert(fx).map_err(unsolvable)?;
    let gy = converter.convert(fy).map_err(unsolvable)?;
    if converter.atoms.len() > 2 {
        return Err(unsolvable(format!(
            "the gradient is not a rational function of {} and {}: it contains {}",
            variables.0,
            variables.1,
            converter.atoms[2..].iter().join(", ")
        )));
    }
    let as_bipoly = |p: &MultiPoly| {
        BiPoly::from_multi(p)
            .ok_or_else(|| unsolvable("the gradient is not polynomial in the variables".to_string()))
    };
    let system = GradientSystem {
        p: as_bipoly(&gx.num)?,
        q: as_bipoly(&gy.num)?,
        p_den: as_bipoly(&gx.den)?,
        q_den: as_bipoly(&gy.den)?,
    };
    let inexact = gx.inexact || gy.inexact;
    info!(
        "solving {} = 0, {} = 0 (degrees {} and {})",
        fx,
        fy,
        gx.num.total_degree(),
        gy.num.total_degree()
    );
    let solutions = system.solve(config)?;
    let points = sorted_unique(
        solutions
            .iter()
            .map(|(xr, yr)| Point::new(variables, coordinate(xr, inexact), coordinate(yr, inexact)))
            .collect(),
    );
    info!("{} critical point(s) found", points.len());
    for point in &points {
        debug!("critical point {}", point);
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const XY: (&str, &str) = ("x", "y");

    fn gradient(text: &str) -> (Expr, Expr) {
        let f = Expr::parse_expression(text, XY).unwrap();
        (f.differentiate("x").unwrap(), f.differentiate("y").unwrap())
    }

    fn solve(text: &str) -> Result<Vec<Point>, HessianError> {
        let (fx, fy) = gradient(text);
        solve_critical_points(&fx, &fy, XY, &HessianConfig::default())
    }

    #[test]
    fn test_paraboloid() {
        let points = solve("x**2 + y**2").unwrap();
        assert_eq!(points, vec![Point::new(XY, Expr::int(0), Expr::int(0))]);
    }

    #[test]
    fn test_mixed_cubic() {
        let points = solve("x**3 - 3*x*y + y**2").unwrap();
        assert_eq!(
            points,
            vec![
                Point::new(XY, Expr::int(0), Expr::int(0)),
                Point::new(XY, Expr::rational(3, 2), Expr::rational(9, 4)),
            ]
        );
        assert_eq!(points[1].to_string(), "(x = 3/2, y = 9/4)");
    }

    #[test]
    fn test_several_rational_points_are_ordered() {
        // fx = 3x^2 - 3, fy = 3y^2 - 12
        let points = solve("x^3 - 3*x + y^3 - 12*y").unwrap();
        let coords: Vec<(Expr, Expr)> = points.iter().map(|p| (p.x.clone(), p.y.clone())).collect();
        assert_eq!(
            coords,
            vec![
                (Expr::int(-1), Expr::int(-2)),
                (Expr::int(-1), Expr::int(2)),
                (Expr::int(1), Expr::int(-2)),
                (Expr::int(1), Expr::int(2)),
            ]
        );
    }

    #[test]
    fn test_no_critical_points() {
        assert!(solve("x + y").unwrap().is_empty());
        assert!(solve("x + y^2").unwrap().is_empty());
    }

    #[test]
    fn test_irrational_points_are_approximated() {
        // fx = x^3 - 2x: x in {0, -sqrt(2), sqrt(2)}
        let points = solve("x^4/4 - x^2 + y^2").unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], Point::new(XY, Expr::int(0), Expr::int(0)));
        match points[2].x {
            Expr::Const(Number::Real(v)) => assert_relative_eq!(v, std::f64::consts::SQRT_2, epsilon = 1e-10),
            ref other => panic!("unexpected coordinate {}", other),
        }
        assert!(points.iter().all(|p| p.is_real()));
    }

    #[test]
    fn test_shared_irrational_coordinates_are_identical() {
        // fx = 4x(x^2 - 2), fy = 4y(y^2 - 3): a 3 x 3 grid of points
        let points = solve("(x^2 - 2)^2 + (y^2 - 3)^2").unwrap();
        assert_eq!(points.len(), 9);
        for column in points.chunks(3) {
            assert!(column.iter().all(|p| p.x == column[0].x), "{:?}", column);
            let ys: Vec<f64> = column
                .iter()
                .map(|p| p.y.eval_number().unwrap().to_complex().re)
                .collect();
            assert!(ys[0] < ys[1] && ys[1] < ys[2], "{:?}", ys);
            assert_relative_eq!(ys[2], 3f64.sqrt(), epsilon = 1e-10);
        }
        assert_eq!(points[3].x, Expr::int(0));
    }

    #[test]
    fn test_round_off_is_snapped_to_zero() {
        // fx = 2x + 1/x vanishes at x = +-i/sqrt(2)
        let points = solve("x^2 + y^2 + ln(x)").unwrap();
        assert_eq!(points.len(), 2);
        for point in &points {
            match point.x {
                Expr::Const(Number::Complex(z)) => {
                    assert_eq!(z.re, 0.0);
                    assert_relative_eq!(z.im.abs(), 0.5f64.sqrt(), epsilon = 1e-10);
                }
                ref other => panic!("unexpected coordinate {}", other),
            }
            assert_eq!(point.y, Expr::int(0));
        }
    }

    #[test]
    fn test_repeated_points_are_dropped_even_when_not_adjacent() {
        let point = |x: f64, y: f64| Point::new(XY, Expr::real(x), Expr::real(y));
        let points = sorted_unique(vec![
            point(1.0 + 2e-13, 1e-14),
            point(1.0 + 1e-13, -5.0),
            point(1.0, 0.0),
            point(-3.0, 0.0),
        ]);
        assert_eq!(
            points,
            vec![point(-3.0, 0.0), point(1.0, 0.0), point(1.0 + 1e-13, -5.0)]
        );
    }

    #[test]
    fn test_complex_points_are_returned() {
        let points = solve("x^3/3 + x + y^2").unwrap();
        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|p| !p.is_real()));
    }

    #[test]
    fn test_infinitely_many_points() {
        assert!(matches!(solve("(x - y)^2"), Err(HessianError::Unsolvable(_))));
        assert!(matches!(solve("x^2"), Err(HessianError::Unsolvable(_))));
        assert!(matches!(solve("5"), Err(HessianError::Unsolvable(_))));
    }

    #[test]
    fn test_transcendental_gradient_is_unsolvable() {
        assert!(matches!(solve("sin(x) + y^2"), Err(HessianError::Unsolvable(_))));
    }

    #[test]
    fn test_rational_gradient() {
        // fx = (x^2 - 1)/x^2, fy = 2y: zero at x = +-1 only
        let points = solve("x + 1/x + y^2").unwrap();
        assert_eq!(
            points,
            vec![
                Point::new(XY, Expr::int(-1), Expr::int(0)),
                Point::new(XY, Expr::int(1), Expr::int(0)),
            ]
        );
    }

    #[test]
    fn test_effort_bound() {
        let (fx, fy) = gradient("x^9*y^9 + x^8 + y^8");
        let config = HessianConfig::default().with_max_degree(10);
        assert!(matches!(
            solve_critical_points(&fx, &fy, XY, &config),
            Err(HessianError::Unsolvable(_))
        ));
    }
}
