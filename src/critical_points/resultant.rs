//! Polynomials in two variables and their resultants.
//!
//! `Res_y(P, Q)` is the determinant of the Sylvester matrix of `P` and `Q` seen as
//! polynomials in `y` with coefficients in `x`; it vanishes exactly at the `x`
//! coordinates of common zeros (and where both leading coefficients vanish). It is
//! computed by evaluating the determinant at enough integer points `x = 0, 1, ..., D`
//! with exact rational Gaussian elimination and interpolating the values.

use crate::critical_points::univariate::UniPoly;
use crate::symbolic::polynomial::MultiPoly;
use num::{BigInt, BigRational, One, ToPrimitive, Zero};
use num_complex::Complex64;

/// Polynomial in `x, y` stored by powers of `y`: `coeffs[j]` is the coefficient of `y^j`.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct BiPoly {
    pub coeffs: Vec<UniPoly>,
}

fn to_complex(c: &BigRational) -> Complex64 {
    Complex64::new(c.to_f64().unwrap_or(f64::NAN), 0.0)
}

impl BiPoly {
    pub fn new(mut coeffs: Vec<UniPoly>) -> Self {
        while coeffs.last().is_some_and(|c| c.is_zero()) {
            coeffs.pop();
        }
        BiPoly { coeffs }
    }

    /// Converts a polynomial over the atoms `[x, y]`; `None` if other atoms occur.
    pub fn from_multi(p: &MultiPoly) -> Option<Self> {
        if p.atom_span() > 2 {
            return None;
        }
        let dy = p.degree_in(1) as usize;
        let dx = p.degree_in(0) as usize;
        let mut table = vec![vec![BigRational::zero(); dx + 1]; dy + 1];
        for (m, c) in &p.terms {
            let i = m.first().copied().unwrap_or(0) as usize;
            let j = m.get(1).copied().unwrap_or(0) as usize;
            table[j][i] = c.clone();
        }
        Some(BiPoly::new(table.into_iter().map(UniPoly::new).collect()))
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn degree_y(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    pub fn degree_x(&self) -> usize {
        self.coeffs
            .iter()
            .filter_map(|c| c.degree())
            .max()
            .unwrap_or(0)
    }

    /// nonzero constant or zero
    pub fn is_constant(&self) -> bool {
        self.degree_y() == 0 && self.degree_x() == 0
    }

    /// The same polynomial stored by powers of `x`.
    pub fn swap(&self) -> BiPoly {
        let dx = self.degree_x();
        let mut table = vec![vec![BigRational::zero(); self.coeffs.len()]; dx + 1];
        for (j, cy) in self.coeffs.iter().enumerate() {
            for (i, c) in cy.coeffs.iter().enumerate() {
                table[i][j] = c.clone();
            }
        }
        BiPoly::new(table.into_iter().map(UniPoly::new).collect())
    }

    /// `P(a, y)` as a polynomial in `y`.
    pub fn eval_x(&self, a: &BigRational) -> UniPoly {
        UniPoly::new(self.coeffs.iter().map(|c| c.eval(a)).collect())
    }

    /// coefficients of `P(a, y)` padded to the formal degree `degree`
    fn eval_x_formal(&self, a: &BigRational, degree: usize) -> Vec<BigRational> {
        (0..=degree)
            .map(|j| self.coeffs.get(j).map_or_else(BigRational::zero, |c| c.eval(a)))
            .collect()
    }

    pub fn eval_exact(&self, x: &BigRational, y: &BigRational) -> BigRational {
        self.eval_x(x).eval(y)
    }

    pub fn eval_complex(&self, x: Complex64, y: Complex64) -> Complex64 {
        let mut acc = Complex64::new(0.0, 0.0);
        for cy in self.coeffs.iter().rev() {
            acc = acc * y + cy.eval_complex(x);
        }
        acc
    }

    /// partial derivatives `(dP/dx, dP/dy)` at a complex point
    pub fn gradient_complex(&self, x: Complex64, y: Complex64) -> (Complex64, Complex64) {
        let dx = BiPoly::new(self.coeffs.iter().map(|c| c.derivative()).collect());
        let dy = BiPoly::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(j, c)| c.scale(&BigRational::from_integer(BigInt::from(j))))
                .collect(),
        );
        (dx.eval_complex(x, y), dy.eval_complex(x, y))
    }

    /// sum of |c_ij| |x|^i |y|^j, the natural scale for residuals at `(x, y)`
    pub fn magnitude(&self, x: Complex64, y: Complex64) -> f64 {
        let (rx, ry) = (x.norm(), y.norm());
        let mut acc = 0.0;
        for cy in self.coeffs.iter().rev() {
            let inner = cy
                .coeffs
                .iter()
                .rev()
                .fold(0.0, |a, c| a * rx + to_complex(c).norm());
            acc = acc * ry + inner;
        }
        acc
    }
}

/// Determinant by Gaussian elimination over the rationals.
fn determinant(mut m: Vec<Vec<BigRational>>) -> BigRational {
    let n = m.len();
    let mut det = BigRational::one();
    for col in 0..n {
        let Some(pivot) = (col..n).find(|&r| !m[r][col].is_zero()) else {
            return BigRational::zero();
        };
        if pivot != col {
            m.swap(pivot, col);
            det = -det;
        }
        let p = m[col][col].clone();
        det *= &p;
        for r in col + 1..n {
            if m[r][col].is_zero() {
                continue;
            }
            let factor = &m[r][col] / &p;
            for c in col..n {
                let delta = &factor * &m[col][c];
                m[r][c] -= delta;
            }
        }
    }
    det
}

/// Sylvester determinant of two univariate polynomials given by formal coefficient
/// vectors (ascending, possibly with zero leading entries).
fn sylvester_determinant(p: &[BigRational], q: &[BigRational]) -> BigRational {
    let n = p.len() - 1;
    let m = q.len() - 1;
    let size = n + m;
    if size == 0 {
        return BigRational::one();
    }
    let mut rows = vec![vec![BigRational::zero(); size]; size];
    for i in 0..m {
        for k in 0..=n {
            rows[i][i + k] = p[n - k].clone();
        }
    }
    for i in 0..n {
        for k in 0..=m {
            rows[m + i][i + k] = q[m - k].clone();
        }
    }
    determinant(rows)
}

/// Polynomial through `(nodes[i], values[i])` by Newton divided differences.
pub fn interpolate(nodes: &[BigRational], values: &[BigRational]) -> UniPoly {
    let len = values.len();
    let mut coef = values.to_vec();
    for j in 1..len {
        for i in (j..len).rev() {
            coef[i] = (&coef[i] - &coef[i - 1]) / (&nodes[i] - &nodes[i - j]);
        }
    }
    let mut poly = UniPoly::zero();
    for k in (0..len).rev() {
        let shift = UniPoly::new(vec![-nodes[k].clone(), BigRational::one()]);
        poly = poly.mul(&shift).add(&UniPoly::constant(coef[k].clone()));
    }
    poly
}

/// Resultant of `p` and `q` with respect to `y`, a polynomial in `x`.
///
/// # Arguments
/// * `max_degree` - refuse when the degree bound of the resultant exceeds it
pub fn resultant_y(p: &BiPoly, q: &BiPoly, max_degree: usize) -> Result<UniPoly, String> {
    let (n, m) = (p.degree_y(), q.degree_y());
    let bound = m * p.degree_x() + n * q.degree_x();
    if bound > max_degree {
        return Err(format!(
            "eliminant degree bound {} exceeds the limit {}",
            bound, max_degree
        ));
    }
    let nodes: Vec<BigRational> = (0..=bound)
        .map(|a| BigRational::from_integer(BigInt::from(a)))
        .collect();
    let values: Vec<BigRational> = nodes
        .iter()
        .map(|a| sylvester_determinant(&p.eval_x_formal(a, n), &q.eval_x_formal(a, m)))
        .collect();
    Ok(interpolate(&nodes, &values))
}

/// Resultant with respect to `x`, a polynomial in `y`.
pub fn resultant_x(p: &BiPoly, q: &BiPoly, max_degree: usize) -> Result<UniPoly, String> {
    resultant_y(&p.swap(), &q.swap(), max_degree)
}

/// true when `|value|` is within `tolerance` relative to `scale`
pub fn residual_within(value: Complex64, scale: f64, tolerance: f64) -> bool {
    value.norm() <= tolerance * scale.max(f64::MIN_POSITIVE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::polynomial::ExprConverter;
    use crate::symbolic::symbolic_engine::Expr;

    fn bipoly(text: &str) -> BiPoly {
        let e = Expr::parse_expression(text, ("x", "y")).unwrap();
        let mut converter = ExprConverter::with_variables(&["x", "y"]);
        let rf = converter.convert(&e).unwrap();
        BiPoly::from_multi(&rf.num).unwrap()
    }

    #[test]
    fn test_from_multi_and_swap() {
        let p = bipoly("3*x^2 - 3*y");
        assert_eq!(p.degree_y(), 1);
        assert_eq!(p.degree_x(), 2);
        let s = p.swap();
        assert_eq!(s.degree_y(), 2);
        assert_eq!(s.degree_x(), 1);
        assert_eq!(s.swap(), p);
    }

    #[test]
    fn test_interpolation_recovers_polynomial() {
        let p = UniPoly::from_integers(&[7, -3, 0, 2]);
        let nodes: Vec<BigRational> = (0..4).map(|a| BigRational::from_integer(BigInt::from(a))).collect();
        let values: Vec<BigRational> = nodes.iter().map(|a| p.eval(a)).collect();
        assert_eq!(interpolate(&nodes, &values), p);
    }

    #[test]
    fn test_resultant_of_mixed_cubic_gradient() {
        let p = bipoly("3*x^2 - 3*y");
        let q = bipoly("-3*x + 2*y");
        // det [[-3, 3x^2], [2, -3x]] = 9x - 6x^2
        assert_eq!(resultant_y(&p, &q, 64).unwrap(), UniPoly::from_integers(&[0, 9, -6]));
        let ry = resultant_x(&p, &q, 64).unwrap();
        let roots: Vec<BigRational> = [0, 9]
            .iter()
            .map(|n| BigRational::new(BigInt::from(*n), BigInt::from(4)))
            .collect();
        for r in roots {
            assert!(ry.eval(&r).is_zero());
        }
    }

    #[test]
    fn test_resultant_vanishes_on_common_factor() {
        let p = bipoly("(x - y)*(x + 1)");
        let q = bipoly("(x - y)*(y + 2)");
        assert!(resultant_y(&p, &q, 64).unwrap().is_zero());
    }

    #[test]
    fn test_degree_bound() {
        let p = bipoly("x^10*y^3 + 1");
        let q = bipoly("y^4*x^9 - x");
        assert!(resultant_y(&p, &q, 64).is_err());
    }

    #[test]
    fn test_complex_evaluation() {
        let p = bipoly("x^2 + y^2 + 1");
        let v = p.eval_complex(Complex64::new(0.0, 1.0), Complex64::new(0.0, 0.0));
        assert!(v.norm() < 1e-15);
        let (gx, gy) = p.gradient_complex(Complex64::new(1.0, 0.0), Complex64::new(2.0, 0.0));
        assert_eq!((gx.re, gy.re), (2.0, 4.0));
        assert!(p.magnitude(Complex64::new(1.0, 0.0), Complex64::new(2.0, 0.0)) >= 6.0 - 1e-12);
        assert!(residual_within(Complex64::new(1e-20, 0.0), 1.0, 1e-8));
        assert!(!residual_within(Complex64::new(1e-3, 0.0), 1.0, 1e-8));
    }
}
