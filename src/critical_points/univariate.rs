//! Univariate polynomials over the rationals and their roots.
//!
//! Roots of a square-free polynomial are found in three steps:
//! - the number of real roots is counted exactly with a Sturm sequence;
//! - all roots are located simultaneously with the Aberth–Ehrlich iteration in
//!   complex floating point and polished with Newton steps;
//! - real roots are snapped to rationals whenever a continued-fraction convergent is
//!   confirmed by exact evaluation, so rational critical points stay exact.

use log::debug;
use num::{BigInt, BigRational};
use num_traits::{Signed, ToPrimitive, Zero};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Aberth steps below this relative size count as converged
const STEP_TOLERANCE: f64 = 1e-14;
/// largest convergent denominator tried when rationalizing a real root
const MAX_CONVERGENT_DENOMINATOR: i128 = 1_000_000_000_000;

/// Polynomial with coefficients in ascending order of powers, no trailing zeros.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct UniPoly {
    pub coeffs: Vec<BigRational>,
}

/// Root of a polynomial: exact rational or a floating point approximation.
#[derive(Clone, Debug, PartialEq)]
pub enum Root {
    Exact(BigRational),
    Approx(Complex64),
}

impl Root {
    pub fn value(&self) -> Complex64 {
        match self {
            Root::Exact(q) => Complex64::new(q.to_f64().unwrap_or(f64::NAN), 0.0),
            Root::Approx(z) => *z,
        }
    }

    pub fn is_real(&self) -> bool {
        match self {
            Root::Exact(_) => true,
            Root::Approx(z) => z.im == 0.0,
        }
    }
}

fn horner(coeffs: &[Complex64], z: Complex64) -> (Complex64, Complex64) {
    let mut p = Complex64::new(0.0, 0.0);
    let mut dp = Complex64::new(0.0, 0.0);
    for c in coeffs.iter().rev() {
        dp = dp * z + p;
        p = p * z + c;
    }
    (p, dp)
}

/// sum of |a_i| |z|^i, the scale of rounding errors in evaluating the polynomial at z
fn magnitude(coeffs: &[Complex64], z: Complex64) -> f64 {
    let r = z.norm();
    coeffs.iter().rev().fold(0.0, |acc, c| acc * r + c.norm())
}

fn sign_changes(signs: &[i8]) -> usize {
    signs
        .iter()
        .filter(|s| **s != 0)
        .collect::<Vec<_>>()
        .windows(2)
        .filter(|w| w[0] != w[1])
        .count()
}

impl UniPoly {
    pub fn new(mut coeffs: Vec<BigRational>) -> Self {
        while coeffs.last().is_some_and(|c| c.is_zero()) {
            coeffs.pop();
        }
        UniPoly { coeffs }
    }

    pub fn zero() -> Self {
        UniPoly::default()
    }

    pub fn constant(c: BigRational) -> Self {
        UniPoly::new(vec![c])
    }

    pub fn from_integers(coeffs: &[i64]) -> Self {
        UniPoly::new(
            coeffs
                .iter()
                .map(|c| BigRational::from_integer(BigInt::from(*c)))
                .collect(),
        )
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// `None` for the zero polynomial
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    pub fn is_constant(&self) -> bool {
        self.coeffs.len() <= 1
    }

    pub fn leading(&self) -> Option<&BigRational> {
        self.coeffs.last()
    }

    pub fn eval(&self, x: &BigRational) -> BigRational {
        self.coeffs
            .iter()
            .rev()
            .fold(BigRational::zero(), |acc, c| acc * x + c)
    }

    pub fn to_complex_coeffs(&self) -> Vec<Complex64> {
        self.coeffs
            .iter()
            .map(|c| Complex64::new(c.to_f64().unwrap_or(f64::NAN), 0.0))
            .collect()
    }

    pub fn eval_complex(&self, z: Complex64) -> Complex64 {
        horner(&self.to_complex_coeffs(), z).0
    }

    pub fn derivative(&self) -> UniPoly {
        UniPoly::new(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * BigRational::from_integer(BigInt::from(i)))
                .collect(),
        )
    }

    pub fn add(&self, other: &UniPoly) -> UniPoly {
        let n = self.coeffs.len().max(other.coeffs.len());
        let zero = BigRational::zero();
        UniPoly::new(
            (0..n)
                .map(|i| {
                    self.coeffs.get(i).unwrap_or(&zero) + other.coeffs.get(i).unwrap_or(&zero)
                })
                .collect(),
        )
    }

    pub fn neg(&self) -> UniPoly {
        UniPoly {
            coeffs: self.coeffs.iter().map(|c| -c).collect(),
        }
    }

    pub fn sub(&self, other: &UniPoly) -> UniPoly {
        self.add(&other.neg())
    }

    pub fn scale(&self, factor: &BigRational) -> UniPoly {
        UniPoly::new(self.coeffs.iter().map(|c| c * factor).collect())
    }

    pub fn mul(&self, other: &UniPoly) -> UniPoly {
        if self.is_zero() || other.is_zero() {
            return UniPoly::zero();
        }
        let mut coeffs = vec![BigRational::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        UniPoly::new(coeffs)
    }

    /// Quotient and remainder; dividing by the zero polynomial returns `(0, self)`.
    pub fn div_rem(&self, divisor: &UniPoly) -> (UniPoly, UniPoly) {
        let Some(dd) = divisor.degree() else {
            return (UniPoly::zero(), self.clone());
        };
        let lc = &divisor.coeffs[dd];
        let mut rem = self.clone();
        let mut quot = vec![BigRational::zero(); self.coeffs.len().saturating_sub(dd)];
        while let Some(rd) = rem.degree() {
            if rd < dd {
                break;
            }
            let factor = &rem.coeffs[rd] / lc;
            let shift = rd - dd;
            for (i, c) in divisor.coeffs.iter().enumerate() {
                rem.coeffs[i + shift] -= &factor * c;
            }
            quot[shift] = factor;
            rem = UniPoly::new(rem.coeffs);
        }
        (UniPoly::new(quot), rem)
    }

    pub fn monic(&self) -> UniPoly {
        match self.leading() {
            Some(lc) => self.scale(&lc.recip()),
            None => UniPoly::zero(),
        }
    }

    /// Monic greatest common divisor; `gcd(0, 0) = 0`.
    pub fn gcd(&self, other: &UniPoly) -> UniPoly {
        let (mut a, mut b) = (self.monic(), other.monic());
        while !b.is_zero() {
            let r = a.div_rem(&b).1.monic();
            a = b;
            b = r;
        }
        a
    }

    /// Product of the distinct irreducible factors: `p / gcd(p, p')`, monic.
    pub fn square_free(&self) -> UniPoly {
        if self.is_constant() {
            return self.monic();
        }
        let g = self.gcd(&self.derivative());
        self.div_rem(&g).0.monic()
    }

    /// Number of distinct real roots, from the sign changes of the Sturm sequence at
    /// minus and plus infinity.
    pub fn sturm_real_root_count(&self) -> usize {
        if self.is_constant() {
            return 0;
        }
        let mut seq = vec![self.clone()];
        let mut next = self.derivative();
        while !next.is_zero() {
            seq.push(next);
            let k = seq.len();
            let r = seq[k - 2].div_rem(&seq[k - 1]).1.neg();
            next = match r.leading() {
                Some(lc) => r.scale(&lc.abs().recip()),
                None => UniPoly::zero(),
            };
        }
        let at_plus: Vec<i8> = seq
            .iter()
            .map(|p| p.leading().map_or(0, |c| if c.is_positive() { 1 } else { -1 }))
            .collect();
        let at_minus: Vec<i8> = seq
            .iter()
            .zip(&at_plus)
            .map(|(p, s)| match p.degree() {
                Some(d) if d % 2 == 1 => -s,
                _ => *s,
            })
            .collect();
        sign_changes(&at_minus).saturating_sub(sign_changes(&at_plus))
    }

    /// Rational number whose exact evaluation is a root, found among the continued
    /// fraction convergents of `r`.
    pub fn rationalize_root(&self, r: f64) -> Option<BigRational> {
        if !r.is_finite() || r.abs() > 1e15 {
            return None;
        }
        let (mut h_prev, mut h) = (1_i128, r.floor() as i128);
        let (mut k_prev, mut k) = (0_i128, 1_i128);
        let mut x = r - r.floor();
        for _ in 0..40 {
            let candidate = BigRational::new(BigInt::from(h), BigInt::from(k));
            if self.eval(&candidate).is_zero() {
                return Some(candidate);
            }
            if x.abs() < 1e-16 {
                return None;
            }
            x = 1.0 / x;
            let a = x.floor();
            if a > 1e12 {
                return None;
            }
            x -= a;
            let a = a as i128;
            let h_next = a.checked_mul(h)?.checked_add(h_prev)?;
            let k_next = a.checked_mul(k)?.checked_add(k_prev)?;
            if k_next > MAX_CONVERGENT_DENOMINATOR {
                return None;
            }
            (h_prev, h) = (h, h_next);
            (k_prev, k) = (k, k_next);
        }
        None
    }

    /// All distinct roots of the polynomial.
    ///
    /// # Arguments
    /// * `max_iterations` - cap on the simultaneous iteration
    ///
    /// # Returns
    /// Real roots first in increasing order, then complex roots in conjugate pairs.
    /// Errors when the polynomial is identically zero or the iteration does not converge.
    pub fn find_roots(&self, max_iterations: usize) -> Result<Vec<Root>, String> {
        if self.is_zero() {
            return Err("the zero polynomial vanishes everywhere".to_string());
        }
        let mut p = self.square_free();
        let mut roots = Vec::new();
        if p.coeffs.first().is_some_and(|c| c.is_zero()) {
            roots.push(Root::Exact(BigRational::zero()));
            p = UniPoly::new(p.coeffs[1..].to_vec());
        }
        match p.degree() {
            None | Some(0) => {}
            Some(1) => roots.push(Root::Exact(-&p.coeffs[0] / &p.coeffs[1])),
            Some(_) => roots.extend(p.numeric_roots(max_iterations)?),
        }
        let (mut real, complex): (Vec<Root>, Vec<Root>) =
            roots.into_iter().partition(|r| r.is_real());
        real.sort_by(|a, b| a.value().re.total_cmp(&b.value().re));
        real.extend(complex);
        Ok(real)
    }

    fn numeric_roots(&self, max_iterations: usize) -> Result<Vec<Root>, String> {
        let n = self.degree().unwrap_or(0);
        let coeffs = self.monic().to_complex_coeffs();
        let radius = 1.0
            + coeffs[..n]
                .iter()
                .map(|c| c.norm())
                .fold(0.0_f64, f64::max);
        let mut z: Vec<Complex64> = (0..n)
            .map(|k| Complex64::from_polar(radius, 2.0 * PI * k as f64 / n as f64 + 0.4))
            .collect();
        let mut converged = false;
        for iteration in 0..max_iterations {
            let mut all_small = true;
            for k in 0..n {
                let (p, dp) = horner(&coeffs, z[k]);
                if p.norm() <= 4.0 * n as f64 * f64::EPSILON * magnitude(&coeffs, z[k]) {
                    continue;
                }
                let ratio = p / dp;
                let repulsion: Complex64 = (0..n)
                    .filter(|&j| j != k)
                    .map(|j| (z[k] - z[j]).inv())
                    .sum();
                let step = ratio / (Complex64::new(1.0, 0.0) - ratio * repulsion);
                if !step.re.is_finite() || !step.im.is_finite() {
                    continue;
                }
                z[k] -= step;
                if step.norm() > STEP_TOLERANCE * z[k].norm().max(1.0) {
                    all_small = false;
                }
            }
            if all_small {
                debug!("root finder converged after {} iterations, degree {}", iteration + 1, n);
                converged = true;
                break;
            }
        }
        if !converged {
            return Err(format!(
                "root finding did not converge within {} iterations (degree {})",
                max_iterations, n
            ));
        }
        for zk in z.iter_mut() {
            for _ in 0..3 {
                let (p, dp) = horner(&coeffs, *zk);
                if dp.norm() == 0.0 {
                    break;
                }
                let candidate = *zk - p / dp;
                if horner(&coeffs, candidate).0.norm() < p.norm() {
                    *zk = candidate;
                } else {
                    break;
                }
            }
        }
        let real_count = self.sturm_real_root_count().min(n);
        z.sort_by(|a, b| a.im.abs().total_cmp(&b.im.abs()));
        let mut roots = Vec::with_capacity(n);
        for zk in &z[..real_count] {
            let r = zk.re;
            roots.push(match self.rationalize_root(r) {
                Some(q) => Root::Exact(q),
                None => Root::Approx(Complex64::new(r, 0.0)),
            });
        }
        let complex = &z[real_count..];
        let upper: Vec<Complex64> = complex.iter().filter(|c| c.im > 0.0).copied().collect();
        if upper.len() * 2 == complex.len() {
            for c in upper {
                roots.push(Root::Approx(c));
                roots.push(Root::Approx(c.conj()));
            }
        } else {
            roots.extend(complex.iter().map(|c| Root::Approx(*c)));
        }
        Ok(roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_div_rem_and_gcd() {
        // (x^2 - 1) = (x - 1)(x + 1)
        let p = UniPoly::from_integers(&[-1, 0, 1]);
        let d = UniPoly::from_integers(&[-1, 1]);
        let (quot, rem) = p.div_rem(&d);
        assert_eq!(quot, UniPoly::from_integers(&[1, 1]));
        assert!(rem.is_zero());
        let other = UniPoly::from_integers(&[1, 2, 1]); // (x + 1)^2
        assert_eq!(p.gcd(&other), UniPoly::from_integers(&[1, 1]));
        assert_eq!(p.gcd(&UniPoly::zero()), p.monic());
    }

    #[test]
    fn test_square_free() {
        // x^3 (x - 2)^2
        let p = UniPoly::from_integers(&[0, 0, 0, 4, -4, 1]);
        assert_eq!(p.square_free(), UniPoly::from_integers(&[0, -2, 1]));
    }

    #[test]
    fn test_sturm_count() {
        assert_eq!(UniPoly::from_integers(&[-2, 0, 1]).sturm_real_root_count(), 2);
        assert_eq!(UniPoly::from_integers(&[1, 0, 1]).sturm_real_root_count(), 0);
        // x^3 - x
        assert_eq!(UniPoly::from_integers(&[0, -1, 0, 1]).sturm_real_root_count(), 3);
        assert_eq!(UniPoly::from_integers(&[5]).sturm_real_root_count(), 0);
    }

    #[test]
    fn test_rational_roots_are_exact() {
        // 6x^2 - 9x = 3x(2x - 3)
        let p = UniPoly::from_integers(&[0, -9, 6]);
        let roots = p.find_roots(500).unwrap();
        assert_eq!(roots, vec![Root::Exact(q(0, 1)), Root::Exact(q(3, 2))]);
        // (x - 1/3)(x + 2)(x - 5) * 3 = 3x^3 - 10x^2 - 27x + 10
        let p = UniPoly::from_integers(&[10, -27, -10, 3]);
        let roots = p.find_roots(500).unwrap();
        assert_eq!(
            roots,
            vec![Root::Exact(q(-2, 1)), Root::Exact(q(1, 3)), Root::Exact(q(5, 1))]
        );
    }

    #[test]
    fn test_irrational_and_complex_roots() {
        // x^2 - 2
        let roots = UniPoly::from_integers(&[-2, 0, 1]).find_roots(500).unwrap();
        assert_eq!(roots.len(), 2);
        assert_relative_eq!(roots[0].value().re, -std::f64::consts::SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(roots[1].value().re, std::f64::consts::SQRT_2, epsilon = 1e-12);
        assert!(roots.iter().all(|r| matches!(r, Root::Approx(_)) && r.is_real()));
        // x^2 + 1
        let roots = UniPoly::from_integers(&[1, 0, 1]).find_roots(500).unwrap();
        assert_eq!(roots.len(), 2);
        assert!(roots.iter().all(|r| !r.is_real()));
        assert_relative_eq!(roots[0].value().im.abs(), 1.0, epsilon = 1e-12);
        assert_eq!(roots[0].value().conj(), roots[1].value());
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(UniPoly::zero().find_roots(10).is_err());
        assert!(UniPoly::from_integers(&[3]).find_roots(10).unwrap().is_empty());
        assert_eq!(
            UniPoly::from_integers(&[0, 0, 5]).find_roots(10).unwrap(),
            vec![Root::Exact(q(0, 1))]
        );
    }
}
