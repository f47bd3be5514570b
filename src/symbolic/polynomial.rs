//! Sparse multivariate polynomials and rational functions with exact rational
//! coefficients.
//!
//! An expression is converted into a `RationalFunction` over a table of atoms: the
//! variables plus every subexpression that is not rational in them (function
//! applications, fractional powers). The canonical form used by the simplifier and the
//! polynomial systems fed to the solver both come from here.
//!
//! Monomials are exponent vectors indexed by atom with trailing zeros trimmed, so the
//! `BTreeMap` order of the keys is the lexicographic monomial order.

use crate::global::MAX_EXPANSION_POWER;
use crate::symbolic::numbers::Number;
use crate::symbolic::symbolic_engine::Expr;
use num::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::collections::BTreeMap;

pub type Monomial = Vec<u32>;

/// step cap of the exact multivariate division used while normalizing
const MAX_DIVISION_STEPS: usize = 10_000;

fn trimmed(mut m: Monomial) -> Monomial {
    while m.last() == Some(&0) {
        m.pop();
    }
    m
}

fn exponent(m: &Monomial, i: usize) -> u32 {
    m.get(i).copied().unwrap_or(0)
}

fn mono_mul(a: &Monomial, b: &Monomial) -> Monomial {
    let n = a.len().max(b.len());
    trimmed((0..n).map(|i| exponent(a, i) + exponent(b, i)).collect())
}

fn mono_divides(d: &Monomial, m: &Monomial) -> bool {
    (0..d.len()).all(|i| exponent(d, i) <= exponent(m, i))
}

fn mono_div(m: &Monomial, d: &Monomial) -> Monomial {
    trimmed((0..m.len()).map(|i| exponent(m, i) - exponent(d, i)).collect())
}

fn mono_gcd(a: &Monomial, b: &Monomial) -> Monomial {
    let n = a.len().min(b.len());
    trimmed((0..n).map(|i| exponent(a, i).min(exponent(b, i))).collect())
}

/// Sparse polynomial: monomial -> nonzero coefficient.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct MultiPoly {
    pub terms: BTreeMap<Monomial, BigRational>,
}

impl MultiPoly {
    pub fn zero() -> Self {
        MultiPoly::default()
    }

    pub fn one() -> Self {
        MultiPoly::constant(BigRational::one())
    }

    pub fn constant(c: BigRational) -> Self {
        let mut p = MultiPoly::zero();
        p.add_term(Vec::new(), c);
        p
    }

    /// the polynomial consisting of atom `index` alone
    pub fn atom(index: usize) -> Self {
        let mut m = vec![0; index + 1];
        m[index] = 1;
        let mut p = MultiPoly::zero();
        p.add_term(m, BigRational::one());
        p
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// `Some(c)` when the polynomial is the constant `c` (including zero)
    pub fn as_constant(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => self.terms.get(&Vec::new()).cloned(),
            _ => None,
        }
    }

    pub fn is_one(&self) -> bool {
        self.as_constant().is_some_and(|c| c.is_one())
    }

    fn add_term(&mut self, m: Monomial, c: BigRational) {
        if c.is_zero() {
            return;
        }
        let entry = self.terms.entry(m.clone()).or_insert_with(BigRational::zero);
        *entry += c;
        if entry.is_zero() {
            self.terms.remove(&m);
        }
    }

    pub fn add(&self, other: &MultiPoly) -> MultiPoly {
        let mut res = self.clone();
        for (m, c) in &other.terms {
            res.add_term(m.clone(), c.clone());
        }
        res
    }

    pub fn neg(&self) -> MultiPoly {
        MultiPoly {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), -c)).collect(),
        }
    }

    pub fn sub(&self, other: &MultiPoly) -> MultiPoly {
        self.add(&other.neg())
    }

    pub fn scale(&self, factor: &BigRational) -> MultiPoly {
        if factor.is_zero() {
            return MultiPoly::zero();
        }
        MultiPoly {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), c * factor)).collect(),
        }
    }

    pub fn mul_term(&self, mono: &Monomial, coeff: &BigRational) -> MultiPoly {
        if coeff.is_zero() {
            return MultiPoly::zero();
        }
        MultiPoly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (mono_mul(m, mono), c * coeff))
                .collect(),
        }
    }

    pub fn mul(&self, other: &MultiPoly) -> MultiPoly {
        let mut res = MultiPoly::zero();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &other.terms {
                res.add_term(mono_mul(ma, mb), ca * cb);
            }
        }
        res
    }

    pub fn pow(&self, mut n: u32) -> MultiPoly {
        let mut base = self.clone();
        let mut acc = MultiPoly::one();
        while n > 0 {
            if n & 1 == 1 {
                acc = acc.mul(&base);
            }
            n >>= 1;
            if n > 0 {
                base = base.mul(&base);
            }
        }
        acc
    }

    pub fn total_degree(&self) -> u32 {
        self.terms
            .keys()
            .map(|m| m.iter().sum::<u32>())
            .max()
            .unwrap_or(0)
    }

    pub fn degree_in(&self, index: usize) -> u32 {
        self.terms.keys().map(|m| exponent(m, index)).max().unwrap_or(0)
    }

    /// number of atoms the polynomial actually involves, counted up to the last used one
    pub fn atom_span(&self) -> usize {
        self.terms.keys().map(|m| m.len()).max().unwrap_or(0)
    }

    /// leading term in lexicographic order
    pub fn leading(&self) -> Option<(&Monomial, &BigRational)> {
        self.terms.last_key_value()
    }

    pub fn is_monomial(&self) -> bool {
        self.terms.len() == 1
    }

    /// greatest monomial dividing every term
    pub fn monomial_content(&self) -> Monomial {
        let mut keys = self.terms.keys();
        let Some(first) = keys.next() else {
            return Vec::new();
        };
        keys.fold(first.clone(), |acc, m| mono_gcd(&acc, m))
    }

    pub fn div_monomial(&self, d: &Monomial) -> MultiPoly {
        MultiPoly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (mono_div(m, d), c.clone()))
                .collect(),
        }
    }

    /// Quotient of an exact division, `None` when `divisor` does not divide `self`.
    pub fn try_div_exact(&self, divisor: &MultiPoly) -> Option<MultiPoly> {
        let (lm_d, lc_d) = divisor.leading()?;
        let (lm_d, lc_d) = (lm_d.clone(), lc_d.clone());
        let mut rem = self.clone();
        let mut quot = MultiPoly::zero();
        let mut steps = 0;
        while let Some((lm, lc)) = rem.leading() {
            if !mono_divides(&lm_d, lm) || steps > MAX_DIVISION_STEPS {
                return None;
            }
            let m = mono_div(lm, &lm_d);
            let c = lc / &lc_d;
            rem = rem.sub(&divisor.mul_term(&m, &c));
            quot.add_term(m, c);
            steps += 1;
        }
        Some(quot)
    }
}

/// Quotient of two polynomials kept in a normalized form: the denominator is monic
/// (or the constant 1), monomial factors common to both sides are cancelled and an
/// exactly dividing denominator is absorbed.
#[derive(Clone, Debug, PartialEq)]
pub struct RationalFunction {
    pub num: MultiPoly,
    pub den: MultiPoly,
    /// set when a floating point constant went into the coefficients
    pub inexact: bool,
}

impl RationalFunction {
    pub fn from_poly(p: MultiPoly, inexact: bool) -> Self {
        RationalFunction {
            num: p,
            den: MultiPoly::one(),
            inexact,
        }
    }

    pub fn constant(c: BigRational, inexact: bool) -> Self {
        RationalFunction::from_poly(MultiPoly::constant(c), inexact)
    }

    /// `None` for a zero denominator
    pub fn new(num: MultiPoly, den: MultiPoly, inexact: bool) -> Option<Self> {
        if den.is_zero() {
            return None;
        }
        if num.is_zero() {
            return Some(RationalFunction::from_poly(num, inexact));
        }
        if let Some(c) = den.as_constant() {
            return Some(RationalFunction::from_poly(num.scale(&c.recip()), inexact));
        }
        let common = mono_gcd(&num.monomial_content(), &den.monomial_content());
        let (num, den) = if common.is_empty() {
            (num, den)
        } else {
            (num.div_monomial(&common), den.div_monomial(&common))
        };
        if let Some(c) = den.as_constant() {
            return Some(RationalFunction::from_poly(num.scale(&c.recip()), inexact));
        }
        if let Some(q) = num.try_div_exact(&den) {
            return Some(RationalFunction::from_poly(q, inexact));
        }
        let lc = den.leading().map(|(_, c)| c.recip())?;
        Some(RationalFunction {
            num: num.scale(&lc),
            den: den.scale(&lc),
            inexact,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn is_polynomial(&self) -> bool {
        self.den.is_one()
    }

    pub fn is_monomial(&self) -> bool {
        self.num.is_monomial() && (self.den.is_one() || self.den.is_monomial())
    }

    pub fn neg(&self) -> Self {
        RationalFunction {
            num: self.num.neg(),
            den: self.den.clone(),
            inexact: self.inexact,
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        let inexact = self.inexact || other.inexact;
        let (num, den) = if self.den == other.den {
            (self.num.add(&other.num), self.den.clone())
        } else {
            (
                self.num.mul(&other.den).add(&other.num.mul(&self.den)),
                self.den.mul(&other.den),
            )
        };
        RationalFunction::new(num, den, inexact).unwrap_or_else(|| RationalFunction::from_poly(MultiPoly::zero(), inexact))
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Self) -> Self {
        let inexact = self.inexact || other.inexact;
        RationalFunction::new(
            self.num.mul(&other.num),
            self.den.mul(&other.den),
            inexact,
        )
        .unwrap_or_else(|| RationalFunction::from_poly(MultiPoly::zero(), inexact))
    }

    /// `None` when dividing by zero
    pub fn div(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        RationalFunction::new(
            self.num.mul(&other.den),
            self.den.mul(&other.num),
            self.inexact || other.inexact,
        )
    }

    /// Integer power; `None` for zero raised to a negative power.
    pub fn pow(&self, n: i64) -> Option<Self> {
        let k = u32::try_from(n.unsigned_abs()).ok()?;
        if n >= 0 {
            RationalFunction::new(self.num.pow(k), self.den.pow(k), self.inexact)
        } else {
            RationalFunction::new(self.den.pow(k), self.num.pow(k), self.inexact)
        }
    }

    /// Rebuilds an expression in canonical order: atoms sorted with variables first,
    /// terms by descending total degree, then lexicographically.
    pub fn to_expr(&self, atoms: &[Expr]) -> Expr {
        let order = canonical_order(atoms);
        let num = poly_to_expr(&self.num, atoms, &order, self.inexact);
        if self.den.is_one() {
            return num;
        }
        num / poly_to_expr(&self.den, atoms, &order, self.inexact)
    }
}

fn canonical_order(atoms: &[Expr]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..atoms.len()).collect();
    order.sort_by_key(|&i| (!matches!(atoms[i], Expr::Var(_)), atoms[i].to_string()));
    order
}

fn coefficient_expr(c: &BigRational, inexact: bool) -> Expr {
    if inexact {
        Expr::real(c.to_f64().unwrap_or(f64::NAN))
    } else {
        Expr::Const(Number::Rational(c.clone()))
    }
}

fn atom_power(atom: &Expr, e: u32) -> Expr {
    if e == 1 {
        return atom.clone();
    }
    match atom {
        Expr::Pow(base, p) if p.as_rational().is_some() => {
            Expr::Pow(base.clone(), p.clone())
                .pow(Expr::int(e as i64))
                .simplify_numbers()
        }
        _ => atom.clone().pow(Expr::int(e as i64)),
    }
}

fn monomial_expr(exps: &[u32], atoms: &[Expr], order: &[usize]) -> Option<Expr> {
    exps.iter()
        .enumerate()
        .filter(|(_, e)| **e > 0)
        .map(|(k, e)| atom_power(&atoms[order[k]], *e))
        .reduce(|acc, factor| acc * factor)
}

fn poly_to_expr(p: &MultiPoly, atoms: &[Expr], order: &[usize], inexact: bool) -> Expr {
    let mut terms: Vec<(Vec<u32>, &BigRational)> = p
        .terms
        .iter()
        .map(|(m, c)| (order.iter().map(|&i| exponent(m, i)).collect(), c))
        .collect();
    terms.sort_by(|a, b| {
        let da: u32 = a.0.iter().sum();
        let db: u32 = b.0.iter().sum();
        db.cmp(&da).then_with(|| b.0.cmp(&a.0))
    });
    let mut acc: Option<Expr> = None;
    for (exps, c) in terms {
        let negative = c.is_negative();
        let magnitude = c.abs();
        let term = match monomial_expr(&exps, atoms, order) {
            None => {
                if acc.is_none() {
                    acc = Some(coefficient_expr(c, inexact));
                    continue;
                }
                coefficient_expr(&magnitude, inexact)
            }
            Some(mono) if magnitude.is_one() => mono,
            Some(mono) => coefficient_expr(&magnitude, inexact) * mono,
        };
        acc = Some(match acc {
            None if negative => -term,
            None => term,
            Some(prev) if negative => prev - term,
            Some(prev) => prev + term,
        });
    }
    acc.unwrap_or_else(|| Expr::int(0))
}

/// Converts expressions into rational functions over a growing table of atoms.
#[derive(Clone, Debug)]
pub struct ExprConverter {
    pub atoms: Vec<Expr>,
    /// evaluate variable-free non-rational subexpressions to float coefficients
    /// instead of registering them as atoms
    numeric_constants: bool,
    /// integer powers of multi-term bases above this stay opaque
    expansion_limit: u32,
}

impl Default for ExprConverter {
    fn default() -> Self {
        ExprConverter {
            atoms: Vec::new(),
            numeric_constants: false,
            expansion_limit: MAX_EXPANSION_POWER,
        }
    }
}

impl ExprConverter {
    pub fn new() -> Self {
        ExprConverter::default()
    }

    /// Converter whose first atoms are the given variables, in order.
    pub fn with_variables(variables: &[&str]) -> Self {
        ExprConverter {
            atoms: variables.iter().map(|v| Expr::var(v)).collect(),
            ..ExprConverter::default()
        }
    }

    pub fn numeric(mut self) -> Self {
        self.numeric_constants = true;
        self
    }

    pub fn with_expansion_limit(mut self, limit: u32) -> Self {
        self.expansion_limit = limit;
        self
    }

    fn atom_index(&mut self, atom: Expr) -> usize {
        match self.atoms.iter().position(|a| *a == atom) {
            Some(i) => i,
            None => {
                self.atoms.push(atom);
                self.atoms.len() - 1
            }
        }
    }

    fn opaque(&mut self, expr: &Expr) -> Result<RationalFunction, String> {
        if self.numeric_constants && expr.is_constant() {
            return match expr.eval_number() {
                Some(Number::Rational(r)) => Ok(RationalFunction::constant(r, false)),
                Some(Number::Real(v)) => BigRational::from_float(v)
                    .map(|r| RationalFunction::constant(r, true))
                    .ok_or_else(|| format!("constant {} is not finite", expr)),
                Some(Number::Complex(_)) => Err(format!("constant {} is not real", expr)),
                None => Err(format!("constant {} cannot be evaluated", expr)),
            };
        }
        let atom = match expr {
            Expr::Var(_) => expr.clone(),
            _ => expr.map_children(|c| c.simplify()),
        };
        let index = self.atom_index(atom);
        Ok(RationalFunction::from_poly(MultiPoly::atom(index), false))
    }

    pub fn convert(&mut self, expr: &Expr) -> Result<RationalFunction, String> {
        match expr {
            Expr::Const(Number::Rational(r)) => Ok(RationalFunction::constant(r.clone(), false)),
            Expr::Const(Number::Real(v)) => BigRational::from_float(*v)
                .map(|r| RationalFunction::constant(r, true))
                .ok_or_else(|| format!("constant {} is not finite", v)),
            Expr::Add(a, b) => Ok(self.convert(a)?.add(&self.convert(b)?)),
            Expr::Sub(a, b) => Ok(self.convert(a)?.sub(&self.convert(b)?)),
            Expr::Mul(a, b) => Ok(self.convert(a)?.mul(&self.convert(b)?)),
            Expr::Neg(a) => Ok(self.convert(a)?.neg()),
            Expr::Div(a, b) => {
                let num = self.convert(a)?;
                let den = self.convert(b)?;
                num.div(&den).ok_or_else(|| format!("division by zero in {}", expr))
            }
            Expr::Pow(base, exp) => {
                let n = exp
                    .as_rational()
                    .filter(|r| r.is_integer())
                    .and_then(|r| r.to_integer().to_i64());
                if let Some(n) = n {
                    let base_rf = self.convert(base)?;
                    if n.unsigned_abs() <= self.expansion_limit as u64 || base_rf.is_monomial() {
                        return base_rf
                            .pow(n)
                            .ok_or_else(|| format!("zero raised to a negative power in {}", expr));
                    }
                }
                self.opaque(expr)
            }
            _ => self.opaque(expr),
        }
    }
}
