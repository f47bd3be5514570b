//! # Numeric tower of symbolic constants
//!
//! Constants of an expression are exact rationals as long as every operation that
//! produced them was exact. A floating point operand turns the result into a real
//! float, a complex operand into a complex float. Complex results with a zero
//! imaginary part are normalized back to reals.

use num::{BigInt, BigRational, One, Signed, ToPrimitive, Zero};
use num_complex::Complex64;
use std::fmt;
use strum_macros::{Display, EnumIter};

/// exact integer powers beyond this are evaluated in floating point
const MAX_EXACT_POWER: u32 = 4096;

#[derive(Clone, Debug, PartialEq)]
pub enum Number {
    Rational(BigRational),
    Real(f64),
    Complex(Complex64),
}

/// Elementary functions the engine knows how to differentiate and evaluate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum Elementary {
    #[strum(serialize = "exp")]
    Exp,
    #[strum(serialize = "ln")]
    Ln,
    #[strum(serialize = "sin")]
    Sin,
    #[strum(serialize = "cos")]
    Cos,
    #[strum(serialize = "tg")]
    Tg,
    #[strum(serialize = "ctg")]
    Ctg,
    #[strum(serialize = "arcsin")]
    Arcsin,
    #[strum(serialize = "arccos")]
    Arccos,
    #[strum(serialize = "arctg")]
    Arctg,
    #[strum(serialize = "arcctg")]
    Arcctg,
}

impl Number {
    pub fn int(value: i64) -> Number {
        Number::Rational(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn ratio(numer: i64, denom: i64) -> Number {
        Number::Rational(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn zero() -> Number {
        Number::int(0)
    }

    pub fn one() -> Number {
        Number::int(1)
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_zero(),
            Number::Real(v) => *v == 0.0,
            Number::Complex(c) => c.re == 0.0 && c.im == 0.0,
        }
    }

    pub fn is_one(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_one(),
            Number::Real(v) => *v == 1.0,
            Number::Complex(c) => c.re == 1.0 && c.im == 0.0,
        }
    }

    pub fn is_minus_one(&self) -> bool {
        match self {
            Number::Rational(r) => *r == -BigRational::one(),
            Number::Real(v) => *v == -1.0,
            Number::Complex(c) => c.re == -1.0 && c.im == 0.0,
        }
    }

    /// true for a negative rational or real; complex numbers are never negative
    pub fn is_negative(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_negative(),
            Number::Real(v) => *v < 0.0,
            Number::Complex(_) => false,
        }
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Number::Rational(r) => r.is_integer(),
            _ => false,
        }
    }

    pub fn to_complex(&self) -> Complex64 {
        match self {
            Number::Rational(r) => Complex64::new(r.to_f64().unwrap_or(f64::NAN), 0.0),
            Number::Real(v) => Complex64::new(*v, 0.0),
            Number::Complex(c) => *c,
        }
    }

    /// real value of a rational or real number, `None` for complex numbers
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Number::Rational(r) => r.to_f64(),
            Number::Real(v) => Some(*v),
            Number::Complex(_) => None,
        }
    }

    fn normalized(self) -> Number {
        match self {
            Number::Complex(c) if c.im == 0.0 => Number::Real(c.re),
            other => other,
        }
    }

    pub fn neg(&self) -> Number {
        match self {
            Number::Rational(r) => Number::Rational(-r),
            Number::Real(v) => Number::Real(-v),
            Number::Complex(c) => Number::Complex(-c),
        }
    }

    pub fn add(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a + b),
            (Number::Complex(_), _) | (_, Number::Complex(_)) => {
                Number::Complex(self.to_complex() + other.to_complex()).normalized()
            }
            _ => Number::Real(self.to_complex().re + other.to_complex().re),
        }
    }

    pub fn sub(&self, other: &Number) -> Number {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Number) -> Number {
        match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a * b),
            (Number::Complex(_), _) | (_, Number::Complex(_)) => {
                Number::Complex(self.to_complex() * other.to_complex()).normalized()
            }
            _ => Number::Real(self.to_complex().re * other.to_complex().re),
        }
    }

    /// `None` when the divisor is zero
    pub fn div(&self, other: &Number) -> Option<Number> {
        if other.is_zero() {
            return None;
        }
        let res = match (self, other) {
            (Number::Rational(a), Number::Rational(b)) => Number::Rational(a / b),
            (Number::Complex(_), _) | (_, Number::Complex(_)) => {
                Number::Complex(self.to_complex() / other.to_complex()).normalized()
            }
            _ => Number::Real(self.to_complex().re / other.to_complex().re),
        };
        Some(res)
    }

    /// Power that stays exact when both operands are exact: integer exponents, and
    /// rational exponents whose root is itself rational (`4^(1/2) = 2`). Returns `None`
    /// when an exact result does not exist, so the caller keeps the power symbolic.
    pub fn pow_exact(&self, exponent: &Number) -> Option<Number> {
        let (Number::Rational(base), Number::Rational(e)) = (self, exponent) else {
            return self.pow(exponent);
        };
        if e.is_integer() {
            let n = e.to_integer().to_i32()?;
            if base.is_zero() && n < 0 {
                return None;
            }
            if n.unsigned_abs() > MAX_EXACT_POWER {
                return self.pow(exponent);
            }
            return Some(Number::Rational(base.pow(n)));
        }
        if base.is_negative() {
            return None;
        }
        let q = e.denom().to_u32()?;
        let p = e.numer().to_i32()?;
        let root_numer = base.numer().nth_root(q);
        let root_denom = base.denom().nth_root(q);
        if num::pow(root_numer.clone(), q as usize) != *base.numer()
            || num::pow(root_denom.clone(), q as usize) != *base.denom()
        {
            return None;
        }
        let root = BigRational::new(root_numer, root_denom);
        if root.is_zero() && p < 0 {
            return None;
        }
        Some(Number::Rational(root.pow(p)))
    }

    /// Numeric power; negative bases with fractional exponents give the principal
    /// complex value. `None` only for zero raised to a negative power.
    pub fn pow(&self, exponent: &Number) -> Option<Number> {
        if self.is_zero() && exponent.is_negative() {
            return None;
        }
        if let (Number::Rational(_), Number::Rational(e)) = (self, exponent) {
            if e.is_integer() && e.abs() <= BigRational::from_integer(BigInt::from(MAX_EXACT_POWER)) {
                return self.pow_exact(exponent);
            }
        }
        match (self.to_f64(), exponent.to_f64()) {
            (Some(b), Some(e)) if b >= 0.0 || e.fract() == 0.0 => Some(Number::Real(b.powf(e))),
            _ => {
                let b = self.to_complex();
                let e = exponent.to_complex();
                if b.re == 0.0 && b.im == 0.0 {
                    return Some(Number::Real(0.0));
                }
                Some(Number::Complex(b.powc(e)).normalized())
            }
        }
    }

    /// Values of elementary functions that are exactly rational at a rational point
    /// (`sin(0) = 0`, `ln(1) = 0`, ...). Inexact arguments are evaluated numerically.
    pub fn apply_exact(&self, func: Elementary) -> Option<Number> {
        match self {
            Number::Rational(r) => {
                if r.is_zero() {
                    match func {
                        Elementary::Exp | Elementary::Cos => Some(Number::one()),
                        Elementary::Sin
                        | Elementary::Tg
                        | Elementary::Arcsin
                        | Elementary::Arctg => Some(Number::zero()),
                        _ => None,
                    }
                } else if r.is_one() && func == Elementary::Ln {
                    Some(Number::zero())
                } else if r.is_one() && func == Elementary::Arccos {
                    Some(Number::zero())
                } else {
                    None
                }
            }
            _ => self.apply(func),
        }
    }

    /// Numeric value of an elementary function, leaving the real line when needed
    /// (`ln(-1)`, `arcsin(2)`). `None` at poles.
    pub fn apply(&self, func: Elementary) -> Option<Number> {
        if let Some(v) = self.to_f64() {
            let real = match func {
                Elementary::Exp => Some(v.exp()),
                Elementary::Ln if v > 0.0 => Some(v.ln()),
                Elementary::Ln if v == 0.0 => return None,
                Elementary::Sin => Some(v.sin()),
                Elementary::Cos => Some(v.cos()),
                Elementary::Tg => Some(v.tan()),
                Elementary::Ctg if v.tan() == 0.0 => return None,
                Elementary::Ctg => Some(1.0 / v.tan()),
                Elementary::Arcsin if v.abs() <= 1.0 => Some(v.asin()),
                Elementary::Arccos if v.abs() <= 1.0 => Some(v.acos()),
                Elementary::Arctg => Some(v.atan()),
                Elementary::Arcctg if v == 0.0 => Some(std::f64::consts::FRAC_PI_2),
                Elementary::Arcctg => Some((1.0 / v).atan()),
                _ => None,
            };
            if let Some(r) = real {
                return Some(Number::Real(r));
            }
        }
        let z = self.to_complex();
        let w = match func {
            Elementary::Exp => z.exp(),
            Elementary::Ln => z.ln(),
            Elementary::Sin => z.sin(),
            Elementary::Cos => z.cos(),
            Elementary::Tg => z.tan(),
            Elementary::Ctg => {
                let t = z.tan();
                if t.norm() == 0.0 {
                    return None;
                }
                t.inv()
            }
            Elementary::Arcsin => z.asin(),
            Elementary::Arccos => z.acos(),
            Elementary::Arctg => z.atan(),
            Elementary::Arcctg => {
                if z.norm() == 0.0 {
                    return None;
                }
                z.inv().atan()
            }
        };
        if w.re.is_nan() || w.im.is_nan() {
            return None;
        }
        Some(Number::Complex(w).normalized())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Rational(r) => {
                if r.is_integer() {
                    write!(f, "{}", r.numer())
                } else {
                    write!(f, "{}/{}", r.numer(), r.denom())
                }
            }
            Number::Real(v) => write!(f, "{}", v),
            Number::Complex(c) => {
                if c.re == 0.0 {
                    write!(f, "{}*I", c.im)
                } else if c.im < 0.0 {
                    write!(f, "{} - {}*I", c.re, -c.im)
                } else {
                    write!(f, "{} + {}*I", c.re, c.im)
                }
            }
        }
    }
}
