//! Multivariate polynomials and rational functions over exact rationals.
//!
//! The solver lowers an [`Expr`] into a [`Fraction`] of two polynomials,
//! which is enough for linear systems, linear inequalities and polynomial
//! equations. Anything involving functions, constants or fractional powers
//! has no polynomial form and is rejected by [`Fraction::from_expr`].

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::expr::Expr;

/// Variable name to exponent; the empty monomial is the constant term
pub type Monomial = BTreeMap<String, u32>;

/// Largest integer exponent expanded symbolically
const MAX_EXPANDED_POWER: i64 = 64;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Poly {
    terms: BTreeMap<Monomial, BigRational>,
}

impl Poly {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(c: BigRational) -> Self {
        let mut poly = Self::zero();
        poly.add_term(Monomial::new(), c);
        poly
    }

    pub fn variable(name: &str) -> Self {
        let mut monomial = Monomial::new();
        monomial.insert(name.to_owned(), 1);
        let mut poly = Self::zero();
        poly.add_term(monomial, BigRational::one());
        poly
    }

    fn add_term(&mut self, monomial: Monomial, coeff: BigRational) {
        if coeff.is_zero() {
            return;
        }
        match self.terms.entry(monomial) {
            Entry::Vacant(slot) => {
                slot.insert(coeff);
            }
            Entry::Occupied(mut slot) => {
                *slot.get_mut() += coeff;
                if slot.get().is_zero() {
                    slot.remove();
                }
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn as_constant(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => self.terms.get(&Monomial::new()).cloned(),
            _ => None,
        }
    }

    pub fn variables(&self) -> BTreeSet<String> {
        self.terms
            .keys()
            .flat_map(|m| m.keys().cloned())
            .collect()
    }

    pub fn degree_in(&self, var: &str) -> u32 {
        self.terms
            .keys()
            .filter_map(|m| m.get(var).copied())
            .max()
            .unwrap_or(0)
    }

    pub fn total_degree(&self) -> u32 {
        self.terms
            .keys()
            .map(|m| m.values().sum::<u32>())
            .max()
            .unwrap_or(0)
    }

    pub fn add(&self, other: &Poly) -> Poly {
        let mut out = self.clone();
        for (m, c) in &other.terms {
            out.add_term(m.clone(), c.clone());
        }
        out
    }

    pub fn neg(&self) -> Poly {
        Poly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), -c.clone()))
                .collect(),
        }
    }

    pub fn sub(&self, other: &Poly) -> Poly {
        self.add(&other.neg())
    }

    pub fn scale(&self, factor: &BigRational) -> Poly {
        let mut out = Poly::zero();
        for (m, c) in &self.terms {
            out.add_term(m.clone(), c * factor);
        }
        out
    }

    pub fn mul(&self, other: &Poly) -> Poly {
        let mut out = Poly::zero();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &other.terms {
                let mut m = ma.clone();
                for (var, e) in mb {
                    *m.entry(var.clone()).or_insert(0) += e;
                }
                out.add_term(m, ca * cb);
            }
        }
        out
    }

    pub fn pow(&self, exponent: u32) -> Poly {
        let mut out = Poly::constant(BigRational::one());
        for _ in 0..exponent {
            out = out.mul(self);
        }
        out
    }

    /// Groups terms by the power of `var`; the values no longer mention `var`
    pub fn coefficients_in(&self, var: &str) -> BTreeMap<u32, Poly> {
        let mut out: BTreeMap<u32, Poly> = BTreeMap::new();
        for (m, c) in &self.terms {
            let mut rest = m.clone();
            let power = rest.remove(var).unwrap_or(0);
            out.entry(power).or_default().add_term(rest, c.clone());
        }
        out
    }

    /// Dense coefficients, lowest power first, when `var` is the only variable
    pub fn univariate_coefficients(&self, var: &str) -> Option<Vec<BigRational>> {
        if self.variables().iter().any(|v| v != var) {
            return None;
        }
        let degree = self.degree_in(var) as usize;
        let mut coeffs = vec![BigRational::zero(); degree + 1];
        for (m, c) in &self.terms {
            let power = m.get(var).copied().unwrap_or(0) as usize;
            coeffs[power] = c.clone();
        }
        Some(coeffs)
    }

    /// Replaces every occurrence of `var` with `value`
    pub fn substitute(&self, var: &str, value: &Poly) -> Poly {
        let mut out = Poly::zero();
        for (power, rest) in self.coefficients_in(var) {
            out = out.add(&rest.mul(&value.pow(power)));
        }
        out
    }

    /// Value at `var = value`, when no other variable is present
    pub fn evaluate_at(&self, var: &str, value: &BigRational) -> Option<BigRational> {
        let coeffs = self.univariate_coefficients(var)?;
        Some(horner(&coeffs, value))
    }

    pub fn to_expr(&self) -> Expr {
        let mut terms: Vec<_> = self.terms.iter().collect();
        terms.sort_by(|(ma, _), (mb, _)| {
            let da: u32 = ma.values().sum();
            let db: u32 = mb.values().sum();
            db.cmp(&da).then_with(|| ma.cmp(mb))
        });

        let mut acc: Option<Expr> = None;
        for (m, c) in terms {
            let term = term_expr(m, &c.abs());
            acc = Some(match acc {
                None if c.is_negative() => term.neg(),
                None => term,
                Some(prev) if c.is_negative() => prev.sub(term),
                Some(prev) => prev.add(term),
            });
        }
        acc.unwrap_or_else(|| Expr::integer(0))
    }
}

fn term_expr(monomial: &Monomial, magnitude: &BigRational) -> Expr {
    let product = monomial
        .iter()
        .map(|(var, &e)| {
            if e == 1 {
                Expr::var(var)
            } else {
                Expr::var(var).pow(Expr::integer(i64::from(e)))
            }
        })
        .reduce(Expr::mul);

    match product {
        None => Expr::Number(magnitude.clone()),
        Some(product) if magnitude.is_one() => product,
        Some(product) => Expr::Number(magnitude.clone()).mul(product),
    }
}

/// Evaluates a dense polynomial, lowest power first
pub fn horner(coeffs: &[BigRational], x: &BigRational) -> BigRational {
    coeffs
        .iter()
        .rev()
        .fold(BigRational::zero(), |acc, c| acc * x + c)
}

/// `num / den`, kept with a constant denominator folded into the numerator
#[derive(Debug, Clone, PartialEq)]
pub struct Fraction {
    pub num: Poly,
    pub den: Poly,
}

impl Fraction {
    pub fn from_poly(num: Poly) -> Self {
        Self {
            num,
            den: Poly::constant(BigRational::one()),
        }
    }

    /// Builds `num / den`, or `None` when `den` is identically zero
    pub fn new(num: Poly, den: Poly) -> Option<Self> {
        if den.is_zero() {
            return None;
        }
        Some(Self { num, den }.normalized())
    }

    fn normalized(self) -> Self {
        match self.den.as_constant() {
            Some(c) if !c.is_one() => {
                Self::from_poly(self.num.scale(&c.recip()))
            }
            _ => self,
        }
    }

    pub fn has_constant_denominator(&self) -> bool {
        self.den.as_constant().is_some()
    }

    /// Lowers an expression tree, or `None` when it is not a rational function
    pub fn from_expr(expr: &Expr) -> Option<Self> {
        match expr {
            Expr::Number(n) => Some(Self::from_poly(Poly::constant(n.clone()))),
            Expr::Variable(name) => Some(Self::from_poly(Poly::variable(name))),
            Expr::Constant(_) | Expr::Call(..) => None,
            Expr::Neg(a) => {
                let a = Self::from_expr(a)?;
                Some(Self {
                    num: a.num.neg(),
                    den: a.den,
                })
            }
            Expr::Add(a, b) => Some(Self::from_expr(a)?.add(&Self::from_expr(b)?)),
            Expr::Sub(a, b) => Some(Self::from_expr(a)?.sub(&Self::from_expr(b)?)),
            Expr::Mul(a, b) => Self::from_expr(a)?.mul(&Self::from_expr(b)?),
            Expr::Div(a, b) => Self::from_expr(a)?.div(&Self::from_expr(b)?),
            Expr::Pow(base, exponent) => {
                let exponent = Self::from_expr(exponent)?;
                let exponent = exponent.num.as_constant()? / exponent.den.as_constant()?;
                if !exponent.is_integer() {
                    return None;
                }
                let n = exponent.to_integer().to_i64()?;
                if n.abs() > MAX_EXPANDED_POWER {
                    return None;
                }
                Self::from_expr(base)?.powi(n)
            }
        }
    }

    pub fn add(&self, other: &Fraction) -> Fraction {
        if self.den == other.den {
            return Self {
                num: self.num.add(&other.num),
                den: self.den.clone(),
            };
        }
        Self {
            num: self.num.mul(&other.den).add(&other.num.mul(&self.den)),
            den: self.den.mul(&other.den),
        }
        .normalized()
    }

    pub fn sub(&self, other: &Fraction) -> Fraction {
        self.add(&Fraction {
            num: other.num.neg(),
            den: other.den.clone(),
        })
    }

    pub fn mul(&self, other: &Fraction) -> Option<Fraction> {
        Self::new(self.num.mul(&other.num), self.den.mul(&other.den))
    }

    pub fn div(&self, other: &Fraction) -> Option<Fraction> {
        Self::new(self.num.mul(&other.den), self.den.mul(&other.num))
    }

    fn powi(&self, n: i64) -> Option<Fraction> {
        let magnitude = n.unsigned_abs() as u32;
        let num = self.num.pow(magnitude);
        let den = self.den.pow(magnitude);
        if n >= 0 {
            Self::new(num, den)
        } else {
            Self::new(den, num)
        }
    }

    pub fn to_expr(&self) -> Expr {
        match self.den.as_constant() {
            Some(c) if c.is_one() => self.num.to_expr(),
            Some(c) => self.num.scale(&c.recip()).to_expr(),
            None => self.num.to_expr().div(self.den.to_expr()),
        }
    }
}
