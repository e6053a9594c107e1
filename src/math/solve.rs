//! Equation solving and numeric evaluation.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Pow, Signed, ToPrimitive, Zero};

use super::expr::{Constant, Expr, Function, RelOp, Relation, Statement};
use super::latex::to_latex;
use super::poly::{Fraction, Poly, horner};
use crate::error::{FormulaError, FormulaResult};

/// Constant terms above this are not searched for rational roots
const MAX_ROOT_SEARCH: u64 = 1_000_000_000_000;

/// Upper bound on `p/q` pairs tried by the rational root search
const MAX_ROOT_CANDIDATES: usize = 20_000;

/// Largest exact integer power before evaluation switches to floats
const MAX_EXACT_POWER: i64 = 4096;

fn fail(message: impl Into<String>) -> FormulaError {
    FormulaError::SolveFailure(message.into())
}

/// What a solve produced
#[derive(Debug, Clone, PartialEq)]
pub enum SolutionSet {
    /// Values of `variable` that satisfy one equation, ascending when numeric
    Roots { variable: String, roots: Vec<Expr> },
    /// One value per variable, from a system
    Assignments(Vec<(String, Expr)>),
    /// Several solutions of a system, each like [`SolutionSet::Assignments`]
    AssignmentSets(Vec<Vec<(String, Expr)>>),
    /// `variable op bound`
    Inequality {
        variable: String,
        op: RelOp,
        bound: Expr,
    },
    /// Holds for every value
    Always,
    /// Holds for no value
    Empty,
}

impl SolutionSet {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Roots { roots, .. } => roots.is_empty(),
            Self::Assignments(values) => values.is_empty(),
            Self::AssignmentSets(sets) => sets.is_empty(),
            Self::Empty => true,
            _ => false,
        }
    }

    pub fn to_latex(&self) -> String {
        match self {
            Self::Roots { variable, roots } if !roots.is_empty() => roots
                .iter()
                .map(|root| format!("{} = {}", variable_latex(variable), to_latex(root)))
                .collect::<Vec<_>>()
                .join(r", \quad "),
            Self::Assignments(values) if !values.is_empty() => assignments_latex(values),
            Self::AssignmentSets(sets) if !sets.is_empty() => sets
                .iter()
                .map(|values| assignments_latex(values))
                .collect::<Vec<_>>()
                .join(r" \quad \text{or} \quad "),
            Self::Inequality {
                variable,
                op,
                bound,
            } => format!("{} {} {}", variable_latex(variable), op.latex(), to_latex(bound)),
            Self::Always => r"\text{True}".to_owned(),
            _ => r"\emptyset".to_owned(),
        }
    }
}

fn variable_latex(name: &str) -> String {
    to_latex(&Expr::var(name))
}

fn assignments_latex(values: &[(String, Expr)]) -> String {
    values
        .iter()
        .map(|(var, value)| format!("{} = {}", variable_latex(var), to_latex(value)))
        .collect::<Vec<_>>()
        .join(r", \quad ")
}

fn assignments_text(values: &[(String, Expr)]) -> String {
    let parts: Vec<String> = values
        .iter()
        .map(|(var, value)| format!("{var}: {value}"))
        .collect();
    format!("{{{}}}", parts.join(", "))
}

impl fmt::Display for SolutionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Roots { variable, roots } => {
                // A root that still mentions other unknowns is labelled
                let parametric = roots.iter().any(|root| !root.free_variables().is_empty());
                let parts: Vec<String> = roots
                    .iter()
                    .map(|root| {
                        if parametric {
                            format!("{{{variable}: {root}}}")
                        } else {
                            root.to_string()
                        }
                    })
                    .collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Assignments(values) => write!(f, "{}", assignments_text(values)),
            Self::AssignmentSets(sets) => {
                let parts: Vec<String> = sets.iter().map(|values| assignments_text(values)).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Self::Inequality {
                variable,
                op,
                bound,
            } => write!(f, "{variable} {} {bound}", op.symbol()),
            Self::Always => write!(f, "True"),
            Self::Empty => write!(f, "[]"),
        }
    }
}

/// Solves one equation or inequality for its variable
pub fn solve_single(statement: &Statement) -> FormulaResult<SolutionSet> {
    match statement {
        Statement::Expr(expr) => solve_equation(&Relation::new(
            expr.clone(),
            RelOp::Eq,
            Expr::integer(0),
        )),
        Statement::Relation(relation) if relation.op == RelOp::Eq => solve_equation(relation),
        Statement::Relation(relation) => solve_inequality(relation),
        Statement::System(rows) => match solve_system(rows)? {
            Some(solutions) => Ok(solutions),
            None => solve_by_substitution(rows)?
                .ok_or_else(|| fail("no solution found for the system of equations")),
        },
    }
}

fn lower(relation: &Relation) -> FormulaResult<Fraction> {
    Fraction::from_expr(&relation.difference()).ok_or_else(|| {
        fail(format!(
            "'{relation}' is not a polynomial or rational equation"
        ))
    })
}

fn solve_equation(relation: &Relation) -> FormulaResult<SolutionSet> {
    let fraction = lower(relation)?;
    let variables = fraction.num.variables();

    if variables.is_empty() {
        return Ok(if fraction.num.is_zero() {
            SolutionSet::Always
        } else {
            SolutionSet::Empty
        });
    }

    // Prefer a variable the equation is linear in
    if let Some(var) = variables.iter().find(|v| fraction.num.degree_in(v) == 1) {
        let coeffs = fraction.num.coefficients_in(var);
        let slope = coeffs.get(&1).cloned().unwrap_or_default();
        let offset = coeffs.get(&0).cloned().unwrap_or_default();
        let Some(root) = Fraction::new(offset.neg(), slope) else {
            return Ok(SolutionSet::Empty);
        };

        let excluded = match root.num.as_constant().zip(root.den.as_constant()) {
            Some((n, d)) => denominator_vanishes(&fraction.den, var, &(n / d)),
            None => false,
        };
        let roots = if excluded { Vec::new() } else { vec![root.to_expr()] };
        return Ok(SolutionSet::Roots {
            variable: var.clone(),
            roots,
        });
    }

    if variables.len() > 1 {
        return Err(fail(
            "nonlinear equations in several variables are not supported",
        ));
    }

    let Some(var) = variables.iter().next() else {
        return Ok(SolutionSet::Empty);
    };
    let Some(coeffs) = fraction.num.univariate_coefficients(var) else {
        return Err(fail("unsupported equation"));
    };
    let roots = polynomial_roots(&coeffs)?
        .into_iter()
        .filter(|root| match root {
            Root::Rational(value) => !denominator_vanishes(&fraction.den, var, value),
            Root::Irrational { approx, .. } => fraction
                .den
                .univariate_coefficients(var)
                .map(|den| {
                    let den: Vec<f64> = den.iter().map(|c| c.to_f64().unwrap_or(0.0)).collect();
                    horner_f64(&den, *approx).abs() > 1e-12
                })
                .unwrap_or(true),
        })
        .map(Root::into_expr)
        .collect();

    Ok(SolutionSet::Roots {
        variable: var.clone(),
        roots,
    })
}

fn denominator_vanishes(den: &Poly, var: &str, value: &BigRational) -> bool {
    den.evaluate_at(var, value).is_some_and(|v| v.is_zero())
}

fn horner_f64(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn solve_inequality(relation: &Relation) -> FormulaResult<SolutionSet> {
    let fraction = lower(relation)?;
    let Some(den) = fraction.den.as_constant() else {
        return Err(fail("inequalities with a variable denominator are not supported"));
    };
    // Dividing through by a negative denominator flips the direction
    let op = if den.is_negative() {
        relation.op.flipped()
    } else {
        relation.op
    };

    let variables = fraction.num.variables();
    if variables.is_empty() {
        let value = fraction.num.as_constant().unwrap_or_default();
        let holds = match op {
            RelOp::Eq => value.is_zero(),
            RelOp::Neq => !value.is_zero(),
            RelOp::Lt => value.is_negative(),
            RelOp::Gt => value.is_positive(),
            RelOp::Leq => !value.is_positive(),
            RelOp::Geq => !value.is_negative(),
        };
        return Ok(if holds {
            SolutionSet::Always
        } else {
            SolutionSet::Empty
        });
    }

    let mut names = variables.iter();
    let (Some(var), None) = (names.next(), names.next()) else {
        return Err(fail("inequalities in several variables are not supported"));
    };
    let Some(coeffs) = fraction.num.univariate_coefficients(var) else {
        return Err(fail("unsupported inequality"));
    };
    if coeffs.len() != 2 {
        return Err(fail("only linear inequalities are supported"));
    }

    let bound = -&coeffs[0] / &coeffs[1];
    let op = if coeffs[1].is_negative() { op.flipped() } else { op };
    Ok(SolutionSet::Inequality {
        variable: var.clone(),
        op,
        bound: Expr::Number(bound),
    })
}

/// Solves a linear system exactly.
///
/// `Ok(None)` means the system is outside what this solver handles
/// (non-linear rows, inequalities, free parameters), so the caller may try
/// something else. An inconsistent system is `Some(SolutionSet::Empty)`.
pub fn solve_system(rows: &[Relation]) -> FormulaResult<Option<SolutionSet>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let mut equations = Vec::with_capacity(rows.len());
    for row in rows {
        if row.op != RelOp::Eq {
            return Ok(None);
        }
        let Some(fraction) = Fraction::from_expr(&row.difference()) else {
            return Ok(None);
        };
        if !fraction.has_constant_denominator() || fraction.num.total_degree() > 1 {
            return Ok(None);
        }
        equations.push(fraction.num);
    }

    let variables: Vec<String> = equations
        .iter()
        .flat_map(Poly::variables)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if variables.is_empty() {
        return Ok(None);
    }

    // Augmented matrix: one column per variable, then the right-hand side
    let mut matrix: Vec<Vec<BigRational>> = equations
        .iter()
        .map(|poly| {
            let mut row: Vec<BigRational> = variables
                .iter()
                .map(|var| {
                    poly.coefficients_in(var)
                        .get(&1)
                        .and_then(Poly::as_constant)
                        .unwrap_or_default()
                })
                .collect();
            let constant = poly
                .coefficients_in(variables[0].as_str())
                .get(&0)
                .map(|rest| {
                    variables[1..]
                        .iter()
                        .fold(rest.clone(), |p, var| {
                            p.coefficients_in(var).remove(&0).unwrap_or_default()
                        })
                })
                .and_then(|p| p.as_constant())
                .unwrap_or_default();
            row.push(-constant);
            row
        })
        .collect();

    let columns = variables.len();
    let mut pivot_row = 0;
    let mut pivots = Vec::new();
    for col in 0..columns {
        let Some(found) = (pivot_row..matrix.len()).find(|&r| !matrix[r][col].is_zero()) else {
            continue;
        };
        matrix.swap(pivot_row, found);

        let pivot = matrix[pivot_row][col].clone();
        for value in matrix[pivot_row].iter_mut() {
            *value = &*value / &pivot;
        }
        for r in 0..matrix.len() {
            if r == pivot_row || matrix[r][col].is_zero() {
                continue;
            }
            let factor = matrix[r][col].clone();
            for c in 0..=columns {
                let delta = &factor * &matrix[pivot_row][c];
                matrix[r][c] -= delta;
            }
        }
        pivots.push(col);
        pivot_row += 1;
    }

    let inconsistent = matrix[pivot_row..]
        .iter()
        .any(|row| row[..columns].iter().all(Zero::is_zero) && !row[columns].is_zero());
    if inconsistent {
        return Ok(Some(SolutionSet::Empty));
    }
    if pivots.len() < columns {
        log::debug!("system has free parameters, leaving it to the single solver");
        return Ok(None);
    }

    let assignments = variables
        .into_iter()
        .enumerate()
        .map(|(i, var)| (var, Expr::Number(matrix[i][columns].clone())))
        .collect();
    Ok(Some(SolutionSet::Assignments(assignments)))
}

/// One solution of a system: variable and its value, which may still
/// mention unknowns left free
type Assignment = Vec<(String, Poly)>;

/// Solves polynomial equations by eliminating one variable at a time.
///
/// Handles what [`solve_system`] leaves out: products of unknowns, powers
/// and free parameters. Only rational solutions can be carried back through
/// the substitutions; `Ok(None)` when the system needs anything else.
pub fn solve_by_substitution(rows: &[Relation]) -> FormulaResult<Option<SolutionSet>> {
    let mut equations = Vec::with_capacity(rows.len());
    for row in rows {
        if row.op != RelOp::Eq {
            return Ok(None);
        }
        let Some(fraction) = Fraction::from_expr(&row.difference()) else {
            return Ok(None);
        };
        if !fraction.has_constant_denominator() {
            return Ok(None);
        }
        equations.push(fraction.num);
    }

    let Some(mut solutions) = eliminate(equations)? else {
        return Ok(None);
    };
    for solution in &mut solutions {
        solution.sort_by(|(a, _), (b, _)| a.cmp(b));
    }

    let mut sets: Vec<Vec<(String, Expr)>> = solutions
        .into_iter()
        .map(|solution| {
            solution
                .into_iter()
                .map(|(var, value)| (var, value.to_expr()))
                .collect()
        })
        .collect();
    Ok(Some(match sets.len() {
        0 => SolutionSet::Empty,
        1 => SolutionSet::Assignments(sets.remove(0)),
        _ => SolutionSet::AssignmentSets(sets),
    }))
}

fn eliminate(equations: Vec<Poly>) -> FormulaResult<Option<Vec<Assignment>>> {
    let equations: Vec<Poly> = equations.into_iter().filter(|p| !p.is_zero()).collect();
    if equations.iter().any(|p| p.as_constant().is_some()) {
        // A nonzero constant row can never hold
        return Ok(Some(Vec::new()));
    }
    if equations.is_empty() {
        return Ok(Some(vec![Vec::new()]));
    }

    if let Some((index, var, value)) = find_linear_unknown(&equations) {
        let rest: Vec<Poly> = equations
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, p)| p.substitute(&var, &value))
            .collect();
        let Some(solutions) = eliminate(rest)? else {
            return Ok(None);
        };
        return Ok(Some(
            solutions
                .into_iter()
                .map(|mut solution| {
                    let resolved = solution
                        .iter()
                        .fold(value.clone(), |acc, (name, v)| acc.substitute(name, v));
                    solution.push((var.clone(), resolved));
                    solution
                })
                .collect(),
        ));
    }

    // Otherwise an equation in a single unknown pins it down
    let Some((index, var, coeffs)) = equations.iter().enumerate().find_map(|(i, p)| {
        let vars = p.variables();
        let mut names = vars.iter();
        match (names.next(), names.next()) {
            (Some(var), None) => p.univariate_coefficients(var).map(|c| (i, var.clone(), c)),
            _ => None,
        }
    }) else {
        return Ok(None);
    };

    let mut solutions = Vec::new();
    for root in polynomial_roots(&coeffs)? {
        let Root::Rational(value) = root else {
            return Ok(None);
        };
        let value = Poly::constant(value);
        let rest: Vec<Poly> = equations
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, p)| p.substitute(&var, &value))
            .collect();
        let Some(branch) = eliminate(rest)? else {
            return Ok(None);
        };
        solutions.extend(branch.into_iter().map(|mut solution| {
            solution.push((var.clone(), value.clone()));
            solution
        }));
    }
    Ok(Some(solutions))
}

/// An equation that is linear in some unknown with a constant coefficient,
/// with that unknown expressed through the others
fn find_linear_unknown(equations: &[Poly]) -> Option<(usize, String, Poly)> {
    equations.iter().enumerate().find_map(|(i, poly)| {
        poly.variables().into_iter().find_map(|var| {
            if poly.degree_in(&var) != 1 {
                return None;
            }
            let mut coeffs = poly.coefficients_in(&var);
            let slope = coeffs.get(&1)?.as_constant()?;
            let offset = coeffs.remove(&0).unwrap_or_default();
            let value = offset.scale(&-slope.recip());
            Some((i, var, value))
        })
    })
}

/// A real root of a univariate polynomial
#[derive(Debug, Clone)]
enum Root {
    Rational(BigRational),
    /// `center + offset * sqrt(radicand)` with a square-free radicand
    Irrational {
        center: BigRational,
        offset: BigRational,
        radicand: BigInt,
        approx: f64,
    },
}

impl Root {
    fn approx(&self) -> f64 {
        match self {
            Self::Rational(value) => value.to_f64().unwrap_or(f64::NAN),
            Self::Irrational { approx, .. } => *approx,
        }
    }

    fn into_expr(self) -> Expr {
        match self {
            Self::Rational(value) => Expr::Number(value),
            Self::Irrational {
                center,
                offset,
                radicand,
                ..
            } => {
                let sqrt = Expr::call(
                    Function::Sqrt,
                    Expr::Number(BigRational::from_integer(radicand)),
                );
                let scaled = if offset.abs().is_one() {
                    sqrt
                } else {
                    Expr::Number(offset.abs()).mul(sqrt)
                };
                match (center.is_zero(), offset.is_negative()) {
                    (true, true) => scaled.neg(),
                    (true, false) => scaled,
                    (false, true) => Expr::Number(center).sub(scaled),
                    (false, false) => Expr::Number(center).add(scaled),
                }
            }
        }
    }
}

/// Real roots of a polynomial given lowest power first, without repeats
fn polynomial_roots(coeffs: &[BigRational]) -> FormulaResult<Vec<Root>> {
    let mut coeffs: Vec<BigRational> = coeffs.to_vec();
    while coeffs.last().is_some_and(Zero::is_zero) {
        coeffs.pop();
    }

    let mut roots: Vec<Root> = Vec::new();
    if coeffs.first().is_some_and(Zero::is_zero) {
        roots.push(Root::Rational(BigRational::zero()));
        let shift = coeffs.iter().take_while(|c| c.is_zero()).count();
        coeffs.drain(..shift);
    }

    for candidate in rational_root_candidates(&coeffs) {
        if coeffs.len() <= 1 {
            break;
        }
        if horner(&coeffs, &candidate).is_zero() {
            while coeffs.len() > 1 && horner(&coeffs, &candidate).is_zero() {
                coeffs = deflate(&coeffs, &candidate);
            }
            roots.push(Root::Rational(candidate));
        }
    }

    match coeffs.len() {
        0 | 1 => {}
        2 => roots.push(Root::Rational(-&coeffs[0] / &coeffs[1])),
        3 => roots.extend(quadratic_roots(&coeffs[2], &coeffs[1], &coeffs[0])),
        n => {
            return Err(fail(format!(
                "cannot solve a degree {} polynomial exactly",
                n - 1
            )));
        }
    }

    roots.sort_by(|a, b| a.approx().partial_cmp(&b.approx()).unwrap_or(Ordering::Equal));
    Ok(roots)
}

/// Synthetic division by `(x - root)`
fn deflate(coeffs: &[BigRational], root: &BigRational) -> Vec<BigRational> {
    let degree = coeffs.len() - 1;
    let mut quotient = vec![BigRational::zero(); degree];
    let mut carry = BigRational::zero();
    for i in (1..=degree).rev() {
        carry = &coeffs[i] + carry * root;
        quotient[i - 1] = carry.clone();
    }
    quotient
}

fn divisors(n: &BigInt) -> Option<Vec<u64>> {
    let n = n.abs().to_u64()?;
    if n == 0 || n > MAX_ROOT_SEARCH {
        return None;
    }
    let mut out = Vec::new();
    let mut d = 1u64;
    while d * d <= n {
        if n % d == 0 {
            out.push(d);
            if d != n / d {
                out.push(n / d);
            }
        }
        d += 1;
    }
    Some(out)
}

/// `±p/q` with `p | a0` and `q | an`, after clearing denominators and the
/// common factor of the coefficients. Empty when there are too many to try.
fn rational_root_candidates(coeffs: &[BigRational]) -> BTreeSet<BigRational> {
    if coeffs.len() < 2 {
        return BTreeSet::new();
    }
    let lcm = coeffs
        .iter()
        .fold(BigInt::one(), |acc, c| acc.lcm(c.denom()));
    let scaled: Vec<BigInt> = coeffs
        .iter()
        .map(|c| (c * BigRational::from_integer(lcm.clone())).to_integer())
        .collect();
    let content = scaled.iter().fold(BigInt::zero(), |acc, c| acc.gcd(c));
    if content.is_zero() {
        return BTreeSet::new();
    }

    let (Some(ps), Some(qs)) = (
        divisors(&(&scaled[0] / &content)),
        divisors(&(&scaled[scaled.len() - 1] / &content)),
    ) else {
        return BTreeSet::new();
    };
    if ps.len() * qs.len() > MAX_ROOT_CANDIDATES {
        log::debug!(
            "skipping rational root search over {} candidates",
            2 * ps.len() * qs.len()
        );
        return BTreeSet::new();
    }

    let mut candidates = BTreeSet::new();
    for &p in &ps {
        for &q in &qs {
            // Unreduced pairs repeat a value already produced by the reduced one
            if p.gcd(&q) != 1 {
                continue;
            }
            let value = BigRational::new(BigInt::from(p), BigInt::from(q));
            candidates.insert(-value.clone());
            candidates.insert(value);
        }
    }
    candidates
}

/// Splits `n` into `k² · m` with `m` square-free, for modest `n`
fn extract_square(n: &BigInt) -> (BigInt, BigInt) {
    let Some(mut rest) = n.to_u64().filter(|v| *v <= MAX_ROOT_SEARCH) else {
        return (BigInt::one(), n.clone());
    };
    let mut outside = 1u64;
    let mut p = 2u64;
    while p * p <= rest {
        while rest % (p * p) == 0 {
            rest /= p * p;
            outside *= p;
        }
        p += 1;
    }
    (BigInt::from(outside), BigInt::from(rest))
}

fn quadratic_roots(a: &BigRational, b: &BigRational, c: &BigRational) -> Vec<Root> {
    let disc = b * b - BigRational::from_integer(4.into()) * a * c;
    let two_a = a * BigRational::from_integer(2.into());
    let center = -b / &two_a;

    match disc.cmp(&BigRational::zero()) {
        Ordering::Less => Vec::new(),
        Ordering::Equal => vec![Root::Rational(center)],
        Ordering::Greater => {
            if let Some(root) = exact_sqrt(&disc) {
                let offset = root / &two_a;
                return vec![
                    Root::Rational(&center - &offset),
                    Root::Rational(&center + &offset),
                ];
            }
            // sqrt(n/d) = sqrt(n·d) / d
            let (outside, radicand) = extract_square(&(disc.numer() * disc.denom()));
            let offset = BigRational::new(outside, disc.denom().clone()) / &two_a;
            let center_f = center.to_f64().unwrap_or(f64::NAN);
            let spread = offset.to_f64().unwrap_or(f64::NAN)
                * radicand.to_f64().unwrap_or(f64::NAN).sqrt();
            let mut roots = vec![
                Root::Irrational {
                    center: center.clone(),
                    offset: -offset.clone(),
                    radicand: radicand.clone(),
                    approx: center_f - spread,
                },
                Root::Irrational {
                    center,
                    offset,
                    radicand,
                    approx: center_f + spread,
                },
            ];
            roots.sort_by(|x, y| x.approx().partial_cmp(&y.approx()).unwrap_or(Ordering::Equal));
            roots
        }
    }
}

/// The rational square root of `value`, when it has one
fn exact_sqrt(value: &BigRational) -> Option<BigRational> {
    exact_root(value, 2)
}

fn exact_root(value: &BigRational, n: u32) -> Option<BigRational> {
    if value.is_negative() && n % 2 == 0 {
        return None;
    }
    let root_of = |x: &BigInt| {
        let r = x.nth_root(n);
        (Pow::pow(&r, n) == *x).then_some(r)
    };
    Some(BigRational::new(
        root_of(value.numer())?,
        root_of(value.denom())?,
    ))
}

/// Result of a numeric evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Exact(BigRational),
    Approx(f64),
}

impl Value {
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Exact(value) => value.to_f64().unwrap_or(f64::NAN),
            Self::Approx(value) => *value,
        }
    }

    pub fn to_latex(&self) -> String {
        match self {
            Self::Exact(value) if terminating_decimal(value).is_none() => {
                let sign = if value.is_negative() { "-" } else { "" };
                format!(r"{sign}\frac{{{}}}{{{}}}", value.numer().abs(), value.denom())
            }
            _ => self.to_string(),
        }
    }
}

/// Decimal text for rationals whose denominator only has factors 2 and 5
fn terminating_decimal(value: &BigRational) -> Option<String> {
    if value.is_integer() {
        return Some(value.numer().to_string());
    }
    let mut den = value.denom().clone();
    let two = BigInt::from(2u32);
    let five = BigInt::from(5u32);
    let mut twos = 0usize;
    let mut fives = 0usize;
    while den.is_multiple_of(&two) {
        den /= &two;
        twos += 1;
    }
    while den.is_multiple_of(&five) {
        den /= &five;
        fives += 1;
    }
    if !den.is_one() {
        return None;
    }
    let places = twos.max(fives);

    let scaled = value * BigRational::from_integer(Pow::pow(BigInt::from(10u32), places));
    let digits = scaled.to_integer().abs().to_string();
    let digits = format!("{digits:0>width$}", width = places + 1);
    let (whole, fraction) = digits.split_at(digits.len() - places);
    let sign = if value.is_negative() { "-" } else { "" };
    Some(format!("{sign}{whole}.{fraction}"))
}

/// Up to 15 significant digits with trailing zeros dropped
fn format_float(value: f64) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    let magnitude = value.abs().log10().floor() as i32;
    if !(-6..15).contains(&magnitude) {
        return format!("{value:e}");
    }
    let decimals = (14 - magnitude).clamp(0, 15) as usize;
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        text
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(value) => match terminating_decimal(value) {
                Some(text) => write!(f, "{text}"),
                None => write!(f, "{}/{}", value.numer(), value.denom()),
            },
            Self::Approx(value) => write!(f, "{}", format_float(*value)),
        }
    }
}

/// Evaluates a closed expression, exactly when the arithmetic allows
pub fn evaluate(expr: &Expr) -> FormulaResult<Value> {
    let value = eval(expr)?;
    match value {
        Value::Approx(v) if !v.is_finite() => Err(fail("the result is not a finite real number")),
        other => Ok(other),
    }
}

fn binary(
    a: Value,
    b: Value,
    exact: impl FnOnce(BigRational, BigRational) -> BigRational,
    approx: impl FnOnce(f64, f64) -> f64,
) -> Value {
    match (a, b) {
        (Value::Exact(a), Value::Exact(b)) => Value::Exact(exact(a, b)),
        (a, b) => Value::Approx(approx(a.to_f64(), b.to_f64())),
    }
}

fn eval(expr: &Expr) -> FormulaResult<Value> {
    Ok(match expr {
        Expr::Number(n) => Value::Exact(n.clone()),
        Expr::Constant(Constant::Pi) => Value::Approx(std::f64::consts::PI),
        Expr::Constant(Constant::E) => Value::Approx(std::f64::consts::E),
        Expr::Variable(name) => {
            return Err(fail(format!("cannot evaluate, '{name}' has no value")));
        }
        Expr::Neg(a) => match eval(a)? {
            Value::Exact(v) => Value::Exact(-v),
            Value::Approx(v) => Value::Approx(-v),
        },
        Expr::Add(a, b) => binary(eval(a)?, eval(b)?, |x, y| x + y, |x, y| x + y),
        Expr::Sub(a, b) => binary(eval(a)?, eval(b)?, |x, y| x - y, |x, y| x - y),
        Expr::Mul(a, b) => binary(eval(a)?, eval(b)?, |x, y| x * y, |x, y| x * y),
        Expr::Div(a, b) => {
            let divisor = eval(b)?;
            if divisor.to_f64() == 0.0 || matches!(&divisor, Value::Exact(d) if d.is_zero()) {
                return Err(fail("division by zero"));
            }
            binary(eval(a)?, divisor, |x, y| x / y, |x, y| x / y)
        }
        Expr::Pow(base, exponent) => eval_pow(eval(base)?, eval(exponent)?)?,
        Expr::Call(function, arg) => eval_call(*function, eval(arg)?)?,
    })
}

fn eval_pow(base: Value, exponent: Value) -> FormulaResult<Value> {
    if let (Value::Exact(b), Value::Exact(e)) = (&base, &exponent) {
        if e.is_integer() {
            if let Some(n) = e.to_integer().to_i64().filter(|n| n.abs() <= MAX_EXACT_POWER) {
                if b.is_zero() && n < 0 {
                    return Err(fail("division by zero"));
                }
                return Ok(Value::Exact(Pow::pow(b, n as i32)));
            }
        } else if let Some(q) = e.denom().to_u32() {
            if let Some(root) = exact_root(b, q) {
                let p = e.numer().to_i32().filter(|p| i64::from(p.abs()) <= MAX_EXACT_POWER);
                if let Some(p) = p {
                    if root.is_zero() && p < 0 {
                        return Err(fail("division by zero"));
                    }
                    return Ok(Value::Exact(Pow::pow(&root, p)));
                }
            }
        }
    }

    let (b, e) = (base.to_f64(), exponent.to_f64());
    if b < 0.0 && e.fract() != 0.0 {
        return Err(fail("the result is not a real number"));
    }
    Ok(Value::Approx(b.powf(e)))
}

fn eval_call(function: Function, arg: Value) -> FormulaResult<Value> {
    match (function, &arg) {
        (Function::Abs, Value::Exact(v)) => return Ok(Value::Exact(v.abs())),
        (Function::Sqrt, Value::Exact(v)) => {
            if v.is_negative() {
                return Err(fail("square root of a negative number"));
            }
            if let Some(root) = exact_sqrt(v) {
                return Ok(Value::Exact(root));
            }
        }
        (Function::Sqrt, Value::Approx(v)) if *v < 0.0 => {
            return Err(fail("square root of a negative number"));
        }
        _ => {}
    }

    let x = arg.to_f64();
    let result = function.apply(x);
    if result.is_nan() {
        return Err(fail(format!("{}({x}) is not a real number", function.name())));
    }
    Ok(Value::Approx(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::parser::{parse_expression, parse_statement};

    fn solve(text: &str) -> SolutionSet {
        solve_single(&parse_statement(text).unwrap()).unwrap()
    }

    fn value(text: &str) -> String {
        evaluate(&parse_expression(text).unwrap()).unwrap().to_string()
    }

    #[test]
    fn linear_equation() {
        assert_eq!(solve("2x + 1 = 7").to_string(), "[3]");
    }

    #[test]
    fn quadratic_with_rational_roots() {
        assert_eq!(solve("x^2 - 5x + 6 = 0").to_string(), "[2, 3]");
    }

    #[test]
    fn quadratic_with_irrational_roots() {
        assert_eq!(solve("x^2 = 8").to_string(), "[-2*sqrt(2), 2*sqrt(2)]");
    }

    #[test]
    fn no_real_roots() {
        assert_eq!(solve("x^2 + 1 = 0"), SolutionSet::Roots {
            variable: "x".into(),
            roots: vec![],
        });
    }

    #[test]
    fn cubic_is_deflated() {
        assert_eq!(solve("x^3 - 6x^2 + 11x - 6 = 0").to_string(), "[1, 2, 3]");
    }

    #[test]
    fn pole_is_not_a_root() {
        assert_eq!(solve(r"\frac{x^2 - 1}{x - 1} = 0").to_string(), "[-1]");
    }

    #[test]
    fn linear_inequality_flips_on_negative_slope() {
        assert_eq!(solve("-2x > 4").to_string(), "x < -2");
    }

    #[test]
    fn contradiction_is_empty() {
        assert_eq!(solve("x - x = 1"), SolutionSet::Empty);
    }

    #[test]
    fn inconsistent_system_is_empty() {
        let Statement::System(rows) =
            parse_statement(r"\begin{cases} x + y = 1 \\ x + y = 2 \end{cases}").unwrap()
        else {
            panic!("expected a system");
        };
        assert_eq!(solve_system(&rows).unwrap(), Some(SolutionSet::Empty));
    }

    #[test]
    fn nonlinear_system_is_left_to_the_caller() {
        let Statement::System(rows) =
            parse_statement(r"\begin{cases} xy = 1 \\ x + y = 2 \end{cases}").unwrap()
        else {
            panic!("expected a system");
        };
        assert_eq!(solve_system(&rows).unwrap(), None);
    }

    fn system(text: &str) -> Vec<Relation> {
        match parse_statement(text).unwrap() {
            Statement::System(rows) => rows,
            other => panic!("expected a system, got {other:?}"),
        }
    }

    #[test]
    fn single_solver_accepts_systems() {
        assert_eq!(solve(r"\begin{cases} 2x = 4 \\ x + 1 = 3 \end{cases}").to_string(), "{x: 2}");
        assert_eq!(
            solve(r"\begin{cases} x+y+z=6 \\ x-y=0 \\ x+z=4 \end{cases}").to_string(),
            "{x: 2, y: 2, z: 2}"
        );
    }

    #[test]
    fn nonlinear_system_is_solved_by_substitution() {
        let rows = system(r"\begin{cases} xy = 6 \\ x + y = 5 \end{cases}");
        assert_eq!(
            solve_by_substitution(&rows).unwrap().unwrap().to_string(),
            "[{x: 3, y: 2}, {x: 2, y: 3}]"
        );
    }

    #[test]
    fn dependent_system_keeps_a_free_parameter() {
        let rows = system(r"\begin{cases} x + y = 5 \\ 2x + 2y = 10 \end{cases}");
        assert_eq!(solve_system(&rows).unwrap(), None);
        assert_eq!(solve_by_substitution(&rows).unwrap().unwrap().to_string(), "{x: -y + 5}");
    }

    #[test]
    fn substitution_finds_contradictions() {
        let rows = system(r"\begin{cases} x^2 = 4 \\ x = 3 \end{cases}");
        assert_eq!(solve_by_substitution(&rows).unwrap(), Some(SolutionSet::Empty));
    }

    #[test]
    fn irrational_branches_are_not_substituted() {
        let rows = system(r"\begin{cases} x^2 = 2 \\ xy = 1 \end{cases}");
        assert_eq!(solve_by_substitution(&rows).unwrap(), None);
        assert!(solve_single(&Statement::System(rows)).is_err());
    }

    #[test]
    fn parametric_roots_name_their_variable() {
        assert_eq!(solve("x + y = 5").to_string(), "[{x: -y + 5}]");
    }

    #[test]
    fn common_factor_is_removed_before_the_root_search() {
        assert_eq!(solve("720720x^3 = 720720").to_string(), "[1]");
        let coeffs: Vec<BigRational> = [-720720, 0, 0, 720720]
            .into_iter()
            .map(|c| BigRational::from_integer(BigInt::from(c)))
            .collect();
        assert_eq!(rational_root_candidates(&coeffs).len(), 2);
    }

    #[test]
    fn root_candidates_are_reduced_and_unique() {
        // 6x^2 - 5x + 1 = (2x - 1)(3x - 1)
        let coeffs: Vec<BigRational> = [1, -5, 6]
            .into_iter()
            .map(|c| BigRational::from_integer(BigInt::from(c)))
            .collect();
        let candidates = rational_root_candidates(&coeffs);
        assert_eq!(candidates.len(), 8);
        assert!(candidates.contains(&BigRational::new(BigInt::from(1), BigInt::from(3))));
    }

    #[test]
    fn evaluation_stays_exact() {
        assert_eq!(value(r"\frac{1}{3} + \frac{1}{6}"), "0.5");
        assert_eq!(value("1/3"), "1/3");
        assert_eq!(value(r"\sqrt{16} + 2^{10}"), "1028");
    }

    #[test]
    fn evaluation_falls_back_to_floats() {
        let pi = evaluate(&parse_expression(r"\pi").unwrap()).unwrap();
        assert!(matches!(pi, Value::Approx(_)));
        assert_eq!(pi.to_string(), "3.14159265358979");

        let half = evaluate(&parse_expression(r"\sin{\frac{\pi}{6}}").unwrap()).unwrap();
        approx::assert_relative_eq!(half.to_f64(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn division_by_zero_fails() {
        assert!(evaluate(&parse_expression("1/0").unwrap()).is_err());
    }

    #[test]
    fn latex_fraction_value() {
        let third = evaluate(&parse_expression("1/3").unwrap()).unwrap();
        assert_eq!(third.to_latex(), r"\frac{1}{3}");
    }
}
