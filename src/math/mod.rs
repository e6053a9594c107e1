//! Symbolic math used to classify and solve recognized formulas.
//!
//! The pipeline only talks to [`SymbolicEngine`]; [`BuiltinEngine`] is the
//! implementation shipped with the crate.

pub mod expr;
pub mod latex;
pub mod lexer;
pub mod parser;
pub mod poly;
pub mod solve;

use std::collections::BTreeSet;

pub use expr::{Expr, RelOp, Relation, Statement};
pub use solve::{SolutionSet, Value};

use crate::error::FormulaResult;

/// Parse, solve and evaluate operations the solve dispatcher relies on.
///
/// A parse failure is always [`crate::FormulaError::ParseFailure`], distinct
/// from a solve that finds nothing.
pub trait SymbolicEngine: Send + Sync {
    /// Parses LaTeX
    fn parse(&self, text: &str) -> FormulaResult<Statement>;

    /// Parses calculator notation (`2*x**2`, `sqrt(2)`)
    fn parse_plain(&self, text: &str) -> FormulaResult<Statement>;

    fn free_variables(&self, statement: &Statement) -> BTreeSet<String> {
        statement.free_variables()
    }

    fn solve_single(&self, statement: &Statement) -> FormulaResult<SolutionSet>;

    /// `Ok(None)` when the system is outside what the engine can solve jointly
    fn solve_system(&self, rows: &[Relation]) -> FormulaResult<Option<SolutionSet>>;

    fn evaluate(&self, expr: &Expr) -> FormulaResult<Value>;

    /// Collects like terms of an expression that still has unknowns
    fn simplify(&self, expr: &Expr) -> Expr;

    fn to_latex(&self, expr: &Expr) -> String;
}

/// Exact rational arithmetic engine
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinEngine;

impl SymbolicEngine for BuiltinEngine {
    fn parse(&self, text: &str) -> FormulaResult<Statement> {
        parser::parse_statement(text)
    }

    fn parse_plain(&self, text: &str) -> FormulaResult<Statement> {
        parser::parse_plain_statement(text)
    }

    fn solve_single(&self, statement: &Statement) -> FormulaResult<SolutionSet> {
        solve::solve_single(statement)
    }

    fn solve_system(&self, rows: &[Relation]) -> FormulaResult<Option<SolutionSet>> {
        solve::solve_system(rows)
    }

    fn evaluate(&self, expr: &Expr) -> FormulaResult<Value> {
        solve::evaluate(expr)
    }

    fn simplify(&self, expr: &Expr) -> Expr {
        poly::Fraction::from_expr(expr).map_or_else(|| expr.clone(), |fraction| fraction.to_expr())
    }

    fn to_latex(&self, expr: &Expr) -> String {
        latex::to_latex(expr)
    }
}
