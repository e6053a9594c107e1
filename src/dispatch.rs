//! Routes a classified formula to the matching solving strategy.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::classify::Category;
use crate::error::{FormulaError, FormulaResult};
use crate::math::latex::to_latex;
use crate::math::{Expr, RelOp, Relation, SolutionSet, Statement, SymbolicEngine, Value};

static CASES_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\begin\{cases\}([\s\S]*)\\end\{cases\}").expect("valid regex literal")
});

// `\\`, optionally followed by a spacing argument such as `[2pt]`
static ROW_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\\(?:\s*\[[^\]]*\])?").expect("valid regex literal"));

/// How results are rendered for the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain text like `{x: 3, y: 2}`
    #[default]
    Native,
    /// LaTeX like `x = 3, \quad y = 2`
    Latex,
}

/// Outcome of one dispatch; errors are values here, not `Err`
#[derive(Debug, Clone, PartialEq)]
pub enum SolveResult {
    Solutions(SolutionSet),
    Value(Value),
    /// Calculation left in terms of its unknowns
    Expression(Expr),
    Error(FormulaError),
}

impl SolveResult {
    pub fn is_error(&self) -> bool {
        matches!(self, SolveResult::Error(_))
    }

    pub fn render(&self, format: OutputFormat) -> String {
        match (self, format) {
            (SolveResult::Solutions(solutions), OutputFormat::Latex) => solutions.to_latex(),
            (SolveResult::Value(value), OutputFormat::Latex) => value.to_latex(),
            (SolveResult::Expression(expr), OutputFormat::Latex) => to_latex(expr),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for SolveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveResult::Solutions(solutions) => write!(f, "{solutions}"),
            SolveResult::Value(value) => write!(f, "{value}"),
            SolveResult::Expression(expr) => write!(f, "{expr}"),
            SolveResult::Error(err) => write!(f, "Error: {err}"),
        }
    }
}

impl From<FormulaResult<SolutionSet>> for SolveResult {
    fn from(result: FormulaResult<SolutionSet>) -> Self {
        match result {
            Ok(solutions) => SolveResult::Solutions(solutions),
            Err(err) => SolveResult::Error(err),
        }
    }
}

impl From<FormulaResult<Calculated>> for SolveResult {
    fn from(result: FormulaResult<Calculated>) -> Self {
        match result {
            Ok(Calculated::Value(value)) => SolveResult::Value(value),
            Ok(Calculated::Symbolic(expr)) => SolveResult::Expression(expr),
            Err(err) => SolveResult::Error(err),
        }
    }
}

/// What a calculation reduces to
#[derive(Debug, Clone, PartialEq)]
pub enum Calculated {
    Value(Value),
    /// Simplified form, when unknowns remain
    Symbolic(Expr),
}

pub struct SolveDispatcher<'e> {
    engine: &'e dyn SymbolicEngine,
}

impl<'e> SolveDispatcher<'e> {
    pub fn new(engine: &'e dyn SymbolicEngine) -> Self {
        Self { engine }
    }

    pub fn solve(&self, latex: &str, category: Category) -> SolveResult {
        match category {
            Category::BinaryEquation => match self.solve_cases(latex) {
                Ok(Some(solutions)) => SolveResult::Solutions(solutions),
                Ok(None) => {
                    log::debug!("no solvable cases block, solving the formula as a whole");
                    self.solve_expression(latex).into()
                }
                Err(err) => SolveResult::Error(err),
            },
            Category::Equation => self.solve_expression(latex).into(),
            Category::Calculation => self.calculate(latex).into(),
        }
    }

    /// Solves the rows of a `cases` block jointly.
    ///
    /// `Ok(None)` when there is no block or the engine cannot solve the rows
    /// as a system.
    pub fn solve_cases(&self, latex: &str) -> FormulaResult<Option<SolutionSet>> {
        let Some(captures) = CASES_BLOCK.captures(latex) else {
            return Ok(None);
        };
        let body = captures.get(1).map_or("", |m| m.as_str());

        let mut rows: Vec<Relation> = Vec::new();
        for row in ROW_SEPARATOR.split(body) {
            if row.trim().is_empty() {
                continue;
            }
            match self.engine.parse(row)? {
                Statement::Relation(relation) => rows.push(relation),
                Statement::System(inner) => rows.extend(inner),
                Statement::Expr(expr) => rows.push(Relation::new(expr, RelOp::Eq, Expr::integer(0))),
            }
        }

        if rows.is_empty() {
            return Ok(None);
        }
        self.engine.solve_system(&rows)
    }

    /// Solves a single equation or inequality, retrying as calculator notation
    pub fn solve_expression(&self, text: &str) -> FormulaResult<SolutionSet> {
        let statement = match self.engine.parse(text) {
            Ok(statement) => statement,
            Err(latex_err) => match self.engine.parse_plain(text) {
                Ok(statement) => {
                    log::debug!("'{text}' is not LaTeX ({latex_err}), parsed as plain text");
                    statement
                }
                Err(_) => return Err(latex_err),
            },
        };
        self.engine.solve_single(&statement)
    }

    /// Evaluates everything before the first `=`.
    ///
    /// An expression with unknowns in it comes back simplified instead.
    pub fn calculate(&self, latex: &str) -> FormulaResult<Calculated> {
        let cleaned: String = latex.chars().filter(|c| !c.is_whitespace()).collect();
        let expression = cleaned.split('=').next().unwrap_or_default().trim();
        if expression.is_empty() {
            return Err(FormulaError::EmptyExpression);
        }

        // Whitespace is significant between LaTeX commands and letters
        let original = match latex.find('=') {
            Some(index) => &latex[..index],
            None => latex,
        };
        match self.engine.parse(original.trim())? {
            Statement::Expr(expr) if expr.free_variables().is_empty() => {
                self.engine.evaluate(&expr).map(Calculated::Value)
            }
            Statement::Expr(expr) => {
                log::debug!("'{expression}' has unknowns, simplifying instead");
                Ok(Calculated::Symbolic(self.engine.simplify(&expr)))
            }
            _ => Err(FormulaError::ParseFailure(format!(
                "'{expression}' is not an expression"
            ))),
        }
    }
}
