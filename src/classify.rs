//! Decides which solving strategy a recognized formula needs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::SymbolicEngine;

/// Shape of a recognized formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// A relation with something to solve on both sides
    Equation,
    /// An equation or system with exactly two free variables
    BinaryEquation,
    /// Something to evaluate, optionally ending in `=`
    Calculation,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Equation => "equation",
            Category::BinaryEquation => "binary equation",
            Category::Calculation => "calculation",
        };
        f.write_str(name)
    }
}

/// Relational operators in match priority; longer spellings come first
pub const RELATIONS: &[&str] = &[
    r"\leq", r"\geq", r"\neq", r"\lt", r"\gt", "=", "<", ">", "≤", "≥", "≠",
];

/// True when `latex` has a relation followed by letters or digits.
///
/// The operator searched for is the first entry of [`RELATIONS`] that occurs
/// anywhere in the text, not the leftmost operator in the text.
pub fn is_equation(latex: &str) -> bool {
    let cleaned: String = latex.chars().filter(|c| !c.is_whitespace()).collect();
    let Some(relation) = RELATIONS.iter().find(|r| cleaned.contains(**r)) else {
        return false;
    };
    match cleaned.split_once(relation) {
        Some((_, rhs)) => rhs.trim().chars().any(|c| c.is_ascii_alphanumeric()),
        None => false,
    }
}

/// Classifies `latex`; never fails.
///
/// The free-variable count comes from the engine's parse of the trimmed
/// text. A parse failure leaves the formula an [`Category::Equation`].
pub fn classify(latex: &str, engine: &dyn SymbolicEngine) -> Category {
    if !is_equation(latex) {
        return Category::Calculation;
    }

    match engine.parse(latex.trim()) {
        Ok(statement) if engine.free_variables(&statement).len() == 2 => Category::BinaryEquation,
        Ok(_) => Category::Equation,
        Err(err) => {
            log::debug!("treating unparsable formula as a plain equation: {err}");
            Category::Equation
        }
    }
}
