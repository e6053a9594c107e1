//! Expression tree produced by the parser.

use std::collections::BTreeSet;
use std::fmt;

use num_rational::BigRational;
use num_traits::{One, Signed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Cot,
    Sec,
    Csc,
    Arcsin,
    Arccos,
    Arctan,
    Sinh,
    Cosh,
    Tanh,
    Ln,
    Log10,
    Exp,
    Sqrt,
    Abs,
}

impl Function {
    pub fn from_command(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "cot" => Self::Cot,
            "sec" => Self::Sec,
            "csc" => Self::Csc,
            "arcsin" => Self::Arcsin,
            "arccos" => Self::Arccos,
            "arctan" => Self::Arctan,
            "sinh" => Self::Sinh,
            "cosh" => Self::Cosh,
            "tanh" => Self::Tanh,
            "ln" => Self::Ln,
            "log" | "lg" => Self::Log10,
            "exp" => Self::Exp,
            "sqrt" => Self::Sqrt,
            "abs" => Self::Abs,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Cot => "cot",
            Self::Sec => "sec",
            Self::Csc => "csc",
            Self::Arcsin => "asin",
            Self::Arccos => "acos",
            Self::Arctan => "atan",
            Self::Sinh => "sinh",
            Self::Cosh => "cosh",
            Self::Tanh => "tanh",
            Self::Ln => "log",
            Self::Log10 => "log10",
            Self::Exp => "exp",
            Self::Sqrt => "sqrt",
            Self::Abs => "Abs",
        }
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Cot => 1.0 / x.tan(),
            Self::Sec => 1.0 / x.cos(),
            Self::Csc => 1.0 / x.sin(),
            Self::Arcsin => x.asin(),
            Self::Arccos => x.acos(),
            Self::Arctan => x.atan(),
            Self::Sinh => x.sinh(),
            Self::Cosh => x.cosh(),
            Self::Tanh => x.tanh(),
            Self::Ln => x.ln(),
            Self::Log10 => x.log10(),
            Self::Exp => x.exp(),
            Self::Sqrt => x.sqrt(),
            Self::Abs => x.abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(BigRational),
    Constant(Constant),
    Variable(String),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
    Call(Function, Box<Expr>),
}

impl Expr {
    pub fn integer(n: i64) -> Self {
        Self::Number(BigRational::from_integer(n.into()))
    }

    pub fn var(name: &str) -> Self {
        Self::Variable(name.to_owned())
    }

    pub fn add(self, rhs: Expr) -> Self {
        Self::Add(Box::new(self), Box::new(rhs))
    }

    pub fn sub(self, rhs: Expr) -> Self {
        Self::Sub(Box::new(self), Box::new(rhs))
    }

    pub fn mul(self, rhs: Expr) -> Self {
        Self::Mul(Box::new(self), Box::new(rhs))
    }

    pub fn div(self, rhs: Expr) -> Self {
        Self::Div(Box::new(self), Box::new(rhs))
    }

    pub fn pow(self, rhs: Expr) -> Self {
        Self::Pow(Box::new(self), Box::new(rhs))
    }

    pub fn neg(self) -> Self {
        Self::Neg(Box::new(self))
    }

    pub fn call(function: Function, arg: Expr) -> Self {
        Self::Call(function, Box::new(arg))
    }

    pub fn as_number(&self) -> Option<&BigRational> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Distinct variable names, in sorted order
    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    pub(crate) fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Variable(name) => {
                out.insert(name.clone());
            }
            Self::Number(_) | Self::Constant(_) => {}
            Self::Add(a, b) | Self::Sub(a, b) | Self::Mul(a, b) | Self::Div(a, b) | Self::Pow(a, b) => {
                a.collect_variables(out);
                b.collect_variables(out);
            }
            Self::Neg(a) | Self::Call(_, a) => a.collect_variables(out),
        }
    }

    /// Binding strength used by both printers
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            Self::Add(..) | Self::Sub(..) => 1,
            Self::Mul(..) | Self::Div(..) => 2,
            Self::Neg(..) => 3,
            Self::Number(n) if n.is_negative() => 3,
            Self::Number(n) if !n.denom().is_one() => 2,
            Self::Pow(..) => 4,
            _ => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    Neq,
    Lt,
    Gt,
    Leq,
    Geq,
}

impl RelOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Leq => "<=",
            Self::Geq => ">=",
        }
    }

    pub fn latex(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => r"\neq",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Leq => r"\leq",
            Self::Geq => r"\geq",
        }
    }

    /// The operator that holds after multiplying both sides by a negative number
    pub fn flipped(self) -> Self {
        match self {
            Self::Lt => Self::Gt,
            Self::Gt => Self::Lt,
            Self::Leq => Self::Geq,
            Self::Geq => Self::Leq,
            other => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub lhs: Expr,
    pub op: RelOp,
    pub rhs: Expr,
}

impl Relation {
    pub fn new(lhs: Expr, op: RelOp, rhs: Expr) -> Self {
        Self { lhs, op, rhs }
    }

    /// `lhs - rhs`, the side that the solver drives to zero
    pub fn difference(&self) -> Expr {
        self.lhs.clone().sub(self.rhs.clone())
    }

    pub fn free_variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.lhs.collect_variables(&mut out);
        self.rhs.collect_variables(&mut out);
        out
    }
}

/// Everything the parser can produce from one piece of text
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expr(Expr),
    Relation(Relation),
    /// Rows of a `cases` block
    System(Vec<Relation>),
}

impl Statement {
    pub fn free_variables(&self) -> BTreeSet<String> {
        match self {
            Self::Expr(e) => e.free_variables(),
            Self::Relation(r) => r.free_variables(),
            Self::System(rows) => {
                let mut out = BTreeSet::new();
                for row in rows {
                    row.lhs.collect_variables(&mut out);
                    row.rhs.collect_variables(&mut out);
                }
                out
            }
        }
    }
}

/// Formats a rational the way the plain printer shows numbers
pub(crate) fn fmt_rational(n: &BigRational, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.denom().is_one() {
        write!(f, "{}", n.numer())
    } else {
        write!(f, "{}/{}", n.numer(), n.denom())
    }
}

fn fmt_operand(e: &Expr, min_prec: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if e.precedence() < min_prec {
        write!(f, "({e})")
    } else {
        write!(f, "{e}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => fmt_rational(n, f),
            Self::Constant(Constant::Pi) => write!(f, "pi"),
            Self::Constant(Constant::E) => write!(f, "E"),
            Self::Variable(name) => write!(f, "{name}"),
            Self::Add(a, b) => {
                fmt_operand(a, 1, f)?;
                match b.as_ref() {
                    Self::Neg(inner) => {
                        write!(f, " - ")?;
                        fmt_operand(inner, 2, f)
                    }
                    Self::Number(n) if n.is_negative() => {
                        write!(f, " - ")?;
                        fmt_rational(&-n.clone(), f)
                    }
                    _ => {
                        write!(f, " + ")?;
                        fmt_operand(b, 1, f)
                    }
                }
            }
            Self::Sub(a, b) => {
                fmt_operand(a, 1, f)?;
                write!(f, " - ")?;
                fmt_operand(b, 2, f)
            }
            Self::Mul(a, b) => {
                fmt_operand(a, 2, f)?;
                write!(f, "*")?;
                fmt_operand(b, 3, f)
            }
            Self::Div(a, b) => {
                fmt_operand(a, 2, f)?;
                write!(f, "/")?;
                fmt_operand(b, 3, f)
            }
            Self::Pow(a, b) => {
                fmt_operand(a, 5, f)?;
                write!(f, "**")?;
                fmt_operand(b, 4, f)
            }
            Self::Neg(a) => {
                write!(f, "-")?;
                fmt_operand(a, 2, f)
            }
            Self::Call(func, arg) => write!(f, "{}({arg})", func.name()),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op.symbol(), self.rhs)
    }
}
