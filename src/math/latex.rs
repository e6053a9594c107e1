//! LaTeX printer for expression trees.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed};

use super::expr::{Constant, Expr, Function};
use super::lexer::GREEK;

pub fn to_latex(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(expr, &mut out);
    out
}

fn write_number(n: &BigRational, out: &mut String) {
    if n.is_negative() {
        out.push('-');
    }
    if n.denom().is_one() {
        out.push_str(&n.numer().abs().to_string());
    } else {
        out.push_str(&format!(r"\frac{{{}}}{{{}}}", n.numer().abs(), n.denom()));
    }
}

fn write_variable(name: &str, out: &mut String) {
    let (base, subscript) = match name.split_once('_') {
        Some((base, sub)) => (base, Some(sub)),
        None => (name, None),
    };
    if GREEK.contains(&base) {
        out.push('\\');
    }
    out.push_str(base);
    if let Some(sub) = subscript {
        out.push_str(&format!("_{{{sub}}}"));
    }
}

fn write_operand(e: &Expr, min_prec: u8, out: &mut String) {
    if e.precedence() < min_prec {
        out.push_str(r"\left(");
        write_expr(e, out);
        out.push_str(r"\right)");
    } else {
        write_expr(e, out);
    }
}

fn starts_with_digit(e: &Expr) -> bool {
    match e {
        Expr::Number(_) => true,
        Expr::Mul(a, _) | Expr::Pow(a, _) => starts_with_digit(a),
        _ => false,
    }
}

fn write_expr(expr: &Expr, out: &mut String) {
    match expr {
        Expr::Number(n) => write_number(n, out),
        Expr::Constant(Constant::Pi) => out.push_str(r"\pi"),
        Expr::Constant(Constant::E) => out.push('e'),
        Expr::Variable(name) => write_variable(name, out),
        Expr::Add(a, b) => {
            write_operand(a, 1, out);
            match b.as_ref() {
                Expr::Neg(inner) => {
                    out.push_str(" - ");
                    write_operand(inner, 2, out);
                }
                Expr::Number(n) if n.is_negative() => {
                    out.push_str(" - ");
                    write_number(&n.abs(), out);
                }
                _ => {
                    out.push_str(" + ");
                    write_operand(b, 1, out);
                }
            }
        }
        Expr::Sub(a, b) => {
            write_operand(a, 1, out);
            out.push_str(" - ");
            write_operand(b, 2, out);
        }
        Expr::Mul(a, b) => {
            write_operand(a, 2, out);
            // Juxtaposed digits would read as one number
            if starts_with_digit(b) {
                out.push_str(r" \cdot ");
            } else {
                out.push(' ');
            }
            write_operand(b, 3, out);
        }
        Expr::Div(a, b) => {
            out.push_str(r"\frac{");
            write_expr(a, out);
            out.push_str("}{");
            write_expr(b, out);
            out.push('}');
        }
        Expr::Pow(base, exponent) => match exponent.as_number() {
            Some(n) if n.numer().is_one() && !n.denom().is_one() => {
                let index = n.denom();
                if *index == BigInt::from(2) {
                    out.push_str(r"\sqrt{");
                } else {
                    out.push_str(&format!(r"\sqrt[{index}]{{"));
                }
                write_expr(base, out);
                out.push('}');
            }
            _ => {
                write_operand(base, 5, out);
                out.push_str("^{");
                write_expr(exponent, out);
                out.push('}');
            }
        },
        Expr::Neg(a) => {
            out.push('-');
            write_operand(a, 2, out);
        }
        Expr::Call(function, arg) => write_call(*function, arg, out),
    }
}

fn write_call(function: Function, arg: &Expr, out: &mut String) {
    match function {
        Function::Sqrt => {
            out.push_str(r"\sqrt{");
            write_expr(arg, out);
            out.push('}');
        }
        Function::Abs => {
            out.push_str(r"\left|");
            write_expr(arg, out);
            out.push_str(r"\right|");
        }
        Function::Exp => {
            out.push_str("e^{");
            write_expr(arg, out);
            out.push('}');
        }
        _ => {
            let command = match function {
                Function::Arcsin => r"\arcsin",
                Function::Arccos => r"\arccos",
                Function::Arctan => r"\arctan",
                Function::Ln => r"\ln",
                Function::Log10 => r"\log_{10}",
                other => {
                    out.push('\\');
                    other.name()
                }
            };
            out.push_str(command);
            out.push_str(r"{\left(");
            write_expr(arg, out);
            out.push_str(r" \right)}");
        }
    }
}
