//! Tokenizer for recognizer output.
//!
//! Accepts LaTeX as well as the plain calculator notation a user might type
//! (`*`, `/`, `**`). Layout-only commands such as `\left`, `\,` or `\quad`
//! are dropped here so the parser never sees them.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{anychar, char, digit1},
    combinator::{map, opt, recognize},
    sequence::{delimited, pair, preceded},
};

use super::expr::{Constant, Function, RelOp};
use crate::error::{FormulaError, FormulaResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(String),
    /// A single-letter variable, or a Greek letter command without its backslash
    Ident(String),
    Constant(Constant),
    Function(Function),
    Frac,
    Sqrt,
    Plus,
    Minus,
    Times,
    Divide,
    Caret,
    Underscore,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Pipe,
    Comma,
    Rel(RelOp),
    /// `\\` row separator, with any `[2pt]` spacing argument swallowed
    RowSep,
    BeginCases,
    EndCases,
}

/// Output of a single lexing step; `Skip` is produced for layout tokens
#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    Token(Token),
    Skip,
}

pub(crate) const GREEK: &[&str] = &[
    "alpha", "beta", "gamma", "delta", "epsilon", "varepsilon", "zeta", "eta", "theta",
    "vartheta", "iota", "kappa", "lambda", "mu", "nu", "xi", "rho", "sigma", "tau", "upsilon",
    "phi", "varphi", "chi", "psi", "omega", "Gamma", "Delta", "Theta", "Lambda", "Xi", "Sigma",
    "Phi", "Psi", "Omega",
];

const SPACING: &[&str] = &[
    "quad", "qquad", "displaystyle", "textstyle", "limits", "nolimits", "mathrm", "mathit",
    "mathbf", "boldsymbol", "mathord", "big", "Big", "bigg", "Bigg",
];

fn row_separator(input: &str) -> IResult<&str, Lexeme> {
    let (input, _) = tag("\\\\")(input)?;
    let (input, _) = take_while(char::is_whitespace)(input)?;
    let (input, _) = opt(delimited(char('['), take_while(|c: char| c != ']'), char(']')))(input)?;
    Ok((input, Lexeme::Token(Token::RowSep)))
}

/// `\,` `\;` `\!` `\:` `\ ` `\{` `\}` and friends
fn escaped_symbol(input: &str) -> IResult<&str, Lexeme> {
    let (input, _) = char('\\')(input)?;
    let (input, symbol) = anychar(input)?;
    match symbol {
        ',' | ';' | '!' | ':' | ' ' | '{' | '}' | '|' => Ok((input, Lexeme::Skip)),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Char,
        ))),
    }
}

fn environment(input: &str) -> IResult<&str, Lexeme> {
    let begin = map(tag("\\begin{cases}"), |_| Lexeme::Token(Token::BeginCases));
    let end = map(tag("\\end{cases}"), |_| Lexeme::Token(Token::EndCases));
    alt((begin, end))(input)
}

fn command(input: &str) -> IResult<&str, Lexeme> {
    let (rest, name) = preceded(char('\\'), take_while1(|c: char| c.is_ascii_alphabetic()))(input)?;

    let lexeme = match name {
        "frac" | "dfrac" | "tfrac" => Lexeme::Token(Token::Frac),
        "sqrt" => Lexeme::Token(Token::Sqrt),
        "cdot" | "times" | "ast" => Lexeme::Token(Token::Times),
        "div" => Lexeme::Token(Token::Divide),
        "pi" => Lexeme::Token(Token::Constant(Constant::Pi)),
        "leq" | "le" | "leqslant" => Lexeme::Token(Token::Rel(RelOp::Leq)),
        "geq" | "ge" | "geqslant" => Lexeme::Token(Token::Rel(RelOp::Geq)),
        "neq" | "ne" => Lexeme::Token(Token::Rel(RelOp::Neq)),
        "lt" => Lexeme::Token(Token::Rel(RelOp::Lt)),
        "gt" => Lexeme::Token(Token::Rel(RelOp::Gt)),
        "left" | "right" => {
            // `\left.` and `\right.` are invisible delimiters
            let (rest, _) = opt(char('.'))(rest)?;
            return Ok((rest, Lexeme::Skip));
        }
        "text" | "mbox" | "operatorname" => {
            let (rest, body) = delimited(char('{'), take_while(|c: char| c != '}'), char('}'))(rest)?;
            let body = body.trim();
            return Ok((
                rest,
                match Function::from_command(body) {
                    Some(function) => Lexeme::Token(Token::Function(function)),
                    None => Lexeme::Skip,
                },
            ));
        }
        other if SPACING.contains(&other) => Lexeme::Skip,
        other if GREEK.contains(&other) => Lexeme::Token(Token::Ident(other.to_owned())),
        other => match Function::from_command(other) {
            Some(function) => Lexeme::Token(Token::Function(function)),
            None => {
                return Err(nom::Err::Error(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Tag,
                )));
            }
        },
    };
    Ok((rest, lexeme))
}

fn number(input: &str) -> IResult<&str, Lexeme> {
    map(
        recognize(pair(digit1, opt(pair(char('.'), digit1)))),
        |digits: &str| Lexeme::Token(Token::Number(digits.to_owned())),
    )(input)
}

fn letter(input: &str) -> IResult<&str, Lexeme> {
    let (rest, c) = anychar(input)?;
    if c.is_ascii_alphabetic() {
        Ok((rest, Lexeme::Token(Token::Ident(c.to_string()))))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Alpha,
        )))
    }
}

fn relation(input: &str) -> IResult<&str, Lexeme> {
    alt((
        map(alt((tag("<="), tag("≤"))), |_| Lexeme::Token(Token::Rel(RelOp::Leq))),
        map(alt((tag(">="), tag("≥"))), |_| Lexeme::Token(Token::Rel(RelOp::Geq))),
        map(alt((tag("!="), tag("≠"))), |_| Lexeme::Token(Token::Rel(RelOp::Neq))),
        map(char('<'), |_| Lexeme::Token(Token::Rel(RelOp::Lt))),
        map(char('>'), |_| Lexeme::Token(Token::Rel(RelOp::Gt))),
        map(char('='), |_| Lexeme::Token(Token::Rel(RelOp::Eq))),
    ))(input)
}

fn symbol(input: &str) -> IResult<&str, Lexeme> {
    alt((
        map(tag("**"), |_| Lexeme::Token(Token::Caret)),
        map(char('+'), |_| Lexeme::Token(Token::Plus)),
        map(alt((char('-'), char('−'))), |_| Lexeme::Token(Token::Minus)),
        map(alt((char('*'), char('×'), char('·'))), |_| Lexeme::Token(Token::Times)),
        map(alt((char('/'), char('÷'))), |_| Lexeme::Token(Token::Divide)),
        map(char('^'), |_| Lexeme::Token(Token::Caret)),
        map(char('_'), |_| Lexeme::Token(Token::Underscore)),
        map(char('{'), |_| Lexeme::Token(Token::LBrace)),
        map(char('}'), |_| Lexeme::Token(Token::RBrace)),
        map(char('('), |_| Lexeme::Token(Token::LParen)),
        map(char(')'), |_| Lexeme::Token(Token::RParen)),
        map(char('['), |_| Lexeme::Token(Token::LBracket)),
        map(char(']'), |_| Lexeme::Token(Token::RBracket)),
        map(char('|'), |_| Lexeme::Token(Token::Pipe)),
        map(char(','), |_| Lexeme::Token(Token::Comma)),
        map(alt((char('&'), char('.'))), |_| Lexeme::Skip),
        map(char('π'), |_| Lexeme::Token(Token::Constant(Constant::Pi))),
    ))(input)
}

/// A whole run of letters in calculator notation: `sqrt`, `pi`, `speed`
fn word(input: &str) -> IResult<&str, Lexeme> {
    let (rest, name) = take_while1(|c: char| c.is_ascii_alphabetic())(input)?;
    let token = match name {
        "pi" => Token::Constant(Constant::Pi),
        "E" => Token::Constant(Constant::E),
        other => match Function::from_command(other) {
            Some(function) => Token::Function(function),
            None => Token::Ident(other.to_owned()),
        },
    };
    Ok((rest, Lexeme::Token(token)))
}

fn latex_lexeme(input: &str) -> IResult<&str, Lexeme> {
    alt((
        row_separator,
        environment,
        escaped_symbol,
        command,
        number,
        relation,
        symbol,
        letter,
    ))(input)
}

fn plain_lexeme(input: &str) -> IResult<&str, Lexeme> {
    alt((number, relation, symbol, word))(input)
}

/// Splits LaTeX `input` into tokens, dropping whitespace and layout commands
pub fn tokenize(input: &str) -> FormulaResult<Vec<Token>> {
    tokenize_with(input, latex_lexeme)
}

/// Splits calculator notation such as `sqrt(2)*pi` into tokens
pub fn tokenize_plain(input: &str) -> FormulaResult<Vec<Token>> {
    tokenize_with(input, plain_lexeme)
}

fn tokenize_with(
    input: &str,
    lexeme: fn(&str) -> IResult<&str, Lexeme>,
) -> FormulaResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut remaining = input;

    loop {
        remaining = remaining.trim_start();
        if remaining.is_empty() {
            break;
        }
        match lexeme(remaining) {
            Ok((rest, Lexeme::Token(token))) => {
                tokens.push(token);
                remaining = rest;
            }
            Ok((rest, Lexeme::Skip)) => remaining = rest,
            Err(_) => {
                let excerpt: String = remaining.chars().take(20).collect();
                return Err(FormulaError::ParseFailure(format!(
                    "unexpected input at '{excerpt}'"
                )));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_fraction_and_relation() {
        let tokens = tokenize(r"\frac{x}{2} \leq 3").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Frac,
                Token::LBrace,
                Token::Ident("x".into()),
                Token::RBrace,
                Token::LBrace,
                Token::Number("2".into()),
                Token::RBrace,
                Token::Rel(RelOp::Leq),
                Token::Number("3".into()),
            ]
        );
    }

    #[test]
    fn row_separator_swallows_spacing_argument() {
        let tokens = tokenize(r"x=1 \\[2pt] y=2").unwrap();
        assert_eq!(tokens[3], Token::RowSep);
        assert_eq!(tokens[4], Token::Ident("y".into()));
    }

    #[test]
    fn layout_commands_are_dropped() {
        let tokens = tokenize(r"\left( x \, + \quad 1 \right)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LParen,
                Token::Ident("x".into()),
                Token::Plus,
                Token::Number("1".into()),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn plain_power_operator() {
        let tokens = tokenize("2**3").unwrap();
        assert_eq!(tokens[1], Token::Caret);
    }

    #[test]
    fn plain_words_are_whole_names() {
        let tokens = tokenize_plain("sqrt(rate)*pi").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Function(Function::Sqrt),
                Token::LParen,
                Token::Ident("rate".into()),
                Token::RParen,
                Token::Times,
                Token::Constant(Constant::Pi),
            ]
        );
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(matches!(
            tokenize(r"\integral x"),
            Err(FormulaError::ParseFailure(_))
        ));
    }
}
