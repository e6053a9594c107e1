use formula_canvas::math::SolutionSet;
use formula_canvas::{classify, BuiltinEngine, Category, FormulaError, OutputFormat, SolveDispatcher, SolveResult};

const SYSTEM: &str = r"\begin{cases}x+y=5\\x-y=1\end{cases}";

fn solve(latex: &str, category: Category) -> SolveResult {
    SolveDispatcher::new(&BuiltinEngine).solve(latex, category)
}

#[test]
fn test_cases_system_is_solved_jointly() {
    let result = solve(SYSTEM, Category::BinaryEquation);
    assert_eq!(result.to_string(), "{x: 3, y: 2}");
    assert_eq!(result.render(OutputFormat::Latex), r"x = 3, \quad y = 2");
}

#[test]
fn test_calculation_ignores_text_after_equals() {
    assert_eq!(solve("2*2", Category::Calculation).to_string(), "4");
    assert_eq!(solve(r"\frac{3}{4} + \frac{1}{4} =", Category::Calculation).to_string(), "1");
}

#[test]
fn test_binary_equation_without_cases_solves_the_whole_formula() {
    let result = solve("x+y=5", Category::BinaryEquation);
    assert_eq!(result.to_string(), "[{x: -y + 5}]");
    let SolveResult::Solutions(SolutionSet::Roots { variable, roots }) = &result else {
        panic!("expected roots, got {result:?}");
    };
    assert_eq!(variable, "x");
    assert_eq!(roots.len(), 1);
}

#[test]
fn test_nonlinear_cases_system_falls_back_to_substitution() {
    let result = solve(r"\begin{cases}xy=6\\x+y=5\end{cases}", Category::BinaryEquation);
    assert_eq!(result.to_string(), "[{x: 3, y: 2}, {x: 2, y: 3}]");
    assert_eq!(
        result.render(OutputFormat::Latex),
        r"x = 3, \quad y = 2 \quad \text{or} \quad x = 2, \quad y = 3"
    );
}

#[test]
fn test_dependent_cases_system_keeps_a_parameter() {
    let result = solve(r"\begin{cases}x+y=5\\2x+2y=10\end{cases}", Category::BinaryEquation);
    assert_eq!(result.to_string(), "{x: -y + 5}");
}

#[test]
fn test_cases_system_classified_as_equation() {
    let three = r"\begin{cases}x+y+z=6\\x-y=0\\x+z=4\end{cases}";
    assert_eq!(classify(three, &BuiltinEngine), Category::Equation);
    assert_eq!(solve(three, Category::Equation).to_string(), "{x: 2, y: 2, z: 2}");

    let one = r"\begin{cases}2x=4\\x+1=3\end{cases}";
    assert_eq!(solve(one, Category::Equation).to_string(), "{x: 2}");
}

#[test]
fn test_calculation_with_unknowns_stays_symbolic() {
    let result = solve("x+1=", Category::Calculation);
    assert!(!result.is_error());
    assert_eq!(result.to_string(), "x + 1");
    assert_eq!(solve("2x + 3x =", Category::Calculation).to_string(), "5*x");
    assert_eq!(solve("2x + 3x =", Category::Calculation).render(OutputFormat::Latex), "5 x");
}

#[test]
fn test_equation_roots() {
    assert_eq!(solve("2x+1=7", Category::Equation).to_string(), "[3]");
    assert_eq!(solve("x**2 = 4", Category::Equation).to_string(), "[-2, 2]");
}

#[test]
fn test_inequality_flips_direction() {
    let result = solve("-2x > 4", Category::Equation);
    assert_eq!(result.to_string(), "x < -2");
}

#[test]
fn test_inconsistent_system_has_no_solution() {
    let result = solve(r"\begin{cases}x+y=1\\x+y=2\end{cases}", Category::BinaryEquation);
    assert_eq!(result, SolveResult::Solutions(SolutionSet::Empty));
    assert_eq!(result.render(OutputFormat::Latex), r"\emptyset");
}

#[test]
fn test_parse_failure_is_reported_as_a_value() {
    let result = solve(r"\frac{1}{", Category::Calculation);
    assert!(result.is_error());
    assert!(matches!(result, SolveResult::Error(FormulaError::ParseFailure(_))));
}
