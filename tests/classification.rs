use formula_canvas::classify::is_equation;
use formula_canvas::{BuiltinEngine, Category, classify};

fn category(latex: &str) -> Category {
    classify(latex, &BuiltinEngine)
}

#[test]
fn test_no_relation_is_calculation() {
    assert_eq!(category(r"\frac{1}{2} + 3"), Category::Calculation);
    assert_eq!(category("2 \\times 2"), Category::Calculation);
}

#[test]
fn test_trailing_equals_is_calculation() {
    assert_eq!(category("x+1="), Category::Calculation);
    assert_eq!(category("12 \\div 4 = "), Category::Calculation);
}

#[test]
fn test_two_variables_is_binary_equation() {
    assert_eq!(category("x+y=5"), Category::BinaryEquation);
    assert_eq!(
        category(r"\begin{cases}x+y=5\\x-y=1\end{cases}"),
        Category::BinaryEquation
    );
}

#[test]
fn test_one_variable_is_equation() {
    assert_eq!(category("2x+1=7"), Category::Equation);
    assert_eq!(category(r"x^2 \geq 4"), Category::Equation);
}

#[test]
fn test_three_variables_is_equation() {
    assert_eq!(category("x+y+z=1"), Category::Equation);
}

#[test]
fn test_whitespace_does_not_matter() {
    assert!(is_equation("  x +  1   =  2 "));
    assert!(!is_equation("x + 1 =   "));
}
