use selectway::{
    evaluate,
    evaluator::evaluate_with,
    parser::{parse_expression, unquote},
    try_evaluate, DiagnosticKind, PlusSplit, Value, VariableStore,
};

fn store(bindings: &[(&str, Value)]) -> VariableStore {
    bindings
        .iter()
        .map(|(name, value)| (*name, value.clone()))
        .collect()
}

fn eval(source: &str) -> Value {
    evaluate(source, &VariableStore::new())
}

#[test]
fn undefined_identifiers_read_as_zero() {
    let empty = VariableStore::new();
    assert_eq!(evaluate("x + 1", &empty), Value::Int(1));
    assert_eq!(evaluate("missing * 10", &empty), Value::Int(0));
    assert!(empty.is_empty(), "lookups must not materialize names");
}

#[test]
fn quoted_segment_selects_concatenation() {
    let vars = store(&[("name", Value::string("Bob"))]);
    assert_eq!(
        evaluate("\"Hello \" + name", &vars),
        Value::string("Hello Bob")
    );
    assert_eq!(evaluate("'a' + 'b'", &vars), Value::string("ab"));
}

#[test]
fn plus_without_quotes_is_arithmetic() {
    assert_eq!(eval("1 + 2"), Value::Int(3));
    assert_eq!(eval("1.5 + 2"), Value::Float(3.5));
}

#[test]
fn division_always_yields_float() {
    assert_eq!(eval("4 / 2"), Value::Float(2.0));
    assert_eq!(eval("7 / 2"), Value::Float(3.5));
}

#[test]
fn integer_operations_stay_integral() {
    assert_eq!(eval("2 + 3 * 4"), Value::Int(14));
    assert_eq!(eval("(2 + 3) * 4"), Value::Int(20));
    assert_eq!(eval("10 - 4 - 3"), Value::Int(3));
    assert_eq!(eval("1_000 * 2"), Value::Int(2000));
}

#[test]
fn floor_division_and_modulo_follow_the_divisor_sign() {
    assert_eq!(eval("7 // 2"), Value::Int(3));
    assert_eq!(eval("-7 // 2"), Value::Int(-4));
    assert_eq!(eval("7 // -2"), Value::Int(-4));
    assert_eq!(eval("-7 % 3"), Value::Int(2));
    assert_eq!(eval("7 % -3"), Value::Int(-2));
    assert_eq!(eval("7.5 // 2"), Value::Float(3.0));
}

#[test]
fn power_is_right_associative_and_binds_tighter_than_negation() {
    assert_eq!(eval("2 ** 10"), Value::Int(1024));
    assert_eq!(eval("2 ** 3 ** 2"), Value::Int(512));
    assert_eq!(eval("-2 ** 2"), Value::Int(-4));
    assert_eq!(eval("2 ** -1"), Value::Float(0.5));
}

#[test]
fn comparisons_yield_bool_and_chain() {
    assert_eq!(eval("3 > 2"), Value::Bool(true));
    assert_eq!(eval("1 == 1.0"), Value::Bool(true));
    assert_eq!(eval("1 != 1"), Value::Bool(false));
    assert_eq!(eval("1 < 2 < 3"), Value::Bool(true));
    assert_eq!(eval("3 < 2 < 5"), Value::Bool(false));
    assert_eq!(eval("2 <= 2 >= 1"), Value::Bool(true));
}

#[test]
fn boolean_operators() {
    assert_eq!(eval("not 0"), Value::Bool(true));
    assert_eq!(eval("1 and 0"), Value::Bool(false));
    assert_eq!(eval("0 or 5"), Value::Bool(true));
    assert_eq!(eval("True and not False"), Value::Bool(true));
    assert_eq!(eval("not 1 == 2"), Value::Bool(true));
}

#[test]
fn short_circuit_skips_failing_operand() {
    let vars = store(&[("x", Value::Int(0))]);
    assert_eq!(
        evaluate("x != 0 and 10 / x > 1", &vars),
        Value::Bool(false)
    );
}

#[test]
fn strings_compare_but_do_not_do_arithmetic() {
    let vars = store(&[
        ("name", Value::string("Bob")),
        ("other", Value::string("Amy")),
    ]);
    assert_eq!(evaluate("name == \"Bob\"", &vars), Value::Bool(true));
    assert_eq!(evaluate("other < name", &vars), Value::Bool(true));
    assert_eq!(evaluate("name == 1", &vars), Value::Bool(false));

    let err = try_evaluate("name + other", &vars).expect_err("strings cannot be added");
    assert_eq!(err.kind, DiagnosticKind::Runtime);
    assert_eq!(evaluate("name + other", &vars), Value::Int(0));
    assert!(try_evaluate("name * 2", &vars).is_err());
    assert!(try_evaluate("name < 2", &vars).is_err());
}

#[test]
fn whole_quoted_text_is_a_literal() {
    assert_eq!(eval("'hi there'"), Value::string("hi there"));
    assert_eq!(eval("\"\""), Value::string(""));
}

#[test]
fn division_by_zero_is_reported_with_fallback() {
    let err = try_evaluate("1 / 0", &VariableStore::new()).expect_err("division by zero");
    assert_eq!(err.message, "Error evaluating expression: 1 / 0");
    assert_eq!(err.notes, vec!["division by zero".to_string()]);
    assert_eq!(eval("1 / 0"), Value::Int(0));
    assert_eq!(eval("5 % 0"), Value::Int(0));
    assert_eq!(eval("2.0 // 0"), Value::Int(0));
}

#[test]
fn overflow_is_an_evaluation_error() {
    assert!(try_evaluate("9223372036854775807 + 1", &VariableStore::new()).is_err());
    assert!(try_evaluate("2 ** 64", &VariableStore::new()).is_err());
    assert!(try_evaluate("2 ** 5000000000", &VariableStore::new()).is_err());
    assert!(try_evaluate("10.0 ** 400", &VariableStore::new()).is_err());
}

#[test]
fn huge_exponents_on_unit_bases() {
    assert_eq!(eval("1 ** 5000000000"), Value::Int(1));
    assert_eq!(eval("0 ** 5000000000"), Value::Int(0));
    assert_eq!(eval("(-1) ** 5000000000"), Value::Int(1));
    assert_eq!(eval("(-1) ** 5000000001"), Value::Int(-1));
}

#[test]
fn deep_nesting_is_rejected_not_fatal() {
    let vars = VariableStore::new();
    let parens = format!("{}1{}", "(".repeat(3_000), ")".repeat(3_000));
    let err = try_evaluate(&parens, &vars).expect_err("too deep");
    assert_eq!(err.kind, DiagnosticKind::Parser);
    assert_eq!(err.notes, vec!["expression nested too deeply".to_string()]);
    assert_eq!(evaluate(&parens, &vars), Value::Int(0));

    let negations = format!("{}1", "- ".repeat(5_000));
    assert_eq!(evaluate(&negations, &vars), Value::Int(0));
    let nots = format!("{}1", "not ".repeat(5_000));
    assert_eq!(evaluate(&nots, &vars), Value::Int(0));
    let powers = vec!["1"; 5_000].join(" ** ");
    assert_eq!(evaluate(&powers, &vars), Value::Int(0));
    let chain = vec!["1"; 5_000].join(" - ");
    assert_eq!(evaluate(&chain, &vars), Value::Int(0));
}

#[test]
fn moderate_nesting_still_evaluates() {
    let parens = format!("{}1{}", "(".repeat(50), ")".repeat(50));
    assert_eq!(eval(&parens), Value::Int(1));
    assert_eq!(eval(&vec!["1"; 500].join(" - ")), Value::Int(-498));
    assert_eq!(eval(&format!("{}1", "- ".repeat(4))), Value::Int(1));
}

#[test]
fn lowercase_booleans_are_ordinary_names() {
    let vars = store(&[("true", Value::Int(5))]);
    assert_eq!(evaluate("true", &vars), Value::Int(5));
    assert_eq!(eval("true + 1"), Value::Int(1));
    assert_eq!(eval("false"), Value::Int(0));
    assert_eq!(eval("True + 1"), Value::Int(2));
}

#[test]
fn only_the_fixed_grammar_is_accepted() {
    let vars = store(&[("x", Value::Int(1))]);
    for source in ["x.real", "f(1)", "x[0]", "1, 2", "x = 1", "__import__('os')"] {
        let err = try_evaluate(source, &vars).expect_err(source);
        assert!(
            matches!(err.kind, DiagnosticKind::Parser | DiagnosticKind::Lexer),
            "{source}: {err}"
        );
    }
}

#[test]
fn comments_end_the_expression() {
    assert_eq!(eval("1 + 1 # two"), Value::Int(2));
}

#[test]
fn concatenation_stringifies_values_and_expressions() {
    let vars = store(&[("flag", Value::Bool(true)), ("ratio", Value::Float(2.0))]);
    assert_eq!(
        evaluate("\"Total: \" + 2 * 3", &vars),
        Value::string("Total: 6")
    );
    assert_eq!(
        evaluate("\"flag: \" + flag", &vars),
        Value::string("flag: True")
    );
    assert_eq!(
        evaluate("\"ratio \" + ratio", &vars),
        Value::string("ratio 2.0")
    );
    assert_eq!(
        evaluate("\"missing \" + nobody", &vars),
        Value::string("missing 0")
    );
}

#[test]
fn concatenation_falls_back_to_raw_segment_text() {
    let vars = VariableStore::new();
    assert_eq!(evaluate("\"a\" + (b", &vars), Value::string("a(b"));
    assert_eq!(evaluate("\"a\" + 1 / 0", &vars), Value::string("a1 / 0"));
}

#[test]
fn naive_split_ignores_parentheses_and_quotes() {
    let vars = VariableStore::new();
    assert_eq!(
        evaluate("\"Total: \" + (1 + 2)", &vars),
        Value::string("Total: (12)")
    );
    assert_eq!(
        evaluate_with("\"Total: \" + (1 + 2)", &vars, PlusSplit::QuoteAware),
        Value::string("Total: 3")
    );

    assert_eq!(evaluate("\"x\" + \"a+b\"", &vars), Value::string("x\"ab\""));
    assert_eq!(
        evaluate_with("\"x\" + \"a+b\"", &vars, PlusSplit::QuoteAware),
        Value::string("xa+b")
    );
}

#[test]
fn quoted_plus_without_other_quotes_is_a_string_literal() {
    assert_eq!(eval("\"a+b\""), Value::string("a+b"));
}

#[test]
fn evaluation_is_idempotent() {
    let vars = store(&[("n", Value::Int(4)), ("s", Value::string("hey"))]);
    for source in ["n * 2 + 1", "\"s=\" + s", "n / 0", "n > 3 and s == 'hey'"] {
        let first = evaluate(source, &vars);
        let second = evaluate(source, &vars);
        assert_eq!(first, second, "{source}");
    }
    assert_eq!(vars.len(), 2);
}

#[test]
fn unquote_requires_a_single_matching_pair() {
    assert_eq!(unquote("\"abc\""), Some("abc"));
    assert_eq!(unquote("'abc'"), Some("abc"));
    assert_eq!(unquote("\"abc'"), None);
    assert_eq!(unquote("\"a\" == \"b\""), None);
    assert_eq!(unquote("\""), None);
}

#[test]
fn inner_quote_disqualifies_a_segment() {
    let vars = store(&[("x", Value::string("!"))]);
    assert_eq!(unquote("'don't'"), None);
    // No quoted segment remains, so the text is parsed as arithmetic and fails.
    assert_eq!(evaluate("'don't' + x", &vars), Value::Int(0));
    assert_eq!(evaluate("\"don't\" + x", &vars), Value::string("don't!"));
}

#[test]
fn parse_errors_carry_spans() {
    let err = parse_expression("1 + * 2", PlusSplit::QuoteAware)
        .map(|_| ())
        .expect_err("dangling operator");
    assert!(err.span.is_some());
}

#[test]
fn floats_display_like_the_language_prints_them() {
    assert_eq!(Value::Float(2.0).to_string(), "2.0");
    assert_eq!(Value::Float(0.0001).to_string(), "0.0001");
    assert_eq!(Value::Float(1e20).to_string(), "1e+20");
    assert_eq!(Value::Float(1.5e-7).to_string(), "1.5e-07");
    assert_eq!(Value::Float(f64::INFINITY).to_string(), "inf");
    assert_eq!(eval("0.1 + 0.2").to_string(), "0.30000000000000004");
    assert_eq!(Value::Bool(false).to_string(), "False");
}

#[test]
fn input_text_conversion() {
    assert_eq!(Value::from_input("42"), Value::Int(42));
    assert_eq!(Value::from_input("-3"), Value::Int(-3));
    assert_eq!(Value::from_input("3.5"), Value::Float(3.5));
    assert_eq!(Value::from_input("1e3"), Value::string("1e3"));
    assert_eq!(Value::from_input("Nan"), Value::string("Nan"));
    assert_eq!(Value::from_input("Infinity"), Value::string("Infinity"));
    assert_eq!(Value::from_input("-0.5"), Value::Float(-0.5));
    assert_eq!(Value::from_input("hello"), Value::string("hello"));
    assert_eq!(Value::from_input(""), Value::string(""));
}

#[test]
fn numeric_coercion_of_strings() {
    assert_eq!(Value::string("12").coerce_numeric(), Value::Int(12));
    assert_eq!(Value::string("-5").coerce_numeric(), Value::Float(-5.0));
    assert_eq!(Value::string("2.5").coerce_numeric(), Value::Float(2.5));
    assert_eq!(Value::string("abc").coerce_numeric(), Value::string("abc"));
    assert_eq!(Value::string("inf").coerce_numeric(), Value::string("inf"));
    assert_eq!(Value::string("NaN").coerce_numeric(), Value::string("NaN"));
    assert_eq!(Value::Bool(true).coerce_numeric(), Value::Bool(true));
}
