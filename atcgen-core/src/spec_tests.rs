use super::*;
use crate::ast::BinaryOperator;

fn increment_signature() -> FunctionSignature {
    FunctionSignature::new("increment", vec![Parameter::new("x", "int")], "void")
}

#[test]
fn test_spec_construction_normalizes_post_state() {
    let spec = FunctionSpec::new(
        "increment",
        increment_signature(),
        None,
        Some(Expr::binary(
            Expr::call("'", vec![Expr::var("x")]),
            BinaryOperator::Equals,
            Expr::binary(Expr::var("x"), BinaryOperator::Plus, Expr::int(1)),
        )),
    );

    let expected = Expr::binary(
        Expr::post("x"),
        BinaryOperator::Equals,
        Expr::binary(Expr::var("x"), BinaryOperator::Plus, Expr::int(1)),
    );
    assert_eq!(spec.postcondition(), Some(&expected));
    assert!(spec.precondition().is_none());
}

#[test]
fn test_clauses_combined_in_order() {
    let spec = FunctionSpec::from_clauses(
        "f",
        increment_signature(),
        vec![Expr::var("a"), Expr::var("b")],
        vec![],
    );
    assert_eq!(
        spec.precondition(),
        Some(&Expr::binary(Expr::var("a"), BinaryOperator::And, Expr::var("b")))
    );
    assert!(spec.postcondition().is_none());
}

#[test]
fn test_signature_helpers() {
    let sig = FunctionSignature::new(
        "process",
        vec![Parameter::new("s", "Set<Integer>"), Parameter::new("n", "int")],
        "int",
    );
    assert_eq!(sig.param_names(), vec!["s", "n"]);
    assert_eq!(sig.parameter("n").map(|p| p.category()), Some(TypeCategory::Primitive));
    assert_eq!(sig.parameter("s").map(|p| p.category()), Some(TypeCategory::Collection));
    assert!(sig.parameter("missing").is_none());
    assert!(!sig.returns_void());
    assert!(FunctionSignature::new("g", vec![], "").returns_void());
}

#[test]
fn test_spec_table_from_json() {
    let json = r#"{
        "functions": [
            {
                "signature": {
                    "name": "increment",
                    "parameters": [{"name": "x", "type": "int"}]
                },
                "ensures": [{
                    "kind": "binary",
                    "left": {"kind": "variable", "name": "x_post"},
                    "op": "==",
                    "right": {"kind": "binary",
                              "left": {"kind": "variable", "name": "x"},
                              "op": "+",
                              "right": {"kind": "literal", "value": 1}}
                }]
            },
            {
                "name": "check",
                "signature": {"name": "check", "return_type": "boolean"}
            }
        ]
    }"#;

    let table = SpecTable::from_json(json).unwrap();
    assert_eq!(table.len(), 2);
    let names: Vec<_> = table.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["increment", "check"]);

    let increment = table.get("increment").unwrap();
    assert!(increment.signature().returns_void());
    match increment.postcondition() {
        Some(Expr::Binary { left, .. }) => assert_eq!(left.as_ref(), &Expr::post("x")),
        other => panic!("unexpected postcondition {:?}", other),
    }
    assert_eq!(table.get("check").unwrap().signature().return_type, "boolean");
}

#[test]
fn test_spec_table_rejects_duplicates() {
    let json = r#"{
        "functions": [
            {"signature": {"name": "f"}},
            {"signature": {"name": "f"}}
        ]
    }"#;
    let err = SpecTable::from_json(json).unwrap_err();
    assert!(err.to_string().contains("duplicate function 'f'"));
}

#[test]
fn test_spec_table_json_round_trip() {
    let table: SpecTable = vec![FunctionSpec::from_clauses(
        "inc",
        increment_signature(),
        vec![Expr::binary(Expr::var("x"), BinaryOperator::Greater, Expr::int(0))],
        vec![Expr::binary(Expr::var("x_post"), BinaryOperator::Greater, Expr::var("x"))],
    )]
    .into_iter()
    .collect();

    let json = table.to_json().unwrap();
    let parsed = SpecTable::from_json(&json).unwrap();
    assert_eq!(parsed, table);
    assert_eq!(parsed.get("inc").unwrap().signature().name, "increment");
}

#[test]
fn test_call_sequence_parse_and_distinct() {
    let calls = CallSequence::parse("A, A,B  A");
    assert_eq!(calls.iter().collect::<Vec<_>>(), vec!["A", "A", "B", "A"]);
    assert_eq!(calls.distinct(), vec!["A", "B"]);
    assert_eq!(calls.len(), 4);
    assert!(CallSequence::parse(" , ").is_empty());
}

#[test]
fn test_call_sequence_json_is_a_plain_list() {
    let calls: CallSequence = serde_json::from_str(r#"["f", "g", "f"]"#).unwrap();
    assert_eq!(calls, CallSequence::from_iter(["f", "g", "f"]));
}
