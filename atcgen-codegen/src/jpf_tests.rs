use super::*;
use atcgen_atc::{HelperMethod, TestUnit};

const SOURCE: &str = r#"
package demo;

public class GeneratedATCs {

    @Test
    public void process_helper() {
        Helper.process(data, result);
    }

    public static Map<?,?> update(@NonNull final Map<Integer, Integer> result, Set<Integer> data) {
        return result;
    }

    public void greet(String name, String [] others, int[] counts) throws Exception {
    }

    public static void main(String[] args) {
        GeneratedATCs instance = new GeneratedATCs();
        instance.process_helper();
    }
}
"#;

#[test]
fn test_generic_parameters_split_at_top_level() {
    let parts = split_parameters("Map<Integer, Integer> result, Set<Integer> data", "update").unwrap();
    assert_eq!(parts, vec!["Map<Integer, Integer> result", "Set<Integer> data"]);
}

#[test]
fn test_nested_generics() {
    let parts = split_parameters("Map<String, List<Integer>> m, int n", "f").unwrap();
    assert_eq!(parts.len(), 2);
}

#[test]
fn test_unbalanced_brackets_are_rejected() {
    let err = split_parameters("Map<Integer, Integer result", "update").unwrap_err();
    assert!(matches!(err, CodegenError::SignatureParse { reason: "unbalanced '<'", .. }));

    let err = split_parameters("Set>Integer> s", "f").unwrap_err();
    assert!(err.to_string().contains("unbalanced '>'"));
}

#[test]
fn test_annotation_arguments_do_not_split_parameters() {
    let parts = split_parameters("@Size(min = 1, max = 2) int x, String s", "f").unwrap();
    assert_eq!(parts, vec!["@Size(min = 1, max = 2) int x", "String s"]);

    assert_eq!(
        extract_method_signature("public void f(@Size(min = 1, max = 2) int x, String s) {}", "f")
            .unwrap(),
        "f(int,java.lang.String)"
    );
}

#[test]
fn test_annotation_literals_may_hold_brackets() {
    let source = r#"void check(@Pattern(regexp = "[a-z]+(,\\d)") String s, @Range(min = 0 < 1) int n) {}"#;
    assert_eq!(
        extract_method_signature(source, "check").unwrap(),
        "check(java.lang.String,int)"
    );
}

#[test]
fn test_unbalanced_parentheses_are_rejected() {
    let err = split_parameters("@Size(min = 1 int x, String s", "f").unwrap_err();
    assert!(matches!(err, CodegenError::SignatureParse { reason: "unbalanced '('", .. }));

    let err = split_parameters("int x), String s", "f").unwrap_err();
    assert!(err.to_string().contains("unbalanced ')'"));
}

#[test]
fn test_non_ascii_annotation_names() {
    assert_eq!(
        extract_method_signature("public void g(@Ä int x, @Prüfung(\"ü\") long y) {}", "g").unwrap(),
        "g(int,long)"
    );
}

#[test]
fn test_signature_strips_annotations_modifiers_and_names() {
    assert_eq!(
        extract_method_signature(SOURCE, "update").unwrap(),
        "update(Map<Integer, Integer>,Set<Integer>)"
    );
}

#[test]
fn test_signature_normalizes_strings() {
    assert_eq!(
        extract_method_signature(SOURCE, "greet").unwrap(),
        "greet(java.lang.String,java.lang.String[],int[])"
    );
}

#[test]
fn test_calls_are_not_declarations() {
    // `process` only appears as a call
    assert_eq!(extract_method_signature(SOURCE, "process").unwrap(), "process()");
    assert_eq!(
        extract_method_signature(SOURCE, "process_helper").unwrap(),
        "process_helper()"
    );
    assert_eq!(extract_method_signature(SOURCE, "missing").unwrap(), "missing()");
}

#[test]
fn test_method_document_keys() {
    let doc = method_document(&JpfSettings::default(), "demo.GeneratedATCs", "f_helper()");
    assert_eq!(doc.get("symbolic.method"), Some("demo.GeneratedATCs.f_helper()"));
    assert_eq!(doc.get("target"), Some("demo.GeneratedATCs"));
    assert_eq!(doc.get("symbolic.minint"), Some("-100"));
    assert_eq!(doc.get("symbolic.maxint"), Some("100"));
    assert_eq!(doc.get("search.depth_limit"), Some("500"));
    assert_eq!(doc.get("search.time_limit"), Some("120"));
    assert_eq!(doc.get("coverage.include"), Some("*.GeneratedATCs"));
    assert!(doc.get("listener").unwrap().contains("SymbolicSequenceListener"));
    assert!(doc.get("vm.output").is_none());
    assert_eq!(doc.keys()[0], "@using");
}

#[test]
fn test_program_document_keys() {
    let doc = program_document(&JpfSettings::default(), "demo.GeneratedATCs");
    assert!(doc.get("symbolic.method").is_none());
    assert!(doc.get("listener").is_none());
    assert_eq!(doc.get("search.depth_limit"), Some("200"));
    assert_eq!(doc.get("search.time_limit"), Some("60"));
    assert_eq!(doc.get("vm.output"), Some("true"));
    assert_eq!(
        doc.get("jpf.report.console.finished"),
        Some("gov.nasa.jpf.symbc.SymbolicPathListener")
    );
}

#[test]
fn test_document_rendering() {
    let mut doc = ConfigDocument::new();
    doc.comment("Target class").entry("target", "A").blank().entry("x", 1);
    assert_eq!(doc.to_string(), "# Target class\ntarget = A\n\nx = 1\n");
}

#[test]
fn test_unit_documents_file_names() {
    let mut unit = TestUnit::new("demo", "GeneratedATCs");
    unit.helpers.push(HelperMethod::new("process_helper", vec![]));
    let docs = unit_documents(&unit, SOURCE, &JpfSettings::default()).unwrap();

    let names: Vec<_> = docs.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        vec!["GeneratedATCs_main.jpf", "GeneratedATCs_process_helper.jpf"]
    );
    assert_eq!(
        docs[1].1.get("symbolic.method"),
        Some("demo.GeneratedATCs.process_helper()")
    );
}
