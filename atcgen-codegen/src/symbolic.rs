//! Rewrite of a test unit for Symbolic PathFinder
//!
//! Symbolic inputs become `Debug.makeSymbolic*` declarations and
//! assumptions become `Debug.assume` calls. Everything else is carried over
//! as is, so the result renders through the same [`JavaGenerator`].
//!
//! [`JavaGenerator`]: crate::java::JavaGenerator

use atcgen_atc::{HelperMethod, Statement, TestUnit};
use atcgen_core::types::{base_type_name, concrete_collection};
use atcgen_core::{classify, BinaryOperator, Expr, TypeCategory};
use tracing::debug;

/// Import providing the symbolic-execution hooks
pub const DEBUG_IMPORT: &str = "gov.nasa.jpf.symbc.Debug";

const DEBUG: &str = "Debug";

/// Rewrites baseline IR into its symbolic-execution form
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolicTransformer;

impl SymbolicTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Produce the symbolic variant of `unit`; the input is not modified
    pub fn transform(&self, unit: &TestUnit) -> TestUnit {
        let mut out = TestUnit::new(unit.namespace.as_str(), unit.name.as_str());
        out.imports = unit.imports.clone();
        if !out.imports.iter().any(|imp| is_debug_import(imp)) {
            out.add_import(DEBUG_IMPORT);
        }
        out.helpers = unit
            .helpers
            .iter()
            .map(|helper| {
                HelperMethod::new(helper.name.as_str(), self.transform_block(&helper.statements))
            })
            .collect();
        out.entrypoint = self.transform_block(&unit.entrypoint);
        debug!(unit = %out.name, "rewrote unit for symbolic execution");
        out
    }

    fn transform_block(&self, statements: &[Statement]) -> Vec<Statement> {
        statements.iter().map(|s| self.transform_statement(s)).collect()
    }

    fn transform_statement(&self, stmt: &Statement) -> Statement {
        match stmt {
            Statement::SymbolicInput { type_name, name } => Statement::var_decl(
                type_name.as_str(),
                name.as_str(),
                make_symbolic(type_name, name),
            ),
            Statement::Assume { condition } => {
                Statement::call(debug_call("assume", vec![condition.clone()]))
            }
            Statement::If {
                condition,
                then_branch,
                early_return,
            } => Statement::if_then(
                condition.clone(),
                self.transform_block(then_branch),
                *early_return,
            ),
            other => other.clone(),
        }
    }
}

fn is_debug_import(import: &str) -> bool {
    import == DEBUG_IMPORT || import.ends_with(".Debug")
}

fn debug_call(method: &str, args: Vec<Expr>) -> Expr {
    Expr::method(Expr::var(DEBUG), method, args)
}

/// Initializer producing a fresh symbolic value of `type_name`
pub fn make_symbolic(type_name: &str, name: &str) -> Expr {
    let label = || vec![Expr::string(name)];
    match type_name.trim() {
        "int" | "Integer" => debug_call("makeSymbolicInteger", label()),
        "long" | "Long" => debug_call("makeSymbolicLong", label()),
        "short" | "Short" => debug_call("makeSymbolicShort", label()),
        "byte" | "Byte" => debug_call("makeSymbolicByte", label()),
        "char" | "Character" => debug_call("makeSymbolicChar", label()),
        "double" | "Double" => debug_call("makeSymbolicReal", label()),
        "float" | "Float" => Expr::cast("float", debug_call("makeSymbolicReal", label())),
        "boolean" | "Boolean" => Expr::binary(
            debug_call("makeSymbolicInteger", label()),
            BinaryOperator::NotEquals,
            Expr::int(0),
        ),
        "String" | "java.lang.String" => debug_call("makeSymbolicString", label()),
        _ => {
            let seed = match classify(type_name) {
                TypeCategory::Collection => Expr::new_object(
                    format!("{}<>", concrete_collection(base_type_name(type_name))),
                    vec![],
                ),
                TypeCategory::Primitive | TypeCategory::Reference => Expr::null(),
            };
            Expr::cast(
                type_name.trim(),
                debug_call("makeSymbolicRef", vec![Expr::string(name), seed]),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::java::render_expr;

    fn rendered(type_name: &str) -> String {
        render_expr(&make_symbolic(type_name, "v")).unwrap()
    }

    #[test]
    fn test_scalar_constructors() {
        assert_eq!(rendered("int"), "Debug.makeSymbolicInteger(\"v\")");
        assert_eq!(rendered("long"), "Debug.makeSymbolicLong(\"v\")");
        assert_eq!(rendered("char"), "Debug.makeSymbolicChar(\"v\")");
        assert_eq!(rendered("double"), "Debug.makeSymbolicReal(\"v\")");
        assert_eq!(rendered("float"), "((float) Debug.makeSymbolicReal(\"v\"))");
        assert_eq!(rendered("String"), "Debug.makeSymbolicString(\"v\")");
        assert_eq!(rendered("boolean"), "(Debug.makeSymbolicInteger(\"v\") != 0)");
    }

    #[test]
    fn test_reference_constructors() {
        assert_eq!(
            rendered("Set<Integer>"),
            "((Set<Integer>) Debug.makeSymbolicRef(\"v\", new HashSet<>()))"
        );
        assert_eq!(
            rendered("java.util.Map<Integer, Integer>"),
            "((java.util.Map<Integer, Integer>) Debug.makeSymbolicRef(\"v\", new HashMap<>()))"
        );
        assert_eq!(rendered("Account"), "((Account) Debug.makeSymbolicRef(\"v\", null))");
    }

    #[test]
    fn test_transform_rewrites_inputs_and_assumptions() {
        let mut unit = TestUnit::new("demo", "T");
        unit.add_import("java.util.*");
        unit.helpers.push(HelperMethod::new(
            "f_helper",
            vec![
                Statement::symbolic_input("int", "x"),
                Statement::if_then(
                    Expr::boolean(true),
                    vec![Statement::assume(Expr::var("x"))],
                    true,
                ),
                Statement::assert(Expr::var("x")),
            ],
        ));

        let out = SymbolicTransformer::new().transform(&unit);
        assert_eq!(out.imports, vec!["java.util.*", DEBUG_IMPORT]);

        let s = &out.helpers[0].statements;
        assert_eq!(
            s[0],
            Statement::var_decl("int", "x", debug_call("makeSymbolicInteger", vec![Expr::string("x")]))
        );
        assert_eq!(
            s[1],
            Statement::if_then(
                Expr::boolean(true),
                vec![Statement::call(debug_call("assume", vec![Expr::var("x")]))],
                true,
            )
        );
        assert_eq!(s[2], Statement::assert(Expr::var("x")));
        // input untouched
        assert!(matches!(unit.helpers[0].statements[0], Statement::SymbolicInput { .. }));
    }

    #[test]
    fn test_transform_is_idempotent() {
        let mut unit = TestUnit::new("demo", "T");
        unit.helpers.push(HelperMethod::new(
            "f_helper",
            vec![
                Statement::symbolic_input("Set<Integer>", "s"),
                Statement::assume(Expr::boolean(true)),
                Statement::if_then(
                    Expr::var("s"),
                    vec![Statement::assume(Expr::var("s"))],
                    false,
                ),
            ],
        ));
        unit.entrypoint.push(Statement::call(Expr::method(
            Expr::var("instance"),
            "f_helper",
            vec![],
        )));

        let transformer = SymbolicTransformer::new();
        let once = transformer.transform(&unit);
        let twice = transformer.transform(&once);

        assert_eq!(twice, once);
        assert_eq!(
            twice.imports.iter().filter(|i| i.as_str() == DEBUG_IMPORT).count(),
            1
        );
    }

    #[test]
    fn test_existing_debug_import_is_kept() {
        let mut unit = TestUnit::new("demo", "T");
        unit.add_import("my.tools.Debug");
        let out = SymbolicTransformer::new().transform(&unit);
        assert_eq!(out.imports, vec!["my.tools.Debug"]);
    }
}
