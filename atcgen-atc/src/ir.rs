//! Language-neutral intermediate representation of a test unit

use atcgen_core::Expr;
use serde::{Deserialize, Serialize};

/// One statement of a helper method or the entrypoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stmt", rename_all = "snake_case")]
pub enum Statement {
    /// Unconstrained input value
    SymbolicInput { type_name: String, name: String },

    /// Local declaration with initializer
    VarDecl {
        type_name: String,
        name: String,
        init: Expr,
    },

    /// `target = value`
    Assign { target: String, value: Expr },

    Assume { condition: Expr },

    Assert { condition: Expr },

    /// Expression statement wrapping a call
    MethodCall { call: Expr },

    /// Conditional block; `early_return` appends a return to the block
    If {
        condition: Expr,
        then_branch: Vec<Statement>,
        early_return: bool,
    },
}

impl Statement {
    pub fn symbolic_input(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Statement::SymbolicInput {
            type_name: type_name.into(),
            name: name.into(),
        }
    }

    pub fn var_decl(type_name: impl Into<String>, name: impl Into<String>, init: Expr) -> Self {
        Statement::VarDecl {
            type_name: type_name.into(),
            name: name.into(),
            init,
        }
    }

    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Statement::Assign {
            target: target.into(),
            value,
        }
    }

    pub fn assume(condition: Expr) -> Self {
        Statement::Assume { condition }
    }

    pub fn assert(condition: Expr) -> Self {
        Statement::Assert { condition }
    }

    pub fn call(call: Expr) -> Self {
        Statement::MethodCall { call }
    }

    pub fn if_then(condition: Expr, then_branch: Vec<Statement>, early_return: bool) -> Self {
        Statement::If {
            condition,
            then_branch,
            early_return,
        }
    }

    /// Visit this statement and every statement nested in it, depth first
    pub fn for_each_nested<'a>(&'a self, f: &mut impl FnMut(&'a Statement)) {
        f(self);
        if let Statement::If { then_branch, .. } = self {
            for stmt in then_branch {
                stmt.for_each_nested(f);
            }
        }
    }
}

/// One generated test per distinct function under test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelperMethod {
    pub name: String,
    pub statements: Vec<Statement>,
}

impl HelperMethod {
    pub fn new(name: impl Into<String>, statements: Vec<Statement>) -> Self {
        Self {
            name: name.into(),
            statements,
        }
    }

    /// Helper name derived from a function name
    pub fn name_for(function: &str) -> String {
        format!("{}_helper", function)
    }

    /// All statements including those nested in `If` blocks
    pub fn flattened(&self) -> Vec<&Statement> {
        let mut out = Vec::new();
        for stmt in &self.statements {
            stmt.for_each_nested(&mut |s| out.push(s));
        }
        out
    }
}

/// A complete test container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestUnit {
    pub namespace: String,
    pub name: String,
    pub imports: Vec<String>,
    pub helpers: Vec<HelperMethod>,
    pub entrypoint: Vec<Statement>,
}

impl TestUnit {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            imports: Vec::new(),
            helpers: Vec::new(),
            entrypoint: Vec::new(),
        }
    }

    /// Add an import unless it is already present
    pub fn add_import(&mut self, import: impl Into<String>) -> bool {
        let import = import.into();
        if self.imports.contains(&import) {
            return false;
        }
        self.imports.push(import);
        true
    }

    pub fn helper(&self, name: &str) -> Option<&HelperMethod> {
        self.helpers.iter().find(|h| h.name == name)
    }

    /// Fully qualified name of the container
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_import_deduplicates() {
        let mut unit = TestUnit::new("demo", "GeneratedATCs");
        assert!(unit.add_import("java.util.*"));
        assert!(!unit.add_import("java.util.*"));
        assert_eq!(unit.imports, vec!["java.util.*"]);
        assert_eq!(unit.qualified_name(), "demo.GeneratedATCs");
        assert_eq!(TestUnit::new("", "T").qualified_name(), "T");
    }

    #[test]
    fn test_flattened_includes_nested_statements() {
        let helper = HelperMethod::new(
            HelperMethod::name_for("process"),
            vec![
                Statement::symbolic_input("int", "x"),
                Statement::if_then(
                    Expr::boolean(true),
                    vec![Statement::call(Expr::call("process", vec![]))],
                    false,
                ),
            ],
        );
        assert_eq!(helper.name, "process_helper");
        let flat = helper.flattened();
        assert_eq!(flat.len(), 3);
        assert!(matches!(flat[2], Statement::MethodCall { .. }));
    }

    #[test]
    fn test_statement_json_is_tagged() {
        let stmt = Statement::assume(Expr::boolean(true));
        let json = serde_json::to_value(&stmt).unwrap();
        assert_eq!(json["stmt"], "assume");
        assert_eq!(json["condition"]["kind"], "literal");
        let back: Statement = serde_json::from_value(json).unwrap();
        assert_eq!(back, stmt);
    }
}
