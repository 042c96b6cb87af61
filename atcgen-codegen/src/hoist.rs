//! Hoisting of repeated calls out of assertions
//!
//! Value-equality lowering duplicates whole call expressions inside an
//! assertion. Each call that occurs at least twice is declared once as
//! `var <name>_result = <call>;` right before the assertion and referenced
//! by name.

use crate::error::CodegenResult;
use crate::java::render_expr;
use atcgen_atc::Statement;
use atcgen_core::visitor::{count_matching, walk_expr, Visitor};
use atcgen_core::Expr;
use indexmap::IndexSet;
use tracing::trace;

/// Type written for hoisted declarations
const INFERRED: &str = "var";

/// Rewrite every assertion in `statements`, recursing into `if` blocks
pub fn hoist_repeated_calls(statements: &[Statement]) -> CodegenResult<Vec<Statement>> {
    let mut taken = IndexSet::new();
    for stmt in statements {
        stmt.for_each_nested(&mut |s| match s {
            Statement::SymbolicInput { name, .. } | Statement::VarDecl { name, .. } => {
                taken.insert(name.clone());
            }
            _ => {}
        });
    }
    hoist_block(statements, &mut taken)
}

fn hoist_block(
    statements: &[Statement],
    taken: &mut IndexSet<String>,
) -> CodegenResult<Vec<Statement>> {
    let mut out = Vec::with_capacity(statements.len());
    for stmt in statements {
        match stmt {
            Statement::Assert { condition } => {
                let (decls, condition) = hoist_condition(condition, taken)?;
                out.extend(decls);
                out.push(Statement::assert(condition));
            }
            Statement::If {
                condition,
                then_branch,
                early_return,
            } => out.push(Statement::if_then(
                condition.clone(),
                hoist_block(then_branch, taken)?,
                *early_return,
            )),
            other => out.push(other.clone()),
        }
    }
    Ok(out)
}

/// How occurrences of a hoisted call are recognised
enum Occurrence {
    Structural(Expr),
    /// Structural equality fails on NaN literals, so match on rendered text
    Textual(String),
}

impl Occurrence {
    fn matches(&self, expr: &Expr) -> bool {
        match self {
            Occurrence::Structural(call) => expr == call,
            Occurrence::Textual(text) => {
                expr.is_method_call() && render_expr(expr).map_or(false, |r| &r == text)
            }
        }
    }
}

struct CallCollector(Vec<Expr>);

impl Visitor for CallCollector {
    fn visit_expr(&mut self, expr: &Expr) {
        if expr.is_method_call() {
            self.0.push(expr.clone());
        }
        walk_expr(self, expr);
    }
}

fn find_repeated_call(condition: &Expr) -> CodegenResult<Option<(Expr, Occurrence)>> {
    let mut collector = CallCollector(Vec::new());
    collector.visit_expr(condition);

    for call in collector.0 {
        if count_matching(condition, |e| *e == call) >= 2 {
            return Ok(Some((call.clone(), Occurrence::Structural(call))));
        }
        if !call.contains_float_literal() {
            continue;
        }
        // same walk as `replace`, so every counted occurrence gets rewritten
        let occurrence = Occurrence::Textual(render_expr(&call)?);
        if count_matching(condition, |e| occurrence.matches(e)) >= 2 {
            return Ok(Some((call, occurrence)));
        }
    }
    Ok(None)
}

fn replace(expr: &Expr, occurrence: &Occurrence, replacement: &Expr) -> Expr {
    if occurrence.matches(expr) {
        return replacement.clone();
    }
    expr.map_children(|child| replace(child, occurrence, replacement))
}

fn fresh_name(call: &Expr, taken: &mut IndexSet<String>) -> String {
    let base = match call {
        Expr::MethodCall { name, .. } => format!("{}_result", name),
        _ => "call_result".to_string(),
    };
    let mut candidate = base.clone();
    let mut suffix = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}_{}", base, suffix);
        suffix += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

fn hoist_condition(
    condition: &Expr,
    taken: &mut IndexSet<String>,
) -> CodegenResult<(Vec<Statement>, Expr)> {
    let mut current = condition.clone();
    let mut decls = Vec::new();
    while let Some((call, occurrence)) = find_repeated_call(&current)? {
        let name = fresh_name(&call, taken);
        trace!(%name, "hoisting repeated call");
        current = replace(&current, &occurrence, &Expr::var(name.as_str()));
        decls.push(Statement::var_decl(INFERRED, name, call));
    }
    Ok((decls, current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use atcgen_core::BinaryOperator;

    fn twice(call: Expr) -> Expr {
        Expr::binary(
            Expr::binary(Expr::var("r"), BinaryOperator::Equals, call.clone()),
            BinaryOperator::Or,
            Expr::method(Expr::var("r"), "equals", vec![call]),
        )
    }

    #[test]
    fn test_repeated_call_is_hoisted_once() {
        let call = Expr::call("update", vec![Expr::var("a"), Expr::var("b")]);
        let stmts = vec![Statement::assert(twice(call.clone()))];
        let out = hoist_repeated_calls(&stmts).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Statement::var_decl("var", "update_result", call));
        assert_eq!(out[1], Statement::assert(twice(Expr::var("update_result"))));
    }

    #[test]
    fn test_single_call_is_left_inline() {
        let stmts = vec![Statement::assert(Expr::method(
            Expr::var("s"),
            "contains",
            vec![Expr::int(1)],
        ))];
        assert_eq!(hoist_repeated_calls(&stmts).unwrap(), stmts);
    }

    #[test]
    fn test_nan_argument_falls_back_to_text() {
        let call = Expr::call("scale", vec![Expr::float(f64::NAN)]);
        let stmts = vec![Statement::assert(twice(call))];
        let out = hoist_repeated_calls(&stmts).unwrap();

        assert!(matches!(&out[0], Statement::VarDecl { name, .. } if name == "scale_result"));
        assert_eq!(out[1], Statement::assert(twice(Expr::var("scale_result"))));
    }

    #[test]
    fn test_nan_call_inside_longer_name_is_not_counted() {
        let condition = Expr::binary(
            Expr::binary(
                Expr::var("r"),
                BinaryOperator::Equals,
                Expr::call("f", vec![Expr::float(f64::NAN)]),
            ),
            BinaryOperator::Or,
            Expr::method(
                Expr::var("r"),
                "equals",
                vec![Expr::call("gf", vec![Expr::float(f64::NAN)])],
            ),
        );
        let out = hoist_repeated_calls(&[Statement::assert(condition)]).unwrap();

        // NaN literals make structural comparison useless, so compare rendered text
        assert_eq!(out.len(), 1);
        match &out[0] {
            Statement::Assert { condition } => assert_eq!(
                render_expr(condition).unwrap(),
                "((r == f(Double.NaN)) || r.equals(gf(Double.NaN)))"
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_hoisted_names_avoid_existing_declarations() {
        let call = Expr::call("update", vec![]);
        let stmts = vec![
            Statement::symbolic_input("int", "update_result"),
            Statement::if_then(Expr::boolean(true), vec![Statement::assert(twice(call))], false),
        ];
        let out = hoist_repeated_calls(&stmts).unwrap();
        match &out[1] {
            Statement::If { then_branch, .. } => assert!(matches!(
                &then_branch[0],
                Statement::VarDecl { name, .. } if name == "update_result_2"
            )),
            other => panic!("unexpected {:?}", other),
        }
    }
}
