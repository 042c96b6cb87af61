//! Rewrites of postcondition expressions into assertion form
//!
//! A postcondition speaks about two moments: post-state references
//! ([`Expr::PostState`]) mean the value after the call, plain variables mean
//! the value before it. Before the call every plain variable the assertion
//! needs is copied into a snapshot; after the call the assertion is
//! rewritten so post-state references read the live variable (or the call
//! result) and plain variables read their snapshot.

use atcgen_core::types::TypeCategory;
use atcgen_core::visitor::{walk_expr, Visitor};
use atcgen_core::{BinaryOperator, Error, Expr, Parameter, Result, UnaryOperator};
use indexmap::{IndexMap, IndexSet};
use tracing::trace;

/// Variable name -> snapshot variable name
pub type OldStateMap = IndexMap<String, String>;

const POST_CONDITION_OP: &str = "post-condition transform";
const PRE_CONDITION_OP: &str = "precondition transform";

struct VariableCollector {
    names: IndexSet<String>,
    post_state_only: bool,
}

impl Visitor for VariableCollector {
    fn visit_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Variable { name } if !self.post_state_only => {
                self.names.insert(name.clone());
            }
            Expr::PostState { name } => {
                self.names.insert(name.clone());
            }
            _ => walk_expr(self, expr),
        }
    }
}

/// Every variable name referenced by `post`, plain or post-state, in first
/// occurrence order
pub fn collect_old_state_vars(post: &Expr) -> IndexSet<String> {
    let mut collector = VariableCollector {
        names: IndexSet::new(),
        post_state_only: false,
    };
    collector.visit_expr(post);
    collector.names
}

/// Variable names referenced under post-state, in first occurrence order
pub fn collect_post_state_vars(expr: &Expr) -> IndexSet<String> {
    let mut collector = VariableCollector {
        names: IndexSet::new(),
        post_state_only: true,
    };
    collector.visit_expr(expr);
    collector.names
}

/// First parameter, in declaration order, referenced under post-state
pub fn find_post_state_parameter(post: &Expr, param_names: &[&str]) -> Option<String> {
    let referenced = collect_post_state_vars(post);
    param_names
        .iter()
        .find(|name| referenced.contains(**name))
        .map(|name| name.to_string())
}

/// Parameters used as the base of an index access, plain or post-state
pub fn index_accessed_parameters(expr: &Expr, param_names: &[&str]) -> IndexSet<String> {
    struct IndexBases<'a> {
        params: &'a [&'a str],
        found: IndexSet<String>,
    }

    impl Visitor for IndexBases<'_> {
        fn visit_expr(&mut self, expr: &Expr) {
            if let Expr::Index { base, .. } = expr {
                if let Some(name) = variable_or_post_state(base) {
                    if self.params.contains(&name) {
                        self.found.insert(name.to_string());
                    }
                }
            }
            walk_expr(self, expr);
        }
    }

    let mut visitor = IndexBases {
        params: param_names,
        found: IndexSet::new(),
    };
    visitor.visit_expr(expr);
    visitor.found
}

fn variable_or_post_state(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Variable { name } | Expr::PostState { name } => Some(name),
        _ => None,
    }
}

/// `base[i]` where `base` names a primitive parameter stands for the scalar
fn collapsed_index<'e>(expr: &'e Expr, params: &[Parameter]) -> Option<&'e Expr> {
    let Expr::Index { base, .. } = expr else {
        return None;
    };
    let name = variable_or_post_state(base)?;
    params
        .iter()
        .any(|p| p.name == name && p.category() == TypeCategory::Primitive)
        .then_some(base.as_ref())
}

struct PostConditionRewriter<'a> {
    result_binding: Option<&'a str>,
    old_state: &'a OldStateMap,
    params: &'a [Parameter],
}

impl PostConditionRewriter<'_> {
    fn rewrite(&self, expr: &Expr) -> Result<Expr> {
        if let Some(base) = collapsed_index(expr, self.params) {
            return self.rewrite(base);
        }
        match expr {
            Expr::PostState { name } => {
                Ok(Expr::var(self.result_binding.unwrap_or(name.as_str())))
            }
            Expr::Variable { name } => Ok(match self.old_state.get(name) {
                Some(snapshot) => Expr::var(snapshot.as_str()),
                None => expr.clone(),
            }),
            raw if raw.is_raw_post_state_wrapper() => {
                Err(Error::unsupported(raw.kind(), POST_CONDITION_OP))
            }
            other => other.try_map_children(|child| self.rewrite(child)),
        }
    }
}

/// Rewrite a normalized postcondition into the assertion checked after the call
///
/// Post-state references become `result_binding` when there is one and the
/// bare variable otherwise. Plain variables with an entry in `old_state`
/// become their snapshot. Index accesses on primitive parameters collapse to
/// the scalar.
pub fn transform_post_condition(
    post: &Expr,
    result_binding: Option<&str>,
    old_state: &OldStateMap,
    params: &[Parameter],
) -> Result<Expr> {
    trace!(?result_binding, snapshots = old_state.len(), "transforming postcondition");
    PostConditionRewriter {
        result_binding,
        old_state,
        params,
    }
    .rewrite(post)
}

/// Rewrite a precondition into the assumption placed before the call
///
/// A precondition cannot observe the post-state, so any post-state
/// reference is rejected.
pub fn transform_pre_condition(pre: &Expr, params: &[Parameter]) -> Result<Expr> {
    if let Some(base) = collapsed_index(pre, params) {
        return transform_pre_condition(base, params);
    }
    match pre {
        Expr::PostState { .. } => Err(Error::unsupported(pre.kind(), PRE_CONDITION_OP)),
        raw if raw.is_raw_post_state_wrapper() => {
            Err(Error::unsupported(raw.kind(), PRE_CONDITION_OP))
        }
        other => other.try_map_children(|child| transform_pre_condition(child, params)),
    }
}

/// Replace `==`/`!=` on nullable operands with value equality
///
/// `a == b` becomes `(a == b || (a != null && a.equals(b)))` when either
/// operand is a variable for which `is_nullable` holds; `!=` is the negation.
/// The left operand is the receiver unless only the right one is nullable.
pub fn lower_reference_equality(expr: &Expr, is_nullable: &impl Fn(&str) -> bool) -> Expr {
    let lowered = expr.map_children(|child| lower_reference_equality(child, is_nullable));
    value_equality(&lowered, is_nullable).unwrap_or(lowered)
}

fn value_equality(expr: &Expr, is_nullable: &impl Fn(&str) -> bool) -> Option<Expr> {
    let Expr::Binary { left, op, right } = expr else {
        return None;
    };
    if !op.is_equality() {
        return None;
    }
    let (left, right) = (left.as_ref(), right.as_ref());
    let nullable = |e: &Expr| e.as_variable().map_or(false, is_nullable);
    let (receiver, argument) = match (nullable(left), nullable(right)) {
        (true, _) => (left, right),
        (false, true) => (right, left),
        (false, false) => return None,
    };

    let value_equal = Expr::binary(
        Expr::binary(left.clone(), BinaryOperator::Equals, right.clone()),
        BinaryOperator::Or,
        Expr::binary(
            Expr::binary(receiver.clone(), BinaryOperator::NotEquals, Expr::null()),
            BinaryOperator::And,
            Expr::method(receiver.clone(), "equals", vec![argument.clone()]),
        ),
    );
    Some(match op {
        BinaryOperator::NotEquals => Expr::unary(UnaryOperator::Not, value_equal),
        _ => value_equal,
    })
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
