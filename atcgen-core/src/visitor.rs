//! Read-only traversal over expression trees

use crate::ast::Expr;

/// Trait for visiting expression nodes
///
/// The default implementation walks every child in source order, so an
/// implementor only overrides the node kinds it cares about and calls
/// [`walk_expr`] to keep descending.
pub trait Visitor {
    /// Visit a node
    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }
}

/// Visit the direct children of `expr`
pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    for child in expr.children() {
        visitor.visit_expr(child);
    }
}

/// Count nodes that satisfy `predicate`
pub fn count_matching(expr: &Expr, predicate: impl Fn(&Expr) -> bool) -> usize {
    struct Counter<F> {
        predicate: F,
        count: usize,
    }

    impl<F: Fn(&Expr) -> bool> Visitor for Counter<F> {
        fn visit_expr(&mut self, expr: &Expr) {
            if (self.predicate)(expr) {
                self.count += 1;
            }
            walk_expr(self, expr);
        }
    }

    let mut counter = Counter { predicate, count: 0 };
    counter.visit_expr(expr);
    counter.count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOperator;

    struct NameCollector(Vec<String>);

    impl Visitor for NameCollector {
        fn visit_expr(&mut self, expr: &Expr) {
            if let Some(name) = expr.as_variable() {
                self.0.push(name.to_string());
            }
            walk_expr(self, expr);
        }
    }

    #[test]
    fn test_visitor_walks_in_source_order() {
        let expr = Expr::binary(
            Expr::call("f", vec![Expr::var("a"), Expr::var("b")]),
            BinaryOperator::Less,
            Expr::field(Expr::var("c"), "size"),
        );
        let mut collector = NameCollector(Vec::new());
        collector.visit_expr(&expr);
        assert_eq!(collector.0, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_count_matching() {
        let call = Expr::call("g", vec![Expr::var("x")]);
        let expr = Expr::binary(call.clone(), BinaryOperator::Plus, call.clone());
        assert_eq!(count_matching(&expr, |e| *e == call), 2);
        assert_eq!(count_matching(&expr, Expr::is_method_call), 2);
        assert_eq!(count_matching(&expr, |e| e.as_variable() == Some("x")), 2);
    }
}
