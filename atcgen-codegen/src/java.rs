//! Baseline Java rendering of a test unit
//!
//! Rendering is purely structural: every IR statement and expression node
//! maps to one Java form. Binary, conditional and cast expressions are
//! always parenthesized so operator precedence never depends on context.

use crate::error::CodegenResult;
use crate::hoist::hoist_repeated_calls;
use crate::source::SourceBuilder;
use atcgen_atc::{HelperMethod, Statement, TestUnit};
use atcgen_core::types::{concrete_collection, TypeCategory};
use atcgen_core::{classify, CollectionLiteral, Error, Expr, Literal, MapEntry};
use tracing::debug;

const RENDER_OP: &str = "baseline rendering";

/// `Map.of` accepts at most this many pairs
const MAP_OF_LIMIT: usize = 10;

/// Renders [`TestUnit`]s as plain Java test classes
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaGenerator;

impl JavaGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Render the whole compilation unit
    pub fn generate(&self, unit: &TestUnit) -> CodegenResult<String> {
        let mut out = SourceBuilder::new();

        if !unit.namespace.is_empty() {
            out.line(format!("package {};", unit.namespace));
            out.blank();
        }
        for import in &unit.imports {
            out.line(format!("import {};", import));
        }
        if !unit.imports.is_empty() {
            out.blank();
        }

        out.line(format!("public class {} {{", unit.name));
        out.increase_indent();

        for helper in &unit.helpers {
            out.blank();
            self.render_helper(&mut out, helper)?;
        }

        out.blank();
        out.line("public static void main(String[] args) {");
        out.increase_indent();
        for stmt in &unit.entrypoint {
            render_statement(&mut out, stmt)?;
        }
        out.decrease_indent();
        out.line("}");

        out.decrease_indent();
        out.line("}");

        debug!(unit = %unit.name, helpers = unit.helpers.len(), "rendered Java source");
        Ok(out.build())
    }

    fn render_helper(&self, out: &mut SourceBuilder, helper: &HelperMethod) -> CodegenResult<()> {
        let statements = hoist_repeated_calls(&helper.statements)?;
        out.line("@Test");
        out.line(format!("public void {}() {{", helper.name));
        out.increase_indent();
        for stmt in &statements {
            render_statement(out, stmt)?;
        }
        out.decrease_indent();
        out.line("}");
        Ok(())
    }
}

/// Render one statement, recursing into `if` blocks
pub fn render_statement(out: &mut SourceBuilder, stmt: &Statement) -> CodegenResult<()> {
    match stmt {
        Statement::SymbolicInput { type_name, name } => {
            if classify(type_name) == TypeCategory::Primitive {
                out.line(format!("{} {} = Symbolic.input(\"{}\");", type_name, name, name));
            } else {
                out.line(format!(
                    "{} {} = ({}) Symbolic.input(\"{}\");",
                    type_name, name, type_name, name
                ));
            }
        }
        Statement::VarDecl {
            type_name,
            name,
            init,
        } => out.line(format!("{} {} = {};", type_name, name, render_expr(init)?)),
        Statement::Assign { target, value } => {
            out.line(format!("{} = {};", target, render_expr(value)?))
        }
        Statement::Assume { condition } => out.line(format!("assume({});", render_expr(condition)?)),
        Statement::Assert { condition } => out.line(format!("assert({});", render_expr(condition)?)),
        Statement::MethodCall { call } => out.line(format!("{};", render_expr(call)?)),
        Statement::If {
            condition,
            then_branch,
            early_return,
        } => {
            out.line(format!("if ({}) {{", render_condition(condition)?));
            out.increase_indent();
            for nested in then_branch {
                render_statement(out, nested)?;
            }
            if *early_return {
                out.line("return;");
            }
            out.decrease_indent();
            out.line("}");
        }
    }
    Ok(())
}

/// `if` conditions drop the outermost parentheses of a binary expression
fn render_condition(condition: &Expr) -> CodegenResult<String> {
    match condition {
        Expr::Binary { left, op, right } => Ok(format!(
            "{} {} {}",
            render_expr(left)?,
            op,
            render_expr(right)?
        )),
        other => render_expr(other),
    }
}

/// Render an expression as Java source
pub fn render_expr(expr: &Expr) -> CodegenResult<String> {
    Ok(match expr {
        Expr::Literal { value } => render_literal(value),
        Expr::Variable { name } => name.clone(),
        Expr::PostState { .. } => return Err(Error::unsupported(expr.kind(), RENDER_OP).into()),
        Expr::Binary { left, op, right } => {
            format!("({} {} {})", render_expr(left)?, op, render_expr(right)?)
        }
        Expr::Unary { op, operand } => {
            let inner = render_expr(operand)?;
            if needs_unary_parens(operand) {
                format!("{}({})", op, inner)
            } else {
                format!("{}{}", op, inner)
            }
        }
        Expr::FieldAccess { scope, field } => format!("{}.{}", render_receiver(scope)?, field),
        Expr::Index { base, index } => {
            format!("{}[{}]", render_receiver(base)?, render_expr(index)?)
        }
        Expr::MethodCall { scope, name, args } => {
            if expr.is_raw_post_state_wrapper() {
                return Err(Error::unsupported(expr.kind(), RENDER_OP).into());
            }
            let args = render_args(args)?;
            match scope {
                Some(scope) => format!("{}.{}({})", render_receiver(scope)?, name, args),
                None => format!("{}({})", name, args),
            }
        }
        Expr::ObjectCreate { type_name, args } => render_object_create(type_name, args)?,
        Expr::Collection { literal } => render_collection(literal)?,
        Expr::Conditional {
            condition,
            then_expr,
            else_expr,
        } => format!(
            "({} ? {} : {})",
            render_expr(condition)?,
            render_expr(then_expr)?,
            render_expr(else_expr)?
        ),
        Expr::Cast { type_name, expr } => format!("(({}) {})", type_name, render_expr(expr)?),
        Expr::SelfRef => "this".to_string(),
    })
}

fn render_args(args: &[Expr]) -> CodegenResult<String> {
    Ok(args
        .iter()
        .map(render_expr)
        .collect::<CodegenResult<Vec<_>>>()?
        .join(", "))
}

/// Receivers of `.` and `[]` that would otherwise bind wrongly
fn render_receiver(expr: &Expr) -> CodegenResult<String> {
    let rendered = render_expr(expr)?;
    Ok(match expr {
        Expr::Unary { .. } => format!("({})", rendered),
        _ => rendered,
    })
}

fn needs_unary_parens(operand: &Expr) -> bool {
    match operand {
        Expr::Unary { .. } => true,
        Expr::Literal {
            value: Literal::Integer(n),
        } => *n < 0,
        Expr::Literal {
            value: Literal::Float(x),
        } => x.is_sign_negative(),
        _ => false,
    }
}

fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Integer(n) if i32::try_from(*n).is_ok() => n.to_string(),
        Literal::Integer(n) => format!("{}L", n),
        Literal::Float(x) if x.is_nan() => "Double.NaN".to_string(),
        Literal::Float(x) if x.is_infinite() && *x > 0.0 => "Double.POSITIVE_INFINITY".to_string(),
        Literal::Float(x) if x.is_infinite() => "Double.NEGATIVE_INFINITY".to_string(),
        Literal::String(s) => java_string(s),
        other => other.to_string(),
    }
}

/// Quote `s` as a Java string literal
pub fn java_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn generic_suffix(type_name: &str) -> &str {
    match type_name.find('<') {
        Some(pos) => &type_name[pos..],
        None => "<>",
    }
}

fn render_object_create(type_name: &str, args: &[Expr]) -> CodegenResult<String> {
    let rendered = render_args(args)?;
    if let Some(element) = type_name.strip_suffix("[]") {
        return Ok(format!("new {}[]{{{}}}", element, rendered));
    }

    let concrete = concrete_collection(type_name);
    let is_interface = classify(type_name) == TypeCategory::Collection
        && concrete != atcgen_core::types::base_type_name(type_name);
    if !is_interface {
        return Ok(format!("new {}({})", type_name, rendered));
    }

    let target = format!("{}{}", concrete, generic_suffix(type_name));
    Ok(if args.is_empty() {
        format!("new {}()", target)
    } else if concrete == "HashMap" {
        format!("new {}(Map.of({}))", target, rendered)
    } else {
        format!("new {}(Arrays.asList({}))", target, rendered)
    })
}

fn render_collection(literal: &CollectionLiteral) -> CodegenResult<String> {
    Ok(match literal {
        CollectionLiteral::Set { elements } if elements.is_empty() => "new HashSet<>()".to_string(),
        CollectionLiteral::Set { elements } => {
            format!("new HashSet<>(Arrays.asList({}))", render_args(elements)?)
        }
        CollectionLiteral::Map { entries } if entries.is_empty() => "new HashMap<>()".to_string(),
        CollectionLiteral::Map { entries } if entries.len() <= MAP_OF_LIMIT => {
            let pairs = entries
                .iter()
                .map(|MapEntry { key, value }| {
                    Ok(format!("{}, {}", render_expr(key)?, render_expr(value)?))
                })
                .collect::<CodegenResult<Vec<_>>>()?;
            format!("Map.of({})", pairs.join(", "))
        }
        CollectionLiteral::Map { entries } => {
            let pairs = entries
                .iter()
                .map(|MapEntry { key, value }| {
                    Ok(format!(
                        "Map.entry({}, {})",
                        render_expr(key)?,
                        render_expr(value)?
                    ))
                })
                .collect::<CodegenResult<Vec<_>>>()?;
            format!("Map.ofEntries({})", pairs.join(", "))
        }
        CollectionLiteral::Tuple { elements } => {
            format!("Arrays.asList({})", render_args(elements)?)
        }
    })
}

#[cfg(test)]
#[path = "java_tests.rs"]
mod tests;
