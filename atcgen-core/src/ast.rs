//! Expression AST for specification conditions
//!
//! Pre- and postconditions arrive from the specification parser as trees of
//! [`Expr`]. The variant set is closed; every pass over an expression is an
//! exhaustive `match`, and every rewrite builds a new tree instead of
//! mutating the input.
//!
//! # Post-state notation
//!
//! A postcondition refers to the value of a variable *after* the call with
//! one of two surface notations:
//!
//! - the wrapper application `'(x)` (also spelled `post(x)`)
//! - the identifier suffix `x_post`
//!
//! Both are folded into the single [`Expr::PostState`] tag by
//! [`Expr::normalize_post_state`], which [`crate::spec::FunctionSpec`] runs
//! once at construction time. Later passes only ever look at the tag.

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;

/// Wrapper spelling of the post-state marker: `'(x)`
pub const POST_STATE_WRAPPER: &str = "'";

/// Keyword spelling of the post-state wrapper: `post(x)`
pub const POST_STATE_KEYWORD: &str = "post";

/// Identifier suffix spelling of the post-state marker: `x_post`
pub const POST_STATE_SUFFIX: &str = "_post";

/// Literal values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
    Null,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::Float(x) if x.fract() == 0.0 && x.is_finite() => write!(f, "{:.1}", x),
            Literal::Float(x) => write!(f, "{}", x),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::String(s) => write!(f, "{:?}", s),
            Literal::Null => write!(f, "null"),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Modulo,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "==")]
    Equals,
    #[serde(rename = "!=")]
    NotEquals,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterEq,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessEq,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEq => ">=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEq => "<=",
        }
    }

    /// `==` or `!=`
    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOperator::Equals | BinaryOperator::NotEquals)
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "-")]
    Negate,
    #[serde(rename = "+")]
    Plus,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Not => "!",
            UnaryOperator::Negate => "-",
            UnaryOperator::Plus => "+",
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A key/value pair inside a map literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapEntry {
    pub key: Expr,
    pub value: Expr,
}

/// Collection literal forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum CollectionLiteral {
    Set { elements: Vec<Expr> },
    Map { entries: Vec<MapEntry> },
    Tuple { elements: Vec<Expr> },
}

/// Specification expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// Constant value
    Literal { value: Literal },

    /// Reference to a variable's current value
    Variable { name: String },

    /// Reference to a variable's value after the call under test
    PostState { name: String },

    /// Binary operation
    Binary {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },

    /// Unary operation
    Unary { op: UnaryOperator, operand: Box<Expr> },

    /// `scope.field`
    FieldAccess { scope: Box<Expr>, field: String },

    /// `base[index]`
    Index { base: Box<Expr>, index: Box<Expr> },

    /// `scope.name(args)` or, without scope, `name(args)`
    MethodCall {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        scope: Option<Box<Expr>>,
        name: String,
        #[serde(default)]
        args: Vec<Expr>,
    },

    /// `new Type(args)`
    ObjectCreate {
        type_name: String,
        #[serde(default)]
        args: Vec<Expr>,
    },

    /// Set, map or tuple literal
    Collection { literal: CollectionLiteral },

    /// `condition ? then_expr : else_expr`
    Conditional {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },

    /// `(Type) expr`
    Cast { type_name: String, expr: Box<Expr> },

    /// `this`
    SelfRef,
}

impl Expr {
    pub fn literal(value: Literal) -> Self {
        Expr::Literal { value }
    }

    pub fn int(value: i64) -> Self {
        Expr::literal(Literal::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        Expr::literal(Literal::Float(value))
    }

    pub fn boolean(value: bool) -> Self {
        Expr::literal(Literal::Boolean(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::literal(Literal::String(value.into()))
    }

    pub fn null() -> Self {
        Expr::literal(Literal::Null)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Variable { name: name.into() }
    }

    pub fn post(name: impl Into<String>) -> Self {
        Expr::PostState { name: name.into() }
    }

    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOperator, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn field(scope: Expr, field: impl Into<String>) -> Self {
        Expr::FieldAccess {
            scope: Box::new(scope),
            field: field.into(),
        }
    }

    pub fn index(base: Expr, index: Expr) -> Self {
        Expr::Index {
            base: Box::new(base),
            index: Box::new(index),
        }
    }

    /// Scope-less call `name(args)`
    pub fn call(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::MethodCall {
            scope: None,
            name: name.into(),
            args,
        }
    }

    /// Scoped call `scope.name(args)`
    pub fn method(scope: Expr, name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::MethodCall {
            scope: Some(Box::new(scope)),
            name: name.into(),
            args,
        }
    }

    pub fn new_object(type_name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::ObjectCreate {
            type_name: type_name.into(),
            args,
        }
    }

    pub fn set(elements: Vec<Expr>) -> Self {
        Expr::Collection {
            literal: CollectionLiteral::Set { elements },
        }
    }

    pub fn map(entries: Vec<(Expr, Expr)>) -> Self {
        Expr::Collection {
            literal: CollectionLiteral::Map {
                entries: entries
                    .into_iter()
                    .map(|(key, value)| MapEntry { key, value })
                    .collect(),
            },
        }
    }

    pub fn tuple(elements: Vec<Expr>) -> Self {
        Expr::Collection {
            literal: CollectionLiteral::Tuple { elements },
        }
    }

    pub fn conditional(condition: Expr, then_expr: Expr, else_expr: Expr) -> Self {
        Expr::Conditional {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }

    pub fn cast(type_name: impl Into<String>, expr: Expr) -> Self {
        Expr::Cast {
            type_name: type_name.into(),
            expr: Box::new(expr),
        }
    }

    /// Left-nested conjunction of `exprs`, `None` when empty
    pub fn and_all(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        Self::fold_binary(exprs, BinaryOperator::And)
    }

    /// Left-nested disjunction of `exprs`, `None` when empty
    pub fn or_all(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        Self::fold_binary(exprs, BinaryOperator::Or)
    }

    fn fold_binary(exprs: impl IntoIterator<Item = Expr>, op: BinaryOperator) -> Option<Expr> {
        exprs
            .into_iter()
            .reduce(|acc, next| Expr::binary(acc, op, next))
    }

    /// Stable name of the node kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Expr::Literal { .. } => "literal",
            Expr::Variable { .. } => "variable",
            Expr::PostState { .. } => "post_state",
            Expr::Binary { .. } => "binary",
            Expr::Unary { .. } => "unary",
            Expr::FieldAccess { .. } => "field_access",
            Expr::Index { .. } => "index",
            Expr::MethodCall { .. } => "method_call",
            Expr::ObjectCreate { .. } => "object_create",
            Expr::Collection { .. } => "collection",
            Expr::Conditional { .. } => "conditional",
            Expr::Cast { .. } => "cast",
            Expr::SelfRef => "self_ref",
        }
    }

    /// Name of a plain variable reference
    pub fn as_variable(&self) -> Option<&str> {
        match self {
            Expr::Variable { name } => Some(name),
            _ => None,
        }
    }

    pub fn is_method_call(&self) -> bool {
        matches!(self, Expr::MethodCall { .. })
    }

    /// Direct children in left-to-right source order
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Literal { .. } | Expr::Variable { .. } | Expr::PostState { .. } | Expr::SelfRef => {
                Vec::new()
            }
            Expr::Binary { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Expr::Unary { operand, .. } => vec![operand.as_ref()],
            Expr::FieldAccess { scope, .. } => vec![scope.as_ref()],
            Expr::Index { base, index } => vec![base.as_ref(), index.as_ref()],
            Expr::MethodCall { scope, args, .. } => scope
                .iter()
                .map(|s| s.as_ref())
                .chain(args.iter())
                .collect(),
            Expr::ObjectCreate { args, .. } => args.iter().collect(),
            Expr::Collection { literal } => match literal {
                CollectionLiteral::Set { elements } | CollectionLiteral::Tuple { elements } => {
                    elements.iter().collect()
                }
                CollectionLiteral::Map { entries } => entries
                    .iter()
                    .flat_map(|entry| [&entry.key, &entry.value])
                    .collect(),
            },
            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
            } => vec![condition.as_ref(), then_expr.as_ref(), else_expr.as_ref()],
            Expr::Cast { expr, .. } => vec![expr.as_ref()],
        }
    }

    /// Rebuild this node with every direct child replaced by `f(child)`
    ///
    /// Leaves are cloned. The receiver is never modified.
    pub fn try_map_children<E>(
        &self,
        mut f: impl FnMut(&Expr) -> Result<Expr, E>,
    ) -> Result<Expr, E> {
        Ok(match self {
            Expr::Literal { .. } | Expr::Variable { .. } | Expr::PostState { .. } | Expr::SelfRef => {
                self.clone()
            }
            Expr::Binary { left, op, right } => Expr::Binary {
                left: Box::new(f(left)?),
                op: *op,
                right: Box::new(f(right)?),
            },
            Expr::Unary { op, operand } => Expr::Unary {
                op: *op,
                operand: Box::new(f(operand)?),
            },
            Expr::FieldAccess { scope, field } => Expr::FieldAccess {
                scope: Box::new(f(scope)?),
                field: field.clone(),
            },
            Expr::Index { base, index } => Expr::Index {
                base: Box::new(f(base)?),
                index: Box::new(f(index)?),
            },
            Expr::MethodCall { scope, name, args } => Expr::MethodCall {
                scope: match scope {
                    Some(scope) => Some(Box::new(f(scope)?)),
                    None => None,
                },
                name: name.clone(),
                args: args.iter().map(|a| f(a)).collect::<Result<_, E>>()?,
            },
            Expr::ObjectCreate { type_name, args } => Expr::ObjectCreate {
                type_name: type_name.clone(),
                args: args.iter().map(|a| f(a)).collect::<Result<_, E>>()?,
            },
            Expr::Collection { literal } => Expr::Collection {
                literal: match literal {
                    CollectionLiteral::Set { elements } => CollectionLiteral::Set {
                        elements: elements.iter().map(|e| f(e)).collect::<Result<_, E>>()?,
                    },
                    CollectionLiteral::Tuple { elements } => CollectionLiteral::Tuple {
                        elements: elements.iter().map(|e| f(e)).collect::<Result<_, E>>()?,
                    },
                    CollectionLiteral::Map { entries } => CollectionLiteral::Map {
                        entries: entries
                            .iter()
                            .map(|entry| {
                                Ok(MapEntry {
                                    key: f(&entry.key)?,
                                    value: f(&entry.value)?,
                                })
                            })
                            .collect::<Result<_, E>>()?,
                    },
                },
            },
            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
            } => Expr::Conditional {
                condition: Box::new(f(condition)?),
                then_expr: Box::new(f(then_expr)?),
                else_expr: Box::new(f(else_expr)?),
            },
            Expr::Cast { type_name, expr } => Expr::Cast {
                type_name: type_name.clone(),
                expr: Box::new(f(expr)?),
            },
        })
    }

    /// Infallible form of [`Expr::try_map_children`]
    pub fn map_children(&self, mut f: impl FnMut(&Expr) -> Expr) -> Expr {
        match self.try_map_children(|child| Ok::<_, Infallible>(f(child))) {
            Ok(expr) => expr,
            Err(never) => match never {},
        }
    }

    /// Variable named by either post-state surface notation, if this node is one
    fn post_state_surface(&self) -> Option<&str> {
        match self {
            Expr::MethodCall {
                scope: None,
                name,
                args,
            } if is_post_state_wrapper(name, args.len()) => match args.as_slice() {
                [only] => only.as_variable(),
                _ => None,
            },
            Expr::Variable { name } => name
                .strip_suffix(POST_STATE_SUFFIX)
                .filter(|base| !base.is_empty()),
            _ => None,
        }
    }

    /// True for a post-state wrapper application that normalization could not fold
    pub fn is_raw_post_state_wrapper(&self) -> bool {
        matches!(
            self,
            Expr::MethodCall { scope: None, name, args } if is_post_state_wrapper(name, args.len())
        )
    }

    /// Fold both post-state notations into [`Expr::PostState`]
    pub fn normalize_post_state(&self) -> Expr {
        if let Some(var) = self.post_state_surface() {
            return Expr::post(var);
        }
        self.map_children(Expr::normalize_post_state)
    }

    /// Whether any floating literal occurs in this tree
    pub fn contains_float_literal(&self) -> bool {
        match self {
            Expr::Literal {
                value: Literal::Float(_),
            } => true,
            other => other.children().into_iter().any(Expr::contains_float_literal),
        }
    }
}

fn is_post_state_wrapper(name: &str, arity: usize) -> bool {
    name == POST_STATE_WRAPPER || (name == POST_STATE_KEYWORD && arity == 1)
}

#[cfg(test)]
#[path = "ast_tests.rs"]
mod tests;
