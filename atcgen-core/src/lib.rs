//! Core types for atcgen
//!
//! This crate holds the data the rest of the pipeline works on: the
//! expression AST used by pre/postconditions, the function spec table and
//! call sequence supplied by the specification parser, and the classifier
//! that sorts declared type names into primitive, collection and reference
//! categories.

pub mod ast;
pub mod error;
pub mod spec;
pub mod types;
pub mod visitor;

pub use ast::{BinaryOperator, CollectionLiteral, Expr, Literal, MapEntry, UnaryOperator};
pub use error::{Error, Result};
pub use spec::{CallSequence, FunctionSignature, FunctionSpec, Parameter, SpecTable};
pub use types::{classify, TypeCategory};
pub use visitor::Visitor;
