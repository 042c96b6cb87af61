//! Function specifications, the spec table and call sequences

use crate::ast::Expr;
use crate::error::{Error, Result};
use crate::types::{self, TypeCategory};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A formal parameter of a function under test
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    pub fn category(&self) -> TypeCategory {
        types::classify(&self.type_name)
    }
}

fn default_return_type() -> String {
    types::VOID.to_string()
}

/// Name, parameters and return type of a function under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default = "default_return_type")]
    pub return_type: String,
}

impl FunctionSignature {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        return_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            parameters,
            return_type: return_type.into(),
        }
    }

    /// Look up a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Parameter names in declaration order
    pub fn param_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn returns_void(&self) -> bool {
        types::is_void(&self.return_type)
    }
}

/// The pre/postcondition pair attached to one function
///
/// Clauses are combined and post-state notation is normalized when the spec
/// is built, so the stored conditions only ever use [`Expr::PostState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FunctionSpecDef", into = "FunctionSpecDef")]
pub struct FunctionSpec {
    name: String,
    signature: FunctionSignature,
    precondition: Option<Expr>,
    postcondition: Option<Expr>,
}

impl FunctionSpec {
    pub fn new(
        name: impl Into<String>,
        signature: FunctionSignature,
        precondition: Option<Expr>,
        postcondition: Option<Expr>,
    ) -> Self {
        Self {
            name: name.into(),
            signature,
            precondition: precondition.map(|e| e.normalize_post_state()),
            postcondition: postcondition.map(|e| e.normalize_post_state()),
        }
    }

    /// Build a spec from clause lists, each combined with `&&` in order
    pub fn from_clauses(
        name: impl Into<String>,
        signature: FunctionSignature,
        requires: Vec<Expr>,
        ensures: Vec<Expr>,
    ) -> Self {
        Self::new(name, signature, Expr::and_all(requires), Expr::and_all(ensures))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.signature.parameters
    }

    pub fn precondition(&self) -> Option<&Expr> {
        self.precondition.as_ref()
    }

    pub fn postcondition(&self) -> Option<&Expr> {
        self.postcondition.as_ref()
    }
}

/// Wire form of [`FunctionSpec`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionSpecDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    signature: FunctionSignature,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    requires: Vec<Expr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    ensures: Vec<Expr>,
}

impl From<FunctionSpecDef> for FunctionSpec {
    fn from(def: FunctionSpecDef) -> Self {
        let name = def.name.unwrap_or_else(|| def.signature.name.clone());
        FunctionSpec::from_clauses(name, def.signature, def.requires, def.ensures)
    }
}

impl From<FunctionSpec> for FunctionSpecDef {
    fn from(spec: FunctionSpec) -> Self {
        let name = (spec.name != spec.signature.name).then_some(spec.name);
        FunctionSpecDef {
            name,
            signature: spec.signature,
            requires: spec.precondition.into_iter().collect(),
            ensures: spec.postcondition.into_iter().collect(),
        }
    }
}

/// Insertion-ordered table of function specs keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SpecTableDef", into = "SpecTableDef")]
pub struct SpecTable {
    functions: IndexMap<String, FunctionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SpecTableDef {
    functions: Vec<FunctionSpec>,
}

impl TryFrom<SpecTableDef> for SpecTable {
    type Error = Error;

    fn try_from(def: SpecTableDef) -> Result<Self> {
        let mut table = SpecTable::new();
        for spec in def.functions {
            if table.contains(spec.name()) {
                return Err(Error::InvalidSpec(format!(
                    "duplicate function '{}'",
                    spec.name()
                )));
            }
            table.insert(spec);
        }
        Ok(table)
    }
}

impl From<SpecTable> for SpecTableDef {
    fn from(table: SpecTable) -> Self {
        SpecTableDef {
            functions: table.functions.into_values().collect(),
        }
    }
}

impl SpecTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a spec, returning the one it replaces
    pub fn insert(&mut self, spec: FunctionSpec) -> Option<FunctionSpec> {
        self.functions.insert(spec.name.clone(), spec)
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Specs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &FunctionSpec> {
        self.functions.values()
    }

    /// Parse `{"functions": [...]}`
    pub fn from_json(json: &str) -> Result<Self> {
        let table: SpecTable = serde_json::from_str(json)?;
        debug!("Loaded {} function specs", table.len());
        Ok(table)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl FromIterator<FunctionSpec> for SpecTable {
    fn from_iter<I: IntoIterator<Item = FunctionSpec>>(iter: I) -> Self {
        let mut table = SpecTable::new();
        for spec in iter {
            table.insert(spec);
        }
        table
    }
}

/// Ordered list of function names to exercise; repeats are kept
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallSequence {
    calls: Vec<String>,
}

impl CallSequence {
    pub fn new(calls: Vec<String>) -> Self {
        Self { calls }
    }

    /// Split on commas and whitespace, dropping empty entries
    pub fn parse(input: &str) -> Self {
        input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().map(String::as_str)
    }

    /// Names in first-occurrence order without repeats
    pub fn distinct(&self) -> Vec<&str> {
        self.iter().collect::<IndexSet<_>>().into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for CallSequence {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
#[path = "spec_tests.rs"]
mod tests;
