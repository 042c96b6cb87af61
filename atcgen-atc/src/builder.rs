//! Test-unit builder
//!
//! For every distinct function in the call sequence the builder lays out one
//! helper method:
//!
//! 1. symbolic inputs, plus a one-element container for each primitive
//!    parameter that must be mutated in place
//! 2. `assume(pre)`
//! 3. snapshots of every parameter the postcondition reads
//! 4. a null guard with matching assumptions for nullable parameters
//! 5. the call, with write-backs from the containers
//! 6. `assert(post)` over the live values and the snapshots
//!
//! The entrypoint then instantiates the unit and replays the call sequence.

use crate::config::{AtcConfig, UnmatchedCallPolicy};
use crate::error::{AtcError, AtcResult};
use crate::ir::{HelperMethod, Statement, TestUnit};
use crate::transform::{
    collect_old_state_vars, collect_post_state_vars, find_post_state_parameter,
    index_accessed_parameters, lower_reference_equality, transform_post_condition,
    transform_pre_condition, OldStateMap,
};
use atcgen_core::types::{concrete_collection, TypeCategory};
use atcgen_core::visitor::count_matching;
use atcgen_core::{BinaryOperator, CallSequence, Expr, FunctionSpec, Parameter, SpecTable};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;
use tracing::{debug, trace, warn};

/// Names that can appear as variables in a condition but never need a snapshot
const SENTINELS: &[&str] = &["null", "this", "true", "false"];

/// Name of the entrypoint's container instance
const INSTANCE: &str = "instance";

const RESULT: &str = "result";

/// Builds [`TestUnit`]s from a spec table and call sequence
#[derive(Debug, Clone, Default)]
pub struct AtcBuilder {
    config: AtcConfig,
}

impl AtcBuilder {
    pub fn new(config: AtcConfig) -> Self {
        Self { config }
    }

    /// Build the test unit for `calls`
    pub fn build(&self, specs: &SpecTable, calls: &CallSequence) -> AtcResult<TestUnit> {
        let mut unit = TestUnit::new(&self.config.namespace, &self.config.unit_name);
        for import in &self.config.imports {
            unit.add_import(import.as_str());
        }

        for name in calls.distinct() {
            match specs.get(name) {
                Some(spec) => {
                    let helper = self.build_helper(spec)?;
                    debug!(
                        function = name,
                        statements = helper.statements.len(),
                        "built helper"
                    );
                    unit.helpers.push(helper);
                }
                None => match self.config.unmatched_calls {
                    UnmatchedCallPolicy::Error => {
                        return Err(AtcError::MissingSpec {
                            name: name.to_string(),
                        })
                    }
                    UnmatchedCallPolicy::Skip => {
                        warn!("No spec for call sequence entry '{}', skipping", name)
                    }
                },
            }
        }

        if unit.helpers.iter().any(uses_bare_calls) {
            unit.add_import(format!(
                "static {}.{}.*",
                self.config.namespace, self.config.target_class
            ));
        }

        unit.entrypoint = self.entrypoint(specs, calls);
        Ok(unit)
    }

    fn entrypoint(&self, specs: &SpecTable, calls: &CallSequence) -> Vec<Statement> {
        let unit_name = &self.config.unit_name;
        let mut statements = vec![Statement::var_decl(
            unit_name.as_str(),
            INSTANCE,
            Expr::new_object(unit_name.as_str(), vec![]),
        )];
        statements.extend(calls.iter().filter(|name| specs.contains(name)).map(|name| {
            Statement::call(Expr::method(
                Expr::var(INSTANCE),
                HelperMethod::name_for(name),
                vec![],
            ))
        }));
        statements
    }

    /// Build the helper method for one function
    pub fn build_helper(&self, spec: &FunctionSpec) -> AtcResult<HelperMethod> {
        HelperLayout::new(spec, &self.config).build()
    }
}

/// Per-function state threaded through the helper steps
struct HelperLayout<'a> {
    spec: &'a FunctionSpec,
    config: &'a AtcConfig,
    params: &'a [Parameter],
    statements: Vec<Statement>,
    /// Primitive parameter -> its one-element container
    indirected: IndexMap<String, String>,
    old_state: OldStateMap,
}

impl<'a> HelperLayout<'a> {
    fn new(spec: &'a FunctionSpec, config: &'a AtcConfig) -> Self {
        Self {
            spec,
            config,
            params: spec.parameters(),
            statements: Vec::new(),
            indirected: IndexMap::new(),
            old_state: OldStateMap::new(),
        }
    }

    fn build(mut self) -> AtcResult<HelperMethod> {
        let name = self.spec.name();
        trace!(function = name, "laying out helper");

        let post_param = self.primitive_post_state_param();
        self.declare_inputs(post_param.as_deref());
        self.assume_precondition()?;
        self.snapshot_old_state();
        let guarded = self.guard_nullable_params();
        if self.config.echo_inputs {
            self.echo_inputs();
        }
        let binding = self.emit_call(post_param.as_deref(), guarded);
        self.assert_postcondition(binding.as_deref())?;

        Ok(HelperMethod::new(
            HelperMethod::name_for(name),
            self.statements,
        ))
    }

    fn param_names(&self) -> Vec<&'a str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    fn category_of(&self, name: &str) -> Option<TypeCategory> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(Parameter::category)
    }

    fn primitive_post_state_param(&self) -> Option<String> {
        let post = self.spec.postcondition()?;
        find_post_state_parameter(post, &self.param_names())
            .filter(|name| self.category_of(name) == Some(TypeCategory::Primitive))
    }

    /// Symbolic inputs and in-place containers
    fn declare_inputs(&mut self, post_param: Option<&str>) {
        for param in self.params {
            self.statements
                .push(Statement::symbolic_input(&param.type_name, &param.name));
        }

        let names = self.param_names();
        let mut indexed = IndexSet::new();
        for condition in [self.spec.precondition(), self.spec.postcondition()]
            .into_iter()
            .flatten()
        {
            indexed.extend(index_accessed_parameters(condition, &names));
        }
        let returns_void = self.spec.signature().returns_void();

        for param in self.params {
            if param.category() != TypeCategory::Primitive {
                continue;
            }
            let mutated_in_place = returns_void && post_param == Some(param.name.as_str());
            if !indexed.contains(&param.name) && !mutated_in_place {
                continue;
            }
            let container = format!("{}Ref", param.name);
            let array_type = format!("{}[]", param.type_name);
            trace!(param = %param.name, %container, "passing parameter by container");
            self.statements.push(Statement::var_decl(
                array_type.as_str(),
                container.as_str(),
                Expr::new_object(array_type.as_str(), vec![Expr::var(param.name.as_str())]),
            ));
            self.indirected.insert(param.name.clone(), container);
        }
    }

    fn assume_precondition(&mut self) -> AtcResult<()> {
        let condition = match self.spec.precondition() {
            Some(pre) => {
                if let Some(variable) = collect_post_state_vars(pre).into_iter().next() {
                    return Err(AtcError::PostStateInPrecondition {
                        function: self.spec.name().to_string(),
                        variable,
                    });
                }
                transform_pre_condition(pre, self.params).map_err(|source| AtcError::Helper {
                    function: self.spec.name().to_string(),
                    source,
                })?
            }
            None => Expr::boolean(true),
        };
        self.statements.push(Statement::assume(condition));
        Ok(())
    }

    fn snapshot_old_state(&mut self) {
        let Some(post) = self.spec.postcondition() else {
            return;
        };
        for name in collect_old_state_vars(post) {
            if SENTINELS.contains(&name.as_str()) {
                continue;
            }
            let Some(param) = self.params.iter().find(|p| p.name == name) else {
                debug!(variable = %name, "not a parameter, no snapshot");
                continue;
            };
            let snapshot = format!("{}_old", name);
            let source = Expr::var(name.as_str());
            let init = match param.category() {
                TypeCategory::Collection => Expr::conditional(
                    Expr::binary(source.clone(), BinaryOperator::Equals, Expr::null()),
                    Expr::null(),
                    Expr::new_object(
                        format!("{}<>", concrete_collection(&param.type_name)),
                        vec![source],
                    ),
                ),
                TypeCategory::Primitive | TypeCategory::Reference => source,
            };
            self.statements
                .push(Statement::var_decl(&param.type_name, snapshot.as_str(), init));
            self.old_state.insert(name, snapshot);
        }
    }

    fn nullable_params(&self) -> Vec<&'a Parameter> {
        self.params
            .iter()
            .filter(|p| p.category().is_nullable())
            .collect()
    }

    /// Early return on null inputs; returns whether a guard was emitted
    fn guard_nullable_params(&mut self) -> bool {
        let nullable = self.nullable_params();
        let compare = |op| {
            move |p: &&Parameter| Expr::binary(Expr::var(p.name.as_str()), op, Expr::null())
        };
        let Some(any_null) = Expr::or_all(nullable.iter().map(compare(BinaryOperator::Equals)))
        else {
            return false;
        };
        self.statements
            .push(Statement::if_then(any_null, Vec::new(), true));
        self.statements.extend(
            nullable
                .iter()
                .map(compare(BinaryOperator::NotEquals))
                .map(Statement::assume),
        );
        true
    }

    fn echo_inputs(&mut self) {
        let mut seen_collection = false;
        for param in self.params {
            let echo = match param.category() {
                TypeCategory::Primitive => true,
                TypeCategory::Collection => !std::mem::replace(&mut seen_collection, true),
                TypeCategory::Reference => param.type_name == "String",
            };
            if !echo {
                continue;
            }
            let message = Expr::binary(
                Expr::string(format!("Test Input: {} = ", param.name)),
                BinaryOperator::Plus,
                Expr::var(param.name.as_str()),
            );
            self.statements.push(Statement::call(Expr::method(
                Expr::field(Expr::var("System"), "out"),
                "println",
                vec![message],
            )));
        }
    }

    /// Emit the call and return the name post-state references bind to
    fn emit_call(&mut self, post_param: Option<&str>, guarded: bool) -> Option<String> {
        let signature = self.spec.signature();
        let args = self
            .params
            .iter()
            .map(|p| Expr::var(self.indirected.get(&p.name).unwrap_or(&p.name).as_str()))
            .collect();
        let call = Expr::method(
            Expr::var(self.config.target_class.as_str()),
            signature.name.as_str(),
            args,
        );

        let mut block = Vec::new();
        let binding = match post_param {
            Some(param) if self.indirected.contains_key(param) => {
                block.push(Statement::call(call));
                Some(param.to_string())
            }
            Some(param) if !signature.returns_void() => {
                block.push(Statement::assign(param, call));
                Some(param.to_string())
            }
            _ if !signature.returns_void() => {
                let name = self.fresh_result_name();
                if guarded {
                    // declared outside the guarded block so the assertion can see it
                    self.statements.push(Statement::var_decl(
                        signature.return_type.as_str(),
                        name.as_str(),
                        default_value(&signature.return_type),
                    ));
                    block.push(Statement::assign(name.as_str(), call));
                } else {
                    block.push(Statement::var_decl(
                        signature.return_type.as_str(),
                        name.as_str(),
                        call,
                    ));
                }
                Some(name)
            }
            _ => {
                block.push(Statement::call(call));
                None
            }
        };

        block.extend(self.indirected.iter().map(|(param, container)| {
            Statement::assign(
                param.as_str(),
                Expr::index(Expr::var(container.as_str()), Expr::int(0)),
            )
        }));

        if guarded {
            let all_present = Expr::and_all(self.nullable_params().into_iter().map(|p| {
                Expr::binary(
                    Expr::var(p.name.as_str()),
                    BinaryOperator::NotEquals,
                    Expr::null(),
                )
            }));
            if let Some(condition) = all_present {
                self.statements
                    .push(Statement::if_then(condition, block, false));
                return binding;
            }
        }
        self.statements.extend(block);
        binding
    }

    fn fresh_result_name(&self) -> String {
        let taken: FxHashSet<&str> = self.param_names().into_iter().collect();
        if !taken.contains(RESULT) {
            return RESULT.to_string();
        }
        (1..)
            .map(|i| format!("{}_{}", RESULT, i))
            .find(|candidate| !taken.contains(candidate.as_str()))
            .unwrap_or_else(|| RESULT.to_string())
    }

    fn assert_postcondition(&mut self, binding: Option<&str>) -> AtcResult<()> {
        let Some(post) = self.spec.postcondition() else {
            return Ok(());
        };
        let condition = transform_post_condition(post, binding, &self.old_state, self.params)
            .map_err(|source| AtcError::Helper {
                function: self.spec.name().to_string(),
                source,
            })?;

        let mut nullable: FxHashSet<&str> = FxHashSet::default();
        for param in self.nullable_params() {
            nullable.insert(param.name.as_str());
            if let Some(snapshot) = self.old_state.get(&param.name) {
                nullable.insert(snapshot.as_str());
            }
        }
        let return_type = &self.spec.signature().return_type;
        if let Some(binding) = binding {
            if self.category_of(binding).is_none()
                && !self.spec.signature().returns_void()
                && atcgen_core::classify(return_type).is_nullable()
            {
                nullable.insert(binding);
            }
        }

        let condition = lower_reference_equality(&condition, &|name: &str| nullable.contains(name));
        self.statements.push(Statement::assert(condition));
        Ok(())
    }
}

/// Placeholder initializer for a result declared ahead of its assignment
fn default_value(type_name: &str) -> Expr {
    match type_name.trim() {
        "boolean" => Expr::boolean(false),
        "int" => Expr::int(0),
        "double" => Expr::float(0.0),
        "long" | "short" | "byte" | "char" | "float" => Expr::cast(type_name.trim(), Expr::int(0)),
        _ => Expr::null(),
    }
}

/// Whether any assumption or assertion calls a function without a receiver
fn uses_bare_calls(helper: &HelperMethod) -> bool {
    helper.flattened().into_iter().any(|stmt| match stmt {
        Statement::Assume { condition } | Statement::Assert { condition } => {
            count_matching(condition, |e| {
                matches!(e, Expr::MethodCall { scope: None, .. })
            }) > 0
        }
        _ => false,
    })
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
