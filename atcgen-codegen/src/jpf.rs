//! JPF configuration documents and method-signature extraction
//!
//! Symbolic PathFinder is driven by flat `key = value` files. One document
//! is produced per helper method, naming that method as the symbolic entry
//! point, plus one document for the whole program.

use crate::error::{CodegenError, CodegenResult};
use atcgen_atc::TestUnit;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

/// Method name used for the whole-program document
pub const PROGRAM: &str = "main";

/// Exploration bounds for one kind of run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBounds {
    pub depth_limit: u32,
    /// Seconds
    pub time_limit: u32,
}

/// Settings for generated `.jpf` documents, the `[jpf]` section of `atcgen.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JpfSettings {
    pub classpath: String,
    pub sourcepath: String,
    pub insn_factory: String,
    /// Constraint solver backend
    pub solver: String,
    pub string_solving: bool,
    pub symbolic_arrays: bool,
    pub min_int: i64,
    pub max_int: i64,
    pub undefined: i64,
    pub method_search: SearchBounds,
    pub program_search: SearchBounds,
    pub multiple_errors: bool,
    pub search_class: String,
    /// Listeners attached to per-method runs
    pub listeners: Vec<String>,
    /// Report hook for the whole-program run
    pub program_report: String,
}

impl Default for JpfSettings {
    fn default() -> Self {
        Self {
            classpath: "./bin".to_string(),
            sourcepath: "${jpf-symbc}/src/examples".to_string(),
            insn_factory: "gov.nasa.jpf.symbc.SymbolicInstructionFactory".to_string(),
            solver: "z3".to_string(),
            string_solving: true,
            symbolic_arrays: true,
            min_int: -100,
            max_int: 100,
            undefined: -1000,
            method_search: SearchBounds {
                depth_limit: 500,
                time_limit: 120,
            },
            program_search: SearchBounds {
                depth_limit: 200,
                time_limit: 60,
            },
            multiple_errors: true,
            search_class: ".search.heuristic.BFSHeuristic".to_string(),
            listeners: vec![
                "gov.nasa.jpf.symbc.sequences.SymbolicSequenceListener".to_string(),
                "gov.nasa.jpf.symbc.SymbolicPathListener".to_string(),
                "gov.nasa.jpf.listener.CoverageAnalyzer".to_string(),
            ],
            program_report: "gov.nasa.jpf.symbc.SymbolicPathListener".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ConfigLine {
    Comment(String),
    Entry { key: String, value: String },
    Blank,
}

/// Ordered `key = value` document with comments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    lines: Vec<ConfigLine>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(ConfigLine::Comment(text.into()));
        self
    }

    pub fn entry(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.lines.push(ConfigLine::Entry {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(ConfigLine::Blank);
        self
    }

    /// Value of the last entry named `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().rev().find_map(|line| match line {
            ConfigLine::Entry { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Entry keys in document order
    pub fn keys(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                ConfigLine::Entry { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            match line {
                ConfigLine::Comment(text) => writeln!(f, "# {}", text)?,
                ConfigLine::Entry { key, value } => writeln!(f, "{} = {}", key, value)?,
                ConfigLine::Blank => writeln!(f)?,
            }
        }
        Ok(())
    }
}

fn header(settings: &JpfSettings, target: &str) -> ConfigDocument {
    let mut doc = ConfigDocument::new();
    doc.entry("@using", "jpf-symbc").blank();
    doc.comment("Target class").entry("target", target).blank();
    doc.comment("Compiled classes")
        .entry("classpath", &settings.classpath)
        .blank();
    doc.comment("Source code")
        .entry("sourcepath", &settings.sourcepath)
        .blank();
    doc.comment("Symbolic execution engine")
        .entry("vm.insn_factory.class", &settings.insn_factory)
        .entry("symbolic.dp", &settings.solver)
        .entry("symbolic.string_dp", settings.string_solving)
        .entry("symbolic.arrays", settings.symbolic_arrays)
        .blank();
    doc
}

fn ranges_and_bounds(doc: &mut ConfigDocument, settings: &JpfSettings, bounds: SearchBounds) {
    doc.comment("Integer ranges")
        .entry("symbolic.minint", settings.min_int)
        .entry("symbolic.maxint", settings.max_int)
        .entry("symbolic.undefined", settings.undefined)
        .blank();
    doc.comment("Search bounds")
        .entry("search.depth_limit", bounds.depth_limit)
        .entry("search.time_limit", bounds.time_limit)
        .entry("search.multiple_errors", settings.multiple_errors)
        .entry("search.class", &settings.search_class)
        .blank();
}

/// Document exploring one helper method of `target`
pub fn method_document(settings: &JpfSettings, target: &str, signature: &str) -> ConfigDocument {
    let mut doc = header(settings, target);
    doc.comment("Symbolic entry point")
        .entry("symbolic.method", format!("{}.{}", target, signature))
        .blank();
    ranges_and_bounds(&mut doc, settings, settings.method_search);

    let simple_name = target.rsplit('.').next().unwrap_or(target);
    doc.comment("Test input extraction and coverage")
        .entry("listener", settings.listeners.join(","))
        .blank();
    doc.entry("coverage.include", format!("*.{}", simple_name))
        .entry("coverage.show_methods", true)
        .entry("coverage.show_bodies", true);
    doc
}

/// Document running the whole program
pub fn program_document(settings: &JpfSettings, target: &str) -> ConfigDocument {
    let mut doc = header(settings, target);
    ranges_and_bounds(&mut doc, settings, settings.program_search);
    doc.comment("Path conditions and results")
        .entry("jpf.report.console.finished", &settings.program_report)
        .blank();
    doc.entry("vm.output", true);
    doc
}

/// Every document for `unit`, keyed by file name; the program document first
///
/// Signatures are read from `source`, the rendered symbolic class.
pub fn unit_documents(
    unit: &TestUnit,
    source: &str,
    settings: &JpfSettings,
) -> CodegenResult<Vec<(String, ConfigDocument)>> {
    let target = unit.qualified_name();
    let mut docs = vec![(
        format!("{}_{}.jpf", unit.name, PROGRAM),
        program_document(settings, &target),
    )];
    for helper in &unit.helpers {
        let signature = extract_method_signature(source, &helper.name)?;
        debug!(method = %helper.name, %signature, "extracted signature");
        docs.push((
            format!("{}_{}.jpf", unit.name, helper.name),
            method_document(settings, &target, &signature),
        ));
    }
    Ok(docs)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Tracks string and char literals while scanning source text
#[derive(Default)]
struct QuoteState {
    open: Option<char>,
    escaped: bool,
}

impl QuoteState {
    /// Whether `c` is part of a literal and should be ignored by the caller
    fn skip(&mut self, c: char) -> bool {
        match self.open {
            Some(_) if self.escaped => self.escaped = false,
            Some(_) if c == '\\' => self.escaped = true,
            Some(q) if c == q => self.open = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => self.open = Some(c),
            None => return false,
        }
        true
    }

    fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

/// Byte offset of the `)` closing the `(` at `open`
fn matching_paren(source: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quotes = QuoteState::default();
    for (offset, c) in source[open..].char_indices() {
        if quotes.skip(c) {
            continue;
        }
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Whether `name(` at `start` opens a declaration rather than a call
fn is_declaration(source: &str, start: usize, close: usize) -> bool {
    let before = source[..start].trim_end();
    let preceded_by_type = before
        .chars()
        .last()
        .map_or(false, |c| is_ident_char(c) || c == '>' || c == ']');
    let last_word: String = before
        .chars()
        .rev()
        .take_while(|c| is_ident_char(*c))
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if matches!(last_word.as_str(), "new" | "return" | "throw" | "else") {
        return false;
    }
    let after = source[close + 1..].trim_start();
    preceded_by_type && (after.starts_with('{') || after.starts_with("throws"))
}

/// Parameter list text of the declaration of `method`, if any
fn find_parameter_list<'s>(source: &'s str, method: &str) -> CodegenResult<Option<&'s str>> {
    let mut search_from = 0;
    while let Some(found) = source[search_from..].find(method) {
        let start = search_from + found;
        search_from = start + method.len();

        let boundary_before = source[..start]
            .chars()
            .last()
            .map_or(true, |c| !is_ident_char(c) && c != '.');
        let rest = &source[start + method.len()..];
        let open = match rest.trim_start().strip_prefix('(') {
            Some(_) => start + method.len() + (rest.len() - rest.trim_start().len()),
            None => continue,
        };
        if !boundary_before {
            continue;
        }
        let Some(close) = matching_paren(source, open) else {
            return Err(CodegenError::SignatureParse {
                method: method.to_string(),
                header: source[start..].lines().next().unwrap_or_default().to_string(),
                reason: "unterminated parameter list",
            });
        };
        if is_declaration(source, start, close) {
            return Ok(Some(&source[open + 1..close]));
        }
    }
    Ok(None)
}

/// Split a parameter list on commas outside generic brackets and
/// annotation arguments
pub fn split_parameters(params: &str, method: &str) -> CodegenResult<Vec<String>> {
    let unbalanced = |reason| CodegenError::SignatureParse {
        method: method.to_string(),
        header: params.to_string(),
        reason,
    };

    let mut parts = Vec::new();
    let mut angle = 0i32;
    let mut paren = 0i32;
    let mut quotes = QuoteState::default();
    let mut current = String::new();
    for c in params.chars() {
        current.push(c);
        if quotes.skip(c) {
            continue;
        }
        match c {
            '(' => paren += 1,
            ')' => {
                paren -= 1;
                if paren < 0 {
                    return Err(unbalanced("unbalanced ')'"));
                }
            }
            // comparison operators may appear inside annotation arguments
            '<' if paren == 0 => angle += 1,
            '>' if paren == 0 => {
                angle -= 1;
                if angle < 0 {
                    return Err(unbalanced("unbalanced '>'"));
                }
            }
            ',' if angle == 0 && paren == 0 => {
                current.pop();
                parts.push(std::mem::take(&mut current).trim().to_string());
            }
            _ => {}
        }
    }
    if quotes.is_open() {
        return Err(unbalanced("unterminated literal"));
    }
    if paren != 0 {
        return Err(unbalanced("unbalanced '('"));
    }
    if angle != 0 {
        return Err(unbalanced("unbalanced '<'"));
    }
    if !current.trim().is_empty() || !parts.is_empty() {
        parts.push(current.trim().to_string());
    }
    Ok(parts)
}

/// Strip leading `@Annotation(...)` and `final` modifiers
fn strip_modifiers(mut param: &str) -> &str {
    loop {
        param = param.trim_start();
        if let Some(rest) = param.strip_prefix('@') {
            let name_end = rest
                .char_indices()
                .find(|(_, c)| !(is_ident_char(*c) || *c == '.'))
                .map_or(rest.len(), |(i, _)| i);
            let mut rest = &rest[name_end..];
            if rest.trim_start().starts_with('(') {
                let open = rest.len() - rest.trim_start().len();
                match matching_paren(rest, open) {
                    Some(close) => rest = &rest[close + 1..],
                    None => return rest,
                }
            }
            param = rest;
        } else if let Some(rest) = param.strip_prefix("final") {
            if !rest.starts_with(char::is_whitespace) {
                return param;
            }
            param = rest;
        } else {
            return param;
        }
    }
}

/// Type of one declared parameter, in the spelling JPF expects
fn parameter_type(param: &str) -> String {
    let param = strip_modifiers(param).trim();

    // the name is the last identifier outside generic brackets
    let mut depth = 0i32;
    let mut split = None;
    for (i, c) in param.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            c if c.is_whitespace() && depth == 0 => split = Some(i),
            _ => {}
        }
    }
    let type_part = match split {
        Some(i) if param[i..].trim().chars().all(is_ident_char) => &param[..i],
        _ => param,
    };

    let compact: String = {
        let trimmed = type_part.trim();
        // `String []` -> `String[]`
        let mut out = String::with_capacity(trimmed.len());
        for (i, c) in trimmed.char_indices() {
            if c.is_whitespace() && trimmed[i..].trim_start().starts_with('[') {
                continue;
            }
            out.push(c);
        }
        out
    };

    match compact.strip_prefix("String") {
        Some(dims) if dims.is_empty() || dims.chars().all(|c| c == '[' || c == ']') => {
            format!("java.lang.String{}", dims)
        }
        _ => compact,
    }
}

/// `method(T1,T2)` for the declaration of `method` in `source`
///
/// Falls back to `method()` when no declaration is found.
pub fn extract_method_signature(source: &str, method: &str) -> CodegenResult<String> {
    let Some(params) = find_parameter_list(source, method)? else {
        trace!(method, "no declaration found");
        return Ok(format!("{}()", method));
    };
    let types = split_parameters(params, method)?
        .iter()
        .map(|p| parameter_type(p))
        .collect::<Vec<_>>();
    Ok(format!("{}({})", method, types.join(",")))
}

#[cfg(test)]
#[path = "jpf_tests.rs"]
mod tests;
