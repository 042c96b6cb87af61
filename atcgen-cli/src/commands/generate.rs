//! Generate test classes and JPF documents from a spec table

use crate::config::Config;
use anyhow::{bail, Context, Result};
use atcgen_atc::{AtcBuilder, AtcConfig, UnmatchedCallPolicy};
use atcgen_codegen::{emit, generate as render, GenerateOptions};
use atcgen_core::{CallSequence, SpecTable};
use colored::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Inputs of one `generate` run
#[derive(Debug, Clone)]
pub struct GenerateArgs {
    pub specs: PathBuf,
    pub calls: Vec<String>,
    pub calls_file: Option<PathBuf>,
    pub out: PathBuf,
    pub emit_ir: bool,
    pub unit_name: Option<String>,
    pub namespace: Option<String>,
    pub skip_unmatched: bool,
    pub echo_inputs: bool,
}

impl GenerateArgs {
    /// `base` with command line overrides applied
    fn atc_config(&self, base: &AtcConfig) -> AtcConfig {
        let mut config = base.clone();
        if let Some(name) = &self.unit_name {
            config = config.with_unit_name(name.as_str());
        }
        if let Some(namespace) = &self.namespace {
            config = config.with_namespace(namespace.as_str());
        }
        if self.skip_unmatched {
            config = config.with_unmatched_calls(UnmatchedCallPolicy::Skip);
        }
        if self.echo_inputs {
            config = config.with_echo_inputs(true);
        }
        config
    }
}

fn load_calls(args: &GenerateArgs) -> Result<CallSequence> {
    let calls = match &args.calls_file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading call sequence {}", path.display()))?;
            if text.trim_start().starts_with('[') {
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing call sequence {}", path.display()))?
            } else {
                CallSequence::parse(&text)
            }
        }
        None => CallSequence::from_iter(args.calls.iter().map(|c| c.trim()).filter(|c| !c.is_empty())),
    };
    if calls.is_empty() {
        bail!("call sequence is empty");
    }
    Ok(calls)
}

/// Run the whole pipeline and write the results; returns the written paths
pub fn generate(args: &GenerateArgs, config: &Config) -> Result<Vec<PathBuf>> {
    let specs = SpecTable::from_file(&args.specs)
        .with_context(|| format!("loading specs {}", args.specs.display()))?;
    let calls = load_calls(args)?;
    info!(functions = specs.len(), calls = calls.len(), "loaded inputs");

    let unit = AtcBuilder::new(args.atc_config(&config.atc)).build(&specs, &calls)?;
    let options = GenerateOptions {
        jpf: config.jpf.clone(),
        emit_ir: args.emit_ir,
    };
    let artifacts = render(&unit, &options)?;
    let written = emit(&artifacts, &args.out)?;

    println!(
        "{} {} helper(s) for {}",
        "✓".green().bold(),
        unit.helpers.len(),
        unit.qualified_name()
    );
    for path in &written {
        println!("  {}", display_relative(path, &args.out).dimmed());
    }
    Ok(written)
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use atcgen_core::{BinaryOperator, Expr, FunctionSignature, FunctionSpec, Parameter};

    fn write_specs(dir: &Path) -> PathBuf {
        let table: SpecTable = vec![FunctionSpec::new(
            "increment",
            FunctionSignature::new("increment", vec![Parameter::new("x", "int")], "void"),
            None,
            Some(Expr::binary(
                Expr::var("x_post"),
                BinaryOperator::Greater,
                Expr::var("x"),
            )),
        )]
        .into_iter()
        .collect();
        let path = dir.join("specs.json");
        std::fs::write(&path, table.to_json().unwrap()).unwrap();
        path
    }

    fn args(dir: &Path, calls: &[&str]) -> GenerateArgs {
        GenerateArgs {
            specs: write_specs(dir),
            calls: calls.iter().map(|c| c.to_string()).collect(),
            calls_file: None,
            out: dir.join("out"),
            emit_ir: true,
            unit_name: None,
            namespace: None,
            skip_unmatched: false,
            echo_inputs: false,
        }
    }

    #[test]
    fn test_generate_writes_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let written = generate(&args(dir.path(), &["increment"]), &Config::default()).unwrap();
        assert_eq!(written.len(), 5);
        assert!(written.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_calls_file_accepts_json_and_plain_lists() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), &[]);

        let json = dir.path().join("calls.json");
        std::fs::write(&json, r#"["increment", "increment"]"#).unwrap();
        args.calls_file = Some(json);
        assert_eq!(load_calls(&args).unwrap().len(), 2);

        let plain = dir.path().join("calls.txt");
        std::fs::write(&plain, "increment,\nincrement increment\n").unwrap();
        args.calls_file = Some(plain);
        assert_eq!(load_calls(&args).unwrap().len(), 3);
    }

    #[test]
    fn test_empty_and_unknown_calls_fail() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_calls(&args(dir.path(), &[" "])).is_err());
        assert!(generate(&args(dir.path(), &["missing"]), &Config::default()).is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), &["increment", "missing"]);
        args.unit_name = Some("Counters".to_string());
        args.namespace = Some("demo.counters".to_string());
        args.skip_unmatched = true;

        let written = generate(&args, &Config::default()).unwrap();
        let baseline = dir
            .path()
            .join("out/baseline/demo/counters/Counters.java");
        assert!(written.contains(&baseline));
        let text = std::fs::read_to_string(baseline).unwrap();
        assert!(text.contains("public class Counters"));
        assert!(!text.contains("missing"));
    }
}
