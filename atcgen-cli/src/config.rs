//! Configuration handling for the atcgen CLI

use anyhow::{Context, Result};
use atcgen_atc::AtcConfig;
use atcgen_codegen::JpfSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names looked up in the current directory
const CONFIG_FILES: &[&str] = &["atcgen.toml", ".atcgen.toml"];

/// Contents of `atcgen.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub atc: AtcConfig,

    #[serde(default)]
    pub jpf: JpfSettings,
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// First config file found in the current directory, or defaults
    pub fn from_current_dir() -> Result<Self> {
        for name in CONFIG_FILES {
            let path = Path::new(name);
            if path.exists() {
                return Self::from_file(path);
            }
        }
        Ok(Self::default())
    }
}

/// Load configuration from `path` or the current directory
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(&path),
        None => Config::from_current_dir(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atcgen_atc::UnmatchedCallPolicy;

    #[test]
    fn test_sections_default_independently() {
        let config: Config = toml::from_str(
            r#"
            [atc]
            namespace = "bank.tests"
            unmatched_calls = "skip"

            [jpf]
            solver = "cvc3"
            method_search = { depth_limit = 10, time_limit = 5 }
            "#,
        )
        .unwrap();

        assert_eq!(config.atc.namespace, "bank.tests");
        assert_eq!(config.atc.unmatched_calls, UnmatchedCallPolicy::Skip);
        assert_eq!(config.atc.target_class, "Helper");
        assert_eq!(config.jpf.solver, "cvc3");
        assert_eq!(config.jpf.method_search.depth_limit, 10);
        assert_eq!(config.jpf.program_search.depth_limit, 200);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atcgen.toml");
        std::fs::write(&path, "[atc]\nunit_name = \"Checks\"\n").unwrap();
        assert_eq!(load_config(Some(path)).unwrap().atc.unit_name, "Checks");

        let missing = dir.path().join("missing.toml");
        assert!(load_config(Some(missing)).is_err());
    }
}
