//! Print the JPF signature of a method declared in a Java source file

use anyhow::{Context, Result};
use atcgen_codegen::extract_method_signature;
use std::path::Path;

pub fn signature(source: &Path, method: &str) -> Result<String> {
    let text = std::fs::read_to_string(source)
        .with_context(|| format!("reading {}", source.display()))?;
    let signature = extract_method_signature(&text, method)?;
    println!("{}", signature);
    Ok(signature)
}
