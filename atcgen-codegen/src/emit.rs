//! Writing generated artifacts to disk
//!
//! Layout under the output directory:
//!
//! ```text
//! baseline/<package path>/<Unit>.java
//! symbolic/<package path>/<Unit>.java
//! <Unit>_main.jpf
//! <Unit>_<helper>.jpf
//! ir.json            (optional)
//! ```
//!
//! Existing files are overwritten, so repeated runs are idempotent.

use crate::error::{CodegenError, CodegenResult};
use crate::Artifacts;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const BASELINE_DIR: &str = "baseline";
pub const SYMBOLIC_DIR: &str = "symbolic";
pub const IR_FILE: &str = "ir.json";

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CodegenError + '_ {
    move |source| CodegenError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn write_file(path: &Path, contents: &str) -> CodegenResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    fs::write(path, contents).map_err(io_error(path))?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

/// Directory for `namespace` below `root`
pub fn package_dir(root: &Path, namespace: &str) -> PathBuf {
    namespace
        .split('.')
        .filter(|segment| !segment.is_empty())
        .fold(root.to_path_buf(), |dir, segment| dir.join(segment))
}

/// Write every artifact below `out_dir`, returning the written paths
pub fn emit(artifacts: &Artifacts, out_dir: &Path) -> CodegenResult<Vec<PathBuf>> {
    let file_name = format!("{}.java", artifacts.unit_name);
    let mut written = Vec::new();

    let baseline = package_dir(&out_dir.join(BASELINE_DIR), &artifacts.namespace).join(&file_name);
    write_file(&baseline, &artifacts.baseline)?;
    written.push(baseline);

    let symbolic = package_dir(&out_dir.join(SYMBOLIC_DIR), &artifacts.namespace).join(&file_name);
    write_file(&symbolic, &artifacts.symbolic)?;
    written.push(symbolic);

    for (name, document) in &artifacts.jpf_documents {
        let path = out_dir.join(name);
        write_file(&path, &document.to_string())?;
        written.push(path);
    }

    if let Some(ir) = &artifacts.ir_json {
        let path = out_dir.join(IR_FILE);
        write_file(&path, ir)?;
        written.push(path);
    }

    info!(files = written.len(), out = %out_dir.display(), "emitted artifacts");
    Ok(written)
}
