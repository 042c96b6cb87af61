//! Code generation backends for atcgen
//!
//! A [`TestUnit`] is rendered twice: as a baseline Java test class and, after
//! [`SymbolicTransformer`] rewrites its inputs and assumptions, as a class
//! ready for Symbolic PathFinder. The symbolic source is then scanned for
//! helper signatures to produce one `.jpf` document per helper.

pub mod emit;
pub mod error;
pub mod hoist;
pub mod java;
pub mod jpf;
pub mod source;
pub mod symbolic;

pub use emit::emit;
pub use error::{CodegenError, CodegenResult};
pub use java::JavaGenerator;
pub use jpf::{extract_method_signature, ConfigDocument, JpfSettings};
pub use symbolic::SymbolicTransformer;

use atcgen_atc::TestUnit;
use tracing::debug;

/// Everything generated for one test unit
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub namespace: String,
    pub unit_name: String,
    pub baseline: String,
    pub symbolic: String,
    /// File name and document, program document first
    pub jpf_documents: Vec<(String, ConfigDocument)>,
    /// Pretty-printed IR when requested
    pub ir_json: Option<String>,
}

/// Options for [`generate`]
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub jpf: JpfSettings,
    pub emit_ir: bool,
}

/// Render all artifacts for `unit`
pub fn generate(unit: &TestUnit, options: &GenerateOptions) -> CodegenResult<Artifacts> {
    let generator = JavaGenerator::new();
    let baseline = generator.generate(unit)?;

    let symbolic_unit = SymbolicTransformer::new().transform(unit);
    let symbolic = generator.generate(&symbolic_unit)?;

    let jpf_documents = jpf::unit_documents(&symbolic_unit, &symbolic, &options.jpf)?;
    let ir_json = if options.emit_ir {
        Some(unit.to_json()?)
    } else {
        None
    };

    debug!(
        unit = %unit.name,
        documents = jpf_documents.len(),
        "generated artifacts"
    );
    Ok(Artifacts {
        namespace: unit.namespace.clone(),
        unit_name: unit.name.clone(),
        baseline,
        symbolic,
        jpf_documents,
        ir_json,
    })
}
