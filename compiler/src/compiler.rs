use std::{fs, path::Path};

use tracing::info;

use crate::{
    config::GeneratorConfig,
    error::GeneratorError,
    gen_rust::RustGenerator,
    output::{DirectoryOutput, MemoryOutput, OutputManager},
    types::Ir,
    verifier::verify_ir,
};

/// Parse a JSON token stream into an `Ir` and verify its structure.
/// Returns `Err(GeneratorError)` if the JSON is malformed or the tokens are not well-nested.
pub fn load_ir(json: &str) -> Result<Ir, GeneratorError> {
    let ir: Ir = serde_json::from_str(json)?;
    verify_ir(&ir)?;
    Ok(ir)
}

pub fn load_ir_file(path: impl AsRef<Path>) -> Result<Ir, GeneratorError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let ir = load_ir(&text)?;
    info!(path = %path.display(), types = ir.types.len(), messages = ir.messages.len(), "loaded IR");
    Ok(ir)
}

/// Verify `ir`, then hand every generated unit to `out`.
/// Returns the number of units written.
pub fn generate(ir: &Ir, config: &GeneratorConfig, out: &mut dyn OutputManager) -> Result<usize, GeneratorError> {
    verify_ir(ir)?;
    RustGenerator::new(ir, config).generate(out)
}

/// All units as one source file of inline modules.
pub fn generate_to_string(ir: &Ir, config: &GeneratorConfig) -> Result<String, GeneratorError> {
    let mut out = MemoryOutput::new();
    generate(ir, config, &mut out)?;
    Ok(out.render_single_file())
}

/// One file per unit plus `mod.rs`, under `dir`.
pub fn generate_to_directory(ir: &Ir, config: &GeneratorConfig, dir: impl AsRef<Path>) -> Result<usize, GeneratorError> {
    let mut out = DirectoryOutput::new(dir)?;
    generate(ir, config, &mut out)
}
