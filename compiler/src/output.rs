use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::GeneratorError;

const GENERATED_BANNER: &str = "// Generated by brine-sbe. Do not edit.";

/// Receives generated units one at a time.
pub trait OutputManager {
    fn write_unit(&mut self, name: &str, code: &str) -> Result<(), GeneratorError>;

    /// Called once after the last unit of a run.
    fn finish(&mut self) -> Result<(), GeneratorError> {
        Ok(())
    }
}

/// Writes `<unit>.rs` files into a directory, plus a `mod.rs` that declares
/// and re-exports each unit.
#[derive(Debug)]
pub struct DirectoryOutput {
    dir:   PathBuf,
    units: Vec<String>,
}

impl DirectoryOutput {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, GeneratorError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(DirectoryOutput { dir, units: Vec::new() })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputManager for DirectoryOutput {
    fn write_unit(&mut self, name: &str, code: &str) -> Result<(), GeneratorError> {
        let path = self.dir.join(format!("{}.rs", name));
        debug!(path = %path.display(), "writing unit");
        fs::write(&path, format!("{}\n", code))?;
        self.units.push(name.to_string());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), GeneratorError> {
        let mut module = format!("{}\n\n", GENERATED_BANNER);
        for name in &self.units {
            module.push_str(&format!("pub mod {};\n", name));
        }
        module.push('\n');
        for name in &self.units {
            module.push_str(&format!("pub use {}::*;\n", name));
        }
        fs::write(self.dir.join("mod.rs"), module)?;
        Ok(())
    }
}

/// Keeps units in memory, in the order they were written.
#[derive(Debug, Default)]
pub struct MemoryOutput {
    units: Vec<(String, String)>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn units(&self) -> &[(String, String)] {
        &self.units
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.units
            .iter()
            .find(|(unit, _)| unit == name)
            .map(|(_, code)| code.as_str())
    }

    /// Every unit as an inline module, suitable for `include!`.
    pub fn render_single_file(&self) -> String {
        let mut file = format!("{}\n", GENERATED_BANNER);
        for (name, code) in &self.units {
            file.push('\n');
            file.push_str(&format!("pub mod {} {{\n", name));
            for line in code.lines() {
                if line.is_empty() {
                    file.push('\n');
                } else {
                    file.push_str("    ");
                    file.push_str(line);
                    file.push('\n');
                }
            }
            file.push_str("}\n");
            file.push_str(&format!("pub use {}::*;\n", name));
        }
        file
    }
}

impl OutputManager for MemoryOutput {
    fn write_unit(&mut self, name: &str, code: &str) -> Result<(), GeneratorError> {
        self.units.push((name.to_string(), code.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_file_wraps_units_in_modules() {
        let mut out = MemoryOutput::new();
        out.write_unit("model", "pub enum Model {\n    A,\n}").unwrap();
        out.write_unit("engine_decoder", "pub struct EngineDecoder;").unwrap();

        let file = out.render_single_file();
        assert!(file.starts_with(GENERATED_BANNER));
        assert!(file.contains("pub mod model {\n    pub enum Model {\n        A,\n    }\n}\npub use model::*;\n"));
        assert!(file.contains("pub mod engine_decoder {\n    pub struct EngineDecoder;\n}\npub use engine_decoder::*;\n"));
        assert_eq!(out.get("model"), Some("pub enum Model {\n    A,\n}"));
        assert_eq!(out.get("missing"), None);
    }

    #[test]
    fn directory_output_writes_units_and_mod_file() {
        let dir = std::env::temp_dir().join(format!("brine-sbe-output-{}", std::process::id()));
        let mut out = DirectoryOutput::new(&dir).unwrap();
        out.write_unit("car_decoder", "pub struct CarDecoder;").unwrap();
        out.write_unit("car_encoder", "pub struct CarEncoder;").unwrap();
        out.finish().unwrap();

        assert_eq!(fs::read_to_string(dir.join("car_decoder.rs")).unwrap(), "pub struct CarDecoder;\n");
        let module = fs::read_to_string(dir.join("mod.rs")).unwrap();
        assert!(module.contains("pub mod car_decoder;\npub mod car_encoder;\n"));
        assert!(module.contains("pub use car_encoder::*;\n"));
        fs::remove_dir_all(&dir).unwrap();
    }
}
