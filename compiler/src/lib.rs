//! brine-sbe-compiler
//!
//! This crate implements:
//!  1) The SBE intermediate representation (`Ir`, `Token`) and its JSON form,
//!  2) Load-time verification of the token stream (spans, header, type references),
//!  3) Structural decomposition of message and group bodies,
//!  4) Rust code generation: enums, sets, composites and message codecs,
//!  5) Output managers writing units to a directory or into memory,
//!  6) Error types (`GeneratorError`) and the generator configuration.

pub mod builder;
pub mod compiler;
pub mod config;
pub mod decomposer;
pub mod error;
pub mod gen_rust;
pub mod naming;
pub mod output;
pub mod types;
pub mod verifier;

mod gen_display;
mod gen_fields;
mod gen_groups;
mod gen_types;
mod gen_var_data;
mod literals;
mod utils;

pub use compiler::{generate, generate_to_directory, generate_to_string, load_ir, load_ir_file};
pub use config::GeneratorConfig;
pub use decomposer::{decompose, describe_messages, BodyLayout, Decomposition};
pub use error::GeneratorError;
pub use gen_rust::RustGenerator;
pub use output::{DirectoryOutput, MemoryOutput, OutputManager};
pub use types::Ir;
pub use verifier::verify_ir;
