use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use brine_sbe_compiler::{
    generate_to_directory, generate_to_string, load_ir_file, verify_ir, GeneratorConfig, GeneratorError,
};
use brine_sbe::inspect_to_json;

#[derive(Parser)]
#[command(name = "bsbe")]
#[command(about = "Generate Rust SBE codecs from an intermediate token stream", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate decoder/encoder codecs for every type and message of an IR file
    Generate {
        /// Input IR `.json` file
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (one file per unit plus `mod.rs`), or a `.rs` file with `--single-file`
        #[arg(short, long)]
        output: PathBuf,

        /// Write all units into one file of inline modules
        #[arg(long)]
        single_file: bool,

        /// Generator configuration `.toml` file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Decode unknown enum values to `SbeUnknown` instead of failing
        #[arg(long)]
        decode_unknown_enum_values: bool,

        /// Implement the runtime flyweight traits on generated codecs
        #[arg(long)]
        generate_interfaces: bool,

        /// Appended to property names that are Rust keywords
        #[arg(long)]
        keyword_append_token: Option<String>,
    },

    /// Load an IR file and check its token structure
    Verify {
        /// Input IR `.json` file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the message layout of an IR file as JSON
    Inspect {
        /// Input IR `.json` file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> Result<(), GeneratorError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            input,
            output,
            single_file,
            config,
            decode_unknown_enum_values,
            generate_interfaces,
            keyword_append_token,
        } => {
            let mut config = match config {
                Some(path) => GeneratorConfig::load(path)?,
                None => GeneratorConfig::default(),
            };
            // Flags only ever switch options on; the file decides otherwise.
            config.decode_unknown_enum_values |= decode_unknown_enum_values;
            config.generate_interfaces |= generate_interfaces;
            if keyword_append_token.is_some() {
                config.keyword_append_token = keyword_append_token;
            }

            let ir = load_ir_file(&input)?;
            if single_file {
                let code = generate_to_string(&ir, &config)?;
                fs::write(&output, code)?;
                println!("Generated codecs written to {}", output.display());
            } else {
                let units = generate_to_directory(&ir, &config, &output)?;
                println!("Generated {} units into {}", units, output.display());
            }
            Ok(())
        }

        Commands::Verify { input } => {
            let ir = load_ir_file(&input)?;
            verify_ir(&ir)?;
            println!(
                "{}: {} types, {} messages, OK",
                input.display(),
                ir.types.len(),
                ir.messages.len()
            );
            Ok(())
        }

        Commands::Inspect { input } => {
            let ir = load_ir_file(&input)?;
            println!("{}", inspect_to_json(&ir)?);
            Ok(())
        }
    }
}
