//! rwgen CLI
//!
//! Generates the SM83 register read/write tables from an `Opcodes.json`
//! description, or inspects a single opcode's classification.
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rwgen_core::{
    assemble, record::build_record, OpcodeSet, OpcodeSpace, RenderOptions, TableSource,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_INPUT: &str = "Opcodes.json";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug output globally (for troubleshooting and development)
    #[arg(long, global = true)]
    debug: bool,
    /// Enable verbose output globally (for more detailed logs and diagnostics)
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the opcode tables as Rust source
    Generate {
        /// Path to the opcode description
        #[arg(long, short, value_name = "JSON_PATH", default_value = DEFAULT_INPUT)]
        input: PathBuf,
        /// Write the source here instead of stdout
        #[arg(long, short, value_name = "RS_PATH")]
        output: Option<PathBuf>,
        /// Module that defines `InstructionData` and `ReadWrite`
        #[arg(long, value_name = "PATH", default_value = "crate::sm83")]
        module: String,
    },
    /// Print the classification of a single opcode
    Inspect {
        /// Path to the opcode description
        #[arg(long, short, value_name = "JSON_PATH", default_value = DEFAULT_INPUT)]
        input: PathBuf,
        /// Look the opcode up in the CB-prefixed table
        #[arg(long)]
        prefixed: bool,
        /// Opcode byte, decimal or 0x-prefixed hexadecimal
        #[arg(value_name = "OPCODE", value_parser = parse_opcode)]
        opcode: u8,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.verbose);

    match cli.command {
        Commands::Generate {
            input,
            output,
            module,
        } => generate(&input, output.as_deref(), module),
        Commands::Inspect {
            input,
            prefixed,
            opcode,
        } => {
            let space = if prefixed {
                OpcodeSpace::CbPrefixed
            } else {
                OpcodeSpace::Unprefixed
            };
            inspect(&input, space, opcode)
        }
    }
}

/// Logs go to stderr; stdout carries only generated source.
fn init_tracing(debug: bool, verbose: bool) {
    let default_level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_opcode(s: &str) -> Result<u8, String> {
    let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (s, 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(format!("not an opcode byte: {s:?}"));
    }
    u8::from_str_radix(digits, radix).map_err(|e| format!("not an opcode byte: {e}"))
}

fn load(input: &Path) -> anyhow::Result<OpcodeSet> {
    if !input.exists() {
        anyhow::bail!("Opcode description not found: {}", input.display());
    }
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read opcode description from {}", input.display()))?;
    let set = OpcodeSet::from_json(&text)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    info!(path = %input.display(), "Loaded opcode description");
    Ok(set)
}

/// Builds both tables and writes the rendered source.
///
/// The source is rendered in full before anything is written, so a failed run
/// never leaves a partial table behind.
fn generate(input: &Path, output: Option<&Path>, module_path: String) -> anyhow::Result<()> {
    let set = load(input)?;
    let tables = assemble(&set).context("Failed to generate opcode tables")?;
    let options = RenderOptions { module_path };
    let source = TableSource::new(&tables, &options).to_string();
    debug!(bytes = source.len(), max_operands = tables.max_operands, "Rendered source");

    match output {
        Some(path) => {
            fs::write(path, &source)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Wrote opcode tables");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(source.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn inspect(input: &Path, space: OpcodeSpace, opcode: u8) -> anyhow::Result<()> {
    let set = load(input)?;
    let description = set.lookup(space, opcode)?;
    let record = build_record(opcode, description)
        .with_context(|| format!("Failed to classify {space} opcode {opcode:#04X}"))?;

    let mut stdout = io::stdout().lock();
    match record {
        None => writeln!(
            stdout,
            "{space} {opcode:#04X}: empty slot ({})",
            description.mnemonic
        )?,
        Some(record) => {
            writeln!(stdout, "{space} {opcode:#04X}: {}", record.disassembly)?;
            writeln!(stdout, "  bytes: {}, cycles: {}", record.bytes, record.cycles)?;
            for (datum, rw) in record.touched() {
                writeln!(stdout, "  {datum}: {rw}")?;
            }
        }
    }
    Ok(())
}
