//! Register and flag read/write tables for the SM83 instruction set.
//!
//! The generator reads an `Opcodes.json` style description of both opcode
//! spaces, classifies how each instruction touches every register and status
//! flag, and renders two 256-entry tables as Rust source for an emulator's
//! decode stage.

pub mod access;
pub mod codegen;
pub mod description;
pub mod error;
pub mod flags;
pub mod operand;
pub mod record;
pub mod table;

// Re-export common types
pub use access::{Datum, ReadWrite};
pub use codegen::{RenderOptions, TableSource};
pub use description::{OpcodeDescription, OpcodeSet, OpcodeSpace, OperandDescriptor};
pub use error::{ClassifyError, GenError};
pub use record::InstructionRecord;
pub use table::{assemble, GeneratedTables, OpcodeTable};

/// Parses a JSON opcode description and builds both tables.
pub fn generate(json: &str) -> Result<GeneratedTables, GenError> {
    let set = OpcodeSet::from_json(json)?;
    assemble(&set)
}
