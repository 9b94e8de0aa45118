//! Rendering of the generated tables as Rust source.
//!
//! The output declares one `[Option<InstructionData>; 256]` constant per
//! opcode space, indexed positionally by opcode byte, followed by the
//! `MAX_OPERANDS` diagnostic. `InstructionData` and `ReadWrite` belong to the
//! consuming crate and are imported from [`RenderOptions::module_path`].

use std::fmt;

use crate::access::Datum;
use crate::description::OpcodeSpace;
use crate::record::InstructionRecord;
use crate::table::{GeneratedTables, OpcodeTable, TABLE_SIZE};

/// Options for the generated source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Module that defines `InstructionData` and `ReadWrite`
    pub module_path: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            module_path: "crate::sm83".to_owned(),
        }
    }
}

/// Generated source for both tables; render it with `Display`.
#[derive(Debug, Clone, Copy)]
pub struct TableSource<'a> {
    tables: &'a GeneratedTables,
    options: &'a RenderOptions,
}

impl<'a> TableSource<'a> {
    pub const fn new(tables: &'a GeneratedTables, options: &'a RenderOptions) -> Self {
        Self { tables, options }
    }
}

impl fmt::Display for TableSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "// @generated by rwgen. Do not edit.")?;
        writeln!(f, "use {}::InstructionData;", self.options.module_path)?;
        writeln!(f, "use {}::ReadWrite;", self.options.module_path)?;
        for space in OpcodeSpace::ALL {
            writeln!(f)?;
            write_table(f, self.tables.table(space))?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "pub const MAX_OPERANDS: usize = {};",
            self.tables.max_operands
        )
    }
}

fn write_table(f: &mut fmt::Formatter<'_>, table: &OpcodeTable) -> fmt::Result {
    writeln!(
        f,
        "pub const {}: [Option<InstructionData>; {TABLE_SIZE}] = [",
        table.space().const_name()
    )?;
    for slot in table.slots() {
        match slot {
            Some(record) => write!(f, "{}", RecordSource(record))?,
            None => writeln!(f, "    None,")?,
        }
    }
    writeln!(f, "];")
}

/// One populated slot, rendered as a `Some(InstructionData { .. }),` entry.
#[derive(Debug, Clone, Copy)]
pub struct RecordSource<'a>(pub &'a InstructionRecord);

impl fmt::Display for RecordSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.0;
        writeln!(f, "    Some(InstructionData {{")?;
        writeln!(f, "        // {}", record.disassembly)?;
        writeln!(f, "        mnemonic: {:?},", record.mnemonic)?;
        writeln!(f, "        opcode: {:#04x},", record.opcode)?;
        writeln!(f, "        bytes: {},", record.bytes)?;
        writeln!(f, "        cycles: {},", record.cycles)?;
        for datum in Datum::ALL {
            writeln!(
                f,
                "        {}: ReadWrite::{},",
                datum.field_name(),
                record.datum(datum).short_name()
            )?;
        }
        writeln!(f, "    }}),")
    }
}
