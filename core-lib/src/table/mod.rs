//! Assembly of the two 256-entry opcode tables.

use tracing::{debug, instrument, trace};

use crate::description::{OpcodeSet, OpcodeSpace};
use crate::error::GenError;
use crate::record::{build_record, InstructionRecord};

/// Number of slots in each opcode table.
pub const TABLE_SIZE: usize = 256;

/// One opcode space, indexed by the raw opcode byte.
///
/// A slot is empty exactly when the opcode is illegal or is the prefix byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeTable {
    space: OpcodeSpace,
    slots: [Option<InstructionRecord>; TABLE_SIZE],
}

impl OpcodeTable {
    /// Builds every slot of `space` in ascending opcode order.
    #[instrument(skip(set), level = "debug")]
    pub fn build(set: &OpcodeSet, space: OpcodeSpace) -> Result<Self, GenError> {
        let mut slots: [Option<InstructionRecord>; TABLE_SIZE] = std::array::from_fn(|_| None);

        for (slot, opcode) in slots.iter_mut().zip(0..=u8::MAX) {
            let description = set.lookup(space, opcode)?;
            let record =
                build_record(opcode, description).map_err(|source| GenError::Classify {
                    space,
                    opcode,
                    mnemonic: description.mnemonic.clone(),
                    source,
                })?;
            trace!(opcode, mnemonic = %description.mnemonic, populated = record.is_some());
            *slot = record;
        }

        let table = Self { space, slots };
        debug!(
            %space,
            populated = table.populated().count(),
            "Assembled opcode table"
        );
        Ok(table)
    }

    pub const fn space(&self) -> OpcodeSpace {
        self.space
    }

    pub fn get(&self, opcode: u8) -> Option<&InstructionRecord> {
        self.slots[opcode as usize].as_ref()
    }

    /// All slots in opcode order.
    pub const fn slots(&self) -> &[Option<InstructionRecord>; TABLE_SIZE] {
        &self.slots
    }

    /// Populated slots in opcode order.
    pub fn populated(&self) -> impl Iterator<Item = &InstructionRecord> {
        self.slots.iter().flatten()
    }
}

/// Both opcode tables and the operand-count diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedTables {
    pub unprefixed: OpcodeTable,
    pub cbprefixed: OpcodeTable,
    /// Longest operand list in the unprefixed space
    pub max_operands: usize,
}

impl GeneratedTables {
    pub const fn table(&self, space: OpcodeSpace) -> &OpcodeTable {
        match space {
            OpcodeSpace::Unprefixed => &self.unprefixed,
            OpcodeSpace::CbPrefixed => &self.cbprefixed,
        }
    }
}

/// Builds both tables; the first data error aborts the whole run.
#[instrument(skip(set))]
pub fn assemble(set: &OpcodeSet) -> Result<GeneratedTables, GenError> {
    let unprefixed = OpcodeTable::build(set, OpcodeSpace::Unprefixed)?;
    let cbprefixed = OpcodeTable::build(set, OpcodeSpace::CbPrefixed)?;
    let max_operands = set.max_operands(OpcodeSpace::Unprefixed);
    debug!(max_operands, "Generated both opcode tables");
    Ok(GeneratedTables {
        unprefixed,
        cbprefixed,
        max_operands,
    })
}
