//! Instruction metadata records.

use crate::access::{Datum, ReadWrite};
use crate::description::OpcodeDescription;
use crate::error::ClassifyError;
use crate::flags::FlagAccess;
use crate::operand::{classify_operands, RegisterAccess};

/// Register and flag traffic of one opcode, plus its size and timing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstructionRecord {
    /// Lowercase mnemonic
    pub mnemonic: String,
    pub opcode: u8,
    pub bytes: u8,
    /// Base cycle count (the untaken branch for conditional instructions)
    pub cycles: u32,
    pub flags: FlagAccess,
    pub registers: RegisterAccess,
    /// Disassembly of the instruction, e.g. `LD (HL+), A`
    pub disassembly: String,
}

impl InstructionRecord {
    /// Classification of one flag or register component.
    pub const fn datum(&self, datum: Datum) -> ReadWrite {
        let regs = &self.registers;
        match datum {
            Datum::Zero => self.flags.zero,
            Datum::Negative => self.flags.negative,
            Datum::HalfCarry => self.flags.half_carry,
            Datum::Carry => self.flags.carry,
            Datum::A => regs.a,
            Datum::B => regs.b,
            Datum::C => regs.c,
            Datum::D => regs.d,
            Datum::E => regs.e,
            Datum::H => regs.h,
            Datum::L => regs.l,
            Datum::R => regs.r,
            Datum::Ixh => regs.ixh,
            Datum::Ixl => regs.ixl,
            Datum::Iyh => regs.iyh,
            Datum::Iyl => regs.iyl,
            Datum::Sp => regs.sp,
            Datum::I => regs.i,
        }
    }

    /// Targets the instruction touches, in record field order.
    pub fn touched(&self) -> impl Iterator<Item = (Datum, ReadWrite)> + '_ {
        Datum::ALL
            .into_iter()
            .map(|d| (d, self.datum(d)))
            .filter(|(_, rw)| rw.is_touched())
    }
}

/// Whether the mnemonic marks a slot that never holds an instruction.
///
/// Illegal opcodes are spelled `ILLEGAL_D3` and so on; `PREFIX` is the byte
/// that redirects decoding into the prefixed table.
pub fn is_empty_slot(mnemonic: &str) -> bool {
    mnemonic.starts_with("ILLEGAL") || mnemonic == "PREFIX"
}

/// Builds the record for one opcode, or `None` for an empty slot.
pub fn build_record(
    opcode: u8,
    description: &OpcodeDescription,
) -> Result<Option<InstructionRecord>, ClassifyError> {
    if is_empty_slot(&description.mnemonic) {
        return Ok(None);
    }

    let mut flags = FlagAccess::from_markers(&description.flags)?;
    let registers = classify_operands(
        &description.mnemonic,
        &description.operands,
        &mut flags,
    )?;
    let cycles = *description
        .cycles
        .first()
        .ok_or(ClassifyError::NoCycleCount)?;

    Ok(Some(InstructionRecord {
        mnemonic: description.mnemonic.to_lowercase(),
        opcode,
        bytes: description.bytes,
        cycles,
        flags,
        registers,
        disassembly: disassemble(description),
    }))
}

fn disassemble(description: &OpcodeDescription) -> String {
    let mut operands: Vec<String> = Vec::with_capacity(description.operands.len());
    let mut join_next = false;
    for operand in &description.operands {
        let text = operand.disassembly();
        // `SP+` reads as one operand with the displacement after it
        let joined = join_next && operands.last_mut().map(|prev| prev.push_str(&text)).is_some();
        if !joined {
            operands.push(text);
        }
        join_next = operand.immediate && operand.steps_pointer();
    }
    if operands.is_empty() {
        description.mnemonic.clone()
    } else {
        format!("{} {}", description.mnemonic, operands.join(", "))
    }
}
