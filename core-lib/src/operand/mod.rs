//! Operand classification.
//!
//! Operand tokens are parsed into an [`OperandToken`] first; classification
//! then walks the tokens in order with a destination cursor. The first operand
//! of an instruction is its destination and every later operand is a source,
//! so a register operand is [`ReadWrite::Written`] while the cursor is still
//! set and [`ReadWrite::Read`] afterwards. Every operand consumes the cursor,
//! including conditions and immediates.

use crate::access::ReadWrite;
use crate::description::OperandDescriptor;
use crate::error::ClassifyError;
use crate::flags::{Flag, FlagAccess};

/// Eight-bit registers an operand can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    A,
    B,
    C,
    D,
    E,
    H,
    L,
}

/// Sixteen-bit register pairs an operand can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterPair {
    Bc,
    De,
    Hl,
    /// Accumulator and flags; the flags half is classified by the flag markers
    Af,
}

impl RegisterPair {
    /// Register halves tracked by the register classification.
    pub const fn halves(self) -> &'static [Register] {
        match self {
            Self::Bc => &[Register::B, Register::C],
            Self::De => &[Register::D, Register::E],
            Self::Hl => &[Register::H, Register::L],
            Self::Af => &[Register::A],
        }
    }
}

/// Immediate operands, kept only for disassembly and length bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `n8`
    Imm8,
    /// `n16`
    Imm16,
    /// `a16`
    Addr16,
    /// `a8`, offset into the `$FF00` I/O page
    HighAddr8,
    /// `e8`
    Displacement8,
}

/// Semantic category of one operand token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandToken {
    /// Branch condition testing a flag; `negated` for `NZ` and `NC`
    Condition { flag: Flag, negated: bool },
    Placeholder(Placeholder),
    BitIndex(u8),
    RestartVector(u8),
    Pair(RegisterPair),
    Register(Register),
    StackPointer,
}

impl OperandToken {
    /// Parses one operand name in the context of its mnemonic.
    ///
    /// `C` names the carry condition for control transfers and register C
    /// everywhere else.
    pub fn parse(name: &str, mnemonic: &str) -> Result<Self, ClassifyError> {
        let token = match name {
            "NZ" => Self::Condition {
                flag: Flag::Zero,
                negated: true,
            },
            "Z" => Self::Condition {
                flag: Flag::Zero,
                negated: false,
            },
            "NC" => Self::Condition {
                flag: Flag::Carry,
                negated: true,
            },
            "C" if is_control_transfer(mnemonic) => Self::Condition {
                flag: Flag::Carry,
                negated: false,
            },
            "n8" => Self::Placeholder(Placeholder::Imm8),
            "n16" => Self::Placeholder(Placeholder::Imm16),
            "a16" => Self::Placeholder(Placeholder::Addr16),
            "a8" => Self::Placeholder(Placeholder::HighAddr8),
            "e8" => Self::Placeholder(Placeholder::Displacement8),
            "BC" => Self::Pair(RegisterPair::Bc),
            "DE" => Self::Pair(RegisterPair::De),
            "HL" => Self::Pair(RegisterPair::Hl),
            "AF" => Self::Pair(RegisterPair::Af),
            "A" => Self::Register(Register::A),
            "B" => Self::Register(Register::B),
            "C" => Self::Register(Register::C),
            "D" => Self::Register(Register::D),
            "E" => Self::Register(Register::E),
            "H" => Self::Register(Register::H),
            "L" => Self::Register(Register::L),
            "SP" => Self::StackPointer,
            _ => {
                return parse_numeric(name)
                    .ok_or_else(|| ClassifyError::UnknownOperand(name.to_owned()))
            }
        };
        Ok(token)
    }
}

fn is_control_transfer(mnemonic: &str) -> bool {
    ["JP", "JR", "CALL", "RET"]
        .iter()
        .any(|m| mnemonic.eq_ignore_ascii_case(m))
}

/// Bit indices `0`-`7` and restart vectors `$00`-`$38`.
fn parse_numeric(name: &str) -> Option<OperandToken> {
    if let Some(hex) = name.strip_prefix('$') {
        if hex.len() != 2 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let vector = u8::from_str_radix(hex, 16).ok()?;
        return (vector % 8 == 0 && vector <= 0x38)
            .then_some(OperandToken::RestartVector(vector));
    }
    match name.as_bytes() {
        [digit @ b'0'..=b'7'] => Some(OperandToken::BitIndex(digit - b'0')),
        _ => None,
    }
}

/// Classification of every addressable register component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RegisterAccess {
    pub a: ReadWrite,
    pub b: ReadWrite,
    pub c: ReadWrite,
    pub d: ReadWrite,
    pub e: ReadWrite,
    pub h: ReadWrite,
    pub l: ReadWrite,
    pub r: ReadWrite,
    pub ixh: ReadWrite,
    pub ixl: ReadWrite,
    pub iyh: ReadWrite,
    pub iyl: ReadWrite,
    pub sp: ReadWrite,
    /// Interrupt vector base; no SM83 operand references it
    pub i: ReadWrite,
}

impl RegisterAccess {
    pub fn register_mut(&mut self, register: Register) -> &mut ReadWrite {
        match register {
            Register::A => &mut self.a,
            Register::B => &mut self.b,
            Register::C => &mut self.c,
            Register::D => &mut self.d,
            Register::E => &mut self.e,
            Register::H => &mut self.h,
            Register::L => &mut self.l,
        }
    }

    pub const fn register(&self, register: Register) -> ReadWrite {
        match register {
            Register::A => self.a,
            Register::B => self.b,
            Register::C => self.c,
            Register::D => self.d,
            Register::E => self.e,
            Register::H => self.h,
            Register::L => self.l,
        }
    }
}

/// Destination cursor, local to one opcode.
#[derive(Debug)]
struct Cursor {
    first: bool,
}

impl Cursor {
    const fn new() -> Self {
        Self { first: true }
    }

    /// Classification for the current operand; moves the cursor past it.
    fn take(&mut self) -> ReadWrite {
        let rw = if self.first {
            ReadWrite::Written
        } else {
            ReadWrite::Read
        };
        self.first = false;
        rw
    }
}

/// Classifies the operand list of one opcode.
///
/// Condition operands upgrade the tested flag in `flags` to read.
pub fn classify_operands(
    mnemonic: &str,
    operands: &[OperandDescriptor],
    flags: &mut FlagAccess,
) -> Result<RegisterAccess, ClassifyError> {
    let mut access = RegisterAccess::default();
    let mut cursor = Cursor::new();

    for operand in operands {
        let token = OperandToken::parse(&operand.name, mnemonic)?;
        let rw = cursor.take();
        match token {
            OperandToken::Condition { flag, .. } => flags.mark_tested(flag),
            OperandToken::Placeholder(_)
            | OperandToken::BitIndex(_)
            | OperandToken::RestartVector(_) => {}
            OperandToken::Pair(pair) => {
                // (HL+) and (HL-) read the pointer and write it back stepped
                let rw = if pair == RegisterPair::Hl && operand.steps_pointer() {
                    ReadWrite::ReadModifyWrite
                } else {
                    rw
                };
                for &half in pair.halves() {
                    *access.register_mut(half) = rw;
                }
            }
            OperandToken::Register(register) => *access.register_mut(register) = rw,
            OperandToken::StackPointer => access.sp = rw,
        }
    }

    Ok(access)
}
